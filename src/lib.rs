// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/*!

*svgxml* is the XML ingestion pipeline for an SVG rendering stack: a
streaming parser, an entity/registry-backed DOM, and a span-preserving
edit/save pipeline, topped with a typed SVG element facade.

## Purpose

Rendering SVG starts with turning source text into a tree that can be
queried, diffed, and partially rewritten without losing the formatting
an editor's user didn't touch. *svgxml* is that first stage: it owns
XML syntax (entities, DTDs, namespaces), builds a DOM that remembers
where each node and attribute came from in the source, and exposes a
small, span-preserving edit pipeline for writing back a localized change
without reformatting the rest of the document.

On top of that, [`svg`] classifies each element and attribute against
SVG's vocabulary (`svgtypes`), producing a typed view alongside the raw
XML tree: a renderer reads typed lengths, paths and colors; a CSS
matcher or round-trip save still sees the original strings.

## Limitations

- CSS selector matching, cascade resolution, and the style/rendering
  backend are out of scope; `simplecss` is a tokenizing/matching tool
  available to callers building that layer, not wired up here.
- Schema validation, HTML-style error recovery, XPath, XSLT and XInclude
  are not implemented.
- Geometry and typography (path flattening, text shaping, font loading)
  live above this crate, not in it.

*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
extern crate log;
extern crate simplecss;
extern crate slab;
extern crate svgtypes;
extern crate thiserror;

pub mod chunked_string;
pub mod error;
pub mod file_offset;
pub mod rcstring;
pub mod registry;
pub mod svg;
pub mod xml;

pub use chunked_string::ChunkedString;
pub use error::{Error, Result, Warning};
pub use file_offset::{FileOffset, FileOffsetRange, LineInfo, LineOffsets};
pub use rcstring::RcString;
pub use registry::{Entity, Registry};

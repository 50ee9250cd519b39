// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Options controlling [`crate::svg::parser::SVGParser`].

/// Options controlling how [`crate::svg::parser::SVGParser`] walks the XML
/// tree built by [`crate::xml::parser::XMLParser`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SVGParserOptions {
    /// Warn and drop non-presentation, non-universal attributes instead of
    /// storing them verbatim. `true` by default, favoring performance: CSS
    /// matchers that key off custom attributes need to set this to `false`.
    pub disable_user_attributes: bool,
    /// Relax the requirement that the root element's namespace URI resolves
    /// to the SVG namespace. Only the root element is relaxed; descendants
    /// are still namespace-checked normally.
    pub parse_as_inline_svg: bool,
    /// Expose elements marked experimental in the dispatch table (e.g.
    /// `text`) even though they aren't part of the stable rendering surface.
    pub enable_experimental: bool,
}

impl Default for SVGParserOptions {
    fn default() -> Self {
        SVGParserOptions {
            disable_user_attributes: true,
            parse_as_inline_svg: false,
            enable_experimental: false,
        }
    }
}

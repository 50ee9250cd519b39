// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The typed discriminant used to classify constructed SVG elements.

use svgtypes::ElementId;

use crate::xml::qualified_name::XMLQualifiedName;

/// Discriminates an element built by [`crate::svg::parser::SVGParser`].
///
/// Wraps [`svgtypes::ElementId`] for every tag the dispatch table recognizes
/// by name (`rect`, `circle`, `g`, `path`, `linearGradient`, ...). An
/// SVG-namespace element whose local name `ElementId` doesn't know about
/// becomes `Unknown`, carrying its original qualified name so diagnostics can
/// still name it.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementType {
    /// A recognized SVG element.
    Known(ElementId),
    /// An element in the SVG namespace with no matching `ElementId`.
    Unknown(XMLQualifiedName),
}

impl ElementType {
    /// Resolve `name`'s local part against `ElementId::from_name`.
    pub fn resolve(name: &XMLQualifiedName) -> ElementType {
        match ElementId::from_name(name.local.as_str()) {
            Some(id) => ElementType::Known(id),
            None => ElementType::Unknown(name.clone()),
        }
    }

    /// `true` if this is the known element `id`.
    pub fn is(&self, id: ElementId) -> bool {
        matches!(self, ElementType::Known(known) if *known == id)
    }

    /// The underlying [`ElementId`], if known.
    pub fn as_known(&self) -> Option<ElementId> {
        match self {
            ElementType::Known(id) => Some(*id),
            ElementType::Unknown(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_tag() {
        let name = XMLQualifiedName::parse("rect");
        assert_eq!(ElementType::resolve(&name).as_known(), Some(ElementId::Rect));
    }

    #[test]
    fn unknown_tag_keeps_qualified_name() {
        let name = XMLQualifiedName::parse("frobnicate");
        let kind = ElementType::resolve(&name);
        assert!(kind.as_known().is_none());
        match kind {
            ElementType::Unknown(n) => assert_eq!(n.local.as_str(), "frobnicate"),
            ElementType::Known(_) => panic!("expected Unknown"),
        }
    }
}

// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `SVGParser`: walks an [`XMLDocument`] depth-first, pre-order, enforcing
//! the SVG namespace, constructing a typed [`SVGElement`] view for each
//! in-namespace element, and dispatching every attribute through
//! [`crate::svg::attributes::dispatch_attribute`].

use svgtypes::ElementId;

use crate::error::{Error, Result, Warning};
use crate::svg::attributes::dispatch_attribute;
use crate::svg::element::{SVGAttributesComponent, SVGElement};
use crate::svg::element_type::ElementType;
use crate::svg::options::SVGParserOptions;
use crate::xml::components::NodeKind;
use crate::xml::document::XMLDocument;
use crate::xml::node::XMLNode;
use crate::xml::qualified_name::XMLQualifiedName;

/// The namespace URI every SVG element must resolve to (unless relaxed by
/// [`SVGParserOptions::parse_as_inline_svg`] for the root element).
pub const SVG_NAMESPACE_URI: &str = "http://www.w3.org/2000/svg";

/// Walks an already-parsed [`XMLDocument`] and builds the typed SVG view of
/// its tree.
pub struct SVGParser;

impl SVGParser {
    /// Find the document's first element, verify it is an `svg` element in
    /// the SVG namespace (or relax that check per
    /// [`SVGParserOptions::parse_as_inline_svg`]), and walk its subtree.
    ///
    /// Returns the root [`SVGElement`] and every non-fatal diagnostic
    /// collected along the way. Fails with [`Error::NoSvgElement`] if the
    /// document has no root element at all; namespace and attribute
    /// failures below the root are always warnings, never fatal.
    pub fn parse(document: &XMLDocument, options: &SVGParserOptions) -> Result<(SVGElement, Vec<Warning>)> {
        let root_node = document
            .root()
            .children()
            .find(|n| n.kind() == NodeKind::Element)
            .ok_or(Error::NoSvgElement)?;

        let tag = root_node.tag_name().ok_or(Error::NoSvgElement)?;
        if tag.local.as_str() != "svg" {
            return Err(Error::NoSvgElement);
        }

        if !options.parse_as_inline_svg {
            let uri = root_node.namespace_uri(tag.prefix.as_str());
            if uri.as_deref() != Some(SVG_NAMESPACE_URI) {
                return Err(Error::NoSvgElement);
            }
        }

        let mut warnings = Vec::new();
        let root = Self::walk(&root_node, options, &mut warnings);
        Ok((root, warnings))
    }

    /// Walk `node` (already confirmed to be in the SVG namespace), dispatch
    /// its attributes, and recurse into in-namespace element children.
    /// Children outside the SVG namespace are skipped (not recursed into)
    /// with a warning.
    fn walk(node: &XMLNode, options: &SVGParserOptions, warnings: &mut Vec<Warning>) -> SVGElement {
        let tag = node.tag_name().unwrap_or_else(|| XMLQualifiedName::local(""));
        let element_type = ElementType::resolve(&tag);

        if element_type.is(ElementId::Style) {
            Self::check_style_contents(node, warnings);
        }

        let mut typed = SVGAttributesComponent::new();
        for attr in node.attributes() {
            let outcome =
                dispatch_attribute(&element_type, &attr.name.as_ref(), attr.value.as_str(), options);
            if let Some(message) = outcome.warning {
                warnings.push(Self::warning_at(node, &attr.name, message));
            }
            if let Some(value) = outcome.value {
                typed.set(attr.name.clone(), value);
            }
        }
        node.registry.borrow_mut().emplace(node.entity, typed);

        for child in node.children() {
            if child.kind() != NodeKind::Element {
                continue;
            }
            let child_tag = match child.tag_name() {
                Some(t) => t,
                None => continue,
            };
            let uri = child.namespace_uri(child_tag.prefix.as_str());
            if uri.as_deref() != Some(SVG_NAMESPACE_URI) {
                warnings.push(Self::warning_at(
                    &child,
                    &child_tag,
                    format!("element {} is outside the SVG namespace and was dropped", child_tag),
                ));
                continue;
            }
            Self::walk(&child, options, warnings);
        }

        SVGElement::new(node.clone(), element_type)
    }

    /// The `style` element: its text content (`Data`/`CData` children) is
    /// meaningful only when `type` is empty or `text/css`; otherwise it's
    /// not usable CSS and a warning is emitted (the text is still left in
    /// place on the XML tree, as the SVG layer never mutates it).
    fn check_style_contents(node: &XMLNode, warnings: &mut Vec<Warning>) {
        if let Some(type_attr) = node.attribute("type") {
            let is_css = type_attr.is_empty() || type_attr.as_str() == "text/css";
            if !is_css {
                warnings.push(Self::warning_at(
                    node,
                    &XMLQualifiedName::local("type"),
                    format!("style element has unsupported type {:?}, contents ignored", type_attr.as_str()),
                ));
            }
        }
    }

    /// `SVGParser` walks an already-built [`XMLDocument`] without access to
    /// the original source text, so it anchors warnings on the node's own
    /// recorded span start rather than re-parsing an attribute's span (that
    /// finer-grained lookup is [`XMLNode::attribute_location`], available to
    /// callers that do still hold the source).
    fn warning_at(node: &XMLNode, _name: &XMLQualifiedName, message: String) -> Warning {
        let offset = node.node_location().map(|r| r.start).unwrap_or_default();
        Warning::new(message, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser::{XMLParser, XMLParserOptions};

    fn parse_svg(source: &str) -> (SVGElement, Vec<Warning>) {
        let doc = XMLParser::parse(source, &XMLParserOptions::default()).unwrap();
        SVGParser::parse(&doc, &SVGParserOptions::default()).unwrap()
    }

    #[test]
    fn root_must_be_svg_element() {
        let doc = XMLParser::parse("<rect/>", &XMLParserOptions::default()).unwrap();
        let result = SVGParser::parse(&doc, &SVGParserOptions::default());
        assert!(result.is_err());
    }

    #[test]
    fn root_must_be_in_svg_namespace() {
        let doc = XMLParser::parse(
            "<svg xmlns='http://example.com/not-svg'></svg>",
            &XMLParserOptions::default(),
        )
        .unwrap();
        assert!(SVGParser::parse(&doc, &SVGParserOptions::default()).is_err());
    }

    #[test]
    fn inline_svg_relaxes_root_namespace() {
        let doc = XMLParser::parse("<svg></svg>", &XMLParserOptions::default()).unwrap();
        let options = SVGParserOptions { parse_as_inline_svg: true, ..SVGParserOptions::default() };
        assert!(SVGParser::parse(&doc, &options).is_ok());
    }

    #[test]
    fn recognizes_known_child_elements() {
        let source = "<svg xmlns='http://www.w3.org/2000/svg'><rect width='10'/></svg>";
        let (root, warnings) = parse_svg(source);
        assert!(warnings.is_empty());
        let rect = root.node().first_child().unwrap();
        assert_eq!(ElementType::resolve(&rect.tag_name().unwrap()).as_known(), Some(ElementId::Rect));
    }

    #[test]
    fn non_svg_namespace_child_dropped_with_warning() {
        let source = "<svg xmlns='http://www.w3.org/2000/svg'><foo:bar xmlns:foo='http://other'/></svg>";
        let (_, warnings) = parse_svg(source);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn style_element_with_non_css_type_warns() {
        let source =
            "<svg xmlns='http://www.w3.org/2000/svg'><style type='text/plain'>x</style></svg>";
        let (_, warnings) = parse_svg(source);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn attribute_parse_failure_is_a_warning() {
        let source = "<svg xmlns='http://www.w3.org/2000/svg'><rect width='abc'/></svg>";
        let (_, warnings) = parse_svg(source);
        assert_eq!(warnings.len(), 1);
    }
}

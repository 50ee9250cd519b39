// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `simplecss::Element` adapter over [`XMLNode`], backing
//! [`crate::svg::element::SVGElement::query_selector`].
//!
//! This crate does not implement a CSS cascade or tokenizer (spec §1's
//! non-goals); it only needs enough of `simplecss` to answer "does this
//! node match this selector", which is exactly the boundary
//! `simplecss::Element` + `simplecss::Selector::matches` draws.

use crate::xml::components::NodeKind;
use crate::xml::node::XMLNode;

/// Wraps an [`XMLNode`] so it can be matched against a [`simplecss::Selector`].
///
/// Only `Element` nodes are ever exposed through `parent_element`/
/// `prev_sibling_element`; text/comment/PI siblings are skipped, matching
/// how `simplecss::Element` walkers in this pack (`rosvgtree`, `usvg`)
/// treat non-element tree members as invisible to selector matching.
pub struct CssNode(XMLNode);

impl CssNode {
    /// Wrap `node` for selector matching.
    pub fn new(node: XMLNode) -> Self {
        CssNode(node)
    }
}

impl simplecss::Element for CssNode {
    fn parent_element(&self) -> Option<Self> {
        let mut current = self.0.parent();
        while let Some(node) = current {
            if node.kind() == NodeKind::Element {
                return Some(CssNode(node));
            }
            current = node.parent();
        }
        None
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        let mut current = self.0.previous_sibling();
        while let Some(node) = current {
            if node.kind() == NodeKind::Element {
                return Some(CssNode(node));
            }
            current = node.previous_sibling();
        }
        None
    }

    fn has_local_name(&self, local_name: &str) -> bool {
        self.0.tag_name().map(|name| name.local.as_str() == local_name).unwrap_or(false)
    }

    fn attribute_matches(&self, local_name: &str, operator: simplecss::AttributeOperator) -> bool {
        match self.0.attribute(local_name) {
            Some(value) => operator.matches(value.as_str()),
            None => false,
        }
    }

    fn pseudo_class_matches(&self, class: simplecss::PseudoClass) -> bool {
        match class {
            simplecss::PseudoClass::FirstChild => self.prev_sibling_element().is_none(),
            // This crate queries an already-built, static DOM, so the
            // dynamic pseudo-classes (`:hover`, `:link`, ...) never apply.
            _ => false,
        }
    }
}

/// Parse `selector` as a standalone CSS selector and return `true` if `node`
/// matches it.
///
/// `simplecss::StyleSheet` only exposes selectors attached to a full rule
/// (`selector { declarations }`), so a bare selector is wrapped in an empty
/// declaration block before parsing; this mirrors how a `<style>` element's
/// text is fed to `StyleSheet::parse_more` elsewhere in this crate's lineage
/// (`rosvgtree`/`usvg`'s `resolve_css`), just for a single ad hoc rule
/// instead of a whole sheet.
pub fn matches(selector: &str, node: &XMLNode) -> bool {
    let wrapped = format!("{}{{}}", selector);
    let mut sheet = simplecss::StyleSheet::new();
    sheet.parse_more(&wrapped);
    match sheet.rules.first() {
        Some(rule) => rule.selector.matches(&CssNode::new(node.clone())),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::document::XMLDocument;
    use crate::xml::qualified_name::XMLQualifiedName;

    #[test]
    fn type_selector_matches_tag_name() {
        let doc = XMLDocument::new();
        let root = doc.root();
        let rect = doc.create_node(NodeKind::Element);
        rect.set_name(XMLQualifiedName::local("rect"));
        rect.set_attribute("id", "r1");
        root.append_child(&rect);

        assert!(matches("rect", &rect));
        assert!(!matches("circle", &rect));
    }

    #[test]
    fn id_selector_matches() {
        let doc = XMLDocument::new();
        let root = doc.root();
        let rect = doc.create_node(NodeKind::Element);
        rect.set_name(XMLQualifiedName::local("rect"));
        rect.set_attribute("id", "r1");
        root.append_child(&rect);

        assert!(matches("#r1", &rect));
        assert!(!matches("#other", &rect));
    }

    #[test]
    fn first_child_pseudo_class() {
        let doc = XMLDocument::new();
        let root = doc.root();
        let a = doc.create_node(NodeKind::Element);
        let b = doc.create_node(NodeKind::Element);
        root.append_child(&a);
        root.append_child(&b);

        assert!(matches(":first-child", &a));
        assert!(!matches(":first-child", &b));
    }
}

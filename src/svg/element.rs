// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `SVGElement`: a thin `(registry, entity)` handle plus the [`ElementType`]
//! typed view produced by [`crate::svg::parser::SVGParser`].

use std::collections::BTreeMap;

use svgtypes::ElementId;

use crate::svg::attribute_value::SVGAttributeValue;
use crate::svg::element_type::ElementType;
use crate::svg::selector;
use crate::xml::components::NodeKind;
use crate::xml::node::XMLNode;
use crate::xml::qualified_name::XMLQualifiedName;

/// Per-entity component storing the typed (already-dispatched) view of an
/// element's attributes, alongside the raw strings kept on the underlying
/// [`crate::xml::components::AttributesComponent`]. Populated by
/// [`crate::svg::parser::SVGParser`] as it walks the tree, and kept current
/// by [`SVGElement`]'s typed setters.
#[derive(Clone, Debug, Default)]
pub struct SVGAttributesComponent {
    values: BTreeMap<XMLQualifiedName, SVGAttributeValue>,
}

impl SVGAttributesComponent {
    /// An empty typed-attribute map.
    pub fn new() -> Self {
        SVGAttributesComponent { values: BTreeMap::new() }
    }

    /// Record the typed value dispatched for `name`.
    pub fn set(&mut self, name: XMLQualifiedName, value: SVGAttributeValue) {
        self.values.insert(name, value);
    }

    /// Look up the typed value for an unprefixed attribute.
    pub fn get(&self, local: &str) -> Option<&SVGAttributeValue> {
        self.values.get(&XMLQualifiedName::local(local))
    }
}

/// A handle onto one constructed SVG element: the underlying [`XMLNode`]
/// plus the [`ElementType`] discriminant the parser resolved for it.
///
/// Typed setters (`set_length`, `set_view_box`, ...) write the parsed value
/// into this entity's [`SVGAttributesComponent`] and keep the raw XML
/// attribute string in sync, so the two views of an attribute (typed, for
/// the renderer; raw, for a CSS matcher or round-trip save) never disagree.
#[derive(Clone)]
pub struct SVGElement {
    node: XMLNode,
    element_type: ElementType,
}

impl SVGElement {
    /// Wrap `node`, already classified as `element_type` by the parser.
    pub fn new(node: XMLNode, element_type: ElementType) -> Self {
        SVGElement { node, element_type }
    }

    /// The underlying XML node handle.
    pub fn node(&self) -> &XMLNode {
        &self.node
    }

    /// This element's resolved type.
    pub fn element_type(&self) -> &ElementType {
        &self.element_type
    }

    /// Returns `true` if this element's type is the known element `id`.
    ///
    /// Mirrors the "cast requires `isa`" contract: callers check `isa`
    /// before calling a subtype-specific setter.
    pub fn isa(&self, id: ElementId) -> bool {
        self.element_type.is(id)
    }

    /// Look up the typed value most recently dispatched for `local_name`.
    pub fn typed_attribute(&self, local_name: &str) -> Option<SVGAttributeValue> {
        let registry = self.node.registry.borrow();
        registry.try_get::<SVGAttributesComponent>(self.node.entity)?.get(local_name).cloned()
    }

    /// Record `value` as the typed view of `local_name`, leaving the raw
    /// attribute string on the underlying node untouched (the parser is
    /// responsible for keeping both in sync when it dispatches from source
    /// text; this is for setters invoked after construction).
    pub fn set_typed_attribute(&self, local_name: &str, value: SVGAttributeValue) {
        let mut registry = self.node.registry.borrow_mut();
        let mut component = registry
            .try_get::<SVGAttributesComponent>(self.node.entity)
            .cloned()
            .unwrap_or_default();
        component.set(XMLQualifiedName::local(local_name), value);
        registry.emplace(self.node.entity, component);
    }

    /// `querySelector(selector)`: depth-first, pre-order search of this
    /// element's descendants for the first one matching `selector`, a CSS
    /// selector consumed by the external `simplecss` boundary (spec §6).
    /// Returns `None` if `selector` doesn't parse or no descendant matches.
    pub fn query_selector(&self, selector: &str) -> Option<SVGElement> {
        self.node
            .descendants()
            .skip(1)
            .filter(|n| n.kind() == NodeKind::Element)
            .find(|n| selector::matches(selector, n))
            .map(|n| {
                let tag = n.tag_name().unwrap_or_else(|| XMLQualifiedName::local(""));
                SVGElement::new(n, ElementType::resolve(&tag))
            })
    }

    /// `getComputedStyle()`: the facade into the external style-cascade
    /// subsystem (spec §1's non-goals explicitly exclude the cascade itself
    /// from this crate). `provider` performs the actual resolution
    /// (presentation attributes, inline `style`, matched CSS rules); this
    /// method only wires this element into that boundary.
    pub fn get_computed_style<P: ComputedStyleProvider>(&self, provider: &P) -> P::Style {
        provider.computed_style(self)
    }
}

/// A plug-in point for the external style-cascade subsystem. Out of scope
/// for this crate (spec §1), but [`SVGElement::get_computed_style`] needs
/// somewhere to hand the element off to whatever does implement it.
pub trait ComputedStyleProvider {
    /// The resolved style representation this provider produces.
    type Style;

    /// Resolve `element`'s computed style.
    fn computed_style(&self, element: &SVGElement) -> Self::Style;
}

impl std::fmt::Debug for SVGElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SVGElement({:?}, {:?})", self.element_type, self.node.tag_name())
    }
}

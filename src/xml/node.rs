// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `XMLNode`: a cheap, cloneable handle onto one entity in a document's
//! [`Registry`], exposing tree mutation, attribute access, and source-span
//! queries.
//!
//! Every entity created through
//! [`XMLDocument::create_node`](crate::xml::document::XMLDocument::create_node)
//! always carries a [`NodeKind`] and a [`TreeComponent`] (possibly all-null
//! edges); node methods rely on that invariant rather than treating them as
//! optional.

use std::cell::RefCell;
use std::rc::Rc;

use crate::file_offset::FileOffsetRange;
use crate::rcstring::RcString;
use crate::registry::{Entity, Registry};
use crate::xml::components::{
    is_namespace_declaration, AttributeEntry, AttributesComponent, NameComponent, NodeKind,
    SpanComponent, TreeComponent, XMLNamespaceContext, XMLValueComponent,
};
use crate::xml::qualified_name::{XMLQualifiedName, XMLQualifiedNameRef};

/// A [`Registry`] shared between an [`crate::xml::document::XMLDocument`]
/// and every [`XMLNode`] handle created from it.
pub type SharedRegistry = Rc<RefCell<Registry>>;

/// A handle onto one node (of any [`NodeKind`]) in an XML document.
///
/// Cloning an `XMLNode` is cheap: it shares the underlying registry via
/// `Rc<RefCell<_>>` and only copies the entity id.
#[derive(Clone)]
pub struct XMLNode {
    pub(crate) registry: SharedRegistry,
    pub(crate) entity: Entity,
}

impl PartialEq for XMLNode {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity && Rc::ptr_eq(&self.registry, &other.registry)
    }
}
impl Eq for XMLNode {}

impl XMLNode {
    pub(crate) fn new(registry: SharedRegistry, entity: Entity) -> Self {
        XMLNode { registry, entity }
    }

    /// The entity backing this handle. Useful for storing lightweight
    /// references (e.g. in the namespace context) without holding a
    /// full `XMLNode`.
    pub fn entity(&self) -> Entity {
        self.entity
    }

    fn wrap(&self, entity: Entity) -> Option<XMLNode> {
        if entity.is_null() {
            None
        } else {
            Some(XMLNode::new(self.registry.clone(), entity))
        }
    }

    /// This node's kind.
    pub fn kind(&self) -> NodeKind {
        *self.registry.borrow().get::<NodeKind>(self.entity)
    }

    /// The element tag name, or a processing instruction's target. `None`
    /// for node kinds that don't carry a name.
    pub fn tag_name(&self) -> Option<XMLQualifiedName> {
        self.registry.borrow().try_get::<NameComponent>(self.entity).map(|c| c.name.clone())
    }

    /// This node's text value: the literal content for `Data`/`CData`/
    /// `Comment`/`DocType`/`ProcessingInstruction`, or, for an `Element`,
    /// the text of its first `Data` child.
    pub fn value(&self) -> RcString {
        let is_element = {
            let registry = self.registry.borrow();
            if let Some(v) = registry.try_get::<XMLValueComponent>(self.entity) {
                return v.value.clone();
            }
            *registry.get::<NodeKind>(self.entity) == NodeKind::Element
        };
        if is_element {
            if let Some(child) = self.first_child() {
                if child.kind() == NodeKind::Data {
                    return child.value();
                }
            }
        }
        RcString::new()
    }

    /// Overwrite this node's text value. Has no effect on `Element`/
    /// `Document` nodes (which have no direct value component).
    pub fn set_value(&self, value: impl Into<RcString>) {
        let mut registry = self.registry.borrow_mut();
        if registry.has::<XMLValueComponent>(self.entity) {
            registry.emplace(self.entity, XMLValueComponent { value: value.into() });
        }
    }

    /// Record this node's full source span. Used by the parser immediately
    /// after a node is built; not exposed outside the crate since spans are
    /// otherwise append-only bookkeeping the tree mutation API doesn't touch.
    pub(crate) fn set_span(&self, span: FileOffsetRange) {
        self.registry.borrow_mut().emplace(self.entity, SpanComponent { span: Some(span) });
    }

    /// Set the qualified name of an `Element` node, or the target of a
    /// `ProcessingInstruction`. Parser-only.
    pub(crate) fn set_name(&self, name: XMLQualifiedName) {
        self.registry.borrow_mut().emplace(self.entity, NameComponent { name });
    }

    /// Initialize the text value of a freshly created leaf node. Unlike
    /// [`XMLNode::set_value`], this emplaces the component unconditionally,
    /// so it's only meant for the parser's node-construction step.
    pub(crate) fn init_value(&self, value: impl Into<RcString>) {
        self.registry.borrow_mut().emplace(self.entity, XMLValueComponent { value: value.into() });
    }

    /// Set an attribute together with its parser-recorded source spans.
    /// Parser-only; the public [`XMLNode::set_attribute`] always clears the
    /// spans, since a programmatically-set attribute has no source location.
    pub(crate) fn set_attribute_with_span(
        &self,
        name: XMLQualifiedName,
        value: impl Into<RcString>,
        span: Option<FileOffsetRange>,
        value_span: Option<FileOffsetRange>,
    ) {
        let value = value.into();
        {
            let mut registry = self.registry.borrow_mut();
            let mut attrs =
                registry.try_get::<AttributesComponent>(self.entity).cloned().unwrap_or_default();
            attrs.set(AttributeEntry { name: name.clone(), value: value.clone(), span, value_span });
            registry.emplace(self.entity, attrs);
        }
        if is_namespace_declaration(&name) {
            let prefix = if name.prefix.is_empty() { "" } else { name.local.as_str() };
            self.registry.borrow_mut().ctx_mut::<XMLNamespaceContext>().declare(
                self.entity,
                prefix,
                value,
            );
        }
    }

    // -- tree queries --------------------------------------------------

    fn tree(&self) -> TreeComponent {
        *self.registry.borrow().get::<TreeComponent>(self.entity)
    }

    /// This node's parent, if any.
    pub fn parent(&self) -> Option<XMLNode> {
        self.wrap(self.tree().parent)
    }

    /// This node's first child, if any.
    pub fn first_child(&self) -> Option<XMLNode> {
        self.wrap(self.tree().first_child)
    }

    /// This node's last child, if any.
    pub fn last_child(&self) -> Option<XMLNode> {
        self.wrap(self.tree().last_child)
    }

    /// This node's previous sibling, if any.
    pub fn previous_sibling(&self) -> Option<XMLNode> {
        self.wrap(self.tree().previous_sibling)
    }

    /// This node's next sibling, if any.
    pub fn next_sibling(&self) -> Option<XMLNode> {
        self.wrap(self.tree().next_sibling)
    }

    /// Iterate this node's direct children, in document order.
    pub fn children(&self) -> impl Iterator<Item = XMLNode> {
        let mut next = self.first_child();
        std::iter::from_fn(move || {
            let current = next.take();
            if let Some(node) = &current {
                next = node.next_sibling();
            }
            current
        })
    }

    /// Iterate this node and each of its ancestors, nearest first.
    pub fn ancestors_including_self(&self) -> impl Iterator<Item = XMLNode> {
        let mut next = Some(self.clone());
        std::iter::from_fn(move || {
            let current = next.take();
            if let Some(node) = &current {
                next = node.parent();
            }
            current
        })
    }

    /// Depth-first, pre-order iteration over this node and its descendants.
    pub fn descendants(&self) -> impl Iterator<Item = XMLNode> {
        let mut stack = vec![self.clone()];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            let mut children: Vec<XMLNode> = node.children().collect();
            children.reverse();
            stack.extend(children);
            Some(node)
        })
    }

    // -- tree mutation ---------------------------------------------------

    /// Detach `self` from its current parent, if any, clearing its own
    /// tree-edge fields (parent/prev/next; children are left untouched).
    fn detach(&self) {
        let mut registry = self.registry.borrow_mut();
        let tree = *registry.get::<TreeComponent>(self.entity);
        let TreeComponent { parent, previous_sibling: prev, next_sibling: next, .. } = tree;

        if !prev.is_null() {
            registry.get_mut::<TreeComponent>(prev).next_sibling = next;
        }
        if !next.is_null() {
            registry.get_mut::<TreeComponent>(next).previous_sibling = prev;
        }
        if !parent.is_null() {
            let parent_tree = registry.get_mut::<TreeComponent>(parent);
            if parent_tree.first_child == self.entity {
                parent_tree.first_child = next;
            }
            if parent_tree.last_child == self.entity {
                parent_tree.last_child = prev;
            }
        }

        let this_tree = registry.get_mut::<TreeComponent>(self.entity);
        this_tree.parent = Entity::NULL;
        this_tree.previous_sibling = Entity::NULL;
        this_tree.next_sibling = Entity::NULL;
    }

    /// Insert `new` as a child of `self`, immediately before `reference`
    /// (or at the end, if `reference` is `None`).
    ///
    /// If `new` already has a parent, it is detached first.
    ///
    /// # Panics
    /// Panics (in debug builds) if `reference` is `Some` but is not
    /// currently a child of `self`.
    pub fn insert_before(&self, new: &XMLNode, reference: Option<&XMLNode>) {
        debug_assert!(
            reference.map(|r| r.parent().as_ref() == Some(self)).unwrap_or(true),
            "reference is not a child of this node"
        );
        new.detach();

        let mut registry = self.registry.borrow_mut();
        let previous = match reference {
            Some(r) => registry.get::<TreeComponent>(r.entity).previous_sibling,
            None => registry.get::<TreeComponent>(self.entity).last_child,
        };
        let next = reference.map(|r| r.entity).unwrap_or(Entity::NULL);

        {
            let new_tree = registry.get_mut::<TreeComponent>(new.entity);
            new_tree.parent = self.entity;
            new_tree.previous_sibling = previous;
            new_tree.next_sibling = next;
        }

        if !previous.is_null() {
            registry.get_mut::<TreeComponent>(previous).next_sibling = new.entity;
        }
        if !next.is_null() {
            registry.get_mut::<TreeComponent>(next).previous_sibling = new.entity;
        }

        let parent_tree = registry.get_mut::<TreeComponent>(self.entity);
        if previous.is_null() {
            parent_tree.first_child = new.entity;
        }
        if next.is_null() {
            parent_tree.last_child = new.entity;
        }
    }

    /// Append `new` as the last child of `self`. Equivalent to
    /// `insert_before(new, None)`.
    pub fn append_child(&self, new: &XMLNode) {
        self.insert_before(new, None);
    }

    /// Remove `child` from `self`'s children, leaving `child` parentless
    /// (but still a valid, usable handle).
    pub fn remove_child(&self, child: &XMLNode) {
        debug_assert_eq!(child.parent().as_ref(), Some(self), "not a child of this node");
        child.detach();
    }

    /// Replace `old` (a child of `self`) with `new`.
    pub fn replace_child(&self, old: &XMLNode, new: &XMLNode) {
        let next = old.next_sibling();
        old.detach();
        self.insert_before(new, next.as_ref());
    }

    /// Detach this node from its parent (if any). The node's own children
    /// are left intact.
    pub fn remove(&self) {
        self.detach();
    }

    // -- attributes -------------------------------------------------------

    fn with_attributes<R>(&self, f: impl FnOnce(&AttributesComponent) -> R) -> R {
        let registry = self.registry.borrow();
        let empty = AttributesComponent::new();
        let attrs = registry.try_get::<AttributesComponent>(self.entity).unwrap_or(&empty);
        f(attrs)
    }

    /// Set (insert or overwrite) an attribute. Setting `xmlns` or
    /// `xmlns:*` additionally updates the document's namespace context.
    pub fn set_attribute(&self, name: &str, value: impl Into<RcString>) {
        let qname = XMLQualifiedName::parse(name);
        let value = value.into();

        {
            let mut registry = self.registry.borrow_mut();
            let mut attrs = registry
                .try_get::<AttributesComponent>(self.entity)
                .cloned()
                .unwrap_or_default();
            attrs.set(AttributeEntry {
                name: qname.clone(),
                value: value.clone(),
                span: None,
                value_span: None,
            });
            registry.emplace(self.entity, attrs);
        }

        if is_namespace_declaration(&qname) {
            let prefix = if qname.prefix.is_empty() { "" } else { qname.local.as_str() };
            self.registry.borrow_mut().ctx_mut::<XMLNamespaceContext>().declare(
                self.entity,
                prefix,
                value,
            );
        }
    }

    /// Remove an attribute, dropping any namespace binding it implied.
    pub fn remove_attribute(&self, name: &str) {
        let qname = XMLQualifiedName::parse(name);
        let mut registry = self.registry.borrow_mut();
        if let Some(mut attrs) = registry.try_get::<AttributesComponent>(self.entity).cloned() {
            attrs.remove(&qname);
            registry.emplace(self.entity, attrs);
        }
        if is_namespace_declaration(&qname) {
            let prefix = if qname.prefix.is_empty() { "" } else { qname.local.as_str() };
            registry.ctx_mut::<XMLNamespaceContext>().remove_declaration(self.entity, prefix);
        }
    }

    /// Look up an attribute's value by exact (unprefixed) local name.
    pub fn attribute(&self, local_name: &str) -> Option<RcString> {
        self.with_attributes(|attrs| {
            attrs.get(&XMLQualifiedName::local(local_name)).map(|e| e.value.clone())
        })
    }

    /// Returns `true` if an attribute with this local name (no prefix)
    /// exists.
    pub fn has_attribute(&self, local_name: &str) -> bool {
        self.attribute(local_name).is_some()
    }

    /// Find every attribute matching `matcher` (supports a `"*"` namespace
    /// wildcard).
    pub fn find_matching_attributes(&self, matcher: XMLQualifiedNameRef<'_>) -> Vec<AttributeEntry> {
        self.with_attributes(|attrs| attrs.find_matching(matcher).cloned().collect())
    }

    /// Iterate all attributes, in qualified-name order.
    pub fn attributes(&self) -> Vec<AttributeEntry> {
        self.with_attributes(|attrs| attrs.iter().cloned().collect())
    }

    /// Resolve the namespace URI bound to `prefix` at this node, by walking
    /// ancestors (including `self`) nearest-first and consulting the
    /// document's [`XMLNamespaceContext`].
    pub fn namespace_uri(&self, prefix: &str) -> Option<RcString> {
        let ancestors: Vec<Entity> = self.ancestors_including_self().map(|n| n.entity).collect();
        self.registry.borrow().ctx_try_get::<XMLNamespaceContext>()?.resolve(ancestors, prefix).cloned()
    }

    // -- source spans -----------------------------------------------------

    /// This node's full source span, if recorded by the parser.
    pub fn node_location(&self) -> Option<FileOffsetRange> {
        self.registry.borrow().try_get::<SpanComponent>(self.entity).and_then(|c| c.span)
    }

    /// The source span of `name="value"` for one attribute, including an
    /// on-demand re-parse fallback for attributes whose span wasn't stored
    /// (e.g. set programmatically after parsing).
    pub fn attribute_location(&self, local_name: &str, source: &str) -> Option<FileOffsetRange> {
        let qname = XMLQualifiedName::local(local_name);
        if let Some(span) = self.with_attributes(|attrs| attrs.get(&qname).and_then(|e| e.span)) {
            return Some(span);
        }
        let start = self.node_location()?.start.byte_offset? as usize;
        reparse_attribute_span(source, start, &qname)
    }

    /// The source span of this node's value (text, excluding surrounding
    /// delimiters for `Comment`/`CData`/`DocType`/PI bodies).
    pub fn value_location(&self) -> Option<FileOffsetRange> {
        self.registry.borrow().try_get::<SpanComponent>(self.entity).and_then(|c| c.span)
    }
}

impl std::fmt::Debug for XMLNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "XMLNode({:?}, {:?})", self.kind(), self.tag_name())
    }
}

/// Re-run attribute tokenization from `element_start` (the element's
/// recorded span start) to recover the span of `name` when it wasn't
/// stored on the [`crate::xml::components::AttributeEntry`] itself.
pub(crate) fn reparse_attribute_span(
    source: &str,
    element_start: usize,
    name: &XMLQualifiedName,
) -> Option<FileOffsetRange> {
    let bytes = source.as_bytes();
    let mut pos = element_start;
    if bytes.get(pos) != Some(&b'<') {
        return None;
    }
    pos += 1;
    // Skip the tag name.
    while pos < bytes.len() && !is_xml_space(bytes[pos]) && bytes[pos] != b'>' && bytes[pos] != b'/' {
        pos += 1;
    }

    let target = name.to_string();
    loop {
        while pos < bytes.len() && is_xml_space(bytes[pos]) {
            pos += 1;
        }
        if pos >= bytes.len() || bytes[pos] == b'>' || bytes[pos] == b'/' {
            return None;
        }
        let name_start = pos;
        while pos < bytes.len() && bytes[pos] != b'=' && !is_xml_space(bytes[pos]) {
            pos += 1;
        }
        let name_end = pos;
        while pos < bytes.len() && is_xml_space(bytes[pos]) {
            pos += 1;
        }
        if bytes.get(pos) != Some(&b'=') {
            return None;
        }
        pos += 1;
        while pos < bytes.len() && is_xml_space(bytes[pos]) {
            pos += 1;
        }
        let quote = *bytes.get(pos)?;
        if quote != b'"' && quote != b'\'' {
            return None;
        }
        pos += 1;
        while pos < bytes.len() && bytes[pos] != quote {
            pos += 1;
        }
        let attr_end = pos + 1; // past closing quote

        if &source[name_start..name_end] == target.as_str() {
            return Some(FileOffsetRange::from_offsets(name_start as u64, attr_end as u64));
        }
        pos = attr_end;
    }
}

fn is_xml_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

#[cfg(test)]
mod tests {
    use crate::xml::document::XMLDocument;
    use crate::xml::components::NodeKind;

    #[test]
    fn append_and_remove_child_updates_links() {
        let doc = XMLDocument::new();
        let root = doc.root();
        let a = doc.create_node(NodeKind::Element);
        let b = doc.create_node(NodeKind::Element);
        root.append_child(&a);
        root.append_child(&b);

        assert_eq!(root.first_child().unwrap(), a);
        assert_eq!(root.last_child().unwrap(), b);
        assert_eq!(a.next_sibling().unwrap(), b);
        assert_eq!(b.previous_sibling().unwrap(), a);
        assert!(a.previous_sibling().is_none());
        assert!(b.next_sibling().is_none());

        root.remove_child(&a);
        assert_eq!(root.first_child().unwrap(), b);
        assert!(b.previous_sibling().is_none());
        assert!(a.parent().is_none());
    }

    #[test]
    fn insert_before_splices_between_siblings() {
        let doc = XMLDocument::new();
        let root = doc.root();
        let a = doc.create_node(NodeKind::Element);
        let c = doc.create_node(NodeKind::Element);
        root.append_child(&a);
        root.append_child(&c);

        let b = doc.create_node(NodeKind::Element);
        root.insert_before(&b, Some(&c));

        let order: Vec<_> = root.children().collect();
        assert_eq!(order, vec![a, b, c]);
    }

    #[test]
    fn attribute_set_and_namespace_uri_resolution() {
        let doc = XMLDocument::new();
        let root = doc.root();
        let svg = doc.create_node(NodeKind::Element);
        root.append_child(&svg);
        svg.set_attribute("xmlns", "http://www.w3.org/2000/svg");
        svg.set_attribute("id", "x");

        let rect = doc.create_node(NodeKind::Element);
        svg.append_child(&rect);

        assert_eq!(svg.attribute("id").unwrap().as_str(), "x");
        assert_eq!(rect.namespace_uri("").unwrap().as_str(), "http://www.w3.org/2000/svg");
    }

    #[test]
    fn removing_xmlns_drops_namespace_binding() {
        let doc = XMLDocument::new();
        let root = doc.root();
        let svg = doc.create_node(NodeKind::Element);
        root.append_child(&svg);
        svg.set_attribute("xmlns", "http://www.w3.org/2000/svg");
        assert!(svg.namespace_uri("").is_some());
        svg.remove_attribute("xmlns");
        assert!(svg.namespace_uri("").is_none());
    }
}

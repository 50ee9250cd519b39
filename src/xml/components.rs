// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Per-entity components and per-document singleton contexts stored in a
//! [`Registry`](crate::registry::Registry).

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::file_offset::FileOffsetRange;
use crate::rcstring::RcString;
use crate::registry::Entity;
use crate::xml::qualified_name::{XMLQualifiedName, XMLQualifiedNameRef};

/// The kind of an [`crate::xml::node::XMLNode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// The single root node of a document.
    Document,
    /// An element: has a tag name, attributes, and children.
    Element,
    /// Character data (text content).
    Data,
    /// A `<![CDATA[ ... ]]>` section.
    CData,
    /// A `<!-- ... -->` comment.
    Comment,
    /// A `<!DOCTYPE ...>` declaration.
    DocType,
    /// A `<?target body?>` processing instruction.
    ProcessingInstruction,
    /// The `<?xml ...?>` declaration.
    XMLDeclaration,
}

/// Parent/sibling edges for one entity. All four edges use [`Entity::NULL`]
/// as the "no such node" sentinel.
///
/// Invariants: sibling links are symmetric; `first_child`'s
/// `previous_sibling` is null; `last_child`'s `next_sibling` is null; a node
/// appears in exactly one parent's child list.
#[derive(Clone, Copy, Debug, Default)]
pub struct TreeComponent {
    /// The parent entity, or [`Entity::NULL`] if this is the document root.
    pub parent: Entity,
    /// First child, or [`Entity::NULL`] if childless.
    pub first_child: Entity,
    /// Last child, or [`Entity::NULL`] if childless.
    pub last_child: Entity,
    /// Previous sibling, or [`Entity::NULL`] if this is the first child.
    pub previous_sibling: Entity,
    /// Next sibling, or [`Entity::NULL`] if this is the last child.
    pub next_sibling: Entity,
}

/// A single stored attribute: its owning qualified name (kept alongside the
/// map key so call sites can recover it from a reference), its value, and
/// the optional source spans of the attribute token and its value.
#[derive(Clone, Debug)]
pub struct AttributeEntry {
    /// The attribute's qualified name.
    pub name: XMLQualifiedName,
    /// The attribute's (already entity-expanded) value.
    pub value: RcString,
    /// Source span of the full `name="value"` token, if known.
    pub span: Option<FileOffsetRange>,
    /// Source span of the value only (excluding quotes), if known.
    pub value_span: Option<FileOffsetRange>,
}

/// The attribute map of an element, ordered by qualified name.
#[derive(Clone, Debug, Default)]
pub struct AttributesComponent {
    entries: BTreeMap<XMLQualifiedName, AttributeEntry>,
}

impl AttributesComponent {
    /// An empty attribute map.
    pub fn new() -> Self {
        AttributesComponent { entries: BTreeMap::new() }
    }

    /// Insert or overwrite an attribute.
    pub fn set(&mut self, entry: AttributeEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    /// Remove an attribute by qualified name.
    pub fn remove(&mut self, name: &XMLQualifiedName) -> Option<AttributeEntry> {
        self.entries.remove(name)
    }

    /// Look up an attribute by exact qualified name.
    pub fn get(&self, name: &XMLQualifiedName) -> Option<&AttributeEntry> {
        self.entries.get(name)
    }

    /// Iterate attributes in qualified-name order.
    pub fn iter(&self) -> impl Iterator<Item = &AttributeEntry> {
        self.entries.values()
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find every attribute whose qualified name matches `matcher`
    /// (supporting a `"*"` namespace wildcard on the matcher).
    pub fn find_matching<'a>(
        &'a self,
        matcher: XMLQualifiedNameRef<'a>,
    ) -> impl Iterator<Item = &'a AttributeEntry> + 'a {
        self.entries.values().filter(move |e| matcher.matches(&e.name))
    }

    /// Returns `true` if this map declares an `xmlns` or `xmlns:*` attribute
    /// (i.e. would influence namespace resolution for descendants).
    pub fn has_namespace_overrides(&self) -> bool {
        self.entries.keys().any(|name| is_namespace_declaration(name))
    }
}

/// Returns `true` if `name` is `xmlns` (default namespace) or `xmlns:*`
/// (prefixed namespace declaration).
pub fn is_namespace_declaration(name: &XMLQualifiedName) -> bool {
    name.prefix.as_str() == "xmlns" || (name.prefix.is_empty() && name.local.as_str() == "xmlns")
}

/// The text payload of a `Data`, `CData`, `Comment`, or `DocType` node, or
/// the body of a `ProcessingInstruction`. Unused by `Element` and
/// `Document` nodes.
#[derive(Clone, Debug, Default)]
pub struct XMLValueComponent {
    /// The node's text content (already entity-expanded).
    pub value: RcString,
}

/// The qualified name of an `Element` node, or the target of a
/// `ProcessingInstruction` (stored in `local`, with an empty prefix).
#[derive(Clone, Debug)]
pub struct NameComponent {
    /// The element's tag name, or a processing instruction's target.
    pub name: XMLQualifiedName,
}

/// The full and value-only source spans recorded for a node.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpanComponent {
    /// Span covering the whole node (opening through closing tag, for
    /// elements; the full token for leaf nodes).
    pub span: Option<FileOffsetRange>,
}

/// Per-document singleton: the root entity of the document.
#[derive(Clone, Copy, Debug)]
pub struct XMLDocumentContext {
    /// The document's root (`NodeKind::Document`) entity.
    pub root: Entity,
}

/// Per-document singleton: prefix → `(declaring entity, URI)` namespace
/// bindings, queried by walking an entity's ancestors nearest-first.
#[derive(Clone, Debug, Default)]
pub struct XMLNamespaceContext {
    // (declaring entity, prefix, uri), in declaration order.
    declarations: Vec<(Entity, RcString, RcString)>,
}

impl XMLNamespaceContext {
    /// An empty namespace context.
    pub fn new() -> Self {
        XMLNamespaceContext { declarations: Vec::new() }
    }

    /// Record (or update) that `entity` declares `prefix` to resolve to
    /// `uri`. `prefix == ""` is the default namespace.
    pub fn declare(&mut self, entity: Entity, prefix: &str, uri: impl Into<RcString>) {
        let uri = uri.into();
        if let Some(slot) =
            self.declarations.iter_mut().find(|(e, p, _)| *e == entity && p.as_str() == prefix)
        {
            slot.2 = uri;
        } else {
            self.declarations.push((entity, RcString::from(prefix), uri));
        }
    }

    /// Remove a single declaration, e.g. because the declaring `xmlns*`
    /// attribute was removed.
    pub fn remove_declaration(&mut self, entity: Entity, prefix: &str) {
        self.declarations.retain(|(e, p, _)| !(*e == entity && p.as_str() == prefix));
    }

    /// Drop every declaration made by `entity` (called when the entity is
    /// destroyed).
    pub fn remove_entity(&mut self, entity: Entity) {
        self.declarations.retain(|(e, _, _)| *e != entity);
    }

    /// Resolve `prefix` by scanning `ancestors` (expected nearest-first,
    /// i.e. the queried entity itself, then its parent, grandparent, ...)
    /// for the first one that declares it.
    pub fn resolve<I: IntoIterator<Item = Entity>>(&self, ancestors: I, prefix: &str) -> Option<&RcString> {
        for ancestor in ancestors {
            if let Some((_, _, uri)) =
                self.declarations.iter().find(|(e, p, _)| *e == ancestor && p.as_str() == prefix)
            {
                return Some(uri);
            }
        }
        None
    }
}

/// A single `<!ENTITY ...>` declaration from a DOCTYPE internal subset.
#[derive(Clone, Debug)]
pub struct EntityDeclaration {
    /// The entity's replacement text, verbatim from the declaration.
    pub replacement_text: RcString,
    /// `true` if declared with a `SYSTEM`/`PUBLIC` external identifier
    /// (never fetched; its replacement text is the literal reference left
    /// in place when a declaration like this is encountered as a fallback).
    pub is_external: bool,
}

/// Per-document singleton: general (`&name;`) and parameter (`%name;`)
/// entity declarations collected from the DOCTYPE internal subset.
#[derive(Clone, Debug, Default)]
pub struct EntityDeclarationsContext {
    /// General entities, referenced as `&name;` in content/attribute values.
    pub general: HashMap<String, EntityDeclaration>,
    /// Parameter entities, referenced as `%name;`, resolvable only within
    /// the DTD itself.
    pub parameter: HashMap<String, EntityDeclaration>,
}

impl EntityDeclarationsContext {
    /// An empty declarations context.
    pub fn new() -> Self {
        EntityDeclarationsContext { general: HashMap::new(), parameter: HashMap::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_overrides_detected_for_default_and_prefixed() {
        let mut attrs = AttributesComponent::new();
        assert!(!attrs.has_namespace_overrides());
        attrs.set(AttributeEntry {
            name: XMLQualifiedName::local("xmlns"),
            value: RcString::from("http://www.w3.org/2000/svg"),
            span: None,
            value_span: None,
        });
        assert!(attrs.has_namespace_overrides());
    }

    #[test]
    fn namespace_context_resolves_nearest_ancestor_first() {
        let mut ctx = XMLNamespaceContext::new();
        let mut registry = crate::registry::Registry::new();
        let root = registry.create();
        let child = registry.create();
        ctx.declare(root, "", "http://outer");
        ctx.declare(child, "", "http://inner");
        // Nearest-first: child, then root.
        assert_eq!(ctx.resolve(vec![child, root], "").unwrap().as_str(), "http://inner");
        assert_eq!(ctx.resolve(vec![root], "").unwrap().as_str(), "http://outer");
    }

    #[test]
    fn remove_entity_drops_its_declarations() {
        let mut ctx = XMLNamespaceContext::new();
        let mut registry = crate::registry::Registry::new();
        let e = registry.create();
        ctx.declare(e, "svg", "http://www.w3.org/2000/svg");
        ctx.remove_entity(e);
        assert!(ctx.resolve(vec![e], "svg").is_none());
    }

    #[test]
    fn attributes_ordered_by_qualified_name() {
        let mut attrs = AttributesComponent::new();
        for local in ["width", "id", "class"] {
            attrs.set(AttributeEntry {
                name: XMLQualifiedName::local(local),
                value: RcString::from("v"),
                span: None,
                value_span: None,
            });
        }
        let names: Vec<&str> = attrs.iter().map(|e| e.name.local.as_str()).collect();
        assert_eq!(names, vec!["class", "id", "width"]);
    }
}

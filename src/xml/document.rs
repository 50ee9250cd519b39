// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `XMLDocument`: owner of a document's [`Registry`] and root node.

use std::cell::RefCell;
use std::rc::Rc;

use crate::registry::{Entity, Registry};
use crate::xml::components::{
    EntityDeclarationsContext, NodeKind, TreeComponent, XMLDocumentContext, XMLNamespaceContext,
};
use crate::xml::node::{SharedRegistry, XMLNode};

/// A whole XML document: a [`Registry`] of entities/components, shared with
/// every [`XMLNode`] handle produced from it.
pub struct XMLDocument {
    registry: SharedRegistry,
    root: Entity,
}

impl XMLDocument {
    /// Construct a new, empty document with a single `Document`-kind root
    /// node and the per-document singleton contexts already emplaced.
    pub fn new() -> Self {
        let mut registry = Registry::new();
        registry.ctx_emplace(XMLNamespaceContext::new());
        registry.ctx_emplace(EntityDeclarationsContext::new());

        let root = registry.create();
        registry.emplace(root, NodeKind::Document);
        registry.emplace(root, TreeComponent::default());
        registry.ctx_emplace(XMLDocumentContext { root });

        register_namespace_cleanup(&mut registry);

        XMLDocument { registry: Rc::new(RefCell::new(registry)), root }
    }

    /// Rehydrate a document facade from a registry and root entity that
    /// were already fully constructed elsewhere (e.g. by a parser).
    pub(crate) fn from_registry(registry: SharedRegistry, root: Entity) -> Self {
        XMLDocument { registry, root }
    }

    /// The document's root (`NodeKind::Document`) node.
    pub fn root(&self) -> XMLNode {
        XMLNode::new(self.registry.clone(), self.root)
    }

    /// The root entity, for callers (e.g. the parser) that need to stash it
    /// in a context before an [`XMLNode`] facade is convenient to build.
    pub(crate) fn root_entity(&self) -> Entity {
        self.root
    }

    /// The shared registry backing every node in this document.
    pub(crate) fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    /// Create a new, parentless node of the given kind. It is not part of
    /// the tree until attached via [`XMLNode::append_child`] or
    /// [`XMLNode::insert_before`].
    pub fn create_node(&self, kind: NodeKind) -> XMLNode {
        let mut registry = self.registry.borrow_mut();
        let entity = registry.create();
        registry.emplace(entity, kind);
        registry.emplace(entity, TreeComponent::default());
        drop(registry);
        XMLNode::new(self.registry.clone(), entity)
    }

    /// Permanently destroy `node` and its subtree, dropping their
    /// components and pruning any namespace declarations they made.
    ///
    /// The node (and its descendants) must already be detached from the
    /// tree; use [`XMLNode::remove`] first if it has a parent.
    pub fn destroy_subtree(&self, node: &XMLNode) {
        let entities: Vec<Entity> = node.descendants().map(|n| n.entity()).collect();
        let mut registry = self.registry.borrow_mut();
        for entity in entities {
            registry.destroy(entity);
        }
    }
}

impl Default for XMLDocument {
    fn default() -> Self {
        XMLDocument::new()
    }
}

fn register_namespace_cleanup(registry: &mut Registry) {
    registry.on_destroy(|registry, entity| {
        registry.ctx_mut::<XMLNamespaceContext>().remove_entity(entity);
    });
}

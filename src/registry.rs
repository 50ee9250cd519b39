// Copyright 2018 Evgeniy Reizner
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A minimal entity-component store modeled on `entt`'s `registry`/`entity`
//! API: entities are opaque generational ids, components are attached by
//! type, and per-type singleton "contexts" hold document-wide state.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use slab::Slab;

/// Opaque entity id, unique within a [`Registry`] for the lifetime of the
/// slot (a generation counter prevents a reused slot from aliasing a stale
/// handle).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// The null entity, used as a sentinel for "no parent"/"no sibling".
    pub const NULL: Entity = Entity { index: u32::MAX, generation: u32::MAX };

    /// Returns `true` if this is the null sentinel.
    pub fn is_null(&self) -> bool {
        *self == Entity::NULL
    }
}

impl Default for Entity {
    fn default() -> Self {
        Entity::NULL
    }
}

type ComponentMap<T> = HashMap<Entity, T>;

struct ComponentStores {
    stores: HashMap<TypeId, Box<dyn Any>>,
}

impl ComponentStores {
    fn new() -> Self {
        ComponentStores { stores: HashMap::new() }
    }

    fn store_mut<T: 'static>(&mut self) -> &mut ComponentMap<T> {
        self.stores
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentMap::<T>::new()))
            .downcast_mut::<ComponentMap<T>>()
            .expect("component store type mismatch")
    }

    fn store<T: 'static>(&self) -> Option<&ComponentMap<T>> {
        self.stores.get(&TypeId::of::<T>()).and_then(|b| b.downcast_ref::<ComponentMap<T>>())
    }
}

/// Entry point for storing all entity/component/context data for one
/// document. Dropping the `Registry` drops every entity and component it
/// owns.
pub struct Registry {
    slots: Slab<()>,
    generations: Vec<u32>,
    components: ComponentStores,
    contexts: HashMap<TypeId, Box<dyn Any>>,
    destroy_subscribers: Vec<Box<dyn FnMut(&mut Registry, Entity)>>,
}

impl Registry {
    /// Construct an empty registry.
    pub fn new() -> Self {
        Registry {
            slots: Slab::new(),
            generations: Vec::new(),
            components: ComponentStores::new(),
            contexts: HashMap::new(),
            destroy_subscribers: Vec::new(),
        }
    }

    /// Create a new, unique entity.
    pub fn create(&mut self) -> Entity {
        let index = self.slots.insert(()) as u32;
        if index as usize >= self.generations.len() {
            self.generations.push(0);
        }
        let generation = self.generations[index as usize];
        Entity { index, generation }
    }

    fn slot_generation(&self, entity: Entity) -> Option<u32> {
        if self.slots.contains(entity.index as usize) {
            self.generations.get(entity.index as usize).copied()
        } else {
            None
        }
    }

    /// Returns `true` if `entity` refers to a live slot in this registry.
    pub fn is_valid(&self, entity: Entity) -> bool {
        self.slot_generation(entity) == Some(entity.generation)
    }

    /// Attach or replace component `T` on `entity`.
    pub fn emplace<T: 'static>(&mut self, entity: Entity, value: T) {
        self.components.store_mut::<T>().insert(entity, value);
    }

    /// Borrow component `T` on `entity`.
    ///
    /// # Panics
    /// Panics if `entity` does not have a `T` component.
    pub fn get<T: 'static>(&self, entity: Entity) -> &T {
        self.try_get::<T>(entity).expect("entity missing required component")
    }

    /// Mutably borrow component `T` on `entity`.
    ///
    /// # Panics
    /// Panics if `entity` does not have a `T` component.
    pub fn get_mut<T: 'static>(&mut self, entity: Entity) -> &mut T {
        self.try_get_mut::<T>(entity).expect("entity missing required component")
    }

    /// Borrow component `T` on `entity`, if present.
    pub fn try_get<T: 'static>(&self, entity: Entity) -> Option<&T> {
        self.components.store::<T>().and_then(|m| m.get(&entity))
    }

    /// Mutably borrow component `T` on `entity`, if present.
    pub fn try_get_mut<T: 'static>(&mut self, entity: Entity) -> Option<&mut T> {
        self.components.store_mut::<T>().get_mut(&entity)
    }

    /// Detach component `T` from `entity`, if present.
    pub fn remove<T: 'static>(&mut self, entity: Entity) -> Option<T> {
        self.components.store_mut::<T>().remove(&entity)
    }

    /// Returns `true` if `entity` has a `T` component.
    pub fn has<T: 'static>(&self, entity: Entity) -> bool {
        self.try_get::<T>(entity).is_some()
    }

    /// Register a callback invoked whenever an entity is destroyed, with
    /// access to the registry *before* that entity's components are swept.
    pub fn on_destroy(&mut self, callback: impl FnMut(&mut Registry, Entity) + 'static) {
        self.destroy_subscribers.push(Box::new(callback));
    }

    /// Destroy `entity`: invoke destroy subscribers, then free its slot.
    /// Component storage for this entity is left to be cleaned up by
    /// callers who know the concrete component types involved (mirroring
    /// `entt`'s per-pool `on_destroy` sweep); this crate's `XMLNode::remove`
    /// path removes `TreeComponent`/`AttributesComponent`/`XMLValueComponent`
    /// explicitly before calling `destroy`.
    pub fn destroy(&mut self, entity: Entity) {
        let mut subscribers = std::mem::take(&mut self.destroy_subscribers);
        for subscriber in subscribers.iter_mut() {
            subscriber(self, entity);
        }
        self.destroy_subscribers = subscribers;

        if self.slot_generation(entity) == Some(entity.generation) {
            self.slots.remove(entity.index as usize);
            self.generations[entity.index as usize] = entity.generation.wrapping_add(1);
        }
    }

    /// Access (creating if absent) the singleton context of type `T`.
    pub fn ctx_emplace<T: 'static>(&mut self, value: T) -> &mut T {
        self.contexts.insert(TypeId::of::<T>(), Box::new(value));
        self.ctx_get_mut::<T>().unwrap()
    }

    /// Borrow the singleton context of type `T`.
    ///
    /// # Panics
    /// Panics if no context of type `T` has been emplaced.
    pub fn ctx<T: 'static>(&self) -> &T {
        self.ctx_try_get::<T>().expect("context not registered")
    }

    /// Mutably borrow the singleton context of type `T`.
    ///
    /// # Panics
    /// Panics if no context of type `T` has been emplaced.
    pub fn ctx_mut<T: 'static>(&mut self) -> &mut T {
        self.ctx_get_mut::<T>().expect("context not registered")
    }

    /// Borrow the singleton context of type `T`, if present.
    pub fn ctx_try_get<T: 'static>(&self) -> Option<&T> {
        self.contexts.get(&TypeId::of::<T>()).and_then(|b| b.downcast_ref::<T>())
    }

    fn ctx_get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.contexts.get_mut(&TypeId::of::<T>()).and_then(|b| b.downcast_mut::<T>())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

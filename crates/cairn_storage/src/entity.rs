//! Entity records and the borrowed handles used to reach them.
//!
//! A record owns its components outright. [`EntityRef`] and [`EntityMut`]
//! borrow the store, so no structural mutation (create, kill, reset,
//! reorder) can happen while one is alive.

use std::any::{Any, type_name};
use std::fmt;

use cairn_foundation::{Component, ComponentTag, Entity, EntityId, Error, Result};
use tracing::debug;

use crate::config::DuplicatePolicy;
use crate::registry::ComponentRegistry;
use crate::store::StoreState;

/// One entity: its identity and the components it owns.
pub(crate) struct EntityRecord {
    pub(crate) id: EntityId,
    /// Components in assignment order.
    pub(crate) components: Vec<(ComponentTag, Box<dyn Any>)>,
}

impl EntityRecord {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            components: Vec::new(),
        }
    }

    pub(crate) fn has_tag(&self, tag: ComponentTag) -> bool {
        self.components.iter().any(|(t, _)| *t == tag)
    }

    fn slot(&self, tag: ComponentTag) -> Option<usize> {
        self.components.iter().position(|(t, _)| *t == tag)
    }

    fn get<C: Component>(&self, tag: ComponentTag) -> Option<&C> {
        let index = self.slot(tag)?;
        self.components[index].1.downcast_ref::<C>()
    }

    fn get_mut<C: Component>(&mut self, tag: ComponentTag) -> Option<&mut C> {
        let index = self.slot(tag)?;
        self.components[index].1.downcast_mut::<C>()
    }
}

impl PartialEq for EntityRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for EntityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRecord")
            .field("id", &self.id)
            .field(
                "components",
                &self.components.iter().map(|(t, _)| t).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// "Assigning `trigger` implies `tag`" rule registered on a store.
#[derive(Clone, Debug)]
pub(crate) struct Dependency {
    pub(crate) trigger: ComponentTag,
    pub(crate) tag: ComponentTag,
    pub(crate) make: fn() -> Box<dyn Any>,
}

pub(crate) fn make_default<C: Component + Default>() -> Box<dyn Any> {
    Box::new(C::default())
}

/// Adds every component implied by `assigned` that the record lacks,
/// following chains until nothing new is added.
fn apply_dependencies(
    record: &mut EntityRecord,
    dependencies: &[Dependency],
    registry: &ComponentRegistry,
    assigned: ComponentTag,
) {
    let mut pending = vec![assigned];
    while let Some(trigger) = pending.pop() {
        for dep in dependencies.iter().filter(|d| d.trigger == trigger) {
            if record.has_tag(dep.tag) {
                continue;
            }
            debug!(
                entity = %record.id,
                component = registry.name(dep.tag).unwrap_or("?"),
                "assigning dependent component"
            );
            record.components.push((dep.tag, (dep.make)()));
            pending.push(dep.tag);
        }
    }
}

/// Read-only handle to an entity record.
#[derive(Clone, Copy)]
pub struct EntityRef<'a> {
    position: usize,
    record: &'a EntityRecord,
    registry: &'a ComponentRegistry,
}

impl<'a> EntityRef<'a> {
    pub(crate) fn new(
        position: usize,
        record: &'a EntityRecord,
        registry: &'a ComponentRegistry,
    ) -> Self {
        Self {
            position,
            record,
            registry,
        }
    }

    /// Returns the entity's identity.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.record.id
    }

    /// Returns a detached handle to this entity.
    #[must_use]
    pub fn handle(&self) -> Entity {
        Entity::new(self.position, self.record.id)
    }

    /// Returns true if the entity holds a `C`.
    #[must_use]
    pub fn has<C: Component>(&self) -> bool {
        self.registry
            .tag_of::<C>()
            .is_some_and(|tag| self.record.has_tag(tag))
    }

    /// Returns the entity's `C`, if present.
    #[must_use]
    pub fn get<C: Component>(&self) -> Option<&'a C> {
        let record: &'a EntityRecord = self.record;
        record.get(self.registry.tag_of::<C>()?)
    }

    /// Returns the entity's `C`, or an error naming the missing type.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` if the entity has no `C`.
    pub fn require<C: Component>(&self) -> Result<&'a C> {
        self.get::<C>()
            .ok_or_else(|| Error::component_not_found(self.handle(), type_name::<C>()))
    }

    /// Returns the number of component records the entity owns.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.record.components.len()
    }

    /// Returns the tags of the entity's components in assignment order.
    #[must_use]
    pub fn component_tags(&self) -> Vec<ComponentTag> {
        self.record.components.iter().map(|(t, _)| *t).collect()
    }
}

impl fmt::Debug for EntityRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRef")
            .field("handle", &self.handle())
            .field("components", &self.component_tags())
            .finish()
    }
}

/// Mutable handle to an entity record.
///
/// Handed to query visitors and returned by `create`. Component changes
/// made through it invalidate the store's query sort memo.
pub struct EntityMut<'a> {
    position: usize,
    record: &'a mut EntityRecord,
    state: &'a mut StoreState,
}

impl<'a> EntityMut<'a> {
    pub(crate) fn new(
        position: usize,
        record: &'a mut EntityRecord,
        state: &'a mut StoreState,
    ) -> Self {
        Self {
            position,
            record,
            state,
        }
    }

    /// Returns the entity's identity.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.record.id
    }

    /// Returns a detached handle to this entity.
    #[must_use]
    pub fn handle(&self) -> Entity {
        Entity::new(self.position, self.record.id)
    }

    /// Reborrows this handle as read-only.
    #[must_use]
    pub fn view(&self) -> EntityRef<'_> {
        EntityRef::new(self.position, self.record, &self.state.registry)
    }

    /// Stores `value` on the entity and returns a reference to it.
    ///
    /// With [`DuplicatePolicy::Replace`] an existing `C` is overwritten in
    /// place; with [`DuplicatePolicy::Append`] a second record is added and
    /// later type lookups keep returning the first. Components that `C`
    /// implies through store dependencies are added if missing.
    ///
    /// # Panics
    ///
    /// Panics if the slot just written no longer holds a `C`, which would
    /// mean the record's tags and values disagree.
    pub fn assign<C: Component>(&mut self, value: C) -> &mut C {
        let tag = self.state.registry.register::<C>();
        self.state.touch();

        let existing = match self.state.duplicates {
            DuplicatePolicy::Replace => self.record.slot(tag),
            DuplicatePolicy::Append => None,
        };
        let index = if let Some(index) = existing {
            self.record.components[index].1 = Box::new(value);
            index
        } else {
            self.record.components.push((tag, Box::new(value)));
            self.record.components.len() - 1
        };

        apply_dependencies(
            self.record,
            &self.state.dependencies,
            &self.state.registry,
            tag,
        );

        self.record.components[index]
            .1
            .downcast_mut::<C>()
            .expect("component slot holds the type it was tagged with")
    }

    /// Stores a default `C` on the entity.
    pub fn assign_default<C: Component + Default>(&mut self) -> &mut C {
        self.assign(C::default())
    }

    /// Removes the entity's first `C` and returns it. No-op if absent.
    pub fn remove<C: Component>(&mut self) -> Option<C> {
        let tag = self.state.registry.tag_of::<C>()?;
        let index = self.record.slot(tag)?;
        let (_, value) = self.record.components.remove(index);
        self.state.touch();
        value.downcast::<C>().ok().map(|boxed| *boxed)
    }

    /// Returns true if the entity holds a `C`.
    #[must_use]
    pub fn has<C: Component>(&self) -> bool {
        self.state
            .registry
            .tag_of::<C>()
            .is_some_and(|tag| self.record.has_tag(tag))
    }

    /// Returns the entity's `C`, if present.
    #[must_use]
    pub fn get<C: Component>(&self) -> Option<&C> {
        self.record.get(self.state.registry.tag_of::<C>()?)
    }

    /// Returns the entity's `C` for in-place mutation, if present.
    pub fn component<C: Component>(&mut self) -> Option<&mut C> {
        let tag = self.state.registry.tag_of::<C>()?;
        self.record.get_mut(tag)
    }

    /// Returns the entity's `C` for mutation, or an error naming the type.
    ///
    /// # Errors
    ///
    /// Returns `ComponentNotFound` if the entity has no `C`.
    pub fn require<C: Component>(&mut self) -> Result<&mut C> {
        let handle = self.handle();
        self.component::<C>()
            .ok_or_else(|| Error::component_not_found(handle, type_name::<C>()))
    }

    /// Returns mutable references to two different component types at once.
    ///
    /// Returns `None` if either is missing or `A` and `B` are the same type.
    pub fn components_mut2<A: Component, B: Component>(&mut self) -> Option<(&mut A, &mut B)> {
        let a_tag = self.state.registry.tag_of::<A>()?;
        let b_tag = self.state.registry.tag_of::<B>()?;
        if a_tag == b_tag {
            return None;
        }

        let mut a = None;
        let mut b = None;
        for (tag, value) in &mut self.record.components {
            if *tag == a_tag && a.is_none() {
                a = Some(value);
            } else if *tag == b_tag && b.is_none() {
                b = Some(value);
            }
        }
        Some((a?.downcast_mut::<A>()?, b?.downcast_mut::<B>()?))
    }

    /// Returns the number of component records the entity owns.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.record.components.len()
    }

    /// Returns the tags of the entity's components in assignment order.
    #[must_use]
    pub fn component_tags(&self) -> Vec<ComponentTag> {
        self.record.components.iter().map(|(t, _)| *t).collect()
    }
}

impl fmt::Debug for EntityMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMut")
            .field("handle", &self.handle())
            .field("components", &self.component_tags())
            .finish()
    }
}

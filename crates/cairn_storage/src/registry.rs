//! Component type registration.
//!
//! Every component type seen by a store is assigned a [`ComponentTag`]
//! in first-seen order. Tags are plain indices, so lookups never depend
//! on hashing the type itself.

use std::any::{TypeId, type_name};
use std::collections::HashMap;

use cairn_foundation::{Component, ComponentTag};

/// Maps component types to tags and back to their names.
///
/// Not thread-safe; each store owns its own registry.
#[derive(Clone, Debug, Default)]
pub struct ComponentRegistry {
    /// Tag for each registered type.
    tags: HashMap<TypeId, ComponentTag>,
    /// Type names, indexed by tag.
    names: Vec<&'static str>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tag for `C`, assigning the next free one on first use.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` component types are registered.
    pub fn register<C: Component>(&mut self) -> ComponentTag {
        let id = TypeId::of::<C>();
        if let Some(&tag) = self.tags.get(&id) {
            return tag;
        }

        let index = u32::try_from(self.names.len()).expect("too many component types");
        let tag = ComponentTag::new(index);
        self.names.push(type_name::<C>());
        self.tags.insert(id, tag);
        tag
    }

    /// Returns the tag for `C` if it has been registered.
    #[must_use]
    pub fn tag_of<C: Component>(&self) -> Option<ComponentTag> {
        self.tags.get(&TypeId::of::<C>()).copied()
    }

    /// Returns the type name registered under `tag`.
    #[must_use]
    pub fn name(&self, tag: ComponentTag) -> Option<&'static str> {
        self.names.get(tag.index() as usize).copied()
    }

    /// Returns the number of registered component types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no component type has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over `(tag, type name)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentTag, &'static str)> + '_ {
        (0u32..)
            .zip(self.names.iter())
            .map(|(index, name)| (ComponentTag::new(index), *name))
    }
}

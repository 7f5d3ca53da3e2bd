//! The component capability and component tags.

use std::fmt;

/// Capability marker for component types.
///
/// Anything stored on an entity must implement this trait. The engine
/// places no constraints on a component's fields; it only needs to own
/// the value and recover its concrete type.
///
/// ```
/// use cairn_foundation::Component;
///
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// impl Component for Position {}
/// ```
pub trait Component: 'static {}

/// Key identifying one component type within a store.
///
/// Tags are small integers handed out by a registry in first-seen order.
/// They are stable for the life of the registry that assigned them and
/// are never hashes, so two distinct types cannot collide.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ComponentTag(u32);

impl ComponentTag {
    /// Creates a tag from its raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index of this tag.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ComponentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentTag({})", self.0)
    }
}

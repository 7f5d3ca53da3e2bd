//! Entity identities and detached handles.

use std::fmt;

/// Serial entity identity.
///
/// Ids are minted from a counter owned by the entity store and increase
/// strictly for the whole life of that store, including across resets.
/// An id is never reused, so it doubles as the generation check for
/// detached [`Entity`] handles.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an entity id from its raw serial.
    #[must_use]
    pub const fn new(serial: u64) -> Self {
        Self(serial)
    }

    /// Returns the raw serial of this id.
    #[must_use]
    pub const fn serial(self) -> u64 {
        self.0
    }

    /// Returns a sentinel value representing "no entity".
    ///
    /// This uses `u64::MAX`, which a store never mints.
    #[must_use]
    pub const fn null() -> Self {
        Self(u64::MAX)
    }

    /// Returns true if this is the null sentinel value.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "EntityId(null)")
        } else {
            write!(f, "EntityId({})", self.0)
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Entity(null)")
        } else {
            write!(f, "Entity({})", self.0)
        }
    }
}

/// Detached handle to an entity record.
///
/// A handle remembers where the record sat when the handle was issued and
/// which identity it carried. Stores validate both on every use: kills,
/// resets, and query-triggered reorders move records, after which the
/// handle is reported stale instead of silently resolving to a different
/// entity.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Entity {
    /// Position of the record in the store's sequence when issued.
    pub position: usize,
    /// Identity of the record the handle refers to.
    pub id: EntityId,
}

impl Entity {
    /// Creates a handle for the record at `position` carrying `id`.
    #[must_use]
    pub const fn new(position: usize, id: EntityId) -> Self {
        Self { position, id }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}@{})", self.id.0, self.position)
    }
}

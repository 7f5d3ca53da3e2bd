//! Configuration for entity stores.

/// What `assign` does when the entity already holds the component type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Overwrite the existing value in place. Reads see the last assignment.
    #[default]
    Replace,
    /// Append a second record of the same type. Type lookups keep
    /// returning the first one, so the appended value is owned but
    /// unreachable by type.
    Append,
}

/// Configuration for an [`EntityStore`](crate::EntityStore).
///
/// Controls query sort gating, duplicate assignment, and preallocation.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Stores at or above this many records skip the query sort and fall
    /// back to a full filtered scan. `0` disables sorting entirely.
    pub sort_threshold: usize,

    /// Behavior of `assign` for a component type already present.
    pub duplicates: DuplicatePolicy,

    /// Records to reserve room for up front.
    pub initial_capacity: usize,
}

impl StoreConfig {
    /// Default size gate for the query sort.
    pub const DEFAULT_SORT_THRESHOLD: usize = 65_536;

    /// Creates a configuration that never reorders records.
    #[must_use]
    pub fn unsorted() -> Self {
        Self {
            sort_threshold: 0,
            ..Self::default()
        }
    }

    /// Creates a configuration with append-on-duplicate assignment.
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            duplicates: DuplicatePolicy::Append,
            ..Self::default()
        }
    }

    /// Builder method to set the sort threshold.
    #[must_use]
    pub fn with_sort_threshold(mut self, threshold: usize) -> Self {
        self.sort_threshold = threshold;
        self
    }

    /// Builder method to set the duplicate policy.
    #[must_use]
    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Builder method to set the initial capacity.
    #[must_use]
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sort_threshold: Self::DEFAULT_SORT_THRESHOLD,
            duplicates: DuplicatePolicy::Replace,
            initial_capacity: 0,
        }
    }
}

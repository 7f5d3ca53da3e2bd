//! Cairn - Entity-component store with partition-sorted queries
//!
//! This crate re-exports all layers of the Cairn system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: cairn_engine      — Systems, system registry, tick scheduling
//! Layer 1: cairn_storage     — Entity store, handles, queries
//! Layer 0: cairn_foundation  — Core types (EntityId, Entity, ComponentTag, Error)
//! ```

pub use cairn_engine as engine;
pub use cairn_foundation as foundation;
pub use cairn_storage as storage;

/// Commonly used items from every layer.
pub mod prelude {
    pub use cairn_engine::{DeltaTime, Scheduler, System, SystemRegistry};
    pub use cairn_foundation::{Component, ComponentTag, Entity, EntityId, Error, ErrorKind, Result};
    pub use cairn_storage::{
        ComponentSet, DuplicatePolicy, EntityMut, EntityRef, EntityStore, StoreConfig,
    };
}

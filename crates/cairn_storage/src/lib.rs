//! Entity store, component handles, and partition-sorted queries for Cairn.
//!
//! This crate provides:
//! - [`EntityStore`] - Ordered entity records with serial identities
//! - [`EntityRef`] / [`EntityMut`] - Borrowed handles for component access
//! - [`ComponentRegistry`] - Type to [`ComponentTag`] assignment
//! - [`ComponentSet`] - Tuples of component types used as query filters
//! - [`StoreConfig`] - Sort gating and duplicate-assignment policy
//!
//! [`ComponentTag`]: cairn_foundation::ComponentTag

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod entity;
pub mod query;
pub mod registry;
pub mod store;

pub use config::{DuplicatePolicy, StoreConfig};
pub use entity::{EntityMut, EntityRef};
pub use query::{ComponentSet, SortStats};
pub use registry::ComponentRegistry;
pub use store::EntityStore;

//! Systems, system registry, and tick scheduling for Cairn.
//!
//! This crate provides:
//! - [`System`] - Per-tick update logic run against an entity store
//! - [`SystemRegistry`] - One instance per system type, first registration wins
//! - [`Scheduler`] - Owns a store and drives its systems tick by tick

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod scheduler;
pub mod system;

pub use scheduler::Scheduler;
pub use system::{DeltaTime, System, SystemRegistry};

//! Core identifiers, component tags, and errors for Cairn.
//!
//! This crate provides:
//! - [`EntityId`] - Serial entity identities that are never reused
//! - [`Entity`] - Detached, validated handles into an entity store
//! - [`Component`] and [`ComponentTag`] - The component capability and its key
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod component;
pub mod entity;
pub mod error;

pub use component::{Component, ComponentTag};
pub use entity::{Entity, EntityId};
pub use error::{Error, ErrorContext, ErrorKind, Result};

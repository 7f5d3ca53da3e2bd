//! Query filters and the partition sort that accelerates them.
//!
//! A query names a tuple of component types. The first type is the *lead*:
//! before scanning, the store may stably partition its records so every
//! holder of the lead sits at the front. While that partition is known to
//! be intact, a scan can stop at the first record without the lead. Every
//! visited record is still checked against the whole set, so the sort only
//! ever shortens the scan; it never changes which entities are visited.
//!
//! Only one partition is remembered. Sorting on one lead breaks the prefix
//! of any other, so queries that alternate leads re-sort every time: a
//! tick running several systems with different leads pays one sort per
//! system. Ordering work so consecutive queries share a lead keeps that
//! cost down.

use std::any::type_name;

use cairn_foundation::{Component, ComponentTag};

use crate::registry::ComponentRegistry;

/// A non-empty set of component types used as a query filter.
///
/// Implemented for tuples of one to eight component types:
///
/// ```ignore
/// store.for_each_with::<(Position,)>(|e| { /* ... */ });
/// store.for_each_with::<(Position, Velocity)>(|e| { /* ... */ });
/// ```
pub trait ComponentSet: 'static {
    /// Resolves the tags of every type in the set, lead first.
    ///
    /// Returns `None` if any type was never registered, in which case no
    /// entity can match.
    fn tags(registry: &ComponentRegistry) -> Option<Vec<ComponentTag>>;

    /// Type names of the set, lead first.
    fn names() -> Vec<&'static str>;
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            fn tags(registry: &ComponentRegistry) -> Option<Vec<ComponentTag>> {
                Some(vec![$(registry.tag_of::<$name>()?),+])
            }

            fn names() -> Vec<&'static str> {
                vec![$(type_name::<$name>()),+]
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);

/// Counters for the query sort gate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SortStats {
    /// Queries that reordered the store.
    pub sorts: u64,
    /// Queries that reused a still-valid partition.
    pub skipped_memo: u64,
    /// Queries that skipped sorting because the store was too large.
    pub skipped_threshold: u64,
}

/// Which lead tag the records are currently partitioned on, and at what
/// structure version. One slot is enough: any sort bumps the version, so
/// at most one partition can be current.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SortMemo {
    partitioned: Option<(ComponentTag, u64)>,
}

impl SortMemo {
    pub(crate) fn is_current(&self, lead: ComponentTag, version: u64) -> bool {
        self.partitioned == Some((lead, version))
    }

    pub(crate) fn record(&mut self, lead: ComponentTag, version: u64) {
        self.partitioned = Some((lead, version));
    }

    pub(crate) fn clear(&mut self) {
        self.partitioned = None;
    }
}

//! Integration tests for filtered iteration
//!
//! Tests single- and multi-component queries, the partition sort, and
//! its gating.

use std::collections::BTreeSet;

use cairn_foundation::EntityId;
use cairn_storage::{EntityStore, StoreConfig};

use crate::{Comflabulation, Position, Velocity};

fn ids_with<F: Fn(&cairn_storage::EntityRef<'_>) -> bool>(
    store: &EntityStore,
    pred: F,
) -> BTreeSet<EntityId> {
    store.iter().filter(|e| pred(e)).map(|e| e.id()).collect()
}

// =============================================================================
// Single Component
// =============================================================================

#[test]
fn query_visits_only_holders() {
    let mut store = EntityStore::new();
    store.spawn();
    store.spawn();
    let third = store.create().assign(Position { x: 1.0, y: 3.0 }).x;
    store.spawn();
    store.create().assign(Position { x: 99.0, y: 0.0 });
    assert_eq!(third, 1.0);

    let mut count = 0;
    store.for_each_with::<(Position,)>(|e| {
        assert!(e.has::<Position>());
        count += 1;
    });

    assert_eq!(count, 2);
}

#[test]
fn query_on_empty_store_visits_nothing() {
    let mut store = EntityStore::new();
    assert_eq!(store.count_with::<(Position,)>(), 0);
}

#[test]
fn query_twice_yields_same_order() {
    let mut store = EntityStore::new();
    for i in 0..20 {
        let mut e = store.create();
        if i % 4 != 0 {
            e.assign(Position::default());
        }
    }

    let mut first = Vec::new();
    store.for_each_with::<(Position,)>(|e| first.push(e.id()));
    let mut second = Vec::new();
    store.for_each_with::<(Position,)>(|e| second.push(e.id()));

    assert_eq!(first.len(), 15);
    assert_eq!(first, second);
}

#[test]
fn in_place_updates_from_query() {
    let mut store = EntityStore::new();
    for i in (0..100u8).rev() {
        let v = f32::from(i);
        store.create().assign(Position { x: v, y: v });
    }

    store.for_each_with::<(Position,)>(|mut e| {
        if let Some(pos) = e.component::<Position>() {
            pos.x += 5.0;
            pos.y -= 5.0;
        }
    });

    let min_x = store
        .iter()
        .filter_map(|e| e.get::<Position>().map(|p| p.x))
        .fold(f32::INFINITY, f32::min);
    assert_eq!(min_x, 5.0);
}

// =============================================================================
// Multiple Components
// =============================================================================

#[test]
fn pair_query_is_intersection_of_singles() {
    let mut store = EntityStore::new();
    for i in 0..30 {
        let mut e = store.create();
        if i % 2 == 0 {
            e.assign(Position::default());
        }
        if i % 5 == 0 {
            e.assign(Velocity::default());
        }
        if i % 3 == 0 {
            e.assign(Comflabulation::default());
        }
    }

    let pos: BTreeSet<_> = store.query::<(Position,)>().iter().map(|h| h.id).collect();
    let vel: BTreeSet<_> = store.query::<(Velocity,)>().iter().map(|h| h.id).collect();
    let both: BTreeSet<_> = store
        .query::<(Position, Velocity)>()
        .iter()
        .map(|h| h.id)
        .collect();
    let reversed: BTreeSet<_> = store
        .query::<(Velocity, Position)>()
        .iter()
        .map(|h| h.id)
        .collect();

    let expected: BTreeSet<_> = pos.intersection(&vel).copied().collect();
    assert_eq!(both, expected);
    assert_eq!(reversed, expected);
    assert_eq!(both.len(), 3);
}

#[test]
fn triple_query_matches_membership() {
    let mut store = EntityStore::new();
    for i in 0..30 {
        let mut e = store.create();
        if i % 2 == 0 {
            e.assign(Position::default());
        }
        if i % 3 == 0 {
            e.assign(Velocity::default());
        }
        if i % 5 == 0 {
            e.assign(Comflabulation::default());
        }
    }

    let expected = ids_with(&store, |e| {
        e.has::<Position>() && e.has::<Velocity>() && e.has::<Comflabulation>()
    });
    let found: BTreeSet<_> = store
        .query::<(Comflabulation, Position, Velocity)>()
        .iter()
        .map(|h| h.id)
        .collect();

    assert_eq!(found, expected);
    assert_eq!(found.len(), 1);
}

#[test]
fn pair_query_with_leading_non_matches() {
    let mut store = EntityStore::new();
    // Lead holders without the second component come first after sorting.
    for _ in 0..3 {
        store.create().assign(Position::default());
    }
    let mut e = store.create();
    e.assign(Position::default());
    e.assign(Velocity::default());
    store.create().assign(Velocity::default());

    assert_eq!(store.count_with::<(Position, Velocity)>(), 1);
}

// =============================================================================
// Sort Gating
// =============================================================================

#[test]
fn sort_moves_holders_to_front() {
    let mut store = EntityStore::new();
    for i in 0..10 {
        let mut e = store.create();
        if i >= 7 {
            e.assign(Velocity::default());
        }
    }

    store.for_each_with::<(Velocity,)>(|_| {});

    let flags: Vec<_> = store.iter().map(|e| e.has::<Velocity>()).collect();
    assert_eq!(&flags[..3], &[true, true, true]);
    assert!(flags[3..].iter().all(|f| !f));
}

#[test]
fn sort_memo_is_invalidated_by_kill_and_create() {
    let mut store = EntityStore::new();
    for _ in 0..4 {
        store.create().assign(Position::default());
    }
    store.count_with::<(Position,)>();

    // Kill one and create one: size is unchanged.
    let first = store.find(store.ids().next().unwrap()).unwrap();
    store.kill(first).unwrap();
    store.spawn();

    assert_eq!(store.count_with::<(Position,)>(), 3);
    assert_eq!(store.stats().sorts, 2);
}

#[test]
fn alternating_leads_resort() {
    let mut store = EntityStore::new();
    for i in 0..6 {
        let mut e = store.create();
        if i % 2 == 0 {
            e.assign(Position::default());
        } else {
            e.assign(Velocity::default());
        }
    }

    for _ in 0..5 {
        assert_eq!(store.count_with::<(Position,)>(), 3);
        assert_eq!(store.count_with::<(Velocity,)>(), 3);
    }

    let stats = store.stats();
    assert_eq!(stats.sorts, 10);
    assert_eq!(stats.skipped_memo, 0);
}

#[test]
fn unsorted_store_keeps_insertion_order() {
    let mut store = EntityStore::with_config(StoreConfig::unsorted());
    let mut order = Vec::new();
    for i in 0..6 {
        let mut e = store.create();
        if i % 2 == 1 {
            e.assign(Position::default());
        }
        order.push(e.id());
    }

    assert_eq!(store.count_with::<(Position,)>(), 3);
    assert_eq!(store.ids().collect::<Vec<_>>(), order);
    assert_eq!(store.stats().sorts, 0);
}

#[test]
fn large_store_falls_back_to_full_scan() {
    let mut store = EntityStore::with_config(StoreConfig::default().with_sort_threshold(100));
    for i in 0..150 {
        let mut e = store.create();
        if i % 10 == 9 {
            e.assign(Position::default());
        }
    }

    assert_eq!(store.count_with::<(Position,)>(), 15);
    assert_eq!(store.stats().skipped_threshold, 1);
}

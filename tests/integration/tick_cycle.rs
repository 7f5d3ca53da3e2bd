//! Tick cycle integration tests
//!
//! Drives a small movement and comflabulation workload through the
//! scheduler and checks the store afterwards.

use cairn::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}
impl Component for Position {}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Velocity {
    x: f32,
    y: f32,
}
impl Component for Velocity {}

#[derive(Debug, Default, Clone, PartialEq)]
struct Comflabulation {
    thingy: f32,
    dingy: i32,
    mingy: bool,
    stringy: String,
}
impl Component for Comflabulation {}

struct UnusedMarker;
impl Component for UnusedMarker {}

struct MovementSystem;

impl System for MovementSystem {
    fn update(&mut self, store: &mut EntityStore, dt: DeltaTime) {
        #[allow(clippy::cast_precision_loss)]
        let dt = dt as f32;
        store.for_each_with::<(Position, Velocity)>(|mut e| {
            if let Some((pos, vel)) = e.components_mut2::<Position, Velocity>() {
                pos.x = vel.x * dt;
                pos.y = vel.y * dt;
            }
        });
    }
}

struct ComflabSystem;

impl System for ComflabSystem {
    fn update(&mut self, store: &mut EntityStore, _dt: DeltaTime) {
        store.for_each_with::<(Comflabulation,)>(|mut e| {
            if let Some(comflab) = e.component::<Comflabulation>() {
                comflab.thingy *= 1.000_001;
                comflab.mingy = !comflab.mingy;
                comflab.dingy += 1;
                comflab.stringy = comflab.dingy.to_string();
            }
        });
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Every entity moves, every second one comflabulates.
fn application(count: usize) -> Scheduler {
    let mut store = EntityStore::with_capacity(count);
    for i in 0..count {
        let mut e = store.create();
        e.assign(Position::default());
        e.assign(Velocity { x: 1.0, y: 2.0 });
        if i % 2 == 0 {
            e.assign(Comflabulation {
                thingy: 1.0,
                ..Comflabulation::default()
            });
        }
    }

    Scheduler::new(store)
        .with_system(MovementSystem)
        .with_system(ComflabSystem)
}

// =============================================================================
// Basic Tick Cycle
// =============================================================================

#[test]
fn tick_cycle_empty_store() {
    init_tracing();
    let mut scheduler = Scheduler::default()
        .with_system(MovementSystem)
        .with_system(ComflabSystem);

    scheduler.tick(16);

    assert_eq!(scheduler.tick_count(), 1);
    assert!(scheduler.store().is_empty());
}

#[test]
fn tick_cycle_updates_components() {
    init_tracing();
    let mut scheduler = application(10);

    for _ in 0..3 {
        scheduler.tick(16);
    }

    let store = scheduler.store();
    for e in store.iter() {
        assert_eq!(e.get::<Position>(), Some(&Position { x: 16.0, y: 32.0 }));
        if let Some(comflab) = e.get::<Comflabulation>() {
            assert_eq!(comflab.dingy, 3);
            assert!(comflab.mingy);
            assert_eq!(comflab.stringy, "3");
            assert!(comflab.thingy > 1.0);
        }
    }
    assert_eq!(store.iter().filter(|e| e.has::<Comflabulation>()).count(), 5);
}

#[test]
fn tick_cycle_preserves_identities() {
    let mut scheduler = application(20);
    let before: std::collections::BTreeSet<_> = scheduler.store().ids().collect();

    scheduler.tick(1);

    let after: std::collections::BTreeSet<_> = scheduler.store().ids().collect();
    assert_eq!(before, after);
}

#[test]
fn explicit_run_order_matches_tick() {
    let mut ticked = application(8);
    let mut stepped = application(8);

    ticked.tick(5);
    stepped.run::<MovementSystem>(5).unwrap();
    stepped.run::<ComflabSystem>(5).unwrap();

    let a: Vec<_> = ticked.store().iter().map(|e| e.get::<Position>().copied()).collect();
    let b: Vec<_> = stepped.store().iter().map(|e| e.get::<Position>().copied()).collect();
    assert_eq!(a, b);
}

#[test]
fn query_on_unseen_component_is_quiet_noop() {
    init_tracing();
    let mut scheduler = application(3);

    let store = scheduler.store_mut();
    assert_eq!(store.count_with::<(Position, UnusedMarker)>(), 0);
    assert_eq!(store.stats().sorts, 0);
}

// =============================================================================
// Churn
// =============================================================================

#[test]
fn tick_cycle_with_churn_between_ticks() {
    init_tracing();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut scheduler = application(50);

    for _ in 0..10 {
        let store = scheduler.store_mut();
        for _ in 0..5 {
            let victim = rng.gen_range(0..store.len());
            let id = store.ids().nth(victim);
            if let Some(id) = id {
                assert!(store.kill_id(id));
            }
        }
        for _ in 0..5 {
            let mut e = store.create();
            e.assign(Position::default());
            if rng.gen_bool(0.5) {
                e.assign(Velocity { x: 3.0, y: 3.0 });
            }
        }
        scheduler.tick(2);
    }

    let store = scheduler.store();
    assert_eq!(store.len(), 50);
    for e in store.iter() {
        match e.get::<Velocity>() {
            Some(vel) => {
                let pos = e.get::<Position>().copied().unwrap_or_default();
                assert_eq!(pos, Position { x: vel.x * 2.0, y: vel.y * 2.0 });
            }
            None => assert_eq!(e.get::<Position>(), Some(&Position::default())),
        }
    }
}

#[test]
fn reset_between_ticks_keeps_ids_fresh() {
    let mut scheduler = application(4);
    scheduler.tick(1);
    let old_max = scheduler.store().ids().max();

    scheduler.store_mut().reset();
    scheduler.tick(1);
    assert!(scheduler.store().is_empty());

    let fresh = scheduler.store_mut().spawn().id;
    assert!(old_max.is_some_and(|max| fresh > max));
}

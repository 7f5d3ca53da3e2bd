//! Tick orchestration for Cairn.
//!
//! A tick is one pass over the registered systems. The scheduler owns the
//! store its systems run against, so a system can never observe a store
//! that someone else is mutating mid-tick.

use cairn_foundation::Result;
use cairn_storage::EntityStore;
use tracing::debug;

use crate::system::{DeltaTime, System, SystemRegistry};

/// Owns an entity store and the systems that update it.
#[derive(Debug, Default)]
pub struct Scheduler {
    /// Store the systems run against.
    store: EntityStore,
    /// Registered systems.
    systems: SystemRegistry,
    /// Number of completed ticks.
    tick_count: u64,
}

impl Scheduler {
    /// Creates a scheduler bound to `store`.
    #[must_use]
    pub fn new(store: EntityStore) -> Self {
        Self {
            store,
            systems: SystemRegistry::new(),
            tick_count: 0,
        }
    }

    /// Registers a system; see [`SystemRegistry::register`].
    pub fn register<S: System>(&mut self, system: S) -> bool {
        self.systems.register(system)
    }

    /// Builder method to register a system.
    #[must_use]
    pub fn with_system<S: System>(mut self, system: S) -> Self {
        self.systems.register(system);
        self
    }

    /// Runs the registered `S` once with elapsed time `dt`.
    ///
    /// # Errors
    ///
    /// Returns `SystemNotRegistered` if no `S` was registered.
    pub fn run<S: System>(&mut self, dt: DeltaTime) -> Result<()> {
        self.systems.run::<S>(&mut self.store, dt)
    }

    /// Runs every system once, in registration order, and counts the tick.
    pub fn tick(&mut self, dt: DeltaTime) {
        self.systems.run_all(&mut self.store, dt);
        self.tick_count += 1;
        debug!(
            tick = self.tick_count,
            dt,
            entities = self.store.len(),
            "tick complete"
        );
    }

    /// Returns the number of completed ticks.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Returns the store.
    #[must_use]
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Returns the store for mutation between ticks.
    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    /// Returns the system registry.
    #[must_use]
    pub fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    /// Returns the system registry for mutation.
    pub fn systems_mut(&mut self) -> &mut SystemRegistry {
        &mut self.systems
    }

    /// Consumes the scheduler and returns its store.
    #[must_use]
    pub fn into_store(self) -> EntityStore {
        self.store
    }
}

//! Systems and the registry that owns them.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;

use cairn_foundation::{Error, ErrorContext, Result};
use cairn_storage::EntityStore;
use tracing::{debug, trace};

/// Elapsed time handed to systems. The unit is up to the caller.
pub type DeltaTime = i32;

/// Update logic run against an entity store once per tick.
///
/// A system usually queries the store for the components it cares about
/// and mutates them in place:
///
/// ```
/// use cairn_engine::{DeltaTime, System};
/// use cairn_foundation::Component;
/// use cairn_storage::EntityStore;
///
/// #[derive(Default)]
/// struct Position(f32);
/// impl Component for Position {}
///
/// struct Drift;
///
/// impl System for Drift {
///     fn update(&mut self, store: &mut EntityStore, dt: DeltaTime) {
///         store.for_each_with::<(Position,)>(|mut e| {
///             if let Some(pos) = e.component::<Position>() {
///                 pos.0 += dt as f32;
///             }
///         });
///     }
/// }
/// ```
pub trait System: 'static {
    /// Runs one tick of this system.
    fn update(&mut self, store: &mut EntityStore, dt: DeltaTime);

    /// Name used in logs and errors.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// A registered system with its type erased.
struct Entry {
    name: &'static str,
    system: Box<dyn Any>,
    update: fn(&mut dyn Any, &mut EntityStore, DeltaTime),
}

fn update_erased<S: System>(system: &mut dyn Any, store: &mut EntityStore, dt: DeltaTime) {
    if let Some(system) = system.downcast_mut::<S>() {
        system.update(store, dt);
    }
}

/// Holds one instance of each registered system type.
///
/// Registration order is remembered and used by [`run_all`](Self::run_all).
#[derive(Default)]
pub struct SystemRegistry {
    entries: Vec<Entry>,
    index: HashMap<TypeId, usize>,
}

impl SystemRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `system` under its type.
    ///
    /// Returns false and drops `system` if its type is already registered;
    /// the first registration wins.
    pub fn register<S: System>(&mut self, system: S) -> bool {
        let id = TypeId::of::<S>();
        let name = system.name();
        if self.index.contains_key(&id) {
            debug!(system = name, "system already registered, keeping first");
            return false;
        }

        self.index.insert(id, self.entries.len());
        self.entries.push(Entry {
            name,
            system: Box::new(system),
            update: update_erased::<S>,
        });
        debug!(system = name, "system registered");
        true
    }

    /// Runs the registered `S` once against `store`.
    ///
    /// # Errors
    ///
    /// Returns `SystemNotRegistered` if no `S` was registered.
    pub fn run<S: System>(&mut self, store: &mut EntityStore, dt: DeltaTime) -> Result<()> {
        let index = self
            .index
            .get(&TypeId::of::<S>())
            .copied()
            .ok_or_else(|| {
                Error::system_not_registered(type_name::<S>())
                    .with_context(ErrorContext::new().with_operation("run"))
            })?;

        let entry = &mut self.entries[index];
        trace!(system = entry.name, dt, "running system");
        (entry.update)(&mut *entry.system, store, dt);
        Ok(())
    }

    /// Runs every registered system once, in registration order.
    pub fn run_all(&mut self, store: &mut EntityStore, dt: DeltaTime) {
        for entry in &mut self.entries {
            trace!(system = entry.name, dt, "running system");
            (entry.update)(&mut *entry.system, store, dt);
        }
    }

    /// Returns true if an `S` is registered.
    #[must_use]
    pub fn contains<S: System>(&self) -> bool {
        self.index.contains_key(&TypeId::of::<S>())
    }

    /// Returns the registered `S`, if any.
    #[must_use]
    pub fn get<S: System>(&self) -> Option<&S> {
        let index = *self.index.get(&TypeId::of::<S>())?;
        self.entries[index].system.downcast_ref::<S>()
    }

    /// Returns the registered `S` for mutation, if any.
    pub fn get_mut<S: System>(&mut self) -> Option<&mut S> {
        let index = *self.index.get(&TypeId::of::<S>())?;
        self.entries[index].system.downcast_mut::<S>()
    }

    /// Returns the number of registered systems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no systems are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns system names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }
}

impl fmt::Debug for SystemRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

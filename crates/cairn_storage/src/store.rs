//! Entity lifecycle and queries.
//!
//! The `EntityStore` keeps entity records in one ordered sequence and
//! mints a fresh serial [`EntityId`] for each. Queries may stably reorder
//! the sequence so matching records form a contiguous prefix.

use cairn_foundation::{Component, ComponentTag, Entity, EntityId, Error, ErrorContext, Result};
use tracing::{debug, trace, warn};

use crate::config::{DuplicatePolicy, StoreConfig};
use crate::entity::{Dependency, EntityMut, EntityRecord, EntityRef, make_default};
use crate::query::{ComponentSet, SortMemo, SortStats};
use crate::registry::ComponentRegistry;

/// Store-wide state that entity handles need while a record is borrowed.
#[derive(Debug)]
pub(crate) struct StoreState {
    pub(crate) registry: ComponentRegistry,
    pub(crate) dependencies: Vec<Dependency>,
    pub(crate) duplicates: DuplicatePolicy,
    /// Bumped by every change to membership or order.
    pub(crate) version: u64,
}

impl StoreState {
    pub(crate) fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

/// Ordered collection of entity records.
///
/// Records are addressed by position. Detached [`Entity`] handles carry
/// the position and identity they were issued with and are validated on
/// every use; they go stale after a kill before them, a reset, or a query
/// that reorders the store. Borrowed [`EntityMut`] handles cannot outlive
/// any of those, which the borrow checker enforces.
///
/// Ids come from a counter owned by the store that is never rewound, not
/// even by [`reset`](Self::reset).
#[derive(Debug)]
pub struct EntityStore {
    records: Vec<EntityRecord>,
    state: StoreState,
    config: StoreConfig,
    next_id: u64,
    memo: SortMemo,
    stats: SortStats,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// Creates a new empty store with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates a new empty store with room for `capacity` records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(StoreConfig::default().with_initial_capacity(capacity))
    }

    /// Creates a new empty store with the given configuration.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            records: Vec::with_capacity(config.initial_capacity),
            state: StoreState {
                registry: ComponentRegistry::new(),
                dependencies: Vec::new(),
                duplicates: config.duplicates,
                version: 0,
            },
            config,
            next_id: 0,
            memo: SortMemo::default(),
            stats: SortStats::default(),
        }
    }

    /// Returns the store's configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the component registry.
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.state.registry
    }

    /// Returns the sort gate counters.
    #[must_use]
    pub fn stats(&self) -> SortStats {
        self.stats
    }

    /// Returns the number of live records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no live records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a new entity with no components and returns a handle to it.
    ///
    /// Amortized O(1). Growing the sequence never invalidates detached
    /// handles, since positions before the end do not move.
    pub fn create(&mut self) -> EntityMut<'_> {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        let position = self.records.len();
        self.records.push(EntityRecord::new(id));
        self.state.touch();

        let Self { records, state, .. } = self;
        EntityMut::new(position, &mut records[position], state)
    }

    /// Creates an entity and returns its detached handle.
    pub fn spawn(&mut self) -> Entity {
        self.create().handle()
    }

    /// Removes the entity a handle refers to.
    ///
    /// Returns `Ok(true)` if a record was removed and `Ok(false)` if the
    /// handle's position is at or past the end (a no-op). Records after the
    /// removed one shift down, so handles at or after it go stale.
    ///
    /// # Errors
    ///
    /// Returns `StaleEntity` if the position is in range but now holds a
    /// different entity. Nothing is removed.
    pub fn kill(&mut self, entity: Entity) -> Result<bool> {
        let Some(record) = self.records.get(entity.position) else {
            debug!(?entity, len = self.records.len(), "kill past end ignored");
            return Ok(false);
        };

        if record.id != entity.id {
            warn!(?entity, found = %record.id, "kill with stale handle refused");
            return Err(Error::stale_entity(entity).with_context(
                ErrorContext::new()
                    .with_operation("kill")
                    .with_note(format!("position {} holds {}", entity.position, record.id)),
            ));
        }

        self.records.remove(entity.position);
        self.state.touch();
        debug!(?entity, "entity killed");
        Ok(true)
    }

    /// Removes the entity with the given identity, wherever it now sits.
    ///
    /// Returns false if no live record carries `id`.
    pub fn kill_id(&mut self, id: EntityId) -> bool {
        match self.find(id) {
            Some(entity) => self.kill(entity).is_ok_and(|removed| removed),
            None => false,
        }
    }

    /// Destroys every entity. The id counter keeps climbing.
    pub fn reset(&mut self) {
        debug!(cleared = self.records.len(), next_id = self.next_id, "store reset");
        self.records.clear();
        self.state.touch();
        self.memo.clear();
    }

    /// Checks that a handle still refers to the entity it was issued for.
    ///
    /// # Errors
    ///
    /// Returns `EntityNotFound` if the position is past the end and
    /// `StaleEntity` if the record there carries a different identity.
    pub fn validate(&self, entity: Entity) -> Result<()> {
        match self.records.get(entity.position) {
            None => Err(Error::entity_not_found(entity)),
            Some(record) if record.id != entity.id => Err(Error::stale_entity(entity)),
            Some(_) => Ok(()),
        }
    }

    /// Returns true if the handle is still valid.
    #[must_use]
    pub fn exists(&self, entity: Entity) -> bool {
        self.validate(entity).is_ok()
    }

    /// Returns a read-only handle for a detached one.
    ///
    /// # Errors
    ///
    /// Fails as [`validate`](Self::validate) does.
    pub fn get(&self, entity: Entity) -> Result<EntityRef<'_>> {
        self.validate(entity)?;
        Ok(EntityRef::new(
            entity.position,
            &self.records[entity.position],
            &self.state.registry,
        ))
    }

    /// Returns a mutable handle for a detached one.
    ///
    /// # Errors
    ///
    /// Fails as [`validate`](Self::validate) does.
    pub fn get_mut(&mut self, entity: Entity) -> Result<EntityMut<'_>> {
        self.validate(entity)?;
        let Self { records, state, .. } = self;
        Ok(EntityMut::new(
            entity.position,
            &mut records[entity.position],
            state,
        ))
    }

    /// Finds the current handle for an identity. O(n).
    #[must_use]
    pub fn find(&self, id: EntityId) -> Option<Entity> {
        self.records
            .iter()
            .position(|record| record.id == id)
            .map(|position| Entity::new(position, id))
    }

    /// Iterates over every record in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = EntityRef<'_>> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(position, record)| EntityRef::new(position, record, &self.state.registry))
    }

    /// Iterates over the identities of every record in sequence order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.records.iter().map(|record| record.id)
    }

    /// Visits every record in sequence order.
    pub fn for_each(&mut self, mut visit: impl FnMut(EntityMut<'_>)) {
        let Self { records, state, .. } = self;
        for (position, record) in records.iter_mut().enumerate() {
            visit(EntityMut::new(position, record, state));
        }
    }

    /// Visits every record holding all component types in `Q`.
    ///
    /// May first reorder the store so holders of `Q`'s first type lead the
    /// sequence; see [`crate::query`]. The visited set is exactly the
    /// matching records either way. Visitors receive [`EntityMut`] only, so
    /// creating or killing entities from inside a visit does not compile.
    pub fn for_each_with<Q: ComponentSet>(&mut self, mut visit: impl FnMut(EntityMut<'_>)) {
        let Some(tags) = Q::tags(&self.state.registry) else {
            trace!(query = ?Q::names(), "query names an unseen component, nothing to visit");
            return;
        };
        let lead = tags[0];
        let partitioned = self.try_sort(lead);

        let Self { records, state, .. } = self;
        for (position, record) in records.iter_mut().enumerate() {
            if !record.has_tag(lead) {
                if partitioned {
                    break;
                }
                continue;
            }
            if tags[1..].iter().all(|tag| record.has_tag(*tag)) {
                visit(EntityMut::new(position, record, state));
            }
        }
    }

    /// Returns detached handles to every record holding all types in `Q`.
    ///
    /// The handles reflect positions after any reorder the query performed.
    pub fn query<Q: ComponentSet>(&mut self) -> Vec<Entity> {
        let mut found = Vec::new();
        self.for_each_with::<Q>(|e| found.push(e.handle()));
        found
    }

    /// Counts the records holding all types in `Q`.
    pub fn count_with<Q: ComponentSet>(&mut self) -> usize {
        let mut count = 0;
        self.for_each_with::<Q>(|_| count += 1);
        count
    }

    /// Makes every future assignment of `A` also assign a default `B` to
    /// entities that lack one. Chains of dependencies are followed.
    /// Entities that already hold `A` are not changed.
    pub fn add_dependency<A: Component, B: Component + Default>(&mut self) {
        let trigger = self.state.registry.register::<A>();
        let tag = self.state.registry.register::<B>();
        if self
            .state
            .dependencies
            .iter()
            .any(|dep| dep.trigger == trigger && dep.tag == tag)
        {
            return;
        }
        self.state.dependencies.push(Dependency {
            trigger,
            tag,
            make: make_default::<B>,
        });
    }

    /// Stably partitions the records on `lead` unless the gate says not to.
    ///
    /// Returns true if holders of `lead` are known to form a prefix.
    fn try_sort(&mut self, lead: ComponentTag) -> bool {
        if self.memo.is_current(lead, self.state.version) {
            self.stats.skipped_memo += 1;
            trace!(?lead, "partition still current");
            return true;
        }

        if self.records.len() >= self.config.sort_threshold {
            self.stats.skipped_threshold += 1;
            trace!(
                ?lead,
                len = self.records.len(),
                threshold = self.config.sort_threshold,
                "sort skipped, store too large"
            );
            return false;
        }

        self.records.sort_by_key(|record| !record.has_tag(lead));
        self.state.touch();
        self.memo.record(lead, self.state.version);
        self.stats.sorts += 1;
        trace!(?lead, len = self.records.len(), "store partitioned");
        true
    }
}

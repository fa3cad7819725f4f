//! Store - the thread-safe in-memory record container.
//!
//! The store owns every record and is the only way to create, change or
//! remove one. Records live in a sharded map, so writers to different
//! identities rarely contend and writers to the same identity serialize on
//! that identity's shard lock (last writer wins).
//!
//! A store-wide gate is held shared by every operation and exclusively by
//! snapshot import, so an import is never observed half applied and never
//! races an identity allocation.

use crate::clock::{Clock, SystemClock};
use crate::query::{Entity, FieldValue, Filter, Page, PageRequest, SortKey, SortTarget};
use crate::snapshot::StoreSnapshot;
use crate::{error::Result, Error, Record, RecordId};
use dashmap::DashMap;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// First identity handed out by a fresh store.
const FIRST_ID: RecordId = 1;

/// The main store holding all records of one payload type.
///
/// All methods take `&self`; share the store across threads with `Arc`.
#[derive(Debug)]
pub struct EntityStore<T> {
    /// Records by identity
    records: DashMap<RecordId, Record<T>>,
    /// Next identity to allocate, never decremented
    next_id: AtomicU64,
    /// Source of creation and update stamps
    clock: Arc<dyn Clock>,
    /// Shared by regular operations, exclusive during import
    gate: RwLock<()>,
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EntityStore<T> {
    /// Create an empty store stamping records with the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store with a custom clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicU64::new(FIRST_ID),
            clock,
            gate: RwLock::new(()),
        }
    }

    // The gate guards no data, so a poisoned lock is still usable.
    fn shared(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn exclusive(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The clock stamping this store's records.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        let _gate = self.shared();
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        let _gate = self.shared();
        self.records.is_empty()
    }

    /// Check if a record with this identity is live.
    pub fn contains(&self, id: RecordId) -> bool {
        let _gate = self.shared();
        self.records.contains_key(&id)
    }

    /// Insert a new record, allocating its identity and creation time.
    pub fn create(&self, payload: T) -> Record<T>
    where
        T: Clone,
    {
        let _gate = self.shared();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = Record::new(id, payload, self.clock.now());
        self.records.insert(id, record.clone());

        tracing::debug!(id, "record created");
        record
    }

    /// Get a copy of a record by identity.
    pub fn get_by_id(&self, id: RecordId) -> Option<Record<T>>
    where
        T: Clone,
    {
        let _gate = self.shared();
        self.records.get(&id).map(|entry| entry.value().clone())
    }

    /// Apply `f` to the payload of an existing record.
    ///
    /// Returns `false` and leaves the store untouched if `id` is absent.
    pub fn update(&self, id: RecordId, f: impl FnOnce(&mut T)) -> bool {
        self.update_with(id, f).is_some()
    }

    /// Apply `f` to the payload of an existing record and return its result.
    ///
    /// Returns `None` and leaves the store untouched if `id` is absent. The
    /// record stays locked while `f` runs; `f` must not call back into the
    /// store.
    pub fn update_with<R>(&self, id: RecordId, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let _gate = self.shared();
        let Some(mut entry) = self.records.get_mut(&id) else {
            tracing::trace!(id, "update on missing record");
            return None;
        };
        let out = entry.apply(f, self.clock.now());

        tracing::debug!(id, version = entry.version(), "record updated");
        Some(out)
    }

    /// Apply `f` and return a copy of the updated record.
    ///
    /// The copy is taken under the same lock as the write, so a concurrent
    /// delete cannot slip in between.
    pub fn update_and_get(&self, id: RecordId, f: impl FnOnce(&mut T)) -> Option<Record<T>>
    where
        T: Clone,
    {
        let _gate = self.shared();
        let mut entry = self.records.get_mut(&id)?;
        entry.apply(f, self.clock.now());

        tracing::debug!(id, version = entry.version(), "record updated");
        Some(entry.value().clone())
    }

    /// Remove a record. Returns whether a record was removed.
    pub fn delete(&self, id: RecordId) -> bool {
        let _gate = self.shared();
        let removed = self.records.remove(&id).is_some();
        if removed {
            tracing::debug!(id, "record deleted");
        }
        removed
    }

    /// Copy of every record, in ascending identity order.
    pub fn list_all(&self) -> Vec<Record<T>>
    where
        T: Clone,
    {
        self.find(|_| true)
    }

    /// Copy of every record accepted by `predicate`, in ascending identity order.
    ///
    /// `predicate` runs while the store is read-locked and must not call back
    /// into the store.
    pub fn find(&self, predicate: impl Fn(&Record<T>) -> bool) -> Vec<Record<T>>
    where
        T: Clone,
    {
        let _gate = self.shared();
        self.collect_sorted(predicate)
    }

    fn collect_sorted(&self, predicate: impl Fn(&Record<T>) -> bool) -> Vec<Record<T>>
    where
        T: Clone,
    {
        let mut records: Vec<Record<T>> = self
            .records
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(Record::id);
        records
    }

    /// Group every record by `key_fn` and count each group.
    ///
    /// Like [`EntityStore::find`], `key_fn` must not call back into the store.
    pub fn count_by_key<K, F>(&self, key_fn: F) -> HashMap<K, usize>
    where
        K: Eq + Hash,
        F: Fn(&T) -> K,
    {
        let _gate = self.shared();
        let mut counts = HashMap::new();
        for entry in self.records.iter() {
            *counts.entry(key_fn(entry.value().payload())).or_insert(0) += 1;
        }
        counts
    }

    /// Export every record and the identity allocator.
    pub fn export_snapshot(&self) -> StoreSnapshot<T>
    where
        T: Clone,
    {
        let _gate = self.shared();
        let mut snapshot = StoreSnapshot::new(self.next_id.load(Ordering::SeqCst));
        for record in self.collect_sorted(|_| true) {
            snapshot.add_record(record);
        }
        snapshot
    }

    /// Replace the store contents with a snapshot.
    ///
    /// The snapshot is validated before anything changes. The identity
    /// allocator only moves forward, so ids handed out before the import are
    /// never reused. Other operations wait for the import and see either the
    /// old contents or the new ones.
    pub fn import_snapshot(&self, snapshot: StoreSnapshot<T>) -> Result<()> {
        snapshot.validate()?;

        let _gate = self.exclusive();
        let floor = snapshot.next_id.max(snapshot.max_id().map_or(FIRST_ID, |id| id + 1));
        self.next_id.fetch_max(floor, Ordering::SeqCst);

        self.records.clear();
        let count = snapshot.records.len();
        for (id, record) in snapshot.records {
            self.records.insert(id, record);
        }

        tracing::debug!(count, "snapshot imported");
        Ok(())
    }

    /// Build a store from a snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot<T>) -> Result<Self> {
        let store = Self::new();
        store.import_snapshot(snapshot)?;
        Ok(store)
    }
}

impl<T: Entity + Clone> EntityStore<T> {
    /// Records matching every constraint of `filter`, in ascending identity order.
    pub fn filter(&self, filter: &Filter) -> Vec<Record<T>> {
        self.find(|record| filter.matches(record.payload()))
    }

    /// Filter, sort and slice in one step.
    pub fn paginate(&self, filter: &Filter, sort: &SortKey, page: PageRequest) -> Page<Record<T>> {
        let sorted = sort_records(self.filter(filter), sort);
        Page::slice(sorted, page)
    }

    /// Check a sort key name before using it.
    pub fn validate_sort_key(&self, sort: &SortKey) -> Result<()> {
        match sort.resolve::<T>() {
            SortTarget::Identity if sort.name() != "id" => Err(Error::InvalidArgument(format!(
                "unknown sort key: {}",
                sort.name()
            ))),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
    Stamp(u64),
    Field(Option<FieldValue>),
}

/// Sort by the resolved key, breaking ties by ascending identity.
fn sort_records<T: Entity>(records: Vec<Record<T>>, sort: &SortKey) -> Vec<Record<T>> {
    let target = sort.resolve::<T>();
    if target == SortTarget::Identity && sort.name() != "id" {
        tracing::debug!(sort_key = sort.name(), "unknown sort key, ordering by identity");
    }

    let mut keyed: Vec<(SortValue, Record<T>)> = records
        .into_iter()
        .map(|record| {
            let key = match target {
                SortTarget::Identity => SortValue::Stamp(record.id()),
                SortTarget::CreatedAt => SortValue::Stamp(record.created_at()),
                SortTarget::Field(name) => SortValue::Field(record.payload().field(name)),
            };
            (key, record)
        })
        .collect();

    keyed.sort_by(|(ka, ra), (kb, rb)| {
        sort.direct(ka.cmp(kb)).then_with(|| ra.id().cmp(&rb.id()))
    });

    keyed.into_iter().map(|(_, record)| record).collect()
}

//! SnapshotStore (C2)
//!
//! Single logical "state" per `store_key` (`plan_state`, `job_state`,
//! `execution_state`, `evidence_state`). Every write in the system goes
//! through [`SnapshotStore::mutate`] under a serializable transaction: the
//! latest row for the key is read-for-update, the caller's closure mutates a
//! deserialized copy in place, and the result is persisted with
//! `version = prev + 1`.
//!
//! Two implementations:
//! - [`MemoryStore`] — an in-memory backend for tests and the CLI demo.
//! - [`SqlSnapshotStore`] — a thin wrapper over an injected [`SqlExecutor`];
//!   the table schema and role SQL live in external migrations, this type
//!   only encodes the optimistic-concurrency contract (at-most-one writer
//!   wins per version, reads see the last committed version).

mod errors;

pub use errors::{Severity, StoreError, StoreErrorCode, StoreResult};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// The last-committed value for a `store_key`, plus its version and the time
/// it was written.
#[derive(Debug, Clone)]
pub struct StoredState {
    pub version: u64,
    pub state: Value,
    pub updated_at: DateTime<Utc>,
}

/// Contract shared by every backend.
///
/// Implementations must guarantee: at-most-one writer wins per version;
/// reads observe the last committed version. Transient transport errors are
/// the caller's to retry; a serialization conflict aborts the mutate with
/// the prior state left untouched.
pub trait SnapshotStore: Send + Sync {
    /// Returns a deep copy of the last committed value for `store_key`, or
    /// `None` if nothing has ever been written there.
    fn read(&self, store_key: &str) -> StoreResult<Option<StoredState>>;

    /// Reads the current state (defaulting to `default_state` if absent),
    /// lets `f` mutate it in place, and persists the result with an
    /// incremented version. Returns the new `StoredState`.
    fn mutate(
        &self,
        store_key: &str,
        default_state: Value,
        f: &mut dyn FnMut(&mut Value) -> StoreResult<()>,
    ) -> StoreResult<StoredState>;
}

/// Typed convenience helpers layered over the raw [`SnapshotStore`] trait.
pub trait SnapshotStoreExt: SnapshotStore {
    fn read_typed<T: DeserializeOwned + Default>(&self, store_key: &str) -> StoreResult<T> {
        match self.read(store_key)? {
            Some(s) => serde_json::from_value(s.state)
                .map_err(|e| StoreError::corrupt_state(e.to_string())),
            None => Ok(T::default()),
        }
    }

    fn mutate_typed<T, F>(&self, store_key: &str, f: F) -> StoreResult<T>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut T) -> StoreResult<()>,
    {
        let mut f = Some(f);
        let default_value =
            serde_json::to_value(T::default()).map_err(|e| StoreError::corrupt_state(e.to_string()))?;
        let stored = self.mutate(store_key, default_value, &mut |raw: &mut Value| {
            let mut typed: T = serde_json::from_value(raw.clone())
                .map_err(|e| StoreError::corrupt_state(e.to_string()))?;
            if let Some(func) = f.take() {
                func(&mut typed)?;
            }
            *raw = serde_json::to_value(&typed)
                .map_err(|e| StoreError::corrupt_state(e.to_string()))?;
            Ok(())
        })?;
        serde_json::from_value(stored.state).map_err(|e| StoreError::corrupt_state(e.to_string()))
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStoreExt for S {}

/// In-memory backend: one row per `store_key`, guarded by a single mutex.
/// Serialization conflicts cannot occur under this backend since the mutex
/// serializes all mutates; it exists purely to exercise the contract in
/// tests without a database.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<String, StoredState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self, store_key: &str) -> StoreResult<Option<StoredState>> {
        let rows = self
            .rows
            .lock()
            .map_err(|_| StoreError::transport("memory store mutex poisoned"))?;
        Ok(rows.get(store_key).cloned())
    }

    fn mutate(
        &self,
        store_key: &str,
        default_state: Value,
        f: &mut dyn FnMut(&mut Value) -> StoreResult<()>,
    ) -> StoreResult<StoredState> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| StoreError::transport("memory store mutex poisoned"))?;
        let mut current = rows
            .get(store_key)
            .map(|s| s.state.clone())
            .unwrap_or(default_state);
        f(&mut current)?;
        let next_version = rows.get(store_key).map(|s| s.version + 1).unwrap_or(1);
        let stored = StoredState {
            version: next_version,
            state: current,
            updated_at: Utc::now(),
        };
        rows.insert(store_key.to_string(), stored.clone());
        Ok(stored)
    }
}

/// Minimal executor contract a relational backend must satisfy. The actual
/// SQL dialect and migrations are external to this crate; this
/// trait only captures the read-for-update / compare-and-swap shape that
/// `SqlSnapshotStore` drives.
pub trait SqlExecutor: Send + Sync {
    /// Reads `(version, state_json, updated_at)` for `store_key`, if present.
    fn select_for_update(&self, store_key: &str) -> StoreResult<Option<(u64, String, DateTime<Utc>)>>;

    /// Inserts or updates the row for `store_key`, succeeding only if the
    /// stored version still equals `expected_version` (or the row is absent
    /// and `expected_version` is 0). Returns `false` on a lost race.
    fn compare_and_swap(
        &self,
        store_key: &str,
        expected_version: u64,
        new_version: u64,
        state_json: &str,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<bool>;
}

/// Relational-store-backed [`SnapshotStore`]. One row per `store_key`.
pub struct SqlSnapshotStore<E: SqlExecutor> {
    executor: E,
}

impl<E: SqlExecutor> SqlSnapshotStore<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

impl<E: SqlExecutor> SnapshotStore for SqlSnapshotStore<E> {
    fn read(&self, store_key: &str) -> StoreResult<Option<StoredState>> {
        let row = self.executor.select_for_update(store_key)?;
        Ok(row.map(|(version, state_json, updated_at)| {
            let state = serde_json::from_str(&state_json).unwrap_or(Value::Null);
            StoredState {
                version,
                state,
                updated_at,
            }
        }))
    }

    fn mutate(
        &self,
        store_key: &str,
        default_state: Value,
        f: &mut dyn FnMut(&mut Value) -> StoreResult<()>,
    ) -> StoreResult<StoredState> {
        let existing = self.executor.select_for_update(store_key)?;
        let (expected_version, mut current) = match existing {
            Some((version, state_json, _)) => (
                version,
                serde_json::from_str(&state_json)
                    .map_err(|e| StoreError::corrupt_state(e.to_string()))?,
            ),
            None => (0, default_state),
        };
        f(&mut current)?;
        let new_version = expected_version + 1;
        let updated_at = Utc::now();
        let state_json =
            serde_json::to_string(&current).map_err(|e| StoreError::corrupt_state(e.to_string()))?;
        let won = self.executor.compare_and_swap(
            store_key,
            expected_version,
            new_version,
            &state_json,
            updated_at,
        )?;
        if !won {
            return Err(StoreError::serialization_conflict(store_key));
        }
        Ok(StoredState {
            version: new_version,
            state: current,
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
    struct Counter {
        n: u64,
    }

    #[test]
    fn mutate_increments_version_each_call() {
        let store = MemoryStore::new();
        let s1 = store
            .mutate_typed::<Counter, _>("c", |c| {
                c.n += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(s1.n, 1);
        let s2 = store
            .mutate_typed::<Counter, _>("c", |c| {
                c.n += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(s2.n, 2);
        let raw = store.read("c").unwrap().unwrap();
        assert_eq!(raw.version, 2);
    }

    #[test]
    fn read_missing_key_returns_none() {
        let store = MemoryStore::new();
        assert!(store.read("nope").unwrap().is_none());
    }
}

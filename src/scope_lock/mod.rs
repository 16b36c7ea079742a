//! ScopeLockManager (C5)
//!
//! Tenant+instance+table-set exclusive locks with a FIFO queue and
//! promotion on release. A queued entry is promoted only once its tables
//! no longer overlap any remaining running entry *and* no
//! earlier-still-blocked queue entry — strict FIFO, no overtaking.

use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

pub type TableSet = HashSet<String>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeKey {
    pub tenant_id: String,
    pub instance_id: String,
}

#[derive(Debug, Clone)]
struct Entry {
    job_id: String,
    tables: TableSet,
}

#[derive(Default)]
struct KeyState {
    running: Vec<Entry>,
    queue: VecDeque<Entry>,
}

/// Result of an [`ScopeLockManager::acquire`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    Running,
    Queued {
        reason_code: &'static str,
        blocked_tables: Vec<String>,
        queue_position: usize,
    },
}

#[derive(Default)]
pub struct ScopeLockManager {
    keys: Mutex<HashMap<ScopeKey, KeyState>>,
}

fn overlaps(a: &TableSet, b: &TableSet) -> Vec<String> {
    let mut out: Vec<String> = a.intersection(b).cloned().collect();
    out.sort();
    out
}

impl ScopeLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to admit `job_id` with `tables` into `key`'s running set.
    /// If any currently-running entry overlaps, enqueues instead.
    pub fn acquire(&self, key: &ScopeKey, job_id: &str, tables: TableSet) -> AcquireOutcome {
        let mut keys = self.keys.lock().expect("scope lock mutex poisoned");
        let state = keys.entry(key.clone()).or_default();

        let blocked: Vec<String> = state
            .running
            .iter()
            .flat_map(|e| overlaps(&e.tables, &tables))
            .collect();

        if blocked.is_empty() {
            state.running.push(Entry {
                job_id: job_id.to_string(),
                tables,
            });
            AcquireOutcome::Running
        } else {
            let mut blocked_tables = blocked;
            blocked_tables.sort();
            blocked_tables.dedup();
            state.queue.push_back(Entry {
                job_id: job_id.to_string(),
                tables,
            });
            AcquireOutcome::Queued {
                reason_code: "queued_scope_lock",
                blocked_tables,
                queue_position: state.queue.len(),
            }
        }
    }

    /// Removes `job_id` from the running set for `key` and promotes every
    /// queue entry (in FIFO order) whose tables no longer overlap any
    /// remaining running entry or any earlier-still-blocked queue entry.
    /// Returns the promoted job ids, in FIFO order.
    pub fn release(&self, key: &ScopeKey, job_id: &str) -> Vec<String> {
        let mut keys = self.keys.lock().expect("scope lock mutex poisoned");
        let Some(state) = keys.get_mut(key) else {
            return Vec::new();
        };
        state.running.retain(|e| e.job_id != job_id);

        let mut promoted = Vec::new();
        let mut still_queued: VecDeque<Entry> = VecDeque::new();
        // `blocking` accumulates the tables of every queue entry that has
        // not yet been promoted, in FIFO order, so a later entry cannot
        // jump ahead of an earlier one it is transitively blocked by.
        let mut blocking: TableSet = HashSet::new();

        while let Some(entry) = state.queue.pop_front() {
            let blocked_by_running = state.running.iter().any(|r| !overlaps(&r.tables, &entry.tables).is_empty());
            let blocked_by_earlier = !overlaps(&blocking, &entry.tables).is_empty();

            if !blocked_by_running && !blocked_by_earlier {
                state.running.push(Entry {
                    job_id: entry.job_id.clone(),
                    tables: entry.tables.clone(),
                });
                promoted.push(entry.job_id);
            } else {
                blocking.extend(entry.tables.iter().cloned());
                still_queued.push_back(entry);
            }
        }
        state.queue = still_queued;
        promoted
    }

    /// Point-in-time snapshot of a key's running/queued entries, for
    /// `JobService::getLockSnapshot`.
    pub fn snapshot(&self, key: &ScopeKey) -> ScopeLockSnapshot {
        let keys = self.keys.lock().expect("scope lock mutex poisoned");
        match keys.get(key) {
            Some(state) => ScopeLockSnapshot {
                running: state.running.iter().map(|e| e.job_id.clone()).collect(),
                queued: state.queue.iter().map(|e| e.job_id.clone()).collect(),
            },
            None => ScopeLockSnapshot {
                running: Vec::new(),
                queued: Vec::new(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScopeLockSnapshot {
    pub running: Vec<String>,
    pub queued: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(names: &[&str]) -> TableSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn key() -> ScopeKey {
        ScopeKey {
            tenant_id: "tenant-acme".into(),
            instance_id: "sn-dev-01".into(),
        }
    }

    #[test]
    fn no_overlap_runs_immediately() {
        let mgr = ScopeLockManager::new();
        assert_eq!(mgr.acquire(&key(), "a", tables(&["incident"])), AcquireOutcome::Running);
        assert_eq!(mgr.acquire(&key(), "b", tables(&["problem"])), AcquireOutcome::Running);
    }

    #[test]
    fn overlap_queues_with_position() {
        let mgr = ScopeLockManager::new();
        mgr.acquire(&key(), "a", tables(&["incident"]));
        let outcome = mgr.acquire(&key(), "b", tables(&["incident"]));
        match outcome {
            AcquireOutcome::Queued { queue_position, blocked_tables, reason_code } => {
                assert_eq!(queue_position, 1);
                assert_eq!(blocked_tables, vec!["incident".to_string()]);
                assert_eq!(reason_code, "queued_scope_lock");
            }
            _ => panic!("expected queued"),
        }
    }

    #[test]
    fn release_promotes_fifo_earliest_non_overlapping() {
        let mgr = ScopeLockManager::new();
        mgr.acquire(&key(), "a", tables(&["incident"]));
        mgr.acquire(&key(), "b", tables(&["incident"]));
        let promoted = mgr.release(&key(), "a");
        assert_eq!(promoted, vec!["b".to_string()]);
        let snap = mgr.snapshot(&key());
        assert_eq!(snap.running, vec!["b".to_string()]);
        assert!(snap.queued.is_empty());
    }

    #[test]
    fn transitive_blocking_prevents_overtaking() {
        let mgr = ScopeLockManager::new();
        // a runs on "incident". b queues on "incident". c queues on
        // "problem" (no overlap with running a, but IS blocked behind b
        // only if b itself still holds a claim on overlapping tables —
        // here c does not overlap b either, so c should promote even
        // though b hasn't).
        mgr.acquire(&key(), "a", tables(&["incident"]));
        mgr.acquire(&key(), "b", tables(&["incident"]));
        mgr.acquire(&key(), "c", tables(&["problem"]));
        let promoted = mgr.release(&key(), "a");
        assert_eq!(promoted, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn later_entry_blocked_by_earlier_queued_entry_is_not_promoted_out_of_order() {
        let mgr = ScopeLockManager::new();
        mgr.acquire(&key(), "a", tables(&["incident"]));
        // b and c both want "incident"; b queued first.
        mgr.acquire(&key(), "b", tables(&["incident"]));
        mgr.acquire(&key(), "c", tables(&["incident"]));
        let promoted = mgr.release(&key(), "a");
        // Only b promotes; c remains queued behind b even though releasing
        // a alone would have left c's tables free if b weren't ahead.
        assert_eq!(promoted, vec!["b".to_string()]);
        let snap = mgr.snapshot(&key());
        assert_eq!(snap.queued, vec!["c".to_string()]);
    }
}

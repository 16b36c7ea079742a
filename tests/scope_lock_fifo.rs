//! `ScopeLockManager` admits non-overlapping table sets immediately and
//! queues overlapping ones; on release, promotion walks the queue strictly
//! FIFO — a later entry can never jump an earlier one it is blocked behind,
//! even if the later entry's own tables are already free.

use rcs::scope_lock::{AcquireOutcome, ScopeKey, ScopeLockManager};
use std::collections::HashSet;

fn tables(names: &[&str]) -> HashSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn key() -> ScopeKey {
    ScopeKey {
        tenant_id: "tenant-acme".into(),
        instance_id: "sn-dev-01".into(),
    }
}

#[test]
fn disjoint_table_sets_both_run_immediately() {
    let mgr = ScopeLockManager::new();
    let key = key();

    assert_eq!(mgr.acquire(&key, "job-a", tables(&["incident"])), AcquireOutcome::Running);
    assert_eq!(mgr.acquire(&key, "job-b", tables(&["problem"])), AcquireOutcome::Running);

    let snap = mgr.snapshot(&key);
    assert_eq!(snap.running.len(), 2);
    assert!(snap.queued.is_empty());
}

#[test]
fn overlapping_table_set_is_queued_not_run() {
    let mgr = ScopeLockManager::new();
    let key = key();

    assert_eq!(mgr.acquire(&key, "job-a", tables(&["incident"])), AcquireOutcome::Running);

    match mgr.acquire(&key, "job-b", tables(&["incident", "problem"])) {
        AcquireOutcome::Queued {
            reason_code,
            blocked_tables,
            queue_position,
        } => {
            assert_eq!(reason_code, "queued_scope_lock");
            assert_eq!(blocked_tables, vec!["incident".to_string()]);
            assert_eq!(queue_position, 1);
        }
        other => panic!("expected Queued, got {other:?}"),
    }
}

#[test]
fn release_cascades_through_the_queue_one_promotion_per_release() {
    let mgr = ScopeLockManager::new();
    let key = key();

    // job-a holds "incident". job-b and job-c both also want "incident",
    // so each stays blocked until the entry ahead of it clears out — a
    // single release only ever promotes the earliest unblocked entry.
    assert_eq!(mgr.acquire(&key, "job-a", tables(&["incident"])), AcquireOutcome::Running);
    assert!(matches!(mgr.acquire(&key, "job-b", tables(&["incident"])), AcquireOutcome::Queued { .. }));
    assert!(matches!(mgr.acquire(&key, "job-c", tables(&["incident"])), AcquireOutcome::Queued { .. }));

    let snap = mgr.snapshot(&key);
    assert_eq!(snap.queued, vec!["job-b".to_string(), "job-c".to_string()]);

    let promoted = mgr.release(&key, "job-a");
    assert_eq!(promoted, vec!["job-b".to_string()]);

    let snap = mgr.snapshot(&key);
    assert_eq!(snap.running, vec!["job-b".to_string()]);
    assert_eq!(snap.queued, vec!["job-c".to_string()]);

    let promoted = mgr.release(&key, "job-b");
    assert_eq!(promoted, vec!["job-c".to_string()]);

    let snap = mgr.snapshot(&key);
    assert_eq!(snap.running, vec!["job-c".to_string()]);
    assert!(snap.queued.is_empty());
}

#[test]
fn queued_entry_freed_by_running_state_still_waits_behind_a_newly_promoted_overlap() {
    let mgr = ScopeLockManager::new();
    let key = key();

    // job-a holds "incident" + "problem". job-b queues wanting both
    // (blocked by a on each). job-c queues wanting only "problem" —
    // also blocked by a at acquire time — and once b promotes into the
    // running set ahead of it, c's "problem" claim now overlaps the
    // freshly-running b and must keep waiting.
    assert_eq!(mgr.acquire(&key, "job-a", tables(&["incident", "problem"])), AcquireOutcome::Running);
    assert!(matches!(
        mgr.acquire(&key, "job-b", tables(&["incident", "problem"])),
        AcquireOutcome::Queued { .. }
    ));
    assert!(matches!(mgr.acquire(&key, "job-c", tables(&["problem"])), AcquireOutcome::Queued { .. }));

    let promoted = mgr.release(&key, "job-a");
    assert_eq!(promoted, vec!["job-b".to_string()]);

    let snap = mgr.snapshot(&key);
    assert_eq!(snap.running, vec!["job-b".to_string()]);
    assert_eq!(snap.queued, vec!["job-c".to_string()]);

    let promoted = mgr.release(&key, "job-b");
    assert_eq!(promoted, vec!["job-c".to_string()]);
}

#[test]
fn release_promotes_every_disjoint_queued_entry_in_one_pass() {
    let mgr = ScopeLockManager::new();
    let key = key();

    // job-a holds both "incident" and "problem", blocking job-b
    // ("incident") and job-c ("problem"). Neither queued entry overlaps
    // the other, so releasing job-a promotes both in the same pass
    // despite job-c queuing second.
    assert_eq!(mgr.acquire(&key, "job-a", tables(&["incident", "problem"])), AcquireOutcome::Running);
    assert!(matches!(mgr.acquire(&key, "job-b", tables(&["incident"])), AcquireOutcome::Queued { .. }));
    assert!(matches!(mgr.acquire(&key, "job-c", tables(&["problem"])), AcquireOutcome::Queued { .. }));

    let promoted = mgr.release(&key, "job-a");
    assert_eq!(promoted, vec!["job-b".to_string(), "job-c".to_string()]);

    let snap = mgr.snapshot(&key);
    assert_eq!(snap.running, vec!["job-b".to_string(), "job-c".to_string()]);
    assert!(snap.queued.is_empty());
}

#[test]
fn distinct_tenant_instance_keys_do_not_share_locks() {
    let mgr = ScopeLockManager::new();
    let key_a = key();
    let key_b = ScopeKey {
        tenant_id: "tenant-acme".into(),
        instance_id: "sn-dev-02".into(),
    };

    assert_eq!(mgr.acquire(&key_a, "job-a", tables(&["incident"])), AcquireOutcome::Running);
    assert_eq!(mgr.acquire(&key_b, "job-b", tables(&["incident"])), AcquireOutcome::Running);

    assert_eq!(mgr.snapshot(&key_a).running, vec!["job-a".to_string()]);
    assert_eq!(mgr.snapshot(&key_b).running, vec!["job-b".to_string()]);
}

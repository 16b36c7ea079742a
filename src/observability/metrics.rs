//! Metrics registry for RCS
//!
//! - Counters only (no gauges, no histograms)
//! - Monotonic increase
//! - Reset only on process start
//! - Thread-safe but lock-minimal

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics registry containing all operational counters.
///
/// All counters use atomic operations for thread-safe increments, with
/// `Relaxed` ordering — eventual consistency is fine for metrics.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    plans_created: AtomicU64,
    plans_rejected: AtomicU64,
    jobs_created: AtomicU64,
    jobs_queued_for_lock: AtomicU64,
    jobs_paused: AtomicU64,
    jobs_resumed: AtomicU64,
    jobs_completed: AtomicU64,
    jobs_failed: AtomicU64,
    chunks_applied: AtomicU64,
    chunks_failed: AtomicU64,
    rows_applied: AtomicU64,
    checkpoints_written: AtomicU64,
    evidence_exported: AtomicU64,
    evidence_export_failures: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Plan metrics

    pub fn increment_plans_created(&self) {
        self.plans_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_plans_rejected(&self) {
        self.plans_rejected.fetch_add(1, Ordering::Relaxed);
    }

    // Job metrics

    pub fn increment_jobs_created(&self) {
        self.jobs_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_jobs_queued_for_lock(&self) {
        self.jobs_queued_for_lock.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_jobs_paused(&self) {
        self.jobs_paused.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_jobs_resumed(&self) {
        self.jobs_resumed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_jobs_completed(&self) {
        self.jobs_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_jobs_failed(&self) {
        self.jobs_failed.fetch_add(1, Ordering::Relaxed);
    }

    // Execution metrics

    pub fn increment_chunks_applied(&self) {
        self.chunks_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_chunks_failed(&self) {
        self.chunks_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rows_applied(&self, n: u64) {
        self.rows_applied.fetch_add(n, Ordering::Relaxed);
    }

    pub fn increment_checkpoints_written(&self) {
        self.checkpoints_written.fetch_add(1, Ordering::Relaxed);
    }

    // Evidence metrics

    pub fn increment_evidence_exported(&self) {
        self.evidence_exported.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_evidence_export_failures(&self) {
        self.evidence_export_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Current snapshot of all metrics as a JSON string.
    pub fn to_json(&self) -> String {
        let s = self.snapshot();
        format!(
            r#"{{"plans_created":{},"plans_rejected":{},"jobs_created":{},"jobs_queued_for_lock":{},"jobs_paused":{},"jobs_resumed":{},"jobs_completed":{},"jobs_failed":{},"chunks_applied":{},"chunks_failed":{},"rows_applied":{},"checkpoints_written":{},"evidence_exported":{},"evidence_export_failures":{}}}"#,
            s.plans_created,
            s.plans_rejected,
            s.jobs_created,
            s.jobs_queued_for_lock,
            s.jobs_paused,
            s.jobs_resumed,
            s.jobs_completed,
            s.jobs_failed,
            s.chunks_applied,
            s.chunks_failed,
            s.rows_applied,
            s.checkpoints_written,
            s.evidence_exported,
            s.evidence_export_failures,
        )
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            plans_created: self.plans_created.load(Ordering::Relaxed),
            plans_rejected: self.plans_rejected.load(Ordering::Relaxed),
            jobs_created: self.jobs_created.load(Ordering::Relaxed),
            jobs_queued_for_lock: self.jobs_queued_for_lock.load(Ordering::Relaxed),
            jobs_paused: self.jobs_paused.load(Ordering::Relaxed),
            jobs_resumed: self.jobs_resumed.load(Ordering::Relaxed),
            jobs_completed: self.jobs_completed.load(Ordering::Relaxed),
            jobs_failed: self.jobs_failed.load(Ordering::Relaxed),
            chunks_applied: self.chunks_applied.load(Ordering::Relaxed),
            chunks_failed: self.chunks_failed.load(Ordering::Relaxed),
            rows_applied: self.rows_applied.load(Ordering::Relaxed),
            checkpoints_written: self.checkpoints_written.load(Ordering::Relaxed),
            evidence_exported: self.evidence_exported.load(Ordering::Relaxed),
            evidence_export_failures: self.evidence_export_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub plans_created: u64,
    pub plans_rejected: u64,
    pub jobs_created: u64,
    pub jobs_queued_for_lock: u64,
    pub jobs_paused: u64,
    pub jobs_resumed: u64,
    pub jobs_completed: u64,
    pub jobs_failed: u64,
    pub chunks_applied: u64,
    pub chunks_failed: u64,
    pub rows_applied: u64,
    pub checkpoints_written: u64,
    pub evidence_exported: u64,
    pub evidence_export_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let registry = MetricsRegistry::new();
        let snapshot = registry.snapshot();

        assert_eq!(snapshot.plans_created, 0);
        assert_eq!(snapshot.jobs_created, 0);
        assert_eq!(snapshot.chunks_applied, 0);
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_plans_created();
        registry.increment_jobs_created();
        registry.increment_jobs_queued_for_lock();
        registry.increment_chunks_applied();
        registry.increment_chunks_applied();
        registry.increment_evidence_exported();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.plans_created, 1);
        assert_eq!(snapshot.jobs_created, 1);
        assert_eq!(snapshot.jobs_queued_for_lock, 1);
        assert_eq!(snapshot.chunks_applied, 2);
        assert_eq!(snapshot.evidence_exported, 1);
    }

    #[test]
    fn test_rows_applied_accumulates() {
        let registry = MetricsRegistry::new();

        registry.add_rows_applied(100);
        registry.add_rows_applied(50);

        assert_eq!(registry.snapshot().rows_applied, 150);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.increment_plans_created();
        registry.add_rows_applied(42);

        let json = registry.to_json();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["plans_created"], 1);
        assert_eq!(parsed["rows_applied"], 42);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_chunks_applied();
                    reg.increment_jobs_created();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.chunks_applied, 1000);
        assert_eq!(snapshot.jobs_created, 1000);
    }

    #[test]
    fn test_monotonic_increase() {
        let registry = MetricsRegistry::new();

        let mut prev = registry.snapshot().rows_applied;
        for _ in 0..10 {
            registry.add_rows_applied(10);
            let current = registry.snapshot().rows_applied;
            assert!(current >= prev);
            prev = current;
        }
    }
}

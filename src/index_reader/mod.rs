//! RestoreIndexReader (C4)
//!
//! Returns per-partition `indexed_through_time` and derives
//! fresh/stale/unknown executability from a `measured_at`. The freshness
//! oracle's own ingestion is out of scope; this module only consumes
//! [`RestoreIndexStateReader`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default staleness threshold in seconds.
pub const DEFAULT_STALE_AFTER_SECONDS: i64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Fresh,
    Stale,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Executability {
    Executable,
    PreviewOnly,
    Blocked,
}

/// A fully recomputed watermark record, as returned by the reader. Caller
/// (plan request) supplied freshness/executability/reason_code fields are
/// never used to build this type — it is always derived from
/// `indexed_through_time` vs `measured_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Watermark {
    pub tenant_id: String,
    pub instance_id: String,
    pub source: String,
    pub topic: String,
    pub partition: i64,
    pub generation_id: u64,
    /// Arbitrary-precision decimal string.
    pub indexed_through_offset: String,
    #[serde(with = "crate::canonical::iso8601")]
    pub indexed_through_time: DateTime<Utc>,
    #[serde(with = "crate::canonical::iso8601")]
    pub coverage_start: DateTime<Utc>,
    #[serde(with = "crate::canonical::iso8601")]
    pub coverage_end: DateTime<Utc>,
    #[serde(with = "crate::canonical::iso8601")]
    pub measured_at: DateTime<Utc>,
    pub freshness: Freshness,
    pub executability: Executability,
    pub reason_code: &'static str,
}

#[derive(Debug, Clone)]
pub struct PartitionRef {
    pub topic: String,
    pub partition: i64,
}

#[derive(Debug, Clone)]
pub struct ReadWatermarksRequest {
    pub tenant_id: String,
    pub instance_id: String,
    pub source: String,
    pub measured_at: DateTime<Utc>,
    pub partitions: Vec<PartitionRef>,
}

#[derive(Debug, Clone)]
pub struct ListWatermarksRequest {
    pub tenant_id: String,
    pub instance_id: String,
    pub source: String,
    pub measured_at: DateTime<Utc>,
}

/// The interface the core consumes; the concrete freshness data source is
/// external.
pub trait RestoreIndexStateReader: Send + Sync {
    fn read_watermarks_for_partitions(&self, req: &ReadWatermarksRequest) -> Vec<Watermark>;
    fn list_watermarks_for_source(&self, req: &ListWatermarksRequest) -> Vec<Watermark>;
}

/// Recomputes freshness/executability/reason_code for a single partition,
/// per the watermark contract:
/// - `freshness = unknown` ⇒ `blocked / blocked_freshness_unknown`
/// - `measured_at - indexed_through_time > stale_after_seconds` ⇒
///   `stale / preview_only / blocked_freshness_stale`
/// - otherwise `fresh / executable / none`
///
/// The boundary is inclusive: `lag == stale_after_seconds` is fresh.
pub fn compute_freshness(
    indexed_through_time: Option<DateTime<Utc>>,
    measured_at: DateTime<Utc>,
    stale_after_seconds: i64,
) -> (Freshness, Executability, &'static str) {
    let Some(indexed_through_time) = indexed_through_time else {
        return (Freshness::Unknown, Executability::Blocked, "blocked_freshness_unknown");
    };
    let lag_seconds = (measured_at - indexed_through_time).num_seconds();
    if lag_seconds > stale_after_seconds {
        (Freshness::Stale, Executability::PreviewOnly, "blocked_freshness_stale")
    } else {
        (Freshness::Fresh, Executability::Executable, "none")
    }
}

/// Record of what the (external) oracle has observed for one partition;
/// the in-memory reader below recomputes freshness from this on every read
/// rather than trusting a stored freshness field.
#[derive(Debug, Clone)]
pub struct StoredWatermark {
    pub generation_id: u64,
    pub indexed_through_offset: String,
    pub indexed_through_time: Option<DateTime<Utc>>,
    pub coverage_start: DateTime<Utc>,
    pub coverage_end: DateTime<Utc>,
}

/// Test/demo implementation of [`RestoreIndexStateReader`] backed by an
/// in-memory table. Missing partitions synthesize an "unknown/blocked"
/// record with zero offset and `measured_at` as coverage.
#[derive(Default)]
pub struct InMemoryIndexReader {
    stale_after_seconds: i64,
    records: std::collections::HashMap<(String, String, String, String, i64), StoredWatermark>,
}

impl InMemoryIndexReader {
    pub fn new(stale_after_seconds: i64) -> Self {
        Self {
            stale_after_seconds,
            records: Default::default(),
        }
    }

    pub fn set(
        &mut self,
        tenant_id: &str,
        instance_id: &str,
        source: &str,
        topic: &str,
        partition: i64,
        record: StoredWatermark,
    ) {
        self.records.insert(
            (
                tenant_id.to_string(),
                instance_id.to_string(),
                source.to_string(),
                topic.to_string(),
                partition,
            ),
            record,
        );
    }

    fn build(
        &self,
        tenant_id: &str,
        instance_id: &str,
        source: &str,
        topic: &str,
        partition: i64,
        measured_at: DateTime<Utc>,
    ) -> Watermark {
        let key = (
            tenant_id.to_string(),
            instance_id.to_string(),
            source.to_string(),
            topic.to_string(),
            partition,
        );
        match self.records.get(&key) {
            Some(r) => {
                let (freshness, executability, reason_code) =
                    compute_freshness(r.indexed_through_time, measured_at, self.stale_after_seconds);
                Watermark {
                    tenant_id: tenant_id.to_string(),
                    instance_id: instance_id.to_string(),
                    source: source.to_string(),
                    topic: topic.to_string(),
                    partition,
                    generation_id: r.generation_id,
                    indexed_through_offset: r.indexed_through_offset.clone(),
                    indexed_through_time: r.indexed_through_time.unwrap_or(measured_at),
                    coverage_start: r.coverage_start,
                    coverage_end: r.coverage_end,
                    measured_at,
                    freshness,
                    executability,
                    reason_code,
                }
            }
            None => Watermark {
                tenant_id: tenant_id.to_string(),
                instance_id: instance_id.to_string(),
                source: source.to_string(),
                topic: topic.to_string(),
                partition,
                generation_id: 0,
                indexed_through_offset: "0".to_string(),
                indexed_through_time: measured_at,
                coverage_start: measured_at,
                coverage_end: measured_at,
                measured_at,
                freshness: Freshness::Unknown,
                executability: Executability::Blocked,
                reason_code: "blocked_freshness_unknown",
            },
        }
    }
}

impl RestoreIndexStateReader for InMemoryIndexReader {
    fn read_watermarks_for_partitions(&self, req: &ReadWatermarksRequest) -> Vec<Watermark> {
        req.partitions
            .iter()
            .map(|p| {
                self.build(
                    &req.tenant_id,
                    &req.instance_id,
                    &req.source,
                    &p.topic,
                    p.partition,
                    req.measured_at,
                )
            })
            .collect()
    }

    fn list_watermarks_for_source(&self, req: &ListWatermarksRequest) -> Vec<Watermark> {
        self.records
            .keys()
            .filter(|(t, i, s, _, _)| t == &req.tenant_id && i == &req.instance_id && s == &req.source)
            .map(|(_, _, _, topic, partition)| {
                self.build(
                    &req.tenant_id,
                    &req.instance_id,
                    &req.source,
                    topic,
                    *partition,
                    req.measured_at,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn lag_equal_to_threshold_is_fresh() {
        let now = Utc::now();
        let indexed = now - Duration::seconds(DEFAULT_STALE_AFTER_SECONDS);
        let (f, e, r) = compute_freshness(Some(indexed), now, DEFAULT_STALE_AFTER_SECONDS);
        assert_eq!(f, Freshness::Fresh);
        assert_eq!(e, Executability::Executable);
        assert_eq!(r, "none");
    }

    #[test]
    fn lag_over_threshold_is_stale() {
        let now = Utc::now();
        let indexed = now - Duration::seconds(DEFAULT_STALE_AFTER_SECONDS + 1);
        let (f, e, r) = compute_freshness(Some(indexed), now, DEFAULT_STALE_AFTER_SECONDS);
        assert_eq!(f, Freshness::Stale);
        assert_eq!(e, Executability::PreviewOnly);
        assert_eq!(r, "blocked_freshness_stale");
    }

    #[test]
    fn missing_indexed_time_is_unknown() {
        let now = Utc::now();
        let (f, e, r) = compute_freshness(None, now, DEFAULT_STALE_AFTER_SECONDS);
        assert_eq!(f, Freshness::Unknown);
        assert_eq!(e, Executability::Blocked);
        assert_eq!(r, "blocked_freshness_unknown");
    }

    #[test]
    fn missing_partition_synthesizes_unknown_record() {
        let reader = InMemoryIndexReader::new(DEFAULT_STALE_AFTER_SECONDS);
        let req = ReadWatermarksRequest {
            tenant_id: "t".into(),
            instance_id: "i".into(),
            source: "s".into(),
            measured_at: Utc::now(),
            partitions: vec![PartitionRef {
                topic: "incident".into(),
                partition: 0,
            }],
        };
        let result = reader.read_watermarks_for_partitions(&req);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].freshness, Freshness::Unknown);
        assert_eq!(result[0].indexed_through_offset, "0");
    }
}

//! Plan data model.

use crate::index_reader::{Executability, Watermark};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    Update,
    Insert,
    Delete,
    Skip,
}

/// A single row in a dry-run plan. `table`/`topic`/`partition` locate the
/// row against the CDC-indexed partition its freshness is gated on; value
/// payloads stay opaque: payload encryption is not this crate's concern,
/// but it never decrypts or inspects them either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    pub row_id: String,
    pub table: String,
    pub topic: String,
    pub partition: i64,
    pub record_sys_id: String,
    pub action: RowAction,
    pub precondition_hash: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub diff_enc: Option<String>,
    pub before_image_enc: Option<String>,
    pub after_image_enc: Option<String>,
}

impl Row {
    /// Whether this row carries a before-image candidate for journaling
    /// ("before-image" means any of these three fields).
    pub fn has_before_image_candidate(&self) -> bool {
        self.diff_enc.is_some() || self.before_image_enc.is_some() || self.after_image_enc.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictClass {
    Value,
    MissingRow,
    UnexpectedExisting,
    Reference,
    Schema,
    Permission,
    Stale,
}

impl ConflictClass {
    pub fn is_reference(&self) -> bool {
        matches!(self, ConflictClass::Reference)
    }

    /// The reason code a gate derives when this class is the blocking one.
    pub fn gate_reason_code(&self) -> &'static str {
        match self {
            ConflictClass::Reference => "blocked_reference_conflict",
            ConflictClass::Schema => "failed_schema_conflict",
            ConflictClass::Permission => "failed_permission_conflict",
            ConflictClass::Stale => "blocked_freshness_stale",
            ConflictClass::Value | ConflictClass::MissingRow | ConflictClass::UnexpectedExisting => {
                "blocked_reference_conflict"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Skip,
    Accept,
    AbortAndReplan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    pub conflict_id: String,
    pub row_id: String,
    pub class: ConflictClass,
    pub resolution: Option<Resolution>,
}

impl Conflict {
    /// Classes other than `reference` may resolve to `skip`; `reference`
    /// forbids `skip`.
    pub fn resolution_is_valid(&self) -> bool {
        match self.resolution {
            Some(Resolution::Skip) => !self.class.is_reference(),
            _ => true,
        }
    }

    pub fn blocks_gate(&self) -> bool {
        self.class.is_reference() || self.resolution == Some(Resolution::AbortAndReplan)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteDecision {
    AllowDeletion,
    Deny,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteCandidate {
    pub candidate_id: String,
    pub row_id: String,
    pub decision: Option<DeleteDecision>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaDecision {
    Include,
    Exclude,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaCandidate {
    pub candidate_id: String,
    pub row_id: String,
    pub decision: Option<MediaDecision>,
    pub parent_record_exists: bool,
    pub expected_hash: Option<String>,
    pub observed_hash: Option<String>,
    pub byte_size: u64,
    pub max_retry_attempts: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitResolution {
    pub row_id: String,
    #[serde(with = "crate::canonical::iso8601")]
    pub resolved_at: DateTime<Utc>,
    pub tie_breaker_used: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pit {
    #[serde(with = "crate::canonical::iso8601")]
    pub restore_time: DateTime<Utc>,
    pub restore_timezone: String,
    pub pit_algorithm_version: String,
    #[serde(default)]
    pub tie_breaker: Vec<String>,
    #[serde(default)]
    pub tie_breaker_fallback: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    pub mode: String,
    pub tables: Vec<String>,
    pub encoded_query: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOptions {
    pub missing_row_mode: String,
    pub conflict_policy: String,
    pub schema_compatibility_mode: String,
    pub workflow_mode: String,
}

/// Caller-supplied watermark on a plan request. The
/// `freshness`/`executability`/`reason_code` fields here are discarded;
/// only `(topic, partition)` is used, to fetch the authoritative record
/// from the index reader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerWatermark {
    pub topic: String,
    pub partition: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDryRunPlanRequest {
    pub tenant_id: String,
    pub instance_id: String,
    pub source: String,
    pub plan_id: String,
    pub requested_by: String,
    pub pit: Pit,
    pub scope: Scope,
    pub execution_options: ExecutionOptions,
    pub rows: Vec<Row>,
    pub conflicts: Vec<Conflict>,
    pub delete_candidates: Vec<DeleteCandidate>,
    pub media_candidates: Vec<MediaCandidate>,
    pub pit_candidates: Vec<PitResolution>,
    pub watermarks: Vec<CallerWatermark>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    pub executability: Executability,
    pub reason_code: &'static str,
}

/// An immutable dry-run plan, once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DryRunPlan {
    pub plan_id: String,
    pub tenant_id: String,
    pub instance_id: String,
    pub source: String,
    pub plan_hash: String,
    pub plan_hash_input: serde_json::Value,
    pub execution_options: ExecutionOptions,
    pub rows: Vec<Row>,
    pub conflicts: Vec<Conflict>,
    pub delete_candidates: Vec<DeleteCandidate>,
    pub media_candidates: Vec<MediaCandidate>,
    pub pit_resolutions: Vec<PitResolution>,
    pub watermarks: Vec<Watermark>,
    pub gate: Gate,
    #[serde(with = "crate::canonical::iso8601")]
    pub generated_at: DateTime<Utc>,
    pub requested_by: String,
    pub approval: Option<serde_json::Value>,
}

impl DryRunPlan {
    pub fn matches_scope(&self, tenant_id: &str, instance_id: &str, source: &str) -> bool {
        self.tenant_id == tenant_id && self.instance_id == instance_id && self.source == source
    }
}

/// Persisted container for `plan_state`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PlanState {
    pub plans: std::collections::HashMap<String, DryRunPlan>,
}

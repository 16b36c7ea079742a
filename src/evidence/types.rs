//! Evidence data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureVerification {
    Verified,
    VerificationPending,
    VerificationFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestSignature {
    pub signature_algorithm: String,
    pub signer_key_id: String,
    pub signature: String,
    pub signature_verification: SignatureVerification,
    #[serde(with = "crate::canonical::iso8601")]
    pub signed_at: DateTime<Utc>,
}

/// One artifact in alphabetical (`artifact_id`) order: `execution.json`,
/// `job-events.json`, `plan.json`, `rollback-journal.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub artifact_id: String,
    pub canonical_json: String,
    pub sha256: String,
    pub byte_length: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImmutableStorage {
    pub worm_enabled: bool,
    pub retention_class: String,
}

/// `evidence_id = "evidence_" + first24(sha256(job_id|plan_hash|completed_at))`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub evidence_id: String,
    pub job_id: String,
    pub plan_id: String,
    pub plan_hash: String,
    pub contract_version: String,
    pub pit_algorithm_version: String,
    pub canonicalization_version: String,
    #[serde(with = "crate::canonical::iso8601")]
    pub backup_timestamp: DateTime<Utc>,
    pub approved_scope: serde_json::Value,
    pub schema_drift_summary: serde_json::Value,
    pub conflict_summary: serde_json::Value,
    pub delete_decision_summary: serde_json::Value,
    pub execution_outcomes: serde_json::Value,
    pub resume_metadata: serde_json::Value,
    pub approval: Option<serde_json::Value>,
    pub artifacts: Vec<Artifact>,
    pub artifact_hashes: Vec<String>,
    pub immutable_storage: ImmutableStorage,
    pub report_hash: String,
    pub manifest_signature: ManifestSignature,
}

/// Persisted container for `evidence_state`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EvidenceState {
    pub records: HashMap<String, EvidenceRecord>,
    pub evidence_id_by_job_id: HashMap<String, String>,
}

//! EvidenceService (C9)
//!
//! Assembles, signs, persists, and verifies the append-only evidence
//! manifest for a completed job. Evidence depends on
//! [`JobService`] (job lookup, job events) and [`ExecutionService`]
//! (execution record, rollback journal) and on an already-fetched
//! [`DryRunPlan`] for plan-derived summaries — the same by-reference
//! convention [`ExecutionService`] uses for plans.

use super::errors::{EvidenceError, EvidenceResult};
use super::signer::EvidenceSigner;
use super::types::{Artifact, EvidenceRecord, EvidenceState, ImmutableStorage, ManifestSignature, SignatureVerification};
use crate::auth::Claims;
use crate::canonical::{canonical_json, canonical_json_value, sha256_hex};
use crate::config::RcsConfig;
use crate::execution::ExecutionService;
use crate::job::JobService;
use crate::observability::audit::{AuditAction, AuditLog, AuditOutcome, AuditRecord, Lifecycle};
use crate::observability::{log_event_with_fields, Event};
use crate::plan::{ConflictClass, DeleteDecision, DryRunPlan};
use crate::store::{SnapshotStore, SnapshotStoreExt};
use serde_json::json;
use std::sync::Arc;

const EVIDENCE_STATE_KEY: &str = "evidence_state";
const CONTRACT_VERSION: &str = "audit.contracts.v1";
const SIGNATURE_ALGORITHM: &str = "ed25519";

pub struct EvidenceService {
    store: Arc<dyn SnapshotStore>,
    job_service: Arc<JobService>,
    execution_service: Arc<ExecutionService>,
    signer: Arc<EvidenceSigner>,
    config: RcsConfig,
    audit: Arc<dyn AuditLog>,
}

impl EvidenceService {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        job_service: Arc<JobService>,
        execution_service: Arc<ExecutionService>,
        signer: Arc<EvidenceSigner>,
        config: RcsConfig,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            store,
            job_service,
            execution_service,
            signer,
            config,
            audit,
        }
    }

    /// `exportEvidence(job_id)`: creates the manifest on first call, returns
    /// the existing one (unchanged) on every subsequent call for the same
    /// job.
    pub fn export_evidence(&self, job_id: &str, claims: &Claims, plan: &DryRunPlan) -> EvidenceResult<(EvidenceRecord, bool)> {
        let job = self.job_service.get_job(job_id, claims)?;

        let state = self.store.read_typed::<EvidenceState>(EVIDENCE_STATE_KEY)?;
        if let Some(evidence_id) = state.evidence_id_by_job_id.get(job_id) {
            let record = state
                .records
                .get(evidence_id)
                .cloned()
                .ok_or_else(|| EvidenceError::internal(format!("evidence index points at missing record '{evidence_id}'")))?;
            return Ok((record, true));
        }

        if !job.status.is_terminal() {
            return Err(EvidenceError::not_ready(job_id));
        }

        let execution = self.execution_service.get_execution(job_id, claims)?;
        let journal = self.execution_service.get_rollback_journal(job_id, claims)?;
        let job_events = self.job_service.list_job_events(job_id, claims)?;

        log_event_with_fields(Event::EvidenceExportStart, &[("job_id", job_id)]);

        let record = match self.assemble(&job, plan, &execution, &journal, &job_events) {
            Ok(record) => record,
            Err(e) => {
                log_event_with_fields(Event::EvidenceExportFailed, &[("job_id", job_id), ("reason_code", e.reason_code())]);
                self.audit
                    .append(
                        &AuditRecord::new(Lifecycle::Evidence, AuditAction::EvidenceExported, AuditOutcome::Failed)
                            .with_scope(&job.tenant_id, &job.instance_id, &job.source)
                            .with_plan_id(&job.plan_id)
                            .with_job_id(job_id)
                            .with_reason_code(e.reason_code()),
                    )
                    .ok();
                return Err(e);
            }
        };

        self.persist(&record)?;

        log_event_with_fields(Event::EvidenceExportComplete, &[("job_id", job_id), ("evidence_id", &record.evidence_id)]);
        log_event_with_fields(Event::ManifestSigned, &[("evidence_id", &record.evidence_id), ("key_id", self.signer.key_id())]);
        self.audit
            .append(
                &AuditRecord::new(Lifecycle::Evidence, AuditAction::EvidenceExported, AuditOutcome::Success)
                    .with_scope(&job.tenant_id, &job.instance_id, &job.source)
                    .with_plan_id(&job.plan_id)
                    .with_job_id(job_id),
            )
            .ok();

        Ok((record, false))
    }

    /// `ensureEvidence(job_id)`: same idempotent assembly as `exportEvidence`,
    /// for callers that only want the record, not the reuse flag.
    pub fn ensure_evidence(&self, job_id: &str, claims: &Claims, plan: &DryRunPlan) -> EvidenceResult<EvidenceRecord> {
        Ok(self.export_evidence(job_id, claims, plan)?.0)
    }

    pub fn get_evidence(&self, job_id: &str, claims: &Claims) -> EvidenceResult<EvidenceRecord> {
        self.job_service.get_job(job_id, claims)?;
        let state = self.store.read_typed::<EvidenceState>(EVIDENCE_STATE_KEY)?;
        let evidence_id = state.evidence_id_by_job_id.get(job_id).ok_or_else(|| EvidenceError::not_found(job_id))?;
        state.records.get(evidence_id).cloned().ok_or_else(|| EvidenceError::not_found(job_id))
    }

    pub fn get_evidence_by_id(&self, evidence_id: &str, claims: &Claims) -> EvidenceResult<EvidenceRecord> {
        let state = self.store.read_typed::<EvidenceState>(EVIDENCE_STATE_KEY)?;
        let record = state
            .records
            .get(evidence_id)
            .cloned()
            .ok_or_else(|| EvidenceError::not_found(evidence_id))?;
        self.job_service.get_job(&record.job_id, claims)?;
        Ok(record)
    }

    pub fn list_evidence(&self, claims: &Claims) -> EvidenceResult<Vec<EvidenceRecord>> {
        let jobs = self.job_service.list_jobs(claims)?;
        let state = self.store.read_typed::<EvidenceState>(EVIDENCE_STATE_KEY)?;
        Ok(jobs
            .iter()
            .filter_map(|j| state.evidence_id_by_job_id.get(&j.job_id))
            .filter_map(|evidence_id| state.records.get(evidence_id).cloned())
            .collect())
    }

    /// `validateEvidenceRecord(record)`: recomputes artifact hashes, the
    /// report hash, and the signature, in that order, and returns the first
    /// mismatch it finds.
    pub fn validate_evidence_record(&self, record: &EvidenceRecord) -> (SignatureVerification, &'static str) {
        let recomputed_hashes: Vec<String> = record.artifacts.iter().map(|a| sha256_hex(a.canonical_json.as_bytes())).collect();
        if recomputed_hashes != record.artifact_hashes {
            return (SignatureVerification::VerificationFailed, "failed_evidence_artifact_hash_mismatch");
        }

        let report_hash = match report_hash_of(record) {
            Ok(h) => h,
            Err(_) => return (SignatureVerification::VerificationFailed, "failed_internal_error"),
        };
        if report_hash != record.report_hash {
            return (SignatureVerification::VerificationFailed, "failed_evidence_report_hash_mismatch");
        }

        let payload = match manifest_payload_json(record, &report_hash) {
            Ok(p) => p,
            Err(_) => return (SignatureVerification::VerificationFailed, "failed_internal_error"),
        };
        if !self.signer.verify(&payload, &record.manifest_signature.signature) {
            return (SignatureVerification::VerificationFailed, "failed_evidence_signature_verification");
        }

        (SignatureVerification::Verified, "none")
    }

    fn assemble(
        &self,
        job: &crate::job::Job,
        plan: &DryRunPlan,
        execution: &crate::execution::ExecutionRecord,
        journal: &[crate::execution::RollbackJournalEntry],
        job_events: &[crate::job::JobEvent],
    ) -> EvidenceResult<EvidenceRecord> {
        // Step 1: collect artifacts in alphabetical artifact_id order.
        let execution_json = canonical_json(execution)?;
        let job_events_json = canonical_json(job_events)?;
        let plan_json = canonical_json(plan)?;
        let journal_json = canonical_json(journal)?;

        let mut artifacts = vec![
            build_artifact("execution.json", &execution_json)?,
            build_artifact("job-events.json", &job_events_json)?,
            build_artifact("plan.json", &plan_json)?,
            build_artifact("rollback-journal.json", &journal_json)?,
        ];
        artifacts.sort_by(|a, b| a.artifact_id.cmp(&b.artifact_id));
        let artifact_hashes: Vec<String> = artifacts.iter().map(|a| a.sha256.clone()).collect();

        let evidence_id = format!(
            "evidence_{}",
            &sha256_hex(format!("{}|{}|{}", job_id_or(job), plan.plan_hash, completed_at_or(job)).as_bytes())[..24]
        );

        let backup_timestamp = plan
            .watermarks
            .iter()
            .map(|w| w.indexed_through_time)
            .max()
            .unwrap_or(plan.generated_at);

        let mut record = EvidenceRecord {
            evidence_id,
            job_id: job.job_id.clone(),
            plan_id: plan.plan_id.clone(),
            plan_hash: plan.plan_hash.clone(),
            contract_version: CONTRACT_VERSION.to_string(),
            pit_algorithm_version: self.config.pit_algorithm_version.clone(),
            canonicalization_version: self.config.canonicalization_version.clone(),
            backup_timestamp,
            approved_scope: approved_scope_summary(plan),
            schema_drift_summary: conflict_class_summary(plan, ConflictClass::Schema),
            conflict_summary: conflict_summary(plan),
            delete_decision_summary: delete_decision_summary(plan),
            execution_outcomes: execution_outcomes_summary(execution),
            resume_metadata: json!({
                "resume_attempt_count": execution.resume_attempt_count,
                "checkpoint": execution.checkpoint,
            }),
            approval: plan.approval.clone(),
            artifacts,
            artifact_hashes,
            immutable_storage: ImmutableStorage {
                worm_enabled: true,
                retention_class: "restore-evidence-default".to_string(),
            },
            report_hash: String::new(),
            manifest_signature: ManifestSignature {
                signature_algorithm: SIGNATURE_ALGORITHM.to_string(),
                signer_key_id: self.signer.key_id().to_string(),
                signature: String::new(),
                signature_verification: SignatureVerification::VerificationPending,
                signed_at: chrono::Utc::now(),
            },
        };

        // Step 3: report_hash over the fixed field set.
        record.report_hash = report_hash_of(&record)?;

        // Step 4/5: manifest payload, sign.
        let payload = manifest_payload_json(&record, &record.report_hash)?;
        let signature = self.signer.sign(&payload);

        // Step 6: self-verify before persisting.
        if !self.signer.verify(&payload, &signature) {
            return Err(EvidenceError::signature_verification_failed(
                "freshly computed signature failed self-verification",
            ));
        }

        record.manifest_signature.signature = signature;
        record.manifest_signature.signature_verification = SignatureVerification::Verified;

        Ok(record)
    }

    fn persist(&self, record: &EvidenceRecord) -> EvidenceResult<()> {
        self.store.mutate_typed::<EvidenceState, _>(EVIDENCE_STATE_KEY, {
            let record = record.clone();
            move |state: &mut EvidenceState| {
                state.evidence_id_by_job_id.insert(record.job_id.clone(), record.evidence_id.clone());
                state.records.insert(record.evidence_id.clone(), record);
                Ok(())
            }
        })?;
        Ok(())
    }
}

fn job_id_or(job: &crate::job::Job) -> &str {
    &job.job_id
}

fn completed_at_or(job: &crate::job::Job) -> String {
    job.completed_at.map(|t| t.to_rfc3339()).unwrap_or_else(|| "pending".to_string())
}

fn build_artifact(artifact_id: &str, canonical_json: &str) -> EvidenceResult<Artifact> {
    Ok(Artifact {
        artifact_id: artifact_id.to_string(),
        sha256: sha256_hex(canonical_json.as_bytes()),
        byte_length: canonical_json.len() as u64,
        canonical_json: canonical_json.to_string(),
    })
}

fn approved_scope_summary(plan: &DryRunPlan) -> serde_json::Value {
    let mut tables: Vec<String> = plan.rows.iter().map(|r| r.table.clone()).collect();
    tables.sort();
    tables.dedup();
    json!({
        "tables": tables,
        "missing_row_mode": plan.execution_options.missing_row_mode,
        "conflict_policy": plan.execution_options.conflict_policy,
        "schema_compatibility_mode": plan.execution_options.schema_compatibility_mode,
        "workflow_mode": plan.execution_options.workflow_mode,
    })
}

fn conflict_class_summary(plan: &DryRunPlan, class: ConflictClass) -> serde_json::Value {
    let matching: Vec<&str> = plan
        .conflicts
        .iter()
        .filter(|c| c.class == class)
        .map(|c| c.conflict_id.as_str())
        .collect();
    json!({ "count": matching.len(), "conflict_ids": matching })
}

fn conflict_summary(plan: &DryRunPlan) -> serde_json::Value {
    let mut by_class: std::collections::BTreeMap<&'static str, u64> = std::collections::BTreeMap::new();
    for conflict in &plan.conflicts {
        let key = match conflict.class {
            ConflictClass::Value => "value",
            ConflictClass::MissingRow => "missing_row",
            ConflictClass::UnexpectedExisting => "unexpected_existing",
            ConflictClass::Reference => "reference",
            ConflictClass::Schema => "schema",
            ConflictClass::Permission => "permission",
            ConflictClass::Stale => "stale",
        };
        *by_class.entry(key).or_insert(0) += 1;
    }
    json!({ "total": plan.conflicts.len(), "by_class": by_class })
}

fn delete_decision_summary(plan: &DryRunPlan) -> serde_json::Value {
    let allow = plan
        .delete_candidates
        .iter()
        .filter(|c| c.decision == Some(DeleteDecision::AllowDeletion))
        .count();
    let deny = plan.delete_candidates.iter().filter(|c| c.decision == Some(DeleteDecision::Deny)).count();
    let undecided = plan.delete_candidates.len() - allow - deny;
    json!({ "total": plan.delete_candidates.len(), "allow_deletion": allow, "deny": deny, "undecided": undecided })
}

fn execution_outcomes_summary(execution: &crate::execution::ExecutionRecord) -> serde_json::Value {
    json!({
        "status": execution.status,
        "rows_applied": execution.summary.applied_rows,
        "rows_skipped": execution.summary.skipped_rows,
        "rows_failed": execution.summary.failed_rows,
        "media_applied": execution.summary.applied_media,
        "media_skipped": execution.summary.skipped_media,
        "media_failed": execution.summary.failed_media,
    })
}

fn report_hash_of(record: &EvidenceRecord) -> EvidenceResult<String> {
    let input = report_hash_input_json(record);
    Ok(sha256_hex(canonical_json_value(&input)?.as_bytes()))
}

fn report_hash_input_json(record: &EvidenceRecord) -> serde_json::Value {
    json!({
        "contract_version": record.contract_version,
        "evidence_id": record.evidence_id,
        "job_id": record.job_id,
        "plan_hash": record.plan_hash,
        "pit_algorithm_version": record.pit_algorithm_version,
        "backup_timestamp": record.backup_timestamp,
        "approved_scope": record.approved_scope,
        "schema_drift_summary": record.schema_drift_summary,
        "conflict_summary": record.conflict_summary,
        "delete_decision_summary": record.delete_decision_summary,
        "execution_outcomes": record.execution_outcomes,
        "resume_metadata": record.resume_metadata,
        "artifact_hashes": record.artifact_hashes,
        "canonicalization_version": record.canonicalization_version,
        "immutable_storage": record.immutable_storage,
        "approval": record.approval,
    })
}

fn manifest_payload_json(record: &EvidenceRecord, report_hash: &str) -> EvidenceResult<String> {
    let mut payload = report_hash_input_json(record);
    payload["report_hash"] = json!(report_hash);
    Ok(canonical_json_value(&payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Claims;
    use crate::execution::{AlwaysSucceedsEffector, ExecuteJobRequest, ExecutionService, WorkflowOptions};
    use crate::index_reader::{Executability, Freshness, Watermark};
    use crate::job::JobService;
    use crate::observability::audit::AuditLog;
    use crate::plan::{ExecutionOptions, Gate, Row, RowAction};
    use crate::scope_lock::ScopeLockManager;
    use crate::source_registry::{ServiceScope, SourceRegistry, SourceRegistryEntry};
    use crate::store::MemoryStore;
    use chrono::Utc;

    struct NullAudit;
    impl AuditLog for NullAudit {
        fn append(&self, _record: &AuditRecord) -> std::io::Result<()> {
            Ok(())
        }
        fn sync(&self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn claims() -> Claims {
        Claims {
            tenant_id: "tenant-a".into(),
            instance_id: "inst-1".into(),
            source: "pg-main".into(),
            service_scope: ServiceScope::Rrs,
            iat: 0,
            exp: 9_999_999_999,
            jti: "jti-1".into(),
            iss: "rcs-test".into(),
            sub: "operator-1".into(),
            aud: "rcs".into(),
        }
    }

    fn plan(plan_id: &str) -> DryRunPlan {
        DryRunPlan {
            plan_id: plan_id.to_string(),
            tenant_id: "tenant-a".into(),
            instance_id: "inst-1".into(),
            source: "pg-main".into(),
            plan_hash: format!("hash-{plan_id}"),
            plan_hash_input: json!({"plan_id": plan_id}),
            execution_options: ExecutionOptions {
                missing_row_mode: "skip".into(),
                conflict_policy: "manual".into(),
                schema_compatibility_mode: "strict".into(),
                workflow_mode: "standard".into(),
            },
            rows: vec![Row {
                row_id: "row-1".into(),
                table: "orders".into(),
                topic: "orders-cdc".into(),
                partition: 0,
                record_sys_id: "sys-1".into(),
                action: RowAction::Update,
                precondition_hash: "pre-1".into(),
                metadata: json!({}),
                diff_enc: None,
                before_image_enc: None,
                after_image_enc: None,
            }],
            conflicts: vec![],
            delete_candidates: vec![],
            media_candidates: vec![],
            pit_resolutions: vec![],
            watermarks: vec![Watermark {
                tenant_id: "tenant-a".into(),
                instance_id: "inst-1".into(),
                source: "pg-main".into(),
                topic: "orders-cdc".into(),
                partition: 0,
                generation_id: 1,
                indexed_through_offset: "100".into(),
                indexed_through_time: Utc::now(),
                coverage_start: Utc::now(),
                coverage_end: Utc::now(),
                measured_at: Utc::now(),
                freshness: Freshness::Fresh,
                executability: Executability::Executable,
                reason_code: "none",
            }],
            gate: Gate {
                executability: Executability::Executable,
                reason_code: "none",
            },
            generated_at: Utc::now(),
            requested_by: "operator-1".into(),
            approval: Some(json!({"approved_by": "operator-1"})),
        }
    }

    fn harness() -> (Arc<JobService>, Arc<ExecutionService>, EvidenceService) {
        let store: Arc<dyn SnapshotStore> = Arc::new(MemoryStore::new());
        let registry = SourceRegistry::new(vec![SourceRegistryEntry {
            tenant_id: "tenant-a".into(),
            instance_id: "inst-1".into(),
            source: "pg-main".into(),
        }]);
        let scope_lock = Arc::new(ScopeLockManager::new());
        let audit: Arc<dyn AuditLog> = Arc::new(NullAudit);
        let job_service = Arc::new(JobService::new(store.clone(), registry, None, scope_lock, audit.clone()));
        let execution_service = Arc::new(ExecutionService::new(
            store.clone(),
            job_service.clone(),
            RcsConfig::default(),
            audit.clone(),
            Arc::new(AlwaysSucceedsEffector),
        ));
        let signer = Arc::new(EvidenceSigner::generate("test-key"));
        let evidence_service = EvidenceService::new(store, job_service.clone(), execution_service.clone(), signer, RcsConfig::default(), audit);
        (job_service, execution_service, evidence_service)
    }

    fn run_job_to_completion(job_service: &JobService, execution_service: &ExecutionService, plan: &DryRunPlan) -> String {
        let job = job_service
            .create_job(
                crate::job::CreateJobRequest {
                    tenant_id: plan.tenant_id.clone(),
                    instance_id: plan.instance_id.clone(),
                    source: plan.source.clone(),
                    plan_id: plan.plan_id.clone(),
                    plan_hash: plan.plan_hash.clone(),
                    lock_scope_tables: vec!["orders".into()],
                    required_capabilities: vec!["restore_execute".into()],
                    requested_by: "operator-1".into(),
                },
                &claims(),
                plan,
            )
            .unwrap();
        execution_service
            .execute_job(
                &job.job_id,
                ExecuteJobRequest {
                    operator_id: "operator-1".into(),
                    operator_capabilities: vec!["restore_execute".into()],
                    chunk_size: None,
                    workflow: Some(WorkflowOptions {
                        mode: "standard".into(),
                        allowlist: vec![],
                    }),
                    runtime_conflicts: vec![],
                    elevated_confirmation: None,
                },
                &claims(),
                plan,
            )
            .unwrap();
        job.job_id
    }

    #[test]
    fn export_then_reexport_is_idempotent() {
        let (job_service, execution_service, evidence_service) = harness();
        let plan = plan("plan-1");
        let job_id = run_job_to_completion(&job_service, &execution_service, &plan);

        let (first, reused_first) = evidence_service.export_evidence(&job_id, &claims(), &plan).unwrap();
        assert!(!reused_first);
        let (second, reused_second) = evidence_service.export_evidence(&job_id, &claims(), &plan).unwrap();
        assert!(reused_second);
        assert_eq!(first.evidence_id, second.evidence_id);
        assert_eq!(first.report_hash, second.report_hash);

        let (verification, reason_code) = evidence_service.validate_evidence_record(&first);
        assert_eq!(verification, SignatureVerification::Verified);
        assert_eq!(reason_code, "none");
    }

    #[test]
    fn tampered_artifact_fails_hash_verification() {
        let (job_service, execution_service, evidence_service) = harness();
        let plan = plan("plan-2");
        let job_id = run_job_to_completion(&job_service, &execution_service, &plan);

        let (mut record, _) = evidence_service.export_evidence(&job_id, &claims(), &plan).unwrap();
        record.artifacts[0].canonical_json.push(' ');
        let (verification, reason_code) = evidence_service.validate_evidence_record(&record);
        assert_eq!(verification, SignatureVerification::VerificationFailed);
        assert_eq!(reason_code, "failed_evidence_artifact_hash_mismatch");
    }

    #[test]
    fn tampered_report_field_fails_report_hash_verification() {
        let (job_service, execution_service, evidence_service) = harness();
        let plan = plan("plan-3");
        let job_id = run_job_to_completion(&job_service, &execution_service, &plan);

        let (mut record, _) = evidence_service.export_evidence(&job_id, &claims(), &plan).unwrap();
        record.execution_outcomes["rows_applied"] = json!(9999);
        let (verification, reason_code) = evidence_service.validate_evidence_record(&record);
        assert_eq!(verification, SignatureVerification::VerificationFailed);
        assert_eq!(reason_code, "failed_evidence_report_hash_mismatch");
    }

    #[test]
    fn tampered_signature_fails_signature_verification() {
        let (job_service, execution_service, evidence_service) = harness();
        let plan = plan("plan-4");
        let job_id = run_job_to_completion(&job_service, &execution_service, &plan);

        let (mut record, _) = evidence_service.export_evidence(&job_id, &claims(), &plan).unwrap();
        record.manifest_signature.signature = "dGFtcGVyZWQ=".to_string();
        let (verification, reason_code) = evidence_service.validate_evidence_record(&record);
        assert_eq!(verification, SignatureVerification::VerificationFailed);
        assert_eq!(reason_code, "failed_evidence_signature_verification");
    }

    #[test]
    fn export_before_execution_is_not_ready() {
        let (job_service, _execution_service, evidence_service) = harness();
        let plan = plan("plan-5");
        let job = job_service
            .create_job(
                crate::job::CreateJobRequest {
                    tenant_id: plan.tenant_id.clone(),
                    instance_id: plan.instance_id.clone(),
                    source: plan.source.clone(),
                    plan_id: plan.plan_id.clone(),
                    plan_hash: plan.plan_hash.clone(),
                    lock_scope_tables: vec!["orders".into()],
                    required_capabilities: vec!["restore_execute".into()],
                    requested_by: "operator-1".into(),
                },
                &claims(),
                &plan,
            )
            .unwrap();
        let err = evidence_service.export_evidence(&job.job_id, &claims(), &plan).unwrap_err();
        assert_eq!(err.reason_code(), "blocked_evidence_not_ready");
    }
}

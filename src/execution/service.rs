//! ExecutionService (C8)
//!
//! Drives the chunked-apply / row-isolation-fallback / checkpoint-resume
//! lifecycle over an admitted, gated plan. Execution depends on
//! [`JobService`] to drive the job's `running ↔ paused ↔ completed|failed`
//! transitions and on an already-fetched [`DryRunPlan`] for row data; this
//! is the one legitimate direction of the Execution↔Jobs↔Plans cycle —
//! Execution calls Jobs' mutators, never the reverse.

use super::errors::{ExecutionError, ExecutionResult};
use super::types::{
    Checkpoint, Chunk, ChunkMode, ElevatedConfirmation, ExecuteJobRequest, ExecutionRecord, ExecutionState, ExecutionStatus,
    ExecutionSummary, MediaOutcome, MediaOutcomeKind, MirrorEntry, ResumeJobRequest, RollbackJournalEntry, RowOutcome,
    RowOutcomeKind, RuntimeConflict,
};
use crate::auth::Claims;
use crate::canonical::{sha256_hex, sha256_hex_of};
use crate::config::RcsConfig;
use crate::job::{Job, JobService, JobStatus};
use crate::observability::audit::{AuditAction, AuditLog, AuditOutcome, AuditRecord, Lifecycle};
use crate::observability::{log_event_with_fields, Event};
use crate::plan::{DryRunPlan, MediaCandidate, MediaDecision, Resolution, RowAction};
use crate::store::{SnapshotStore, SnapshotStoreExt};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const EXECUTION_STATE_KEY: &str = "execution_state";

/// Applies (or simulates applying) one media candidate. The authoritative
/// record system is an idealized, idempotent-per-row effector — this seam
/// exists so tests can exercise the retry-exhaustion path without a real
/// external system.
pub trait MediaEffector: Send + Sync {
    fn attempt(&self, candidate: &MediaCandidate, attempt: u32) -> bool;
}

/// Default effector: every attempt against an eligible candidate succeeds.
pub struct AlwaysSucceedsEffector;

impl MediaEffector for AlwaysSucceedsEffector {
    fn attempt(&self, _candidate: &MediaCandidate, _attempt: u32) -> bool {
        true
    }
}

pub struct ExecutionService {
    store: Arc<dyn SnapshotStore>,
    job_service: Arc<JobService>,
    config: RcsConfig,
    audit: Arc<dyn AuditLog>,
    media_effector: Arc<dyn MediaEffector>,
}

impl ExecutionService {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        job_service: Arc<JobService>,
        config: RcsConfig,
        audit: Arc<dyn AuditLog>,
        media_effector: Arc<dyn MediaEffector>,
    ) -> Self {
        Self {
            store,
            job_service,
            config,
            audit,
            media_effector,
        }
    }

    pub fn execute_job(&self, job_id: &str, request: ExecuteJobRequest, claims: &Claims, plan: &DryRunPlan) -> ExecutionResult<ExecutionRecord> {
        let job = self.job_service.get_job(job_id, claims)?;
        if job.status != JobStatus::Running {
            return Err(ExecutionError::state_precondition(format!("job '{job_id}' is not running")));
        }
        self.check_plan_binding(&job, plan)?;
        validate_plan_conflicts_resolved(plan)?;
        let runtime_conflicts = validate_runtime_conflicts(plan, &request.runtime_conflicts)?;

        let (required_caps, exceeded) = required_capabilities(plan, runtime_conflicts.len(), &self.config);
        check_capability_set(&required_caps, &request.operator_capabilities, &exceeded)?;
        if required_caps.contains("restore_override_caps") {
            check_elevated_confirmation(&request.elevated_confirmation, &exceeded)?;
        }

        let chunk_size = request.chunk_size.unwrap_or(self.config.default_chunk_size).max(1);
        let total_chunks = ((plan.rows.len() as u32) + chunk_size - 1) / chunk_size.max(1);
        let workflow = request.workflow.unwrap_or(super::types::WorkflowOptions {
            mode: plan.execution_options.workflow_mode.clone(),
            allowlist: vec![],
        });

        let mut record = ExecutionRecord {
            job_id: job_id.to_string(),
            plan_id: plan.plan_id.clone(),
            plan_hash: plan.plan_hash.clone(),
            plan_checksum: plan_checksum(plan)?,
            precondition_checksum: precondition_checksum(plan)?,
            status: ExecutionStatus::Running,
            reason_code: "none".to_string(),
            chunk_size,
            workflow_mode: workflow.mode,
            workflow_allowlist: workflow.allowlist,
            capabilities_used: required_caps,
            elevated_confirmation_used: request.elevated_confirmation.as_ref().map(ElevatedConfirmation::is_valid).unwrap_or(false),
            resume_attempt_count: 0,
            checkpoint: Checkpoint {
                checkpoint_id: format!("ckpt_{job_id}"),
                next_chunk_index: 0,
                total_chunks,
                last_chunk_id: None,
                row_attempt_by_row: HashMap::new(),
                updated_at: Utc::now(),
            },
            summary: ExecutionSummary::default(),
            chunks: vec![],
            row_outcomes: vec![],
            media_outcomes: vec![],
        };

        self.run_attempt(&job, plan, &mut record, &runtime_conflicts, &request.operator_id, claims)?;
        Ok(record)
    }

    pub fn resume_job(&self, job_id: &str, request: ResumeJobRequest, claims: &Claims, plan: &DryRunPlan) -> ExecutionResult<ExecutionRecord> {
        let job = self.job_service.get_job(job_id, claims)?;
        let mut record = self.read_record(job_id)?;

        if record.status.is_terminal() {
            return Ok(record);
        }
        if job.status != JobStatus::Paused {
            return Err(ExecutionError::state_precondition(format!("job '{job_id}' is not paused")));
        }
        self.check_plan_binding(&job, plan)?;

        if let Some(expected) = &request.expected_plan_checksum {
            if expected != &record.plan_checksum {
                return Err(ExecutionError::resume_precondition_mismatch("expected_plan_checksum does not match"));
            }
        }
        if let Some(expected) = &request.expected_precondition_checksum {
            if expected != &record.precondition_checksum {
                return Err(ExecutionError::resume_precondition_mismatch("expected_precondition_checksum does not match"));
            }
        }
        if record.checkpoint.next_chunk_index > record.checkpoint.total_chunks {
            return Err(ExecutionError::resume_checkpoint_missing("checkpoint is inconsistent with total_chunks"));
        }

        let have: HashSet<&str> = request.operator_capabilities.iter().map(|s| s.as_str()).collect();
        if let Some(missing) = record.capabilities_used.iter().find(|c| !have.contains(c.as_str())) {
            return Err(ExecutionError::missing_capability(format!("resume is missing capability '{missing}'")));
        }

        validate_plan_conflicts_resolved(plan)?;
        let runtime_conflicts = validate_runtime_conflicts(plan, &request.runtime_conflicts)?;

        self.job_service.resume_paused_job(job_id, claims)?;
        let job = self.job_service.get_job(job_id, claims)?;
        self.run_attempt(&job, plan, &mut record, &runtime_conflicts, &request.operator_id, claims)?;
        Ok(record)
    }

    pub fn get_execution(&self, job_id: &str, claims: &Claims) -> ExecutionResult<ExecutionRecord> {
        self.job_service.get_job(job_id, claims)?;
        self.read_record(job_id)
    }

    pub fn list_executions(&self, claims: &Claims) -> ExecutionResult<Vec<ExecutionRecord>> {
        let jobs = self.job_service.list_jobs(claims)?;
        let state = self.store.read_typed::<ExecutionState>(EXECUTION_STATE_KEY)?;
        Ok(jobs.iter().filter_map(|j| state.records.get(&j.job_id).cloned()).collect())
    }

    pub fn get_checkpoint(&self, job_id: &str, claims: &Claims) -> ExecutionResult<Checkpoint> {
        Ok(self.get_execution(job_id, claims)?.checkpoint)
    }

    pub fn get_rollback_journal(&self, job_id: &str, claims: &Claims) -> ExecutionResult<Vec<RollbackJournalEntry>> {
        self.job_service.get_job(job_id, claims)?;
        let state = self.store.read_typed::<ExecutionState>(EXECUTION_STATE_KEY)?;
        Ok(state.rollback_journal_by_job_id.get(job_id).cloned().unwrap_or_default())
    }

    fn check_plan_binding(&self, job: &Job, plan: &DryRunPlan) -> ExecutionResult<()> {
        if plan.plan_id != job.plan_id || plan.plan_hash != job.plan_hash {
            return Err(ExecutionError::plan_hash_mismatch("plan_id/plan_hash do not match the job's admitted plan"));
        }
        if !matches!(plan.gate.executability, crate::index_reader::Executability::Executable) {
            return Err(ExecutionError::gate_not_executable(plan.gate.reason_code));
        }
        Ok(())
    }

    fn read_record(&self, job_id: &str) -> ExecutionResult<ExecutionRecord> {
        let state = self.store.read_typed::<ExecutionState>(EXECUTION_STATE_KEY)?;
        state
            .records
            .get(job_id)
            .cloned()
            .ok_or_else(|| ExecutionError::resume_checkpoint_missing(format!("no execution record for job '{job_id}'")))
    }

    /// Runs one attempt (one `executeJob` or `resumeJob` call) of chunked
    /// apply against `record`, persists the result, and drives the job to
    /// `paused` (chunk budget exhausted) or `completed|failed` (terminal).
    fn run_attempt(
        &self,
        job: &Job,
        plan: &DryRunPlan,
        record: &mut ExecutionRecord,
        runtime_conflicts: &HashMap<String, RuntimeConflict>,
        operator_id: &str,
        claims: &Claims,
    ) -> ExecutionResult<()> {
        let (journal_entries, mirror_entries, chunks_processed, paused_for_budget) =
            apply_chunks(plan, record, runtime_conflicts, operator_id, self.config.max_chunks_per_attempt);

        // resume_attempt_count only advances when this attempt actually
        // moved the checkpoint forward; an idempotent terminal re-entry
        // never reaches this function.
        if chunks_processed > 0 {
            record.resume_attempt_count += 1;
        }

        if paused_for_budget {
            record.status = ExecutionStatus::Paused;
            record.reason_code = "paused_token_refresh_grace_exhausted".to_string();
            self.persist(record, &journal_entries, &mirror_entries)?;
            self.job_service.pause_job(&job.job_id, claims, "paused_token_refresh_grace_exhausted")?;
            log_event_with_fields(Event::ExecutionPaused, &[("job_id", &job.job_id)]);
            return Ok(());
        }

        // All chunks done this attempt: run the media pipeline exactly once,
        // on the attempt that completes the final chunk.
        let media_outcomes = run_media_pipeline(plan, &self.config, self.media_effector.as_ref());
        for m in &media_outcomes {
            match m.outcome {
                MediaOutcomeKind::Applied => record.summary.applied_media += 1,
                MediaOutcomeKind::Skipped => record.summary.skipped_media += 1,
                MediaOutcomeKind::Failed => record.summary.failed_media += 1,
            }
        }
        record.media_outcomes = media_outcomes;

        let failed = record.summary.failed_rows > 0 || record.summary.failed_media > 0;
        let reason_code = if failed {
            record
                .media_outcomes
                .iter()
                .find(|m| m.outcome == MediaOutcomeKind::Failed)
                .map(|m| m.reason_code.clone())
                .unwrap_or_else(|| "failed_internal_error".to_string())
        } else {
            "none".to_string()
        };
        record.status = if failed { ExecutionStatus::Failed } else { ExecutionStatus::Completed };
        record.reason_code = reason_code.clone();

        self.persist(record, &journal_entries, &mirror_entries)?;
        self.job_service.complete_job(&job.job_id, claims, failed, &reason_code)?;

        let (event, outcome) = if failed {
            (Event::ExecutionFailed, AuditOutcome::Failed)
        } else {
            (Event::ExecutionComplete, AuditOutcome::Success)
        };
        self.audit
            .append(
                &AuditRecord::new(Lifecycle::Execute, AuditAction::Completed, outcome)
                    .with_job_id(&job.job_id)
                    .with_reason_code(&reason_code),
            )
            .ok();
        log_event_with_fields(event, &[("job_id", &job.job_id), ("reason_code", &reason_code)]);
        Ok(())
    }

    fn persist(&self, record: &ExecutionRecord, journal_entries: &[RollbackJournalEntry], mirror_entries: &[MirrorEntry]) -> ExecutionResult<()> {
        let job_id = record.job_id.clone();
        let record = record.clone();
        let journal_entries = journal_entries.to_vec();
        let mirror_entries = mirror_entries.to_vec();
        self.store
            .mutate_typed::<ExecutionState, _>(EXECUTION_STATE_KEY, move |state| {
                state.records.insert(job_id.clone(), record.clone());
                state.rollback_journal_by_job_id.entry(job_id.clone()).or_default().extend(journal_entries.clone());
                state.mirror_by_job_id.entry(job_id.clone()).or_default().extend(mirror_entries.clone());
                Ok(())
            })
            .map_err(ExecutionError::from)
    }
}

fn plan_checksum(plan: &DryRunPlan) -> ExecutionResult<String> {
    sha256_hex_of(&plan.plan_hash_input).map_err(|e| ExecutionError::internal(e.to_string()))
}

fn precondition_checksum(plan: &DryRunPlan) -> ExecutionResult<String> {
    let value = serde_json::json!({
        "gate": plan.gate,
        "delete_candidates": plan.delete_candidates,
        "conflicts": plan.conflicts,
        "watermarks": plan.watermarks,
    });
    sha256_hex_of(&value).map_err(|e| ExecutionError::internal(e.to_string()))
}

fn validate_plan_conflicts_resolved(plan: &DryRunPlan) -> ExecutionResult<()> {
    for c in &plan.conflicts {
        if c.class.is_reference() || c.resolution == Some(Resolution::AbortAndReplan) {
            return Err(ExecutionError::unresolved_conflict(
                c.class.gate_reason_code(),
                format!("plan conflict '{}' blocks execution", c.conflict_id),
            ));
        }
        if c.resolution.is_none() {
            return Err(ExecutionError::unresolved_conflict(
                c.class.gate_reason_code(),
                format!("plan conflict '{}' is unresolved", c.conflict_id),
            ));
        }
    }
    Ok(())
}

fn validate_runtime_conflicts(plan: &DryRunPlan, runtime_conflicts: &[RuntimeConflict]) -> ExecutionResult<HashMap<String, RuntimeConflict>> {
    let row_ids: HashSet<&str> = plan.rows.iter().map(|r| r.row_id.as_str()).collect();
    let mut seen_conflict_ids = HashSet::new();
    let mut by_row: HashMap<String, RuntimeConflict> = HashMap::new();

    for rc in runtime_conflicts {
        if !row_ids.contains(rc.row_id.as_str()) {
            return Err(ExecutionError::invalid_request(format!("runtime conflict row_id '{}' is not in the plan", rc.row_id)));
        }
        if !seen_conflict_ids.insert(rc.conflict_id.clone()) {
            return Err(ExecutionError::invalid_request(format!("duplicate runtime conflict_id '{}'", rc.conflict_id)));
        }
        if by_row.contains_key(&rc.row_id) {
            return Err(ExecutionError::invalid_request(format!("duplicate runtime conflict for row_id '{}'", rc.row_id)));
        }
        if rc.class.is_reference() {
            match rc.resolution {
                Some(Resolution::Skip) => {
                    return Err(ExecutionError::invalid_request("reference_conflict may not resolve to skip"));
                }
                None => {
                    return Err(ExecutionError::unresolved_conflict(
                        "blocked_reference_conflict",
                        format!("runtime conflict '{}' (reference) is unresolved", rc.conflict_id),
                    ));
                }
                _ => {}
            }
        }
        by_row.insert(rc.row_id.clone(), rc.clone());
    }
    Ok(by_row)
}

fn required_capabilities(plan: &DryRunPlan, runtime_conflict_row_count: usize, config: &RcsConfig) -> (HashSet<String>, Vec<String>) {
    let mut caps = HashSet::new();
    caps.insert("restore_execute".to_string());

    let needs_delete = plan.rows.iter().any(|r| r.action == RowAction::Delete)
        || plan
            .delete_candidates
            .iter()
            .any(|d| d.decision == Some(crate::plan::DeleteDecision::AllowDeletion));
    if needs_delete {
        caps.insert("restore_delete".to_string());
    }
    if plan.execution_options.schema_compatibility_mode == "manual_override" {
        caps.insert("restore_schema_override".to_string());
    }

    let planned_rows = plan.rows.len() as f64;
    let planned_skip_rows = plan.rows.iter().filter(|r| r.action == RowAction::Skip).count() as f64;
    let skip_ratio = if planned_rows > 0.0 {
        (planned_skip_rows + runtime_conflict_row_count as f64) / planned_rows * 100.0
    } else {
        0.0
    };
    let media_count = plan.media_candidates.len() as u64;
    let media_bytes: u64 = plan.media_candidates.iter().map(|m| m.byte_size).sum();

    let mut exceeded = Vec::new();
    if plan.rows.len() as u64 > config.max_rows {
        exceeded.push(format!("row count {} exceeds cap {}", plan.rows.len(), config.max_rows));
    }
    if skip_ratio > config.elevated_skip_ratio_percent {
        exceeded.push(format!("skip ratio {skip_ratio:.1}% exceeds cap {:.1}%", config.elevated_skip_ratio_percent));
    }
    if media_count > config.media_max_items {
        exceeded.push("attachment/media item count exceeds cap".to_string());
    }
    if media_bytes > config.media_max_bytes {
        exceeded.push("byte total exceeds cap".to_string());
    }
    if !exceeded.is_empty() {
        caps.insert("restore_override_caps".to_string());
    }
    (caps, exceeded)
}

fn check_capability_set(required: &HashSet<String>, operator_capabilities: &[String], exceeded: &[String]) -> ExecutionResult<()> {
    let have: HashSet<&str> = operator_capabilities.iter().map(|s| s.as_str()).collect();
    let missing: Vec<&String> = required.iter().filter(|c| !have.contains(c.as_str())).collect();
    if missing.is_empty() {
        return Ok(());
    }
    if missing.len() == 1 && missing[0] == "restore_override_caps" && !exceeded.is_empty() {
        return Err(ExecutionError::missing_capability(exceeded.join("; ")));
    }
    let names: Vec<&str> = missing.iter().map(|s| s.as_str()).collect();
    let mut message = format!("missing required capabilities: {}", names.join(", "));
    if names.contains(&"restore_override_caps") && !exceeded.is_empty() {
        message.push_str(&format!(" ({})", exceeded.join("; ")));
    }
    Err(ExecutionError::missing_capability(message))
}

fn check_elevated_confirmation(confirmation: &Option<ElevatedConfirmation>, exceeded: &[String]) -> ExecutionResult<()> {
    match confirmation {
        Some(ec) if ec.is_valid() => Ok(()),
        _ => Err(ExecutionError::missing_capability(format!(
            "elevated confirmation required: {}",
            exceeded.join("; ")
        ))),
    }
}

/// Processes chunks starting at `record.checkpoint.next_chunk_index`, up to
/// `max_chunks_this_attempt` (0 = unbounded), mutating `record` in place and
/// returning the new rollback/mirror entries plus whether the attempt paused
/// for exhausting its chunk budget.
fn apply_chunks(
    plan: &DryRunPlan,
    record: &mut ExecutionRecord,
    runtime_conflicts: &HashMap<String, RuntimeConflict>,
    operator_id: &str,
    max_chunks_this_attempt: u32,
) -> (Vec<RollbackJournalEntry>, Vec<MirrorEntry>, u32, bool) {
    let mut journal_entries = Vec::new();
    let mut mirror_entries = Vec::new();
    let mut processed_this_attempt = 0u32;
    let mut paused = false;

    while record.checkpoint.next_chunk_index < record.checkpoint.total_chunks {
        if max_chunks_this_attempt > 0 && processed_this_attempt >= max_chunks_this_attempt {
            paused = true;
            break;
        }
        let chunk_index = record.checkpoint.next_chunk_index;
        let start = (chunk_index * record.chunk_size) as usize;
        let end = (start + record.chunk_size as usize).min(plan.rows.len());
        let rows = &plan.rows[start..end];
        let row_fallback = rows.iter().any(|r| runtime_conflicts.contains_key(&r.row_id));
        let chunk_id = format!("chunk_{}_{chunk_index:04}", record.job_id);

        let mut applied_count = 0u32;
        let mut skipped_count = 0u32;
        let failed_count = 0u32;

        for row in rows {
            let attempt_no = {
                let slot = record.checkpoint.row_attempt_by_row.entry(row.row_id.clone()).or_insert(0);
                *slot += 1;
                *slot
            };

            let (outcome, reason_code) = if row.action == RowAction::Skip {
                (RowOutcomeKind::Skipped, "none".to_string())
            } else if let Some(rc) = runtime_conflicts.get(&row.row_id) {
                (RowOutcomeKind::Skipped, rc.class.gate_reason_code().to_string())
            } else {
                (RowOutcomeKind::Applied, "none".to_string())
            };

            match outcome {
                RowOutcomeKind::Applied => {
                    applied_count += 1;
                    record.summary.applied_rows += 1;
                    if row.has_before_image_candidate() {
                        let journal_id = sha256_hex(format!("{}|{}|{}|{attempt_no}", record.job_id, record.plan_hash, row.row_id).as_bytes());
                        let now = Utc::now();
                        let entry = RollbackJournalEntry {
                            journal_id: journal_id.clone(),
                            job_id: record.job_id.clone(),
                            plan_row_id: row.row_id.clone(),
                            table: row.table.clone(),
                            record_sys_id: row.record_sys_id.clone(),
                            action: format!("{:?}", row.action).to_lowercase(),
                            before_image_enc: row.before_image_enc.clone(),
                            chunk_id: chunk_id.clone(),
                            row_attempt: attempt_no,
                            executed_by: operator_id.to_string(),
                            executed_at: now,
                        };
                        mirror_entries.push(MirrorEntry {
                            mirror_id: sha256_hex(journal_id.as_bytes()),
                            journal_id: journal_id.clone(),
                            job_id: record.job_id.clone(),
                            plan_row_id: row.row_id.clone(),
                            table: row.table.clone(),
                            record_sys_id: row.record_sys_id.clone(),
                            outcome: "applied".to_string(),
                            reason_code: "none".to_string(),
                            linked_at: now,
                        });
                        journal_entries.push(entry);
                    }
                }
                RowOutcomeKind::Skipped => {
                    skipped_count += 1;
                    record.summary.skipped_rows += 1;
                }
                RowOutcomeKind::Failed => {
                    record.summary.failed_rows += 1;
                }
            }

            record.row_outcomes.push(RowOutcome {
                row_id: row.row_id.clone(),
                chunk_id: chunk_id.clone(),
                outcome,
                reason_code,
                attempt: attempt_no,
            });
        }

        record.chunks.push(Chunk {
            chunk_id: chunk_id.clone(),
            chunk_index,
            row_ids: rows.iter().map(|r| r.row_id.clone()).collect(),
            mode: if row_fallback { ChunkMode::RowFallback } else { ChunkMode::Normal },
            applied_count,
            skipped_count,
            failed_count,
        });

        record.checkpoint.next_chunk_index = chunk_index + 1;
        record.checkpoint.last_chunk_id = Some(chunk_id);
        record.checkpoint.updated_at = Utc::now();
        processed_this_attempt += 1;
    }

    (journal_entries, mirror_entries, processed_this_attempt, paused)
}

fn run_media_pipeline(plan: &DryRunPlan, config: &RcsConfig, effector: &dyn MediaEffector) -> Vec<MediaOutcome> {
    plan.media_candidates
        .iter()
        .map(|c| match c.decision {
            None | Some(MediaDecision::Exclude) => MediaOutcome {
                candidate_id: c.candidate_id.clone(),
                outcome: MediaOutcomeKind::Skipped,
                reason_code: "none".to_string(),
                attempts: 0,
            },
            Some(MediaDecision::Include) => {
                if !c.parent_record_exists {
                    return MediaOutcome {
                        candidate_id: c.candidate_id.clone(),
                        outcome: MediaOutcomeKind::Failed,
                        reason_code: "failed_media_parent_missing".to_string(),
                        attempts: 0,
                    };
                }
                if let (Some(expected), Some(observed)) = (&c.expected_hash, &c.observed_hash) {
                    if expected != observed {
                        return MediaOutcome {
                            candidate_id: c.candidate_id.clone(),
                            outcome: MediaOutcomeKind::Failed,
                            reason_code: "failed_media_hash_mismatch".to_string(),
                            attempts: 0,
                        };
                    }
                }
                let max_attempts = c.max_retry_attempts.unwrap_or(config.max_retry_attempts).max(1);
                for attempt in 1..=max_attempts {
                    if effector.attempt(c, attempt) {
                        return MediaOutcome {
                            candidate_id: c.candidate_id.clone(),
                            outcome: MediaOutcomeKind::Applied,
                            reason_code: "none".to_string(),
                            attempts: attempt,
                        };
                    }
                }
                MediaOutcome {
                    candidate_id: c.candidate_id.clone(),
                    outcome: MediaOutcomeKind::Failed,
                    reason_code: "failed_media_retry_exhausted".to_string(),
                    attempts: max_attempts,
                }
            }
        })
        .collect()
}

//! JobService (C7)
//!
//! Creation, lifecycle transitions, per-job event log, and the
//! cross-service audit event projection.
//!
//! Job creation needs read access to the admitting [`DryRunPlan`](crate::plan::DryRunPlan)
//! to verify the `(plan_id, plan_hash)` match and the gate is executable.
//! Rather than giving `JobService` a dependency on `PlanService` — which
//! would create a two-way service coupling — the composition root looks
//! the plan up first and passes it in by reference.

use super::errors::{JobError, JobErrorCode, JobResult};
use super::types::{CreateJobRequest, CrossServiceEvent, Job, JobEvent, JobState, JobStatus};
use crate::auth::Claims;
use crate::canonical::sha256_hex;
use crate::index_reader::Executability;
use crate::observability::audit::{AuditAction, AuditLog, AuditOutcome, AuditRecord, Lifecycle};
use crate::observability::{log_event_with_fields, Event};
use crate::plan::DryRunPlan;
use crate::scope_lock::{AcquireOutcome, ScopeKey, ScopeLockManager};
use crate::source_registry::{resolve_effective_source, MappingResolver, ServiceScope, SourceRegistry};
use crate::store::{SnapshotStore, SnapshotStoreExt};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

const JOB_STATE_KEY: &str = "job_state";

pub struct JobService {
    store: Arc<dyn SnapshotStore>,
    registry: SourceRegistry,
    resolver: Option<Arc<dyn MappingResolver>>,
    scope_lock: Arc<ScopeLockManager>,
    audit: Arc<dyn AuditLog>,
}

impl JobService {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        registry: SourceRegistry,
        resolver: Option<Arc<dyn MappingResolver>>,
        scope_lock: Arc<ScopeLockManager>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            store,
            registry,
            resolver,
            scope_lock,
            audit,
        }
    }

    /// Creates a job admitted against `plan`. `plan` must already have been
    /// fetched and scope-checked by the caller.
    pub fn create_job(&self, request: CreateJobRequest, claims: &Claims, plan: &DryRunPlan) -> JobResult<Job> {
        if !claims.matches_scope(&request.tenant_id, &request.instance_id, &request.source) {
            return Err(JobError::invalid_request("claim scope does not match request"));
        }

        resolve_effective_source(
            &self.registry,
            self.resolver.as_deref(),
            &request.tenant_id,
            &request.instance_id,
            &request.source,
            claims.service_scope,
        )?;

        if plan.plan_id != request.plan_id || plan.plan_hash != request.plan_hash {
            return Err(JobError::plan_hash_mismatch(format!(
                "plan_id/plan_hash do not match plan '{}'",
                request.plan_id
            )));
        }
        if !plan.matches_scope(&request.tenant_id, &request.instance_id, &request.source) {
            return Err(JobError::not_found(&request.plan_id));
        }
        if !matches!(plan.gate.executability, Executability::Executable) {
            return Err(JobError::plan_not_executable(plan.gate.reason_code));
        }

        let job_id = generate_job_id(&request.tenant_id, &request.plan_id);
        let key = ScopeKey {
            tenant_id: request.tenant_id.clone(),
            instance_id: request.instance_id.clone(),
        };
        let tables: HashSet<String> = request.lock_scope_tables.iter().cloned().collect();
        let outcome = self.scope_lock.acquire(&key, &job_id, tables);

        let now = Utc::now();
        let (status, status_reason_code, wait_reason_code, queue_position, started_at) = match &outcome {
            AcquireOutcome::Running => (JobStatus::Running, "none".to_string(), None, None, Some(now)),
            AcquireOutcome::Queued {
                reason_code,
                queue_position,
                ..
            } => (
                JobStatus::Queued,
                reason_code.to_string(),
                Some(reason_code.to_string()),
                Some(*queue_position),
                None,
            ),
        };

        let job = Job {
            job_id: job_id.clone(),
            tenant_id: request.tenant_id.clone(),
            instance_id: request.instance_id.clone(),
            source: request.source.clone(),
            plan_id: request.plan_id.clone(),
            plan_hash: request.plan_hash.clone(),
            status,
            status_reason_code,
            wait_reason_code,
            required_capabilities: request.required_capabilities,
            lock_scope_tables: request.lock_scope_tables,
            requested_by: request.requested_by,
            requested_at: now,
            started_at,
            completed_at: None,
            queue_position,
        };

        self.store.mutate_typed::<JobState, _>(JOB_STATE_KEY, |state| {
            state.jobs.insert(job_id.clone(), job.clone());
            Ok(())
        })?;

        self.append_event(&job_id, "plan", "job_created", "accepted", "none")?;
        if matches!(outcome, AcquireOutcome::Queued { .. }) {
            self.append_event(&job_id, "execute", "queued_for_lock", "queued", "queued_scope_lock")?;
        }

        self.audit
            .append(
                &AuditRecord::new(Lifecycle::Plan, AuditAction::JobCreated, AuditOutcome::Success)
                    .with_scope(&job.tenant_id, &job.instance_id, &job.source)
                    .with_plan_id(&job.plan_id)
                    .with_job_id(&job.job_id),
            )
            .ok();
        log_event_with_fields(Event::JobCreated, &[("job_id", &job_id), ("status", job.status.as_str())]);

        Ok(job)
    }

    pub fn get_job(&self, job_id: &str, claims: &Claims) -> JobResult<Job> {
        let state = self.store.read_typed::<JobState>(JOB_STATE_KEY)?;
        let job = state.jobs.get(job_id).ok_or_else(|| JobError::not_found(job_id))?;
        if !job.matches_scope(&claims.tenant_id, &claims.instance_id, &claims.source) {
            return Err(JobError::not_found(job_id));
        }
        Ok(job.clone())
    }

    pub fn list_jobs(&self, claims: &Claims) -> JobResult<Vec<Job>> {
        let state = self.store.read_typed::<JobState>(JOB_STATE_KEY)?;
        let mut jobs: Vec<Job> = state
            .jobs
            .values()
            .filter(|j| j.matches_scope(&claims.tenant_id, &claims.instance_id, &claims.source))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| a.job_id.cmp(&b.job_id));
        Ok(jobs)
    }

    pub fn pause_job(&self, job_id: &str, claims: &Claims, reason_code: &str) -> JobResult<Job> {
        let job = self.transition(job_id, claims, |job| {
            if job.status != JobStatus::Running {
                return Err(JobError::invalid_state_transition(format!(
                    "job '{job_id}' is not running"
                )));
            }
            job.status = JobStatus::Paused;
            job.status_reason_code = reason_code.to_string();
            Ok(())
        })?;
        self.append_event(job_id, "execute", "paused", "success", reason_code)?;
        self.audit
            .append(
                &AuditRecord::new(Lifecycle::Execute, AuditAction::Paused, AuditOutcome::Success)
                    .with_job_id(job_id)
                    .with_reason_code(reason_code),
            )
            .ok();
        log_event_with_fields(Event::JobPaused, &[("job_id", job_id), ("reason_code", reason_code)]);
        Ok(job)
    }

    pub fn resume_paused_job(&self, job_id: &str, claims: &Claims) -> JobResult<Job> {
        let job = self.transition(job_id, claims, |job| {
            if job.status != JobStatus::Paused {
                return Err(JobError::invalid_state_transition(format!(
                    "job '{job_id}' is not paused"
                )));
            }
            job.status = JobStatus::Running;
            job.status_reason_code = "none".to_string();
            Ok(())
        })?;
        self.append_event(job_id, "execute", "resumed", "success", "none")?;
        self.audit
            .append(&AuditRecord::new(Lifecycle::Execute, AuditAction::Resumed, AuditOutcome::Success).with_job_id(job_id))
            .ok();
        log_event_with_fields(Event::JobResumed, &[("job_id", job_id)]);
        Ok(job)
    }

    /// Marks a job terminal (`completed` or `failed`), releases its scope
    /// lock, and promotes the next FIFO-eligible queued jobs. Returns the
    /// promoted job ids in FIFO order.
    pub fn complete_job(&self, job_id: &str, claims: &Claims, failed: bool, reason_code: &str) -> JobResult<(Job, Vec<String>)> {
        let now = Utc::now();
        let terminal_status = if failed { JobStatus::Failed } else { JobStatus::Completed };
        let job = self.transition(job_id, claims, |job| {
            if job.status != JobStatus::Running {
                return Err(JobError::invalid_state_transition(format!(
                    "job '{job_id}' is not running"
                )));
            }
            job.status = terminal_status;
            job.status_reason_code = reason_code.to_string();
            job.completed_at = Some(now);
            Ok(())
        })?;

        let key = ScopeKey {
            tenant_id: job.tenant_id.clone(),
            instance_id: job.instance_id.clone(),
        };
        let promoted = self.scope_lock.release(&key, job_id);

        let (action, outcome_label, event) = if failed {
            ("failed", AuditOutcome::Failed, Event::JobFailed)
        } else {
            ("completed", AuditOutcome::Success, Event::JobCompleted)
        };
        self.append_event(job_id, "execute", action, outcome_label.as_str(), reason_code)?;
        self.audit
            .append(
                &AuditRecord::new(Lifecycle::Execute, if failed { AuditAction::Failed } else { AuditAction::Completed }, outcome_label)
                    .with_job_id(job_id)
                    .with_reason_code(reason_code),
            )
            .ok();
        log_event_with_fields(event, &[("job_id", job_id), ("reason_code", reason_code)]);

        for promoted_id in &promoted {
            self.store.mutate_typed::<JobState, _>(JOB_STATE_KEY, |state| {
                if let Some(j) = state.jobs.get_mut(promoted_id) {
                    j.status = JobStatus::Running;
                    j.status_reason_code = "none".to_string();
                    j.wait_reason_code = None;
                    j.queue_position = None;
                    j.started_at = Some(now);
                }
                Ok(())
            })?;
            self.append_event(promoted_id, "execute", "promoted", "success", "none")?;
            log_event_with_fields(Event::ScopeLockPromoted, &[("job_id", promoted_id)]);
        }

        Ok((job, promoted))
    }

    pub fn list_job_events(&self, job_id: &str, claims: &Claims) -> JobResult<Vec<JobEvent>> {
        // Scope-check via get_job first (I1: mismatch is treated as not found).
        self.get_job(job_id, claims)?;
        let state = self.store.read_typed::<JobState>(JOB_STATE_KEY)?;
        Ok(state.events_by_job_id.get(job_id).cloned().unwrap_or_default())
    }

    pub fn list_cross_service_job_events(&self, job_id: &str, claims: &Claims) -> JobResult<Vec<CrossServiceEvent>> {
        let job = self.get_job(job_id, claims)?;
        let events = self.list_job_events(job_id, claims)?;
        Ok(events
            .into_iter()
            .map(|e| CrossServiceEvent {
                contract_version: "audit.contracts.v1".to_string(),
                schema_version: "audit.event.v1".to_string(),
                service: "rrs".to_string(),
                tenant_id: job.tenant_id.clone(),
                instance_id: job.instance_id.clone(),
                source: job.source.clone(),
                plan_id: job.plan_id.clone(),
                job_id: e.job_id,
                lifecycle: e.phase,
                action: e.action,
                outcome: e.outcome,
                reason_code: e.reason_code,
                at: e.at,
            })
            .collect())
    }

    pub fn get_lock_snapshot(&self, tenant_id: &str, instance_id: &str) -> crate::scope_lock::ScopeLockSnapshot {
        self.scope_lock.snapshot(&ScopeKey {
            tenant_id: tenant_id.to_string(),
            instance_id: instance_id.to_string(),
        })
    }

    fn transition(&self, job_id: &str, claims: &Claims, f: impl FnOnce(&mut Job) -> JobResult<()>) -> JobResult<Job> {
        let mut result: Option<Job> = None;
        let mut transition_err: Option<JobError> = None;
        self.store.mutate_typed::<JobState, _>(JOB_STATE_KEY, |state| {
            let Some(job) = state.jobs.get_mut(job_id) else {
                transition_err = Some(JobError::not_found(job_id));
                return Ok(());
            };
            if !job.matches_scope(&claims.tenant_id, &claims.instance_id, &claims.source) {
                transition_err = Some(JobError::not_found(job_id));
                return Ok(());
            }
            if let Err(e) = f(job) {
                transition_err = Some(e);
                return Ok(());
            }
            result = Some(job.clone());
            Ok(())
        })?;
        if let Some(e) = transition_err {
            return Err(e);
        }
        result.ok_or_else(|| JobError::not_found(job_id))
    }

    fn append_event(&self, job_id: &str, phase: &str, action: &str, outcome: &str, reason_code: &str) -> JobResult<()> {
        let event = JobEvent {
            event_id: Uuid::new_v4().to_string(),
            job_id: job_id.to_string(),
            phase: phase.to_string(),
            action: action.to_string(),
            outcome: outcome.to_string(),
            reason_code: reason_code.to_string(),
            at: Utc::now(),
        };
        self.store.mutate_typed::<JobState, _>(JOB_STATE_KEY, |state| {
            state.events_by_job_id.entry(job_id.to_string()).or_default().push(event.clone());
            Ok(())
        })
        .map_err(JobError::from)
    }
}

fn generate_job_id(tenant_id: &str, plan_id: &str) -> String {
    let salt = format!("{}-{}", Uuid::new_v4(), rand::random::<u64>());
    let digest = sha256_hex(format!("{tenant_id}|{plan_id}|{salt}").as_bytes());
    format!("job_{}", &digest[..24])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index_reader::Executability;
    use crate::source_registry::ServiceScope;
    use crate::store::MemoryStore;

    fn claims() -> Claims {
        Claims {
            tenant_id: "tenant-acme".into(),
            instance_id: "sn-dev-01".into(),
            source: "sn://acme-dev.service-now.com".into(),
            service_scope: ServiceScope::Rrs,
            iat: 0,
            exp: 0,
            jti: "jti".into(),
            iss: "iss".into(),
            sub: "sub".into(),
            aud: "aud".into(),
        }
    }

    fn executable_plan(plan_id: &str, plan_hash: &str) -> DryRunPlan {
        DryRunPlan {
            plan_id: plan_id.to_string(),
            tenant_id: "tenant-acme".into(),
            instance_id: "sn-dev-01".into(),
            source: "sn://acme-dev.service-now.com".into(),
            plan_hash: plan_hash.to_string(),
            plan_hash_input: serde_json::json!({}),
            execution_options: crate::plan::ExecutionOptions {
                missing_row_mode: "skip".into(),
                conflict_policy: "manual".into(),
                schema_compatibility_mode: "strict".into(),
                workflow_mode: "standard".into(),
            },
            rows: vec![],
            conflicts: vec![],
            delete_candidates: vec![],
            media_candidates: vec![],
            pit_resolutions: vec![],
            watermarks: vec![],
            gate: crate::plan::Gate {
                executability: Executability::Executable,
                reason_code: "none",
            },
            generated_at: Utc::now(),
            requested_by: "tester".into(),
            approval: None,
        }
    }

    fn service() -> JobService {
        JobService::new(
            Arc::new(MemoryStore::new()),
            SourceRegistry::new(vec![crate::source_registry::SourceRegistryEntry {
                tenant_id: "tenant-acme".into(),
                instance_id: "sn-dev-01".into(),
                source: "sn://acme-dev.service-now.com".into(),
            }]),
            None,
            Arc::new(ScopeLockManager::new()),
            Arc::new(crate::observability::audit::MemoryAuditLog::new()),
        )
    }

    fn request(plan_id: &str, plan_hash: &str, tables: &[&str]) -> CreateJobRequest {
        CreateJobRequest {
            tenant_id: "tenant-acme".into(),
            instance_id: "sn-dev-01".into(),
            source: "sn://acme-dev.service-now.com".into(),
            plan_id: plan_id.to_string(),
            plan_hash: plan_hash.to_string(),
            lock_scope_tables: tables.iter().map(|s| s.to_string()).collect(),
            required_capabilities: vec!["restore_execute".into()],
            requested_by: "tester".into(),
        }
    }

    #[test]
    fn create_job_with_no_overlap_runs_immediately() {
        let svc = service();
        let plan = executable_plan("plan-a", "hash-a");
        let job = svc
            .create_job(request("plan-a", "hash-a", &["incident"]), &claims(), &plan)
            .unwrap();
        assert_eq!(job.status, JobStatus::Running);
    }

    #[test]
    fn queue_and_promote_on_complete() {
        let svc = service();
        let plan_a = executable_plan("plan-a", "hash-a");
        let job_a = svc
            .create_job(request("plan-a", "hash-a", &["incident"]), &claims(), &plan_a)
            .unwrap();
        let plan_b = executable_plan("plan-b", "hash-b");
        let job_b = svc
            .create_job(request("plan-b", "hash-b", &["incident"]), &claims(), &plan_b)
            .unwrap();
        assert_eq!(job_b.status, JobStatus::Queued);
        assert_eq!(job_b.wait_reason_code.as_deref(), Some("queued_scope_lock"));

        let (_, promoted) = svc.complete_job(&job_a.job_id, &claims(), false, "none").unwrap();
        assert_eq!(promoted, vec![job_b.job_id.clone()]);
        let job_b_after = svc.get_job(&job_b.job_id, &claims()).unwrap();
        assert_eq!(job_b_after.status, JobStatus::Running);
    }

    #[test]
    fn plan_hash_mismatch_rejected() {
        let svc = service();
        let plan = executable_plan("plan-a", "hash-a");
        let err = svc
            .create_job(request("plan-a", "wrong-hash", &["incident"]), &claims(), &plan)
            .unwrap_err();
        assert_eq!(err.reason_code(), "blocked_plan_hash_mismatch");
    }

    #[test]
    fn non_executable_plan_rejected() {
        let svc = service();
        let mut plan = executable_plan("plan-a", "hash-a");
        plan.gate = crate::plan::Gate {
            executability: Executability::Blocked,
            reason_code: "blocked_freshness_stale",
        };
        let err = svc
            .create_job(request("plan-a", "hash-a", &["incident"]), &claims(), &plan)
            .unwrap_err();
        assert_eq!(err.reason_code(), "blocked_freshness_stale");
    }

    #[test]
    fn pause_requires_running() {
        let svc = service();
        let plan = executable_plan("plan-a", "hash-a");
        let job = svc
            .create_job(request("plan-a", "hash-a", &["incident"]), &claims(), &plan)
            .unwrap();
        svc.pause_job(&job.job_id, &claims(), "paused_token_refresh_grace_exhausted").unwrap();
        let err = svc.pause_job(&job.job_id, &claims(), "x").unwrap_err();
        assert_eq!(err.code(), JobErrorCode::InvalidStateTransition);
    }
}

//! Orchestrator (C10) — the composition root.
//!
//! Wires [`RcsConfig`] and a chosen [`SnapshotStore`] backend into
//! [`SourceRegistry`]/[`MappingResolver`], [`ScopeLockManager`],
//! [`RestoreIndexStateReader`], and [`EvidenceSigner`], then into
//! [`PlanService`], [`JobService`], [`ExecutionService`], and
//! [`EvidenceService`]. This is the only place that holds more than one
//! service at a time — the services themselves never reach for each other
//! except along the one legitimate edge (Execution → Jobs).

use crate::auth::Claims;
use crate::config::RcsConfig;
use crate::error::RcsError;
use crate::evidence::{EvidenceRecord, EvidenceService, EvidenceSigner, SignatureVerification};
use crate::execution::{
    AlwaysSucceedsEffector, Checkpoint, ExecuteJobRequest, ExecutionRecord, ExecutionService, MediaEffector, ResumeJobRequest,
    RollbackJournalEntry,
};
use crate::index_reader::{InMemoryIndexReader, RestoreIndexStateReader};
use crate::job::{CreateJobRequest, CrossServiceEvent, Job, JobEvent, JobService};
use crate::observability::audit::{AuditLog, FileAuditLog, MemoryAuditLog};
use crate::observability::{log_event, Event};
use crate::plan::{CreateDryRunPlanRequest, DryRunPlan, PlanService};
use crate::scope_lock::{ScopeLockManager, ScopeLockSnapshot};
use crate::source_registry::{MappingResolver, SourceRegistry, SourceRegistryEntry};
use crate::store::{MemoryStore, SnapshotStore};
use std::sync::Arc;

/// Everything the composition root needs beyond a default config:
/// which local tenant/instance/source tuples to serve, an optional
/// `MappingResolver` for the Auth Control Plane, and an optional durable
/// audit log path (falls back to an in-memory log, e.g. for tests/CLI demo).
pub struct OrchestratorOptions {
    pub registry_entries: Vec<SourceRegistryEntry>,
    pub resolver: Option<Arc<dyn MappingResolver>>,
    pub audit_log_path: Option<String>,
    pub media_effector: Option<Arc<dyn MediaEffector>>,
    /// Overrides the freshness oracle; defaults to an empty
    /// `InMemoryIndexReader` (every partition reads as freshness-unknown
    /// until seeded — tests that need an executable plan inject their own).
    pub index_reader: Option<Arc<dyn RestoreIndexStateReader>>,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            registry_entries: Vec::new(),
            resolver: None,
            audit_log_path: None,
            media_effector: None,
            index_reader: None,
        }
    }
}

pub struct Orchestrator {
    plan_service: Arc<PlanService>,
    job_service: Arc<JobService>,
    execution_service: Arc<ExecutionService>,
    evidence_service: Arc<EvidenceService>,
}

impl Orchestrator {
    /// Builds the full service graph over an in-memory store. This is the
    /// constructor the CLI and the test suite use; a durable deployment
    /// substitutes a `SqlSnapshotStore<E>` for the `MemoryStore` below but
    /// follows the same wiring order.
    pub fn new_in_memory(config: RcsConfig, options: OrchestratorOptions) -> Self {
        log_event(Event::BootStart);

        let store: Arc<dyn SnapshotStore> = Arc::new(MemoryStore::new());
        let registry = SourceRegistry::new(options.registry_entries);
        let scope_lock = Arc::new(ScopeLockManager::new());
        let index_reader: Arc<dyn RestoreIndexStateReader> = options
            .index_reader
            .unwrap_or_else(|| Arc::new(InMemoryIndexReader::new(config.stale_after_seconds)));

        let audit: Arc<dyn AuditLog> = match options.audit_log_path {
            Some(path) => match FileAuditLog::open(&path) {
                Ok(log) => Arc::new(log),
                Err(_) => Arc::new(MemoryAuditLog::new()),
            },
            None => Arc::new(MemoryAuditLog::new()),
        };

        let signer = Arc::new(load_or_generate_signer(&config));

        let plan_service = Arc::new(PlanService::new(
            store.clone(),
            registry.clone(),
            options.resolver.clone(),
            index_reader,
        ));

        let job_service = Arc::new(JobService::new(
            store.clone(),
            registry,
            options.resolver,
            scope_lock,
            audit.clone(),
        ));

        let media_effector = options.media_effector.unwrap_or_else(|| Arc::new(AlwaysSucceedsEffector));
        let execution_service = Arc::new(ExecutionService::new(
            store.clone(),
            job_service.clone(),
            config.clone(),
            audit.clone(),
            media_effector,
        ));

        let evidence_service = Arc::new(EvidenceService::new(
            store,
            job_service.clone(),
            execution_service.clone(),
            signer,
            config,
            audit,
        ));

        log_event(Event::BootComplete);

        Self {
            plan_service,
            job_service,
            execution_service,
            evidence_service,
        }
    }

    pub fn plan_service(&self) -> &Arc<PlanService> {
        &self.plan_service
    }

    pub fn job_service(&self) -> &Arc<JobService> {
        &self.job_service
    }

    pub fn execution_service(&self) -> &Arc<ExecutionService> {
        &self.execution_service
    }

    pub fn evidence_service(&self) -> &Arc<EvidenceService> {
        &self.evidence_service
    }

    // -- Plan (C6) ----------------------------------------------------

    pub fn create_dry_run_plan(&self, request: CreateDryRunPlanRequest, claims: &Claims) -> Result<DryRunPlan, RcsError> {
        Ok(self.plan_service.create_dry_run_plan(request, claims)?)
    }

    pub fn get_plan(&self, plan_id: &str, claims: &Claims) -> Result<DryRunPlan, RcsError> {
        Ok(self.plan_service.get_plan(plan_id, claims)?)
    }

    pub fn list_plans(&self, claims: &Claims) -> Result<Vec<DryRunPlan>, RcsError> {
        Ok(self.plan_service.list_plans(claims)?)
    }

    // -- Job (C7) -------------------------------------------------------

    pub fn create_job(&self, request: CreateJobRequest, claims: &Claims, plan: &DryRunPlan) -> Result<Job, RcsError> {
        Ok(self.job_service.create_job(request, claims, plan)?)
    }

    pub fn get_job(&self, job_id: &str, claims: &Claims) -> Result<Job, RcsError> {
        Ok(self.job_service.get_job(job_id, claims)?)
    }

    pub fn list_jobs(&self, claims: &Claims) -> Result<Vec<Job>, RcsError> {
        Ok(self.job_service.list_jobs(claims)?)
    }

    pub fn pause_job(&self, job_id: &str, claims: &Claims, reason_code: &str) -> Result<Job, RcsError> {
        Ok(self.job_service.pause_job(job_id, claims, reason_code)?)
    }

    pub fn list_job_events(&self, job_id: &str, claims: &Claims) -> Result<Vec<JobEvent>, RcsError> {
        Ok(self.job_service.list_job_events(job_id, claims)?)
    }

    pub fn list_cross_service_job_events(&self, job_id: &str, claims: &Claims) -> Result<Vec<CrossServiceEvent>, RcsError> {
        Ok(self.job_service.list_cross_service_job_events(job_id, claims)?)
    }

    pub fn get_lock_snapshot(&self, tenant_id: &str, instance_id: &str) -> ScopeLockSnapshot {
        self.job_service.get_lock_snapshot(tenant_id, instance_id)
    }

    // -- Execution (C8) ---------------------------------------------------

    pub fn execute_job(
        &self,
        job_id: &str,
        request: ExecuteJobRequest,
        claims: &Claims,
        plan: &DryRunPlan,
    ) -> Result<ExecutionRecord, RcsError> {
        Ok(self.execution_service.execute_job(job_id, request, claims, plan)?)
    }

    pub fn resume_job(
        &self,
        job_id: &str,
        request: ResumeJobRequest,
        claims: &Claims,
        plan: &DryRunPlan,
    ) -> Result<ExecutionRecord, RcsError> {
        Ok(self.execution_service.resume_job(job_id, request, claims, plan)?)
    }

    pub fn get_execution(&self, job_id: &str, claims: &Claims) -> Result<ExecutionRecord, RcsError> {
        Ok(self.execution_service.get_execution(job_id, claims)?)
    }

    pub fn get_checkpoint(&self, job_id: &str, claims: &Claims) -> Result<Checkpoint, RcsError> {
        Ok(self.execution_service.get_checkpoint(job_id, claims)?)
    }

    pub fn get_rollback_journal(&self, job_id: &str, claims: &Claims) -> Result<Vec<RollbackJournalEntry>, RcsError> {
        Ok(self.execution_service.get_rollback_journal(job_id, claims)?)
    }

    // -- Evidence (C9) ----------------------------------------------------

    pub fn export_evidence(&self, job_id: &str, claims: &Claims, plan: &DryRunPlan) -> Result<(EvidenceRecord, bool), RcsError> {
        Ok(self.evidence_service.export_evidence(job_id, claims, plan)?)
    }

    pub fn get_evidence(&self, job_id: &str, claims: &Claims) -> Result<EvidenceRecord, RcsError> {
        Ok(self.evidence_service.get_evidence(job_id, claims)?)
    }

    pub fn get_evidence_by_id(&self, evidence_id: &str, claims: &Claims) -> Result<EvidenceRecord, RcsError> {
        Ok(self.evidence_service.get_evidence_by_id(evidence_id, claims)?)
    }

    pub fn list_evidence(&self, claims: &Claims) -> Result<Vec<EvidenceRecord>, RcsError> {
        Ok(self.evidence_service.list_evidence(claims)?)
    }

    pub fn validate_evidence_record(&self, record: &EvidenceRecord) -> (SignatureVerification, &'static str) {
        self.evidence_service.validate_evidence_record(record)
    }
}

/// Loads the signer from the configured PEM paths, falling back to an
/// ephemeral generated keypair when either path is unset (e.g. local CLI
/// demo runs) — evidence is still signed and self-verifies, it just isn't
/// durable across restarts.
fn load_or_generate_signer(config: &RcsConfig) -> EvidenceSigner {
    if let (Some(private_path), Some(public_path)) = (&config.signer_private_key_path, &config.signer_public_key_path) {
        if let (Ok(private_pem), Ok(public_pem)) = (std::fs::read_to_string(private_path), std::fs::read_to_string(public_path)) {
            if let Ok(signer) = EvidenceSigner::from_pem(&private_pem, &public_pem, config.signer_key_id.clone()) {
                return signer;
            }
        }
    }
    EvidenceSigner::generate(config.signer_key_id.clone())
}

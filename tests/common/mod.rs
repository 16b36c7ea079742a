//! Shared fixtures for the integration suite: a claims builder, a minimal
//! `CreateDryRunPlanRequest`, and an `Orchestrator` seeded with a single
//! tenant/instance/source tuple.

use chrono::Utc;
use rcs::auth::Claims;
use rcs::config::RcsConfig;
use rcs::index_reader::{InMemoryIndexReader, StoredWatermark, DEFAULT_STALE_AFTER_SECONDS};
use rcs::orchestrator::{Orchestrator, OrchestratorOptions};
use rcs::plan::{CreateDryRunPlanRequest, ExecutionOptions, Pit, Row, RowAction, Scope};
use rcs::source_registry::{ServiceScope, SourceRegistryEntry};
use std::sync::Arc;

pub const TENANT: &str = "tenant-acme";
pub const INSTANCE: &str = "sn-dev-01";
pub const SOURCE: &str = "sn://acme-dev.service-now.com";

pub fn claims() -> Claims {
    Claims {
        tenant_id: TENANT.into(),
        instance_id: INSTANCE.into(),
        source: SOURCE.into(),
        service_scope: ServiceScope::Rrs,
        iat: 0,
        exp: 0,
        jti: "jti".into(),
        iss: "iss".into(),
        sub: "sub".into(),
        aud: "aud".into(),
    }
}

pub fn row(row_id: &str, action: RowAction) -> Row {
    Row {
        row_id: row_id.to_string(),
        table: "incident".into(),
        topic: "incident".into(),
        partition: 0,
        record_sys_id: format!("sys-{row_id}"),
        action,
        precondition_hash: "hash".into(),
        metadata: serde_json::json!({}),
        diff_enc: Some("enc".into()),
        before_image_enc: None,
        after_image_enc: None,
    }
}

pub fn plan_request(plan_id: &str, rows: Vec<Row>) -> CreateDryRunPlanRequest {
    CreateDryRunPlanRequest {
        tenant_id: TENANT.into(),
        instance_id: INSTANCE.into(),
        source: SOURCE.into(),
        plan_id: plan_id.into(),
        requested_by: "operator1".into(),
        pit: Pit {
            restore_time: Utc::now(),
            restore_timezone: "UTC".into(),
            pit_algorithm_version: "v1".into(),
            tie_breaker: vec![],
            tie_breaker_fallback: vec![],
        },
        scope: Scope {
            mode: "table".into(),
            tables: vec!["incident".into()],
            encoded_query: None,
        },
        execution_options: ExecutionOptions {
            missing_row_mode: "skip".into(),
            conflict_policy: "manual".into(),
            schema_compatibility_mode: "strict".into(),
            workflow_mode: "standard".into(),
        },
        rows,
        conflicts: vec![],
        delete_candidates: vec![],
        media_candidates: vec![],
        pit_candidates: vec![],
        watermarks: vec![],
    }
}

/// A freshness oracle with a just-indexed watermark for `incident`/0, so
/// plans built from `plan_request` come back `Executable` instead of
/// `blocked_freshness_unknown`.
pub fn fresh_reader() -> Arc<InMemoryIndexReader> {
    let mut reader = InMemoryIndexReader::new(DEFAULT_STALE_AFTER_SECONDS);
    reader.set(
        TENANT,
        INSTANCE,
        SOURCE,
        "incident",
        0,
        StoredWatermark {
            generation_id: 1,
            indexed_through_offset: "100".into(),
            indexed_through_time: Some(Utc::now()),
            coverage_start: Utc::now() - chrono::Duration::hours(1),
            coverage_end: Utc::now(),
        },
    );
    Arc::new(reader)
}

pub fn orchestrator() -> Orchestrator {
    orchestrator_with_config(RcsConfig::default())
}

pub fn orchestrator_with_config(config: RcsConfig) -> Orchestrator {
    Orchestrator::new_in_memory(
        config,
        OrchestratorOptions {
            registry_entries: vec![SourceRegistryEntry {
                tenant_id: TENANT.into(),
                instance_id: INSTANCE.into(),
                source: SOURCE.into(),
            }],
            resolver: None,
            audit_log_path: None,
            media_effector: None,
            index_reader: Some(fresh_reader()),
        },
    )
}

pub fn create_job_request(plan: &rcs::plan::DryRunPlan) -> rcs::job::CreateJobRequest {
    rcs::job::CreateJobRequest {
        tenant_id: TENANT.into(),
        instance_id: INSTANCE.into(),
        source: SOURCE.into(),
        plan_id: plan.plan_id.clone(),
        plan_hash: plan.plan_hash.clone(),
        lock_scope_tables: vec!["incident".into()],
        required_capabilities: vec!["restore_execute".into()],
        requested_by: "tester".into(),
    }
}

pub fn execute_request() -> rcs::execution::ExecuteJobRequest {
    rcs::execution::ExecuteJobRequest {
        operator_id: "operator-1".into(),
        operator_capabilities: vec!["restore_execute".into()],
        chunk_size: None,
        workflow: None,
        runtime_conflicts: vec![],
        elevated_confirmation: None,
    }
}

pub fn resume_request() -> rcs::execution::ResumeJobRequest {
    rcs::execution::ResumeJobRequest {
        operator_id: "operator-1".into(),
        operator_capabilities: vec!["restore_execute".into()],
        runtime_conflicts: vec![],
        expected_plan_checksum: None,
        expected_precondition_checksum: None,
    }
}

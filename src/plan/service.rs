//! PlanService (C6)
//!
//! Dry-run validation, canonical plan-hash computation, and executability
//! gate assembly.

use super::errors::{PlanError, PlanResult};
use super::types::{
    CallerWatermark, CreateDryRunPlanRequest, DryRunPlan, Gate, PlanState, Row,
};
use crate::auth::Claims;
use crate::canonical::{canonical_json, sha256_hex};
use crate::index_reader::{
    Executability, Freshness, PartitionRef, ReadWatermarksRequest, RestoreIndexStateReader, Watermark,
};
use crate::source_registry::{resolve_effective_source, MappingResolver, SourceRegistry};
use crate::store::{SnapshotStore, SnapshotStoreExt};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

const PLAN_STATE_KEY: &str = "plan_state";

pub struct PlanService {
    store: Arc<dyn SnapshotStore>,
    registry: SourceRegistry,
    resolver: Option<Arc<dyn MappingResolver>>,
    index_reader: Arc<dyn RestoreIndexStateReader>,
}

impl PlanService {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        registry: SourceRegistry,
        resolver: Option<Arc<dyn MappingResolver>>,
        index_reader: Arc<dyn RestoreIndexStateReader>,
    ) -> Self {
        Self {
            store,
            registry,
            resolver,
            index_reader,
        }
    }

    pub fn create_dry_run_plan(
        &self,
        request: CreateDryRunPlanRequest,
        claims: &Claims,
    ) -> PlanResult<DryRunPlan> {
        if !claims.matches_scope(&request.tenant_id, &request.instance_id, &request.source) {
            return Err(PlanError::invalid_request(
                "claims scope does not match request tenant/instance/source",
            ));
        }

        resolve_effective_source(
            &self.registry,
            self.resolver.as_deref(),
            &request.tenant_id,
            &request.instance_id,
            &request.source,
            claims.service_scope,
        )?;

        let mut rows = request.rows;
        rows.sort_by(|a, b| a.row_id.cmp(&b.row_id));
        reject_duplicates(rows.iter().map(|r| r.row_id.as_str()), "row_id")?;

        reject_duplicates(
            request.delete_candidates.iter().map(|c| c.candidate_id.as_str()),
            "delete candidate_id",
        )?;
        reject_duplicates(
            request.media_candidates.iter().map(|c| c.candidate_id.as_str()),
            "media candidate_id",
        )?;
        reject_duplicates(
            request.conflicts.iter().map(|c| c.conflict_id.as_str()),
            "conflict_id",
        )?;

        for conflict in &request.conflicts {
            if !conflict.resolution_is_valid() {
                return Err(PlanError::invalid_request(format!(
                    "conflict '{}' of class reference may not resolve to skip",
                    conflict.conflict_id
                )));
            }
        }

        let mut conflicts = request.conflicts;
        conflicts.sort_by(|a, b| a.conflict_id.cmp(&b.conflict_id));

        let watermarks = self.fetch_watermarks(
            &request.tenant_id,
            &request.instance_id,
            &request.source,
            &rows,
            &request.watermarks,
        );

        let gate = derive_gate(&watermarks, &request.delete_candidates, &request.media_candidates, &conflicts);

        let plan_hash_input = build_plan_hash_input(&request.plan_id, &request, &rows, &conflicts);
        let plan_hash_json = canonical_json(&plan_hash_input)?;
        let plan_hash = sha256_hex(plan_hash_json.as_bytes());
        let plan_hash_input_value = serde_json::to_value(&plan_hash_input)
            .map_err(|e| PlanError::internal(e.to_string()))?;

        let plan = DryRunPlan {
            plan_id: request.plan_id.clone(),
            tenant_id: request.tenant_id,
            instance_id: request.instance_id,
            source: request.source,
            plan_hash,
            plan_hash_input: plan_hash_input_value,
            execution_options: request.execution_options,
            rows,
            conflicts,
            delete_candidates: request.delete_candidates,
            media_candidates: request.media_candidates,
            pit_resolutions: request.pit_candidates,
            watermarks,
            gate,
            generated_at: Utc::now(),
            requested_by: request.requested_by,
            approval: None,
        };

        self.store.mutate_typed::<PlanState, _>(PLAN_STATE_KEY, |state| {
            if state.plans.contains_key(&plan.plan_id) {
                return Err(crate::store::StoreError::corrupt_state(format!(
                    "plan_id '{}' already exists",
                    plan.plan_id
                )));
            }
            state.plans.insert(plan.plan_id.clone(), plan.clone());
            Ok(())
        })?;

        Ok(plan)
    }

    pub fn get_plan(&self, plan_id: &str, claims: &Claims) -> PlanResult<DryRunPlan> {
        let state: PlanState = self.store.read_typed(PLAN_STATE_KEY)?;
        state
            .plans
            .get(plan_id)
            .filter(|p| p.matches_scope(&claims.tenant_id, &claims.instance_id, &claims.source))
            .cloned()
            .ok_or_else(|| PlanError::not_found(plan_id))
    }

    pub fn list_plans(&self, claims: &Claims) -> PlanResult<Vec<DryRunPlan>> {
        let state: PlanState = self.store.read_typed(PLAN_STATE_KEY)?;
        let mut plans: Vec<DryRunPlan> = state
            .plans
            .values()
            .filter(|p| p.matches_scope(&claims.tenant_id, &claims.instance_id, &claims.source))
            .cloned()
            .collect();
        plans.sort_by(|a, b| a.plan_id.cmp(&b.plan_id));
        Ok(plans)
    }

    fn fetch_watermarks(
        &self,
        tenant_id: &str,
        instance_id: &str,
        source: &str,
        rows: &[Row],
        caller_watermarks: &[CallerWatermark],
    ) -> Vec<Watermark> {
        let mut seen = HashSet::new();
        let mut partitions = Vec::new();
        for row in rows {
            let key = (row.topic.clone(), row.partition);
            if seen.insert(key) {
                partitions.push(PartitionRef {
                    topic: row.topic.clone(),
                    partition: row.partition,
                });
            }
        }
        for w in caller_watermarks {
            let key = (w.topic.clone(), w.partition);
            if seen.insert(key) {
                partitions.push(PartitionRef {
                    topic: w.topic.clone(),
                    partition: w.partition,
                });
            }
        }
        partitions.sort_by(|a, b| (a.topic.clone(), a.partition).cmp(&(b.topic.clone(), b.partition)));

        let req = ReadWatermarksRequest {
            tenant_id: tenant_id.to_string(),
            instance_id: instance_id.to_string(),
            source: source.to_string(),
            measured_at: Utc::now(),
            partitions,
        };
        self.index_reader.read_watermarks_for_partitions(&req)
    }
}

fn reject_duplicates<'a>(ids: impl Iterator<Item = &'a str>, label: &str) -> PlanResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(PlanError::invalid_request(format!("duplicate {label}: '{id}'")));
        }
    }
    Ok(())
}

/// Gate derivation, evaluated in priority order: freshness unknown > stale
/// > unresolved deletes > unresolved media > blocking conflicts > executable.
fn derive_gate(
    watermarks: &[Watermark],
    delete_candidates: &[super::types::DeleteCandidate],
    media_candidates: &[super::types::MediaCandidate],
    conflicts: &[super::types::Conflict],
) -> Gate {
    if watermarks.iter().any(|w| w.freshness == Freshness::Unknown) {
        return Gate {
            executability: Executability::Blocked,
            reason_code: "blocked_freshness_unknown",
        };
    }
    if watermarks.iter().any(|w| w.freshness == Freshness::Stale) {
        return Gate {
            executability: Executability::PreviewOnly,
            reason_code: "blocked_freshness_stale",
        };
    }
    if delete_candidates.iter().any(|c| c.decision.is_none()) {
        return Gate {
            executability: Executability::Blocked,
            reason_code: "blocked_unresolved_delete_candidates",
        };
    }
    if media_candidates.iter().any(|c| c.decision.is_none()) {
        return Gate {
            executability: Executability::Blocked,
            reason_code: "blocked_unresolved_media_candidates",
        };
    }
    if let Some(conflict) = conflicts.iter().find(|c| c.blocks_gate()) {
        return Gate {
            executability: Executability::Blocked,
            reason_code: conflict.class.gate_reason_code(),
        };
    }
    Gate {
        executability: Executability::Executable,
        reason_code: "none",
    }
}

#[derive(Serialize)]
struct PlanHashInput<'a> {
    plan_id: &'a str,
    tenant_id: &'a str,
    instance_id: &'a str,
    source: &'a str,
    scope: &'a super::types::Scope,
    pit: &'a super::types::Pit,
    execution_options: &'a super::types::ExecutionOptions,
    rows: &'a [Row],
    conflicts: &'a [super::types::Conflict],
}

fn build_plan_hash_input<'a>(
    plan_id: &'a str,
    request: &'a CreateDryRunPlanRequest,
    sorted_rows: &'a [Row],
    sorted_conflicts: &'a [super::types::Conflict],
) -> PlanHashInput<'a> {
    PlanHashInput {
        plan_id,
        tenant_id: &request.tenant_id,
        instance_id: &request.instance_id,
        source: &request.source,
        scope: &request.scope,
        pit: &request.pit,
        execution_options: &request.execution_options,
        rows: sorted_rows,
        conflicts: sorted_conflicts,
    }
}

//! PlanService (C6)
//!
//! Canonicalizes a restore request, computes a deterministic plan hash, and
//! assigns an executability gate from the freshness oracle.

mod errors;
mod service;
mod types;

pub use errors::{PlanError, PlanErrorCode, PlanResult, Severity};
pub use service::PlanService;
pub use types::{
    CallerWatermark, Conflict, ConflictClass, CreateDryRunPlanRequest, DeleteCandidate,
    DeleteDecision, DryRunPlan, ExecutionOptions, Gate, MediaCandidate, MediaDecision, Pit,
    PitResolution, PlanState, Resolution, Row, RowAction, Scope,
};

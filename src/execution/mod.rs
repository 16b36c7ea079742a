//! ExecutionService (C8)
//!
//! Chunked apply with row-isolation fallback, checkpoint/resume, the media
//! pipeline, and the rollback journal + mirror entries.

mod errors;
mod service;
mod types;

pub use errors::{ExecutionError, ExecutionErrorCode, ExecutionResult, Severity};
pub use service::{AlwaysSucceedsEffector, ExecutionService, MediaEffector};
pub use types::{
    Checkpoint, Chunk, ChunkMode, ElevatedConfirmation, ExecuteJobRequest, ExecutionRecord, ExecutionState, ExecutionStatus,
    ExecutionSummary, MediaOutcome, MediaOutcomeKind, MirrorEntry, ResumeJobRequest, RollbackJournalEntry, RowOutcome,
    RowOutcomeKind, RuntimeConflict, WorkflowOptions,
};

//! Observability events for RCS
//!
//! Events are explicit and typed, covering the plan/job/execution/evidence
//! lifecycle.

use std::fmt;

/// Observable lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    BootStart,
    BootComplete,
    ShutdownStart,
    ShutdownComplete,

    // Configuration
    ConfigLoaded,

    // Plan (C6)
    PlanRequested,
    PlanCreated,
    PlanRejected,

    // Scope lock (C5)
    ScopeLockAcquired,
    ScopeLockQueued,
    ScopeLockReleased,
    ScopeLockPromoted,

    // Job (C7)
    JobCreated,
    JobPaused,
    JobResumed,
    JobCompleted,
    JobFailed,

    // Execution (C8)
    ExecutionStart,
    ChunkApplied,
    ChunkFailed,
    CheckpointWritten,
    ExecutionPaused,
    ExecutionResumed,
    ExecutionComplete,
    ExecutionFailed,
    RollbackJournalAppended,

    // Evidence (C9)
    EvidenceExportStart,
    EvidenceExportComplete,
    EvidenceExportFailed,
    ManifestSigned,

    // Server
    Serving,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "RCS_STARTUP_BEGIN",
            Event::BootComplete => "RCS_STARTUP_COMPLETE",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::PlanRequested => "PLAN_REQUESTED",
            Event::PlanCreated => "PLAN_CREATED",
            Event::PlanRejected => "PLAN_REJECTED",

            Event::ScopeLockAcquired => "SCOPE_LOCK_ACQUIRED",
            Event::ScopeLockQueued => "SCOPE_LOCK_QUEUED",
            Event::ScopeLockReleased => "SCOPE_LOCK_RELEASED",
            Event::ScopeLockPromoted => "SCOPE_LOCK_PROMOTED",

            Event::JobCreated => "JOB_CREATED",
            Event::JobPaused => "JOB_PAUSED",
            Event::JobResumed => "JOB_RESUMED",
            Event::JobCompleted => "JOB_COMPLETED",
            Event::JobFailed => "JOB_FAILED",

            Event::ExecutionStart => "EXECUTION_BEGIN",
            Event::ChunkApplied => "CHUNK_APPLIED",
            Event::ChunkFailed => "CHUNK_FAILED",
            Event::CheckpointWritten => "CHECKPOINT_WRITTEN",
            Event::ExecutionPaused => "EXECUTION_PAUSED",
            Event::ExecutionResumed => "EXECUTION_RESUMED",
            Event::ExecutionComplete => "EXECUTION_COMPLETE",
            Event::ExecutionFailed => "EXECUTION_FAILED",
            Event::RollbackJournalAppended => "ROLLBACK_JOURNAL_APPENDED",

            Event::EvidenceExportStart => "EVIDENCE_EXPORT_BEGIN",
            Event::EvidenceExportComplete => "EVIDENCE_EXPORT_COMPLETE",
            Event::EvidenceExportFailed => "EVIDENCE_EXPORT_FAILED",
            Event::ManifestSigned => "MANIFEST_SIGNED",

            Event::Serving => "RCS_SERVING",
        }
    }

    /// Whether this event indicates a fatal condition that should log at
    /// `Severity::Fatal` rather than `Severity::Info`.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::ExecutionFailed | Event::JobFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

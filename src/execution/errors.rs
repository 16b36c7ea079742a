//! ExecutionService error types.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warn => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionErrorCode {
    InvalidRequest,
    NotFound,
    StatePrecondition,
    PlanHashMismatch,
    GateNotExecutable,
    UnresolvedConflict,
    MissingCapability,
    ResumePreconditionMismatch,
    ResumeCheckpointMissing,
    Internal,
}

impl ExecutionErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::NotFound => "none",
            Self::StatePrecondition => "blocked_invalid_job_state",
            Self::PlanHashMismatch => "blocked_plan_hash_mismatch",
            Self::GateNotExecutable => "blocked_plan_not_executable",
            Self::UnresolvedConflict => "blocked_reference_conflict",
            Self::MissingCapability => "blocked_missing_capability",
            Self::ResumePreconditionMismatch => "blocked_resume_precondition_mismatch",
            Self::ResumeCheckpointMissing => "blocked_resume_checkpoint_missing",
            Self::Internal => "failed_internal_error",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::InvalidRequest => Severity::Warn,
            Self::NotFound => Severity::Warn,
            Self::StatePrecondition => Severity::Warn,
            Self::PlanHashMismatch => Severity::Warn,
            Self::GateNotExecutable => Severity::Warn,
            Self::UnresolvedConflict => Severity::Warn,
            Self::MissingCapability => Severity::Warn,
            Self::ResumePreconditionMismatch => Severity::Warn,
            Self::ResumeCheckpointMissing => Severity::Warn,
            Self::Internal => Severity::Error,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest => 400,
            Self::NotFound => 404,
            Self::StatePrecondition => 409,
            Self::PlanHashMismatch => 409,
            Self::GateNotExecutable => 409,
            Self::UnresolvedConflict => 409,
            Self::MissingCapability => 403,
            Self::ResumePreconditionMismatch => 409,
            Self::ResumeCheckpointMissing => 409,
            Self::Internal => 500,
        }
    }
}

impl fmt::Display for ExecutionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `reason_code_override` carries a dynamically-derived reason (the
/// blocking plan's gate reason, or a conflict's class-derived reason) past
/// a fixed-per-variant code, mirroring [`crate::job::JobError`].
#[derive(Debug)]
pub struct ExecutionError {
    code: ExecutionErrorCode,
    message: String,
    reason_code_override: Option<&'static str>,
}

impl ExecutionError {
    pub fn new(code: ExecutionErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            reason_code_override: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ExecutionErrorCode::InvalidRequest, message)
    }

    pub fn not_found(job_id: &str) -> Self {
        Self::new(ExecutionErrorCode::NotFound, format!("execution for job '{job_id}' not found"))
    }

    pub fn state_precondition(message: impl Into<String>) -> Self {
        Self::new(ExecutionErrorCode::StatePrecondition, message)
    }

    pub fn plan_hash_mismatch(message: impl Into<String>) -> Self {
        Self::new(ExecutionErrorCode::PlanHashMismatch, message)
    }

    pub fn gate_not_executable(reason_code: &'static str) -> Self {
        Self {
            code: ExecutionErrorCode::GateNotExecutable,
            message: format!("plan is not executable: {reason_code}"),
            reason_code_override: Some(reason_code),
        }
    }

    pub fn unresolved_conflict(reason_code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code: ExecutionErrorCode::UnresolvedConflict,
            message: message.into(),
            reason_code_override: Some(reason_code),
        }
    }

    pub fn missing_capability(message: impl Into<String>) -> Self {
        Self::new(ExecutionErrorCode::MissingCapability, message)
    }

    pub fn resume_precondition_mismatch(message: impl Into<String>) -> Self {
        Self::new(ExecutionErrorCode::ResumePreconditionMismatch, message)
    }

    pub fn resume_checkpoint_missing(message: impl Into<String>) -> Self {
        Self::new(ExecutionErrorCode::ResumeCheckpointMissing, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ExecutionErrorCode::Internal, message)
    }

    pub fn code(&self) -> ExecutionErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn reason_code(&self) -> &'static str {
        self.reason_code_override.unwrap_or_else(|| self.code.as_str())
    }

    pub fn status_code(&self) -> u16 {
        self.code.status_code()
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code, self.message)
    }
}

impl std::error::Error for ExecutionError {}

impl From<crate::job::JobError> for ExecutionError {
    fn from(e: crate::job::JobError) -> Self {
        ExecutionError::new(ExecutionErrorCode::Internal, format!("job transition failed: {} ({})", e.message(), e.reason_code()))
    }
}

impl From<crate::store::StoreError> for ExecutionError {
    fn from(e: crate::store::StoreError) -> Self {
        ExecutionError::internal(e.message().to_string())
    }
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;

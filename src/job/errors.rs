//! JobService error types.

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
pub enum JobErrorCode {
    InvalidRequest,
    NotFound,
    UnknownSourceMapping,
    AuthControlPlaneOutage,
    PlanHashMismatch,
    PlanNotExecutable,
    InvalidStateTransition,
    Internal,
}

impl JobErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::NotFound => "none",
            Self::UnknownSourceMapping => "blocked_unknown_source_mapping",
            Self::AuthControlPlaneOutage => "blocked_auth_control_plane_outage",
            Self::PlanHashMismatch => "blocked_plan_hash_mismatch",
            Self::PlanNotExecutable => "blocked_plan_not_executable",
            Self::InvalidStateTransition => "failed_internal_error",
            Self::Internal => "failed_internal_error",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::InvalidRequest => Severity::Warn,
            Self::NotFound => Severity::Warn,
            Self::UnknownSourceMapping => Severity::Warn,
            Self::AuthControlPlaneOutage => Severity::Fatal,
            Self::PlanHashMismatch => Severity::Warn,
            Self::PlanNotExecutable => Severity::Warn,
            Self::InvalidStateTransition => Severity::Error,
            Self::Internal => Severity::Error,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest => 400,
            Self::NotFound => 404,
            Self::UnknownSourceMapping => 403,
            Self::AuthControlPlaneOutage => 503,
            Self::PlanHashMismatch => 409,
            Self::PlanNotExecutable => 409,
            Self::InvalidStateTransition => 409,
            Self::Internal => 500,
        }
    }
}

impl fmt::Display for JobErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A job-service error. `reason_code_override` lets a caller attach a
/// dynamically-derived reason (e.g. the blocking plan's own gate reason)
/// without losing the originating code, per §7's propagation policy.
#[derive(Debug)]
pub struct JobError {
    code: JobErrorCode,
    message: String,
    reason_code_override: Option<&'static str>,
}

impl JobError {
    pub fn new(code: JobErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            reason_code_override: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(JobErrorCode::InvalidRequest, message)
    }

    pub fn not_found(job_id: &str) -> Self {
        Self::new(JobErrorCode::NotFound, format!("job '{job_id}' not found"))
    }

    pub fn plan_hash_mismatch(message: impl Into<String>) -> Self {
        Self::new(JobErrorCode::PlanHashMismatch, message)
    }

    pub fn plan_not_executable(reason_code: &'static str) -> Self {
        Self {
            code: JobErrorCode::PlanNotExecutable,
            message: format!("plan is not executable: {reason_code}"),
            reason_code_override: Some(reason_code),
        }
    }

    pub fn invalid_state_transition(message: impl Into<String>) -> Self {
        Self::new(JobErrorCode::InvalidStateTransition, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(JobErrorCode::Internal, message)
    }

    pub fn code(&self) -> JobErrorCode {
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

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code, self.message)
    }
}

impl std::error::Error for JobError {}

impl From<crate::source_registry::SourceRegistryError> for JobError {
    fn from(e: crate::source_registry::SourceRegistryError) -> Self {
        use crate::source_registry::SourceRegistryErrorCode as C;
        let code = match e.code() {
            C::RcsBlockedUnknownSourceMapping => JobErrorCode::UnknownSourceMapping,
            C::RcsBlockedAuthControlPlaneOutage => JobErrorCode::AuthControlPlaneOutage,
        };
        JobError::new(code, e.message().to_string())
    }
}

impl From<crate::store::StoreError> for JobError {
    fn from(e: crate::store::StoreError) -> Self {
        JobError::internal(e.message().to_string())
    }
}

pub type JobResult<T> = Result<T, JobError>;

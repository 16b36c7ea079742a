//! Plan service error types.

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
pub enum PlanErrorCode {
    InvalidRequest,
    NotFound,
    UnknownSourceMapping,
    AuthControlPlaneOutage,
    Internal,
}

impl PlanErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::NotFound => "none",
            Self::UnknownSourceMapping => "blocked_unknown_source_mapping",
            Self::AuthControlPlaneOutage => "blocked_auth_control_plane_outage",
            Self::Internal => "failed_internal_error",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::InvalidRequest => Severity::Warn,
            Self::NotFound => Severity::Warn,
            Self::UnknownSourceMapping => Severity::Warn,
            Self::AuthControlPlaneOutage => Severity::Fatal,
            Self::Internal => Severity::Error,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest => 400,
            Self::NotFound => 404,
            Self::UnknownSourceMapping => 403,
            Self::AuthControlPlaneOutage => 503,
            Self::Internal => 500,
        }
    }
}

impl fmt::Display for PlanErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
pub struct PlanError {
    code: PlanErrorCode,
    message: String,
}

impl PlanError {
    pub fn new(code: PlanErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PlanErrorCode::InvalidRequest, message)
    }

    pub fn not_found(plan_id: &str) -> Self {
        Self::new(PlanErrorCode::NotFound, format!("plan '{plan_id}' not found"))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(PlanErrorCode::Internal, message)
    }

    pub fn code(&self) -> PlanErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn reason_code(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn status_code(&self) -> u16 {
        self.code.status_code()
    }
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code, self.message)
    }
}

impl std::error::Error for PlanError {}

impl From<crate::source_registry::SourceRegistryError> for PlanError {
    fn from(e: crate::source_registry::SourceRegistryError) -> Self {
        use crate::source_registry::SourceRegistryErrorCode as C;
        let code = match e.code() {
            C::RcsBlockedUnknownSourceMapping => PlanErrorCode::UnknownSourceMapping,
            C::RcsBlockedAuthControlPlaneOutage => PlanErrorCode::AuthControlPlaneOutage,
        };
        PlanError::new(code, e.message().to_string())
    }
}

impl From<crate::store::StoreError> for PlanError {
    fn from(e: crate::store::StoreError) -> Self {
        PlanError::internal(e.message().to_string())
    }
}

impl From<crate::canonical::CanonicalError> for PlanError {
    fn from(e: crate::canonical::CanonicalError) -> Self {
        PlanError::internal(e.to_string())
    }
}

pub type PlanResult<T> = Result<T, PlanError>;

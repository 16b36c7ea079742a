//! Top-level error unification and the `{statusCode, error, reason_code?,
//! message}` envelope every component error is mapped into.

use serde::Serialize;
use std::fmt;

/// The union of every component's error type. The composition root and the
/// CLI only ever need to handle this one type.
#[derive(Debug)]
pub enum RcsError {
    Plan(crate::plan::PlanError),
    Job(crate::job::JobError),
    Execution(crate::execution::ExecutionError),
    Evidence(crate::evidence::EvidenceError),
    SourceRegistry(crate::source_registry::SourceRegistryError),
    Store(crate::store::StoreError),
    Canonical(crate::canonical::CanonicalError),
}

impl RcsError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Plan(e) => e.status_code(),
            Self::Job(e) => e.status_code(),
            Self::Execution(e) => e.status_code(),
            Self::Evidence(e) => e.status_code(),
            Self::SourceRegistry(e) => e.status_code(),
            Self::Store(e) => e.status_code(),
            Self::Canonical(_) => 500,
        }
    }

    /// The closed-but-extensible `reason_code` vocabulary; `"none"` for
    /// errors that carry no specific reason code.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Plan(e) => e.reason_code(),
            Self::Job(e) => e.reason_code(),
            Self::Execution(e) => e.reason_code(),
            Self::Evidence(e) => e.reason_code(),
            Self::SourceRegistry(e) => e.reason_code(),
            Self::Store(_) => "failed_internal_error",
            Self::Canonical(_) => "failed_internal_error",
        }
    }

    /// Short machine-readable error label (the envelope's `error` field) —
    /// the component name plus its error code's debug form.
    pub fn error_label(&self) -> String {
        match self {
            Self::Plan(e) => format!("plan_service.{:?}", e.code()),
            Self::Job(e) => format!("job_service.{:?}", e.code()),
            Self::Execution(e) => format!("execution_service.{:?}", e.code()),
            Self::Evidence(e) => format!("evidence_service.{:?}", e.code()),
            Self::SourceRegistry(e) => format!("source_registry.{:?}", e.code()),
            Self::Store(e) => format!("store.{:?}", e.code()),
            Self::Canonical(_) => "canonical.serialize_error".to_string(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Plan(e) => e.message(),
            Self::Job(e) => e.message(),
            Self::Execution(e) => e.message(),
            Self::Evidence(e) => e.message(),
            Self::SourceRegistry(e) => e.message(),
            Self::Store(e) => e.message(),
            Self::Canonical(_) => "canonicalization failed",
        }
    }

    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            status_code: self.status_code(),
            error: self.error_label(),
            reason_code: if self.reason_code() == "none" {
                None
            } else {
                Some(self.reason_code().to_string())
            },
            message: self.message().to_string(),
        }
    }
}

impl fmt::Display for RcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_label(), self.message())
    }
}

impl std::error::Error for RcsError {}

impl From<crate::plan::PlanError> for RcsError {
    fn from(e: crate::plan::PlanError) -> Self {
        Self::Plan(e)
    }
}

impl From<crate::job::JobError> for RcsError {
    fn from(e: crate::job::JobError) -> Self {
        Self::Job(e)
    }
}

impl From<crate::execution::ExecutionError> for RcsError {
    fn from(e: crate::execution::ExecutionError) -> Self {
        Self::Execution(e)
    }
}

impl From<crate::evidence::EvidenceError> for RcsError {
    fn from(e: crate::evidence::EvidenceError) -> Self {
        Self::Evidence(e)
    }
}

impl From<crate::source_registry::SourceRegistryError> for RcsError {
    fn from(e: crate::source_registry::SourceRegistryError) -> Self {
        Self::SourceRegistry(e)
    }
}

impl From<crate::store::StoreError> for RcsError {
    fn from(e: crate::store::StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<crate::canonical::CanonicalError> for RcsError {
    fn from(e: crate::canonical::CanonicalError) -> Self {
        Self::Canonical(e)
    }
}

/// The wire shape every failure reaches the caller in:
/// `{statusCode, error, reason_code?, message}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub status_code: u16,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_not_found_envelope_has_no_reason_code() {
        let err: RcsError = crate::plan::PlanError::not_found("plan-missing").into();
        let envelope = err.to_envelope();
        assert_eq!(envelope.status_code, 404);
        assert_eq!(envelope.reason_code, None);
    }

    #[test]
    fn job_invalid_state_transition_carries_reason_code() {
        let err: RcsError = crate::job::JobError::invalid_state_transition("cannot resume a queued job").into();
        let envelope = err.to_envelope();
        assert!(envelope.reason_code.is_some());
    }
}

//! EvidenceService error types.

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
pub enum EvidenceErrorCode {
    NotFound,
    NotReady,
    ArtifactHashMismatch,
    ReportHashMismatch,
    SignatureVerificationFailed,
    SignerMisconfigured,
    Internal,
}

impl EvidenceErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "none",
            Self::NotReady => "blocked_evidence_not_ready",
            Self::ArtifactHashMismatch => "failed_evidence_artifact_hash_mismatch",
            Self::ReportHashMismatch => "failed_evidence_report_hash_mismatch",
            Self::SignatureVerificationFailed => "failed_evidence_signature_verification",
            Self::SignerMisconfigured => "failed_internal_error",
            Self::Internal => "failed_internal_error",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::NotFound => Severity::Warn,
            Self::NotReady => Severity::Warn,
            Self::ArtifactHashMismatch | Self::ReportHashMismatch | Self::SignatureVerificationFailed => Severity::Fatal,
            Self::SignerMisconfigured => Severity::Fatal,
            Self::Internal => Severity::Error,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::NotReady => 409,
            Self::ArtifactHashMismatch | Self::ReportHashMismatch | Self::SignatureVerificationFailed => 409,
            Self::SignerMisconfigured => 500,
            Self::Internal => 500,
        }
    }
}

impl fmt::Display for EvidenceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
pub struct EvidenceError {
    code: EvidenceErrorCode,
    message: String,
}

impl EvidenceError {
    pub fn new(code: EvidenceErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(job_id: &str) -> Self {
        Self::new(EvidenceErrorCode::NotFound, format!("no evidence for job '{job_id}'"))
    }

    pub fn not_ready(job_id: &str) -> Self {
        Self::new(
            EvidenceErrorCode::NotReady,
            format!("job '{job_id}' execution is not in a terminal state"),
        )
    }

    pub fn artifact_hash_mismatch(message: impl Into<String>) -> Self {
        Self::new(EvidenceErrorCode::ArtifactHashMismatch, message)
    }

    pub fn report_hash_mismatch(message: impl Into<String>) -> Self {
        Self::new(EvidenceErrorCode::ReportHashMismatch, message)
    }

    pub fn signature_verification_failed(message: impl Into<String>) -> Self {
        Self::new(EvidenceErrorCode::SignatureVerificationFailed, message)
    }

    pub fn signer_misconfigured(message: impl Into<String>) -> Self {
        Self::new(EvidenceErrorCode::SignerMisconfigured, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(EvidenceErrorCode::Internal, message)
    }

    pub fn code(&self) -> EvidenceErrorCode {
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

impl fmt::Display for EvidenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code, self.message)
    }
}

impl std::error::Error for EvidenceError {}

impl From<crate::canonical::CanonicalError> for EvidenceError {
    fn from(e: crate::canonical::CanonicalError) -> Self {
        EvidenceError::internal(e.to_string())
    }
}

impl From<crate::store::StoreError> for EvidenceError {
    fn from(e: crate::store::StoreError) -> Self {
        EvidenceError::internal(e.message().to_string())
    }
}

impl From<crate::job::JobError> for EvidenceError {
    fn from(e: crate::job::JobError) -> Self {
        if e.code() == crate::job::JobErrorCode::NotFound {
            EvidenceError::new(EvidenceErrorCode::NotFound, e.message().to_string())
        } else {
            EvidenceError::internal(e.message().to_string())
        }
    }
}

impl From<crate::execution::ExecutionError> for EvidenceError {
    fn from(e: crate::execution::ExecutionError) -> Self {
        EvidenceError::internal(e.message().to_string())
    }
}

pub type EvidenceResult<T> = Result<T, EvidenceError>;

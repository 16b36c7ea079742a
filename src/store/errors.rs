//! Snapshot store error types
//!
//! Per ERRORS.md-style conventions used across this codebase: structured
//! error codes in `AERO_CATEGORY_NAME` format (kept here as `RCS_*` for this
//! component family), explicit severity, no silent failures.

use std::fmt;

/// Error severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller may retry the same operation.
    Transient,
    /// Caller must retry the whole mutate with fresh state.
    Conflict,
    /// Unrecoverable without operator intervention.
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Transient => write!(f, "TRANSIENT"),
            Severity::Conflict => write!(f, "CONFLICT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Snapshot store error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// The underlying transport failed transiently; caller may retry.
    RcsStoreTransportError,
    /// A serializable mutation lost a write race; the mutate was rolled back.
    RcsStoreSerializationConflict,
    /// The stored state failed to deserialize.
    RcsStoreCorruptState,
}

impl StoreErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RcsStoreTransportError => "RCS_STORE_TRANSPORT_ERROR",
            Self::RcsStoreSerializationConflict => "RCS_STORE_SERIALIZATION_CONFLICT",
            Self::RcsStoreCorruptState => "RCS_STORE_CORRUPT_STATE",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::RcsStoreTransportError => Severity::Transient,
            Self::RcsStoreSerializationConflict => Severity::Conflict,
            Self::RcsStoreCorruptState => Severity::Fatal,
        }
    }

    /// Loose HTTP-style status code summarizing failure severity.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::RcsStoreTransportError => 503,
            Self::RcsStoreSerializationConflict => 500,
            Self::RcsStoreCorruptState => 500,
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot store error with context.
#[derive(Debug)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
}

impl StoreError {
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::RcsStoreTransportError, message)
    }

    pub fn serialization_conflict(store_key: &str) -> Self {
        Self::new(
            StoreErrorCode::RcsStoreSerializationConflict,
            format!("concurrent writer won the race for store_key '{store_key}'"),
        )
    }

    pub fn corrupt_state(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::RcsStoreCorruptState, message)
    }

    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn status_code(&self) -> u16 {
        self.code.status_code()
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code, self.message)
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

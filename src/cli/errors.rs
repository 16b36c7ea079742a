//! CLI-specific error types.
//!
//! Config/claims/IO failures are local to the CLI process. A failure inside
//! the service graph arrives as an [`RcsError`] and is carried through
//! unchanged so the printed envelope matches what an HTTP embedder would
//! have returned.

use crate::error::{ErrorEnvelope, RcsError};
use std::fmt;
use std::io;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// Claims or registry file error
    ClaimsError,
    /// I/O error (stdin/stdout/files)
    IoError,
    /// The request body read from stdin didn't match the expected shape
    RequestError,
    /// A component error surfaced from the service graph
    Service,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "RCS_CLI_CONFIG_ERROR",
            Self::ClaimsError => "RCS_CLI_CLAIMS_ERROR",
            Self::IoError => "RCS_CLI_IO_ERROR",
            Self::RequestError => "RCS_CLI_REQUEST_ERROR",
            Self::Service => "RCS_CLI_SERVICE_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
    envelope: Option<ErrorEnvelope>,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            envelope: None,
        }
    }

    /// Config file error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// Claims/registry file error
    pub fn claims_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ClaimsError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Malformed request body
    pub fn request_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::RequestError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The component error envelope, when this wraps an `RcsError`.
    pub fn envelope(&self) -> Option<&ErrorEnvelope> {
        self.envelope.as_ref()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::request_error(format!("JSON error: {}", e))
    }
}

impl From<toml::de::Error> for CliError {
    fn from(e: toml::de::Error) -> Self {
        Self::config_error(format!("invalid config TOML: {}", e))
    }
}

impl From<RcsError> for CliError {
    fn from(e: RcsError) -> Self {
        Self {
            message: e.message().to_string(),
            envelope: Some(e.to_envelope()),
            code: CliErrorCode::Service,
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

//! Source registry / mapping resolver errors.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warn => write!(f, "WARN"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRegistryErrorCode {
    /// Resolver returned `not_found` and registry fallback is not permitted.
    RcsBlockedUnknownSourceMapping,
    /// Resolver reported an outage (treated as a dependency outage).
    RcsBlockedAuthControlPlaneOutage,
}

impl SourceRegistryErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RcsBlockedUnknownSourceMapping => "blocked_unknown_source_mapping",
            Self::RcsBlockedAuthControlPlaneOutage => "blocked_auth_control_plane_outage",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::RcsBlockedUnknownSourceMapping => Severity::Warn,
            Self::RcsBlockedAuthControlPlaneOutage => Severity::Fatal,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::RcsBlockedUnknownSourceMapping => 403,
            Self::RcsBlockedAuthControlPlaneOutage => 503,
        }
    }
}

impl fmt::Display for SourceRegistryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
pub struct SourceRegistryError {
    code: SourceRegistryErrorCode,
    message: String,
}

impl SourceRegistryError {
    pub fn new(code: SourceRegistryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unknown_source_mapping(tenant_id: &str, instance_id: &str) -> Self {
        Self::new(
            SourceRegistryErrorCode::RcsBlockedUnknownSourceMapping,
            format!("no source mapping for tenant '{tenant_id}' instance '{instance_id}'"),
        )
    }

    pub fn outage(message: impl Into<String>) -> Self {
        Self::new(SourceRegistryErrorCode::RcsBlockedAuthControlPlaneOutage, message)
    }

    pub fn code(&self) -> SourceRegistryErrorCode {
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

impl fmt::Display for SourceRegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code, self.message)
    }
}

impl std::error::Error for SourceRegistryError {}

pub type SourceRegistryResult<T> = Result<T, SourceRegistryError>;

//! Verified claims — the only contract this crate consumes from the
//! external bearer-token authenticator. The authenticator itself, and the
//! ACP client beyond [`crate::source_registry`], are out of scope here.

use crate::source_registry::ServiceScope;
use serde::{Deserialize, Serialize};

/// Claims attached to every authenticated operation. The scope triple
/// `(tenant_id, instance_id, source)` must equal the corresponding
/// fields on every scoped object a request touches; a mismatch is treated
/// as "not found" for that caller, never as an authorization error that
/// would leak the object's existence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub tenant_id: String,
    pub instance_id: String,
    pub source: String,
    pub service_scope: ServiceScope,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub iss: String,
    pub sub: String,
    pub aud: String,
}

impl Claims {
    /// Whether `(tenant_id, instance_id, source)` matches this claim's
    /// scope triple.
    pub fn matches_scope(&self, tenant_id: &str, instance_id: &str, source: &str) -> bool {
        self.tenant_id == tenant_id && self.instance_id == instance_id && self.source == source
    }
}

//! SourceRegistry + MappingResolver (C3)
//!
//! `SourceRegistry` holds a statically configured list of
//! `(tenant_id, instance_id, source)` tuples — the local fallback. Canonical
//! source mapping lives with the external Auth Control Plane, reached
//! through the [`MappingResolver`] trait; the local registry is consulted
//! only when no resolver is configured.

mod errors;

pub use errors::{Severity, SourceRegistryError, SourceRegistryErrorCode, SourceRegistryResult};

use serde::{Deserialize, Serialize};

/// Service scope a claim/request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceScope {
    Reg,
    Rrs,
}

/// A statically configured tenant/instance/source tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRegistryEntry {
    pub tenant_id: String,
    pub instance_id: String,
    pub source: String,
}

/// The static fallback registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceRegistry {
    entries: Vec<SourceRegistryEntry>,
}

impl SourceRegistry {
    pub fn new(entries: Vec<SourceRegistryEntry>) -> Self {
        Self { entries }
    }

    /// Membership check used as the last-resort fallback path.
    pub fn contains(&self, tenant_id: &str, instance_id: &str, source: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.tenant_id == tenant_id && e.instance_id == instance_id && e.source == source)
    }

    pub fn lookup(&self, tenant_id: &str, instance_id: &str) -> Option<&SourceRegistryEntry> {
        self.entries
            .iter()
            .find(|e| e.tenant_id == tenant_id && e.instance_id == instance_id)
    }
}

/// Dynamic authorization attributes the oracle attaches to a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMapping {
    pub tenant_id: String,
    pub instance_id: String,
    pub source: String,
    pub tenant_state: String,
    pub entitlement_state: String,
    pub instance_state: String,
    pub allowed_services: Vec<ServiceScope>,
}

#[derive(Debug, Clone)]
pub struct ResolveSourceMappingRequest {
    pub tenant_id: String,
    pub instance_id: String,
    pub service_scope: ServiceScope,
}

/// Outcome of resolving a tenant+instance against the authorization oracle.
#[derive(Debug, Clone)]
pub enum MappingResolution {
    Found {
        mapping: SourceMapping,
        service_allowed: bool,
        canonical_source: String,
    },
    NotFound,
    Outage {
        message: String,
    },
}

/// External Auth Control Plane client contract. Only this interface is
/// consumed by the core; the ACP client implementation itself is out of
/// scope.
pub trait MappingResolver: Send + Sync {
    fn resolve_source_mapping(&self, req: &ResolveSourceMappingRequest) -> MappingResolution;
}

/// Resolves the effective canonical source for a plan/job admission request.
///
/// `resolver` is `None` when no ACP client is configured — in that case the
/// local registry fallback is consulted instead of treating every request as
/// `not_found`.
pub fn resolve_effective_source(
    registry: &SourceRegistry,
    resolver: Option<&dyn MappingResolver>,
    tenant_id: &str,
    instance_id: &str,
    requested_source: &str,
    service_scope: ServiceScope,
) -> SourceRegistryResult<String> {
    match resolver {
        Some(resolver) => {
            let req = ResolveSourceMappingRequest {
                tenant_id: tenant_id.to_string(),
                instance_id: instance_id.to_string(),
                service_scope,
            };
            match resolver.resolve_source_mapping(&req) {
                MappingResolution::Found {
                    mapping,
                    service_allowed,
                    canonical_source,
                } => {
                    if service_allowed && mapping.source == requested_source {
                        Ok(canonical_source)
                    } else {
                        Err(SourceRegistryError::unknown_source_mapping(tenant_id, instance_id))
                    }
                }
                MappingResolution::NotFound => {
                    Err(SourceRegistryError::unknown_source_mapping(tenant_id, instance_id))
                }
                MappingResolution::Outage { message } => Err(SourceRegistryError::outage(message)),
            }
        }
        None => {
            if registry.contains(tenant_id, instance_id, requested_source) {
                Ok(requested_source.to_string())
            } else {
                Err(SourceRegistryError::unknown_source_mapping(tenant_id, instance_id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedResolver(MappingResolution);
    impl MappingResolver for FixedResolver {
        fn resolve_source_mapping(&self, _req: &ResolveSourceMappingRequest) -> MappingResolution {
            self.0.clone()
        }
    }

    impl Clone for MappingResolution {
        fn clone(&self) -> Self {
            match self {
                Self::Found {
                    mapping,
                    service_allowed,
                    canonical_source,
                } => Self::Found {
                    mapping: mapping.clone(),
                    service_allowed: *service_allowed,
                    canonical_source: canonical_source.clone(),
                },
                Self::NotFound => Self::NotFound,
                Self::Outage { message } => Self::Outage {
                    message: message.clone(),
                },
            }
        }
    }

    #[test]
    fn no_resolver_falls_back_to_registry() {
        let registry = SourceRegistry::new(vec![SourceRegistryEntry {
            tenant_id: "t1".into(),
            instance_id: "i1".into(),
            source: "sn://a".into(),
        }]);
        let result =
            resolve_effective_source(&registry, None, "t1", "i1", "sn://a", ServiceScope::Rrs);
        assert_eq!(result.unwrap(), "sn://a");
    }

    #[test]
    fn no_resolver_unknown_tenant_rejected() {
        let registry = SourceRegistry::default();
        let result =
            resolve_effective_source(&registry, None, "t1", "i1", "sn://a", ServiceScope::Rrs);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().reason_code(),
            "blocked_unknown_source_mapping"
        );
    }

    #[test]
    fn outage_surfaces_as_outage_reason() {
        let registry = SourceRegistry::default();
        let resolver = FixedResolver(MappingResolution::Outage {
            message: "acp down".into(),
        });
        let result = resolve_effective_source(
            &registry,
            Some(&resolver),
            "t1",
            "i1",
            "sn://a",
            ServiceScope::Rrs,
        );
        assert_eq!(
            result.unwrap_err().reason_code(),
            "blocked_auth_control_plane_outage"
        );
    }

    #[test]
    fn service_not_allowed_rejected() {
        let registry = SourceRegistry::default();
        let mapping = SourceMapping {
            tenant_id: "t1".into(),
            instance_id: "i1".into(),
            source: "sn://a".into(),
            tenant_state: "active".into(),
            entitlement_state: "active".into(),
            instance_state: "active".into(),
            allowed_services: vec![ServiceScope::Reg],
        };
        let resolver = FixedResolver(MappingResolution::Found {
            mapping,
            service_allowed: false,
            canonical_source: "sn://a".into(),
        });
        let result = resolve_effective_source(
            &registry,
            Some(&resolver),
            "t1",
            "i1",
            "sn://a",
            ServiceScope::Rrs,
        );
        assert!(result.is_err());
    }
}

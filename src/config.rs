//! Runtime configuration.
//!
//! Every tunable control-plane behavior that can vary by deployment lives
//! here. Defaults match the documented production defaults, so an empty
//! config still produces correct behavior.

use serde::{Deserialize, Serialize};

/// Which `SnapshotStore` backend the composition root wires up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Memory,
    Sql,
}

impl Default for StoreBackend {
    fn default() -> Self {
        StoreBackend::Memory
    }
}

/// Top-level runtime configuration for the Restore Control Service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RcsConfig {
    /// Freshness boundary; lag <= this many seconds is fresh.
    #[serde(default = "default_stale_after_seconds")]
    pub stale_after_seconds: i64,

    /// Row-count cap that triggers `restore_override_caps`.
    #[serde(default = "default_max_rows")]
    pub max_rows: u64,

    /// Skip-ratio percentage cap that triggers `restore_override_caps`.
    #[serde(default = "default_elevated_skip_ratio_percent")]
    pub elevated_skip_ratio_percent: f64,

    /// Media item-count cap that triggers `restore_override_caps`.
    #[serde(default = "default_media_max_items")]
    pub media_max_items: u64,

    /// Media byte-total cap that triggers `restore_override_caps`.
    #[serde(default = "default_media_max_bytes")]
    pub media_max_bytes: u64,

    /// Default max retry attempts for the media pipeline.
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,

    /// Default chunk size when a request omits one.
    #[serde(default = "default_chunk_size")]
    pub default_chunk_size: u32,

    /// Chunk budget per attempt before pausing; 0 disables the cap.
    #[serde(default = "default_max_chunks_per_attempt")]
    pub max_chunks_per_attempt: u32,

    /// Opaque version string embedded in evidence.
    #[serde(default = "default_canonicalization_version")]
    pub canonicalization_version: String,

    /// Opaque version string embedded in plans/evidence.
    #[serde(default = "default_pit_algorithm_version")]
    pub pit_algorithm_version: String,

    /// Path to the ed25519 signing key PEM.
    #[serde(default)]
    pub signer_private_key_path: Option<String>,

    /// Path to the ed25519 public key PEM (validated to match at startup).
    #[serde(default)]
    pub signer_public_key_path: Option<String>,

    /// Key identifier embedded in `manifest_signature.signer_key_id`.
    #[serde(default = "default_signer_key_id")]
    pub signer_key_id: String,

    /// Which `SnapshotStore` backend to construct.
    #[serde(default)]
    pub store_backend: StoreBackend,
}

fn default_stale_after_seconds() -> i64 {
    120
}

fn default_max_rows() -> u64 {
    10_000
}

fn default_elevated_skip_ratio_percent() -> f64 {
    20.0
}

fn default_media_max_items() -> u64 {
    50
}

fn default_media_max_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_max_retry_attempts() -> u32 {
    3
}

fn default_chunk_size() -> u32 {
    100
}

fn default_max_chunks_per_attempt() -> u32 {
    0
}

fn default_canonicalization_version() -> String {
    "rcs.canonical.v1".to_string()
}

fn default_pit_algorithm_version() -> String {
    "rcs.pit.v1".to_string()
}

fn default_signer_key_id() -> String {
    "rcs-evidence-signer-1".to_string()
}

impl Default for RcsConfig {
    fn default() -> Self {
        Self {
            stale_after_seconds: default_stale_after_seconds(),
            max_rows: default_max_rows(),
            elevated_skip_ratio_percent: default_elevated_skip_ratio_percent(),
            media_max_items: default_media_max_items(),
            media_max_bytes: default_media_max_bytes(),
            max_retry_attempts: default_max_retry_attempts(),
            default_chunk_size: default_chunk_size(),
            max_chunks_per_attempt: default_max_chunks_per_attempt(),
            canonicalization_version: default_canonicalization_version(),
            pit_algorithm_version: default_pit_algorithm_version(),
            signer_private_key_path: None,
            signer_public_key_path: None,
            signer_key_id: default_signer_key_id(),
            store_backend: StoreBackend::Memory,
        }
    }
}

impl RcsConfig {
    /// Load from a TOML file, falling back to defaults for missing fields.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Apply `RCS_`-prefixed environment overrides on top of an existing
    /// config (mirrors the pack's `dotenvy`-adjacent layering pattern).
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("RCS_STALE_AFTER_SECONDS") {
            if let Ok(v) = v.parse() {
                self.stale_after_seconds = v;
            }
        }
        if let Ok(v) = std::env::var("RCS_MAX_ROWS") {
            if let Ok(v) = v.parse() {
                self.max_rows = v;
            }
        }
        if let Ok(v) = std::env::var("RCS_SIGNER_PRIVATE_KEY_PATH") {
            self.signer_private_key_path = Some(v);
        }
        if let Ok(v) = std::env::var("RCS_SIGNER_PUBLIC_KEY_PATH") {
            self.signer_public_key_path = Some(v);
        }
        if let Ok(v) = std::env::var("RCS_STORE_BACKEND") {
            match v.as_str() {
                "memory" => self.store_backend = StoreBackend::Memory,
                "sql" => self.store_backend = StoreBackend::Sql,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_documented_defaults() {
        let config = RcsConfig::default();
        assert_eq!(config.stale_after_seconds, 120);
        assert_eq!(config.store_backend, StoreBackend::Memory);
    }

    #[test]
    fn test_from_toml_str_partial_overrides() {
        let config = RcsConfig::from_toml_str(r#"max_rows = 500"#).unwrap();
        assert_eq!(config.max_rows, 500);
        assert_eq!(config.stale_after_seconds, 120);
    }

    #[test]
    fn test_from_toml_str_empty_uses_all_defaults() {
        let config = RcsConfig::from_toml_str("").unwrap();
        assert_eq!(config.stale_after_seconds, 120);
        assert_eq!(config.media_max_items, 50);
    }
}

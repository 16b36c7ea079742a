//! EvidenceService (C9)
//!
//! Assembles the signed, append-only evidence manifest for a completed job:
//! four fixed artifacts, a report hash over a stable field set, and an
//! ed25519 signature — plus the verification path that recomputes all three.

mod errors;
mod service;
mod signer;
mod types;

pub use errors::{EvidenceError, EvidenceErrorCode, EvidenceResult, Severity};
pub use service::EvidenceService;
pub use signer::EvidenceSigner;
pub use types::{Artifact, EvidenceRecord, EvidenceState, ImmutableStorage, ManifestSignature, SignatureVerification};

//! ed25519 manifest signer.
//!
//! The private/public PEM pair is validated to match at startup by
//! comparing the verifying key derived from the private key against the
//! one parsed from the supplied public PEM. PEMs that arrive with literal
//! `\n` escape sequences (common when a key is passed through an
//! environment variable) are normalized to real newlines first.

use base64::{engine::general_purpose::STANDARD, Engine};
use ed25519_dalek::pkcs8::{DecodePrivateKey, DecodePublicKey};
use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};

use super::errors::EvidenceError;

pub struct EvidenceSigner {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    key_id: String,
}

impl EvidenceSigner {
    pub fn from_pem(private_pem: &str, public_pem: &str, key_id: impl Into<String>) -> Result<Self, EvidenceError> {
        let private_pem = normalize_pem(private_pem);
        let public_pem = normalize_pem(public_pem);

        let signing_key =
            SigningKey::from_pkcs8_pem(&private_pem).map_err(|e| EvidenceError::signer_misconfigured(format!("invalid signer private key: {e}")))?;
        let provided = VerifyingKey::from_public_key_pem(&public_pem)
            .map_err(|e| EvidenceError::signer_misconfigured(format!("invalid signer public key: {e}")))?;
        let derived = signing_key.verifying_key();
        if derived.to_bytes() != provided.to_bytes() {
            return Err(EvidenceError::signer_misconfigured(
                "signer public key does not match the private key's derived verifying key",
            ));
        }

        Ok(Self {
            signing_key,
            verifying_key: derived,
            key_id: key_id.into(),
        })
    }

    /// Generates an ephemeral keypair — used by tests and the CLI demo when
    /// no signer PEM pair is configured.
    pub fn generate(key_id: impl Into<String>) -> Self {
        let mut rng = rand::rngs::OsRng;
        let signing_key = SigningKey::generate(&mut rng);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
            key_id: key_id.into(),
        }
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn sign(&self, payload: &str) -> String {
        let signature: Signature = self.signing_key.sign(payload.as_bytes());
        STANDARD.encode(signature.to_bytes())
    }

    pub fn verify(&self, payload: &str, signature_b64: &str) -> bool {
        let Ok(raw) = STANDARD.decode(signature_b64) else {
            return false;
        };
        let Ok(bytes) = <[u8; 64]>::try_from(raw.as_slice()) else {
            return false;
        };
        let signature = Signature::from_bytes(&bytes);
        self.verifying_key.verify(payload.as_bytes(), &signature).is_ok()
    }
}

fn normalize_pem(pem: &str) -> String {
    pem.replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_roundtrips() {
        let signer = EvidenceSigner::generate("test-key");
        let signature = signer.sign("payload");
        assert!(signer.verify("payload", &signature));
        assert!(!signer.verify("tampered", &signature));
    }

    #[test]
    fn mismatched_keypair_is_rejected() {
        use ed25519_dalek::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
        let mut rng = rand::rngs::OsRng;
        let key_a = SigningKey::generate(&mut rng);
        let key_b = SigningKey::generate(&mut rng);
        let private_pem = key_a.to_pkcs8_pem(LineEnding::LF).unwrap().to_string();
        let public_pem = key_b.verifying_key().to_public_key_pem(LineEnding::LF).unwrap();
        let err = EvidenceSigner::from_pem(&private_pem, &public_pem, "k").unwrap_err();
        assert_eq!(err.code(), super::super::errors::EvidenceErrorCode::SignerMisconfigured);
    }
}

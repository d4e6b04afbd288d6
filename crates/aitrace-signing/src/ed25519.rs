//! Ed25519 implementation of `SignatureService`.
//!
//! The signed message is the UTF-8 text of the hex digest, not the raw
//! digest bytes, so a signature can be checked with any Ed25519 tool given
//! the `hashSha256` string from the JSON document.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use tracing::debug;

use aitrace_contracts::error::{AiTraceError, AiTraceResult};
use aitrace_core::traits::SignatureService;

/// Label written to `signature_algorithm`.
pub const ALGORITHM: &str = "Ed25519";

enum KeyMaterial {
    Signing(SigningKey),
    VerifyOnly(VerifyingKey),
}

/// Signs and verifies record hashes with one Ed25519 key.
///
/// A service built from a verifying key can only verify; `sign` returns
/// `AiTraceError::SigningFailed`.
pub struct Ed25519SignatureService {
    key: KeyMaterial,
}

impl Ed25519SignatureService {
    pub fn from_signing_key(key: SigningKey) -> Self {
        Self {
            key: KeyMaterial::Signing(key),
        }
    }

    pub fn from_verifying_key(key: VerifyingKey) -> Self {
        Self {
            key: KeyMaterial::VerifyOnly(key),
        }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        match &self.key {
            KeyMaterial::Signing(k) => k.verifying_key(),
            KeyMaterial::VerifyOnly(k) => *k,
        }
    }

    pub fn can_sign(&self) -> bool {
        matches!(self.key, KeyMaterial::Signing(_))
    }
}

impl SignatureService for Ed25519SignatureService {
    fn algorithm(&self) -> &str {
        ALGORITHM
    }

    fn sign(&self, digest_hex: &str) -> AiTraceResult<String> {
        let KeyMaterial::Signing(key) = &self.key else {
            return Err(AiTraceError::SigningFailed {
                reason: "signature service holds a verifying key only".to_string(),
            });
        };
        if digest_hex.trim().is_empty() {
            return Err(AiTraceError::SigningFailed {
                reason: "refusing to sign an empty digest".to_string(),
            });
        }
        let signature = key.sign(digest_hex.as_bytes());
        Ok(hex::encode(signature.to_bytes()))
    }

    fn verify(&self, digest_hex: &str, signature: &str) -> bool {
        let Ok(bytes) = hex::decode(signature.trim()) else {
            debug!("signature is not valid hex");
            return false;
        };
        let Ok(bytes) = <[u8; 64]>::try_from(bytes.as_slice()) else {
            debug!(len = bytes.len(), "signature must be 64 bytes");
            return false;
        };
        let signature = Signature::from_bytes(&bytes);
        self.verifying_key()
            .verify(digest_hex.as_bytes(), &signature)
            .is_ok()
    }
}

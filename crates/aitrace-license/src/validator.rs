//! Offline license validation against the issuer's public key.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use tracing::debug;

use crate::license::{LicenseError, LicenseInfo, LicensePayload, DEFAULT_PLAN};

/// Checks license strings signed by one issuer.
#[derive(Debug, Clone)]
pub struct LicenseValidator {
    issuer: VerifyingKey,
}

impl LicenseValidator {
    pub fn new(issuer: VerifyingKey) -> Self {
        Self { issuer }
    }

    /// Validate `raw` as of `now`.
    ///
    /// Checks, in order: shape, encoding, signature, payload, licensee,
    /// expiry.  The first failing check decides the error.
    pub fn validate(&self, raw: &str, now: DateTime<Utc>) -> Result<LicenseInfo, LicenseError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(LicenseError::Empty);
        }

        let (payload_b64, signature_b64) = raw.split_once('.').ok_or(LicenseError::Format)?;

        let payload_bytes = STANDARD
            .decode(payload_b64)
            .map_err(|_| LicenseError::Encoding)?;
        let signature_bytes = STANDARD
            .decode(signature_b64)
            .map_err(|_| LicenseError::Encoding)?;

        let signature_bytes =
            <[u8; 64]>::try_from(signature_bytes.as_slice()).map_err(|_| LicenseError::Signature)?;
        self.issuer
            .verify(&payload_bytes, &Signature::from_bytes(&signature_bytes))
            .map_err(|_| LicenseError::Signature)?;

        let payload: LicensePayload = serde_json::from_slice(&payload_bytes)
            .map_err(|e| LicenseError::Payload(e.to_string()))?;

        let expires_utc = DateTime::parse_from_rfc3339(payload.expires_utc.trim())
            .map_err(|_| LicenseError::Expiry)?
            .with_timezone(&Utc);

        let info = LicenseInfo {
            licensee: payload.licensee,
            expires_utc,
            plan: payload
                .plan
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PLAN.to_string()),
        };

        if info.licensee.trim().is_empty() {
            return Err(LicenseError::EmptyLicensee);
        }
        if info.is_expired(now) {
            return Err(LicenseError::Expired(info.expires_utc.to_rfc3339()));
        }

        debug!(licensee = %info.licensee, plan = %info.plan, "license accepted");
        Ok(info)
    }
}

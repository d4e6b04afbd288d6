//! License payload, wire format, and issuing.
//!
//! A license string is `BASE64(payload_json) "." BASE64(signature)`, where
//! the signature is Ed25519 over the exact payload bytes:
//!
//! ```json
//! {"licensee":"Company Inc.","expiresUtc":"2026-12-31T23:59:59Z","plan":"Pro"}
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use ed25519_dalek::{Signer, SigningKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Plan assumed when the payload omits one.
pub const DEFAULT_PLAN: &str = "Pro";

/// A validated license.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseInfo {
    pub licensee: String,
    pub expires_utc: DateTime<Utc>,
    pub plan: String,
}

impl LicenseInfo {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_utc
    }
}

/// Payload exactly as it appears on the wire.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LicensePayload {
    pub(crate) licensee: String,
    pub(crate) expires_utc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) plan: Option<String>,
}

/// Why a license was rejected.  Each variant is a distinct reason.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LicenseError {
    #[error("no license found; set {env_var} or provide an '{file_name}' file")]
    Missing {
        env_var: String,
        file_name: String,
    },

    #[error("empty license")]
    Empty,

    #[error("invalid license format (expected 'payload.signature')")]
    Format,

    #[error("invalid base64 payload/signature")]
    Encoding,

    #[error("invalid license signature")]
    Signature,

    #[error("invalid license payload JSON: {0}")]
    Payload(String),

    #[error("invalid expiresUtc in license payload")]
    Expiry,

    #[error("licensee is empty")]
    EmptyLicensee,

    #[error("license expired on {0}")]
    Expired(String),

    #[error("no license issuer key configured")]
    NoIssuerKey,

    #[error("failed to read license: {0}")]
    Unreadable(String),
}

/// Produce a license string for `info`, signed with the issuer key.
pub fn issue_license(issuer: &SigningKey, info: &LicenseInfo) -> String {
    let payload = LicensePayload {
        licensee: info.licensee.clone(),
        expires_utc: info.expires_utc.to_rfc3339_opts(SecondsFormat::Secs, true),
        plan: Some(info.plan.clone()),
    };
    let payload_bytes =
        serde_json::to_vec(&payload).expect("a struct of strings always serializes");
    let signature = issuer.sign(&payload_bytes);
    format!(
        "{}.{}",
        STANDARD.encode(&payload_bytes),
        STANDARD.encode(signature.to_bytes())
    )
}

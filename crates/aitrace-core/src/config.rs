//! Host configuration, loaded once at startup and passed explicitly.
//!
//! ```toml
//! audit_dir = "aitrace"
//! store_content = true
//! basic_redaction = true
//! signing_key_path = "keys/aitrace_signing.key"
//! verify_key_path = "keys/aitrace_public.key"
//!
//! [license]
//! mode = "enforced"
//! issuer_public_key = "…64 hex chars…"
//! license_path = "aitrace.license"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use aitrace_contracts::{
    error::{AiTraceError, AiTraceResult},
    policy::EnforcementMode,
};

/// Everything the write and verify paths need from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Directory holding one JSON document per record.
    pub audit_dir: PathBuf,

    /// Retain prompt/output bodies.  Off by default.
    pub store_content: bool,

    /// Apply `BasicRedactor` to retained bodies.
    pub basic_redaction: bool,

    /// Hex-encoded signing key.  When set, appended records are signed.
    pub signing_key_path: Option<PathBuf>,

    /// Hex-encoded verifying key used by the chain verifier.
    pub verify_key_path: Option<PathBuf>,

    pub license: LicenseSettings,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            audit_dir: PathBuf::from("aitrace"),
            store_content: false,
            basic_redaction: true,
            signing_key_path: None,
            verify_key_path: None,
            license: LicenseSettings::default(),
        }
    }
}

/// Entitlement gate settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseSettings {
    pub mode: EnforcementMode,

    /// Hex-encoded Ed25519 key of the license issuer.
    pub issuer_public_key: Option<String>,

    /// Explicit license file, consulted after the environment variable.
    pub license_path: Option<PathBuf>,
}

impl TraceConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `AiTraceError::ConfigError` when the document is malformed or
    /// does not match the schema.
    pub fn from_toml_str(s: &str) -> AiTraceResult<Self> {
        toml::from_str(s).map_err(|e| AiTraceError::ConfigError {
            reason: format!("failed to parse config TOML: {}", e),
        })
    }

    /// Read and parse the TOML file at `path`.
    pub fn from_file(path: &Path) -> AiTraceResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AiTraceError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Like `from_file`, but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> AiTraceResult<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            debug!(path = %path.display(), "config file not found; using defaults");
            Ok(Self::default())
        }
    }
}

//! The license-backed `EntitlementGate`.

use chrono::{DateTime, Utc};
use ed25519_dalek::VerifyingKey;
use tracing::warn;

use aitrace_contracts::{
    error::{AiTraceError, AiTraceResult},
    policy::{EnforcementMode, Feature},
};
use aitrace_core::{traits::EntitlementGate, LicenseSettings};
use aitrace_signing::keys::verifying_key_from_hex;

use crate::{
    license::{LicenseError, LicenseInfo},
    loader::{LicenseLoader, LICENSE_FILE_NAME},
    validator::LicenseValidator,
};

/// Grants a feature only when a valid, unexpired license is present.
///
/// In `EnforcementMode::Disabled` every feature is granted.
#[derive(Debug, Clone)]
pub struct LicenseGuard {
    mode: EnforcementMode,
    loader: LicenseLoader,
    validator: Option<LicenseValidator>,
}

impl LicenseGuard {
    pub fn disabled() -> Self {
        Self {
            mode: EnforcementMode::Disabled,
            loader: LicenseLoader::default(),
            validator: None,
        }
    }

    pub fn enforced(loader: LicenseLoader, issuer: VerifyingKey) -> Self {
        Self {
            mode: EnforcementMode::Enforced,
            loader,
            validator: Some(LicenseValidator::new(issuer)),
        }
    }

    /// Build from configuration.
    ///
    /// An enforced guard without an issuer key is valid; it denies every
    /// feature.  A malformed issuer key is a `KeyError`.
    pub fn from_settings(settings: &LicenseSettings) -> AiTraceResult<Self> {
        let validator = match settings.issuer_public_key.as_deref() {
            Some(hex_key) if !hex_key.trim().is_empty() => {
                Some(LicenseValidator::new(verifying_key_from_hex(hex_key)?))
            }
            _ => None,
        };
        Ok(Self {
            mode: settings.mode,
            loader: LicenseLoader::new(settings.license_path.clone()),
            validator,
        })
    }

    pub fn mode(&self) -> EnforcementMode {
        self.mode
    }

    /// Locate and validate the license as of `now`.
    pub fn check(&self, now: DateTime<Utc>) -> Result<LicenseInfo, LicenseError> {
        let validator = self.validator.as_ref().ok_or(LicenseError::NoIssuerKey)?;
        let raw = self.loader.load()?.ok_or_else(|| LicenseError::Missing {
            env_var: self.loader.env_var().to_string(),
            file_name: LICENSE_FILE_NAME.to_string(),
        })?;
        validator.validate(&raw, now)
    }
}

impl EntitlementGate for LicenseGuard {
    fn ensure(&self, feature: Feature) -> AiTraceResult<()> {
        if self.mode == EnforcementMode::Disabled {
            return Ok(());
        }
        self.check(Utc::now()).map(|_| ()).map_err(|e| {
            warn!(feature = %feature, reason = %e, "entitlement denied");
            AiTraceError::EntitlementDenied {
                feature: feature.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

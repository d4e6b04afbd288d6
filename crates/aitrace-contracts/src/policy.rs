//! Verification policy, scope, and entitlement settings.
//!
//! The chain walk itself is policy-agnostic.  These types decide how strict
//! a summary is and which records count.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How strictly a verification summary interprets the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerificationPolicy {
    /// Every in-scope record must carry a signature.
    pub require_signatures: bool,

    /// Chain links are checked and a break fails verification.  When false,
    /// links are not checked and the chain is reported as unproven.
    pub require_chain_integrity: bool,

    /// An empty collection is a failure rather than an empty pass.
    pub fail_on_missing_files: bool,

    /// The first in-scope record may link to a record outside the scope.
    pub allow_start_mid_chain: bool,
}

impl VerificationPolicy {
    /// Every check on.  The default.
    pub fn strict() -> Self {
        Self {
            require_signatures: true,
            require_chain_integrity: true,
            fail_on_missing_files: true,
            allow_start_mid_chain: true,
        }
    }

    /// Integrity and chain only; unsigned trails pass.
    pub fn unsigned() -> Self {
        Self {
            require_signatures: false,
            ..Self::strict()
        }
    }
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

/// Which records a verification covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum VerificationScope {
    #[default]
    All,
    /// Inclusive window on `timestamp_utc`.
    Between {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

impl VerificationScope {
    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self::Between { from, to }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Between { from, to } => *from <= ts && ts <= *to,
        }
    }
}

/// Whether the entitlement gate checks anything.
///
/// Chosen by the host at construction, never by build profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnforcementMode {
    #[default]
    Enforced,
    Disabled,
}

/// Privileged operations guarded by the entitlement gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    ChainVerification,
    SignedStore,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChainVerification => "chain-verification",
            Self::SignedStore => "signed-store",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Low-level verification outcome produced by the chain verifier.
//!
//! The verifier is fail-fast: a result carries at most one failure, the
//! first one found in walk order.

use serde::{Deserialize, Serialize};

/// Stable status code for a verification run.
///
/// Callers should branch on this, never on the free-text `reason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationStatus {
    Ok,

    // Integrity / chain
    HashMismatch,
    ChainBroken,

    // Signatures
    SignatureInvalid,
    SignatureServiceMissing,
    SignatureRequiredButMissing,

    // Input / files
    InvalidLocation,
    DirectoryNotFound,
    NoFiles,
    ParseError,

    // Gate
    EntitlementDenied,
}

impl VerificationStatus {
    /// Short machine-friendly name, used in reports and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "Ok",
            Self::HashMismatch => "HashMismatch",
            Self::ChainBroken => "ChainBroken",
            Self::SignatureInvalid => "SignatureInvalid",
            Self::SignatureServiceMissing => "SignatureServiceMissing",
            Self::SignatureRequiredButMissing => "SignatureRequiredButMissing",
            Self::InvalidLocation => "InvalidLocation",
            Self::DirectoryNotFound => "DirectoryNotFound",
            Self::NoFiles => "NoFiles",
            Self::ParseError => "ParseError",
            Self::EntitlementDenied => "EntitlementDenied",
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of one verification walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub status: VerificationStatus,

    /// Index (in walk order) of the failing record.
    pub failed_index: Option<usize>,

    /// File name of the failing unit, when the failure is tied to one.
    pub file_name: Option<String>,

    /// Human-readable explanation.  Never parsed.
    pub reason: Option<String>,

    /// Number of records that passed every check before the walk stopped.
    pub records_checked: usize,

    /// True once at least one signature was cryptographically checked.
    pub signature_checked: bool,

    /// True when every checked signature verified.
    pub signature_valid: bool,

    /// False when the walk ran with chain-link checks switched off.
    pub chain_checked: bool,
}

impl VerificationResult {
    /// A passing result over `records_checked` records.
    pub fn ok(records_checked: usize) -> Self {
        Self {
            status: VerificationStatus::Ok,
            failed_index: None,
            file_name: None,
            reason: None,
            records_checked,
            signature_checked: false,
            signature_valid: false,
            chain_checked: true,
        }
    }

    /// A failing result at `index`.
    pub fn fail(status: VerificationStatus, index: usize, reason: impl Into<String>) -> Self {
        Self {
            status,
            failed_index: Some(index),
            file_name: None,
            reason: Some(reason.into()),
            records_checked: index,
            signature_checked: false,
            signature_valid: false,
            chain_checked: true,
        }
    }

    /// A failure that happened before any record was read.
    pub fn rejected(status: VerificationStatus, reason: impl Into<String>) -> Self {
        Self {
            failed_index: None,
            ..Self::fail(status, 0, reason)
        }
    }

    /// Attach the failing file name.
    pub fn with_file(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn is_valid(&self) -> bool {
        self.status == VerificationStatus::Ok
    }
}

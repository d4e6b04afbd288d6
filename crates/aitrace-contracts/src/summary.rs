//! Regulator-facing verification summary.
//!
//! A `ComplianceSummary` is a projection of a `VerificationResult` plus scope
//! statistics.  It never carries a failure cause the verifier did not report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::verification::VerificationStatus;

/// What the summary can say about signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignatureCheckStatus {
    #[default]
    NotChecked,
    Valid,
    Invalid,
    NotPresent,
    MissingService,
    RequiredButMissing,
}

impl std::fmt::Display for SignatureCheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotChecked => "NotChecked",
            Self::Valid => "Valid",
            Self::Invalid => "Invalid",
            Self::NotPresent => "NotPresent",
            Self::MissingService => "MissingService",
            Self::RequiredButMissing => "RequiredButMissing",
        };
        f.write_str(s)
    }
}

/// The summary exported, printed, or handed to an auditor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceSummary {
    pub status: VerificationStatus,
    pub is_valid: bool,

    // Integrity proof
    /// Every record's hash was recomputed and matched.
    pub integrity_verified: bool,
    /// `prev_hash_sha256` links were checked and consistent.
    pub chain_verified: bool,

    // Signature proof
    pub any_signature_present: bool,
    pub signature_required: bool,
    pub signature_status: SignatureCheckStatus,

    // Scope
    pub files_verified: usize,
    pub records_verified: usize,
    pub first_timestamp_utc: Option<DateTime<Utc>>,
    pub last_timestamp_utc: Option<DateTime<Utc>>,

    // Failure details
    pub failed_index: Option<usize>,
    pub failed_file_name: Option<String>,
    pub reason: Option<String>,
}

//! Projection of a `VerificationResult` into a `ComplianceSummary`.
//!
//! The builder only re-expresses what the verifier reported.  It never
//! decides validity on its own.

use aitrace_contracts::{
    summary::{ComplianceSummary, SignatureCheckStatus},
    verification::{VerificationResult, VerificationStatus},
};

use crate::scope::ScopeStats;

/// Statuses produced before any record was walked.
fn rejected_before_walk(status: VerificationStatus) -> bool {
    matches!(
        status,
        VerificationStatus::InvalidLocation
            | VerificationStatus::DirectoryNotFound
            | VerificationStatus::NoFiles
            | VerificationStatus::EntitlementDenied
    )
}

pub struct ComplianceSummaryBuilder<'a> {
    result: &'a VerificationResult,
    stats: ScopeStats,
    signature_required: bool,
}

impl<'a> ComplianceSummaryBuilder<'a> {
    pub fn from_result(result: &'a VerificationResult) -> Self {
        Self {
            result,
            stats: ScopeStats::default(),
            signature_required: false,
        }
    }

    pub fn with_scope(mut self, stats: &ScopeStats) -> Self {
        self.stats = stats.clone();
        self
    }

    pub fn signature_required(mut self, required: bool) -> Self {
        self.signature_required = required;
        self
    }

    pub fn build(self) -> ComplianceSummary {
        let r = self.result;
        let walked = !rejected_before_walk(r.status);
        // An allowed empty collection passes without proving anything.
        let proven = walked && !(r.is_valid() && r.records_checked == 0);

        ComplianceSummary {
            status: r.status,
            is_valid: r.is_valid(),
            integrity_verified: proven
                && !matches!(
                    r.status,
                    VerificationStatus::HashMismatch | VerificationStatus::ParseError
                ),
            chain_verified: proven
                && r.chain_checked
                && r.status != VerificationStatus::ChainBroken,
            any_signature_present: self.stats.any_signature_present,
            signature_required: self.signature_required,
            signature_status: self.signature_status(walked),
            files_verified: self.stats.files,
            records_verified: r.records_checked,
            first_timestamp_utc: self.stats.first_timestamp_utc,
            last_timestamp_utc: self.stats.last_timestamp_utc,
            failed_index: r.failed_index,
            failed_file_name: r.file_name.clone(),
            reason: r.reason.clone(),
        }
    }

    fn signature_status(&self, walked: bool) -> SignatureCheckStatus {
        let r = self.result;
        match r.status {
            VerificationStatus::SignatureInvalid => SignatureCheckStatus::Invalid,
            VerificationStatus::SignatureServiceMissing => SignatureCheckStatus::MissingService,
            VerificationStatus::SignatureRequiredButMissing => {
                SignatureCheckStatus::RequiredButMissing
            }
            _ if r.signature_checked => {
                if r.signature_valid {
                    SignatureCheckStatus::Valid
                } else {
                    SignatureCheckStatus::Invalid
                }
            }
            _ if !walked || self.stats.files == 0 => SignatureCheckStatus::NotChecked,
            _ if !self.stats.any_signature_present => {
                if self.signature_required {
                    SignatureCheckStatus::RequiredButMissing
                } else {
                    SignatureCheckStatus::NotPresent
                }
            }
            _ => SignatureCheckStatus::NotChecked,
        }
    }
}

//! The chain verifier.
//!
//! `ChainVerifier` walks a collection in file-name order and stops at the
//! first record that fails.  Per record, in order:
//!
//! 1. **Decode**: an unreadable unit is `ParseError`.
//! 2. **Hash**: the recomputed digest must equal `hash_sha256`.
//! 3. **Signature**: only when the record carries both signature fields.
//!    No configured service is `SignatureServiceMissing`; a wrong algorithm
//!    label or a failed check is `SignatureInvalid`.
//! 4. **Chain**: for every record after the first that claims a previous
//!    hash, the claim must match the record before it.  A record with no
//!    claim is accepted.
//!
//! `verify` is the plain walk.  `verify_summary` applies the configured
//! `VerificationPolicy` and a `VerificationScope` on top of it.

use std::{path::Path, sync::Arc};

use tracing::{debug, info, warn};

use aitrace_audit::chain::{hash_record, links_to, verify_record_hash};
use aitrace_contracts::{
    policy::{Feature, VerificationPolicy, VerificationScope},
    record::AuditRecord,
    summary::ComplianceSummary,
    verification::{VerificationResult, VerificationStatus},
};
use aitrace_core::traits::{EntitlementGate, SignatureService};

use crate::{
    scope::{filter_scope, load_units, ScopeStats, Unit},
    summary::ComplianceSummaryBuilder,
};

/// Switches for one walk, derived from the policy.
#[derive(Debug, Clone, Copy)]
struct WalkOptions {
    check_chain: bool,
    require_chain_head: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            check_chain: true,
            require_chain_head: false,
        }
    }
}

impl From<&VerificationPolicy> for WalkOptions {
    fn from(policy: &VerificationPolicy) -> Self {
        Self {
            check_chain: policy.require_chain_integrity,
            require_chain_head: !policy.allow_start_mid_chain,
        }
    }
}

/// Verifies audit collections written by the AiTrace stores.
pub struct ChainVerifier {
    signer: Option<Arc<dyn SignatureService>>,
    gate: Option<Arc<dyn EntitlementGate>>,
    policy: VerificationPolicy,
}

impl ChainVerifier {
    /// A verifier with the strict policy, no signature service, and no gate.
    pub fn new() -> Self {
        Self {
            signer: None,
            gate: None,
            policy: VerificationPolicy::strict(),
        }
    }

    /// Check signatures on signed records with `signer`.
    pub fn with_signature_service(mut self, signer: Arc<dyn SignatureService>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Ask `gate` for `Feature::ChainVerification` before every run.
    pub fn with_entitlement(mut self, gate: Arc<dyn EntitlementGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_policy(mut self, policy: VerificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &VerificationPolicy {
        &self.policy
    }

    /// Walk every unit in `dir`.
    ///
    /// Policy-agnostic: chain links are always checked, unsigned records are
    /// accepted, and an empty directory is `NoFiles`.
    pub fn verify(&self, dir: &Path) -> VerificationResult {
        if let Some(denied) = self.check_entitlement() {
            return denied;
        }
        let units = match load_units(dir) {
            Ok(units) => units,
            Err(result) => return result,
        };
        if units.is_empty() {
            return no_files(dir);
        }
        let result = self.walk(&units, WalkOptions::default());
        log_outcome(&result);
        result
    }

    /// Walk records already in memory, in slice order.
    pub fn verify_records(&self, records: &[AuditRecord]) -> VerificationResult {
        if let Some(denied) = self.check_entitlement() {
            return denied;
        }
        if records.is_empty() {
            return VerificationResult::rejected(VerificationStatus::NoFiles, "no audit records");
        }
        let units: Vec<Unit> = records.iter().map(Unit::in_memory).collect();
        let result = self.walk(&units, WalkOptions::default());
        log_outcome(&result);
        result
    }

    /// Verify the in-scope part of `dir` under the configured policy and
    /// project the outcome into a `ComplianceSummary`.
    pub fn verify_summary(&self, dir: &Path, scope: &VerificationScope) -> ComplianceSummary {
        let signature_required = self.policy.require_signatures;
        let summarize = |result: &VerificationResult, stats: &ScopeStats| {
            ComplianceSummaryBuilder::from_result(result)
                .with_scope(stats)
                .signature_required(signature_required)
                .build()
        };

        if let Some(denied) = self.check_entitlement() {
            return summarize(&denied, &ScopeStats::default());
        }
        let units = match load_units(dir) {
            Ok(units) => filter_scope(units, scope),
            Err(result) => return summarize(&result, &ScopeStats::default()),
        };
        let stats = ScopeStats::collect(&units);

        let result = if units.is_empty() {
            if self.policy.fail_on_missing_files {
                no_files(dir)
            } else {
                debug!(dir = %dir.display(), "nothing in scope; empty collection allowed");
                VerificationResult {
                    chain_checked: self.policy.require_chain_integrity,
                    ..VerificationResult::ok(0)
                }
            }
        } else {
            let walked = self.walk(&units, WalkOptions::from(&self.policy));
            if walked.is_valid() && signature_required {
                require_signatures(walked, &units)
            } else {
                walked
            }
        };

        log_outcome(&result);
        summarize(&result, &stats)
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn check_entitlement(&self) -> Option<VerificationResult> {
        let gate = self.gate.as_ref()?;
        gate.ensure(Feature::ChainVerification).err().map(|e| {
            warn!(error = %e, "chain verification refused by entitlement gate");
            VerificationResult::rejected(VerificationStatus::EntitlementDenied, e.to_string())
        })
    }

    fn walk(&self, units: &[Unit], options: WalkOptions) -> VerificationResult {
        let mut last_hash: Option<&str> = None;
        let mut signature_checked = false;

        for (index, unit) in units.iter().enumerate() {
            let fail = |status: VerificationStatus, reason: String, checked: bool| {
                let mut result = VerificationResult::fail(status, index, reason);
                if let Some(name) = &unit.name {
                    result = result.with_file(name.clone());
                }
                result.signature_checked = checked;
                result.signature_valid = checked && status != VerificationStatus::SignatureInvalid;
                result.chain_checked = options.check_chain;
                result
            };

            let record = match &unit.record {
                Ok(record) => record,
                Err(reason) => {
                    return fail(VerificationStatus::ParseError, reason.clone(), signature_checked)
                }
            };

            if !verify_record_hash(record) {
                return fail(
                    VerificationStatus::HashMismatch,
                    format!(
                        "stored hash {} does not match recomputed hash {}",
                        record.hash_sha256,
                        hash_record(record)
                    ),
                    signature_checked,
                );
            }

            if let (Some(signature), Some(algorithm)) =
                (signed_fields(record), record.signature_algorithm.as_deref())
            {
                let Some(signer) = &self.signer else {
                    return fail(
                        VerificationStatus::SignatureServiceMissing,
                        "record is signed but no signature service is configured".to_string(),
                        signature_checked,
                    );
                };
                if !algorithm.trim().eq_ignore_ascii_case(signer.algorithm()) {
                    return fail(
                        VerificationStatus::SignatureInvalid,
                        format!(
                            "signature algorithm '{}' does not match service algorithm '{}'",
                            algorithm,
                            signer.algorithm()
                        ),
                        true,
                    );
                }
                if !signer.verify(&record.hash_sha256, signature) {
                    return fail(
                        VerificationStatus::SignatureInvalid,
                        "signature does not verify against the stored hash".to_string(),
                        true,
                    );
                }
                signature_checked = true;
            }

            if options.check_chain {
                match (last_hash, record.prev_hash()) {
                    (None, Some(prev)) if options.require_chain_head => {
                        return fail(
                            VerificationStatus::ChainBroken,
                            format!("first record links to '{}' outside the verified range", prev),
                            signature_checked,
                        );
                    }
                    (Some(expected), Some(_)) if !links_to(record, expected) => {
                        return fail(
                            VerificationStatus::ChainBroken,
                            format!(
                                "prevHashSha256 {} does not match previous record hash {}",
                                record.prev_hash().unwrap_or_default(),
                                expected
                            ),
                            signature_checked,
                        );
                    }
                    _ => {}
                }
            }

            debug!(index, id = %record.id, "audit record verified");
            last_hash = Some(record.hash_sha256.as_str());
        }

        VerificationResult {
            signature_checked,
            signature_valid: signature_checked,
            chain_checked: options.check_chain,
            ..VerificationResult::ok(units.len())
        }
    }
}

impl Default for ChainVerifier {
    fn default() -> Self {
        Self::new()
    }
}

/// The signature, when both signature fields are present.
fn signed_fields(record: &AuditRecord) -> Option<&str> {
    record
        .is_signed()
        .then_some(record.signature.as_deref())
        .flatten()
}

/// Turn a passing walk into `SignatureRequiredButMissing` at the first
/// unsigned record, if there is one.
fn require_signatures(walked: VerificationResult, units: &[Unit]) -> VerificationResult {
    let unsigned = units
        .iter()
        .position(|u| u.record.as_ref().is_ok_and(|r| !r.is_signed()));
    let Some(index) = unsigned else {
        return walked;
    };

    let mut result = VerificationResult::fail(
        VerificationStatus::SignatureRequiredButMissing,
        index,
        "signatures are required but this record is unsigned",
    );
    if let Some(name) = &units[index].name {
        result = result.with_file(name.clone());
    }
    result.signature_checked = walked.signature_checked;
    result.signature_valid = walked.signature_valid;
    result.chain_checked = walked.chain_checked;
    result
}

fn no_files(dir: &Path) -> VerificationResult {
    VerificationResult::rejected(
        VerificationStatus::NoFiles,
        format!("no audit records found in '{}'", dir.display()),
    )
}

fn log_outcome(result: &VerificationResult) {
    if result.is_valid() {
        info!(records = result.records_checked, "audit chain verified");
    } else {
        warn!(
            status = %result.status,
            index = ?result.failed_index,
            file = result.file_name.as_deref().unwrap_or(""),
            reason = result.reason.as_deref().unwrap_or(""),
            "audit chain verification failed"
        );
    }
}

//! # aitrace-verify
//!
//! Chain verification and compliance reporting for AiTrace audit trails.
//!
//! ## Overview
//!
//! [`ChainVerifier`] re-hashes every record in a collection, checks
//! signatures where present, and follows the `prevHashSha256` links.  The
//! walk is fail-fast: the first violation ends it and is reported with its
//! index, file name, and a stable [`VerificationStatus`].
//!
//! [`ChainVerifier::verify_summary`] adds a policy and a time scope and
//! returns a [`ComplianceSummary`] that the [`report`] module renders as
//! text or JSON.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aitrace_verify::{report, ChainVerifier};
//!
//! let verifier = ChainVerifier::new()
//!     .with_signature_service(Arc::new(service))
//!     .with_policy(VerificationPolicy::strict());
//! let summary = verifier.verify_summary(Path::new("aitrace"), &VerificationScope::All);
//! print!("{}", report::to_text_report(&summary));
//! ```
//!
//! [`VerificationStatus`]: aitrace_contracts::verification::VerificationStatus
//! [`ComplianceSummary`]: aitrace_contracts::summary::ComplianceSummary

pub mod report;
pub mod scope;
pub mod summary;
pub mod verifier;

pub use scope::ScopeStats;
pub use summary::ComplianceSummaryBuilder;
pub use verifier::ChainVerifier;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::{fs, path::Path, sync::Arc};

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use aitrace_audit::{hash_record, unit::list_units, InMemoryAuditStore, JsonAuditStore};
    use aitrace_contracts::{
        error::{AiTraceError, AiTraceResult},
        policy::{Feature, VerificationPolicy, VerificationScope},
        record::AuditRecord,
        summary::SignatureCheckStatus,
        verification::{VerificationResult, VerificationStatus},
    };
    use aitrace_core::traits::{AuditStore, EntitlementGate, SignatureService};
    use aitrace_signing::{keys::signing_key_from_hex, Ed25519SignatureService};

    use super::{report, ChainVerifier, ComplianceSummaryBuilder, ScopeStats};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn make_record(id: &str, offset_min: i64) -> AuditRecord {
        let mut r = AuditRecord::new(id, base_time() + Duration::minutes(offset_min));
        r.model = Some("gpt-test".to_string());
        r.user_id = Some("alice".to_string());
        r.content_stored = true;
        r.prompt = Some(format!("prompt {id}"));
        r.output = Some(format!("output {id}"));
        r
    }

    fn service(seed: u8) -> Arc<Ed25519SignatureService> {
        let key = signing_key_from_hex(&format!("{:02x}", seed).repeat(32)).unwrap();
        Arc::new(Ed25519SignatureService::from_signing_key(key))
    }

    /// Append `n` records, one minute apart, to a JSON store in `dir`.
    fn write_trail(dir: &Path, n: usize, signer: Option<Arc<dyn SignatureService>>) -> Vec<AuditRecord> {
        let mut store = JsonAuditStore::open(dir).unwrap();
        if let Some(signer) = signer {
            store = store.with_signer(signer);
        }
        (0..n)
            .map(|i| store.append(make_record(&format!("r{i}"), i as i64)).unwrap())
            .collect()
    }

    fn memory_trail(n: usize) -> Vec<AuditRecord> {
        let store = InMemoryAuditStore::new();
        for i in 0..n {
            store.append(make_record(&format!("r{i}"), i as i64)).unwrap();
        }
        store.records()
    }

    /// Overwrite one field of the unit at `index` without touching its hash.
    fn tamper_unit(dir: &Path, index: usize, field: &str, value: serde_json::Value) {
        let path = &list_units(dir).unwrap()[index];
        let mut doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        doc[field] = value;
        fs::write(path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
    }

    struct DenyGate;

    impl EntitlementGate for DenyGate {
        fn ensure(&self, feature: Feature) -> AiTraceResult<()> {
            Err(AiTraceError::EntitlementDenied {
                feature: feature.to_string(),
                reason: "no license".to_string(),
            })
        }
    }

    // ── Plain walk ────────────────────────────────────────────────────────────

    #[test]
    fn test_untouched_trail_verifies() {
        let dir = tempfile::tempdir().unwrap();
        write_trail(dir.path(), 3, None);

        let r = ChainVerifier::new().verify(dir.path());
        assert!(r.is_valid(), "{:?}", r);
        assert_eq!(r.records_checked, 3);
        assert!(!r.signature_checked);
        assert!(r.chain_checked);
    }

    #[test]
    fn test_location_failures_are_distinct() {
        let v = ChainVerifier::new();
        assert_eq!(v.verify(Path::new("")).status, VerificationStatus::InvalidLocation);

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(v.verify(&missing).status, VerificationStatus::DirectoryNotFound);

        let r = v.verify(dir.path());
        assert_eq!(r.status, VerificationStatus::NoFiles);
        assert_eq!(r.failed_index, None);
    }

    #[test]
    fn test_edited_field_is_a_hash_mismatch_at_its_index() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_trail(dir.path(), 3, None);
        tamper_unit(dir.path(), 1, "userId", "mallory".into());

        let r = ChainVerifier::new().verify(dir.path());
        assert_eq!(r.status, VerificationStatus::HashMismatch);
        assert_eq!(r.failed_index, Some(1));
        assert_eq!(r.records_checked, 1);
        let expected_name = format!(
            "{}_{}.json",
            written[1].timestamp_utc.format("%Y%m%d_%H%M%S%9f"),
            written[1].id
        );
        assert_eq!(r.file_name.as_deref(), Some(expected_name.as_str()));
    }

    #[test]
    fn test_undecodable_unit_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_trail(dir.path(), 2, None);
        fs::write(dir.path().join("29990101_000000000000000_zz.json"), "{ nope").unwrap();

        let r = ChainVerifier::new().verify(dir.path());
        assert_eq!(r.status, VerificationStatus::ParseError);
        assert_eq!(r.failed_index, Some(2));
        assert_eq!(r.file_name.as_deref(), Some("29990101_000000000000000_zz.json"));
    }

    #[test]
    fn test_relinked_record_is_a_chain_break() {
        let mut records = memory_trail(4);
        records[2].prev_hash_sha256 = Some("0".repeat(64));
        records[2].hash_sha256 = hash_record(&records[2]);

        let r = ChainVerifier::new().verify_records(&records);
        assert_eq!(r.status, VerificationStatus::ChainBroken);
        assert_eq!(r.failed_index, Some(2));
        assert_eq!(r.records_checked, 2);
        assert_eq!(r.file_name, None);
    }

    #[test]
    fn test_record_without_link_claim_is_accepted() {
        let mut records = memory_trail(3);
        records[1].prev_hash_sha256 = None;
        records[1].hash_sha256 = hash_record(&records[1]);
        // Re-point records[2] at the re-hashed records[1].
        records[2].prev_hash_sha256 = Some(records[1].hash_sha256.clone());
        records[2].hash_sha256 = hash_record(&records[2]);

        assert!(ChainVerifier::new().verify_records(&records).is_valid());
    }

    #[test]
    fn test_empty_record_slice_is_no_files() {
        let r = ChainVerifier::new().verify_records(&[]);
        assert_eq!(r.status, VerificationStatus::NoFiles);
    }

    // ── Signatures ────────────────────────────────────────────────────────────

    #[test]
    fn test_signed_trail_verifies_with_public_key_only() {
        let dir = tempfile::tempdir().unwrap();
        let signer = service(1);
        write_trail(dir.path(), 3, Some(signer.clone()));

        let verify_only = Ed25519SignatureService::from_verifying_key(signer.verifying_key());
        let r = ChainVerifier::new()
            .with_signature_service(Arc::new(verify_only))
            .verify(dir.path());
        assert!(r.is_valid(), "{:?}", r);
        assert!(r.signature_checked);
        assert!(r.signature_valid);
    }

    #[test]
    fn test_signed_trail_without_service_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_trail(dir.path(), 2, Some(service(1)));

        let r = ChainVerifier::new().verify(dir.path());
        assert_eq!(r.status, VerificationStatus::SignatureServiceMissing);
        assert_eq!(r.failed_index, Some(0));
    }

    #[test]
    fn test_signature_from_another_key_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        write_trail(dir.path(), 2, Some(service(1)));

        let r = ChainVerifier::new()
            .with_signature_service(service(2))
            .verify(dir.path());
        assert_eq!(r.status, VerificationStatus::SignatureInvalid);
        assert_eq!(r.failed_index, Some(0));
        assert!(r.signature_checked);
        assert!(!r.signature_valid);
    }

    #[test]
    fn test_foreign_algorithm_label_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        write_trail(dir.path(), 2, Some(service(1)));
        tamper_unit(dir.path(), 1, "signatureAlgorithm", "RSA-SHA256".into());

        let r = ChainVerifier::new()
            .with_signature_service(service(1))
            .verify(dir.path());
        assert_eq!(r.status, VerificationStatus::SignatureInvalid);
        assert_eq!(r.failed_index, Some(1));
    }

    // ── Entitlement ───────────────────────────────────────────────────────────

    #[test]
    fn test_denied_gate_stops_before_any_io() {
        let dir = tempfile::tempdir().unwrap();
        let v = ChainVerifier::new().with_entitlement(Arc::new(DenyGate));

        // A missing directory would otherwise be DirectoryNotFound.
        let r = v.verify(&dir.path().join("missing"));
        assert_eq!(r.status, VerificationStatus::EntitlementDenied);
        assert!(r.reason.unwrap().contains("no license"));

        let s = v.verify_summary(&dir.path().join("missing"), &VerificationScope::All);
        assert_eq!(s.status, VerificationStatus::EntitlementDenied);
        assert!(!s.is_valid);
        assert!(!s.integrity_verified);
    }

    // ── Policy and scope ──────────────────────────────────────────────────────

    #[test]
    fn test_strict_policy_requires_signatures() {
        let dir = tempfile::tempdir().unwrap();
        write_trail(dir.path(), 2, None);

        let s = ChainVerifier::new().verify_summary(dir.path(), &VerificationScope::All);
        assert_eq!(s.status, VerificationStatus::SignatureRequiredButMissing);
        assert_eq!(s.failed_index, Some(0));
        assert_eq!(s.signature_status, SignatureCheckStatus::RequiredButMissing);
        assert!(s.integrity_verified);
        assert!(s.chain_verified);
        assert!(!s.is_valid);
    }

    #[test]
    fn test_unsigned_policy_passes_unsigned_trail() {
        let dir = tempfile::tempdir().unwrap();
        write_trail(dir.path(), 2, None);

        let s = ChainVerifier::new()
            .with_policy(VerificationPolicy::unsigned())
            .verify_summary(dir.path(), &VerificationScope::All);
        assert!(s.is_valid);
        assert_eq!(s.files_verified, 2);
        assert_eq!(s.records_verified, 2);
        assert_eq!(s.signature_status, SignatureCheckStatus::NotPresent);
        assert_eq!(s.first_timestamp_utc, Some(base_time()));
        assert_eq!(s.last_timestamp_utc, Some(base_time() + Duration::minutes(1)));
    }

    #[test]
    fn test_signed_trail_passes_strict_policy() {
        let dir = tempfile::tempdir().unwrap();
        write_trail(dir.path(), 2, Some(service(3)));

        let s = ChainVerifier::new()
            .with_signature_service(service(3))
            .verify_summary(dir.path(), &VerificationScope::All);
        assert!(s.is_valid, "{:?}", s);
        assert!(s.any_signature_present);
        assert_eq!(s.signature_status, SignatureCheckStatus::Valid);
    }

    #[test]
    fn test_chain_checks_can_be_switched_off() {
        let mut records = memory_trail(3);
        records[1].prev_hash_sha256 = Some("f".repeat(64));
        records[1].hash_sha256 = hash_record(&records[1]);

        let dir = tempfile::tempdir().unwrap();
        for r in &records {
            let name = aitrace_audit::unit::unit_file_name(r);
            let json = aitrace_audit::unit::encode_record(r).unwrap();
            fs::write(dir.path().join(name), json).unwrap();
        }

        let policy = VerificationPolicy {
            require_chain_integrity: false,
            ..VerificationPolicy::unsigned()
        };
        let s = ChainVerifier::new()
            .with_policy(policy)
            .verify_summary(dir.path(), &VerificationScope::All);
        assert!(s.is_valid);
        assert!(!s.chain_verified);

        let strict = ChainVerifier::new()
            .with_policy(VerificationPolicy::unsigned())
            .verify_summary(dir.path(), &VerificationScope::All);
        assert_eq!(strict.status, VerificationStatus::ChainBroken);
        assert!(!strict.chain_verified);
        assert!(strict.integrity_verified);
    }

    #[test]
    fn test_empty_collection_can_be_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let policy = VerificationPolicy {
            fail_on_missing_files: false,
            ..VerificationPolicy::unsigned()
        };
        let s = ChainVerifier::new()
            .with_policy(policy)
            .verify_summary(dir.path(), &VerificationScope::All);
        assert!(s.is_valid);
        assert_eq!(s.files_verified, 0);
        assert_eq!(s.signature_status, SignatureCheckStatus::NotChecked);
        assert!(!s.integrity_verified);
        assert!(!s.chain_verified);
        let text = report::to_text_report(&s);
        assert!(text.contains("- Record integrity: NOT VERIFIED\n"));
        assert!(text.contains("- Chain integrity: NOT VERIFIED\n"));

        let strict = ChainVerifier::new()
            .with_policy(VerificationPolicy::unsigned())
            .verify_summary(dir.path(), &VerificationScope::All);
        assert_eq!(strict.status, VerificationStatus::NoFiles);
    }

    #[test]
    fn test_scope_window_selects_records_inclusively() {
        let dir = tempfile::tempdir().unwrap();
        write_trail(dir.path(), 5, None);
        let scope = VerificationScope::between(
            base_time() + Duration::minutes(1),
            base_time() + Duration::minutes(3),
        );

        let s = ChainVerifier::new()
            .with_policy(VerificationPolicy::unsigned())
            .verify_summary(dir.path(), &scope);
        assert!(s.is_valid, "{:?}", s);
        assert_eq!(s.files_verified, 3);
        assert_eq!(s.first_timestamp_utc, Some(base_time() + Duration::minutes(1)));
        assert_eq!(s.last_timestamp_utc, Some(base_time() + Duration::minutes(3)));
    }

    #[test]
    fn test_mid_chain_start_can_be_refused() {
        let dir = tempfile::tempdir().unwrap();
        write_trail(dir.path(), 3, None);
        let scope = VerificationScope::between(
            base_time() + Duration::minutes(1),
            base_time() + Duration::minutes(2),
        );
        let policy = VerificationPolicy {
            allow_start_mid_chain: false,
            ..VerificationPolicy::unsigned()
        };

        let s = ChainVerifier::new()
            .with_policy(policy)
            .verify_summary(dir.path(), &scope);
        assert_eq!(s.status, VerificationStatus::ChainBroken);
        assert_eq!(s.failed_index, Some(0));

        // The full trail starts at a real head.
        let full = ChainVerifier::new()
            .with_policy(policy)
            .verify_summary(dir.path(), &VerificationScope::All);
        assert!(full.is_valid);
    }

    #[test]
    fn test_undecodable_unit_stays_in_scope() {
        let dir = tempfile::tempdir().unwrap();
        write_trail(dir.path(), 2, None);
        fs::write(dir.path().join("00000000_000000000000000_bad.json"), "[]").unwrap();
        let scope = VerificationScope::between(
            base_time() + Duration::days(10),
            base_time() + Duration::days(11),
        );

        let s = ChainVerifier::new()
            .with_policy(VerificationPolicy::unsigned())
            .verify_summary(dir.path(), &scope);
        assert_eq!(s.status, VerificationStatus::ParseError);
        assert_eq!(s.files_verified, 1);
        assert_eq!(s.first_timestamp_utc, None);
    }

    // ── Summary projection ────────────────────────────────────────────────────

    #[test]
    fn test_summary_projects_hash_mismatch() {
        let r = VerificationResult::fail(VerificationStatus::HashMismatch, 4, "bad").with_file("f.json");
        let stats = ScopeStats {
            files: 9,
            ..ScopeStats::default()
        };
        let s = ComplianceSummaryBuilder::from_result(&r)
            .with_scope(&stats)
            .build();
        assert!(!s.is_valid);
        assert!(!s.integrity_verified);
        assert!(s.chain_verified);
        assert_eq!(s.files_verified, 9);
        assert_eq!(s.records_verified, 4);
        assert_eq!(s.failed_file_name.as_deref(), Some("f.json"));
        assert_eq!(s.signature_status, SignatureCheckStatus::NotPresent);
    }

    #[test]
    fn test_summary_maps_signature_statuses() {
        let cases = [
            (VerificationStatus::SignatureInvalid, SignatureCheckStatus::Invalid),
            (VerificationStatus::SignatureServiceMissing, SignatureCheckStatus::MissingService),
            (
                VerificationStatus::SignatureRequiredButMissing,
                SignatureCheckStatus::RequiredButMissing,
            ),
            (VerificationStatus::NoFiles, SignatureCheckStatus::NotChecked),
        ];
        for (status, expected) in cases {
            let r = VerificationResult::fail(status, 0, "x");
            let s = ComplianceSummaryBuilder::from_result(&r).build();
            assert_eq!(s.signature_status, expected, "{status}");
        }
    }

    // ── Reports ───────────────────────────────────────────────────────────────

    #[test]
    fn test_text_report_for_valid_trail() {
        let dir = tempfile::tempdir().unwrap();
        write_trail(dir.path(), 2, None);
        let s = ChainVerifier::new()
            .with_policy(VerificationPolicy::unsigned())
            .verify_summary(dir.path(), &VerificationScope::All);

        let text = report::to_text_report(&s);
        assert!(text.starts_with("AI Decision Audit Verification Report\n"));
        assert!(text.contains("Status: Ok\n"));
        assert!(text.contains("- Record integrity: VERIFIED\n"));
        assert!(text.contains("- Files verified: 2\n"));
        assert!(text.contains("- Time range (UTC): 2026-03-01T09:00:00Z to 2026-03-01T09:01:00Z\n"));
        assert!(text.contains("- Post-decision modification detected: NO\n"));
        assert!(!text.contains("Failure details:"));
        assert!(text.ends_with("No evidence of post-decision modification detected.\n"));
    }

    #[test]
    fn test_text_report_for_tampered_trail() {
        let dir = tempfile::tempdir().unwrap();
        write_trail(dir.path(), 2, None);
        tamper_unit(dir.path(), 0, "prompt", "rewritten".into());
        let s = ChainVerifier::new()
            .with_policy(VerificationPolicy::unsigned())
            .verify_summary(dir.path(), &VerificationScope::All);

        let text = report::to_text_report(&s);
        assert!(text.contains("Status: HashMismatch\n"));
        assert!(text.contains("- Record integrity: FAILED\n"));
        assert!(text.contains("- Post-decision modification detected: YES\n"));
        assert!(text.contains("Failure details:\n- Failed index: 0\n"));
    }

    #[test]
    fn test_report_writers_create_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let r = VerificationResult::ok(0);
        let s = ComplianceSummaryBuilder::from_result(&r).build();

        let json_path = dir.path().join("reports/2026/verification_report.json");
        report::write_json_report(&s, &json_path).unwrap();
        let doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(doc["status"], "Ok");
        assert_eq!(doc["isValid"], true);
        assert!(doc.get("signatureStatus").is_some());

        let text_path = dir.path().join("reports/verification_report.txt");
        report::write_text_report(&s, &text_path).unwrap();
        assert!(fs::read_to_string(text_path).unwrap().contains("Conclusion:"));
    }
}

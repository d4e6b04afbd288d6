//! # aitrace-core
//!
//! Capability traits, host configuration, and decision logging for AiTrace.
//!
//! This crate provides:
//! - The four capability traits (`AuditStore`, `SignatureService`,
//!   `EntitlementGate`, `Redactor`)
//! - `TraceConfig`, the explicit configuration object a host builds once
//! - `DecisionLogger`, which applies retention/redaction and feeds a store
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use aitrace_core::{DecisionLogger, TraceConfig};
//! use aitrace_audit::JsonAuditStore;
//!
//! let config = TraceConfig::from_file(Path::new("aitrace.toml"))?;
//! let store = Arc::new(JsonAuditStore::open(&config.audit_dir)?);
//! let logger = DecisionLogger::new(&config, store);
//! logger.log(&decision)?;
//! ```

pub mod config;
pub mod logger;
pub mod redact;
pub mod traits;

pub use config::{LicenseSettings, TraceConfig};
pub use logger::DecisionLogger;
pub use redact::BasicRedactor;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeMap,
        sync::{Arc, Mutex},
    };

    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use aitrace_contracts::{
        error::{AiTraceError, AiTraceResult},
        policy::EnforcementMode,
        record::{AiDecision, AuditRecord},
    };

    use super::{traits::AuditStore, DecisionLogger, TraceConfig};

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Captures appended records without hashing them.
    #[derive(Default)]
    struct CapturingStore {
        records: Mutex<Vec<AuditRecord>>,
    }

    impl AuditStore for CapturingStore {
        fn append(&self, record: AuditRecord) -> AiTraceResult<AuditRecord> {
            self.records.lock().unwrap().push(record.clone());
            Ok(record)
        }

        fn last_hash(&self) -> AiTraceResult<Option<String>> {
            Ok(None)
        }
    }

    fn decision() -> AiDecision {
        let mut metadata = BTreeMap::new();
        metadata.insert("zeta".to_string(), json!(1));
        metadata.insert("alpha".to_string(), json!("a"));
        AiDecision {
            prompt: Some("call with Bearer abcdef123456".to_string()),
            output: Some("World".to_string()),
            model: Some("test-model".to_string()),
            user_id: Some("user-1".to_string()),
            metadata,
        }
    }

    fn config(store_content: bool, basic_redaction: bool) -> TraceConfig {
        TraceConfig {
            store_content,
            basic_redaction,
            ..TraceConfig::default()
        }
    }

    // ── DecisionLogger ────────────────────────────────────────────────────────

    #[test]
    fn content_is_dropped_when_not_stored() {
        let store = Arc::new(CapturingStore::default());
        let logger = DecisionLogger::new(&config(false, true), store.clone());
        logger.log(&decision()).unwrap();

        let records = store.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].content_stored);
        assert_eq!(records[0].prompt, None);
        assert_eq!(records[0].output, None);
        assert_eq!(records[0].model.as_deref(), Some("test-model"));
    }

    #[test]
    fn stored_content_is_redacted_when_enabled() {
        let logger = DecisionLogger::new(&config(true, true), Arc::new(CapturingStore::default()));
        let record = logger.build_record(&decision(), Utc::now()).unwrap();
        assert_eq!(record.prompt.as_deref(), Some("call with Bearer [REDACTED]"));
        assert_eq!(record.output.as_deref(), Some("World"));

        let logger = DecisionLogger::new(&config(true, false), Arc::new(CapturingStore::default()));
        let record = logger.build_record(&decision(), Utc::now()).unwrap();
        assert_eq!(record.prompt.as_deref(), Some("call with Bearer abcdef123456"));
    }

    #[test]
    fn metadata_is_serialized_with_sorted_keys() {
        let logger = DecisionLogger::new(&config(true, false), Arc::new(CapturingStore::default()));
        let record = logger.build_record(&decision(), Utc::now()).unwrap();
        assert_eq!(record.metadata_json, r#"{"alpha":"a","zeta":1}"#);

        let empty = logger.build_record(&AiDecision::default(), Utc::now()).unwrap();
        assert_eq!(empty.metadata_json, "{}");
    }

    #[test]
    fn each_record_gets_a_fresh_id_and_the_given_timestamp() {
        let logger = DecisionLogger::new(&config(true, false), Arc::new(CapturingStore::default()));
        let ts = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let a = logger.build_record(&decision(), ts).unwrap();
        let b = logger.build_record(&decision(), ts).unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.id.len(), 32);
        assert_eq!(a.timestamp_utc, ts);
        assert!(a.hash_sha256.is_empty(), "hashing is the store's job");
    }

    // ── TraceConfig ───────────────────────────────────────────────────────────

    #[test]
    fn config_parses_with_defaults_for_missing_fields() {
        let cfg = TraceConfig::from_toml_str(
            r#"
            audit_dir = "/var/lib/aitrace"
            store_content = true

            [license]
            mode = "disabled"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.audit_dir, std::path::PathBuf::from("/var/lib/aitrace"));
        assert!(cfg.store_content);
        assert!(cfg.basic_redaction);
        assert_eq!(cfg.signing_key_path, None);
        assert_eq!(cfg.license.mode, EnforcementMode::Disabled);
    }

    #[test]
    fn config_parse_error_is_config_error() {
        match TraceConfig::from_toml_str("audit_dir = [[[") {
            Err(AiTraceError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse config TOML"), "got: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let cfg = TraceConfig::load_or_default(std::path::Path::new(
            "/nonexistent/aitrace-config-for-tests.toml",
        ))
        .unwrap();
        assert_eq!(cfg, TraceConfig::default());
    }
}

//! The decision logger: turns an `AiDecision` into an `AuditRecord` and
//! hands it to the store.
//!
//! Retention and redaction policy are applied here, before the store sees
//! the record.  The store's job starts at chain-linking.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use aitrace_contracts::{
    error::{AiTraceError, AiTraceResult},
    record::{AiDecision, AuditRecord},
};

use crate::{
    config::TraceConfig,
    redact::BasicRedactor,
    traits::{AuditStore, Redactor},
};

/// Logs decisions into one audit store under one configuration.
pub struct DecisionLogger {
    store_content: bool,
    basic_redaction: bool,
    store: Arc<dyn AuditStore>,
    redactor: Box<dyn Redactor>,
}

impl DecisionLogger {
    /// Build a logger using `BasicRedactor` for redaction.
    pub fn new(config: &TraceConfig, store: Arc<dyn AuditStore>) -> Self {
        Self {
            store_content: config.store_content,
            basic_redaction: config.basic_redaction,
            store,
            redactor: Box::new(BasicRedactor::new()),
        }
    }

    /// Replace the redactor.
    pub fn with_redactor(mut self, redactor: Box<dyn Redactor>) -> Self {
        self.redactor = redactor;
        self
    }

    /// Build the unhashed record for `decision` at `timestamp_utc`.
    ///
    /// Bodies are dropped unless content retention is on, and redacted when
    /// both retention and redaction are on.  Metadata is serialized with
    /// sorted keys so identical metadata always yields the same blob.
    pub fn build_record(
        &self,
        decision: &AiDecision,
        timestamp_utc: DateTime<Utc>,
    ) -> AiTraceResult<AuditRecord> {
        let (mut prompt, mut output) = if self.store_content {
            (decision.prompt.clone(), decision.output.clone())
        } else {
            (None, None)
        };

        if self.store_content && self.basic_redaction {
            prompt = prompt.map(|p| self.redactor.redact(&p));
            output = output.map(|o| self.redactor.redact(&o));
        }

        let metadata_json = if decision.metadata.is_empty() {
            AuditRecord::EMPTY_METADATA.to_string()
        } else {
            serde_json::to_string(&decision.metadata).map_err(|e| AiTraceError::InvalidInput {
                reason: format!("decision metadata is not serializable: {}", e),
            })?
        };

        let mut record = AuditRecord::new(uuid::Uuid::new_v4().simple().to_string(), timestamp_utc);
        record.model = decision.model.clone();
        record.user_id = decision.user_id.clone();
        record.content_stored = self.store_content;
        record.prompt = prompt;
        record.output = output;
        record.metadata_json = metadata_json;
        Ok(record)
    }

    /// Log `decision` now.
    pub fn log(&self, decision: &AiDecision) -> AiTraceResult<AuditRecord> {
        self.log_at(decision, Utc::now())
    }

    /// Log `decision` with an explicit timestamp.
    pub fn log_at(
        &self,
        decision: &AiDecision,
        timestamp_utc: DateTime<Utc>,
    ) -> AiTraceResult<AuditRecord> {
        let record = self.build_record(decision, timestamp_utc)?;
        debug!(id = %record.id, content_stored = record.content_stored, "built audit record");

        let record = self.store.append(record)?;
        info!(
            id = %record.id,
            hash = %record.hash_sha256,
            signed = record.is_signed(),
            "decision logged"
        );
        Ok(record)
    }
}

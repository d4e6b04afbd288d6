//! In-memory implementation of `AuditStore`.
//!
//! `InMemoryAuditStore` follows the same step order as the directory store
//! but keeps records in a `Vec` behind a `Mutex`.  The last hash is held as
//! an explicit cursor rather than rediscovered on every append.
//!
//! Use `records()` to take a snapshot for verification.

use std::sync::{Arc, Mutex};

use tracing::info;

use aitrace_contracts::{
    error::{AiTraceError, AiTraceResult},
    record::AuditRecord,
};
use aitrace_core::traits::{AuditStore, SignatureService};

use crate::chain::hash_record;

/// The mutable interior of an `InMemoryAuditStore`.
pub(crate) struct InMemoryState {
    /// All records appended so far, in append order.
    pub(crate) records: Vec<AuditRecord>,

    /// `hash_sha256` of the last appended record.
    pub(crate) last_hash: Option<String>,
}

/// An in-memory, append-only audit store.
pub struct InMemoryAuditStore {
    pub(crate) state: Mutex<InMemoryState>,
    signer: Option<Arc<dyn SignatureService>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InMemoryState {
                records: Vec::new(),
                last_hash: None,
            }),
            signer: None,
        }
    }

    /// Sign every appended record with `signer`.
    pub fn with_signer(mut self, signer: Arc<dyn SignatureService>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// A copy of every record, in append order.
    pub fn records(&self) -> Vec<AuditRecord> {
        let state = self.state.lock().expect("audit state lock poisoned");
        state.records.clone()
    }

    pub fn len(&self) -> usize {
        let state = self.state.lock().expect("audit state lock poisoned");
        state.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryAuditStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditStore for InMemoryAuditStore {
    fn append(&self, mut record: AuditRecord) -> AiTraceResult<AuditRecord> {
        let mut state = self.state.lock().map_err(|e| AiTraceError::StoreWriteFailed {
            reason: format!("audit state lock poisoned: {}", e),
        })?;

        record.prev_hash_sha256 = state.last_hash.clone();
        record.hash_sha256 = hash_record(&record);
        record.signature = None;
        record.signature_algorithm = None;

        if let Some(signer) = &self.signer {
            record.signature = Some(signer.sign(&record.hash_sha256)?);
            record.signature_algorithm = Some(signer.algorithm().to_string());
        }

        state.last_hash = Some(record.hash_sha256.clone());
        state.records.push(record.clone());

        info!(
            id = %record.id,
            record_count = state.records.len(),
            hash = %record.hash_sha256,
            "audit record appended"
        );
        Ok(record)
    }

    fn last_hash(&self) -> AiTraceResult<Option<String>> {
        let state = self.state.lock().map_err(|e| AiTraceError::StoreWriteFailed {
            reason: format!("audit state lock poisoned: {}", e),
        })?;
        Ok(state.last_hash.clone())
    }
}

//! Directory-backed `AuditStore`: one JSON document per record.
//!
//! `JsonAuditStore` is the persistent implementation of the `AuditStore`
//! trait.  Each append finds the most recently written unit, links to its
//! hash, finalizes and optionally signs the new record, then publishes it
//! by writing a temp file and hard-linking it into place.  Readers never see
//! a half-written unit and an existing unit is never replaced.
//!
//! Appends through one store value are serialized by an internal mutex,
//! which also guards a cursor to the unit this value wrote last.  When that
//! unit is still the newest on disk its hash is reused without re-reading
//! the file.  Separate processes (or separate store values) writing the same directory
//! are not coordinated and can fork the chain.

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use tracing::{debug, info, warn};

use aitrace_contracts::{
    error::{AiTraceError, AiTraceResult},
    policy::Feature,
    record::AuditRecord,
};
use aitrace_core::traits::{AuditStore, EntitlementGate, SignatureService};

use crate::{
    chain::hash_record,
    unit::{self, encode_record, latest_unit, read_record, unit_file_name},
};

fn write_failed(reason: String) -> AiTraceError {
    AiTraceError::StoreWriteFailed { reason }
}

/// The unit most recently written through this store value.
struct Cursor {
    path: PathBuf,
    hash: String,
}

/// An append-only JSON audit store rooted at one directory.
pub struct JsonAuditStore {
    dir: PathBuf,
    signer: Option<Arc<dyn SignatureService>>,
    gate: Option<Arc<dyn EntitlementGate>>,
    cursor: Mutex<Option<Cursor>>,
}

impl JsonAuditStore {
    /// Open (creating if needed) the collection at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> AiTraceResult<Self> {
        let dir = dir.into();
        if dir.as_os_str().is_empty() {
            return Err(AiTraceError::InvalidInput {
                reason: "audit directory path is empty".to_string(),
            });
        }
        fs::create_dir_all(&dir).map_err(|e| {
            write_failed(format!("failed to create audit directory '{}': {}", dir.display(), e))
        })?;
        Ok(Self {
            dir,
            signer: None,
            gate: None,
            cursor: Mutex::new(None),
        })
    }

    /// Sign every appended record with `signer`.
    pub fn with_signer(mut self, signer: Arc<dyn SignatureService>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Check `gate` for `Feature::SignedStore` before each signed append.
    pub fn with_entitlement(mut self, gate: Arc<dyn EntitlementGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_last_hash(&self, cursor: Option<&Cursor>) -> AiTraceResult<Option<String>> {
        let latest = latest_unit(&self.dir).map_err(|e| {
            write_failed(format!("failed to scan '{}': {}", self.dir.display(), e))
        })?;
        let Some(path) = latest else {
            return Ok(None);
        };

        if let Some(cursor) = cursor.filter(|c| c.path == path) {
            return Ok(Some(cursor.hash.clone()));
        }

        let previous = read_record(&path).map_err(|reason| {
            warn!(file = %path.display(), reason = %reason, "previous audit record unreadable");
            write_failed(format!(
                "cannot link to previous record '{}': {}",
                unit::display_name(&path),
                reason
            ))
        })?;

        let hash = previous.hash_sha256.trim();
        Ok((!hash.is_empty()).then(|| hash.to_string()))
    }

    fn persist(&self, record: &AuditRecord) -> AiTraceResult<PathBuf> {
        let file_name = unit_file_name(record);
        let path = self.dir.join(&file_name);
        let json = encode_record(record)
            .map_err(|e| write_failed(format!("failed to encode record: {}", e)))?;

        let tmp = self.dir.join(format!(".{}.tmp", file_name));
        let written = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp)
            .and_then(|mut f| {
                f.write_all(json.as_bytes())?;
                f.sync_all()
            })
            // Fails with AlreadyExists instead of replacing the unit.
            .and_then(|()| fs::hard_link(&tmp, &path));
        let _ = fs::remove_file(&tmp);

        match written {
            Ok(()) => Ok(path),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(write_failed(format!(
                "audit unit '{}' already exists",
                file_name
            ))),
            Err(e) => Err(write_failed(format!("failed to write '{}': {}", file_name, e))),
        }
    }
}

impl AuditStore for JsonAuditStore {
    /// Chain-link, hash, sign, and persist one record.
    ///
    /// The entitlement check and signing both happen before the first byte
    /// is written, so a refused or failed signature leaves no unit behind.
    fn append(&self, mut record: AuditRecord) -> AiTraceResult<AuditRecord> {
        if let (Some(gate), Some(_)) = (&self.gate, &self.signer) {
            gate.ensure(Feature::SignedStore)?;
        }

        let mut cursor = self
            .cursor
            .lock()
            .map_err(|e| write_failed(format!("append lock poisoned: {}", e)))?;

        // (a)+(b) link to the most recent unit.
        record.prev_hash_sha256 = self.read_last_hash(cursor.as_ref())?;

        // (c) finalize.
        record.hash_sha256 = hash_record(&record);
        record.signature = None;
        record.signature_algorithm = None;

        // (d) sign the final hash.
        if let Some(signer) = &self.signer {
            let signature = signer.sign(&record.hash_sha256)?;
            record.signature = Some(signature);
            record.signature_algorithm = Some(signer.algorithm().to_string());
        }

        debug!(
            id = %record.id,
            prev_hash = record.prev_hash_sha256.as_deref().unwrap_or(""),
            hash = %record.hash_sha256,
            "audit record finalized"
        );

        // (e) publish.
        let path = self.persist(&record)?;
        info!(file = %path.display(), hash = %record.hash_sha256, "audit record persisted");
        *cursor = Some(Cursor {
            path,
            hash: record.hash_sha256.clone(),
        });

        Ok(record)
    }

    fn last_hash(&self) -> AiTraceResult<Option<String>> {
        let cursor = self
            .cursor
            .lock()
            .map_err(|e| write_failed(format!("append lock poisoned: {}", e)))?;
        self.read_last_hash(cursor.as_ref())
    }
}

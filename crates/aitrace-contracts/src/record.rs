//! The persisted audit record and the decision it is built from.
//!
//! An `AuditRecord` is mutated exactly twice after creation: the store sets
//! `prev_hash_sha256` + `hash_sha256`, then optionally attaches the signature
//! pair.  After persistence it is read-only.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One logged AI decision as handed to the decision logger.
///
/// Policy (content retention, redaction) has not been applied yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiDecision {
    pub prompt: Option<String>,
    pub output: Option<String>,
    pub model: Option<String>,
    pub user_id: Option<String>,
    /// Arbitrary key/value metadata.  `BTreeMap` keeps serialization
    /// order-stable, which the hash depends on.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// A single tamper-evident entry in the audit trail.
///
/// Field names on disk are camelCase; the verifier folds case and
/// underscores when decoding so older or hand-edited documents still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Opaque unique identifier, never reused.
    pub id: String,

    /// Creation instant.  Part of the hash material and of the file name.
    pub timestamp_utc: DateTime<Utc>,

    /// SHA-256 (lowercase hex) over every other field except the signature
    /// pair.  Empty until the store finalizes the record.
    #[serde(default)]
    pub hash_sha256: String,

    /// `hash_sha256` of the chronologically preceding record, absent for
    /// the first record of a collection.
    #[serde(default)]
    pub prev_hash_sha256: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    /// Whether prompt/output bodies were retained.
    #[serde(default)]
    pub content_stored: bool,

    #[serde(default)]
    pub prompt: Option<String>,

    #[serde(default)]
    pub output: Option<String>,

    /// Canonicalized metadata blob, hashed verbatim.
    #[serde(default = "empty_metadata")]
    pub metadata_json: String,

    /// Signature over `hash_sha256`, added strictly after the hash is final.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_algorithm: Option<String>,
}

fn empty_metadata() -> String {
    AuditRecord::EMPTY_METADATA.to_string()
}

impl AuditRecord {
    /// Metadata blob used when a decision carries no metadata.
    pub const EMPTY_METADATA: &'static str = "{}";

    /// Build an unhashed, unlinked record.
    pub fn new(id: impl Into<String>, timestamp_utc: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            timestamp_utc,
            hash_sha256: String::new(),
            prev_hash_sha256: None,
            model: None,
            user_id: None,
            content_stored: false,
            prompt: None,
            output: None,
            metadata_json: empty_metadata(),
            signature: None,
            signature_algorithm: None,
        }
    }

    /// True when both signature fields are present and non-blank.
    ///
    /// Only such records are subject to the signature check.
    pub fn is_signed(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.signature) && present(&self.signature_algorithm)
    }

    /// The previous hash, treating blank strings as absent.
    pub fn prev_hash(&self) -> Option<&str> {
        self.prev_hash_sha256
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }
}

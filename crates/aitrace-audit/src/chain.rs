//! Hash-chain primitives: record canonicalization, hashing, and link checks.
//!
//! The same function hashes on write and on verify.  Any change to the field
//! order, the separator, the escaping, or the timestamp rendering below
//! invalidates every hash ever issued and must ship as a new material version.
//!
//! Hash material layout (UTF-8, fields joined by `\n`):
//!   1. id
//!   2. timestamp, RFC 3339 with nanoseconds and `Z`
//!   3. model
//!   4. user_id
//!   5. content_stored as `1` / `0`
//!   6. prompt
//!   7. output
//!   8. metadata blob
//!   9. prev_hash (empty when absent)
//!
//! Absent optional fields render as the empty string.  Inside each field `\`
//! becomes `\\` and a newline becomes `\n`, so a value containing the
//! separator cannot shift content into a neighbouring field.

use std::borrow::Cow;

use chrono::SecondsFormat;
use sha2::{Digest, Sha256};

use aitrace_contracts::record::AuditRecord;

/// Separator between hash material fields.
pub const FIELD_SEPARATOR: char = '\n';

fn escape(field: &str) -> Cow<'_, str> {
    if field.contains(|c| c == '\\' || c == FIELD_SEPARATOR) {
        Cow::Owned(field.replace('\\', "\\\\").replace(FIELD_SEPARATOR, "\\n"))
    } else {
        Cow::Borrowed(field)
    }
}

/// Build the canonical string that `hash_record` digests.
pub fn build_hash_material(record: &AuditRecord) -> String {
    let timestamp = record
        .timestamp_utc
        .to_rfc3339_opts(SecondsFormat::Nanos, true);

    let fields: [&str; 9] = [
        &record.id,
        &timestamp,
        record.model.as_deref().unwrap_or(""),
        record.user_id.as_deref().unwrap_or(""),
        if record.content_stored { "1" } else { "0" },
        record.prompt.as_deref().unwrap_or(""),
        record.output.as_deref().unwrap_or(""),
        &record.metadata_json,
        record.prev_hash().unwrap_or(""),
    ];

    let mut material = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            material.push(FIELD_SEPARATOR);
        }
        material.push_str(&escape(field));
    }
    material
}

/// Lowercase hex SHA-256 of `input`'s UTF-8 bytes.
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Compute `hash_sha256` for `record`.
///
/// Covers every field except `hash_sha256` itself and the signature pair.
pub fn hash_record(record: &AuditRecord) -> String {
    sha256_hex(&build_hash_material(record))
}

/// True when the stored `hash_sha256` matches a fresh recomputation.
///
/// Hex case is not significant.
pub fn verify_record_hash(record: &AuditRecord) -> bool {
    record
        .hash_sha256
        .eq_ignore_ascii_case(&hash_record(record))
}

/// True when `record` links to `previous_hash` (case-insensitive).
///
/// A record without `prev_hash_sha256` makes no chain claim and never
/// matches; callers decide whether that is acceptable.
pub fn links_to(record: &AuditRecord, previous_hash: &str) -> bool {
    record
        .prev_hash()
        .is_some_and(|prev| prev.eq_ignore_ascii_case(previous_hash))
}

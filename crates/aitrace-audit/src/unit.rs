//! On-disk layout of a JSON audit collection.
//!
//! One pretty-printed JSON document per record, directly inside the
//! collection directory.  File names start with the record timestamp so
//! lexicographic order is chronological order:
//!
//! ```text
//! 20260119_142501123456789_3f2a9c0e4b7d4e1f9a6b5c4d3e2f1a0b.json
//! ```
//!
//! Hidden files (leading `.`) and subdirectories are not units; in-flight
//! temp files and report folders therefore never reach the verifier.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use serde_json::{Map, Value};

use aitrace_contracts::record::AuditRecord;

/// Canonical field names, as written by the store.
const FIELDS: [&str; 12] = [
    "id",
    "timestampUtc",
    "hashSha256",
    "prevHashSha256",
    "model",
    "userId",
    "contentStored",
    "prompt",
    "output",
    "metadataJson",
    "signature",
    "signatureAlgorithm",
];

/// File name under which `record` is persisted.
pub fn unit_file_name(record: &AuditRecord) -> String {
    format!(
        "{}_{}.json",
        record.timestamp_utc.format("%Y%m%d_%H%M%S%9f"),
        record.id
    )
}

fn is_unit(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    !name.starts_with('.') && name.to_ascii_lowercase().ends_with(".json") && path.is_file()
}

/// All units in `dir`, sorted by file name.
pub fn list_units(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut units = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if is_unit(&path) {
            units.push(path);
        }
    }
    units.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(units)
}

/// The most recently modified unit in `dir`, ties broken by file name.
pub fn latest_unit(dir: &Path) -> io::Result<Option<PathBuf>> {
    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for path in list_units(dir)? {
        let modified = fs::metadata(&path)?.modified()?;
        // list_units is name-sorted, so `>=` lets the later name win a tie.
        if latest.as_ref().map_or(true, |(t, _)| modified >= *t) {
            latest = Some((modified, path));
        }
    }
    Ok(latest.map(|(_, p)| p))
}

/// File name component of `path`, for reports.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn fold(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Rewrite object keys to their canonical spelling.
///
/// `HashSha256`, `hash_sha256`, and `HASHSHA256` all become `hashSha256`.
/// Unknown keys are kept as-is.
fn canonicalize_keys(object: Map<String, Value>) -> Map<String, Value> {
    object
        .into_iter()
        .map(|(key, value)| {
            let folded = fold(&key);
            let canonical = FIELDS
                .iter()
                .find(|f| fold(f) == folded)
                .map(|f| (*f).to_string())
                .unwrap_or(key);
            (canonical, value)
        })
        .collect()
}

/// Decode one unit, matching field names case-insensitively.
pub fn decode_record(json: &str) -> Result<AuditRecord, serde_json::Error> {
    let value = match serde_json::from_str::<Value>(json)? {
        Value::Object(object) => Value::Object(canonicalize_keys(object)),
        other => other,
    };
    serde_json::from_value(value)
}

/// Read and decode the unit at `path`.
///
/// Returns a human-readable reason on failure.
pub fn read_record(path: &Path) -> Result<AuditRecord, String> {
    let json = fs::read_to_string(path).map_err(|e| format!("failed to read: {}", e))?;
    decode_record(&json).map_err(|e| format!("failed to parse: {}", e))
}

/// Encode `record` the way the store writes it.
pub fn encode_record(record: &AuditRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(record)
}

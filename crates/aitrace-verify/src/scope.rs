//! Loading a collection and computing scope statistics.

use std::path::Path;

use chrono::{DateTime, Utc};

use aitrace_audit::unit::{display_name, list_units, read_record};
use aitrace_contracts::{
    policy::VerificationScope,
    record::AuditRecord,
    verification::{VerificationResult, VerificationStatus},
};

/// One unit in walk order.  `record` holds the decode error when the unit
/// could not be read.
#[derive(Debug, Clone)]
pub(crate) struct Unit {
    pub(crate) name: Option<String>,
    pub(crate) record: Result<AuditRecord, String>,
}

impl Unit {
    pub(crate) fn in_memory(record: &AuditRecord) -> Self {
        Self {
            name: None,
            record: Ok(record.clone()),
        }
    }

    fn in_scope(&self, scope: &VerificationScope) -> bool {
        match &self.record {
            Ok(record) => scope.contains(record.timestamp_utc),
            // Kept so the decode failure is reported.
            Err(_) => true,
        }
    }
}

/// Read every unit in `dir`, ordered by file name.
///
/// Location problems come back as a finished `VerificationResult`.
pub(crate) fn load_units(dir: &Path) -> Result<Vec<Unit>, VerificationResult> {
    if dir.as_os_str().is_empty() {
        return Err(VerificationResult::rejected(
            VerificationStatus::InvalidLocation,
            "audit directory path is empty",
        ));
    }
    if !dir.is_dir() {
        return Err(VerificationResult::rejected(
            VerificationStatus::DirectoryNotFound,
            format!("audit directory '{}' not found", dir.display()),
        ));
    }

    let paths = list_units(dir).map_err(|e| {
        VerificationResult::rejected(
            VerificationStatus::InvalidLocation,
            format!("cannot list audit directory '{}': {}", dir.display(), e),
        )
    })?;

    Ok(paths
        .iter()
        .map(|path| Unit {
            name: Some(display_name(path)),
            record: read_record(path),
        })
        .collect())
}

pub(crate) fn filter_scope(units: Vec<Unit>, scope: &VerificationScope) -> Vec<Unit> {
    units.into_iter().filter(|u| u.in_scope(scope)).collect()
}

/// Best-effort facts about the units a verification covered.
///
/// Units that fail to decode count as files but contribute nothing else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeStats {
    pub files: usize,
    pub first_timestamp_utc: Option<DateTime<Utc>>,
    pub last_timestamp_utc: Option<DateTime<Utc>>,
    pub any_signature_present: bool,
    pub signed_records: usize,
}

impl ScopeStats {
    pub(crate) fn collect(units: &[Unit]) -> Self {
        let mut stats = Self {
            files: units.len(),
            ..Self::default()
        };
        for record in units.iter().filter_map(|u| u.record.as_ref().ok()) {
            let ts = record.timestamp_utc;
            stats.first_timestamp_utc = Some(stats.first_timestamp_utc.map_or(ts, |t| t.min(ts)));
            stats.last_timestamp_utc = Some(stats.last_timestamp_utc.map_or(ts, |t| t.max(ts)));
            if record.is_signed() {
                stats.any_signature_present = true;
                stats.signed_records += 1;
            }
        }
        stats
    }
}

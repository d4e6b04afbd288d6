//! Human-readable and JSON renderings of a `ComplianceSummary`.

use std::{fs, path::Path};

use chrono::{DateTime, Utc};

use aitrace_contracts::{
    error::{AiTraceError, AiTraceResult},
    summary::ComplianceSummary,
};

/// Default file names used by the exporters' callers.
pub const TEXT_REPORT_FILE: &str = "verification_report.txt";
pub const JSON_REPORT_FILE: &str = "verification_report.json";

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "YES"
    } else {
        "NO"
    }
}

/// A check that was skipped on a passing run is unproven, not failed.
fn verified(flag: bool, run_valid: bool) -> &'static str {
    match (flag, run_valid) {
        (true, _) => "VERIFIED",
        (false, true) => "NOT VERIFIED",
        (false, false) => "FAILED",
    }
}

fn fmt_ts(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| "(unknown)".to_string())
}

/// Plain-text report for auditors.
pub fn to_text_report(s: &ComplianceSummary) -> String {
    let mut lines = vec![
        "AI Decision Audit Verification Report".to_string(),
        String::new(),
        format!("Status: {}", s.status),
    ];
    if let Some(reason) = s.reason.as_deref().filter(|r| !r.trim().is_empty()) {
        lines.push(format!("Reason: {}", reason));
    }

    lines.extend([
        String::new(),
        "Integrity:".to_string(),
        format!("- Record integrity: {}", verified(s.integrity_verified, s.is_valid)),
        format!("- Chain integrity: {}", verified(s.chain_verified, s.is_valid)),
        String::new(),
        "Signature:".to_string(),
        format!("- Signature required: {}", yes_no(s.signature_required)),
        format!("- Any signature present: {}", yes_no(s.any_signature_present)),
        format!("- Signature status: {}", s.signature_status),
        String::new(),
        "Scope:".to_string(),
        format!("- Files verified: {}", s.files_verified),
        format!("- Records verified: {}", s.records_verified),
        format!(
            "- Time range (UTC): {} to {}",
            fmt_ts(s.first_timestamp_utc),
            fmt_ts(s.last_timestamp_utc)
        ),
        String::new(),
        "Tampering detection:".to_string(),
        format!(
            "- Post-decision modification detected: {}",
            yes_no(!s.is_valid)
        ),
    ]);

    if !s.is_valid {
        lines.extend([
            String::new(),
            "Failure details:".to_string(),
            format!(
                "- Failed index: {}",
                s.failed_index.map(|i| i.to_string()).unwrap_or_default()
            ),
            format!("- File: {}", s.failed_file_name.as_deref().unwrap_or("")),
        ]);
    }

    lines.extend([
        String::new(),
        "Conclusion:".to_string(),
        if s.is_valid {
            "No evidence of post-decision modification detected.".to_string()
        } else {
            "Potential tampering or mismatch detected. See failure details.".to_string()
        },
    ]);

    let mut report = lines.join("\n");
    report.push('\n');
    report
}

/// Pretty-printed camelCase JSON.
pub fn to_json_report(s: &ComplianceSummary) -> AiTraceResult<String> {
    serde_json::to_string_pretty(s).map_err(|e| AiTraceError::ReportWriteFailed {
        reason: format!("failed to encode summary: {}", e),
    })
}

fn write_report(path: &Path, contents: &str) -> AiTraceResult<()> {
    let failed = |e: std::io::Error| AiTraceError::ReportWriteFailed {
        reason: format!("'{}': {}", path.display(), e),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(failed)?;
    }
    fs::write(path, contents).map_err(failed)
}

/// Write the text report to `path`, creating parent directories.
pub fn write_text_report(s: &ComplianceSummary, path: &Path) -> AiTraceResult<()> {
    write_report(path, &to_text_report(s))
}

/// Write the JSON report to `path`, creating parent directories.
pub fn write_json_report(s: &ComplianceSummary, path: &Path) -> AiTraceResult<()> {
    write_report(path, &to_json_report(s)?)
}

//! Conservative pattern-based redaction of retained text.

use regex::Regex;

use crate::traits::Redactor;

/// Strips bearer tokens and long `api_key` / `secret` / `token` assignments.
///
/// Values shorter than 12 characters are left alone.
pub struct BasicRedactor {
    bearer: Regex,
    assignment: Regex,
}

impl BasicRedactor {
    pub fn new() -> Self {
        Self {
            bearer: Regex::new(r"(?i)bearer\s+[a-z0-9\-_.=]+")
                .expect("bearer pattern is a valid regex"),
            assignment: Regex::new(r"(?i)(api[_-]?key|secret|token)\s*[:=]\s*[a-z0-9\-_.=]{12,}")
                .expect("assignment pattern is a valid regex"),
        }
    }
}

impl Default for BasicRedactor {
    fn default() -> Self {
        Self::new()
    }
}

impl Redactor for BasicRedactor {
    fn redact(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }
        let text = self.bearer.replace_all(text, "Bearer [REDACTED]");
        self.assignment
            .replace_all(&text, "$1=[REDACTED]")
            .into_owned()
    }
}

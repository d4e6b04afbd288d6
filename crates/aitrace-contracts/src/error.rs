//! Runtime error types for the AiTrace write path and host wiring.
//!
//! Verification outcomes are NOT errors: a tampered trail is a valid answer
//! and is reported through `VerificationResult`.  `AiTraceError` covers the
//! cases where an operation could not be carried out at all.

use thiserror::Error;

/// The unified error type for the AiTrace crates.
#[derive(Debug, Error)]
pub enum AiTraceError {
    /// The store could not persist a record.  Nothing is considered logged.
    #[error("audit store write failed: {reason}")]
    StoreWriteFailed { reason: String },

    /// The signature service refused or failed to sign a digest.
    #[error("signing failed: {reason}")]
    SigningFailed { reason: String },

    /// Key material could not be read, parsed, or written.
    #[error("key error: {reason}")]
    KeyError { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The entitlement gate refused a privileged operation.
    #[error("entitlement denied for '{feature}': {reason}")]
    EntitlementDenied { feature: String, reason: String },

    /// A verification report could not be written.
    #[error("report write failed: {reason}")]
    ReportWriteFailed { reason: String },

    /// The caller passed an argument the operation cannot work with.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}

/// Convenience alias used throughout the AiTrace crates.
pub type AiTraceResult<T> = Result<T, AiTraceError>;

//! Capability traits at the AiTrace trust boundary.
//!
//! - `AuditStore`: append-only sink that chain-links and persists records
//! - `SignatureService`: opaque sign/verify capability over a hex digest
//! - `EntitlementGate`: pass/fail pre-check before privileged operations
//! - `Redactor`: scrubs secrets out of retained text
//!
//! The host constructs implementations once and threads them through; none
//! of the crates keep process-wide state.

use aitrace_contracts::{
    error::AiTraceResult,
    policy::Feature,
    record::AuditRecord,
};

/// The audit store: appends one record per call, never rewrites.
pub trait AuditStore: Send + Sync {
    /// Chain-link, hash, optionally sign, and persist `record`.
    ///
    /// Step order is fixed: previous hash lookup, `prev_hash_sha256`
    /// assignment, hash finalization, signing, persistence.  Returns the
    /// finalized record exactly as persisted.
    ///
    /// On `Err` nothing is considered logged; the caller may retry with a
    /// fresh record.
    fn append(&self, record: AuditRecord) -> AiTraceResult<AuditRecord>;

    /// The `hash_sha256` the next append would link to, if any.
    fn last_hash(&self) -> AiTraceResult<Option<String>>;
}

/// An asymmetric signature capability.
///
/// The core depends only on `verify(d, sign(d)) == true` and on forgery
/// resistance; the scheme is the implementation's business.
pub trait SignatureService: Send + Sync {
    /// Label written to `signature_algorithm` (e.g. `"Ed25519"`).
    fn algorithm(&self) -> &str;

    /// Sign a finalized `hash_sha256`.
    fn sign(&self, digest_hex: &str) -> AiTraceResult<String>;

    /// Check `signature` against `digest_hex`.  Malformed input is `false`.
    fn verify(&self, digest_hex: &str, signature: &str) -> bool;
}

/// Licensing / entitlement pre-check.
///
/// Invoked before any file I/O of a privileged operation.  An `Err` aborts
/// the operation.
pub trait EntitlementGate: Send + Sync {
    fn ensure(&self, feature: Feature) -> AiTraceResult<()>;
}

/// Removes sensitive fragments from retained prompt/output text.
pub trait Redactor: Send + Sync {
    fn redact(&self, text: &str) -> String;
}

//! # aitrace-signing
//!
//! Ed25519 signatures over AiTrace record hashes.
//!
//! [`Ed25519SignatureService`] implements the
//! [`SignatureService`](aitrace_core::traits::SignatureService) capability.
//! The write path builds it from a signing key; verifiers usually hold only
//! the verifying key.
//!
//! ```rust,ignore
//! use aitrace_signing::{keys, Ed25519SignatureService};
//!
//! let files = keys::generate_keypair(Path::new("keys"))?;
//! let signer = Ed25519SignatureService::from_signing_key(keys::read_signing_key(&files.signing_key)?);
//! ```

pub mod ed25519;
pub mod keys;

pub use ed25519::{Ed25519SignatureService, ALGORITHM};

// ── Tests ─────────────────────────────────────────────────────────────────────

//! # aitrace-audit
//!
//! Append-only, SHA-256 hash-chained audit stores for AiTrace.
//!
//! ## Overview
//!
//! Every logged decision becomes an `AuditRecord` whose `hash_sha256`
//! commits to all of its fields and to the hash of the record before it.
//! Editing any persisted field, even one byte, no longer reproduces the
//! stored hash, and the chain verifier reports it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aitrace_audit::JsonAuditStore;
//! use aitrace_core::traits::AuditStore;
//!
//! let store = JsonAuditStore::open("aitrace")?.with_signer(signer);
//! let finalized = store.append(record)?;
//! ```

pub mod chain;
pub mod json;
pub mod memory;
pub mod unit;

pub use chain::{build_hash_material, hash_record, links_to, sha256_hex, verify_record_hash};
pub use json::JsonAuditStore;
pub use memory::InMemoryAuditStore;

// ── Tests ─────────────────────────────────────────────────────────────────────

//! # aitrace-contracts
//!
//! Shared types for the AiTrace audit trail.
//!
//! All crates in the workspace import from here.  No business logic lives in
//! this crate, only data definitions and error types.

pub mod error;
pub mod policy;
pub mod record;
pub mod summary;
pub mod verification;

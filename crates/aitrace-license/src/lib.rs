//! Offline licensing for privileged AiTrace features.
//!
//! A license is a payload signed by the issuer's Ed25519 key.  The
//! `LicenseGuard` resolves and validates it and acts as the
//! `EntitlementGate` for chain verification and signed stores.

pub mod guard;
pub mod license;
pub mod loader;
pub mod validator;

pub use guard::LicenseGuard;
pub use license::{issue_license, LicenseError, LicenseInfo};
pub use loader::{LicenseLoader, LICENSE_ENV_VAR, LICENSE_FILE_NAME};
pub use validator::LicenseValidator;

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Hex key files and key generation.
//!
//! Both key kinds are stored as 64 lowercase hex characters (32 bytes) in a
//! plain text file.  Surrounding whitespace is ignored on read.

use std::{
    fs,
    path::{Path, PathBuf},
};

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use tracing::info;

use aitrace_contracts::error::{AiTraceError, AiTraceResult};

/// File name `generate_keypair` uses for the signing key.
pub const SIGNING_KEY_FILE: &str = "aitrace_signing.key";

/// File name `generate_keypair` uses for the verifying key.
pub const VERIFYING_KEY_FILE: &str = "aitrace_public.key";

fn key_error(reason: String) -> AiTraceError {
    AiTraceError::KeyError { reason }
}

fn decode_32(hex_text: &str, what: &str) -> AiTraceResult<[u8; 32]> {
    let bytes = hex::decode(hex_text.trim())
        .map_err(|e| key_error(format!("{} is not valid hex: {}", what, e)))?;
    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| key_error(format!("{} must be 32 bytes, got {}", what, bytes.len())))
}

pub fn signing_key_from_hex(hex_text: &str) -> AiTraceResult<SigningKey> {
    Ok(SigningKey::from_bytes(&decode_32(hex_text, "signing key")?))
}

pub fn verifying_key_from_hex(hex_text: &str) -> AiTraceResult<VerifyingKey> {
    VerifyingKey::from_bytes(&decode_32(hex_text, "verifying key")?)
        .map_err(|e| key_error(format!("verifying key is not a valid Ed25519 point: {}", e)))
}

fn read_key_file(path: &Path) -> AiTraceResult<String> {
    fs::read_to_string(path)
        .map_err(|e| key_error(format!("failed to read key file '{}': {}", path.display(), e)))
}

pub fn read_signing_key(path: &Path) -> AiTraceResult<SigningKey> {
    signing_key_from_hex(&read_key_file(path)?)
}

pub fn read_verifying_key(path: &Path) -> AiTraceResult<VerifyingKey> {
    verifying_key_from_hex(&read_key_file(path)?)
}

/// Paths written by `generate_keypair`.
#[derive(Debug, Clone)]
pub struct KeyPairFiles {
    pub signing_key: PathBuf,
    pub verifying_key: PathBuf,
}

/// Generate a fresh key pair and write both halves into `dir`.
///
/// Existing key files are never overwritten.
pub fn generate_keypair(dir: &Path) -> AiTraceResult<KeyPairFiles> {
    fs::create_dir_all(dir)
        .map_err(|e| key_error(format!("failed to create '{}': {}", dir.display(), e)))?;

    let files = KeyPairFiles {
        signing_key: dir.join(SIGNING_KEY_FILE),
        verifying_key: dir.join(VERIFYING_KEY_FILE),
    };
    for path in [&files.signing_key, &files.verifying_key] {
        if path.exists() {
            return Err(key_error(format!("refusing to overwrite '{}'", path.display())));
        }
    }

    let signing_key = SigningKey::generate(&mut OsRng);
    let write = |path: &Path, text: String| {
        fs::write(path, text)
            .map_err(|e| key_error(format!("failed to write '{}': {}", path.display(), e)))
    };
    write(&files.signing_key, hex::encode(signing_key.to_bytes()))?;
    write(
        &files.verifying_key,
        hex::encode(signing_key.verifying_key().to_bytes()),
    )?;

    info!(
        signing_key = %files.signing_key.display(),
        verifying_key = %files.verifying_key.display(),
        "generated Ed25519 key pair"
    );
    Ok(files)
}

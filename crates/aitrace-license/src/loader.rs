//! Locating the license string.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::license::LicenseError;

/// Environment variable consulted first.
pub const LICENSE_ENV_VAR: &str = "AITRACE_LICENSE";

/// File name looked up next to the running executable.
pub const LICENSE_FILE_NAME: &str = "aitrace.license";

/// Resolves the license from, in order: the environment variable, the
/// configured path, then `aitrace.license` beside the executable.
#[derive(Debug, Clone)]
pub struct LicenseLoader {
    env_var: String,
    path: Option<PathBuf>,
    search_exe_dir: bool,
}

impl Default for LicenseLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

impl LicenseLoader {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            env_var: LICENSE_ENV_VAR.to_string(),
            path,
            search_exe_dir: true,
        }
    }

    /// Read from a different environment variable.
    pub fn with_env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var = name.into();
        self
    }

    /// Skip the lookup beside the executable.
    pub fn without_exe_dir(mut self) -> Self {
        self.search_exe_dir = false;
        self
    }

    pub fn env_var(&self) -> &str {
        &self.env_var
    }

    /// The raw license string, or `Ok(None)` when no source has one.
    ///
    /// A configured path that exists but cannot be read is an error; a
    /// missing one is skipped.
    pub fn load(&self) -> Result<Option<String>, LicenseError> {
        if let Ok(value) = std::env::var(&self.env_var) {
            if !value.trim().is_empty() {
                debug!(source = %self.env_var, "license loaded from environment");
                return Ok(Some(value.trim().to_string()));
            }
        }

        if let Some(path) = &self.path {
            if let Some(value) = read_if_present(path)? {
                return Ok(Some(value));
            }
        }

        if self.search_exe_dir {
            let beside_exe = std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(|dir| dir.join(LICENSE_FILE_NAME)));
            if let Some(path) = beside_exe {
                if let Some(value) = read_if_present(&path)? {
                    return Ok(Some(value));
                }
            }
        }

        Ok(None)
    }
}

fn read_if_present(path: &Path) -> Result<Option<String>, LicenseError> {
    if !path.is_file() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| LicenseError::Unreadable(format!("'{}': {}", path.display(), e)))?;
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    debug!(path = %path.display(), "license loaded from file");
    Ok(Some(text.to_string()))
}

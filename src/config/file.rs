//! TOML configuration file loading
//!
//! Supports `~/.config/wordica/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of
//! defaults.

use std::path::PathBuf;

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Base URL of the speech backend
    pub api_base: Option<String>,

    /// Backend request timeout in seconds
    pub request_timeout_secs: Option<u64>,

    /// Startup category name (e.g. "animals")
    pub category: Option<String>,
}

impl ConfigFile {
    /// Load the config file if present; absent file yields defaults
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load() -> Result<Self> {
        let Some(path) = config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)?;
        let parsed = toml::from_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(parsed)
    }
}

/// Path to the user config file
fn config_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.config_dir().join("wordica").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_parses() {
        let parsed: ConfigFile = toml::from_str("api_base = \"http://localhost:8080\"").unwrap();
        assert_eq!(parsed.api_base.as_deref(), Some("http://localhost:8080"));
        assert_eq!(parsed.request_timeout_secs, None);
        assert_eq!(parsed.category, None);
    }

    #[test]
    fn test_empty_file_parses() {
        let parsed: ConfigFile = toml::from_str("").unwrap();
        assert!(parsed.api_base.is_none());
    }
}

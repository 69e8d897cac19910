//! Configuration management

pub mod file;

use std::path::PathBuf;

use crate::catalog::Category;
use crate::{Error, Result};

/// Default request timeout for backend calls
///
/// The backend keeps the turn-lock held until a request settles, so every
/// call carries a bounded timeout to keep a hung endpoint from locking
/// the session forever.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default category shown on startup
const DEFAULT_CATEGORY: Category = Category::Animals;

/// Wordica trainer configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the speech backend
    pub api_base: String,

    /// Directory for the transient audio cache files
    pub cache_dir: PathBuf,

    /// Backend request timeout in seconds
    pub request_timeout_secs: u64,

    /// Category shown when a session starts
    pub category: Category,
}

impl Config {
    /// Load configuration: defaults, overlaid by the config file, overlaid
    /// by CLI/env overrides
    ///
    /// # Errors
    ///
    /// Returns error if the config file is unreadable or invalid, if no
    /// backend URL is configured, or if the cache directory cannot be
    /// created
    pub fn load(api_base: Option<&str>, category: Option<Category>) -> Result<Self> {
        let file = file::ConfigFile::load()?;

        let api_base = api_base
            .map(ToString::to_string)
            .or(file.api_base)
            .ok_or_else(|| {
                Error::Config(
                    "backend URL required (set --api-base, WORDICA_API_BASE, or api_base in config.toml)"
                        .to_string(),
                )
            })?;

        let category = match (category, file.category) {
            (Some(cat), _) => cat,
            (None, Some(name)) => name.parse()?,
            (None, None) => DEFAULT_CATEGORY,
        };

        let cache_dir = default_cache_dir();
        std::fs::create_dir_all(&cache_dir)?;

        Ok(Self {
            api_base,
            cache_dir,
            request_timeout_secs: file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            category,
        })
    }
}

/// Cache directory for transient audio files
fn default_cache_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from(".wordica-cache"),
        |dirs| dirs.cache_dir().join("wordica"),
    )
}

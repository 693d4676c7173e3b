//! Backend connection settings.
//!
//! Sources, lowest precedence first:
//! 1. `~/.shelfctl/config.toml` (`[service]` and `[reports]` tables)
//! 2. `.env` files (`~/.shelfctl/.env`, then `./.env`) loaded into the
//!    process environment without overriding variables already set
//! 3. `SUPABASE_URL` / `SUPABASE_KEY` environment variables
//! 4. explicit overrides (CLI flags)

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{Result, ShelfError};

pub const URL_VAR: &str = "SUPABASE_URL";
pub const KEY_VAR: &str = "SUPABASE_KEY";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TOP_LIMIT: usize = 5;

/// Connection settings for the hosted database
#[derive(Clone)]
pub struct ServiceConfig {
    pub url: Url,
    pub key: String,
    pub timeout: Duration,
    /// Row cap for the most-borrowed report
    pub top_limit: usize,
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("url", &self.url.as_str())
            .field("key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("top_limit", &self.top_limit)
            .finish()
    }
}

/// On-disk config file layout
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub service: ServiceSection,
    #[serde(default)]
    pub reports: ReportsSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceSection {
    pub url: Option<String>,
    pub key: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportsSection {
    pub top_limit: Option<usize>,
}

impl ConfigFile {
    /// Read a config file; a missing file is an empty config
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            ShelfError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ShelfError::config(format!("invalid TOML in {}: {}", path.display(), e))
        })
    }
}

/// Values that take precedence over every other source
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub url: Option<String>,
    pub key: Option<String>,
}

/// Directory holding shelfctl's config and `.env`: ~/.shelfctl
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".shelfctl")
}

/// Get config file path: ~/.shelfctl/config.toml
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load `.env` files from the standard locations
pub fn load_dotenv() {
    let home_env = config_dir().join(".env");
    if dotenvy::from_path(&home_env).is_ok() {
        debug!(path = %home_env.display(), "loaded env file");
    }
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "loaded env file");
    }
}

impl ServiceConfig {
    /// Load from every source (see module docs)
    pub fn load(overrides: &Overrides) -> Result<Self> {
        load_dotenv();
        let file = ConfigFile::read(&config_path())?;
        Self::resolve(&file, |name| env::var(name).ok(), overrides)
    }

    /// Merge the sources; `lookup` reads environment variables
    pub fn resolve(
        file: &ConfigFile,
        lookup: impl Fn(&str) -> Option<String>,
        overrides: &Overrides,
    ) -> Result<Self> {
        let url = pick(&overrides.url, lookup(URL_VAR), &file.service.url)
            .ok_or_else(|| missing(URL_VAR, "service URL"))?;
        let key = pick(&overrides.key, lookup(KEY_VAR), &file.service.key)
            .ok_or_else(|| missing(KEY_VAR, "service key"))?;

        let timeout_secs = file.service.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ShelfError::config("service.timeout_secs must be positive"));
        }

        Ok(Self {
            url: parse_service_url(&url)?,
            key,
            timeout: Duration::from_secs(timeout_secs),
            top_limit: file.reports.top_limit.unwrap_or(DEFAULT_TOP_LIMIT),
        })
    }
}

fn pick(
    flag: &Option<String>,
    env_value: Option<String>,
    file_value: &Option<String>,
) -> Option<String> {
    flag.clone()
        .or(env_value)
        .or_else(|| file_value.clone())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn missing(var: &str, what: &str) -> ShelfError {
    ShelfError::config(format!(
        "{} not set: export the {}, add it to {} or a .env file, or pass it as a flag",
        var,
        what,
        config_path().display()
    ))
}

/// Parse the project URL, dropping trailing slashes so paths join cleanly
pub fn parse_service_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed)
        .map_err(|e| ShelfError::config(format!("invalid {} '{}': {}", URL_VAR, trimmed, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ShelfError::config(format!(
            "{} must use http or https, got '{}' in '{}'",
            URL_VAR, other, trimmed
        ))),
    }
}

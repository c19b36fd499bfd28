use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// One layer of settings: the on-disk file, or overrides from flags/environment.
///
/// Example TOML:
/// api_key = "..."
/// addr = ":8080"
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub addr: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings, built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub api_key: String,
    pub addr: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ServiceConfig {
    /// Defaults for everything except the credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            addr: DEFAULT_ADDR.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Layer `overrides` on top of `self`; set, non-empty values win.
    pub fn overlay(self, overrides: Config) -> Config {
        Config {
            api_key: non_empty(overrides.api_key).or_else(|| non_empty(self.api_key)),
            addr: non_empty(overrides.addr).or_else(|| non_empty(self.addr)),
            base_url: non_empty(overrides.base_url).or_else(|| non_empty(self.base_url)),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
        }
    }

    /// Fill in defaults and check the credential.
    pub fn resolve(self) -> Result<ServiceConfig> {
        let api_key = non_empty(self.api_key).ok_or_else(|| {
            anyhow!(
                "missing (or empty) API_KEY.\n\
                 Hint: set the API_KEY environment variable, pass --api-key, \
                 or run `weather-server configure`."
            )
        })?;

        let addr = non_empty(self.addr)
            .map(|addr| normalize_addr(&addr))
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());

        let base_url = non_empty(self.base_url)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be greater than zero"));
        }

        Ok(ServiceConfig {
            api_key,
            addr,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// `:8080` means "all interfaces, port 8080".
pub fn normalize_addr(addr: &str) -> String {
    let addr = addr.trim();
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

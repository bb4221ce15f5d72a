use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::donation::ReconcilePolicy;
use crate::http::DEFAULT_AUTH_COOKIE;

/// Environment variable overriding `api.base_url`
pub const API_URL_ENV: &str = "DONATION_API_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub donation: DonationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend origin; requests go to `<base_url>/api/...`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Defaults to `<data_dir>/cookies.json`
    #[serde(default)]
    pub cookie_file: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            data_dir: default_data_dir(),
            cookie_file: None,
        }
    }
}

impl SessionConfig {
    pub fn cookie_path(&self) -> PathBuf {
        self.cookie_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("cookies.json"))
    }
}

fn default_cookie_name() -> String {
    DEFAULT_AUTH_COOKIE.to_string()
}

fn default_data_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".donation-tracker"),
        None => PathBuf::from("./data"),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DonationConfig {
    #[serde(default)]
    pub reconcile: ReconcilePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config =
                toml::from_str(&content).with_context(|| "Failed to parse configuration file")?;
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    /// Apply `DONATION_API_URL`, then an explicit `--api-url`
    pub fn apply_overrides(&mut self, env_url: Option<String>, cli_url: Option<String>) {
        if let Some(url) = env_url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(url) = cli_url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!(
                "api.base_url must start with http:// or https:// (got '{}')",
                self.api.base_url
            );
        }
        if self.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be greater than zero");
        }
        if self.session.cookie_name.trim().is_empty() {
            bail!("session.cookie_name must not be empty");
        }
        Ok(())
    }
}

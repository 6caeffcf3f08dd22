use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::task::Task;

/// Backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable overriding the configured backend URL.
pub const API_URL_ENV: &str = "DEVFLOW_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub default_task: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the user config file. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config at {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Backend base URL: environment first, then file, then the local default.
    pub fn api_url(&self) -> String {
        self.api_url_with_override(None)
    }

    /// Like [`Config::api_url`], with a command-line value taking precedence.
    pub fn api_url_with_override(&self, cli_value: Option<&str>) -> String {
        let env_value = std::env::var(API_URL_ENV).ok();
        self.resolve_api_url(cli_value, env_value.as_deref())
    }

    // Blank values at any level count as unset.
    fn resolve_api_url(&self, cli_value: Option<&str>, env_value: Option<&str>) -> String {
        [cli_value, env_value, self.api_url.as_deref()]
            .into_iter()
            .flatten()
            .map(normalize_base_url)
            .find(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn default_task(&self) -> Task {
        self.default_task
            .as_deref()
            .and_then(Task::from_str)
            .unwrap_or_default()
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("devflow").join("config.json"))
    }
}

pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

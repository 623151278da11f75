mod language;

pub use language::{Language, Messages};

use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{HiderError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Rule storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Browser configuration
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Page-load reapply configuration
    #[serde(default)]
    pub reapply: ReapplyConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Rules file path (overrides the platform data directory)
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Browser executable path (overrides auto-discovery)
    pub executable: Option<String>,

    /// CDP port
    #[serde(default = "default_cdp_port")]
    pub cdp_port: u16,

    /// Run in headless mode
    #[serde(default)]
    pub headless: bool,

    /// User data directory for the managed browser profile
    pub user_data_dir: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            cdp_port: default_cdp_port(),
            headless: false,
            user_data_dir: None,
        }
    }
}

fn default_cdp_port() -> u16 {
    9222
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReapplyConfig {
    /// Delays after the initial page-load reconcile at which matching rules
    /// are re-applied, to catch late-rendering content.
    #[serde(default = "default_reapply_delays")]
    pub delays_ms: Vec<u64>,
}

impl Default for ReapplyConfig {
    fn default() -> Self {
        Self {
            delays_ms: default_reapply_delays(),
        }
    }
}

fn default_reapply_delays() -> Vec<u64> {
    vec![1000, 3000]
}

impl Config {
    /// Load configuration from all sources (file, env, defaults)
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let config: Config = Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()))
            // Merge config file if exists
            .merge(Toml::file(&config_path))
            // Merge environment variables (ELEMENT_HIDER_*)
            .merge(Env::prefixed("ELEMENT_HIDER_").split("_"))
            .extract()
            .map_err(|e| HiderError::ConfigError(e.to_string()))?;

        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("element-hider")
            .join("config.toml")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| HiderError::ConfigError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Where the rule store lives, honoring the configured override.
    pub fn storage_file_path(&self) -> PathBuf {
        match &self.storage.file {
            Some(file) => PathBuf::from(shellexpand::tilde(file).to_string()),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("element-hider")
                .join("rules.json"),
        }
    }

    pub fn reapply_delays(&self) -> Vec<std::time::Duration> {
        self.reapply
            .delays_ms
            .iter()
            .map(|ms| std::time::Duration::from_millis(*ms))
            .collect()
    }
}

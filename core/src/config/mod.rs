use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const GUIDELY_DIR: &str = ".guidely";
const CONFIG_PATH_ENV: &str = "GUIDELY_CONFIG";
const BACKEND_URL_ENV: &str = "BACKEND_URL";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub backend_url: String,
    pub proxy_port: u16,
    pub proxy_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            backend_url: "http://localhost:8000".to_string(),
            proxy_port: 5000,
            proxy_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolsConfig {
    pub timeout_secs: u64,
    /// Fail at startup instead of registering a degraded currency tool.
    pub require_currency_key: bool,
    pub forecast_count: u32,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            require_currency_key: false,
            forecast_count: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub temperature: f64,
    pub max_iterations: usize,
    pub server: ServerConfig,
    pub tools: ToolsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: "groq".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            base_url: None,
            api_key: None,
            temperature: 0.7,
            max_iterations: 10,
            server: ServerConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl Config {
    /// Loads the config file when present, otherwise defaults, then applies
    /// environment overrides.
    pub fn load_or_init() -> Result<Self> {
        let mut config = if config_exists() {
            load_config()?
        } else {
            Config::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(BACKEND_URL_ENV)
            && !url.trim().is_empty()
        {
            self.server.backend_url = url.trim().to_string();
        }
    }
}

pub fn get_guidely_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(GUIDELY_DIR)
}

pub fn get_config_path() -> PathBuf {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => get_guidely_dir().join("config.toml"),
    }
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}

pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path())
}

pub fn load_config_from(config_path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(config_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::anyhow!(
                "Config file not found at {}. Run 'guidely onboard' to set up your configuration.",
                config_path.display()
            )
        } else {
            anyhow::anyhow!("Failed to read config from {}: {}", config_path.display(), e)
        }
    })?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    tracing::debug!(path = %config_path.display(), "Configuration loaded");
    Ok(config)
}

pub fn save_config(config: &Config) -> Result<PathBuf> {
    let config_path = get_config_path();
    save_config_to(config, &config_path)?;
    Ok(config_path)
}

pub fn save_config_to(config: &Config, config_path: &Path) -> Result<()> {
    if let Some(parent) = config_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create config directory at {}", parent.display())
        })?;
    }

    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config to TOML")?;

    std::fs::write(config_path, content)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(())
}

//! Configuration file support

use probe_ai::ApiProvider;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Configuration for probe
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default model to use
    pub model: Option<String>,
    /// Default provider (anthropic, bedrock)
    pub provider: Option<String>,
    /// chromedriver endpoint
    pub webdriver_url: Option<String>,
    /// Run the browser headless
    pub headless: Option<bool>,
    /// Max output tokens per model call
    pub max_tokens: Option<u32>,
    /// Where screenshots are written
    pub screenshot_dir: Option<String>,
    /// Capture a follow-up screenshot after every action
    pub audit_screenshots: Option<bool>,
    /// API keys (alternative to environment variables)
    #[serde(default)]
    pub api_keys: ApiKeys,
}

/// API key configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    pub anthropic: Option<String>,
    pub bedrock: Option<String>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("probe")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for PROBE_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("PROBE_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        let dir = path.parent().unwrap();
        fs::create_dir_all(dir)?;

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            model: None,
            provider: Some("anthropic".to_string()),
            webdriver_url: Some("http://localhost:9515".to_string()),
            headless: Some(true),
            max_tokens: Some(4096),
            screenshot_dir: Some("screenshots".to_string()),
            audit_screenshots: Some(true),
            api_keys: ApiKeys::default(),
        };

        default_config.save()?;
        Ok(path)
    }

    /// Get API key for a provider, checking config then env
    pub fn get_api_key(&self, provider: ApiProvider) -> Option<String> {
        let from_config = match provider {
            ApiProvider::Anthropic => self.api_keys.anthropic.clone(),
            ApiProvider::Bedrock => self.api_keys.bedrock.clone(),
        };
        if from_config.is_some() {
            return from_config;
        }

        std::env::var(provider.api_key_env_var()).ok()
    }
}

/// Example config shown after --init-config
pub fn example_config() -> &'static str {
    r#"# probe configuration
provider = "anthropic"          # or "bedrock"
webdriver_url = "http://localhost:9515"
headless = true
max_tokens = 4096
screenshot_dir = "screenshots"
audit_screenshots = true

[api_keys]
# anthropic = "sk-ant-..."
"#
}

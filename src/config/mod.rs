
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::advisor::{HealthyTreatments, Language};
use crate::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Environment variables consulted, in order, when the file has no key.
pub const CREDENTIAL_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub diagnosis: DiagnosisConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Supports `${VAR}` / `$VAR` expansion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisConfig {
    /// Largest photo the CLI will upload.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,

    #[serde(default)]
    pub healthy_treatments: HealthyTreatments,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_gemini_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_max_image_bytes() -> u64 {
    5 * 1024 * 1024
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_gemini_base_url(),
            model: default_model(),
        }
    }
}

impl Default for DiagnosisConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: default_max_image_bytes(),
            healthy_treatments: HealthyTreatments::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load `~/.ghiras/config.toml`, writing the template on first run.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            Self::save_template(&path)?;
            let mut config = Config::default();
            config.apply_credential_env();
            return Ok(config);
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config = Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.apply_credential_env();

        Ok(config)
    }

    /// Parse TOML, expand `${VAR}` references and validate.
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;

        config.expand_env_vars();

        config
            .validate()
            .context("Configuration validation failed")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let base_url = self.gemini.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            anyhow::bail!(
                "gemini.base_url must be an http(s) URL (got '{}')",
                self.gemini.base_url
            );
        }

        if self.gemini.model.trim().is_empty() {
            anyhow::bail!("gemini.model cannot be empty");
        }

        if self.diagnosis.max_image_bytes == 0 {
            anyhow::bail!("diagnosis.max_image_bytes must be greater than zero");
        }

        if self.logging.level.trim().is_empty() {
            anyhow::bail!("logging.level cannot be empty");
        }

        Ok(())
    }

    /// Write the commented template, creating parent directories.
    pub fn save_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
        eprintln!("Created default config at {}", path.display());

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let base = directories::BaseDirs::new()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;

        Ok(base.home_dir().join(".ghiras").join("config.toml"))
    }

    fn expand_env_vars(&mut self) {
        if let Some(ref mut key) = self.gemini.api_key {
            *key = expand_env(key);
        }
    }

    /// Fall back to the environment when the file has no usable key.
    fn apply_credential_env(&mut self) {
        let configured = self
            .gemini
            .api_key
            .as_deref()
            .map(str::trim)
            .is_some_and(|key| !key.is_empty() && !is_env_placeholder(key));
        if configured {
            return;
        }

        if let Some(key) = CREDENTIAL_ENV_VARS.iter().find_map(|var| {
            std::env::var(var)
                .ok()
                .filter(|value| !value.trim().is_empty())
        }) {
            self.gemini.api_key = Some(key);
        }
    }

    pub fn get_value(&self, key: &str) -> Result<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["gemini", "base_url"] => Ok(self.gemini.base_url.clone()),
            ["gemini", "model"] => Ok(self.gemini.model.clone()),
            ["diagnosis", "max_image_bytes"] => Ok(self.diagnosis.max_image_bytes.to_string()),
            ["diagnosis", "healthy_treatments"] => {
                Ok(toml_scalar(&self.diagnosis.healthy_treatments))
            }
            ["chat", "language"] => Ok(self.chat.language.to_string()),
            ["logging", "level"] => Ok(self.logging.level.clone()),
            ["gemini", "api_key"] => anyhow::bail!("gemini.api_key is not printable"),
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
    }
}

fn toml_scalar<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// True for an unexpanded `${VAR}` or `$VAR` reference.
pub fn is_env_placeholder(value: &str) -> bool {
    let name = match value.strip_prefix("${") {
        Some(rest) => match rest.strip_suffix('}') {
            Some(name) => name,
            None => return false,
        },
        None => match value.strip_prefix('$') {
            Some(name) => name,
            None => return false,
        },
    };
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn expand_env(s: &str) -> String {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).unwrap_or_else(|_| s.to_string())
    } else if let Some(var_name) = s.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_else(|_| s.to_string())
    } else {
        s.to_string()
    }
}

/// Default config template with helpful comments (used for first-time setup)
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Ghiras Configuration
# Auto-created on first run. Edit as needed.

[gemini]
# Without a key every answer comes from the offline mock.
# Falls back to the GEMINI_API_KEY, then API_KEY, environment variables.
api_key = "${GEMINI_API_KEY}"
base_url = "https://generativelanguage.googleapis.com/v1beta"
model = "gemini-2.5-flash"

[diagnosis]
# Photos above this size are refused (5 MiB)
max_image_bytes = 5242880
# Healthy plants: "clear" drops any treatments the model suggests, "trust" keeps them
healthy_treatments = "clear"

[chat]
# UI language for greetings and offline replies: "ar" or "en"
language = "en"

[logging]
level = "info"
"#;

//! AI settings file management

use anyhow::{bail, Context, Result};
use posture_lib::{ai::DEFAULT_PACING, ClientConfig, PromptBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_PREFIX: &str = "KPOSTURE";
const PLACEHOLDER_API_KEY: &str = "your-openai-api-key";

/// Settings file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub openai: OpenAiSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

/// Remote model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiSettings {
    #[serde(default)]
    pub api_key: String,

    /// Service root; a trailing `/v1` is accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-call deadline in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Batch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Delay between consecutive model calls in milliseconds
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing_ms(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    posture_lib::ai::DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f32 {
    posture_lib::ai::DEFAULT_TEMPERATURE
}

fn default_request_timeout() -> u64 {
    120
}

fn default_pacing_ms() -> u64 {
    DEFAULT_PACING.as_millis() as u64
}

impl AppConfig {
    /// Load from `path` with `KPOSTURE_*` environment overrides
    ///
    /// Nested keys use `__`, e.g. `KPOSTURE_OPENAI__API_KEY`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("config file {} not found", path.display());
        }

        let settings = config::Config::builder()
            .add_source(config::File::new(
                &path.to_string_lossy(),
                config::FileFormat::Yaml,
            ))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.openai.api_key.trim().is_empty() {
            bail!("openai.api_key is required in config file");
        }
        if self.openai.model.trim().is_empty() {
            bail!("openai.model must not be empty");
        }
        Ok(())
    }

    /// Template written by `init-config`
    pub fn example() -> Self {
        Self {
            openai: OpenAiSettings {
                api_key: PLACEHOLDER_API_KEY.to_string(),
                base_url: Some("https://api.openai.com/v1/".to_string()),
                model: default_model(),
                max_tokens: default_max_tokens(),
                temperature: default_temperature(),
                request_timeout_secs: default_request_timeout(),
            },
            analysis: AnalysisSettings::default(),
        }
    }

    pub fn save_example(path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(&Self::example()).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut client = ClientConfig::new(self.openai.api_key.clone());
        client.base_url = self.openai.base_url.clone();
        client.model = self.openai.model.clone();
        client.request_timeout = Duration::from_secs(self.openai.request_timeout_secs);
        client
    }

    pub fn prompt_builder(&self) -> PromptBuilder {
        PromptBuilder::new(&self.openai.model)
            .with_max_tokens(self.openai.max_tokens)
            .with_temperature(self.openai.temperature)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.analysis.pacing_ms)
    }

    /// Base URL as configured, or the service default
    pub fn base_url_display(&self) -> &str {
        self.openai
            .base_url
            .as_deref()
            .unwrap_or("https://api.openai.com")
    }
}

pub mod secret;

use serde::{Deserialize, Serialize};
use crate::error::{AppError, Result};
use crate::sources::webhook::WebhookSourceConfig;
use crate::pipeline::processors::ProcessorConfig;
use crate::pipeline::sinks::SinkConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub integrations: Vec<Integration>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Integration {
    pub source: SourceConfig,
    #[serde(default)]
    pub pipelines: Vec<Pipeline>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Pipeline {
    #[serde(default)]
    pub processors: Vec<ProcessorConfig>,
    pub sinks: Vec<SinkConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum SourceConfig {
    #[serde(rename = "webhook")]
    Webhook(WebhookSourceConfig),
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}

/// Process settings read from `PRUNEGATE_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_configuration_path")]
    pub configuration_path: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_pipeline_buffer")]
    pub pipeline_buffer: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix("PRUNEGATE").try_parsing(true))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(source)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AppError::Config(format!("Failed to load settings: {}", e)))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            configuration_path: default_configuration_path(),
            http_port: default_http_port(),
            log_level: default_log_level(),
            pipeline_buffer: default_pipeline_buffer(),
        }
    }
}

fn default_configuration_path() -> String {
    "config/config.json".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_pipeline_buffer() -> usize {
    100
}

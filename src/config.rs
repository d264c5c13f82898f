//! Runtime configuration.
//!
//! Settings come from an optional YAML file and are then overridden by
//! command-line flags (which themselves may come from environment
//! variables, see [`crate::cli::Cli`]). Every field has a default, so an
//! empty or partial file is valid.
//!
//! ```yaml
//! news_api:
//!   base_url: https://newsapi.org/v2
//!   api_key: your-key
//! summarizer:
//!   base_url: http://localhost:11434
//!   model: llama3.2
//!   temperature: 0.3
//! fetch:
//!   concurrency: 4
//! extraction:
//!   min_paragraphs: 3
//! ```

use crate::content::extractor::{DEFAULT_CONTAINERS, DEFAULT_MIN_PARAGRAPHS};
use crate::content::ExtractionConfig;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub news_api: NewsApiConfig,
    pub summarizer: SummarizerConfig,
    pub fetch: FetchConfig,
    pub extraction: ExtractionSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NewsApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org/v2".to_string(),
            api_key: None,
        }
    }
}

/// Local inference server settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    /// Extra attempts after a retriable failure; 0 sends exactly one request.
    pub max_retries: usize,
    /// Article text beyond this many characters is cut from the prompt.
    pub max_prompt_chars: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            temperature: 0.3,
            top_p: 0.9,
            max_tokens: 300,
            max_retries: 0,
            max_prompt_chars: 6000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// How many article pages are downloaded at once.
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionSettings {
    pub min_paragraphs: usize,
    pub containers: Vec<String>,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            min_paragraphs: DEFAULT_MIN_PARAGRAPHS,
            containers: DEFAULT_CONTAINERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ExtractionSettings {
    pub fn to_extraction_config(&self) -> ExtractionConfig {
        ExtractionConfig {
            min_paragraphs: self.min_paragraphs,
            containers: self.containers.clone(),
            ..ExtractionConfig::default()
        }
    }
}

impl AppConfig {
    /// Load from `path`, or return defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };

        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_string(),
                source,
            })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        info!(path, "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Apply command-line overrides on top of file settings.
    pub fn with_overrides(
        mut self,
        api_key: Option<String>,
        summarizer_url: Option<String>,
        model: Option<String>,
    ) -> Self {
        if api_key.is_some() {
            self.news_api.api_key = api_key;
        }
        if let Some(url) = summarizer_url {
            self.summarizer.base_url = url;
        }
        if let Some(model) = model {
            self.summarizer.model = model;
        }
        self
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.news_api
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{KisanError, Result};
use crate::types::{Language, LogLevel};

/// Top-level configuration for the Kisan assistant.
///
/// Loaded from a TOML file; every section and field has a default so a
/// missing or partial file still yields a working configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KisanConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
}

impl KisanConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: KisanConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file does not
    /// exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration as pretty TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| KisanError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Cross-cutting settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Display language for the assistant UI and fixed strings.
    #[serde(default)]
    pub language: Language,
    /// Log verbosity for the tracing subscriber.
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Conversation session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// How many persisted turns a new session loads into the transcript.
    #[serde(default = "default_history_page_size")]
    pub history_page_size: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_page_size: default_history_page_size(),
        }
    }
}

fn default_history_page_size() -> usize {
    20
}

/// Inference backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Base URL of the agri backend, e.g. `https://api.example.org`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Per-request timeout. Expiry is reported as an ordinary failure.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8787".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

// =============================================================================
// Tests
// =============================================================================

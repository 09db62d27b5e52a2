//! # Config — typed TOML configuration for the Vigil backend
//!
//! Reads `vigil.toml` (or a custom path) and deserializes into typed config
//! structs. A missing file is not an error; defaults apply.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{VigilError, VigilResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VigilConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { log_level: "info".into() }
    }
}

/// Settings for the decision audit engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Whether audit-change notifications are published at all.
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    /// Upper bound on audit records held by the in-memory store.
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    /// Upper bound on a single comment's length; longer free text is
    /// truncated on append.
    #[serde(default = "default_max_comment_chars")]
    pub max_comment_chars: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            max_records: default_max_records(),
            max_comment_chars: default_max_comment_chars(),
        }
    }
}

fn default_true() -> bool { true }
fn default_max_records() -> usize { 100_000 }
fn default_max_comment_chars() -> usize { 16_384 }

impl VigilConfig {
    /// Load config from a TOML file path. A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> VigilResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: VigilConfig = toml::from_str(&content)
            .map_err(|e| VigilError::Config(format!("Failed to parse config: {}", e)))?;
        info!(
            path = %path.display(),
            notifications = config.audit.notifications_enabled,
            max_records = config.audit.max_records,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Save current config to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> VigilResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VigilError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

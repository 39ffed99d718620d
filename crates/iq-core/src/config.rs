//! Configuration management for inline-query

use crate::error::{InlineQueryError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Context extraction settings
    pub context: ContextConfig,
    /// Default query toggles
    pub query: QueryDefaults,
    /// Storage settings
    pub storage: StorageConfig,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| InlineQueryError::Toml(e.to_string()))
    }

    /// Render configuration as TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| InlineQueryError::Toml(e.to_string()))
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| e.with_context(format!("Failed to parse {}", path.display())))
    }
}

/// Inline context extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Maximum lines shown before the commented range
    pub head_lines: usize,
    /// Maximum lines shown after the commented range
    pub tail_lines: usize,
    /// A line anchors the context once its trimmed length exceeds this
    pub anchor_min_length: usize,
    /// Largest hunk start offset still treated as "top of file"
    pub max_hunk_offset: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            head_lines: 3,
            tail_lines: 3,
            anchor_min_length: 3,
            max_hunk_offset: 1,
        }
    }
}

/// Toggles applied when a caller does not set them explicitly
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryDefaults {
    pub need_reply_to_comments: bool,
    pub need_hidden: bool,
    pub need_applied_drafts: bool,
    pub need_inline_context: bool,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            need_reply_to_comments: true,
            need_hidden: true,
            need_applied_drafts: false,
            need_inline_context: false,
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory of the file-system store
    pub root: Option<PathBuf>,
}

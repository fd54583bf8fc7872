use std::path::PathBuf;

use serde::Deserialize;

use crate::content::{CleanMode, ContentCleaner, DEFAULT_BACKUP_SUFFIX, DEFAULT_EXTENSIONS};
use crate::links::{CollapseRule, DEFAULT_PREFIX, LinkRewriter};

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    #[serde(default)]
    pub rewrite: RewriteConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RewriteConfig {
    #[serde(default)]
    pub mode: CleanMode,
    /// Folder rewritten link targets are placed under.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Extra duplicated-title rules, applied after the built-in ones.
    #[serde(default)]
    pub collapse: Vec<CollapseRule>,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self { mode: CleanMode::default(), prefix: default_prefix(), collapse: Vec::new() }
    }
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_backup_suffix")]
    pub backup_suffix: String,
    #[serde(default = "default_skip_hidden")]
    pub skip_hidden: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            backup_suffix: default_backup_suffix(),
            skip_hidden: default_skip_hidden(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect()
}

fn default_backup_suffix() -> String {
    DEFAULT_BACKUP_SUFFIX.to_string()
}

fn default_skip_hidden() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Configuration after defaults and path expansion.
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    /// File the settings came from, `None` when built-in defaults are used.
    pub source: Option<PathBuf>,
    pub rewrite: RewriteConfig,
    pub content: ContentConfig,
    pub logging: LoggingConfig,
}

impl ResolvedConfig {
    /// Link rewriter with the configured prefix and extra collapse rules.
    pub fn rewriter(&self) -> LinkRewriter {
        LinkRewriter::new(self.rewrite.prefix.clone())
            .with_rules(self.rewrite.collapse.iter().cloned())
    }

    /// Content cleaner for the configured mode, allow-list and backup suffix.
    pub fn cleaner(&self) -> ContentCleaner {
        ContentCleaner::new(self.rewrite.mode, self.rewriter())
            .extensions(&self.content.extensions)
            .backup_suffix(self.content.backup_suffix.clone())
    }
}

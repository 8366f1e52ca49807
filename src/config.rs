//! Configuration management for MarkDiff
//!
//! This module provides configuration structures and defaults for diff
//! computation and markup rendering, loadable from a TOML file with
//! environment overrides.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diff::{DiffAlgorithmType, DiffOptions, DEFAULT_CONTEXT_LINES};
use crate::render::{AddRemTags, MarkupTag, RenderBuilder, Theme};

/// Upper bound accepted for unified diff context lines
pub const MAX_CONTEXT_LINES: usize = 1000;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {name}: {value}")]
    Env { name: &'static str, value: String },
    #[error("context_lines must be at most {max}, got {value}")]
    ContextLines { value: usize, max: usize },
}

/// Global configuration for MarkDiff
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkDiffConfig {
    /// Diff computation settings
    pub diff: DiffSettings,
    /// Markup settings
    pub theme: ThemeConfig,
}

/// Configuration for diff computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffSettings {
    /// Line diff algorithm
    pub algorithm: DiffAlgorithmType,
    /// Context lines around each unified diff hunk
    pub context_lines: usize,
}

/// Configuration for markup rendering. Explicit tags override the preset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub preset: Theme,
    pub escape: Option<bool>,
    pub file: Option<MarkupTag>,
    pub normal: Option<MarkupTag>,
    pub comment: Option<MarkupTag>,
    pub line: Option<AddRemTags>,
    pub text: Option<AddRemTags>,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            algorithm: DiffAlgorithmType::default(),
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}

impl DiffSettings {
    pub fn options(&self) -> DiffOptions {
        DiffOptions::new()
            .algorithm(self.algorithm)
            .context_lines(self.context_lines)
    }
}

impl ThemeConfig {
    /// Builder for the preset with any explicit overrides applied
    pub fn builder(&self) -> RenderBuilder {
        let mut builder = self.preset.builder();

        if let Some(escape) = self.escape {
            builder = builder.escape(escape);
        }
        if let Some(tag) = &self.file {
            builder = builder.file(tag.open.clone(), tag.close.clone());
        }
        if let Some(tag) = &self.normal {
            builder = builder.normal(tag.open.clone(), tag.close.clone());
        }
        if let Some(tag) = &self.comment {
            builder = builder.comment(tag.open.clone(), tag.close.clone());
        }
        if let Some(tags) = &self.line {
            builder = builder.line_tags(tags.clone());
        }
        if let Some(tags) = &self.text {
            builder = builder.text_tags(tags.clone());
        }

        builder
    }
}

/// Configuration loading and management
impl MarkDiffConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Default configuration with environment overrides applied
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override settings from `MARKDIFF_*` environment variables
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        const ALGORITHM: &str = "MARKDIFF_ALGORITHM";
        const CONTEXT_LINES: &str = "MARKDIFF_CONTEXT_LINES";

        if let Some(val) = var(ALGORITHM) {
            self.diff.algorithm = val.parse().map_err(|_| ConfigError::Env {
                name: ALGORITHM,
                value: val.clone(),
            })?;
        }

        if let Some(val) = var(CONTEXT_LINES) {
            self.diff.context_lines = val.trim().parse().map_err(|_| ConfigError::Env {
                name: CONTEXT_LINES,
                value: val.clone(),
            })?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.diff.context_lines > MAX_CONTEXT_LINES {
            return Err(ConfigError::ContextLines {
                value: self.diff.context_lines,
                max: MAX_CONTEXT_LINES,
            });
        }

        Ok(())
    }
}

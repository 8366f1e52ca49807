use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};

use crate::config::MarkDiffConfig;
use crate::diff::DiffAlgorithmType;
use crate::render::Theme;

#[derive(Parser)]
#[command(name = "markdiff")]
#[command(version)]
#[command(about = "Compute, select and render line diffs as markup")]
#[command(long_about = "MarkDiff computes the edits between two files, groups adjacent edits, \
lets you keep only some of them, and renders the result as a unified diff, ANSI-colored or \
HTML markup with intra-line highlighting, or as the partially modified text.")]
pub struct Cli {
    /// Original file
    #[arg(value_name = "OLD")]
    pub old: PathBuf,

    /// Changed file
    #[arg(value_name = "NEW")]
    pub new: PathBuf,

    /// Path used in the `a/` and `b/` diff header labels
    #[arg(long, help = "Label for diff headers (defaults to the NEW path)")]
    pub label: Option<String>,

    /// Line diff algorithm
    #[arg(short, long, help = "Diff algorithm")]
    pub algorithm: Option<DiffAlgorithmType>,

    /// Diff context lines
    #[arg(short = 'U', long, help = "Number of context lines in diffs")]
    pub context: Option<usize>,

    /// Output format
    #[arg(short, long, default_value = "unified", help = "Output format")]
    pub format: OutputFormat,

    /// Markup preset for the `render` format
    #[arg(short, long, help = "Markup theme used by --format render")]
    pub theme: Option<Theme>,

    /// Keep only these edit groups
    #[arg(
        long = "group",
        value_name = "N",
        value_delimiter = ',',
        help = "Edit groups to keep (default: all)"
    )]
    pub groups: Vec<usize>,

    /// Keep only these edits
    #[arg(
        long = "edit",
        value_name = "N",
        value_delimiter = ',',
        help = "Edits to keep (default: all)"
    )]
    pub edits: Vec<usize>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE", help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colors in output
    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Unified diff text of the kept edits
    Unified,
    /// Unified diff rendered with the configured theme
    Render,
    /// Unified diff rendered with ANSI colors
    Ansi,
    /// Unified diff rendered as HTML
    Html,
    /// The original text with the kept edits applied
    Modified,
    /// JSON listing of edits and groups for scripting
    Json,
}

impl Cli {
    /// Label used for the diff headers
    pub fn label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.new.display().to_string())
    }

    /// Whether the selection was narrowed on the command line
    pub fn has_selection(&self) -> bool {
        !self.groups.is_empty() || !self.edits.is_empty()
    }

    /// Configuration file (if any), then environment, then command line flags
    pub fn resolve_config(&self) -> Result<MarkDiffConfig> {
        let mut config = match &self.config {
            Some(path) => MarkDiffConfig::load(path)?,
            None => MarkDiffConfig::default(),
        };
        config.apply_env()?;

        if let Some(algorithm) = self.algorithm {
            config.diff.algorithm = algorithm;
        }
        if let Some(context) = self.context {
            config.diff.context_lines = context;
        }
        if let Some(theme) = self.theme {
            config.theme.preset = theme;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn setup_logging(&self) {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }

    pub fn validate(&self) -> Result<()> {
        for path in [&self.old, &self.new] {
            if !path.exists() {
                bail!("Path does not exist: {}", path.display());
            }
            if !path.is_file() {
                bail!("Path is not a file: {}", path.display());
            }
        }

        Ok(())
    }
}

pub mod cli;
pub mod config;
pub mod diff;
pub mod render;

pub use config::{ConfigError, MarkDiffConfig};
pub use diff::{ApplyError, Diff, DiffAlgorithmType, DiffOptions, DiffStats, EditSpan, Position};
pub use render::{AddRemTags, MarkupTag, RenderBuilder, Renderer, Theme};

//! Built-in markup presets

use clap::ValueEnum;
use crossterm::style::{Attribute, Color, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::Command;
use serde::{Deserialize, Serialize};

use super::RenderBuilder;

/// Preconfigured markup sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// No markup, no escaping
    #[default]
    Plain,
    /// ANSI terminal colors
    Ansi,
    /// HTML spans with `diff-*` classes
    Html,
}

impl Theme {
    pub fn builder(self) -> RenderBuilder {
        match self {
            Self::Plain => RenderBuilder::new().escape(false),
            Self::Ansi => ansi_builder(),
            Self::Html => html_builder(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Ansi => "ansi",
            Self::Html => "html",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn ansi(command: impl Command) -> String {
    let mut sequence = String::new();
    // writing into a String cannot fail
    let _ = command.write_ansi(&mut sequence);
    sequence
}

fn ansi_builder() -> RenderBuilder {
    let reset = ansi(ResetColor);
    let reverse = ansi(SetAttribute(Attribute::Reverse));
    let no_reverse = ansi(SetAttribute(Attribute::NoReverse));

    RenderBuilder::new()
        .escape(false)
        .comment(ansi(SetForegroundColor(Color::Cyan)), reset.clone())
        .line_added(ansi(SetForegroundColor(Color::Green)), reset.clone())
        .line_removed(ansi(SetForegroundColor(Color::Red)), reset)
        .text_added(reverse.clone(), no_reverse.clone())
        .text_removed(reverse, no_reverse)
}

fn html_builder() -> RenderBuilder {
    let span = |class: &str| format!("<span class=\"diff-{}\">", class);

    RenderBuilder::new()
        .escape(true)
        .file("<pre class=\"diff\">", "</pre>")
        .normal(span("normal"), "</span>")
        .comment(span("comment"), "</span>")
        .line_added(span("line-added"), "</span>")
        .line_removed(span("line-removed"), "</span>")
        .text_added("<ins>", "</ins>")
        .text_removed("<del>", "</del>")
}

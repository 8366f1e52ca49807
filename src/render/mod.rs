//! Markup rendering of unified diffs
//!
//! A [`RenderBuilder`] collects the markup wrapped around each part of a diff
//! (the whole file, normal lines, comment lines, added/removed lines and
//! added/removed text within a line) and builds an immutable [`Renderer`].
//! Paired removed/added lines get character-level highlighting.

mod batch;
pub mod escape;
pub mod theme;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::diff::{char_diff, SegmentKind};

pub use escape::escape_html;
pub use theme::Theme;

/// An open/close markup pair wrapped around a span of output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupTag {
    #[serde(default)]
    pub open: String,
    #[serde(default)]
    pub close: String,
}

impl MarkupTag {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty() && self.close.is_empty()
    }

    fn wrap_into(&self, output: &mut String, text: &str) {
        output.push_str(&self.open);
        output.push_str(text);
        output.push_str(&self.close);
    }
}

/// Markup for additions and removals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddRemTags {
    #[serde(default)]
    pub add: MarkupTag,
    #[serde(default)]
    pub rem: MarkupTag,
}

/// Renders unified diffs and line pairs with the configured markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renderer {
    file: MarkupTag,
    normal: MarkupTag,
    comment: MarkupTag,
    line: AddRemTags,
    text: AddRemTags,
    escape: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            file: MarkupTag::default(),
            normal: MarkupTag::default(),
            comment: MarkupTag::default(),
            line: AddRemTags::default(),
            text: AddRemTags::default(),
            escape: true,
        }
    }
}

impl Renderer {
    pub fn builder() -> RenderBuilder {
        RenderBuilder::new()
    }

    /// A builder starting from this renderer's configuration. Changes made
    /// through it never affect `self`.
    pub fn to_builder(&self) -> RenderBuilder {
        RenderBuilder {
            config: self.clone(),
        }
    }

    pub fn file(&self) -> &MarkupTag {
        &self.file
    }

    pub fn normal(&self) -> &MarkupTag {
        &self.normal
    }

    pub fn comment(&self) -> &MarkupTag {
        &self.comment
    }

    pub fn line(&self) -> &AddRemTags {
        &self.line
    }

    pub fn text(&self) -> &AddRemTags {
        &self.text
    }

    pub fn escapes(&self) -> bool {
        self.escape
    }

    pub(crate) fn escape_text<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.escape {
            escape_html(text)
        } else {
            Cow::Borrowed(text)
        }
    }

    /// Highlight the differences between two single lines. Removed text is
    /// wrapped in the text-removed markup in the first result, added text in
    /// the text-added markup in the second.
    pub fn render_line(&self, a: &str, b: &str) -> (String, String) {
        let mut markup_a = String::with_capacity(a.len());
        let mut markup_b = String::with_capacity(b.len());

        for segment in char_diff(a, b) {
            let text = self.escape_text(&segment.text);
            match segment.kind {
                SegmentKind::Delete => self.text.rem.wrap_into(&mut markup_a, &text),
                SegmentKind::Insert => self.text.add.wrap_into(&mut markup_b, &text),
                SegmentKind::Equal => {
                    markup_a.push_str(&text);
                    markup_b.push_str(&text);
                }
            }
        }

        (markup_a, markup_b)
    }

    /// Render a unified diff. The two header lines pass through as-is; every
    /// other line is wrapped according to its first character and the whole
    /// body is wrapped in the file markup.
    pub fn render_diff(&self, unified: &str) -> String {
        let original = split_lines(unified);
        let lines = batch::prepare_render_diff(self, &original);

        let mut markup = String::with_capacity(unified.len() * 2);
        for (idx, line) in lines.iter().enumerate() {
            if idx < batch::HEADER_LINES {
                markup.push_str(line);
            } else {
                self.line_tag(line).wrap_into(&mut markup, line);
            }
            markup.push('\n');
        }

        let capacity = markup.len() + self.file.open.len() + self.file.close.len();
        let mut output = String::with_capacity(capacity);
        self.file.wrap_into(&mut output, &markup);
        output
    }

    fn line_tag(&self, line: &str) -> &MarkupTag {
        match line.chars().next() {
            Some('+') => &self.line.add,
            Some('-') => &self.line.rem,
            Some('@' | '\\' | '#') => &self.comment,
            // context lines, empty lines and anything else
            _ => &self.normal,
        }
    }
}

// The newline terminating the final line does not start another line
fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.strip_suffix('\n').unwrap_or(text).split('\n').collect()
}

/// Builder for [`Renderer`]; every markup slot defaults to empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderBuilder {
    config: Renderer,
}

impl RenderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markup wrapping the entire rendered diff
    pub fn file(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.config.file = MarkupTag::new(open, close);
        self
    }

    /// Markup wrapping each unchanged line
    pub fn normal(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.config.normal = MarkupTag::new(open, close);
        self
    }

    /// Markup wrapping hunk headers and comment lines (`@`, `\` or `#`)
    pub fn comment(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.config.comment = MarkupTag::new(open, close);
        self
    }

    pub fn line_added(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.config.line.add = MarkupTag::new(open, close);
        self
    }

    pub fn line_removed(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.config.line.rem = MarkupTag::new(open, close);
        self
    }

    /// Markup wrapping added text within a line
    pub fn text_added(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.config.text.add = MarkupTag::new(open, close);
        self
    }

    /// Markup wrapping removed text within a line
    pub fn text_removed(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.config.text.rem = MarkupTag::new(open, close);
        self
    }

    pub fn line_tags(mut self, tags: AddRemTags) -> Self {
        self.config.line = tags;
        self
    }

    pub fn text_tags(mut self, tags: AddRemTags) -> Self {
        self.config.text = tags;
        self
    }

    /// Whether diff text is HTML-escaped before markup is applied
    pub fn escape(mut self, escape: bool) -> Self {
        self.config.escape = escape;
        self
    }

    pub fn build(self) -> Renderer {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html_renderer() -> Renderer {
        RenderBuilder::new()
            .file("<pre>", "</pre>")
            .normal("<span>", "</span>")
            .comment("<i>", "</i>")
            .line_added("<b class=add>", "</b>")
            .line_removed("<b class=rem>", "</b>")
            .text_added("<ins>", "</ins>")
            .text_removed("<del>", "</del>")
            .build()
    }

    #[test]
    fn test_render_line() {
        let (a, b) = html_renderer().render_line("hello", "hullo");

        assert_eq!(a, "h<del>e</del>llo");
        assert_eq!(b, "h<ins>u</ins>llo");
    }

    #[test]
    fn test_render_line_identical() {
        let (a, b) = html_renderer().render_line("same & same", "same & same");

        assert_eq!(a, "same &amp; same");
        assert_eq!(b, a);
    }

    #[test]
    fn test_render_diff() {
        let unified = "--- a/f\n+++ b/f\n@@ -1 +1 @@\n-hello\n+hullo\n";

        let markup = html_renderer().render_diff(unified);

        assert_eq!(
            markup,
            "<pre>--- a/f\n+++ b/f\n<i>@@ -1 +1 @@</i>\n\
             <b class=rem>-h<del>e</del>llo</b>\n\
             <b class=add>+h<ins>u</ins>llo</b>\n</pre>"
        );
    }

    #[test]
    fn test_render_diff_line_classes() {
        let unified = "--- a/f\n+++ b/f\n@@ -1,2 +1,2 @@\n context\n+added\n\\ No newline at end of file\n# note\n";

        let markup = html_renderer().render_diff(unified);

        assert!(markup.contains("<span> context</span>\n"));
        assert!(markup.contains("<b class=add>+added</b>\n"));
        assert!(markup.contains("<i>\\ No newline at end of file</i>\n"));
        assert!(markup.contains("<i># note</i>\n"));
    }

    #[test]
    fn test_empty_line_renders_as_normal() {
        let markup = html_renderer().render_diff("--- a/f\n+++ b/f\n@@ -1,2 +1,2 @@\n\n ctx\n");

        assert!(markup.contains("<span></span>\n<span> ctx</span>\n</pre>"));
    }

    #[test]
    fn test_render_empty_diff() {
        assert_eq!(html_renderer().render_diff(""), "<pre></pre>");
        assert_eq!(Renderer::default().render_diff(""), "");
    }

    #[test]
    fn test_default_renderer_only_escapes() {
        let unified = "--- a/<f>\n+++ b/<f>\n@@ -1 +1 @@\n-<a>\n+<b>\n";
        let markup = Renderer::default().render_diff(unified);

        // header lines are left untouched
        assert_eq!(markup, "--- a/<f>\n+++ b/<f>\n@@ -1 +1 @@\n-&lt;a&gt;\n+&lt;b&gt;\n");
    }

    #[test]
    fn test_escape_disabled() {
        let renderer = RenderBuilder::new().escape(false).build();
        let (a, b) = renderer.render_line("<a>", "<b>");

        assert_eq!(a, "<a>");
        assert_eq!(b, "<b>");
        assert!(!renderer.escapes());
    }

    #[test]
    fn test_clone_is_independent() {
        let original = html_renderer();
        let unified = "--- a/f\n+++ b/f\n@@ -1 +1 @@\n-hello\n+hullo\n";
        let before = original.render_diff(unified);

        let clone = original.to_builder().text_added("<em>", "</em>").file("", "").build();

        assert_eq!(original.render_diff(unified), before);
        assert_ne!(clone.render_diff(unified), before);
        assert_eq!(clone.comment(), original.comment());
        assert_eq!(clone.text().add, MarkupTag::new("<em>", "</em>"));
    }

    #[test]
    fn test_setters_can_be_repeated() {
        let renderer = RenderBuilder::new()
            .comment("1", "1")
            .comment("2", "2")
            .build();

        assert_eq!(renderer.comment(), &MarkupTag::new("2", "2"));
        assert!(renderer.normal().is_empty());
    }
}

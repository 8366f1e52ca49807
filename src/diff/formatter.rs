use std::fmt::Write;

use super::edit::{resolve_edits, ApplyError, EditSpan, LineIndex};

/// Marker emitted after a line that lacks a trailing newline
pub const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// Default number of context lines around each hunk
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// A whole-line replacement: `old` source lines become `new_lines`
#[derive(Debug, Clone)]
struct LineChange<'a> {
    old_start: usize,
    old_end: usize,
    new_lines: Vec<String>,
    old_lines: Vec<&'a str>,
}

impl LineChange<'_> {
    fn delta(&self) -> isize {
        self.new_lines.len() as isize - (self.old_end - self.old_start) as isize
    }
}

/// A unified diff hunk covering one or more line changes plus context
#[derive(Debug, Clone)]
struct Hunk<'a> {
    old_start: usize,
    old_end: usize,
    new_start: usize,
    changes: Vec<LineChange<'a>>,
}

impl Hunk<'_> {
    fn new_len(&self) -> usize {
        let old_len = (self.old_end - self.old_start) as isize;
        let delta: isize = self.changes.iter().map(LineChange::delta).sum();
        (old_len + delta) as usize
    }
}

/// Formats edits over a source text as a unified diff
pub struct DiffFormatter;

impl DiffFormatter {
    /// Render `edits` (ordered, non-overlapping) against `source` as a unified
    /// diff labelled `label_a`/`label_b`. No edits produce an empty string.
    pub fn format_unified(
        label_a: &str,
        label_b: &str,
        source: &str,
        edits: &[&EditSpan],
        context: usize,
    ) -> Result<String, ApplyError> {
        let changes = Self::line_changes(source, edits)?;
        if changes.is_empty() {
            return Ok(String::new());
        }

        let source_lines: Vec<&str> = source.split_inclusive('\n').collect();
        let hunks = Self::build_hunks(changes, source_lines.len(), context);

        let mut output = String::new();
        let _ = writeln!(output, "--- {}", label_a);
        let _ = writeln!(output, "+++ {}", label_b);

        for hunk in &hunks {
            let _ = writeln!(
                output,
                "@@ -{} +{} @@",
                Self::format_range(hunk.old_start, hunk.old_end - hunk.old_start),
                Self::format_range(hunk.new_start, hunk.new_len())
            );

            let mut line = hunk.old_start;
            for change in &hunk.changes {
                for context_line in &source_lines[line..change.old_start] {
                    Self::push_line(&mut output, ' ', context_line);
                }
                for old_line in &change.old_lines {
                    Self::push_line(&mut output, '-', old_line);
                }
                for new_line in &change.new_lines {
                    Self::push_line(&mut output, '+', new_line);
                }
                line = change.old_end;
            }
            for context_line in &source_lines[line..hunk.old_end] {
                Self::push_line(&mut output, ' ', context_line);
            }
        }

        Ok(output)
    }

    /// Widen edits to whole lines, merging edits that share a line
    fn line_changes<'a>(
        source: &'a str,
        edits: &[&EditSpan],
    ) -> Result<Vec<LineChange<'a>>, ApplyError> {
        let resolved = resolve_edits(source, edits)?;
        let index = LineIndex::new(source);

        // (widened start, widened end, edits in the cluster)
        let mut clusters: Vec<(usize, usize, Vec<usize>)> = Vec::new();
        for (idx, edit) in resolved.iter().enumerate() {
            let start = index.line_start_before(edit.start);
            let end = index.line_end_after(edit.end);
            match clusters.last_mut() {
                Some(cluster) if start < cluster.1 => {
                    cluster.1 = cluster.1.max(end);
                    cluster.2.push(idx);
                }
                _ => clusters.push((start, end, vec![idx])),
            }
        }

        let mut changes = Vec::with_capacity(clusters.len());
        for (start, end, members) in clusters {
            let mut replaced = String::with_capacity(end - start);
            let mut cursor = start;
            for member in members {
                let edit = &resolved[member];
                replaced.push_str(&source[cursor..edit.start]);
                replaced.push_str(edit.text);
                cursor = edit.end;
            }
            replaced.push_str(&source[cursor..end]);

            let old_text = &source[start..end];
            if replaced == old_text {
                continue;
            }
            changes.push(LineChange {
                old_start: index.line_of(start),
                old_end: index.line_of(start) + old_text.split_inclusive('\n').count(),
                new_lines: replaced.split_inclusive('\n').map(str::to_string).collect(),
                old_lines: old_text.split_inclusive('\n').collect(),
            });
        }

        Ok(changes)
    }

    /// Group line changes into hunks, merging those whose context overlaps
    fn build_hunks(
        changes: Vec<LineChange<'_>>,
        line_count: usize,
        context: usize,
    ) -> Vec<Hunk<'_>> {
        let mut hunks: Vec<Hunk<'_>> = Vec::new();
        let mut delta: isize = 0;

        for change in changes {
            let old_start = change.old_start.saturating_sub(context);
            let old_end = (change.old_end + context).min(line_count);
            let change_delta = change.delta();

            match hunks.last_mut() {
                Some(hunk) if old_start <= hunk.old_end => {
                    hunk.old_end = old_end.max(hunk.old_end);
                    hunk.changes.push(change);
                }
                _ => hunks.push(Hunk {
                    old_start,
                    old_end,
                    new_start: (old_start as isize + delta) as usize,
                    changes: vec![change],
                }),
            }
            delta += change_delta;
        }

        hunks
    }

    /// GNU range notation: `start` for one line, `start,len` otherwise, with
    /// an empty range anchored on the line before it
    fn format_range(start: usize, len: usize) -> String {
        match len {
            0 => format!("{},0", start),
            1 => format!("{}", start + 1),
            _ => format!("{},{}", start + 1, len),
        }
    }

    fn push_line(output: &mut String, prefix: char, line: &str) {
        output.push(prefix);
        output.push_str(line);
        if !line.ends_with('\n') {
            output.push('\n');
            output.push_str(NO_NEWLINE_MARKER);
            output.push('\n');
        }
    }
}

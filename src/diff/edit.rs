//! Edit spans over a source text and their application
//!
//! An [`EditSpan`] replaces the source text between two [`Position`]s with new
//! text. Spans handed to [`apply_edits`] must be ordered by position and must
//! not overlap.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 0-based `(line, column)` location in a source text. Columns count bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Start of the given line
    pub fn line_start(line: usize) -> Self {
        Self { line, column: 0 }
    }
}

/// A single non-overlapping replacement of `start..end` with `text`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSpan {
    pub start: Position,
    pub end: Position,
    pub text: String,
}

impl EditSpan {
    pub fn new(start: Position, end: Position, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Line the span ends on, used for grouping
    pub fn end_line(&self) -> usize {
        self.end.line
    }

    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }

    pub fn is_deletion(&self) -> bool {
        self.text.is_empty() && self.start != self.end
    }
}

/// Failure to apply a set of edits to a source text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("position {line}:{column} is outside the source text")]
    OutOfBounds { line: usize, column: usize },
    #[error("edit {index} ends before it starts")]
    Inverted { index: usize },
    #[error("edit {index} overlaps or precedes the previous edit")]
    Overlap { index: usize },
}

/// Byte offsets of every line start, used to resolve positions
#[derive(Debug, Clone)]
pub(crate) struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub(crate) fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(idx, _)| idx + 1));
        Self {
            starts,
            len: source.len(),
        }
    }

    /// Resolve a position to a byte offset, checking char boundaries
    pub(crate) fn offset(&self, source: &str, pos: Position) -> Result<usize, ApplyError> {
        let out_of_bounds = ApplyError::OutOfBounds {
            line: pos.line,
            column: pos.column,
        };
        let start = match self.starts.get(pos.line) {
            Some(&start) => start,
            // one past the last line is addressable when it is the end of text
            None if pos.line == self.starts.len() && pos.column == 0 => self.len,
            None => return Err(out_of_bounds),
        };
        let line_end = self.starts.get(pos.line + 1).copied().unwrap_or(self.len);
        let offset = start + pos.column;
        if offset > line_end || !source.is_char_boundary(offset) {
            return Err(out_of_bounds);
        }
        Ok(offset)
    }

    /// Start of the line containing `offset`
    pub(crate) fn line_start_before(&self, offset: usize) -> usize {
        self.starts[self.line_of(offset)]
    }

    /// Offset just past the line containing `offset`, or `offset` itself when
    /// it already sits on a line start
    pub(crate) fn line_end_after(&self, offset: usize) -> usize {
        let line = self.line_of(offset);
        if self.starts[line] == offset {
            return offset;
        }
        self.starts.get(line + 1).copied().unwrap_or(self.len)
    }

    pub(crate) fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        }
    }
}

/// An edit resolved to byte offsets within the source
#[derive(Debug, Clone)]
pub(crate) struct ResolvedEdit<'a> {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) text: &'a str,
}

/// Resolve edits to byte ranges, checking order and bounds
pub(crate) fn resolve_edits<'a>(
    source: &str,
    edits: &[&'a EditSpan],
) -> Result<Vec<ResolvedEdit<'a>>, ApplyError> {
    let index = LineIndex::new(source);
    let mut resolved: Vec<ResolvedEdit<'a>> = Vec::with_capacity(edits.len());

    for (idx, edit) in edits.iter().enumerate() {
        let start = index.offset(source, edit.start)?;
        let end = index.offset(source, edit.end)?;
        if end < start {
            return Err(ApplyError::Inverted { index: idx });
        }
        if let Some(prev) = resolved.last() {
            if start < prev.end {
                return Err(ApplyError::Overlap { index: idx });
            }
        }
        resolved.push(ResolvedEdit {
            start,
            end,
            text: &edit.text,
        });
    }

    Ok(resolved)
}

/// Apply ordered, non-overlapping edits to `source`
pub fn apply_edits<'a, I>(source: &str, edits: I) -> Result<String, ApplyError>
where
    I: IntoIterator<Item = &'a EditSpan>,
{
    let edits: Vec<&EditSpan> = edits.into_iter().collect();
    let resolved = resolve_edits(source, &edits)?;

    let mut output = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in resolved {
        output.push_str(&source[cursor..edit.start]);
        output.push_str(edit.text);
        cursor = edit.end;
    }
    output.push_str(&source[cursor..]);

    Ok(output)
}

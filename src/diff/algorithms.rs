use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use similar::{Algorithm, ChangeTag, TextDiff};

use super::edit::{EditSpan, Position};

/// Trait defining an edit computation interface
pub trait EditAlgorithm: Send + Sync {
    /// Compute ordered, non-overlapping line edits turning `old` into `new`
    fn compute_edits(&self, old: &str, new: &str) -> Vec<EditSpan>;

    /// Get the algorithm name
    fn name(&self) -> &'static str;

    /// Get algorithm description
    fn description(&self) -> &'static str;
}

/// Myers diff algorithm implementation
pub struct MyersAlgorithm;

impl EditAlgorithm for MyersAlgorithm {
    fn compute_edits(&self, old: &str, new: &str) -> Vec<EditSpan> {
        line_edits(Algorithm::Myers, old, new)
    }

    fn name(&self) -> &'static str {
        "Myers"
    }

    fn description(&self) -> &'static str {
        "Myers' O(ND) diff algorithm - fast and widely used"
    }
}

/// Patience diff algorithm implementation
pub struct PatienceAlgorithm;

impl EditAlgorithm for PatienceAlgorithm {
    fn compute_edits(&self, old: &str, new: &str) -> Vec<EditSpan> {
        line_edits(Algorithm::Patience, old, new)
    }

    fn name(&self) -> &'static str {
        "Patience"
    }

    fn description(&self) -> &'static str {
        "Patience diff - better for refactored code with moved blocks"
    }
}

/// LCS (Longest Common Subsequence) diff algorithm
pub struct LcsAlgorithm;

impl EditAlgorithm for LcsAlgorithm {
    fn compute_edits(&self, old: &str, new: &str) -> Vec<EditSpan> {
        line_edits(Algorithm::Lcs, old, new)
    }

    fn name(&self) -> &'static str {
        "LCS"
    }

    fn description(&self) -> &'static str {
        "Longest Common Subsequence - produces minimal diffs"
    }
}

// Every maximal run of non-equal changes becomes one line-aligned edit over
// the old text. Positions come from our own old-line cursor: the indices on
// compacted ops are not reliable for inserts.
fn line_edits(algorithm: Algorithm, old: &str, new: &str) -> Vec<EditSpan> {
    let diff = TextDiff::configure().algorithm(algorithm).diff_lines(old, new);
    let mut edits: Vec<EditSpan> = Vec::new();
    let mut pending: Option<EditSpan> = None;
    let mut old_line = 0;

    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Equal => {
                edits.extend(pending.take());
                old_line += 1;
            }
            ChangeTag::Delete => {
                let edit = pending.get_or_insert_with(|| empty_edit_at(old_line));
                old_line += 1;
                edit.end = Position::line_start(old_line);
            }
            ChangeTag::Insert => {
                let edit = pending.get_or_insert_with(|| empty_edit_at(old_line));
                edit.text.push_str(change.value());
            }
        }
    }
    edits.extend(pending);

    debug_assert!(edits.windows(2).all(|pair| pair[0].end < pair[1].start));
    edits
}

fn empty_edit_at(line: usize) -> EditSpan {
    EditSpan::new(Position::line_start(line), Position::line_start(line), String::new())
}

/// Available diff algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithmType {
    #[default]
    Myers,
    Patience,
    Lcs,
}

impl DiffAlgorithmType {
    pub fn all() -> &'static [DiffAlgorithmType] {
        &[Self::Myers, Self::Patience, Self::Lcs]
    }

    pub fn create(&self) -> Box<dyn EditAlgorithm> {
        match self {
            Self::Myers => Box::new(MyersAlgorithm),
            Self::Patience => Box::new(PatienceAlgorithm),
            Self::Lcs => Box::new(LcsAlgorithm),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Myers => "Myers",
            Self::Patience => "Patience",
            Self::Lcs => "LCS",
        }
    }
}

impl std::fmt::Display for DiffAlgorithmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DiffAlgorithmType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|algorithm| algorithm.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown diff algorithm: {}", s))
    }
}

/// Kind of a character diff segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Equal,
    Insert,
    Delete,
}

impl From<ChangeTag> for SegmentKind {
    fn from(tag: ChangeTag) -> Self {
        match tag {
            ChangeTag::Equal => Self::Equal,
            ChangeTag::Insert => Self::Insert,
            ChangeTag::Delete => Self::Delete,
        }
    }
}

/// A run of characters sharing the same diff kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

/// Character-level diff of two single lines, adjacent changes of the same
/// kind coalesced into one segment
pub fn char_diff(a: &str, b: &str) -> Vec<Segment> {
    let diff = TextDiff::from_chars(a, b);
    let mut segments: Vec<Segment> = Vec::new();

    for change in diff.iter_all_changes() {
        let kind = SegmentKind::from(change.tag());
        match segments.last_mut() {
            Some(last) if last.kind == kind => last.text.push_str(change.value()),
            _ => segments.push(Segment {
                kind,
                text: change.value().to_string(),
            }),
        }
    }

    segments
}

//! Diff computation, grouping and selective application
//!
//! A [`Diff`] holds the line edits turning a source text into a changed text.
//! Edits are clustered into groups of line-adjacent changes for navigation,
//! and any subset of them can be kept to produce a partial unified diff or a
//! partially modified text.

pub mod algorithms;
pub mod edit;
pub mod formatter;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// Re-export the main types for easier use
pub use algorithms::{
    char_diff, DiffAlgorithmType, EditAlgorithm, LcsAlgorithm, MyersAlgorithm, PatienceAlgorithm,
    Segment, SegmentKind,
};
pub use edit::{apply_edits, ApplyError, EditSpan, Position};
pub use formatter::{DiffFormatter, DEFAULT_CONTEXT_LINES, NO_NEWLINE_MARKER};

/// Options controlling how a [`Diff`] is computed and formatted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    algorithm: DiffAlgorithmType,
    context_lines: usize,
}

impl DiffOptions {
    pub fn new() -> Self {
        Self {
            algorithm: DiffAlgorithmType::default(),
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }

    pub fn algorithm(mut self, algorithm: DiffAlgorithmType) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Line statistics over a set of edits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub lines_added: usize,
    pub lines_removed: usize,
    pub edits: usize,
    pub groups: usize,
}

impl DiffStats {
    pub fn total_changes(&self) -> usize {
        self.lines_added + self.lines_removed
    }

    pub fn net_change(&self) -> isize {
        self.lines_added as isize - self.lines_removed as isize
    }
}

impl fmt::Display for DiffStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.edits == 0 {
            return write!(f, "No changes");
        }

        let plural = |n: usize| if n == 1 { "" } else { "s" };
        write!(
            f,
            "{} insertion{}, {} deletion{}, {} edit{} in {} group{}",
            self.lines_added,
            plural(self.lines_added),
            self.lines_removed,
            plural(self.lines_removed),
            self.edits,
            plural(self.edits),
            self.groups,
            plural(self.groups)
        )
    }
}

/// The edits between two texts plus the subset currently kept
#[derive(Debug, Clone)]
pub struct Diff {
    path: String,
    source: String,
    changed: String,
    edits: Vec<EditSpan>,
    keep: BTreeSet<usize>,
    groups: Vec<Vec<usize>>,
    context_lines: usize,
}

impl Diff {
    /// Compute the edits between `source` and `changed` with default options.
    /// Nothing is kept initially.
    pub fn new(
        path: impl Into<String>,
        source: impl Into<String>,
        changed: impl Into<String>,
    ) -> Self {
        Self::with_options(path, source, changed, DiffOptions::default())
    }

    pub fn with_options(
        path: impl Into<String>,
        source: impl Into<String>,
        changed: impl Into<String>,
        options: DiffOptions,
    ) -> Self {
        let path = path.into();
        let source = source.into();
        let changed = changed.into();

        let edits = options.algorithm.create().compute_edits(&source, &changed);
        let groups = group_edits(&edits);
        debug!(
            path = %path,
            algorithm = %options.algorithm,
            edits = edits.len(),
            groups = groups.len(),
            "computed diff"
        );

        Self {
            path,
            source,
            changed,
            edits,
            keep: BTreeSet::new(),
            groups,
            context_lines: options.context_lines,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn changed(&self) -> &str {
        &self.changed
    }

    pub fn edits(&self) -> &[EditSpan] {
        &self.edits
    }

    /// Total number of edits, kept or not
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Number of edits currently kept
    pub fn keep_len(&self) -> usize {
        self.keep.len()
    }

    pub fn is_kept(&self, index: usize) -> bool {
        self.keep.contains(&index)
    }

    /// Kept edit indices in ascending order
    pub fn kept_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.keep.iter().copied()
    }

    pub fn keep_all(&mut self) {
        self.keep = (0..self.edits.len()).collect();
    }

    pub fn skip_all(&mut self) {
        self.keep.clear();
    }

    /// Keep the edit at `index`, returning false when it does not exist
    pub fn keep_edit(&mut self, index: usize) -> bool {
        if index >= self.edits.len() {
            return false;
        }
        self.keep.insert(index);
        true
    }

    /// Skip the edit at `index`, returning false when it does not exist
    pub fn skip_edit(&mut self, index: usize) -> bool {
        if index >= self.edits.len() {
            return false;
        }
        self.keep.remove(&index);
        true
    }

    /// Replacement text of the edit at `index`
    pub fn get_edit(&self, index: usize) -> Option<&str> {
        self.edits.get(index).map(|edit| edit.text.as_str())
    }

    /// Replace the text of the edit at `index`. Positions and groups are
    /// unaffected.
    pub fn set_edit(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.edits.get_mut(index) {
            Some(edit) => {
                edit.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn edit_groups_len(&self) -> usize {
        self.groups.len()
    }

    /// Edit indices belonging to group `index`
    pub fn group(&self, index: usize) -> Option<&[usize]> {
        self.groups.get(index).map(Vec::as_slice)
    }

    /// Group containing the edit at `edit`
    pub fn group_of(&self, edit: usize) -> Option<usize> {
        self.groups.iter().position(|group| group.contains(&edit))
    }

    pub fn keep_group(&mut self, index: usize) {
        if let Some(group) = self.groups.get(index) {
            self.keep.extend(group.iter().copied());
        }
    }

    pub fn skip_group(&mut self, index: usize) {
        if let Some(group) = self.groups.get(index) {
            for edit in group {
                self.keep.remove(edit);
            }
        }
    }

    /// Unified diff of every edit
    pub fn unified(&self) -> String {
        self.format(self.edits.iter().collect())
    }

    /// Unified diff of the single edit at `index`, empty when out of range
    pub fn unified_edit(&self, index: usize) -> String {
        match self.edits.get(index) {
            Some(edit) => self.format(vec![edit]),
            None => String::new(),
        }
    }

    /// Unified diff of the kept edits
    pub fn unified_edits(&self) -> String {
        self.format(self.kept_edits())
    }

    /// Unified diff of the edits in group `index`, empty when out of range
    pub fn edit_group(&self, index: usize) -> String {
        match self.groups.get(index) {
            Some(group) => self.format(group.iter().map(|&idx| &self.edits[idx]).collect()),
            None => String::new(),
        }
    }

    /// The source text with only the kept edits applied
    pub fn modified_edits(&self) -> Result<String, ApplyError> {
        apply_edits(&self.source, self.kept_edits()).map_err(|err| {
            warn!(path = %self.path, error = %err, "failed to apply kept edits");
            err
        })
    }

    /// Line statistics over the kept edits
    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::default();
        let mut groups = BTreeSet::new();

        for index in self.kept_indices() {
            let edit = &self.edits[index];
            stats.edits += 1;
            stats.lines_removed += edit.end.line.saturating_sub(edit.start.line);
            stats.lines_added += edit.text.lines().count();
            if let Some(group) = self.group_of(index) {
                groups.insert(group);
            }
        }
        stats.groups = groups.len();

        stats
    }

    fn kept_edits(&self) -> Vec<&EditSpan> {
        self.keep.iter().map(|&idx| &self.edits[idx]).collect()
    }

    fn ab_paths(&self) -> (String, String) {
        if self.path.is_empty() || self.path.starts_with('/') {
            (format!("a{}", self.path), format!("b{}", self.path))
        } else {
            (format!("a/{}", self.path), format!("b/{}", self.path))
        }
    }

    fn format(&self, edits: Vec<&EditSpan>) -> String {
        let (a, b) = self.ab_paths();
        DiffFormatter::format_unified(&a, &b, &self.source, &edits, self.context_lines)
            .unwrap_or_else(|err| {
                warn!(path = %self.path, error = %err, "failed to format unified diff");
                String::new()
            })
    }
}

/// Split edits into maximal runs whose end lines are equal or consecutive
fn group_edits(edits: &[EditSpan]) -> Vec<Vec<usize>> {
    let mut groups = Vec::new();
    let mut group: Vec<usize> = Vec::new();
    let mut previous_line: Option<usize> = None;

    for (idx, edit) in edits.iter().enumerate() {
        let line = edit.end_line();
        if let Some(previous) = previous_line {
            if line != previous && line != previous + 1 {
                groups.push(std::mem::take(&mut group));
            }
        }
        group.push(idx);
        previous_line = Some(line);
    }

    if !group.is_empty() {
        groups.push(group);
    }

    groups
}

//! Pairing of removed and added line runs for intra-line highlighting
//!
//! Inside a hunk, a run of `-` lines immediately followed by a run of `+`
//! lines forms a batch. When the batch ends, the i-th removal is paired with
//! the i-th addition and both are re-rendered with character-level markup.
//! Lines without a partner keep their plain escaped form.

use super::Renderer;

/// Number of file header lines (`---`/`+++`) at the top of a unified diff
pub(crate) const HEADER_LINES: usize = 2;

/// Raw content of one removal/addition run
#[derive(Debug, Default)]
struct RenderBatch<'a> {
    removed: Vec<&'a str>,
    added: Vec<&'a str>,
}

impl<'a> RenderBatch<'a> {
    fn starting_with(removed: &'a str) -> Self {
        Self {
            removed: vec![removed],
            added: Vec::new(),
        }
    }

    /// Overwrite the paired lines in `lines`. `last_idx` is the output index
    /// just past the batch; removals were emitted before additions.
    fn flush(self, renderer: &Renderer, last_idx: usize, lines: &mut [String]) {
        let num_removed = self.removed.len();
        let num_added = self.added.len();

        for (idx, (removed, added)) in self.removed.iter().zip(&self.added).enumerate() {
            let (markup_a, markup_b) = renderer.render_line(removed, added);
            lines[last_idx - num_removed - num_added + idx] = format!("-{}", markup_a);
            lines[last_idx - num_added + idx] = format!("+{}", markup_b);
        }
    }
}

#[derive(Debug, Default)]
enum BatchState<'a> {
    #[default]
    Idle,
    Collecting(RenderBatch<'a>),
}

impl<'a> BatchState<'a> {
    fn flush(self, renderer: &Renderer, last_idx: usize, lines: &mut [String]) {
        if let Self::Collecting(batch) = self {
            batch.flush(renderer, last_idx, lines);
        }
    }
}

/// Escape every line and replace paired removal/addition lines with their
/// intra-line markup. Header lines pass through unmodified.
pub(crate) fn prepare_render_diff(renderer: &Renderer, original: &[&str]) -> Vec<String> {
    let mut lines: Vec<String> = Vec::with_capacity(original.len());
    let mut state = BatchState::Idle;

    for (idx, &line) in original.iter().enumerate() {
        if idx < HEADER_LINES {
            lines.push(line.to_string());
            continue;
        }

        let Some(first) = line.chars().next() else {
            lines.push(String::new());
            std::mem::take(&mut state).flush(renderer, idx, &mut lines);
            continue;
        };
        let rest = &line[first.len_utf8()..];
        lines.push(format!("{}{}", first, renderer.escape_text(rest)));

        state = match (std::mem::take(&mut state), first) {
            (BatchState::Idle, '-') => BatchState::Collecting(RenderBatch::starting_with(rest)),
            (BatchState::Idle, _) => BatchState::Idle,
            (BatchState::Collecting(mut batch), '-') if batch.added.is_empty() => {
                batch.removed.push(rest);
                BatchState::Collecting(batch)
            }
            (BatchState::Collecting(batch), '-') => {
                // a removal after additions starts a new run
                batch.flush(renderer, idx, &mut lines);
                BatchState::Collecting(RenderBatch::starting_with(rest))
            }
            (BatchState::Collecting(mut batch), '+') => {
                batch.added.push(rest);
                BatchState::Collecting(batch)
            }
            (BatchState::Collecting(batch), _) => {
                batch.flush(renderer, idx, &mut lines);
                BatchState::Idle
            }
        };
    }

    state.flush(renderer, original.len(), &mut lines);
    lines
}

use markdiff::diff::edit::apply_edits;
use markdiff::diff::{EditAlgorithm, MyersAlgorithm};
use markdiff::{
    ApplyError, Diff, DiffAlgorithmType, DiffOptions, EditSpan, Position, RenderBuilder, Renderer,
    Theme,
};

const SOURCE: &str = "fn main() {\n    let x = 1;\n    let y = 2;\n    println!(\"{}\", x);\n}\n\nfn helper() {\n    todo!()\n}\n";
const CHANGED: &str = "fn main() {\n    let x = 10;\n    let y = 2;\n    println!(\"{}\", x + y);\n}\n\nfn helper() -> u32 {\n    42\n}\n";

fn marker_renderer() -> Renderer {
    RenderBuilder::new()
        .comment("<c>", "</c>")
        .normal("<n>", "</n>")
        .line_added("<a>", "</a>")
        .line_removed("<r>", "</r>")
        .text_added("{+", "+}")
        .text_removed("[-", "-]")
        .file("<f>", "</f>")
        .build()
}

#[test]
fn test_len_matches_computed_edits() {
    let diff = Diff::new("src/main.rs", SOURCE, CHANGED);
    let edits = MyersAlgorithm.compute_edits(SOURCE, CHANGED);

    assert_eq!(diff.len(), edits.len());
    assert_eq!(diff.edits(), edits.as_slice());
}

#[test]
fn test_groups_are_an_exhaustive_partition() {
    let diff = Diff::new("src/main.rs", SOURCE, CHANGED);

    let flattened: Vec<usize> = (0..diff.edit_groups_len())
        .flat_map(|idx| diff.group(idx).unwrap().iter().copied())
        .collect();

    assert_eq!(flattened, (0..diff.len()).collect::<Vec<_>>());
}

#[test]
fn test_round_trip_and_identity_laws() {
    let mut diff = Diff::new("src/main.rs", SOURCE, CHANGED);

    diff.keep_all();
    assert_eq!(diff.keep_len(), diff.len());
    assert_eq!(diff.modified_edits().unwrap(), CHANGED);

    diff.skip_all();
    assert_eq!(diff.keep_len(), 0);
    assert_eq!(diff.modified_edits().unwrap(), SOURCE);
    assert!(diff.unified_edits().is_empty());
}

#[test]
fn test_keep_skip_inverse_law() {
    let mut diff = Diff::new("src/main.rs", SOURCE, CHANGED);
    diff.keep_edit(0);

    for idx in 0..diff.len() {
        let before = diff.keep_len();
        let was_kept = diff.is_kept(idx);
        assert!(diff.keep_edit(idx));
        assert!(diff.skip_edit(idx));
        if was_kept {
            diff.keep_edit(idx);
        }
        assert_eq!(diff.keep_len(), before);
    }

    assert!(!diff.keep_edit(diff.len()));
    assert!(!diff.skip_edit(diff.len()));
}

#[test]
fn test_partial_selection_by_group() {
    let mut diff = Diff::new("src/main.rs", SOURCE, CHANGED);
    // edits end on lines 2, 4 and 8
    assert_eq!(diff.edit_groups_len(), 3);

    diff.keep_group(2);
    let modified = diff.modified_edits().unwrap();

    assert!(modified.contains("fn helper() -> u32 {\n    42\n}"));
    assert!(modified.contains("let x = 1;"));
    assert_eq!(diff.unified_edits(), diff.edit_group(2));
}

#[test]
fn test_set_edit_changes_output() {
    let mut diff = Diff::new("src/main.rs", SOURCE, CHANGED);
    let last = diff.len() - 1;
    let original = diff.get_edit(last).unwrap().to_string();

    assert!(diff.set_edit(last, original.replace("42", "7")));
    diff.keep_edit(last);

    let modified = diff.modified_edits().unwrap();
    assert!(modified.contains("    7\n"));
    assert!(diff.unified_edits().contains("+    7\n"));
}

#[test]
fn test_apply_error_is_reported() {
    let edits = vec![
        EditSpan::new(Position::new(0, 0), Position::new(2, 0), ""),
        EditSpan::new(Position::new(1, 0), Position::new(1, 0), "x\n"),
    ];

    let result = apply_edits(SOURCE, &edits);
    assert_eq!(result, Err(ApplyError::Overlap { index: 1 }));
}

/// Reproducible xorshift source of small line-based texts
struct TextGen(u64);

impl TextGen {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }

    // few distinct lines so that texts share many of them
    fn text(&mut self) -> String {
        let count = self.below(11);
        let mut text: String = (0..count).map(|_| format!("{}\n", self.below(4))).collect();
        if count > 0 && self.below(5) == 0 {
            text.pop();
        }
        text
    }
}

/// Apply a unified diff produced by `Diff` back onto `source`
fn apply_unified(source: &str, unified: &str) -> String {
    let old: Vec<&str> = source.split_inclusive('\n').collect();
    let mut output = String::new();
    let mut cursor = 0;
    let mut lines = unified.split_inclusive('\n').skip(2).peekable();

    while let Some(line) = lines.next() {
        if let Some(header) = line.strip_prefix("@@ -") {
            let range = header.split(' ').next().unwrap();
            let start = match range.split_once(',') {
                Some((start, "0")) => start.parse::<usize>().unwrap(),
                Some((start, _)) => start.parse::<usize>().unwrap() - 1,
                None => range.parse::<usize>().unwrap() - 1,
            };
            old[cursor..start].iter().for_each(|line| output.push_str(line));
            cursor = start;
            continue;
        }

        let (prefix, body) = line.split_at(1);
        let mut body = body.to_string();
        if lines.peek().is_some_and(|next| next.starts_with('\\')) {
            lines.next();
            body.pop();
        }
        match prefix {
            " " => {
                output.push_str(&body);
                cursor += 1;
            }
            "-" => cursor += 1,
            "+" => output.push_str(&body),
            other => panic!("unexpected diff line prefix {:?}", other),
        }
    }
    old[cursor..].iter().for_each(|line| output.push_str(line));

    output
}

#[test]
fn test_laws_hold_for_generated_inputs() {
    let mut texts = TextGen(0x9e37_79b9_7f4a_7c15);

    for _ in 0..400 {
        let source = texts.text();
        let changed = texts.text();

        for &algorithm in DiffAlgorithmType::all() {
            let options = DiffOptions::new()
                .algorithm(algorithm)
                .context_lines(texts.below(3) as usize);
            let mut diff = Diff::with_options("f", source.as_str(), changed.as_str(), options);
            let context = format!("{} {:?} -> {:?}", algorithm, source, changed);

            let computed = algorithm.create().compute_edits(&source, &changed);
            assert_eq!(diff.len(), computed.len(), "{}", context);
            assert!(
                diff.edits().windows(2).all(|pair| pair[0].end < pair[1].start),
                "{}",
                context
            );

            let flattened: Vec<usize> = (0..diff.edit_groups_len())
                .flat_map(|idx| diff.group(idx).unwrap().iter().copied())
                .collect();
            assert_eq!(flattened, (0..diff.len()).collect::<Vec<_>>(), "{}", context);

            diff.skip_all();
            assert_eq!(diff.modified_edits().unwrap(), source, "{}", context);

            diff.keep_all();
            assert_eq!(diff.modified_edits().unwrap(), changed, "{}", context);
            assert_eq!(apply_unified(&source, &diff.unified_edits()), changed, "{}", context);

            diff.skip_all();
            for idx in 0..diff.len() {
                if texts.below(2) == 0 {
                    diff.keep_edit(idx);
                }
            }
            let modified = diff.modified_edits().unwrap();
            assert_eq!(apply_unified(&source, &diff.unified_edits()), modified, "{}", context);
        }
    }
}

#[test]
fn test_render_pairs_hello_hullo() {
    let unified = "--- a/f\n+++ b/f\n@@ -1,1 +1,1 @@\n-hello\n+hullo\n";
    let markup = marker_renderer().render_diff(unified);

    assert_eq!(
        markup,
        "<f>--- a/f\n+++ b/f\n<c>@@ -1,1 +1,1 @@</c>\n<r>-h[-e-]llo</r>\n<a>+h{+u+}llo</a>\n</f>"
    );
}

#[test]
fn test_render_two_removals_three_additions() {
    let unified = "--- a/f\n+++ b/f\n@@ -1,2 +1,3 @@\n-alpha\n-beta\n+alpha1\n+beta2\n+gamma <3\n";
    let markup = marker_renderer().render_diff(unified);

    assert!(markup.contains("<r>-alpha</r>\n"));
    assert!(markup.contains("<a>+alpha{+1+}</a>\n"));
    assert!(markup.contains("<r>-beta</r>\n"));
    assert!(markup.contains("<a>+beta{+2+}</a>\n"));
    assert!(markup.contains("<a>+gamma &lt;3</a>\n"));
}

#[test]
fn test_render_engine_output_end_to_end() {
    let mut diff = Diff::new("src/main.rs", SOURCE, CHANGED);
    diff.keep_all();

    let markup = marker_renderer().render_diff(&diff.unified_edits());

    assert!(markup.starts_with("<f>--- a/src/main.rs\n+++ b/src/main.rs\n<c>@@ "));
    assert!(markup.contains("<r>-    let x = 1;</r>"));
    assert!(markup.contains("<a>+    let x = 1{+0+};</a>"));
    assert!(markup.contains("<n>     let y = 2;</n>"));
    assert!(markup.ends_with("</f>"));
}

#[test]
fn test_clone_leaves_original_unchanged() {
    let original = Theme::Html.builder().build();
    let unified = "--- a/f\n+++ b/f\n@@ -1 +1 @@\n-hello\n+hullo\n";
    let before = original.render_diff(unified);

    let _changed = original
        .to_builder()
        .line_added("<b>", "</b>")
        .text_removed("", "")
        .build();

    assert_eq!(original.render_diff(unified), before);
}

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use markdiff::{
    cli::{Cli, OutputFormat},
    Diff, DiffStats, EditSpan, MarkDiffConfig, Theme,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = cli.validate() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    cli.setup_logging();

    let config = cli.resolve_config()?;
    let source = fs::read_to_string(&cli.old)
        .with_context(|| format!("failed to read {}", cli.old.display()))?;
    let changed = fs::read_to_string(&cli.new)
        .with_context(|| format!("failed to read {}", cli.new.display()))?;

    let mut diff = Diff::with_options(cli.label(), source, changed, config.diff.options());
    select_edits(&mut diff, &cli);
    tracing::info!("{}", diff.stats());

    let output = match cli.format {
        OutputFormat::Unified => diff.unified_edits(),
        OutputFormat::Render => render(&diff, &config, None, cli.no_color),
        OutputFormat::Ansi => render(&diff, &config, Some(Theme::Ansi), cli.no_color),
        OutputFormat::Html => render(&diff, &config, Some(Theme::Html), cli.no_color),
        OutputFormat::Modified => diff.modified_edits()?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&DiffReport::new(&diff))?;
            json.push('\n');
            json
        }
    };

    print!("{}", output);
    Ok(())
}

fn select_edits(diff: &mut Diff, cli: &Cli) {
    if !cli.has_selection() {
        diff.keep_all();
        return;
    }

    for &group in &cli.groups {
        if group >= diff.edit_groups_len() {
            tracing::warn!("no edit group {} (have {})", group, diff.edit_groups_len());
        }
        diff.keep_group(group);
    }

    for &edit in &cli.edits {
        if !diff.keep_edit(edit) {
            tracing::warn!("no edit {} (have {})", edit, diff.len());
        }
    }
}

fn render(diff: &Diff, config: &MarkDiffConfig, preset: Option<Theme>, no_color: bool) -> String {
    let builder = match preset {
        Some(Theme::Ansi) if no_color => Theme::Plain.builder(),
        Some(theme) => theme.builder(),
        None if no_color && config.theme.preset == Theme::Ansi => Theme::Plain.builder(),
        None => config.theme.builder(),
    };

    builder.build().render_diff(&diff.unified_edits())
}

#[derive(Serialize)]
struct DiffReport<'a> {
    path: &'a str,
    stats: DiffStats,
    edits: Vec<EditReport<'a>>,
    groups: Vec<&'a [usize]>,
}

#[derive(Serialize)]
struct EditReport<'a> {
    index: usize,
    kept: bool,
    group: Option<usize>,
    #[serde(flatten)]
    span: &'a EditSpan,
}

impl<'a> DiffReport<'a> {
    fn new(diff: &'a Diff) -> Self {
        let edits = diff
            .edits()
            .iter()
            .enumerate()
            .map(|(index, span)| EditReport {
                index,
                kept: diff.is_kept(index),
                group: diff.group_of(index),
                span,
            })
            .collect();
        let groups = (0..diff.edit_groups_len())
            .filter_map(|idx| diff.group(idx))
            .collect();

        Self {
            path: diff.path(),
            stats: diff.stats(),
            edits,
            groups,
        }
    }
}

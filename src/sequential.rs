use crate::importer::{ArchiveReader, JsonArchiveReader};
use crate::process::{flatten_mapping, matching};
use crate::renderer::{self, Entry};
use crate::utils::{
    ExtractConfig, ExtractSummary, RunOutcome, discover_archives, load_targets, relative_to,
};
use eyre::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;

/// The main entry point for the extraction: reads archives from disk as JSON.
pub fn execute(config: &ExtractConfig) -> Result<RunOutcome> {
    run_with(&JsonArchiveReader, config)
}

/// Runs the whole pipeline against any archive reader.
/// Abort conditions come back as `RunOutcome` variants; only I/O failures
/// outside a single archive are errors.
pub fn run_with<R: ArchiveReader>(reader: &R, config: &ExtractConfig) -> Result<RunOutcome> {
    if !config.targets_path.exists() {
        return Ok(RunOutcome::MissingTargets(config.targets_path.clone()));
    }
    let targets = load_targets(&config.targets_path)?;
    if targets.is_empty() {
        return Ok(RunOutcome::EmptyTargets(config.targets_path.clone()));
    }

    let archives = discover_archives(&config.archive_dir, &config.pattern)?;
    if archives.is_empty() {
        return Ok(RunOutcome::NoArchives {
            pattern: config.pattern.clone(),
        });
    }

    let pb = progress_bar(archives.len() as u64, config.quiet);

    let mut entries: Vec<Entry> = Vec::new();
    let mut count_errors = 0usize;

    for path in &archives {
        let shown = relative_to(path, &config.archive_dir);
        if !config.quiet {
            pb.suspend(|| println!("Loading {}...", shown.display()));
        }
        let conversations = match reader.read(path) {
            Ok(c) => c,
            Err(e) => {
                count_errors += 1;
                pb.suspend(|| eprintln!("Error loading {}: {:#}", shown.display(), e));
                pb.inc(1);
                continue;
            }
        };

        for conv in matching(&conversations, &targets) {
            let messages = flatten_mapping(&conv.mapping);
            tracing::debug!(
                title = conv.title(),
                kept = messages.len(),
                nodes = conv.mapping.len(),
                "flattened conversation"
            );
            entries.push(Entry {
                title: conv.title().to_string(),
                messages,
            });
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    if entries.is_empty() {
        return Ok(RunOutcome::NoMatches {
            failed_archives: count_errors,
        });
    }

    write_output(&config.output_path, &entries, config)?;

    let output_path = fs::canonicalize(&config.output_path)
        .unwrap_or_else(|_| config.output_path.clone());
    tracing::debug!(path = %output_path.display(), "wrote output");

    Ok(RunOutcome::Written(ExtractSummary {
        conversations: entries.len(),
        messages: entries.iter().map(|e| e.messages.len()).sum(),
        failed_archives: count_errors,
        output_path,
    }))
}

fn progress_bar(len: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
    {
        bar.set_style(style.progress_chars("=>-"));
    }
    bar
}

fn write_output(path: &Path, entries: &[Entry], config: &ExtractConfig) -> Result<()> {
    let mut buf: Vec<u8> = Vec::new();
    renderer::write_document(&mut buf, entries, config.style)
        .wrap_err("Failed to render markdown")?;
    fs::write(path, buf).wrap_err_with(|| format!("Failed to write: {}", path.display()))
}

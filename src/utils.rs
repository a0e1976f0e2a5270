use crate::renderer::RenderStyle;
use eyre::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TARGETS_FILE: &str = "targets.txt";
pub const DEFAULT_ARCHIVE_PATTERN: &str = "conversations-00*.json";
pub const DEFAULT_OUTPUT_FILE: &str = "Extracted_ChatGPT_Chats.md";

/// Configuration required to run the extraction.
/// This decouples the logic from how the arguments were parsed (CLI/Config file).
#[derive(Clone, Debug)]
pub struct ExtractConfig {
    pub targets_path: PathBuf,
    /// Directory searched for archives.
    pub archive_dir: PathBuf,
    pub pattern: String,
    pub output_path: PathBuf,
    pub style: RenderStyle,
    pub quiet: bool,
}

impl ExtractConfig {
    /// Default file names, all resolved inside `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            targets_path: dir.join(DEFAULT_TARGETS_FILE),
            output_path: dir.join(DEFAULT_OUTPUT_FILE),
            archive_dir: dir,
            pattern: DEFAULT_ARCHIVE_PATTERN.to_string(),
            style: RenderStyle::default(),
            quiet: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractSummary {
    pub conversations: usize,
    pub messages: usize,
    pub failed_archives: usize,
    pub output_path: PathBuf,
}

/// How a run ended. Only `Written` produces an output file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Written(ExtractSummary),
    MissingTargets(PathBuf),
    EmptyTargets(PathBuf),
    NoArchives { pattern: String },
    NoMatches { failed_archives: usize },
}

/// Read the title allow-list: one title per line, trimmed, blank lines ignored.
/// A missing file yields an empty set.
pub fn load_targets(path: &Path) -> Result<HashSet<String>> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "target file not found");
        return Ok(HashSet::new());
    }
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read targets: {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

/// `path` with the `dir` prefix removed, for console output.
/// Paths outside `dir` are returned unchanged.
pub fn relative_to<'a>(path: &'a Path, dir: &Path) -> &'a Path {
    path.strip_prefix(dir).unwrap_or(path)
}

/// Files in `dir` matching `pattern`.
pub fn discover_archives(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let full = Path::new(&escaped_dir).join(pattern);
    let full = full.to_string_lossy();
    let mut paths = Vec::new();
    for entry in glob::glob(&full).wrap_err_with(|| format!("Invalid archive pattern: {full}"))? {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "skipping unreadable path"),
        }
    }
    tracing::debug!(count = paths.len(), pattern = %full, "discovered archives");
    Ok(paths)
}

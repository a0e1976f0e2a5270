use chat_extract::renderer::RenderStyle;
use chat_extract::sequential;
use chat_extract::utils::{ExtractConfig, RunOutcome};
use clap::Parser;
use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Extract selected ChatGPT conversations into one Markdown file.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the export archives, targets.txt and the output.
    /// Defaults to the current directory.
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// File listing the conversation titles to extract, one per line.
    #[arg(long, value_name = "PATH")]
    targets: Option<PathBuf>,

    /// Glob pattern for archive files inside DIR.
    #[arg(long, value_name = "GLOB")]
    pattern: Option<String>,

    /// Markdown file to write.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Output layout.
    #[arg(long, value_enum)]
    style: Option<RenderStyle>,

    /// Path to a specific configuration file.
    /// Defaults to $XDG_CONFIG_HOME/chat-extract/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print debug diagnostics.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress progress and success output.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Deserialize, Default)]
struct FileConfig {
    targets: Option<PathBuf>,
    pattern: Option<String>,
    output: Option<PathBuf>,
    style: Option<RenderStyle>,
}

fn load_file_config(explicit_path: Option<&Path>) -> Result<FileConfig> {
    let path = if let Some(p) = explicit_path {
        if !p.exists() {
            return Err(eyre!("Config file not found: {}", p.display()));
        }
        Some(p.to_path_buf())
    } else {
        dirs::config_dir()
            .map(|d| d.join("chat-extract/config.toml"))
            .filter(|p| p.exists())
    };

    match path {
        None => Ok(FileConfig::default()),
        Some(p) => {
            let content = fs::read_to_string(&p)
                .wrap_err_with(|| format!("Failed to read config: {}", p.display()))?;
            toml::from_str(&content)
                .wrap_err_with(|| format!("Failed to parse config: {}", p.display()))
        }
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .compact()
        .try_init()
        .map_err(|e| eyre!(e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    // 1. Load config file (CLI path > default path)
    let file_cfg = load_file_config(cli.config.as_deref())?;

    // 2. Start from the defaults inside DIR
    let dir = cli.dir.unwrap_or_else(|| PathBuf::from("."));
    let mut config = ExtractConfig::in_dir(dir.clone());
    config.quiet = cli.quiet;

    // 3. Override each setting (CLI > Config), relative paths inside DIR
    if let Some(targets) = cli.targets.or(file_cfg.targets) {
        config.targets_path = dir.join(targets);
    }
    if let Some(output) = cli.output.or(file_cfg.output) {
        config.output_path = dir.join(output);
    }
    if let Some(pattern) = cli.pattern.or(file_cfg.pattern) {
        config.pattern = pattern;
    }
    if let Some(style) = cli.style.or(file_cfg.style) {
        config.style = style;
    }

    // 4. Run the Business Logic
    let outcome = sequential::execute(&config)?;
    report(&outcome, config.quiet);
    Ok(())
}

fn report(outcome: &RunOutcome, quiet: bool) {
    match outcome {
        RunOutcome::Written(summary) => {
            if summary.failed_archives > 0 {
                eprintln!(
                    "Warning: {} archive(s) could not be loaded.",
                    summary.failed_archives
                );
            }
            if !quiet {
                println!(
                    "\n✅ Success! {} matching conversations extracted ({} messages).",
                    summary.conversations, summary.messages
                );
                println!("Saved to: {}", summary.output_path.display());
            }
        }
        RunOutcome::MissingTargets(path) => {
            eprintln!(
                "Error: '{}' not found. Please create it and add your chat titles.",
                path.display()
            );
        }
        RunOutcome::EmptyTargets(path) => {
            eprintln!("No titles found in '{}'.", path.display());
        }
        RunOutcome::NoArchives { pattern } => {
            eprintln!("Error: No '{}' files found.", pattern);
        }
        RunOutcome::NoMatches { .. } => {
            eprintln!("\nNo matching conversations found. Check your targets.txt and JSON files.");
        }
    }
}

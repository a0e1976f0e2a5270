use crate::process::{FlatMessage, Speaker};
use chrono::{Local, TimeZone};
use clap::ValueEnum;
use regex::Regex;
use serde::Deserialize;
use std::io::Write;
use std::sync::LazyLock;

pub const UNKNOWN_TIME: &str = "Unknown Time";

/// Layout of the generated document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// `**User:**` / `**ChatGPT:**` labels, no table of contents.
    Plain,
    /// Table of contents, plus a heading with time and emoji per message.
    #[default]
    Timestamped,
}

/// One selected conversation, ready to be written.
#[derive(Clone, Debug)]
pub struct Entry {
    pub title: String,
    pub messages: Vec<FlatMessage>,
}

static NON_ANCHOR_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SEPARATOR_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s-]+").unwrap());

/// GitHub-style heading anchor: lowercase, punctuation stripped, whitespace and
/// hyphen runs collapsed to one `-`, no leading/trailing `-`.
pub fn anchor_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = NON_ANCHOR_CHARS.replace_all(&lowered, "");
    let collapsed = SEPARATOR_RUNS.replace_all(&stripped, "-");
    collapsed.trim_matches('-').to_string()
}

/// `YYYY-MM-DD HH:MM:SS` in local time, or `Unknown Time` for a zero timestamp.
pub fn format_timestamp(create_time: f64) -> String {
    if create_time == 0.0 || !create_time.is_finite() {
        return UNKNOWN_TIME.to_string();
    }
    let secs = create_time.floor();
    let nanos = ((create_time - secs) * 1e9) as u32;
    match Local.timestamp_opt(secs as i64, nanos.min(999_999_999)).earliest() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => UNKNOWN_TIME.to_string(),
    }
}

pub fn write_toc<W: Write>(writer: &mut W, entries: &[Entry]) -> std::io::Result<()> {
    writeln!(writer, "## Table of Contents")?;
    writeln!(writer)?;
    for (i, entry) in entries.iter().enumerate() {
        writeln!(writer, "{}. [{}](#{})", i + 1, entry.title, anchor_slug(&entry.title))?;
    }
    writeln!(writer)?;
    writeln!(writer, "---")?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_entry<W: Write>(
    writer: &mut W,
    entry: &Entry,
    style: RenderStyle,
) -> std::io::Result<()> {
    writeln!(writer, "# {}", entry.title)?;
    writeln!(writer)?;

    for msg in &entry.messages {
        match style {
            RenderStyle::Plain => {
                let sender = match msg.speaker {
                    Speaker::User => "User",
                    Speaker::Assistant => "ChatGPT",
                };
                writeln!(writer, "**{}:**", sender)?;
                writeln!(writer, "{}", msg.text)?;
            }
            RenderStyle::Timestamped => {
                let label = match msg.speaker {
                    Speaker::User => "👤 You asked",
                    Speaker::Assistant => "🤖 ChatGPT replied",
                };
                writeln!(
                    writer,
                    "### {} ({})",
                    label,
                    format_timestamp(msg.create_time)
                )?;
                writeln!(writer)?;
                writeln!(writer, "{}", msg.text)?;
            }
        }
        writeln!(writer)?;
    }

    writeln!(writer, "---")?;
    writeln!(writer)?;
    Ok(())
}

/// The whole output document: TOC first for the timestamped style.
pub fn write_document<W: Write>(
    writer: &mut W,
    entries: &[Entry],
    style: RenderStyle,
) -> std::io::Result<()> {
    if style == RenderStyle::Timestamped {
        write_toc(writer, entries)?;
    }
    for entry in entries {
        write_entry(writer, entry, style)?;
    }
    Ok(())
}

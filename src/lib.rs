//! # chat-extract
//!
//! A CLI tool that pulls selected conversations out of a ChatGPT data export and
//! writes them to a single Markdown file.
//!
//! ## What it does
//!
//! A ChatGPT export ships one or more `conversations-00*.json` archives. Each one is
//! an array of conversations whose messages live in a `mapping` of nodes. This tool
//! reads the titles listed in `targets.txt`, finds those conversations across every
//! archive, keeps the user and assistant turns in chronological order, and renders
//! them as Markdown with a table of contents.
//!
//! Input files are only ever read. The output file is overwritten on every run, and
//! identical inputs produce byte-identical output.
//!
//! ## Usage
//!
//! ```sh
//! # Run inside the unpacked export, next to targets.txt
//! chat-extract
//!
//! # Point at another directory and use the plain layout
//! chat-extract ~/Downloads/chatgpt-export --style plain -o ~/notes/chats.md
//! ```
//!
//! Preferences can be persisted in `~/.config/chat-extract/config.toml`.
//!
//! ## Compatibility
//!
//! Tracks the (undocumented) ChatGPT export format. Unknown fields are ignored and
//! non-text content parts such as images are skipped.

pub mod importer;
pub mod process;
pub mod renderer;
pub mod sequential;
pub mod utils;

//! Type definitions for the ChatGPT data export (`conversations-00*.json`).
//!
//! Each archive is a JSON array of conversation records:
//! ```json
//! [
//!   {
//!     "title": "Trip Planning",
//!     "mapping": {
//!       "<node id>": {
//!         "id": "<node id>",
//!         "parent": "<node id>" | null,
//!         "children": ["<node id>", ...],
//!         "message": {
//!           "author": { "role": "user" | "assistant" | "system" | "tool" },
//!           "create_time": 1700000000.123 | null,
//!           "content": { "content_type": "text", "parts": ["...", {...}] }
//!         } | null
//!       }
//!     }
//!   }
//! ]
//! ```
//!
//! Only the fields the extractor reads are modelled. `parent`/`children` form a
//! tree in the export, but the mapping is consumed as a flat, ordered bag of nodes.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use eyre::{Context, Result};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Author role of a message node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub role: Option<Role>,
}

// ---------------------------------------------------------------------------
// Message payload
// ---------------------------------------------------------------------------

/// Message content. `parts` mixes plain strings with embedded objects
/// (image pointers, code execution results, ...), so it stays untyped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Content {
    #[serde(default, deserialize_with = "null_as_default")]
    pub parts: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagePayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: Author,
    /// Seconds since the Unix epoch, possibly fractional.
    #[serde(default)]
    pub create_time: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Content,
}

impl MessagePayload {
    pub fn role(&self) -> Option<Role> {
        self.author.role
    }

    /// Concatenation of the string-typed parts. Anything else is dropped.
    pub fn text(&self) -> String {
        self.content
            .parts
            .iter()
            .filter_map(serde_json::Value::as_str)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Nodes and conversations
// ---------------------------------------------------------------------------

/// One entry of a conversation's mapping. Structural nodes (the root, for
/// example) carry no message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub message: Option<MessagePayload>,
}

/// `(node id, node)` pairs in the order the keys appear in the archive.
pub type Mapping = Vec<(String, Node)>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Conversation {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "ordered_mapping")]
    pub mapping: Mapping,
}

impl Conversation {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a JSON object into a `Vec` of entries, keeping key order.
/// Ids are unique in the result. `null` yields an empty mapping.
fn ordered_mapping<'de, D>(deserializer: D) -> Result<Mapping, D::Error>
where
    D: Deserializer<'de>,
{
    struct MappingVisitor;

    impl<'de> Visitor<'de> for MappingVisitor {
        type Value = Mapping;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of node id to node")
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Mapping, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<Mapping, E> {
            Ok(Vec::new())
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Mapping, D2::Error> {
            d.deserialize_map(self)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Mapping, A::Error> {
            let mut entries: Mapping = Vec::with_capacity(access.size_hint().unwrap_or(0));
            let mut positions: HashMap<String, usize> = HashMap::new();
            while let Some((id, node)) = access.next_entry::<String, Node>()? {
                // A repeated id keeps its first position and takes the last value.
                match positions.get(&id) {
                    Some(&i) => entries[i].1 = node,
                    None => {
                        positions.insert(id.clone(), entries.len());
                        entries.push((id, node));
                    }
                }
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_option(MappingVisitor)
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

/// Source of conversation records for one archive path.
pub trait ArchiveReader {
    fn read(&self, path: &Path) -> Result<Vec<Conversation>>;
}

/// Reads an archive file as a JSON array of conversations.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonArchiveReader;

impl ArchiveReader for JsonArchiveReader {
    fn read(&self, path: &Path) -> Result<Vec<Conversation>> {
        let json = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to open archive: {}", path.display()))?;
        parse_archive(&json)
            .wrap_err_with(|| format!("Failed to parse archive: {}", path.display()))
    }
}

pub fn parse_archive(json: &str) -> Result<Vec<Conversation>> {
    serde_json::from_str(json).wrap_err("Failed to parse archive JSON")
}

use crate::importer::{Conversation, Mapping, Role};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    fn from_role(role: Role) -> Option<Self> {
        match role {
            Role::User => Some(Self::User),
            Role::Assistant => Some(Self::Assistant),
            Role::System | Role::Tool | Role::Other => None,
        }
    }
}

/// A message that survived flattening: a user or assistant turn with
/// non-blank text.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatMessage {
    pub speaker: Speaker,
    /// Seconds since the epoch; `0.0` when the export has no timestamp.
    pub create_time: f64,
    pub text: String,
}

/// Conversations whose title is an exact member of `targets`, in archive order.
pub fn matching<'a>(
    conversations: &'a [Conversation],
    targets: &'a HashSet<String>,
) -> impl Iterator<Item = &'a Conversation> + 'a {
    conversations
        .iter()
        .filter(move |conv| targets.contains(conv.title()))
}

/// Turn a node mapping into the chronological list of user/assistant messages.
///
/// Nodes are visited in mapping order and edges are ignored. The sort is stable,
/// so messages sharing a timestamp keep that order.
pub fn flatten_mapping(mapping: &Mapping) -> Vec<FlatMessage> {
    let mut messages: Vec<FlatMessage> = mapping
        .iter()
        .filter_map(|(_, node)| {
            let msg = node.message.as_ref()?;
            let speaker = msg.role().and_then(Speaker::from_role)?;
            let text = msg.text();
            if text.trim().is_empty() {
                return None;
            }
            Some(FlatMessage {
                speaker,
                create_time: msg.create_time.unwrap_or(0.0),
                text,
            })
        })
        .collect();

    messages.sort_by(|a, b| a.create_time.total_cmp(&b.create_time));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::parse_archive;

    fn node(id: &str, role: &str, time: &str, parts: &str) -> String {
        format!(
            r#""{id}": {{"message": {{"author": {{"role": "{role}"}}, "create_time": {time}, "content": {{"parts": {parts}}}}}}}"#
        )
    }

    fn conversation(title: &str, nodes: &[String]) -> Conversation {
        let json = format!(
            r#"[{{"title": "{title}", "mapping": {{"root": {{"message": null}}, {}}}}}]"#,
            nodes.join(", ")
        );
        parse_archive(&json).unwrap().remove(0)
    }

    #[test]
    fn sorts_by_timestamp() {
        let conv = conversation(
            "t",
            &[
                node("c", "user", "3", r#"["three"]"#),
                node("a", "assistant", "1", r#"["one"]"#),
                node("b", "user", "2", r#"["two"]"#),
            ],
        );
        let texts: Vec<String> = flatten_mapping(&conv.mapping)
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, ["one", "two", "three"]);
    }

    #[test]
    fn equal_timestamps_keep_encounter_order() {
        let conv = conversation(
            "t",
            &[
                node("z", "user", "null", r#"["first"]"#),
                node("y", "assistant", "5", r#"["late"]"#),
                node("x", "assistant", "null", r#"["second"]"#),
            ],
        );
        let flat = flatten_mapping(&conv.mapping);
        let texts: Vec<&str> = flat.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "late"]);
        assert_eq!(flat[0].create_time, 0.0);
    }

    #[test]
    fn drops_other_roles_and_blank_text() {
        let conv = conversation(
            "t",
            &[
                node("s", "system", "1", r#"["You are ChatGPT"]"#),
                node("t", "tool", "2", r#"["search results"]"#),
                node("u", "user", "3", r#"["  \n "]"#),
                node("v", "assistant", "4", r#"[{"content_type": "image_asset_pointer"}]"#),
                node("w", "assistant", "5", r#"["kept"]"#),
            ],
        );
        let flat = flatten_mapping(&conv.mapping);
        assert_eq!(
            flat,
            [FlatMessage {
                speaker: Speaker::Assistant,
                create_time: 5.0,
                text: "kept".into(),
            }]
        );
    }

    #[test]
    fn repeated_node_id_keeps_last_value_only() {
        let conv = conversation(
            "t",
            &[
                node("a", "user", "1", r#"["old"]"#),
                node("b", "assistant", "2", r#"["reply"]"#),
                node("a", "user", "3", r#"["new"]"#),
            ],
        );
        let ids: Vec<&str> = conv.mapping.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["root", "a", "b"]);

        let texts: Vec<String> = flatten_mapping(&conv.mapping)
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, ["reply", "new"]);
    }

    #[test]
    fn text_is_not_trimmed() {
        let conv = conversation("t", &[node("a", "user", "1", r#"[" hi ", 3, "there\n"]"#)]);
        assert_eq!(flatten_mapping(&conv.mapping)[0].text, " hi there\n");
    }

    #[test]
    fn matching_uses_exact_titles() {
        let json = r#"[
            {"title": "Trip Planning", "mapping": {}},
            {"title": "trip planning", "mapping": {}},
            {"mapping": {}},
            {"title": "Trip Planning", "mapping": {}}
        ]"#;
        let convs = parse_archive(json).unwrap();
        let targets: HashSet<String> = ["Trip Planning".to_string()].into();
        assert_eq!(matching(&convs, &targets).count(), 2);
    }
}

//! Turns raw backend chat replies into a [`ChatResult`].
//!
//! Extraction is an ordered list of pure strategies; the first one that yields
//! non-empty text wins.

use llmapi_backend_api::{ChatReply, ReplyMessage, TypedChatReply};
use serde_json::{Map, Value};
use thiserror::Error;

/// Nesting depth shown in structure dumps.
const MAX_DESCRIBE_DEPTH: usize = 3;

/// Canonical successful output of a chat call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResult {
    text: String,
}

impl ChatResult {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized response format: {observed_type} (structure: {structure})")]
pub struct UnrecognizedResponseShape {
    pub observed_type: String,
    pub structure: String,
}

type Strategy = fn(&ChatReply) -> Option<&str>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("mapping.message.content", mapping_message_content),
    ("typed.message.content", typed_message_content),
    ("typed.message[content]", typed_message_mapping),
];

pub fn normalize(reply: &ChatReply) -> Result<ChatResult, UnrecognizedResponseShape> {
    for (name, strategy) in STRATEGIES {
        if let Some(text) = strategy(reply).filter(|text| !text.is_empty()) {
            tracing::trace!("Reply content extracted via {}", name);
            return Ok(ChatResult {
                text: text.to_string(),
            });
        }
    }

    Err(UnrecognizedResponseShape {
        observed_type: observed_type(reply),
        structure: describe_reply(reply),
    })
}

fn mapping_message_content(reply: &ChatReply) -> Option<&str> {
    match reply {
        ChatReply::Document(Value::Object(map)) => map
            .get("message")?
            .as_object()?
            .get("content")?
            .as_str(),
        _ => None,
    }
}

fn typed_message_content(reply: &ChatReply) -> Option<&str> {
    match reply {
        ChatReply::Typed(TypedChatReply {
            message: ReplyMessage::Typed(message),
            ..
        }) => Some(message.content.as_str()),
        _ => None,
    }
}

fn typed_message_mapping(reply: &ChatReply) -> Option<&str> {
    match reply {
        ChatReply::Typed(TypedChatReply {
            message: ReplyMessage::Mapping(map),
            ..
        }) => map.get("content")?.as_str(),
        _ => None,
    }
}

fn observed_type(reply: &ChatReply) -> String {
    match reply {
        ChatReply::Document(value) => format!("document({})", value_kind(value)),
        ChatReply::Typed(TypedChatReply {
            message: ReplyMessage::Typed(_),
            ..
        }) => "typed(message: typed)".to_string(),
        ChatReply::Typed(TypedChatReply {
            message: ReplyMessage::Mapping(_),
            ..
        }) => "typed(message: mapping)".to_string(),
    }
}

fn describe_reply(reply: &ChatReply) -> String {
    match reply {
        ChatReply::Document(value) => describe(value, 0),
        ChatReply::Typed(typed) => {
            let message = match &typed.message {
                ReplyMessage::Typed(msg) => format!(
                    "{{role: {:?}, content: string({} chars)}}",
                    msg.role,
                    msg.content.chars().count()
                ),
                ReplyMessage::Mapping(map) => describe_map(map, 1),
            };
            format!(
                "{{model: {:?}, message: {}, done: {:?}}}",
                typed.model, message, typed.done
            )
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn describe(value: &Value, depth: usize) -> String {
    match value {
        Value::Object(map) => describe_map(map, depth),
        Value::Array(items) => format!("array({} items)", items.len()),
        Value::String(s) => format!("string({} chars)", s.chars().count()),
        other => value_kind(other).to_string(),
    }
}

fn describe_map(map: &Map<String, Value>, depth: usize) -> String {
    if depth >= MAX_DESCRIBE_DEPTH {
        return format!("object({} keys)", map.len());
    }
    let fields: Vec<String> = map
        .iter()
        .map(|(key, value)| format!("{}: {}", key, describe(value, depth + 1)))
        .collect();
    format!("{{{}}}", fields.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmapi_backend_api::AssistantMessage;
    use serde_json::json;

    fn typed(message: ReplyMessage) -> ChatReply {
        ChatReply::Typed(TypedChatReply {
            model: Some("llama3".to_string()),
            message,
            done: Some(true),
        })
    }

    #[test]
    fn mapping_with_nested_mapping() {
        let reply = ChatReply::Document(json!({"message": {"content": "hi"}}));
        assert_eq!(normalize(&reply).unwrap().text(), "hi");
    }

    #[test]
    fn typed_message_object() {
        let reply = typed(ReplyMessage::Typed(AssistantMessage {
            role: "assistant".to_string(),
            content: "hi".to_string(),
        }));
        assert_eq!(normalize(&reply).unwrap().text(), "hi");
    }

    #[test]
    fn typed_reply_with_mapping_message() {
        let map = json!({"content": "hi", "thinking": ""});
        let reply = typed(ReplyMessage::Mapping(map.as_object().unwrap().clone()));
        assert_eq!(normalize(&reply).unwrap().into_text(), "hi");
    }

    #[test]
    fn missing_content_is_unrecognized() {
        let reply = ChatReply::Document(json!({"message": {}}));
        let err = normalize(&reply).unwrap_err();
        assert_eq!(err.observed_type, "document(object)");
        assert_eq!(err.structure, "{message: {}}");
    }

    #[test]
    fn empty_content_is_rejected() {
        let reply = ChatReply::Document(json!({"message": {"content": ""}}));
        let err = normalize(&reply).unwrap_err();
        assert!(err.structure.contains("content: string(0 chars)"));

        let reply = typed(ReplyMessage::Typed(AssistantMessage {
            role: "assistant".to_string(),
            content: String::new(),
        }));
        assert!(normalize(&reply).is_err());
    }

    #[test]
    fn non_string_content_is_unrecognized() {
        let reply = ChatReply::Document(json!({"message": {"content": ["a", "b"]}}));
        let err = normalize(&reply).unwrap_err();
        assert!(err.structure.contains("content: array(2 items)"));
    }

    #[test]
    fn non_object_document_reports_kind() {
        let reply = ChatReply::Document(json!(["unexpected"]));
        let err = normalize(&reply).unwrap_err();
        assert_eq!(err.observed_type, "document(array)");
        assert!(err.to_string().contains("array(1 items)"));
    }

    #[test]
    fn deep_structures_are_truncated() {
        let reply = ChatReply::Document(json!({"a": {"b": {"c": {"d": 1}}}}));
        let err = normalize(&reply).unwrap_err();
        assert_eq!(err.structure, "{a: {b: {c: object(1 keys)}}}");
    }
}

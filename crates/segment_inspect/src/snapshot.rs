use std::fs;
use std::path::Path;

use message_parts::{decode_message, Message};
use segment_view::{render_conversation, MediaIndex, MessageView, PlaceholderMaps, ViewOptions};
use serde_json::Value;

use crate::error::InspectError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub messages: Vec<Message>,
    /// Explicit maps from the snapshot; they win over derived entries.
    pub maps: PlaceholderMaps,
}

impl Snapshot {
    pub fn from_value(value: &Value) -> Result<Self, InspectError> {
        match value {
            Value::Array(items) => Ok(Self {
                messages: decode_messages(items)?,
                maps: PlaceholderMaps::default(),
            }),
            Value::Object(object) => {
                let maps = match object.get("maps") {
                    None | Some(Value::Null) => PlaceholderMaps::default(),
                    Some(maps) => serde_json::from_value(maps.clone())
                        .map_err(|source| InspectError::Maps { source })?,
                };
                let messages = match (object.get("messages"), object.get("message")) {
                    (Some(Value::Array(items)), _) => decode_messages(items)?,
                    (Some(other), _) => {
                        return Err(InspectError::UnexpectedShape {
                            expected: "array of messages",
                            found: json_kind(other),
                        })
                    }
                    (None, Some(message)) => decode_messages(std::slice::from_ref(message))?,
                    (None, None) => decode_messages(std::slice::from_ref(value))?,
                };
                Ok(Self { messages, maps })
            }
            other => Err(InspectError::UnexpectedShape {
                expected: "object or array",
                found: json_kind(other),
            }),
        }
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }

    /// Maps derived from the whole conversation with the explicit maps on top.
    pub fn conversation_maps(&self) -> PlaceholderMaps {
        let mut maps = MediaIndex::from_messages(&self.messages);
        maps.merge(self.maps.clone());
        maps
    }
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot, InspectError> {
    let raw = fs::read_to_string(path).map_err(|source| InspectError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str::<Value>(&raw).map_err(|source| InspectError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot = Snapshot::from_value(&value)?;
    tracing::debug!(
        path = %path.display(),
        messages = snapshot.messages.len(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

pub fn render_snapshot(snapshot: &Snapshot, options: &ViewOptions) -> Vec<MessageView> {
    render_conversation(&snapshot.messages, snapshot.maps.clone(), options)
}

fn decode_messages(items: &[Value]) -> Result<Vec<Message>, InspectError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            decode_message(item).map_err(|source| InspectError::Message { index, source })
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

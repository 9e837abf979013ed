use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::{FileAttachment, Message, Part, Role, ToolCall, ToolResult};

#[derive(Debug, Error)]
pub enum PartDecodeError {
    #[error("failed to parse JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("{what} must be a JSON {expected}, found {found}")]
    UnexpectedShape {
        what: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("message is missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("message has unsupported role '{role}'")]
    UnsupportedRole { role: String },
}

/// Parses a JSON part list in one shot.
pub fn decode_parts_str(input: &str) -> Result<Vec<Part>, PartDecodeError> {
    let value = serde_json::from_str::<Value>(input).map_err(PartDecodeError::Json)?;
    decode_parts(&value)
}

/// Decodes a wire part list.
///
/// Only the top-level shape can fail. Elements that are not objects or carry an
/// unknown `type` are skipped so a live stream keeps rendering.
pub fn decode_parts(value: &Value) -> Result<Vec<Part>, PartDecodeError> {
    let Some(items) = value.as_array() else {
        return Err(PartDecodeError::UnexpectedShape {
            what: "part list",
            expected: "array",
            found: json_kind(value),
        });
    };

    let mut parts = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if !item.is_object() {
            tracing::warn!(index, found = json_kind(item), "skipping non-object part");
            continue;
        }
        parts.extend(decode_part(item));
    }
    Ok(parts)
}

/// Maps one wire part object to zero, one, or two parts.
///
/// The combined `tool-<name>` shape carries both the call input and, once
/// finished, its output; it expands to a call followed by a result.
pub fn decode_part(value: &Value) -> Vec<Part> {
    let Some(part_type) = value.get("type").and_then(Value::as_str) else {
        tracing::debug!("skipping part without a type");
        return Vec::new();
    };

    match part_type {
        "text" => vec![Part::Text {
            text: str_field(value, "text").unwrap_or_default(),
        }],
        "reasoning" => vec![Part::Reasoning {
            text: str_field(value, "text")
                .or_else(|| str_field(value, "reasoningText"))
                .unwrap_or_default(),
        }],
        "tool-call" => {
            let Some(tool_call_id) = str_field(value, "toolCallId") else {
                tracing::warn!("skipping tool-call part without toolCallId");
                return Vec::new();
            };
            let tool_name = str_field(value, "toolName").unwrap_or_default();
            let args = value
                .get("args")
                .or_else(|| value.get("input"))
                .cloned()
                .unwrap_or_else(empty_object);
            vec![Part::ToolCall(ToolCall::new(tool_call_id, tool_name, args))]
        }
        "tool-result" => {
            let Some(tool_call_id) = str_field(value, "toolCallId") else {
                tracing::warn!("skipping tool-result part without toolCallId");
                return Vec::new();
            };
            let result = value
                .get("result")
                .or_else(|| value.get("output"))
                .cloned()
                .unwrap_or(Value::Null);
            vec![Part::ToolResult(ToolResult {
                tool_call_id,
                tool_name: str_field(value, "toolName"),
                result,
            })]
        }
        "file" | "image" => decode_file(value).map(Part::File).into_iter().collect(),
        other => {
            if let Some(tool_name) = other.strip_prefix("tool-") {
                return decode_combined_tool(tool_name, value);
            }
            if let Some(kind) = other.strip_prefix("data-") {
                return vec![Part::Data {
                    kind: kind.to_string(),
                    payload: value.get("data").cloned().unwrap_or(Value::Null),
                }];
            }
            tracing::debug!(part_type = other, "skipping unknown part type");
            Vec::new()
        }
    }
}

fn decode_combined_tool(tool_name: &str, value: &Value) -> Vec<Part> {
    let (Some(tool_call_id), Some(input)) = (str_field(value, "toolCallId"), value.get("input"))
    else {
        tracing::debug!(tool_name, "skipping tool part without toolCallId/input");
        return Vec::new();
    };

    let mut parts = vec![Part::ToolCall(ToolCall::new(
        tool_call_id.clone(),
        tool_name,
        input.clone(),
    ))];
    let result = match value.get("output").filter(|output| !output.is_null()) {
        Some(output) => Some(output.clone()),
        // `output-error` parts carry only the message.
        None => str_field(value, "errorText")
            .map(|error| json!({"success": false, "error": error})),
    };
    if let Some(result) = result {
        parts.push(Part::ToolResult(ToolResult {
            tool_call_id,
            tool_name: Some(tool_name.to_string()),
            result,
        }));
    }
    parts
}

fn decode_file(value: &Value) -> Option<FileAttachment> {
    let url = str_field(value, "url")
        .or_else(|| str_field(value, "data"))
        .or_else(|| str_field(value, "image"))?;
    let media_type = str_field(value, "mediaType").unwrap_or_else(|| {
        if value.get("type").and_then(Value::as_str) == Some("image") {
            "image/*".to_string()
        } else {
            "application/octet-stream".to_string()
        }
    });
    let filename = str_field(value, "filename").or_else(|| str_field(value, "name"));
    Some(FileAttachment {
        url,
        media_type,
        filename,
    })
}

/// Attachment recorded on a stored message: `{ url, contentType?, fileType?, name? }`.
fn decode_stored_attachment(value: &Value) -> Option<FileAttachment> {
    let url = str_field(value, "url")?;
    let media_type = str_field(value, "contentType").unwrap_or_else(|| {
        if value.get("fileType").and_then(Value::as_str) == Some("image") {
            "image/*".to_string()
        } else {
            "application/octet-stream".to_string()
        }
    });
    Some(FileAttachment {
        url,
        media_type,
        filename: str_field(value, "name"),
    })
}

/// Decodes one wire message: `{ id, role, parts?, content?, hasTrailingContent? }`.
///
/// Stored messages may also carry `experimental_attachments` and `tool_results`.
pub fn decode_message(value: &Value) -> Result<Message, PartDecodeError> {
    if !value.is_object() {
        return Err(PartDecodeError::UnexpectedShape {
            what: "message",
            expected: "object",
            found: json_kind(value),
        });
    }

    let id = str_field(value, "id").ok_or(PartDecodeError::MissingField { field: "id" })?;
    let role_name =
        str_field(value, "role").ok_or(PartDecodeError::MissingField { field: "role" })?;
    let role =
        Role::parse(&role_name).ok_or(PartDecodeError::UnsupportedRole { role: role_name })?;
    let parts = match value.get("parts") {
        None | Some(Value::Null) => None,
        Some(parts) => Some(decode_parts(parts)?),
    };

    Ok(Message {
        id,
        role,
        parts,
        content: str_field(value, "content").unwrap_or_default(),
        has_trailing_content: value
            .get("hasTrailingContent")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        stored_attachments: value
            .get("experimental_attachments")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(decode_stored_attachment).collect())
            .unwrap_or_default(),
        tool_results: value
            .get("tool_results")
            .filter(|results| results.is_object())
            .cloned(),
    })
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn empty_object() -> Value {
    Value::Object(Map::new())
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

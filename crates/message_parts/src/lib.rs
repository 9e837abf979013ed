//! Provider-neutral message part contract shared by the segment pipeline.
//!
//! This crate defines only the arrival-ordered part stream for one message and
//! the tolerant wire decoder for it. It excludes classification, placeholder
//! resolution, and any rendering concerns.

mod decode;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use decode::{decode_message, decode_part, decode_parts, decode_parts_str, PartDecodeError};

/// Identifier shared by a tool call and its result within one message.
pub type ToolCallId = String;

/// Tool name used when a result arrives without any call record.
pub const UNKNOWN_TOOL_NAME: &str = "unknown";

/// One tool invocation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool_call_id: ToolCallId,
    pub tool_name: String,
    pub args: Value,
}

impl ToolCall {
    #[must_use]
    pub fn new(
        tool_call_id: impl Into<ToolCallId>,
        tool_name: impl Into<String>,
        args: impl Into<Value>,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            args: args.into(),
        }
    }

    /// Minimal call record for a result that arrived without its call.
    #[must_use]
    pub fn synthesized(result: &ToolResult) -> Self {
        Self {
            tool_call_id: result.tool_call_id.clone(),
            tool_name: result
                .tool_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_TOOL_NAME.to_string()),
            args: Value::Object(serde_json::Map::new()),
        }
    }
}

/// Tool output matched back to its call through `tool_call_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: ToolCallId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    pub result: Value,
}

impl ToolResult {
    #[must_use]
    pub fn new(tool_call_id: impl Into<ToolCallId>, result: impl Into<Value>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: None,
            result: result.into(),
        }
    }

    #[must_use]
    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }
}

/// User attachment carried alongside the text parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttachment {
    pub url: String,
    pub media_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl FileAttachment {
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// One atomic unit of the raw agent output stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    Text { text: String },
    ToolCall(ToolCall),
    ToolResult(ToolResult),
    Reasoning { text: String },
    /// Progress/completion side channel; informational only.
    Data { kind: String, payload: Value },
    File(FileAttachment),
}

impl Part {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    #[must_use]
    pub fn reasoning(text: impl Into<String>) -> Self {
        Self::Reasoning { text: text.into() }
    }

    #[must_use]
    pub fn tool_call(
        tool_call_id: impl Into<ToolCallId>,
        tool_name: impl Into<String>,
        args: impl Into<Value>,
    ) -> Self {
        Self::ToolCall(ToolCall::new(tool_call_id, tool_name, args))
    }

    #[must_use]
    pub fn tool_result(tool_call_id: impl Into<ToolCallId>, result: impl Into<Value>) -> Self {
        Self::ToolResult(ToolResult::new(tool_call_id, result))
    }

    #[must_use]
    pub fn data(kind: impl Into<String>, payload: impl Into<Value>) -> Self {
        Self::Data {
            kind: kind.into(),
            payload: payload.into(),
        }
    }

    /// Returns the stable kind label used in logs.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::ToolCall(_) => "tool_call",
            Self::ToolResult(_) => "tool_result",
            Self::Reasoning { .. } => "reasoning",
            Self::Data { .. } => "data",
            Self::File(_) => "file",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "user" => Self::User,
            "assistant" => Self::Assistant,
            "system" => Self::System,
            "tool" => Self::Tool,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
            Self::Tool => "tool",
        }
    }
}

/// One conversation message as handed over by the transport collaborator.
///
/// `parts` is `None` when only the flattened final text survived (for example
/// a message loaded from storage without its part history).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<Part>>,
    #[serde(default)]
    pub content: String,
    /// Structured content rendered after the segments (summaries, follow-ups).
    #[serde(default)]
    pub has_trailing_content: bool,
    /// Attachments recorded beside the message rather than as file parts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stored_attachments: Vec<FileAttachment>,
    /// Per-tool result lists persisted with a stored message, keyed like
    /// `seedreamImageResults` or `grokVideoResults`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_results: Option<Value>,
}

impl Message {
    #[must_use]
    pub fn from_parts(id: impl Into<String>, role: Role, parts: Vec<Part>) -> Self {
        Self {
            id: id.into(),
            role,
            parts: Some(parts),
            content: String::new(),
            has_trailing_content: false,
            stored_attachments: Vec::new(),
            tool_results: None,
        }
    }

    #[must_use]
    pub fn from_text(id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            parts: None,
            content: content.into(),
            has_trailing_content: false,
            stored_attachments: Vec::new(),
            tool_results: None,
        }
    }

    #[must_use]
    pub fn with_trailing_content(mut self, has_trailing_content: bool) -> Self {
        self.has_trailing_content = has_trailing_content;
        self
    }

    #[must_use]
    pub fn with_stored_attachments(mut self, attachments: Vec<FileAttachment>) -> Self {
        self.stored_attachments = attachments;
        self
    }

    #[must_use]
    pub fn with_tool_results(mut self, tool_results: Value) -> Self {
        self.tool_results = Some(tool_results);
        self
    }

    /// Returns true when raw per-part history is available.
    #[must_use]
    pub fn has_part_history(&self) -> bool {
        self.parts.as_ref().is_some_and(|parts| !parts.is_empty())
    }

    #[must_use]
    pub fn parts(&self) -> &[Part] {
        self.parts.as_deref().unwrap_or(&[])
    }

    /// Flattened text: `content` when present, otherwise the concatenated text parts.
    #[must_use]
    pub fn flattened_text(&self) -> String {
        if !self.content.is_empty() {
            return self.content.clone();
        }

        self.parts()
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Attachments in arrival order.
    pub fn attachments(&self) -> impl Iterator<Item = &FileAttachment> {
        self.parts().iter().filter_map(|part| match part {
            Part::File(file) => Some(file),
            _ => None,
        })
    }

    /// Uploaded images: the stored list when it holds more images than the
    /// file parts, otherwise the file parts.
    #[must_use]
    pub fn uploaded_images(&self) -> Vec<&FileAttachment> {
        let from_parts: Vec<&FileAttachment> =
            self.attachments().filter(|file| file.is_image()).collect();
        let stored: Vec<&FileAttachment> = self
            .stored_attachments
            .iter()
            .filter(|file| file.is_image())
            .collect();
        if stored.len() > from_parts.len() {
            stored
        } else {
            from_parts
        }
    }
}

//! Part classification and per-segment derivations.
//!
//! [`classify`] turns the arrival-ordered part list into segments; the
//! remaining modules work on tool segments ([`expand`], [`describe`]) or on
//! the flattened display list ([`tails`], [`mode`]).

pub mod classify;
pub mod describe;
pub mod expand;
pub mod mode;
pub mod tails;
pub mod tool_kind;

use message_parts::ToolCall;
use serde::Serialize;
use serde_json::Value;

pub use classify::{classify, classify_with, is_prefix_consistent, ClassifyOptions};

/// Tool call together with its result; `result == None` means still running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolSegment {
    pub call: ToolCall,
    pub result: Option<Value>,
}

impl ToolSegment {
    pub fn is_pending(&self) -> bool {
        self.result.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Text { content: String },
    Tool(ToolSegment),
    /// Routed to the info panel; never part of the display list.
    Reasoning { content: String },
}

impl Segment {
    pub fn is_display(&self) -> bool {
        !matches!(self, Self::Reasoning { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub segments: Vec<Segment>,
    /// True when the segments came from raw per-part history.
    pub interleaved: bool,
}

impl Classification {
    pub fn display_segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|segment| segment.is_display())
    }

    pub fn display_count(&self) -> usize {
        self.display_segments().count()
    }

    pub fn reasoning(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Reasoning { content } => Some(content.as_str()),
            _ => None,
        })
    }
}

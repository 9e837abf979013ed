//! Deterministic display segments for streaming agent messages.
//!
//! Invariant: every operation is a pure function of its inputs. The same part
//! list and maps always produce the same (`PartialEq`) view, so callers can
//! recompute from scratch on every streamed part.
//!
//! # Public API Overview
//! - Classify raw parts into segments with [`classify`].
//! - Rewrite media placeholders with [`resolve`]; split user upload references with
//!   [`split_upload_chips`].
//! - Fan multi-value tool calls out into units with [`expand`] and group them with
//!   [`compute_tails`].
//! - Render a whole message in one call with [`render_message`], or a conversation with
//!   [`render_conversation`] (maps derived through [`MediaIndex`]).

pub mod config;
pub mod logging;

pub mod core;
pub mod media;
pub mod resolve;
pub mod segment;
pub mod view;

/// Wire-level part model.
pub use message_parts::{
    decode_message, decode_parts, FileAttachment, Message, Part, PartDecodeError, Role, ToolCall,
    ToolResult,
};

/// Lookup maps and placeholder scanning.
pub use crate::core::maps::{ImageOutput, PlaceholderMaps, UploadedImage, VideoEntry};
pub use crate::core::text::placeholder::{scan, scan_prose, Placeholder, PlaceholderKind, TagForm};

/// Placeholder resolution.
pub use crate::resolve::{resolve, split_upload_chips, InlineRun, ResolveOptions, UnresolvedPolicy};

/// Segment classification and derivations.
pub use crate::segment::classify::{classify, classify_with, is_prefix_consistent, ClassifyOptions};
pub use crate::segment::describe::{describe, ToolDescriptor, ToolStatus};
pub use crate::segment::expand::{expand, ExpansionAxis, ResultMatch, ToolUnit};
pub use crate::segment::mode::{select_mode, Mode};
pub use crate::segment::tails::{compute_tails, resolve_tails, Collapsible, Tail};
pub use crate::segment::tool_kind::{CollapseClass, ToolKind};
pub use crate::segment::{Classification, Segment, ToolSegment};

/// Conversation media index and the message view pipeline.
pub use crate::media::MediaIndex;
pub use crate::view::{
    render_conversation, render_message, DisplayBody, DisplayItem, MessageView, TextBlock,
    ViewOptions,
};

/// Environment configuration.
pub use crate::config::EnvConfig;

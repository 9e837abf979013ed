//! Message to display view: the full pipeline in one call.
//!
//! Parts are classified, text segments resolved, tool segments expanded and
//! described, and the flattened list annotated with bubble tails. Messages
//! without usable part history fall back to one aggregated text block.

use message_parts::{FileAttachment, Message, Role};
use serde::{Deserialize, Serialize};

use crate::core::maps::PlaceholderMaps;
use crate::media::MediaIndex;
use crate::resolve::{resolve, split_upload_chips, InlineRun, ResolveOptions};
use crate::segment::classify::{classify_with, ClassifyOptions};
use crate::segment::describe::{describe, ToolDescriptor};
use crate::segment::expand::{expand, ToolUnit};
use crate::segment::mode::{mode_for, Mode};
use crate::segment::tails::{resolve_tails, Collapsible};
use crate::segment::tool_kind::CollapseClass;
use crate::segment::Segment;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewOptions {
    pub resolve: ResolveOptions,
    pub classify: ClassifyOptions,
}

/// Resolved text; `chips` is filled for user text that references uploads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextBlock {
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chips: Vec<InlineRun>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayBody {
    Text(TextBlock),
    Tool {
        unit: ToolUnit,
        descriptor: ToolDescriptor,
    },
}

impl Collapsible for DisplayBody {
    fn collapse_class(&self) -> Option<CollapseClass> {
        match self {
            Self::Text(_) => None,
            Self::Tool { unit, .. } => unit.kind().collapse_class(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayItem {
    #[serde(flatten)]
    pub body: DisplayBody,
    pub terminator: bool,
    pub is_last: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    pub id: String,
    pub role: Role,
    pub mode: Mode,
    pub items: Vec<DisplayItem>,
    pub reasoning: Vec<String>,
    pub attachments: Vec<FileAttachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregated: Option<TextBlock>,
}

pub fn render_message(
    message: &Message,
    maps: &PlaceholderMaps,
    options: &ViewOptions,
) -> MessageView {
    let classification = classify_with(message.parts(), &options.classify);
    let mode = mode_for(message, &classification);
    let attachments: Vec<FileAttachment> = message.attachments().cloned().collect();
    let reasoning = classification.reasoning().map(ToString::to_string).collect();

    let (items, aggregated) = match mode {
        Mode::Interleaved => {
            let bodies: Vec<DisplayBody> = classification
                .segments
                .iter()
                .flat_map(|segment| display_bodies(segment, message.role, maps, options))
                .collect();
            let has_trailing_content = message.has_trailing_content || !attachments.is_empty();
            let items = resolve_tails(&bodies, has_trailing_content)
                .into_iter()
                .zip(bodies)
                .map(|(tail, body)| DisplayItem {
                    body,
                    terminator: tail.terminator,
                    is_last: tail.is_last,
                })
                .collect();
            (items, None)
        }
        Mode::Aggregated => {
            let text = message.flattened_text();
            let block = (!text.trim().is_empty())
                .then(|| text_block(&text, message.role, maps, &options.resolve));
            (Vec::new(), block)
        }
    };

    tracing::trace!(
        message_id = %message.id,
        ?mode,
        segments = classification.segments.len(),
        "rendered message view"
    );

    MessageView {
        id: message.id.clone(),
        role: message.role,
        mode,
        items,
        reasoning,
        attachments,
        aggregated,
    }
}

/// Renders every message against maps derived from the whole conversation,
/// with `overrides` layered on top.
pub fn render_conversation(
    messages: &[Message],
    overrides: PlaceholderMaps,
    options: &ViewOptions,
) -> Vec<MessageView> {
    let mut maps = MediaIndex::from_messages(messages);
    maps.merge(overrides);
    messages
        .iter()
        .map(|message| render_message(message, &maps, options))
        .collect()
}

fn display_bodies(
    segment: &Segment,
    role: Role,
    maps: &PlaceholderMaps,
    options: &ViewOptions,
) -> Vec<DisplayBody> {
    match segment {
        Segment::Text { content } => vec![DisplayBody::Text(text_block(
            content,
            role,
            maps,
            &options.resolve,
        ))],
        Segment::Tool(tool) => expand(&tool.call, tool.result.as_ref())
            .into_iter()
            .map(|unit| DisplayBody::Tool {
                descriptor: describe(&unit),
                unit,
            })
            .collect(),
        Segment::Reasoning { .. } => Vec::new(),
    }
}

fn text_block(
    text: &str,
    role: Role,
    maps: &PlaceholderMaps,
    options: &ResolveOptions,
) -> TextBlock {
    let content = resolve(text, maps, options);
    let chips = if role == Role::User {
        let runs = split_upload_chips(&content, maps);
        if runs.iter().any(|run| matches!(run, InlineRun::Chip { .. })) {
            runs
        } else {
            Vec::new()
        }
    } else {
        Vec::new()
    };
    TextBlock { content, chips }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use message_parts::{FileAttachment, Message, Part, Role};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{render_conversation, render_message, DisplayBody, ViewOptions};
    use crate::core::maps::PlaceholderMaps;
    use crate::resolve::InlineRun;
    use crate::segment::mode::Mode;

    #[test]
    fn interleaved_view_flattens_expanded_units_with_tails() {
        let message = Message::from_parts(
            "m1",
            Role::Assistant,
            vec![
                Part::text("Looking it up. [LINK_ID:a]"),
                Part::tool_call("t1", "web_search", json!({"queries": ["q1", "q2"]})),
                Part::tool_call("t2", "read_file", json!({"path": "notes.md"})),
                Part::reasoning("checking"),
                Part::text("Done."),
            ],
        );
        let maps = PlaceholderMaps::new().with_link("a", "https://a.dev");

        let view = render_message(&message, &maps, &ViewOptions::default());

        assert_eq!(view.mode, Mode::Interleaved);
        assert_eq!(view.items.len(), 5);
        assert_matches!(&view.items[0].body, DisplayBody::Text(block) if block.content == "Looking it up. https://a.dev");
        let tails: Vec<_> = view.items.iter().map(|item| (item.terminator, item.is_last)).collect();
        assert_eq!(
            tails,
            vec![
                (true, false),
                (false, false),
                (true, false),
                (true, false),
                (true, true),
            ]
        );
        assert_eq!(view.reasoning, vec!["checking"]);
        assert!(view.aggregated.is_none());
    }

    #[test]
    fn attachments_clear_is_last() {
        let message = Message::from_parts(
            "m1",
            Role::User,
            vec![
                Part::text("what is this?"),
                Part::File(FileAttachment {
                    url: "https://u/a.png".to_string(),
                    media_type: "image/png".to_string(),
                    filename: None,
                }),
            ],
        );

        let view = render_message(&message, &PlaceholderMaps::new(), &ViewOptions::default());
        assert_eq!(view.attachments.len(), 1);
        assert!(view.items.iter().all(|item| !item.is_last));
    }

    #[test]
    fn aggregated_view_resolves_flattened_text() {
        let message = Message::from_text("m1", Role::Assistant, "See [IMAGE_ID:x]");
        let maps = PlaceholderMaps::new().with_image("x", "https://i/x.png");

        let view = render_message(&message, &maps, &ViewOptions::default());

        assert_eq!(view.mode, Mode::Aggregated);
        assert!(view.items.is_empty());
        assert_eq!(
            view.aggregated.map(|block| block.content),
            Some("See ![](https://i/x.png)".to_string())
        );
    }

    #[test]
    fn conversation_maps_resolve_later_references_and_user_chips() {
        let user = Message::from_parts(
            "u1",
            Role::User,
            vec![
                Part::File(FileAttachment {
                    url: "https://u/cat.png".to_string(),
                    media_type: "image/png".to_string(),
                    filename: Some("cat.png".to_string()),
                }),
                Part::text("make uploaded_image_1 blue"),
            ],
        );
        let assistant = Message::from_parts(
            "a1",
            Role::Assistant,
            vec![
                Part::tool_call("t1", "qwen_image_edit", json!({"prompt": "blue cat"})),
                Part::tool_result("t1", json!({"imageUrl": "https://i/blue.png", "path": "out/blue_cat.png"})),
                Part::text("Here: [IMAGE_ID:blue_cat]"),
            ],
        );

        let views = render_conversation(&[user, assistant], PlaceholderMaps::new(), &ViewOptions::default());

        assert_matches!(
            &views[0].items[0].body,
            DisplayBody::Text(block) if block.chips.iter().any(|run| matches!(run, InlineRun::Chip { label, .. } if label == "cat.png"))
        );
        assert_matches!(
            &views[1].items[1].body,
            DisplayBody::Text(block) if block.content == "Here: ![](https://i/blue.png)"
        );
    }
}

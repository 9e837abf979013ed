//! Part-by-part replay of a recorded message.
//!
//! Every prefix of the part list is rendered as a live client would see it
//! mid-stream, and each frame records whether its segments extend the
//! previous frame's segments without rewriting them.

use message_parts::Message;
use segment_view::{
    classify_with, is_prefix_consistent, render_message, Classification, MessageView,
    PlaceholderMaps, ViewOptions,
};
use serde::Serialize;

use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamFrame {
    /// Number of parts received so far.
    pub parts: usize,
    pub stable: bool,
    pub view: MessageView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageReplay {
    pub id: String,
    pub frames: Vec<StreamFrame>,
}

impl MessageReplay {
    pub fn is_stable(&self) -> bool {
        self.frames.iter().all(|frame| frame.stable)
    }
}

pub fn replay(message: &Message, maps: &PlaceholderMaps, options: &ViewOptions) -> Vec<StreamFrame> {
    let parts = message.parts();
    if parts.is_empty() {
        return vec![StreamFrame {
            parts: 0,
            stable: true,
            view: render_message(message, maps, options),
        }];
    }

    let mut previous: Option<Classification> = None;
    (1..=parts.len())
        .map(|received| {
            let prefix = Message::from_parts(
                message.id.clone(),
                message.role,
                parts[..received].to_vec(),
            )
            .with_trailing_content(message.has_trailing_content);
            let classification = classify_with(prefix.parts(), &options.classify);
            let stable = previous.as_ref().map_or(true, |earlier| {
                is_prefix_consistent(&earlier.segments, &classification.segments)
            });
            if !stable {
                tracing::warn!(
                    message_id = %message.id,
                    parts = received,
                    "streamed prefix rewrote earlier segments"
                );
            }
            previous = Some(classification);
            StreamFrame {
                parts: received,
                stable,
                view: render_message(&prefix, maps, options),
            }
        })
        .collect()
}

/// Replays every message against the snapshot's conversation maps.
pub fn replay_snapshot(snapshot: &Snapshot, options: &ViewOptions) -> Vec<MessageReplay> {
    let maps = snapshot.conversation_maps();
    snapshot
        .messages
        .iter()
        .map(|message| MessageReplay {
            id: message.id.clone(),
            frames: replay(message, &maps, options),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use message_parts::{Message, Part, Role};
    use pretty_assertions::assert_eq;
    use segment_view::{ClassifyOptions, PlaceholderMaps, ViewOptions};
    use serde_json::json;

    use super::replay;

    fn streamed() -> Message {
        Message::from_parts(
            "m1",
            Role::Assistant,
            vec![
                Part::text("Let me check the docs for that feature."),
                Part::tool_call("t1", "web_search", json!({"query": "rust"})),
                Part::tool_result("t1", json!({"searches": []})),
                Part::text("Let me check the docs for that feature."),
            ],
        )
    }

    #[test]
    fn default_options_keep_every_frame_stable() {
        let frames = replay(&streamed(), &PlaceholderMaps::new(), &ViewOptions::default());

        assert_eq!(frames.len(), 4);
        assert!(frames.iter().all(|frame| frame.stable));
        assert_eq!(frames.iter().map(|frame| frame.parts).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(frames[3].view.items.len(), 3);
    }

    #[test]
    fn repeat_suppression_still_replays_every_prefix() {
        let options = ViewOptions {
            classify: ClassifyOptions {
                suppress_repeats: true,
            },
            ..ViewOptions::default()
        };

        let frames = replay(&streamed(), &PlaceholderMaps::new(), &options);
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[3].view.items.len(), 2);
    }

    #[test]
    fn message_without_parts_yields_one_frame() {
        let message = Message::from_text("m1", Role::Assistant, "final answer");
        let frames = replay(&message, &PlaceholderMaps::new(), &ViewOptions::default());

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].parts, 0);
        assert!(frames[0].stable);
    }
}

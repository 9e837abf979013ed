use message_parts::Message;
use serde::Serialize;

use super::classify::{classify_with, ClassifyOptions};
use super::Classification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// One rendered block per display segment.
    Interleaved,
    /// One block over the flattened text.
    Aggregated,
}

/// Interleaved iff part history exists and yields at least one display segment.
pub fn select_mode(message: &Message) -> Mode {
    let classification = classify_with(message.parts(), &ClassifyOptions::default());
    mode_for(message, &classification)
}

/// [`select_mode`] for a message that was already classified.
pub fn mode_for(message: &Message, classification: &Classification) -> Mode {
    if message.has_part_history() && classification.display_count() > 0 {
        Mode::Interleaved
    } else {
        Mode::Aggregated
    }
}

//! Arrival-ordered parts to display segments.
//!
//! Rules:
//! - consecutive text parts collapse into one text segment;
//! - a tool call closes the open text and opens a tool segment keyed by its id;
//! - a tool result attaches to the segment with the same id wherever it is,
//!   or synthesizes a call at the current position;
//! - reasoning closes the open text; consecutive reasoning deltas collapse;
//! - data and file parts are transparent.
//!
//! A text buffer holding only whitespace is not emitted; it carries over into
//! the next text segment.

use std::collections::{BTreeMap, BTreeSet};

use message_parts::{Part, ToolCall, ToolResult, UNKNOWN_TOOL_NAME};
use serde::{Deserialize, Serialize};

use super::{Classification, Segment, ToolSegment};

/// Minimum trimmed length for a text repeated anywhere earlier to be dropped.
const MODEL_LOOP_MIN_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyOptions {
    /// Drop repeated text segments and identical repeated tool calls.
    ///
    /// Enabling this gives up the stable-prefix property: a growing trailing
    /// text can turn into a repeat and vanish.
    pub suppress_repeats: bool,
}

pub fn classify(parts: &[Part]) -> Classification {
    classify_with(parts, &ClassifyOptions::default())
}

pub fn classify_with(parts: &[Part], options: &ClassifyOptions) -> Classification {
    let mut builder = SegmentBuilder::new(*options);
    for part in parts {
        builder.push(part);
    }
    builder.finish(!parts.is_empty())
}

#[derive(Debug)]
struct SegmentBuilder {
    options: ClassifyOptions,
    segments: Vec<Segment>,
    text: String,
    tool_index: BTreeMap<String, usize>,
    seen_texts: BTreeSet<String>,
    seen_calls: BTreeSet<(String, String)>,
    suppressed_calls: BTreeSet<String>,
}

impl SegmentBuilder {
    fn new(options: ClassifyOptions) -> Self {
        Self {
            options,
            segments: Vec::new(),
            text: String::new(),
            tool_index: BTreeMap::new(),
            seen_texts: BTreeSet::new(),
            seen_calls: BTreeSet::new(),
            suppressed_calls: BTreeSet::new(),
        }
    }

    fn push(&mut self, part: &Part) {
        match part {
            Part::Text { text } => self.text.push_str(text),
            Part::ToolCall(call) => self.push_call(call),
            Part::ToolResult(result) => self.push_result(result),
            Part::Reasoning { text } => self.push_reasoning(text),
            Part::Data { .. } | Part::File(_) => {}
        }
    }

    fn push_call(&mut self, call: &ToolCall) {
        self.flush_text();

        if let Some(&index) = self.tool_index.get(&call.tool_call_id) {
            tracing::debug!(
                tool_call_id = %call.tool_call_id,
                tool_name = %call.tool_name,
                "merging duplicate tool call into its first segment"
            );
            if let Some(Segment::Tool(segment)) = self.segments.get_mut(index) {
                merge_into_synthesized(&mut segment.call, call);
            }
            return;
        }

        if self.options.suppress_repeats {
            let key = (call.tool_name.clone(), call.args.to_string());
            if !self.seen_calls.insert(key) {
                tracing::debug!(tool_call_id = %call.tool_call_id, "suppressing repeated tool call");
                self.suppressed_calls.insert(call.tool_call_id.clone());
                return;
            }
        }

        self.open_tool(ToolSegment {
            call: call.clone(),
            result: None,
        });
    }

    fn push_result(&mut self, result: &ToolResult) {
        if self.suppressed_calls.contains(&result.tool_call_id) {
            return;
        }

        if let Some(&index) = self.tool_index.get(&result.tool_call_id) {
            if let Some(Segment::Tool(segment)) = self.segments.get_mut(index) {
                segment.result = Some(result.result.clone());
            }
            return;
        }

        tracing::debug!(
            tool_call_id = %result.tool_call_id,
            "tool result without a call; synthesizing one"
        );
        self.flush_text();
        self.open_tool(ToolSegment {
            call: ToolCall::synthesized(result),
            result: Some(result.result.clone()),
        });
    }

    fn push_reasoning(&mut self, text: &str) {
        self.flush_text();
        if let Some(Segment::Reasoning { content }) = self.segments.last_mut() {
            content.push_str(text);
            return;
        }
        self.segments.push(Segment::Reasoning {
            content: text.to_string(),
        });
    }

    fn open_tool(&mut self, segment: ToolSegment) {
        self.tool_index
            .insert(segment.call.tool_call_id.clone(), self.segments.len());
        self.segments.push(Segment::Tool(segment));
    }

    fn flush_text(&mut self) {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            return;
        }

        if self.options.suppress_repeats && self.is_repeat(trimmed) {
            tracing::debug!(chars = trimmed.len(), "suppressing repeated text segment");
            self.text.clear();
            return;
        }

        self.seen_texts.insert(trimmed.to_string());
        let content = std::mem::take(&mut self.text);
        self.segments.push(Segment::Text { content });
    }

    fn is_repeat(&self, trimmed: &str) -> bool {
        let repeats_previous = self
            .segments
            .iter()
            .rev()
            .find(|segment| segment.is_display())
            .is_some_and(|segment| {
                matches!(segment, Segment::Text { content } if content.trim() == trimmed)
            });
        let loops =
            trimmed.chars().count() > MODEL_LOOP_MIN_CHARS && self.seen_texts.contains(trimmed);
        repeats_previous || loops
    }

    fn finish(mut self, interleaved: bool) -> Classification {
        self.flush_text();
        Classification {
            segments: self.segments,
            interleaved,
        }
    }
}

/// Fills a call synthesized from an early result with the real call's data.
fn merge_into_synthesized(existing: &mut ToolCall, incoming: &ToolCall) {
    if existing.tool_name == UNKNOWN_TOOL_NAME && !incoming.tool_name.is_empty() {
        existing.tool_name = incoming.tool_name.clone();
    }
    if is_empty_args(&existing.args) && !is_empty_args(&incoming.args) {
        existing.args = incoming.args.clone();
    }
}

fn is_empty_args(args: &serde_json::Value) -> bool {
    match args {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Checks that `later` extends `earlier` without rewriting finalized segments.
///
/// Allowed differences: the last segment of `earlier` may be text or
/// reasoning that `later` grew, a pending tool segment may have gained its
/// result, and a call synthesized from an early result may have been filled in.
pub fn is_prefix_consistent(earlier: &[Segment], later: &[Segment]) -> bool {
    if later.len() < earlier.len() {
        return false;
    }

    let last = earlier.len().saturating_sub(1);
    earlier
        .iter()
        .zip(later)
        .enumerate()
        .all(|(index, (before, after))| match (before, after) {
            _ if before == after => true,
            (Segment::Text { content: a }, Segment::Text { content: b })
            | (Segment::Reasoning { content: a }, Segment::Reasoning { content: b }) => {
                index == last && b.starts_with(a.as_str())
            }
            (Segment::Tool(a), Segment::Tool(b)) => {
                let call_kept = a.call == b.call
                    || (a.call.tool_call_id == b.call.tool_call_id
                        && a.call.tool_name == UNKNOWN_TOOL_NAME);
                call_kept && (a.result.is_none() || a.result == b.result)
            }
            _ => false,
        })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use message_parts::{Part, ToolResult};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{classify, classify_with, is_prefix_consistent, ClassifyOptions};
    use crate::segment::Segment;

    fn text(content: &str) -> Segment {
        Segment::Text {
            content: content.to_string(),
        }
    }

    #[test]
    fn text_collapses_around_tool_calls() {
        let parts = vec![
            Part::text("a"),
            Part::text("b"),
            Part::tool_call("t1", "calculator", json!({"expression": "1+1"})),
            Part::text("c"),
        ];

        let classification = classify(&parts);
        assert_eq!(classification.segments.len(), 3);
        assert_eq!(classification.segments[0], text("ab"));
        assert_matches!(&classification.segments[1], Segment::Tool(tool) if tool.call.tool_call_id == "t1" && tool.is_pending());
        assert_eq!(classification.segments[2], text("c"));
        assert!(classification.interleaved);
    }

    #[test]
    fn result_attaches_to_earlier_call_out_of_order() {
        let parts = vec![
            Part::tool_call("t1", "web_search", json!({})),
            Part::tool_call("t2", "read_file", json!({"path": "a"})),
            Part::text("between"),
            Part::tool_result("t1", json!({"searches": []})),
        ];

        let segments = classify(&parts).segments;
        assert_eq!(segments.len(), 3);
        assert_matches!(&segments[0], Segment::Tool(tool) if tool.result == Some(json!({"searches": []})));
        assert_matches!(&segments[1], Segment::Tool(tool) if tool.is_pending());
        assert_eq!(segments[2], text("between"));
    }

    #[test]
    fn orphan_result_synthesizes_call_at_its_position() {
        let parts = vec![
            Part::text("intro"),
            Part::ToolResult(ToolResult::new("x", json!({"ok": true}))),
        ];

        let segments = classify(&parts).segments;
        assert_eq!(segments[0], text("intro"));
        assert_matches!(
            &segments[1],
            Segment::Tool(tool) if tool.call.tool_name == "unknown" && tool.call.args == json!({})
        );
    }

    #[test]
    fn duplicate_call_id_merges_into_first_segment() {
        let parts = vec![
            Part::tool_result("t1", json!({"value": 2})),
            Part::tool_call("t1", "calculator", json!({"expression": "1+1"})),
            Part::tool_call("t1", "calculator", json!({"expression": "1+1"})),
        ];

        let segments = classify(&parts).segments;
        assert_eq!(segments.len(), 1);
        assert_matches!(
            &segments[0],
            Segment::Tool(tool) if tool.call.tool_name == "calculator"
                && tool.call.args == json!({"expression": "1+1"})
                && tool.result == Some(json!({"value": 2}))
        );
    }

    #[test]
    fn reasoning_closes_text_and_collapses() {
        let parts = vec![
            Part::text("before"),
            Part::reasoning("think "),
            Part::data("progress", json!({})),
            Part::reasoning("more"),
            Part::text("after"),
        ];

        let classification = classify(&parts);
        assert_eq!(
            classification.segments,
            vec![
                text("before"),
                Segment::Reasoning {
                    content: "think more".to_string()
                },
                text("after"),
            ]
        );
        assert_eq!(classification.display_count(), 2);
        assert_eq!(classification.reasoning().collect::<Vec<_>>(), vec!["think more"]);
    }

    #[test]
    fn data_and_file_parts_do_not_split_text() {
        let parts = vec![
            Part::text("one "),
            Part::data("seedream_image_progress", json!({"pct": 50})),
            Part::text("two"),
        ];
        assert_eq!(classify(&parts).segments, vec![text("one two")]);
    }

    #[test]
    fn whitespace_only_buffer_carries_into_next_text() {
        let parts = vec![
            Part::text("\n\n"),
            Part::tool_call("t1", "calculator", json!({})),
            Part::text(" done"),
        ];

        let segments = classify(&parts).segments;
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1], text("\n\n done"));
    }

    #[test]
    fn empty_parts_are_not_interleaved() {
        let classification = classify(&[]);
        assert!(classification.segments.is_empty());
        assert!(!classification.interleaved);
    }

    #[test]
    fn repeat_suppression_drops_loops_when_enabled() {
        let looping = "Let me search for that information now.";
        let parts = vec![
            Part::text(looping),
            Part::tool_call("t1", "web_search", json!({"queries": ["a"]})),
            Part::text(looping),
            Part::tool_call("t2", "web_search", json!({"queries": ["a"]})),
            Part::tool_result("t2", json!({})),
            Part::text("short"),
            Part::reasoning("r"),
            Part::text("short"),
        ];

        let suppressed = classify_with(&parts, &ClassifyOptions { suppress_repeats: true }).segments;
        let display: Vec<_> = suppressed.iter().filter(|s| s.is_display()).collect();
        assert_eq!(display.len(), 3);
        assert_eq!(*display[0], text(looping));
        assert_matches!(display[1], Segment::Tool(tool) if tool.call.tool_call_id == "t1" && tool.is_pending());
        assert_eq!(*display[2], text("short"));

        assert_eq!(classify(&parts).display_count(), 6);
    }

    #[test]
    fn every_prefix_is_consistent_with_the_full_list() {
        let parts = vec![
            Part::text("Searching"),
            Part::text(" now"),
            Part::tool_call("t1", "web_search", json!({"queries": ["q"]})),
            Part::reasoning("hm"),
            Part::tool_call("t2", "read_file", json!({"path": "a"})),
            Part::tool_result("t1", json!({"searches": []})),
            Part::text("Done"),
            Part::tool_result("t2", json!({"content": "x"})),
            Part::text(" here."),
        ];

        for end in 0..=parts.len() {
            let earlier = classify(&parts[..end]).segments;
            for later_end in end..=parts.len() {
                let later = classify(&parts[..later_end]).segments;
                assert!(
                    is_prefix_consistent(&earlier, &later),
                    "prefix {end} vs {later_end}: {earlier:?} / {later:?}"
                );
            }
        }
    }

    #[test]
    fn rewritten_segment_is_not_prefix_consistent() {
        assert!(!is_prefix_consistent(&[text("a"), text("b")], &[text("x"), text("b")]));
        assert!(!is_prefix_consistent(&[text("a")], &[]));
    }
}

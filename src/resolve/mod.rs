//! Placeholder resolution for one text blob.
//!
//! Passes, applied per maximal run of same-kind tags separated only by
//! whitespace:
//! 1. image runs are re-sorted by emission order,
//! 2. link runs drop tags whose URL already appeared earlier in the run,
//! 3. every tag is substituted (or removed when unresolved).
//!
//! `uploaded_image_<n>` tokens are left alone; see [`split_upload_chips`].

mod chips;
mod dedup;
mod reorder;
mod substitute;

use serde::{Deserialize, Serialize};

use crate::core::maps::{ImageOutput, PlaceholderMaps};
use crate::core::text::fence::split_fenced;
use crate::core::text::placeholder::{may_contain_placeholder, scan, Placeholder, PlaceholderKind};

pub use chips::{split_upload_chips, InlineRun};
pub use substitute::substitute;

/// What happens to a tag whose id is missing from the maps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    #[default]
    Remove,
    Keep,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveOptions {
    pub image_output: ImageOutput,
    pub unresolved: UnresolvedPolicy,
    /// Rewrite tags inside fenced code blocks too.
    pub resolve_in_code: bool,
}

/// Rewrites every media tag in `text` against `maps`.
pub fn resolve(text: &str, maps: &PlaceholderMaps, options: &ResolveOptions) -> String {
    if !may_contain_placeholder(text) {
        return text.to_string();
    }
    if options.resolve_in_code {
        return resolve_prose(text, maps, options);
    }

    let mut resolved = String::with_capacity(text.len());
    for chunk in split_fenced(text) {
        if chunk.is_code {
            resolved.push_str(chunk.text);
        } else {
            resolved.push_str(&resolve_prose(chunk.text, maps, options));
        }
    }
    resolved
}

fn resolve_prose(text: &str, maps: &PlaceholderMaps, options: &ResolveOptions) -> String {
    let tags: Vec<Placeholder> = scan(text)
        .into_iter()
        .filter(|tag| tag.kind.is_media_tag())
        .collect();
    if tags.is_empty() {
        return text.to_string();
    }

    let mut resolved = String::with_capacity(text.len());
    let mut cursor = 0;
    for run in collect_runs(text, &tags) {
        resolved.push_str(&text[cursor..run.start()]);
        let steps = match run.kind {
            PlaceholderKind::Image => reorder::reorder_images(&run, maps),
            PlaceholderKind::Link => dedup::dedup_links(&run, maps),
            _ => run.in_place(),
        };
        for step in steps {
            match step {
                RunStep::Separator(separator) => resolved.push_str(separator),
                RunStep::Tag(tag) => {
                    resolved.push_str(&substitute(tag, &text[tag.span.clone()], maps, options));
                }
            }
        }
        cursor = run.end();
    }
    resolved.push_str(&text[cursor..]);
    resolved
}

/// Maximal run of same-kind tags with whitespace-only gaps.
#[derive(Debug)]
pub(crate) struct TagRun<'a> {
    pub(crate) kind: PlaceholderKind,
    pub(crate) tags: Vec<&'a Placeholder>,
    /// `separators[i]` sits between `tags[i]` and `tags[i + 1]`.
    pub(crate) separators: Vec<&'a str>,
}

impl<'a> TagRun<'a> {
    fn start(&self) -> usize {
        self.tags[0].span.start
    }

    fn end(&self) -> usize {
        self.tags[self.tags.len() - 1].span.end
    }

    /// Emits tags in `order` with the separators left at their positions.
    pub(crate) fn emit(&self, order: &[usize]) -> Vec<RunStep<'a>> {
        let mut steps = Vec::with_capacity(order.len() * 2);
        for (slot, &index) in order.iter().enumerate() {
            if slot > 0 {
                steps.push(RunStep::Separator(self.separators[slot - 1]));
            }
            steps.push(RunStep::Tag(self.tags[index]));
        }
        steps
    }

    fn in_place(&self) -> Vec<RunStep<'a>> {
        let order: Vec<usize> = (0..self.tags.len()).collect();
        self.emit(&order)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunStep<'a> {
    Tag(&'a Placeholder),
    Separator(&'a str),
}

fn collect_runs<'a>(text: &'a str, tags: &'a [Placeholder]) -> Vec<TagRun<'a>> {
    let mut runs: Vec<TagRun<'a>> = Vec::new();
    for tag in tags {
        if let Some(run) = runs.last_mut() {
            let previous = run.tags[run.tags.len() - 1];
            let gap = &text[previous.span.end..tag.span.start];
            if previous.kind == tag.kind && gap.trim().is_empty() {
                run.tags.push(tag);
                run.separators.push(gap);
                continue;
            }
        }
        runs.push(TagRun {
            kind: tag.kind,
            tags: vec![tag],
            separators: Vec::new(),
        });
    }
    runs
}

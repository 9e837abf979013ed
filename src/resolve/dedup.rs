use std::collections::BTreeSet;

use crate::core::maps::PlaceholderMaps;

use super::{RunStep, TagRun};

/// Keeps the first tag per resolved URL in a link run.
///
/// Unresolved ids are always kept. A dropped tag takes the separator before it.
pub(crate) fn dedup_links<'a>(run: &TagRun<'a>, maps: &PlaceholderMaps) -> Vec<RunStep<'a>> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut steps = Vec::with_capacity(run.tags.len() * 2);

    for (index, tag) in run.tags.iter().copied().enumerate() {
        if let Some(url) = maps.link_url(&tag.id) {
            if !seen.insert(url) {
                tracing::trace!(id = %tag.id, url, "dropping duplicate link tag");
                continue;
            }
        }
        if index > 0 {
            steps.push(RunStep::Separator(run.separators[index - 1]));
        }
        steps.push(RunStep::Tag(tag));
    }
    steps
}

use crate::core::maps::PlaceholderMaps;

use super::{RunStep, TagRun};

/// Re-sorts an image run by emission rank when the known ranks are out of order.
///
/// Unknown ids sort after every known id; ties keep their text order.
pub(crate) fn reorder_images<'a>(run: &TagRun<'a>, maps: &PlaceholderMaps) -> Vec<RunStep<'a>> {
    let ranks: Vec<Option<usize>> = run
        .tags
        .iter()
        .map(|tag| maps.emission_rank(&tag.id))
        .collect();

    let mut order: Vec<usize> = (0..run.tags.len()).collect();
    if !known_ranks_ascending(&ranks) {
        order.sort_by_key(|&index| (ranks[index].is_none(), ranks[index]));
        tracing::trace!(tags = run.tags.len(), "reordered image run by emission order");
    }
    run.emit(&order)
}

/// Only known ranks are compared, so an unknown id ahead of an ordered known
/// tail leaves the run as written.
fn known_ranks_ascending(ranks: &[Option<usize>]) -> bool {
    let mut known = ranks.iter().flatten();
    let Some(mut previous) = known.next() else {
        return true;
    };
    for rank in known {
        if rank < previous {
            return false;
        }
        previous = rank;
    }
    true
}

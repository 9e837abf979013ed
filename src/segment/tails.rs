//! Bubble grouping over the flattened display list.

use serde::Serialize;

use super::tool_kind::CollapseClass;

/// Anything placed in the flattened display list.
pub trait Collapsible {
    /// `None` never merges with a neighbour (text, most tools).
    fn collapse_class(&self) -> Option<CollapseClass>;
}

impl Collapsible for Option<CollapseClass> {
    fn collapse_class(&self) -> Option<CollapseClass> {
        *self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tail {
    /// Ends a visual run.
    pub terminator: bool,
    /// Final unit of the message with nothing rendered after it.
    pub is_last: bool,
}

/// Terminator flags: a unit continues its run only when it and its successor
/// share a class. The last unit always terminates.
pub fn compute_tails<T: Collapsible>(units: &[T]) -> Vec<bool> {
    units
        .iter()
        .enumerate()
        .map(|(index, unit)| match (unit.collapse_class(), units.get(index + 1)) {
            (Some(class), Some(next)) => next.collapse_class() != Some(class),
            _ => true,
        })
        .collect()
}

/// [`compute_tails`] plus the `is_last` flag, which trailing content suppresses.
pub fn resolve_tails<T: Collapsible>(units: &[T], has_trailing_content: bool) -> Vec<Tail> {
    let last = units.len().checked_sub(1);
    compute_tails(units)
        .into_iter()
        .enumerate()
        .map(|(index, terminator)| Tail {
            terminator,
            is_last: !has_trailing_content && Some(index) == last,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{compute_tails, resolve_tails, Tail};
    use crate::segment::tool_kind::CollapseClass;

    const SEARCH: Option<CollapseClass> = Some(CollapseClass::Search);
    const FILE: Option<CollapseClass> = Some(CollapseClass::File);
    const TEXT: Option<CollapseClass> = None;

    #[test]
    fn same_class_neighbours_share_a_run() {
        assert_eq!(
            compute_tails(&[SEARCH, SEARCH, SEARCH, TEXT]),
            vec![false, false, true, true]
        );
    }

    #[test]
    fn class_change_terminates() {
        assert_eq!(
            compute_tails(&[SEARCH, FILE, FILE, SEARCH]),
            vec![true, false, true, true]
        );
    }

    #[test]
    fn unclassed_units_never_merge() {
        assert_eq!(compute_tails(&[TEXT, TEXT]), vec![true, true]);
        assert!(compute_tails::<Option<CollapseClass>>(&[]).is_empty());
    }

    #[test]
    fn trailing_content_clears_is_last() {
        assert_eq!(
            resolve_tails(&[FILE, FILE], false),
            vec![
                Tail {
                    terminator: false,
                    is_last: false
                },
                Tail {
                    terminator: true,
                    is_last: true
                },
            ]
        );
        assert!(resolve_tails(&[FILE, FILE], true)
            .iter()
            .all(|tail| !tail.is_last));
    }
}

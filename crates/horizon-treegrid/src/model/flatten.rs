//! The flatten walk that turns a tree into visible rows.
//!
//! Nodes are visited depth-first in sibling order. Every visited node is
//! recorded in a per-depth stack of pending ancestors; when a node matches the
//! filter, the pending ancestors above it are emitted first, then the node,
//! and the stack is cleared. A node's children are visited when the node is
//! not excluded and it is either expanded or, with a filter active, did not
//! match itself (its descendants may still pull it into view).

use std::sync::Arc;

use super::filter::{FilterFn, FilterMatch};
use super::index::TreeIndex;
use super::record::TreeRecord;
use super::state::NodeStateStore;

struct Flattener<'a, R: TreeRecord> {
    index: &'a mut TreeIndex<R>,
    states: &'a mut NodeStateStore<R::Id>,
    filter: Option<&'a FilterFn<R>>,
    pending: Vec<Option<Arc<R>>>,
    rows: Vec<Arc<R>>,
}

impl<R: TreeRecord> Flattener<'_, R> {
    fn verdict(&self, record: &R) -> FilterMatch {
        self.filter.map_or(FilterMatch::Include, |filter| filter(record))
    }

    fn visit(&mut self, nodes: &[Arc<R>], depth: usize, ancestor_matched: bool) {
        for node in nodes {
            let verdict = self.verdict(node);
            let matched = verdict.matches(ancestor_matched);

            self.pending.truncate(depth);
            self.pending.resize(depth, None);
            self.pending.push(Some(node.clone()));

            if matched {
                self.rows
                    .extend(self.pending.iter_mut().filter_map(Option::take));
            }

            if verdict.is_excluded() {
                continue;
            }

            let expanded = self.states.resolve(&*self.index, &**node).expanded;
            let probe = self.filter.is_some() && !matched;
            if (expanded || probe) && self.index.has_children(node) {
                if let Some(children) = self.index.children(node) {
                    self.visit(&children, depth + 1, matched);
                }
            }
        }
    }
}

/// Flattens a sibling group into visible rows.
///
/// `ancestor_matched` seeds the match state of the group's parent; pass
/// `false` for the roots.
pub(crate) fn flatten<R: TreeRecord>(
    index: &mut TreeIndex<R>,
    states: &mut NodeStateStore<R::Id>,
    filter: Option<&FilterFn<R>>,
    nodes: &[Arc<R>],
    ancestor_matched: bool,
) -> Vec<Arc<R>> {
    let mut walker = Flattener {
        index,
        states,
        filter,
        pending: Vec::new(),
        rows: Vec::new(),
    };
    walker.visit(nodes, 0, ancestor_matched);
    walker.rows
}

/// Returns `true` if `record` would be shown on its own merits or through a
/// matching ancestor. Always `true` without a filter.
pub(crate) fn row_or_ancestor_matches<R: TreeRecord>(
    index: &TreeIndex<R>,
    filter: Option<&FilterFn<R>>,
    record: &R,
) -> bool {
    let Some(filter) = filter else {
        return true;
    };

    let mut verdict = filter(record);
    let mut parent_id = index.parent(record);
    loop {
        match verdict {
            FilterMatch::Include => return true,
            FilterMatch::Exclude => return false,
            FilterMatch::Neutral => {
                let Some(parent) = parent_id.and_then(|id| index.record(&id)) else {
                    return false;
                };
                verdict = filter(&*parent);
                parent_id = index.parent(&parent);
            }
        }
    }
}

//! Per-node ephemeral state: depth and expansion.

use std::collections::HashMap;
use std::hash::Hash;

use horizon_treegrid_core::logging::targets;

use super::index::TreeIndex;
use super::record::TreeRecord;

/// Depth and expansion flag of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeState {
    /// Distance from the root (roots are at depth 0).
    pub depth: usize,
    /// Whether the node's children are shown.
    pub expanded: bool,
}

/// What a renderer needs to draw the tree column of a row: indentation and
/// the expander glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowDecoration {
    /// Indentation level.
    pub depth: usize,
    /// Whether the expander is shown open.
    pub expanded: bool,
    /// Whether an expander is shown at all.
    pub has_children: bool,
}

/// Memoized node states keyed by record id.
///
/// States are created on first query. A new state starts expanded only if its
/// depth is below the configured initial tree depth.
pub(crate) struct NodeStateStore<Id> {
    states: HashMap<Id, NodeState>,
    initial_depth: usize,
}

impl<Id: Clone + Eq + Hash + std::fmt::Debug> NodeStateStore<Id> {
    pub(crate) fn new(initial_depth: usize) -> Self {
        Self {
            states: HashMap::new(),
            initial_depth,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.states.clear();
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, id: Id, state: NodeState) {
        self.states.insert(id, state);
    }

    pub(crate) fn set_expanded(&mut self, id: &Id, expanded: bool) {
        if let Some(state) = self.states.get_mut(id) {
            state.expanded = expanded;
        }
    }

    fn create(&mut self, id: Id, depth: usize) -> NodeState {
        let state = NodeState {
            depth,
            expanded: depth < self.initial_depth,
        };
        self.states.insert(id, state);
        state
    }

    /// Returns the state of `record`, deriving depths along its ancestor
    /// chain on first access.
    ///
    /// The chain is walked upwards until an ancestor with a known state, a
    /// root, or a parent id the index cannot resolve (treated as a root
    /// boundary). Cyclic parent chains do not terminate.
    pub(crate) fn resolve<R>(&mut self, index: &TreeIndex<R>, record: &R) -> NodeState
    where
        R: TreeRecord<Id = Id>,
    {
        let id = record.id();
        if let Some(state) = self.states.get(&id) {
            return *state;
        }

        let mut pending = vec![id.clone()];
        let mut base_depth = None;
        let mut parent_id = index.parent(record);

        while let Some(pid) = parent_id {
            if let Some(state) = self.states.get(&pid) {
                base_depth = Some(state.depth);
                break;
            }
            let Some(parent) = index.record(&pid) else {
                tracing::warn!(
                    target: targets::MODEL,
                    record = ?id,
                    parent = ?pid,
                    "parent not indexed, treating as root boundary"
                );
                break;
            };
            parent_id = index.parent(&parent);
            pending.push(pid);
        }

        let mut depth = base_depth.map_or(0, |d| d + 1);
        let mut state = NodeState::default();
        for ancestor in pending.into_iter().rev() {
            state = self.create(ancestor, depth);
            depth += 1;
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::TreeItem;
    use std::sync::Arc;

    fn indexed(records: &[Arc<TreeItem>]) -> TreeIndex<TreeItem> {
        let mut index = TreeIndex::new(None);
        index.build_tree(records).unwrap();
        index
    }

    #[test]
    fn test_deep_first_access_derives_ancestors() {
        let records = vec![
            Arc::new(TreeItem::new("A", ())),
            Arc::new(TreeItem::new("A1", ()).with_parent("A")),
            Arc::new(TreeItem::new("A1a", ()).with_parent("A1")),
        ];
        let index = indexed(&records);
        let mut store = NodeStateStore::new(0);

        let leaf = store.resolve(&index, &*records[2]);
        assert_eq!(leaf, NodeState { depth: 2, expanded: false });

        assert_eq!(store.resolve(&index, &*records[1]).depth, 1);
        assert_eq!(store.resolve(&index, &*records[0]).depth, 0);
    }

    #[test]
    fn test_memoized_state_wins() {
        let records = vec![
            Arc::new(TreeItem::new("A", ())),
            Arc::new(TreeItem::new("A1", ()).with_parent("A")),
        ];
        let index = indexed(&records);
        let mut store = NodeStateStore::new(0);

        store.insert("A".to_string(), NodeState { depth: 4, expanded: true });
        assert_eq!(store.resolve(&index, &*records[1]).depth, 5);

        store.set_expanded(&"A1".to_string(), true);
        assert!(store.resolve(&index, &*records[1]).expanded);

        store.clear();
        assert_eq!(store.resolve(&index, &*records[1]).depth, 1);
    }

    #[test]
    fn test_initial_depth_expands_shallow_nodes() {
        let records = vec![
            Arc::new(TreeItem::new("A", ())),
            Arc::new(TreeItem::new("A1", ()).with_parent("A")),
        ];
        let index = indexed(&records);
        let mut store = NodeStateStore::new(1);

        assert!(store.resolve(&index, &*records[0]).expanded);
        assert!(!store.resolve(&index, &*records[1]).expanded);
    }

    #[test]
    fn test_unknown_parent_is_root_boundary() {
        let index = TreeIndex::new(None);
        let mut store = NodeStateStore::new(0);
        let orphan = TreeItem::new("x", ()).with_parent("missing");

        assert_eq!(store.resolve(&index, &orphan).depth, 0);
    }
}

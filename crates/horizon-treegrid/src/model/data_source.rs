//! The tree-grid data source: a flat, windowed view over a tree.
//!
//! `TreeGridDataSource` keeps the visible rows of a tree in a single ordered
//! vector and updates it in place as nodes are expanded and collapsed. Filter
//! and sort changes rebuild the whole view. Every change is announced through
//! [`TreeSignals`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_treegrid::model::{TreeGridDataSource, TreeItem};
//! use horizon_treegrid::TreeGridConfig;
//!
//! let a1 = Arc::new(TreeItem::new("A1", ()));
//! let a2 = Arc::new(TreeItem::new("A2", ()));
//! let a = Arc::new(TreeItem::new("A", ()).with_children(vec![a1, a2]));
//!
//! let source = TreeGridDataSource::from_tree(vec![a.clone()], TreeGridConfig::default());
//! source.load().unwrap();
//! assert_eq!(source.record_count().unwrap(), 1);
//!
//! source.expand(&a).unwrap();
//! assert_eq!(source.record_count().unwrap(), 3);
//! ```

use std::cmp::Ordering;
use std::ops::{Bound, RangeBounds};
use std::sync::{Arc, Weak};

use horizon_treegrid_core::logging::{span_names, targets};
use horizon_treegrid_core::{ConnectionId, PerfSpan};
use parking_lot::RwLock;

use super::delegate::TreeDataDelegate;
use super::filter::{FilterFn, FilterMatch, filter_fn};
use super::flatten::{flatten, row_or_ancestor_matches};
use super::index::TreeIndex;
use super::record::TreeRecord;
use super::signals::{DataChange, Notification, RowRange, TreeSignals, TreeToggled};
use super::state::{NodeState, NodeStateStore, RowDecoration};
use crate::config::TreeGridConfig;
use crate::error::{Result, TreeGridError};

/// Type alias for a stored sibling comparator.
///
/// Comparators run with the data source locked.
pub type CompareFn<R> = Arc<dyn Fn(&R, &R) -> Ordering + Send + Sync>;

/// Where a data source gets its tree from on each load.
enum DataSource<R: TreeRecord> {
    /// Pre-built roots with embedded children.
    Tree(Vec<Arc<R>>),
    /// A flat list whose records declare their parents.
    Records(Vec<Arc<R>>),
    /// An external delegate.
    Delegate(Arc<dyn TreeDataDelegate<R>>),
}

/// Everything derived from the tree. Guarded by a single lock.
struct ViewState<R: TreeRecord> {
    tree: Vec<Arc<R>>,
    view: Option<Vec<Arc<R>>>,
    index: TreeIndex<R>,
    states: NodeStateStore<R::Id>,
    filter: Option<FilterFn<R>>,
    comparator: Option<CompareFn<R>>,
}

impl<R: TreeRecord> ViewState<R> {
    fn view(&self) -> Result<&[Arc<R>]> {
        self.view.as_deref().ok_or(TreeGridError::NotReady)
    }

    fn reset(&mut self) {
        self.tree.clear();
        self.view = None;
        self.index.reset();
        self.states.clear();
    }

    fn position(&self, id: &R::Id) -> Option<usize> {
        self.view
            .as_deref()?
            .iter()
            .position(|row| row.id() == *id)
    }

    fn verdict(&self, record: &R) -> FilterMatch {
        self.filter
            .as_ref()
            .map_or(FilterMatch::Include, |filter| filter(record))
    }

    fn ancestor_matches(&self, record: &R) -> bool {
        row_or_ancestor_matches(&self.index, self.filter.as_ref(), record)
    }

    /// Flattens the whole tree under the current expansion, filter and order.
    fn rebuild(&mut self) -> Vec<Arc<R>> {
        let Self {
            tree,
            index,
            states,
            filter,
            ..
        } = self;
        let rows = flatten(index, states, filter.as_ref(), &tree[..], false);
        index.register_all(&rows);
        rows
    }

    /// Flattens the children of `record`, seeded with its match state.
    fn flatten_children(&mut self, record: &R) -> Vec<Arc<R>> {
        let matched = self.ancestor_matches(record);
        let children = self.index.children(record).unwrap_or_default();
        let Self {
            index,
            states,
            filter,
            ..
        } = self;
        flatten(index, states, filter.as_ref(), &children, matched)
    }

    /// The rows that follow `record` in a full rebuild, under its current
    /// expansion state.
    fn subtree_rows(&mut self, record: &R) -> Vec<Arc<R>> {
        if self.verdict(record).is_excluded() {
            return Vec::new();
        }
        let expanded = self.states.resolve(&self.index, record).expanded;
        let probe = self.filter.is_some() && !self.ancestor_matches(record);
        if expanded || probe {
            self.flatten_children(record)
        } else {
            Vec::new()
        }
    }

    /// Replaces the rows below `record` (at view row `position`) with its
    /// current subtree. Returns the removed and inserted ranges.
    fn splice_subtree(&mut self, position: usize, record: &R) -> (RowRange, RowRange) {
        let start = position + 1;
        let depth = self.states.resolve(&self.index, record).depth;
        let end = {
            let Self {
                view,
                index,
                states,
                ..
            } = self;
            let rows = view.as_deref().unwrap_or_default();
            let tail = rows.get(start..).unwrap_or_default();
            start
                + tail
                    .iter()
                    .take_while(|row| states.resolve(&*index, &***row).depth > depth)
                    .count()
        };

        let rows = self.subtree_rows(record);
        self.index.register_all(&rows);
        let inserted = RowRange::new(start, start + rows.len());
        if let Some(view) = self.view.as_mut() {
            view.splice(start..end, rows);
        }
        (RowRange::new(start, end), inserted)
    }

    /// Stably sorts the roots and every children group, depth-first.
    fn sort_tree(&mut self, compare: &(dyn Fn(&R, &R) -> Ordering + Send + Sync)) {
        self.tree.sort_by(|a, b| compare(&**a, &**b));
        let mut pending: Vec<Arc<R>> = self.tree.iter().rev().cloned().collect();
        while let Some(node) = pending.pop() {
            if let Some(children) = self.index.sort_children(&*node, compare) {
                pending.extend(children.into_iter().rev());
            }
        }
    }

    /// Collects `record` and all its descendants, children before parents.
    fn post_order(&mut self, record: &Arc<R>, out: &mut Vec<Arc<R>>) {
        if let Some(children) = self.index.children(record) {
            for child in &children {
                self.post_order(child, out);
            }
        }
        out.push(record.clone());
    }
}

/// A windowed view over a hierarchy of records.
///
/// The view is the ordered list of currently visible rows: roots, and below
/// each expanded node its children, depth-first. With a filter active, a row
/// is visible if it matches or if one of its descendants does.
///
/// All methods take `&self`. Notifications are emitted after internal state
/// has been updated and the lock released, so slots may call back into the
/// data source.
///
/// # Lifecycle
///
/// A data source is not ready until [`load`](Self::load) succeeds. Before
/// that, view queries and mutations fail with [`TreeGridError::NotReady`]. A
/// filter or sort set before the first load is stored and applied by it.
pub struct TreeGridDataSource<R: TreeRecord> {
    source: DataSource<R>,
    config: TreeGridConfig,
    state: RwLock<ViewState<R>>,
    signals: TreeSignals<R>,
    delegate_connection: Option<ConnectionId>,
}

impl<R: TreeRecord> TreeGridDataSource<R> {
    fn with_source(
        source: DataSource<R>,
        config: TreeGridConfig,
        delegate: Option<Arc<dyn TreeDataDelegate<R>>>,
        delegate_connection: Option<ConnectionId>,
    ) -> Self {
        let state = ViewState {
            tree: Vec::new(),
            view: None,
            index: TreeIndex::new(delegate),
            states: NodeStateStore::new(config.initial_tree_depth),
            filter: None,
            comparator: None,
        };
        Self {
            source,
            config,
            state: RwLock::new(state),
            signals: TreeSignals::new(),
            delegate_connection,
        }
    }

    /// Creates a data source over pre-built roots with embedded children.
    pub fn from_tree(roots: Vec<Arc<R>>, config: TreeGridConfig) -> Self {
        Self::with_source(DataSource::Tree(roots), config, None, None)
    }

    /// Creates a data source over a flat list whose records declare their
    /// parent ids. The tree is built on every load.
    pub fn from_records(records: Vec<Arc<R>>, config: TreeGridConfig) -> Self {
        Self::with_source(DataSource::Records(records), config, None, None)
    }

    /// Creates a data source backed by an external delegate.
    ///
    /// The data source loads immediately if the delegate is ready, and again
    /// every time the delegate's `data_loaded` signal fires. Failures of
    /// those loads are logged and leave the data source not ready.
    pub fn with_delegate(delegate: Arc<dyn TreeDataDelegate<R>>, config: TreeGridConfig) -> Arc<Self> {
        let source = Arc::new_cyclic(|this: &Weak<Self>| {
            let this = this.clone();
            let connection = delegate.data_loaded().map(|signal| {
                signal.connect(move |_| {
                    if let Some(source) = this.upgrade() {
                        source.reload_from_delegate();
                    }
                })
            });
            Self::with_source(
                DataSource::Delegate(delegate.clone()),
                config,
                Some(delegate.clone()),
                connection,
            )
        });

        if delegate.is_ready() {
            source.reload_from_delegate();
        }
        source
    }

    fn reload_from_delegate(&self) {
        if let Err(error) = self.load() {
            tracing::warn!(target: targets::MODEL, %error, "delegate load failed");
        }
    }

    /// Returns the signals emitted by this data source.
    pub fn signals(&self) -> &TreeSignals<R> {
        &self.signals
    }

    /// Returns the configuration this data source was created with.
    pub fn config(&self) -> &TreeGridConfig {
        &self.config
    }

    fn build_roots(&self, index: &mut TreeIndex<R>) -> Result<Vec<Arc<R>>> {
        let roots = match &self.source {
            DataSource::Tree(roots) => roots.clone(),
            DataSource::Records(records) => index.build_tree(records)?,
            DataSource::Delegate(delegate) => {
                if !delegate.is_ready() {
                    return Err(TreeGridError::NotReady);
                }
                match delegate.build_tree() {
                    Some(roots) => roots,
                    None => index.build_tree(&delegate.get_data())?,
                }
            }
        };
        index.register_all(&roots);
        Ok(roots)
    }

    /// (Re)builds the tree and the view from scratch.
    ///
    /// All derived state (expansion, depths, child caches) is discarded. Nodes
    /// shallower than the configured initial tree depth start expanded. A
    /// stored filter and sort order are applied. On failure the data source
    /// is left not ready.
    #[tracing::instrument(skip(self), target = "horizon_treegrid::model", level = "debug")]
    pub fn load(&self) -> Result<()> {
        let _perf = PerfSpan::new(span_names::LOAD);
        {
            let mut guard = self.state.write();
            let state = &mut *guard;
            state.reset();
            state.tree = self.build_roots(&mut state.index)?;

            if let Some(compare) = state.comparator.clone() {
                state.sort_tree(&*compare);
            }
            let view = state.rebuild();
            tracing::debug!(
                target: targets::MODEL,
                roots = state.tree.len(),
                rows = view.len(),
                filtered = state.filter.is_some(),
                "view loaded"
            );
            state.view = Some(view);
        }
        self.signals.dispatch(vec![Notification::DataLoaded]);
        Ok(())
    }

    /// Returns `true` once a load has succeeded.
    pub fn is_ready(&self) -> bool {
        self.state.read().view.is_some()
    }

    /// Returns the visible rows in `range`, clamped to the view like a slice.
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use horizon_treegrid::model::{TreeGridDataSource, TreeItem};
    /// # use horizon_treegrid::TreeGridConfig;
    /// let roots = vec![Arc::new(TreeItem::new("a", ())), Arc::new(TreeItem::new("b", ()))];
    /// let source = TreeGridDataSource::from_tree(roots, TreeGridConfig::default());
    /// source.load().unwrap();
    /// assert_eq!(source.get_data(..).unwrap().len(), 2);
    /// assert_eq!(source.get_data(1..10).unwrap()[0].name(), "b");
    /// ```
    pub fn get_data<B: RangeBounds<usize>>(&self, range: B) -> Result<Vec<Arc<R>>> {
        let state = self.state.read();
        let view = state.view()?;

        let end = match range.end_bound() {
            Bound::Included(&end) => end.saturating_add(1),
            Bound::Excluded(&end) => end,
            Bound::Unbounded => view.len(),
        }
        .min(view.len());
        let start = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start.saturating_add(1),
            Bound::Unbounded => 0,
        }
        .min(end);

        Ok(view[start..end].to_vec())
    }

    /// Number of visible rows.
    pub fn record_count(&self) -> Result<usize> {
        Ok(self.state.read().view()?.len())
    }

    /// The root records of the loaded tree, in display order.
    pub fn roots(&self) -> Vec<Arc<R>> {
        self.state.read().tree.clone()
    }

    /// Looks up a record the data source has seen since the last load.
    pub fn get_record_by_id(&self, id: &R::Id) -> Option<Arc<R>> {
        self.state.read().index.record(id)
    }

    /// Returns the children of `record`, resolving them on first use.
    pub fn children(&self, record: &R) -> Option<Vec<Arc<R>>> {
        self.state.write().index.children(record)
    }

    /// Returns the parent id of `record`.
    pub fn parent(&self, record: &R) -> Option<R::Id> {
        self.state.read().index.parent(record)
    }

    /// Returns `true` if `record` has children.
    pub fn has_children(&self, record: &R) -> bool {
        self.state.write().index.has_children(record)
    }

    /// Returns the depth and expansion state of `record`.
    pub fn tree_settings(&self, record: &R) -> NodeState {
        let mut guard = self.state.write();
        let state = &mut *guard;
        state.states.resolve(&state.index, record)
    }

    /// Returns `true` if `record` is expanded.
    pub fn is_expanded(&self, record: &R) -> bool {
        self.tree_settings(record).expanded
    }

    /// Returns the tree-column decoration for `record`.
    pub fn decoration(&self, record: &R) -> RowDecoration {
        let mut guard = self.state.write();
        let state = &mut *guard;
        let NodeState { depth, expanded } = state.states.resolve(&state.index, record);
        RowDecoration {
            depth,
            expanded,
            has_children: state.index.has_children(record),
        }
    }

    /// Returns `true` if `record` matches the active filter itself or through
    /// an ancestor. Always `true` without a filter.
    pub fn row_or_ancestor_matches(&self, record: &R) -> bool {
        self.state.read().ancestor_matches(record)
    }

    /// Flattens the children of `record` as they would appear below it if it
    /// were expanded.
    pub fn flatten_subtree(&self, record: &R) -> Vec<Arc<R>> {
        self.state.write().flatten_children(record)
    }

    /// Expands `record`, splicing its visible descendants into the view.
    ///
    /// Does nothing if `record` is already expanded. If `record` is not
    /// visible, only its state changes and `tree_toggled` reports no index.
    /// Its depth is derived from the parent links the data source knows, so
    /// pass records obtained from it (view rows, `children`, lookups).
    #[tracing::instrument(
        skip(self, record),
        target = "horizon_treegrid::model",
        level = "debug",
        fields(id = ?record.id())
    )]
    pub fn expand(&self, record: &R) -> Result<()> {
        self.set_expanded(record, true)
    }

    /// Collapses `record`, removing its descendants from the view.
    ///
    /// Does nothing if `record` is already collapsed.
    #[tracing::instrument(
        skip(self, record),
        target = "horizon_treegrid::model",
        level = "debug",
        fields(id = ?record.id())
    )]
    pub fn collapse(&self, record: &R) -> Result<()> {
        self.set_expanded(record, false)
    }

    fn set_expanded(&self, record: &R, expanded: bool) -> Result<()> {
        let _perf = PerfSpan::new(span_names::TOGGLE);
        let notifications = {
            let mut guard = self.state.write();
            let state = &mut *guard;
            state.view()?;

            let id = record.id();
            if state.states.resolve(&state.index, record).expanded == expanded {
                return Ok(());
            }
            state.states.set_expanded(&id, expanded);

            let position = state.position(&id);
            let mut notifications = Vec::with_capacity(3);
            if let Some(position) = position {
                let (removed, added) = state.splice_subtree(position, record);
                tracing::debug!(
                    target: targets::MODEL,
                    position,
                    removed = removed.len(),
                    added = added.len(),
                    "view spliced"
                );
                if expanded {
                    if !removed.is_empty() {
                        notifications.push(Notification::RowsRemoved(removed));
                    }
                    notifications.push(Notification::RowsAdded(added));
                } else {
                    notifications.push(Notification::RowsRemoved(removed));
                    if !added.is_empty() {
                        notifications.push(Notification::RowsAdded(added));
                    }
                }
            }
            notifications.push(Notification::TreeToggled(TreeToggled {
                id,
                index: position,
                expanded,
            }));
            notifications
        };
        self.signals.dispatch(notifications);
        Ok(())
    }

    /// Expands the record with `id` if it is collapsed, collapses it
    /// otherwise.
    pub fn toggle(&self, id: &R::Id) -> Result<()> {
        let record = {
            let state = self.state.read();
            state.view()?;
            state.index.record(id)
        }
        .ok_or_else(|| TreeGridError::unknown(id))?;

        if self.is_expanded(&record) {
            self.collapse(&record)
        } else {
            self.expand(&record)
        }
    }

    /// Expands the record with `root` and all its descendants, or the whole
    /// tree if `root` is `None`.
    ///
    /// Every node is expanded, leaves included, and each one reports
    /// `tree_toggled`. Descendants are expanded before their ancestors, so
    /// each visible subtree is spliced into the view once, fully expanded.
    #[tracing::instrument(skip(self), target = "horizon_treegrid::model", level = "debug")]
    pub fn expand_all(&self, root: Option<&R::Id>) -> Result<()> {
        let order = {
            let mut guard = self.state.write();
            let state = &mut *guard;
            state.view()?;

            let roots = match root {
                Some(id) => vec![state.index.record(id).ok_or_else(|| TreeGridError::unknown(id))?],
                None => state.tree.clone(),
            };
            let mut order = Vec::new();
            for record in &roots {
                state.post_order(record, &mut order);
            }
            order
        };

        tracing::debug!(target: targets::MODEL, nodes = order.len(), "expanding subtree");
        for record in &order {
            self.expand(record)?;
        }
        Ok(())
    }

    /// Filters the view with `predicate` and rebuilds it.
    ///
    /// The predicate may return `bool` or a [`FilterMatch`]. Expansion state
    /// is kept: descendants of a collapsed node are still shown when they
    /// match, together with their ancestors.
    ///
    /// The predicate runs while the data source's state is locked, so it
    /// must not call back into this data source. Capture whatever lineage
    /// it needs before applying it.
    pub fn apply_filter<F, M>(&self, predicate: F) -> Result<()>
    where
        F: Fn(&R) -> M + Send + Sync + 'static,
        M: Into<FilterMatch> + 'static,
    {
        self.set_filter(Some(filter_fn(predicate)))
    }

    /// Removes the active filter and rebuilds the view.
    pub fn clear_filter(&self) -> Result<()> {
        self.set_filter(None)
    }

    #[tracing::instrument(skip_all, target = "horizon_treegrid::model", level = "debug")]
    fn set_filter(&self, filter: Option<FilterFn<R>>) -> Result<()> {
        let _perf = PerfSpan::new(span_names::FILTER);
        let change = {
            let mut guard = self.state.write();
            let state = &mut *guard;
            state.filter = filter;
            if state.view.is_none() {
                tracing::debug!(target: targets::MODEL, "filter stored until load");
                return Ok(());
            }
            let data = state.rebuild();
            let old_data = state.view.replace(data.clone()).unwrap_or_default();
            tracing::debug!(
                target: targets::MODEL,
                rows = data.len(),
                old_rows = old_data.len(),
                "view filtered"
            );
            DataChange { data, old_data }
        };
        self.signals.dispatch(vec![Notification::DataChanged(change)]);
        Ok(())
    }

    /// Stably sorts every sibling group with `compare` and rebuilds the view.
    ///
    /// The comparator is kept and applied again by every subsequent load.
    /// Like filter predicates, it runs under the state lock and must not call
    /// back into this data source.
    #[tracing::instrument(skip_all, target = "horizon_treegrid::model", level = "debug")]
    pub fn sort<F>(&self, compare: F) -> Result<()>
    where
        F: Fn(&R, &R) -> Ordering + Send + Sync + 'static,
    {
        let _perf = PerfSpan::new(span_names::SORT);
        let compare: CompareFn<R> = Arc::new(compare);
        let change = {
            let mut guard = self.state.write();
            let state = &mut *guard;
            state.comparator = Some(compare.clone());
            if state.view.is_none() {
                tracing::debug!(target: targets::MODEL, "sort stored until load");
                return Ok(());
            }
            state.sort_tree(&*compare);
            let data = state.rebuild();
            let old_data = state.view.replace(data.clone()).unwrap_or_default();
            tracing::debug!(target: targets::MODEL, rows = data.len(), "view sorted");
            DataChange { data, old_data }
        };
        self.signals.dispatch(vec![Notification::DataChanged(change)]);
        Ok(())
    }
}

impl<R: TreeRecord> Drop for TreeGridDataSource<R> {
    fn drop(&mut self) {
        if let (DataSource::Delegate(delegate), Some(connection)) = (&self.source, self.delegate_connection) {
            if let Some(signal) = delegate.data_loaded() {
                signal.disconnect(connection);
            }
        }
    }
}

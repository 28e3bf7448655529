//! Change notifications emitted by a tree-grid data source.

use std::sync::Arc;

use horizon_treegrid_core::Signal;

use super::record::TreeRecord;

/// A half-open range of view rows, `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowRange {
    /// First affected row.
    pub start: usize,
    /// One past the last affected row.
    pub end: usize,
}

impl RowRange {
    /// Creates a range covering `start..end`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of rows in the range.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the range covers no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Payload of [`TreeSignals::data_changed`]: the view before and after a
/// full rebuild.
pub struct DataChange<R> {
    /// The rebuilt view.
    pub data: Vec<Arc<R>>,
    /// The view as it was before the rebuild.
    pub old_data: Vec<Arc<R>>,
}

impl<R> Clone for DataChange<R> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            old_data: self.old_data.clone(),
        }
    }
}

impl<R> std::fmt::Debug for DataChange<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataChange")
            .field("data", &self.data.len())
            .field("old_data", &self.old_data.len())
            .finish()
    }
}

/// Payload of [`TreeSignals::tree_toggled`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeToggled<Id> {
    /// The toggled record.
    pub id: Id,
    /// The record's row in the view, or `None` if it is not visible.
    pub index: Option<usize>,
    /// The new expansion state.
    pub expanded: bool,
}

/// Signals emitted by a [`TreeGridDataSource`](super::TreeGridDataSource).
///
/// All signals are emitted synchronously from the mutating call, after the
/// data source has released its internal lock. Slots may therefore query or
/// mutate the data source again.
///
/// # Signal Usage
///
/// - **Full replacement** (`load`): `data_loaded`
/// - **Splices** (`expand`/`collapse`): `rows_removed` / `rows_added`, then
///   `tree_toggled`
/// - **Rebuilds** (`apply_filter`/`sort`): `data_changed`
pub struct TreeSignals<R: TreeRecord> {
    /// Emitted after the view has been replaced by a load.
    pub data_loaded: Signal<()>,

    /// Emitted after rows were spliced into the view.
    pub rows_added: Signal<RowRange>,

    /// Emitted after rows were spliced out of the view.
    pub rows_removed: Signal<RowRange>,

    /// Emitted after a full rebuild, carrying the old and new views.
    pub data_changed: Signal<DataChange<R>>,

    /// Emitted after a record's expansion state changed.
    pub tree_toggled: Signal<TreeToggled<R::Id>>,
}

impl<R: TreeRecord> Default for TreeSignals<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: TreeRecord> TreeSignals<R> {
    /// Creates a new set of signals with no connections.
    pub fn new() -> Self {
        Self {
            data_loaded: Signal::new(),
            rows_added: Signal::new(),
            rows_removed: Signal::new(),
            data_changed: Signal::new(),
            tree_toggled: Signal::new(),
        }
    }

    /// Emits queued notifications in order.
    pub(crate) fn dispatch(&self, notifications: Vec<Notification<R>>) {
        for notification in notifications {
            match notification {
                Notification::DataLoaded => self.data_loaded.emit(()),
                Notification::RowsAdded(range) => self.rows_added.emit(range),
                Notification::RowsRemoved(range) => self.rows_removed.emit(range),
                Notification::DataChanged(change) => self.data_changed.emit(change),
                Notification::TreeToggled(toggled) => self.tree_toggled.emit(toggled),
            }
        }
    }
}

/// A notification recorded while the data source is locked and emitted once
/// the lock is released.
pub(crate) enum Notification<R: TreeRecord> {
    DataLoaded,
    RowsAdded(RowRange),
    RowsRemoved(RowRange),
    DataChanged(DataChange<R>),
    TreeToggled(TreeToggled<R::Id>),
}

//! Capability interfaces for external data sources.
//!
//! A data source can be handed a delegate instead of an in-memory tree. The
//! engine calls through these traits explicitly: anything the delegate does
//! not supply falls back to the engine's own behavior (embedded children,
//! declared parent ids, flat-list tree building).

use std::sync::Arc;

use horizon_treegrid_core::Signal;

use super::record::TreeRecord;

/// Hierarchy resolution supplied by a delegate.
///
/// [`children`](HierarchyDelegate::children) is consulted whenever a record
/// has no embedded children. Its results are cached per id until the next
/// `load`, so implementations may be expensive.
///
/// [`parent`](HierarchyDelegate::parent) and
/// [`has_children`](HierarchyDelegate::has_children) are optional. When they
/// answer `None`, the engine uses the record's declared parent id or the
/// parent recorded while resolving children, and checks for a non-empty
/// children group.
pub trait HierarchyDelegate<R: TreeRecord>: Send + Sync {
    /// Returns the children of `record` in display order.
    fn children(&self, record: &R) -> Option<Vec<Arc<R>>>;

    /// Returns the parent id of `record`, or `None` to let the engine
    /// resolve it.
    fn parent(&self, _record: &R) -> Option<R::Id> {
        None
    }

    /// Returns whether `record` has (or may have) children, or `None` to let
    /// the engine resolve its children and check.
    fn has_children(&self, _record: &R) -> Option<bool> {
        None
    }
}

/// An external data source feeding a [`TreeGridDataSource`](super::TreeGridDataSource).
///
/// At minimum, implement [`get_data`](TreeDataDelegate::get_data), which
/// returns a flat record list with parent ids. Override
/// [`build_tree`](TreeDataDelegate::build_tree) to hand over a ready-made
/// tree instead, and [`hierarchy`](TreeDataDelegate::hierarchy) to resolve
/// children lazily.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_treegrid::model::{TreeDataDelegate, TreeItem};
///
/// struct Inventory {
///     rows: Vec<Arc<TreeItem>>,
/// }
///
/// impl TreeDataDelegate<TreeItem> for Inventory {
///     fn get_data(&self) -> Vec<Arc<TreeItem>> {
///         self.rows.clone()
///     }
/// }
/// ```
pub trait TreeDataDelegate<R: TreeRecord>: Send + Sync {
    /// Returns all records as a flat list; records declare their parents.
    fn get_data(&self) -> Vec<Arc<R>>;

    /// Returns `true` once the delegate's data is available.
    fn is_ready(&self) -> bool {
        true
    }

    /// Returns the root records of a pre-built tree, if the delegate builds
    /// its own tree.
    fn build_tree(&self) -> Option<Vec<Arc<R>>> {
        None
    }

    /// Returns the delegate's hierarchy capability, if any.
    fn hierarchy(&self) -> Option<&dyn HierarchyDelegate<R>> {
        None
    }

    /// Returns a signal the delegate emits when its underlying data becomes
    /// available or changes. Data sources reload on every emission.
    fn data_loaded(&self) -> Option<&Signal<()>> {
        None
    }
}

//! Records displayed by a tree grid.
//!
//! The engine never owns record data. Records are shared as `Arc<R>` and are
//! identified by a stable id; everything the engine derives (depth, expansion,
//! parent/child indices) is keyed by that id.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// A record that can be placed in a tree grid.
///
/// Implementors provide a stable id and, optionally, an explicit parent id
/// (for flat record lists) and/or an embedded ordered list of children (for
/// pre-built trees).
///
/// # Example
///
/// ```
/// use horizon_treegrid::model::TreeRecord;
///
/// struct Employee {
///     id: u32,
///     manager: Option<u32>,
/// }
///
/// impl TreeRecord for Employee {
///     type Id = u32;
///
///     fn id(&self) -> u32 {
///         self.id
///     }
///
///     fn parent_id(&self) -> Option<u32> {
///         self.manager
///     }
/// }
/// ```
pub trait TreeRecord: Sized + Send + Sync + 'static {
    /// The identity type. Two records with equal ids are the same record.
    type Id: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    /// Returns the stable id of this record.
    fn id(&self) -> Self::Id;

    /// Returns the id of this record's parent, if the record declares one.
    fn parent_id(&self) -> Option<Self::Id> {
        None
    }

    /// Returns the embedded children of this record, in display order.
    fn children(&self) -> Option<&[Arc<Self>]> {
        None
    }
}

/// A general-purpose record carrying a string id and a payload.
///
/// Useful when the data does not already have a record type of its own.
///
/// ```
/// use std::sync::Arc;
/// use horizon_treegrid::model::{TreeItem, TreeRecord};
///
/// let leaf = Arc::new(TreeItem::new("docs/readme", 12));
/// let dir = TreeItem::new("docs", 0).with_children(vec![leaf]);
/// assert_eq!(dir.children().map(|c| c.len()), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TreeItem<T = ()> {
    id: String,
    parent: Option<String>,
    children: Vec<Arc<TreeItem<T>>>,
    /// The payload carried by this item.
    pub data: T,
}

impl<T> TreeItem<T> {
    /// Creates an item with no parent and no children.
    pub fn new(id: impl Into<String>, data: T) -> Self {
        Self {
            id: id.into(),
            parent: None,
            children: Vec::new(),
            data,
        }
    }

    /// Declares the parent id (for flat record lists).
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Sets the embedded children (for pre-built trees).
    pub fn with_children(mut self, children: Vec<Arc<TreeItem<T>>>) -> Self {
        self.children = children;
        self
    }

    /// Returns the id as a string slice.
    pub fn name(&self) -> &str {
        &self.id
    }
}

impl<T: Send + Sync + 'static> TreeRecord for TreeItem<T> {
    type Id = String;

    fn id(&self) -> String {
        self.id.clone()
    }

    fn parent_id(&self) -> Option<String> {
        self.parent.clone()
    }

    fn children(&self) -> Option<&[Arc<Self>]> {
        if self.children.is_empty() {
            None
        } else {
            Some(&self.children)
        }
    }
}

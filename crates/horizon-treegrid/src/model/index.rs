//! Parent/child indices over a loaded tree.
//!
//! `TreeIndex` owns the derived lookup tables of the current tree: id→record,
//! id→children and id→parent. Children are resolved lazily (embedded first,
//! then the delegate's hierarchy capability) and cached for the lifetime of
//! the tree. Everything is dropped by [`reset`](TreeIndex::reset) on load.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use horizon_treegrid_core::logging::targets;

use super::delegate::{HierarchyDelegate, TreeDataDelegate};
use super::record::TreeRecord;
use crate::error::{Result, TreeGridError};

pub(crate) struct TreeIndex<R: TreeRecord> {
    delegate: Option<Arc<dyn TreeDataDelegate<R>>>,
    records: HashMap<R::Id, Arc<R>>,
    children: HashMap<R::Id, Option<Vec<Arc<R>>>>,
    parents: HashMap<R::Id, R::Id>,
}

impl<R: TreeRecord> TreeIndex<R> {
    pub(crate) fn new(delegate: Option<Arc<dyn TreeDataDelegate<R>>>) -> Self {
        Self {
            delegate,
            records: HashMap::new(),
            children: HashMap::new(),
            parents: HashMap::new(),
        }
    }

    /// Drops every cached lookup.
    pub(crate) fn reset(&mut self) {
        self.records.clear();
        self.children.clear();
        self.parents.clear();
    }

    fn hierarchy(&self) -> Option<&dyn HierarchyDelegate<R>> {
        self.delegate.as_deref().and_then(|d| d.hierarchy())
    }

    pub(crate) fn register(&mut self, record: &Arc<R>) {
        self.records.insert(record.id(), record.clone());
    }

    pub(crate) fn register_all<'a>(&mut self, records: impl IntoIterator<Item = &'a Arc<R>>) {
        for record in records {
            self.register(record);
        }
    }

    pub(crate) fn record(&self, id: &R::Id) -> Option<Arc<R>> {
        self.records.get(id).cloned()
    }

    /// Partitions a flat record list into a tree.
    ///
    /// Records declaring a parent are appended to that parent's children in
    /// list order; the others become roots. Nothing is committed to the index
    /// unless every declared parent resolves.
    pub(crate) fn build_tree(&mut self, records: &[Arc<R>]) -> Result<Vec<Arc<R>>> {
        let by_id: HashMap<R::Id, Arc<R>> = records.iter().map(|r| (r.id(), r.clone())).collect();

        let mut roots = Vec::new();
        let mut groups: HashMap<R::Id, Vec<Arc<R>>> = HashMap::new();
        let mut parents = HashMap::new();

        for record in records {
            match record.parent_id() {
                Some(parent) => {
                    if !by_id.contains_key(&parent) {
                        tracing::warn!(
                            target: targets::INDEX,
                            record = ?record.id(),
                            parent = ?parent,
                            "dangling parent reference"
                        );
                        return Err(TreeGridError::dangling(&record.id(), &parent));
                    }
                    parents.insert(record.id(), parent.clone());
                    groups.entry(parent).or_default().push(record.clone());
                }
                None => roots.push(record.clone()),
            }
        }

        tracing::debug!(
            target: targets::INDEX,
            records = records.len(),
            roots = roots.len(),
            groups = groups.len(),
            "built tree from flat records"
        );

        self.records.extend(by_id);
        self.parents.extend(parents);
        self.children
            .extend(groups.into_iter().map(|(id, group)| (id, Some(group))));
        Ok(roots)
    }

    /// Returns the children of `record`, resolving and caching them on first use.
    pub(crate) fn children(&mut self, record: &R) -> Option<Vec<Arc<R>>> {
        let id = record.id();
        if let Some(cached) = self.children.get(&id) {
            return cached.clone();
        }

        let resolved = match record.children() {
            Some(embedded) => Some(embedded.to_vec()),
            None => self.hierarchy().and_then(|h| h.children(record)),
        };

        if let Some(children) = &resolved {
            for child in children {
                self.parents.insert(child.id(), id.clone());
                self.records.insert(child.id(), child.clone());
            }
        }
        self.children.insert(id, resolved.clone());
        resolved
    }

    pub(crate) fn parent(&self, record: &R) -> Option<R::Id> {
        self.hierarchy()
            .and_then(|h| h.parent(record))
            .or_else(|| record.parent_id())
            .or_else(|| self.parents.get(&record.id()).cloned())
    }

    pub(crate) fn has_children(&mut self, record: &R) -> bool {
        if let Some(answer) = self.hierarchy().and_then(|h| h.has_children(record)) {
            return answer;
        }
        self.children(record).is_some_and(|c| !c.is_empty())
    }

    /// Stably sorts the children group of `record` in place and returns it.
    pub(crate) fn sort_children<F>(&mut self, record: &R, compare: &F) -> Option<Vec<Arc<R>>>
    where
        F: Fn(&R, &R) -> Ordering + ?Sized,
    {
        self.children(record)?;
        let group = self.children.get_mut(&record.id())?.as_mut()?;
        group.sort_by(|a, b| compare(&**a, &**b));
        Some(group.clone())
    }
}

//! The materialization engine.
//!
//! This module turns a tree of records into the flat list of rows a grid
//! renders, and keeps that list up to date as nodes are expanded, collapsed,
//! filtered and sorted.
//!
//! # Core Types
//!
//! - `TreeRecord`: The trait records implement (id, parent id, children)
//! - `TreeItem`: A ready-made record with a string id and a payload
//! - `TreeGridDataSource`: The engine holding the view
//! - `TreeSignals`: Change notifications (rows added/removed, data loaded...)
//! - `TreeDataDelegate` / `HierarchyDelegate`: External data sources
//! - `FilterMatch`: Tri-state filter verdict
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_treegrid::model::{TreeGridDataSource, TreeItem};
//! use horizon_treegrid::TreeGridConfig;
//!
//! let records = vec![
//!     Arc::new(TreeItem::new("A", ())),
//!     Arc::new(TreeItem::new("A1", ()).with_parent("A")),
//!     Arc::new(TreeItem::new("A2", ()).with_parent("A")),
//! ];
//! let source = TreeGridDataSource::from_records(records, TreeGridConfig::default());
//!
//! source.signals().rows_added.connect(|range| {
//!     println!("rows {}..{} added", range.start, range.end);
//! });
//!
//! source.load().unwrap();
//! source.toggle(&"A".to_string()).unwrap();
//! assert_eq!(source.record_count().unwrap(), 3);
//!
//! source.apply_filter(|r: &TreeItem| r.name() == "A2").unwrap();
//! let names: Vec<_> = source.get_data(..).unwrap().iter().map(|r| r.name().to_string()).collect();
//! assert_eq!(names, ["A", "A2"]);
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! ┌────────────┐   parent links   ┌────────────────┐
//! │ TreeIndex  │<─────────────────│ NodeStateStore │
//! └────────────┘                  └────────────────┘
//!       │ children                        │ depth/expanded
//!       v                                 v
//! ┌──────────────────────────────────────────────────┐
//! │     TreeGridDataSource (view: Vec<Arc<R>>)       │
//! └──────────────────────────────────────────────────┘
//!       │
//!       v
//!   TreeSignals ──> renderer
//! ```

mod data_source;
mod delegate;
mod filter;
mod flatten;
mod index;
mod record;
mod signals;
mod state;

pub use data_source::{CompareFn, TreeGridDataSource};
pub use delegate::{HierarchyDelegate, TreeDataDelegate};
pub use filter::{FilterFn, FilterMatch};
pub use record::{TreeItem, TreeRecord};
pub use signals::{DataChange, RowRange, TreeSignals, TreeToggled};
pub use state::{NodeState, RowDecoration};

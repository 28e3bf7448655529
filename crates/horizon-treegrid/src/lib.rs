//! Horizon TreeGrid - hierarchical view materialization for tree grids.
//!
//! A [`TreeGridDataSource`](model::TreeGridDataSource) sits between a tree of
//! records and a row-based renderer. It keeps the currently visible rows in a
//! single flat list, updates that list in place on expand/collapse, rebuilds
//! it on filter and sort changes, and announces every change through signals.
//!
//! # Modules
//!
//! - [`model`]: Records, the data source, delegates, filters and signals
//! - [`config`]: Data source options, loadable from TOML or JSON
//! - [`debug`]: Text rendering of a view
//! - [`error`]: Error types
//!
//! Signals and logging targets come from `horizon-treegrid-core` and are
//! re-exported here.

pub use horizon_treegrid_core::*;

pub mod config;
pub mod debug;
pub mod error;
pub mod model;

pub use config::TreeGridConfig;
pub use error::{Result, TreeGridError};

/// Commonly used types.
pub mod prelude {
    pub use crate::config::TreeGridConfig;
    pub use crate::error::{Result, TreeGridError};
    pub use crate::model::{
        FilterMatch, HierarchyDelegate, RowRange, TreeDataDelegate, TreeGridDataSource, TreeItem,
        TreeRecord,
    };
    pub use horizon_treegrid_core::Signal;
}

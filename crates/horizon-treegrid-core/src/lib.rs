//! Core systems for Horizon TreeGrid.
//!
//! This crate provides the foundational pieces shared by the tree-grid
//! materialization engine:
//!
//! - **Signal/Slot System**: Synchronous, type-safe change notification
//! - **Logging**: `tracing` targets, span names and a perf span guard
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_treegrid_core::Signal;
//!
//! let data_loaded = Signal::<()>::new();
//! let conn_id = data_loaded.connect(|_| println!("view replaced"));
//! data_loaded.emit(());
//! data_loaded.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};

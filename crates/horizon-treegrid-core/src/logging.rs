//! Logging facilities for Horizon TreeGrid.
//!
//! Horizon TreeGrid uses the `tracing` crate for instrumentation. The library
//! never installs a subscriber; to see logs, install one in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_treegrid::model=debug")
//!     .init();
//! ```

/// Span names used throughout Horizon TreeGrid for tracing.
pub mod span_names {
    /// Full load of a data source.
    pub const LOAD: &str = "horizon_treegrid::load";
    /// Expand/collapse splice.
    pub const TOGGLE: &str = "horizon_treegrid::toggle";
    /// Filter rebuild.
    pub const FILTER: &str = "horizon_treegrid::filter";
    /// Sort rebuild.
    pub const SORT: &str = "horizon_treegrid::sort";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_treegrid_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_treegrid_core::signal";
    /// Materialization engine target.
    pub const MODEL: &str = "horizon_treegrid::model";
    /// Tree index target.
    pub const INDEX: &str = "horizon_treegrid::model::index";
    /// Configuration target.
    pub const CONFIG: &str = "horizon_treegrid::config";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for tracking the duration of whole operations such as a load.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_treegrid::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

//! Error types for the tree-grid engine.

use thiserror::Error;

/// Errors that can occur while loading or manipulating a tree-grid view.
#[derive(Error, Debug)]
pub enum TreeGridError {
    /// The view was queried or mutated before a successful `load`.
    #[error("data source not ready: call load() first")]
    NotReady,

    /// A record names a parent id that is not among the loaded records.
    #[error("record {record} references unknown parent {parent}")]
    DanglingReference {
        /// Debug rendering of the offending record's id.
        record: String,
        /// Debug rendering of the missing parent id.
        parent: String,
    },

    /// An id passed to `toggle` or `expand_all` is not a known record.
    #[error("no record with id {id}")]
    UnknownRecord {
        /// Debug rendering of the requested id.
        id: String,
    },

    /// A TOML configuration document could not be parsed.
    #[error("invalid TOML configuration: {0}")]
    ConfigToml(#[from] toml::de::Error),

    /// A JSON configuration document could not be parsed.
    #[error("invalid JSON configuration: {0}")]
    ConfigJson(#[from] serde_json::Error),
}

impl TreeGridError {
    pub(crate) fn dangling(record: &impl std::fmt::Debug, parent: &impl std::fmt::Debug) -> Self {
        Self::DanglingReference {
            record: format!("{record:?}"),
            parent: format!("{parent:?}"),
        }
    }

    pub(crate) fn unknown(id: &impl std::fmt::Debug) -> Self {
        Self::UnknownRecord {
            id: format!("{id:?}"),
        }
    }
}

/// Result type for tree-grid operations.
pub type Result<T> = std::result::Result<T, TreeGridError>;

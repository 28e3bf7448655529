//! Configuration for tree-grid data sources.
//!
//! Options can be built in code or read from JSON/TOML documents:
//!
//! ```
//! use horizon_treegrid::TreeGridConfig;
//!
//! let config = TreeGridConfig::from_toml_str("initial_tree_depth = 1").unwrap();
//! assert_eq!(config.initial_tree_depth, 1);
//!
//! let config = TreeGridConfig::new().with_initial_tree_depth(2);
//! assert_eq!(config.initial_tree_depth, 2);
//! ```

use horizon_treegrid_core::logging::targets;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options controlling how a data source materializes its view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeGridConfig {
    /// Depth down to which nodes are visible right after `load`.
    ///
    /// Every node with depth below this value starts expanded, so rows with
    /// depth `<= initial_tree_depth` are shown. `0` shows only the roots.
    pub initial_tree_depth: usize,
}

impl TreeGridConfig {
    /// Creates the default configuration (roots only, all collapsed).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial tree depth.
    pub fn with_initial_tree_depth(mut self, depth: usize) -> Self {
        self.initial_tree_depth = depth;
        self
    }

    /// Parses a configuration from a TOML document.
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        tracing::debug!(target: targets::CONFIG, ?config, "loaded TOML configuration");
        Ok(config)
    }

    /// Parses a configuration from a JSON document.
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)?;
        tracing::debug!(target: targets::CONFIG, ?config, "loaded JSON configuration");
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

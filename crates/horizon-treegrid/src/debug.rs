//! Text rendering of a data source's view, for logs and test diagnostics.
//!
//! ```
//! use std::sync::Arc;
//! use horizon_treegrid::debug::{TreeStyle, ViewDebug, ViewFormatOptions};
//! use horizon_treegrid::model::{TreeGridDataSource, TreeItem};
//! use horizon_treegrid::TreeGridConfig;
//!
//! let a = Arc::new(TreeItem::new("A", ()).with_children(vec![Arc::new(TreeItem::new("A1", ()))]));
//! let source = TreeGridDataSource::from_tree(vec![a], TreeGridConfig::default().with_initial_tree_depth(1));
//! source.load().unwrap();
//!
//! let debug = ViewDebug::with_options(ViewFormatOptions {
//!     style: TreeStyle::Ascii,
//!     ..Default::default()
//! });
//! let text = debug.format_with(&source, |r| r.name().to_string()).unwrap();
//! assert_eq!(text, "View (2 rows):\nA\n`-- A1\n");
//! ```

use std::sync::Arc;

use crate::error::Result;
use crate::model::{TreeGridDataSource, TreeRecord};

/// Style of tree connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact dash prefixes.
    Compact,
}

impl TreeStyle {
    /// (continuation, tee, elbow)
    fn connectors(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::Ascii => ("|", "+-- ", "`-- "),
            Self::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            Self::Compact => ("", "- ", "- "),
        }
    }
}

/// Configuration for view debug output.
#[derive(Debug, Clone)]
pub struct ViewFormatOptions {
    /// The style of tree connectors.
    pub style: TreeStyle,
    /// Prefix rows that have children with `[+]` or `[-]`.
    pub show_expanders: bool,
    /// Prefix every row with its view index.
    pub show_indices: bool,
    /// Rows deeper than this are left out (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for ViewFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_expanders: false,
            show_indices: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl ViewFormatOptions {
    /// Options showing expanders and row indices.
    pub fn detailed() -> Self {
        Self {
            show_expanders: true,
            show_indices: true,
            ..Default::default()
        }
    }
}

/// Renders the rows of a [`TreeGridDataSource`] as an indented listing.
#[derive(Debug, Clone, Default)]
pub struct ViewDebug {
    options: ViewFormatOptions,
}

impl ViewDebug {
    /// Create a formatter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter with custom options.
    pub fn with_options(options: ViewFormatOptions) -> Self {
        Self { options }
    }

    /// Formats the view, labelling rows with the debug form of their ids.
    pub fn format<R: TreeRecord>(&self, source: &TreeGridDataSource<R>) -> Result<String> {
        self.format_with(source, |record| format!("{:?}", record.id()))
    }

    /// Formats the view, labelling rows with `label`.
    ///
    /// Fails with `NotReady` if the data source has not been loaded.
    pub fn format_with<R, F>(&self, source: &TreeGridDataSource<R>, label: F) -> Result<String>
    where
        R: TreeRecord,
        F: Fn(&R) -> String,
    {
        let rows = source.get_data(..)?;
        let decorations: Vec<_> = rows.iter().map(|row| source.decoration(row)).collect();
        let depths: Vec<usize> = decorations.iter().map(|d| d.depth).collect();

        let mut output = format!("View ({} rows):\n", rows.len());
        if rows.is_empty() {
            output.push_str("  (empty)\n");
            return Ok(output);
        }

        for (i, (row, decoration)) in rows.iter().zip(&decorations).enumerate() {
            if self.options.max_depth.is_some_and(|max| decoration.depth > max) {
                continue;
            }
            if self.options.show_indices {
                output.push_str(&format!("{i:>4} "));
            }
            output.push_str(&self.build_prefix(decoration.depth, is_last_sibling(&depths, i)));
            if self.options.show_expanders && decoration.has_children {
                output.push_str(if decoration.expanded { "[-] " } else { "[+] " });
            }
            output.push_str(&label(Arc::as_ref(row)));
            output.push('\n');
        }
        Ok(output)
    }

    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, tee, elbow) = self.options.style.connectors();
        let mut prefix = String::new();
        for _ in 1..depth {
            prefix.push_str(branch);
            prefix.push_str(&" ".repeat(self.options.indent_size));
        }
        prefix.push_str(if is_last { elbow } else { tee });
        prefix
    }
}

/// A row is the last of its siblings when the next row that is not one of
/// its descendants is shallower.
fn is_last_sibling(depths: &[usize], row: usize) -> bool {
    let depth = depths[row];
    depths[row + 1..]
        .iter()
        .find(|&&d| d <= depth)
        .is_none_or(|&d| d < depth)
}

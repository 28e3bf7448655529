//! Filter predicates.
//!
//! A filter classifies each record as [`FilterMatch::Include`],
//! [`FilterMatch::Neutral`] or [`FilterMatch::Exclude`]. Plain boolean
//! predicates work too: `true` includes the record, `false` leaves it neutral
//! so its descendants are still searched for matches.

use std::sync::Arc;

/// The verdict of a filter for a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMatch {
    /// Hide the record and do not search its descendants.
    Exclude,
    /// Show the record only if an ancestor matched; descendants are searched.
    Neutral,
    /// Show the record.
    Include,
}

impl FilterMatch {
    /// Returns `true` if a record with this verdict is shown, given whether
    /// one of its ancestors already matched.
    pub fn matches(self, ancestor_matched: bool) -> bool {
        match self {
            Self::Include => true,
            Self::Neutral => ancestor_matched,
            Self::Exclude => false,
        }
    }

    /// Returns `true` for [`FilterMatch::Exclude`].
    pub fn is_excluded(self) -> bool {
        self == Self::Exclude
    }
}

impl From<bool> for FilterMatch {
    fn from(value: bool) -> Self {
        if value { Self::Include } else { Self::Neutral }
    }
}

/// Type alias for a stored filter predicate.
///
/// Predicates are called with the data source locked, so they must not call
/// back into it.
pub type FilterFn<R> = Arc<dyn Fn(&R) -> FilterMatch + Send + Sync>;

pub(crate) fn filter_fn<R, F, M>(predicate: F) -> FilterFn<R>
where
    R: 'static,
    F: Fn(&R) -> M + Send + Sync + 'static,
    M: Into<FilterMatch> + 'static,
{
    Arc::new(move |record: &R| -> FilterMatch { predicate(record).into() })
}

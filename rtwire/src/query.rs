//! List options, pagination cursors and pages.
//!
//! List endpoints accept `limit`, `next` and `status=pending` query
//! parameters. [`ListOptions`] holds them as named fields; it can also be
//! assembled from an ordered sequence of [`ListOption`]s, where a later
//! option replaces an earlier one with the same key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque pagination token returned in an envelope's `next` field.
///
/// A `Cursor` is never empty: the service's empty cursor ("no further
/// page") is represented as `None` in [`Page::next`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Converts a wire cursor, mapping the empty string to `None`.
    #[must_use]
    pub fn from_wire(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() { None } else { Some(Self(raw)) }
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of results from a list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Cursor for the following page, `None` on the last page.
    pub next: Option<Cursor>,
    /// Items on this page, in service order.
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Returns `true` if there are no further pages.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// A single list modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOption {
    /// Caps the number of results returned by one call.
    Limit(u32),
    /// Resumes after a cursor returned by a previous call.
    Next(Cursor),
    /// Restricts account transactions to those not yet credited.
    Pending,
}

/// Query options for list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Cursor to resume from.
    pub next: Option<Cursor>,
    /// Only pending transactions (account transactions only).
    pub pending: bool,
}

impl ListOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the result limit.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the cursor to resume from. `None` starts from the beginning.
    #[must_use]
    pub fn next(mut self, cursor: Option<Cursor>) -> Self {
        self.next = cursor;
        self
    }

    /// Restricts results to pending transactions.
    #[must_use]
    pub const fn pending(mut self) -> Self {
        self.pending = true;
        self
    }

    /// Applies one option; a later value for the same key wins.
    #[must_use]
    pub fn apply(self, option: ListOption) -> Self {
        match option {
            ListOption::Limit(limit) => self.limit(limit),
            ListOption::Next(cursor) => self.next(Some(cursor)),
            ListOption::Pending => self.pending(),
        }
    }

    /// Returns the query parameters for these options, in a stable order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(next) = &self.next {
            pairs.push(("next", next.as_str().to_owned()));
        }
        if self.pending {
            pairs.push(("status", "pending".to_owned()));
        }
        pairs
    }

    /// Returns only the paging parameters (`limit`, `next`).
    #[must_use]
    pub fn page_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.query_pairs();
        pairs.retain(|(key, _)| *key != "status");
        pairs
    }
}

impl FromIterator<ListOption> for ListOptions {
    fn from_iter<I: IntoIterator<Item = ListOption>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), Self::apply)
    }
}

impl From<ListOption> for ListOptions {
    fn from(option: ListOption) -> Self {
        Self::default().apply(option)
    }
}

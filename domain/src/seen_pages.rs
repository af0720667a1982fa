//! Append-only set of article page ids already used for generation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Page ids that have already produced a question (or were permanently
/// abandoned). Grows monotonically; there is deliberately no removal API,
/// so a resumed run can never revisit an article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeenPages(HashSet<u64>);

impl SeenPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, page_id: u64) -> bool {
        self.0.contains(&page_id)
    }

    /// Mark a page as seen. Returns `true` if it was not seen before.
    pub fn insert(&mut self, page_id: u64) -> bool {
        self.0.insert(page_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<u64> for SeenPages {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

//! Response envelope and pagination types
//!
//! Every backend response wraps its payload as `{ "data": ..., "message": ... }`;
//! list endpoints add a `pagination` block next to the items.

use serde::{Deserialize, Serialize};

/// Standard `{ data, message }` response wrapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
}

/// Pagination metadata attached to list responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_prev: bool,
    pub has_next: bool,
}

/// One page of a list endpoint
///
/// The collection key differs per resource (`users`, `rooms`, ...), so the
/// items are captured under whichever array field the backend sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub pagination: Pagination,
    #[serde(flatten)]
    pub items: std::collections::BTreeMap<String, Vec<T>>,
}

impl<T> Page<T> {
    /// Items of the page regardless of the collection key
    pub fn into_items(self) -> Vec<T> {
        self.items.into_values().flatten().collect()
    }
}

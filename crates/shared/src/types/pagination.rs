//! Pagination types for list queries.

use serde::{Deserialize, Serialize};

/// Largest page a caller may request.
pub const MAX_LIMIT: u64 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Number of items per page.
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Number of items to skip.
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl PageRequest {
    /// Creates a page request, clamping the limit to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(limit: u64, offset: u64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            offset,
        }
    }

    /// Returns the offset for database queries.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit.clamp(1, MAX_LIMIT)
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Items per page.
    pub limit: u64,
    /// Items skipped.
    pub offset: u64,
    /// Total number of items across all pages.
    pub total: u64,
}

impl PageMeta {
    /// Returns true if items remain after this page.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.offset.saturating_add(self.limit) < self.total
    }
}

impl<T> PageResponse<T> {
    /// Creates a new paginated response.
    #[must_use]
    pub fn new(data: Vec<T>, page: PageRequest, total: u64) -> Self {
        Self {
            data,
            meta: PageMeta {
                limit: page.limit(),
                offset: page.offset(),
                total,
            },
        }
    }
}

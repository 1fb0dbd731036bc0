//! Offset pagination for list endpoints.

use serde::Serialize;

/// Errors that can occur when building a [`PageRequest`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    /// `page` was zero.
    #[error("page must be a positive integer")]
    InvalidPage,
    /// `limit` was zero or above [`PageRequest::MAX_LIMIT`].
    #[error("limit must be between 1 and {max}")]
    InvalidLimit {
        /// Largest accepted page size.
        max: u32,
    },
}

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Page used when the client does not ask for one.
    pub const DEFAULT_PAGE: u32 = 1;
    /// Page size used when the client does not ask for one.
    pub const DEFAULT_LIMIT: u32 = 10;
    /// Largest page size a client may ask for.
    pub const MAX_LIMIT: u32 = 100;

    /// Build a page request, filling in defaults for missing values.
    ///
    /// # Errors
    ///
    /// Returns a [`PaginationError`] if `page` is zero or `limit` is outside
    /// `1..=MAX_LIMIT`.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self, PaginationError> {
        let page = page.unwrap_or(Self::DEFAULT_PAGE);
        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT);

        if page == 0 {
            return Err(PaginationError::InvalidPage);
        }
        if limit == 0 || limit > Self::MAX_LIMIT {
            return Err(PaginationError::InvalidLimit {
                max: Self::MAX_LIMIT,
            });
        }

        Ok(Self { page, limit })
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// The page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip: `(page - 1) * limit`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// The 1-based page number that was served.
    pub page: u32,
    /// The page size that was applied.
    pub limit: u32,
    /// Total rows matching the filters.
    pub total: u64,
    /// `ceil(total / limit)`; zero when nothing matches.
    pub total_page: u64,
}

impl Pagination {
    /// Build metadata for `request` given the total row count.
    #[must_use]
    pub fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_page: total.div_ceil(u64::from(request.limit)),
        }
    }
}

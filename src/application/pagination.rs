//! Page/limit normalization for offset-paginated listings.

use serde::Serialize;
use thiserror::Error;

/// Largest page size a caller may request; larger values are clamped.
pub const MAX_LIMIT: u32 = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page must be between 1 and {max}, got {0}", max = u32::MAX)]
    InvalidPage(i64),
    #[error("limit must be a positive integer, got {0}")]
    InvalidLimit(i64),
}

/// Validate a 1-based page number. Pages beyond `u32::MAX` are rejected
/// rather than silently rewritten.
pub fn normalize_page(page: i64) -> Result<u32, PaginationError> {
    match u32::try_from(page) {
        Ok(page) if page > 0 => Ok(page),
        _ => Err(PaginationError::InvalidPage(page)),
    }
}

/// Validate a page size and clamp it to [`MAX_LIMIT`].
pub fn normalize_limit(limit: i64) -> Result<u32, PaginationError> {
    if limit <= 0 {
        return Err(PaginationError::InvalidLimit(limit));
    }
    Ok(u32::try_from(limit).map_or(MAX_LIMIT, |limit| limit.min(MAX_LIMIT)))
}

/// The slice of a listing that will actually be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub limit: u32,
    pub total_count: u64,
    pub total_pages: u64,
}

impl PageWindow {
    /// Resolve normalized `page`/`limit` against the stored row count. A page
    /// past the end is pulled back to the last page; an empty listing keeps
    /// the requested page.
    pub fn resolve(page: u32, limit: u32, total_count: u64) -> Self {
        let total_pages = total_count.div_ceil(u64::from(limit));
        let page = if total_pages > 0 && u64::from(page) > total_pages {
            u32::try_from(total_pages).unwrap_or(page)
        } else {
            page
        };

        Self {
            page,
            limit,
            total_count,
            total_pages,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// One page of results together with the metadata it was fetched with.
#[derive(Debug, Clone, Serialize)]
pub struct OffsetPage<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total_count: u64,
    pub total_pages: u64,
}

impl<T> OffsetPage<T> {
    pub fn new(window: PageWindow, items: Vec<T>) -> Self {
        Self {
            items,
            page: window.page,
            limit: window.limit,
            total_count: window.total_count,
            total_pages: window.total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> OffsetPage<U> {
        OffsetPage {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }
}

//! Page-based pagination.
//!
//! List endpoints accept `page` (1-based) and `limit` query parameters and
//! report the unpaginated match count in an `X-Total-Count` header.

use serde::Serialize;

/// Errors that can occur when constructing a [`Page`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageError {
    /// Page numbers start at 1.
    #[error("page must be at least 1")]
    ZeroPage,
    /// Limit of zero or above the maximum.
    #[error("limit must be between 1 and {max}", max = Page::MAX_LIMIT)]
    InvalidLimit,
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    number: u32,
    limit: u32,
}

impl Page {
    /// Largest page size a client may request.
    pub const MAX_LIMIT: u32 = 100;
    /// Page size used when the client does not ask for one.
    pub const DEFAULT_LIMIT: u32 = 10;

    /// Build a page from optional query parameters.
    ///
    /// # Errors
    ///
    /// Returns `PageError` for page `0` or a limit outside `1..=MAX_LIMIT`.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self, PageError> {
        let number = page.unwrap_or(1);
        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT);

        if number == 0 {
            return Err(PageError::ZeroPage);
        }
        if limit == 0 || limit > Self::MAX_LIMIT {
            return Err(PageError::InvalidLimit);
        }

        Ok(Self { number, limit })
    }

    /// 1-based page number.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Rows per page, as a SQL `LIMIT`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }

    /// Rows to skip, as a SQL `OFFSET`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = Page::new(None, None).unwrap();
        assert_eq!(page, Page::default());
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn test_offset() {
        let page = Page::new(Some(3), Some(25)).unwrap();
        assert_eq!(page.number(), 3);
        assert_eq!(page.offset(), 50);
        assert_eq!(page.limit(), 25);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(Page::new(Some(0), None), Err(PageError::ZeroPage));
        assert_eq!(Page::new(None, Some(0)), Err(PageError::InvalidLimit));
        assert_eq!(Page::new(None, Some(101)), Err(PageError::InvalidLimit));
    }
}

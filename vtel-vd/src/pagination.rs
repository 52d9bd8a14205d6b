//! Pagination bounds for sample listing
//!
//! Pages are 0-indexed. The page size ceiling is enforced here, at the
//! request boundary; the query service trusts a constructed [`PageRequest`].

use vtel_common::{Error, Result};

/// Largest page a caller may request
pub const MAX_PAGE_LIMIT: i64 = 20;

/// Page size used when the caller does not specify one
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Validated page/limit pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl PageRequest {
    /// Validate a requested page.
    ///
    /// # Examples
    /// ```
    /// use vtel_vd::pagination::PageRequest;
    ///
    /// let p = PageRequest::new(2, 10).unwrap();
    /// assert_eq!(p.offset(), 20);
    ///
    /// assert!(PageRequest::new(0, 21).is_err());
    /// assert!(PageRequest::new(-1, 10).is_err());
    /// ```
    pub fn new(page: i64, limit: i64) -> Result<Self> {
        if page < 0 {
            return Err(Error::Validation(format!(
                "page must be >= 0 (got {})",
                page
            )));
        }
        if !(0..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(Error::Validation(format!(
                "limit must be between 0 and {} (got {})",
                MAX_PAGE_LIMIT, limit
            )));
        }

        Ok(Self { page, limit })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Row offset for SQL LIMIT/OFFSET
    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

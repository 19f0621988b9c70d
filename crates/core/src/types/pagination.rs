//! Offset-based pagination.

/// Errors produced when validating pagination arguments.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationError {
    /// Limit or page was zero or negative.
    #[error("Limit and page must be greater than 0")]
    NotPositive,
}

/// A validated `(limit, page)` pair.
///
/// Pages are 1-based: page 1 starts at offset 0, page 2 at `limit`, and so on.
///
/// ```
/// use campfinder_core::Pagination;
///
/// let page = Pagination::new(10, 2).unwrap();
/// assert_eq!(page.offset(), 10);
/// assert!(Pagination::new(0, 1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: i64,
    page: i64,
}

impl Pagination {
    /// Default page size.
    pub const DEFAULT_LIMIT: i64 = 10;
    /// Default page number.
    pub const DEFAULT_PAGE: i64 = 1;

    /// Validate a limit and page.
    ///
    /// # Errors
    ///
    /// Returns `PaginationError::NotPositive` if either value is `<= 0`.
    pub const fn new(limit: i64, page: i64) -> Result<Self, PaginationError> {
        if limit <= 0 || page <= 0 {
            return Err(PaginationError::NotPositive);
        }
        Ok(Self { limit, page })
    }

    /// Build from optional arguments, falling back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns `PaginationError::NotPositive` if a provided value is `<= 0`.
    pub fn from_optional(limit: Option<i64>, page: Option<i64>) -> Result<Self, PaginationError> {
        Self::new(
            limit.unwrap_or(Self::DEFAULT_LIMIT),
            page.unwrap_or(Self::DEFAULT_PAGE),
        )
    }

    /// Maximum number of records to return.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.limit
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> i64 {
        self.page
    }

    /// Number of records to skip: `(page - 1) * limit`.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            page: Self::DEFAULT_PAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_limit_rejected() {
        assert_eq!(Pagination::new(0, 1), Err(PaginationError::NotPositive));
    }

    #[test]
    fn test_zero_page_rejected() {
        assert_eq!(Pagination::new(10, 0), Err(PaginationError::NotPositive));
    }

    #[test]
    fn test_negative_rejected() {
        assert!(Pagination::new(-1, 1).is_err());
        assert!(Pagination::new(1, -3).is_err());
    }

    #[test]
    fn test_offset() {
        assert_eq!(Pagination::default().offset(), 0);
        assert_eq!(Pagination::new(10, 2).map(|p| p.offset()), Ok(10));
        assert_eq!(Pagination::new(5, 4).map(|p| p.offset()), Ok(15));
    }

    #[test]
    fn test_from_optional_defaults() {
        let page = Pagination::from_optional(None, Some(3));
        assert_eq!(page.map(|p| (p.limit(), p.offset())), Ok((10, 20)));
    }
}

//! Limit/offset pagination shared by every listing

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

/// A validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Page {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Build a page from optional query parameters
    ///
    /// A missing limit falls back to `default_limit`; a limit above
    /// `max_limit` is rejected rather than clamped.
    pub fn from_query(
        limit: Option<usize>,
        offset: Option<usize>,
        default_limit: usize,
        max_limit: usize,
    ) -> Result<Self> {
        let limit = limit.unwrap_or(default_limit);
        if limit > max_limit {
            return Err(DashboardError::validation(format!(
                "limit must be less than or equal to {}",
                max_limit
            )));
        }
        Ok(Self {
            limit,
            offset: offset.unwrap_or(0),
        })
    }

    /// Response metadata for a page that returned `count` items
    pub fn meta(&self, count: usize) -> PaginationMeta {
        PaginationMeta {
            limit: self.limit,
            offset: self.offset,
            count,
        }
    }
}

/// Pagination block included in listing responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub limit: usize,
    pub offset: usize,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = Page::from_query(None, None, 50, 100).unwrap();
        assert_eq!(page, Page::new(50, 0));
    }

    #[test]
    fn test_limit_above_max_rejected() {
        assert!(Page::from_query(Some(101), None, 50, 100).is_err());
        assert!(Page::from_query(Some(100), Some(20), 50, 100).is_ok());
    }

    #[test]
    fn test_meta() {
        let meta = Page::new(20, 40).meta(7);
        assert_eq!(meta.limit, 20);
        assert_eq!(meta.offset, 40);
        assert_eq!(meta.count, 7);
    }
}

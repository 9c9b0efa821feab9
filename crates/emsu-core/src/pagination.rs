//! Pagination utilities for list endpoints.
//!
//! List endpoints take `page` (1-indexed, default 1) and `per_page`
//! (1-100, default 20) and answer with a `data` array plus a [`PaginationMeta`]
//! block:
//!
//! ```json
//! {
//!   "data": [...],
//!   "meta": { "total": 45, "page": 2, "per_page": 20, "pages": 3, "has_more": true }
//! }
//! ```
//!
//! `limit` is accepted as an alias of `per_page`.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::serde::deserialize_optional_i64;

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

/// Metadata about a paginated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of matching items across all pages
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page (the limit that was applied)
    pub per_page: i64,
    /// Number of pages for this `per_page`
    pub pages: i64,
    /// Whether there are more items after this page
    pub has_more: bool,
}

impl PaginationMeta {
    pub fn new(params: &PaginationParams, total: i64) -> Self {
        let per_page = params.per_page();
        let page = params.page();
        let pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };

        Self {
            total,
            page,
            per_page,
            pages,
            has_more: params.offset() + per_page < total,
        }
    }
}

/// Query parameters for page-based pagination.
///
/// - `page` is clamped to a minimum of 1
/// - `per_page` is clamped to the range [1, 100]
#[derive(Debug, Clone, Default, Hash, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Items per page (1-100, default: 20)
    #[serde(default, alias = "limit", deserialize_with = "deserialize_optional_i64")]
    pub per_page: Option<i64>,
}

impl PaginationParams {
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    #[must_use]
    pub fn per_page(&self) -> i64 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<i64>, per_page: Option<i64>) -> PaginationParams {
        PaginationParams { page, per_page }
    }

    #[test]
    fn test_defaults() {
        let p = PaginationParams::default();
        assert_eq!(p.page(), 1);
        assert_eq!(p.per_page(), 20);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_offset_from_page() {
        let p = params(Some(3), Some(25));
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn test_clamping() {
        let p = params(Some(-4), Some(500));
        assert_eq!(p.page(), 1);
        assert_eq!(p.per_page(), 100);

        let p = params(Some(0), Some(0));
        assert_eq!(p.page(), 1);
        assert_eq!(p.per_page(), 1);
    }

    #[test]
    fn test_meta_pages_round_up() {
        let meta = PaginationMeta::new(&params(Some(1), Some(20)), 45);
        assert_eq!(meta.pages, 3);
        assert!(meta.has_more);
    }

    #[test]
    fn test_meta_last_page() {
        let meta = PaginationMeta::new(&params(Some(3), Some(20)), 45);
        assert_eq!(meta.page, 3);
        assert!(!meta.has_more);
    }

    #[test]
    fn test_meta_empty() {
        let meta = PaginationMeta::new(&PaginationParams::default(), 0);
        assert_eq!(meta.pages, 0);
        assert_eq!(meta.total, 0);
        assert!(!meta.has_more);
    }

    #[test]
    fn test_deserialize_from_query_strings() {
        let p: PaginationParams =
            serde_json::from_str(r#"{"page": "2", "limit": "5"}"#).unwrap();
        assert_eq!(p.page(), 2);
        assert_eq!(p.per_page(), 5);
    }

    #[test]
    fn test_deserialize_empty_strings() {
        let p: PaginationParams = serde_json::from_str(r#"{"page": "", "per_page": ""}"#).unwrap();
        assert_eq!(p.page, None);
        assert_eq!(p.per_page, None);
    }
}

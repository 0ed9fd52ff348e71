//! # Pagination & Sorting
//!
//! List endpoints share one contract:
//!
//! ```text
//! GET /v1/<resource>?page=2&limit=20&sortBy=lastName&sortOrder=desc
//!
//!   → { "total": 113, "pages": 6, "currentPage": 2, "data": [ ... ] }
//! ```
//!
//! Pagination is offset-based: `offset = (page - 1) * limit`, with the
//! limit clamped to [1, MAX_PAGE_SIZE] and defaulting to DEFAULT_PAGE_SIZE.
//! Sorting is restricted to a per-resource allow-list; an unknown sort
//! field or order is rejected with a validation error BEFORE any query
//! runs (this is what keeps the sort parameter out of SQL injection
//! territory — only allow-listed column names ever reach ORDER BY).

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// =============================================================================
// Sort Order
// =============================================================================

/// Sort direction for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// The SQL keyword for this direction.
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    /// Parses the wire value (`asc` / `desc`, case-insensitive).
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ValidationError::NotAllowed {
                field: "sortOrder".to_string(),
                allowed: vec!["asc".to_string(), "desc".to_string()],
            }),
        }
    }
}

// =============================================================================
// List Parameters
// =============================================================================

/// Common query parameters for list endpoints.
///
/// Deserialized straight from the query string; resource-specific filters
/// ride alongside in their own structs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListParams {
    /// Effective page number (1-based; zero and absent both mean 1).
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size, clamped to [1, MAX_PAGE_SIZE].
    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset for the effective page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }

    /// Builds a validated `ORDER BY` fragment (`"last_name DESC"`).
    ///
    /// `allowed` maps wire-level sort names to column names
    /// (`[("lastName", "last_name"), ...]`); `default` is the column used
    /// when the client sends no `sortBy`. Unknown sort fields and orders
    /// are rejected here, before the database is touched.
    pub fn order_by(
        &self,
        allowed: &[(&str, &str)],
        default: &str,
    ) -> Result<String, ValidationError> {
        let order = match self.sort_order.as_deref() {
            Some(raw) => SortOrder::parse(raw)?,
            None => SortOrder::default(),
        };

        let column = match self.sort_by.as_deref() {
            None => default,
            Some(wire) => {
                allowed
                    .iter()
                    .find(|(name, _)| *name == wire)
                    .map(|(_, column)| *column)
                    .ok_or_else(|| ValidationError::NotAllowed {
                        field: "sortBy".to_string(),
                        allowed: allowed.iter().map(|(name, _)| name.to_string()).collect(),
                    })?
            }
        };

        Ok(format!("{} {}", column, order.sql()))
    }
}

// =============================================================================
// Page Envelope
// =============================================================================

/// The list response envelope: `{total, pages, currentPage, data}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Total rows matching the filter, across all pages.
    pub total: u64,

    /// Total number of pages at the effective limit.
    pub pages: u32,

    /// The (1-based) page this response carries.
    pub current_page: u32,

    pub data: Vec<T>,
}

impl<T> Page<T> {
    /// Assembles the envelope, computing the page count from `total` and
    /// the effective limit.
    pub fn new(total: u64, params: &ListParams, data: Vec<T>) -> Self {
        let limit = u64::from(params.limit());
        let pages = total.div_ceil(limit).min(u64::from(u32::MAX)) as u32;

        Page {
            total,
            pages,
            current_page: params.page(),
            data,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<u32>, limit: Option<u32>) -> ListParams {
        ListParams {
            page,
            limit,
            sort_by: None,
            sort_order: None,
        }
    }

    const ALLOWED: &[(&str, &str)] = &[("lastName", "last_name"), ("address", "address")];

    #[test]
    fn test_limit_defaults_and_clamps() {
        assert_eq!(params(None, None).limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(params(None, Some(0)).limit(), 1);
        assert_eq!(params(None, Some(50)).limit(), 50);
        assert_eq!(params(None, Some(10_000)).limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_offset_math() {
        assert_eq!(params(None, None).offset(), 0);
        assert_eq!(params(Some(1), Some(20)).offset(), 0);
        assert_eq!(params(Some(3), Some(20)).offset(), 40);
        // page=0 is treated as page 1
        assert_eq!(params(Some(0), Some(20)).offset(), 0);
    }

    #[test]
    fn test_order_by_default_and_allowed() {
        let p = params(None, None);
        assert_eq!(p.order_by(ALLOWED, "last_name").unwrap(), "last_name ASC");

        let p = ListParams {
            sort_by: Some("address".to_string()),
            sort_order: Some("desc".to_string()),
            ..Default::default()
        };
        assert_eq!(p.order_by(ALLOWED, "last_name").unwrap(), "address DESC");
    }

    #[test]
    fn test_order_by_rejects_unknown_field() {
        let p = ListParams {
            sort_by: Some("unknownField".to_string()),
            ..Default::default()
        };
        let err = p.order_by(ALLOWED, "last_name").unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { ref field, .. } if field == "sortBy"));
    }

    #[test]
    fn test_order_by_rejects_unknown_order() {
        let p = ListParams {
            sort_order: Some("sideways".to_string()),
            ..Default::default()
        };
        let err = p.order_by(ALLOWED, "last_name").unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { ref field, .. } if field == "sortOrder"));
    }

    #[test]
    fn test_page_envelope_math() {
        let p = params(Some(2), Some(10));
        let page = Page::new(25, &p, vec![1, 2, 3]);
        assert_eq!(page.total, 25);
        assert_eq!(page.pages, 3);
        assert_eq!(page.current_page, 2);

        let empty: Page<i32> = Page::new(0, &params(None, None), vec![]);
        assert_eq!(empty.pages, 0);
    }

    #[test]
    fn test_envelope_wire_names() {
        let page = Page::new(1, &params(None, None), vec![1]);
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("currentPage").is_some());
        assert!(json.get("total").is_some());
        assert!(json.get("pages").is_some());
        assert!(json.get("data").is_some());
    }
}

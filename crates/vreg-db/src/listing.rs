//! # List Query Plumbing
//!
//! Shared filter + paginate + sort machinery for every repository's
//! `list` operation.
//!
//! ## Contract
//! ```text
//! list(filters, page, limit, sortBy, sortOrder)
//!      │
//!      ▼
//!  SELECT COUNT(*) FROM t WHERE lower(col) LIKE '%' || lower(?) || '%' ...
//!      │
//!      ▼
//!  SELECT * FROM t [same WHERE] ORDER BY <validated> LIMIT ? OFFSET ?
//!      │
//!      ▼
//!  Page { total, pages, currentPage, data }
//! ```
//!
//! Filtering is case-insensitive substring match on designated text
//! columns. Filter VALUES are always bound parameters; table and column
//! NAMES are static strings supplied by repository code, and the ORDER BY
//! fragment arrives pre-validated against the resource's sort allow-list
//! (see `vreg_core::paging::ListParams::order_by`) — nothing
//! client-controlled is ever interpolated into SQL text.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};

use vreg_core::paging::{ListParams, Page};

use crate::error::DbResult;

/// Builder for one paginated list query.
pub struct ListQuery<'a> {
    table: &'static str,
    filters: Vec<(&'static str, &'a str)>,
}

impl<'a> ListQuery<'a> {
    /// Starts a list query over `table`.
    pub fn new(table: &'static str) -> Self {
        ListQuery {
            table,
            filters: Vec::new(),
        }
    }

    /// Adds a case-insensitive substring filter on `column` when the
    /// client supplied a non-empty value.
    pub fn filter(mut self, column: &'static str, value: Option<&'a str>) -> Self {
        if let Some(value) = value {
            let value = value.trim();
            if !value.is_empty() {
                self.filters.push((column, value));
            }
        }
        self
    }

    /// The WHERE clause for the accumulated filters ("" when unfiltered).
    fn where_clause(&self) -> String {
        if self.filters.is_empty() {
            return String::new();
        }

        let conditions: Vec<String> = self
            .filters
            .iter()
            .map(|(column, _)| format!("lower({}) LIKE '%' || lower(?) || '%'", column))
            .collect();

        format!(" WHERE {}", conditions.join(" AND "))
    }

    /// Runs the COUNT + page query and assembles the envelope.
    ///
    /// `order_by` must come from `ListParams::order_by` (allow-listed).
    pub async fn fetch_page<T>(
        &self,
        pool: &SqlitePool,
        params: &ListParams,
        order_by: &str,
    ) -> DbResult<Page<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let where_clause = self.where_clause();

        let count_sql = format!("SELECT COUNT(*) FROM {}{}", self.table, where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for (_, value) in &self.filters {
            count_query = count_query.bind(*value);
        }
        let total = count_query.fetch_one(pool).await?.max(0) as u64;

        let page_sql = format!(
            "SELECT * FROM {}{} ORDER BY {} LIMIT ? OFFSET ?",
            self.table, where_clause, order_by
        );
        let mut page_query = sqlx::query_as::<_, T>(&page_sql);
        for (_, value) in &self.filters {
            page_query = page_query.bind(*value);
        }
        let data = page_query
            .bind(i64::from(params.limit()))
            .bind(params.offset() as i64)
            .fetch_all(pool)
            .await?;

        Ok(Page::new(total, params, data))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

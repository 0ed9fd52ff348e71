//! Owner-registry repository. The registry is system-maintained (see
//! [`crate::reconcile`]), so this exposes read access only.

use sqlx::SqlitePool;

use vreg_core::paging::{ListParams, Page};
use vreg_core::Owner;

use crate::error::DbResult;
use crate::listing::ListQuery;

/// Read-only repository over the owner registry.
#[derive(Debug, Clone)]
pub struct OwnerRepository {
    pool: SqlitePool,
}

impl OwnerRepository {
    /// Sortable fields: wire name → column.
    pub const SORT_FIELDS: &'static [(&'static str, &'static str)] = &[("address", "address")];

    /// Creates a new OwnerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OwnerRepository { pool }
    }

    /// Lists registry rows with an optional substring filter on the
    /// address.
    pub async fn list(&self, address: Option<&str>, params: &ListParams) -> DbResult<Page<Owner>> {
        let order_by = params.order_by(Self::SORT_FIELDS, "address")?;

        ListQuery::new("owners")
            .filter("address", address)
            .fetch_page(&self.pool, params, &order_by)
            .await
    }

    /// Looks up the registry row for an exact address.
    pub async fn get_by_address(&self, address: &str) -> DbResult<Option<Owner>> {
        let owner = sqlx::query_as::<_, Owner>("SELECT * FROM owners WHERE address = ?1")
            .bind(address)
            .fetch_optional(&self.pool)
            .await?;

        Ok(owner)
    }
}

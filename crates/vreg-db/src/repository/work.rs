//! Works-catalog repository. Prices are integer cents, never floats.

use sqlx::SqlitePool;
use uuid::Uuid;

use vreg_core::paging::{ListParams, Page};
use vreg_core::{NewWork, Work, WorkUpdate};

use crate::error::{DbError, DbResult};
use crate::listing::ListQuery;

/// Repository for the works catalog.
#[derive(Debug, Clone)]
pub struct WorkRepository {
    pool: SqlitePool,
}

impl WorkRepository {
    /// Sortable fields: wire name → column.
    pub const SORT_FIELDS: &'static [(&'static str, &'static str)] =
        &[("name", "name"), ("priceCents", "price_cents")];

    /// Creates a new WorkRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WorkRepository { pool }
    }

    /// Lists catalog entries with an optional substring filter on the
    /// name.
    pub async fn list(&self, name: Option<&str>, params: &ListParams) -> DbResult<Page<Work>> {
        let order_by = params.order_by(Self::SORT_FIELDS, "name")?;

        ListQuery::new("works")
            .filter("name", name)
            .fetch_page(&self.pool, params, &order_by)
            .await
    }

    /// Gets a catalog entry by id.
    pub async fn get(&self, id: &str) -> DbResult<Option<Work>> {
        let work = sqlx::query_as::<_, Work>("SELECT * FROM works WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(work)
    }

    /// Adds a catalog entry with a server-generated id.
    pub async fn create(&self, new: &NewWork) -> DbResult<Work> {
        let work = Work {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            price_cents: new.price_cents,
            description: new.description.clone(),
        };

        sqlx::query("INSERT INTO works (id, name, price_cents, description) VALUES (?1, ?2, ?3, ?4)")
            .bind(&work.id)
            .bind(&work.name)
            .bind(work.price_cents)
            .bind(&work.description)
            .execute(&self.pool)
            .await?;

        Ok(work)
    }

    /// Updates a catalog entry; omitted fields keep their current value.
    pub async fn update(&self, id: &str, update: &WorkUpdate) -> DbResult<Work> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Work>("SELECT * FROM works WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Work", id))?;

        let updated = Work {
            id: current.id.clone(),
            name: update.name.clone().unwrap_or_else(|| current.name.clone()),
            price_cents: update.price_cents.unwrap_or(current.price_cents),
            description: update.description.clone().or_else(|| current.description.clone()),
        };

        sqlx::query("UPDATE works SET name = ?2, price_cents = ?3, description = ?4 WHERE id = ?1")
            .bind(id)
            .bind(&updated.name)
            .bind(updated.price_cents)
            .bind(&updated.description)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Removes a catalog entry. Journal entries referencing it block
    /// deletion via the foreign key.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM works WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Work", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_work(name: &str, price_cents: i64) -> NewWork {
        NewWork {
            name: name.to_string(),
            price_cents,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let db = test_db().await;
        let repo = db.works();

        let created = repo.create(&new_work("Plate replacement", 250_000)).await.unwrap();
        assert_eq!(created.price_cents, 250_000);

        let patch = WorkUpdate {
            price_cents: Some(300_000),
            ..Default::default()
        };
        let updated = repo.update(&created.id, &patch).await.unwrap();
        assert_eq!(updated.price_cents, 300_000);
        assert_eq!(updated.name, "Plate replacement");

        repo.delete(&created.id).await.unwrap();
        assert!(repo.get(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let db = test_db().await;
        let repo = db.works();
        repo.create(&new_work("Plate replacement", 250_000)).await.unwrap();

        let err = repo.create(&new_work("Plate replacement", 100)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_sorted_by_price() {
        let db = test_db().await;
        let repo = db.works();
        repo.create(&new_work("Cheap", 100)).await.unwrap();
        repo.create(&new_work("Expensive", 900)).await.unwrap();

        let params = ListParams {
            sort_by: Some("priceCents".to_string()),
            sort_order: Some("desc".to_string()),
            ..Default::default()
        };
        let page = repo.list(None, &params).await.unwrap();
        assert_eq!(page.data[0].name, "Expensive");
    }
}

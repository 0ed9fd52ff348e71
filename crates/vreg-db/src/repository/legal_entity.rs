//! # Legal-Entity Repository
//!
//! Database operations for companies. Same owner-registry reconciliation
//! as natural persons (see [`super::person`] for the annotated flow); the
//! frozen identity field here is the company name.

use sqlx::SqlitePool;
use tracing::debug;

use vreg_core::paging::{ListParams, Page};
use vreg_core::policy::{frozen_violation, EntityKind};
use vreg_core::{LegalEntity, LegalEntityUpdate};

use crate::error::{DbError, DbResult};
use crate::listing::ListQuery;
use crate::reconcile::{count_party_documents, ensure_owner, reassign_documents, sweep_owner};

/// Repository for legal-entity database operations.
#[derive(Debug, Clone)]
pub struct LegalEntityRepository {
    pool: SqlitePool,
}

impl LegalEntityRepository {
    /// Sortable fields: wire name → column.
    pub const SORT_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("taxNumber", "tax_number"),
        ("companyName", "company_name"),
        ("address", "address"),
    ];

    /// Creates a new LegalEntityRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LegalEntityRepository { pool }
    }

    /// Lists entities with optional substring filters on company name and
    /// address.
    pub async fn list(
        &self,
        company_name: Option<&str>,
        address: Option<&str>,
        params: &ListParams,
    ) -> DbResult<Page<LegalEntity>> {
        let order_by = params.order_by(Self::SORT_FIELDS, "tax_number")?;

        ListQuery::new("legal_entities")
            .filter("company_name", company_name)
            .filter("address", address)
            .fetch_page(&self.pool, params, &order_by)
            .await
    }

    /// Gets an entity by tax number.
    pub async fn get(&self, tax_number: &str) -> DbResult<Option<LegalEntity>> {
        let entity =
            sqlx::query_as::<_, LegalEntity>("SELECT * FROM legal_entities WHERE tax_number = ?1")
                .bind(tax_number)
                .fetch_optional(&self.pool)
                .await?;

        Ok(entity)
    }

    /// Registers a new legal entity.
    pub async fn create(&self, entity: &LegalEntity) -> DbResult<LegalEntity> {
        debug!(tax_number = %entity.tax_number, "Creating legal entity");

        let mut tx = self.pool.begin().await?;

        let exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM legal_entities WHERE tax_number = ?1")
                .bind(&entity.tax_number)
                .fetch_one(&mut *tx)
                .await?;
        if exists > 0 {
            return Err(DbError::duplicate("taxNumber", &entity.tax_number));
        }

        ensure_owner(&mut tx, &entity.address).await?;

        sqlx::query(
            "INSERT INTO legal_entities (tax_number, company_name, address) VALUES (?1, ?2, ?3)",
        )
        .bind(&entity.tax_number)
        .bind(&entity.company_name)
        .bind(&entity.address)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(entity.clone())
    }

    /// Updates an entity; omitted fields keep their current value.
    pub async fn update(
        &self,
        tax_number: &str,
        update: &LegalEntityUpdate,
    ) -> DbResult<LegalEntity> {
        let mut tx = self.pool.begin().await?;

        let current =
            sqlx::query_as::<_, LegalEntity>("SELECT * FROM legal_entities WHERE tax_number = ?1")
                .bind(tax_number)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("LegalEntity", tax_number))?;

        let updated = LegalEntity {
            tax_number: current.tax_number.clone(),
            company_name: update
                .company_name
                .clone()
                .unwrap_or_else(|| current.company_name.clone()),
            address: update.address.clone().unwrap_or_else(|| current.address.clone()),
        };

        let mut touched: Vec<&str> = Vec::new();
        if updated.company_name != current.company_name {
            touched.push("companyName");
        }

        if !touched.is_empty() && count_party_documents(&mut tx, tax_number).await? > 0 {
            if let Some(field) = frozen_violation(EntityKind::LegalEntity, &touched) {
                return Err(DbError::frozen(EntityKind::LegalEntity, field));
            }
        }

        let address_changed = updated.address != current.address;

        let vacated = if address_changed {
            ensure_owner(&mut tx, &updated.address).await?;
            reassign_documents(&mut tx, tax_number, &updated.address).await?
        } else {
            Vec::new()
        };

        sqlx::query(
            "UPDATE legal_entities SET company_name = ?2, address = ?3 WHERE tax_number = ?1",
        )
        .bind(tax_number)
        .bind(&updated.company_name)
        .bind(&updated.address)
        .execute(&mut *tx)
        .await?;

        if address_changed {
            sweep_owner(&mut tx, &current.address).await?;
            for address in vacated.iter().filter(|a| *a != &current.address) {
                sweep_owner(&mut tx, address).await?;
            }
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Deletes an entity and garbage-collects its address.
    ///
    /// Refused while the entity still owns registration documents.
    pub async fn delete(&self, tax_number: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let current =
            sqlx::query_as::<_, LegalEntity>("SELECT * FROM legal_entities WHERE tax_number = ?1")
                .bind(tax_number)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("LegalEntity", tax_number))?;

        if count_party_documents(&mut tx, tax_number).await? > 0 {
            return Err(DbError::ForeignKeyViolation {
                message: "party still owns registration documents".to_string(),
            });
        }

        sqlx::query("DELETE FROM legal_entities WHERE tax_number = ?1")
            .bind(tax_number)
            .execute(&mut *tx)
            .await?;

        sweep_owner(&mut tx, &current.address).await?;

        tx.commit().await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

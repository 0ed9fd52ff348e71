//! # Natural-Person Repository
//!
//! Database operations for citizens, including the address-reconciliation
//! flow that keeps the owner registry and the party's own registration
//! documents in step with an address change.
//!
//! ## Address Change
//! ```text
//! update("1234 567890", { address: "B" })       person currently at "A"
//!  │
//!  ├─ 0. frozen-field policy check (name fields, if docs exist)
//!  ├─ 1. ensure_owner("B")        find-or-create registry row
//!  ├─ 2. reassign own documents   WHERE document_owner = passport,
//!  │                              collecting the addresses they vacated
//!  ├─ 3. UPDATE natural_persons   the party row itself
//!  └─ 4. sweep "A" + each         delete registry rows iff unreferenced
//!        vacated doc address
//!  all inside one transaction — rollback on any failure
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use vreg_core::paging::{ListParams, Page};
use vreg_core::policy::{frozen_violation, EntityKind};
use vreg_core::{NaturalPerson, PersonUpdate};

use crate::error::{DbError, DbResult};
use crate::listing::ListQuery;
use crate::reconcile::{count_party_documents, ensure_owner, reassign_documents, sweep_owner};

/// Repository for natural-person database operations.
#[derive(Debug, Clone)]
pub struct PersonRepository {
    pool: SqlitePool,
}

impl PersonRepository {
    /// Sortable fields: wire name → column.
    pub const SORT_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("passport", "passport"),
        ("lastName", "last_name"),
        ("firstName", "first_name"),
        ("address", "address"),
    ];

    /// Creates a new PersonRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PersonRepository { pool }
    }

    /// Lists persons with optional substring filters on last name and
    /// address.
    pub async fn list(
        &self,
        last_name: Option<&str>,
        address: Option<&str>,
        params: &ListParams,
    ) -> DbResult<Page<NaturalPerson>> {
        let order_by = params.order_by(Self::SORT_FIELDS, "passport")?;

        ListQuery::new("natural_persons")
            .filter("last_name", last_name)
            .filter("address", address)
            .fetch_page(&self.pool, params, &order_by)
            .await
    }

    /// Gets a person by passport number.
    pub async fn get(&self, passport: &str) -> DbResult<Option<NaturalPerson>> {
        let person = sqlx::query_as::<_, NaturalPerson>(
            "SELECT * FROM natural_persons WHERE passport = ?1",
        )
        .bind(passport)
        .fetch_optional(&self.pool)
        .await?;

        Ok(person)
    }

    /// Registers a new person.
    ///
    /// Creates the owner-registry row for the person's address in the
    /// same transaction as the insert.
    pub async fn create(&self, person: &NaturalPerson) -> DbResult<NaturalPerson> {
        debug!(passport = %person.passport, "Creating natural person");

        let mut tx = self.pool.begin().await?;

        let exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM natural_persons WHERE passport = ?1")
                .bind(&person.passport)
                .fetch_one(&mut *tx)
                .await?;
        if exists > 0 {
            return Err(DbError::duplicate("passport", &person.passport));
        }

        ensure_owner(&mut tx, &person.address).await?;

        sqlx::query(
            r#"
            INSERT INTO natural_persons (passport, last_name, first_name, middle_name, address)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&person.passport)
        .bind(&person.last_name)
        .bind(&person.first_name)
        .bind(&person.middle_name)
        .bind(&person.address)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(person.clone())
    }

    /// Updates a person; omitted fields keep their current value.
    ///
    /// An address change triggers the full reconciliation sequence; name
    /// changes are rejected while registration documents reference the
    /// person (immutability policy).
    pub async fn update(&self, passport: &str, update: &PersonUpdate) -> DbResult<NaturalPerson> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, NaturalPerson>(
            "SELECT * FROM natural_persons WHERE passport = ?1",
        )
        .bind(passport)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("NaturalPerson", passport))?;

        let updated = NaturalPerson {
            passport: current.passport.clone(),
            last_name: update.last_name.clone().unwrap_or_else(|| current.last_name.clone()),
            first_name: update
                .first_name
                .clone()
                .unwrap_or_else(|| current.first_name.clone()),
            middle_name: update.middle_name.clone().or_else(|| current.middle_name.clone()),
            address: update.address.clone().unwrap_or_else(|| current.address.clone()),
        };

        // Only fields whose value actually changes count as touched;
        // full updates echo unchanged fields back.
        let mut touched: Vec<&str> = Vec::new();
        if updated.last_name != current.last_name {
            touched.push("lastName");
        }
        if updated.first_name != current.first_name {
            touched.push("firstName");
        }
        if updated.middle_name != current.middle_name {
            touched.push("middleName");
        }

        if !touched.is_empty() && count_party_documents(&mut tx, passport).await? > 0 {
            if let Some(field) = frozen_violation(EntityKind::NaturalPerson, &touched) {
                return Err(DbError::frozen(EntityKind::NaturalPerson, field));
            }
        }

        let address_changed = updated.address != current.address;

        let vacated = if address_changed {
            ensure_owner(&mut tx, &updated.address).await?;
            reassign_documents(&mut tx, passport, &updated.address).await?
        } else {
            Vec::new()
        };

        sqlx::query(
            r#"
            UPDATE natural_persons
            SET last_name = ?2, first_name = ?3, middle_name = ?4, address = ?5
            WHERE passport = ?1
            "#,
        )
        .bind(passport)
        .bind(&updated.last_name)
        .bind(&updated.first_name)
        .bind(&updated.middle_name)
        .bind(&updated.address)
        .execute(&mut *tx)
        .await?;

        if address_changed {
            sweep_owner(&mut tx, &current.address).await?;
            // Documents may have held addresses that diverged from the
            // party's own; each vacated one is a sweep candidate too.
            for address in vacated.iter().filter(|a| *a != &current.address) {
                sweep_owner(&mut tx, address).await?;
            }
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Deletes a person and garbage-collects their address.
    ///
    /// Refused while the person still owns registration documents.
    pub async fn delete(&self, passport: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, NaturalPerson>(
            "SELECT * FROM natural_persons WHERE passport = ?1",
        )
        .bind(passport)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("NaturalPerson", passport))?;

        if count_party_documents(&mut tx, passport).await? > 0 {
            return Err(DbError::ForeignKeyViolation {
                message: "party still owns registration documents".to_string(),
            });
        }

        sqlx::query("DELETE FROM natural_persons WHERE passport = ?1")
            .bind(passport)
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

//! # Registration-Document Repository
//!
//! Database operations for registration documents. Documents participate
//! in the owner registry by address value, so every write path here runs
//! through [`crate::reconcile`]:
//!
//! ```text
//! create → ensure_owner(doc.address)
//! update → ensure_owner(new address) ... sweep_owner(old address)
//! delete → sweep_owner(doc.address)
//! ```
//!
//! An owner change (new `document_owner`) snaps the document's address to
//! the new party's current address.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use vreg_core::paging::{ListParams, Page};
use vreg_core::{DocUpdate, NewRegistrationDoc, RegistrationDoc};

use crate::error::{DbError, DbResult};
use crate::listing::ListQuery;
use crate::reconcile::{ensure_owner, party_exists, sweep_owner};

/// Repository for registration-document database operations.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
}

impl DocumentRepository {
    /// Sortable fields: wire name → column.
    pub const SORT_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("regNumber", "reg_number"),
        ("documentOwner", "document_owner"),
        ("vehicleVin", "vehicle_vin"),
        ("issuedAt", "issued_at"),
    ];

    /// Creates a new DocumentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DocumentRepository { pool }
    }

    /// Lists documents with optional substring filters on owner key and
    /// VIN.
    pub async fn list(
        &self,
        document_owner: Option<&str>,
        vehicle_vin: Option<&str>,
        params: &ListParams,
    ) -> DbResult<Page<RegistrationDoc>> {
        let order_by = params.order_by(Self::SORT_FIELDS, "reg_number")?;

        ListQuery::new("registration_docs")
            .filter("document_owner", document_owner)
            .filter("vehicle_vin", vehicle_vin)
            .fetch_page(&self.pool, params, &order_by)
            .await
    }

    /// Gets a document by registration number.
    pub async fn get(&self, reg_number: &str) -> DbResult<Option<RegistrationDoc>> {
        let doc = sqlx::query_as::<_, RegistrationDoc>(
            "SELECT * FROM registration_docs WHERE reg_number = ?1",
        )
        .bind(reg_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(doc)
    }

    /// All documents owned by one party, unpaginated. Used by the citizen
    /// self-service view.
    pub async fn list_for_party(&self, party_key: &str) -> DbResult<Vec<RegistrationDoc>> {
        let docs = sqlx::query_as::<_, RegistrationDoc>(
            "SELECT * FROM registration_docs WHERE document_owner = ?1 ORDER BY reg_number",
        )
        .bind(party_key)
        .fetch_all(&self.pool)
        .await?;

        Ok(docs)
    }

    /// Issues a new registration document.
    ///
    /// The owning party must exist (by passport or tax number); the VIN
    /// foreign key is enforced by the schema. `issued_at` is server-set.
    pub async fn create(&self, new: &NewRegistrationDoc) -> DbResult<RegistrationDoc> {
        debug!(reg_number = %new.reg_number, "Issuing registration document");

        let mut tx = self.pool.begin().await?;

        let exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM registration_docs WHERE reg_number = ?1")
                .bind(&new.reg_number)
                .fetch_one(&mut *tx)
                .await?;
        if exists > 0 {
            return Err(DbError::duplicate("regNumber", &new.reg_number));
        }

        if !party_exists(&mut tx, &new.document_owner).await? {
            return Err(DbError::not_found("Party", &new.document_owner));
        }

        ensure_owner(&mut tx, &new.address).await?;

        let doc = RegistrationDoc {
            reg_number: new.reg_number.clone(),
            document_owner: new.document_owner.clone(),
            vehicle_vin: new.vehicle_vin.clone(),
            address: new.address.clone(),
            issued_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO registration_docs (reg_number, document_owner, vehicle_vin, address, issued_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&doc.reg_number)
        .bind(&doc.document_owner)
        .bind(&doc.vehicle_vin)
        .bind(&doc.address)
        .bind(doc.issued_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(doc)
    }

    /// Updates a document's owner and/or address.
    ///
    /// A new owner must exist as a party; changing the owner snaps the
    /// document address to the new party's current address unless the
    /// payload overrides it explicitly. The old address is swept when it
    /// becomes orphaned.
    pub async fn update(&self, reg_number: &str, update: &DocUpdate) -> DbResult<RegistrationDoc> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, RegistrationDoc>(
            "SELECT * FROM registration_docs WHERE reg_number = ?1",
        )
        .bind(reg_number)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("RegistrationDoc", reg_number))?;

        let new_owner = update
            .document_owner
            .clone()
            .unwrap_or_else(|| current.document_owner.clone());
        let owner_changed = new_owner != current.document_owner;

        if owner_changed && !party_exists(&mut tx, &new_owner).await? {
            return Err(DbError::not_found("Party", &new_owner));
        }

        let new_address = match (&update.address, owner_changed) {
            (Some(address), _) => address.clone(),
            (None, true) => party_address(&mut tx, &new_owner).await?,
            (None, false) => current.address.clone(),
        };
        let address_changed = new_address != current.address;

        if address_changed {
            ensure_owner(&mut tx, &new_address).await?;
        }

        sqlx::query(
            "UPDATE registration_docs SET document_owner = ?2, address = ?3 WHERE reg_number = ?1",
        )
        .bind(reg_number)
        .bind(&new_owner)
        .bind(&new_address)
        .execute(&mut *tx)
        .await?;

        if address_changed {
            sweep_owner(&mut tx, &current.address).await?;
        }

        tx.commit().await?;

        Ok(RegistrationDoc {
            reg_number: current.reg_number,
            document_owner: new_owner,
            vehicle_vin: current.vehicle_vin,
            address: new_address,
            issued_at: current.issued_at,
        })
    }

    /// Deletes a document and garbage-collects its address.
    ///
    /// Operation journal entries referencing the document block deletion
    /// via the foreign key.
    pub async fn delete(&self, reg_number: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, RegistrationDoc>(
            "SELECT * FROM registration_docs WHERE reg_number = ?1",
        )
        .bind(reg_number)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("RegistrationDoc", reg_number))?;

        sqlx::query("DELETE FROM registration_docs WHERE reg_number = ?1")
            .bind(reg_number)
            .execute(&mut *tx)
            .await?;

        sweep_owner(&mut tx, &current.address).await?;

        tx.commit().await?;
        Ok(())
    }
}

/// Current address of the party with the given key.
async fn party_address(conn: &mut sqlx::SqliteConnection, party_key: &str) -> DbResult<String> {
    let address: Option<String> = sqlx::query_scalar(
        r#"
        SELECT address FROM natural_persons WHERE passport = ?1
        UNION ALL
        SELECT address FROM legal_entities WHERE tax_number = ?1
        "#,
    )
    .bind(party_key)
    .fetch_optional(&mut *conn)
    .await?;

    address.ok_or_else(|| DbError::not_found("Party", party_key))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use vreg_core::NaturalPerson;

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query(
            r#"
            INSERT INTO transport_vehicles
                (vin, brand, model, release_year, engine_number, chassis_number, color)
            VALUES ('WVWZZZ1JZXW000001', 'Lada', 'Vesta', 2020, 'ENG-1', 'CHS-1', 'white')
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();
        db
    }

    async fn seed_person(db: &Database, passport: &str, address: &str) {
        db.persons()
            .create(&NaturalPerson {
                passport: passport.to_string(),
                last_name: "Ivanov".to_string(),
                first_name: "Ivan".to_string(),
                middle_name: None,
                address: address.to_string(),
            })
            .await
            .unwrap();
    }

    fn new_doc(reg_number: &str, owner: &str, address: &str) -> NewRegistrationDoc {
        NewRegistrationDoc {
            reg_number: reg_number.to_string(),
            document_owner: owner.to_string(),
            vehicle_vin: "WVWZZZ1JZXW000001".to_string(),
            address: address.to_string(),
        }
    }

    async fn owner_exists(db: &Database, address: &str) -> bool {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM owners WHERE address = ?1")
            .bind(address)
            .fetch_one(db.pool())
            .await
            .unwrap();
        count > 0
    }

    #[tokio::test]
    async fn test_create_requires_existing_party() {
        let db = test_db().await;
        let err = db
            .documents()
            .create(&new_doc("DOC-1", "0000 000000", "A"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Party"));
    }

    #[tokio::test]
    async fn test_create_registers_owner_and_sets_issued_at() {
        let db = test_db().await;
        seed_person(&db, "1234 567890", "A").await;

        let doc = db
            .documents()
            .create(&new_doc("DOC-1", "1234 567890", "A"))
            .await
            .unwrap();
        assert_eq!(doc.document_owner, "1234 567890");
        assert!(owner_exists(&db, "A").await);
    }

    #[tokio::test]
    async fn test_create_missing_vin_is_fk_violation() {
        let db = test_db().await;
        seed_person(&db, "1234 567890", "A").await;

        let mut doc = new_doc("DOC-1", "1234 567890", "A");
        doc.vehicle_vin = "WVWZZZ1JZXW999999".to_string();
        let err = db.documents().create(&doc).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_owner_change_snaps_address_and_sweeps() {
        let db = test_db().await;
        seed_person(&db, "1111 111111", "A").await;
        seed_person(&db, "2222 222222", "B").await;
        db.documents()
            .create(&new_doc("DOC-1", "1111 111111", "A"))
            .await
            .unwrap();

        let patch = DocUpdate {
            document_owner: Some("2222 222222".to_string()),
            address: None,
        };
        let updated = db.documents().update("DOC-1", &patch).await.unwrap();

        assert_eq!(updated.document_owner, "2222 222222");
        assert_eq!(updated.address, "B");
        // "A" still referenced by the first person's own row.
        assert!(owner_exists(&db, "A").await);
    }

    #[tokio::test]
    async fn test_owner_change_to_missing_party_rejected() {
        let db = test_db().await;
        seed_person(&db, "1111 111111", "A").await;
        db.documents()
            .create(&new_doc("DOC-1", "1111 111111", "A"))
            .await
            .unwrap();

        let patch = DocUpdate {
            document_owner: Some("9999 999999".to_string()),
            address: None,
        };
        let err = db.documents().update("DOC-1", &patch).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_sweeps_orphaned_address() {
        let db = test_db().await;
        seed_person(&db, "1111 111111", "A").await;
        // The document carries an address no party lives at.
        db.documents()
            .create(&new_doc("DOC-1", "1111 111111", "Historical st. 7"))
            .await
            .unwrap();
        assert!(owner_exists(&db, "Historical st. 7").await);

        db.documents().delete("DOC-1").await.unwrap();
        assert!(!owner_exists(&db, "Historical st. 7").await);
        assert!(owner_exists(&db, "A").await);
    }

    #[tokio::test]
    async fn test_list_for_party() {
        let db = test_db().await;
        seed_person(&db, "1111 111111", "A").await;
        seed_person(&db, "2222 222222", "B").await;
        db.documents()
            .create(&new_doc("DOC-1", "1111 111111", "A"))
            .await
            .unwrap();
        db.documents()
            .create(&new_doc("DOC-2", "2222 222222", "B"))
            .await
            .unwrap();

        let docs = db.documents().list_for_party("1111 111111").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].reg_number, "DOC-1");
    }
}

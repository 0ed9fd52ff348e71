//! # Registration-Operation Repository
//!
//! The operations journal: one append-only row per action an employee
//! performs on a registration document. Entries are never updated; an
//! incorrect entry is compensated by a follow-up `amendment` entry, so the
//! repository exposes list/get/create/delete only.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use vreg_core::paging::{ListParams, Page};
use vreg_core::{NewRegistrationOp, RegistrationOp};

use crate::error::{DbError, DbResult};
use crate::listing::ListQuery;

/// Repository for the operations journal.
#[derive(Debug, Clone)]
pub struct OperationRepository {
    pool: SqlitePool,
}

impl OperationRepository {
    /// Sortable fields: wire name → column.
    pub const SORT_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("docNumber", "doc_number"),
        ("employeeBadge", "employee_badge"),
        ("opType", "op_type"),
        ("performedAt", "performed_at"),
    ];

    /// Creates a new OperationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OperationRepository { pool }
    }

    /// Lists journal entries with optional filters on document and
    /// employee.
    pub async fn list(
        &self,
        doc_number: Option<&str>,
        employee_badge: Option<&str>,
        params: &ListParams,
    ) -> DbResult<Page<RegistrationOp>> {
        let order_by = params.order_by(Self::SORT_FIELDS, "performed_at")?;

        ListQuery::new("registration_ops")
            .filter("doc_number", doc_number)
            .filter("employee_badge", employee_badge)
            .fetch_page(&self.pool, params, &order_by)
            .await
    }

    /// Gets a journal entry by id.
    pub async fn get(&self, id: &str) -> DbResult<Option<RegistrationOp>> {
        let op = sqlx::query_as::<_, RegistrationOp>("SELECT * FROM registration_ops WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(op)
    }

    /// Appends a journal entry. `id` and `performed_at` are server-set;
    /// document, employee and work references are enforced by foreign
    /// keys.
    pub async fn create(&self, new: &NewRegistrationOp) -> DbResult<RegistrationOp> {
        let op = RegistrationOp {
            id: Uuid::new_v4().to_string(),
            doc_number: new.doc_number.clone(),
            employee_badge: new.employee_badge.clone(),
            work_id: new.work_id.clone(),
            op_type: new.op_type,
            performed_at: Utc::now(),
        };

        debug!(id = %op.id, doc_number = %op.doc_number, "Recording registration operation");

        sqlx::query(
            r#"
            INSERT INTO registration_ops (id, doc_number, employee_badge, work_id, op_type, performed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&op.id)
        .bind(&op.doc_number)
        .bind(&op.employee_badge)
        .bind(&op.work_id)
        .bind(op.op_type)
        .bind(op.performed_at)
        .execute(&self.pool)
        .await?;

        Ok(op)
    }

    /// Removes a journal entry (administrative correction).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM registration_ops WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("RegistrationOp", id));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use vreg_core::OpType;

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // Department, employee, person, vehicle, document scaffolding.
        sqlx::query(
            "INSERT INTO departments (id, name, address, phone)
             VALUES ('dep-1', 'Central', 'Mira ave. 1', '+7 000 000-00-00')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO employees (badge_number, last_name, first_name, post, department_id)
             VALUES ('B-001', 'Sidorov', 'Semen', 'inspector', 'dep-1')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO natural_persons (passport, last_name, first_name, address)
             VALUES ('1234 567890', 'Ivanov', 'Ivan', 'A')",
        )
        .execute(db.pool())
        .await
        .unwrap();
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
        sqlx::query(
            r#"
            INSERT INTO registration_docs (reg_number, document_owner, vehicle_vin, address, issued_at)
            VALUES ('DOC-1', '1234 567890', 'WVWZZZ1JZXW000001', 'A', '2024-01-01T00:00:00Z')
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();
        db
    }

    fn new_op(doc: &str, badge: &str) -> NewRegistrationOp {
        NewRegistrationOp {
            doc_number: doc.to_string(),
            employee_badge: badge.to_string(),
            work_id: None,
            op_type: OpType::Registration,
        }
    }

    #[tokio::test]
    async fn test_create_sets_id_and_timestamp() {
        let db = test_db().await;
        let op = db.operations().create(&new_op("DOC-1", "B-001")).await.unwrap();

        assert!(!op.id.is_empty());
        let fetched = db.operations().get(&op.id).await.unwrap().unwrap();
        assert_eq!(fetched.op_type, OpType::Registration);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_document() {
        let db = test_db().await;
        let err = db
            .operations()
            .create(&new_op("DOC-MISSING", "B-001"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_employee() {
        let db = test_db().await;
        let err = db
            .operations()
            .create(&new_op("DOC-1", "B-MISSING"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_filtered_by_document() {
        let db = test_db().await;
        db.operations().create(&new_op("DOC-1", "B-001")).await.unwrap();
        db.operations().create(&new_op("DOC-1", "B-001")).await.unwrap();

        let page = db
            .operations()
            .list(Some("DOC-1"), None, &ListParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let op = db.operations().create(&new_op("DOC-1", "B-001")).await.unwrap();

        db.operations().delete(&op.id).await.unwrap();
        assert!(db.operations().get(&op.id).await.unwrap().is_none());

        let err = db.operations().delete(&op.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}

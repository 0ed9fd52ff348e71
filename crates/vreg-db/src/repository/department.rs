//! Department repository. Plain CRUD over a small reference table.

use sqlx::SqlitePool;
use uuid::Uuid;

use vreg_core::paging::{ListParams, Page};
use vreg_core::{Department, DepartmentUpdate, NewDepartment};

use crate::error::{DbError, DbResult};
use crate::listing::ListQuery;

/// Repository for department database operations.
#[derive(Debug, Clone)]
pub struct DepartmentRepository {
    pool: SqlitePool,
}

impl DepartmentRepository {
    /// Sortable fields: wire name → column.
    pub const SORT_FIELDS: &'static [(&'static str, &'static str)] =
        &[("name", "name"), ("address", "address")];

    /// Creates a new DepartmentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DepartmentRepository { pool }
    }

    /// Lists departments with an optional substring filter on the name.
    pub async fn list(
        &self,
        name: Option<&str>,
        params: &ListParams,
    ) -> DbResult<Page<Department>> {
        let order_by = params.order_by(Self::SORT_FIELDS, "name")?;

        ListQuery::new("departments")
            .filter("name", name)
            .fetch_page(&self.pool, params, &order_by)
            .await
    }

    /// Gets a department by id.
    pub async fn get(&self, id: &str) -> DbResult<Option<Department>> {
        let department = sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(department)
    }

    /// Creates a department with a server-generated id.
    pub async fn create(&self, new: &NewDepartment) -> DbResult<Department> {
        let department = Department {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            address: new.address.clone(),
            phone: new.phone.clone(),
        };

        sqlx::query("INSERT INTO departments (id, name, address, phone) VALUES (?1, ?2, ?3, ?4)")
            .bind(&department.id)
            .bind(&department.name)
            .bind(&department.address)
            .bind(&department.phone)
            .execute(&self.pool)
            .await?;

        Ok(department)
    }

    /// Updates a department; omitted fields keep their current value.
    pub async fn update(&self, id: &str, update: &DepartmentUpdate) -> DbResult<Department> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Department", id))?;

        let updated = Department {
            id: current.id.clone(),
            name: update.name.clone().unwrap_or_else(|| current.name.clone()),
            address: update.address.clone().unwrap_or_else(|| current.address.clone()),
            phone: update.phone.clone().unwrap_or_else(|| current.phone.clone()),
        };

        sqlx::query("UPDATE departments SET name = ?2, address = ?3, phone = ?4 WHERE id = ?1")
            .bind(id)
            .bind(&updated.name)
            .bind(&updated.address)
            .bind(&updated.phone)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Deletes a department. Employees assigned to it block deletion via
    /// the foreign key.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM departments WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Department", id));
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

    fn new_department(name: &str) -> NewDepartment {
        NewDepartment {
            name: name.to_string(),
            address: "Mira ave. 1".to_string(),
            phone: "+7 000 000-00-00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let db = test_db().await;
        let repo = db.departments();

        let created = repo.create(&new_department("Central")).await.unwrap();
        assert!(!created.id.is_empty());

        let patch = DepartmentUpdate {
            phone: Some("+7 111 111-11-11".to_string()),
            ..Default::default()
        };
        let updated = repo.update(&created.id, &patch).await.unwrap();
        assert_eq!(updated.phone, "+7 111 111-11-11");
        assert_eq!(updated.name, "Central");

        repo.delete(&created.id).await.unwrap();
        assert!(repo.get(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let db = test_db().await;
        let repo = db.departments();
        repo.create(&new_department("Central")).await.unwrap();

        let err = repo.create(&new_department("Central")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_delete_blocked_by_assigned_employee() {
        let db = test_db().await;
        let repo = db.departments();
        let created = repo.create(&new_department("Central")).await.unwrap();

        sqlx::query(
            "INSERT INTO employees (badge_number, last_name, first_name, post, department_id)
             VALUES ('B-001', 'Sidorov', 'Semen', 'inspector', ?1)",
        )
        .bind(&created.id)
        .execute(db.pool())
        .await
        .unwrap();

        let err = repo.delete(&created.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}

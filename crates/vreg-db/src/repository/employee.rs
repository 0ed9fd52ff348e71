//! # Employee Repository
//!
//! Database operations for registration-department staff. Badge numbers
//! are the business key; the department reference is a foreign key.

use sqlx::SqlitePool;
use tracing::debug;

use vreg_core::paging::{ListParams, Page};
use vreg_core::{Employee, EmployeeUpdate};

use crate::error::{DbError, DbResult};
use crate::listing::ListQuery;

/// Repository for employee database operations.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    /// Sortable fields: wire name → column.
    pub const SORT_FIELDS: &'static [(&'static str, &'static str)] = &[
        ("badgeNumber", "badge_number"),
        ("lastName", "last_name"),
        ("firstName", "first_name"),
        ("post", "post"),
    ];

    /// Creates a new EmployeeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    /// Lists employees with optional substring filters on last name and
    /// post.
    pub async fn list(
        &self,
        last_name: Option<&str>,
        post: Option<&str>,
        params: &ListParams,
    ) -> DbResult<Page<Employee>> {
        let order_by = params.order_by(Self::SORT_FIELDS, "badge_number")?;

        ListQuery::new("employees")
            .filter("last_name", last_name)
            .filter("post", post)
            .fetch_page(&self.pool, params, &order_by)
            .await
    }

    /// Gets an employee by badge number.
    pub async fn get(&self, badge_number: &str) -> DbResult<Option<Employee>> {
        let employee =
            sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE badge_number = ?1")
                .bind(badge_number)
                .fetch_optional(&self.pool)
                .await?;

        Ok(employee)
    }

    /// Hires an employee. The department must exist.
    pub async fn create(&self, employee: &Employee) -> DbResult<Employee> {
        debug!(badge_number = %employee.badge_number, "Creating employee");

        let mut tx = self.pool.begin().await?;

        let exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE badge_number = ?1")
                .bind(&employee.badge_number)
                .fetch_one(&mut *tx)
                .await?;
        if exists > 0 {
            return Err(DbError::duplicate("badgeNumber", &employee.badge_number));
        }

        sqlx::query(
            r#"
            INSERT INTO employees (badge_number, last_name, first_name, middle_name, post, department_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&employee.badge_number)
        .bind(&employee.last_name)
        .bind(&employee.first_name)
        .bind(&employee.middle_name)
        .bind(&employee.post)
        .bind(&employee.department_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(employee.clone())
    }

    /// Updates an employee; omitted fields keep their current value.
    pub async fn update(&self, badge_number: &str, update: &EmployeeUpdate) -> DbResult<Employee> {
        let mut tx = self.pool.begin().await?;

        let current =
            sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE badge_number = ?1")
                .bind(badge_number)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("Employee", badge_number))?;

        let updated = Employee {
            badge_number: current.badge_number.clone(),
            last_name: update.last_name.clone().unwrap_or_else(|| current.last_name.clone()),
            first_name: update
                .first_name
                .clone()
                .unwrap_or_else(|| current.first_name.clone()),
            middle_name: update.middle_name.clone().or_else(|| current.middle_name.clone()),
            post: update.post.clone().unwrap_or_else(|| current.post.clone()),
            department_id: update
                .department_id
                .clone()
                .unwrap_or_else(|| current.department_id.clone()),
        };

        sqlx::query(
            r#"
            UPDATE employees
            SET last_name = ?2, first_name = ?3, middle_name = ?4, post = ?5, department_id = ?6
            WHERE badge_number = ?1
            "#,
        )
        .bind(badge_number)
        .bind(&updated.last_name)
        .bind(&updated.first_name)
        .bind(&updated.middle_name)
        .bind(&updated.post)
        .bind(&updated.department_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Fires an employee. Journal entries referencing the badge block
    /// deletion via the foreign key.
    pub async fn delete(&self, badge_number: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM employees WHERE badge_number = ?1")
            .bind(badge_number)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", badge_number));
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

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query(
            "INSERT INTO departments (id, name, address, phone)
             VALUES ('dep-1', 'Central', 'Mira ave. 1', '+7 000 000-00-00')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        db
    }

    fn employee(badge: &str) -> Employee {
        Employee {
            badge_number: badge.to_string(),
            last_name: "Sidorov".to_string(),
            first_name: "Semen".to_string(),
            middle_name: None,
            post: "inspector".to_string(),
            department_id: "dep-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_get_update_delete() {
        let db = test_db().await;
        let repo = db.employees();
        repo.create(&employee("B-001")).await.unwrap();

        let fetched = repo.get("B-001").await.unwrap().unwrap();
        assert_eq!(fetched.post, "inspector");

        let patch = EmployeeUpdate {
            post: Some("senior inspector".to_string()),
            ..Default::default()
        };
        let updated = repo.update("B-001", &patch).await.unwrap();
        assert_eq!(updated.post, "senior inspector");
        assert_eq!(updated.last_name, "Sidorov");

        repo.delete("B-001").await.unwrap();
        assert!(repo.get("B-001").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_badge_conflicts() {
        let db = test_db().await;
        let repo = db.employees();
        repo.create(&employee("B-001")).await.unwrap();

        let err = repo.create(&employee("B-001")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "badgeNumber"));
    }

    #[tokio::test]
    async fn test_unknown_department_is_fk_violation() {
        let db = test_db().await;
        let mut bad = employee("B-002");
        bad.department_id = "dep-missing".to_string();

        let err = db.employees().create(&bad).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_filters_by_post() {
        let db = test_db().await;
        let repo = db.employees();
        repo.create(&employee("B-001")).await.unwrap();
        let mut chief = employee("B-002");
        chief.post = "chief".to_string();
        repo.create(&chief).await.unwrap();

        let page = repo
            .list(None, Some("chief"), &ListParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].badge_number, "B-002");
    }
}

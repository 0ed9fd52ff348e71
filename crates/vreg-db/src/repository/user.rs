//! # User Repository
//!
//! Database operations for application accounts. Passwords reach this
//! layer already hashed; hashing and verification live in the REST app's
//! auth module, so the repository only ever sees argon2 digests.

use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use vreg_core::paging::{ListParams, Page};
use vreg_core::{Role, User};

use crate::error::{DbError, DbResult};
use crate::listing::ListQuery;

/// Account changes, with the password already hashed.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub party_key: Option<String>,
    pub employee_badge: Option<String>,
}

/// Repository for user-account database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Sortable fields: wire name → column.
    pub const SORT_FIELDS: &'static [(&'static str, &'static str)] =
        &[("email", "email"), ("role", "role")];

    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Lists accounts with an optional substring filter on the email.
    pub async fn list(&self, email: Option<&str>, params: &ListParams) -> DbResult<Page<User>> {
        let order_by = params.order_by(Self::SORT_FIELDS, "email")?;

        ListQuery::new("users")
            .filter("email", email)
            .fetch_page(&self.pool, params, &order_by)
            .await
    }

    /// Gets an account by id.
    pub async fn get(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Gets an account by login email. Used by the login handler.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Creates an account. `user.password_hash` must already be an argon2
    /// digest.
    pub async fn create(&self, user: &User) -> DbResult<User> {
        debug!(email = %user.email, "Creating user account");

        let mut tx = self.pool.begin().await?;

        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?1")
            .bind(&user.email)
            .fetch_one(&mut *tx)
            .await?;
        if exists > 0 {
            return Err(DbError::duplicate("email", &user.email));
        }

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, party_key, employee_badge)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(&user.party_key)
        .bind(&user.employee_badge)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user.clone())
    }

    /// Updates an account; omitted fields keep their current value.
    pub async fn update(&self, id: &str, changes: &UserChanges) -> DbResult<User> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))?;

        let updated = User {
            id: current.id.clone(),
            email: changes.email.clone().unwrap_or_else(|| current.email.clone()),
            password_hash: changes
                .password_hash
                .clone()
                .unwrap_or_else(|| current.password_hash.clone()),
            role: changes.role.unwrap_or(current.role),
            party_key: changes.party_key.clone().or_else(|| current.party_key.clone()),
            employee_badge: changes
                .employee_badge
                .clone()
                .or_else(|| current.employee_badge.clone()),
        };

        sqlx::query(
            r#"
            UPDATE users
            SET email = ?2, password_hash = ?3, role = ?4, party_key = ?5, employee_badge = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&updated.email)
        .bind(&updated.password_hash)
        .bind(updated.role)
        .bind(&updated.party_key)
        .bind(&updated.employee_badge)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Deletes an account.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }
        Ok(())
    }
}

/// Convenience constructor used by account-creation handlers.
pub fn build_user(
    email: String,
    password_hash: String,
    role: Role,
    party_key: Option<String>,
    employee_badge: Option<String>,
) -> User {
    User {
        id: Uuid::new_v4().to_string(),
        email,
        password_hash,
        role,
        party_key,
        employee_badge,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

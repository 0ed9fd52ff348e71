//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                            │
//! │                                                                 │
//! │  SQLite error (sqlx::Error)                                     │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  DbError (this module) ← adds context and categorization        │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  ApiError (REST app)   ← mapped to an HTTP status + JSON body   │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use vreg_core::policy::EntityKind;

/// Database operation errors.
///
/// These wrap sqlx errors and add the context repositories know about
/// (entity type, business key, violated field).
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in the database.
    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    /// Unique constraint violation (duplicate badge number, VIN, email,
    /// tax number, ...). Maps to HTTP 409.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation (e.g., issuing a document for a
    /// VIN that is not in the register).
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Attempt to change a field frozen by the immutability policy while
    /// registration documents reference the entity. Maps to HTTP 400.
    #[error("{field} cannot be changed while registration documents reference this {}", .entity.name())]
    FrozenField { entity: EntityKind, field: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),

    /// Rejected input detected at the repository boundary (unknown sort
    /// field/order). Raised before any query runs. Maps to HTTP 400.
    #[error(transparent)]
    Validation(#[from] vreg_core::ValidationError),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and business key.
    pub fn not_found(entity: impl Into<String>, key: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            key: key.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a FrozenField error.
    pub fn frozen(entity: EntityKind, field: impl Into<String>) -> Self {
        DbError::FrozenField {
            entity,
            field: field.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                key: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // UNIQUE: "UNIQUE constraint failed: <table>.<column>"
                // FK:     "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frozen_field_message() {
        let err = DbError::frozen(EntityKind::TransportVehicle, "chassisNumber");
        assert_eq!(
            err.to_string(),
            "chassisNumber cannot be changed while registration documents reference this vehicle"
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("NaturalPerson", "1234 567890");
        assert_eq!(err.to_string(), "NaturalPerson not found: 1234 567890");
    }
}

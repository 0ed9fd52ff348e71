//! # Error Types
//!
//! Domain-specific error types for vreg-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Error Types                             │
//! │                                                                 │
//! │  vreg-core errors (this file)                                   │
//! │  └── ValidationError  - Input validation failures               │
//! │                                                                 │
//! │  vreg-db errors (separate crate)                                │
//! │  └── DbError          - Database operation failures             │
//! │                                                                 │
//! │  REST API errors (in app)                                       │
//! │  └── ApiError         - What the front-end sees (JSON)          │
//! │                                                                 │
//! │  Flow: ValidationError → DbError → ApiError → SPA               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, key, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet field-format requirements.
/// Detected before any transaction opens.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., malformed passport or VIN).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the allowed set (e.g., unknown sort field).
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Name of the field this error is about, for structured responses.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. } => field,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

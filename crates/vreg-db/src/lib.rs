//! # vreg-db: Database Layer for the Registration System
//!
//! SQLite persistence for the vehicle-registration backend, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Registration Data Flow                      │
//! │                                                                 │
//! │  REST handler (PATCH /v1/persons/{passport})                    │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │                   vreg-db (THIS CRATE)                    │  │
//! │  │                                                           │  │
//! │  │  ┌────────────┐  ┌──────────────┐  ┌──────────────────┐   │  │
//! │  │  │  Database  │  │ Repositories │  │   reconcile      │   │  │
//! │  │  │ (pool.rs)  │  │ (person.rs,  │  │ (owner registry  │   │  │
//! │  │  │            │◄─│  vehicle.rs, │─►│  find-or-create, │   │  │
//! │  │  │ SqlitePool │  │  ...)        │  │  orphan sweep)   │   │  │
//! │  │  └────────────┘  └──────────────┘  └──────────────────┘   │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  SQLite database (WAL mode, foreign keys on)                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`listing`] - Shared pagination/filter/sort query plumbing
//! - [`reconcile`] - Owner-registry maintenance (the address registry
//!   invariant lives here)
//! - [`repository`] - One repository per resource
//!
//! ## Transactions
//!
//! Every multi-statement mutation runs on one `sqlx::Transaction`; a
//! dropped transaction rolls back, so any `?` on the error path undoes
//! every partial write. Isolation is whatever SQLite provides (a single
//! serialized writer) — the application does not strengthen it.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod listing;
pub mod migrations;
pub mod pool;
pub mod reconcile;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::department::DepartmentRepository;
pub use repository::document::DocumentRepository;
pub use repository::employee::EmployeeRepository;
pub use repository::legal_entity::LegalEntityRepository;
pub use repository::operation::OperationRepository;
pub use repository::owner::OwnerRepository;
pub use repository::person::PersonRepository;
pub use repository::user::{build_user, UserChanges, UserRepository};
pub use repository::vehicle::VehicleRepository;
pub use repository::work::WorkRepository;

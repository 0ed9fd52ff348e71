//! # Vreg REST API
//!
//! Axum HTTP server for the vehicle-registration backend.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  PATCH /v1/persons/{passport}                                   │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  AuthUser extractor ── validates bearer JWT, carries the role   │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  handler ── role gate, then one repository call                 │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  vreg-db ── transaction + owner-registry reconciliation         │
//! │       │                                                         │
//! │       ▼                                                         │
//! │  ApiError / Json ── DbError mapped to HTTP status + JSON body   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Handlers stay thin: every business rule (reconciliation, frozen
//! fields, uniqueness) lives in vreg-db so it holds on every write path,
//! not just the HTTP one.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

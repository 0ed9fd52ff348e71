//! # Route Layer
//!
//! One module per resource, each exposing a `router()` that plugs into
//! the `/v1` tree. Handlers validate input, gate on the caller's role and
//! delegate to a vreg-db repository.
//!
//! ## Route Map
//! ```text
//! POST   /v1/auth/login             public
//! GET    /v1/auth/me                any authenticated
//!
//! /v1/persons, /v1/legal-entities   employee (citizens: own record)
//! /v1/vehicles                      employee
//! /v1/documents                     employee (citizens: /mine)
//! /v1/operations                    employee
//! /v1/owners                        employee (read-only)
//!
//! /v1/employees, /v1/departments,   admin (employee: read)
//! /v1/works, /v1/users              admin
//!
//! GET    /healthz                   public
//! ```

pub mod auth;
pub mod departments;
pub mod documents;
pub mod employees;
pub mod health;
pub mod legal_entities;
pub mod operations;
pub mod owners;
pub mod persons;
pub mod users;
pub mod vehicles;
pub mod works;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/v1/auth", auth::router())
        .nest("/v1/persons", persons::router())
        .nest("/v1/legal-entities", legal_entities::router())
        .nest("/v1/vehicles", vehicles::router())
        .nest("/v1/documents", documents::router())
        .nest("/v1/operations", operations::router())
        .nest("/v1/owners", owners::router())
        .nest("/v1/employees", employees::router())
        .nest("/v1/departments", departments::router())
        .nest("/v1/works", works::router())
        .nest("/v1/users", users::router())
        .route("/healthz", get(health::healthz))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

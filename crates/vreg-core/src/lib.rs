//! # vreg-core: Pure Domain Logic for the Registration System
//!
//! This crate is the **heart** of the vehicle-registration backend. It holds
//! the domain types and every rule that can be stated without I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Registration Backend                         │
//! │                                                                 │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │                  REST API (apps/rest-api)                 │  │
//! │  │    JSON routes, JWT auth, role gating per user role       │  │
//! │  └────────────────────────────┬──────────────────────────────┘  │
//! │                               │                                 │
//! │  ┌────────────────────────────▼──────────────────────────────┐  │
//! │  │              ★ vreg-core (THIS CRATE) ★                   │  │
//! │  │                                                           │  │
//! │  │  ┌─────────┐ ┌────────────┐ ┌─────────┐ ┌─────────┐      │  │
//! │  │  │  types  │ │ validation │ │ policy  │ │ paging  │      │  │
//! │  │  │ parties │ │  passport  │ │ frozen  │ │ Page<T> │      │  │
//! │  │  │ docs    │ │  VIN, tax  │ │ fields  │ │ sorting │      │  │
//! │  │  └─────────┘ └────────────┘ └─────────┘ └─────────┘      │  │
//! │  │                                                           │  │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS      │  │
//! │  └────────────────────────────┬──────────────────────────────┘  │
//! │                               │                                 │
//! │  ┌────────────────────────────▼──────────────────────────────┐  │
//! │  │                 vreg-db (Database Layer)                  │  │
//! │  │     SQLite repositories, migrations, reconciliation       │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (parties, vehicles, documents, staff, users)
//! - [`validation`] - Field-format validation (passport, tax number, VIN)
//! - [`policy`] - Immutable-field policy once registration documents exist
//! - [`paging`] - Pagination, sorting and the list response envelope
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic
//! 2. **No I/O**: database, network and file access are FORBIDDEN here
//! 3. **Explicit Errors**: all errors are typed and name the offending field

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod paging;
pub mod policy;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::ValidationError;
pub use paging::{ListParams, Page, SortOrder};
pub use policy::EntityKind;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default page size for list endpoints when the client sends none.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Server-enforced upper bound on page size.
///
/// ## Business Reason
/// Keeps list responses bounded regardless of what the client asks for;
/// requests above the cap are clamped, not rejected.
pub const MAX_PAGE_SIZE: u32 = 100;

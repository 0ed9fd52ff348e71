//! # Repository Implementations
//!
//! One repository per resource, each exposing the shared CRUD contract:
//! `list` (filter + paginate + sort), `get` by business key, `create`,
//! `update` (full or partial — omitted fields keep their value), `delete`.
//!
//! Conventions (shared by every repository):
//! - Uniqueness pre-checks run inside the same transaction as the write;
//!   the UNIQUE constraint backstops the remaining check-then-act window.
//! - `rows_affected() == 0` on UPDATE/DELETE maps to `DbError::NotFound`.
//! - Sort parameters are validated against the repository's allow-list
//!   before any SQL runs.
//! - Repositories that touch address columns go through
//!   [`crate::reconcile`] so the owner-registry invariant holds on every
//!   write path.

pub mod department;
pub mod document;
pub mod employee;
pub mod legal_entity;
pub mod operation;
pub mod owner;
pub mod person;
pub mod user;
pub mod vehicle;
pub mod work;

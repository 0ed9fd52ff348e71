//! # Domain Types
//!
//! Core domain types used throughout the registration backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                            │
//! │                                                                 │
//! │  Parties                    Property              Registry      │
//! │  ┌────────────────┐  ┌───────────────────┐  ┌────────────────┐  │
//! │  │ NaturalPerson  │  │ TransportVehicle  │  │     Owner      │  │
//! │  │  passport (PK) │  │   vin (PK)        │  │  id (UUID)     │  │
//! │  │  name fields   │  │   chassis_number  │  │  address       │  │
//! │  │  address       │  │   engine_number   │  │  (UNIQUE)      │  │
//! │  ├────────────────┤  └───────────────────┘  └────────────────┘  │
//! │  │ LegalEntity    │                                             │
//! │  │  tax_number(PK)│  ┌───────────────────┐  ┌────────────────┐  │
//! │  │  company_name  │  │ RegistrationDoc   │  │ RegistrationOp │  │
//! │  │  address       │  │  reg_number (PK)  │  │  id (UUID)     │  │
//! │  └────────────────┘  │  document_owner   │  │  doc_number    │  │
//! │                      │  vehicle_vin      │  │  op_type       │  │
//! │  Staff: Employee, Department, Work, User │  └────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity Pattern
//! Entities with a natural business key (passport, tax number, VIN,
//! registration number, badge number) use it as their primary key; the
//! rest carry a UUID v4 surrogate id generated by the caller.
//!
//! Wire names are camelCase (`#[serde(rename_all = "camelCase")]`) to match
//! the SPA front-end; database columns stay snake_case via sqlx `FromRow`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Enums
// =============================================================================

/// Application user roles, gating route groups in the REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum Role {
    /// Citizen vehicle owner: reads own parties/documents.
    Citizen,
    /// Registration-department employee: manages parties, vehicles,
    /// documents and operations.
    Employee,
    /// Administrator: additionally manages staff, users and the works
    /// catalog.
    Admin,
}

impl Role {
    /// Whether this role carries at least the privileges of `required`.
    ///
    /// Roles are strictly ordered: Citizen < Employee < Admin.
    pub fn allows(&self, required: Role) -> bool {
        self.rank() >= required.rank()
    }

    fn rank(&self) -> u8 {
        match self {
            Role::Citizen => 0,
            Role::Employee => 1,
            Role::Admin => 2,
        }
    }
}

/// Kind of operation recorded against a registration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
pub enum OpType {
    /// First registration of a vehicle to a party.
    Registration,
    /// Removal of a vehicle from the register.
    Deregistration,
    /// Transfer of the document to a new owning party.
    OwnerChange,
    /// Correction of document details.
    Amendment,
}

// =============================================================================
// Owner Registry
// =============================================================================

/// One row of the deduplicated address registry.
///
/// Exactly one Owner row exists per address string currently used by at
/// least one party or registration document; the row disappears when the
/// last referencer does. Maintained by the reconciliation routine in
/// vreg-db, never written directly by API handlers.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Owner {
    /// Surrogate key (UUID v4).
    pub id: String,

    /// The address string this row deduplicates.
    pub address: String,
}

// =============================================================================
// Parties
// =============================================================================

/// A citizen capable of owning vehicles and registration documents.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct NaturalPerson {
    /// Passport number, format `dddd dddddd`. Business primary key.
    pub passport: String,

    pub last_name: String,

    pub first_name: String,

    pub middle_name: Option<String>,

    /// Current registered address. Reconciled by value against the owner
    /// registry, not a foreign key.
    pub address: String,
}

/// Partial update for a natural person. Omitted fields are left unchanged.
///
/// Nullable columns (`middleName` here, `description` on works, the link
/// keys on users) follow the same rule: an absent field keeps the stored
/// value, so a PATCH cannot clear one back to null. Clearing requires a
/// dedicated endpoint, which no current consumer needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PersonUpdate {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    /// A changed address triggers the reconciliation routine.
    pub address: Option<String>,
}

/// A company capable of owning vehicles and registration documents.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LegalEntity {
    /// 10-digit tax number. Business primary key.
    pub tax_number: String,

    pub company_name: String,

    /// Current registered address, reconciled by value.
    pub address: String,
}

/// Partial update for a legal entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LegalEntityUpdate {
    pub company_name: Option<String>,
    pub address: Option<String>,
}

// =============================================================================
// Vehicles
// =============================================================================

/// A vehicle known to the register.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransportVehicle {
    /// 17-character VIN. Business primary key.
    pub vin: String,

    pub brand: String,

    pub model: String,

    pub release_year: i64,

    /// Frozen once a registration document references the vehicle.
    pub engine_number: String,

    /// Frozen once a registration document references the vehicle.
    pub chassis_number: String,

    pub color: String,
}

/// Partial update for a vehicle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct VehicleUpdate {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub release_year: Option<i64>,
    pub engine_number: Option<String>,
    pub chassis_number: Option<String>,
    pub color: Option<String>,
}

// =============================================================================
// Registration Documents & Operations
// =============================================================================

/// A vehicle registration document.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RegistrationDoc {
    /// Registration number. Business primary key.
    pub reg_number: String,

    /// Passport or tax number of the owning party.
    pub document_owner: String,

    /// VIN of the registered vehicle.
    pub vehicle_vin: String,

    /// Address printed on the document. Follows the owning party's address
    /// while the party owns the document; may diverge historically after
    /// an owner change.
    pub address: String,

    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
}

/// Payload for issuing a new registration document.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewRegistrationDoc {
    pub reg_number: String,
    pub document_owner: String,
    pub vehicle_vin: String,
    pub address: String,
}

/// Partial update for a registration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DocUpdate {
    pub document_owner: Option<String>,
    pub address: Option<String>,
}

/// A journal entry for an operation performed on a document.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RegistrationOp {
    /// Surrogate key (UUID v4).
    pub id: String,

    pub doc_number: String,

    /// Badge number of the employee who performed the operation.
    pub employee_badge: String,

    /// Optional reference into the works catalog.
    pub work_id: Option<String>,

    pub op_type: OpType,

    #[ts(as = "String")]
    pub performed_at: DateTime<Utc>,
}

/// Payload for recording a new operation. `performed_at` is server-set.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewRegistrationOp {
    pub doc_number: String,
    pub employee_badge: String,
    pub work_id: Option<String>,
    pub op_type: OpType,
}

// =============================================================================
// Staff
// =============================================================================

/// A registration-department employee.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Employee {
    /// Badge number. Business primary key.
    pub badge_number: String,

    pub last_name: String,

    pub first_name: String,

    pub middle_name: Option<String>,

    /// Position title.
    pub post: String,

    pub department_id: String,
}

/// Partial update for an employee.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EmployeeUpdate {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub post: Option<String>,
    pub department_id: Option<String>,
}

/// A department of the registration service.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Department {
    /// Surrogate key (UUID v4).
    pub id: String,

    pub name: String,

    pub address: String,

    pub phone: String,
}

/// Payload for creating a department (id is server-generated).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewDepartment {
    pub name: String,
    pub address: String,
    pub phone: String,
}

/// Partial update for a department.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DepartmentUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

// =============================================================================
// Works Catalog
// =============================================================================

/// A registration service offered by the department (catalog entry).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Work {
    /// Surrogate key (UUID v4).
    pub id: String,

    /// Catalog name, unique.
    pub name: String,

    /// Price in cents (smallest currency unit, never floats).
    pub price_cents: i64,

    pub description: Option<String>,
}

/// Payload for creating a work (id is server-generated).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewWork {
    pub name: String,
    pub price_cents: i64,
    pub description: Option<String>,
}

/// Partial update for a work.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WorkUpdate {
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub description: Option<String>,
}

// =============================================================================
// Users
// =============================================================================

/// An application account.
///
/// `password_hash` never leaves the backend; the struct is serialize-only
/// on purpose (accounts are created through [`NewUser`]).
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Surrogate key (UUID v4).
    pub id: String,

    /// Login email, unique.
    pub email: String,

    #[serde(skip_serializing)]
    #[ts(skip)]
    pub password_hash: String,

    pub role: Role,

    /// Passport or tax number of the linked party, for citizen accounts.
    pub party_key: Option<String>,

    /// Badge number of the linked employee, for staff accounts.
    pub employee_badge: Option<String>,
}

/// Payload for creating a user account (plaintext password is hashed
/// with argon2 before it reaches the database).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub party_key: Option<String>,
    pub employee_badge: Option<String>,
}

/// Partial update for a user account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub party_key: Option<String>,
    pub employee_badge: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering() {
        assert!(Role::Admin.allows(Role::Employee));
        assert!(Role::Admin.allows(Role::Citizen));
        assert!(Role::Employee.allows(Role::Citizen));
        assert!(!Role::Citizen.allows(Role::Employee));
        assert!(!Role::Employee.allows(Role::Admin));
        assert!(Role::Citizen.allows(Role::Citizen));
    }

    #[test]
    fn test_camel_case_wire_names() {
        let entity = LegalEntity {
            tax_number: "1234567890".to_string(),
            company_name: "Vector LLC".to_string(),
            address: "Lenina st. 1".to_string(),
        };
        let json = serde_json::to_value(&entity).unwrap();
        assert!(json.get("taxNumber").is_some());
        assert!(json.get("companyName").is_some());
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            id: "u-1".to_string(),
            email: "a@b.c".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: Role::Citizen,
            party_key: None,
            employee_badge: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }
}

//! # Immutable-Field Policy
//!
//! Some identity fields become frozen once the entity is referenced by an
//! issued registration document: the document is a legal snapshot, and the
//! fields it certifies may no longer drift underneath it.
//!
//! The rule is the same for every entity kind, parametrized by a field
//! list, so it lives in one declarative table instead of being repeated in
//! each controller:
//!
//! ```text
//! ┌───────────────────┬──────────────────────────────────────┐
//! │ Entity kind       │ Frozen while documents exist         │
//! ├───────────────────┼──────────────────────────────────────┤
//! │ TransportVehicle  │ chassisNumber, engineNumber          │
//! │ NaturalPerson     │ lastName, firstName, middleName      │
//! │ LegalEntity       │ companyName                          │
//! └───────────────────┴──────────────────────────────────────┘
//! ```
//!
//! The address of a party is deliberately NOT frozen — address changes are
//! what the reconciliation routine exists for.
//!
//! The database layer consults [`frozen_violation`] inside the update
//! transaction, after counting dependent documents for the entity's key.

/// Entity kinds subject to the immutability policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    NaturalPerson,
    LegalEntity,
    TransportVehicle,
}

impl EntityKind {
    /// Human-readable name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::NaturalPerson => "natural person",
            EntityKind::LegalEntity => "legal entity",
            EntityKind::TransportVehicle => "vehicle",
        }
    }
}

/// Wire-level (camelCase) names of the fields frozen for an entity kind
/// while at least one registration document references it.
pub fn frozen_fields(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::NaturalPerson => &["lastName", "firstName", "middleName"],
        EntityKind::LegalEntity => &["companyName"],
        EntityKind::TransportVehicle => &["chassisNumber", "engineNumber"],
    }
}

/// Returns the first field in `touched` that the policy freezes for
/// `kind`, or `None` when the update is allowed.
///
/// `touched` must contain only fields whose value actually CHANGES —
/// re-sending the current value is not a violation (full updates echo
/// every field back).
pub fn frozen_violation(kind: EntityKind, touched: &[&str]) -> Option<&'static str> {
    frozen_fields(kind)
        .iter()
        .find(|frozen| touched.contains(*frozen))
        .copied()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_chassis_frozen() {
        assert_eq!(
            frozen_violation(EntityKind::TransportVehicle, &["chassisNumber"]),
            Some("chassisNumber")
        );
        assert_eq!(
            frozen_violation(EntityKind::TransportVehicle, &["color", "engineNumber"]),
            Some("engineNumber")
        );
    }

    #[test]
    fn test_vehicle_cosmetic_fields_allowed() {
        assert_eq!(
            frozen_violation(EntityKind::TransportVehicle, &["color", "brand", "model"]),
            None
        );
    }

    #[test]
    fn test_person_names_frozen_address_not() {
        assert_eq!(
            frozen_violation(EntityKind::NaturalPerson, &["lastName"]),
            Some("lastName")
        );
        // Address changes go through reconciliation, never through policy.
        assert_eq!(frozen_violation(EntityKind::NaturalPerson, &["address"]), None);
    }

    #[test]
    fn test_legal_entity_company_name_frozen() {
        assert_eq!(
            frozen_violation(EntityKind::LegalEntity, &["companyName"]),
            Some("companyName")
        );
        assert_eq!(frozen_violation(EntityKind::LegalEntity, &["address"]), None);
    }

    #[test]
    fn test_empty_update_allowed() {
        assert_eq!(frozen_violation(EntityKind::NaturalPerson, &[]), None);
    }
}

//! # Validation Module
//!
//! Field-format validation for the registration backend.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                          │
//! │                                                                 │
//! │  Layer 1: REST handler (deserialization)                        │
//! │  ├── Type/shape checks via serde                                │
//! │  └── THIS MODULE: field-format rules, before any DB access      │
//! │           │                                                     │
//! │           ▼                                                     │
//! │  Layer 2: Database (SQLite)                                     │
//! │  ├── NOT NULL constraints                                       │
//! │  ├── UNIQUE constraints (addresses, badges, emails, ...)        │
//! │  └── Foreign key constraints                                    │
//! │                                                                 │
//! │  Defense in depth: each layer catches different errors          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation failures are returned before a transaction opens; the
//! handler maps them to BadRequest naming the offending field.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Party Identifiers
// =============================================================================

/// Validates a passport number.
///
/// ## Rules
/// - Exactly 4 digits, one space, 6 digits (`dddd dddddd`)
///
/// ## Example
/// ```rust
/// use vreg_core::validation::validate_passport;
///
/// assert!(validate_passport("1234 567890").is_ok());
/// assert!(validate_passport("1234567890").is_err());
/// assert!(validate_passport("12a4 567890").is_err());
/// ```
pub fn validate_passport(passport: &str) -> ValidationResult<()> {
    let bytes = passport.as_bytes();
    let well_formed = bytes.len() == 11
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b' '
        && bytes[5..].iter().all(u8::is_ascii_digit);

    if !well_formed {
        return Err(ValidationError::InvalidFormat {
            field: "passport".to_string(),
            reason: "expected 4 digits, space, 6 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a legal-entity tax number.
///
/// ## Rules
/// - Exactly 10 digits
pub fn validate_tax_number(tax_number: &str) -> ValidationResult<()> {
    if tax_number.len() != 10 || !tax_number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "taxNumber".to_string(),
            reason: "expected exactly 10 digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Vehicle Identifiers
// =============================================================================

/// Validates a vehicle identification number.
///
/// ## Rules
/// - Exactly 17 characters
/// - Uppercase letters and digits only, excluding I, O and Q
///
/// ## Example
/// ```rust
/// use vreg_core::validation::validate_vin;
///
/// assert!(validate_vin("WVWZZZ1JZXW000001").is_ok());
/// assert!(validate_vin("WVWZZZ1JZXW00000").is_err());  // 16 chars
/// assert!(validate_vin("WVWZZZ1JZXW00000I").is_err()); // letter I
/// ```
pub fn validate_vin(vin: &str) -> ValidationResult<()> {
    let well_formed = vin.len() == 17
        && vin
            .bytes()
            .all(|b| (b.is_ascii_digit() || b.is_ascii_uppercase()) && !matches!(b, b'I' | b'O' | b'Q'));

    if !well_formed {
        return Err(ValidationError::InvalidFormat {
            field: "vin".to_string(),
            reason: "expected 17 uppercase letters/digits, excluding I, O, Q".to_string(),
        });
    }

    Ok(())
}

/// Validates a vehicle release year.
pub fn validate_release_year(year: i64) -> ValidationResult<()> {
    if !(1900..=2100).contains(&year) {
        return Err(ValidationError::OutOfRange {
            field: "releaseYear".to_string(),
            min: 1900,
            max: 2100,
        });
    }

    Ok(())
}

// =============================================================================
// Free-Text Fields
// =============================================================================

/// Validates a required short identifier (registration number, badge
/// number, engine/chassis number).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 30 characters
/// - Letters, digits, hyphens and spaces only
pub fn validate_identifier(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > 30 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 30,
        });
    }

    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == ' ')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, digits, hyphens and spaces".to_string(),
        });
    }

    Ok(())
}

/// Validates a required name field (person names, company names, posts,
/// brands, models, colors, department and work names).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 100 characters
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > 100 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates an address string.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// Addresses are compared by exact string value in the owner registry, so
/// no normalization happens here beyond what the client sent.
pub fn validate_address(address: &str) -> ValidationResult<()> {
    let address = address.trim();

    if address.is_empty() {
        return Err(ValidationError::Required {
            field: "address".to_string(),
        });
    }

    if address.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "address".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a login email.
///
/// ## Rules
/// - `local@domain` with a dot somewhere in the domain
/// - At most 254 characters
///
/// Intentionally shallow; the mail system is the real validator.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };

    if !well_formed {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected local@domain".to_string(),
        });
    }

    Ok(())
}

/// Validates a plaintext password before it is hashed.
///
/// ## Rules
/// - At least 8 characters
/// - At most 128 characters (argon2 input stays bounded)
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.len() < 8 {
        return Err(ValidationError::InvalidFormat {
            field: "password".to_string(),
            reason: "must be at least 8 characters".to_string(),
        });
    }

    if password.len() > 128 {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: 128,
        });
    }

    Ok(())
}

/// Validates a work price in cents.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "priceCents".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_passport() {
        assert!(validate_passport("1234 567890").is_ok());
        assert!(validate_passport("0000 000000").is_ok());

        assert!(validate_passport("").is_err());
        assert!(validate_passport("1234567890").is_err());
        assert!(validate_passport("1234  567890").is_err());
        assert!(validate_passport("123 4567890").is_err());
        assert!(validate_passport("12a4 567890").is_err());
        assert!(validate_passport("1234 5678901").is_err());
    }

    #[test]
    fn test_validate_tax_number() {
        assert!(validate_tax_number("1234567890").is_ok());

        assert!(validate_tax_number("").is_err());
        assert!(validate_tax_number("123456789").is_err());
        assert!(validate_tax_number("12345678901").is_err());
        assert!(validate_tax_number("123456789a").is_err());
    }

    #[test]
    fn test_validate_vin() {
        assert!(validate_vin("WVWZZZ1JZXW000001").is_ok());
        assert!(validate_vin("1HGBH41JXMN109186").is_ok());

        assert!(validate_vin("").is_err());
        assert!(validate_vin("WVWZZZ1JZXW00000").is_err());
        assert!(validate_vin("WVWZZZ1JZXW000001X").is_err());
        assert!(validate_vin("WVWZZZ1JZXW00000I").is_err());
        assert!(validate_vin("wvwzzz1jzxw000001").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("s3cret-enough").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_validate_release_year() {
        assert!(validate_release_year(1990).is_ok());
        assert!(validate_release_year(2026).is_ok());
        assert!(validate_release_year(1899).is_err());
        assert!(validate_release_year(2101).is_err());
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("regNumber", "A123BC 77").is_ok());
        assert!(validate_identifier("badgeNumber", "EMP-0042").is_ok());

        assert!(validate_identifier("regNumber", "").is_err());
        assert!(validate_identifier("regNumber", "   ").is_err());
        assert!(validate_identifier("regNumber", &"A".repeat(31)).is_err());
        assert!(validate_identifier("regNumber", "A123;DROP").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("lastName", "Ivanov").is_ok());
        assert!(validate_name("lastName", "").is_err());
        assert!(validate_name("lastName", &"A".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address("Lenina st. 1, apt. 5").is_ok());
        assert!(validate_address("").is_err());
        assert!(validate_address(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("userexample.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@localhost").is_err());
        assert!(validate_email("user@.com").is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(150000).is_ok());
        assert!(validate_price_cents(-1).is_err());
    }
}

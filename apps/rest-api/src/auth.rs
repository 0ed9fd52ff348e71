//! JWT authentication module.
//!
//! Handles token generation and validation, argon2 password hashing, and
//! the `AuthUser` extractor that handlers use for role gating.
//!
//! ## Roles
//! ```text
//! Citizen  < Employee < Admin      (Role::allows)
//!
//! Citizen   reads own party and own documents
//! Employee  manages parties, vehicles, documents, operations
//! Admin     additionally manages staff, users, works catalog
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vreg_core::{Role, User};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Claims & Token Manager
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Login email
    pub email: String,

    /// Application role
    pub role: Role,

    /// Linked party key (passport or tax number), for citizen accounts
    pub party_key: Option<String>,

    /// Linked employee badge, for staff accounts
    pub employee_badge: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            lifetime_secs,
        }
    }

    /// Generate a token for an authenticated user.
    pub fn issue(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            party_key: user.party_key.clone(),
            employee_badge: user.employee_badge.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ApiError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }

    /// Token lifetime in seconds (for login responses).
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hash a plaintext password with argon2id and a fresh salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored argon2 digest.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// =============================================================================
// AuthUser Extractor
// =============================================================================

/// The authenticated caller, extracted from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub role: Role,
    pub party_key: Option<String>,
    pub employee_badge: Option<String>,
}

impl AuthUser {
    /// Rejects callers below the required role.
    pub fn require(&self, required: Role) -> Result<(), ApiError> {
        if self.role.allows(required) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "This operation requires the {:?} role",
                required
            )))
        }
    }

    /// Whether the caller may read data belonging to the given party.
    ///
    /// Employees and admins may read any party; citizens only their own.
    pub fn can_view_party(&self, party_key: &str) -> bool {
        self.role.allows(Role::Employee) || self.party_key.as_deref() == Some(party_key)
    }

    /// Like [`Self::can_view_party`] but as a gate.
    pub fn require_party_access(&self, party_key: &str) -> Result<(), ApiError> {
        if self.can_view_party(party_key) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Citizens may only access their own records".to_string(),
            ))
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::Unauthorized("Expected bearer token".to_string()))?;

        let claims = state.jwt.validate(token)?;

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
            party_key: claims.party_key,
            employee_badge: claims.employee_badge,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, party_key: Option<&str>) -> User {
        User {
            id: "u-1".to_string(),
            email: "ivan@example.com".to_string(),
            password_hash: String::new(),
            role,
            party_key: party_key.map(str::to_string),
            employee_badge: None,
        }
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);

        let token = manager.issue(&user(Role::Citizen, Some("1234 567890"))).unwrap();
        let claims = manager.validate(&token).unwrap();

        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.role, Role::Citizen);
        assert_eq!(claims.party_key.as_deref(), Some("1234 567890"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtManager::new("secret-a".to_string(), 3600);
        let verifier = JwtManager::new("secret-b".to_string(), 3600);

        let token = issuer.issue(&user(Role::Admin, None)).unwrap();
        assert!(verifier.validate(&token).is_err());
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret", "not-a-hash"));
    }

    #[test]
    fn test_party_access() {
        let citizen = AuthUser {
            id: "u-1".to_string(),
            role: Role::Citizen,
            party_key: Some("1234 567890".to_string()),
            employee_badge: None,
        };
        assert!(citizen.can_view_party("1234 567890"));
        assert!(!citizen.can_view_party("4321 098765"));
        assert!(citizen.require(Role::Employee).is_err());

        let employee = AuthUser {
            id: "u-2".to_string(),
            role: Role::Employee,
            party_key: None,
            employee_badge: Some("B-001".to_string()),
        };
        assert!(employee.can_view_party("1234 567890"));
        assert!(employee.require(Role::Admin).is_err());
    }

    #[test]
    fn test_bearer_extraction() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }
}

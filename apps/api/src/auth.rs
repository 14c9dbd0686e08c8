//! JWT authentication module.
//!
//! Handles token generation and validation, password hashing, and the
//! `AuthContext` extractor that guards mutating routes.
//!
//! ```text
//! Authorization: Bearer <jwt>
//!        │
//!        ▼
//! AuthContext::from_request_parts ──► JwtManager::validate_token
//!        │                                   │
//!        │ 401 on missing / invalid ◄────────┘
//!        ▼
//! handler: ctx.require_staff()? / ctx.ensure_store(&store_id)?   (403)
//! ```

use axum::{extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ingreventory_core::{User, UserRole};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    pub email: String,

    pub role: UserRole,

    /// Store the user belongs to
    pub store_id: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
#[derive(Clone)]
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        JwtManager { secret, lifetime_secs }
    }

    /// Issues a token for a user.
    pub fn generate_token(&self, user: &User) -> ApiResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            store_id: user.store_id.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("Failed to generate token: {e}")))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> ApiResult<Claims> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ApiError::Unauthorized(format!("Invalid token: {e}")))?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
}

// =============================================================================
// Passwords
// =============================================================================

/// Hash a password for storage.
pub fn hash_password(password: &str) -> ApiResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a password against its hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Request Context
// =============================================================================

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: String,
    pub email: String,
    pub role: UserRole,
    pub store_id: Option<String>,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        AuthContext {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
            store_id: claims.store_id,
        }
    }
}

impl AuthContext {
    pub fn require_staff(&self) -> ApiResult<()> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Staff access required".to_string()))
        }
    }

    pub fn require_admin(&self) -> ApiResult<()> {
        if self.role == UserRole::Admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin access required".to_string()))
        }
    }

    /// Staff of `store_id` only.
    pub fn ensure_store(&self, store_id: &str) -> ApiResult<()> {
        self.require_staff()?;
        if self.store_id.as_deref() == Some(store_id) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "User {} is not authorized for store {store_id}",
                self.user_id
            )))
        }
    }

    /// The user themselves, or staff.
    pub fn ensure_self_or_staff(&self, user_id: &str) -> ApiResult<()> {
        if self.user_id == user_id || self.role.is_staff() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Not allowed to access this user".to_string()))
        }
    }
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::Unauthorized("Expected a bearer token".to_string()))?;

        let claims = state.jwt.validate_token(token)?;
        Ok(AuthContext::from(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> User {
        User {
            id: "user-001".to_string(),
            email: "owner@bean.test".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Bean".to_string(),
            role,
            store_id: Some("store-001".to_string()),
            phone: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret".to_string(), 3600);

        let token = manager.generate_token(&user(UserRole::Admin)).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "user-001");
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.store_id.as_deref(), Some("store-001"));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = JwtManager::new("one".to_string(), 3600);
        let verifier = JwtManager::new("two".to_string(), 3600);

        let token = issuer.generate_token(&user(UserRole::User)).unwrap();
        assert!(matches!(verifier.validate_token(&token), Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let manager = JwtManager::new("test-secret".to_string(), -3600);
        let token = manager.generate_token(&user(UserRole::Admin)).unwrap();
        assert!(manager.validate_token(&token).is_err());
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(verify_password("s3cret-pass", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret-pass", "not-a-hash"));
    }

    #[test]
    fn test_bearer_extraction() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }

    #[test]
    fn test_store_scoping() {
        let ctx = AuthContext::from(Claims {
            sub: "u1".into(),
            email: "c@bean.test".into(),
            role: UserRole::Cashier,
            store_id: Some("store-001".into()),
            iat: 0,
            exp: 0,
            jti: "j".into(),
        });

        assert!(ctx.ensure_store("store-001").is_ok());
        assert!(matches!(ctx.ensure_store("store-002"), Err(ApiError::Forbidden(_))));
        assert!(ctx.require_admin().is_err());

        let customer = AuthContext {
            role: UserRole::User,
            ..ctx
        };
        assert!(customer.ensure_store("store-001").is_err());
        assert!(customer.ensure_self_or_staff("u1").is_ok());
        assert!(customer.ensure_self_or_staff("u2").is_err());
    }
}

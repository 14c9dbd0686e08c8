//! Registration, login and password reset.
//!
//! ```text
//! register           ──► store + admin user ──► token
//! register-customer  ──► user (role "user") of an existing store ──► token
//! login              ──► token
//! forgot-password    ──► 6-digit code stored + emailed
//! reset-password     ──► code checked ──► new password
//! ```

use axum::{extract::State, routing::post, Router};
use chrono::{Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ingreventory_core::validation::{slugify, validate_email, validate_name, validate_password};
use ingreventory_core::{
    BusinessType, Store, StoreAddress, User, UserRole, ValidationError, DEFAULT_CURRENCY_CODE,
    DEFAULT_CURRENCY_SYMBOL,
};
use ingreventory_db::generate_id;

use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::integrations::sender::Recipient;
use crate::response::ApiResponse;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/register-customer", post(register_customer))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub store_name: String,
    #[serde(default)]
    pub store_address: StoreAddress,
    #[serde(default)]
    pub store_phone: String,
    pub store_email: Option<String>,
    pub business_type: Option<BusinessType>,
    pub currency: Option<String>,
    pub currency_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCustomerRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub store_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// Token plus the signed-in user and, when known, their store.
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<Store>,
}

/// Creates a store and its first user, an admin.
async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<ApiResponse<AuthPayload>> {
    let email = validate_email(&body.email)?;
    validate_password(&body.password)?;
    let first_name = validate_name("firstName", &body.first_name, 100)?;
    let last_name = validate_name("lastName", &body.last_name, 100)?;
    let store_name = validate_name("storeName", &body.store_name, 100)?;

    let slug = slugify(&store_name);
    if slug.is_empty() {
        return Err(ValidationError::invalid("storeName", "must contain letters or digits").into());
    }

    ensure_email_free(&state, &email).await?;
    if state.db.stores().slug_exists(&slug).await? {
        return Err(ApiError::BadRequest("A store with this name already exists".to_string()));
    }

    let store_email = match body.store_email.as_deref().filter(|e| !e.trim().is_empty()) {
        Some(store_email) => validate_email(store_email)?,
        None => email.clone(),
    };

    let now = Utc::now();
    let store = Store {
        id: generate_id(),
        name: store_name,
        slug,
        address: body.store_address,
        currency: body
            .currency
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string()),
        currency_code: body
            .currency_code
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY_CODE.to_string()),
        phone: body.store_phone,
        email: store_email,
        business_type: body.business_type.unwrap_or(BusinessType::Other),
        tax_id: None,
        background_image: None,
        logo_image: None,
        created_at: now,
        updated_at: now,
    };
    let store = state.db.stores().insert(&store).await?;

    let user = new_user(email, first_name, last_name, UserRole::Admin, Some(store.id.clone()));
    let password_hash = hash_password(&body.password)?;
    let user = state.db.users().insert(&user, &password_hash).await?;
    let token = state.jwt.generate_token(&user)?;

    info!(user_id = %user.id, store_id = %store.id, slug = %store.slug, "Store registered");

    Ok(ApiResponse::created(AuthPayload {
        token,
        user,
        store: Some(store),
    }))
}

/// Signs up a shopper of an existing store.
async fn register_customer(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterCustomerRequest>,
) -> ApiResult<ApiResponse<AuthPayload>> {
    let email = validate_email(&body.email)?;
    validate_password(&body.password)?;
    let first_name = validate_name("firstName", &body.first_name, 100)?;
    let last_name = validate_name("lastName", &body.last_name, 100)?;
    if body.store_id.trim().is_empty() {
        return Err(ValidationError::required("storeId").into());
    }

    ensure_email_free(&state, &email).await?;
    let store = state
        .db
        .stores()
        .get_by_id(&body.store_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Store"))?;

    let user = new_user(email, first_name, last_name, UserRole::User, Some(store.id.clone()));
    let password_hash = hash_password(&body.password)?;
    let user = state.db.users().insert(&user, &password_hash).await?;
    let token = state.jwt.generate_token(&user)?;

    info!(user_id = %user.id, store_id = %store.id, "Customer registered");

    Ok(ApiResponse::created(AuthPayload {
        token,
        user,
        store: Some(store),
    }))
}

async fn login(State(state): State<AppState>, ApiJson(body): ApiJson<LoginRequest>) -> ApiResult<ApiResponse<AuthPayload>> {
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let email = body.email.trim().to_lowercase();
    let credentials = state.db.users().credentials_by_email(&email).await?.ok_or_else(invalid)?;

    if !verify_password(&body.password, &credentials.password_hash) {
        warn!(email = %email, "Failed login attempt");
        return Err(invalid());
    }

    let mut user = credentials.user;
    if !user.is_active {
        return Err(ApiError::Forbidden("Account is disabled".to_string()));
    }

    let now = Utc::now();
    state.db.users().touch_last_login(&user.id, now).await?;
    user.last_login = Some(now);

    let store = match user.store_id.as_deref() {
        Some(store_id) => state.db.stores().get_by_id(store_id).await?,
        None => None,
    };
    let token = state.jwt.generate_token(&user)?;

    info!(user_id = %user.id, "User logged in");
    Ok(ApiResponse::ok(AuthPayload { token, user, store }))
}

/// Stores a fresh reset code and emails it. Without a configured email
/// integration the code is only stored.
async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ForgotPasswordRequest>,
) -> ApiResult<ApiResponse<()>> {
    let email = body.email.trim().to_lowercase();
    let user = state
        .db
        .users()
        .get_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    let code = generate_reset_code();
    let expires_at = Utc::now() + Duration::seconds(state.config.auth.reset_code_lifetime_secs);
    state.db.users().set_reset_code(&user.id, &code, expires_at).await?;

    let sender = &state.integrations.sender;
    if sender.is_configured() {
        let recipient = Recipient {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        };
        sender.send_reset_code(&recipient, &code).await?;
    } else {
        warn!(user_id = %user.id, "Email integration not configured, reset code not sent");
    }

    Ok(ApiResponse::done("Verification code sent to email"))
}

async fn reset_password(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ResetPasswordRequest>,
) -> ApiResult<ApiResponse<()>> {
    let invalid = || ApiError::BadRequest("Invalid or expired code".to_string());

    let email = body.email.trim().to_lowercase();
    let credentials = state.db.users().credentials_by_email(&email).await?.ok_or_else(invalid)?;

    let code_matches = credentials.reset_code.as_deref() == Some(body.code.trim());
    let unexpired = credentials
        .reset_code_expires_at
        .is_some_and(|expires_at| expires_at >= Utc::now());
    if !code_matches || !unexpired {
        return Err(invalid());
    }

    validate_password(&body.new_password)?;
    let password_hash = hash_password(&body.new_password)?;
    state.db.users().set_password(&credentials.user.id, &password_hash).await?;

    info!(user_id = %credentials.user.id, "Password reset");
    Ok(ApiResponse::done("Password reset successful"))
}

pub(crate) async fn ensure_email_free(state: &AppState, email: &str) -> ApiResult<()> {
    if state.db.users().get_by_email(email).await?.is_some() {
        return Err(ApiError::BadRequest("User with this email already exists".to_string()));
    }
    Ok(())
}

pub(crate) fn new_user(
    email: String,
    first_name: String,
    last_name: String,
    role: UserRole,
    store_id: Option<String>,
) -> User {
    User {
        id: generate_id(),
        email,
        first_name,
        last_name,
        role,
        store_id,
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

fn generate_reset_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_reset_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_new_user_is_active() {
        let user = new_user("a@b.test".into(), "A".into(), "B".into(), UserRole::Cashier, None);
        assert!(user.is_active);
        assert_eq!(user.role, UserRole::Cashier);
        assert!(!user.id.is_empty());
    }
}

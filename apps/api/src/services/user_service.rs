//! User management for store staff.

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use tracing::info;

use ingreventory_core::validation::{validate_email, validate_name, validate_password};
use ingreventory_core::{User, UserRole};

use crate::auth::{hash_password, AuthContext};
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::response::ApiResponse;
use crate::services::auth_service::{ensure_email_free, new_user};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).delete(delete_user))
        .route("/users/update/{id}", put(update_user))
}

#[derive(Debug, Default, Deserialize)]
pub struct UserFilter {
    pub store: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
    pub store: Option<String>,
}

/// `isActive` arrives either as a boolean or as the dashboard's
/// `"active"` / `"inactive"` select value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ActiveFlag {
    Bool(bool),
    Label(String),
}

impl ActiveFlag {
    fn is_active(&self) -> bool {
        match self {
            ActiveFlag::Bool(active) => *active,
            ActiveFlag::Label(label) => label.eq_ignore_ascii_case("active"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub is_active: Option<ActiveFlag>,
}

/// Staff list the users of a store, their own by default.
async fn list_users(
    State(state): State<AppState>,
    ctx: AuthContext,
    ApiQuery(filter): ApiQuery<UserFilter>,
) -> ApiResult<ApiResponse<Vec<User>>> {
    ctx.require_staff()?;

    let store_id = filter.store.filter(|s| !s.is_empty()).or_else(|| ctx.store_id.clone());
    if let Some(store_id) = store_id.as_deref() {
        ctx.ensure_store(store_id)?;
    }

    let users = state.db.users().list(store_id.as_deref()).await?;
    Ok(ApiResponse::list(users))
}

async fn get_user(State(state): State<AppState>, ctx: AuthContext, Path(id): Path<String>) -> ApiResult<ApiResponse<User>> {
    let user = load_user(&state, &id).await?;
    authorize_access(&ctx, &user)?;
    Ok(ApiResponse::ok(user))
}

/// Admins add users to their own store.
async fn create_user(
    State(state): State<AppState>,
    ctx: AuthContext,
    ApiJson(body): ApiJson<NewUserRequest>,
) -> ApiResult<ApiResponse<User>> {
    ctx.require_admin()?;
    let store_id = body.store.or_else(|| ctx.store_id.clone());
    if let Some(store_id) = store_id.as_deref() {
        ctx.ensure_store(store_id)?;
    }

    let email = validate_email(&body.email)?;
    validate_password(&body.password)?;
    let first_name = validate_name("firstName", &body.first_name, 100)?;
    let last_name = validate_name("lastName", &body.last_name, 100)?;
    ensure_email_free(&state, &email).await?;

    let user = new_user(email, first_name, last_name, body.role.unwrap_or_default(), store_id);
    let password_hash = hash_password(&body.password)?;
    let user = state.db.users().insert(&user, &password_hash).await?;

    info!(user_id = %user.id, role = user.role.as_str(), "User created");
    Ok(ApiResponse::created(user))
}

/// Profile update. Changing `role` or `isActive` takes an admin.
async fn update_user(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UserUpdate>,
) -> ApiResult<ApiResponse<User>> {
    let mut user = load_user(&state, &id).await?;
    authorize_access(&ctx, &user)?;

    if let Some(email) = body.email.as_deref() {
        let email = validate_email(email)?;
        if email != user.email {
            if state.db.users().get_by_email(&email).await?.is_some() {
                return Err(ApiError::BadRequest("Email is already in use".to_string()));
            }
            user.email = email;
        }
    }
    if let Some(first_name) = body.first_name.as_deref() {
        user.first_name = validate_name("firstName", first_name, 100)?;
    }
    if let Some(last_name) = body.last_name.as_deref() {
        user.last_name = validate_name("lastName", last_name, 100)?;
    }
    if let Some(role) = body.role {
        if role != user.role {
            ctx.require_admin()?;
            user.role = role;
        }
    }
    if let Some(flag) = body.is_active.as_ref() {
        let active = flag.is_active();
        if active != user.is_active {
            ctx.require_admin()?;
            user.is_active = active;
        }
    }
    if body.phone.is_some() {
        user.phone = body.phone;
    }
    if body.address.is_some() {
        user.address = body.address;
    }
    if body.city.is_some() {
        user.city = body.city;
    }
    if body.state.is_some() {
        user.state = body.state;
    }
    if body.zip_code.is_some() {
        user.zip_code = body.zip_code;
    }

    let user = state.db.users().update_profile(&user).await?;
    Ok(ApiResponse::ok(user))
}

async fn delete_user(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    let user = load_user(&state, &id).await?;
    ctx.require_admin()?;
    authorize_access(&ctx, &user)?;

    state.db.users().delete(&id).await?;
    info!(user_id = %id, "User deleted");
    Ok(ApiResponse::done("User deleted successfully"))
}

async fn load_user(state: &AppState, id: &str) -> ApiResult<User> {
    state
        .db
        .users()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))
}

/// The user themselves, or staff of the user's store.
fn authorize_access(ctx: &AuthContext, user: &User) -> ApiResult<()> {
    if ctx.user_id == user.id {
        return Ok(());
    }
    match user.store_id.as_deref() {
        Some(store_id) => ctx.ensure_store(store_id),
        None => ctx.require_staff(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_flag_accepts_bool_and_label() {
        let flag: ActiveFlag = serde_json::from_str("true").unwrap();
        assert!(flag.is_active());

        let flag: ActiveFlag = serde_json::from_str("\"active\"").unwrap();
        assert!(flag.is_active());

        let flag: ActiveFlag = serde_json::from_str("\"inactive\"").unwrap();
        assert!(!flag.is_active());
    }

    #[test]
    fn test_customer_cannot_read_other_users() {
        let ctx = AuthContext {
            user_id: "u1".into(),
            email: "u1@test".into(),
            role: UserRole::User,
            store_id: Some("s1".into()),
        };
        let mut other = new_user("u2@test".into(), "U".into(), "Two".into(), UserRole::User, Some("s1".into()));
        other.id = "u2".into();

        assert!(matches!(authorize_access(&ctx, &other), Err(ApiError::Forbidden(_))));

        other.id = "u1".into();
        assert!(authorize_access(&ctx, &other).is_ok());
    }
}

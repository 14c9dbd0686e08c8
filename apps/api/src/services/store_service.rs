//! Store lookup and settings.

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use tracing::info;

use ingreventory_core::validation::{slugify, validate_email, validate_name};
use ingreventory_core::{BusinessType, Store, StoreAddress, ValidationError};

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::response::ApiResponse;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stores/slug/{slug}", get(get_store_by_slug))
        .route("/stores/{id}", put(update_store))
}

/// Partial store update. Address fields merge into the current address.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreUpdate {
    pub name: Option<String>,
    pub address: Option<StoreAddress>,
    pub currency: Option<String>,
    pub currency_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub business_type: Option<BusinessType>,
    pub tax_id: Option<String>,
    pub background_image: Option<String>,
    pub logo_image: Option<String>,
}

async fn get_store_by_slug(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<ApiResponse<Store>> {
    let store = state
        .db
        .stores()
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found("Store"))?;
    Ok(ApiResponse::ok(store))
}

async fn update_store(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StoreUpdate>,
) -> ApiResult<ApiResponse<Store>> {
    ctx.ensure_store(&id)?;

    let mut store = state
        .db
        .stores()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Store"))?;

    if let Some(name) = body.name.as_deref() {
        let name = validate_name("name", name, 100)?;
        let slug = slugify(&name);
        if slug.is_empty() {
            return Err(ValidationError::invalid("name", "must contain letters or digits").into());
        }
        if slug != store.slug && state.db.stores().slug_exists(&slug).await? {
            return Err(ApiError::BadRequest("A store with this name already exists".to_string()));
        }
        store.name = name;
        store.slug = slug;
    }
    if let Some(address) = body.address {
        merge_address(&mut store.address, address);
    }
    if let Some(currency) = body.currency {
        store.currency = currency;
    }
    if let Some(code) = body.currency_code {
        store.currency_code = code.trim().to_uppercase();
    }
    if let Some(phone) = body.phone {
        store.phone = phone;
    }
    if let Some(email) = body.email.as_deref() {
        store.email = validate_email(email)?;
    }
    if let Some(business_type) = body.business_type {
        store.business_type = business_type;
    }
    if body.tax_id.is_some() {
        store.tax_id = body.tax_id;
    }
    if body.background_image.is_some() {
        store.background_image = body.background_image;
    }
    if body.logo_image.is_some() {
        store.logo_image = body.logo_image;
    }

    let store = state.db.stores().update(&store).await?;
    info!(store_id = %store.id, slug = %store.slug, "Store updated");
    Ok(ApiResponse::ok(store))
}

fn merge_address(current: &mut StoreAddress, update: StoreAddress) {
    if update.street.is_some() {
        current.street = update.street;
    }
    if update.city.is_some() {
        current.city = update.city;
    }
    if update.state.is_some() {
        current.state = update.state;
    }
    if update.zip_code.is_some() {
        current.zip_code = update.zip_code;
    }
    if update.country.is_some() {
        current.country = update.country;
    }
}

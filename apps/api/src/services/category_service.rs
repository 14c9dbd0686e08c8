//! Category endpoints. Slugs are unique per store.

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use ingreventory_core::validation::{slugify, validate_name, validate_optional_text};
use ingreventory_core::{Category, ValidationError};
use ingreventory_db::generate_id;

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::response::ApiResponse;
use crate::services::product_service::StoreFilter;
use crate::AppState;

const NAME_MAX: usize = 50;
const DESCRIPTION_MAX: usize = 500;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBody {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    #[serde(alias = "store")]
    pub store_id: Option<String>,
}

/// Newest first, each with its product count.
async fn list_categories(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<StoreFilter>,
) -> ApiResult<ApiResponse<Vec<Category>>> {
    let store_id = filter
        .store_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("storeId is required".to_string()))?;

    let categories = state.db.categories().list_by_store(&store_id).await?;
    Ok(ApiResponse::list(categories))
}

async fn get_category(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ApiResponse<Category>> {
    let category = load_category(&state, &id).await?;
    Ok(ApiResponse::ok(category))
}

async fn create_category(
    State(state): State<AppState>,
    ctx: AuthContext,
    ApiJson(body): ApiJson<CategoryBody>,
) -> ApiResult<ApiResponse<Category>> {
    let store_id = body
        .store_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ValidationError::required("storeId"))?;
    ctx.ensure_store(&store_id)?;

    let name = validate_name("name", body.name.as_deref().unwrap_or_default(), NAME_MAX)?;
    validate_optional_text("description", body.description.as_deref(), DESCRIPTION_MAX)?;
    let slug = resolve_slug(body.slug.as_deref(), &name)?;

    ensure_slug_free(&state, &store_id, &slug, None).await?;

    let now = Utc::now();
    let category = Category {
        id: generate_id(),
        store_id: store_id.clone(),
        name,
        slug,
        description: body.description,
        is_active: body.is_active.unwrap_or(true),
        product_count: 0,
        created_at: now,
        updated_at: now,
    };

    let category = state.db.categories().insert(&category).await?;
    info!(category_id = %category.id, store_id = %store_id, slug = %category.slug, "Category created");

    Ok(ApiResponse::created(category))
}

/// A new name without an explicit slug re-derives the slug.
async fn update_category(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<CategoryBody>,
) -> ApiResult<ApiResponse<Category>> {
    let mut category = load_category(&state, &id).await?;
    ctx.ensure_store(&category.store_id)?;

    if let Some(name) = body.name.as_deref() {
        category.name = validate_name("name", name, NAME_MAX)?;
        if body.slug.is_none() {
            category.slug = resolve_slug(None, &category.name)?;
        }
    }
    if let Some(slug) = body.slug.as_deref() {
        category.slug = resolve_slug(Some(slug), &category.name)?;
    }
    if let Some(description) = body.description {
        validate_optional_text("description", Some(&description), DESCRIPTION_MAX)?;
        category.description = Some(description);
    }
    if let Some(is_active) = body.is_active {
        category.is_active = is_active;
    }

    ensure_slug_free(&state, &category.store_id, &category.slug, Some(&category.id)).await?;

    let category = state.db.categories().update(&category).await?;
    Ok(ApiResponse::ok(category))
}

/// Refused while products still reference the category.
async fn delete_category(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    let category = load_category(&state, &id).await?;
    ctx.ensure_store(&category.store_id)?;

    state.db.categories().delete(&id).await?;
    info!(category_id = %id, "Category deleted");
    Ok(ApiResponse::done("Category deleted successfully"))
}

async fn load_category(state: &AppState, id: &str) -> ApiResult<Category> {
    state
        .db
        .categories()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category"))
}

fn resolve_slug(explicit: Option<&str>, name: &str) -> ApiResult<String> {
    let slug = match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => slugify(slug),
        None => slugify(name),
    };

    if slug.is_empty() {
        return Err(ValidationError::invalid("slug", "must contain letters or digits").into());
    }
    Ok(slug)
}

async fn ensure_slug_free(state: &AppState, store_id: &str, slug: &str, except_id: Option<&str>) -> ApiResult<()> {
    if state.db.categories().slug_exists(store_id, slug, except_id).await? {
        return Err(ApiError::BadRequest("Category with this slug already exists".to_string()));
    }
    Ok(())
}

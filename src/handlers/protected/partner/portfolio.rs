// handlers/protected/partner/portfolio.rs - /api/partner/portfolio[/:id]

use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{PortfolioItem, PortfolioUpdate};
use crate::error::ApiError;
use crate::handlers::extract::{ApiJson, ApiPath};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::PortfolioInput;
use crate::types::ServiceCategory;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PortfolioRequest {
    pub title: Option<String>,
    pub category: Option<ServiceCategory>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// POST /api/partner/portfolio - append an item after the existing ones
pub async fn portfolio_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<PortfolioRequest>,
) -> ApiResult<PortfolioItem> {
    let category = body
        .category
        .ok_or_else(|| ApiError::invalid_field("category", "Please provide category"))?;

    let item = state
        .portfolio()
        .add(
            user.user_id,
            PortfolioInput {
                title: body.title.unwrap_or_default(),
                category,
                description: body.description,
                image_url: body.image_url.unwrap_or_default(),
            },
        )
        .await?;

    Ok(ApiResponse::created(item))
}

/// GET /api/partner/portfolio - the caller's items by display order
pub async fn portfolio_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<PortfolioItem>> {
    let items = state.portfolio().list(user.user_id).await?;
    Ok(ApiResponse::list(items))
}

/// PUT /api/partner/portfolio/:id
pub async fn portfolio_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<PortfolioRequest>,
) -> ApiResult<PortfolioItem> {
    let item = state
        .portfolio()
        .update(
            user.user_id,
            id,
            PortfolioUpdate {
                title: body.title,
                category: body.category,
                description: body.description,
                image_url: body.image_url,
            },
        )
        .await?;

    Ok(ApiResponse::success(item))
}

/// DELETE /api/partner/portfolio/:id
pub async fn portfolio_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Value> {
    state.portfolio().delete(user.user_id, id).await?;
    Ok(ApiResponse::success(json!({})))
}

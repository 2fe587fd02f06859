// handlers/elevated/admin/reviews.rs - review moderation

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Review;
use crate::error::ApiError;
use crate::handlers::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ReviewView;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReviewQuery {
    pub approved: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModerateRequest {
    #[serde(alias = "approved")]
    pub is_approved: Option<bool>,
    pub comment: Option<String>,
}

/// GET /api/admin/reviews?approved=true|false
pub async fn reviews_list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ReviewQuery>,
) -> ApiResult<Vec<ReviewView>> {
    let approved = match query.approved.as_deref().map(str::trim) {
        None | Some("") => None,
        Some("true") => Some(true),
        Some("false") => Some(false),
        Some(other) => {
            return Err(ApiError::bad_request(format!(
                "Invalid approved filter: {} (expected true or false)",
                other
            )))
        }
    };

    let reviews = state.reviews().list(approved).await?;
    Ok(ApiResponse::list(reviews))
}

/// PUT /api/admin/reviews/:id - `{ "isApproved": true, "comment": "..." }`
pub async fn review_put(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ModerateRequest>,
) -> ApiResult<Review> {
    let review = state
        .reviews()
        .moderate(id, body.is_approved, body.comment)
        .await?;

    Ok(ApiResponse::success(review))
}

/// DELETE /api/admin/reviews/:id
pub async fn review_delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Value> {
    state.reviews().delete(id).await?;
    Ok(ApiResponse::success(json!({})))
}

// handlers/protected/inquiry/review.rs - POST /api/inquiry/:id/review

use axum::{extract::State, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Review;
use crate::handlers::extract::{ApiJson, ApiPath};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReviewRequest {
    pub rating: Option<i64>,
    pub comment: String,
}

/// POST /api/inquiry/:id/review - review the partner that booked this inquiry
///
/// The review starts unapproved; a second review of the same partner is 409.
pub async fn review_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(inquiry_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ReviewRequest>,
) -> ApiResult<Review> {
    let review = state
        .reviews()
        .create(user.user_id, inquiry_id, body.rating, &body.comment)
        .await?;

    Ok(ApiResponse::created(review))
}

// handlers/public/partners.rs - GET /api/partners/:id

use axum::extract::State;
use uuid::Uuid;

use crate::app::AppState;
use crate::handlers::extract::ApiPath;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::PublicProfile;

/// GET /api/partners/:id - verified partner with portfolio and approved reviews
pub async fn partner_profile(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<PublicProfile> {
    let profile = state.partners().public_profile(id).await?;
    Ok(ApiResponse::success(profile))
}

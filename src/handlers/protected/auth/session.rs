// handlers/protected/auth/session.rs - GET /api/auth/me

use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/auth/me - the authenticated user's account
///
/// ```json
/// { "success": true, "data": { "id": "...", "name": "...", "email": "...", "phone": "...", "role": "partner", "isVerified": true, "createdAt": "..." } }
/// ```
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<User> {
    let account = state.accounts().me(user.user_id).await?;
    Ok(ApiResponse::success(account))
}

// handlers/protected/auth/otp.rs - POST /api/auth/verify-otp, POST /api/auth/resend-otp

use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::handlers::extract::ApiJson;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyOtpRequest {
    pub otp: Option<String>,
}

/// POST /api/auth/verify-otp - confirm the one-time code and mark the account verified
pub async fn verify_otp(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<VerifyOtpRequest>,
) -> ApiResult<Value> {
    state
        .accounts()
        .verify_otp(user.user_id, body.otp.as_deref())
        .await?;

    Ok(ApiResponse::success(json!({ "isVerified": true }))
        .with("message", "OTP verified successfully"))
}

/// POST /api/auth/resend-otp - replace the pending code
///
/// `data.otp` carries the code in development and is null elsewhere.
pub async fn resend_otp(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let otp = state.accounts().resend_otp(user.user_id).await?;

    Ok(ApiResponse::success(json!({ "otp": otp })).with("message", "OTP sent successfully"))
}

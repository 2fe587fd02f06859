// handlers/public/auth.rs - POST /api/auth/signup, POST /api/auth/login

use axum::extract::State;
use serde::Deserialize;

use crate::app::AppState;
use crate::handlers::extract::ApiJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{AuthSession, SignupInput, UserSummary};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/signup - register a client or partner
///
/// ```json
/// { "success": true, "token": "eyJ...", "otp": "123456", "data": { "id": "...", "role": "client", "isVerified": false } }
/// ```
/// `otp` is present only in development.
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignupRequest>,
) -> ApiResult<UserSummary> {
    let session = state
        .accounts()
        .signup(SignupInput {
            name: body.name,
            email: body.email,
            phone: body.phone,
            password: body.password,
            role: body.role,
        })
        .await?;

    Ok(session_response(session, true))
}

/// POST /api/auth/login - exchange credentials for a token
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<UserSummary> {
    let session = state.accounts().login(&body.email, &body.password).await?;
    Ok(session_response(session, false))
}

fn session_response(session: AuthSession, created: bool) -> ApiResponse<UserSummary> {
    let response = if created {
        ApiResponse::created(session.user)
    } else {
        ApiResponse::success(session.user)
    };
    let response = response.with("token", session.token);
    match session.otp {
        Some(otp) => response.with("otp", otp),
        None => response,
    }
}

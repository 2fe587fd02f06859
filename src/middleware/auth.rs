use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{decode_token, AuthError};
use crate::error::ApiError;
use crate::types::Role;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
    pub is_verified: bool,
}

/// JWT authentication middleware that validates tokens and extracts user context.
///
/// The account must still exist and still hold the role the token was
/// issued for.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(|msg| {
        tracing::debug!("Rejected request without usable token: {}", msg);
        ApiError::from(AuthError::MissingToken)
    })?;

    let claims = decode_token(&token, &state.config.security)?;

    let user = state
        .store
        .find_user(claims.sub)
        .await?
        .filter(|user| user.role == claims.role)
        .ok_or_else(|| {
            tracing::warn!(user_id = %claims.sub, "Token for missing user or stale role");
            ApiError::from(AuthError::InvalidToken("unknown subject".to_string()))
        })?;

    request.extensions_mut().insert(AuthUser {
        user_id: user.id,
        role: user.role,
        is_verified: user.is_verified,
    });

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

fn check_role(request: &Request, role: Role) -> Result<(), ApiError> {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.role == role => Ok(()),
        Some(user) => Err(ApiError::forbidden(format!(
            "User role {} is not authorized to access this route",
            user.role
        ))),
        None => Err(AuthError::MissingToken.into()),
    }
}

pub async fn require_client(request: Request, next: Next) -> Response {
    match check_role(&request, Role::Client) {
        Ok(()) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

pub async fn require_partner(request: Request, next: Next) -> Response {
    match check_role(&request, Role::Partner) {
        Ok(()) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

pub async fn require_admin(request: Request, next: Next) -> Response {
    match check_role(&request, Role::Admin) {
        Ok(()) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

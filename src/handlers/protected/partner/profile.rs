// handlers/protected/partner/profile.rs - POST /api/partner/onboard, GET/PUT /api/partner/profile

use axum::{extract::State, Extension};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{Partner, PartnerUpdate};
use crate::handlers::extract::ApiJson;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::OnboardInput;
use crate::types::ServiceCategory;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OnboardRequest {
    pub business_name: String,
    pub services: Vec<ServiceCategory>,
    pub city: String,
    pub about: Option<String>,
    pub aadhar_number: String,
    pub portfolio_urls: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub business_name: Option<String>,
    pub services: Option<Vec<ServiceCategory>>,
    pub city: Option<String>,
    pub about: Option<String>,
}

/// POST /api/partner/onboard - create the caller's partner profile (status `pending`)
///
/// ```json
/// {
///   "businessName": "Golden Hour Studio",
///   "services": ["wedding", "portrait"],
///   "city": "Mumbai",
///   "aadharNumber": "123412341234",
///   "portfolioUrls": ["https://..."]
/// }
/// ```
pub async fn onboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<OnboardRequest>,
) -> ApiResult<Partner> {
    let partner = state
        .partners()
        .onboard(
            user.user_id,
            OnboardInput {
                business_name: body.business_name,
                services: body.services,
                city: body.city,
                about: body.about,
                aadhar_number: body.aadhar_number,
                portfolio_urls: body.portfolio_urls,
            },
        )
        .await?;

    Ok(ApiResponse::created(partner.with_masked_aadhar()))
}

/// GET /api/partner/profile
pub async fn profile_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Partner> {
    let partner = state.partners().profile(user.user_id).await?;
    Ok(ApiResponse::success(partner.with_masked_aadhar()))
}

/// PUT /api/partner/profile - businessName, services, city and about
pub async fn profile_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<ProfileUpdateRequest>,
) -> ApiResult<Partner> {
    let partner = state
        .partners()
        .update_profile(
            user.user_id,
            PartnerUpdate {
                business_name: body.business_name,
                services: body.services,
                city: body.city,
                about: body.about,
            },
        )
        .await?;

    Ok(ApiResponse::success(partner.with_masked_aadhar()))
}

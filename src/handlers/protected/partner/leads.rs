// handlers/protected/partner/leads.rs - GET /api/partner/leads, PUT /api/partner/leads/:id

use axum::{extract::State, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Inquiry;
use crate::handlers::extract::{ApiJson, ApiPath};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{Actor, Lead};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LeadStatusRequest {
    pub status: Option<String>,
}

/// GET /api/partner/leads - inquiries assigned to the caller, newest first
///
/// Each lead is the inquiry plus `clientDetails` (name, email, phone).
pub async fn leads_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Lead>> {
    let leads = state.leads().partner_leads(user.user_id).await?;
    Ok(ApiResponse::list(leads))
}

/// PUT /api/partner/leads/:id - respond to, book or close an assigned lead
pub async fn lead_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<LeadStatusRequest>,
) -> ApiResult<Inquiry> {
    let inquiry = state
        .leads()
        .update_status(Actor::Partner(user.user_id), id, body.status.as_deref())
        .await?;

    Ok(ApiResponse::success(inquiry))
}

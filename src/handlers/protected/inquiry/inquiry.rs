// handlers/protected/inquiry/inquiry.rs - /api/inquiry[/:id]

use axum::{extract::State, Extension};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Inquiry;
use crate::error::ApiError;
use crate::handlers::extract::{ApiJson, ApiPath};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{Actor, InquiryInput};
use crate::types::ServiceCategory;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InquiryRequest {
    pub category: Option<ServiceCategory>,
    pub date: Option<NaiveDate>,
    pub budget: Option<Decimal>,
    pub city: String,
    pub description: Option<String>,
    pub reference_image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InquiryStatusRequest {
    pub status: Option<String>,
}

/// POST /api/inquiry - create an inquiry and match it to partners
///
/// ```json
/// { "category": "wedding", "date": "2026-12-01", "budget": 50000, "city": "Mumbai" }
/// ```
///
/// Responds 201 with the stored inquiry (including `assignedPartners`) and
/// `matchedPartnersCount`. Zero matches is a normal outcome.
pub async fn inquiry_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<InquiryRequest>,
) -> ApiResult<Inquiry> {
    let category = body
        .category
        .ok_or_else(|| ApiError::invalid_field("category", "Please provide category"))?;
    let date = body
        .date
        .ok_or_else(|| ApiError::invalid_field("date", "Please provide a date (YYYY-MM-DD)"))?;
    let budget = body
        .budget
        .ok_or_else(|| ApiError::invalid_field("budget", "Please provide budget"))?;

    let assignment = state
        .leads()
        .create_inquiry(
            user.user_id,
            InquiryInput {
                category,
                date,
                budget,
                city: body.city,
                description: body.description,
                reference_image_url: body.reference_image_url,
            },
        )
        .await?;

    let matched = assignment.partners.len();
    Ok(ApiResponse::created(assignment.inquiry).with("matchedPartnersCount", matched))
}

/// GET /api/inquiry - the caller's inquiries, newest first
pub async fn inquiry_list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Inquiry>> {
    let inquiries = state.leads().client_inquiries(user.user_id).await?;
    Ok(ApiResponse::list(inquiries))
}

/// GET /api/inquiry/:id
pub async fn inquiry_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Inquiry> {
    let inquiry = state.leads().client_inquiry(user.user_id, id).await?;
    Ok(ApiResponse::success(inquiry))
}

/// PUT /api/inquiry/:id - client status change
pub async fn inquiry_put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<InquiryStatusRequest>,
) -> ApiResult<Inquiry> {
    let inquiry = state
        .leads()
        .update_status(Actor::Client(user.user_id), id, body.status.as_deref())
        .await?;

    Ok(ApiResponse::success(inquiry))
}

/// DELETE /api/inquiry/:id
pub async fn inquiry_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Value> {
    state.leads().delete_inquiry(user.user_id, id).await?;
    Ok(ApiResponse::success(json!({})))
}

// handlers/elevated/admin/partners.rs - partner verification and listing

use axum::{extract::State, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Partner, PartnerFilter};
use crate::error::ApiError;
use crate::handlers::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::PartnerWithContact;
use crate::types::{ServiceCategory, VerificationStatus};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyRequest {
    pub status: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeatureRequest {
    pub featured: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PartnerQuery {
    pub status: Option<String>,
    pub city: Option<String>,
    pub service: Option<String>,
}

impl PartnerQuery {
    fn into_filter(self) -> Result<PartnerFilter, ApiError> {
        let status = non_empty(self.status)
            .map(|s| s.parse::<VerificationStatus>())
            .transpose()
            .map_err(|e| ApiError::bad_request(format!("Invalid status filter: {}", e.value)))?;
        let service = non_empty(self.service)
            .map(|s| s.parse::<ServiceCategory>())
            .transpose()
            .map_err(|e| ApiError::bad_request(format!("Invalid service filter: {}", e.value)))?;

        Ok(PartnerFilter {
            status,
            city: non_empty(self.city),
            service,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// GET /api/admin/verifications - pending partners, oldest first
pub async fn verifications_list(
    State(state): State<AppState>,
) -> ApiResult<Vec<PartnerWithContact>> {
    let pending = state.partners().pending_verifications().await?;
    Ok(ApiResponse::list(pending))
}

/// PUT /api/admin/verify/:id - `{ "status": "verified" | "rejected", "comment": "..." }`
pub async fn verify_put(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<VerifyRequest>,
) -> ApiResult<Partner> {
    let partner = state
        .partners()
        .verify(id, body.status.as_deref(), body.comment, admin.user_id)
        .await?;

    Ok(ApiResponse::success(partner))
}

/// GET /api/admin/partners?status=&city=&service= - newest first, with user contact
pub async fn partners_list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PartnerQuery>,
) -> ApiResult<Vec<PartnerWithContact>> {
    let filter = query.into_filter()?;
    let partners = state.partners().list(&filter).await?;
    Ok(ApiResponse::list(partners))
}

/// PUT /api/admin/partners/:id/feature - `{ "featured": true }`
pub async fn feature_put(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<FeatureRequest>,
) -> ApiResult<Partner> {
    let featured = body.featured.ok_or_else(|| {
        ApiError::bad_request("Please provide a valid featured value (true or false)")
    })?;

    let partner = state.partners().set_featured(id, featured).await?;
    Ok(ApiResponse::success(partner))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_values_are_ignored() {
        let filter = PartnerQuery {
            status: Some(" ".to_string()),
            city: Some("".to_string()),
            service: None,
        }
        .into_filter()
        .unwrap();

        assert!(filter.status.is_none());
        assert!(filter.city.is_none());
        assert!(filter.service.is_none());
    }

    #[test]
    fn unknown_filter_values_are_rejected() {
        let err = PartnerQuery {
            service: Some("aerial".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert!(err.message().contains("aerial"));
    }
}

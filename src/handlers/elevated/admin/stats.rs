// handlers/elevated/admin/stats.rs - GET /api/admin/stats

use axum::extract::State;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::DashboardStats;

/// GET /api/admin/stats - dashboard counters
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "userStats": { "totalClients": 12, "totalPartners": 4, "pendingVerifications": 1 },
///     "inquiryStats": { "total": 30, "new": 8, "responded": 6, "booked": 10, "closed": 6 },
///     "reviewStats": { "pendingReviews": 2 }
///   }
/// }
/// ```
pub async fn stats_get(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    let stats = state.stats().dashboard().await?;
    Ok(ApiResponse::success(stats))
}

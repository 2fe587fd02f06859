// app.rs - shared state and the route table

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde_json::json;
use sqlx::PgPool;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::{DatabaseManager, Store};
use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{
    jwt_auth_middleware, rate_limit_middleware, require_admin, require_client, require_partner,
    RateLimiter,
};
use crate::services::{
    AccountService, LeadService, PartnerService, PortfolioService, ReviewService, StatsService,
};

/// Everything a handler needs, cloned into each request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub rate_limiter: Arc<RateLimiter>,
    /// Present only with the Postgres backend; used by `/health`
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig, pool: Option<PgPool>) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(&config.api));
        Self {
            store,
            config: Arc::new(config),
            rate_limiter,
            pool,
        }
    }

    pub fn accounts(&self) -> AccountService {
        AccountService::new(self.store.clone(), self.config.clone())
    }

    pub fn leads(&self) -> LeadService {
        LeadService::new(self.store.clone(), &self.config.matching)
    }

    pub fn partners(&self) -> PartnerService {
        PartnerService::new(self.store.clone())
    }

    pub fn portfolio(&self) -> PortfolioService {
        PortfolioService::new(self.store.clone())
    }

    pub fn reviews(&self) -> ReviewService {
        ReviewService::new(self.store.clone())
    }

    pub fn stats(&self) -> StatsService {
        StatsService::new(self.store.clone())
    }
}

/// Full application router with middleware applied
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(api)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(cors_layer(&state.config.security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(public::signup))
        .route("/api/auth/login", post(public::login))
        .route("/api/partners/:id", get(public::partner_profile))
}

/// Routes behind the JWT layer; role groups add their guard first so the
/// token is always checked before the role.
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(account_routes())
        .merge(partner_routes())
        .merge(inquiry_routes())
        .merge(admin_routes())
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn account_routes() -> Router<AppState> {
    use protected::auth;

    Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/verify-otp", post(auth::verify_otp))
        .route("/api/auth/resend-otp", post(auth::resend_otp))
}

fn partner_routes() -> Router<AppState> {
    use protected::partner;

    Router::new()
        .route("/api/partner/onboard", post(partner::onboard))
        .route(
            "/api/partner/profile",
            get(partner::profile_get).put(partner::profile_put),
        )
        .route("/api/partner/leads", get(partner::leads_list))
        .route("/api/partner/leads/:id", put(partner::lead_update))
        .route(
            "/api/partner/portfolio",
            get(partner::portfolio_list).post(partner::portfolio_post),
        )
        .route(
            "/api/partner/portfolio/:id",
            put(partner::portfolio_put).delete(partner::portfolio_delete),
        )
        .route_layer(from_fn(require_partner))
}

fn inquiry_routes() -> Router<AppState> {
    use protected::inquiry;

    Router::new()
        .route(
            "/api/inquiry",
            get(inquiry::inquiry_list).post(inquiry::inquiry_post),
        )
        .route(
            "/api/inquiry/:id",
            get(inquiry::inquiry_get)
                .put(inquiry::inquiry_put)
                .delete(inquiry::inquiry_delete),
        )
        .route("/api/inquiry/:id/review", post(inquiry::review_post))
        .route_layer(from_fn(require_client))
}

fn admin_routes() -> Router<AppState> {
    use elevated::admin;

    Router::new()
        .route("/api/admin/stats", get(admin::stats_get))
        .route("/api/admin/verifications", get(admin::verifications_list))
        .route("/api/admin/verify/:id", put(admin::verify_put))
        .route("/api/admin/partners", get(admin::partners_list))
        .route("/api/admin/partners/:id/feature", put(admin::feature_put))
        .route("/api/admin/reviews", get(admin::reviews_list))
        .route(
            "/api/admin/reviews/:id",
            put(admin::review_put).delete(admin::review_delete),
        )
        .route_layer(from_fn(require_admin))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Pixisphere API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Marketplace backend connecting clients with verified photography partners",
            "endpoints": {
                "health": "/health (public)",
                "auth": "/api/auth/* (signup/login public, others authenticated)",
                "partners": "/api/partners/:id (public)",
                "partner": "/api/partner/* (partner)",
                "inquiry": "/api/inquiry/* (client)",
                "admin": "/api/admin/* (admin)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let Some(pool) = state.pool.as_ref() else {
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "memory" }
            })),
        );
    };

    match DatabaseManager::health_check(pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": true,
                    "message": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::config::ApiConfig;
use crate::error::ApiError;

/// Fixed-window request counter keyed by client address
pub struct RateLimiter {
    enabled: bool,
    max_requests: u32,
    window: Duration,
    state: Mutex<Windows>,
}

struct Windows {
    by_key: HashMap<String, Window>,
    last_sweep: Instant,
}

struct Window {
    started: Instant,
    count: u32,
}

impl RateLimiter {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            enabled: config.enable_rate_limiting,
            max_requests: config.rate_limit_requests,
            window: Duration::from_secs(config.rate_limit_window_secs),
            state: Mutex::new(Windows {
                by_key: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// Count one request; false once the key has used up its window
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        if !self.enabled {
            return true;
        }

        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let window = self.window;
        // Full sweep at most once per window length
        if now.saturating_duration_since(state.last_sweep) >= window {
            state.by_key.retain(|_, w| now.saturating_duration_since(w.started) < window);
            state.last_sweep = now;
        }

        let entry = state.by_key.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.saturating_duration_since(entry.started) >= window {
            entry.started = now;
            entry.count = 0;
        }
        entry.count += 1;
        entry.count <= self.max_requests
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        match self.state.lock() {
            Ok(guard) => guard.by_key.len(),
            Err(poisoned) => poisoned.into_inner().by_key.len(),
        }
    }
}

/// Client address: socket peer when known, else the first X-Forwarded-For hop
fn client_key(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);

    if !state.rate_limiter.check(&key) {
        tracing::warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
        let minutes = state.config.api.rate_limit_window_secs.div_ceil(60);
        return ApiError::too_many_requests(format!(
            "Too many requests from this IP, please try again after {} minutes",
            minutes
        ))
        .into_response();
    }

    next.run(request).await
}

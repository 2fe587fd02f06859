#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use pixisphere_api::config::AppConfig;
use pixisphere_api::database::{MemoryStore, Store};
use pixisphere_api::{app, AppState};

/// In-process server on a free port, backed by a fresh `MemoryStore`
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: AppState,
    client: reqwest::Client,
}

/// A signed-in account as seen by the tests
pub struct Account {
    pub id: String,
    pub email: String,
    pub token: String,
    pub otp: Option<String>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(AppConfig::development()).await
    }

    pub async fn start_with(config: AppConfig) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store: Arc<dyn Store> = Arc::new(MemoryStore::default());
        let state = AppState::new(store, config, None);
        let router = app(state.clone());

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        tokio::spawn(async move {
            let _ = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await;
        });

        let server = Self {
            port,
            base_url,
            state,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return status plus parsed JSON body
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut req = self.client.request(method, self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PUT, path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, path, token, None).await
    }

    /// Sign up through the API; `role` is `client` or `partner`
    pub async fn signup(&self, name: &str, email: &str, role: &str) -> Result<Account> {
        let (status, body) = self
            .post(
                "/api/auth/signup",
                None,
                json!({
                    "name": name,
                    "email": email,
                    "phone": "9876543210",
                    "password": "secret123",
                    "role": role,
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "signup failed: {} {}", status, body);

        Ok(Account {
            id: str_field(&body["data"]["id"])?,
            email: email.to_string(),
            token: str_field(&body["token"])?,
            otp: body["otp"].as_str().map(str::to_string),
        })
    }

    /// Admins cannot sign up over HTTP; create one directly and log in
    pub async fn admin(&self) -> Result<Account> {
        let email = "admin@pixisphere.test";
        self.state
            .accounts()
            .create_admin("Admin", email, "9000000000", "admin-secret")
            .await?;

        let (status, body) = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": email, "password": "admin-secret" }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "admin login failed: {} {}", status, body);

        Ok(Account {
            id: str_field(&body["data"]["id"])?,
            email: email.to_string(),
            token: str_field(&body["token"])?,
            otp: None,
        })
    }

    /// Partner account with an onboarded profile; returns the profile id
    pub async fn onboarded_partner(
        &self,
        name: &str,
        email: &str,
        city: &str,
        services: &[&str],
    ) -> Result<(Account, String)> {
        let account = self.signup(name, email, "partner").await?;
        let (status, body) = self
            .post(
                "/api/partner/onboard",
                Some(&account.token),
                json!({
                    "businessName": format!("{} Studio", name),
                    "services": services,
                    "city": city,
                    "about": "Candid and editorial photography",
                    "aadharNumber": "123412341234",
                    "portfolioUrls": ["https://img.pixisphere.test/1.jpg"],
                }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "onboard failed: {} {}", status, body);

        let partner_id = str_field(&body["data"]["id"])?;
        Ok((account, partner_id))
    }

    /// Onboarded partner approved by `admin`
    pub async fn verified_partner(
        &self,
        admin: &Account,
        name: &str,
        email: &str,
        city: &str,
        services: &[&str],
    ) -> Result<(Account, String)> {
        let (account, partner_id) = self.onboarded_partner(name, email, city, services).await?;
        let (status, body) = self
            .put(
                &format!("/api/admin/verify/{}", partner_id),
                Some(&admin.token),
                json!({ "status": "verified" }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "verify failed: {} {}", status, body);
        Ok((account, partner_id))
    }
}

pub fn str_field(value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .with_context(|| format!("expected string, got {}", value))
}

/// A date comfortably in the future, as `YYYY-MM-DD`
pub fn future_date() -> String {
    (chrono::Utc::now().date_naive() + chrono::Duration::days(30))
        .format("%Y-%m-%d")
        .to_string()
}

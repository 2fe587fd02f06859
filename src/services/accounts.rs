use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{self, AuthError};
use crate::config::AppConfig;
use crate::database::models::{NewUser, User};
use crate::database::{DatabaseError, Store};
use crate::types::Role;
use crate::validation::{self, FieldError};

const NAME_MAX: usize = 100;
const PHONE_MAX: usize = 20;

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_verified: bool,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            is_verified: user.is_verified,
        }
    }
}

/// Token plus summary returned by signup and login. `otp` is only populated
/// outside production-like environments.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: UserSummary,
    pub otp: Option<String>,
}

/// Signup, login and OTP verification
pub struct AccountService {
    store: Arc<dyn Store>,
    config: Arc<AppConfig>,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// Register a client or partner and send the first OTP
    pub async fn signup(&self, input: SignupInput) -> Result<AuthSession, AuthError> {
        let role = match input.role.as_deref().map(str::trim) {
            None | Some("") => Role::Client,
            Some(value) => match value.parse::<Role>() {
                Ok(role @ (Role::Client | Role::Partner)) => role,
                _ => {
                    return Err(FieldError::new("role", "Role must be client or partner").into())
                }
            },
        };

        let email = validation::email(&input.email)?;
        let user = self
            .create_user(
                NewUser {
                    name: validation::required_text("name", &input.name, NAME_MAX)?,
                    email,
                    phone: validation::required_text("phone", &input.phone, PHONE_MAX)?,
                    password_hash: String::new(),
                    role,
                },
                &input.password,
            )
            .await?;
        info!(user_id = %user.id, role = %user.role, "User signed up");

        let otp = auth::generate_otp(self.store.as_ref(), user.id, &self.config.security).await?;
        self.session(&user, Some(otp))
    }

    /// Password login; unverified accounts get a fresh OTP
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(FieldError::new("email", "Please provide email and password").into());
        }

        let user = match self.store.find_user_by_email(email.trim()).await? {
            Some(user) => user,
            None => {
                info!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !auth::verify_password(password, &user.password_hash).await? {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let otp = if user.is_verified {
            None
        } else {
            Some(auth::generate_otp(self.store.as_ref(), user.id, &self.config.security).await?)
        };

        info!(user_id = %user.id, "User logged in");
        self.session(&user, otp)
    }

    pub async fn me(&self, user_id: Uuid) -> Result<User, AuthError> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", user_id)).into())
    }

    pub async fn verify_otp(&self, user_id: Uuid, code: Option<&str>) -> Result<(), AuthError> {
        let code = code
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| FieldError::new("otp", "Please provide OTP"))?;
        auth::verify_otp(self.store.as_ref(), user_id, code).await
    }

    /// New code for the caller; returned only where it may be echoed
    pub async fn resend_otp(&self, user_id: Uuid) -> Result<Option<String>, AuthError> {
        let otp = auth::generate_otp(self.store.as_ref(), user_id, &self.config.security).await?;
        Ok(self.config.is_development().then_some(otp))
    }

    /// Admin accounts are created out of band and start verified
    pub async fn create_admin(
        &self,
        name: &str,
        email: &str,
        phone: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let user = self
            .create_user(
                NewUser {
                    name: validation::required_text("name", name, NAME_MAX)?,
                    email: validation::email(email)?,
                    phone: validation::required_text("phone", phone, PHONE_MAX)?,
                    password_hash: String::new(),
                    role: Role::Admin,
                },
                password,
            )
            .await?;
        self.store.mark_user_verified(user.id).await?;
        info!(user_id = %user.id, "Admin account created");

        self.me(user.id).await
    }

    async fn create_user(&self, mut user: NewUser, password: &str) -> Result<User, AuthError> {
        user.password_hash = auth::hash_password(password, self.config.security.bcrypt_cost).await?;
        Ok(self.store.insert_user(user).await?)
    }

    fn session(&self, user: &User, otp: Option<String>) -> Result<AuthSession, AuthError> {
        let token = auth::issue_token(user.id, user.role, &self.config.security)?;
        Ok(AuthSession {
            token,
            user: UserSummary::from(user),
            otp: otp.filter(|_| self.config.is_development()),
        })
    }
}

use chrono::{Duration, Utc};
use rand::Rng;
use tracing::{debug, info};
use uuid::Uuid;

use super::{password, AuthError};
use crate::config::SecurityConfig;
use crate::database::{DatabaseError, Store};

/// Store a fresh hashed 6-digit code for the user and return the plaintext.
///
/// Delivery (SMS/email) is out of scope; callers decide whether to echo it.
pub async fn generate_otp(
    store: &dyn Store,
    user_id: Uuid,
    security: &SecurityConfig,
) -> Result<String, AuthError> {
    let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));

    let hash = {
        let code = code.clone();
        let cost = security.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(code, cost))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    };

    let expires_at = Utc::now() + Duration::minutes(security.otp_expiry_minutes);
    store.set_user_otp(user_id, hash, expires_at).await?;

    info!(user_id = %user_id, expires_at = %expires_at, "Issued OTP");
    Ok(code)
}

/// Check a submitted code. On success the code is consumed and the account
/// marked verified.
pub async fn verify_otp(store: &dyn Store, user_id: Uuid, code: &str) -> Result<(), AuthError> {
    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AuthError::Database(DatabaseError::NotFound(format!("user {}", user_id))))?;

    let (hash, expires_at) = match (user.otp_hash, user.otp_expires_at) {
        (Some(hash), Some(expires_at)) => (hash, expires_at),
        _ => {
            debug!(user_id = %user_id, "OTP verification without pending code");
            return Err(AuthError::InvalidOtp);
        }
    };

    if expires_at < Utc::now() {
        debug!(user_id = %user_id, "OTP expired");
        return Err(AuthError::InvalidOtp);
    }

    if !password::verify_password(code.trim(), &hash).await? {
        return Err(AuthError::InvalidOtp);
    }

    store.mark_user_verified(user_id).await?;
    info!(user_id = %user_id, "User verified via OTP");
    Ok(())
}

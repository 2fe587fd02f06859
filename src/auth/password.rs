use super::AuthError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// bcrypt is CPU bound, so hashing runs on the blocking pool
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(MIN_PASSWORD_LEN));
    }

    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let (password, hash) = (password.to_string(), hash.to_string());
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_password("secret-123", 4).await.unwrap();
        assert_ne!(hash, "secret-123");
        assert!(verify_password("secret-123", &hash).await.unwrap());
        assert!(!verify_password("secret-124", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn short_passwords_are_rejected() {
        let err = hash_password("abc", 4).await.unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(6)));
    }
}

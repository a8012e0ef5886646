use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::api::AppState;
use crate::error::{AppError, AppResult};

/// Claims carried by a bearer token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user id
    pub sub: Uuid,
    /// Expiration timestamp
    pub exp: usize,
}

/// The authenticated caller, extracted from the Authorization header
///
/// This replaces ambient session state: handlers that need the caller
/// take `AuthUser` explicitly, and handlers where authentication is
/// optional take `Option<AuthUser>`.
pub struct AuthUser(pub Uuid);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AppError::Unauthorized("invalid or expired token".to_string()))?;

        Ok(Self(token_data.claims.sub))
    }
}

/// Issues a bearer token for a logged-in user, valid for 24 hours
pub fn issue_token(user_id: Uuid, secret: &str) -> AppResult<String> {
    let exp = (Utc::now() + Duration::hours(24)).timestamp() as usize;
    let claims = Claims { sub: user_id, exp };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
}

/// Hashes a password with a random salt, stored as "salt$digest" in hex
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    format!("{}${}", hex::encode(salt), salted_digest(&salt, password))
}

/// Verifies a password against a stored "salt$digest" hash
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, digest)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    salted_digest(&salt, password) == digest
}

fn salted_digest(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let stored = hash_password("hunter2");
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
    }

    #[test]
    fn test_hash_is_salted() {
        // Same password, different salt, different hash
        assert_ne!(hash_password("hunter2"), hash_password("hunter2"));
    }

    #[test]
    fn test_hash_never_stores_cleartext() {
        let stored = hash_password("hunter2");
        assert!(!stored.contains("hunter2"));
    }

    #[test]
    fn test_malformed_stored_hash_never_verifies() {
        assert!(!verify_password("hunter2", "not-a-hash"));
        assert!(!verify_password("hunter2", "zz$zz"));
    }

    #[test]
    fn test_issued_token_decodes() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "test-secret").unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(decoded.claims.sub, user_id);
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let token = issue_token(Uuid::new_v4(), "test-secret").unwrap();
        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"other-secret"),
            &Validation::new(Algorithm::HS256),
        );
        assert!(result.is_err());
    }
}

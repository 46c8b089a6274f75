use std::{
    collections::HashMap,
    time::{SystemTime, UNIX_EPOCH},
};

use base64::{engine::general_purpose, Engine};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{error::ApiError, model::UserId, user_store::UserStore};

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    id: UserId,
    iat: u64,
    exp: u64,
}

// No `exp`: refresh tokens live as long as the process keeps their binding.
#[derive(Debug, Serialize, Deserialize)]
struct RefreshClaims {
    id: UserId,
    iat: u64,
    jti: String,
}

/// Issues and checks HS256 tokens signed with one shared secret, and keeps
/// the refresh token -> user binding table.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl_secs: u64,
    rng: SystemRandom,
    refresh_bindings: RwLock<HashMap<String, UserId>>,
}

impl TokenService {
    pub fn new(secret: &str, access_ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl_secs,
            rng: SystemRandom::new(),
            refresh_bindings: RwLock::new(HashMap::new()),
        }
    }

    pub fn issue_access_token(&self, user_id: UserId) -> Result<String, ApiError> {
        self.issue_access_token_at(user_id, unix_now())
    }

    pub(crate) fn issue_access_token_at(
        &self,
        user_id: UserId,
        issued_at: u64,
    ) -> Result<String, ApiError> {
        let exp = issued_at
            .checked_add(self.access_ttl_secs)
            .ok_or_else(|| ApiError::Internal("access token expiry overflows".to_string()))?;
        let claims = AccessClaims {
            id: user_id,
            iat: issued_at,
            exp,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn issue_refresh_token(&self, user_id: UserId) -> Result<String, ApiError> {
        let mut nonce = [0u8; 16];
        self.rng
            .fill(&mut nonce)
            .map_err(|_| ApiError::Internal("system rng unavailable".to_string()))?;

        let claims = RefreshClaims {
            id: user_id,
            iat: unix_now(),
            jti: general_purpose::URL_SAFE_NO_PAD.encode(nonce),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Remembers which user a refresh token was issued to. A later login
    /// with the same token string overwrites the entry.
    pub async fn bind_refresh(&self, refresh_token: &str, user_id: UserId) {
        self.refresh_bindings
            .write()
            .await
            .insert(refresh_token.to_owned(), user_id);
    }

    /// Returns the user id carried by a valid, unexpired access token.
    ///
    /// Bad signatures, expired tokens, refresh tokens (no `exp`) and payloads
    /// without a numeric `id` all fail with [`ApiError::InvalidToken`].
    pub fn verify_access(&self, token: &str) -> Result<UserId, ApiError> {
        decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.id)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected access token");
                ApiError::InvalidToken
            })
    }

    /// Exchanges a bound refresh token for a fresh access token. The binding
    /// itself is left untouched.
    pub async fn refresh(&self, refresh_token: &str, users: &UserStore) -> Result<String, ApiError> {
        let user_id = self
            .refresh_bindings
            .read()
            .await
            .get(refresh_token)
            .copied()
            .ok_or(ApiError::InvalidRefreshToken)?;

        if !users.exists(user_id).await {
            tracing::warn!(user_id, "refresh token bound to a missing user");
            return Err(ApiError::InvalidRefreshToken);
        }

        self.issue_access_token(user_id)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, dangerous::insecure_decode, decode,
    encode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::TokenConfig,
    error::{AppError, AppResult},
    models::Role,
};

/// Claims shared by access and refresh tokens. The two kinds differ only by
/// signing secret and lifetime. `jti` makes every issued token distinct, even
/// two issued for the same principal within one second.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn principal_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::InvalidToken)
    }
}

#[derive(Clone)]
struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl KeyPair {
    fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }
}

#[derive(Clone)]
pub struct TokenService {
    access: KeyPair,
    refresh: KeyPair,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            access: KeyPair::new(&config.access_secret, config.access_ttl_minutes),
            refresh: KeyPair::new(&config.refresh_secret, config.refresh_ttl_minutes),
        }
    }

    pub fn issue_access_token(&self, principal_id: Uuid, role: Role) -> AppResult<String> {
        sign(&self.access, principal_id, role)
    }

    /// The caller persists the returned token as the principal's only valid refresh token.
    pub fn issue_refresh_token(&self, principal_id: Uuid, role: Role) -> AppResult<String> {
        sign(&self.refresh, principal_id, role)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        verify(&self.access, token)
    }

    pub fn verify_refresh_token(&self, token: &str) -> AppResult<Claims> {
        verify(&self.refresh, token)
    }

    /// Reads claims without checking signature or expiry. Only used to find the
    /// principal on logout, where the stored token comparison is the real check.
    pub fn decode_unverified(&self, token: &str) -> AppResult<Claims> {
        insecure_decode::<Claims>(token)
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidToken)
    }
}

fn sign(keys: &KeyPair, principal_id: Uuid, role: Role) -> AppResult<String> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(keys.ttl)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: principal_id.to_string(),
        role,
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };

    encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn verify(keys: &KeyPair, token: &str) -> AppResult<Claims> {
    decode::<Claims>(token, &keys.decoding, &Validation::new(Algorithm::HS256))
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
}

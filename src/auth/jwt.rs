// Access token generation and validation

use crate::config::Config;
use crate::errors::{AppError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TOKEN_TYPE_ACCESS: &str = "access";

/// Claims carried by an access token. Opaque to clients; the wire field names
/// match what older API clients already decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub token_type: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AccessClaims {
    pub fn new(user_id: Uuid, duration_seconds: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::seconds(duration_seconds);

        Self {
            user_id,
            token_type: TOKEN_TYPE_ACCESS.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    pub fn is_access(&self) -> bool {
        self.token_type == TOKEN_TYPE_ACCESS
    }
}

/// Signs and validates access tokens with the server-held HS256 secret.
/// Constructed once at boot; refresh tokens are opaque random strings handled
/// by the session store, never by this type.
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiration: i64,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("access_token_expiration", &self.access_token_expiration)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    /// Create a JWT manager from configuration. The secret comes only from
    /// the environment and must carry at least 32 bytes, enforced at boot.
    pub fn new(config: &Config) -> Result<Self> {
        let secret = std::env::var("CITY_CMS__AUTH__JWT_SECRET").map_err(|_| {
            AppError::Configuration(
                "JWT secret must be set via CITY_CMS__AUTH__JWT_SECRET environment variable"
                    .to_string(),
            )
        })?;

        Self::from_secret(&secret, config.auth.access_token_expiration_seconds)
    }

    pub fn from_secret(secret: &str, access_token_expiration: i64) -> Result<Self> {
        if secret.len() < 32 {
            return Err(AppError::Configuration(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiration,
        })
    }

    pub fn access_token_expiration_seconds(&self) -> i64 {
        self.access_token_expiration
    }

    /// Generate a signed, time-boxed access token for a user
    pub fn generate_access_token(&self, user_id: Uuid) -> Result<String> {
        let claims = AccessClaims::new(user_id, self.access_token_expiration);
        let header = Header::new(Algorithm::HS256);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| AppError::TokenGeneration(format!("Failed to encode token: {}", e)))
    }

    /// Validate signature and expiry, returning the decoded claims.
    /// Expiry surfaces as `TokenExpired`; every other failure as a generic
    /// validation error. The `type` claim is checked by the caller so a
    /// wrong-type token gets its own rejection.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-minimum-length";

    #[test]
    fn test_access_claims_shape() {
        let user_id = Uuid::new_v4();
        let claims = AccessClaims::new(user_id, 900);

        assert_eq!(claims.user_id, user_id);
        assert!(claims.is_access());
        assert_eq!(claims.exp - claims.iat, 900);

        // Wire names stay compatible with older clients
        let value = serde_json::to_value(&claims).unwrap();
        assert!(value.get("userId").is_some());
        assert_eq!(value.get("type").unwrap(), "access");
    }

    #[test]
    fn test_generate_and_validate() {
        let manager = JwtManager::from_secret(TEST_SECRET, 900).unwrap();
        let user_id = Uuid::new_v4();

        let token = manager.generate_access_token(user_id).unwrap();
        let claims = manager.validate_access_token(&token).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert!(claims.is_access());
    }

    #[test]
    fn test_expired_token_rejected() {
        let manager = JwtManager::from_secret(TEST_SECRET, -60).unwrap();
        let token = manager.generate_access_token(Uuid::new_v4()).unwrap();

        let err = manager.validate_access_token(&token).unwrap_err();
        assert!(matches!(err, AppError::TokenExpired));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let manager = JwtManager::from_secret(TEST_SECRET, 900).unwrap();
        let other = JwtManager::from_secret(
            "a-completely-different-secret-of-enough-length",
            900,
        )
        .unwrap();

        let token = manager.generate_access_token(Uuid::new_v4()).unwrap();
        let err = other.validate_access_token(&token).unwrap_err();
        assert!(matches!(err, AppError::TokenValidation(_)));
    }

    #[test]
    fn test_short_secret_rejected_at_construction() {
        let result = JwtManager::from_secret("too-short", 900);
        assert!(matches!(result.unwrap_err(), AppError::Configuration(_)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let manager = JwtManager::from_secret(TEST_SECRET, 900).unwrap();
        let err = manager.validate_access_token("not.a.jwt").unwrap_err();
        assert!(matches!(err, AppError::TokenValidation(_)));
    }
}

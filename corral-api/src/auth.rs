//! Authentication for the Corral API.
//!
//! Tokens are signed, expiring HS256 JWTs. The token format is a server
//! concern: clients must treat the bearer token as opaque. Time validation
//! is done with an injected clock so token tests stay deterministic and
//! never depend on the host clock.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use corral_core::UserId;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// CLOCK ABSTRACTION
// ============================================================================

/// Clock used for token time validation.
pub trait Clock: Send + Sync {
    /// Current time as Unix epoch seconds.
    fn now_epoch_secs(&self) -> i64;
}

/// Production clock using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Fixed clock for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

// ============================================================================
// JWT SECRET (TYPE-SAFE)
// ============================================================================

/// Signing secret that cannot be logged accidentally.
#[derive(Clone)]
pub struct JwtSecret(SecretString);

pub const INSECURE_DEFAULT_SECRET: &str = "INSECURE_DEFAULT_SECRET_CHANGE_IN_PRODUCTION";

impl JwtSecret {
    /// Create a new secret. Rejects empty strings.
    pub fn new(secret: String) -> ApiResult<Self> {
        if secret.is_empty() {
            return Err(ApiError::internal_error("JWT secret must not be empty"));
        }
        Ok(Self(SecretString::new(secret.into())))
    }

    /// Expose the secret value (only for signing/verification).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_insecure_default(&self) -> bool {
        self.0.expose_secret() == INSECURE_DEFAULT_SECRET
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtSecret([REDACTED, {} chars])", self.0.expose_secret().len())
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Authentication configuration.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: JwtSecret,
    /// Token lifetime in seconds.
    pub jwt_expiration_secs: i64,
    /// Tolerated clock skew when validating `exp`.
    pub jwt_clock_skew_secs: i64,
    pub clock: Arc<dyn Clock>,
}

impl AuthConfig {
    /// Load from environment variables:
    /// - `CORRAL_JWT_SECRET` (defaults to an insecure development secret)
    /// - `CORRAL_JWT_EXPIRATION_SECS` (default: 86400)
    /// - `CORRAL_JWT_CLOCK_SKEW_SECS` (default: 30)
    pub fn from_env() -> ApiResult<Self> {
        let secret =
            std::env::var("CORRAL_JWT_SECRET").unwrap_or_else(|_| INSECURE_DEFAULT_SECRET.to_string());
        let jwt_secret = JwtSecret::new(secret)?;
        if jwt_secret.is_insecure_default() {
            tracing::warn!("Using the insecure default JWT secret; set CORRAL_JWT_SECRET");
        }

        let jwt_expiration_secs = std::env::var("CORRAL_JWT_EXPIRATION_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86_400);

        let jwt_clock_skew_secs = std::env::var("CORRAL_JWT_CLOCK_SKEW_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            jwt_secret,
            jwt_expiration_secs,
            jwt_clock_skew_secs,
            clock: Arc::new(SystemClock),
        })
    }

    /// Fixed-secret, fixed-clock config for tests.
    pub fn for_tests(now_epoch_secs: i64) -> Self {
        Self {
            jwt_secret: JwtSecret::new("test-secret".to_string())
                .unwrap_or_else(|_| unreachable!("non-empty literal")),
            jwt_expiration_secs: 3600,
            jwt_clock_skew_secs: 0,
            clock: Arc::new(FixedClock(now_epoch_secs)),
        }
    }
}

// ============================================================================
// CLAIMS
// ============================================================================

/// JWT claims. `sub` carries the user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    fn new(user_id: UserId, expiration_secs: i64, clock: &dyn Clock) -> Self {
        let now = clock.now_epoch_secs();
        Self {
            sub: user_id.to_string(),
            iat: now,
            exp: now + expiration_secs,
        }
    }

    /// Parse the subject back into a user id.
    pub fn user_id(&self) -> ApiResult<UserId> {
        self.sub
            .parse::<UserId>()
            .map_err(|_| ApiError::invalid_token("Token subject is not a user id"))
    }
}

// ============================================================================
// TOKEN ISSUANCE AND VALIDATION
// ============================================================================

/// Generate a signed token for a user.
pub fn issue_token(config: &AuthConfig, user_id: UserId) -> ApiResult<String> {
    let claims = Claims::new(user_id, config.jwt_expiration_secs, &*config.clock);
    let encoding_key = EncodingKey::from_secret(config.jwt_secret.expose().as_bytes());
    encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)
        .map_err(|e| ApiError::internal_error(format!("Failed to generate token: {}", e)))
}

/// Validate a token's signature and expiration, returning its claims.
///
/// Signature validation is delegated to `jsonwebtoken`; time validation is
/// done against the injected clock (with skew leeway) so it never touches
/// the host clock in tests.
pub fn validate_token(config: &AuthConfig, token: &str) -> ApiResult<Claims> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.expose().as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.required_spec_claims = std::collections::HashSet::from(["exp".to_string()]);

    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidToken => {
                ApiError::invalid_token("Token is invalid")
            }
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                ApiError::invalid_token("Token signature is invalid")
            }
            _ => ApiError::invalid_token(format!("Token validation failed: {}", e)),
        })?;

    let claims = token_data.claims;
    let now = config.clock.now_epoch_secs();
    if claims.exp < now - config.jwt_clock_skew_secs {
        return Err(ApiError::token_expired());
    }

    Ok(claims)
}

/// Extract the bearer token from an `Authorization` header value.
pub fn bearer_token(header_value: &str) -> ApiResult<&str> {
    header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::invalid_token("Authorization header must use Bearer scheme"))
}

// ============================================================================
// PASSWORD HASHING
// ============================================================================

/// Hash a password for storage. SHA-256 of the raw password; the store
/// never sees plaintext.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{:02x}", b);
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    // 2024-01-01 00:00:00 UTC
    const NOW: i64 = 1_704_067_200;

    #[test]
    fn issued_tokens_validate_and_carry_the_user_id() {
        let config = AuthConfig::for_tests(NOW);
        let token = issue_token(&config, 42).unwrap();
        let claims = validate_token(&config, &token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.exp, NOW + config.jwt_expiration_secs);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let config = AuthConfig::for_tests(NOW);
        let token = issue_token(&config, 1).unwrap();

        let later = AuthConfig {
            clock: Arc::new(FixedClock(NOW + config.jwt_expiration_secs + 1)),
            ..config
        };
        let err = validate_token(&later, &token).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenExpired);
    }

    #[test]
    fn clock_skew_leeway_is_honored() {
        let mut config = AuthConfig::for_tests(NOW);
        config.jwt_clock_skew_secs = 60;
        let token = issue_token(&config, 1).unwrap();

        // 30s past expiry, within the 60s leeway.
        let later = AuthConfig {
            clock: Arc::new(FixedClock(NOW + config.jwt_expiration_secs + 30)),
            ..config
        };
        assert!(validate_token(&later, &token).is_ok());
    }

    #[test]
    fn tokens_signed_with_a_different_secret_are_rejected() {
        let config = AuthConfig::for_tests(NOW);
        let token = issue_token(&config, 1).unwrap();

        let other = AuthConfig {
            jwt_secret: JwtSecret::new("other-secret".to_string()).unwrap(),
            ..AuthConfig::for_tests(NOW)
        };
        let err = validate_token(&other, &token).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidToken);
    }

    #[test]
    fn garbage_tokens_are_invalid_not_expired() {
        let config = AuthConfig::for_tests(NOW);
        let err = validate_token(&config, "not-a-jwt").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidToken);
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert!(bearer_token("Bearer abc").is_ok());
        assert!(bearer_token("Basic abc").is_err());
    }

    #[test]
    fn password_hashing_is_deterministic_and_not_identity() {
        let a = hash_password("hunter2");
        let b = hash_password("hunter2");
        assert_eq!(a, b);
        assert_ne!(a, "hunter2");
        assert_eq!(a.len(), 64);
    }
}

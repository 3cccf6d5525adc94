//! JWT access-token validation.
//!
//! Access tokens are HS256-signed JWTs issued by the hosted auth provider
//! the SPA signs in with. The `sub` claim is the owner's UUID; every row the
//! API touches is scoped by it.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use wabiz_core::types::OwnerId;

/// Audience the auth provider stamps on user sessions.
pub const DEFAULT_AUDIENCE: &str = "authenticated";

/// Default lifetime of tokens minted by [`generate_access_token`].
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;

/// JWT claims carried by every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the owner's UUID.
    pub sub: OwnerId,
    /// Session role (`authenticated` for signed-in users).
    #[serde(default)]
    pub role: String,
    /// Audience.
    pub aud: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Configuration for JWT validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret shared with the auth provider.
    pub secret: String,
    /// Required `aud` claim.
    pub audience: String,
    /// Lifetime of tokens minted locally (tests and tooling).
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var        | Required | Default         |
    /// |----------------|----------|-----------------|
    /// | `JWT_SECRET`   | **yes**  | --              |
    /// | `JWT_AUDIENCE` | no       | `authenticated` |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let audience =
            std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| DEFAULT_AUDIENCE.to_string());

        Self {
            secret,
            audience,
            access_token_expiry_mins: DEFAULT_ACCESS_EXPIRY_MINS,
        }
    }
}

/// Mint an HS256 access token for `owner_id`, shaped like the auth
/// provider's own tokens.
pub fn generate_access_token(
    owner_id: OwnerId,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: owner_id,
        role: DEFAULT_AUDIENCE.to_string(),
        aud: config.audience.clone(),
        exp: now + config.access_token_expiry_mins * 60,
        iat: now,
        email: None,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Checks the signature, expiration and audience.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default(); // HS256, validates exp
    validation.set_audience(&[config.audience.as_str()]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            access_token_expiry_mins: 15,
        }
    }

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encoding should succeed")
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let config = test_config();
        let owner = Uuid::new_v4();
        let token = generate_access_token(owner, &config).expect("token generation should succeed");

        let claims = validate_token(&token, &config).expect("token validation should succeed");
        assert_eq!(claims.sub, owner);
        assert_eq!(claims.aud, "authenticated");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_fails() {
        let config = test_config();

        // Well beyond the default 60-second leeway.
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: "authenticated".to_string(),
            aud: "authenticated".to_string(),
            exp: now - 300,
            iat: now - 600,
            email: None,
        };

        let result = validate_token(&sign(&claims, &config.secret), &config);
        assert!(result.is_err(), "expired token must fail validation");
    }

    #[test]
    fn test_wrong_audience_fails() {
        let config = test_config();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: "anon".to_string(),
            aud: "anon".to_string(),
            exp: now + 300,
            iat: now,
            email: None,
        };

        assert!(validate_token(&sign(&claims, &config.secret), &config).is_err());
    }

    #[test]
    fn test_different_secrets_fail() {
        let config_a = test_config();
        let config_b = JwtConfig {
            secret: "secret-bravo".to_string(),
            ..test_config()
        };

        let token = generate_access_token(Uuid::new_v4(), &config_a)
            .expect("token generation should succeed");

        let result = validate_token(&token, &config_b);
        assert!(
            result.is_err(),
            "token signed with a different secret must fail"
        );
    }
}

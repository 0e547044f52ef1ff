//! Password hashing, access tokens, and request caller resolution.

use std::convert::Infallible;

use anyhow::{Context, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use quizdeck_core::access::{Caller, Identity};
use quizdeck_core::accounts::Credentials;
use quizdeck_core::model::{Role, User};

use crate::AppState;

/// Access token claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a string.
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// HS256 tokens and Argon2 password hashes.
#[derive(Clone)]
pub struct JwtCredentials {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expires_secs: u64,
}

impl JwtCredentials {
    pub fn new(secret: &str, expires_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expires_secs,
        }
    }

    /// Verify a token and return the identity it carries.
    pub fn verify_token(&self, token: &str) -> Result<Identity> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .context("invalid access token")?;
        let user_id = data
            .claims
            .sub
            .parse()
            .with_context(|| format!("invalid token subject: {}", data.claims.sub))?;
        Ok(Identity {
            user_id,
            role: data.claims.role,
        })
    }
}

impl Credentials for JwtCredentials {
    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    fn issue_token(&self, user: &User) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            iat: now,
            exp: now + i64::try_from(self.expires_secs).unwrap_or(i64::MAX - now),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        encode(&Header::default(), &claims, &self.encoding).context("failed to sign access token")
    }
}

/// The token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

/// Resolves every request to a caller. Missing or unusable tokens make the
/// caller anonymous; handlers that need a user reject that themselves.
#[axum::async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            return Ok(Caller::Anonymous);
        };
        match state.credentials.verify_token(token) {
            Ok(identity) => Ok(Caller::Authenticated(identity)),
            Err(e) => {
                tracing::debug!("treating request as anonymous: {e:#}");
                Ok(Caller::Anonymous)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn user(role: Role) -> User {
        User {
            id: 42,
            username: "ada".into(),
            email: "ada@example.com".into(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn password_roundtrip() {
        let creds = JwtCredentials::new("secret", 3600);
        let hash = creds.hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(creds.verify_password("hunter22", &hash));
        assert!(!creds.verify_password("hunter23", &hash));
        assert!(!creds.verify_password("hunter22", "not-a-hash"));
    }

    #[test]
    fn token_carries_identity() {
        let creds = JwtCredentials::new("secret", 3600);
        let token = creds.issue_token(&user(Role::Admin)).unwrap();
        let identity = creds.verify_token(&token).unwrap();
        assert_eq!(identity.user_id, 42);
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn token_rejected_with_wrong_secret() {
        let token = JwtCredentials::new("one", 3600)
            .issue_token(&user(Role::Student))
            .unwrap();
        assert!(JwtCredentials::new("two", 3600).verify_token(&token).is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let creds = JwtCredentials::new("secret", 3600);
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "1".into(),
            role: Role::Student,
            iat: now - 7200,
            exp: now - 3600,
            jti: "x".into(),
        };
        let token = encode(&Header::default(), &claims, &creds.encoding).unwrap();
        assert!(creds.verify_token(&token).is_err());
    }

    #[test]
    fn bearer_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer   xyz"));
        assert_eq!(bearer_token(&headers), Some("xyz"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}

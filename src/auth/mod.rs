//! Session verification for the hosted sign-in provider.
//!
//! The provider issues HS256 session JWTs carrying the user id in `sub`
//! and the user's role in `publicMetadata.role`.

use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SESSION_COOKIE: &str = "__session";
pub const ADMIN_ROLE: &str = "admin";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PublicMetadata {
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "publicMetadata")]
    pub public_metadata: PublicMetadata,
}

/// The signed-in user, as seen by handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub full_name: Option<String>,
    pub role: Option<String>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool { self.role.as_deref() == Some(ADMIN_ROLE) }
}

impl From<SessionClaims> for AuthUser {
    fn from(claims: SessionClaims) -> Self {
        Self { id: claims.sub, full_name: claims.name, role: claims.public_metadata.role }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("You are not logged in")]
    Missing,

    #[error("Invalid session token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

#[derive(Clone)]
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn new(secret: &str) -> Self {
        Self { key: DecodingKey::from_secret(secret.as_bytes()), validation: Validation::new(Algorithm::HS256) }
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation)?;
        Ok(data.claims.into())
    }

    /// Reads the session cookie, falling back to an `Authorization: Bearer` header.
    pub fn token_from(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
        jar.get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .or_else(|| {
                headers
                    .get(header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.strip_prefix("Bearer ").map(str::to_owned))
            })
            .filter(|token| !token.is_empty())
    }

    pub fn authenticate(&self, jar: &CookieJar, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
        let token = Self::token_from(jar, headers).ok_or(AuthError::Missing)?;
        self.verify(&token)
    }
}

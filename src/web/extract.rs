use crate::auth::{AuthError, AuthUser};
use crate::domain::aggregates::FieldErrors;
use crate::errors::HttpError;
use crate::state::AppState;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use tracing::warn;
use validator::Validate;

/// The signed-in user, if any. A bad or expired token reads as signed out.
pub struct MaybeUser(pub Option<AuthUser>);

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        match state.sessions.authenticate(&jar, &parts.headers) {
            Ok(user) => Ok(Self(Some(user))),
            Err(AuthError::Missing) => Ok(Self(None)),
            Err(e) => {
                warn!("⚠️ Ignoring session: {}", e);
                Ok(Self(None))
            }
        }
    }
}

/// JSON body that has passed its `validator` rules.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| HttpError::BadRequest(rejection.body_text()))?;
        value.validate().map_err(|e| HttpError::Validation(FieldErrors::from(&e)))?;
        Ok(Self(value))
    }
}

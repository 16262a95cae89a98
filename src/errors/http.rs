use crate::errors::{ErrorResponse, RepositoryError, ServiceError};
use crate::domain::aggregates::FieldErrors;
use crate::ai::GenerationError;
use crate::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Validation(FieldErrors),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    BadGateway(String),
    Internal(String),
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        let context = match &err {
            ServiceError::Saga(failure) => Some(format!("{} failed at {}", failure.saga, failure.failed_step)),
            _ => None,
        };
        let mapped = HttpError::from_root(err);
        if let (Some(context), HttpError::Internal(_) | HttpError::BadGateway(_)) = (context, &mapped) {
            error!("❌ {context}: {mapped:?}");
        }
        mapped
    }
}

impl HttpError {
    fn from_root(err: ServiceError) -> Self {
        match err {
            ServiceError::Saga(failure) => HttpError::from_root(failure.error),
            ServiceError::Validation(fields) => HttpError::Validation(fields),
            ServiceError::InvalidInput(msg) => HttpError::BadRequest(msg),
            ServiceError::Unauthenticated(msg) => HttpError::Unauthorized(msg),
            ServiceError::NotFound(msg) => HttpError::NotFound(msg),
            ServiceError::Repo(repo_err) => match repo_err {
                RepositoryError::NotFound => HttpError::NotFound("Not found".into()),
                RepositoryError::Conflict(msg) => HttpError::Conflict(msg),
                RepositoryError::ForeignKey(msg) => HttpError::BadRequest(format!("Foreign key violation: {msg}")),
                other => {
                    error!("❌ Repository failure: {other}");
                    HttpError::Internal("Database error".into())
                }
            },
            ServiceError::Storage(StorageError::NotFound(path)) => HttpError::NotFound(format!("Object not found: {path}")),
            ServiceError::Storage(e) => {
                error!("❌ Storage failure: {e}");
                HttpError::BadGateway("Storage service failed".into())
            }
            ServiceError::Generation(GenerationError::InvalidInput(msg)) => HttpError::BadRequest(msg),
            ServiceError::Generation(e) => {
                error!("❌ Generation failure: {e}");
                HttpError::BadGateway("Failed to generate content".into())
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::BadRequest(_) | HttpError::Validation(_) => StatusCode::BAD_REQUEST,
            HttpError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::Conflict(_) => StatusCode::CONFLICT,
            HttpError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            HttpError::Validation(fields) => ErrorResponse {
                status: "fail".into(),
                message: "Validation failed".into(),
                details: Some(serde_json::json!(fields)),
            },
            HttpError::BadRequest(msg)
            | HttpError::Unauthorized(msg)
            | HttpError::NotFound(msg)
            | HttpError::Conflict(msg)
            | HttpError::BadGateway(msg)
            | HttpError::Internal(msg) => ErrorResponse { status: "error".into(), message: msg, details: None },
        };

        (status, Json(body)).into_response()
    }
}

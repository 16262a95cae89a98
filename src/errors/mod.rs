mod http;
mod repository;
mod service;

pub use self::http::HttpError;
pub use self::repository::RepositoryError;
pub use self::service::ServiceError;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

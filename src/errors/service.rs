use crate::ai::GenerationError;
use crate::domain::aggregates::FieldErrors;
use crate::errors::RepositoryError;
use crate::saga::SagaFailure;
use crate::storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Repository error: {0}")]
    Repo(#[from] RepositoryError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Saga(Box<SagaFailure<ServiceError>>),
}

impl From<SagaFailure<ServiceError>> for ServiceError {
    fn from(failure: SagaFailure<ServiceError>) -> Self {
        ServiceError::Saga(Box::new(failure))
    }
}

impl ServiceError {
    /// Innermost error, looking through saga wrappers.
    pub fn root(&self) -> &ServiceError {
        match self {
            ServiceError::Saga(failure) => failure.error.root(),
            other => other,
        }
    }
}

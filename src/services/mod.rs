use pushkind_common::repository::errors::RepositoryError;
use thiserror::Error;

use crate::forms::products::FieldErrors;
use crate::storage::StorageError;

pub mod products;

/// Result type returned by service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures surfaced by the product service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Submitted fields failed validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    /// No category carries the requested name.
    #[error("category `{0}` not found")]
    CategoryNotFound(String),
    /// The product addressed by the request does not exist.
    #[error("product not found")]
    ProductNotFound,
    /// Persistence failure.
    #[error("repository error: {0}")]
    Repository(#[source] RepositoryError),
    /// Image storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::ProductNotFound,
            other => ServiceError::Repository(other),
        }
    }
}

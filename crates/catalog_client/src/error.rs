use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(String),
    #[error("data api returned {status}: {error}")]
    Remote { status: u16, error: ApiError },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl CatalogError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CatalogError::Network(_) => ErrorCode::Network,
            CatalogError::Remote { status, error } => error.classify(*status),
            CatalogError::NotFound { .. } => ErrorCode::NotFound,
            CatalogError::Validation(_) => ErrorCode::Validation,
            CatalogError::Decode(_) => ErrorCode::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == ErrorCode::NotFound
    }

    /// Text shown in place of results when a request fails.
    pub fn user_message(&self) -> &'static str {
        match self.code() {
            ErrorCode::Network => "Network error, please check your connection and try again",
            ErrorCode::NotFound => "Nothing was found for this request",
            ErrorCode::Validation => "The request contained invalid input",
            ErrorCode::Internal => "Something went wrong, please try again later",
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CatalogError::Decode(err.to_string())
        } else {
            CatalogError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Decode(err.to_string())
    }
}

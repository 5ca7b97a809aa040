use serde::{Deserialize, Serialize};
use thiserror::Error;

/// PostgREST code returned when a single-row request matched nothing.
pub const NO_ROWS_CODE: &str = "PGRST116";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Network,
    NotFound,
    Validation,
    Internal,
}

/// Error body returned by the hosted data API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            hint: None,
        }
    }

    pub fn is_no_rows(&self) -> bool {
        self.code == NO_ROWS_CODE
    }

    /// Best-effort classification of a remote failure.
    pub fn classify(&self, status: u16) -> ErrorCode {
        if self.is_no_rows() || status == 404 {
            ErrorCode::NotFound
        } else if status == 400 || self.code.starts_with("22") {
            ErrorCode::Validation
        } else if status >= 500 {
            ErrorCode::Network
        } else {
            ErrorCode::Internal
        }
    }
}

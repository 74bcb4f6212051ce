use actix_web::{http::StatusCode, ResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("user store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("user store must contain a JSON array")]
    NotAList,
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("email {0:?} is not a valid address")]
    InvalidEmail(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),
}

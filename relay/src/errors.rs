use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Failed to read request body: {0}")]
    Body(#[from] axum::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Any failure while relaying collapses into one 502 envelope.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("Relay error: {}", self);
        (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

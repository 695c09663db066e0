//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mdsite_config::{ConfigError, TemplateError};
use mdsite_resource::RenderError;
use mdsite_site::IndexError;
use serde_json::json;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Request path could not be decoded.
    #[error("Invalid request path: {0}")]
    BadPath(String),

    /// Site index could not be built.
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// Page or TOC template failed.
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Resource renderer failed.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Site settings could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::BadPath(path) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Invalid request path", "path": path}),
            ),
            Self::Index(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "Index unavailable", "detail": e.to_string()}),
            ),
            Self::Template(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": e.to_string()}),
            ),
            Self::Render(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": e.to_string()}),
            ),
            Self::Config(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": e.to_string()}),
            ),
            Self::Io(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": e.to_string()}),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (status, axum::Json(body)).into_response()
    }
}

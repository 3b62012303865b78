//! WebServer-specific error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shared::{ApiError, ErrorKind, ErrorResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebServerError {
    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Invalid request: {details}")]
    InvalidRequest { details: String },

    #[error("HTTP server failed to bind {address}: {source}")]
    Bind {
        address: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    Serve(#[from] std::io::Error),
}

impl WebServerError {
    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::InvalidRequest { details: details.into() }
    }

    /// HTTP status this error is answered with
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Api(error) => status_for_kind(error.kind),
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Bind { .. } | Self::Serve(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Map an error kind onto its HTTP status
pub fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Configuration | ErrorKind::InvalidState => StatusCode::BAD_REQUEST,
        ErrorKind::ResourceConflict => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Provider => StatusCode::BAD_GATEWAY,
        ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for WebServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Self::Api(error) => error.message.clone(),
            other => other.to_string(),
        };
        if status.is_server_error() {
            tracing::error!("❌ {} {}", status, message);
        } else {
            tracing::debug!("{} {}", status, message);
        }
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

pub type WebServerResult<T> = Result<T, WebServerError>;

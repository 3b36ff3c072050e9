use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{error, warn};

use crate::config::MANIFEST_URL_VAR;

pub type AppResult<T> = Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("service not configured")]
    NotConfigured,

    #[error("{0}")]
    BadRequest(String),

    #[error("invalid path parameters: {0}")]
    InvalidPath(String),

    #[error("unsupported format: {format}")]
    UnsupportedFormat {
        format: String,
        supported: Vec<&'static str>,
    },

    #[error("no streams found")]
    NoStreamsFound,

    #[error("no stream matched {requested:?} out of {total}")]
    NoMatchingStream {
        requested: Vec<String>,
        supported: Vec<&'static str>,
        total: usize,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("upstream fetch failed: {0}")]
    Upstream(String),

    #[error("internal server error")]
    InternalServerError,

    #[error("internal server error: {0}")]
    InternalServerErrorWithContext(String),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadRequest(_) | Self::InvalidPath(_) | Self::UnsupportedFormat { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::NoStreamsFound | Self::NoMatchingStream { .. } | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Upstream(_)
            | Self::InternalServerError
            | Self::InternalServerErrorWithContext(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// every error body has an `error` field, the rest is whatever context helps the caller
    pub fn body(&self) -> Value {
        match self {
            Self::NotConfigured => json!({
                "error": "Service not configured",
                "missing": MANIFEST_URL_VAR,
                "message": format!(
                    "set {} to the addon manifest url and restart",
                    MANIFEST_URL_VAR
                ),
            }),
            Self::BadRequest(message) => json!({ "error": message }),
            Self::InvalidPath(message) => json!({
                "error": "Invalid request parameters",
                "message": message,
            }),
            Self::UnsupportedFormat { format, supported } => json!({
                "error": format!("Unsupported format: {}", format),
                "supportedFormats": supported,
            }),
            Self::NoStreamsFound => json!({ "error": "No streams found" }),
            Self::NoMatchingStream {
                requested,
                supported,
                total,
            } => json!({
                "error": "No matching stream found",
                "requestedFormats": requested,
                "supportedFormats": supported,
                "totalStreams": total,
                "hint": "try another format or drop the format parameter",
            }),
            Self::NotFound(message) => json!({ "error": message }),
            Self::Upstream(details) => json!({
                "error": "Failed to fetch streams",
                "details": details,
            }),
            Self::InternalServerError => json!({ "error": "Internal server error" }),
            Self::InternalServerErrorWithContext(details) => json!({
                "error": "Internal server error",
                "details": details,
            }),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        // 4xx are the callers problem, only 5xx are worth an error! line
        if status.is_server_error() {
            error!("request failed with {}: {}", status, self);
        } else {
            warn!("request rejected with {}: {}", status, self);
        }

        (status, Json(self.body())).into_response()
    }
}

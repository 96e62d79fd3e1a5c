//! Error handling and custom error types
//!
//! Every failure the pipeline can surface is a variant of [`Error`]; its
//! `Display` text is the message shown to the user. [`ErrorKind`] is the
//! coarse classification callers branch on.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Could not read the uploaded image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Unsupported file '{0}'. Please upload a jpg, jpeg or png image.")]
    UnsupportedUpload(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Access forbidden. Your API key may not have permission to use Generative Language API. Please check that your API key from Google AI Studio has proper permissions.")]
    PermissionDenied { model: String },

    #[error("Google's Gemini API service is temporarily unavailable (503). This is usually temporary - please try again in a few minutes. The servers may be overloaded or under maintenance.")]
    ServiceUnavailable { model: String },

    #[error("Rate limit exceeded. Please wait a moment before trying again.")]
    RateLimited { model: String },

    #[error("All available Gemini models failed to respond. Please verify your API key is from Google AI Studio (ai.google.dev) and try again later. Models tried: {}", .attempted.join(", "))]
    AllModelsExhausted { attempted: Vec<String> },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Decode,
    InvalidUpload,
    PermissionDenied,
    ServiceUnavailable,
    RateLimited,
    AllModelsExhausted,
    Network,
    Unexpected,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Decode(_) => ErrorKind::Decode,
            Error::UnsupportedUpload(_) | Error::InvalidUpload(_) => ErrorKind::InvalidUpload,
            Error::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Error::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            Error::RateLimited { .. } => ErrorKind::RateLimited,
            Error::AllModelsExhausted { .. } => ErrorKind::AllModelsExhausted,
            Error::Http(_) => ErrorKind::Network,
            Error::Io(_) | Error::Serialization(_) | Error::Config(_) | Error::Unexpected(_) => {
                ErrorKind::Unexpected
            }
        }
    }

    /// Endpoint-wide failures that reproduce for every candidate model.
    pub fn is_short_circuit(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::PermissionDenied | ErrorKind::ServiceUnavailable | ErrorKind::RateLimited
        )
    }

    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Decode | ErrorKind::InvalidUpload => StatusCode::BAD_REQUEST,
            ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::PermissionDenied | ErrorKind::AllModelsExhausted | ErrorKind::Network => {
                StatusCode::BAD_GATEWAY
            }
            ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            // reqwest errors carry the request URL, which includes the API key
            Error::Http(e) => format!("HTTP request error: {}", strip_url(e)),
            other => other.to_string(),
        };

        let body = json!({
            "error": {
                "kind": self.kind(),
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

fn strip_url(e: &reqwest::Error) -> String {
    match e.url() {
        Some(url) => e.to_string().replace(url.as_str(), "<redacted>"),
        None => e.to_string(),
    }
}

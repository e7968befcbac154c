use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::services::{ProtocolFault, RelayError};

/// Error body returned to callers: a stable `error` summary plus free-text `details`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub details: String,
}

#[derive(Serialize)]
pub struct ErrorResponse<'a> {
    pub error: &'a str,
    pub details: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, error: &'static str, details: impl Into<String>) -> Self {
        Self {
            status,
            error,
            details: details.into(),
        }
    }
}

/// Upstream statuses pass through when they are real error codes.
fn passthrough_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status)
        .ok()
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::InvalidInput(details) => {
                Self::new(StatusCode::BAD_REQUEST, "Invalid audio file", details)
            }
            RelayError::Configuration(details) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Relay not configured",
                details,
            ),
            RelayError::Upstream { status, body } => Self::new(
                passthrough_status(status),
                "Failed to connect to UltraVox API",
                body,
            ),
            RelayError::UpstreamProtocol(fault) => {
                let error = match fault {
                    ProtocolFault::MissingAudio => "No audio response received from UltraVox",
                    ProtocolFault::UndecodableAudio(_) => "Failed to decode audio response",
                    ProtocolFault::MalformedBody(_) => "Malformed response from UltraVox",
                };
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, error, fault.to_string())
            }
            RelayError::Network(details) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Failed to communicate with UltraVox API",
                details,
            ),
            RelayError::AudioHosting(e) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to host audio",
                e.to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = self.error, details = %self.details, "Relay request failed");
        } else {
            tracing::warn!(status = %self.status, error = self.error, details = %self.details, "Relay request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.error,
            details: &self.details,
        });
        (self.status, body).into_response()
    }
}

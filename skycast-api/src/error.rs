//! API error handling.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use skycast_core::constants::RATE_LIMIT_RETRY_AFTER_SECS;
use skycast_core::error::SkycastError;
use tracing::{error, warn};

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: String,
    retry_after: Option<u64>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
            retry_after: None,
        }
    }

    /// Bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// Forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message, "FORBIDDEN")
    }

    /// Not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, "NOT_FOUND")
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_ERROR")
    }

    /// Upstream provider failure.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message, "UPSTREAM_ERROR")
    }

    /// Upstream provider timeout.
    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, message, "UPSTREAM_TIMEOUT")
    }

    /// Rate limit exceeded.
    pub fn too_many_requests() -> Self {
        Self {
            retry_after: Some(RATE_LIMIT_RETRY_AFTER_SECS),
            ..Self::new(
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests. Please wait before making another request.",
                "RATE_LIMITED",
            )
        }
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    status: &'static str,
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: "error",
            code: self.code,
            message: self.message,
            retry_after: self.retry_after,
        };

        let mut response = (self.status, Json(body)).into_response();
        if let Some(secs) = self.retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

impl From<SkycastError> for ApiError {
    fn from(err: SkycastError) -> Self {
        if err.is_recoverable() {
            warn!(error = %err, "Transient upstream failure");
        } else if err.is_upstream_error() && !matches!(err, SkycastError::CityNotFound(_)) {
            error!(error = %err, "Upstream failure");
        }

        match &err {
            SkycastError::InvalidCity(_) => ApiError::bad_request(
                "Invalid city name. Please provide a valid city name (at least 2 characters).",
            ),
            SkycastError::ValidationError(_) => ApiError::bad_request(err.to_string()),
            SkycastError::CityNotFound(city) => ApiError::not_found(format!(
                "City \"{}\" not found. Please check the spelling and try again.",
                city
            )),
            SkycastError::Timeout { .. } => {
                ApiError::gateway_timeout("Request timeout. Please try again.")
            }
            SkycastError::Connection(_) => ApiError::bad_gateway(
                "Unable to connect to weather service. Please check your internet connection.",
            ),
            SkycastError::Unauthorized
            | SkycastError::UpstreamStatus { .. }
            | SkycastError::HttpError(_)
            | SkycastError::MalformedResponse(_) => ApiError::bad_gateway(
                "Weather service temporarily unavailable. Please try again later.",
            ),
            _ => {
                error!(error = %err, "Internal error");
                ApiError::internal("Internal server error. Please try again later.")
            }
        }
    }
}

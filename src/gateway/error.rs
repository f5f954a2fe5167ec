//! Error taxonomy surfaced by the gateway

use std::time::Duration;

use thiserror::Error;

use super::request::{ApiResponse, Payload};

/// Synthetic status reported for a client-side timeout
pub const TIMEOUT_STATUS: u16 = 408;

/// Errors that can occur when calling the backend API
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Network unreachable, DNS failure, connection reset, ...
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// No response within the configured duration
    #[error("Request to {url} timed out after {}ms", .timeout.as_millis())]
    Timeout { url: String, timeout: Duration },

    /// 5xx status, surfaced after retries are exhausted
    #[error("Server error {status}: {message}")]
    Server {
        status: u16,
        message: String,
        data: Payload,
    },

    /// 4xx status, never retried
    #[error("Request rejected ({status}): {message}")]
    Client {
        status: u16,
        message: String,
        data: Payload,
    },

    /// The response body did not match the expected schema
    #[error("Unexpected response from {path}: {message}")]
    Decode { path: String, message: String },

    /// The request could not be built (bad URL, bad header)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Builds the error for a non-2xx response
    pub(crate) fn from_response(response: ApiResponse) -> Self {
        let status = response.status;
        let message = response
            .body
            .message()
            .unwrap_or_else(|| default_reason(status).to_string());

        if status >= 500 {
            ApiError::Server {
                status,
                message,
                data: response.body,
            }
        } else {
            ApiError::Client {
                status,
                message,
                data: response.body,
            }
        }
    }

    pub(crate) fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_builder() {
            return ApiError::InvalidRequest(error.to_string());
        }
        ApiError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }

    /// Status code carried by the error, 408 for a client-side timeout
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Timeout { .. } => Some(TIMEOUT_STATUS),
            ApiError::Server { status, .. } | ApiError::Client { status, .. } => Some(*status),
            ApiError::Transport { .. } | ApiError::Decode { .. } | ApiError::InvalidRequest(_) => {
                None
            }
        }
    }

    /// Decoded response body, when the server answered
    pub fn data(&self) -> Option<&Payload> {
        match self {
            ApiError::Server { data, .. } | ApiError::Client { data, .. } => Some(data),
            _ => None,
        }
    }

    /// True only for the synthetic client-side timeout, never for a server 408
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout { .. })
    }

    /// Transport failures and 5xx responses are retried by the gateway
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Transport { .. } | ApiError::Server { .. })
    }
}

fn default_reason(status: u16) -> &'static str {
    match status {
        400 => "Bad request",
        401 => "Authentication required",
        403 => "Forbidden",
        404 => "Not found",
        408 => "Request timeout",
        409 => "Conflict",
        429 => "Too many requests",
        500 => "Internal server error",
        502 => "Bad gateway",
        503 => "Service unavailable",
        504 => "Gateway timeout",
        _ => "Unexpected status",
    }
}

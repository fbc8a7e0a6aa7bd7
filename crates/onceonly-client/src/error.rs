//! Error types for the console client.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse classification of a non-2xx response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// 401, or no credential stored.
    Unauthorized,
    /// 402: plan inactive or invoice unpaid.
    PaymentRequired,
    /// 429: caller should back off.
    RateLimited,
    /// Anything else.
    Unknown,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            402 => Self::PaymentRequired,
            429 => Self::RateLimited,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::PaymentRequired => "PAYMENT_REQUIRED",
            Self::RateLimited => "RATE_LIMITED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified HTTP failure.
///
/// `status` is 0 when the request was refused locally (no credential).
/// `body` holds the parsed JSON body, or the raw text as a JSON string, or
/// nothing if the body could not be read.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: u16,
    pub code: ErrorCode,
    pub message: String,
    pub body: Option<serde_json::Value>,
}

impl ApiError {
    pub fn from_response(status: u16, path: &str, body: Option<serde_json::Value>) -> Self {
        Self {
            status,
            code: ErrorCode::from_status(status),
            message: format!("API error {} on {}", status, path),
            body,
        }
    }

    /// Refusal issued before any network call because no credential is stored.
    pub fn missing_credential() -> Self {
        Self {
            status: 0,
            code: ErrorCode::Unauthorized,
            message: "missing API key".to_string(),
            body: None,
        }
    }

    /// `message` field of a JSON body, if the upstream sent one.
    pub fn body_message(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(|m| m.as_str())
    }
}

/// Client errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// Upstream answered with a non-2xx status (or no credential was stored).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The request never produced an HTTP response.
    #[error("network error: {message}")]
    Network { message: String },

    /// A 2xx response whose body did not have the expected shape.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Rejected locally before sending.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Credential store could not be read or written.
    #[error("credential store error: {message}")]
    Credentials { message: String },
}

impl ClientError {
    /// HTTP status of the failure; 0 when no response was involved.
    pub fn status(&self) -> u16 {
        match self {
            Self::Api(e) => e.status,
            _ => 0,
        }
    }

    /// Classification used by callers to pick a recovery path.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Api(e) => e.code,
            _ => ErrorCode::Unknown,
        }
    }

    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } | Self::InvalidInput { .. } => 1,
            Self::Api(e) => match e.code {
                ErrorCode::Unauthorized => 2,
                ErrorCode::PaymentRequired => 3,
                ErrorCode::RateLimited => 4,
                ErrorCode::Unknown => 5,
            },
            Self::Network { .. } => 5,
            Self::InvalidResponse { .. } | Self::Credentials { .. } => 6,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Credentials {
            message: err.to_string(),
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

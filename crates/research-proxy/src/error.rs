//! Error types for the research proxy.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::time::Duration;

use axum::http::StatusCode;

/// Errors from the upstream HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request rejected by the API (400 response)
    #[error("Bad request: {details}")]
    BadRequest {
        /// The upstream `error` field, or the whole body if it has none
        details: serde_json::Value,
    },

    /// Credentials rejected (401 response)
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Response body
        message: String,
    },

    /// Rate limited by the API (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time, when the API sent one
        retry_after: Option<Duration>,
    },

    /// Endpoint or model not found (404 response)
    #[error("Resource not found: {message}")]
    NotFound {
        /// Response body
        message: String,
    },

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error.
    #[must_use]
    pub fn rate_limited(seconds: Option<u64>) -> Self {
        Self::RateLimited { retry_after: seconds.map(Duration::from_secs) }
    }

    /// Create a bad request error from the raw response body.
    ///
    /// JSON bodies contribute their `error` field (or themselves, if absent);
    /// anything else is kept as a string.
    #[must_use]
    pub fn bad_request(body: &str) -> Self {
        let details = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(mut value) => match value.get_mut("error") {
                Some(error) if !error.is_null() => error.take(),
                _ => value,
            },
            Err(_) => serde_json::Value::String(body.to_string()),
        };
        Self::BadRequest { details }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Upstream HTTP status, if the error came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest { .. } => Some(400),
            Self::Unauthorized { .. } => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::Server { status, .. } | Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Http(_) | Self::Parse(_) => None,
        }
    }

    /// Caller-safe description of the failure.
    ///
    /// Never includes the upstream response body; that stays in the logs.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Http(err) if err.is_timeout() => "Upstream request timed out".to_string(),
            Self::Http(err) if err.is_connect() => "Could not connect to upstream API".to_string(),
            Self::Http(_) => "Upstream request failed".to_string(),
            Self::Parse(_) => "Upstream returned an unreadable response".to_string(),
            other => match other.status() {
                Some(status) => format!("Upstream request failed with status {status}"),
                None => "Upstream request failed".to_string(),
            },
        }
    }
}

/// Caller-facing research errors.
///
/// Each variant maps to its own `code` and HTTP status; see [`ResearchError::code`].
#[derive(thiserror::Error, Debug)]
pub enum ResearchError {
    /// Topic missing or blank, or the request body could not be read.
    #[error("{0}")]
    InvalidInput(String),

    /// Upstream credential not configured.
    #[error("Backend API key not configured. Contact administrator.")]
    Configuration,

    /// Upstream rejected the request shape or model.
    #[error("Bad request to Perplexity API. Check your request format or API key.")]
    UpstreamBadRequest {
        /// Upstream error body, safe to pass through.
        details: serde_json::Value,
    },

    /// Upstream rejected the credential.
    #[error("Authentication failed. Check your Perplexity API key.")]
    UpstreamAuthFailure,

    /// Upstream throttled the request.
    #[error("Rate limit exceeded. Please try again later.")]
    UpstreamRateLimited {
        /// Retry hint forwarded from the upstream.
        retry_after: Option<Duration>,
    },

    /// Upstream endpoint or model not found.
    #[error("API endpoint not found. Check the model name.")]
    UpstreamNotFound,

    /// Any other upstream failure, summarised without the response body.
    #[error("{0}")]
    UpstreamUnknown(String),

    /// Anything unexpected. The payload is for logs only.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResearchError {
    /// Message shown when the topic is missing or blank.
    pub const TOPIC_REQUIRED: &'static str = "Research topic is required";

    /// Generic message for internal failures.
    pub const INTERNAL_MESSAGE: &'static str = "Failed to fetch research results";

    /// Create an invalid input error for a missing topic.
    #[must_use]
    pub fn topic_required() -> Self {
        Self::InvalidInput(Self::TOPIC_REQUIRED.to_string())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable machine-readable kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Configuration => "configuration_error",
            Self::UpstreamBadRequest { .. } => "upstream_bad_request",
            Self::UpstreamAuthFailure => "upstream_auth_failure",
            Self::UpstreamRateLimited { .. } => "upstream_rate_limited",
            Self::UpstreamNotFound => "upstream_not_found",
            Self::UpstreamUnknown(_) => "upstream_unknown",
            Self::Internal(_) => "internal",
        }
    }

    /// HTTP status returned to the caller.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::UpstreamBadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::UpstreamAuthFailure => StatusCode::UNAUTHORIZED,
            Self::UpstreamRateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamNotFound => StatusCode::NOT_FOUND,
            Self::UpstreamUnknown(_) => StatusCode::BAD_GATEWAY,
            Self::Configuration | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Internal errors collapse to a generic message.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Internal(_) => Self::INTERNAL_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }

    /// Details safe to return to the caller (bad requests only).
    #[must_use]
    pub const fn details(&self) -> Option<&serde_json::Value> {
        match self {
            Self::UpstreamBadRequest { details } => Some(details),
            _ => None,
        }
    }
}

impl From<ClientError> for ResearchError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::BadRequest { details } => Self::UpstreamBadRequest { details },
            ClientError::Unauthorized { .. } => Self::UpstreamAuthFailure,
            ClientError::RateLimited { retry_after } => Self::UpstreamRateLimited { retry_after },
            ClientError::NotFound { .. } => Self::UpstreamNotFound,
            other => Self::UpstreamUnknown(other.summary()),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for service operations.
pub type ServiceResult<T> = Result<T, ResearchError>;

//! Terminal collector for a running research backend.
//!
//! Gathers a topic and search type, issues one `POST /api/research`, and hands
//! the result back for rendering.

use std::time::Duration;

use reqwest::StatusCode;

use crate::config::{api, validate_base_url};
use crate::models::{ErrorBody, ResearchRequest, ResearchResult, SearchType};

/// Errors surfaced to the collector's user.
#[derive(thiserror::Error, Debug)]
pub enum CollectorError {
    /// Nothing to research.
    #[error("Please enter a research topic")]
    EmptyTopic,

    /// Backend unreachable.
    #[error("Cannot connect to backend server at {url}. Make sure it is running.")]
    Unreachable {
        /// Backend base URL
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Other transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with an error.
    #[error("{message}")]
    Backend {
        /// HTTP status code
        status: u16,
        /// Error kind from the body, if any
        code: Option<String>,
        /// Message to show
        message: String,
    },

    /// Backend answered 2xx with an unreadable body.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// HTTP client for the research backend.
#[derive(Debug, Clone)]
pub struct ResearchCollector {
    client: reqwest::Client,
    backend_url: String,
}

impl ResearchCollector {
    /// Create a collector for the given backend base URL.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid or the HTTP client fails to build.
    pub fn new(backend_url: &str) -> anyhow::Result<Self> {
        let backend_url = validate_base_url(backend_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(api::CONNECT_TIMEOUT)
            // Must outlast the backend's own upstream timeout.
            .timeout(api::REQUEST_TIMEOUT + Duration::from_secs(10))
            .build()?;

        Ok(Self { client, backend_url })
    }

    /// Backend base URL.
    #[must_use]
    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// Request research for a topic.
    pub async fn collect(
        &self,
        topic: &str,
        search_type: SearchType,
    ) -> Result<ResearchResult, CollectorError> {
        if topic.trim().is_empty() {
            return Err(CollectorError::EmptyTopic);
        }

        let url = format!("{}/api/research", self.backend_url);
        let request = ResearchRequest::new(topic, search_type);

        tracing::debug!(%url, search_type = %search_type, "Sending research request");

        let response =
            self.client.post(&url).json(&request).send().await.map_err(|err| {
                if err.is_connect() {
                    CollectorError::Unreachable { url: self.backend_url.clone(), source: err }
                } else {
                    CollectorError::Http(err)
                }
            })?;

        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return Ok(serde_json::from_slice(&body)?);
        }

        Err(backend_error(status, &body))
    }
}

fn backend_error(status: StatusCode, body: &[u8]) -> CollectorError {
    let parsed = serde_json::from_slice::<ErrorBody>(body).ok();
    let code = parsed.as_ref().map(|b| b.code.clone()).filter(|c| !c.is_empty());

    let message = match (status, parsed) {
        (StatusCode::UNAUTHORIZED, _) => {
            "Authentication failed. Check backend API configuration.".to_string()
        }
        (StatusCode::TOO_MANY_REQUESTS, _) => {
            "Rate limit exceeded. Please try again later.".to_string()
        }
        (_, Some(body)) if !body.error.is_empty() => body.error,
        _ => format!("Failed to fetch research results (status {status})"),
    };

    CollectorError::Backend { status: status.as_u16(), code, message }
}

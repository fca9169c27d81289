//! Perplexity chat completions client.
//!
//! Provides an async HTTP client with:
//! - Connection pooling via reqwest
//! - Bearer authentication supplied per call
//! - Status classification into [`ClientError`]
//!
//! No retry layer: each research request makes exactly one upstream attempt.

use async_trait::async_trait;
use reqwest::Client;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::{ChatCompletionRequest, ChatCompletionResponse};

/// Anything that can answer a chat completion request.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send one completion request authenticated with `api_key`.
    async fn complete(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> ClientResult<ChatCompletionResponse>;
}

/// Perplexity API client.
#[derive(Clone)]
pub struct PerplexityClient {
    /// Pooled HTTP client.
    client: Client,

    /// Chat completions endpoint.
    completions_url: String,
}

impl PerplexityClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        Ok(Self { client, completions_url: config.completions_url() })
    }

    /// Chat completions endpoint this client posts to.
    #[must_use]
    pub fn completions_url(&self) -> &str {
        &self.completions_url
    }

    /// Handle API response status codes.
    async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse().ok());

                Err(ClientError::rate_limited(retry_after))
            }
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(&text))
            }
            401 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::Unauthorized { message: text })
            }
            404 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::NotFound { message: text })
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }
}

#[async_trait]
impl CompletionProvider for PerplexityClient {
    async fn complete(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> ClientResult<ChatCompletionResponse> {
        tracing::debug!(url = %self.completions_url, model = %request.model, "Calling chat completions");

        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let response = Self::handle_response(response).await?;
        let body = response.bytes().await?;

        serde_json::from_slice(&body).map_err(ClientError::from)
    }
}

impl std::fmt::Debug for PerplexityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerplexityClient").field("completions_url", &self.completions_url).finish()
    }
}

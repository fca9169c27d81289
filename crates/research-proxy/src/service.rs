//! Research proxy service.
//!
//! One call of [`ResearchService::handle`] is one pipeline run:
//! 1. Validate the topic and the configured credential
//! 2. Assemble the prompt for the search type
//! 3. Make exactly one upstream completion call
//! 4. Extract sources from the payload
//!
//! The service holds no mutable state, so concurrent calls never coordinate.

use std::sync::Arc;

use crate::citations;
use crate::client::{CompletionProvider, PerplexityClient};
use crate::config::Config;
use crate::error::{ClientError, ResearchError, ServiceResult};
use crate::models::{ResearchRequest, ResearchResult, SearchType};
use crate::prompt;

/// Stateless research pipeline over a completion provider.
#[derive(Clone)]
pub struct ResearchService {
    /// Upstream completion provider.
    provider: Arc<dyn CompletionProvider>,

    /// Upstream credential, checked on every call.
    api_key: Option<String>,
}

impl ResearchService {
    /// Create a service backed by the Perplexity API.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = PerplexityClient::new(config)?;
        Ok(Self::with_provider(config, Arc::new(client)))
    }

    /// Create a service with a custom completion provider.
    #[must_use]
    pub fn with_provider(config: &Config, provider: Arc<dyn CompletionProvider>) -> Self {
        let api_key = config.has_api_key().then(|| config.api_key.clone()).flatten();
        Self { provider, api_key }
    }

    /// Check if an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Run a research request.
    pub async fn research(&self, request: &ResearchRequest) -> ServiceResult<ResearchResult> {
        self.handle(&request.topic, &request.search_type).await
    }

    /// Run the pipeline for a topic and raw search type label.
    pub async fn handle(&self, topic: &str, search_type: &str) -> ServiceResult<ResearchResult> {
        if topic.trim().is_empty() {
            return Err(ResearchError::topic_required());
        }

        let Some(api_key) = self.api_key.as_deref() else {
            tracing::error!("Upstream API key not configured");
            return Err(ResearchError::Configuration);
        };

        let search_type = SearchType::from_label(search_type);
        let request = prompt::build_request(topic, search_type);

        let response = self
            .provider
            .complete(api_key, &request)
            .await
            .inspect_err(log_upstream_failure)?;

        if let Some(usage) = response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Upstream usage"
            );
        }

        let Some(text) = response.completion_text() else {
            tracing::error!(
                choices = response.choices.len(),
                id = ?response.id,
                "Upstream payload has no completion text"
            );
            return Err(ResearchError::internal("upstream payload has no completion text"));
        };

        let sources = match citations::extract_with_source(&response) {
            Some((source, sources)) => {
                tracing::info!(
                    search_type = %search_type,
                    source = source.as_str(),
                    count = sources.len(),
                    "Extracted sources"
                );
                sources
            }
            None => {
                tracing::info!(search_type = %search_type, "No sources found");
                Vec::new()
            }
        };

        Ok(ResearchResult { result: text.to_string(), sources })
    }
}

fn log_upstream_failure(err: &ClientError) {
    match err {
        ClientError::BadRequest { details } => {
            tracing::error!(details = %details, "Perplexity API rejected the request");
        }
        ClientError::RateLimited { retry_after } => {
            tracing::warn!(retry_after = ?retry_after, "Perplexity API rate limited the request");
        }
        other => {
            tracing::error!(status = ?other.status(), error = %other, "Error calling Perplexity API");
        }
    }
}

impl std::fmt::Debug for ResearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchService").field("has_api_key", &self.has_api_key()).finish()
    }
}

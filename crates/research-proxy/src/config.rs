//! Configuration for the research proxy.
//!
//! Built once at process start and handed to the service constructor; nothing
//! in the request path reads the environment.

use std::time::Duration;

use anyhow::Context;
use url::Url;

/// Upstream API constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for the Perplexity API.
    pub const BASE_URL: &str = "https://api.perplexity.ai";

    /// Chat completions path, appended to the base URL.
    pub const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

    /// Model used for every research request.
    pub const MODEL: &str = "sonar";

    /// Sampling temperature.
    pub const TEMPERATURE: f32 = 0.7;

    /// Response token cap.
    pub const MAX_TOKENS: u32 = 2000;

    /// Whole-request timeout for the upstream call.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// HTTP server and collector defaults.
pub mod server {
    /// Default listening port.
    pub const DEFAULT_PORT: u16 = 5001;

    /// Default backend URL used by the terminal collector.
    pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5001";
}

/// Environment variable names.
pub mod env {
    pub const API_KEY: &str = "PERPLEXITY_API_KEY";
    pub const API_URL: &str = "PERPLEXITY_API_URL";
    pub const PORT: &str = "PORT";
    pub const BACKEND_URL: &str = "BACKEND_URL";
}

/// Server configuration.
#[derive(Clone)]
pub struct Config {
    /// Perplexity API key. Absence is reported per request, not at startup.
    pub api_key: Option<String>,

    /// Base URL for the upstream API (overridable for mock servers).
    pub api_url: String,

    /// Listening port for the HTTP server.
    pub port: u16,

    /// Upstream request timeout.
    pub request_timeout: Duration,

    /// Upstream connection timeout.
    pub connect_timeout: Duration,
}

impl Config {
    /// Create a configuration pointing at the public Perplexity API.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            api_url: api::BASE_URL.to_string(),
            port: server::DEFAULT_PORT,
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
        }
    }

    /// Create a test configuration with a custom upstream URL.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            api_key: Some("test-key".to_string()),
            api_url: base_url.trim_end_matches('/').to_string(),
            port: 0,
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
        }
    }

    /// Set the upstream base URL after validating it.
    ///
    /// # Errors
    ///
    /// Returns error if the URL does not parse or is not http(s).
    pub fn with_api_url(mut self, api_url: &str) -> anyhow::Result<Self> {
        self.api_url = validate_base_url(api_url)?;
        Ok(self)
    }

    /// Set the listening port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if `PORT` or `PERPLEXITY_API_URL` are set but invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var(env::API_KEY).ok();
        let mut config = Self::new(api_key);

        if let Ok(api_url) = std::env::var(env::API_URL) {
            config = config.with_api_url(&api_url)?;
        }

        if let Ok(port) = std::env::var(env::PORT) {
            let port = port.parse().with_context(|| format!("invalid {}: {port:?}", env::PORT))?;
            config = config.with_port(port);
        }

        Ok(config)
    }

    /// Check if a usable API key is configured. Blank keys count as missing.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }

    /// Full URL of the chat completions endpoint.
    #[must_use]
    pub fn completions_url(&self) -> String {
        format!("{}{}", self.api_url, api::CHAT_COMPLETIONS_PATH)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("has_api_key", &self.has_api_key())
            .field("api_url", &self.api_url)
            .field("port", &self.port)
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Validate an http(s) base URL and strip any trailing slash.
///
/// # Errors
///
/// Returns error if the URL does not parse or uses another scheme.
pub fn validate_base_url(raw: &str) -> anyhow::Result<String> {
    let url = Url::parse(raw).with_context(|| format!("invalid URL: {raw:?}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("unsupported URL scheme {:?} in {raw:?}", url.scheme());
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

//! Research Proxy
//!
//! A small backend for a research-assistant UI. It takes a topic and a
//! source-type filter, asks the Perplexity chat completions API for a
//! structured report, and relays the answer together with its source URLs.
//!
//! # Pipeline
//!
//! - **Prompt assembly**: a search-type context prefix plus a fixed report template
//! - **One upstream call**: no retries, no caching
//! - **Citation extraction**: API citations first, URL scan of the text as fallback
//!
//! # Example
//!
//! ```no_run
//! use research_proxy::{config::Config, server::ResearchServer, ResearchService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let service = ResearchService::new(&config)?;
//!
//!     ResearchServer::new(service).run_http(config.port).await
//! }
//! ```

pub mod citations;
pub mod client;
pub mod collector;
pub mod config;
pub mod error;
pub mod formatters;
pub mod models;
pub mod prompt;
pub mod server;
pub mod service;

pub use client::{CompletionProvider, PerplexityClient};
pub use collector::ResearchCollector;
pub use config::Config;
pub use error::{ClientError, ResearchError};
pub use service::ResearchService;

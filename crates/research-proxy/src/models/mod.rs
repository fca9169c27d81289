//! Data models for the research endpoint and the upstream completion API.
//!
//! Inbound/outbound research bodies use camelCase to match the browser client;
//! completion models follow the upstream snake_case schema.

mod completion;
mod research;

pub use completion::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice, Role, Usage};
pub use research::{ErrorBody, ResearchRequest, ResearchResult, SearchType};

//! Research request, result, and error bodies.

use serde::{Deserialize, Serialize};

/// Source category narrowing the upstream prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// No restriction.
    #[default]
    All,
    /// Formal research papers and peer-reviewed articles.
    #[value(alias = "paper")]
    Papers,
    /// Peer-reviewed journal articles only.
    Journal,
    /// Recent news and current events.
    News,
    /// Academic institutions and educational sources.
    Academic,
}

impl SearchType {
    /// Every variant, in display order.
    pub const ALL: [Self; 5] = [Self::All, Self::Papers, Self::Journal, Self::News, Self::Academic];

    /// Parse a caller-supplied label.
    ///
    /// Matching is exact and case-sensitive. `paper` is accepted as an alias of
    /// `papers`; anything unrecognised falls back to [`SearchType::All`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "papers" | "paper" => Self::Papers,
            "journal" => Self::Journal,
            "news" => Self::News,
            "academic" => Self::Academic,
            _ => Self::All,
        }
    }

    /// Wire label for this search type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Papers => "papers",
            Self::Journal => "journal",
            Self::News => "news",
            Self::Academic => "academic",
        }
    }
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/research`.
///
/// The search type stays a raw string so unknown labels degrade to
/// [`SearchType::All`] instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRequest {
    /// Research topic. Missing deserializes as empty and is rejected later.
    #[serde(default)]
    pub topic: String,

    /// Search type label (e.g., "news").
    #[serde(default = "default_search_type")]
    pub search_type: String,
}

fn default_search_type() -> String {
    SearchType::All.as_str().to_string()
}

impl ResearchRequest {
    /// Create a request.
    #[must_use]
    pub fn new(topic: impl Into<String>, search_type: SearchType) -> Self {
        Self { topic: topic.into(), search_type: search_type.as_str().to_string() }
    }

    /// Parsed search type.
    #[must_use]
    pub fn search_type(&self) -> SearchType {
        SearchType::from_label(&self.search_type)
    }
}

/// Successful research response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchResult {
    /// Completion text (markdown), unmodified.
    pub result: String,

    /// Source URLs, in extraction order.
    #[serde(default)]
    pub sources: Vec<String>,
}

impl ResearchResult {
    /// Check if any sources were found.
    #[must_use]
    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,

    /// Stable error kind (e.g., "upstream_rate_limited").
    #[serde(default)]
    pub code: String,

    /// Upstream details, only for upstream bad requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Create an error body without details.
    #[must_use]
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self { error: error.into(), code: code.into(), details: None }
    }
}

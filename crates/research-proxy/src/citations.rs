//! Citation extraction from upstream completions.
//!
//! Strategies are tried in order and the first non-empty result wins; results
//! from different strategies are never merged. The text scan is a lossy
//! convenience: URLs containing `)` or ending in punctuation may be cut short.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ChatCompletionResponse, Choice};

/// `http(s)://` up to whitespace or `)`. Trailing `.`/`,` are trimmed after matching.
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s)]+").expect("valid URL regex"));

/// Where the sources of a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationSource {
    /// Top-level `citations` on the payload.
    TopLevel,
    /// `citations` on the first choice.
    FirstChoice,
    /// URLs scraped from the completion text.
    TextScan,
}

impl CitationSource {
    /// Label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopLevel => "top_level",
            Self::FirstChoice => "first_choice",
            Self::TextScan => "text_scan",
        }
    }
}

type Strategy = fn(&ChatCompletionResponse) -> Vec<String>;

const STRATEGIES: [(CitationSource, Strategy); 3] = [
    (CitationSource::TopLevel, top_level_citations),
    (CitationSource::FirstChoice, first_choice_citations),
    (CitationSource::TextScan, scanned_citations),
];

/// Extract sources, reporting which strategy produced them.
///
/// Returns `None` when no strategy finds anything; that is not an error.
#[must_use]
pub fn extract_with_source(response: &ChatCompletionResponse) -> Option<(CitationSource, Vec<String>)> {
    STRATEGIES.iter().find_map(|(source, strategy)| {
        let found = strategy(response);
        (!found.is_empty()).then_some((*source, found))
    })
}

/// Extract sources, or an empty list.
#[must_use]
pub fn extract_sources(response: &ChatCompletionResponse) -> Vec<String> {
    extract_with_source(response).map(|(_, sources)| sources).unwrap_or_default()
}

/// Top-level citations, verbatim.
#[must_use]
pub fn top_level_citations(response: &ChatCompletionResponse) -> Vec<String> {
    response.citation_urls()
}

/// First-choice citations, verbatim.
#[must_use]
pub fn first_choice_citations(response: &ChatCompletionResponse) -> Vec<String> {
    response.first_choice().map(Choice::citation_urls).unwrap_or_default()
}

/// URLs found in the completion text.
#[must_use]
pub fn scanned_citations(response: &ChatCompletionResponse) -> Vec<String> {
    response.completion_text().map(scan_urls).unwrap_or_default()
}

/// Scan free text for URLs, deduplicated in first-seen order.
#[must_use]
pub fn scan_urls(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',']))
        .filter(|url| has_host(url))
        .filter(|url| seen.insert(*url))
        .map(str::to_string)
        .collect()
}

fn has_host(url: &str) -> bool {
    url.split_once("://").is_some_and(|(_, rest)| !rest.is_empty())
}

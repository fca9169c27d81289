//! Prompt assembly for research requests.
//!
//! The user prompt is a search-type context prefix glued, with no separator,
//! onto a fixed report template that embeds the topic verbatim.

use crate::models::{ChatCompletionRequest, ChatMessage, SearchType};

/// System message describing the assistant's role.
pub const SYSTEM_PROMPT: &str = "You are a research assistant. Provide comprehensive research reports with key findings, important facts, research gaps, and future research directions.";

const PAPERS_CONTEXT: &str = "Please restrict your response to formal academic research papers and peer-reviewed journal articles only. Ensure the information is scholarly and references are properly cited.";

const JOURNAL_CONTEXT: &str = "Please provide information exclusively from peer-reviewed journal articles. Ensure all sources are formal, scholarly, and properly cited.";

const NEWS_CONTEXT: &str = "Please focus on recent news articles, current events, and recent developments from reputable news sources. Ensure the information is up-to-date and well-cited.";

const ACADEMIC_CONTEXT: &str = "Please focus on information from academic institutions, universities, and reputable educational sources. Ensure the content is formal and well-referenced.";

/// Context prefix for a search type. Empty for [`SearchType::All`].
#[must_use]
pub const fn search_context(search_type: SearchType) -> &'static str {
    match search_type {
        SearchType::Papers => PAPERS_CONTEXT,
        SearchType::Journal => JOURNAL_CONTEXT,
        SearchType::News => NEWS_CONTEXT,
        SearchType::Academic => ACADEMIC_CONTEXT,
        SearchType::All => "",
    }
}

/// Build the user prompt for a topic.
#[must_use]
pub fn build_prompt(topic: &str, search_type: SearchType) -> String {
    format!(
        r#"{context}You are a research assistant. Please provide a comprehensive research report on: "{topic}"

Format your response with the following sections:

**Key Findings:**
- List 3-5 main findings about the topic

**Important Facts:**
- List 4-6 crucial facts and statistics

**Research Gaps:**
- Identify 3-4 areas that need further research

**Future Research Ideas:**
- Suggest 3-4 future research directions

Please be thorough, accurate, and cite credible sources where applicable."#,
        context = search_context(search_type),
    )
}

/// Build the full completion request: system role, then the user prompt.
#[must_use]
pub fn build_request(topic: &str, search_type: SearchType) -> ChatCompletionRequest {
    ChatCompletionRequest::research(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_prompt(topic, search_type)),
    ])
}

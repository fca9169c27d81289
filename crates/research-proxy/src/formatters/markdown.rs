//! Markdown report formatting.

use url::Url;

use crate::models::ResearchResult;

/// Format a research result as a Markdown report with a numbered source list.
#[must_use]
pub fn format_report_markdown(topic: &str, result: &ResearchResult) -> String {
    let mut output = format!("# Research: {}\n\n", topic.trim());

    output.push_str(result.result.trim_end());
    output.push_str("\n\n");
    output.push_str(&format_sources_markdown(&result.sources));

    output
}

/// Format sources as a numbered list labelled by domain.
#[must_use]
pub fn format_sources_markdown(sources: &[String]) -> String {
    if sources.is_empty() {
        return "## Sources\n\nNo sources found.\n".to_string();
    }

    let mut output = format!("## Sources ({})\n\n", sources.len());

    for (i, source) in sources.iter().enumerate() {
        output.push_str(&format!("{}. [{}]({})\n", i + 1, source_domain(source), source));
    }

    output
}

/// Host name of a source URL, or the source itself when it does not parse.
#[must_use]
pub fn source_domain(source: &str) -> String {
    Url::parse(source)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| source.to_string())
}

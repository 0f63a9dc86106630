use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::service::chat_client::ChatCompletion;

/// Only the first N characters of a document are summarized; the model has a
/// bounded context window, so this is a deliberate lossy step.
const SUMMARY_INPUT_LIMIT: usize = 4000;

const SYSTEM_PROMPT: &str = "You are an expert educational content analyzer.";

/// Outcome of one summarization call. Transport and API failures surface as
/// `Failed`, never as an `Err` past this component; the orchestrator decides
/// what a failure means for the run.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryResult {
    Parsed {
        summary: String,
        topics: Vec<String>,
    },
    Failed {
        reason: String,
    },
}

/// Sentinel text persisted when summarization fails outright.
pub const SUMMARY_FAILED_SENTINEL: &str = "Summary generation failed";

pub(crate) fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn build_prompt(text: &str) -> String {
    format!(
        "Analyze the following educational text and provide:\n\
         1. A concise summary (2-3 paragraphs)\n\
         2. Key topics covered as a JSON array\n\n\
         Format your response as:\n\
         SUMMARY:\n\
         [Your summary here]\n\n\
         KEY_TOPICS:\n\
         [\"topic1\", \"topic2\", \"topic3\"]\n\n\
         Text:\n{}",
        truncate_chars(text, SUMMARY_INPUT_LIMIT)
    )
}

/// Parses the two-section model response into `(summary, topics)`.
///
/// Both markers present: the summary is the text between them and the topics
/// section is scanned for the first bracketed span, parsed as JSON. A topics
/// parse failure, or a missing marker, falls back to the whole response as the
/// summary with an empty topic list.
pub fn parse_summary_response(content: &str) -> (String, Vec<String>) {
    if content.contains("SUMMARY:") && content.contains("KEY_TOPICS:") {
        let mut parts = content.splitn(2, "KEY_TOPICS:");
        let summary_section = parts.next().unwrap_or_default();
        let topics_section = parts.next().unwrap_or_default();

        let summary = summary_section.replace("SUMMARY:", "").trim().to_string();

        static BRACKET_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"(?s)\[.*?\]").unwrap());
        if let Some(span) = BRACKET_RE.find(topics_section) {
            if let Ok(topics) = serde_json::from_str::<Vec<String>>(span.as_str()) {
                return (summary, topics);
            }
        }
    }

    (content.trim().to_string(), Vec::new())
}

pub async fn generate_summary(client: &dyn ChatCompletion, text: &str) -> SummaryResult {
    let prompt = build_prompt(text);

    match client.complete(SYSTEM_PROMPT, &prompt, 800, 0.3).await {
        Ok(content) => {
            let (summary, topics) = parse_summary_response(&content);
            SummaryResult::Parsed { summary, topics }
        }
        Err(e) => {
            warn!("Summary generation failed: {}", e);
            SummaryResult::Failed {
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::chat_client::test_support::MockChatClient;

    #[test]
    fn test_parse_both_markers() {
        let content = "SUMMARY:\nFoo\n\nKEY_TOPICS:\n[\"a\",\"b\"]";
        let (summary, topics) = parse_summary_response(content);
        assert_eq!(summary, "Foo");
        assert_eq!(topics, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_without_markers_falls_back() {
        let content = "  Just a plain paragraph about photosynthesis.  ";
        let (summary, topics) = parse_summary_response(content);
        assert_eq!(summary, "Just a plain paragraph about photosynthesis.");
        assert!(topics.is_empty());
    }

    #[test]
    fn test_parse_bad_topics_json_falls_back_to_whole_response() {
        let content = "SUMMARY:\nFoo\n\nKEY_TOPICS:\n[not, valid, json]";
        let (summary, topics) = parse_summary_response(content);
        assert_eq!(summary, content.trim());
        assert!(topics.is_empty());
    }

    #[test]
    fn test_parse_topics_spanning_lines() {
        let content = "SUMMARY:\nCell biology basics.\n\nKEY_TOPICS:\n[\"mitosis\",\n \"meiosis\"]";
        let (summary, topics) = parse_summary_response(content);
        assert_eq!(summary, "Cell biology basics.");
        assert_eq!(topics, vec!["mitosis", "meiosis"]);
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hi", 10), "hi");
        // Multi-byte characters must not be split mid-codepoint.
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }

    #[tokio::test]
    async fn test_transport_failure_is_contained() {
        let client = MockChatClient::with_responses(vec![Err("connection refused".to_string())]);
        let result = generate_summary(&client, "some text").await;
        assert!(matches!(result, SummaryResult::Failed { .. }));
    }

    #[tokio::test]
    async fn test_successful_round_trip() {
        let client = MockChatClient::always("SUMMARY:\nShort.\n\nKEY_TOPICS:\n[\"x\"]");
        let result = generate_summary(&client, "some text").await;
        assert_eq!(
            result,
            SummaryResult::Parsed {
                summary: "Short.".to_string(),
                topics: vec!["x".to_string()],
            }
        );
    }
}

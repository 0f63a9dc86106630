use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::db::models::DifficultyLevel;
use crate::service::chat_client::ChatCompletion;
use crate::service::summarizer::truncate_chars;

/// Separate (smaller) prefix than the summarizer uses; quiz prompts carry
/// more instruction text.
const QUIZ_INPUT_LIMIT: usize = 3000;

const SYSTEM_PROMPT: &str = "You are an expert quiz generator. Return only valid JSON.";

/// One validated question out of the model response. Records missing the
/// question text, options, or answer key are dropped during parsing, never
/// fail the whole batch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
    pub options: Value,
    pub answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl GeneratedQuestion {
    fn is_valid(&self) -> bool {
        !self.question.trim().is_empty()
            && !self.answer.trim().is_empty()
            && self.options.as_object().is_some_and(|o| !o.is_empty())
    }
}

fn difficulty_instruction(difficulty: DifficultyLevel) -> &'static str {
    match difficulty {
        DifficultyLevel::Easy => "Focus on basic comprehension and recall questions.",
        DifficultyLevel::Medium => {
            "Create questions requiring understanding and application of concepts."
        }
        DifficultyLevel::Hard => {
            "Generate questions requiring critical thinking, analysis, and synthesis."
        }
    }
}

fn build_prompt(text: &str, count: usize, difficulty: DifficultyLevel) -> String {
    format!(
        "Generate {count} multiple choice quiz questions from the following content.\n\
         Difficulty level: {} - {}\n\n\
         Return a valid JSON array with this exact format:\n\
         [\n\
           {{\n\
             \"question\": \"Clear, specific question text?\",\n\
             \"options\": {{\"A\": \"Option 1\", \"B\": \"Option 2\", \"C\": \"Option 3\", \"D\": \"Option 4\"}},\n\
             \"answer\": \"A\",\n\
             \"explanation\": \"Brief explanation of why this answer is correct\"\n\
           }}\n\
         ]\n\n\
         Guidelines:\n\
         - Make questions specific and test understanding, not just memorization\n\
         - Ensure all options are plausible\n\
         - Keep questions concise but comprehensive\n\n\
         Content:\n{}",
        difficulty.as_str(),
        difficulty_instruction(difficulty),
        truncate_chars(text, QUIZ_INPUT_LIMIT)
    )
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

fn questions_from_json(parsed: Vec<Value>) -> Vec<GeneratedQuestion> {
    parsed
        .into_iter()
        .filter_map(|element| serde_json::from_value::<GeneratedQuestion>(element).ok())
        .filter(GeneratedQuestion::is_valid)
        .collect()
}

/// Parses model output into validated questions, truncated to `count`.
///
/// Order of attempts: strip markdown fences, direct JSON parse, then a
/// regex scan for the first bracketed span. Total failure yields an empty
/// vector; the caller accepts a short quiz rather than retrying.
pub fn parse_questions_response(raw: &str, count: usize) -> Vec<GeneratedQuestion> {
    let cleaned = strip_code_fences(raw);

    let parsed = match serde_json::from_str::<Vec<Value>>(cleaned) {
        Ok(values) => values,
        Err(_) => {
            static BRACKET_RE: LazyLock<Regex> =
                LazyLock::new(|| Regex::new(r"(?s)\[.*\]").unwrap());
            match BRACKET_RE
                .find(cleaned)
                .and_then(|span| serde_json::from_str::<Vec<Value>>(span.as_str()).ok())
            {
                Some(values) => values,
                None => {
                    warn!("Quiz generator output was not valid JSON: {}", cleaned);
                    return Vec::new();
                }
            }
        }
    };

    let mut questions = questions_from_json(parsed);
    questions.truncate(count);
    questions
}

pub async fn generate_questions(
    client: &dyn ChatCompletion,
    text: &str,
    count: usize,
    difficulty: DifficultyLevel,
) -> Vec<GeneratedQuestion> {
    let prompt = build_prompt(text, count, difficulty);

    match client.complete(SYSTEM_PROMPT, &prompt, 2000, 0.5).await {
        Ok(content) => parse_questions_response(&content, count),
        Err(e) => {
            warn!("Quiz generation failed: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::chat_client::test_support::MockChatClient;

    const VALID_ARRAY: &str = r#"[
        {"question": "What is 2+2?",
         "options": {"A": "3", "B": "4", "C": "5", "D": "6"},
         "answer": "B",
         "explanation": "Basic arithmetic."},
        {"question": "Capital of France?",
         "options": {"A": "Paris", "B": "Lyon", "C": "Nice", "D": "Lille"},
         "answer": "A"}
    ]"#;

    #[test]
    fn test_direct_json_parse() {
        let questions = parse_questions_response(VALID_ARRAY, 10);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].answer, "B");
        assert_eq!(questions[1].explanation, None);
    }

    #[test]
    fn test_fenced_code_block() {
        let fenced = format!("```json\n{}\n```", VALID_ARRAY);
        let questions = parse_questions_response(&fenced, 10);
        assert_eq!(questions.len(), 2);
    }

    #[test]
    fn test_element_missing_answer_is_dropped() {
        let raw = r#"[
            {"question": "Kept?", "options": {"A": "yes", "B": "no"}, "answer": "A"},
            {"question": "Dropped?", "options": {"A": "yes", "B": "no"}}
        ]"#;
        let questions = parse_questions_response(raw, 10);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "Kept?");
    }

    #[test]
    fn test_garbage_returns_empty() {
        assert!(parse_questions_response("The model refused to answer.", 10).is_empty());
        assert!(parse_questions_response("", 10).is_empty());
    }

    #[test]
    fn test_array_embedded_in_prose() {
        let raw = format!("Here are your questions:\n{}\nEnjoy!", VALID_ARRAY);
        let questions = parse_questions_response(&raw, 10);
        assert_eq!(questions.len(), 2);
    }

    #[test]
    fn test_overproduced_batch_is_truncated() {
        let questions = parse_questions_response(VALID_ARRAY, 1);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question, "What is 2+2?");
    }

    #[test]
    fn test_empty_options_object_is_dropped() {
        let raw = r#"[{"question": "Q?", "options": {}, "answer": "A"}]"#;
        assert!(parse_questions_response(raw, 10).is_empty());
    }

    #[tokio::test]
    async fn test_api_failure_yields_empty_batch() {
        let client = MockChatClient::with_responses(vec![Err("timeout".to_string())]);
        let questions =
            generate_questions(&client, "text", 5, DifficultyLevel::Medium).await;
        assert!(questions.is_empty());
    }
}

use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

pub struct ChatClientConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for ChatClientConfig {
    fn default() -> Self {
        let api_url = env::var("AI_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());
        let api_key = env::var("AI_API_KEY").unwrap_or_default();
        let model = env::var("AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        Self {
            api_url,
            api_key,
            model,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug)]
pub enum ChatError {
    RequestError(String),
    ParseError(String),
    EmptyResponse,
}

impl std::fmt::Display for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatError::RequestError(msg) => write!(f, "Chat API request failed: {}", msg),
            ChatError::ParseError(msg) => write!(f, "Chat API response parse failed: {}", msg),
            ChatError::EmptyResponse => write!(f, "Chat API returned no content"),
        }
    }
}

impl std::error::Error for ChatError {}

/// Seam for the external language-model API. The pipeline components take
/// `&dyn ChatCompletion` so tests can substitute a canned double.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ChatError>;
}

pub struct ChatClient {
    client: Client,
    config: ChatClientConfig,
}

impl ChatClient {
    pub fn new(config: ChatClientConfig) -> Result<Self, ReqwestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, ReqwestError> {
        Self::new(ChatClientConfig::default())
    }
}

#[async_trait]
impl ChatCompletion for ChatClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ChatError> {
        debug!(model = %self.config.model, "sending chat completion request");

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            max_tokens,
            temperature,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::RequestError(format!("{}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::RequestError(format!(
                "upstream returned {}",
                status
            )));
        }

        let body = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| ChatError::ParseError(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ChatError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;

    /// Canned chat double: returns queued responses in order, or an error.
    pub struct MockChatClient {
        responses: std::sync::Mutex<std::collections::VecDeque<Result<String, String>>>,
    }

    impl MockChatClient {
        pub fn with_responses(responses: Vec<Result<String, String>>) -> Self {
            Self {
                responses: std::sync::Mutex::new(responses.into_iter().collect()),
            }
        }

        pub fn always(response: &str) -> Self {
            Self::with_responses(vec![Ok(response.to_string())])
        }
    }

    #[async_trait]
    impl ChatCompletion for MockChatClient {
        async fn complete(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
            _max_tokens: u32,
            _temperature: f32,
        ) -> Result<String, ChatError> {
            let mut queue = self.responses.lock().unwrap();
            match queue.pop_front() {
                Some(Ok(content)) => Ok(content),
                Some(Err(reason)) => Err(ChatError::RequestError(reason)),
                None => Err(ChatError::EmptyResponse),
            }
        }
    }
}

use std::time::Duration;

use cleaner_core::StartError;
use serde::{Deserialize, Serialize};

use crate::{RowError, RowFailure};

pub const DEFAULT_ENDPOINT: &str = "https://api.deepseek.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            max_tokens: 500,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// One prompt in, one plain-text reply out.
#[async_trait::async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, api_key: &str, prompt: &str) -> Result<String, RowError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// OpenAI-compatible chat-completion client with bearer-token auth.
#[derive(Debug, Clone)]
pub struct ReqwestChatClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestChatClient {
    pub fn new(settings: ClientSettings) -> Result<Self, StartError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| StartError::Runtime(format!("http client: {err}")))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }
}

#[async_trait::async_trait]
impl ChatClient for ReqwestChatClient {
    async fn complete(&self, api_key: &str, prompt: &str) -> Result<String, RowError> {
        let body = ChatRequest {
            model: &self.settings.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            stream: false,
        };

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RowError::new(
                RowFailure::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let text = response.text().await.map_err(map_reqwest_error)?;
        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|err| RowError::new(RowFailure::MalformedResponse, err.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| RowError::new(RowFailure::MalformedResponse, "no choices in response"))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> RowError {
    if err.is_timeout() {
        return RowError::new(RowFailure::Timeout, err.to_string());
    }
    RowError::new(RowFailure::Network, err.to_string())
}

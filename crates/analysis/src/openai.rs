use crate::completion::{
    CompletionError, CompletionRequest, CompletionService, TerminalKind, TransientKind,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Connection settings for an OpenAI-compatible chat-completions endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpenAiConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            request_timeout_secs: 60,
        }
    }
}

impl OpenAiConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url must not be empty".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.temperature
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be > 0".to_string());
        }
        Ok(())
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// [`CompletionService`] backed by an OpenAI-compatible HTTP API
pub struct OpenAiCompletionService {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiCompletionService {
    pub fn new(config: OpenAiConfig) -> Result<Self, CompletionError> {
        config
            .validate()
            .map_err(|e| CompletionError::terminal(TerminalKind::InvalidRequest, e))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                CompletionError::terminal(
                    TerminalKind::Other,
                    format!("Failed to build HTTP client: {e}"),
                )
            })?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletionService {
    async fn complete(
        &self,
        request: &CompletionRequest,
        prompt: &str,
    ) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut builder = self.client.post(self.config.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        log::debug!(
            "POST {} for {} ({} chars)",
            self.config.endpoint(),
            request.filename,
            request.content.chars().count()
        );
        let response = builder.send().await.map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &text));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            CompletionError::terminal(
                TerminalKind::InvalidResponse,
                format!("Malformed chat completion body: {e}"),
            )
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                CompletionError::terminal(
                    TerminalKind::InvalidResponse,
                    "Chat completion contained no message content",
                )
            })
    }

    async fn ready(&self) -> Result<(), CompletionError> {
        match &self.config.api_key {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(CompletionError::terminal(
                TerminalKind::Authentication,
                "no API key configured (set OPENAI_API_KEY)",
            )),
        }
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

fn classify_transport(err: reqwest::Error) -> CompletionError {
    let message = err.to_string();
    if err.is_timeout() {
        CompletionError::transient(TransientKind::Timeout, message)
    } else if err.is_connect() {
        CompletionError::transient(TransientKind::Network, message)
    } else if err.is_builder() {
        CompletionError::terminal(TerminalKind::InvalidRequest, message)
    } else {
        CompletionError::transient(TransientKind::ConnectionReset, message)
    }
}

fn classify_status(status: StatusCode, body: &str) -> CompletionError {
    const MAX_BODY_CHARS: usize = 300;
    let excerpt: String = body.chars().take(MAX_BODY_CHARS).collect();
    let message = format!("HTTP {status}: {excerpt}");

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            CompletionError::transient(TransientKind::RateLimited, message)
        }
        StatusCode::REQUEST_TIMEOUT => CompletionError::transient(TransientKind::Timeout, message),
        s if s.is_server_error() => {
            CompletionError::transient(TransientKind::Server(s.as_u16()), message)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CompletionError::terminal(TerminalKind::Authentication, message)
        }
        s if s.is_client_error() => CompletionError::terminal(TerminalKind::InvalidRequest, message),
        _ => CompletionError::terminal(TerminalKind::Other, message),
    }
}

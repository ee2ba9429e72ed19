//! LLM agent module for summarization.
//!
//! Builds the single instruction prompt, sends it to an OpenAI-compatible
//! chat completions endpoint and parses the reply into a `SummaryResult`.

pub use crate::summary::SummaryResult;

use crate::config::{Config, ConfigError};
use crate::extract::ExtractedDocument;
use crate::summary::SummaryError;
use crate::target::SourceKind;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Output language used when none is given
pub const DEFAULT_LANGUAGE: &str = "british english";

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("LLM API error ({status}): {body}")]
    ApiError { status: u16, body: String },
    #[error("LLM returned an empty reply")]
    EmptyReply,
    #[error("failed to parse response: {0}")]
    ParseError(#[from] SummaryError),
    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),
}

/// Everything the model needs to produce one summary
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub text: String,
    pub source: SourceKind,
    pub language: String,
    pub context: Option<String>,
}

impl SummaryRequest {
    pub fn new(document: ExtractedDocument, language: impl Into<String>, context: Option<String>) -> Self {
        Self {
            text: document.text,
            source: document.source,
            language: language.into(),
            context,
        }
    }

    /// The instruction block followed by the extracted text
    pub fn prompt(&self) -> String {
        let additional_context = match &self.context {
            Some(context) => format!(" Additional context: {}.", context),
            None => String::new(),
        };

        format!(
            r#"The data below was extracted from a {source}. Generate an insightful summary of this data in {language}.{additional_context} Use \n to break line, if needed. Return the result as a JSON object in the following format:
{{
  "title": "Title of your summary",
  "summary": "Summary of the article"
}}

{text}"#,
            source = self.source,
            language = self.language,
            additional_context = additional_context,
            text = self.text,
        )
    }
}

/// A service that turns a prompt into a single text reply
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AgentError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Client for the OpenAI chat completions API
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    /// Build a client from the loaded configuration; fails when no API key is set
    pub fn new(config: &Config) -> Result<Self, AgentError> {
        let api_key = config.api_key()?;
        let agent = &config.agent;
        let client = Client::builder()
            .timeout(Duration::from_secs(agent.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint: format!("{}/chat/completions", agent.base_url.trim_end_matches('/')),
            model: agent.model.clone(),
            temperature: agent.temperature,
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, AgentError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };
        tracing::debug!("sending {} character prompt to {}", prompt.len(), self.model);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(AgentError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AgentError::EmptyReply)
    }
}

/// Send one summary request and parse the reply
pub async fn summarize<B>(backend: &B, request: &SummaryRequest) -> Result<SummaryResult, AgentError>
where
    B: CompletionBackend + ?Sized,
{
    let reply = backend.complete(&request.prompt()).await?;
    Ok(SummaryResult::from_reply(&reply)?)
}

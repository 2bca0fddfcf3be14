use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestRole {
    System,
    User,
    Assistant,
}

/// One entry of the message list sent to the completion API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMessage {
    pub role: RequestRole,
    pub content: String,
}

impl RequestMessage {
    pub fn new(role: RequestRole, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("no API key configured for the chat completion API")]
    MissingCredential,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("completion API answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion API returned an empty reply")]
    EmptyReply,
    #[error("the request was interrupted before a reply arrived")]
    Interrupted,
}

/// The external collaborator producing assistant replies.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: Vec<RequestMessage>) -> Result<Completion, CompletionError>;

    /// Model name shown to users.
    fn model(&self) -> &str;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [RequestMessage],
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat completion endpoint (Groq by default) over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl HttpCompletionClient {
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        model: &str,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.to_string(),
            temperature,
        })
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: Vec<RequestMessage>) -> Result<Completion, CompletionError> {
        let Some(api_key) = self.api_key.as_deref() else {
            log::warn!("Chat API key is missing, skipping the completion call");
            return Err(CompletionError::MissingCredential);
        };

        let body = ChatRequest {
            model: &self.model,
            messages: &messages,
            temperature: self.temperature,
            stream: false,
        };
        log::debug!(
            "Requesting completion from {} with {} messages",
            self.endpoint,
            messages.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Chat API error {}: {}", status, body);
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let data: ChatResponse = response.json().await?;
        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(CompletionError::EmptyReply)?;

        Ok(Completion {
            content,
            usage: data.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_the_wire_format() {
        let messages = vec![
            RequestMessage::new(RequestRole::System, "rules"),
            RequestMessage::new(RequestRole::User, "Xin chào"),
        ];
        let body = ChatRequest {
            model: DEFAULT_MODEL,
            messages: &messages,
            temperature: 0.5,
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "llama-3.1-8b-instant",
                "messages": [
                    {"role": "system", "content": "rules"},
                    {"role": "user", "content": "Xin chào"}
                ],
                "temperature": 0.5,
                "stream": false
            })
        );
    }

    #[tokio::test]
    async fn blank_key_counts_as_missing() {
        let client = HttpCompletionClient::new(
            "http://127.0.0.1:9/unused",
            Some("   ".to_string()),
            DEFAULT_MODEL,
            DEFAULT_TEMPERATURE,
            Duration::from_secs(1),
        )
        .unwrap();
        let err = client
            .complete(vec![RequestMessage::new(RequestRole::User, "hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, CompletionError::MissingCredential));
    }
}

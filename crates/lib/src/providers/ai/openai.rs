use crate::{errors::ProviderError, providers::ai::ModelClient, schema::StructuredSchema};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;
use tracing::debug;

/// The default OpenAI chat completions endpoint.
pub const OPENAI_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatMessage,
}

// --- OpenAI Provider implementation ---

/// A model client for OpenAI or any OpenAI-compatible chat completions API.
#[derive(Clone, Debug)]
pub struct OpenAiModelClient {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

impl OpenAiModelClient {
    /// Creates a new `OpenAiModelClient`. Every request is bounded by `timeout`.
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        model: String,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(ProviderError::ClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key,
            model,
            timeout,
        })
    }
}

#[async_trait]
impl ModelClient for OpenAiModelClient {
    async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        response_format: Option<&StructuredSchema>,
    ) -> Result<String, ProviderError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
            temperature,
            // The schema itself travels in the prompt; the API only needs JSON mode.
            response_format: response_format.map(|_| ResponseFormat {
                kind: "json_object",
            }),
        };

        let mut request_builder = self.client.post(&self.api_url);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        let response = request_builder
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout)
                } else {
                    ProviderError::Request(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(ProviderError::Deserialization)?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ProviderError::EmptyResponse)?;

        debug!(model = %self.model, chars = content.len(), "<-- Completion received");
        Ok(content)
    }
}

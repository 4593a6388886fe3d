use crate::{errors::ProviderError, providers::ai::ModelClient, schema::StructuredSchema};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;

// --- Gemini-specific request and response structures ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: ContentResponse,
}

#[derive(Deserialize, Debug)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize, Debug)]
struct PartResponse {
    text: String,
}

/// Builds the `generateContent` URL for a Gemini model.
pub fn gemini_url(model_name: &str) -> String {
    format!("https://generativelanguage.googleapis.com/v1beta/models/{model_name}:generateContent")
}

// --- Gemini Provider implementation ---

/// A model client for the Google Gemini API.
#[derive(Clone)]
pub struct GeminiModelClient {
    client: ReqwestClient,
    api_url: String,
    api_key: String,
    timeout: Duration,
}

impl Debug for GeminiModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiModelClient")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl GeminiModelClient {
    /// Creates a new `GeminiModelClient`. Every request is bounded by `timeout`.
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(ProviderError::ClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key,
            timeout,
        })
    }
}

#[async_trait]
impl ModelClient for GeminiModelClient {
    async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        response_format: Option<&StructuredSchema>,
    ) -> Result<String, ProviderError> {
        let request_body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature,
                response_mime_type: response_format.map(|_| "application/json"),
            },
        };

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", &self.api_key)])
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

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(ProviderError::Deserialization)?;

        gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or(ProviderError::EmptyResponse)
    }
}

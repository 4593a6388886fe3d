use super::{ModerationClient, ModerationResult};
use crate::errors::ProviderError;
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// The default OpenAI moderation endpoint.
pub const OPENAI_MODERATIONS_URL: &str = "https://api.openai.com/v1/moderations";

/// The default moderation model.
pub const DEFAULT_MODERATION_MODEL: &str = "text-moderation-latest";

#[derive(Serialize)]
struct ModerationRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize, Debug)]
struct ModerationResponse {
    results: Vec<ModerationResult>,
}

/// A moderation client for the OpenAI moderation endpoint.
#[derive(Clone, Debug)]
pub struct OpenAiModerationClient {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

impl OpenAiModerationClient {
    /// Creates a new `OpenAiModerationClient`. Every request is bounded by `timeout`.
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
impl ModerationClient for OpenAiModerationClient {
    async fn moderate(&self, text: &str) -> Result<ModerationResult, ProviderError> {
        let mut request_builder = self.client.post(&self.api_url);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        let response = request_builder
            .json(&ModerationRequest {
                input: text,
                model: &self.model,
            })
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

        let moderation: ModerationResponse = response
            .json()
            .await
            .map_err(ProviderError::Deserialization)?;

        let result = moderation
            .results
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;
        debug!(flagged = result.flagged, "<-- Moderation result received");
        Ok(result)
    }
}

//! # Provider Factory
//!
//! Builds the model and moderation clients from their configuration. Clients are built
//! once at process start and handed to the `PipelineComposer`, which shares them across
//! every stage and run.

use crate::{
    errors::ProviderError,
    providers::{
        ai::{
            gemini::{gemini_url, GeminiModelClient},
            openai::{OpenAiModelClient, OPENAI_CHAT_COMPLETIONS_URL},
            ModelClient,
        },
        moderation::{openai::OpenAiModerationClient, ModerationClient},
    },
    types::{ModerationConfig, ProviderConfig},
};
use std::time::Duration;
use tracing::info;

/// Creates the model client described by `config`.
///
/// `openai` accepts any OpenAI-compatible endpoint and an optional key. `gemini` needs a
/// key; its URL defaults to the `generateContent` endpoint of `model_name`.
pub fn create_model_client(
    config: &ProviderConfig,
    timeout: Duration,
) -> Result<Box<dyn ModelClient>, ProviderError> {
    match config.provider.as_str() {
        "openai" => {
            let api_url = config
                .api_url
                .clone()
                .unwrap_or_else(|| OPENAI_CHAT_COMPLETIONS_URL.to_string());
            info!(
                "Configuring OpenAI model client '{}' at {}",
                config.model_name, api_url
            );
            Ok(Box::new(OpenAiModelClient::new(
                api_url,
                config.api_key.clone(),
                config.model_name.clone(),
                timeout,
            )?))
        }
        "gemini" => {
            let api_key = config
                .api_key
                .clone()
                .filter(|key| !key.is_empty())
                .ok_or(ProviderError::MissingApiKey)?;
            let api_url = config
                .api_url
                .clone()
                .unwrap_or_else(|| gemini_url(&config.model_name));
            info!(
                "Configuring Gemini model client '{}' at {}",
                config.model_name, api_url
            );
            Ok(Box::new(GeminiModelClient::new(api_url, api_key, timeout)?))
        }
        other => Err(ProviderError::UnsupportedProvider(other.to_string())),
    }
}

/// Creates the moderation client described by `config`.
pub fn create_moderation_client(
    config: &ModerationConfig,
    timeout: Duration,
) -> Result<Box<dyn ModerationClient>, ProviderError> {
    info!(
        "Configuring moderation client '{}' at {}",
        config.model_name, config.api_url
    );
    Ok(Box::new(OpenAiModerationClient::new(
        config.api_url.clone(),
        config.api_key.clone(),
        config.model_name.clone(),
        timeout,
    )?))
}

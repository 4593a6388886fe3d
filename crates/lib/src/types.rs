//! # Provider Configuration Types
//!
//! Plain, deserializable descriptions of the external services a pipeline talks to.
//! The binary fills them from its configuration layers; the factory turns them into clients.

use crate::providers::{
    ai::openai::OPENAI_CHAT_COMPLETIONS_URL,
    moderation::openai::{DEFAULT_MODERATION_MODEL, OPENAI_MODERATIONS_URL},
};
use serde::{Deserialize, Serialize};

/// The default chat model used for every analysis stage.
pub const DEFAULT_MODEL_NAME: &str = "gpt-3.5-turbo-1106";

/// The configuration of the language model behind the analysis stages.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProviderConfig {
    /// The type of provider (`openai` or `gemini`).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// The API URL. Optional for Gemini, where it is derived from the model name.
    #[serde(default)]
    pub api_url: Option<String>,
    /// The API key, which can be null for local OpenAI-compatible servers.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model_name")]
    pub model_name: String,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model_name() -> String {
    DEFAULT_MODEL_NAME.to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: Some(OPENAI_CHAT_COMPLETIONS_URL.to_string()),
            api_key: None,
            model_name: default_model_name(),
        }
    }
}

/// The configuration of the content moderation service.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ModerationConfig {
    #[serde(default = "default_moderation_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_moderation_model")]
    pub model_name: String,
}

fn default_moderation_url() -> String {
    OPENAI_MODERATIONS_URL.to_string()
}

fn default_moderation_model() -> String {
    DEFAULT_MODERATION_MODEL.to_string()
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            api_url: default_moderation_url(),
            api_key: None,
            model_name: default_moderation_model(),
        }
    }
}

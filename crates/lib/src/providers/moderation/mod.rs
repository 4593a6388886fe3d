pub mod openai;

use crate::errors::ProviderError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// The verdict of a content moderation service for one text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModerationResult {
    pub flagged: bool,
    #[serde(default)]
    pub categories: BTreeMap<String, bool>,
    #[serde(default)]
    pub category_scores: BTreeMap<String, f64>,
}

/// A trait for content moderation services.
#[async_trait]
pub trait ModerationClient: Send + Sync + Debug + DynClone {
    /// Classifies `text` into the service's moderation categories.
    async fn moderate(&self, text: &str) -> Result<ModerationResult, ProviderError>;
}

dyn_clone::clone_trait_object!(ModerationClient);

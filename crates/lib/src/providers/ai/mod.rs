pub mod gemini;
pub mod openai;

use crate::{errors::ProviderError, schema::StructuredSchema};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for single-shot completions from a language model.
///
/// Implementations are stateless apart from read-only configuration and are shared
/// across concurrent stages and runs.
#[async_trait]
pub trait ModelClient: Send + Sync + Debug + DynClone {
    /// Completes `prompt` at the given `temperature`.
    ///
    /// When `response_format` is set, the provider is asked for a JSON answer shaped by
    /// that schema. When it is `None`, the answer is unconstrained plain text.
    async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        response_format: Option<&StructuredSchema>,
    ) -> Result<String, ProviderError>;
}

dyn_clone::clone_trait_object!(ModelClient);

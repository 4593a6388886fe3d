use std::time::Duration;
use thiserror::Error;

/// Errors raised by the model and moderation providers.
///
/// These are recovered at stage granularity: a stage whose provider call fails is
/// recorded as failed, the rest of the run carries on.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to build Reqwest client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("Failed to send request to provider: {0}")]
    Request(reqwest::Error),
    #[error("Failed to deserialize provider response: {0}")]
    Deserialization(reqwest::Error),
    #[error("Provider returned an error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Provider response contained no content")]
    EmptyResponse,
    #[error("Provider call timed out after {0:?}")]
    Timeout(Duration),
    #[error("API key is missing")]
    MissingApiKey,
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),
}

/// Errors raised while preparing or running a single analysis stage.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Unknown analysis stage: '{0}'")]
    UnknownStage(String),
    #[error("Stage '{stage}' is missing required input '{placeholder}'")]
    MissingInput { stage: String, placeholder: String },
    /// The model answer did not match the requested schema. Recovered by the
    /// plain-text retry, never surfaced to callers of the pipeline.
    #[error("Response violates schema: {0}")]
    SchemaViolation(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// The caller cancelled the run. Recorded as the reason of every unfilled slot.
    #[error("cancelled")]
    Cancelled,
}

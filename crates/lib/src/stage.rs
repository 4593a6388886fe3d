//! # Analysis Stage
//!
//! A single named unit of work: render the stage prompt, ask the model for a structured
//! answer, and parse it. Answers that violate the schema are retried once as plain text,
//! so every stage ends in exactly one of three states: `Parsed`, `FallbackRaw`, or `Failed`.

use crate::{
    errors::{AnalysisError, ProviderError},
    parser,
    prompts::PromptSpec,
    providers::ai::ModelClient,
    schema::StructuredRecord,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Every stage asks for deterministic answers.
pub const STAGE_TEMPERATURE: f32 = 0.0;

/// The default per-call timeout for model and moderation invocations.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// The coarse state of a stage result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Parsed,
    FallbackRaw,
    Failed,
}

/// What a stage produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// A structured answer that satisfied the stage schema.
    Parsed(StructuredRecord),
    /// The verbatim plain-text answer of the retry after a schema violation.
    FallbackRaw(String),
    /// The stage could not produce an answer. Holds the reason.
    Failed(String),
}

/// The result of one stage invocation within one run.
#[derive(Debug, Clone, PartialEq)]
pub struct StageResult {
    pub stage_name: String,
    pub outcome: StageOutcome,
}

impl StageResult {
    pub fn parsed(stage_name: &str, record: StructuredRecord) -> Self {
        Self::new(stage_name, StageOutcome::Parsed(record))
    }

    pub fn fallback_raw(stage_name: &str, raw: impl Into<String>) -> Self {
        Self::new(stage_name, StageOutcome::FallbackRaw(raw.into()))
    }

    pub fn failed(stage_name: &str, reason: impl Into<String>) -> Self {
        Self::new(stage_name, StageOutcome::Failed(reason.into()))
    }

    fn new(stage_name: &str, outcome: StageOutcome) -> Self {
        Self {
            stage_name: stage_name.to_string(),
            outcome,
        }
    }

    pub fn status(&self) -> StageStatus {
        match self.outcome {
            StageOutcome::Parsed(_) => StageStatus::Parsed,
            StageOutcome::FallbackRaw(_) => StageStatus::FallbackRaw,
            StageOutcome::Failed(_) => StageStatus::Failed,
        }
    }

    /// The structured record, if the answer was parsed.
    pub fn record(&self) -> Option<&StructuredRecord> {
        match &self.outcome {
            StageOutcome::Parsed(record) => Some(record),
            _ => None,
        }
    }

    /// A single field of the structured record.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.record().and_then(|record| record.get(name))
    }

    /// The raw text, if the stage degraded to plain text.
    pub fn raw(&self) -> Option<&str> {
        match &self.outcome {
            StageOutcome::FallbackRaw(raw) => Some(raw),
            _ => None,
        }
    }

    /// The failure reason, if the stage failed.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            StageOutcome::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status() == StageStatus::Failed
    }
}

/// Bounds `call` by `timeout`, reporting an elapsed deadline as a provider timeout.
pub(crate) async fn with_timeout<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, ProviderError>>,
) -> Result<T, ProviderError> {
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(ProviderError::Timeout(timeout)))
}

/// One executable stage: a prompt definition plus the per-call timeout.
#[derive(Debug, Clone)]
pub struct AnalysisStage {
    spec: PromptSpec,
    timeout: Duration,
}

impl AnalysisStage {
    pub fn new(spec: PromptSpec) -> Self {
        Self {
            spec,
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Sets the timeout applied to each model invocation of this stage.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Runs the stage against `model`.
    ///
    /// Issues one model call, or two when the first answer violates the schema and the
    /// plain-text retry kicks in. Never returns an error: every failure is captured in the
    /// returned `StageResult`.
    pub async fn run(
        &self,
        inputs: &HashMap<String, String>,
        model: &dyn ModelClient,
    ) -> StageResult {
        let name = self.name();
        let prompt = match self.spec.render(inputs) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(stage = name, "Failed to render prompt: {e}");
                return StageResult::failed(name, e.to_string());
            }
        };
        debug!(stage = name, prompt = %prompt, "--> Sending stage prompt to model");

        let schema = &self.spec.output_schema;
        let raw = match with_timeout(
            self.timeout,
            model.complete(&prompt, STAGE_TEMPERATURE, Some(schema)),
        )
        .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(stage = name, "Model call failed: {e}");
                return StageResult::failed(name, AnalysisError::from(e).to_string());
            }
        };
        debug!(stage = name, raw = %raw, "<-- Model answer received");

        match parser::decode(&raw, schema) {
            Ok(record) => StageResult::parsed(name, record),
            Err(violation) => {
                warn!(
                    stage = name,
                    "{violation}. Retrying once and keeping the answer as plain text."
                );
                self.retry_as_plain_text(&prompt, model).await
            }
        }
    }

    async fn retry_as_plain_text(&self, prompt: &str, model: &dyn ModelClient) -> StageResult {
        let name = self.name();
        match with_timeout(self.timeout, model.complete(prompt, STAGE_TEMPERATURE, None)).await {
            Ok(raw) => {
                debug!(stage = name, raw = %raw, "<-- Plain-text answer received");
                StageResult::fallback_raw(name, raw)
            }
            Err(e) => {
                warn!(stage = name, "Plain-text retry failed: {e}");
                StageResult::failed(name, AnalysisError::from(e).to_string())
            }
        }
    }
}

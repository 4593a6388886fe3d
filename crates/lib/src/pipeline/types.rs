//! # Pipeline Types
//!
//! The analysis graph description and the aggregate root of one run.

use crate::{
    prompts::catalog::{
        CLASSIFICATION, CLASSIFIER, DETECTOR, EXPLANATION, RIGHT_WING_RATER, VALIDATOR,
    },
    providers::moderation::ModerationResult,
    stage::{StageOutcome, StageResult},
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// An edge of the analysis graph: the downstream stage consumes `bindings` from `upstream`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub upstream: String,
    /// Pairs of (upstream record field, downstream prompt input).
    pub bindings: Vec<(String, String)>,
}

impl Dependency {
    pub fn new(upstream: &str, bindings: &[(&str, &str)]) -> Self {
        Self {
            upstream: upstream.to_string(),
            bindings: bindings
                .iter()
                .map(|(field, input)| (field.to_string(), input.to_string()))
                .collect(),
        }
    }

    /// Maps the upstream result onto downstream prompt inputs.
    ///
    /// A parsed upstream contributes its fields. An upstream that fell back to plain text
    /// contributes its raw text to every bound input. Failed upstreams contribute nothing.
    pub fn resolve(&self, upstream: &StageResult) -> HashMap<String, String> {
        match &upstream.outcome {
            StageOutcome::Parsed(record) => self
                .bindings
                .iter()
                .filter_map(|(field, input)| {
                    record.get(field).map(|value| (input.clone(), value_as_text(value)))
                })
                .collect(),
            StageOutcome::FallbackRaw(raw) => self
                .bindings
                .iter()
                .map(|(_, input)| (input.clone(), raw.clone()))
                .collect(),
            StageOutcome::Failed(_) => HashMap::new(),
        }
    }
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// A node of the analysis graph: a catalog stage and the stages it waits for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageNode {
    pub stage: String,
    pub dependencies: Vec<Dependency>,
}

impl StageNode {
    pub fn independent(stage: &str) -> Self {
        Self {
            stage: stage.to_string(),
            dependencies: Vec::new(),
        }
    }

    pub fn after(stage: &str, dependency: Dependency) -> Self {
        Self {
            stage: stage.to_string(),
            dependencies: vec![dependency],
        }
    }
}

/// The hate speech analysis graph. Only the validator waits: it re-evaluates the
/// detector's verdict.
pub fn standard_graph() -> Vec<StageNode> {
    vec![
        StageNode::independent(DETECTOR),
        StageNode::after(
            VALIDATOR,
            Dependency::new(
                DETECTOR,
                &[(CLASSIFICATION, CLASSIFICATION), (EXPLANATION, EXPLANATION)],
            ),
        ),
        StageNode::independent(CLASSIFIER),
        StageNode::independent(RIGHT_WING_RATER),
    ]
}

/// What the moderation call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ModerationOutcome {
    Completed(ModerationResult),
    Failed(String),
}

impl ModerationOutcome {
    pub fn result(&self) -> Option<&ModerationResult> {
        match self {
            ModerationOutcome::Completed(result) => Some(result),
            ModerationOutcome::Failed(_) => None,
        }
    }
}

/// The aggregate root of one analysed message. Complete once all five slots are set.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRun {
    pub run_id: Uuid,
    pub input_message: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Whether the caller cancelled the run before it completed.
    pub cancelled: bool,
    pub moderation_result: ModerationOutcome,
    pub detection_result: StageResult,
    pub validation_result: StageResult,
    pub classification_result: StageResult,
    pub right_wing_result: StageResult,
}

/// The slots of a run while it is being filled. Each branch writes one disjoint slot.
#[derive(Debug, Default)]
pub(crate) struct RunSlots {
    pub moderation: Option<ModerationOutcome>,
    pub stages: HashMap<String, StageResult>,
}

impl RunSlots {
    /// Seals the slots into a complete run. Unfilled slots become `Failed` with `reason`.
    pub fn complete(
        mut self,
        run_id: Uuid,
        input_message: &str,
        started_at: DateTime<Utc>,
        cancelled: bool,
        reason: &str,
    ) -> AnalysisRun {
        let mut take = |name: &str| {
            self.stages
                .remove(name)
                .unwrap_or_else(|| StageResult::failed(name, reason))
        };
        let detection_result = take(DETECTOR);
        let validation_result = take(VALIDATOR);
        let classification_result = take(CLASSIFIER);
        let right_wing_result = take(RIGHT_WING_RATER);

        AnalysisRun {
            run_id,
            input_message: input_message.to_string(),
            started_at,
            finished_at: Utc::now(),
            cancelled,
            moderation_result: self
                .moderation
                .unwrap_or_else(|| ModerationOutcome::Failed(reason.to_string())),
            detection_result,
            validation_result,
            classification_result,
            right_wing_result,
        }
    }
}

//! # Result Aggregator
//!
//! Folds a complete `AnalysisRun` into a `Report`: one entry per stage, keyed by stage
//! name, each carrying either the verdict or a visible failure marker.

use crate::{
    pipeline::{AnalysisRun, ModerationOutcome},
    providers::moderation::ModerationResult,
    schema::StructuredRecord,
    stage::{StageOutcome, StageResult, StageStatus},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The report entry of one analysis stage.
///
/// Serialized with a `status` tag. Parsed entries carry the record fields inline, so a
/// verdict reads as `detection.validator.classification`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportEntry {
    Parsed(StructuredRecord),
    FallbackRaw { raw: String },
    Failed { error: String },
}

impl ReportEntry {
    pub fn status(&self) -> StageStatus {
        match self {
            ReportEntry::Parsed(_) => StageStatus::Parsed,
            ReportEntry::FallbackRaw { .. } => StageStatus::FallbackRaw,
            ReportEntry::Failed { .. } => StageStatus::Failed,
        }
    }

    /// A field of a parsed entry.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            ReportEntry::Parsed(record) => record.get(name),
            _ => None,
        }
    }
}

impl From<&StageResult> for ReportEntry {
    fn from(result: &StageResult) -> Self {
        match &result.outcome {
            StageOutcome::Parsed(record) => ReportEntry::Parsed(record.clone()),
            StageOutcome::FallbackRaw(raw) => ReportEntry::FallbackRaw { raw: raw.clone() },
            StageOutcome::Failed(error) => ReportEntry::Failed {
                error: error.clone(),
            },
        }
    }
}

/// The report entry of the moderation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModeratorEntry {
    Completed(ModerationResult),
    Failed { error: String },
}

impl ModeratorEntry {
    pub fn result(&self) -> Option<&ModerationResult> {
        match self {
            ModeratorEntry::Completed(result) => Some(result),
            ModeratorEntry::Failed { .. } => None,
        }
    }
}

/// The detect-then-validate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub detector: ReportEntry,
    pub validator: ReportEntry,
}

/// The aggregated, stage-keyed output of a complete run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub moderator: ModeratorEntry,
    pub detection: DetectionReport,
    pub classifier: ReportEntry,
    pub right_wing_rater: ReportEntry,
}

/// Builds the report of `run`. Pure: the same run always yields the same report.
pub fn aggregate(run: &AnalysisRun) -> Report {
    Report {
        moderator: match &run.moderation_result {
            ModerationOutcome::Completed(result) => ModeratorEntry::Completed(result.clone()),
            ModerationOutcome::Failed(error) => ModeratorEntry::Failed {
                error: error.clone(),
            },
        },
        detection: DetectionReport {
            detector: (&run.detection_result).into(),
            validator: (&run.validation_result).into(),
        },
        classifier: (&run.classification_result).into(),
        right_wing_rater: (&run.right_wing_result).into(),
    }
}

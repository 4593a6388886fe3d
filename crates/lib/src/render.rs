//! # Report Rendering
//!
//! Turns a `Report` into two plain-text tables for terminals: the flag table, one row per
//! tag with `●` for raised flags, and the explanation table, one row per stage.

use crate::{
    aggregator::{ModeratorEntry, Report, ReportEntry},
    schema::CLASSIFIER_FLAGS,
};
use comfy_table::{presets::ASCII_MARKDOWN, Table};
use serde_json::Value;

const RAISED: &str = "●";

pub const CLASSIFIER_SECTION: &str = "Hate Speech Classifier";
pub const RIGHT_WING_SECTION: &str = "Right Wing Rater";
pub const MODERATOR_SECTION: &str = "Moderator Results";

/// One row of the flag table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagRow {
    pub section: String,
    pub tag: String,
    pub evaluation: String,
}

/// One row of the explanation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanationRow {
    pub stage: String,
    pub classification: String,
    pub explanation: String,
}

fn evaluation(value: &Value) -> String {
    match value {
        Value::Bool(true) => RAISED.to_string(),
        Value::Bool(false) => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn marker(entry: &ReportEntry) -> Option<String> {
    match entry {
        ReportEntry::Parsed(_) => None,
        ReportEntry::FallbackRaw { .. } => Some("fallback_raw".to_string()),
        ReportEntry::Failed { error } => Some(format!("failed: {error}")),
    }
}

fn row(section: &str, tag: &str, evaluation: String) -> FlagRow {
    FlagRow {
        section: section.to_string(),
        tag: tag.to_string(),
        evaluation,
    }
}

fn entry_flags(section: &str, entry: &ReportEntry, tags: &[&str]) -> Vec<FlagRow> {
    if let Some(marker) = marker(entry) {
        return vec![row(section, "-", marker)];
    }
    tags.iter()
        .filter_map(|tag| entry.field(tag).map(|value| row(section, tag, evaluation(value))))
        .collect()
}

/// The flag rows of a report, sorted by section and tag.
pub fn flag_rows(report: &Report) -> Vec<FlagRow> {
    let mut rows = entry_flags(CLASSIFIER_SECTION, &report.classifier, CLASSIFIER_FLAGS);
    rows.extend(entry_flags(
        RIGHT_WING_SECTION,
        &report.right_wing_rater,
        &["right_wing_indicator"],
    ));
    match &report.moderator {
        ModeratorEntry::Completed(result) => rows.extend(
            result
                .categories
                .iter()
                .map(|(tag, raised)| row(MODERATOR_SECTION, tag, evaluation(&Value::Bool(*raised)))),
        ),
        ModeratorEntry::Failed { error } => {
            rows.push(row(MODERATOR_SECTION, "-", format!("failed: {error}")))
        }
    }
    rows.sort_by(|a, b| (&a.section, &a.tag).cmp(&(&b.section, &b.tag)));
    rows
}

fn explanation_row(stage: &str, entry: &ReportEntry, verdict_field: &str) -> ExplanationRow {
    let (classification, explanation) = match entry {
        ReportEntry::Parsed(record) => (
            record.get(verdict_field).map(evaluation).unwrap_or_default(),
            record.get("explanation").map(evaluation).unwrap_or_default(),
        ),
        ReportEntry::FallbackRaw { raw } => ("fallback_raw".to_string(), raw.clone()),
        ReportEntry::Failed { error } => ("failed".to_string(), error.clone()),
    };
    ExplanationRow {
        stage: stage.to_string(),
        classification,
        explanation,
    }
}

/// The explanation rows of a report, in pipeline order.
pub fn explanation_rows(report: &Report) -> Vec<ExplanationRow> {
    vec![
        explanation_row("detector", &report.detection.detector, "classification"),
        explanation_row("validator", &report.detection.validator, "classification"),
        explanation_row("classifier", &report.classifier, "classification"),
        explanation_row("right_wing_rater", &report.right_wing_rater, "rating"),
    ]
}

fn table(header: [&str; 3], rows: impl IntoIterator<Item = [String; 3]>) -> Table {
    let mut table = Table::new();
    table.load_preset(ASCII_MARKDOWN).set_header(header);
    for row in rows {
        table.add_row(row);
    }
    table
}

/// Renders both tables of `report`, separated by a blank line.
pub fn render_text(report: &Report) -> String {
    let flags = table(
        ["Section", "Tag", "Evaluation"],
        flag_rows(report)
            .into_iter()
            .map(|r| [r.section, r.tag, r.evaluation]),
    );
    let explanations = table(
        ["Stage", "Classification", "Explanation"],
        explanation_rows(report)
            .into_iter()
            .map(|r| [r.stage, r.classification, r.explanation.replace('\n', " ")]),
    );

    format!("{flags}\n\n{explanations}\n")
}

//! # Analysis Stage Tests
//!
//! Runs single stages against the mock model: structured parsing for every schema,
//! boolean coercion, and the plain-text fallback with its single retry.

mod common;

use crate::common::{
    setup_tracing, MockModelClient, Reply, CLASSIFICATION_ANSWER, CLASSIFIER_PROMPT,
    DETECTION_ANSWER, DETECTOR_PROMPT, RIGHT_WING_ANSWER, RIGHT_WING_PROMPT, VALIDATION_ANSWER,
    VALIDATOR_PROMPT,
};
use hatewatch::{
    prompts::catalog::{
        CLASSIFICATION, CLASSIFIER, DETECTOR, EXPLANATION, MESSAGE, RIGHT_WING_RATER, VALIDATOR,
    },
    AnalysisStage, PromptCatalog, StageOutcome, StageStatus,
};
use serde_json::{json, Value};
use std::collections::HashMap;

fn stage(name: &str) -> AnalysisStage {
    AnalysisStage::new(PromptCatalog::standard().get(name).unwrap().clone())
}

fn message_inputs(message: &str) -> HashMap<String, String> {
    HashMap::from([(MESSAGE.to_string(), message.to_string())])
}

fn validator_inputs() -> HashMap<String, String> {
    HashMap::from([
        (MESSAGE.to_string(), "You suck!".to_string()),
        (CLASSIFICATION.to_string(), "Direct hate speech".to_string()),
        (EXPLANATION.to_string(), "An insult.".to_string()),
    ])
}

/// Every schema parses a well-formed answer into a record equal to the answer.
#[tokio::test]
async fn test_well_formed_answers_parse_for_every_schema() {
    setup_tracing();
    let cases = [
        (DETECTOR, DETECTOR_PROMPT, DETECTION_ANSWER, message_inputs("You suck!")),
        (VALIDATOR, VALIDATOR_PROMPT, VALIDATION_ANSWER, validator_inputs()),
        (CLASSIFIER, CLASSIFIER_PROMPT, CLASSIFICATION_ANSWER, message_inputs("You suck!")),
        (RIGHT_WING_RATER, RIGHT_WING_PROMPT, RIGHT_WING_ANSWER, message_inputs("You suck!")),
    ];

    for (name, needle, answer, inputs) in cases {
        let model = MockModelClient::new().respond(needle, Reply::text(answer));
        let result = stage(name).run(&inputs, &model).await;

        assert_eq!(result.stage_name, name);
        assert_eq!(result.status(), StageStatus::Parsed, "stage '{name}'");
        let expected: Value = serde_json::from_str(answer).unwrap();
        assert_eq!(
            Value::Object(result.record().unwrap().clone()),
            expected,
            "stage '{name}'"
        );

        let calls = model.calls();
        assert_eq!(calls.len(), 1, "stage '{name}' must call the model once");
        assert!(calls[0].structured);
        assert_eq!(calls[0].temperature, 0.0);
    }
}

#[tokio::test]
async fn test_rendered_prompt_contains_inputs_and_format_instructions() {
    setup_tracing();
    let model = MockModelClient::new().respond(VALIDATOR_PROMPT, Reply::text(VALIDATION_ANSWER));
    stage(VALIDATOR).run(&validator_inputs(), &model).await;

    let prompt = &model.calls()[0].prompt;
    assert!(prompt.contains("Classification: Direct hate speech"));
    assert!(prompt.contains("Explanation: An insult."));
    assert!(prompt.contains("You suck!"));
    assert!(prompt.contains("\"classification\""));
}

/// Booleans answered as words are coerced; unknown words are kept verbatim.
#[tokio::test]
async fn test_boolean_words_are_coerced() {
    setup_tracing();
    let answer = r#"{
        "classification": "Offensive insult",
        "racism": "YES", "antisemitism": "no", "homophobia": "True", "ableism": "Wrong",
        "violence": "right", "sexism": "FALSE", "other_hate_speech": "somewhat",
        "explanation": "Mixed."
    }"#;
    let model = MockModelClient::new().respond(CLASSIFIER_PROMPT, Reply::text(answer));
    let result = stage(CLASSIFIER).run(&message_inputs("hi"), &model).await;

    assert_eq!(result.status(), StageStatus::Parsed);
    assert_eq!(result.field("racism"), Some(&json!(true)));
    assert_eq!(result.field("antisemitism"), Some(&json!(false)));
    assert_eq!(result.field("homophobia"), Some(&json!(true)));
    assert_eq!(result.field("ableism"), Some(&json!(false)));
    assert_eq!(result.field("violence"), Some(&json!(true)));
    assert_eq!(result.field("sexism"), Some(&json!(false)));
    assert_eq!(result.field("other_hate_speech"), Some(&json!("somewhat")));

    let answer = r#"{"right_wing_indicator": "yes", "rating": "3", "explanation": "Severe."}"#;
    let model = MockModelClient::new().respond(RIGHT_WING_PROMPT, Reply::text(answer));
    let result = stage(RIGHT_WING_RATER).run(&message_inputs("hi"), &model).await;
    assert_eq!(result.field("right_wing_indicator"), Some(&json!(true)));
}

/// A schema violation causes exactly one plain-text retry of the same prompt.
#[tokio::test]
async fn test_schema_violation_falls_back_to_plain_text() {
    setup_tracing();
    let model = MockModelClient::new()
        .respond(DETECTOR_PROMPT, Reply::text("This is clearly direct hate speech."))
        .respond_plain(DETECTOR_PROMPT, Reply::text("Direct hate speech, because it insults."));
    let result = stage(DETECTOR).run(&message_inputs("You suck!"), &model).await;

    assert_eq!(
        result.outcome,
        StageOutcome::FallbackRaw("Direct hate speech, because it insults.".to_string())
    );
    let calls = model.calls();
    assert_eq!(calls.len(), 2, "expected exactly one retry");
    assert!(calls[0].structured);
    assert!(!calls[1].structured);
    assert_eq!(calls[0].prompt, calls[1].prompt);
}

#[tokio::test]
async fn test_invalid_enum_value_falls_back() {
    setup_tracing();
    let answer = r#"{"right_wing_indicator": true, "rating": "7", "explanation": "Off the scale."}"#;
    let model = MockModelClient::new().respond(RIGHT_WING_PROMPT, Reply::text(answer));
    let result = stage(RIGHT_WING_RATER).run(&message_inputs("hi"), &model).await;

    assert_eq!(result.status(), StageStatus::FallbackRaw);
    assert_eq!(result.raw(), Some(answer));
}

#[tokio::test]
async fn test_failed_retry_marks_stage_failed() {
    setup_tracing();
    let model = MockModelClient::new()
        .respond(DETECTOR_PROMPT, Reply::text("not json"))
        .respond_plain(DETECTOR_PROMPT, Reply::Fail);
    let result = stage(DETECTOR).run(&message_inputs("hi"), &model).await;

    assert_eq!(result.status(), StageStatus::Failed);
    assert!(result.error().unwrap().contains("503"));
    assert_eq!(model.calls().len(), 2);
}

/// Provider failures are not retried.
#[tokio::test]
async fn test_provider_failure_is_not_retried() {
    setup_tracing();
    let model = MockModelClient::new().respond(CLASSIFIER_PROMPT, Reply::Fail);
    let result = stage(CLASSIFIER).run(&message_inputs("hi"), &model).await;

    assert_eq!(result.status(), StageStatus::Failed);
    assert_eq!(model.calls().len(), 1);
}

#[tokio::test]
async fn test_missing_input_fails_without_model_call() {
    setup_tracing();
    let model = MockModelClient::new().respond(VALIDATOR_PROMPT, Reply::text(VALIDATION_ANSWER));
    let result = stage(VALIDATOR).run(&message_inputs("hi"), &model).await;

    assert_eq!(result.status(), StageStatus::Failed);
    assert!(result.error().unwrap().contains("missing required input"));
    assert!(model.calls().is_empty());
}

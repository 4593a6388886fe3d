#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Mock model and moderation clients, so pipeline tests are isolated and repeatable.

use async_trait::async_trait;
use hatewatch::{
    schema::StructuredSchema, ModelClient, ModerationClient, ModerationResult, ProviderError,
};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber once for the test binary.
pub fn setup_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// Text unique to each stage prompt, used to route mock answers.
pub const DETECTOR_PROMPT: &str = "You are a hate speech expert";
pub const VALIDATOR_PROMPT: &str = "re-evaluating the classification";
pub const CLASSIFIER_PROMPT: &str = "categorize its content based on the listed categories";
pub const RIGHT_WING_PROMPT: &str = "broad spectrum of political ideologies";

/// What the mock answers to a matching prompt.
#[derive(Clone, Debug)]
pub enum Reply {
    Text(String),
    Fail,
}

impl Reply {
    pub fn text(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

#[derive(Clone, Debug)]
struct Rule {
    needle: String,
    structured: Reply,
    plain: Reply,
}

/// One recorded call of the mock model.
#[derive(Clone, Debug)]
pub struct MockCall {
    pub prompt: String,
    pub temperature: f32,
    pub structured: bool,
}

// --- Mock Model Client ---
#[derive(Clone, Debug, Default)]
pub struct MockModelClient {
    rules: Vec<Rule>,
    delays: Vec<(String, Duration)>,
    delay: Option<Duration>,
    pub call_history: Arc<Mutex<Vec<MockCall>>>,
}

impl MockModelClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers prompts whose first line contains `needle` with `reply`, structured or not.
    pub fn respond(mut self, needle: &str, reply: Reply) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            structured: reply.clone(),
            plain: reply,
        });
        self
    }

    /// Overrides the plain-text answer of the last rule matching `needle`.
    pub fn respond_plain(mut self, needle: &str, reply: Reply) -> Self {
        if let Some(rule) = self.rules.iter_mut().rev().find(|r| r.needle == needle) {
            rule.plain = reply;
        }
        self
    }

    /// Delays the answers to prompts containing `needle`.
    pub fn delay_for(mut self, needle: &str, delay: Duration) -> Self {
        self.delays.push((needle.to_string(), delay));
        self
    }

    /// Delays every answer not covered by `delay_for`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.call_history.lock().unwrap().clone()
    }

    /// Counts the calls whose prompt's first line contains `needle`.
    pub fn calls_to(&self, needle: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| template_head(&call.prompt).contains(needle))
            .count()
    }
}

/// The first line of a prompt. It belongs to the stage template, never to the message.
fn template_head(prompt: &str) -> &str {
    prompt.lines().next().unwrap_or_default()
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        response_format: Option<&StructuredSchema>,
    ) -> Result<String, ProviderError> {
        self.call_history.lock().unwrap().push(MockCall {
            prompt: prompt.to_string(),
            temperature,
            structured: response_format.is_some(),
        });

        let delay = self
            .delays
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, delay)| *delay)
            .or(self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let head = template_head(prompt);
        let rule = self.rules.iter().find(|r| head.contains(r.needle.as_str()));
        let reply = match rule {
            Some(rule) if response_format.is_some() => rule.structured.clone(),
            Some(rule) => rule.plain.clone(),
            None => Reply::Fail,
        };
        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Fail => Err(ProviderError::Api {
                status: 503,
                message: "mock provider unavailable".to_string(),
            }),
        }
    }
}

// --- Mock Moderation Client ---
#[derive(Clone, Debug)]
pub struct MockModerationClient {
    result: Option<ModerationResult>,
    delay: Option<Duration>,
    pub call_history: Arc<Mutex<Vec<String>>>,
}

impl MockModerationClient {
    pub fn returning(result: ModerationResult) -> Self {
        Self {
            result: Some(result),
            delay: None,
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: None,
            delay: None,
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.call_history.lock().unwrap().len()
    }
}

#[async_trait]
impl ModerationClient for MockModerationClient {
    async fn moderate(&self, text: &str) -> Result<ModerationResult, ProviderError> {
        self.call_history.lock().unwrap().push(text.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone().ok_or(ProviderError::Api {
            status: 500,
            message: "mock moderation unavailable".to_string(),
        })
    }
}

/// A moderation verdict that flags nothing but harassment.
pub fn harassment_only() -> ModerationResult {
    ModerationResult {
        flagged: false,
        categories: BTreeMap::from([
            ("harassment".to_string(), true),
            ("hate".to_string(), false),
            ("violence".to_string(), false),
        ]),
        category_scores: BTreeMap::from([
            ("harassment".to_string(), 0.25),
            ("hate".to_string(), 0.125),
            ("violence".to_string(), 0.0),
        ]),
    }
}

pub const DETECTION_ANSWER: &str =
    r#"{"explanation": "The author insults the reader directly.", "classification": "Direct hate speech"}"#;
pub const VALIDATION_ANSWER: &str =
    r#"{"classification": "Direct hate speech", "explanation": "I agree with the previous expert."}"#;
pub const CLASSIFICATION_ANSWER: &str = r#"{
    "classification": "Offensive insult",
    "racism": false, "antisemitism": false, "homophobia": false, "ableism": false,
    "violence": false, "sexism": false, "other_hate_speech": true,
    "explanation": "A generic insult."
}"#;
pub const RIGHT_WING_ANSWER: &str =
    r#"{"right_wing_indicator": false, "rating": "0", "explanation": "No political content."}"#;

/// A mock model answering every stage with a well-formed verdict.
pub fn well_behaved_model() -> MockModelClient {
    MockModelClient::new()
        .respond(DETECTOR_PROMPT, Reply::text(DETECTION_ANSWER))
        .respond(VALIDATOR_PROMPT, Reply::text(VALIDATION_ANSWER))
        .respond(CLASSIFIER_PROMPT, Reply::text(CLASSIFICATION_ANSWER))
        .respond(RIGHT_WING_PROMPT, Reply::text(RIGHT_WING_ANSWER))
}

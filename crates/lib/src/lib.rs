//! # Hate Speech Analysis Pipeline
//!
//! This crate analyses free-text messages for hate speech and right-wing extremist
//! rhetoric. A message is sent through four model-backed stages and a content moderation
//! call, concurrently where possible:
//!
//! - `detector` classifies the kind of hate speech and explains why.
//! - `validator` re-evaluates the detector's verdict (it waits for the detector).
//! - `classifier` assigns a main category and the hate speech subcategory flags.
//! - `right-wing-rater` rates right-wing ideology on a scale from 0 to 3.
//!
//! Each stage asks for a structured JSON answer shaped by a `StructuredSchema` and falls
//! back to plain text when the answer violates it. The results are folded into a
//! `Report` that marks, per stage, whether the verdict is structured, degraded, or failed.
//!
//! ```no_run
//! use hatewatch::{aggregate, factory, ModerationConfig, PipelineComposer, ProviderConfig};
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), hatewatch::ProviderError> {
//! let timeout = Duration::from_secs(60);
//! let model = factory::create_model_client(&ProviderConfig::default(), timeout)?;
//! let moderation = factory::create_moderation_client(&ModerationConfig::default(), timeout)?;
//! let composer = PipelineComposer::new(model, moderation).with_timeout(timeout);
//!
//! let run = composer.run_pipeline("You suck!").await;
//! let report = aggregate(&run);
//! println!("{}", serde_json::to_string_pretty(&report).unwrap());
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod errors;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod render;
pub mod schema;
pub mod stage;
pub mod types;

pub use aggregator::{aggregate, Report, ReportEntry};
pub use errors::{AnalysisError, ProviderError};
pub use pipeline::{AnalysisRun, ModerationOutcome, PipelineComposer};
pub use prompts::{PromptCatalog, PromptSpec};
pub use providers::{
    ai::ModelClient,
    factory,
    moderation::{ModerationClient, ModerationResult},
};
pub use schema::{StructuredRecord, StructuredSchema};
pub use stage::{AnalysisStage, StageOutcome, StageResult, StageStatus};
pub use types::{ModerationConfig, ProviderConfig};

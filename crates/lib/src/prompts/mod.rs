//! # Prompt Modules
//!
//! This module organizes the stage prompt templates and the catalog that binds each
//! template to its required inputs and output schema.

pub mod catalog;
pub mod templates;

pub use catalog::{PromptCatalog, PromptSpec};

//! # Providers
//!
//! The external collaborators of the analysis pipeline: language models and the
//! content moderation service, plus a factory that builds them from configuration.

pub mod ai;
pub mod factory;
pub mod moderation;

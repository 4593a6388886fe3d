//! # Prompt Catalog
//!
//! An immutable registry of analysis stage definitions. Each `PromptSpec` couples a
//! template with the inputs it requires and the schema its answer must follow.

use super::templates::{
    HATE_SPEECH_CLASSIFIER_PROMPT, HATE_SPEECH_DETECTOR_PROMPT, HATE_SPEECH_VALIDATOR_PROMPT,
    RIGHT_WING_RATER_PROMPT,
};
use crate::{
    errors::AnalysisError,
    schema::{self, StructuredSchema},
};
use regex::{Captures, Regex};
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

// --- Stage and input names ---

pub const DETECTOR: &str = "detector";
pub const VALIDATOR: &str = "validator";
pub const CLASSIFIER: &str = "classifier";
pub const RIGHT_WING_RATER: &str = "right-wing-rater";

pub const MESSAGE: &str = "message";
pub const CLASSIFICATION: &str = "classification";
pub const EXPLANATION: &str = "explanation";

/// The placeholder that receives the schema's format instructions.
pub const FORMAT_INSTRUCTIONS: &str = "format_instructions";

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").unwrap())
}

/// The definition of one analysis stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    pub name: String,
    pub template: String,
    pub required_inputs: BTreeSet<String>,
    pub output_schema: StructuredSchema,
}

impl PromptSpec {
    pub fn new(
        name: &str,
        template: &str,
        required_inputs: &[&str],
        output_schema: StructuredSchema,
    ) -> Self {
        Self {
            name: name.to_string(),
            template: template.to_string(),
            required_inputs: required_inputs.iter().map(|i| i.to_string()).collect(),
            output_schema,
        }
    }

    /// Returns every `{placeholder}` that appears in the template.
    pub fn placeholders(&self) -> BTreeSet<String> {
        placeholder_pattern()
            .captures_iter(&self.template)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    /// Renders the template with `inputs`.
    ///
    /// Every required input must be supplied. Substitution is a single pass over the
    /// template, so braces inside the supplied values are never expanded. The schema's
    /// format instructions are always part of the result: they replace
    /// `{format_instructions}`, or are appended if the template has no such placeholder.
    pub fn render(&self, inputs: &HashMap<String, String>) -> Result<String, AnalysisError> {
        if let Some(missing) = self
            .required_inputs
            .iter()
            .find(|input| !inputs.contains_key(*input))
        {
            return Err(AnalysisError::MissingInput {
                stage: self.name.clone(),
                placeholder: missing.clone(),
            });
        }

        let instructions = self.output_schema.format_instructions();
        let mut embedded = false;
        let rendered = placeholder_pattern().replace_all(&self.template, |caps: &Captures| {
            let key = &caps[1];
            if key == FORMAT_INSTRUCTIONS {
                embedded = true;
                return instructions.clone();
            }
            match inputs.get(key) {
                Some(value) if self.required_inputs.contains(key) => value.clone(),
                _ => caps[0].to_string(),
            }
        });

        let mut prompt = rendered.into_owned();
        if !embedded {
            prompt.push_str("\n\n");
            prompt.push_str(&instructions);
        }
        Ok(prompt)
    }
}

/// An immutable registry of `PromptSpec`s, keyed by stage name.
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    specs: HashMap<String, PromptSpec>,
}

impl PromptCatalog {
    /// Builds a catalog from the given specs. A later spec with the same name replaces
    /// an earlier one.
    pub fn new(specs: Vec<PromptSpec>) -> Self {
        Self {
            specs: specs
                .into_iter()
                .map(|spec| (spec.name.clone(), spec))
                .collect(),
        }
    }

    /// The four stages of the hate speech analysis.
    pub fn standard() -> Self {
        Self::new(vec![
            PromptSpec::new(
                DETECTOR,
                HATE_SPEECH_DETECTOR_PROMPT,
                &[MESSAGE],
                schema::detection(),
            ),
            PromptSpec::new(
                VALIDATOR,
                HATE_SPEECH_VALIDATOR_PROMPT,
                &[CLASSIFICATION, EXPLANATION, MESSAGE],
                schema::validation(),
            ),
            PromptSpec::new(
                CLASSIFIER,
                HATE_SPEECH_CLASSIFIER_PROMPT,
                &[MESSAGE],
                schema::classification(),
            ),
            PromptSpec::new(
                RIGHT_WING_RATER,
                RIGHT_WING_RATER_PROMPT,
                &[MESSAGE],
                schema::right_wing_rating(),
            ),
        ])
    }

    /// Looks up a stage definition by name.
    pub fn get(&self, name: &str) -> Result<&PromptSpec, AnalysisError> {
        self.specs
            .get(name)
            .ok_or_else(|| AnalysisError::UnknownStage(name.to_string()))
    }

    /// Looks up a stage and renders its prompt with `inputs`.
    pub fn render(
        &self,
        name: &str,
        inputs: &HashMap<String, String>,
    ) -> Result<String, AnalysisError> {
        self.get(name)?.render(inputs)
    }

    /// The names of all registered stages, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.specs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

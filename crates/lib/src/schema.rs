//! # Structured Output Schemas
//!
//! A `StructuredSchema` is plain data: an ordered list of fields, each with a type and a
//! description. The same value drives both the format instructions embedded into a prompt
//! and the validation of the model's answer in the parser, so the two cannot drift apart.

use serde::Serialize;
use serde_json::{Map, Value};

/// A decoded, validated model answer. Keys follow the schema's field order.
pub type StructuredRecord = Map<String, Value>;

/// The hate speech categories shared by the detector and the validator.
pub const HATE_SPEECH_CATEGORIES: &[&str] = &[
    "Direct hate speech",
    "Indirect hate speech",
    "No hate speech",
    "Review needed",
    "Unknown",
];

/// The main categories of the hate speech classifier.
pub const CLASSIFIER_CATEGORIES: &[&str] = &[
    "Personal experience",
    "Historical reference",
    "Offensive insult",
];

/// The subcategory flags reported by the hate speech classifier.
pub const CLASSIFIER_FLAGS: &[&str] = &[
    "racism",
    "antisemitism",
    "homophobia",
    "ableism",
    "violence",
    "sexism",
    "other_hate_speech",
];

/// The right-wing rating scale, from no indication (0) to severe (3).
pub const RIGHT_WING_RATINGS: &[&str] = &["0", "1", "2", "3"];

/// The type of a single schema field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Boolean,
    /// A string restricted to one of the listed canonical values.
    Enum(Vec<String>),
}

impl FieldType {
    fn enumeration(values: &[&str]) -> Self {
        FieldType::Enum(values.iter().map(|v| v.to_string()).collect())
    }

    /// A short type hint used in the JSON example of the format instructions.
    fn placeholder(&self) -> String {
        match self {
            FieldType::String => "\"<string>\"".to_string(),
            FieldType::Boolean => "true | false".to_string(),
            FieldType::Enum(values) => format!("\"<one of: {}>\"", values.join(" | ")),
        }
    }
}

/// One named field of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub description: String,
}

impl FieldSpec {
    pub fn new(name: &str, field_type: FieldType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            description: description.to_string(),
        }
    }
}

/// An ordered set of fields describing the expected answer of a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredSchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl StructuredSchema {
    pub fn new(name: &str, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.to_string(),
            fields,
        }
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Renders the machine-readable format instructions for this schema.
    ///
    /// The text contains a JSON example object listing every field with its type,
    /// followed by the description of each field.
    pub fn format_instructions(&self) -> String {
        let example = self
            .fields
            .iter()
            .map(|f| format!("  \"{}\": {}", f.name, f.field_type.placeholder()))
            .collect::<Vec<_>>()
            .join(",\n");

        let descriptions = self
            .fields
            .iter()
            .map(|f| {
                let kind = match &f.field_type {
                    FieldType::String => "string".to_string(),
                    FieldType::Boolean => "boolean".to_string(),
                    FieldType::Enum(values) => format!(
                        "one of {}",
                        values
                            .iter()
                            .map(|v| format!("\"{v}\""))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                };
                format!("- `{}` ({kind}): {}", f.name, f.description)
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Return a single JSON object and nothing else: no Markdown, no prose before or after it. \
The object must contain exactly these fields:\n{{\n{example}\n}}\n\nField descriptions:\n{descriptions}"
        )
    }
}

// --- Concrete schemas ---

/// Schema of the `detector` stage.
pub fn detection() -> StructuredSchema {
    StructuredSchema::new(
        "detection",
        vec![
            FieldSpec::new(
                "explanation",
                FieldType::String,
                "A comprehensive explanation of your classification in three sentences.",
            ),
            FieldSpec::new(
                "classification",
                FieldType::enumeration(HATE_SPEECH_CATEGORIES),
                "The classification of the message with one of the given categories. Only use the exact same words inside the XML category tags.",
            ),
        ],
    )
}

/// Schema of the `validator` stage.
pub fn validation() -> StructuredSchema {
    StructuredSchema::new(
        "validation",
        vec![
            FieldSpec::new(
                "classification",
                FieldType::enumeration(HATE_SPEECH_CATEGORIES),
                "Your classification based on the opinion of the other expert.",
            ),
            FieldSpec::new(
                "explanation",
                FieldType::String,
                "Your explanation if you agree or disagree with the expert's opinion in three sentences.",
            ),
        ],
    )
}

/// Schema of the `classifier` stage.
pub fn classification() -> StructuredSchema {
    let mut fields = vec![FieldSpec::new(
        "classification",
        FieldType::enumeration(CLASSIFIER_CATEGORIES),
        "Categorize the message into the three main categories mentioned in the first step. Only use one category.",
    )];
    fields.extend(CLASSIFIER_FLAGS.iter().map(|flag| {
        let description = match *flag {
            "other_hate_speech" => {
                "If the message contains other hate speech set it to true, else to false.".to_string()
            }
            _ => format!(
                "If the content of the message applies to the subcategory `{}` set it to true, else to false.",
                capitalize(flag)
            ),
        };
        FieldSpec::new(flag, FieldType::Boolean, &description)
    }));
    fields.push(FieldSpec::new(
        "explanation",
        FieldType::String,
        "Provide a brief justification for each category you assign to the message, explaining how certain parts of the message meet the criteria for that category.",
    ));
    StructuredSchema::new("classification", fields)
}

/// Schema of the `right-wing-rater` stage.
pub fn right_wing_rating() -> StructuredSchema {
    StructuredSchema::new(
        "right_wing_rating",
        vec![
            FieldSpec::new(
                "right_wing_indicator",
                FieldType::Boolean,
                "If the content of the message applies to the first step set it to true, else to false.",
            ),
            FieldSpec::new(
                "rating",
                FieldType::enumeration(RIGHT_WING_RATINGS),
                "The right wing rating into the four categories. Use only one of the mentioned categories.",
            ),
            FieldSpec::new(
                "explanation",
                FieldType::String,
                "A comprehensive explanation of your rating.",
            ),
        ],
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

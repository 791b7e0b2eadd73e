use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Answers collected so far, keyed by question key.
pub type AnswerMap = Map<String, Value>;

/// Copies the answer object out of a JSON value; non-objects yield an empty map.
pub fn answers_from_value(value: &Value) -> AnswerMap {
    value.as_object().cloned().unwrap_or_default()
}

/// Whether the answer counts as "nothing entered" for required checks.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub question_key: String,
    pub message: String,
    pub code: String,
}

/// Outcome of validating a submission, including the outbound field mapping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub missing_required: Vec<String>,
    pub unknown_fields: Vec<String>,
    /// Visible, non-null answers keyed by question key.
    pub answers: AnswerMap,
    /// The same answers keyed by Airtable field id.
    pub fields: Map<String, Value>,
}

impl ValidationResult {
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|error| error.message.clone()).collect()
    }
}

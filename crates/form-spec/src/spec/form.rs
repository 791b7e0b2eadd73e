use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::question::QuestionSpec;

/// Form definition: metadata, the Airtable table it writes to, and its questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormSpec {
    /// Assigned by the store; empty for definitions that have not been saved.
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Empty when the form is not linked to an Airtable table.
    #[serde(default)]
    pub airtable_base_id: String,
    #[serde(default)]
    pub airtable_table_id: String,
    #[serde(default)]
    pub questions: Vec<QuestionSpec>,
}

impl FormSpec {
    pub fn question(&self, key: &str) -> Option<&QuestionSpec> {
        self.questions
            .iter()
            .find(|question| question.question_key == key)
    }
}

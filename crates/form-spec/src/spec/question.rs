use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::rules::RuleSet;

/// Input kinds a question can render as; each maps onto an Airtable field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum QuestionType {
    ShortText,
    LongText,
    SingleSelect,
    MultiSelect,
    Attachment,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::ShortText => "shortText",
            QuestionType::LongText => "longText",
            QuestionType::SingleSelect => "singleSelect",
            QuestionType::MultiSelect => "multiSelect",
            QuestionType::Attachment => "attachment",
        }
    }

    pub fn has_options(&self) -> bool {
        matches!(self, QuestionType::SingleSelect | QuestionType::MultiSelect)
    }
}

/// A single form question and the Airtable field it feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSpec {
    /// Key used in answer maps and referenced by conditions.
    pub question_key: String,
    pub airtable_field_id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_rules: Option<RuleSet>,
}

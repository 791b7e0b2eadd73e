use std::collections::BTreeSet;

use serde_json::Value;

use crate::answers::{AnswerMap, ValidationError, ValidationResult, is_blank};
use crate::spec::form::FormSpec;
use crate::spec::question::{QuestionSpec, QuestionType};
use crate::visibility::resolve_visibility;

/// Validates a submission and maps visible answers onto Airtable field ids.
///
/// Questions hidden by their rules are skipped entirely: they are neither
/// checked nor mapped, even when a stale value is still present in `answers`.
pub fn validate(spec: &FormSpec, answers: &AnswerMap) -> ValidationResult {
    let visibility = resolve_visibility(spec, answers);

    let mut result = ValidationResult::default();

    for question in &spec.questions {
        if !visibility
            .get(&question.question_key)
            .copied()
            .unwrap_or(true)
        {
            continue;
        }

        let value = answers.get(&question.question_key);
        if question.required && is_blank(value) {
            result.missing_required.push(question.question_key.clone());
            result.errors.push(base_error(
                question,
                format!("Question \"{}\" is required.", question.label),
                "required",
            ));
            continue;
        }

        let Some(value) = value.filter(|value| !value.is_null()) else {
            continue;
        };

        if let Some(error) = validate_value(question, value) {
            result.errors.push(error);
        }

        result
            .answers
            .insert(question.question_key.clone(), value.clone());
        result
            .fields
            .insert(question.airtable_field_id.clone(), value.clone());
    }

    let all_keys: BTreeSet<_> = spec
        .questions
        .iter()
        .map(|question| question.question_key.as_str())
        .collect();
    result.unknown_fields = answers
        .keys()
        .filter(|key| !all_keys.contains(key.as_str()))
        .cloned()
        .collect();

    result.valid = result.errors.is_empty();
    result
}

fn validate_value(question: &QuestionSpec, value: &Value) -> Option<ValidationError> {
    if !matches_type(question.kind, value) {
        return Some(base_error(
            question,
            format!(
                "Invalid value type for \"{}\": expected {}",
                question.label,
                expected_shape(question.kind)
            ),
            "type_mismatch",
        ));
    }

    match question.kind {
        QuestionType::SingleSelect => {
            if let Some(text) = value.as_str()
                && !text.is_empty()
                && !question.options.iter().any(|option| option == text)
            {
                return Some(base_error(
                    question,
                    format!(
                        "Invalid value for \"{}\". Must be one of: {}",
                        question.label,
                        question.options.join(", ")
                    ),
                    "invalid_option",
                ));
            }
        }
        QuestionType::MultiSelect => {
            let invalid: Vec<&str> = value
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
                .filter(|choice| !question.options.iter().any(|option| option == choice))
                .collect();
            if !invalid.is_empty() {
                return Some(base_error(
                    question,
                    format!(
                        "Invalid multi-select values for \"{}\": {}",
                        question.label,
                        invalid.join(", ")
                    ),
                    "invalid_option",
                ));
            }
        }
        QuestionType::ShortText | QuestionType::LongText | QuestionType::Attachment => {}
    }

    None
}

fn matches_type(kind: QuestionType, value: &Value) -> bool {
    match kind {
        QuestionType::ShortText | QuestionType::LongText | QuestionType::SingleSelect => {
            value.is_string()
        }
        QuestionType::MultiSelect => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
        QuestionType::Attachment => value.is_array(),
    }
}

fn expected_shape(kind: QuestionType) -> &'static str {
    match kind {
        QuestionType::ShortText | QuestionType::LongText | QuestionType::SingleSelect => "text",
        QuestionType::MultiSelect => "a list of options",
        QuestionType::Attachment => "a list of attachments",
    }
}

fn base_error(question: &QuestionSpec, message: String, code: &str) -> ValidationError {
    ValidationError {
        question_key: question.question_key.clone(),
        message,
        code: code.into(),
    }
}

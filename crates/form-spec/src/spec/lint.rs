use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::spec::form::FormSpec;

static BASE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^app[A-Za-z0-9]{14}$").expect("valid base id pattern"));
static TABLE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^tbl[A-Za-z0-9]{14}$").expect("valid table id pattern"));

/// Problems that make a form definition unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LintIssue {
    #[error("form title is empty")]
    EmptyTitle,
    #[error("'{0}' is not an Airtable base id (expected app + 14 characters)")]
    InvalidBaseId(String),
    #[error("'{0}' is not an Airtable table id (expected tbl + 14 characters)")]
    InvalidTableId(String),
    #[error("question #{index} has an empty key")]
    EmptyKey { index: usize },
    #[error("question key '{0}' is used more than once")]
    DuplicateKey(String),
    #[error("question '{0}' has an empty label")]
    EmptyLabel(String),
    #[error("question '{0}' is not mapped to an Airtable field")]
    MissingFieldId(String),
    #[error("select question '{0}' has no options")]
    MissingOptions(String),
    #[error("question '{question}' depends on unknown question '{target}'")]
    UnknownReference { question: String, target: String },
    #[error("question '{question}' depends on '{target}', which is not asked before it")]
    ForwardReference { question: String, target: String },
    #[error("question '{question}' uses unsupported operator '{operator}'")]
    UnknownOperator { question: String, operator: String },
}

impl LintIssue {
    pub fn code(&self) -> &'static str {
        match self {
            LintIssue::EmptyTitle => "empty_title",
            LintIssue::InvalidBaseId(_) => "invalid_base_id",
            LintIssue::InvalidTableId(_) => "invalid_table_id",
            LintIssue::EmptyKey { .. } => "empty_key",
            LintIssue::DuplicateKey(_) => "duplicate_key",
            LintIssue::EmptyLabel(_) => "empty_label",
            LintIssue::MissingFieldId(_) => "missing_field_id",
            LintIssue::MissingOptions(_) => "missing_options",
            LintIssue::UnknownReference { .. } => "unknown_reference",
            LintIssue::ForwardReference { .. } => "forward_reference",
            LintIssue::UnknownOperator { .. } => "unknown_operator",
        }
    }
}

/// Checks a form definition for structural problems.
///
/// Conditions may only reference questions declared earlier in the form: a
/// respondent fills questions in order, so a later answer cannot exist when the
/// guarded question is rendered.
pub fn lint(spec: &FormSpec) -> Vec<LintIssue> {
    let mut issues = Vec::new();

    if spec.title.trim().is_empty() {
        issues.push(LintIssue::EmptyTitle);
    }
    if !spec.airtable_base_id.is_empty() && !BASE_ID.is_match(&spec.airtable_base_id) {
        issues.push(LintIssue::InvalidBaseId(spec.airtable_base_id.clone()));
    }
    if !spec.airtable_table_id.is_empty() && !TABLE_ID.is_match(&spec.airtable_table_id) {
        issues.push(LintIssue::InvalidTableId(spec.airtable_table_id.clone()));
    }

    let positions: BTreeMap<&str, usize> = spec
        .questions
        .iter()
        .enumerate()
        .rev()
        .map(|(index, question)| (question.question_key.as_str(), index))
        .collect();
    let mut seen = BTreeSet::new();

    for (index, question) in spec.questions.iter().enumerate() {
        let key = question.question_key.as_str();
        if key.trim().is_empty() {
            issues.push(LintIssue::EmptyKey { index });
        } else if !seen.insert(key) {
            issues.push(LintIssue::DuplicateKey(key.to_string()));
        }
        if question.label.trim().is_empty() {
            issues.push(LintIssue::EmptyLabel(key.to_string()));
        }
        if question.airtable_field_id.trim().is_empty() {
            issues.push(LintIssue::MissingFieldId(key.to_string()));
        }
        if question.kind.has_options() && question.options.is_empty() {
            issues.push(LintIssue::MissingOptions(key.to_string()));
        }

        let Some(rules) = &question.conditional_rules else {
            continue;
        };
        for condition in &rules.conditions {
            if !condition.operator.is_known() {
                issues.push(LintIssue::UnknownOperator {
                    question: key.to_string(),
                    operator: condition.operator.to_string(),
                });
            }
            match positions.get(condition.question_key.as_str()) {
                None => issues.push(LintIssue::UnknownReference {
                    question: key.to_string(),
                    target: condition.question_key.clone(),
                }),
                Some(position) if *position >= index => {
                    issues.push(LintIssue::ForwardReference {
                        question: key.to_string(),
                        target: condition.question_key.clone(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    issues
}

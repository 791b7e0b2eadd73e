#![allow(missing_docs)]

pub mod answers;
pub mod render;
pub mod rules;
pub mod spec;
pub mod validate;
pub mod visibility;

pub use answers::{AnswerMap, ValidationError, ValidationResult, answers_from_value};
pub use render::{
    RenderPayload, RenderProgress, RenderQuestion, RenderStatus, build_render_payload,
    render_json_ui, render_text,
};
pub use rules::{Condition, Logic, Operator, RuleSet, evaluate_condition};
pub use spec::{FormSpec, LintIssue, QuestionSpec, QuestionType, lint};
pub use validate::validate;
pub use visibility::{VisibilityMap, resolve_visibility, should_show};

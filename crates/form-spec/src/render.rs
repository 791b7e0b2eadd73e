use serde_json::{Map, Value, json};

use crate::{
    answers::{AnswerMap, is_blank},
    rules::coerce_to_string,
    spec::{form::FormSpec, question::QuestionType},
    visibility::resolve_visibility,
};

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// A visible required question is still unanswered.
    NeedInput,
    /// Every visible required question has an answer.
    Complete,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Complete => "complete",
        }
    }
}

/// Progress counters over visible questions.
#[derive(Debug, Clone)]
pub struct RenderProgress {
    pub answered: usize,
    pub total: usize,
}

/// Describes a single question for render outputs.
#[derive(Debug, Clone)]
pub struct RenderQuestion {
    pub key: String,
    pub label: String,
    pub kind: QuestionType,
    pub required: bool,
    pub visible: bool,
    pub current_value: Option<Value>,
    pub options: Vec<String>,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub form_id: String,
    pub form_title: String,
    pub description: Option<String>,
    pub status: RenderStatus,
    pub next_question_key: Option<String>,
    pub progress: RenderProgress,
    pub questions: Vec<RenderQuestion>,
}

impl RenderPayload {
    pub fn visible_questions(&self) -> impl Iterator<Item = &RenderQuestion> {
        self.questions.iter().filter(|question| question.visible)
    }
}

/// Build the renderer payload from the form definition and in-progress answers.
///
/// Questions keep their declared order; hidden ones are listed with
/// `visible: false` so a client can drop them without re-evaluating rules.
pub fn build_render_payload(spec: &FormSpec, answers: &AnswerMap) -> RenderPayload {
    let visibility = resolve_visibility(spec, answers);

    let questions = spec
        .questions
        .iter()
        .map(|question| RenderQuestion {
            key: question.question_key.clone(),
            label: question.label.clone(),
            kind: question.kind,
            required: question.required,
            visible: visibility
                .get(&question.question_key)
                .copied()
                .unwrap_or(true),
            current_value: answers
                .get(&question.question_key)
                .filter(|value| !value.is_null())
                .cloned(),
            options: question.options.clone(),
        })
        .collect::<Vec<_>>();

    let total = questions.iter().filter(|question| question.visible).count();
    let answered = questions
        .iter()
        .filter(|question| question.visible && !is_blank(question.current_value.as_ref()))
        .count();
    let next_question_key = questions
        .iter()
        .find(|question| {
            question.visible && question.required && is_blank(question.current_value.as_ref())
        })
        .map(|question| question.key.clone());

    let status = if next_question_key.is_some() {
        RenderStatus::NeedInput
    } else {
        RenderStatus::Complete
    };

    RenderPayload {
        form_id: spec.id.clone(),
        form_title: spec.title.clone(),
        description: spec.description.clone(),
        status,
        next_question_key,
        progress: RenderProgress { answered, total },
        questions,
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let questions = payload
        .questions
        .iter()
        .map(|question| {
            let mut map = Map::new();
            map.insert("questionKey".into(), Value::String(question.key.clone()));
            map.insert("label".into(), Value::String(question.label.clone()));
            map.insert("type".into(), Value::String(question.kind.as_str().into()));
            map.insert("required".into(), Value::Bool(question.required));
            map.insert("visible".into(), Value::Bool(question.visible));
            if let Some(current_value) = &question.current_value {
                map.insert("currentValue".into(), current_value.clone());
            }
            if !question.options.is_empty() {
                map.insert(
                    "options".into(),
                    Value::Array(
                        question
                            .options
                            .iter()
                            .map(|option| Value::String(option.clone()))
                            .collect(),
                    ),
                );
            }
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "formId": payload.form_id,
        "title": payload.form_title,
        "description": payload.description,
        "status": payload.status.as_str(),
        "nextQuestionKey": payload.next_question_key,
        "progress": {
            "answered": payload.progress.answered,
            "total": payload.progress.total,
        },
        "questions": questions,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {}", payload.form_title));
    if let Some(description) = &payload.description {
        lines.push(description.clone());
    }
    lines.push(format!(
        "Status: {} ({}/{})",
        payload.status.as_str(),
        payload.progress.answered,
        payload.progress.total
    ));
    if let Some(next) = &payload.next_question_key {
        lines.push(format!("Next question: {}", next));
    }

    lines.push("Visible questions:".to_string());
    for question in payload.visible_questions() {
        let mut entry = format!(" - {} ({})", question.label, question.key);
        if question.required {
            entry.push_str(" *");
        }
        if let Some(current_value) = &question.current_value {
            entry.push_str(&format!(" = {}", coerce_to_string(current_value)));
        }
        lines.push(entry);
        if question.kind.has_options() {
            lines.push(format!("     options: {}", question.options.join(" | ")));
        }
    }

    lines.join("\n")
}

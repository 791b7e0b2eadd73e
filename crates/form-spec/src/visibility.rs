use crate::answers::AnswerMap;
use crate::rules::RuleSet;
use crate::spec::form::FormSpec;

pub type VisibilityMap = std::collections::BTreeMap<String, bool>;

/// Decides whether a question guarded by `rules` is shown for `answers`.
///
/// Absent rules, or rules without conditions, always show the question.
pub fn should_show(rules: Option<&RuleSet>, answers: &AnswerMap) -> bool {
    match rules {
        None => true,
        Some(rules) => rules.evaluate(answers),
    }
}

pub fn resolve_visibility(spec: &FormSpec, answers: &AnswerMap) -> VisibilityMap {
    let mut map = VisibilityMap::new();

    for question in &spec.questions {
        let visible = should_show(question.conditional_rules.as_ref(), answers);
        map.insert(question.question_key.clone(), visible);
    }

    map
}

use serde_json::{Value, json};

use form_spec::{
    AnswerMap, Condition, FormSpec, Logic, Operator, RuleSet, answers_from_value,
    evaluate_condition, resolve_visibility, should_show,
};

fn answers(value: Value) -> AnswerMap {
    answers_from_value(&value)
}

fn cond(key: &str, operator: &str, value: Value) -> Condition {
    Condition::new(key, Operator::from(operator), value)
}

fn role_plan_rules() -> RuleSet {
    serde_json::from_value(json!({
        "logic": "AND",
        "conditions": [
            { "questionKey": "role", "operator": "equals", "value": "admin" },
            { "questionKey": "plan", "operator": "notEquals", "value": "free" }
        ]
    }))
    .expect("rules")
}

#[test]
fn absent_or_empty_rules_always_show() {
    let samples = [json!({}), json!({ "role": "admin" }), json!({ "x": null })];
    for sample in samples {
        let answers = answers(sample);
        assert!(should_show(None, &answers));
        assert!(should_show(Some(&RuleSet::all(vec![])), &answers));
        assert!(should_show(Some(&RuleSet::any(vec![])), &answers));
    }
}

#[test]
fn and_requires_every_condition() {
    let c1 = cond("a", "equals", json!("x"));
    let c2 = cond("b", "equals", json!("y"));
    let rules = RuleSet::all(vec![c1.clone(), c2.clone()]);

    for (a, b) in [("x", "y"), ("x", "n"), ("n", "y"), ("n", "n")] {
        let answers = answers(json!({ "a": a, "b": b }));
        let expected = c1.evaluate(&answers) && c2.evaluate(&answers);
        assert_eq!(should_show(Some(&rules), &answers), expected, "a={a} b={b}");
    }
}

#[test]
fn or_requires_any_condition() {
    let c1 = cond("a", "equals", json!("x"));
    let c2 = cond("b", "equals", json!("y"));
    let rules = RuleSet::any(vec![c1.clone(), c2.clone()]);

    for (a, b) in [("x", "y"), ("x", "n"), ("n", "y"), ("n", "n")] {
        let answers = answers(json!({ "a": a, "b": b }));
        let expected = c1.evaluate(&answers) || c2.evaluate(&answers);
        assert_eq!(should_show(Some(&rules), &answers), expected, "a={a} b={b}");
    }
}

#[test]
fn missing_answer_never_satisfies_any_operator() {
    let empty = answers(json!({}));
    let null = answers(json!({ "age": null }));
    for operator in ["equals", "notEquals", "contains", "between"] {
        let condition = cond("age", operator, json!("18"));
        assert!(!condition.evaluate(&empty), "{operator} on missing answer");
        assert!(!condition.evaluate(&null), "{operator} on null answer");
    }
}

#[test]
fn not_equals_on_missing_answer_hides_under_and_but_not_or() {
    let missing = cond("age", "notEquals", json!("18"));
    let always = cond("name", "equals", json!("ada"));
    let answers = answers(json!({ "name": "ada" }));

    assert!(!should_show(
        Some(&RuleSet::all(vec![always.clone(), missing.clone()])),
        &answers
    ));
    assert!(should_show(Some(&RuleSet::any(vec![missing, always])), &answers));
}

#[test]
fn contains_matches_array_elements_exactly() {
    let letters = answers(json!({ "tags": ["a", "b"] }));
    assert!(cond("tags", "contains", json!("b")).evaluate(&letters));
    assert!(!cond("tags", "contains", json!("c")).evaluate(&letters));

    let words = answers(json!({ "tags": ["alpha", "beta"] }));
    assert!(!cond("tags", "contains", json!("alp")).evaluate(&words));
}

#[test]
fn contains_on_scalar_is_substring_match() {
    let answers = answers(json!({ "bio": "hello world", "zip": 90210 }));
    assert!(cond("bio", "contains", json!("wor")).evaluate(&answers));
    assert!(!cond("bio", "contains", json!("mars")).evaluate(&answers));
    assert!(cond("zip", "contains", json!("021")).evaluate(&answers));
}

#[test]
fn equals_is_strict_about_types() {
    let answers = answers(json!({ "age": "18", "count": 3 }));
    assert!(cond("age", "equals", json!("18")).evaluate(&answers));
    assert!(!cond("age", "equals", json!(18)).evaluate(&answers));
    assert!(cond("age", "notEquals", json!(18)).evaluate(&answers));
    assert!(cond("count", "equals", json!(3.0)).evaluate(&answers));
}

#[test]
fn unknown_operator_fails_closed() {
    let answers = answers(json!({ "age": "18" }));
    assert!(!evaluate_condition(
        answers.get("age"),
        &Operator::Unknown("greaterThan".into()),
        &json!("1")
    ));

    let rules = RuleSet::any(vec![cond("age", "greaterThan", json!("1"))]);
    assert!(!should_show(Some(&rules), &answers));
}

#[test]
fn reversing_conditions_keeps_the_result() {
    let conditions = vec![
        cond("role", "equals", json!("admin")),
        cond("plan", "notEquals", json!("free")),
        cond("tags", "contains", json!("beta")),
        cond("missing", "equals", json!("x")),
    ];
    let samples = [
        json!({}),
        json!({ "role": "admin", "plan": "pro", "tags": ["beta"], "missing": "x" }),
        json!({ "role": "member", "plan": "free" }),
        json!({ "role": "admin", "tags": ["news"] }),
    ];

    for logic in [Logic::And, Logic::Or] {
        let forward = RuleSet {
            logic,
            conditions: conditions.clone(),
        };
        let mut reversed = forward.clone();
        reversed.conditions.reverse();
        for sample in &samples {
            let answers = answers(sample.clone());
            assert_eq!(
                forward.evaluate(&answers),
                reversed.evaluate(&answers),
                "{logic:?} with {sample}"
            );
        }
    }
}

#[test]
fn role_and_plan_scenario() {
    let rules = role_plan_rules();
    assert!(should_show(
        Some(&rules),
        &answers(json!({ "role": "admin", "plan": "pro" }))
    ));
    assert!(!should_show(Some(&rules), &answers(json!({ "role": "admin" }))));
    assert!(!should_show(
        Some(&rules),
        &answers(json!({ "role": "admin", "plan": "free" }))
    ));
}

#[test]
fn evaluation_does_not_mutate_answers() {
    let rules = role_plan_rules();
    let answers = answers(json!({ "role": "admin", "plan": "pro" }));
    let snapshot = answers.clone();
    let _ = should_show(Some(&rules), &answers);
    assert_eq!(answers, snapshot);
}

#[test]
fn resolve_visibility_follows_question_rules() {
    let spec: FormSpec =
        serde_json::from_str(include_str!("fixtures/signup_form.json")).expect("form");
    let map = resolve_visibility(
        &spec,
        &answers(json!({ "role": "admin", "plan": "pro", "tags": ["news"] })),
    );

    assert_eq!(map.get("role"), Some(&true));
    assert_eq!(map.get("billing_contact"), Some(&true));
    assert_eq!(map.get("event_city"), Some(&false));

    let map = resolve_visibility(&spec, &answers(json!({ "plan": "enterprise" })));
    assert_eq!(map.get("billing_contact"), Some(&false));
    assert_eq!(map.get("event_city"), Some(&true));
}

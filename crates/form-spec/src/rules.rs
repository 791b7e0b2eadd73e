use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::answers::AnswerMap;

/// Comparison applied by a single [`Condition`].
///
/// Operators arrive as plain strings on the wire. Anything unrecognised is kept
/// verbatim in [`Operator::Unknown`] so a stored definition round-trips, and it
/// never satisfies a condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    Unknown(String),
}

impl Operator {
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "notEquals",
            Operator::Contains => "contains",
            Operator::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Operator::Unknown(_))
    }
}

impl From<String> for Operator {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "equals" => Operator::Equals,
            "notEquals" => Operator::NotEquals,
            "contains" => Operator::Contains,
            _ => Operator::Unknown(raw),
        }
    }
}

impl From<&str> for Operator {
    fn from(raw: &str) -> Self {
        Operator::from(raw.to_string())
    }
}

impl From<Operator> for String {
    fn from(operator: Operator) -> Self {
        match operator {
            Operator::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the conditions of a [`RuleSet`] are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum Logic {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

/// One atomic test against a previously collected answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub question_key: String,
    #[schemars(with = "String")]
    pub operator: Operator,
    pub value: Value,
}

impl Condition {
    pub fn new(question_key: impl Into<String>, operator: Operator, value: Value) -> Self {
        Self {
            question_key: question_key.into(),
            operator,
            value,
        }
    }

    /// Evaluates the condition against the answer stored under its key.
    pub fn evaluate(&self, answers: &AnswerMap) -> bool {
        evaluate_condition(answers.get(&self.question_key), &self.operator, &self.value)
    }
}

/// Conditions combined with AND/OR that decide whether a question is shown.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct RuleSet {
    #[serde(default)]
    pub logic: Logic,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl RuleSet {
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self {
            logic: Logic::And,
            conditions,
        }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Self {
            logic: Logic::Or,
            conditions,
        }
    }

    /// Folds the conditions with the rule set's logic, stopping at the first
    /// condition that decides the outcome.
    ///
    /// An empty rule set always evaluates to `true`.
    pub fn evaluate(&self, answers: &AnswerMap) -> bool {
        if self.conditions.is_empty() {
            return true;
        }

        let mut result = matches!(self.logic, Logic::And);
        for condition in &self.conditions {
            let matched = condition.evaluate(answers);
            match self.logic {
                Logic::And => {
                    result = result && matched;
                    if !result {
                        return false;
                    }
                }
                Logic::Or => {
                    result = result || matched;
                    if result {
                        return true;
                    }
                }
            }
        }
        result
    }
}

/// Tests one answer against an expected value.
///
/// A missing or null answer never satisfies a condition, `notEquals` included.
pub fn evaluate_condition(answer: Option<&Value>, operator: &Operator, expected: &Value) -> bool {
    let Some(answer) = answer.filter(|value| !value.is_null()) else {
        return false;
    };

    match operator {
        Operator::Equals => values_equal(answer, expected),
        Operator::NotEquals => !values_equal(answer, expected),
        Operator::Contains => match answer {
            Value::Array(items) => items.iter().any(|item| values_equal(item, expected)),
            scalar => coerce_to_string(scalar).contains(&coerce_to_string(expected)),
        },
        Operator::Unknown(_) => false,
    }
}

/// Structural equality where numbers compare by value (`1 == 1.0`).
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => left == right,
    }
}

/// String form used by `contains` on non-array answers.
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".into(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(num) => match num.as_f64() {
            Some(float) if num.is_f64() && float.fract() == 0.0 && float.abs() < 1e21 => {
                // Whole floats print without a fraction; larger ones keep exponent form.
                if float == 0.0 {
                    "0".into()
                } else {
                    format!("{float:.0}")
                }
            }
            _ => num.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => coerce_to_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_operator_round_trips() {
        let condition: Condition = serde_json::from_value(json!({
            "questionKey": "age",
            "operator": "greaterThan",
            "value": 18
        }))
        .expect("deserialize");
        assert_eq!(condition.operator, Operator::Unknown("greaterThan".into()));
        let back = serde_json::to_value(&condition).expect("serialize");
        assert_eq!(back["operator"], "greaterThan");
    }

    #[test]
    fn logic_defaults_to_and() {
        let rules: RuleSet = serde_json::from_value(json!({ "conditions": [] })).expect("rules");
        assert_eq!(rules.logic, Logic::And);
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(!values_equal(&json!("1"), &json!(1)));
    }

    #[test]
    fn coercion_matches_display_forms() {
        assert_eq!(coerce_to_string(&json!(2.0)), "2");
        assert_eq!(coerce_to_string(&json!(2.5)), "2.5");
        assert_eq!(coerce_to_string(&json!(true)), "true");
        assert_eq!(coerce_to_string(&json!(["a", null, 3])), "a,,3");
        assert_eq!(coerce_to_string(&json!({"k": 1})), "[object Object]");
    }

    #[test]
    fn large_whole_floats_keep_their_digits() {
        assert_eq!(coerce_to_string(&json!(1e20)), "100000000000000000000");
        assert_eq!(coerce_to_string(&json!(-0.0)), "0");
        assert!(!evaluate_condition(
            Some(&json!(1e20)),
            &Operator::Contains,
            &json!("922")
        ));
        assert!(evaluate_condition(
            Some(&json!(1e20)),
            &Operator::Contains,
            &json!("0000")
        ));
    }

    #[test]
    fn contains_on_number_uses_string_form() {
        assert!(evaluate_condition(
            Some(&json!(12345)),
            &Operator::Contains,
            &json!(234)
        ));
    }
}

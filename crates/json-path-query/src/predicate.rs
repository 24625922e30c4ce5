//! Predicate evaluation against candidate elements.
//!
//! Missing properties resolve to "undefined" (`None`) instead of failing, so a
//! predicate can always be evaluated: it either matches or it does not.

use crate::types::{ComparisonOperator, Operand, Predicate};
use serde_json::Value;
use std::cmp::Ordering;

/// Evaluate `predicate` against a single candidate `element`.
pub fn evaluate(predicate: &Predicate, element: &Value) -> bool {
    match predicate {
        Predicate::Comparison {
            operator,
            left,
            right,
        } => compare(*operator, resolve(left, element), resolve(right, element)),
        Predicate::And(left, right) => evaluate(left, element) && evaluate(right, element),
        Predicate::Not(inner) => !evaluate(inner, element),
        Predicate::Truthy(operand) => is_truthy(resolve(operand, element)),
    }
}

/// Field references only look at direct properties of the element.
fn resolve<'a>(operand: &'a Operand, element: &'a Value) -> Option<&'a Value> {
    match operand {
        Operand::Field(name) => element.as_object().and_then(|map| map.get(name)),
        Operand::Literal(value) => Some(value),
    }
}

fn compare(operator: ComparisonOperator, left: Option<&Value>, right: Option<&Value>) -> bool {
    let (Some(left), Some(right)) = (left, right) else {
        return operator == ComparisonOperator::NotEqual;
    };

    let ordering = if left.is_number() || right.is_number() {
        to_number(left).partial_cmp(&to_number(right))
    } else {
        match (left, right) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ if left == right => Some(Ordering::Equal),
            _ => None,
        }
    };

    match operator {
        ComparisonOperator::Equal => ordering == Some(Ordering::Equal),
        ComparisonOperator::NotEqual => ordering != Some(Ordering::Equal),
        ComparisonOperator::Less => ordering == Some(Ordering::Less),
        ComparisonOperator::LessEqual => {
            matches!(ordering, Some(Ordering::Less | Ordering::Equal))
        }
        ComparisonOperator::Greater => ordering == Some(Ordering::Greater),
        ComparisonOperator::GreaterEqual => {
            matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
        }
    }
}

/// Numeric view of a value; NaN when the value has none.
fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                f64::NAN
            } else {
                s.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Absent, `null`, `false`, `0` and `""` are falsy.
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

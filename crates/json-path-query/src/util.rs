//! Path stringification.

use crate::parser::NONE_SENTINEL;
use crate::types::{Anchor, Operand, ParsedPath, Predicate, QueryPath, Segment};
use std::fmt;

impl fmt::Display for QueryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.anchor {
            Anchor::Document => f.write_str("$")?,
            Anchor::EachElement => f.write_str("$[*]")?,
        }
        for segment in &self.segments {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ParsedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedPath::NoFields => f.write_str(NONE_SENTINEL),
            ParsedPath::Path(path) => write!(f, "{path}"),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Name(name) if is_identifier(name) => write!(f, ".{name}"),
            Segment::Name(name) => write!(f, "['{}']", escape_single_quoted(name)),
            Segment::Wildcard => f.write_str("[*]"),
            Segment::Names(names) => {
                let joined = names
                    .iter()
                    .map(|name| format!("'{}'", escape_single_quoted(name)))
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "[{joined}]")
            }
            Segment::Filter(predicate) => write!(f, "[?({predicate})]"),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Comparison {
                operator,
                left,
                right,
            } => write!(f, "{left}{}{right}", operator.as_str()),
            // `&&` folds to the left; a right-nested conjunction needs parentheses.
            Predicate::And(left, right) => match **right {
                Predicate::And(..) => write!(f, "{left} && ({right})"),
                _ => write!(f, "{left} && {right}"),
            },
            Predicate::Not(inner) => match **inner {
                Predicate::And(..) | Predicate::Comparison { .. } => write!(f, "!({inner})"),
                _ => write!(f, "!{inner}"),
            },
            Predicate::Truthy(operand) => write!(f, "{operand}"),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Field(name) if is_identifier(name) => write!(f, "@.{name}"),
            Operand::Field(name) => write!(f, "@['{}']", escape_single_quoted(name)),
            Operand::Literal(serde_json::Value::String(s)) => {
                write!(f, "'{}'", escape_single_quoted(s))
            }
            Operand::Literal(value) => write!(f, "{value}"),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '@')
}

fn escape_single_quoted(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

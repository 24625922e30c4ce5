//! Path expression types.

use serde_json::Value;

/// Where a path starts navigating from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// No prefix, or a bare `$`: navigate from the document itself.
    #[default]
    Document,
    /// `$[*]`: apply the remaining path to each element of a root array.
    EachElement,
}

/// A single traversal step.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Plain key: `.name`
    Name(String),
    /// Wildcard: `.*`, `[*]`
    Wildcard,
    /// Key list: `['id','href']`
    Names(Vec<String>),
    /// Predicate filter: `[?(@.size==300)]`
    Filter(Predicate),
}

/// Parsed path expression.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryPath {
    pub anchor: Anchor,
    pub segments: Vec<Segment>,
}

impl QueryPath {
    pub fn new(anchor: Anchor, segments: Vec<Segment>) -> Self {
        Self { anchor, segments }
    }

    /// Position of the first wildcard segment, if any.
    pub fn first_wildcard(&self) -> Option<usize> {
        self.segments
            .iter()
            .position(|segment| matches!(segment, Segment::Wildcard))
    }
}

/// Result of parsing a path string.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedPath {
    /// The reserved `none` token: keep no fields besides the implicit ones.
    NoFields,
    Path(QueryPath),
}

/// Boolean expression evaluated against a candidate array element.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `@.size == 300`
    Comparison {
        operator: ComparisonOperator,
        left: Operand,
        right: Operand,
    },
    /// `a && b`
    And(Box<Predicate>, Box<Predicate>),
    /// `!a`
    Not(Box<Predicate>),
    /// Bare operand: `@.size`
    Truthy(Operand),
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,        // ==
    NotEqual,     // !=
    Less,         // <
    LessEqual,    // <=
    Greater,      // >
    GreaterEqual, // >=
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::Less => "<",
            ComparisonOperator::LessEqual => "<=",
            ComparisonOperator::Greater => ">",
            ComparisonOperator::GreaterEqual => ">=",
        }
    }
}

/// Predicate operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Direct property of the candidate element: `@.name`
    Field(String),
    /// String, number or boolean literal.
    Literal(Value),
}

//! Operation descriptors.

use crate::error::QueryError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// One pipeline stage.
///
/// Serializes as `{"op": "fields" | "filter" | "sort", "path": ..., ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    /// Keep only the fields reached by `path` (plus the implicit ones).
    Fields { path: String },
    /// Keep the collection members matched by `path`, then paginate.
    Filter {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offset: Option<usize>,
    },
    /// Reorder a collection by the key `path` locates in each member.
    Sort {
        path: String,
        #[serde(default)]
        order: SortOrder,
    },
}

impl Operation {
    pub const KINDS: [&'static str; 3] = ["fields", "filter", "sort"];

    pub fn fields(path: impl Into<String>) -> Self {
        Operation::Fields { path: path.into() }
    }

    pub fn filter(path: impl Into<String>) -> Self {
        Operation::Filter {
            path: path.into(),
            limit: None,
            offset: None,
        }
    }

    pub fn sort(path: impl Into<String>, order: SortOrder) -> Self {
        Operation::Sort {
            path: path.into(),
            order,
        }
    }

    /// Set pagination on a `filter` descriptor; other kinds are returned as is.
    pub fn paginate(self, limit: Option<usize>, offset: Option<usize>) -> Self {
        match self {
            Operation::Filter { path, .. } => Operation::Filter {
                path,
                limit,
                offset,
            },
            other => other,
        }
    }

    /// The `op` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Fields { .. } => "fields",
            Operation::Filter { .. } => "filter",
            Operation::Sort { .. } => "sort",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Operation::Fields { path }
            | Operation::Filter { path, .. }
            | Operation::Sort { path, .. } => path,
        }
    }

    /// Decode a descriptor from its JSON form.
    ///
    /// An `op` tag outside `fields|filter|sort` is reported as
    /// [`QueryError::UnsupportedOperation`]; any other shape problem as
    /// [`QueryError::InvalidDescriptor`].
    pub fn from_json(value: &Value) -> Result<Self, QueryError> {
        let op = value
            .get("op")
            .ok_or_else(|| QueryError::InvalidDescriptor(format!("missing 'op' in {value}")))?;
        let Some(op) = op.as_str() else {
            return Err(QueryError::UnsupportedOperation(op.to_string()));
        };
        if !Self::KINDS.contains(&op) {
            return Err(QueryError::UnsupportedOperation(op.to_string()));
        }
        Operation::deserialize(value).map_err(|e| QueryError::InvalidDescriptor(e.to_string()))
    }
}

impl TryFrom<&Value> for Operation {
    type Error = QueryError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Operation::from_json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_all_kinds() {
        assert_eq!(
            Operation::from_json(&json!({"op": "fields", "path": "channel.name"})).unwrap(),
            Operation::fields("channel.name")
        );
        assert_eq!(
            Operation::from_json(&json!({
                "op": "filter",
                "path": "note[?(@.id>=2)]",
                "limit": 2,
                "offset": 1
            }))
            .unwrap(),
            Operation::filter("note[?(@.id>=2)]").paginate(Some(2), Some(1))
        );
        assert_eq!(
            Operation::from_json(&json!({"op": "sort", "path": "note[*].author", "order": "desc"}))
                .unwrap(),
            Operation::sort("note[*].author", SortOrder::Desc)
        );
        assert_eq!(
            Operation::from_json(&json!({"op": "sort", "path": "note[*].author"})).unwrap(),
            Operation::sort("note[*].author", SortOrder::Asc)
        );
    }

    #[test]
    fn serializes_with_op_tag() {
        assert_eq!(
            serde_json::to_value(Operation::filter("a[?(@.x)]").paginate(Some(1), None)).unwrap(),
            json!({"op": "filter", "path": "a[?(@.x)]", "limit": 1})
        );
        assert_eq!(
            serde_json::to_value(Operation::sort("a", SortOrder::Desc)).unwrap(),
            json!({"op": "sort", "path": "a", "order": "desc"})
        );
    }

    #[test]
    fn unknown_op_is_unsupported() {
        assert_eq!(
            Operation::from_json(&json!({"op": "group", "path": "note"})),
            Err(QueryError::UnsupportedOperation("group".into()))
        );
        assert_eq!(
            Operation::from_json(&json!({"op": 3, "path": "note"})),
            Err(QueryError::UnsupportedOperation("3".into()))
        );
    }

    #[test]
    fn malformed_descriptor_is_invalid() {
        assert!(matches!(
            Operation::from_json(&json!({"path": "note"})),
            Err(QueryError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            Operation::from_json(&json!({"op": "fields"})),
            Err(QueryError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            Operation::from_json(&json!({"op": "filter", "path": "a", "limit": -1})),
            Err(QueryError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            Operation::from_json(&json!({"op": "sort", "path": "a", "order": "up"})),
            Err(QueryError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn accessors() {
        let op = Operation::sort("note[*].author", SortOrder::Asc);
        assert_eq!(op.name(), "sort");
        assert_eq!(op.path(), "note[*].author");
        assert_eq!(
            Operation::fields("a").paginate(Some(1), Some(1)),
            Operation::fields("a")
        );
    }
}

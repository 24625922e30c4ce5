//! Engine configuration.

use crate::parser::NONE_SENTINEL;
use serde::{Deserialize, Serialize};

/// Options controlling projection behaviour.
///
/// Every field has a default, so a partial configuration document such as
/// `{"implicitFields": ["id"]}` deserializes cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryOptions {
    /// Root keys kept by every `fields` projection when present.
    pub implicit_fields: Vec<String>,
    /// Path token meaning "select no fields besides the implicit ones".
    pub none_sentinel: String,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            implicit_fields: vec!["id".to_string(), "href".to_string()],
            none_sentinel: NONE_SENTINEL.to_string(),
        }
    }
}

impl QueryOptions {
    pub fn with_implicit_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.implicit_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_none_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.none_sentinel = sentinel.into();
        self
    }
}

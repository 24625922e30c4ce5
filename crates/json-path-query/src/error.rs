use crate::parser::ParseError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Invalid path '{path}': {source}")]
    PathSyntax {
        path: String,
        #[source]
        source: ParseError,
    },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Invalid operation descriptor: {0}")]
    InvalidDescriptor(String),
}

impl QueryError {
    pub(crate) fn path_syntax(path: &str, source: ParseError) -> Self {
        QueryError::PathSyntax {
            path: path.to_string(),
            source,
        }
    }
}

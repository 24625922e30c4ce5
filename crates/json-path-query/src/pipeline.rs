//! Pipeline runner.

use crate::error::QueryError;
use crate::handlers::{apply_fields, apply_filter, apply_sort};
use crate::operation::{Operation, SortOrder};
use crate::options::QueryOptions;
use crate::parser::{ParseError, PathParser};
use crate::types::{ParsedPath, QueryPath};
use serde_json::Value;

/// Run `operations` against `document` with the default options.
pub fn query(document: &Value, operations: &[Operation]) -> Result<Value, QueryError> {
    QueryEngine::default().query(document, operations)
}

/// Run operations given as a JSON array of descriptors.
pub fn query_json(document: &Value, operations: &Value) -> Result<Value, QueryError> {
    QueryEngine::default().query_json(document, operations)
}

/// Query entry point carrying [`QueryOptions`].
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    options: QueryOptions,
}

impl QueryEngine {
    pub fn new(options: QueryOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Apply `operations` in order, feeding each stage's output to the next.
    ///
    /// The first failing stage aborts the pipeline; no partial result is
    /// returned.
    pub fn query(&self, document: &Value, operations: &[Operation]) -> Result<Value, QueryError> {
        let mut current: Option<Value> = None;

        for (index, operation) in operations.iter().enumerate() {
            let stage = Stage::compile(operation, &self.options).map_err(|e| {
                tracing::warn!(stage = index, op = operation.name(), error = %e, "aborting query");
                e
            })?;
            let input = current.as_ref().unwrap_or(document);
            current = Some(stage.run(index, input, &self.options));
        }

        Ok(current.unwrap_or_else(|| document.clone()))
    }

    /// Like [`QueryEngine::query`], decoding each descriptor when its stage is
    /// reached. An unknown `op` tag fails with
    /// [`QueryError::UnsupportedOperation`].
    pub fn query_json(&self, document: &Value, operations: &Value) -> Result<Value, QueryError> {
        let Some(descriptors) = operations.as_array() else {
            return Err(QueryError::InvalidDescriptor(format!(
                "expected an array of operations, got {operations}"
            )));
        };

        let mut current: Option<Value> = None;

        for (index, descriptor) in descriptors.iter().enumerate() {
            let stage = Operation::from_json(descriptor)
                .and_then(|operation| Stage::compile(&operation, &self.options))
                .map_err(|e| {
                    tracing::warn!(stage = index, error = %e, "aborting query");
                    e
                })?;
            let input = current.as_ref().unwrap_or(document);
            current = Some(stage.run(index, input, &self.options));
        }

        Ok(current.unwrap_or_else(|| document.clone()))
    }

    /// Parse every path of `operations` once, for replay over many documents.
    pub fn compile(&self, operations: &[Operation]) -> Result<Pipeline, QueryError> {
        Pipeline::compile_with(operations, self.options.clone())
    }
}

/// Operations with their paths already parsed.
///
/// Running a compiled pipeline cannot fail; replaying it against the same
/// document always yields the same result.
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<Stage>,
    options: QueryOptions,
}

impl Pipeline {
    pub fn compile(operations: &[Operation]) -> Result<Self, QueryError> {
        Self::compile_with(operations, QueryOptions::default())
    }

    pub fn compile_with(operations: &[Operation], options: QueryOptions) -> Result<Self, QueryError> {
        let stages = operations
            .iter()
            .map(|operation| Stage::compile(operation, &options))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { stages, options })
    }

    pub fn run(&self, document: &Value) -> Value {
        let mut current: Option<Value> = None;
        for (index, stage) in self.stages.iter().enumerate() {
            let input = current.as_ref().unwrap_or(document);
            current = Some(stage.run(index, input, &self.options));
        }
        current.unwrap_or_else(|| document.clone())
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[derive(Debug, Clone)]
enum Stage {
    Fields(ParsedPath),
    Filter {
        path: QueryPath,
        limit: Option<usize>,
        offset: Option<usize>,
    },
    Sort {
        path: QueryPath,
        order: SortOrder,
    },
}

impl Stage {
    fn compile(operation: &Operation, options: &QueryOptions) -> Result<Self, QueryError> {
        let raw = operation.path();
        let syntax = |e: ParseError| QueryError::path_syntax(raw, e);

        Ok(match operation {
            Operation::Fields { path } => Stage::Fields(
                PathParser::parse_with_sentinel(path, &options.none_sentinel).map_err(syntax)?,
            ),
            Operation::Filter {
                path,
                limit,
                offset,
            } => Stage::Filter {
                path: PathParser::parse_path(path).map_err(syntax)?,
                limit: *limit,
                offset: *offset,
            },
            Operation::Sort { path, order } => Stage::Sort {
                path: PathParser::parse_path(path).map_err(syntax)?,
                order: *order,
            },
        })
    }

    fn run(&self, index: usize, document: &Value, options: &QueryOptions) -> Value {
        let result = match self {
            Stage::Fields(path) => apply_fields(document, path, options),
            Stage::Filter {
                path,
                limit,
                offset,
            } => apply_filter(document, path, *limit, *offset),
            Stage::Sort { path, order } => apply_sort(document, path, *order),
        };
        tracing::debug!(
            stage = index,
            op = self.name(),
            path = %self.describe_path(options),
            size = result_size(&result),
            "stage done"
        );
        result
    }

    fn name(&self) -> &'static str {
        match self {
            Stage::Fields(_) => "fields",
            Stage::Filter { .. } => "filter",
            Stage::Sort { .. } => "sort",
        }
    }

    /// The stage path as written, with `NoFields` shown as the configured
    /// sentinel.
    fn describe_path(&self, options: &QueryOptions) -> String {
        match self {
            Stage::Fields(ParsedPath::NoFields) => options.none_sentinel.clone(),
            Stage::Fields(ParsedPath::Path(path)) => path.to_string(),
            Stage::Filter { path, .. } | Stage::Sort { path, .. } => path.to_string(),
        }
    }
}

fn result_size(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => 1,
    }
}

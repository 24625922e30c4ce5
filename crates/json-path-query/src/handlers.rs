//! The `fields`, `filter` and `sort` operation handlers.
//!
//! Each handler takes the current working document and returns the next one;
//! the input is never modified.

use crate::error::QueryError;
use crate::navigate::{project, select_first, select_value};
use crate::operation::SortOrder;
use crate::options::QueryOptions;
use crate::parser::PathParser;
use crate::types::{Anchor, ParsedPath, QueryPath, Segment};
use serde_json::Value;
use std::cmp::Ordering;

/// Project `document` onto `path`, keeping the implicit fields of `options`.
pub fn fields(document: &Value, path: &str, options: &QueryOptions) -> Result<Value, QueryError> {
    let parsed = PathParser::parse_with_sentinel(path, &options.none_sentinel)
        .map_err(|e| QueryError::path_syntax(path, e))?;
    Ok(apply_fields(document, &parsed, options))
}

/// Collect the members matched by `path`, skip `offset` of them and keep at
/// most `limit`. Always returns an array.
pub fn filter(
    document: &Value,
    path: &str,
    limit: Option<usize>,
    offset: Option<usize>,
) -> Result<Value, QueryError> {
    let parsed = PathParser::parse_path(path).map_err(|e| QueryError::path_syntax(path, e))?;
    Ok(apply_filter(document, &parsed, limit, offset))
}

/// Stable-sort the collection of `document` by the key `path` locates in each
/// member.
pub fn sort(document: &Value, path: &str, order: SortOrder) -> Result<Value, QueryError> {
    let parsed = PathParser::parse_path(path).map_err(|e| QueryError::path_syntax(path, e))?;
    Ok(apply_sort(document, &parsed, order))
}

pub(crate) fn apply_fields(document: &Value, path: &ParsedPath, options: &QueryOptions) -> Value {
    project(path, document, options)
}

pub(crate) fn apply_filter(
    document: &Value,
    path: &QueryPath,
    limit: Option<usize>,
    offset: Option<usize>,
) -> Value {
    // A single-valued path that lands on an array filters that array's members.
    let matches = match select_value(path, document) {
        Some(Value::Array(items)) => items,
        Some(value) => vec![value],
        None => Vec::new(),
    };
    let total = matches.len();

    let page: Vec<Value> = matches
        .into_iter()
        .skip(offset.unwrap_or(0))
        .take(limit.unwrap_or(usize::MAX))
        .collect();

    tracing::trace!(%path, total, kept = page.len(), "filter");
    Value::Array(page)
}

pub(crate) fn apply_sort(document: &Value, path: &QueryPath, order: SortOrder) -> Value {
    let (collection, key) = split_sort_path(path);
    match document {
        Value::Array(items) => Value::Array(sorted(items, key, order)),
        Value::Object(_) if !collection.is_empty() => sort_nested(document, collection, key, order),
        _ => {
            tracing::trace!(%path, "no collection to sort");
            document.clone()
        }
    }
}

/// Split a sort path into the collection it names and the key path within
/// each member: `note[*].author` is the `note` collection keyed by `author`.
fn split_sort_path(path: &QueryPath) -> (&[Segment], &[Segment]) {
    let segments = path.segments.as_slice();
    if path.anchor == Anchor::EachElement {
        return (&segments[..0], segments);
    }
    match path.first_wildcard() {
        Some(i) => (&segments[..i], &segments[i + 1..]),
        None => (&segments[..0], segments),
    }
}

fn sort_nested(node: &Value, collection: &[Segment], key: &[Segment], order: SortOrder) -> Value {
    match (collection.split_first(), node) {
        (None, Value::Array(items)) => Value::Array(sorted(items, key, order)),
        (Some((Segment::Name(name), rest)), Value::Object(map)) if map.contains_key(name) => {
            let mut map = map.clone();
            if let Some(child) = map.get_mut(name) {
                *child = sort_nested(child, rest, key, order);
            }
            Value::Object(map)
        }
        _ => node.clone(),
    }
}

fn sorted(items: &[Value], key: &[Segment], order: SortOrder) -> Vec<Value> {
    let mut keyed: Vec<(Option<&Value>, &Value)> = items
        .iter()
        .map(|item| (select_first(key, item), item))
        .collect();

    // `sort_by` is stable, so equal keys keep their input order in both
    // directions.
    keyed.sort_by(|(a, _), (b, _)| compare_keys(*a, *b, order));

    keyed.into_iter().map(|(_, item)| item.clone()).collect()
}

/// Missing keys sort after every present key, whatever the direction.
fn compare_keys(a: Option<&Value>, b: Option<&Value>, order: SortOrder) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ordering = compare_values(a, b);
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notes() -> Value {
        json!([
            {"id": "1", "author": "Wils"},
            {"id": "2", "author": "Xavy"},
            {"id": "3", "author": "Tekram"},
            {"id": "4", "author": "Tekram"},
            {"id": "5", "author": "Xavy"}
        ])
    }

    fn ids(value: &Value) -> Vec<&str> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["id"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn filter_paginates_after_matching() {
        let doc = json!({"note": notes()});
        let path = "note[?(@.id>=2)]";
        assert_eq!(ids(&filter(&doc, path, None, None).unwrap()), ["2", "3", "4", "5"]);
        assert_eq!(ids(&filter(&doc, path, Some(2), Some(1)).unwrap()), ["3", "4"]);
        assert_eq!(ids(&filter(&doc, path, Some(1), None).unwrap()), ["2"]);
        assert_eq!(ids(&filter(&doc, path, None, Some(3)).unwrap()), ["5"]);
        assert_eq!(filter(&doc, path, None, Some(4)).unwrap(), json!([]));
        assert_eq!(filter(&doc, path, Some(0), None).unwrap(), json!([]));
    }

    #[test]
    fn filter_always_returns_an_array() {
        let doc = json!({"note": notes(), "name": "x"});
        assert_eq!(filter(&doc, "missing[?(@.id)]", None, None).unwrap(), json!([]));
        assert_eq!(filter(&doc, "name", None, None).unwrap(), json!(["x"]));
        assert_eq!(filter(&doc, "missing", None, None).unwrap(), json!([]));
        assert_eq!(ids(&filter(&doc, "note", Some(1), None).unwrap()), ["1"]);
    }

    #[test]
    fn filter_reports_bad_paths() {
        let err = filter(&json!({}), "note[?(@.id>=2)", None, None).unwrap_err();
        assert!(matches!(err, QueryError::PathSyntax { ref path, .. } if path == "note[?(@.id>=2)"));
    }

    #[test]
    fn sort_working_array_by_member_key() {
        let asc = sort(&notes(), "note[*].author", SortOrder::Asc).unwrap();
        assert_eq!(ids(&asc), ["3", "4", "1", "2", "5"]);

        let desc = sort(&notes(), "note[*].author", SortOrder::Desc).unwrap();
        assert_eq!(ids(&desc), ["2", "5", "1", "3", "4"]);

        let relative = sort(&notes(), "$[*].author", SortOrder::Desc).unwrap();
        assert_eq!(relative, desc);
        let bare = sort(&notes(), "author", SortOrder::Desc).unwrap();
        assert_eq!(bare, desc);
    }

    #[test]
    fn sort_collection_inside_object() {
        let doc = json!({"id": "t", "note": notes()});
        let sorted = sort(&doc, "note[*].author", SortOrder::Asc).unwrap();
        assert_eq!(sorted["id"], json!("t"));
        assert_eq!(ids(&sorted["note"]), ["3", "4", "1", "2", "5"]);
        // The input is left untouched.
        assert_eq!(ids(&doc["note"]), ["1", "2", "3", "4", "5"]);

        let unchanged = sort(&doc, "missing[*].author", SortOrder::Asc).unwrap();
        assert_eq!(unchanged, doc);
    }

    #[test]
    fn sort_numbers_numerically_and_missing_last() {
        let doc = json!([
            {"id": "a", "size": 10},
            {"id": "b"},
            {"id": "c", "size": 9},
            {"id": "d", "size": 100}
        ]);
        assert_eq!(
            ids(&sort(&doc, "$[*].size", SortOrder::Asc).unwrap()),
            ["c", "a", "d", "b"]
        );
        assert_eq!(
            ids(&sort(&doc, "$[*].size", SortOrder::Desc).unwrap()),
            ["d", "a", "c", "b"]
        );
    }

    #[test]
    fn sort_scalars_by_value() {
        assert_eq!(
            sort(&json!([3, "b", 1, "a", null]), "$[*]", SortOrder::Asc).unwrap(),
            json!([null, 1, 3, "a", "b"])
        );
    }

    #[test]
    fn fields_honours_sentinel_option() {
        let doc = json!({"id": "1", "href": "/1", "name": "x"});
        let options = QueryOptions::default().with_none_sentinel("-");
        assert_eq!(
            fields(&doc, "-", &options).unwrap(),
            json!({"id": "1", "href": "/1"})
        );
        assert_eq!(
            fields(&doc, "none", &QueryOptions::default()).unwrap(),
            json!({"id": "1", "href": "/1"})
        );
        assert!(fields(&doc, "none", &options).unwrap().is_object());
    }
}

//! Document navigation.
//!
//! Two walks over the same parsed path:
//!
//! - *selection* collects the matched nodes in document order (used by
//!   `filter` and `sort`);
//! - *projection* rebuilds the ancestor structure of every match, keeping only
//!   the keys on the path taken plus the implicit passthrough keys (used by
//!   `fields`).

use crate::options::QueryOptions;
use crate::predicate::evaluate;
use crate::types::{Anchor, ParsedPath, QueryPath, Segment};
use serde_json::{Map, Value};

/// Nodes matched by a selection walk.
struct Selection<'a> {
    nodes: Vec<&'a Value>,
    /// Set once any step could yield more than one node.
    multi: bool,
}

/// Collect the nodes matched by `path`, in document order.
pub fn select<'a>(path: &QueryPath, document: &'a Value) -> Vec<&'a Value> {
    walk(path.anchor, &path.segments, document).nodes
}

/// Like [`select`], but shaped as a single value: the matched node itself when
/// the path never fans out, an array of matches otherwise, `None` when a
/// single-valued path hits a missing key.
pub fn select_value(path: &QueryPath, document: &Value) -> Option<Value> {
    let selection = walk(path.anchor, &path.segments, document);
    if selection.multi {
        Some(Value::Array(selection.nodes.into_iter().cloned().collect()))
    } else {
        selection.nodes.first().map(|node| (*node).clone())
    }
}

/// First node matched by `segments` walked from `element`.
pub(crate) fn select_first<'a>(segments: &[Segment], element: &'a Value) -> Option<&'a Value> {
    walk(Anchor::Document, segments, element)
        .nodes
        .into_iter()
        .next()
}

fn walk<'a>(anchor: Anchor, segments: &[Segment], document: &'a Value) -> Selection<'a> {
    let mut selection = match (anchor, document) {
        (Anchor::EachElement, Value::Array(items)) => Selection {
            nodes: items.iter().collect(),
            multi: true,
        },
        _ => Selection {
            nodes: vec![document],
            multi: false,
        },
    };

    for segment in segments {
        let nodes = std::mem::take(&mut selection.nodes);
        for node in nodes {
            if step(segment, node, &mut selection.nodes) {
                selection.multi = true;
            }
        }
    }

    selection
}

/// Apply one segment to `node`, pushing matches. Returns whether the segment
/// fans out.
fn step<'a>(segment: &Segment, node: &'a Value, out: &mut Vec<&'a Value>) -> bool {
    match segment {
        Segment::Name(name) => {
            if let Some(child) = node.as_object().and_then(|map| map.get(name)) {
                out.push(child);
            }
            false
        }
        Segment::Wildcard => {
            match node {
                Value::Object(map) => out.extend(map.values()),
                Value::Array(items) => out.extend(items.iter()),
                _ => {}
            }
            true
        }
        Segment::Names(names) => {
            match node {
                Value::Object(map) => pick_names(names, map, out),
                Value::Array(items) => {
                    for map in items.iter().filter_map(Value::as_object) {
                        pick_names(names, map, out);
                    }
                }
                _ => {}
            }
            true
        }
        Segment::Filter(predicate) => {
            match node {
                Value::Array(items) => {
                    out.extend(items.iter().filter(|item| evaluate(predicate, item)))
                }
                Value::Object(map) => {
                    out.extend(map.values().filter(|value| evaluate(predicate, value)))
                }
                _ => {}
            }
            true
        }
    }
}

fn pick_names<'a>(names: &[String], map: &'a Map<String, Value>, out: &mut Vec<&'a Value>) {
    out.extend(names.iter().filter_map(|name| map.get(name)));
}

/// Project `document` onto `path`.
///
/// Arrays are projected element by element, preserving order and length.
pub fn project(path: &ParsedPath, document: &Value, options: &QueryOptions) -> Value {
    match document {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| project_element(path, item, options))
                .collect(),
        ),
        _ => project_element(path, document, options),
    }
}

fn project_element(path: &ParsedPath, element: &Value, options: &QueryOptions) -> Value {
    let Value::Object(source) = element else {
        // Scalars carry no fields; a path can still select them whole (`$`).
        return match path {
            ParsedPath::Path(path) => reconstruct(element, &path.segments).unwrap_or(Value::Null),
            ParsedPath::NoFields => Value::Null,
        };
    };

    let mut out = Map::new();
    for key in &options.implicit_fields {
        if let Some(value) = source.get(key) {
            out.insert(key.clone(), value.clone());
        }
    }

    if let ParsedPath::Path(path) = path {
        match reconstruct(element, &path.segments) {
            Some(Value::Object(selected)) => out.extend(selected),
            _ => tracing::trace!(%path, "path reached nothing, keeping implicit fields only"),
        }
    }

    Value::Object(out)
}

/// Rebuild `node` keeping only what `segments` reaches. `None` means nothing
/// was reached and the parent should omit the key entirely.
fn reconstruct(node: &Value, segments: &[Segment]) -> Option<Value> {
    let Some((segment, rest)) = segments.split_first() else {
        return Some(node.clone());
    };

    match (segment, node) {
        // Keyed steps through an array apply to each element.
        (Segment::Name(_) | Segment::Names(_), Value::Array(items)) => Some(Value::Array(
            items
                .iter()
                .filter_map(|item| reconstruct(item, segments))
                .collect(),
        )),
        (Segment::Name(name), Value::Object(map)) => {
            let child = reconstruct(map.get(name)?, rest)?;
            let mut out = Map::new();
            out.insert(name.clone(), child);
            Some(Value::Object(out))
        }
        (Segment::Names(names), Value::Object(map)) => non_empty(
            names
                .iter()
                .filter_map(|name| Some((name.clone(), reconstruct(map.get(name)?, rest)?)))
                .collect(),
        ),
        (Segment::Wildcard, Value::Array(items)) => Some(Value::Array(
            items
                .iter()
                .filter_map(|item| reconstruct(item, rest))
                .collect(),
        )),
        (Segment::Wildcard, Value::Object(map)) => non_empty(
            map.iter()
                .filter_map(|(key, value)| Some((key.clone(), reconstruct(value, rest)?)))
                .collect(),
        ),
        (Segment::Filter(predicate), Value::Array(items)) => Some(Value::Array(
            items
                .iter()
                .filter(|item| evaluate(predicate, item))
                .filter_map(|item| reconstruct(item, rest))
                .collect(),
        )),
        (Segment::Filter(predicate), Value::Object(map)) => non_empty(
            map.iter()
                .filter(|(_, value)| evaluate(predicate, value))
                .filter_map(|(key, value)| Some((key.clone(), reconstruct(value, rest)?)))
                .collect(),
        ),
        _ => None,
    }
}

fn non_empty(map: Map<String, Value>) -> Option<Value> {
    if map.is_empty() {
        None
    } else {
        Some(Value::Object(map))
    }
}

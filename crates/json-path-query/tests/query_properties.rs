//! Property-based tests for the query pipeline.
//!
//! Covers pagination arithmetic, sort stability, and the projection
//! invariants (idempotence, allowed keys, `none` sentinel).

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use json_path_query::{query, Operation, SortOrder};

const KEYS: [&str; 6] = ["id", "href", "name", "status", "size", "author"];

/// Records tagged with their input position.
fn records_strategy() -> impl Strategy<Value = Vec<(u8, bool)>> {
    prop::collection::vec((0u8..4, any::<bool>()), 0..24)
}

fn records(input: &[(u8, bool)]) -> Vec<Value> {
    input
        .iter()
        .enumerate()
        .map(|(seq, (rank, keep))| json!({"seq": seq, "rank": rank, "keep": keep}))
        .collect()
}

/// Objects holding an arbitrary subset of `KEYS`.
fn resource_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(prop::sample::select(KEYS.to_vec()), "[a-z]{0,6}", 0..KEYS.len())
        .prop_map(|map| {
            Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k.to_string(), Value::String(v)))
                    .collect::<Map<String, Value>>(),
            )
        })
}

fn selection_strategy() -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(KEYS[2..].to_vec(), 1..=4)
}

fn seqs(value: &Value) -> Vec<u64> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["seq"].as_u64().unwrap())
        .collect()
}

proptest! {
    /// offset=o, limit=l yields S[o .. min(o + l, n)]
    #[test]
    fn prop_offset_limit_slices_matches(
        input in records_strategy(),
        offset in 0usize..30,
        limit in 0usize..30,
    ) {
        let document = json!({"items": records(&input)});
        let path = "items[?(@.keep==true)]";

        let all = query(&document, &[Operation::filter(path)]).unwrap();
        let all = all.as_array().unwrap();
        let n = all.len();

        let page = query(
            &document,
            &[Operation::filter(path).paginate(Some(limit), Some(offset))],
        )
        .unwrap();

        let expected: Vec<Value> = if offset >= n {
            Vec::new()
        } else {
            all[offset..(offset + limit).min(n)].to_vec()
        };
        prop_assert_eq!(page, Value::Array(expected));
    }

    /// Equal sort keys keep their input order in both directions.
    #[test]
    fn prop_sort_is_stable(input in records_strategy(), descending in any::<bool>()) {
        let order = if descending { SortOrder::Desc } else { SortOrder::Asc };
        let sorted = query(
            &Value::Array(records(&input)),
            &[Operation::sort("items[*].rank", order)],
        )
        .unwrap();

        let items = sorted.as_array().unwrap();
        prop_assert_eq!(items.len(), input.len());

        for pair in items.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let (ra, rb) = (a["rank"].as_u64().unwrap(), b["rank"].as_u64().unwrap());
            if descending {
                prop_assert!(ra >= rb);
            } else {
                prop_assert!(ra <= rb);
            }
            if ra == rb {
                prop_assert!(a["seq"].as_u64() < b["seq"].as_u64());
            }
        }

        let mut seen = seqs(&sorted);
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..input.len() as u64).collect::<Vec<_>>());
    }

    /// Projecting twice equals projecting once.
    #[test]
    fn prop_fields_is_idempotent(
        resources in prop::collection::vec(resource_strategy(), 0..6),
        selected in selection_strategy(),
    ) {
        let path = format!(
            "$[*][{}]",
            selected.iter().map(|k| format!("'{k}'")).collect::<Vec<_>>().join(",")
        );
        let document = Value::Array(resources);

        let once = query(&document, &[Operation::fields(path.as_str())]).unwrap();
        let twice = query(
            &document,
            &[Operation::fields(path.as_str()), Operation::fields(path.as_str())],
        )
        .unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Projection output holds only selected keys plus `id`/`href`.
    #[test]
    fn prop_fields_keeps_only_selected_keys(
        resource in resource_strategy(),
        selected in selection_strategy(),
    ) {
        let path = format!(
            "$[{}]",
            selected.iter().map(|k| format!("'{k}'")).collect::<Vec<_>>().join(",")
        );
        let projected = query(&resource, &[Operation::fields(path)]).unwrap();
        let source = resource.as_object().unwrap();

        for (key, value) in projected.as_object().unwrap() {
            prop_assert!(
                key == "id" || key == "href" || selected.contains(&key.as_str()),
                "unexpected key {}", key
            );
            prop_assert_eq!(Some(value), source.get(key));
        }
        for key in &selected {
            prop_assert_eq!(projected.get(*key).is_some(), source.contains_key(*key));
        }
    }

    /// `none` keeps exactly the `id`/`href` present on each root object.
    #[test]
    fn prop_none_keeps_id_and_href(resources in prop::collection::vec(resource_strategy(), 0..6)) {
        let document = Value::Array(resources.clone());
        let projected = query(&document, &[Operation::fields("none")]).unwrap();
        let projected = projected.as_array().unwrap();

        prop_assert_eq!(projected.len(), resources.len());
        for (out, source) in projected.iter().zip(&resources) {
            let mut expected = Map::new();
            for key in ["id", "href"] {
                if let Some(value) = source.get(key) {
                    expected.insert(key.to_string(), value.clone());
                }
            }
            prop_assert_eq!(out, &Value::Object(expected));
        }
    }
}

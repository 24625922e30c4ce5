//! Declarative JSON query pipelines.
//!
//! A query is an ordered list of [`Operation`]s applied to a JSON document:
//!
//! - `fields` projects the document onto a path, keeping the ancestor shape
//!   and the implicit `id`/`href` keys;
//! - `filter` selects collection members with a predicate and paginates them;
//! - `sort` stable-sorts a collection by a key found in each member.
//!
//! Paths are a small JSONPath-like language: dotted keys, `*` wildcards,
//! `['a','b']` key lists and `[?(...)]` predicates over `@.field` operands
//! with `==`, `!=`, `<`, `<=`, `>`, `>=`, `!` and `&&`.
//!
//! # Example
//!
//! ```
//! use json_path_query::{query, Operation, SortOrder};
//! use serde_json::json;
//!
//! let ticket = json!({
//!     "id": "3180",
//!     "href": "/troubleTicket/3180",
//!     "note": [
//!         {"id": "1", "author": "Mr John Wils"},
//!         {"id": "2", "author": "Mr Erika Xavy"},
//!         {"id": "3", "author": "Mr Redfin Tekram"}
//!     ]
//! });
//!
//! let result = query(
//!     &ticket,
//!     &[
//!         Operation::filter("note[?(@.id>=2)]"),
//!         Operation::sort("note[*].author", SortOrder::Asc),
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     result,
//!     json!([
//!         {"id": "2", "author": "Mr Erika Xavy"},
//!         {"id": "3", "author": "Mr Redfin Tekram"}
//!     ])
//! );
//! ```

mod types;
pub use types::*;

mod parser;
pub use parser::{ParseError, PathParser, MAX_PREDICATE_DEPTH, NONE_SENTINEL};

mod predicate;
pub use predicate::evaluate;

mod navigate;
pub use navigate::{project, select, select_value};

mod error;
pub use error::QueryError;

mod options;
pub use options::QueryOptions;

mod operation;
pub use operation::{Operation, SortOrder};

pub mod handlers;

mod pipeline;
pub use pipeline::{query, query_json, Pipeline, QueryEngine};

mod util;

//! JSON Patch (RFC 6902) application for heterogeneous object graphs.
//!
//! Applies `add`, `remove`, `replace`, `move`, `copy`, and `test`
//! operations to an in-memory [`Node`] graph, addressing targets with
//! RFC 6901 JSON Pointers instead of compile-time field access.
//!
//! A graph mixes four shapes freely — ordered sequences, keyed mappings,
//! dynamic property bags, and fixed-schema records — and the engine picks
//! the right accessor per node at every traversal step. Records are
//! described by [`RecordSchema`] metadata tables registered up front;
//! applying a patch through a narrower schema hides the members that
//! schema does not declare.
//!
//! # Example
//!
//! ```
//! use graft::{Node, PatchDocument};
//! use serde_json::json;
//!
//! let mut target = Node::from_json(&json!({"name": "Ada", "tags": ["x"]}));
//! let patch = PatchDocument::from_json_str(
//!     r#"[{"op": "add", "path": "/tags/-", "value": "y"},
//!         {"op": "replace", "path": "/name", "value": "Grace"}]"#,
//! )
//! .unwrap();
//! patch.apply_to(&mut target).unwrap();
//! assert_eq!(target.to_json(), json!({"name": "Grace", "tags": ["x", "y"]}));
//! ```

pub mod adapters;
pub mod convert;
pub mod document;
pub mod engine;
pub mod error;
pub mod node;
pub mod operation;
pub mod options;
pub mod schema;
mod visitor;

pub use document::PatchDocument;
pub use engine::{ObjectAdapter, ObjectAdapterWithTest, PatchEngine};
pub use error::{CollectingSink, ErrorKind, ErrorSink, PatchError, StrictSink};
pub use node::{Bag, Mapping, Node, Record, Sequence};
pub use operation::{Operation, OperationKind};
pub use options::{NamingPolicy, PatchOptions};
pub use schema::{FieldSchema, RecordSchema, SchemaError, TypeDesc};

pub use graft_json_pointer::{ParsedPath, PointerBuilder, PointerError};

//! The patch document: an ordered list of operations applied as a unit.

use std::io;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use graft_json_pointer::normalize_path;

use crate::engine::{ObjectAdapter, PatchEngine};
use crate::error::{ErrorSink, PatchError, StrictSink};
use crate::node::Node;
use crate::operation::Operation;
use crate::options::PatchOptions;
use crate::schema::TypeDesc;

/// An RFC 6902 patch document.
///
/// Operations apply strictly in order, and per the RFC no operation after
/// the first failed one is applied. Already-applied mutations are not
/// rolled back: atomicity here means "stop early", not "undo".
///
/// # Example
///
/// ```
/// use graft::{Node, PatchDocument};
/// use serde_json::json;
///
/// let mut target = Node::from_json(&json!({"tags": ["a"]}));
/// let patch = PatchDocument::new()
///     .add("/tags/-", json!("b"))
///     .unwrap();
/// patch.apply_to(&mut target).unwrap();
/// assert_eq!(target.to_json(), json!({"tags": ["a", "b"]}));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchDocument {
    pub operations: Vec<Operation>,
    options: PatchOptions,
}

impl PatchDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: PatchOptions) -> Self {
        Self {
            operations: Vec::new(),
            options,
        }
    }

    pub fn from_operations(operations: Vec<Operation>) -> Self {
        Self {
            operations,
            options: PatchOptions::default(),
        }
    }

    pub fn options(&self) -> &PatchOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: PatchOptions) {
        self.options = options;
    }

    // ── Fluent builders ───────────────────────────────────────────────────

    /// `{ "op": "add", "path": "/a/b/c", "value": ... }`
    pub fn add(mut self, path: &str, value: Value) -> Result<Self, PatchError> {
        let path = normalize(path)?;
        self.operations.push(Operation::new("add", path, None, Some(value)));
        Ok(self)
    }

    /// `{ "op": "remove", "path": "/a/b/c" }`
    pub fn remove(mut self, path: &str) -> Result<Self, PatchError> {
        let path = normalize(path)?;
        self.operations.push(Operation::new("remove", path, None, None));
        Ok(self)
    }

    /// `{ "op": "replace", "path": "/a/b/c", "value": ... }`
    pub fn replace(mut self, path: &str, value: Value) -> Result<Self, PatchError> {
        let path = normalize(path)?;
        self.operations
            .push(Operation::new("replace", path, None, Some(value)));
        Ok(self)
    }

    /// `{ "op": "move", "from": "/a/b/c", "path": "/a/b/d" }`
    pub fn move_(mut self, from: &str, path: &str) -> Result<Self, PatchError> {
        let from = normalize(from)?;
        let path = normalize(path)?;
        self.operations
            .push(Operation::new("move", path, Some(from), None));
        Ok(self)
    }

    /// `{ "op": "copy", "from": "/a/b/c", "path": "/a/b/e" }`
    pub fn copy(mut self, from: &str, path: &str) -> Result<Self, PatchError> {
        let from = normalize(from)?;
        let path = normalize(path)?;
        self.operations
            .push(Operation::new("copy", path, Some(from), None));
        Ok(self)
    }

    /// `{ "op": "test", "path": "/a/b/c", "value": ... }`
    pub fn test(mut self, path: &str, value: Value) -> Result<Self, PatchError> {
        let path = normalize(path)?;
        self.operations
            .push(Operation::new("test", path, None, Some(value)));
        Ok(self)
    }

    // ── Application ───────────────────────────────────────────────────────

    /// Apply with the strict sink: the first failure is returned.
    pub fn apply_to(&self, target: &mut Node) -> Result<(), PatchError> {
        self.apply_to_with(target, &mut StrictSink)
    }

    /// Apply, routing recoverable failures to `sink`. The target is viewed
    /// through its own runtime type.
    pub fn apply_to_with(
        &self,
        target: &mut Node,
        sink: &mut dyn ErrorSink,
    ) -> Result<(), PatchError> {
        let declared = target.runtime_type();
        self.apply_to_as(target, &declared, sink)
    }

    /// Apply, viewing the target through a caller-declared type. Passing a
    /// narrower record schema restricts which members the patch can see.
    pub fn apply_to_as(
        &self,
        target: &mut Node,
        declared: &TypeDesc,
        sink: &mut dyn ErrorSink,
    ) -> Result<(), PatchError> {
        let engine = PatchEngine::new(self.options.clone());
        self.apply_with_adapter(target, declared, &engine, sink)
    }

    /// Apply through a caller-supplied engine.
    ///
    /// Recoverable failures go to the sink and truncate the rest of the
    /// document whether or not the sink propagates them; fatal failures
    /// (contract violations, invalid path syntax) bypass the sink.
    pub fn apply_with_adapter(
        &self,
        target: &mut Node,
        declared: &TypeDesc,
        adapter: &dyn ObjectAdapter,
        sink: &mut dyn ErrorSink,
    ) -> Result<(), PatchError> {
        for operation in &self.operations {
            if let Err(error) = operation.apply(target, declared, adapter) {
                if error.kind.is_fatal() {
                    return Err(error);
                }
                sink.report(error)?;
                break;
            }
        }
        Ok(())
    }

    // ── Wire codec ────────────────────────────────────────────────────────

    /// Parse a document from RFC 6902 wire text (a JSON array of
    /// operations).
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Parse a document incrementally from a reader.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// Render the document as RFC 6902 wire text.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// On the wire a document is the bare operations array.
impl Serialize for PatchDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.operations.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PatchDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Operation>::deserialize(deserializer).map(Self::from_operations)
    }
}

fn normalize(path: &str) -> Result<String, PatchError> {
    normalize_path(path).map_err(|e| PatchError::bad_path(e.to_string()))
}

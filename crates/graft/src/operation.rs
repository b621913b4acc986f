//! Patch operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::{ObjectAdapter, ObjectAdapterWithTest as _};
use crate::error::PatchError;
use crate::node::Node;
use crate::schema::TypeDesc;

/// The six RFC 6902 operation kinds, plus `Invalid` for anything the wire
/// carried that is not one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
    Invalid,
}

impl OperationKind {
    /// Parse an op string, case-insensitively. Unrecognized strings map to
    /// `Invalid` rather than failing — bad kinds only surface when the
    /// operation is applied.
    pub fn parse(op: &str) -> Self {
        match op.to_ascii_lowercase().as_str() {
            "add" => OperationKind::Add,
            "remove" => OperationKind::Remove,
            "replace" => OperationKind::Replace,
            "move" => OperationKind::Move,
            "copy" => OperationKind::Copy,
            "test" => OperationKind::Test,
            _ => OperationKind::Invalid,
        }
    }
}

/// A single patch operation in RFC 6902 wire shape.
///
/// `op` is kept as the raw wire string; [`kind`](Operation::kind) derives
/// the [`OperationKind`]. `from` is only meaningful for move/copy, `value`
/// for add/replace/test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub op: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Operation {
    pub fn new(
        op: impl Into<String>,
        path: impl Into<String>,
        from: Option<String>,
        value: Option<Value>,
    ) -> Self {
        Self {
            op: op.into(),
            path: path.into(),
            from,
            value,
        }
    }

    pub fn kind(&self) -> OperationKind {
        OperationKind::parse(&self.op)
    }

    /// The operation's value as a graph node; a missing value reads as
    /// null.
    pub(crate) fn value_node(&self) -> Node {
        self.value.as_ref().map(Node::from_json).unwrap_or(Node::Null)
    }

    /// Apply this operation to `target`, viewed through `declared`, using
    /// the given engine.
    ///
    /// `test` requires an engine exposing the test capability; applying it
    /// through one that does not is a contract violation, as is applying
    /// an operation whose kind is `Invalid`.
    pub fn apply(
        &self,
        target: &mut Node,
        declared: &TypeDesc,
        adapter: &dyn ObjectAdapter,
    ) -> Result<(), PatchError> {
        match self.kind() {
            OperationKind::Add => adapter.add(self, target, declared),
            OperationKind::Remove => adapter.remove(self, target, declared),
            OperationKind::Replace => adapter.replace(self, target, declared),
            OperationKind::Move => adapter.move_(self, target, declared),
            OperationKind::Copy => adapter.copy(self, target, declared),
            OperationKind::Test => match adapter.as_test_adapter() {
                Some(tester) => tester.test(self, target, declared),
                None => Err(PatchError::contract(
                    self,
                    "The test operation is not supported.",
                )),
            },
            OperationKind::Invalid => Err(PatchError::contract(
                self,
                format!("'{}' is not a valid patch operation.", self.op),
            )),
        }
    }
}

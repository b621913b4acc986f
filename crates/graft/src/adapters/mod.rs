//! Shape accessors.
//!
//! One stateless accessor per target shape, each exposing the six
//! operations the engine composes: traverse, add, remove, replace, get,
//! test. Accessors are selected per node by [`select`] and re-selected at
//! every traversal hop, because a heterogeneous graph can switch shapes at
//! every segment.

use crate::node::Node;
use crate::options::PatchOptions;
use crate::schema::TypeDesc;

mod bag;
mod map;
mod record;
mod seq;

pub use bag::BagAdapter;
pub use map::MapAdapter;
pub use record::RecordAdapter;
pub use seq::SeqAdapter;

/// A failed accessor step.
///
/// `message: None` is the silent channel: the target is absent or null,
/// which is not a data error by itself. Failures with a message describe a
/// real mismatch and surface verbatim in reported patch errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub message: Option<String>,
}

impl StepFailure {
    pub fn silent() -> Self {
        Self { message: None }
    }

    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

pub type StepResult<T> = Result<T, StepFailure>;

/// The six-operation contract every shape accessor implements.
///
/// None of these fail hard for "not found" — absence and mismatches are
/// signaled through [`StepFailure`], reserving panics and fatal errors for
/// contract violations upstream.
pub trait Adapter {
    /// Step into the member named by `segment`, for all but the final path
    /// segment. A shape mismatch is a silent failure so a caller could try
    /// another shape; a present-but-invalid segment carries a message.
    fn try_traverse<'a>(
        &self,
        target: &'a mut Node,
        declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
    ) -> StepResult<&'a mut Node>;

    fn try_add(
        &self,
        target: &mut Node,
        declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
        value: &Node,
    ) -> StepResult<()>;

    fn try_remove(
        &self,
        target: &mut Node,
        declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
    ) -> StepResult<()>;

    fn try_replace(
        &self,
        target: &mut Node,
        declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
        value: &Node,
    ) -> StepResult<()>;

    fn try_get(
        &self,
        target: &Node,
        declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
    ) -> StepResult<Node>;

    fn try_test(
        &self,
        target: &Node,
        declared: &TypeDesc,
        segment: &str,
        options: &PatchOptions,
        value: &Node,
    ) -> StepResult<()>;
}

/// Pick the accessor for a node.
///
/// Preference order: sequence, mapping, bag, record — first match wins,
/// and the record accessor is the fallback for everything else (scalars
/// land there and fail member lookup with a descriptive message).
pub fn select(target: &Node, _declared: &TypeDesc) -> &'static dyn Adapter {
    match target {
        Node::Seq(_) => &SeqAdapter,
        Node::Map(_) => &MapAdapter,
        Node::Bag(_) => &BagAdapter,
        _ => &RecordAdapter,
    }
}

/// Serialized-JSON-text equality, the comparison the `test` operation is
/// defined over for every shape (chosen over structural equality for
/// cross-shape comparability).
pub(crate) fn json_text_equal(current: &Node, expected: &Node) -> bool {
    current.to_string() == expected.to_string()
}

pub(crate) fn not_found_message(segment: &str) -> String {
    format!("The target location specified by path segment '{segment}' was not found.")
}

pub(crate) fn invalid_value_message(value: &Node) -> String {
    format!("The value '{value}' is invalid for target location.")
}

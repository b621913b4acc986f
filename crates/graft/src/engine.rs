//! Operation engine: composes the path walker and shape accessors into the
//! six operation semantics.

use graft_json_pointer::ParsedPath;

use crate::adapters::StepFailure;
use crate::convert::copy_to;
use crate::error::PatchError;
use crate::node::Node;
use crate::operation::Operation;
use crate::options::PatchOptions;
use crate::schema::TypeDesc;
use crate::visitor::visit;

/// An engine that can apply the five mutating operation kinds to a target
/// graph. `test` is a separate capability: see
/// [`as_test_adapter`](ObjectAdapter::as_test_adapter).
pub trait ObjectAdapter {
    fn add(
        &self,
        operation: &Operation,
        target: &mut Node,
        declared: &TypeDesc,
    ) -> Result<(), PatchError>;

    fn remove(
        &self,
        operation: &Operation,
        target: &mut Node,
        declared: &TypeDesc,
    ) -> Result<(), PatchError>;

    fn replace(
        &self,
        operation: &Operation,
        target: &mut Node,
        declared: &TypeDesc,
    ) -> Result<(), PatchError>;

    fn move_(
        &self,
        operation: &Operation,
        target: &mut Node,
        declared: &TypeDesc,
    ) -> Result<(), PatchError>;

    fn copy(
        &self,
        operation: &Operation,
        target: &mut Node,
        declared: &TypeDesc,
    ) -> Result<(), PatchError>;

    /// Engines supporting the `test` operation return themselves here.
    /// The default is no capability; applying `test` through such an
    /// engine is a contract violation.
    fn as_test_adapter(&self) -> Option<&dyn ObjectAdapterWithTest> {
        None
    }
}

/// The test capability.
pub trait ObjectAdapterWithTest: ObjectAdapter {
    fn test(
        &self,
        operation: &Operation,
        target: &mut Node,
        declared: &TypeDesc,
    ) -> Result<(), PatchError>;
}

/// The default engine.
#[derive(Debug, Clone, Default)]
pub struct PatchEngine {
    options: PatchOptions,
}

impl PatchEngine {
    pub fn new(options: PatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PatchOptions {
        &self.options
    }

    fn parse_path(&self, operation: &Operation, path: &str) -> Result<ParsedPath, PatchError> {
        ParsedPath::parse(path).map_err(|e| PatchError::invalid_path(operation, e.to_string()))
    }

    /// Add is shared by add, move, and copy; `operation` names the op
    /// reported on error.
    fn add_value(
        &self,
        operation: &Operation,
        path: &str,
        value: &Node,
        target: &mut Node,
        declared: &TypeDesc,
    ) -> Result<(), PatchError> {
        let parsed = self.parse_path(operation, path)?;
        let (parent, parent_type, adapter) =
            visit(target, declared.clone(), &parsed, &self.options).map_err(
                |failure: StepFailure| PatchError::path_not_found(operation, path, failure.message),
            )?;

        let Some(segment) = parsed.last_segment() else {
            return Err(PatchError::operation_failed(operation, path, None));
        };
        adapter
            .try_add(parent, &parent_type, segment, &self.options, value)
            .map_err(|failure| PatchError::operation_failed(operation, path, failure.message))
    }

    /// Remove is shared by remove and move.
    fn remove_at(
        &self,
        operation: &Operation,
        path: &str,
        target: &mut Node,
        declared: &TypeDesc,
    ) -> Result<(), PatchError> {
        let parsed = self.parse_path(operation, path)?;
        let (parent, parent_type, adapter) =
            visit(target, declared.clone(), &parsed, &self.options).map_err(
                |failure: StepFailure| PatchError::path_not_found(operation, path, failure.message),
            )?;

        let Some(segment) = parsed.last_segment() else {
            return Err(PatchError::operation_failed(operation, path, None));
        };
        adapter
            .try_remove(parent, &parent_type, segment, &self.options)
            .map_err(|failure| PatchError::operation_failed(operation, path, failure.message))
    }

    fn get_value(
        &self,
        operation: &Operation,
        path: &str,
        target: &mut Node,
        declared: &TypeDesc,
    ) -> Result<Node, PatchError> {
        let parsed = self.parse_path(operation, path)?;
        let (parent, parent_type, adapter) =
            visit(target, declared.clone(), &parsed, &self.options).map_err(
                |failure: StepFailure| PatchError::path_not_found(operation, path, failure.message),
            )?;

        let Some(segment) = parsed.last_segment() else {
            return Err(PatchError::operation_failed(operation, path, None));
        };
        adapter
            .try_get(parent, &parent_type, segment, &self.options)
            .map_err(|failure| PatchError::operation_failed(operation, path, failure.message))
    }

    fn require_from<'op>(&self, operation: &'op Operation) -> Result<&'op str, PatchError> {
        operation.from.as_deref().ok_or_else(|| {
            PatchError::contract(
                operation,
                format!("The '{}' operation requires a 'from' path.", operation.op),
            )
        })
    }
}

impl ObjectAdapter for PatchEngine {
    fn add(
        &self,
        operation: &Operation,
        target: &mut Node,
        declared: &TypeDesc,
    ) -> Result<(), PatchError> {
        let value = operation.value_node();
        self.add_value(operation, &operation.path, &value, target, declared)
    }

    fn remove(
        &self,
        operation: &Operation,
        target: &mut Node,
        declared: &TypeDesc,
    ) -> Result<(), PatchError> {
        self.remove_at(operation, &operation.path, target, declared)
    }

    fn replace(
        &self,
        operation: &Operation,
        target: &mut Node,
        declared: &TypeDesc,
    ) -> Result<(), PatchError> {
        let parsed = self.parse_path(operation, &operation.path)?;
        let (parent, parent_type, adapter) = visit(target, declared.clone(), &parsed, &self.options)
            .map_err(|failure| {
                PatchError::path_not_found(operation, &operation.path, failure.message)
            })?;

        let Some(segment) = parsed.last_segment() else {
            return Err(PatchError::operation_failed(operation, &operation.path, None));
        };
        let value = operation.value_node();
        adapter
            .try_replace(parent, &parent_type, segment, &self.options, &value)
            .map_err(|failure| {
                PatchError::operation_failed(operation, &operation.path, failure.message)
            })
    }

    /// Get the value at `from`, remove it there, and add it at `path`.
    /// When the get fails nothing else runs: the remove and add are
    /// skipped, not rolled back.
    fn move_(
        &self,
        operation: &Operation,
        target: &mut Node,
        declared: &TypeDesc,
    ) -> Result<(), PatchError> {
        let from = self.require_from(operation)?.to_string();
        let value = self.get_value(operation, &from, target, declared)?;
        self.remove_at(operation, &from, target, declared)?;
        self.add_value(operation, &operation.path, &value, target, declared)
    }

    /// Get the value at `from`, deep-copy it, and add the copy at `path`.
    fn copy(
        &self,
        operation: &Operation,
        target: &mut Node,
        declared: &TypeDesc,
    ) -> Result<(), PatchError> {
        let from = self.require_from(operation)?.to_string();
        let value = self.get_value(operation, &from, target, declared)?;

        let copied = copy_to(&value).ok_or_else(|| {
            PatchError::operation_failed(
                operation,
                &operation.path,
                Some(format!("The property at '{from}' could not be copied.")),
            )
        })?;
        self.add_value(operation, &operation.path, &copied, target, declared)
    }

    fn as_test_adapter(&self) -> Option<&dyn ObjectAdapterWithTest> {
        Some(self)
    }
}

impl ObjectAdapterWithTest for PatchEngine {
    fn test(
        &self,
        operation: &Operation,
        target: &mut Node,
        declared: &TypeDesc,
    ) -> Result<(), PatchError> {
        let parsed = self.parse_path(operation, &operation.path)?;
        let (parent, parent_type, adapter) = visit(target, declared.clone(), &parsed, &self.options)
            .map_err(|failure| {
                PatchError::path_not_found(operation, &operation.path, failure.message)
            })?;

        let Some(segment) = parsed.last_segment() else {
            return Err(PatchError::operation_failed(operation, &operation.path, None));
        };
        let value = operation.value_node();
        adapter
            .try_test(parent, &parent_type, segment, &self.options, &value)
            .map_err(|failure| {
                PatchError::operation_failed(operation, &operation.path, failure.message)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn engine() -> PatchEngine {
        PatchEngine::new(PatchOptions::new())
    }

    fn doc() -> Node {
        Node::from_json(&json!({"a": 1, "b": {"c": 2}}))
    }

    fn apply(op: Operation, target: &mut Node) -> Result<(), PatchError> {
        let declared = target.runtime_type();
        op.apply(target, &declared, &engine())
    }

    #[test]
    fn move_transfers_value() {
        let mut target = doc();
        apply(
            Operation::new("move", "/b/d", Some("/a".to_string()), None),
            &mut target,
        )
        .unwrap();
        assert_eq!(target.to_json(), json!({"b": {"c": 2, "d": 1}}));
    }

    #[test]
    fn move_with_missing_source_changes_nothing() {
        let mut target = doc();
        let err = apply(
            Operation::new("move", "/b/d", Some("/ghost".to_string()), None),
            &mut target,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::OperationFailed);
        assert_eq!(target.to_json(), json!({"a": 1, "b": {"c": 2}}));
    }

    #[test]
    fn move_without_from_is_a_contract_error() {
        let mut target = doc();
        let err = apply(Operation::new("move", "/b/d", None, None), &mut target).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Contract);
    }

    #[test]
    fn copy_leaves_source_in_place() {
        let mut target = doc();
        apply(
            Operation::new("copy", "/d", Some("/b".to_string()), None),
            &mut target,
        )
        .unwrap();
        assert_eq!(target.to_json(), json!({"a": 1, "b": {"c": 2}, "d": {"c": 2}}));
    }

    #[test]
    fn invalid_kind_is_fatal_at_apply_time() {
        let mut target = doc();
        let err = apply(Operation::new("merge", "/a", None, None), &mut target).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Contract);
    }

    #[test]
    fn bad_pointer_syntax_is_fatal_invalid_path() {
        let mut target = doc();
        let err = apply(
            Operation::new("add", "/bad~9escape", None, Some(json!(1))),
            &mut target,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPath);
    }

    #[test]
    fn silent_walk_failure_reports_default_not_found_text() {
        let mut target = doc();
        let err = apply(
            Operation::new("add", "/ghost/x", None, Some(json!(1))),
            &mut target,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::PathNotFound);
        assert_eq!(
            err.message,
            "For operation 'add', the target location specified by path '/ghost/x' was not found."
        );
    }

    /// An engine that forwards mutations but opts out of the test
    /// capability.
    struct NoTestEngine(PatchEngine);

    impl ObjectAdapter for NoTestEngine {
        fn add(&self, op: &Operation, t: &mut Node, d: &TypeDesc) -> Result<(), PatchError> {
            self.0.add(op, t, d)
        }
        fn remove(&self, op: &Operation, t: &mut Node, d: &TypeDesc) -> Result<(), PatchError> {
            self.0.remove(op, t, d)
        }
        fn replace(&self, op: &Operation, t: &mut Node, d: &TypeDesc) -> Result<(), PatchError> {
            self.0.replace(op, t, d)
        }
        fn move_(&self, op: &Operation, t: &mut Node, d: &TypeDesc) -> Result<(), PatchError> {
            self.0.move_(op, t, d)
        }
        fn copy(&self, op: &Operation, t: &mut Node, d: &TypeDesc) -> Result<(), PatchError> {
            self.0.copy(op, t, d)
        }
    }

    #[test]
    fn test_without_capability_is_a_contract_error() {
        let mut target = doc();
        let declared = target.runtime_type();
        let op = Operation::new("test", "/a", None, Some(json!(1)));
        let err = op
            .apply(&mut target, &declared, &NoTestEngine(engine()))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Contract);
        assert_eq!(err.message, "The test operation is not supported.");
    }
}

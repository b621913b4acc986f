//! Patch errors and error sinks.

use thiserror::Error;

use crate::operation::Operation;

/// Classifies a [`PatchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A traversal or final-segment lookup could not locate a member, key,
    /// or index. Recoverable: reported through the sink, remaining
    /// operations in the document are skipped.
    PathNotFound,
    /// The member was found but the operation could not complete (type
    /// mismatch, read-only target, test inequality, out-of-bounds add,
    /// unconvertible value). Same halting behavior.
    OperationFailed,
    /// Malformed JSON Pointer syntax. A programming/input error, not a
    /// data-state error: fatal, never routed through the sink.
    InvalidPath,
    /// API misuse (test through an adapter without the test capability,
    /// an invalid operation kind reaching apply). Fatal, never routed
    /// through the sink.
    Contract,
}

impl ErrorKind {
    /// Fatal kinds bypass the error sink entirely.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorKind::InvalidPath | ErrorKind::Contract)
    }
}

/// Captures the failed operation and the error message.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct PatchError {
    pub kind: ErrorKind,
    /// The operation that caused the error, when one was in flight.
    pub operation: Option<Operation>,
    pub message: String,
}

impl PatchError {
    pub(crate) fn path_not_found(
        operation: &Operation,
        path: &str,
        message: Option<String>,
    ) -> Self {
        let message = message.unwrap_or_else(|| {
            format!(
                "For operation '{}', the target location specified by path '{}' was not found.",
                operation.op, path
            )
        });
        Self {
            kind: ErrorKind::PathNotFound,
            operation: Some(operation.clone()),
            message,
        }
    }

    pub(crate) fn operation_failed(
        operation: &Operation,
        path: &str,
        message: Option<String>,
    ) -> Self {
        let message = message.unwrap_or_else(|| {
            format!(
                "The '{}' operation at path '{}' could not be performed.",
                operation.op, path
            )
        });
        Self {
            kind: ErrorKind::OperationFailed,
            operation: Some(operation.clone()),
            message,
        }
    }

    pub(crate) fn invalid_path(operation: &Operation, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidPath,
            operation: Some(operation.clone()),
            message: message.into(),
        }
    }

    pub(crate) fn bad_path(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidPath,
            operation: None,
            message: message.into(),
        }
    }

    pub(crate) fn contract(operation: &Operation, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Contract,
            operation: Some(operation.clone()),
            message: message.into(),
        }
    }
}

/// Where recoverable patch failures are reported.
///
/// Returning `Err` propagates the failure to the caller; returning `Ok`
/// swallows it. Either way the current document stops applying further
/// operations after the first failure.
pub trait ErrorSink {
    fn report(&mut self, error: PatchError) -> Result<(), PatchError>;
}

/// Fails fast: every reported error is handed straight back.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictSink;

impl ErrorSink for StrictSink {
    fn report(&mut self, error: PatchError) -> Result<(), PatchError> {
        Err(error)
    }
}

/// Accumulates reported errors and lets the caller continue.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    pub errors: Vec<PatchError>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl ErrorSink for CollectingSink {
    fn report(&mut self, error: PatchError) -> Result<(), PatchError> {
        self.errors.push(error);
        Ok(())
    }
}

//! Error types for the runic runtime.
//!
//! # Structured Error Categories
//!
//! `EvalErrorKind` provides typed error categories so callers can match on
//! the failure mode instead of parsing strings. Factory functions (e.g.
//! `not_callable()`) are the public construction API — they populate both
//! `kind` and `message`.

use std::fmt;

/// Result of a runtime operation.
pub type EvalResult<T> = Result<T, EvalError>;

/// Typed error category for structured diagnostics.
///
/// Each variant carries the data of the error condition, enabling
/// programmatic matching and machine-readable output. The `Display` impl
/// produces the canonical message string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// Requested native type does not match the runtime value's type.
    TypeMismatch { expected: String, got: String },
    /// Call target is not a callable value.
    NotCallable { type_name: String },
    /// Subscripting through an existing non-container value.
    CannotIndex { receiver: String, key: String },
    /// Native function invoked with the wrong number of arguments.
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    /// The working stack held fewer values than an operation required.
    StackUnderflow { needed: usize, depth: usize },
    /// Free-form error, for natives that fail in domain-specific ways.
    Custom { message: String },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalErrorKind::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            EvalErrorKind::NotCallable { type_name } => {
                write!(f, "{type_name} is not callable")
            }
            EvalErrorKind::CannotIndex { receiver, key } => {
                write!(f, "cannot index {receiver} with key '{key}'")
            }
            EvalErrorKind::ArityMismatch {
                name,
                expected,
                got,
            } => {
                write!(f, "{name} expects {expected} argument(s), got {got}")
            }
            EvalErrorKind::StackUnderflow { needed, depth } => {
                write!(
                    f,
                    "working stack underflow: needed {needed} value(s), have {depth}"
                )
            }
            EvalErrorKind::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// A runtime evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable error message.
    ///
    /// For factory-created errors, this equals `kind.to_string()`.
    pub message: String,
}

impl EvalError {
    /// Create an error with just a message.
    ///
    /// Uses the `Custom` kind. Prefer the specific factory functions when a
    /// structured kind is available.
    pub fn new(message: impl Into<String>) -> Self {
        let msg = message.into();
        EvalError {
            kind: EvalErrorKind::Custom {
                message: msg.clone(),
            },
            message: msg,
        }
    }

    /// Create an error from a structured kind.
    ///
    /// The message is computed from the kind's `Display` impl. Used
    /// internally by the factory functions.
    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError { kind, message }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}

// Factory functions

/// Requested native type mismatches the actual runtime value type.
#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

/// Call target is not a callable value.
#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_string(),
    })
}

/// Subscripting through an existing value that is not a container.
#[cold]
pub fn cannot_index(receiver: &str, key: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CannotIndex {
        receiver: receiver.to_string(),
        key: key.to_string(),
    })
}

/// Wrong number of arguments for a native function.
#[cold]
pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

/// The working stack held fewer values than the operation required.
#[cold]
pub fn stack_underflow(needed: usize, depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackUnderflow { needed, depth })
}

//! Error types for the runtime core.
//!
//! Built-in functions never return `Result`: they report failure as a
//! `Value::Error`. The record engine and the host evaluator work with
//! `EvalResult` and convert at the boundary with `Value::from_result` and
//! `Value::into_result`.
//!
//! # Structured Error Categories
//!
//! `EvalErrorKind` gives each failure a typed category so hosts can match on
//! it. Factory functions (e.g. `unknown_field()`) fill in both `kind` and
//! `message`.

use std::fmt;

use dws_ir::Position;
use dws_types::TypeError;

use crate::value::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Arguments
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    TypeMismatch {
        expected: String,
        got: String,
    },

    // Types and records
    UnknownType {
        name: String,
    },
    UnresolvedFieldType {
        field: String,
        record: String,
        type_name: String,
    },
    UnknownField {
        field: String,
        record: String,
    },
    DuplicateType {
        name: String,
    },
    UntypedRecordLiteral,
    PositionalRecordField {
        record: String,
    },

    // Arrays
    IndexOutOfBounds {
        index: i64,
        len: usize,
    },
    StaticArrayMutation {
        operation: String,
    },
    NegativeLength {
        length: i64,
    },

    // Evaluation
    UndefinedVariable {
        name: String,
    },
    UndefinedFunction {
        name: String,
    },
    NotCallable {
        type_name: String,
    },
    InvalidOperands {
        op: String,
        left: String,
        right: String,
    },
    DivisionByZero,
    StackOverflow {
        depth: usize,
    },
    InterfaceNotAssigned {
        interface: String,
    },

    // Assertion
    AssertionFailed {
        message: String,
    },

    /// Errors without a dedicated category, including messages returned
    /// by built-ins as `Value::Error`.
    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArityMismatch {
                name,
                expected,
                got,
            } => {
                let arg_word = if *expected == 1 {
                    "argument"
                } else {
                    "arguments"
                };
                write!(f, "{name} expects {expected} {arg_word}, got {got}")
            }
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }

            Self::UnknownType { name } => write!(f, "unknown type: {name}"),
            Self::UnresolvedFieldType {
                field,
                record,
                type_name,
            } => write!(
                f,
                "unknown type '{type_name}' for field '{field}' in record '{record}'"
            ),
            Self::UnknownField { field, record } => {
                write!(f, "field '{field}' does not exist in record type '{record}'")
            }
            Self::DuplicateType { name } => write!(f, "type '{name}' is already declared"),
            Self::UntypedRecordLiteral => {
                write!(f, "record literal requires explicit type name or type context")
            }
            Self::PositionalRecordField { record } => write!(
                f,
                "positional field values are not supported in record literal of type '{record}'"
            ),

            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index out of bounds: {index} (array length is {len})")
            }
            Self::StaticArrayMutation { operation } => write!(
                f,
                "{operation}() can only be used with dynamic arrays, not static arrays"
            ),
            Self::NegativeLength { length } => {
                write!(f, "expects non-negative length, got {length}")
            }

            Self::UndefinedVariable { name } => write!(f, "undefined variable: {name}"),
            Self::UndefinedFunction { name } => write!(f, "undefined function: {name}"),
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),
            Self::InvalidOperands { op, left, right } => {
                write!(f, "operator {op} is not applicable to {left} and {right}")
            }
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::StackOverflow { depth } => {
                write!(f, "maximum recursion depth exceeded (limit: {depth})")
            }
            Self::InterfaceNotAssigned { interface } => {
                write!(f, "interface '{interface}' is not assigned")
            }

            Self::AssertionFailed { message } => write!(f, "{message}"),

            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    /// Structured category. `EvalError::new(msg)` uses `Custom`.
    pub kind: EvalErrorKind,
    /// Human-readable message, equal to `kind.to_string()` for
    /// factory-created errors.
    pub message: String,
    /// Source location where the error occurred.
    pub position: Option<Position>,
}

impl EvalError {
    /// Create an error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
            position: None,
        }
    }

    /// Create an error from a structured kind.
    pub fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            position: None,
        }
    }

    /// Attach a source position. An already attached position wins, so the
    /// innermost site is reported.
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        if self.position.is_none() && position.is_known() {
            self.position = Some(position);
        }
        self
    }

    /// Message with the position appended, as shown to script authors.
    pub fn display_message(&self) -> String {
        match self.position {
            Some(pos) => format_at(&self.message, pos),
            None => self.message.clone(),
        }
    }

    /// Convert into an Error-tagged value.
    pub fn into_value(self) -> Value {
        Value::error(self.display_message())
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_message())
    }
}

impl std::error::Error for EvalError {}

impl From<TypeError> for EvalError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::UnknownType { name } => unknown_type(&name),
            TypeError::DuplicateType { name } => {
                EvalError::from_kind(EvalErrorKind::DuplicateType { name })
            }
            other => EvalError::new(other.to_string()),
        }
    }
}

/// `"<message> at line L, column C"`
pub fn format_at(message: &str, pos: Position) -> String {
    format!("{message} at line {}, column {}", pos.line, pos.column)
}

// Factory functions

#[cold]
pub fn wrong_arg_count(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

#[cold]
pub fn unknown_type(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownType {
        name: name.to_string(),
    })
}

#[cold]
pub fn unresolved_field_type(field: &str, record: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnresolvedFieldType {
        field: field.to_string(),
        record: record.to_string(),
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn unknown_field(field: &str, record: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownField {
        field: field.to_string(),
        record: record.to_string(),
    })
}

#[cold]
pub fn untyped_record_literal() -> EvalError {
    EvalError::from_kind(EvalErrorKind::UntypedRecordLiteral)
}

#[cold]
pub fn positional_record_field(record: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::PositionalRecordField {
        record: record.to_string(),
    })
}

#[cold]
pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds { index, len })
}

#[cold]
pub fn static_array_mutation(operation: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StaticArrayMutation {
        operation: operation.to_string(),
    })
}

#[cold]
pub fn negative_length(length: i64) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NegativeLength { length })
}

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn undefined_function(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedFunction {
        name: name.to_string(),
    })
}

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn invalid_operands(op: &str, left: &str, right: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidOperands {
        op: op.to_string(),
        left: left.to_string(),
        right: right.to_string(),
    })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn recursion_limit_exceeded(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { depth })
}

#[cold]
pub fn interface_not_assigned(interface: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InterfaceNotAssigned {
        interface: interface.to_string(),
    })
}

#[cold]
pub fn assertion_failed(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::AssertionFailed {
        message: message.into(),
    })
}

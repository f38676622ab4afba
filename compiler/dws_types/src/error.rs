//! Type resolution errors.

use thiserror::Error;

/// Failure to resolve or register a type.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TypeError {
    /// No namespace knows the name.
    #[error("unknown type: {name}")]
    UnknownType { name: String },

    /// An inline `array of T` / `array[lo..hi] of T` signature is malformed.
    #[error("invalid array type '{signature}': {reason}")]
    InvalidArrayType { signature: String, reason: String },

    /// An inline `function(..)` / `procedure(..)` signature is malformed.
    #[error("invalid function pointer signature '{signature}': {reason}")]
    InvalidFunctionPointer { signature: String, reason: String },

    /// A record was declared twice.
    #[error("type '{name}' is already declared")]
    DuplicateType { name: String },

    /// A record declares the same field twice (names compare case-insensitively).
    #[error("duplicate field '{field}' in record '{record}'")]
    DuplicateField { field: String, record: String },
}

impl TypeError {
    #[cold]
    pub fn unknown(name: impl Into<String>) -> Self {
        TypeError::UnknownType { name: name.into() }
    }
}

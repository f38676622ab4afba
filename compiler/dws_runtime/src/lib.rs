//! DWS Runtime - Values, built-in dispatch and the array/collection built-ins.
//!
//! # Architecture
//!
//! ```text
//! host evaluator ──implements──> Context <──calls── built-ins
//!        │                                              ▲
//!        └── Registry::lookup(name) ── BuiltinFn ───────┘
//! ```
//!
//! Built-ins only see `&mut dyn Context`, never the concrete evaluator, so
//! any host (the `dws_eval` interpreter, or `MockContext` in unit tests)
//! can run the same catalogue.
//!
//! - `Value`: tagged runtime value with shared `ArrayValue` / `RecordValue`
//!   storage
//! - `Context`: evaluator services available to built-ins
//! - `Registry`: case-insensitive, thread-safe built-in catalogue
//! - `EvalError`: structured errors; built-ins report them as `Value::Error`

mod builtins;
mod context;
pub mod errors;
mod registry;
pub mod value;
mod zero;

#[cfg(test)]
mod test_helpers;

pub use builtins::{
    register_all, register_array_functions, register_collection_functions,
    register_system_functions,
};
pub use context::Context;
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use registry::{default_registry, Category, FunctionInfo, Registry, Signature};
pub use value::{
    ArrayValue, Callable, EnumValue, FunctionPointerValue, Heap, InterfaceInstance, NativeFn,
    RecordValue, Value,
};
pub use zero::zero_value;

/// Signature shared by every built-in function.
pub type BuiltinFn = fn(&mut dyn Context, &[Value]) -> Value;

//! The capability surface built-in functions receive.
//!
//! Built-ins never see the concrete evaluator. Everything they need from it
//! (positions for error messages, coercions, array primitives, callback
//! invocation, JSON, introspection, randomness) goes through `Context`,
//! which the host implements. `MockContext` in the test helpers implements
//! it for unit tests.

use dws_ir::Position;
use rand::RngCore;

use crate::errors::{format_at, EvalError};
use crate::value::Value;

/// Evaluator services available to built-ins.
///
/// The trait is object safe; built-ins take `&mut dyn Context`.
pub trait Context {
    /// Position of the call currently being evaluated.
    fn current_position(&self) -> Option<Position>;

    /// Error value carrying `message`, with the current position appended
    /// when one is known.
    fn new_error(&self, message: String) -> Value {
        match self.current_position() {
            Some(pos) if pos.is_known() => Value::error(format_at(&message, pos)),
            _ => Value::error(message),
        }
    }

    // Coercions

    /// Integer view of a value: integers, enum ordinals, booleans and boxed
    /// variants of those.
    fn to_int64(&self, value: &Value) -> Option<i64> {
        match self.unwrap_variant(value) {
            Value::Integer(n) => Some(n),
            Value::Enum(e) => Some(e.ordinal),
            Value::Boolean(b) => Some(i64::from(b)),
            _ => None,
        }
    }

    /// Float view of a value: floats and integers.
    #[allow(clippy::cast_precision_loss, reason = "script integers widen to Float")]
    fn to_float64(&self, value: &Value) -> Option<f64> {
        match self.unwrap_variant(value) {
            Value::Float(f) => Some(f),
            Value::Integer(n) => Some(n as f64),
            _ => None,
        }
    }

    fn to_bool(&self, value: &Value) -> Option<bool> {
        self.unwrap_variant(value).as_bool()
    }

    /// Strip a variant box. Other values are returned unchanged.
    fn unwrap_variant(&self, value: &Value) -> Value {
        match value {
            Value::Variant(inner) => (**inner).clone(),
            other => other.clone(),
        }
    }

    // Array primitives

    /// Element count, or `None` if `value` is not an array.
    fn array_length(&self, value: &Value) -> Option<i64> {
        value
            .as_array()
            .map(|arr| i64::try_from(arr.len()).unwrap_or(i64::MAX))
    }

    /// Shallow element-wise copy into new storage.
    fn array_copy(&mut self, value: &Value) -> Value;

    /// Reverse in place; returns `Nil` or an Error value.
    fn array_reverse(&mut self, value: &Value) -> Value;

    /// Default-order sort in place; returns `Nil` or an Error value.
    fn array_sort(&mut self, value: &Value) -> Value;

    /// Resize a dynamic array in place, padding with element zero values.
    fn set_array_length(&mut self, value: &Value, len: usize) -> Result<(), EvalError>;

    /// Bounds for `Low` / `High`: arrays, strings, enum values and type
    /// meta-values.
    fn low_bound(&self, value: &Value) -> Result<Value, EvalError>;
    fn high_bound(&self, value: &Value) -> Result<Value, EvalError>;

    // Callbacks

    /// Invoke a function pointer. The host checks the argument count
    /// against the pointer's arity before evaluating.
    fn eval_function_pointer(&mut self, func: &Value, args: &[Value]) -> Value;

    // JSON

    fn parse_json(&self, text: &str) -> Result<Value, EvalError>;

    /// Serialize `value`: compact when `indent` is `None`, otherwise
    /// pretty-printed with `indent` spaces per level.
    fn value_to_json(&self, value: &Value, indent: Option<usize>) -> Result<String, EvalError>;

    // Introspection

    /// Script-level type name, e.g. `Integer` or `TPoint`.
    fn type_of(&self, value: &Value) -> String;

    /// Class name of an object; empty for non-objects.
    fn class_of(&self, value: &Value) -> String;

    /// Current call stack, one frame per line.
    fn call_stack_string(&self) -> String;

    /// Current call stack as an array of `FunctionName`/`Line`/`Column`
    /// records.
    fn call_stack_array(&self) -> Value;

    /// `false` for `Nil`, unassigned interfaces and variants boxing either.
    fn is_assigned(&self, value: &Value) -> bool {
        match value {
            Value::Nil => false,
            Value::InterfaceInstance(iface) => iface.is_assigned(),
            Value::Variant(inner) => self.is_assigned(inner),
            _ => true,
        }
    }

    // Randomness

    fn rand_source(&mut self) -> &mut dyn RngCore;
    fn rand_seed(&self) -> i64;
    fn set_rand_seed(&mut self, seed: i64);

    // Exceptions

    /// Record an `EAssertionFailed` exception for the host's exception
    /// machinery.
    fn raise_assertion_failed(&mut self, custom_message: Option<&str>);
}

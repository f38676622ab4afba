//! Runtime values for the DWScript interpreter.
//!
//! # Arc Enforcement Architecture
//!
//! Immutable heap payloads (strings, boxed variants, error messages) live in
//! `Heap<T>`, whose constructor is private to this module. Use the factory
//! methods on `Value`:
//!
//! ```text
//! let s = Value::string("hello");          // OK
//! let arr = Value::array(vec![]);          // OK
//! let s = Value::String(Heap::new(...));   // ERROR: Heap::new is pub(super)
//! ```
//!
//! # Reference semantics
//!
//! Arrays and records are handles to shared, lock-guarded storage. Cloning a
//! `Value::Array` or `Value::Record` aliases the same storage; copying is
//! always explicit (`ArrayValue::copy_storage`, `RecordValue::deep_copy`).

mod array;
mod function;
mod heap;
mod record;
mod visit;

use std::fmt;
use std::sync::Arc;

use dws_types::{ArrayType, InterfaceType, Type};

use crate::errors::{EvalError, EvalResult};

pub use array::ArrayValue;
pub use function::{Callable, FunctionPointerValue, NativeFn};
pub use heap::Heap;
pub use record::RecordValue;

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    // Scalars
    Integer(i64),
    Float(f64),
    /// Immutable string. Length and indexing work on code points.
    String(Heap<str>),
    Boolean(bool),
    Nil,

    // Composites (shared, mutable storage)
    Array(ArrayValue),
    Record(RecordValue),

    /// Enumeration member.
    Enum(EnumValue),
    FunctionPointer(FunctionPointerValue),
    InterfaceInstance(InterfaceInstance),
    /// A value boxed in a `Variant` slot.
    Variant(Heap<Value>),
    /// A type used as a value, e.g. the argument of `High(Integer)`.
    TypeMeta(Type),

    /// Error raised by a built-in. Never stored in variables; the evaluator
    /// converts it into a script exception.
    Error(Heap<str>),
}

/// Enumeration member value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumValue {
    pub type_name: String,
    pub value_name: String,
    pub ordinal: i64,
}

/// Interface reference. A declared but unassigned interface keeps its
/// descriptor and has no target, so member access can report which
/// interface is nil.
#[derive(Clone, Debug)]
pub struct InterfaceInstance {
    pub interface: Arc<InterfaceType>,
    pub target: Option<Heap<Value>>,
}

impl InterfaceInstance {
    #[inline]
    pub fn is_assigned(&self) -> bool {
        self.target.is_some()
    }
}

// Factory Methods

impl Value {
    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Integer(n)
    }

    #[inline]
    pub fn float(f: f64) -> Self {
        Value::Float(f)
    }

    #[inline]
    pub fn bool(b: bool) -> Self {
        Value::Boolean(b)
    }

    /// Create a string value.
    ///
    /// # Example
    ///
    /// ```text
    /// let s = Value::string("hello");
    /// let s2 = Value::string(format!("value: {x}"));
    /// ```
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Heap::from_string(s.into()))
    }

    /// Create an untyped array value.
    ///
    /// # Example
    ///
    /// ```text
    /// let nums = Value::array(vec![Value::int(1), Value::int(2)]);
    /// ```
    #[inline]
    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(ArrayValue::untyped(elements))
    }

    /// Create an array value carrying its type descriptor.
    #[inline]
    pub fn typed_array(array_type: Arc<ArrayType>, elements: Vec<Value>) -> Self {
        Value::Array(ArrayValue::new(elements, Some(array_type)))
    }

    /// Create an Error value.
    ///
    /// # Example
    ///
    /// ```text
    /// return Value::error(format!("Length() expects exactly 1 argument, got {}", args.len()));
    /// ```
    #[inline]
    pub fn error(message: impl Into<String>) -> Self {
        Value::Error(Heap::from_string(message.into()))
    }

    #[inline]
    pub fn enumeration(
        type_name: impl Into<String>,
        value_name: impl Into<String>,
        ordinal: i64,
    ) -> Self {
        Value::Enum(EnumValue {
            type_name: type_name.into(),
            value_name: value_name.into(),
            ordinal,
        })
    }

    /// Box a value in a variant slot. Variants never nest.
    pub fn variant(inner: Value) -> Self {
        match inner {
            already @ Value::Variant(_) => already,
            other => Value::Variant(Heap::new(other)),
        }
    }

    /// Interface reference with no target.
    #[inline]
    pub fn unassigned_interface(interface: Arc<InterfaceType>) -> Self {
        Value::InterfaceInstance(InterfaceInstance {
            interface,
            target: None,
        })
    }

    /// Interface reference pointing at `target`.
    #[inline]
    pub fn interface(interface: Arc<InterfaceType>, target: Value) -> Self {
        Value::InterfaceInstance(InterfaceInstance {
            interface,
            target: Some(Heap::new(target)),
        })
    }

    /// Lift an evaluation result into the built-in calling convention.
    pub fn from_result(result: EvalResult) -> Self {
        result.unwrap_or_else(EvalError::into_value)
    }

    /// Lower an Error value into `Err`, passing everything else through.
    pub fn into_result(self) -> EvalResult {
        match self {
            Value::Error(message) => Err(EvalError::new(&*message)),
            other => Ok(other),
        }
    }
}

// Value Methods

impl Value {
    /// Stable tag used for dispatch and diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "STRING",
            Value::Boolean(_) => "BOOLEAN",
            Value::Nil => "NIL",
            Value::Array(_) => "ARRAY",
            Value::Record(_) => "RECORD",
            Value::Enum(_) => "ENUM",
            Value::FunctionPointer(_) => "FUNCTION_POINTER",
            Value::InterfaceInstance(_) => "INTERFACE",
            Value::Variant(_) => "VARIANT",
            Value::TypeMeta(_) => "TYPE",
            Value::Error(_) => "ERROR",
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_function_pointer(&self) -> Option<&FunctionPointerValue> {
        match self {
            Value::FunctionPointer(f) => Some(f),
            _ => None,
        }
    }

    /// Error message of an Error value.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Value::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Equality of Integer, Float, String and Boolean values of the same
    /// kind. Everything else compares unequal. Used by `IndexOf` and
    /// `Contains`.
    #[allow(clippy::float_cmp, reason = "script equality on floats is exact")]
    pub fn scalar_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            _ => false,
        }
    }

    /// Language-level equality.
    ///
    /// Scalars compare by value and records structurally. Arrays and
    /// function pointers compare by identity.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Record(a), Value::Record(b)) => a.equals(b),
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Enum(a), Value::Enum(b)) => {
                a.ordinal == b.ordinal && a.type_name.eq_ignore_ascii_case(&b.type_name)
            }
            (Value::FunctionPointer(a), Value::FunctionPointer(b)) => a.same_target(b),
            (Value::InterfaceInstance(a), Value::InterfaceInstance(b)) => {
                match (&a.target, &b.target) {
                    (Some(x), Some(y)) => x.equals(y),
                    (None, None) => true,
                    _ => false,
                }
            }
            (Value::Variant(a), Value::Variant(b)) => a.equals(b),
            (Value::Variant(a), b) | (b, Value::Variant(a)) => a.equals(b),
            (Value::TypeMeta(a), Value::TypeMeta(b)) => a == b,
            (Value::Error(_), _) | (_, Value::Error(_)) => false,
            _ => self.scalar_equals(other),
        }
    }
}

// Trait Implementations

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "Integer({n})"),
            Value::Float(n) => write!(f, "Float({n})"),
            Value::String(s) => write!(f, "String({:?})", &**s),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::Nil => write!(f, "Nil"),
            Value::Array(a) => write!(f, "Array({a:?})"),
            Value::Record(r) => write!(f, "Record({r:?})"),
            Value::Enum(e) => write!(f, "Enum({}.{}={})", e.type_name, e.value_name, e.ordinal),
            Value::FunctionPointer(fp) => write!(f, "FunctionPointer({fp:?})"),
            Value::InterfaceInstance(i) => match &i.target {
                Some(target) => write!(f, "Interface({}, {:?})", i.interface.name, &**target),
                None => write!(f, "Interface({}, nil)", i.interface.name),
            },
            Value::Variant(v) => write!(f, "Variant({:?})", &**v),
            Value::TypeMeta(ty) => write!(f, "TypeMeta({ty})"),
            Value::Error(msg) => write!(f, "Error({})", &**msg),
        }
    }
}

/// Display string as seen by `Print` and string conversion.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Boolean(true) => f.write_str("True"),
            Value::Boolean(false) => f.write_str("False"),
            Value::Nil => f.write_str("nil"),
            Value::Array(a) => write!(f, "{a}"),
            Value::Record(r) => write!(f, "{r}"),
            // Enums print their ordinal
            Value::Enum(e) => write!(f, "{}", e.ordinal),
            Value::FunctionPointer(fp) => write!(f, "{fp}"),
            Value::InterfaceInstance(i) => match &i.target {
                Some(target) => write!(f, "{}", &**target),
                None => f.write_str("nil"),
            },
            Value::Variant(v) => write!(f, "{}", &**v),
            Value::TypeMeta(ty) => write!(f, "{ty}"),
            Value::Error(msg) => write!(f, "ERROR: {}", &**msg),
        }
    }
}

//! Test helpers for built-in unit testing.
//!
//! Provides `MockContext` for running built-ins in isolation without a full
//! evaluator.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use std::cmp::Ordering;

use dws_ir::Position;
use dws_types::Type;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rustc_hash::FxHashMap;

use crate::errors::{self, EvalError};
use crate::value::{ArrayValue, Callable, RecordValue, Value};
use crate::{zero_value, Context};

/// Mock evaluator services.
///
/// Allows registration of:
/// - A current position, appended to error messages
/// - Call-stack frames for `GetStackTrace` / `GetCallStack`
/// - Canned JSON documents for `ParseJSON`
///
/// Native function pointers are invoked directly and counted; lambdas are
/// rejected. Raised assertions are recorded instead of thrown.
pub struct MockContext {
    position: Option<Position>,
    frames: Vec<(String, Position)>,
    json_documents: FxHashMap<String, Value>,
    rng: StdRng,
    seed: i64,
    callback_count: usize,
    assertions: Vec<String>,
}

impl MockContext {
    /// Create a new mock context with a fixed seed.
    pub fn new() -> Self {
        MockContext {
            position: None,
            frames: Vec::new(),
            json_documents: FxHashMap::default(),
            rng: StdRng::seed_from_u64(0),
            seed: 0,
            callback_count: 0,
            assertions: Vec::new(),
        }
    }

    /// Report `line:column` as the current call position.
    pub fn with_position(mut self, line: u32, column: u32) -> Self {
        self.position = Some(Position::new(line, column));
        self
    }

    /// Push a call-stack frame. Frames are listed oldest first.
    pub fn with_frame(mut self, function_name: &str, line: u32, column: u32) -> Self {
        self.frames
            .push((function_name.to_string(), Position::new(line, column)));
        self
    }

    /// Register the value `ParseJSON(text)` should produce.
    pub fn with_json(mut self, text: &str, value: Value) -> Self {
        self.json_documents.insert(text.to_string(), value);
        self
    }

    /// Number of function-pointer invocations so far.
    pub fn callback_count(&self) -> usize {
        self.callback_count
    }

    /// Messages of the assertion failures raised so far.
    pub fn assertions(&self) -> &[String] {
        &self.assertions
    }
}

impl Default for MockContext {
    fn default() -> Self {
        Self::new()
    }
}

fn array_of<'a>(value: &'a Value, op: &str) -> Result<&'a ArrayValue, EvalError> {
    value
        .as_array()
        .ok_or_else(|| EvalError::new(format!("{op} expects an array, got {}", value.type_name())))
}

impl Context for MockContext {
    fn current_position(&self) -> Option<Position> {
        self.position
    }

    fn array_copy(&mut self, value: &Value) -> Value {
        match array_of(value, "copy") {
            Ok(array) => Value::Array(array.copy_storage()),
            Err(err) => self.new_error(err.message),
        }
    }

    fn array_reverse(&mut self, value: &Value) -> Value {
        match array_of(value, "reverse") {
            Ok(array) => {
                array.reverse();
                Value::Nil
            }
            Err(err) => self.new_error(err.message),
        }
    }

    /// Sorts integer or string arrays.
    fn array_sort(&mut self, value: &Value) -> Value {
        let array = match array_of(value, "sort") {
            Ok(array) => array,
            Err(err) => return self.new_error(err.message),
        };
        let mut elements = array.snapshot();
        elements.sort_by(|a, b| match (a, b) {
            (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
            (Value::String(x), Value::String(y)) => x.cmp(y),
            _ => Ordering::Equal,
        });
        array.set_elements(elements);
        Value::Nil
    }

    fn set_array_length(&mut self, value: &Value, len: usize) -> Result<(), EvalError> {
        let array = array_of(value, "SetLength")?;
        if array.is_static() {
            return Err(errors::static_array_mutation("SetLength"));
        }
        let element = array.array_type().map(|ty| ty.element.clone());
        array.truncate_or_pad(len, || element.as_ref().map_or(Value::Nil, zero_value));
        Ok(())
    }

    fn low_bound(&self, value: &Value) -> Result<Value, EvalError> {
        Ok(Value::int(array_of(value, "Low")?.low_bound()))
    }

    fn high_bound(&self, value: &Value) -> Result<Value, EvalError> {
        let array = array_of(value, "High")?;
        Ok(Value::int(array.low_bound() + array.len() as i64 - 1))
    }

    fn eval_function_pointer(&mut self, func: &Value, args: &[Value]) -> Value {
        let Some(pointer) = func.as_function_pointer() else {
            return self.new_error(errors::not_callable(func.type_name()).message);
        };
        if pointer.param_count != args.len() {
            return self.new_error(
                errors::wrong_arg_count(&pointer.name, pointer.param_count, args.len()).message,
            );
        }
        self.callback_count += 1;
        match &pointer.callable {
            Callable::Native(f) => f(self, args),
            Callable::Lambda { .. } => self.new_error("MockContext cannot evaluate lambdas".into()),
        }
    }

    fn parse_json(&self, text: &str) -> Result<Value, EvalError> {
        self.json_documents
            .get(text)
            .cloned()
            .ok_or_else(|| EvalError::new(format!("no mock document for {text:?}")))
    }

    fn value_to_json(&self, value: &Value, indent: Option<usize>) -> Result<String, EvalError> {
        match (value, indent) {
            (Value::Error(_), _) => Err(EvalError::new("cannot serialize an error")),
            (Value::String(s), _) => Ok(format!("{:?}", &**s)),
            (other, None) => Ok(other.to_string()),
            (other, Some(width)) => Ok(format!("{}{other}", " ".repeat(width))),
        }
    }

    fn type_of(&self, value: &Value) -> String {
        match value {
            Value::Integer(_) => "Integer".into(),
            Value::Float(_) => "Float".into(),
            Value::String(_) => "String".into(),
            Value::Boolean(_) => "Boolean".into(),
            other => other.type_name().into(),
        }
    }

    fn class_of(&self, value: &Value) -> String {
        match value {
            Value::TypeMeta(Type::Class(class)) => class.name.clone(),
            _ => String::new(),
        }
    }

    fn call_stack_string(&self) -> String {
        self.frames
            .iter()
            .rev()
            .map(|(name, pos)| format!("{name} [line: {}, column: {}]", pos.line, pos.column))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn call_stack_array(&self) -> Value {
        Value::array(
            self.frames
                .iter()
                .rev()
                .map(|(name, pos)| {
                    Value::Record(RecordValue::anonymous(vec![
                        ("FunctionName".to_string(), Value::string(name.clone())),
                        ("Line".to_string(), Value::int(i64::from(pos.line))),
                        ("Column".to_string(), Value::int(i64::from(pos.column))),
                    ]))
                })
                .collect(),
        )
    }

    fn rand_source(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }

    fn rand_seed(&self) -> i64 {
        self.seed
    }

    fn set_rand_seed(&mut self, seed: i64) {
        self.seed = seed;
        self.rng = StdRng::seed_from_u64(seed as u64);
    }

    fn raise_assertion_failed(&mut self, custom_message: Option<&str>) {
        let mut message = String::from("Assertion failed");
        if let Some(custom) = custom_message {
            message.push_str(" : ");
            message.push_str(custom);
        }
        self.assertions.push(message);
    }
}

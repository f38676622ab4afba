//! `Context` implementation: the services built-ins get from the host.

use std::cmp::Ordering;

use dws_ir::Position;
use dws_runtime::errors::{self, EvalError};
use dws_runtime::{ArrayValue, Context, RecordValue, Value};
use dws_types::Type;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use super::{json, seed_bits, Exception, Interpreter};
use crate::records::RecordEngine;

fn array_of<'a>(value: &'a Value, op: &str) -> Result<&'a ArrayValue, EvalError> {
    value
        .as_array()
        .ok_or_else(|| errors::type_mismatch(&format!("array for {op}"), value.type_name()))
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Default sort order. Only homogeneous scalar arrays have one.
fn sort_key_order(elements: &[Value]) -> Result<fn(&Value, &Value) -> Ordering, EvalError> {
    let Some(first) = elements.first() else {
        return Ok(|_, _| Ordering::Equal);
    };
    let tag = first.type_name();
    if let Some(other) = elements.iter().find(|v| v.type_name() != tag) {
        return Err(EvalError::new(format!(
            "cannot sort array with mixed element types {tag} and {}",
            other.type_name()
        )));
    }
    match first {
        Value::Integer(_) => Ok(|a, b| a.as_int().cmp(&b.as_int())),
        Value::Float(_) => Ok(|a, b| match (a, b) {
            (Value::Float(x), Value::Float(y)) => x.total_cmp(y),
            _ => Ordering::Equal,
        }),
        Value::String(_) => Ok(|a, b| a.as_str().cmp(&b.as_str())),
        Value::Boolean(_) => Ok(|a, b| a.as_bool().cmp(&b.as_bool())),
        other => Err(EvalError::new(format!(
            "cannot sort array of {} without a comparator",
            other.type_name()
        ))),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Bound {
    Low,
    High,
}

impl Bound {
    fn describe(self) -> &'static str {
        match self {
            Bound::Low => "low bound",
            Bound::High => "high bound",
        }
    }
}

impl Interpreter {
    fn bound_of(&self, value: &Value, bound: Bound) -> Result<Value, EvalError> {
        let pick = |low: i64, high: i64| match bound {
            Bound::Low => low,
            Bound::High => high,
        };
        match value {
            Value::Array(array) => {
                let low = array.low_bound();
                let high = low
                    .checked_add(count(array.len()) - 1)
                    .ok_or_else(|| no_bound(value, bound))?;
                Ok(Value::int(pick(low, high)))
            }
            Value::String(s) => Ok(Value::int(pick(1, count(s.chars().count())))),
            Value::Enum(member) => {
                let enum_type = self
                    .types
                    .lookup_enum(&member.type_name)
                    .ok_or_else(|| errors::unknown_type(&member.type_name))?;
                let edge = match bound {
                    Bound::Low => enum_type.first(),
                    Bound::High => enum_type.last(),
                };
                edge.map(|m| Value::enumeration(enum_type.name.clone(), m.name.clone(), m.ordinal))
                    .ok_or_else(|| no_bound(value, bound))
            }
            Value::Variant(inner) => self.bound_of(inner, bound),
            Value::TypeMeta(ty) => type_bound(ty, bound).ok_or_else(|| no_bound(value, bound)),
            other => Err(no_bound(other, bound)),
        }
    }
}

fn no_bound(value: &Value, bound: Bound) -> EvalError {
    EvalError::new(format!("{} has no {}", value.type_name(), bound.describe()))
}

/// `Low(T)` / `High(T)` for a type used as a value.
fn type_bound(ty: &Type, bound: Bound) -> Option<Value> {
    let low = bound == Bound::Low;
    match ty {
        Type::Integer => Some(Value::int(if low { i64::MIN } else { i64::MAX })),
        Type::Float => Some(Value::float(if low { f64::MIN } else { f64::MAX })),
        Type::Boolean => Some(Value::bool(!low)),
        Type::Enum(enum_type) => {
            let edge = if low {
                enum_type.first()
            } else {
                enum_type.last()
            }?;
            Some(Value::enumeration(
                enum_type.name.clone(),
                edge.name.clone(),
                edge.ordinal,
            ))
        }
        Type::Subrange(range) => Some(Value::int(if low { range.low } else { range.high })),
        Type::Array(array) => {
            let (l, h) = array.bounds?;
            Some(Value::int(if low { l } else { h }))
        }
        _ => None,
    }
}

impl Context for Interpreter {
    fn current_position(&self) -> Option<Position> {
        Some(self.position)
    }

    fn array_copy(&mut self, value: &Value) -> Value {
        match array_of(value, "Copy") {
            Ok(array) => Value::Array(array.copy_storage()),
            Err(err) => self.new_error(err.message),
        }
    }

    fn array_reverse(&mut self, value: &Value) -> Value {
        match array_of(value, "Reverse") {
            Ok(array) => {
                array.reverse();
                Value::Nil
            }
            Err(err) => self.new_error(err.message),
        }
    }

    fn array_sort(&mut self, value: &Value) -> Value {
        let array = match array_of(value, "Sort") {
            Ok(array) => array,
            Err(err) => return self.new_error(err.message),
        };
        let mut elements = array.snapshot();
        match sort_key_order(&elements) {
            Ok(order) => {
                elements.sort_by(order);
                array.set_elements(elements);
                Value::Nil
            }
            Err(err) => self.new_error(err.message),
        }
    }

    fn set_array_length(&mut self, value: &Value, len: usize) -> Result<(), EvalError> {
        let array = array_of(value, "SetLength")?;
        let Some(array_type) = array.array_type() else {
            return Err(EvalError::new("array has no type information"));
        };
        if array_type.is_static() {
            return Err(errors::static_array_mutation("SetLength"));
        }

        let current = array.len();
        if len <= current {
            array.truncate_or_pad(len, || Value::Nil);
            return Ok(());
        }
        // Record elements are instantiated before the storage is locked.
        let mut padding = Vec::with_capacity(len - current);
        for _ in current..len {
            let element = match &array_type.element {
                Type::Record(record_type) => RecordEngine::new(self).instantiate(record_type)?,
                other => dws_runtime::zero_value(other),
            };
            padding.push(element);
        }
        let mut padding = padding.into_iter();
        array.truncate_or_pad(len, || padding.next().unwrap_or(Value::Nil));
        Ok(())
    }

    fn low_bound(&self, value: &Value) -> Result<Value, EvalError> {
        self.bound_of(value, Bound::Low)
    }

    fn high_bound(&self, value: &Value) -> Result<Value, EvalError> {
        self.bound_of(value, Bound::High)
    }

    fn eval_function_pointer(&mut self, func: &Value, args: &[Value]) -> Value {
        Value::from_result(self.call_function_pointer(func, args))
    }

    fn parse_json(&self, text: &str) -> Result<Value, EvalError> {
        json::parse(text)
    }

    fn value_to_json(&self, value: &Value, indent: Option<usize>) -> Result<String, EvalError> {
        json::serialize(value, indent)
    }

    fn type_of(&self, value: &Value) -> String {
        match value {
            Value::Integer(_) => "Integer".into(),
            Value::Float(_) => "Float".into(),
            Value::String(_) => "String".into(),
            Value::Boolean(_) => "Boolean".into(),
            Value::Nil => "Nil".into(),
            Value::Array(array) => array
                .array_type()
                .map_or_else(|| "array".to_string(), |ty| ty.to_string()),
            Value::Record(record) => record.type_name().unwrap_or_else(|| "record".into()),
            Value::Enum(member) => member.type_name.clone(),
            Value::FunctionPointer(_) => "function pointer".into(),
            Value::InterfaceInstance(instance) => instance.interface.name.clone(),
            Value::Variant(_) => "Variant".into(),
            Value::TypeMeta(ty) => ty.name(),
            Value::Error(_) => "Error".into(),
        }
    }

    fn class_of(&self, value: &Value) -> String {
        match value {
            Value::TypeMeta(Type::Class(class)) => class.name.clone(),
            Value::Variant(inner) => self.class_of(inner),
            _ => String::new(),
        }
    }

    fn call_stack_string(&self) -> String {
        self.call_stack.render()
    }

    fn call_stack_array(&self) -> Value {
        Value::array(
            self.call_stack
                .frames()
                .iter()
                .rev()
                .map(|frame| {
                    Value::Record(RecordValue::anonymous(vec![
                        (
                            "FunctionName".to_string(),
                            Value::string(frame.function_name.clone()),
                        ),
                        ("Line".to_string(), Value::int(i64::from(frame.position.line))),
                        (
                            "Column".to_string(),
                            Value::int(i64::from(frame.position.column)),
                        ),
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
        self.rng = StdRng::seed_from_u64(seed_bits(seed));
    }

    fn raise_assertion_failed(&mut self, custom_message: Option<&str>) {
        let mut message = format!("Assertion failed [{}]", self.position);
        if let Some(custom) = custom_message {
            message.push_str(" : ");
            message.push_str(custom);
        }
        tracing::debug!(%message, "assertion failed");
        self.pending_exception = Some(Exception::new("EAssertionFailed", message));
        self.assertion_raised = true;
    }
}

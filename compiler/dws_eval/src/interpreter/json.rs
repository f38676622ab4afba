//! JSON conversion between script values and `serde_json`.
//!
//! Objects parse into anonymous records and arrays into untyped arrays.
//! Integers that fit in 64 bits stay integers; other numbers become floats.

use dws_runtime::errors::EvalError;
use dws_runtime::{ArrayValue, RecordValue, Value};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Number, Value as Json};

use crate::stack::ensure_sufficient_stack;

pub(super) fn parse(text: &str) -> Result<Value, EvalError> {
    let document: Json =
        serde_json::from_str(text).map_err(|err| EvalError::new(err.to_string()))?;
    Ok(from_json(document))
}

fn from_json(json: Json) -> Value {
    match json {
        Json::Null => Value::Nil,
        Json::Bool(b) => Value::bool(b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::int(i),
            None => Value::float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::string(s),
        Json::Array(items) => Value::array(items.into_iter().map(from_json).collect()),
        Json::Object(entries) => Value::Record(RecordValue::anonymous(
            entries
                .into_iter()
                .map(|(key, value)| (key, from_json(value)))
                .collect(),
        )),
    }
}

pub(super) fn serialize(value: &Value, indent: Option<usize>) -> Result<String, EvalError> {
    let json = Encoder::default().encode(value)?;
    match indent {
        None => serde_json::to_string(&json).map_err(write_error),
        Some(width) => {
            let indent = " ".repeat(width);
            let mut out = Vec::new();
            let mut serializer = serde_json::Serializer::with_formatter(
                &mut out,
                PrettyFormatter::with_indent(indent.as_bytes()),
            );
            json.serialize(&mut serializer).map_err(write_error)?;
            String::from_utf8(out).map_err(|err| EvalError::new(err.to_string()))
        }
    }
}

#[cold]
fn write_error(err: serde_json::Error) -> EvalError {
    EvalError::new(err.to_string())
}

/// Composites currently being encoded, innermost last.
#[derive(Default)]
struct Encoder {
    arrays: Vec<ArrayValue>,
    records: Vec<RecordValue>,
}

impl Encoder {
    fn encode(&mut self, value: &Value) -> Result<Json, EvalError> {
        ensure_sufficient_stack(|| self.encode_inner(value))
    }

    fn encode_inner(&mut self, value: &Value) -> Result<Json, EvalError> {
        let json = match value {
            Value::Nil => Json::Null,
            Value::Boolean(b) => Json::Bool(*b),
            Value::Integer(n) => Json::Number(Number::from(*n)),
            Value::Float(f) => Number::from_f64(*f)
                .map(Json::Number)
                .ok_or_else(|| EvalError::new(format!("cannot serialize non-finite float {f}")))?,
            Value::String(s) => Json::String(s.to_string()),
            Value::Enum(member) => Json::Number(Number::from(member.ordinal)),
            Value::Array(array) => {
                if self.arrays.iter().any(|seen| seen.ptr_eq(array)) {
                    return Err(cyclic(value));
                }
                self.arrays.push(array.clone());
                let items = array
                    .snapshot()
                    .iter()
                    .map(|item| self.encode(item))
                    .collect::<Result<_, _>>();
                self.arrays.pop();
                Json::Array(items?)
            }
            Value::Record(record) => {
                if self.records.iter().any(|seen| seen.ptr_eq(record)) {
                    return Err(cyclic(value));
                }
                self.records.push(record.clone());
                let object = record
                    .fields()
                    .into_iter()
                    .map(|(name, field)| Ok((name, self.encode(&field)?)))
                    .collect::<Result<Map<_, _>, EvalError>>();
                self.records.pop();
                Json::Object(object?)
            }
            Value::Variant(inner) => self.encode(inner)?,
            Value::InterfaceInstance(instance) => match &instance.target {
                Some(target) => self.encode(target)?,
                None => Json::Null,
            },
            other @ (Value::Error(_) | Value::FunctionPointer(_) | Value::TypeMeta(_)) => {
                return Err(EvalError::new(format!(
                    "cannot serialize {} value",
                    other.type_name()
                )))
            }
        };
        Ok(json)
    }
}

#[cold]
fn cyclic(value: &Value) -> EvalError {
    EvalError::new(format!("cannot serialize {} that contains itself", value.type_name()))
}

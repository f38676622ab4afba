//! Higher-order array built-ins.
//!
//! Each takes `(array, callback[, extra])` and invokes the callback through
//! `Context::eval_function_pointer`. Callbacks run against a snapshot of
//! the elements, so they may freely read or modify the array they are
//! iterating. An Error returned by a callback is returned unchanged.

use std::slice;

use super::count;
use crate::value::{ArrayValue, Value};
use crate::Context;

/// Validated `(array, callback)` operands.
struct Operands<'a> {
    array: &'a ArrayValue,
    callback: &'a Value,
}

/// Check the argument count and the array and callback operands.
///
/// `shape` names the expected arguments for the arity message, e.g.
/// `"array, predicate"`.
fn operands<'a>(
    ctx: &dyn Context,
    name: &str,
    shape: &str,
    args: &'a [Value],
) -> Result<Operands<'a>, Value> {
    let expected = shape.split(", ").count();
    if args.len() != expected {
        return Err(ctx.new_error(format!(
            "{name}() expects {expected} arguments ({shape}), got {}",
            args.len()
        )));
    }
    let Value::Array(array) = &args[0] else {
        return Err(ctx.new_error(format!(
            "{name}() first argument must be an array, got {}",
            args[0].type_name()
        )));
    };
    if !matches!(args[1], Value::FunctionPointer(_)) {
        return Err(ctx.new_error(format!(
            "{name}() second argument must be a lambda/function, got {}",
            args[1].type_name()
        )));
    }
    Ok(Operands {
        array,
        callback: &args[1],
    })
}

/// Invoke `callback(element)`, passing an Error result through as `Err`.
fn apply(ctx: &mut dyn Context, callback: &Value, element: &Value) -> Result<Value, Value> {
    tracing::trace!("invoking collection callback");
    let result = ctx.eval_function_pointer(callback, slice::from_ref(element));
    if result.is_error() {
        Err(result)
    } else {
        Ok(result)
    }
}

/// Invoke a predicate. Anything other than a Boolean result is an error.
fn check(
    ctx: &mut dyn Context,
    name: &str,
    predicate: &Value,
    element: &Value,
) -> Result<bool, Value> {
    match apply(ctx, predicate, element)? {
        Value::Boolean(b) => Ok(b),
        other => Err(ctx.new_error(format!(
            "{name}() predicate must return Boolean, got {}",
            other.type_name()
        ))),
    }
}

/// `Map(arr, f)`: a new array of `f(x)` for each element, with the source
/// array's type.
pub(super) fn map(ctx: &mut dyn Context, args: &[Value]) -> Value {
    let Operands { array, callback } = match operands(ctx, "Map", "array, lambda", args) {
        Ok(ops) => ops,
        Err(error) => return error,
    };
    let mut mapped = Vec::with_capacity(array.len());
    for element in array.snapshot() {
        match apply(ctx, callback, &element) {
            Ok(value) => mapped.push(value),
            Err(error) => return error,
        }
    }
    Value::Array(ArrayValue::new(mapped, array.array_type()))
}

/// `Filter(arr, p)`: the elements for which `p` returns `True`, in order.
pub(super) fn filter(ctx: &mut dyn Context, args: &[Value]) -> Value {
    let Operands { array, callback } = match operands(ctx, "Filter", "array, predicate", args) {
        Ok(ops) => ops,
        Err(error) => return error,
    };
    let mut kept = Vec::new();
    for element in array.snapshot() {
        match check(ctx, "Filter", callback, &element) {
            Ok(true) => kept.push(element),
            Ok(false) => {}
            Err(error) => return error,
        }
    }
    Value::Array(ArrayValue::new(kept, array.array_type()))
}

/// `Reduce(arr, f, initial)` folds left: `acc := f(acc, x)`.
pub(super) fn reduce(ctx: &mut dyn Context, args: &[Value]) -> Value {
    let Operands { array, callback } =
        match operands(ctx, "Reduce", "array, lambda, initial", args) {
            Ok(ops) => ops,
            Err(error) => return error,
        };
    let mut accumulator = args[2].clone();
    for element in array.snapshot() {
        let result = ctx.eval_function_pointer(callback, &[accumulator, element]);
        if result.is_error() {
            return result;
        }
        accumulator = result;
    }
    accumulator
}

pub(super) fn for_each(ctx: &mut dyn Context, args: &[Value]) -> Value {
    let Operands { array, callback } = match operands(ctx, "ForEach", "array, lambda", args) {
        Ok(ops) => ops,
        Err(error) => return error,
    };
    for element in array.snapshot() {
        if let Err(error) = apply(ctx, callback, &element) {
            return error;
        }
    }
    Value::Nil
}

/// Stops at the first element that fails the predicate.
pub(super) fn every(ctx: &mut dyn Context, args: &[Value]) -> Value {
    let Operands { array, callback } = match operands(ctx, "Every", "array, predicate", args) {
        Ok(ops) => ops,
        Err(error) => return error,
    };
    for element in array.snapshot() {
        match check(ctx, "Every", callback, &element) {
            Ok(true) => {}
            Ok(false) => return Value::bool(false),
            Err(error) => return error,
        }
    }
    Value::bool(true)
}

/// Stops at the first element that passes the predicate.
pub(super) fn some(ctx: &mut dyn Context, args: &[Value]) -> Value {
    let Operands { array, callback } = match operands(ctx, "Some", "array, predicate", args) {
        Ok(ops) => ops,
        Err(error) => return error,
    };
    for element in array.snapshot() {
        match check(ctx, "Some", callback, &element) {
            Ok(true) => return Value::bool(true),
            Ok(false) => {}
            Err(error) => return error,
        }
    }
    Value::bool(false)
}

/// First matching element, or `Nil`.
pub(super) fn find(ctx: &mut dyn Context, args: &[Value]) -> Value {
    let Operands { array, callback } = match operands(ctx, "Find", "array, predicate", args) {
        Ok(ops) => ops,
        Err(error) => return error,
    };
    for element in array.snapshot() {
        match check(ctx, "Find", callback, &element) {
            Ok(true) => return element,
            Ok(false) => {}
            Err(error) => return error,
        }
    }
    Value::Nil
}

/// Index of the first match in the array's own index space (`low + i`),
/// or -1.
pub(super) fn find_index(ctx: &mut dyn Context, args: &[Value]) -> Value {
    let Operands { array, callback } =
        match operands(ctx, "FindIndex", "array, predicate", args) {
            Ok(ops) => ops,
            Err(error) => return error,
        };
    for (offset, element) in array.snapshot().iter().enumerate() {
        match check(ctx, "FindIndex", callback, element) {
            Ok(true) => return Value::int(array.low_bound().saturating_add(count(offset))),
            Ok(false) => {}
            Err(error) => return error,
        }
    }
    Value::int(-1)
}

#[cfg(test)]
mod tests;

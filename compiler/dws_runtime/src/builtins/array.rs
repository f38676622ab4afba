//! Array built-ins: `Length`, `Copy`, `Low`, `High`, `IndexOf`, `Contains`,
//! `Reverse`, `Sort`, `Add`, `Delete`, `SetLength`, `Concat`, `Slice`.
//!
//! Functions that modify an array mutate the shared storage of the value
//! they were given and return `Nil`. Functions that derive an array always
//! allocate new storage.

use super::{count, integer_arg};
use crate::errors;
use crate::value::{ArrayValue, Value};
use crate::Context;

/// `Length(arr)` / `Length(str)`. Strings count code points.
pub(super) fn length(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if args.len() != 1 {
        return ctx.new_error(format!(
            "Length() expects exactly 1 argument, got {}",
            args.len()
        ));
    }
    if let Some(len) = ctx.array_length(&args[0]) {
        return Value::int(len);
    }
    match &args[0] {
        Value::String(s) => Value::int(count(s.chars().count())),
        other => ctx.new_error(format!(
            "Length() expects array or string, got {}",
            other.type_name()
        )),
    }
}

/// `Copy(arr)` duplicates an array; `Copy(str, index, count)` takes a
/// 1-based substring.
pub(super) fn copy(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if args.len() == 1 {
        return ctx.array_copy(&args[0]);
    }
    if args.len() != 3 {
        return ctx.new_error(format!(
            "Copy() expects either 1 argument (array) or 3 arguments (string), got {}",
            args.len()
        ));
    }
    let Value::String(text) = &args[0] else {
        return ctx.new_error(format!(
            "Copy() expects string as first argument, got {}",
            args[0].type_name()
        ));
    };
    let Some(index) = integer_arg(ctx, &args[1]) else {
        return ctx.new_error(format!(
            "Copy() expects integer as second argument, got {}",
            args[1].type_name()
        ));
    };
    let Some(len) = integer_arg(ctx, &args[2]) else {
        return ctx.new_error(format!(
            "Copy() expects integer as third argument, got {}",
            args[2].type_name()
        ));
    };
    Value::string(substring(text, index, len))
}

/// Code points `index..index + len` of `text`, with `index` 1-based.
/// Out-of-range starts and negative counts give the empty string.
fn substring(text: &str, index: i64, len: i64) -> String {
    let start = usize::try_from(index.saturating_sub(1));
    let (Ok(start), Ok(len)) = (start, usize::try_from(len)) else {
        return String::new();
    };
    text.chars().skip(start).take(len).collect()
}

pub(super) fn low(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if args.len() != 1 {
        return ctx.new_error(format!(
            "Low() expects exactly 1 argument, got {}",
            args.len()
        ));
    }
    match ctx.low_bound(&args[0]) {
        Ok(bound) => bound,
        Err(err) => ctx.new_error(format!("Low() failed: {}", err.message)),
    }
}

pub(super) fn high(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if args.len() != 1 {
        return ctx.new_error(format!(
            "High() expects exactly 1 argument, got {}",
            args.len()
        ));
    }
    match ctx.high_bound(&args[0]) {
        Ok(bound) => bound,
        Err(err) => ctx.new_error(format!("High() failed: {}", err.message)),
    }
}

/// `IndexOf(arr, value[, start])`. Positions are 0-based regardless of the
/// array's low bound.
pub(super) fn index_of(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if !(2..=3).contains(&args.len()) {
        return ctx.new_error(format!(
            "IndexOf() expects 2 or 3 arguments, got {}",
            args.len()
        ));
    }
    let Value::Array(array) = &args[0] else {
        return ctx.new_error(format!(
            "IndexOf() expects array as first argument, got {}",
            args[0].type_name()
        ));
    };
    let start = match args.get(2) {
        None => 0,
        Some(arg) => match integer_arg(ctx, arg) {
            Some(n) => n,
            None => {
                return ctx.new_error(format!(
                    "IndexOf() expects integer as third argument, got {}",
                    arg.type_name()
                ))
            }
        },
    };

    let elements = array.snapshot();
    let Some(start) = usize::try_from(start).ok().filter(|&s| s < elements.len()) else {
        return Value::int(-1);
    };
    elements[start..]
        .iter()
        .position(|element| element.scalar_equals(&args[1]))
        .map_or(Value::int(-1), |offset| Value::int(count(start + offset)))
}

pub(super) fn contains(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if args.len() != 2 {
        return ctx.new_error(format!(
            "Contains() expects 2 arguments, got {}",
            args.len()
        ));
    }
    let Value::Array(array) = &args[0] else {
        return ctx.new_error(format!(
            "Contains() expects array as first argument, got {}",
            args[0].type_name()
        ));
    };
    Value::bool(
        array
            .snapshot()
            .iter()
            .any(|element| element.scalar_equals(&args[1])),
    )
}

pub(super) fn reverse(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if args.len() != 1 {
        return ctx.new_error(format!(
            "Reverse() expects 1 argument, got {}",
            args.len()
        ));
    }
    ctx.array_reverse(&args[0])
}

/// `Sort(arr)` uses the host's default order. `Sort(arr, cmp)` runs a
/// bubble sort that swaps a pair whenever `cmp(a, b) > 0`.
///
/// The comparator sees a snapshot of the elements; the sorted order is
/// written back once every comparison has succeeded.
pub(super) fn sort(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if !(1..=2).contains(&args.len()) {
        return ctx.new_error(format!(
            "Sort() expects 1 or 2 arguments, got {}",
            args.len()
        ));
    }
    let Value::Array(array) = &args[0] else {
        return ctx.new_error(format!(
            "Sort() expects array as first argument, got {}",
            args[0].type_name()
        ));
    };
    let Some(comparator) = args.get(1) else {
        return ctx.array_sort(&args[0]);
    };
    let Value::FunctionPointer(pointer) = comparator else {
        return ctx.new_error(format!(
            "Sort() expects function pointer as second argument, got {}",
            comparator.type_name()
        ));
    };
    if pointer.param_count != 2 {
        return ctx.new_error(format!(
            "Sort() comparator must accept 2 parameters, got {}",
            pointer.param_count
        ));
    }

    let mut elements = array.snapshot();
    let n = elements.len();
    for pass in 0..n.saturating_sub(1) {
        for j in 0..n - pass - 1 {
            let pair = [elements[j].clone(), elements[j + 1].clone()];
            let result = ctx.eval_function_pointer(comparator, &pair);
            if result.is_error() {
                return result;
            }
            let Some(order) = integer_arg(ctx, &result) else {
                return ctx.new_error(format!(
                    "Sort() comparator must return Integer, got {}",
                    result.type_name()
                ));
            };
            if order > 0 {
                elements.swap(j, j + 1);
            }
        }
    }
    array.set_elements(elements);
    Value::Nil
}

/// Dynamic-array operand of `Add` / `Delete`, or the Error to return.
fn dynamic_array<'a>(
    ctx: &dyn Context,
    name: &str,
    value: &'a Value,
) -> Result<&'a ArrayValue, Value> {
    let Value::Array(array) = value else {
        return Err(ctx.new_error(format!(
            "{name}() expects array as first argument, got {}",
            value.type_name()
        )));
    };
    if array.is_static() {
        return Err(ctx.new_error(errors::static_array_mutation(name).message));
    }
    Ok(array)
}

pub(super) fn add(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if args.len() != 2 {
        return ctx.new_error(format!(
            "Add() expects exactly 2 arguments, got {}",
            args.len()
        ));
    }
    match dynamic_array(ctx, "Add", &args[0]) {
        Ok(array) => {
            array.push(args[1].clone());
            Value::Nil
        }
        Err(error) => error,
    }
}

/// `Delete(arr, index)` with a 0-based index.
pub(super) fn delete(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if args.len() != 2 {
        return ctx.new_error(format!(
            "Delete() expects exactly 2 arguments, got {}",
            args.len()
        ));
    }
    let array = match dynamic_array(ctx, "Delete", &args[0]) {
        Ok(array) => array,
        Err(error) => return error,
    };
    let Some(index) = integer_arg(ctx, &args[1]) else {
        return ctx.new_error(format!(
            "Delete() expects integer as second argument, got {}",
            args[1].type_name()
        ));
    };
    let removed = usize::try_from(index)
        .ok()
        .and_then(|offset| array.remove(offset));
    if removed.is_none() {
        let error = errors::index_out_of_bounds(index, array.len());
        return ctx.new_error(format!("Delete() {}", error.message));
    }
    Value::Nil
}

/// `SetLength(arr, n)` resizes the array in place and returns `Nil`.
///
/// Strings are immutable, so `SetLength(str, n)` returns the resized string
/// (truncated by code points or padded with spaces) for the caller to store
/// back into the variable.
pub(super) fn set_length(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if args.len() != 2 {
        return ctx.new_error(format!(
            "SetLength() expects exactly 2 arguments, got {}",
            args.len()
        ));
    }
    let Some(new_len) = integer_arg(ctx, &args[1]) else {
        return ctx.new_error(format!(
            "SetLength() expects integer as second argument, got {}",
            args[1].type_name()
        ));
    };
    let Ok(new_len) = usize::try_from(new_len) else {
        let error = errors::negative_length(new_len);
        return ctx.new_error(format!("SetLength() {}", error.message));
    };

    if let Value::String(text) = &args[0] {
        let mut resized: String = text.chars().take(new_len).collect();
        let missing = new_len.saturating_sub(resized.chars().count());
        resized.extend(std::iter::repeat_n(' ', missing));
        return Value::string(resized);
    }
    match ctx.set_array_length(&args[0], new_len) {
        Ok(()) => Value::Nil,
        Err(err) => ctx.new_error(format!("SetLength() failed: {}", err.message)),
    }
}

/// `Concat(a, b, ...)`. The result takes the type of the first argument
/// that carries one.
pub(super) fn concat(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if args.is_empty() {
        return ctx.new_error(format!(
            "Concat() expects at least 1 argument, got {}",
            args.len()
        ));
    }
    let mut elements = Vec::new();
    let mut array_type = None;
    for (position, arg) in args.iter().enumerate() {
        let Value::Array(array) = arg else {
            return ctx.new_error(format!(
                "Concat() argument {} must be an array, got {}",
                position + 1,
                arg.type_name()
            ));
        };
        if array_type.is_none() {
            array_type = array.array_type();
        }
        elements.extend(array.snapshot());
    }
    Value::Array(ArrayValue::new(elements, array_type))
}

/// `Slice(arr, start, end)`: the half-open range `[start, end)` in the
/// array's index space, clamped to the elements that exist.
pub(super) fn slice(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if args.len() != 3 {
        return ctx.new_error(format!(
            "Slice() expects 3 arguments (array, start, end), got {}",
            args.len()
        ));
    }
    let Value::Array(array) = &args[0] else {
        return ctx.new_error(format!(
            "Slice() first argument must be an array, got {}",
            args[0].type_name()
        ));
    };
    let Some(start) = integer_arg(ctx, &args[1]) else {
        return ctx.new_error(format!(
            "Slice() second argument (start) must be an Integer, got {}",
            args[1].type_name()
        ));
    };
    let Some(end) = integer_arg(ctx, &args[2]) else {
        return ctx.new_error(format!(
            "Slice() third argument (end) must be an Integer, got {}",
            args[2].type_name()
        ));
    };

    let elements = array.snapshot();
    let (from, to) = clamp_range(start, end, array.low_bound(), elements.len());
    Value::Array(ArrayValue::new(
        elements[from..to].to_vec(),
        array.array_type(),
    ))
}

/// Offsets of `[start, end)` relative to `low`, clamped into `0..=len` with
/// `from <= to`.
fn clamp_range(start: i64, end: i64, low: i64, len: usize) -> (usize, usize) {
    let clamp = |index: i64| {
        usize::try_from(index.saturating_sub(low).max(0))
            .unwrap_or(usize::MAX)
            .min(len)
    };
    let to = clamp(end);
    (clamp(start).min(to), to)
}

#[cfg(test)]
mod tests;

//! Call-stack, assertion, type, JSON and random-number built-ins.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::value::Value;
use crate::Context;

/// Error for a built-in that takes no arguments, or `None` if none were
/// given.
fn expect_no_args(ctx: &dyn Context, name: &str, args: &[Value]) -> Option<Value> {
    (!args.is_empty())
        .then(|| ctx.new_error(format!("{name} expects no arguments, got {}", args.len())))
}

fn expect_one_arg(ctx: &dyn Context, name: &str, args: &[Value]) -> Option<Value> {
    (args.len() != 1).then(|| {
        ctx.new_error(format!(
            "{name} expects exactly 1 argument, got {}",
            args.len()
        ))
    })
}

// Call stack

pub(super) fn get_stack_trace(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if let Some(error) = expect_no_args(ctx, "GetStackTrace()", args) {
        return error;
    }
    Value::string(ctx.call_stack_string())
}

pub(super) fn get_call_stack(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if let Some(error) = expect_no_args(ctx, "GetCallStack()", args) {
        return error;
    }
    ctx.call_stack_array()
}

pub(super) fn assigned(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if let Some(error) = expect_one_arg(ctx, "Assigned()", args) {
        return error;
    }
    Value::bool(ctx.is_assigned(&args[0]))
}

/// `Assert(cond[, message])`. A false condition is raised through the
/// host's exception path; the return value is then `Nil`.
pub(super) fn assert(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if !(1..=2).contains(&args.len()) {
        return ctx.new_error(format!(
            "Assert() expects 1-2 arguments, got {}",
            args.len()
        ));
    }
    let Value::Boolean(holds) = args[0] else {
        return ctx.new_error(format!(
            "Assert() first argument must be Boolean, got {}",
            args[0].type_name()
        ));
    };
    if holds {
        return Value::Nil;
    }
    let message = match args.get(1) {
        None => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => {
            return ctx.new_error(format!(
                "Assert() second argument must be String, got {}",
                other.type_name()
            ))
        }
    };
    ctx.raise_assertion_failed(message.as_deref());
    Value::Nil
}

// Type

pub(super) fn type_of(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if let Some(error) = expect_one_arg(ctx, "TypeOf()", args) {
        return error;
    }
    Value::string(ctx.type_of(&args[0]))
}

pub(super) fn type_of_class(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if let Some(error) = expect_one_arg(ctx, "TypeOfClass()", args) {
        return error;
    }
    let class_name = ctx.class_of(&args[0]);
    if class_name.is_empty() {
        return ctx.new_error(format!(
            "TypeOfClass() expects a class reference, got {}",
            args[0].type_name()
        ));
    }
    Value::string(class_name)
}

// JSON

/// `ParseJSON(text)`. The parsed value comes back boxed as a Variant.
pub(super) fn parse_json(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if let Some(error) = expect_one_arg(ctx, "ParseJSON()", args) {
        return error;
    }
    let Value::String(text) = &args[0] else {
        return ctx.new_error(format!(
            "ParseJSON() expects String argument, got {}",
            args[0].type_name()
        ));
    };
    match ctx.parse_json(text) {
        Ok(value) => Value::variant(value),
        Err(err) => ctx.new_error(format!("JSON parse error: {}", err.message)),
    }
}

pub(super) fn to_json(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if let Some(error) = expect_one_arg(ctx, "ToJSON()", args) {
        return error;
    }
    match ctx.value_to_json(&args[0], None) {
        Ok(json) => Value::string(json),
        Err(err) => ctx.new_error(format!("ToJSON() serialization error: {}", err.message)),
    }
}

/// `ToJSONFormatted(value, indent)`.
pub(super) fn to_json_formatted(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if args.len() != 2 {
        return ctx.new_error(format!(
            "ToJSONFormatted() expects exactly 2 arguments, got {}",
            args.len()
        ));
    }
    let Value::Integer(indent) = args[1] else {
        return ctx.new_error(format!(
            "ToJSONFormatted() expects Integer as second argument, got {}",
            args[1].type_name()
        ));
    };
    let Ok(indent) = usize::try_from(indent) else {
        return ctx.new_error(format!(
            "ToJSONFormatted() indent must be non-negative, got {indent}"
        ));
    };
    match ctx.value_to_json(&args[0], Some(indent)) {
        Ok(json) => Value::string(json),
        Err(err) => ctx.new_error(format!(
            "ToJSONFormatted() serialization error: {}",
            err.message
        )),
    }
}

// Random numbers

/// `Random()`: a Float in `[0, 1)`.
pub(super) fn random(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if let Some(error) = expect_no_args(ctx, "Random()", args) {
        return error;
    }
    Value::float(ctx.rand_source().gen::<f64>())
}

/// `RandomInt(max)`: an Integer in `[0, max)`.
pub(super) fn random_int(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if let Some(error) = expect_one_arg(ctx, "RandomInt()", args) {
        return error;
    }
    let Value::Integer(max) = args[0] else {
        return ctx.new_error(format!(
            "RandomInt() expects Integer as argument, got {}",
            args[0].type_name()
        ));
    };
    if max <= 0 {
        return ctx.new_error(format!("RandomInt() expects max > 0, got {max}"));
    }
    Value::int(ctx.rand_source().gen_range(0..max))
}

/// `Randomize()` reseeds from the clock.
pub(super) fn randomize(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if let Some(error) = expect_no_args(ctx, "Randomize()", args) {
        return error;
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    ctx.set_rand_seed(i64::try_from(nanos).unwrap_or(i64::MAX));
    Value::Nil
}

pub(super) fn set_rand_seed(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if let Some(error) = expect_one_arg(ctx, "SetRandSeed()", args) {
        return error;
    }
    let Value::Integer(seed) = args[0] else {
        return ctx.new_error(format!(
            "SetRandSeed() expects Integer, got {}",
            args[0].type_name()
        ));
    };
    ctx.set_rand_seed(seed);
    Value::Nil
}

pub(super) fn rand_seed(ctx: &mut dyn Context, args: &[Value]) -> Value {
    if let Some(error) = expect_no_args(ctx, "RandSeed", args) {
        return error;
    }
    Value::int(ctx.rand_seed())
}

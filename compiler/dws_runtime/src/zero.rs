//! Zero values for declared types.

use std::sync::Arc;

use dws_types::Type;

use crate::value::Value;

/// Default value of a variable or field of type `ty`.
///
/// Records and interfaces are left to the record engine, which needs an
/// evaluator for field initializers; they come back as `Nil` here.
pub fn zero_value(ty: &Type) -> Value {
    match ty {
        Type::Integer => Value::int(0),
        Type::Float => Value::float(0.0),
        Type::String => Value::string(""),
        Type::Boolean => Value::bool(false),
        Type::Enum(e) => e.first().map_or(Value::Nil, |first| {
            Value::enumeration(e.name.clone(), first.name.clone(), first.ordinal)
        }),
        Type::Subrange(s) => Value::int(s.low),
        Type::Array(a) => {
            let elements = match a.static_len() {
                Some(len) => std::iter::repeat_with(|| zero_value(&a.element))
                    .take(len)
                    .collect(),
                None => Vec::new(),
            };
            Value::typed_array(Arc::clone(a), elements)
        }
        Type::Variant
        | Type::Nil
        | Type::Record(_)
        | Type::Class(_)
        | Type::Interface(_)
        | Type::FunctionPointer(_) => Value::Nil,
    }
}

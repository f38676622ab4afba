//! The built-in catalogue: array, collection and system functions.
//!
//! Every function has the `BuiltinFn` shape. Argument problems come back
//! as Error values built with `Context::new_error`; nothing here panics or
//! returns `Result`.

mod array;
mod collections;
mod system;

use crate::registry::{Category, FunctionInfo, Registry, Signature};
use crate::value::Value;
use crate::{BuiltinFn, Context};

/// Install every built-in this crate provides.
pub fn register_all(registry: &Registry) {
    register_array_functions(registry);
    register_collection_functions(registry);
    register_system_functions(registry);
}

/// `Length`, `Copy`, `Low`, `High`, `IndexOf`, `Contains`, `Reverse`, `Sort`,
/// `Add`, `Delete`, `SetLength`, `Concat`, `Slice`.
pub fn register_array_functions(registry: &Registry) {
    let entry = |name: &str, function: BuiltinFn, description: &str, signature: Signature| {
        FunctionInfo::new(name, function, Category::Array, description).with_signature(signature)
    };
    registry.register_batch([
        entry(
            "Length",
            array::length,
            "Returns the number of elements in an array or characters in a string",
            Signature::exact(&["array|String"], Some("Integer")),
        ),
        entry(
            "Copy",
            array::copy,
            "Creates a deep copy of an array or returns a substring",
            Signature::exact(&["array|String", "Integer", "Integer"], Some("array|String"))
                .with_min_args(1),
        ),
        entry(
            "Low",
            array::low,
            "Returns the lower bound of an array",
            Signature::exact(&["array|enum|type"], Some("Variant")),
        ),
        entry(
            "High",
            array::high,
            "Returns the upper bound of an array",
            Signature::exact(&["array|enum|type"], Some("Variant")),
        ),
        entry(
            "IndexOf",
            array::index_of,
            "Returns the index of the first occurrence of a value",
            Signature::exact(&["array", "Variant", "Integer"], Some("Integer")).with_min_args(2),
        ),
        entry(
            "Contains",
            array::contains,
            "Checks if an array contains a specific value",
            Signature::exact(&["array", "Variant"], Some("Boolean")),
        ),
        entry(
            "Reverse",
            array::reverse,
            "Reverses the elements of an array in place",
            Signature::exact(&["array"], None),
        ),
        entry(
            "Sort",
            array::sort,
            "Sorts the elements of an array in place",
            Signature::exact(&["array", "function(a, b): Integer"], None).with_min_args(1),
        ),
        entry(
            "Add",
            array::add,
            "Appends an element to the end of a dynamic array",
            Signature::exact(&["array", "Variant"], None),
        ),
        entry(
            "Delete",
            array::delete,
            "Removes an element at the specified index from a dynamic array",
            Signature::exact(&["array", "Integer"], None),
        ),
        entry(
            "SetLength",
            array::set_length,
            "Resizes a dynamic array or string to the specified length",
            Signature::exact(&["array|String", "Integer"], None),
        ),
        entry(
            "Concat",
            array::concat,
            "Concatenates multiple arrays into a new array",
            Signature::exact(&["array"], Some("array")).variadic(),
        ),
        entry(
            "Slice",
            array::slice,
            "Extracts a portion of an array",
            Signature::exact(&["array", "Integer", "Integer"], Some("array")),
        ),
    ]);
}

/// `Map`, `Filter`, `Reduce`, `ForEach`, `Every`, `Some`, `Find`, `FindIndex`.
pub fn register_collection_functions(registry: &Registry) {
    let entry = |name: &str, function: BuiltinFn, description: &str, signature: Signature| {
        FunctionInfo::new(name, function, Category::Collections, description)
            .with_signature(signature)
    };
    let with_callback =
        |callback: &str, ret: Option<&str>| Signature::exact(&["array", callback], ret);
    registry.register_batch([
        entry(
            "Map",
            collections::map,
            "Transforms each element of an array using a callback function",
            with_callback("function(x): Variant", Some("array")),
        ),
        entry(
            "Filter",
            collections::filter,
            "Creates a new array containing only elements that match a predicate",
            with_callback("function(x): Boolean", Some("array")),
        ),
        entry(
            "Reduce",
            collections::reduce,
            "Reduces an array to a single value using an accumulator function",
            Signature::exact(&["array", "function(acc, x): Variant", "Variant"], Some("Variant")),
        ),
        entry(
            "ForEach",
            collections::for_each,
            "Executes a function for each element of an array",
            with_callback("procedure(x)", None),
        ),
        entry(
            "Every",
            collections::every,
            "Checks if all elements of an array match a predicate",
            with_callback("function(x): Boolean", Some("Boolean")),
        ),
        entry(
            "Some",
            collections::some,
            "Checks if any element of an array matches a predicate",
            with_callback("function(x): Boolean", Some("Boolean")),
        ),
        entry(
            "Find",
            collections::find,
            "Returns the first element that matches a predicate",
            with_callback("function(x): Boolean", Some("Variant")),
        ),
        entry(
            "FindIndex",
            collections::find_index,
            "Returns the index of the first element that matches a predicate",
            with_callback("function(x): Boolean", Some("Integer")),
        ),
    ]);
}

/// Call-stack, assertion, type, JSON and random-number built-ins.
pub fn register_system_functions(registry: &Registry) {
    registry.register_batch([
        FunctionInfo::new(
            "GetStackTrace",
            system::get_stack_trace,
            Category::System,
            "Returns a formatted string representation of the current call stack",
        ),
        FunctionInfo::new(
            "GetCallStack",
            system::get_call_stack,
            Category::System,
            "Returns the current call stack as an array of records",
        ),
        FunctionInfo::new(
            "Assigned",
            system::assigned,
            Category::System,
            "Checks if a value is assigned (not nil)",
        ),
        FunctionInfo::new(
            "Assert",
            system::assert,
            Category::System,
            "Validates a condition and raises EAssertionFailed if false",
        )
        .with_signature(Signature::exact(&["Boolean", "String"], None).with_min_args(1)),
        FunctionInfo::new(
            "TypeOf",
            system::type_of,
            Category::Type,
            "Returns the type name of a value",
        ),
        FunctionInfo::new(
            "TypeOfClass",
            system::type_of_class,
            Category::Type,
            "Returns the class name of an object",
        ),
        FunctionInfo::new(
            "ParseJSON",
            system::parse_json,
            Category::JSON,
            "Parses JSON string to Variant",
        ),
        FunctionInfo::new(
            "ToJSON",
            system::to_json,
            Category::JSON,
            "Converts value to compact JSON string",
        ),
        FunctionInfo::new(
            "ToJSONFormatted",
            system::to_json_formatted,
            Category::JSON,
            "Converts value to formatted JSON string",
        )
        .with_signature(Signature::exact(&["Variant", "Integer"], Some("String"))),
        FunctionInfo::new(
            "Random",
            system::random,
            Category::Math,
            "Returns a random float between 0 and 1",
        ),
        FunctionInfo::new(
            "RandomInt",
            system::random_int,
            Category::Math,
            "Returns a random integer in range",
        ),
        FunctionInfo::new(
            "Randomize",
            system::randomize,
            Category::Math,
            "Seeds the random number generator",
        ),
        FunctionInfo::new(
            "SetRandSeed",
            system::set_rand_seed,
            Category::Math,
            "Sets the random number seed",
        ),
        FunctionInfo::new(
            "RandSeed",
            system::rand_seed,
            Category::Math,
            "Returns the current random seed",
        ),
    ]);
}

// Shared argument helpers

/// Integer view of an argument: an Integer, or anything the host coerces.
fn integer_arg(ctx: &dyn Context, value: &Value) -> Option<i64> {
    match value {
        Value::Integer(n) => Some(*n),
        other => ctx.to_int64(other),
    }
}

/// Element or character count as a script integer.
fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

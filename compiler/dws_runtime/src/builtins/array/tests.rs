#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use dws_types::{ArrayType, Type};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::test_helpers::MockContext;
use crate::value::FunctionPointerValue;

fn ints(ns: &[i64]) -> Value {
    Value::array(ns.iter().copied().map(Value::int).collect())
}

fn static_ints(low: i64, ns: &[i64]) -> Value {
    let high = low + ns.len() as i64 - 1;
    Value::typed_array(
        Arc::new(ArrayType::fixed(Type::Integer, low, high)),
        ns.iter().copied().map(Value::int).collect(),
    )
}

fn elements(value: &Value) -> Vec<Value> {
    value.as_array().unwrap().snapshot()
}

fn error_of(value: &Value) -> &str {
    value
        .error_message()
        .unwrap_or_else(|| panic!("expected an Error value, got {value:?}"))
}

fn comparator(f: fn(i64, i64) -> i64) -> Value {
    Value::FunctionPointer(FunctionPointerValue::native("Compare", 2, move |_, args| {
        Value::int(f(args[0].as_int().unwrap(), args[1].as_int().unwrap()))
    }))
}

// Length / Copy

#[test]
fn length_counts_elements_and_code_points() {
    let mut ctx = MockContext::new();
    assert_eq!(length(&mut ctx, &[ints(&[1, 2, 3])]), Value::int(3));
    assert_eq!(length(&mut ctx, &[Value::string("héllo")]), Value::int(5));
    assert_eq!(length(&mut ctx, &[Value::string("")]), Value::int(0));
}

#[test]
fn length_rejects_other_arguments() {
    let mut ctx = MockContext::new();
    assert_eq!(
        error_of(&length(&mut ctx, &[])),
        "Length() expects exactly 1 argument, got 0"
    );
    assert_eq!(
        error_of(&length(&mut ctx, &[Value::int(4)])),
        "Length() expects array or string, got INTEGER"
    );
}

#[test]
fn errors_carry_the_call_position() {
    let mut ctx = MockContext::new().with_position(3, 7);
    assert_eq!(
        error_of(&length(&mut ctx, &[])),
        "Length() expects exactly 1 argument, got 0 at line 3, column 7"
    );
}

#[test]
fn copy_of_array_gets_new_storage() {
    let mut ctx = MockContext::new();
    let original = ints(&[1, 2]);
    let copied = copy(&mut ctx, std::slice::from_ref(&original));

    copied.as_array().unwrap().push(Value::int(3));
    assert_eq!(elements(&original), vec![Value::int(1), Value::int(2)]);
    assert_eq!(elements(&copied).len(), 3);
}

#[test]
fn copy_substring() {
    let mut ctx = MockContext::new();
    let cases = [
        ("Hello World", 7, 5, "World"),
        ("Hello", 1, 3, "Hel"),
        ("Hello", 10, 5, ""),
        ("Hello", 0, 3, ""),
        ("Hello", 2, -1, ""),
        ("Hello", 3, 100, "llo"),
        ("añb", 2, 1, "ñ"),
    ];
    for (text, index, count, expected) in cases {
        let result = copy(
            &mut ctx,
            &[Value::string(text), Value::int(index), Value::int(count)],
        );
        assert_eq!(result, Value::string(expected), "Copy({text:?}, {index}, {count})");
    }
}

#[test]
fn copy_argument_errors() {
    let mut ctx = MockContext::new();
    assert_eq!(
        error_of(&copy(&mut ctx, &[Value::string("a"), Value::int(1)])),
        "Copy() expects either 1 argument (array) or 3 arguments (string), got 2"
    );
    assert_eq!(
        error_of(&copy(
            &mut ctx,
            &[Value::int(1), Value::int(1), Value::int(1)]
        )),
        "Copy() expects string as first argument, got INTEGER"
    );
    assert_eq!(
        error_of(&copy(
            &mut ctx,
            &[Value::string("a"), Value::string("x"), Value::int(1)]
        )),
        "Copy() expects integer as second argument, got STRING"
    );
}

// Low / High

#[test]
fn low_and_high_of_arrays() {
    let mut ctx = MockContext::new();
    let dynamic = ints(&[4, 5, 6]);
    assert_eq!(low(&mut ctx, std::slice::from_ref(&dynamic)), Value::int(0));
    assert_eq!(high(&mut ctx, std::slice::from_ref(&dynamic)), Value::int(2));

    let fixed = static_ints(1, &[0, 0, 0, 0, 0]);
    assert_eq!(low(&mut ctx, std::slice::from_ref(&fixed)), Value::int(1));
    assert_eq!(high(&mut ctx, std::slice::from_ref(&fixed)), Value::int(5));
}

#[test]
fn low_wraps_host_errors() {
    let mut ctx = MockContext::new();
    assert_eq!(
        error_of(&low(&mut ctx, &[Value::int(1)])),
        "Low() failed: Low expects an array, got INTEGER"
    );
    assert_eq!(
        error_of(&high(&mut ctx, &[])),
        "High() expects exactly 1 argument, got 0"
    );
}

// IndexOf / Contains

#[test]
fn index_of_searches_from_start() {
    let mut ctx = MockContext::new();
    let arr = ints(&[10, 20, 30, 20]);
    assert_eq!(index_of(&mut ctx, &[arr.clone(), Value::int(20)]), Value::int(1));
    assert_eq!(
        index_of(&mut ctx, &[arr.clone(), Value::int(20), Value::int(2)]),
        Value::int(3)
    );
    assert_eq!(index_of(&mut ctx, &[arr.clone(), Value::int(99)]), Value::int(-1));
    assert_eq!(
        index_of(&mut ctx, &[arr.clone(), Value::int(20), Value::int(-1)]),
        Value::int(-1)
    );
    assert_eq!(
        index_of(&mut ctx, &[arr, Value::int(20), Value::int(4)]),
        Value::int(-1)
    );
}

#[test]
fn index_of_is_zero_based_for_static_arrays() {
    let mut ctx = MockContext::new();
    let arr = static_ints(1, &[7, 8, 9]);
    assert_eq!(index_of(&mut ctx, &[arr, Value::int(8)]), Value::int(1));
}

#[test]
fn contains_uses_scalar_equality() {
    let mut ctx = MockContext::new();
    let arr = Value::array(vec![Value::int(1), Value::string("a"), Value::float(2.5)]);
    assert_eq!(contains(&mut ctx, &[arr.clone(), Value::string("a")]), Value::bool(true));
    assert_eq!(contains(&mut ctx, &[arr.clone(), Value::float(2.5)]), Value::bool(true));
    // No cross-kind matches
    assert_eq!(contains(&mut ctx, &[arr.clone(), Value::float(1.0)]), Value::bool(false));
    assert_eq!(
        error_of(&contains(&mut ctx, &[arr])),
        "Contains() expects 2 arguments, got 1"
    );
}

// Reverse / Sort

#[test]
fn reverse_in_place() {
    let mut ctx = MockContext::new();
    let arr = ints(&[1, 2, 3]);
    assert_eq!(reverse(&mut ctx, std::slice::from_ref(&arr)), Value::Nil);
    assert_eq!(elements(&arr), vec![Value::int(3), Value::int(2), Value::int(1)]);
}

#[test]
fn sort_default_delegates_to_host() {
    let mut ctx = MockContext::new();
    let arr = ints(&[3, 1, 2]);
    assert_eq!(sort(&mut ctx, std::slice::from_ref(&arr)), Value::Nil);
    assert_eq!(elements(&arr), vec![Value::int(1), Value::int(2), Value::int(3)]);
}

#[test]
fn sort_with_comparator() {
    let mut ctx = MockContext::new();
    let arr = ints(&[3, 1, 4, 1, 5, 9, 2, 6]);
    let descending = comparator(|a, b| b - a);

    assert_eq!(sort(&mut ctx, &[arr.clone(), descending]), Value::Nil);
    assert_eq!(elements(&arr), ints(&[9, 6, 5, 4, 3, 2, 1, 1]).as_array().unwrap().snapshot());
}

#[test]
fn sort_comparator_must_take_two_parameters() {
    let mut ctx = MockContext::new();
    let unary = Value::FunctionPointer(FunctionPointerValue::native("Neg", 1, |_, args| {
        args[0].clone()
    }));
    assert_eq!(
        error_of(&sort(&mut ctx, &[ints(&[2, 1]), unary])),
        "Sort() comparator must accept 2 parameters, got 1"
    );
    assert_eq!(
        error_of(&sort(&mut ctx, &[ints(&[2, 1]), Value::int(0)])),
        "Sort() expects function pointer as second argument, got INTEGER"
    );
}

#[test]
fn sort_comparator_error_leaves_array_untouched() {
    let mut ctx = MockContext::new();
    let arr = ints(&[3, 2, 1]);
    let failing = Value::FunctionPointer(FunctionPointerValue::native("Boom", 2, |_, _| {
        Value::error("boom")
    }));
    assert_eq!(error_of(&sort(&mut ctx, &[arr.clone(), failing])), "boom");
    assert_eq!(elements(&arr), vec![Value::int(3), Value::int(2), Value::int(1)]);
}

#[test]
fn sort_comparator_must_return_integer() {
    let mut ctx = MockContext::new();
    let bad = Value::FunctionPointer(FunctionPointerValue::native("Bad", 2, |_, _| {
        Value::string("x")
    }));
    assert_eq!(
        error_of(&sort(&mut ctx, &[ints(&[2, 1]), bad])),
        "Sort() comparator must return Integer, got STRING"
    );
}

// Add / Delete / SetLength

#[test]
fn add_appends_to_dynamic_arrays() {
    let mut ctx = MockContext::new();
    let arr = ints(&[1]);
    assert_eq!(add(&mut ctx, &[arr.clone(), Value::int(2)]), Value::Nil);
    assert_eq!(elements(&arr), vec![Value::int(1), Value::int(2)]);
}

#[test]
fn add_and_delete_reject_static_arrays() {
    let mut ctx = MockContext::new();
    let fixed = static_ints(0, &[1, 2]);
    assert_eq!(
        error_of(&add(&mut ctx, &[fixed.clone(), Value::int(3)])),
        "Add() can only be used with dynamic arrays, not static arrays"
    );
    assert_eq!(
        error_of(&delete(&mut ctx, &[fixed, Value::int(0)])),
        "Delete() can only be used with dynamic arrays, not static arrays"
    );
}

#[test]
fn delete_removes_by_zero_based_index() {
    let mut ctx = MockContext::new();
    let arr = ints(&[10, 20, 30]);
    assert_eq!(delete(&mut ctx, &[arr.clone(), Value::int(1)]), Value::Nil);
    assert_eq!(elements(&arr), vec![Value::int(10), Value::int(30)]);
}

#[test]
fn delete_out_of_bounds_names_the_length() {
    let mut ctx = MockContext::new();
    let arr = ints(&[10, 20, 30]);
    assert_eq!(
        error_of(&delete(&mut ctx, &[arr.clone(), Value::int(3)])),
        "Delete() index out of bounds: 3 (array length is 3)"
    );
    assert_eq!(
        error_of(&delete(&mut ctx, &[arr.clone(), Value::int(-1)])),
        "Delete() index out of bounds: -1 (array length is 3)"
    );
    assert_eq!(elements(&arr).len(), 3);
}

#[test]
fn set_length_pads_with_zero_values() {
    let mut ctx = MockContext::new();
    let arr = Value::typed_array(
        Arc::new(ArrayType::dynamic(Type::Integer)),
        vec![Value::int(7)],
    );
    assert_eq!(set_length(&mut ctx, &[arr.clone(), Value::int(3)]), Value::Nil);
    assert_eq!(elements(&arr), vec![Value::int(7), Value::int(0), Value::int(0)]);

    assert_eq!(set_length(&mut ctx, &[arr.clone(), Value::int(0)]), Value::Nil);
    assert!(elements(&arr).is_empty());
}

#[test]
fn set_length_errors() {
    let mut ctx = MockContext::new();
    assert_eq!(
        error_of(&set_length(&mut ctx, &[ints(&[1]), Value::int(-2)])),
        "SetLength() expects non-negative length, got -2"
    );
    assert_eq!(
        error_of(&set_length(&mut ctx, &[static_ints(1, &[1, 2]), Value::int(5)])),
        "SetLength() failed: SetLength() can only be used with dynamic arrays, not static arrays"
    );
    assert_eq!(
        error_of(&set_length(&mut ctx, &[ints(&[1]), Value::string("3")])),
        "SetLength() expects integer as second argument, got STRING"
    );
}

#[test]
fn set_length_on_strings_returns_the_resized_string() {
    let mut ctx = MockContext::new();
    assert_eq!(
        set_length(&mut ctx, &[Value::string("héllo"), Value::int(2)]),
        Value::string("hé")
    );
    assert_eq!(
        set_length(&mut ctx, &[Value::string("ab"), Value::int(4)]),
        Value::string("ab  ")
    );
}

// Concat / Slice

#[test]
fn concat_builds_new_array_with_first_type() {
    let mut ctx = MockContext::new();
    let typed = Value::typed_array(
        Arc::new(ArrayType::dynamic(Type::Integer)),
        vec![Value::int(3)],
    );
    let result = concat(&mut ctx, &[ints(&[1, 2]), typed, ints(&[4])]);
    assert_eq!(elements(&result), ints(&[1, 2, 3, 4]).as_array().unwrap().snapshot());
    let array_type = result.as_array().unwrap().array_type().unwrap();
    assert_eq!(array_type.element, Type::Integer);
}

#[test]
fn concat_errors() {
    let mut ctx = MockContext::new();
    assert_eq!(
        error_of(&concat(&mut ctx, &[])),
        "Concat() expects at least 1 argument, got 0"
    );
    assert_eq!(
        error_of(&concat(&mut ctx, &[ints(&[1]), Value::int(2)])),
        "Concat() argument 2 must be an array, got INTEGER"
    );
}

#[test]
fn slice_half_open_range() {
    let mut ctx = MockContext::new();
    let arr = ints(&[1, 2, 3, 4, 5]);
    let result = slice(&mut ctx, &[arr.clone(), Value::int(1), Value::int(4)]);
    assert_eq!(elements(&result), vec![Value::int(2), Value::int(3), Value::int(4)]);
    assert!(!result.as_array().unwrap().ptr_eq(arr.as_array().unwrap()));
}

#[test]
fn slice_inverted_range_is_empty() {
    let mut ctx = MockContext::new();
    let result = slice(&mut ctx, &[ints(&[1, 2, 3, 4, 5]), Value::int(5), Value::int(2)]);
    assert!(elements(&result).is_empty());
}

#[test]
fn slice_uses_the_low_bound() {
    let mut ctx = MockContext::new();
    let arr = static_ints(1, &[10, 20, 30, 40]);
    let result = slice(&mut ctx, &[arr, Value::int(2), Value::int(4)]);
    assert_eq!(elements(&result), vec![Value::int(20), Value::int(30)]);
}

#[test]
fn slice_argument_errors() {
    let mut ctx = MockContext::new();
    assert_eq!(
        error_of(&slice(&mut ctx, &[ints(&[1])])),
        "Slice() expects 3 arguments (array, start, end), got 1"
    );
    assert_eq!(
        error_of(&slice(
            &mut ctx,
            &[ints(&[1]), Value::string("a"), Value::int(1)]
        )),
        "Slice() second argument (start) must be an Integer, got STRING"
    );
}

proptest! {
    #[test]
    fn slice_never_exceeds_source(
        values in proptest::collection::vec(any::<i64>(), 0..20),
        start in -30i64..30,
        end in -30i64..30,
    ) {
        let mut ctx = MockContext::new();
        let result = slice(&mut ctx, &[ints(&values), Value::int(start), Value::int(end)]);
        let len = elements(&result).len();
        prop_assert!(len <= values.len());
        if start >= end {
            prop_assert_eq!(len, 0);
        }
    }

    #[test]
    fn static_bounds_round_trip(low_bound in -50i64..50, n in 1usize..20) {
        let mut ctx = MockContext::new();
        let values: Vec<i64> = (0..n as i64).collect();
        let arr = static_ints(low_bound, &values);
        prop_assert_eq!(low(&mut ctx, std::slice::from_ref(&arr)), Value::int(low_bound));
        prop_assert_eq!(
            high(&mut ctx, std::slice::from_ref(&arr)),
            Value::int(low_bound + n as i64 - 1)
        );
    }
}

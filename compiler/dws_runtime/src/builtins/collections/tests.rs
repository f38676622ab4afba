#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dws_types::{ArrayType, Type};
use pretty_assertions::assert_eq;

use super::*;
use crate::test_helpers::MockContext;
use crate::value::FunctionPointerValue;

fn ints(ns: &[i64]) -> Value {
    Value::array(ns.iter().copied().map(Value::int).collect())
}

fn elements(value: &Value) -> Vec<Value> {
    value.as_array().unwrap().snapshot()
}

fn unary(f: impl Fn(i64) -> Value + Send + Sync + 'static) -> Value {
    Value::FunctionPointer(FunctionPointerValue::native("F", 1, move |_, args| {
        f(args[0].as_int().unwrap())
    }))
}

fn identity() -> Value {
    Value::FunctionPointer(FunctionPointerValue::native("Id", 1, |_, args| {
        args[0].clone()
    }))
}

fn add() -> Value {
    Value::FunctionPointer(FunctionPointerValue::native("Add", 2, |_, args| {
        Value::int(args[0].as_int().unwrap() + args[1].as_int().unwrap())
    }))
}

// Map

#[test]
fn map_transforms_in_order() {
    let mut ctx = MockContext::new();
    let result = map(&mut ctx, &[ints(&[1, 2, 3]), unary(|x| Value::int(x * 10))]);
    assert_eq!(elements(&result), elements(&ints(&[10, 20, 30])));
}

#[test]
fn map_identity_preserves_length_and_type() {
    let mut ctx = MockContext::new();
    let typed = Value::typed_array(
        Arc::new(ArrayType::fixed(Type::Integer, 1, 3)),
        vec![Value::int(1), Value::int(2), Value::int(3)],
    );
    let result = map(&mut ctx, &[typed.clone(), identity()]);
    assert_eq!(elements(&result), elements(&typed));
    assert_eq!(result.as_array().unwrap().low_bound(), 1);
    assert!(!result.as_array().unwrap().ptr_eq(typed.as_array().unwrap()));
}

#[test]
fn map_argument_errors() {
    let mut ctx = MockContext::new();
    assert_eq!(
        map(&mut ctx, &[ints(&[1])]).error_message(),
        Some("Map() expects 2 arguments (array, lambda), got 1")
    );
    assert_eq!(
        map(&mut ctx, &[Value::int(1), identity()]).error_message(),
        Some("Map() first argument must be an array, got INTEGER")
    );
    assert_eq!(
        map(&mut ctx, &[ints(&[1]), Value::string("f")]).error_message(),
        Some("Map() second argument must be a lambda/function, got STRING")
    );
}

#[test]
fn callback_errors_propagate_verbatim() {
    let mut ctx = MockContext::new();
    let failing = unary(|x| {
        if x == 2 {
            Value::error("callback failed on 2")
        } else {
            Value::bool(true)
        }
    });
    for f in [map, for_each, filter] {
        let result = f(&mut ctx, &[ints(&[1, 2, 3]), failing.clone()]);
        assert_eq!(result.error_message(), Some("callback failed on 2"));
    }
}

#[test]
fn callback_arity_is_checked_by_the_host() {
    let mut ctx = MockContext::new();
    let result = map(&mut ctx, &[ints(&[1]), add()]);
    assert_eq!(
        result.error_message(),
        Some("Add expects 2 arguments, got 1")
    );
}

// Filter

#[test]
fn filter_keeps_matching_elements() {
    let mut ctx = MockContext::new();
    let even = unary(|x| Value::bool(x % 2 == 0));
    let result = filter(&mut ctx, &[ints(&[1, 2, 3, 4, 5, 6]), even]);
    assert_eq!(elements(&result), elements(&ints(&[2, 4, 6])));
}

#[test]
fn filter_always_true_is_an_equal_copy() {
    let mut ctx = MockContext::new();
    let source = ints(&[5, 3, 8]);
    let result = filter(&mut ctx, &[source.clone(), unary(|_| Value::bool(true))]);
    assert_eq!(elements(&result), elements(&source));
}

#[test]
fn filter_requires_boolean_predicate() {
    let mut ctx = MockContext::new();
    let result = filter(&mut ctx, &[ints(&[1]), identity()]);
    assert_eq!(
        result.error_message(),
        Some("Filter() predicate must return Boolean, got INTEGER")
    );
}

// Reduce

#[test]
fn reduce_sums() {
    let mut ctx = MockContext::new();
    let result = reduce(&mut ctx, &[ints(&[1, 2, 3, 4, 5]), add(), Value::int(0)]);
    assert_eq!(result, Value::int(15));
}

#[test]
fn reduce_empty_returns_initial() {
    let mut ctx = MockContext::new();
    let result = reduce(&mut ctx, &[ints(&[]), add(), Value::string("seed")]);
    assert_eq!(result, Value::string("seed"));
    assert_eq!(ctx.callback_count(), 0);
}

#[test]
fn reduce_arity_message() {
    let mut ctx = MockContext::new();
    assert_eq!(
        reduce(&mut ctx, &[ints(&[1]), add()]).error_message(),
        Some("Reduce() expects 3 arguments (array, lambda, initial), got 2")
    );
}

// ForEach

#[test]
fn for_each_visits_every_element_in_order() {
    let mut ctx = MockContext::new();
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let record = Value::FunctionPointer(FunctionPointerValue::native("Record", 1, move |_, args| {
        sink.lock().push(args[0].clone());
        Value::Nil
    }));

    assert_eq!(for_each(&mut ctx, &[ints(&[3, 1, 2]), record]), Value::Nil);
    assert_eq!(*seen.lock(), elements(&ints(&[3, 1, 2])));
}

// Every / Some

#[test]
fn every_short_circuits_on_first_false() {
    let mut ctx = MockContext::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let fails_on_one = unary(move |x| {
        counter.fetch_add(1, Ordering::SeqCst);
        Value::bool(x != 1)
    });

    let result = every(&mut ctx, &[ints(&[1, 2, 3]), fails_on_one]);
    assert_eq!(result, Value::bool(false));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.callback_count(), 1);
}

#[test]
fn every_and_some_on_all_and_none() {
    let mut ctx = MockContext::new();
    let positive = unary(|x| Value::bool(x > 0));
    assert_eq!(every(&mut ctx, &[ints(&[1, 2]), positive.clone()]), Value::bool(true));
    assert_eq!(some(&mut ctx, &[ints(&[-1, -2]), positive.clone()]), Value::bool(false));
    // Vacuous truth
    assert_eq!(every(&mut ctx, &[ints(&[]), positive.clone()]), Value::bool(true));
    assert_eq!(some(&mut ctx, &[ints(&[]), positive]), Value::bool(false));
}

#[test]
fn some_short_circuits_on_first_true() {
    let mut ctx = MockContext::new();
    let result = some(&mut ctx, &[ints(&[5, 6, 7]), unary(|x| Value::bool(x > 4))]);
    assert_eq!(result, Value::bool(true));
    assert_eq!(ctx.callback_count(), 1);
}

#[test]
fn predicate_type_errors_name_the_function() {
    let mut ctx = MockContext::new();
    let nil = unary(|_| Value::Nil);
    assert_eq!(
        every(&mut ctx, &[ints(&[1]), nil.clone()]).error_message(),
        Some("Every() predicate must return Boolean, got NIL")
    );
    assert_eq!(
        some(&mut ctx, &[ints(&[1]), nil.clone()]).error_message(),
        Some("Some() predicate must return Boolean, got NIL")
    );
    assert_eq!(
        find(&mut ctx, &[ints(&[1]), nil.clone()]).error_message(),
        Some("Find() predicate must return Boolean, got NIL")
    );
    assert_eq!(
        find_index(&mut ctx, &[ints(&[1]), nil]).error_message(),
        Some("FindIndex() predicate must return Boolean, got NIL")
    );
}

// Find / FindIndex

#[test]
fn find_returns_first_match_or_nil() {
    let mut ctx = MockContext::new();
    let over_two = unary(|x| Value::bool(x > 2));
    assert_eq!(find(&mut ctx, &[ints(&[1, 3, 5]), over_two.clone()]), Value::int(3));
    assert_eq!(find(&mut ctx, &[ints(&[1, 2]), over_two]), Value::Nil);
}

#[test]
fn find_index_adds_the_low_bound() {
    let mut ctx = MockContext::new();
    let is_thirty = unary(|x| Value::bool(x == 30));

    assert_eq!(
        find_index(&mut ctx, &[ints(&[10, 20, 30]), is_thirty.clone()]),
        Value::int(2)
    );

    let fixed = Value::typed_array(
        Arc::new(ArrayType::fixed(Type::Integer, 5, 7)),
        vec![Value::int(10), Value::int(20), Value::int(30)],
    );
    assert_eq!(find_index(&mut ctx, &[fixed, is_thirty.clone()]), Value::int(7));
    assert_eq!(find_index(&mut ctx, &[ints(&[1]), is_thirty]), Value::int(-1));
}

#[test]
fn callbacks_may_mutate_the_array_being_iterated() {
    let mut ctx = MockContext::new();
    let arr = ints(&[1, 2, 3]);
    let target = arr.clone();
    let grow = Value::FunctionPointer(FunctionPointerValue::native("Grow", 1, move |_, args| {
        target.as_array().unwrap().push(args[0].clone());
        Value::Nil
    }));

    assert_eq!(for_each(&mut ctx, &[arr.clone(), grow]), Value::Nil);
    // Iteration covered the original three elements only
    assert_eq!(elements(&arr).len(), 6);
}

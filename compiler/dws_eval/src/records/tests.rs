#![allow(clippy::unwrap_used, clippy::expect_used)]

use dws_ir::{ExprKind, FieldDecl, MethodDecl, Param, Position};
use dws_runtime::EvalErrorKind;
use dws_types::{EnumType, InterfaceType};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

/// Host that evaluates literal expressions only and counts initializer
/// runs.
#[derive(Default)]
struct LiteralHost {
    types: TypeRegistry,
    initializer_runs: usize,
}

impl LiteralHost {
    fn literal(expr: &Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::Integer(n) => Ok(Value::int(*n)),
            ExprKind::Float(f) => Ok(Value::float(*f)),
            ExprKind::String(s) => Ok(Value::string(s.clone())),
            ExprKind::Boolean(b) => Ok(Value::bool(*b)),
            ExprKind::Ident(name) => Err(errors::undefined_variable(name)),
            other => Err(EvalError::new(format!("unsupported: {other:?}"))),
        }
    }
}

impl RecordHost for LiteralHost {
    fn types(&self) -> &TypeRegistry {
        &self.types
    }

    fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    fn eval_initializer(&mut self, expr: &Expr) -> EvalResult {
        self.initializer_runs += 1;
        Self::literal(expr)
    }

    fn eval_field_value(&mut self, expr: &Expr) -> EvalResult {
        Self::literal(expr)
    }
}

fn point_decl() -> RecordDecl {
    RecordDecl::new("TPoint")
        .with_field(FieldDecl::new("X", "Integer"))
        .with_field(FieldDecl::new("Y", "Integer"))
}

fn declare(host: &mut LiteralHost, decl: &RecordDecl) -> Arc<RecordType> {
    RecordEngine::new(host).declare_record(decl).unwrap()
}

fn record(value: &Value) -> &RecordValue {
    value.as_record().unwrap()
}

// Declaration

#[test]
fn declare_resolves_fields_and_registers() {
    let mut host = LiteralHost::default();
    let point = declare(&mut host, &point_decl());
    assert_eq!(point.field_count(), 2);
    assert_eq!(point.field("x").unwrap().ty, Type::Integer);
    assert!(host.types.lookup_record("tpoint").is_some());
}

#[test]
fn declare_splits_instance_and_class_methods() {
    let mut host = LiteralHost::default();
    let decl = point_decl()
        .with_method(MethodDecl::function("Length", "Float"))
        .with_method(MethodDecl::function("Origin", "TPoint").class_method())
        .with_method(MethodDecl::procedure("Offset").with_param(Param::new("dx", "Integer")));
    let point = declare(&mut host, &decl);

    assert_eq!(point.method_count(), 2);
    assert_eq!(point.class_method_count(), 1);
    assert_eq!(point.method("OFFSET").unwrap().overloads.len(), 1);
    assert!(point.class_method("origin").is_some());
    assert!(point.method("origin").is_none());
}

#[test]
fn unresolvable_field_type_names_field_and_record() {
    let mut host = LiteralHost::default();
    let mut field = FieldDecl::new("Owner", "TMissing");
    field.pos = Position::new(4, 5);
    let decl = RecordDecl::new("TItem").with_field(field);

    let err = RecordEngine::new(&mut host).declare_record(&decl).unwrap_err();
    assert_eq!(
        err.message,
        "unknown type 'TMissing' for field 'Owner' in record 'TItem'"
    );
    assert_eq!(err.position, Some(Position::new(4, 5)));
    assert!(host.types.lookup_record("TItem").is_none());
}

#[test]
fn duplicate_fields_and_types_are_rejected() {
    let mut host = LiteralHost::default();
    let dup_field = RecordDecl::new("TBad")
        .with_field(FieldDecl::new("A", "Integer"))
        .with_field(FieldDecl::new("a", "String"));
    assert!(RecordEngine::new(&mut host)
        .declare_record(&dup_field)
        .is_err());

    declare(&mut host, &point_decl());
    let err = RecordEngine::new(&mut host)
        .declare_record(&point_decl())
        .unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::DuplicateType {
            name: "TPoint".to_string()
        }
    );
}

// Instantiation

#[test]
fn instantiate_uses_zero_values() {
    let mut host = LiteralHost::default();
    host.types
        .register_enum(EnumType::sequential("TColor", ["Red", "Green"]));
    let decl = RecordDecl::new("TAll")
        .with_field(FieldDecl::new("I", "Integer"))
        .with_field(FieldDecl::new("F", "Float"))
        .with_field(FieldDecl::new("S", "String"))
        .with_field(FieldDecl::new("B", "Boolean"))
        .with_field(FieldDecl::new("C", "TColor"))
        .with_field(FieldDecl::new("A", "array of Integer"));
    let all = declare(&mut host, &decl);

    let value = RecordEngine::new(&mut host).instantiate(&all).unwrap();
    let rec = record(&value);
    assert_eq!(rec.get_field("I"), Some(Value::int(0)));
    assert_eq!(rec.get_field("F"), Some(Value::float(0.0)));
    assert_eq!(rec.get_field("S"), Some(Value::string("")));
    assert_eq!(rec.get_field("B"), Some(Value::bool(false)));
    assert_eq!(
        rec.get_field("C"),
        Some(Value::enumeration("TColor", "Red", 0))
    );
    assert!(rec.get_field("A").unwrap().as_array().unwrap().is_empty());
}

#[test]
fn initializers_run_once_per_instance() {
    let mut host = LiteralHost::default();
    let decl = RecordDecl::new("TCounter")
        .with_field(FieldDecl::new("Count", "Integer").with_initializer(Expr::int(10)))
        .with_field(FieldDecl::new("Name", "String"));
    let counter = declare(&mut host, &decl);

    let first = RecordEngine::new(&mut host).instantiate(&counter).unwrap();
    let second = RecordEngine::new(&mut host).instantiate(&counter).unwrap();
    assert_eq!(record(&first).get_field("count"), Some(Value::int(10)));
    assert_eq!(host.initializer_runs, 2);

    // Instances never share state
    record(&first).set_field("Count", Value::int(99));
    assert_eq!(record(&second).get_field("Count"), Some(Value::int(10)));
}

#[test]
fn initializer_errors_abort_instantiation() {
    let mut host = LiteralHost::default();
    let decl = RecordDecl::new("TBroken")
        .with_field(FieldDecl::new("A", "Integer"))
        .with_field(FieldDecl::new("B", "Integer").with_initializer(Expr::ident("Missing")));
    let broken = declare(&mut host, &decl);

    let err = RecordEngine::new(&mut host).instantiate(&broken).unwrap_err();
    assert_eq!(err.message, "undefined variable: Missing");
}

#[test]
fn nested_records_are_never_nil() {
    let mut host = LiteralHost::default();
    declare(&mut host, &point_decl());
    let line = declare(
        &mut host,
        &RecordDecl::new("TLine")
            .with_field(FieldDecl::new("A", "TPoint"))
            .with_field(FieldDecl::new("B", "TPoint")),
    );
    let value = RecordEngine::new(&mut host).instantiate(&line).unwrap();

    let a = record(&value).get_field("A").unwrap();
    let b = record(&value).get_field("B").unwrap();
    assert_eq!(record(&a).get_field("X"), Some(Value::int(0)));
    assert!(!record(&a).ptr_eq(record(&b)));
}

#[test]
fn interface_fields_are_unassigned_instances() {
    let mut host = LiteralHost::default();
    host.types.register_interface(InterfaceType::new("IShape"));
    let holder = declare(
        &mut host,
        &RecordDecl::new("THolder").with_field(FieldDecl::new("Shape", "IShape")),
    );
    let value = RecordEngine::new(&mut host).instantiate(&holder).unwrap();

    match record(&value).get_field("Shape") {
        Some(Value::InterfaceInstance(instance)) => {
            assert_eq!(instance.interface.name, "IShape");
            assert!(!instance.is_assigned());
        }
        other => panic!("expected an interface instance, got {other:?}"),
    }
}

// Literals

#[test]
fn literal_sets_named_fields_and_defaults_the_rest() {
    let mut host = LiteralHost::default();
    let decl =
        point_decl().with_field(FieldDecl::new("Z", "Integer").with_initializer(Expr::int(7)));
    declare(&mut host, &decl);

    let literal = RecordLiteral::typed("tpoint").with_field("y", Expr::int(2));
    let value = RecordEngine::new(&mut host).evaluate_literal(&literal).unwrap();
    let rec = record(&value);
    assert_eq!(rec.field_names(), ["X", "Y", "Z"]);
    assert_eq!(rec.get_field("X"), Some(Value::int(0)));
    assert_eq!(rec.get_field("Y"), Some(Value::int(2)));
    assert_eq!(rec.get_field("Z"), Some(Value::int(7)));
}

#[test]
fn literal_errors() {
    let mut host = LiteralHost::default();
    declare(&mut host, &point_decl());
    let mut engine = RecordEngine::new(&mut host);

    let untyped = RecordLiteral::untyped().with_field("X", Expr::int(1));
    assert_eq!(
        engine.evaluate_literal(&untyped).unwrap_err().message,
        "record literal requires explicit type name or type context"
    );

    let unknown = RecordLiteral::typed("TPoint").with_field("Z", Expr::int(1));
    assert_eq!(
        engine.evaluate_literal(&unknown).unwrap_err().message,
        "field 'Z' does not exist in record type 'TPoint'"
    );

    let repeated = RecordLiteral::typed("TPoint")
        .with_field("X", Expr::int(1))
        .with_field("x", Expr::int(2));
    assert_eq!(
        engine.evaluate_literal(&repeated).unwrap_err().message,
        "duplicate field 'x' in record 'TPoint'"
    );

    let positional = RecordLiteral::typed("TPoint").with_positional(Expr::int(1));
    assert_eq!(
        engine.evaluate_literal(&positional).unwrap_err().message,
        "positional field values are not supported in record literal of type 'TPoint'"
    );

    let missing = RecordLiteral::typed("TNowhere");
    assert_eq!(
        engine.evaluate_literal(&missing).unwrap_err().message,
        "unknown type: TNowhere"
    );

    let not_a_record = RecordLiteral::typed("Integer");
    assert_eq!(
        engine.evaluate_literal(&not_a_record).unwrap_err().message,
        "type mismatch: expected record type, got Integer"
    );
}

// Equality

#[test]
fn equality_is_structural_and_type_named() {
    let mut host = LiteralHost::default();
    let point = declare(&mut host, &point_decl());
    let vector = declare(
        &mut host,
        &RecordDecl::new("TVector")
            .with_field(FieldDecl::new("X", "Integer"))
            .with_field(FieldDecl::new("Y", "Integer")),
    );
    let mut engine = RecordEngine::new(&mut host);
    let a = engine.instantiate(&point).unwrap();
    let b = engine.instantiate(&point).unwrap();
    let v = engine.instantiate(&vector).unwrap();

    assert!(records_equal(&a, &b));
    assert!(!records_equal(&a, &v));

    record(&b).set_field("Y", Value::int(1));
    assert!(!records_equal(&a, &b));
    assert!(!records_equal(&a, &Value::int(1)));
}

#[test]
fn equality_recurses_into_nested_records() {
    let mut host = LiteralHost::default();
    declare(&mut host, &point_decl());
    let line = declare(
        &mut host,
        &RecordDecl::new("TLine").with_field(FieldDecl::new("A", "TPoint")),
    );
    let mut engine = RecordEngine::new(&mut host);
    let first = engine.instantiate(&line).unwrap();
    let second = engine.instantiate(&line).unwrap();
    assert!(records_equal(&first, &second));

    let nested = record(&second).get_field("A").unwrap();
    record(&nested).set_field("X", Value::int(5));
    assert!(!records_equal(&first, &second));
}

/// Chain of `depth` records, each holding the next one.
fn declare_chain(host: &mut LiteralHost, depth: usize) -> Arc<RecordType> {
    let mut inner = declare(
        host,
        &RecordDecl::new("TLevel0").with_field(FieldDecl::new("Leaf", "Integer")),
    );
    for level in 1..=depth {
        let prev = inner.name().to_string();
        inner = declare(
            host,
            &RecordDecl::new(format!("TLevel{level}")).with_field(FieldDecl::new("Inner", prev)),
        );
    }
    inner
}

proptest! {
    #[test]
    fn instantiation_is_total_at_any_depth(depth in 0_usize..24) {
        let mut host = LiteralHost::default();
        let outer = declare_chain(&mut host, depth);
        let mut engine = RecordEngine::new(&mut host);
        let value = engine.instantiate(&outer).unwrap();
        prop_assert!(records_equal(&value, &engine.instantiate(&outer).unwrap()));

        let mut current = value;
        for _ in 0..depth {
            let next = record(&current).get_field("Inner").unwrap();
            prop_assert!(matches!(next, Value::Record(_)));
            current = next;
        }
        prop_assert_eq!(record(&current).get_field("Leaf"), Some(Value::int(0)));
    }
}

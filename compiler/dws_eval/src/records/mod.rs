//! Record engine: declaration, instantiation, literals and equality.
//!
//! # Lifecycle
//!
//! ```text
//! RecordDecl ──declare_record──> Arc<RecordType> (registered, immutable)
//!                                     │
//!              instantiate / evaluate_literal (any number of times)
//!                                     ▼
//!                               RecordValue instances
//! ```
//!
//! Instances share only the `Arc<RecordType>`; every instance owns its
//! field values. Instantiation is total: a field whose type is a record
//! always holds a record instance, recursively, and an interface-typed
//! field holds an unassigned interface rather than `Nil`.

use std::sync::Arc;

use dws_ir::{Expr, RecordDecl, RecordLiteral};
use dws_runtime::errors::{self, EvalError};
use dws_runtime::{zero_value, EvalResult, RecordValue, Value};
use dws_types::{RecordField, RecordType, Type, TypeError, TypeRegistry};
use rustc_hash::FxHashMap;

use crate::stack::ensure_sufficient_stack;

/// Evaluator services the record engine needs.
pub trait RecordHost {
    fn types(&self) -> &TypeRegistry;
    fn types_mut(&mut self) -> &mut TypeRegistry;

    /// Evaluate a field initializer. Initializers run in an empty scope and
    /// cannot see other fields.
    fn eval_initializer(&mut self, expr: &Expr) -> EvalResult;

    /// Evaluate a value given in a record literal, in the current scope.
    fn eval_field_value(&mut self, expr: &Expr) -> EvalResult;
}

/// Record operations over a host evaluator.
pub struct RecordEngine<'h, H: RecordHost + ?Sized> {
    host: &'h mut H,
}

impl<'h, H: RecordHost + ?Sized> RecordEngine<'h, H> {
    pub fn new(host: &'h mut H) -> Self {
        RecordEngine { host }
    }

    /// Resolve every field type, split methods into instance and class
    /// tables, and register the record type.
    ///
    /// Fails on the first unresolvable field type, on a duplicate field
    /// name and on a record name that is already declared.
    #[tracing::instrument(level = "debug", skip_all, fields(record = %decl.name))]
    pub fn declare_record(&mut self, decl: &RecordDecl) -> Result<Arc<RecordType>, EvalError> {
        let mut record = RecordType::new(&decl.name);
        for field in &decl.fields {
            let ty = self.host.types().resolve(&field.type_name).map_err(|_| {
                errors::unresolved_field_type(&field.name, &decl.name, &field.type_name)
                    .with_position(field.pos)
            })?;
            record
                .add_field(RecordField {
                    name: field.name.clone(),
                    ty,
                    decl: field.clone(),
                })
                .map_err(|err| EvalError::from(err).with_position(field.pos))?;
        }
        for method in &decl.methods {
            record.add_method(Arc::new(method.clone()));
        }
        let registered = self
            .host
            .types_mut()
            .register_record(record)
            .map_err(|err| EvalError::from(err).with_position(decl.pos))?;
        tracing::debug!(
            fields = registered.field_count(),
            methods = registered.method_count(),
            class_methods = registered.class_method_count(),
            "record declared"
        );
        Ok(registered)
    }

    /// Build a new instance with every field defaulted.
    ///
    /// An initializer error aborts instantiation and is returned as is.
    #[tracing::instrument(level = "debug", skip_all, fields(record = record_type.name()))]
    pub fn instantiate(&mut self, record_type: &Arc<RecordType>) -> EvalResult {
        let mut fields = Vec::with_capacity(record_type.field_count());
        for field in record_type.fields() {
            fields.push((field.name.clone(), self.default_field(field)?));
        }
        Ok(Value::Record(RecordValue::new(Arc::clone(record_type), fields)))
    }

    /// `TPoint(X: 1; Y: 2)`. Fields the literal omits are defaulted as in
    /// `instantiate`.
    pub fn evaluate_literal(&mut self, literal: &RecordLiteral) -> EvalResult {
        let Some(type_name) = &literal.type_name else {
            return Err(errors::untyped_record_literal().with_position(literal.pos));
        };
        let record_type = match self.host.types().resolve(type_name) {
            Ok(Type::Record(record_type)) => record_type,
            Ok(other) => {
                return Err(errors::type_mismatch("record type", &other.name())
                    .with_position(literal.pos))
            }
            Err(err) => return Err(EvalError::from(err).with_position(literal.pos)),
        };

        let mut given: FxHashMap<String, Value> = FxHashMap::default();
        for entry in &literal.fields {
            let Some(name) = &entry.name else {
                return Err(errors::positional_record_field(record_type.name())
                    .with_position(entry.value.pos));
            };
            if !record_type.has_field(name) {
                return Err(errors::unknown_field(name, record_type.name())
                    .with_position(entry.value.pos));
            }
            let key = name.to_lowercase();
            if given.contains_key(&key) {
                let err = TypeError::DuplicateField {
                    field: name.clone(),
                    record: record_type.name().to_string(),
                };
                return Err(EvalError::from(err).with_position(entry.value.pos));
            }
            let value = self.host.eval_field_value(&entry.value)?;
            given.insert(key, copy_record(value));
        }

        let mut fields = Vec::with_capacity(record_type.field_count());
        for field in record_type.fields() {
            let value = match given.remove(&field.name.to_lowercase()) {
                Some(value) => value,
                None => self.default_field(field)?,
            };
            fields.push((field.name.clone(), value));
        }
        Ok(Value::Record(RecordValue::new(record_type, fields)))
    }

    fn default_field(&mut self, field: &RecordField) -> EvalResult {
        if let Some(initializer) = &field.decl.initializer {
            return self.host.eval_initializer(initializer);
        }
        match &field.ty {
            Type::Record(nested) => ensure_sufficient_stack(|| self.instantiate(nested)),
            Type::Interface(interface) => Ok(Value::unassigned_interface(Arc::clone(interface))),
            other => Ok(zero_value(other)),
        }
    }
}

/// Records are values: storing one into another record copies it.
fn copy_record(value: Value) -> Value {
    match value {
        Value::Record(record) => Value::Record(record.deep_copy()),
        other => other,
    }
}

/// `=` on records: same type name and every declared field equal.
///
/// Anonymous records fall back to `RecordValue::equals`. Non-records are
/// never equal here.
pub fn records_equal(a: &Value, b: &Value) -> bool {
    let (Value::Record(a), Value::Record(b)) = (a, b) else {
        return false;
    };
    let (Some(a_type), Some(b_type)) = (a.record_type(), b.record_type()) else {
        return a.equals(b);
    };
    if !a_type.name().eq_ignore_ascii_case(b_type.name()) {
        return false;
    }
    a_type
        .fields()
        .iter()
        .all(|field| match (a.get_field(&field.name), b.get_field(&field.name)) {
            (Some(x), Some(y)) => x.equals(&y),
            _ => false,
        })
}

#[cfg(test)]
mod tests;

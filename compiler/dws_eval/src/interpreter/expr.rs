//! Expression evaluation.

use std::cmp::Ordering;
use std::sync::Arc;

use dws_ir::{BinaryOp, Expr, ExprKind, Lambda, Position, UnaryOp};
use dws_runtime::errors;
use dws_runtime::{Callable, EvalResult, FunctionPointerValue, Value};
use dws_types::Type;
use rustc_hash::FxHashMap;

use super::Interpreter;
use crate::diagnostics::CallFrame;
use crate::environment::Environment;
use crate::records::{records_equal, RecordEngine};
use crate::stack::ensure_sufficient_stack;

impl Interpreter {
    pub(super) fn eval_expr(&mut self, expr: &Expr) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr))
    }

    fn eval_expr_inner(&mut self, expr: &Expr) -> EvalResult {
        let pos = expr.pos;
        match &expr.kind {
            ExprKind::Integer(n) => Ok(Value::int(*n)),
            ExprKind::Float(f) => Ok(Value::float(*f)),
            ExprKind::String(s) => Ok(Value::string(s.clone())),
            ExprKind::Boolean(b) => Ok(Value::bool(*b)),
            ExprKind::Nil => Ok(Value::Nil),

            ExprKind::Ident(name) => self.eval_ident(name, pos),

            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                unary_op(*op, &value).map_err(|err| err.with_position(pos))
            }
            ExprKind::Binary { op, left, right } => self.eval_binary(*op, left, right, pos),

            ExprKind::Call { callee, args } => self.eval_call(callee, args, pos),

            ExprKind::Lambda(lambda) => Ok(Value::FunctionPointer(FunctionPointerValue::lambda(
                Arc::clone(lambda),
                self.env.capture(),
            ))),

            ExprKind::ArrayLiteral(items) => {
                let elements = items
                    .iter()
                    .map(|item| self.eval_expr(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::array(elements))
            }

            ExprKind::RecordLiteral(literal) => RecordEngine::new(self).evaluate_literal(literal),

            ExprKind::Field { target, field } => {
                let target = self.eval_expr(target)?;
                self.field_of(&target, field)
                    .map_err(|err| err.with_position(pos))
            }

            ExprKind::Index { target, index } => {
                let target = self.eval_expr(target)?;
                let index = self.eval_expr(index)?;
                index_of(&target, &index).map_err(|err| err.with_position(pos))
            }
        }
    }

    /// Variables first, then zero-argument built-ins, then type names.
    fn eval_ident(&mut self, name: &str, pos: Position) -> EvalResult {
        if let Some(value) = self.env.lookup(name) {
            return Ok(value);
        }
        if self.registry.has(name) {
            return self.call_builtin_at(name, &[], pos);
        }
        match self.types.resolve(name) {
            Ok(ty) => Ok(Value::TypeMeta(ty)),
            Err(_) => Err(errors::undefined_variable(name).with_position(pos)),
        }
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        pos: Position,
    ) -> EvalResult {
        let lhs = self.eval_expr(left)?;
        // `and` / `or` short-circuit on booleans
        match (op, &lhs) {
            (BinaryOp::And, Value::Boolean(false)) => return Ok(Value::bool(false)),
            (BinaryOp::Or, Value::Boolean(true)) => return Ok(Value::bool(true)),
            _ => {}
        }
        let rhs = self.eval_expr(right)?;
        binary_op(op, &lhs, &rhs).map_err(|err| err.with_position(pos))
    }

    fn eval_call(&mut self, callee: &str, args: &[Expr], pos: Position) -> EvalResult {
        let values = args
            .iter()
            .map(|arg| self.eval_expr(arg))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(func @ Value::FunctionPointer(_)) = self.env.lookup(callee) {
            let saved = std::mem::replace(&mut self.position, pos);
            let result = self.call_function_pointer(&func, &values);
            self.position = saved;
            return result.map_err(|err| err.with_position(pos));
        }

        let result = self.call_builtin_at(callee, &values, pos)?;

        // `SetLength(s, n)` on a string variable writes the resized string
        // back, as a var parameter would.
        if callee.eq_ignore_ascii_case("SetLength") {
            if let (Value::String(_), Some(ExprKind::Ident(var))) =
                (&result, args.first().map(|arg| &arg.kind))
            {
                if self.env.assign(var, result.clone()) {
                    return Ok(Value::Nil);
                }
            }
        }
        Ok(result)
    }

    /// Invoke a function pointer: arity check, call frame, then the lambda
    /// body or native closure.
    pub(super) fn call_function_pointer(&mut self, func: &Value, args: &[Value]) -> EvalResult {
        let Some(pointer) = func.as_function_pointer() else {
            return Err(errors::not_callable(func.type_name()));
        };
        let name = if pointer.name.is_empty() {
            "<lambda>"
        } else {
            pointer.name.as_str()
        };
        if pointer.param_count != args.len() {
            return Err(errors::wrong_arg_count(name, pointer.param_count, args.len()));
        }

        self.call_stack.push(CallFrame::new(name, self.position))?;
        tracing::trace!(name, depth = self.call_stack.depth(), "invoking function pointer");
        let result = match &pointer.callable {
            Callable::Lambda { lambda, captured } => self.eval_lambda(lambda, captured, args),
            Callable::Native(f) => f(self, args).into_result(),
        };
        self.call_stack.pop();
        result
    }

    fn eval_lambda(
        &mut self,
        lambda: &Lambda,
        captured: &FxHashMap<String, Value>,
        args: &[Value],
    ) -> EvalResult {
        let mut bindings = captured.clone();
        for (param, arg) in lambda.params.iter().zip(args) {
            bindings.insert(param.name.to_lowercase(), arg.clone());
        }
        let saved = std::mem::replace(&mut self.env, Environment::from_bindings(bindings));
        let result = self.eval_expr(&lambda.body);
        self.env = saved;
        result
    }

    fn field_of(&self, target: &Value, field: &str) -> EvalResult {
        match target {
            Value::Record(record) => record.get_field(field).ok_or_else(|| {
                let record_name = record.type_name().unwrap_or_else(|| "record".to_string());
                errors::unknown_field(field, &record_name)
            }),
            Value::InterfaceInstance(instance) => match &instance.target {
                Some(inner) => self.field_of(inner, field),
                None => Err(errors::interface_not_assigned(&instance.interface.name)),
            },
            Value::Variant(inner) => self.field_of(inner, field),
            // `TColor.Red`
            Value::TypeMeta(Type::Enum(enum_type)) => enum_type
                .member(field)
                .map(|member| {
                    Value::enumeration(enum_type.name.clone(), member.name.clone(), member.ordinal)
                })
                .ok_or_else(|| errors::unknown_field(field, &enum_type.name)),
            other => Err(errors::type_mismatch("record", other.type_name())),
        }
    }
}

/// `arr[i]` honours the array's low bound; `s[i]` is 1-based.
fn index_of(target: &Value, index: &Value) -> EvalResult {
    let Value::Integer(i) = index else {
        return Err(errors::type_mismatch("Integer", index.type_name()));
    };
    match target {
        Value::Array(array) => {
            let offset = i.checked_sub(array.low_bound()).map(usize::try_from);
            match offset {
                Some(Ok(offset)) => array
                    .get(offset)
                    .ok_or_else(|| errors::index_out_of_bounds(*i, array.len())),
                _ => Err(errors::index_out_of_bounds(*i, array.len())),
            }
        }
        Value::String(s) => usize::try_from(i.saturating_sub(1))
            .ok()
            .filter(|_| *i >= 1)
            .and_then(|offset| s.chars().nth(offset))
            .map(|c| Value::string(c.to_string()))
            .ok_or_else(|| errors::index_out_of_bounds(*i, s.chars().count())),
        Value::Variant(inner) => index_of(inner, index),
        other => Err(errors::type_mismatch("array or string", other.type_name())),
    }
}

fn unary_op(op: UnaryOp, value: &Value) -> EvalResult {
    match (op, value) {
        (UnaryOp::Neg, Value::Integer(n)) => Ok(Value::int(n.wrapping_neg())),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::float(-f)),
        (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::bool(!b)),
        (UnaryOp::Not, Value::Integer(n)) => Ok(Value::int(!n)),
        (_, Value::Variant(inner)) => unary_op(op, inner),
        (UnaryOp::Neg, other) => Err(errors::type_mismatch("Integer or Float", other.type_name())),
        (UnaryOp::Not, other) => Err(errors::type_mismatch("Boolean", other.type_name())),
    }
}

fn binary_op(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    match (op, left, right) {
        (_, Value::Variant(inner), other) => binary_op(op, inner, other),
        (_, other, Value::Variant(inner)) => binary_op(op, other, inner),

        (BinaryOp::Eq, Value::Record(_), Value::Record(_)) => {
            Ok(Value::bool(records_equal(left, right)))
        }
        (BinaryOp::NotEq, Value::Record(_), Value::Record(_)) => {
            Ok(Value::bool(!records_equal(left, right)))
        }
        (BinaryOp::Eq, ..) if !is_numeric_pair(left, right) => Ok(Value::bool(left.equals(right))),
        (BinaryOp::NotEq, ..) if !is_numeric_pair(left, right) => {
            Ok(Value::bool(!left.equals(right)))
        }

        (_, Value::Integer(a), Value::Integer(b)) => integer_op(op, *a, *b),
        (_, Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
            float_op(op, as_float(left), as_float(right))
        }
        (BinaryOp::And, Value::Boolean(a), Value::Boolean(b)) => Ok(Value::bool(*a && *b)),
        (BinaryOp::Or, Value::Boolean(a), Value::Boolean(b)) => Ok(Value::bool(*a || *b)),
        (BinaryOp::Add, Value::String(a), Value::String(b)) => {
            Ok(Value::string(format!("{}{}", &**a, &**b)))
        }
        (_, Value::String(a), Value::String(b)) if op.is_comparison() => {
            Ok(Value::bool(compare(op, (**a).cmp(&**b))))
        }
        _ => Err(errors::invalid_operands(
            op.as_symbol(),
            left.type_name(),
            right.type_name(),
        )),
    }
}

fn is_numeric_pair(left: &Value, right: &Value) -> bool {
    matches!(
        (left, right),
        (
            Value::Integer(_) | Value::Float(_),
            Value::Integer(_) | Value::Float(_)
        )
    )
}

#[allow(clippy::cast_precision_loss, reason = "script integers widen to Float")]
fn widen(n: i64) -> f64 {
    n as f64
}

fn as_float(value: &Value) -> f64 {
    match value {
        Value::Integer(n) => widen(*n),
        Value::Float(f) => *f,
        _ => f64::NAN,
    }
}

fn compare(op: BinaryOp, ordering: Ordering) -> bool {
    match op {
        BinaryOp::Eq => ordering == Ordering::Equal,
        BinaryOp::NotEq => ordering != Ordering::Equal,
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::LtEq => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        BinaryOp::GtEq => ordering != Ordering::Less,
        _ => false,
    }
}

/// Integer arithmetic wraps on overflow.
fn integer_op(op: BinaryOp, a: i64, b: i64) -> EvalResult {
    let value = match op {
        BinaryOp::Add => Value::int(a.wrapping_add(b)),
        BinaryOp::Sub => Value::int(a.wrapping_sub(b)),
        BinaryOp::Mul => Value::int(a.wrapping_mul(b)),
        BinaryOp::Div => {
            if b == 0 {
                return Err(errors::division_by_zero());
            }
            return float_op(op, widen(a), widen(b));
        }
        BinaryOp::IntDiv => {
            if b == 0 {
                return Err(errors::division_by_zero());
            }
            Value::int(a.wrapping_div(b))
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(errors::division_by_zero());
            }
            Value::int(a.wrapping_rem(b))
        }
        BinaryOp::And => Value::int(a & b),
        BinaryOp::Or => Value::int(a | b),
        comparison => Value::bool(compare(comparison, a.cmp(&b))),
    };
    Ok(value)
}

fn float_op(op: BinaryOp, a: f64, b: f64) -> EvalResult {
    let value = match op {
        BinaryOp::Add => Value::float(a + b),
        BinaryOp::Sub => Value::float(a - b),
        BinaryOp::Mul => Value::float(a * b),
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(errors::division_by_zero());
            }
            Value::float(a / b)
        }
        BinaryOp::IntDiv | BinaryOp::Mod | BinaryOp::And | BinaryOp::Or => {
            return Err(errors::invalid_operands(op.as_symbol(), "FLOAT", "FLOAT"));
        }
        comparison => match a.partial_cmp(&b) {
            Some(ordering) => Value::bool(compare(comparison, ordering)),
            None => Value::bool(comparison == BinaryOp::NotEq),
        },
    };
    Ok(value)
}

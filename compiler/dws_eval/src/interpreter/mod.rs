//! Reference host evaluator.
//!
//! `Interpreter` evaluates `dws_ir` expressions, owns the type registry and
//! the call stack, and implements `Context` so the built-in catalogue can
//! run against it. Statements and control flow belong to the surrounding
//! engine; this evaluator covers what field initializers, record literals
//! and lambda bodies need.
//!
//! # Error flow
//!
//! ```text
//! built-in ──Value::Error──> call_builtin ──Err(EvalError)──> caller
//! lambda body ──Err──> eval_function_pointer ──Value::Error──> built-in
//! Assert(False) ──raise_assertion_failed──> pending Exception + Err
//! ```

mod context;
mod expr;
mod json;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use dws_ir::{Expr, Position, RecordDecl};
use dws_runtime::errors::{self, EvalError};
use dws_runtime::{register_all, EvalResult, Registry, Value};
use dws_types::{RecordType, TypeRegistry};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::InterpreterConfig;
use crate::diagnostics::{CallFrame, CallStack};
use crate::environment::Environment;
use crate::records::{RecordEngine, RecordHost};

/// A script exception raised through the host's exception path rather
/// than as an error value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exception {
    /// `EAssertionFailed`, ...
    pub class_name: String,
    pub message: String,
}

impl Exception {
    pub fn new(class_name: impl Into<String>, message: impl Into<String>) -> Self {
        Exception {
            class_name: class_name.into(),
            message: message.into(),
        }
    }
}

/// Tree-walking evaluator and `Context` host.
pub struct Interpreter {
    env: Environment,
    types: TypeRegistry,
    registry: Arc<Registry>,
    call_stack: CallStack,
    /// Position of the call being evaluated.
    position: Position,
    rng: StdRng,
    seed: i64,
    pending_exception: Option<Exception>,
    /// Set by `raise_assertion_failed`, cleared by the built-in call that
    /// surfaces it.
    assertion_raised: bool,
}

impl Interpreter {
    /// Interpreter with the default configuration and the full built-in
    /// catalogue.
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    pub fn with_config(config: InterpreterConfig) -> Self {
        let registry = Registry::new();
        register_all(&registry);
        Self::with_registry(config, Arc::new(registry))
    }

    /// Interpreter dispatching built-in calls through `registry`.
    pub fn with_registry(config: InterpreterConfig, registry: Arc<Registry>) -> Self {
        let seed = config.rand_seed.unwrap_or_else(clock_seed);
        Interpreter {
            env: Environment::new(),
            types: TypeRegistry::new(),
            registry,
            call_stack: CallStack::new(config.max_call_depth),
            position: Position::UNKNOWN,
            rng: StdRng::seed_from_u64(seed_bits(seed)),
            seed,
            pending_exception: None,
            assertion_raised: false,
        }
    }

    // Types and variables

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    pub fn define(&mut self, name: &str, value: Value) {
        self.env.define(name, value);
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.env.lookup(name)
    }

    // Evaluation

    /// Evaluate an expression in the current scope.
    pub fn eval(&mut self, expr: &Expr) -> EvalResult {
        self.eval_expr(expr)
    }

    pub fn declare_record(&mut self, decl: &RecordDecl) -> Result<Arc<RecordType>, EvalError> {
        RecordEngine::new(self).declare_record(decl)
    }

    /// Default-initialized instance of the record type `name`.
    pub fn instantiate(&mut self, name: &str) -> EvalResult {
        let record_type = self
            .types
            .lookup_record(name)
            .cloned()
            .ok_or_else(|| errors::unknown_type(name))?;
        RecordEngine::new(self).instantiate(&record_type)
    }

    /// Call a registered built-in with already evaluated arguments.
    pub fn call_builtin(&mut self, name: &str, args: &[Value]) -> EvalResult {
        self.call_builtin_at(name, args, self.position)
    }

    /// Invoke a function-pointer value.
    pub fn call_function(&mut self, func: &Value, args: &[Value]) -> EvalResult {
        self.call_function_pointer(func, args)
    }

    // Call stack

    /// Push a frame for a call made at `position`.
    pub fn enter_call(&mut self, function_name: &str, position: Position) -> Result<(), EvalError> {
        self.call_stack
            .push(CallFrame::new(function_name, position))
            .map_err(|err| err.with_position(position))
    }

    pub fn leave_call(&mut self) {
        self.call_stack.pop();
    }

    pub fn call_stack(&self) -> &CallStack {
        &self.call_stack
    }

    // Exceptions

    pub fn pending_exception(&self) -> Option<&Exception> {
        self.pending_exception.as_ref()
    }

    /// Hand the pending exception over to the caller's handler.
    pub fn take_exception(&mut self) -> Option<Exception> {
        self.pending_exception.take()
    }

    fn call_builtin_at(&mut self, name: &str, args: &[Value], position: Position) -> EvalResult {
        let Some(function) = self.registry.lookup(name) else {
            return Err(errors::undefined_function(name).with_position(position));
        };
        tracing::trace!(name, argc = args.len(), "calling built-in");

        let saved = std::mem::replace(&mut self.position, position);
        let result = function(self, args);
        self.position = saved;

        if std::mem::take(&mut self.assertion_raised) {
            if let Some(exception) = &self.pending_exception {
                return Err(errors::assertion_failed(exception.message.clone()));
            }
        }
        result.into_result()
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordHost for Interpreter {
    fn types(&self) -> &TypeRegistry {
        &self.types
    }

    fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    fn eval_initializer(&mut self, expr: &Expr) -> EvalResult {
        let saved = std::mem::take(&mut self.env);
        let result = self.eval_expr(expr);
        self.env = saved;
        result
    }

    fn eval_field_value(&mut self, expr: &Expr) -> EvalResult {
        self.eval_expr(expr)
    }
}

/// Seed derived from the wall clock.
fn clock_seed() -> i64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    i64::try_from(nanos & u128::from(u64::MAX >> 1)).unwrap_or_default()
}

/// Reinterpret a script seed as generator seed bits.
fn seed_bits(seed: i64) -> u64 {
    u64::from_ne_bytes(seed.to_ne_bytes())
}

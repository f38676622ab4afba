//! Function pointer values.

use std::fmt;
use std::sync::Arc;

use dws_ir::Lambda;
use rustc_hash::FxHashMap;

use super::Value;
use crate::Context;

/// Host- or test-provided callable.
pub type NativeFn = Arc<dyn Fn(&mut dyn Context, &[Value]) -> Value + Send + Sync>;

/// What a function pointer invokes.
#[derive(Clone)]
pub enum Callable {
    /// A lambda expression together with the variables it captured.
    Lambda {
        lambda: Arc<Lambda>,
        captured: Arc<FxHashMap<String, Value>>,
    },
    Native(NativeFn),
}

/// A callable value, as passed to `Map`, `Sort` and friends.
#[derive(Clone)]
pub struct FunctionPointerValue {
    /// Name of the target function, empty for lambdas.
    pub name: String,
    pub param_count: usize,
    pub callable: Callable,
}

impl FunctionPointerValue {
    /// Capture a lambda. The arity comes from its parameter list.
    pub fn lambda(lambda: Arc<Lambda>, captured: FxHashMap<String, Value>) -> Self {
        FunctionPointerValue {
            name: String::new(),
            param_count: lambda.arity(),
            callable: Callable::Lambda {
                lambda,
                captured: Arc::new(captured),
            },
        }
    }

    /// Wrap a native closure.
    pub fn native<F>(name: impl Into<String>, param_count: usize, f: F) -> Self
    where
        F: Fn(&mut dyn Context, &[Value]) -> Value + Send + Sync + 'static,
    {
        FunctionPointerValue {
            name: name.into(),
            param_count,
            callable: Callable::Native(Arc::new(f)),
        }
    }

    #[inline]
    pub fn is_lambda(&self) -> bool {
        matches!(self.callable, Callable::Lambda { .. })
    }

    /// Identity comparison of the underlying target.
    pub fn same_target(&self, other: &FunctionPointerValue) -> bool {
        match (&self.callable, &other.callable) {
            (Callable::Lambda { lambda: a, .. }, Callable::Lambda { lambda: b, .. }) => {
                Arc::ptr_eq(a, b)
            }
            (Callable::Native(a), Callable::Native(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for FunctionPointerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionPointerValue")
            .field("name", &self.name)
            .field("param_count", &self.param_count)
            .field("lambda", &self.is_lambda())
            .finish()
    }
}

impl fmt::Display for FunctionPointerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_lambda() {
            f.write_str("<lambda>")
        } else {
            write!(f, "@{}", self.name)
        }
    }
}

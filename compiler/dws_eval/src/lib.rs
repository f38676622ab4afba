//! DWS Eval - Record engine and reference host interpreter.
//!
//! The record engine turns `RecordDecl`s into registered `RecordType`s and
//! builds instances from them. `Interpreter` is a small tree-walking host
//! that evaluates `dws_ir` expressions and implements `dws_runtime::Context`
//! so the built-in catalogue runs against real evaluation.
//!
//! # Debug Environment Variables
//!
//! - `RUST_LOG=dws_eval=debug`: record declarations and assertion failures.
//! - `RUST_LOG=dws_eval=trace,dws_runtime=trace`: every built-in call and
//!   callback invocation.
//!
//! Call `init_tracing()` once to install the subscriber.

mod config;
mod diagnostics;
mod environment;
mod interpreter;
mod records;
mod stack;

use std::sync::Once;

pub use config::InterpreterConfig;
pub use diagnostics::{CallFrame, CallStack};
pub use environment::Environment;
pub use interpreter::{Exception, Interpreter};
pub use records::{records_equal, RecordEngine, RecordHost};
pub use stack::ensure_sufficient_stack;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

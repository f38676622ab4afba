//! Interpreter configuration.

/// Settings for a new `Interpreter`.
///
/// ```text
/// let config = InterpreterConfig::default()
///     .with_max_call_depth(256)
///     .with_rand_seed(42);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Deepest function-pointer nesting before evaluation fails.
    pub max_call_depth: usize,
    /// Fixed seed for `Random` and friends. `None` seeds from the clock.
    pub rand_seed: Option<i64>,
}

impl InterpreterConfig {
    pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    #[must_use]
    pub fn with_rand_seed(mut self, seed: i64) -> Self {
        self.rand_seed = Some(seed);
        self
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            max_call_depth: Self::DEFAULT_MAX_CALL_DEPTH,
            rand_seed: None,
        }
    }
}

//! Call-stack tracking for `GetStackTrace`, `GetCallStack` and the
//! recursion limit.

use dws_ir::Position;
use dws_runtime::errors::{self, EvalError};

/// One active call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallFrame {
    pub function_name: String,
    /// Call site, not the callee's definition.
    pub position: Position,
}

impl CallFrame {
    pub fn new(function_name: impl Into<String>, position: Position) -> Self {
        CallFrame {
            function_name: function_name.into(),
            position,
        }
    }
}

/// Live call stack with a depth limit checked on `push`.
///
/// ```text
/// stack.push(CallFrame::new("Helper", pos))?;
/// // ... evaluate the body ...
/// stack.pop();
/// ```
#[derive(Clone, Debug)]
pub struct CallStack {
    frames: Vec<CallFrame>,
    max_depth: usize,
}

impl CallStack {
    pub fn new(max_depth: usize) -> Self {
        CallStack {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a frame. At the depth limit the frame is not pushed and a
    /// stack-overflow error is returned.
    pub fn push(&mut self, frame: CallFrame) -> Result<(), EvalError> {
        if self.frames.len() >= self.max_depth {
            return Err(errors::recursion_limit_exceeded(self.max_depth));
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) {
        debug_assert!(!self.frames.is_empty(), "CallStack::pop on empty stack");
        self.frames.pop();
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames, oldest first.
    pub fn frames(&self) -> &[CallFrame] {
        &self.frames
    }

    /// One `Name [line: L, column: C]` line per frame, newest first.
    pub fn render(&self) -> String {
        self.frames
            .iter()
            .rev()
            .map(|frame| format!("{} [{}]", frame.function_name, frame.position))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

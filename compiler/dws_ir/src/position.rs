//! Source positions.
//!
//! DWScript diagnostics report `[line: L, column: C]`, so nodes carry a
//! line/column pair rather than byte offsets.

use std::fmt;

/// A 1-based line/column location in a script.
///
/// `Position::UNKNOWN` (0:0) marks synthesized nodes.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// Position for nodes that were not produced from source text.
    pub const UNKNOWN: Position = Position { line: 0, column: 0 };

    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }

    /// Returns `true` if this position points into real source text.
    #[inline]
    pub const fn is_known(self) -> bool {
        self.line != 0
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line: {}, column: {}", self.line, self.column)
    }
}

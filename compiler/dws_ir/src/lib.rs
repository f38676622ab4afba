//! DWS IR - Syntax tree types consumed by the DWScript runtime core.
//!
//! The lexer and parser live outside this workspace. This crate only fixes
//! the shape of the nodes they hand over:
//!
//! - `Position` - line/column location attached to every node
//! - `Expr` / `ExprKind` - expressions used by field initializers and lambdas
//! - `RecordDecl`, `FieldDecl`, `MethodDecl` - record type declarations
//! - `RecordLiteral` - `TPoint(x: 1; y: 2)` style record construction
//!
//! Nodes are plain owned trees. Lambdas are reference counted because a
//! function pointer created from one outlives the expression tree it came
//! from.

mod ast;
mod position;

pub use ast::{
    BinaryOp, Expr, ExprKind, FieldDecl, Lambda, MethodDecl, Param, RecordDecl, RecordLiteral,
    RecordLiteralField, UnaryOp,
};
pub use position::Position;

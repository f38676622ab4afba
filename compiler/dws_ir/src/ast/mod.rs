//! Syntax tree nodes handed over by the parser.
//!
//! # Architecture
//!
//! ```text
//! RecordDecl
//!     ├── FieldDecl (type name + optional initializer Expr)
//!     └── MethodDecl (instance or class method signature)
//! Expr
//!     ├── literals, identifiers, operators, calls
//!     ├── Lambda (Arc, captured by function pointers)
//!     └── RecordLiteral
//! ```
//!
//! Type names stay as source strings (`"Integer"`, `"array of TPoint"`,
//! `"TSub(TBase)"`). Resolving them is the job of the type registry.

mod operators;

use std::sync::Arc;

use crate::Position;

pub use operators::{BinaryOp, UnaryOp};

/// An expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub pos: Position,
}

/// The shape of an expression.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    // Literals
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Nil,

    /// Variable, constant or function reference.
    Ident(String),

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// `Name(args)` where `Name` is a built-in or a function pointer variable.
    Call {
        callee: String,
        args: Vec<Expr>,
    },

    /// `lambda(x: Integer) => x * 2`
    Lambda(Arc<Lambda>),

    /// `[1, 2, 3]`
    ArrayLiteral(Vec<Expr>),

    RecordLiteral(RecordLiteral),

    /// `target.field`
    Field {
        target: Box<Expr>,
        field: String,
    },

    /// `target[index]`
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
}

// Construction helpers

impl Expr {
    #[inline]
    pub fn new(kind: ExprKind, pos: Position) -> Self {
        Expr { kind, pos }
    }

    /// Build an expression with an unknown position.
    #[inline]
    pub fn synthetic(kind: ExprKind) -> Self {
        Expr::new(kind, Position::UNKNOWN)
    }

    pub fn int(value: i64) -> Self {
        Expr::synthetic(ExprKind::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        Expr::synthetic(ExprKind::Float(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::synthetic(ExprKind::String(value.into()))
    }

    pub fn boolean(value: bool) -> Self {
        Expr::synthetic(ExprKind::Boolean(value))
    }

    pub fn nil() -> Self {
        Expr::synthetic(ExprKind::Nil)
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::synthetic(ExprKind::Ident(name.into()))
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::synthetic(ExprKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::synthetic(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn call(callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::synthetic(ExprKind::Call {
            callee: callee.into(),
            args,
        })
    }

    pub fn lambda(lambda: Lambda) -> Self {
        let pos = lambda.pos;
        Expr::new(ExprKind::Lambda(Arc::new(lambda)), pos)
    }

    pub fn array(items: Vec<Expr>) -> Self {
        Expr::synthetic(ExprKind::ArrayLiteral(items))
    }

    pub fn record(literal: RecordLiteral) -> Self {
        let pos = literal.pos;
        Expr::new(ExprKind::RecordLiteral(literal), pos)
    }

    pub fn field(target: Expr, field: impl Into<String>) -> Self {
        Expr::synthetic(ExprKind::Field {
            target: Box::new(target),
            field: field.into(),
        })
    }

    pub fn index(target: Expr, index: Expr) -> Self {
        Expr::synthetic(ExprKind::Index {
            target: Box::new(target),
            index: Box::new(index),
        })
    }

    /// Attach a source position.
    #[must_use]
    pub fn at(mut self, pos: Position) -> Self {
        self.pos = pos;
        self
    }
}

/// A parameter in a lambda or method signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    /// Declared type name, `None` for untyped lambda parameters.
    pub type_name: Option<String>,
}

impl Param {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            type_name: Some(type_name.into()),
        }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            type_name: None,
        }
    }
}

/// An anonymous function with an expression body.
#[derive(Clone, Debug, PartialEq)]
pub struct Lambda {
    pub params: Vec<Param>,
    pub return_type: Option<String>,
    pub body: Expr,
    pub pos: Position,
}

impl Lambda {
    pub fn new(params: Vec<Param>, body: Expr) -> Self {
        Lambda {
            params,
            return_type: None,
            body,
            pos: Position::UNKNOWN,
        }
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// `type TPoint = record ... end;`
#[derive(Clone, Debug, PartialEq)]
pub struct RecordDecl {
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub pos: Position,
}

impl RecordDecl {
    pub fn new(name: impl Into<String>) -> Self {
        RecordDecl {
            name: name.into(),
            fields: Vec::new(),
            methods: Vec::new(),
            pos: Position::UNKNOWN,
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }
}

/// A record field: `X, Y: Integer;` is split by the parser into one
/// `FieldDecl` per name.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub type_name: String,
    /// `Count: Integer := 10;`
    pub initializer: Option<Expr>,
    pub pos: Position,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        FieldDecl {
            name: name.into(),
            type_name: type_name.into(),
            initializer: None,
            pos: Position::UNKNOWN,
        }
    }

    #[must_use]
    pub fn with_initializer(mut self, init: Expr) -> Self {
        self.initializer = Some(init);
        self
    }
}

/// A method declared inside a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<Param>,
    /// `None` for procedures.
    pub return_type: Option<String>,
    /// `class function` / `class procedure`.
    pub is_class_method: bool,
    pub pos: Position,
}

impl MethodDecl {
    pub fn procedure(name: impl Into<String>) -> Self {
        MethodDecl {
            name: name.into(),
            params: Vec::new(),
            return_type: None,
            is_class_method: false,
            pos: Position::UNKNOWN,
        }
    }

    pub fn function(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        MethodDecl {
            return_type: Some(return_type.into()),
            ..MethodDecl::procedure(name)
        }
    }

    #[must_use]
    pub fn class_method(mut self) -> Self {
        self.is_class_method = true;
        self
    }

    #[must_use]
    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }
}

/// A record literal, `TPoint(X: 1; Y: 2)` or the anonymous `(X: 1; Y: 2)`.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordLiteral {
    pub type_name: Option<String>,
    pub fields: Vec<RecordLiteralField>,
    pub pos: Position,
}

impl RecordLiteral {
    pub fn typed(type_name: impl Into<String>) -> Self {
        RecordLiteral {
            type_name: Some(type_name.into()),
            fields: Vec::new(),
            pos: Position::UNKNOWN,
        }
    }

    pub fn untyped() -> Self {
        RecordLiteral {
            type_name: None,
            fields: Vec::new(),
            pos: Position::UNKNOWN,
        }
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: Expr) -> Self {
        self.fields.push(RecordLiteralField {
            name: Some(name.into()),
            value,
        });
        self
    }

    #[must_use]
    pub fn with_positional(mut self, value: Expr) -> Self {
        self.fields.push(RecordLiteralField { name: None, value });
        self
    }
}

/// One `name: value` entry of a record literal. `name` is `None` for
/// positional entries.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordLiteralField {
    pub name: Option<String>,
    pub value: Expr,
}

//! The typed tree.
//!
//! The collector produces it from a `Program` with every symbol bound and
//! every expression still pending; the resolver replaces each pending
//! expression with a resolved one and fills in data types.

use cinder_core::ast::{AssignOp, BinaryOp, CastOp, Expr, SyntaxType, UnaryOp};
use cinder_core::{Span, Token};

use super::ids::{ScopeId, SymbolId};
use super::types::DataType;

#[derive(Debug, Clone, PartialEq)]
pub struct TypedProgram {
    /// Innermost module of the `mod` header.
    pub module: SymbolId,
    pub scope: ScopeId,
    pub statements: Vec<TypedStmt>,
    pub span: Span,
}

impl TypedProgram {
    /// Import bindings of the file, in declaration order.
    pub fn imports(&self) -> impl Iterator<Item = &ImportBinding> {
        self.statements.iter().flat_map(|statement| match statement {
            TypedStmt::Import(bindings) => bindings.as_slice(),
            _ => &[][..],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportKind {
    /// Binds the symbol at `path` under `name`.
    Named { name: String },
    /// Makes every member of the scope owned by `path` visible.
    Wildcard,
}

/// A file-local name introduced by a `use` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub kind: ImportKind,
    pub path: Vec<String>,
    /// Set once the resolver found the symbol at `path`.
    pub target: Option<SymbolId>,
    pub span: Span,
}

impl ImportBinding {
    pub fn named(name: impl Into<String>, path: Vec<String>, span: Span) -> Self {
        Self {
            kind: ImportKind::Named { name: name.into() },
            path,
            target: None,
            span,
        }
    }

    pub fn wildcard(path: Vec<String>, span: Span) -> Self {
        Self {
            kind: ImportKind::Wildcard,
            path,
            target: None,
            span,
        }
    }

    /// Name bound in the importing file; `None` for wildcards.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ImportKind::Named { name } => Some(name),
            ImportKind::Wildcard => None,
        }
    }

    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedStmt {
    Import(Vec<ImportBinding>),
    Entry(TypedEntry),
    Block(TypedBlock),
    Return(TypedReturn),
    Expression(TypedExpr),
}

impl TypedStmt {
    pub fn span(&self) -> Span {
        match self {
            TypedStmt::Import(bindings) => bindings
                .iter()
                .map(|binding| binding.span)
                .reduce(Span::join)
                .unwrap_or_default(),
            TypedStmt::Entry(entry) => entry.span,
            TypedStmt::Block(block) => block.span,
            TypedStmt::Return(ret) => ret.span,
            TypedStmt::Expression(expr) => expr.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedEntry {
    pub symbol: SymbolId,
    pub scope: ScopeId,
    pub parameters: Vec<TypedParameter>,
    pub return_syntax: Option<SyntaxType>,
    pub return_type: Option<DataType>,
    pub body: Vec<TypedStmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedParameter {
    pub symbol: SymbolId,
    /// `None` for `self`.
    pub syntax: Option<SyntaxType>,
    pub variadic: bool,
    pub default: Option<TypedExpr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedBlock {
    pub scope: ScopeId,
    pub statements: Vec<TypedStmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedReturn {
    pub value: Option<TypedExpr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr {
    pub kind: TypedExprKind,
    /// `None` when the type is unknown, as for `null`.
    pub data_type: Option<DataType>,
    pub span: Span,
}

impl TypedExpr {
    /// Wrap a syntax expression for the resolver to pick up.
    pub fn pending(expr: &Expr) -> Self {
        Self {
            span: expr.span(),
            kind: TypedExprKind::Pending(Box::new(expr.clone())),
            data_type: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.kind, TypedExprKind::Pending(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedExprKind {
    /// Not resolved yet.
    Pending(Box<Expr>),
    Literal(Token),
    Identifier { token: Token, symbol: SymbolId },
    Type(DataType),
    Unary {
        op: UnaryOp,
        operand: Box<TypedExpr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },
    Assignment {
        op: AssignOp,
        target: Box<TypedExpr>,
        value: Box<TypedExpr>,
    },
    Conditional {
        condition: Box<TypedExpr>,
        then_branch: Box<TypedExpr>,
        else_branch: Box<TypedExpr>,
    },
    Cast {
        op: CastOp,
        value: Box<TypedExpr>,
        target: DataType,
    },
    InterpolatedString(Vec<TypedExpr>),
    Tuple(Vec<TypedExpr>),
    List(Vec<TypedExpr>),
}

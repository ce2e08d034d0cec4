//! Syntax tree node definitions.
//!
//! These types represent parsed Cinder source after lexing. Nodes are plain
//! owned data: parents own their children and every node carries the span it
//! covers, so collection, resolution and diagnostics can share them without
//! back references. Consumers walk the tree with `match`.

use std::fmt;

use super::{AssignOp, BinaryOp, CastOp, TokenKind, UnaryOp};
use crate::diag::Span;
use crate::parser::lexer::Token;

/// Dotted module path from a `mod` header.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleName {
    /// Empty when the header was missing or malformed.
    pub segments: Vec<Token>,
    pub span: Span,
}

impl ModuleName {
    /// Placeholder used when the header could not be parsed.
    pub fn error(span: Span) -> Self {
        Self {
            segments: Vec::new(),
            span,
        }
    }

    pub fn is_error(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.segments.iter().map(Token::text)
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_error() {
            return f.write_str("<error>");
        }

        for (index, name) in self.names().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

/// Root of a parsed file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub module: ModuleName,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Import(ImportStmt),
    AggregateImport(AggregateImportStmt),
    Entry(EntryStmt),
    Block(BlockStmt),
    Return(ReturnStmt),
    Expression(Expr),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Import(import) => import.span,
            Stmt::AggregateImport(import) => import.span,
            Stmt::Entry(entry) => entry.span,
            Stmt::Block(block) => block.span,
            Stmt::Return(ret) => ret.span,
            Stmt::Expression(expr) => expr.span(),
        }
    }

    pub fn is_import(&self) -> bool {
        matches!(self, Stmt::Import(_) | Stmt::AggregateImport(_))
    }
}

/// `use a.b.c [as d]` or `use a.b.*`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportStmt {
    /// Module path leading up to the imported item.
    pub scope: Vec<Token>,
    /// Identifier or `*`.
    pub item: Token,
    pub alias: Option<Token>,
    pub span: Span,
}

impl ImportStmt {
    pub fn is_wildcard(&self) -> bool {
        self.item.kind == TokenKind::Star
    }
}

impl fmt::Display for ImportStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_path(f, &self.scope)?;
        write!(f, "::{}", self.item.text())?;
        if let Some(alias) = &self.alias {
            write!(f, " as {}", alias.text())?;
        }
        Ok(())
    }
}

/// One entry of a `{ ... }` import group.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportItem {
    pub name: Token,
    pub alias: Option<Token>,
}

impl ImportItem {
    /// Name the item is bound to in the importing file.
    pub fn binding(&self) -> &Token {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}

/// `use a.b.{x, y as z} [as m]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateImportStmt {
    pub scope: Vec<Token>,
    pub items: Vec<ImportItem>,
    /// Binds the module itself.
    pub alias: Option<Token>,
    pub span: Span,
}

impl fmt::Display for AggregateImportStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_path(f, &self.scope)?;
        f.write_str("::{")?;
        for (index, item) in self.items.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            f.write_str(item.name.text())?;
            if let Some(alias) = &item.alias {
                write!(f, " as {}", alias.text())?;
            }
        }
        f.write_str("}")?;
        if let Some(alias) = &self.alias {
            write!(f, " as {}", alias.text())?;
        }
        Ok(())
    }
}

fn write_path(f: &mut fmt::Formatter<'_>, path: &[Token]) -> fmt::Result {
    for (index, segment) in path.iter().enumerate() {
        if index > 0 {
            f.write_str(".")?;
        }
        f.write_str(segment.text())?;
    }
    Ok(())
}

/// `name : modifiers entry(params) [: [!effects] [type]] { body }`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryStmt {
    pub name: Token,
    pub modifiers: Vec<Token>,
    pub parameters: Vec<Parameter>,
    pub effects: Vec<Token>,
    pub return_type: Option<SyntaxType>,
    pub body: BlockStmt,
    pub span: Span,
}

impl EntryStmt {
    pub fn has_modifier(&self, kind: TokenKind) -> bool {
        self.modifiers.iter().any(|modifier| modifier.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    SelfParam(SelfParameter),
    Variable(VariableParameter),
}

impl Parameter {
    pub fn span(&self) -> Span {
        match self {
            Parameter::SelfParam(param) => param.span,
            Parameter::Variable(param) => param.span,
        }
    }

    pub fn modifiers(&self) -> &[Token] {
        match self {
            Parameter::SelfParam(param) => &param.modifiers,
            Parameter::Variable(param) => &param.modifiers,
        }
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self, Parameter::Variable(param) if param.variadic)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelfParameter {
    pub token: Token,
    pub modifiers: Vec<Token>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableParameter {
    pub name: Token,
    pub modifiers: Vec<Token>,
    pub ty: SyntaxType,
    pub variadic: bool,
    pub default: Option<Expr>,
    pub span: Span,
}

/// Unresolved type expression as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxType {
    Base(Token),
    /// `T[]`, `T[,]`, ...: one node per bracket pair.
    Array {
        element: Box<SyntaxType>,
        dimensions: usize,
        span: Span,
    },
    Tuple {
        elements: Vec<SyntaxType>,
        span: Span,
    },
}

impl SyntaxType {
    pub fn span(&self) -> Span {
        match self {
            SyntaxType::Base(token) => token.span,
            SyntaxType::Array { span, .. } | SyntaxType::Tuple { span, .. } => *span,
        }
    }
}

impl fmt::Display for SyntaxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxType::Base(token) => f.write_str(token.text()),
            SyntaxType::Array {
                element,
                dimensions,
                ..
            } => write!(f, "{element}[{}]", ",".repeat(dimensions.saturating_sub(1))),
            SyntaxType::Tuple { elements, .. } => {
                f.write_str("(")?;
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpr {
    pub parameters: Vec<Parameter>,
    pub return_type: Option<SyntaxType>,
    /// Expression bodies are wrapped in a single return statement.
    pub body: BlockStmt,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Lambda(Box<LambdaExpr>),
    Assignment {
        target: Box<Expr>,
        op: AssignOp,
        value: Box<Expr>,
        span: Span,
    },
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Cast {
        op: CastOp,
        value: Box<Expr>,
        ty: SyntaxType,
        span: Span,
    },
    Access {
        object: Box<Expr>,
        member: Token,
        null_check: bool,
        span: Span,
    },
    Index {
        object: Box<Expr>,
        arguments: Vec<Expr>,
        null_check: bool,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        span: Span,
    },
    /// Literal, identifier or `self`.
    Token(Token),
    Type(SyntaxType),
    InterpolatedString {
        parts: Vec<Expr>,
        span: Span,
    },
    Tuple {
        elements: Vec<Expr>,
        span: Span,
    },
    List {
        ty: Option<SyntaxType>,
        elements: Vec<Expr>,
        span: Span,
    },
    Map {
        ty: Option<SyntaxType>,
        entries: Vec<(Expr, Expr)>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Lambda(lambda) => lambda.span,
            Expr::Token(token) => token.span,
            Expr::Type(ty) => ty.span(),
            Expr::Assignment { span, .. }
            | Expr::Conditional { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Cast { span, .. }
            | Expr::Access { span, .. }
            | Expr::Index { span, .. }
            | Expr::Call { span, .. }
            | Expr::InterpolatedString { span, .. }
            | Expr::Tuple { span, .. }
            | Expr::List { span, .. }
            | Expr::Map { span, .. } => *span,
        }
    }

    /// Leaf token, if this is one.
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Expr::Token(token) => Some(token),
            _ => None,
        }
    }
}

//! Symbol entries.
//!
//! Symbols describe named program elements (modules, types, entry points and
//! parameters). They are stored in the scope arena so that every file of a
//! compilation shares the same metadata.

use std::fmt;
use std::sync::Arc;

use cinder_core::{SourceBuffer, Span};

use crate::semantics::ids::{ScopeId, SymbolId, TypeId};
use crate::semantics::types::DataType;

/// Where a symbol was declared or used.
#[derive(Clone)]
pub struct SourceLocation {
    pub source: Arc<SourceBuffer>,
    pub span: Span,
}

impl SourceLocation {
    pub fn new(source: &Arc<SourceBuffer>, span: Span) -> Self {
        Self {
            source: Arc::clone(source),
            span,
        }
    }

    /// 1-based line and column of the start of the span.
    pub fn line_column(&self) -> (usize, usize) {
        self.source.line_column(self.span.start).unwrap_or((0, 0))
    }
}

impl fmt::Debug for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.source.name(), self.span)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, column) = self.line_column();
        write!(f, "{}:{}:{}", self.source.name(), line, column)
    }
}

/// Classification of a symbol, with the data each kind carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    /// Owns the scope its members are declared in.
    Module { scope: ScopeId },
    Type { scope: ScopeId, type_id: TypeId },
    Entry {
        scope: ScopeId,
        parameters: Vec<SymbolId>,
        /// Filled in by the resolver.
        return_type: Option<DataType>,
    },
    Parameter {
        /// Filled in by the resolver; `None` for `self`.
        data_type: Option<DataType>,
        variadic: bool,
    },
}

impl SymbolKind {
    /// Short name used in scope dumps.
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Module { .. } => "module",
            SymbolKind::Type { .. } => "type",
            SymbolKind::Entry { .. } => "entry",
            SymbolKind::Parameter { .. } => "parameter",
        }
    }

    /// Human-readable description used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            SymbolKind::Module { .. } => "a module",
            SymbolKind::Type { .. } => "a type",
            SymbolKind::Entry { .. } => "an entry point",
            SymbolKind::Parameter { .. } => "a parameter",
        }
    }

    /// Scope owned by the symbol, if its kind owns one.
    pub fn scope(&self) -> Option<ScopeId> {
        match self {
            SymbolKind::Module { scope }
            | SymbolKind::Type { scope, .. }
            | SymbolKind::Entry { scope, .. } => Some(*scope),
            SymbolKind::Parameter { .. } => None,
        }
    }
}

/// Metadata describing a single symbol.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    /// Scope the symbol is declared in.
    pub scope: ScopeId,
    /// Every declaration site; a module reopened by several files has one
    /// entry per reopening.
    pub declarations: Vec<SourceLocation>,
    pub usages: Vec<SourceLocation>,
}

impl Symbol {
    pub fn new(
        id: SymbolId,
        name: impl Into<String>,
        kind: SymbolKind,
        scope: ScopeId,
        declaration: Option<SourceLocation>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            scope,
            declarations: declaration.into_iter().collect(),
            usages: Vec::new(),
        }
    }

    pub fn is_module(&self) -> bool {
        matches!(self.kind, SymbolKind::Module { .. })
    }

    /// Scope owned by this symbol, if any.
    pub fn owned_scope(&self) -> Option<ScopeId> {
        self.kind.scope()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_describe_themselves() {
        let entry = SymbolKind::Entry {
            scope: ScopeId::from_raw(4),
            parameters: Vec::new(),
            return_type: None,
        };
        let parameter = SymbolKind::Parameter {
            data_type: None,
            variadic: false,
        };

        assert_eq!(entry.describe(), "an entry point");
        assert_eq!(entry.scope(), Some(ScopeId::from_raw(4)));
        assert_eq!(parameter.as_str(), "parameter");
        assert_eq!(parameter.scope(), None);
    }

    #[test]
    fn locations_render_as_file_line_column() {
        let source = Arc::new(SourceBuffer::new("demo.cin", "mod demo\nmain : entry() {}"));
        let location = SourceLocation::new(&source, Span::new(9, 13));

        assert_eq!(location.to_string(), "demo.cin:2:1");
    }
}

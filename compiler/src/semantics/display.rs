//! Debug printing for scope trees.
//!
//! Symbols are listed by name, each followed by the contents of the scope it
//! owns; anonymous block scopes come after the symbols of their parent.

use std::fmt::{self, Write};

use super::ids::{ScopeId, SymbolId};
use super::symbols::{ScopeArena, ScopeTree, SymbolKind};

/// Render the contents of `scope`.
pub fn format_scope(tree: &ScopeTree, scope: ScopeId) -> String {
    let arena = tree.lock();
    let mut formatter = ScopeFormatter::new(&arena);
    formatter.write_scope(scope, 0).expect("string writer");
    formatter.finish()
}

/// Render one symbol and everything below it.
pub fn format_symbol(tree: &ScopeTree, symbol: SymbolId) -> String {
    let arena = tree.lock();
    let mut formatter = ScopeFormatter::new(&arena);
    formatter.write_symbol(symbol, 0).expect("string writer");
    formatter.finish()
}

/// Writes an indented outline of a scope subtree.
pub struct ScopeFormatter<'a> {
    arena: &'a ScopeArena,
    buffer: String,
}

impl<'a> ScopeFormatter<'a> {
    pub fn new(arena: &'a ScopeArena) -> Self {
        Self {
            arena,
            buffer: String::new(),
        }
    }

    /// Consume the formatter and return the accumulated string.
    pub fn finish(self) -> String {
        self.buffer
    }

    pub fn write_scope(&mut self, id: ScopeId, indent: usize) -> fmt::Result {
        let arena = self.arena;
        let Some(scope) = arena.scope(id) else {
            return Ok(());
        };

        let mut symbols: Vec<(&String, &SymbolId)> = scope.symbols.iter().collect();
        symbols.sort();
        for (_, symbol) in symbols {
            self.write_symbol(*symbol, indent)?;
        }

        for child in &scope.children {
            let anonymous = arena
                .scope(*child)
                .is_some_and(|child| child.owner.is_none());
            if anonymous {
                self.write_block("block", *child, indent)?;
            }
        }

        Ok(())
    }

    pub fn write_symbol(&mut self, id: SymbolId, indent: usize) -> fmt::Result {
        let arena = self.arena;
        let Some(symbol) = arena.symbol(id) else {
            return self.indent_line(indent, &format!("<missing {id:?}>"));
        };

        let header = match &symbol.kind {
            SymbolKind::Module { .. } => format!("module {}", symbol.name),
            SymbolKind::Type { .. } => format!("type {}", symbol.name),
            SymbolKind::Entry {
                return_type: Some(return_type),
                ..
            } => format!("entry {} -> {}", symbol.name, return_type),
            SymbolKind::Entry { .. } => format!("entry {}", symbol.name),
            SymbolKind::Parameter {
                data_type: Some(data_type),
                ..
            } => format!("parameter {}: {}", symbol.name, data_type),
            SymbolKind::Parameter { .. } => format!("parameter {}", symbol.name),
        };

        match symbol.owned_scope() {
            Some(scope) => self.write_block(&header, scope, indent),
            None => self.indent_line(indent, &header),
        }
    }

    /// `header` alone for an empty scope, otherwise `header {` ... `}`.
    fn write_block(&mut self, header: &str, scope: ScopeId, indent: usize) -> fmt::Result {
        let empty = self
            .arena
            .scope(scope)
            .map_or(true, |scope| scope.symbols.is_empty() && scope.children.is_empty());
        if empty {
            return self.indent_line(indent, header);
        }

        self.indent_line(indent, &format!("{header} {{"))?;
        self.write_scope(scope, indent + 1)?;
        self.indent_line(indent, "}")
    }

    fn indent_line(&mut self, indent: usize, line: &str) -> fmt::Result {
        for _ in 0..indent {
            write!(self.buffer, "  ")?;
        }
        writeln!(self.buffer, "{}", line)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cinder_core::{SourceBuffer, parse};

    use super::*;
    use crate::semantics::symbols::{collect, resolve};

    #[test]
    fn renders_nested_scopes() {
        let tree = ScopeTree::with_natives();
        let source = Arc::new(SourceBuffer::new(
            "demo.cin",
            "mod demo.app\nmain : entry(b: bool, a: i32[]) : i32 {\n  {\n  }\n  ret 1\n}\nidle : entry() {}\n",
        ));
        let parsed = parse(Arc::clone(&source));
        let collected = collect(&tree, parsed.accepted().unwrap(), &source);
        let resolved = resolve(&tree, collected.program.unwrap(), &source);
        assert!(resolved.diagnostics.is_empty(), "{}", resolved.diagnostics);

        let demo = tree.resolve_path(&["demo"]).unwrap();
        assert_eq!(
            format_symbol(&tree, demo),
            "module demo {\n  module app {\n    entry idle\n    entry main -> i32 {\n      parameter a: i32[]\n      parameter b: bool\n      block\n    }\n  }\n}\n"
        );
    }

    #[test]
    fn global_scope_lists_natives() {
        let tree = ScopeTree::with_natives();
        let rendered = format_scope(&tree, tree.root());

        assert_eq!(rendered.lines().count(), 15);
        assert!(rendered.starts_with("type bool\ntype char\n"));
    }
}

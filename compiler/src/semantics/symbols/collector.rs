//! Symbol collection.
//!
//! The collector walks a parsed program once, opening the module scopes of
//! its `mod` header, creating a scope per entry point and block, and
//! declaring every module, entry point and parameter in the shared
//! `ScopeTree`. It returns a typed tree whose expressions are still pending;
//! resolution is a separate pass.

use std::sync::Arc;

use cinder_core::ast::{
    AggregateImportStmt, BlockStmt, EntryStmt, ImportStmt, Parameter, Program, Stmt,
};
use cinder_core::{
    Diagnostic, DiagnosticList, PassFailure, PassResult, SourceBuffer, Span, Token,
    catch_internal,
};

use super::scope::{DeclarationResult, ScopeIdStack, ScopeTree};
use super::symbol::{SourceLocation, SymbolKind};
use crate::semantics::SemanticOutput;
use crate::semantics::ids::{ScopeId, SymbolId};
use crate::semantics::typed::{
    ImportBinding, TypedBlock, TypedEntry, TypedExpr, TypedParameter, TypedProgram, TypedReturn,
    TypedStmt,
};

/// Collect the declarations of `program` into `tree`.
///
/// Never fails: problems are reported through `SemanticOutput::diagnostics`,
/// and the typed tree is only returned when every statement was collected.
#[tracing::instrument(skip_all, fields(source = %source.name()))]
pub fn collect(tree: &ScopeTree, program: &Program, source: &Arc<SourceBuffer>) -> SemanticOutput {
    let mut collector = Collector::new(tree, source);

    let result = catch_internal("Collector", source, || collector.collect_program(program));
    let mut diagnostics = collector.diagnostics;

    let program = match result {
        Ok(Ok(program)) => Some(program),
        Ok(Err(failure)) => {
            if let PassFailure::Reported(diagnostic) = failure {
                diagnostics.push(*diagnostic);
            }
            None
        }
        Err(internal) => {
            diagnostics.push(internal);
            None
        }
    };

    tracing::debug!(
        collected = program.is_some(),
        errors = diagnostics.error_count(),
        "collected"
    );

    SemanticOutput {
        program,
        diagnostics,
    }
}

struct Collector<'a> {
    tree: &'a ScopeTree,
    source: Arc<SourceBuffer>,
    scopes: ScopeIdStack,
    diagnostics: DiagnosticList,
}

impl<'a> Collector<'a> {
    fn new(tree: &'a ScopeTree, source: &Arc<SourceBuffer>) -> Self {
        Self {
            tree,
            source: Arc::clone(source),
            scopes: ScopeIdStack::new(),
            diagnostics: DiagnosticList::new(),
        }
    }

    fn collect_program(&mut self, program: &Program) -> PassResult<TypedProgram> {
        if program.module.is_error() {
            return Err(self.error(program.module.span, "Missing module name"));
        }

        self.scopes.push(self.tree.root());
        let result = self.collect_module(program);
        self.scopes.truncate(0);
        result
    }

    fn collect_module(&mut self, program: &Program) -> PassResult<TypedProgram> {
        let mut module = None;
        for segment in &program.module.segments {
            let (symbol, scope) = self.open_module(segment)?;
            self.scopes.push(scope);
            module = Some((symbol, scope));
        }

        let Some((module, scope)) = module else {
            return Err(self.error(program.module.span, "Missing module name"));
        };

        let statements = self.collect_statements(&program.statements)?;

        for _ in &program.module.segments {
            self.pop_scope(program.span)?;
        }
        if self.scopes.current() != Some(self.tree.root()) {
            return Err(self.unbalanced(program.span));
        }

        Ok(TypedProgram {
            module,
            scope,
            statements,
            span: program.span,
        })
    }

    fn open_module(&mut self, segment: &Token) -> PassResult<(SymbolId, ScopeId)> {
        let name = segment.text();
        self.tree
            .open_module(self.current_scope(), name, self.location(segment.span))
            .map_err(|_| {
                self.error(
                    segment.span,
                    format!(
                        "Cannot define a module named '{name}': A symbol with that name is already declared in this scope"
                    ),
                )
            })
    }

    /// Collect a statement list. A failing statement is recorded, the scope
    /// stack is unwound to where the list started and its siblings are still
    /// collected; the list as a whole then fails silently.
    fn collect_statements(&mut self, statements: &[Stmt]) -> PassResult<Vec<TypedStmt>> {
        let depth = self.scopes.len();
        let mut collected = Vec::with_capacity(statements.len());

        for statement in statements {
            match self.collect_statement(statement) {
                Ok(typed) => collected.push(Some(typed)),
                Err(failure) => {
                    self.scopes.truncate(depth);
                    self.record(failure);
                    collected.push(None);
                }
            }
        }

        collected
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(PassFailure::Silent)
    }

    fn collect_statement(&mut self, statement: &Stmt) -> PassResult<TypedStmt> {
        match statement {
            Stmt::Import(import) => Ok(TypedStmt::Import(self.collect_import(import))),
            Stmt::AggregateImport(import) => {
                Ok(TypedStmt::Import(self.collect_aggregate_import(import)))
            }
            Stmt::Entry(entry) => self.collect_entry(entry).map(TypedStmt::Entry),
            Stmt::Block(block) => self.collect_block(block).map(TypedStmt::Block),
            Stmt::Return(ret) => Ok(TypedStmt::Return(TypedReturn {
                value: ret.value.as_ref().map(TypedExpr::pending),
                span: ret.span,
            })),
            Stmt::Expression(expr) => Ok(TypedStmt::Expression(TypedExpr::pending(expr))),
        }
    }

    fn collect_import(&self, import: &ImportStmt) -> Vec<ImportBinding> {
        let mut path = path_of(&import.scope);
        if import.is_wildcard() {
            return vec![ImportBinding::wildcard(path, import.span)];
        }

        path.push(import.item.text().to_string());
        let name = import.alias.as_ref().unwrap_or(&import.item).text();
        vec![ImportBinding::named(name, path, import.span)]
    }

    fn collect_aggregate_import(&self, import: &AggregateImportStmt) -> Vec<ImportBinding> {
        let scope = path_of(&import.scope);
        let mut bindings: Vec<ImportBinding> = import
            .items
            .iter()
            .map(|item| {
                let mut path = scope.clone();
                path.push(item.name.text().to_string());
                ImportBinding::named(item.binding().text(), path, import.span)
            })
            .collect();

        if let Some(alias) = &import.alias {
            bindings.push(ImportBinding::named(alias.text(), scope, import.span));
        }

        bindings
    }

    fn collect_entry(&mut self, entry: &EntryStmt) -> PassResult<TypedEntry> {
        let parent = self.current_scope();
        let scope = self.tree.create_scope(parent);
        self.scopes.push(scope);

        let parameters = entry
            .parameters
            .iter()
            .map(|parameter| self.collect_parameter(scope, parameter))
            .collect::<PassResult<Vec<_>>>()?;

        let body = self.collect_statements(&entry.body.statements)?;
        self.pop_scope(entry.span)?;

        let kind = SymbolKind::Entry {
            scope,
            parameters: parameters.iter().map(|parameter| parameter.symbol).collect(),
            return_type: None,
        };
        let symbol = self.declare(parent, &entry.name, kind)?;

        Ok(TypedEntry {
            symbol,
            scope,
            parameters,
            return_syntax: entry.return_type.clone(),
            return_type: None,
            body,
            span: entry.span,
        })
    }

    fn collect_parameter(
        &mut self,
        scope: ScopeId,
        parameter: &Parameter,
    ) -> PassResult<TypedParameter> {
        match parameter {
            Parameter::SelfParam(param) => {
                let kind = SymbolKind::Parameter {
                    data_type: None,
                    variadic: false,
                };
                Ok(TypedParameter {
                    symbol: self.declare(scope, &param.token, kind)?,
                    syntax: None,
                    variadic: false,
                    default: None,
                    span: param.span,
                })
            }
            Parameter::Variable(param) => {
                let kind = SymbolKind::Parameter {
                    data_type: None,
                    variadic: param.variadic,
                };
                Ok(TypedParameter {
                    symbol: self.declare(scope, &param.name, kind)?,
                    syntax: Some(param.ty.clone()),
                    variadic: param.variadic,
                    default: param.default.as_ref().map(TypedExpr::pending),
                    span: param.span,
                })
            }
        }
    }

    fn collect_block(&mut self, block: &BlockStmt) -> PassResult<TypedBlock> {
        let scope = self.tree.create_scope(self.current_scope());
        self.scopes.push(scope);
        let statements = self.collect_statements(&block.statements)?;
        self.pop_scope(block.span)?;

        Ok(TypedBlock {
            scope,
            statements,
            span: block.span,
        })
    }

    fn declare(&mut self, scope: ScopeId, name: &Token, kind: SymbolKind) -> PassResult<SymbolId> {
        let description = kind.describe();
        match self
            .tree
            .declare(scope, name.text(), kind, Some(self.location(name.span)))
        {
            DeclarationResult::Ok(symbol) => Ok(symbol),
            DeclarationResult::Duplicate { .. } => Err(self.error(
                name.span,
                format!(
                    "Cannot define {description} named '{}': A symbol with that name is already declared in this scope",
                    name.text()
                ),
            )),
        }
    }

    fn current_scope(&self) -> ScopeId {
        self.scopes.current().unwrap_or(self.tree.root())
    }

    fn pop_scope(&mut self, span: Span) -> PassResult<ScopeId> {
        match self.scopes.pop() {
            Some(scope) if !self.scopes.is_empty() => Ok(scope),
            _ => Err(self.unbalanced(span)),
        }
    }

    fn unbalanced(&self, span: Span) -> PassFailure {
        self.error(span, "Invalid operation: Scope stack unbalanced")
    }

    fn location(&self, span: Span) -> SourceLocation {
        SourceLocation::new(&self.source, span)
    }

    fn error(&self, span: Span, message: impl Into<String>) -> PassFailure {
        PassFailure::from(Diagnostic::error(&self.source, span, message))
    }

    fn record(&mut self, failure: PassFailure) {
        if let PassFailure::Reported(diagnostic) = failure {
            self.diagnostics.push(*diagnostic);
        }
    }
}

fn path_of(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(|token| token.text().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use cinder_core::parse;

    use super::*;
    use crate::semantics::typed::ImportKind;

    fn collect_src(tree: &ScopeTree, src: &str) -> SemanticOutput {
        let source = Arc::new(SourceBuffer::new("test.cin", src));
        let parsed = parse(Arc::clone(&source));
        let program = parsed
            .accepted()
            .unwrap_or_else(|| panic!("parse failed: {}", parsed.diagnostics));
        collect(tree, program, &source)
    }

    fn messages(output: &SemanticOutput) -> Vec<String> {
        output
            .diagnostics
            .iter()
            .map(|diagnostic| diagnostic.message.clone())
            .collect()
    }

    #[test]
    fn declares_entries_and_parameters() {
        let tree = ScopeTree::with_natives();
        let output = collect_src(
            &tree,
            "mod demo.app\nmain : entry(x: i32, y: i32 = 2) : i32 {\n  ret x\n}\n",
        );

        let program = output.program.expect("collection succeeds");
        let module = tree.symbol(program.module).unwrap();
        assert_eq!(module.name, "app");
        assert_eq!(tree.resolve_path(&["demo", "app"]), Some(program.module));

        let main = tree.lookup_local(program.scope, "main").unwrap();
        let SymbolKind::Entry {
            scope, parameters, ..
        } = tree.symbol(main).unwrap().kind
        else {
            panic!("main must be an entry point");
        };
        assert_eq!(parameters.len(), 2);
        assert_eq!(tree.lookup_local(scope, "y"), Some(parameters[1]));
        assert_eq!(tree.lookup_local(program.scope, "x"), None);

        let TypedStmt::Entry(entry) = &program.statements[0] else {
            panic!("expected an entry statement");
        };
        assert!(entry.parameters[1].default.as_ref().is_some_and(TypedExpr::is_pending));
        assert!(matches!(entry.body[0], TypedStmt::Return(_)));
    }

    #[test]
    fn nested_modules_reopen_the_same_scope() {
        let tree = ScopeTree::with_natives();
        let first = collect_src(&tree, "mod a.b.c\nrun : entry() {}\n");
        let second = collect_src(&tree, "mod a.b\nstart : entry() {}\n");

        let c_scope = first.program.unwrap().scope;
        let b_scope = second.program.unwrap().scope;
        assert_eq!(tree.parent(c_scope), Some(b_scope));
        assert!(tree.lookup(b_scope, "start").is_some());
        assert_eq!(tree.lookup(b_scope, "run"), None);
        assert!(tree.lookup(c_scope, "start").is_some());

        let b = tree.resolve_path(&["a", "b"]).unwrap();
        assert_eq!(tree.symbol(b).unwrap().declarations.len(), 2);
    }

    #[test]
    fn module_names_cannot_shadow_other_symbols() {
        let tree = ScopeTree::with_natives();
        let output = collect_src(&tree, "mod i32\nmain : entry() {}\n");

        assert!(output.program.is_none());
        assert_eq!(
            messages(&output),
            vec![
                "Cannot define a module named 'i32': A symbol with that name is already declared in this scope"
            ]
        );
        assert_eq!(tree.lookup(tree.root(), "main"), None);
    }

    #[test]
    fn duplicates_fail_only_their_statement() {
        let tree = ScopeTree::with_natives();
        let output = collect_src(
            &tree,
            "mod demo\nmain : entry(a: i32, a: i32) {}\nmain : entry() {}\nother : entry() {}\nother : entry() {}\n",
        );

        assert!(output.program.is_none());
        assert_eq!(
            messages(&output),
            vec![
                "Cannot define a parameter named 'a': A symbol with that name is already declared in this scope",
                "Cannot define an entry point named 'other': A symbol with that name is already declared in this scope",
            ]
        );

        let demo = tree.resolve_path(&["demo"]).and_then(|id| tree.symbol(id)).unwrap();
        let scope = demo.owned_scope().unwrap();
        assert!(tree.lookup_local(scope, "main").is_some());
        assert!(tree.lookup_local(scope, "other").is_some());
    }

    #[test]
    fn blocks_get_anonymous_scopes() {
        let tree = ScopeTree::with_natives();
        let output = collect_src(&tree, "mod demo\nmain : entry() {\n  {\n    1\n  }\n}\n");

        let program = output.program.unwrap();
        let TypedStmt::Entry(entry) = &program.statements[0] else {
            panic!("expected an entry statement");
        };
        let TypedStmt::Block(block) = &entry.body[0] else {
            panic!("expected a block");
        };
        assert_eq!(tree.parent(block.scope), Some(entry.scope));
        assert_eq!(tree.lock().scope(block.scope).and_then(|s| s.owner), None);
    }

    #[test]
    fn imports_become_file_local_bindings() {
        let tree = ScopeTree::with_natives();
        let output = collect_src(
            &tree,
            "mod demo\nuse std.io.print as write\nuse std.fs.*\nuse std.text.{trim, pad as fill} as text\n",
        );

        let program = output.program.unwrap();
        let bindings: Vec<(Option<&str>, String)> = program
            .imports()
            .map(|binding| (binding.name(), binding.dotted_path()))
            .collect();
        assert_eq!(
            bindings,
            vec![
                (Some("write"), "std.io.print".to_string()),
                (None, "std.fs".to_string()),
                (Some("trim"), "std.text.trim".to_string()),
                (Some("fill"), "std.text.pad".to_string()),
                (Some("text"), "std.text".to_string()),
            ]
        );
        assert!(program.imports().all(|binding| binding.target.is_none()));
        assert!(matches!(
            program.imports().nth(1).map(|binding| &binding.kind),
            Some(ImportKind::Wildcard)
        ));
        assert_eq!(tree.resolve_path(&["std"]), None);
    }
}

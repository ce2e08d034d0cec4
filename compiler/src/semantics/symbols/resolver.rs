//! Name resolution and elementary type inference.
//!
//! The resolver walks a collected `TypedProgram` a second time, re-entering
//! the scopes the collector created. It binds imports against the global
//! scope, binds identifiers and type names to symbols, records usages and
//! computes expression types. Expression kinds without typing rules yet are
//! reported as unsupported.

use std::sync::Arc;

use cinder_core::ast::{AssignOp, BinaryOp, CastOp, Expr, SyntaxType, TokenKind, UnaryOp};
use cinder_core::{
    Diagnostic, DiagnosticList, PassFailure, PassResult, SourceBuffer, Span, Token,
    catch_internal,
};

use super::scope::{ScopeIdStack, ScopeTree};
use super::symbol::{SourceLocation, Symbol, SymbolKind};
use crate::semantics::SemanticOutput;
use crate::semantics::ids::{ScopeId, SymbolId};
use crate::semantics::typed::{
    ImportBinding, ImportKind, TypedBlock, TypedEntry, TypedExpr, TypedExprKind,
    TypedParameter, TypedProgram, TypedReturn, TypedStmt,
};
use crate::semantics::types::{DataType, TypeRef};

/// Resolve a collected program against `tree`.
///
/// Run it only after every file of the compilation has been collected, so
/// that imports can see modules declared by other files.
#[tracing::instrument(skip_all, fields(source = %source.name()))]
pub fn resolve(
    tree: &ScopeTree,
    program: TypedProgram,
    source: &Arc<SourceBuffer>,
) -> SemanticOutput {
    let mut resolver = Resolver::new(tree, source);

    let result = catch_internal("Resolver", source, || resolver.resolve_program(program));
    let mut diagnostics = resolver.diagnostics;

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
        resolved = program.is_some(),
        errors = diagnostics.error_count(),
        "resolved"
    );

    SemanticOutput {
        program,
        diagnostics,
    }
}

/// What a `ret` inside the current statement may return.
#[derive(Debug, Clone)]
enum ReturnContext {
    Outside,
    Entry(Option<DataType>),
}

struct Resolver<'a> {
    tree: &'a ScopeTree,
    source: Arc<SourceBuffer>,
    scopes: ScopeIdStack,
    /// Import bindings resolved so far, in declaration order.
    imports: Vec<ImportBinding>,
    returns: ReturnContext,
    diagnostics: DiagnosticList,
}

type Resolved = (TypedExprKind, Option<DataType>);

impl<'a> Resolver<'a> {
    fn new(tree: &'a ScopeTree, source: &Arc<SourceBuffer>) -> Self {
        Self {
            tree,
            source: Arc::clone(source),
            scopes: ScopeIdStack::new(),
            imports: Vec::new(),
            returns: ReturnContext::Outside,
            diagnostics: DiagnosticList::new(),
        }
    }

    fn resolve_program(&mut self, program: TypedProgram) -> PassResult<TypedProgram> {
        let TypedProgram {
            module,
            scope,
            statements,
            span,
        } = program;

        self.scopes.push(scope);
        let statements = self.resolve_statements(statements);
        self.scopes.truncate(0);

        Ok(TypedProgram {
            module,
            scope,
            statements: statements?,
            span,
        })
    }

    /// Same failure discipline as collection: a failing statement is
    /// recorded, the stack is unwound and the siblings are still resolved.
    fn resolve_statements(&mut self, statements: Vec<TypedStmt>) -> PassResult<Vec<TypedStmt>> {
        let depth = self.scopes.len();
        let mut resolved = Vec::with_capacity(statements.len());

        for statement in statements {
            match self.resolve_statement(statement) {
                Ok(typed) => resolved.push(Some(typed)),
                Err(failure) => {
                    self.scopes.truncate(depth);
                    self.record(failure);
                    resolved.push(None);
                }
            }
        }

        resolved
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(PassFailure::Silent)
    }

    fn resolve_statement(&mut self, statement: TypedStmt) -> PassResult<TypedStmt> {
        match statement {
            TypedStmt::Import(bindings) => bindings
                .into_iter()
                .map(|binding| self.resolve_import(binding))
                .collect::<PassResult<Vec<_>>>()
                .map(TypedStmt::Import),
            TypedStmt::Entry(entry) => self.resolve_entry(entry).map(TypedStmt::Entry),
            TypedStmt::Block(block) => self.resolve_block(block).map(TypedStmt::Block),
            TypedStmt::Return(ret) => self.resolve_return(ret).map(TypedStmt::Return),
            TypedStmt::Expression(expr) => self.resolve_typed_expr(expr).map(TypedStmt::Expression),
        }
    }

    fn resolve_import(&mut self, mut binding: ImportBinding) -> PassResult<ImportBinding> {
        let path = binding.dotted_path();
        let Some(target) = self.tree.resolve_path(&binding.path) else {
            return Err(self.error(binding.span, format!("Cannot resolve import '{path}'")));
        };

        if binding.kind == ImportKind::Wildcard {
            let symbol = self.symbol(target, binding.span)?;
            if !matches!(symbol.kind, SymbolKind::Module { .. } | SymbolKind::Type { .. }) {
                return Err(self.error(
                    binding.span,
                    format!(
                        "Cannot import the members of '{path}': it is {}",
                        symbol.kind.describe()
                    ),
                ));
            }
        }

        self.tree.record_usage(target, self.location(binding.span));
        binding.target = Some(target);
        self.imports.push(binding.clone());
        Ok(binding)
    }

    fn resolve_entry(&mut self, entry: TypedEntry) -> PassResult<TypedEntry> {
        let TypedEntry {
            symbol,
            scope,
            parameters,
            return_syntax,
            body,
            span,
            ..
        } = entry;

        self.scopes.push(scope);

        let parameters = parameters
            .into_iter()
            .map(|parameter| self.resolve_parameter(parameter))
            .collect::<PassResult<Vec<_>>>()?;

        let return_type = return_syntax
            .as_ref()
            .map(|ty| self.resolve_type(ty))
            .transpose()?;
        if let Some(return_type) = &return_type {
            self.tree.set_return_type(symbol, return_type.clone());
        }

        let outer = std::mem::replace(&mut self.returns, ReturnContext::Entry(return_type.clone()));
        let body = self.resolve_statements(body);
        self.returns = outer;
        let body = body?;

        self.pop_scope(span)?;

        Ok(TypedEntry {
            symbol,
            scope,
            parameters,
            return_syntax,
            return_type,
            body,
            span,
        })
    }

    fn resolve_parameter(&mut self, parameter: TypedParameter) -> PassResult<TypedParameter> {
        let data_type = match &parameter.syntax {
            Some(ty) => {
                let mut data_type = self.resolve_type(ty)?;
                if parameter.variadic {
                    data_type = DataType::array_of(data_type);
                }
                self.tree.set_parameter_type(parameter.symbol, data_type.clone());
                Some(data_type)
            }
            None => None,
        };

        let default = parameter
            .default
            .map(|value| self.resolve_typed_expr(value))
            .transpose()?;

        if let (Some(expected), Some(value)) = (&data_type, &default) {
            if let Some(actual) = &value.data_type {
                if actual != expected {
                    return Err(self.error(
                        value.span,
                        format!(
                            "Default value of type '{actual}' does not match parameter type '{expected}'"
                        ),
                    ));
                }
            }
        }

        Ok(TypedParameter {
            default,
            ..parameter
        })
    }

    fn resolve_block(&mut self, block: TypedBlock) -> PassResult<TypedBlock> {
        self.scopes.push(block.scope);
        let statements = self.resolve_statements(block.statements)?;
        self.pop_scope(block.span)?;

        Ok(TypedBlock {
            statements,
            ..block
        })
    }

    fn resolve_return(&mut self, ret: TypedReturn) -> PassResult<TypedReturn> {
        let value = ret
            .value
            .map(|value| self.resolve_typed_expr(value))
            .transpose()?;

        match (&self.returns, &value) {
            (ReturnContext::Outside, _) => {
                return Err(self.error(
                    ret.span,
                    "Return statements are only valid inside an entry point",
                ));
            }
            (ReturnContext::Entry(None), Some(value)) => {
                return Err(self.error(
                    value.span,
                    "Cannot return a value from an entry point without a return type",
                ));
            }
            (ReturnContext::Entry(Some(expected)), None) => {
                return Err(self.error(
                    ret.span,
                    format!("Expected a return value of type '{expected}'"),
                ));
            }
            (ReturnContext::Entry(Some(expected)), Some(value)) => {
                if let Some(actual) = &value.data_type {
                    if actual != expected {
                        return Err(self.error(
                            value.span,
                            format!(
                                "Cannot return a value of type '{actual}' from an entry point returning '{expected}'"
                            ),
                        ));
                    }
                }
            }
            (ReturnContext::Entry(None), None) => {}
        }

        Ok(TypedReturn {
            value,
            span: ret.span,
        })
    }

    fn resolve_typed_expr(&mut self, expr: TypedExpr) -> PassResult<TypedExpr> {
        match expr.kind {
            TypedExprKind::Pending(syntax) => self.resolve_expr(&syntax),
            _ => Ok(expr),
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) -> PassResult<TypedExpr> {
        let span = expr.span();

        let (kind, data_type) = match expr {
            Expr::Token(token) => self.resolve_token(token)?,
            Expr::Type(ty) => (TypedExprKind::Type(self.resolve_type(ty)?), None),
            Expr::Unary { op, operand, .. } => self.resolve_unary(*op, operand, span)?,
            Expr::Binary {
                op, left, right, ..
            } => self.resolve_binary(*op, left, right, span)?,
            Expr::Assignment {
                target, op, value, ..
            } => self.resolve_assignment(*op, target, value)?,
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
                ..
            } => self.resolve_conditional(condition, then_branch, else_branch, span)?,
            Expr::Cast { op, value, ty, .. } => {
                let value = self.resolve_expr(value)?;
                let target = self.resolve_type(ty)?;
                let data_type = match op {
                    CastOp::Is => self.native("bool", span)?,
                    CastOp::As => target.clone(),
                };
                let kind = TypedExprKind::Cast {
                    op: *op,
                    value: Box::new(value),
                    target,
                };
                (kind, Some(data_type))
            }
            Expr::InterpolatedString { parts, .. } => {
                let parts = self.resolve_all(parts)?;
                (
                    TypedExprKind::InterpolatedString(parts),
                    Some(self.native("str", span)?),
                )
            }
            Expr::Tuple { elements, .. } => {
                let elements = self.resolve_all(elements)?;
                let data_type = elements
                    .iter()
                    .map(|element| element.data_type.clone())
                    .collect::<Option<Vec<_>>>()
                    .map(DataType::Tuple);
                (TypedExprKind::Tuple(elements), data_type)
            }
            Expr::List { ty, elements, .. } => self.resolve_list(ty.as_ref(), elements)?,
            Expr::Lambda(_) => return Err(self.unsupported(span, "Lambda expressions")),
            Expr::Call { .. } => return Err(self.unsupported(span, "Call expressions")),
            Expr::Access { .. } => {
                return Err(self.unsupported(span, "Member access expressions"));
            }
            Expr::Index { .. } => return Err(self.unsupported(span, "Index expressions")),
            Expr::Map { .. } => return Err(self.unsupported(span, "Map expressions")),
        };

        Ok(TypedExpr {
            kind,
            data_type,
            span,
        })
    }

    fn resolve_all(&mut self, exprs: &[Expr]) -> PassResult<Vec<TypedExpr>> {
        exprs.iter().map(|expr| self.resolve_expr(expr)).collect()
    }

    fn resolve_token(&mut self, token: &Token) -> PassResult<Resolved> {
        match token.kind {
            TokenKind::Identifier | TokenKind::KwSelf => {
                let name = token.text();
                let Some(id) = self.lookup(name) else {
                    return Err(self.error(
                        token.span,
                        format!("Cannot find symbol '{name}' in this scope"),
                    ));
                };

                let symbol = self.symbol(id, token.span)?;
                self.tree.record_usage(id, self.location(token.span));

                let data_type = match symbol.kind {
                    SymbolKind::Parameter { data_type, .. } => data_type,
                    _ => None,
                };
                let kind = TypedExprKind::Identifier {
                    token: token.clone(),
                    symbol: id,
                };
                Ok((kind, data_type))
            }
            kind if kind.is_literal() => {
                let native = token
                    .value
                    .as_ref()
                    .and_then(|value| value.native_type_name());
                let data_type = match native {
                    Some(name) => Some(self.native(name, token.span)?),
                    None => None,
                };
                Ok((TypedExprKind::Literal(token.clone()), data_type))
            }
            _ => Err(self.error(
                token.span,
                format!("Unexpected '{}' in expression", token.text()),
            )),
        }
    }

    fn resolve_unary(&mut self, op: UnaryOp, operand: &Expr, span: Span) -> PassResult<Resolved> {
        if op == UnaryOp::Await {
            return Err(self.unsupported(span, "Await expressions"));
        }

        let operand = self.resolve_expr(operand)?;
        let data_type = if op == UnaryOp::LogicalNot {
            let boolean = self.native("bool", span)?;
            if let Some(actual) = &operand.data_type {
                if *actual != boolean {
                    return Err(self.error(
                        operand.span,
                        format!("Operator '!' expects 'bool', found '{actual}'"),
                    ));
                }
            }
            Some(boolean)
        } else {
            operand.data_type.clone()
        };

        let kind = TypedExprKind::Unary {
            op,
            operand: Box::new(operand),
        };
        Ok((kind, data_type))
    }

    fn resolve_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        span: Span,
    ) -> PassResult<Resolved> {
        if op.is_range() {
            return Err(self.unsupported(span, "Range expressions"));
        }

        let left = self.resolve_expr(left)?;
        let right = self.resolve_expr(right)?;

        let data_type = if op.is_comparison() || op == BinaryOp::DivisibleBy {
            Some(self.native("bool", span)?)
        } else if op == BinaryOp::NullCoalescence {
            left.data_type.clone()
        } else {
            match (&left.data_type, &right.data_type) {
                (Some(l), Some(r)) if l != r => {
                    return Err(self.error(
                        span,
                        format!(
                            "Operator '{}' cannot be applied to '{l}' and '{r}'",
                            op.as_str()
                        ),
                    ));
                }
                (Some(l), _) => Some(l.clone()),
                (None, r) => r.clone(),
            }
        };

        let kind = TypedExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
        Ok((kind, data_type))
    }

    fn resolve_assignment(
        &mut self,
        op: AssignOp,
        target: &Expr,
        value: &Expr,
    ) -> PassResult<Resolved> {
        let target = self.resolve_expr(target)?;
        let value = self.resolve_expr(value)?;

        if let (Some(expected), Some(actual)) = (&target.data_type, &value.data_type) {
            if expected != actual {
                return Err(self.error(
                    value.span,
                    format!(
                        "Cannot assign a value of type '{actual}' to a target of type '{expected}'"
                    ),
                ));
            }
        }

        let data_type = value.data_type.clone();
        let kind = TypedExprKind::Assignment {
            op,
            target: Box::new(target),
            value: Box::new(value),
        };
        Ok((kind, data_type))
    }

    fn resolve_conditional(
        &mut self,
        condition: &Expr,
        then_branch: &Expr,
        else_branch: &Expr,
        span: Span,
    ) -> PassResult<Resolved> {
        let condition = self.resolve_expr(condition)?;
        let boolean = self.native("bool", span)?;
        if let Some(actual) = &condition.data_type {
            if *actual != boolean {
                return Err(self.error(
                    condition.span,
                    format!("A condition must have type 'bool', found '{actual}'"),
                ));
            }
        }

        let then_branch = self.resolve_expr(then_branch)?;
        let else_branch = self.resolve_expr(else_branch)?;
        if let (Some(a), Some(b)) = (&then_branch.data_type, &else_branch.data_type) {
            if a != b {
                return Err(self.error(
                    span,
                    format!("Conditional branches have different types '{a}' and '{b}'"),
                ));
            }
        }

        let data_type = then_branch
            .data_type
            .clone()
            .or_else(|| else_branch.data_type.clone());
        let kind = TypedExprKind::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        };
        Ok((kind, data_type))
    }

    fn resolve_list(&mut self, ty: Option<&SyntaxType>, elements: &[Expr]) -> PassResult<Resolved> {
        let explicit = ty.map(|ty| self.resolve_type(ty)).transpose()?;
        let elements = self.resolve_all(elements)?;

        let element_type =
            explicit.or_else(|| elements.first().and_then(|first| first.data_type.clone()));

        if let Some(expected) = &element_type {
            for element in &elements {
                if let Some(actual) = &element.data_type {
                    if actual != expected {
                        return Err(self.error(
                            element.span,
                            format!(
                                "List element of type '{actual}' does not match element type '{expected}'"
                            ),
                        ));
                    }
                }
            }
        }

        Ok((
            TypedExprKind::List(elements),
            element_type.map(DataType::array_of),
        ))
    }

    fn resolve_type(&mut self, ty: &SyntaxType) -> PassResult<DataType> {
        match ty {
            SyntaxType::Base(token) => {
                let name = token.text();
                let Some(id) = self.lookup(name) else {
                    return Err(self.error(
                        token.span,
                        format!("Cannot find type '{name}' in this scope"),
                    ));
                };

                let symbol = self.symbol(id, token.span)?;
                let SymbolKind::Type { type_id, .. } = symbol.kind else {
                    return Err(self.error(
                        token.span,
                        format!("'{name}' is {}, not a type", symbol.kind.describe()),
                    ));
                };

                self.tree.record_usage(id, self.location(token.span));
                Ok(DataType::Base(TypeRef {
                    symbol: id,
                    type_id,
                    name: symbol.name,
                }))
            }
            SyntaxType::Array {
                element,
                dimensions,
                ..
            } => {
                let mut data_type = self.resolve_type(element)?;
                for _ in 0..*dimensions {
                    data_type = DataType::array_of(data_type);
                }
                Ok(data_type)
            }
            SyntaxType::Tuple { elements, .. } => elements
                .iter()
                .map(|element| self.resolve_type(element))
                .collect::<PassResult<Vec<_>>>()
                .map(DataType::Tuple),
        }
    }

    /// Scope chain first, then named imports, then wildcard imports.
    fn lookup(&self, name: &str) -> Option<SymbolId> {
        if let Some(found) = self.tree.lookup(self.current_scope(), name) {
            return Some(found);
        }

        if let Some(found) = self
            .imports
            .iter()
            .find(|binding| binding.name() == Some(name))
            .and_then(|binding| binding.target)
        {
            return Some(found);
        }

        self.imports
            .iter()
            .filter(|binding| binding.kind == ImportKind::Wildcard)
            .filter_map(|binding| binding.target)
            .filter_map(|target| self.tree.symbol(target)?.owned_scope())
            .find_map(|scope| self.tree.lookup_local(scope, name))
    }

    fn native(&self, name: &str, span: Span) -> PassResult<DataType> {
        let found = self
            .tree
            .lookup_local(self.tree.root(), name)
            .and_then(|id| Some((id, self.tree.symbol(id)?)));

        match found {
            Some((
                id,
                Symbol {
                    kind: SymbolKind::Type { type_id, .. },
                    name,
                    ..
                },
            )) => Ok(DataType::Base(TypeRef {
                symbol: id,
                type_id,
                name,
            })),
            _ => Err(self.error(span, format!("Native type '{name}' is not registered"))),
        }
    }

    fn symbol(&self, id: SymbolId, span: Span) -> PassResult<Symbol> {
        self.tree
            .symbol(id)
            .ok_or_else(|| self.error(span, format!("Invalid operation: Unknown symbol {id:?}")))
    }

    fn current_scope(&self) -> ScopeId {
        self.scopes.current().unwrap_or(self.tree.root())
    }

    fn pop_scope(&mut self, span: Span) -> PassResult<ScopeId> {
        self.scopes
            .pop()
            .ok_or_else(|| self.error(span, "Invalid operation: Scope stack unbalanced"))
    }

    fn unsupported(&self, span: Span, what: &str) -> PassFailure {
        self.error(span, format!("{what} are not supported yet"))
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

#[cfg(test)]
mod tests {
    use cinder_core::parse;

    use super::*;
    use crate::semantics::symbols::collect;

    /// Collect every file first, then resolve them in order.
    fn resolve_sources(tree: &ScopeTree, sources: &[&str]) -> Vec<SemanticOutput> {
        let collected: Vec<_> = sources
            .iter()
            .enumerate()
            .map(|(index, src)| {
                let source = Arc::new(SourceBuffer::new(format!("file{index}.cin"), *src));
                let parsed = parse(Arc::clone(&source));
                let program = parsed
                    .accepted()
                    .unwrap_or_else(|| panic!("parse failed: {}", parsed.diagnostics));
                let output = collect(tree, program, &source);
                let typed = output
                    .program
                    .unwrap_or_else(|| panic!("collection failed: {}", output.diagnostics));
                (source, typed)
            })
            .collect();

        collected
            .into_iter()
            .map(|(source, typed)| resolve(tree, typed, &source))
            .collect()
    }

    fn resolve_one(src: &str) -> (ScopeTree, SemanticOutput) {
        let tree = ScopeTree::with_natives();
        let output = resolve_sources(&tree, &[src]).remove(0);
        (tree, output)
    }

    fn messages(output: &SemanticOutput) -> Vec<String> {
        output
            .diagnostics
            .iter()
            .map(|diagnostic| diagnostic.message.clone())
            .collect()
    }

    fn entry(program: &TypedProgram, index: usize) -> &TypedEntry {
        match &program.statements[index] {
            TypedStmt::Entry(entry) => entry,
            other => panic!("expected an entry, got {other:?}"),
        }
    }

    fn parameter_type(tree: &ScopeTree, id: SymbolId) -> String {
        match tree.symbol(id).map(|symbol| symbol.kind) {
            Some(SymbolKind::Parameter {
                data_type: Some(data_type),
                ..
            }) => data_type.to_string(),
            other => panic!("expected a typed parameter, got {other:?}"),
        }
    }

    #[test]
    fn types_parameters_and_returns() {
        let (tree, output) =
            resolve_one("mod demo\nmain : entry(x: i32) : i32 {\n  ret x + 1\n}\n");

        let program = output.program.expect("resolution succeeds");
        let main = entry(&program, 0);
        assert_eq!(main.return_type.as_ref().map(ToString::to_string), Some("i32".into()));

        let TypedStmt::Return(ret) = &main.body[0] else {
            panic!("expected a return");
        };
        let value = ret.value.as_ref().unwrap();
        assert!(matches!(value.kind, TypedExprKind::Binary { op: BinaryOp::Add, .. }));
        assert_eq!(value.data_type.as_ref().map(ToString::to_string), Some("i32".into()));

        let x = main.parameters[0].symbol;
        assert_eq!(tree.symbol(x).unwrap().usages.len(), 1);
        match tree.symbol(main.symbol).unwrap().kind {
            SymbolKind::Entry { return_type, .. } => {
                assert_eq!(return_type.map(|ty| ty.to_string()), Some("i32".into()));
            }
            other => panic!("expected an entry symbol, got {other:?}"),
        }
    }

    #[test]
    fn composite_parameter_types() {
        let (tree, output) = resolve_one(
            "mod demo\nmain : entry(grid: i32[,], pair: (str, bool), rest: u8...) {}\n",
        );

        let program = output.program.expect("resolution succeeds");
        let types: Vec<String> = entry(&program, 0)
            .parameters
            .iter()
            .map(|parameter| parameter_type(&tree, parameter.symbol))
            .collect();
        assert_eq!(types, vec!["i32[][]", "(str, bool)", "u8[]"]);
    }

    #[test]
    fn unknown_names_and_non_types() {
        let (_, output) = resolve_one(
            "mod demo\nfirst : entry(p: point) {}\nsecond : entry(m: demo) {}\nthird : entry() {\n  missing\n}\n",
        );

        assert!(output.program.is_none());
        assert_eq!(
            messages(&output),
            vec![
                "Cannot find type 'point' in this scope",
                "'demo' is a module, not a type",
                "Cannot find symbol 'missing' in this scope",
            ]
        );
    }

    #[test]
    fn operator_typing_rules() {
        let (_, output) = resolve_one(
            "mod demo\nmain : entry(x: i32, flag: bool) {\n  x + 1i64\n  !x\n  x ? 1 : 2\n  flag ? 1 : \"one\"\n  x = true\n  x == 1\n}\n",
        );

        assert_eq!(
            messages(&output),
            vec![
                "Operator '+' cannot be applied to 'i32' and 'i64'",
                "Operator '!' expects 'bool', found 'i32'",
                "A condition must have type 'bool', found 'i32'",
                "Conditional branches have different types 'i32' and 'str'",
                "Cannot assign a value of type 'bool' to a target of type 'i32'",
            ]
        );
    }

    #[test]
    fn return_rules() {
        let (_, output) = resolve_one(
            "mod demo\nnone : entry() {\n  ret 1\n}\nsome : entry() : bool {\n  ret\n}\nwrong : entry() : bool {\n  ret 1\n}\nfine : entry() : str {\n  {\n    ret \"ok\"\n  }\n}\n",
        );

        assert_eq!(
            messages(&output),
            vec![
                "Cannot return a value from an entry point without a return type",
                "Expected a return value of type 'bool'",
                "Cannot return a value of type 'i32' from an entry point returning 'bool'",
            ]
        );
    }

    #[test]
    fn literals_collections_and_casts() {
        let (_, output) = resolve_one(
            "mod demo\nmain : entry(name: str) {\n  (1u8, 'c', 2.5)\n  [\"a\", \"b\"]\n  [u64; ]\n  \"hi {name}\"\n  name is str\n  1 as i64\n  null\n}\n",
        );

        let program = output.program.expect("resolution succeeds");
        let types: Vec<Option<String>> = entry(&program, 0)
            .body
            .iter()
            .map(|statement| match statement {
                TypedStmt::Expression(expr) => expr.data_type.as_ref().map(ToString::to_string),
                other => panic!("expected an expression, got {other:?}"),
            })
            .collect();

        assert_eq!(
            types,
            vec![
                Some("(u8, char, f64)".to_string()),
                Some("str[]".to_string()),
                Some("u64[]".to_string()),
                Some("str".to_string()),
                Some("bool".to_string()),
                Some("i64".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn mismatched_defaults_and_list_elements() {
        let (_, output) = resolve_one(
            "mod demo\nmain : entry(x: i32 = true) {}\nlist : entry() {\n  [1, \"a\"]\n}\n",
        );

        assert_eq!(
            messages(&output),
            vec![
                "Default value of type 'bool' does not match parameter type 'i32'",
                "List element of type 'str' does not match element type 'i32'",
            ]
        );
    }

    #[test]
    fn unsupported_expressions_are_reported() {
        let (_, output) = resolve_one(
            "mod demo\nmain : entry(x: i32) {\n  f(x)\n  x.y\n  x[0]\n  1..2\n  [1: 2]\n  await x\n}\n",
        );

        assert_eq!(
            messages(&output),
            vec![
                "Call expressions are not supported yet",
                "Member access expressions are not supported yet",
                "Index expressions are not supported yet",
                "Range expressions are not supported yet",
                "Map expressions are not supported yet",
                "Await expressions are not supported yet",
            ]
        );
    }

    #[test]
    fn imports_reach_other_files() {
        let tree = ScopeTree::with_natives();
        let outputs = resolve_sources(
            &tree,
            &[
                "mod demo\nuse std.io.*\nuse std.io.print as write\nuse std.{io} as sys\nmain : entry() {\n  print\n  write\n  sys\n}\n",
                "mod std.io\nprint : entry(text: str) {}\n",
            ],
        );

        for output in &outputs {
            assert!(output.diagnostics.is_empty(), "{}", output.diagnostics);
        }

        let print = tree.resolve_path(&["std", "io", "print"]).unwrap();
        assert_eq!(tree.symbol(print).unwrap().usages.len(), 3);

        let program = outputs[0].program.as_ref().unwrap();
        assert!(program.imports().all(|binding| binding.target.is_some()));
        let TypedStmt::Expression(sys) = &entry(program, 3).body[2] else {
            panic!("expected an expression");
        };
        let std = tree.resolve_path(&["std"]).unwrap();
        assert!(matches!(&sys.kind, TypedExprKind::Identifier { symbol, .. } if *symbol == std));
    }

    #[test]
    fn broken_imports_are_reported() {
        let tree = ScopeTree::with_natives();
        let outputs = resolve_sources(
            &tree,
            &[
                "mod demo\nuse std.io.missing\nuse std.io.print.*\n",
                "mod std.io\nprint : entry() {}\n",
            ],
        );

        assert_eq!(
            messages(&outputs[0]),
            vec![
                "Cannot resolve import 'std.io.missing'",
                "Cannot import the members of 'std.io.print': it is an entry point",
            ]
        );
        assert!(outputs[0].program.is_none());
    }

    #[test]
    fn local_names_shadow_imports() {
        let tree = ScopeTree::with_natives();
        let outputs = resolve_sources(
            &tree,
            &[
                "mod demo\nuse lib.value\nmain : entry(value: bool) : bool {\n  ret value\n}\n",
                "mod lib\nvalue : entry() {}\n",
            ],
        );

        assert!(outputs[0].diagnostics.is_empty(), "{}", outputs[0].diagnostics);
        let value = tree.resolve_path(&["lib", "value"]).unwrap();
        assert_eq!(tree.symbol(value).unwrap().usages.len(), 1);
    }
}

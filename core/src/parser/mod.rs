//! Cinder front-end parser.
//!
//! This module exposes the lexers together with a hand-written
//! recursive-descent parser that turns source text into the syntax tree
//! under `crate::ast`. Failures inside a statement are threaded back as
//! `PassResult` values, recorded as diagnostics and followed by
//! synchronisation, so one broken statement costs one diagnostic and the
//! rest of the file still parses.

pub mod filtered;
pub mod lexer;
pub mod literals;

mod collections;
mod expressions;
mod interpolation;
mod items;
mod recovery;
mod statements;
mod support;
mod types;

use std::sync::Arc;

use crate::ast::{
    AggregateImportStmt, BlockStmt, EntryStmt, Expr, ImportItem, ImportStmt, LambdaExpr,
    LiteralValue, ModuleName, Parameter, Program, ReturnStmt, SelfParameter, Stmt, SyntaxType,
    TokenKind, VariableParameter,
};
use crate::diag::{
    Diagnostic, DiagnosticList, PassFailure, PassResult, Span, catch_internal,
};
use crate::text::SourceBuffer;
use filtered::{FilteredLexer, FilteredToken};
use lexer::Token;

/// Parse one source buffer.
///
/// Never fails: problems are reported through `ParseOutput::diagnostics`.
#[tracing::instrument(skip_all, fields(source = %source.name()))]
pub fn parse(source: Arc<SourceBuffer>) -> ParseOutput {
    let tokens: Vec<FilteredToken> = FilteredLexer::new(Arc::clone(&source)).collect();
    let mut parser = Parser::new(tokens, Arc::clone(&source), source.len());

    let result = catch_internal("Parser", &source, || parser.parse_program());
    let mut diagnostics = parser.finish();

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
        statements = program.as_ref().map_or(0, |p| p.statements.len()),
        errors = diagnostics.error_count(),
        "parsed"
    );

    ParseOutput {
        program,
        diagnostics,
    }
}

#[derive(Debug, Clone)]
pub struct ParseOutput {
    /// The recovered tree; present even when diagnostics were reported.
    pub program: Option<Program>,
    pub diagnostics: DiagnosticList,
}

impl ParseOutput {
    /// The tree, only if parsing produced no errors.
    pub fn accepted(&self) -> Option<&Program> {
        if self.diagnostics.has_errors() {
            return None;
        }
        self.program.as_ref()
    }

    pub fn into_accepted(self) -> Result<Program, DiagnosticList> {
        match self.program {
            Some(program) if !self.diagnostics.has_errors() => Ok(program),
            _ => Err(self.diagnostics),
        }
    }
}

/// Cursor position plus diagnostic count, for speculative parses.
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    cursor: usize,
    diagnostics: usize,
}

struct Parser {
    tokens: Vec<FilteredToken>,
    cursor: usize,
    /// Current nesting level, see `Parser::nested`.
    depth: usize,
    diagnostics: DiagnosticList,
    source: Arc<SourceBuffer>,
}

impl Parser {
    /// `end` positions the synthetic end-of-file token.
    fn new(mut tokens: Vec<FilteredToken>, source: Arc<SourceBuffer>, end: usize) -> Self {
        tokens.push(FilteredToken {
            token: Token::new(TokenKind::EndOfFile, Span::new(end, end), &source, None),
            after_newline: true,
        });

        Self {
            tokens,
            cursor: 0,
            depth: 0,
            diagnostics: DiagnosticList::new(),
            source,
        }
    }

    fn finish(self) -> DiagnosticList {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, UnaryOp, format_expr};

    fn parse_src(src: &str) -> ParseOutput {
        parse(Arc::new(SourceBuffer::raw(src)))
    }

    fn parse_ok(src: &str) -> Program {
        let output = parse_src(src);
        assert!(
            !output.diagnostics.has_errors(),
            "parse errors: {}",
            output.diagnostics
        );
        output.program.expect("program")
    }

    fn messages(output: &ParseOutput) -> Vec<String> {
        output
            .diagnostics
            .iter()
            .map(|diagnostic| diagnostic.message.clone())
            .collect()
    }

    /// Statements of the body of the first entry in `src`.
    fn body(src: &str) -> Vec<Stmt> {
        let program = parse_ok(src);
        match program.statements.into_iter().find_map(|stmt| match stmt {
            Stmt::Entry(entry) => Some(entry),
            _ => None,
        }) {
            Some(entry) => entry.body.statements,
            None => panic!("no entry in {src:?}"),
        }
    }

    /// Single expression statement wrapped in a throwaway entry.
    fn expr(src: &str) -> Expr {
        let mut statements = body(&format!("mod t\nmain : entry() {{\n{src}\n}}"));
        assert_eq!(statements.len(), 1, "expected one statement: {statements:?}");
        match statements.remove(0) {
            Stmt::Expression(expr) => expr,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn parse_module_header() {
        let program = parse_ok("mod app.core.tools");

        assert_eq!(program.module.to_string(), "app.core.tools");
        assert!(program.statements.is_empty());
    }

    #[test]
    fn missing_module_header_is_reported() {
        let output = parse_src("main : entry() {}");

        assert_eq!(
            messages(&output),
            vec!["All Cinder files must begin with a module name: 'mod <name>'"]
        );
        let program = output.program.expect("tree is still produced");
        assert_eq!(program.module.to_string(), "<error>");
        assert_eq!(program.statements.len(), 1);
        assert!(output.diagnostics.iter().next().unwrap().is_error());
    }

    #[test]
    fn parse_entry_declaration() {
        let program = parse_ok(
            "mod demo\nmain : pub entry(self, var count: i32, names: str[]...) : !io, net i32 {\n  ret count\n}",
        );

        let Stmt::Entry(entry) = &program.statements[0] else {
            panic!("expected entry");
        };
        assert_eq!(entry.name.text(), "main");
        assert!(entry.has_modifier(TokenKind::KwPub));
        assert_eq!(entry.parameters.len(), 3);
        assert!(entry.parameters[2].is_variadic());
        let effects: Vec<&str> = entry.effects.iter().map(Token::text).collect();
        assert_eq!(effects, vec!["io", "net"]);
        assert_eq!(entry.return_type.as_ref().unwrap().to_string(), "i32");
        assert!(matches!(entry.body.statements[0], Stmt::Return(_)));
    }

    #[test]
    fn parse_imports() {
        let program = parse_ok("mod a\nuse std.io.print as p\nuse std.math.*\nuse std.text.{split, join as glue} as text");

        let rendered: Vec<String> = program
            .statements
            .iter()
            .map(|stmt| match stmt {
                Stmt::Import(import) => import.to_string(),
                Stmt::AggregateImport(import) => import.to_string(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();

        assert_eq!(
            rendered,
            vec![
                "std.io::print as p",
                "std.math::*",
                "std.text::{split, join as glue} as text",
            ]
        );
    }

    #[test]
    fn invalid_imports_are_diagnosed() {
        let output = parse_src("mod a\nuse print\nuse std.{}\n");

        assert_eq!(
            messages(&output),
            vec!["Invalid import statement", "Invalid import statement"]
        );
    }

    #[test]
    fn late_imports_are_kept_but_flagged() {
        let output = parse_src("mod a\nmain : entry() {}\nuse std.io.print");

        assert_eq!(
            messages(&output),
            vec!["Top-level import statements must appear before any other statements"]
        );
        assert_eq!(output.program.unwrap().statements.len(), 2);
    }

    #[test]
    fn unary_minus_folds_into_literal() {
        let folded = expr("-5");

        let Expr::Token(token) = &folded else {
            panic!("expected folded literal, got {folded:?}");
        };
        assert_eq!(token.value, Some(LiteralValue::I32(-5)));
        assert_eq!(token.text(), "-5");

        assert!(matches!(
            expr("-x"),
            Expr::Unary {
                op: UnaryOp::Negate,
                ..
            }
        ));
        assert!(matches!(expr("-3u8"), Expr::Unary { .. }));
    }

    #[test]
    fn negated_minimum_keeps_its_default_width() {
        let Expr::Token(token) = expr("-2147483648") else {
            panic!("expected folded literal");
        };
        assert_eq!(token.value, Some(LiteralValue::I32(i32::MIN)));

        let Expr::Token(token) = expr("-2147483648i64") else {
            panic!("expected folded literal");
        };
        assert_eq!(token.value, Some(LiteralValue::I64(-2_147_483_648)));
    }

    #[test]
    fn chained_postfix_operations() {
        let chained = expr("a.b(c)[0]");

        assert_eq!(
            format_expr(&chained),
            "\
Index:
├── Call:
│   ├── Access: .b
│   │   └── Identifier: a
│   └── Arguments:
│       └── Identifier: c
└── Literal: 0
"
        );
    }

    #[test]
    fn call_on_new_line_starts_a_new_statement() {
        let statements = body("mod t\nmain : entry() {\n  f\n  (x)\n}");
        assert_eq!(statements.len(), 2);

        let statements = body("mod t\nmain : entry() {\n  f\n    .g\n    ?.h\n}");
        assert_eq!(statements.len(), 1);
        let Stmt::Expression(Expr::Access { null_check, .. }) = &statements[0] else {
            panic!("expected access chain");
        };
        assert!(*null_check);
    }

    #[test]
    fn binary_precedence_and_associativity() {
        let text = format_expr(&expr("a + b * c ** d ** e"));
        let expected = "\
Binary: +
├── Identifier: a
└── Binary: *
    ├── Identifier: b
    └── Binary: **
        ├── Identifier: c
        └── Binary: **
            ├── Identifier: d
            └── Identifier: e
";
        assert_eq!(text, expected);

        let Expr::Binary { op, .. } = expr("a - b - c") else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Subtract);
        assert!(matches!(
            expr("x = y += 2"),
            Expr::Assignment { value, .. } if matches!(*value, Expr::Assignment { .. })
        ));
    }

    #[test]
    fn conditional_cast_and_coalesce() {
        assert!(matches!(expr("ok ? 1 : 2"), Expr::Conditional { .. }));
        assert!(matches!(
            expr("x as i64"),
            Expr::Cast { ty: SyntaxType::Base(_), .. }
        ));
        assert!(matches!(
            expr("a ?? b == c"),
            Expr::Binary {
                op: BinaryOp::NullCoalescence,
                ..
            }
        ));
    }

    #[test]
    fn interpolated_string_splits_into_parts() {
        let Expr::InterpolatedString { parts, .. } = expr("\"Hello, {name}!\"") else {
            panic!("expected interpolated string");
        };

        assert_eq!(parts.len(), 3);
        let texts: Vec<Option<LiteralValue>> = parts
            .iter()
            .map(|part| part.as_token().and_then(|t| t.value.clone()))
            .collect();
        assert_eq!(texts[0], Some(LiteralValue::Str("Hello, ".into())));
        assert_eq!(texts[2], Some(LiteralValue::Str("!".into())));

        let name = parts[1].as_token().expect("identifier part");
        assert_eq!(name.kind, TokenKind::Identifier);
        assert_eq!(name.text(), "name");
    }

    #[test]
    fn interpolation_errors_point_into_the_outer_buffer() {
        let output = parse_src("mod t\nmain : entry() {\n  \"a {)} b\"\n}");

        let diagnostic = output.diagnostics.iter().next().expect("diagnostic");
        assert_eq!((diagnostic.line, diagnostic.column), (3, 7));

        let output = parse_src("mod t\nmain : entry() {\n  \"a {} b\"\n}");
        assert_eq!(messages(&output), vec!["Empty interpolation in string literal"]);
    }

    #[test]
    fn map_and_list_literals() {
        assert!(matches!(expr("[1, 2, 3]"), Expr::List { ty: None, .. }));
        assert!(matches!(expr("[i32; ]"), Expr::List { ty: Some(_), .. }));
        assert!(
            matches!(expr("[\"a\": 1, \"b\": 2]"), Expr::Map { entries, .. } if entries.len() == 2)
        );
        assert!(matches!(expr("[:]"), Expr::Map { entries, .. } if entries.is_empty()));
        assert!(matches!(expr("[(str, i32); :]"), Expr::Map { ty: Some(_), .. }));
        assert!(matches!(expr("()"), Expr::Tuple { elements, .. } if elements.is_empty()));
        assert!(matches!(expr("(1, 2)"), Expr::Tuple { elements, .. } if elements.len() == 2));
        assert!(matches!(expr("(1)"), Expr::Token(_)));
    }

    #[test]
    fn deeply_nested_lists_parse_in_linear_time() {
        let depth = 48;
        let src = format!("{}1{}", "[".repeat(depth), "]".repeat(depth));

        let started = std::time::Instant::now();
        let parsed = expr(&src);
        assert!(started.elapsed() < std::time::Duration::from_secs(2));

        let mut current = &parsed;
        let mut levels = 0;
        while let Expr::List { elements, .. } = current {
            assert_eq!(elements.len(), 1);
            current = &elements[0];
            levels += 1;
        }
        assert_eq!(levels, depth);
        assert!(matches!(current, Expr::Token(_)));
    }

    #[test]
    fn maps_are_recognised_after_their_first_key() {
        let Expr::Map { entries, .. } = expr("[[1]: [2], [3]: [:],]") else {
            panic!("expected map");
        };
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[1].1, Expr::Map { .. }));

        let output = parse_src("mod t\nmain : entry() {\n  [1: 2, 3]\n}");
        assert_eq!(
            messages(&output),
            vec!["Expected ':'; Instead, got ']'"]
        );
    }

    #[test]
    fn excessive_nesting_is_reported() {
        let limit = support::MAX_NESTING_DEPTH;
        let nested_list = format!("{}1{}", "[".repeat(limit * 4), "]".repeat(limit * 4));
        let output = parse_src(&format!("mod t\nmain : entry() {{\n  {nested_list}\n  ret\n}}"));

        assert_eq!(
            messages(&output),
            vec![format!("Nesting exceeds the maximum depth of {limit}")]
        );
        let program = output.program.expect("recovered tree");
        let Stmt::Entry(entry) = &program.statements[0] else {
            panic!("expected entry");
        };
        assert!(matches!(entry.body.statements[..], [Stmt::Return(_)]));

        let negations = format!("{}x", "- ".repeat(10_000));
        let output = parse_src(&format!("mod t\nmain : entry() {{\n  {negations}\n}}"));
        assert_eq!(
            messages(&output),
            vec![format!("Nesting exceeds the maximum depth of {limit}")]
        );
    }

    #[test]
    fn map_type_must_be_a_pair() {
        let output = parse_src("mod t\nmain : entry() {\n  [i32; :]\n}");
        assert_eq!(
            messages(&output),
            vec!["A map's explicit type must be a tuple of two types"]
        );
    }

    #[test]
    fn types_in_expression_position() {
        let Expr::Type(ty) = expr("i32[,][]") else {
            panic!("expected type expression");
        };
        assert_eq!(ty.to_string(), "i32[,][]");
    }

    #[test]
    fn lambdas() {
        let Expr::Lambda(lambda) = expr("(x: i32, y: i32): i32 => x + y") else {
            panic!("expected lambda");
        };
        assert_eq!(lambda.parameters.len(), 2);
        assert!(matches!(lambda.body.statements[0], Stmt::Return(_)));

        assert!(matches!(expr("() => { ret 1 }"), Expr::Lambda(_)));

        // `=>` on its own line does not continue the header.
        let output = parse_src("mod t\nmain : entry() {\n  (x)\n  => 1\n}");
        assert!(output.diagnostics.has_errors());
    }

    #[test]
    fn top_level_recovery_isolates_one_statement() {
        let output = parse_src(
            "mod demo\nfirst : entry() {}\nbroken : entry( { }\nthird : entry() {}\n",
        );

        assert_eq!(output.diagnostics.len(), 1, "{}", output.diagnostics);
        assert_eq!(
            messages(&output)[0],
            "Expected 'identifier'; Instead, got '{'"
        );
        assert!(output.accepted().is_none());
        let program = output.program.expect("recovered tree");
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn block_recovery_keeps_following_statements() {
        let output = parse_src("mod t\nmain : entry() {\n  ret )\n  x\n}\nnext : entry() {}");

        assert_eq!(
            messages(&output),
            vec!["Expected 'expression'; Instead, got ')'"]
        );
        let program = output.program.unwrap();
        assert_eq!(program.statements.len(), 2);
        let Stmt::Entry(entry) = &program.statements[0] else {
            panic!("expected entry");
        };
        assert_eq!(entry.body.statements.len(), 1);
    }

    #[test]
    fn statements_must_end_at_line_breaks() {
        let output = parse_src("mod t\nmain : entry() {\n  a b\n}");
        assert_eq!(
            messages(&output),
            vec!["Expected one of: 'newline',';','}'; Instead, got 'identifier'"]
        );

        assert_eq!(body("mod t\nmain : entry() { a; b; ret }").len(), 3);
    }

    #[test]
    fn parameter_rules() {
        let output = parse_src(
            "mod t\nf : entry(x: i32, mut y: i32, var self, a: i32 = 1, b: i32, rest: i32..., c: i32) {}",
        );

        assert_eq!(
            messages(&output),
            vec![
                "'mut' is only valid on 'self'; did you mean 'var'?",
                "'var' is not valid on 'self'; did you mean 'mut'?",
                "'self' must be the first parameter",
                "Parameter 'b' must have a default value because a previous parameter does",
                "A variadic parameter must be the last parameter",
                "Parameter 'c' must have a default value because a previous parameter does",
            ]
        );
    }

    #[test]
    fn duplicate_modifiers_are_reported_once_each() {
        let output = parse_src("mod t\nf : pub pub entry(ref ref x: i32) {}");

        assert_eq!(
            messages(&output),
            vec!["Duplicate modifier 'pub'", "Duplicate modifier 'ref'"]
        );
    }

    #[test]
    fn unsupported_declarations() {
        let output = parse_src("mod t\nadd : fun(a: i32) {}\nlimit : i32 = 4\nmain : entry() {}");

        assert_eq!(
            messages(&output),
            vec![
                "'fun' declarations are not supported yet",
                "Value declarations are not supported yet",
            ]
        );
        assert_eq!(output.program.unwrap().statements.len(), 1);
    }

    #[test]
    fn invalid_literals_are_reported() {
        let output = parse_src("mod t\nmain : entry() {\n  300u8\n}");
        assert_eq!(messages(&output), vec!["Invalid number literal '300u8'"]);
    }

    #[test]
    fn empty_source_reports_missing_module() {
        let output = parse_src("");
        assert_eq!(output.diagnostics.len(), 1);
        assert!(output.program.is_some());
    }
}

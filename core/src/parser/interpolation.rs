//! Splitting interpolated string literals into literal and expression parts.
//!
//! The lexer keeps the raw text of an interpolated string. Here it is split
//! again with the same escape and brace tracking the lexer used; each
//! expression run is lexed from its own buffer, its tokens are moved back
//! into the outer buffer's coordinates, and a nested parser turns them into
//! an expression.

use super::*;

/// Byte range of one run inside the raw string body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run {
    Literal(usize, usize),
    /// Excludes the surrounding braces.
    Expression(usize, usize),
}

fn split_runs(raw: &str) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut run_start = 0;
    let mut depth = 0usize;
    let mut escaped = false;

    for (index, ch) in raw.char_indices() {
        match ch {
            '{' if !escaped => {
                if depth == 0 {
                    runs.push(Run::Literal(run_start, index));
                    run_start = index + 1;
                }
                depth += 1;
                continue;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    runs.push(Run::Expression(run_start, index));
                    run_start = index + 1;
                }
                continue;
            }
            '\\' => {
                escaped = !escaped;
                continue;
            }
            _ => {}
        }
        escaped = false;
    }

    runs.push(Run::Literal(run_start, raw.len()));
    runs
}

impl Parser {
    pub(super) fn parse_interpolated_string(&mut self) -> PassResult<Expr> {
        let token = self.expect_token(TokenKind::InterpolatedStringLiteral)?;
        let Some(LiteralValue::Str(raw)) = token.value.clone() else {
            return Err(self.error(token.span, "Interpolated string literal has no text"));
        };

        // Body offsets are relative to the character after the opening quote.
        let base = token.span.start + 1;
        let mut parts = Vec::new();
        let mut failed = false;

        for run in split_runs(&raw) {
            match run {
                Run::Literal(start, end) => {
                    if start == end {
                        continue;
                    }

                    let span = Span::new(base + start, base + end);
                    match literals::unescape(&raw[start..end], true) {
                        (text, true) => parts.push(Expr::Token(Token::new(
                            TokenKind::StringLiteral,
                            span,
                            &self.source,
                            Some(LiteralValue::Str(text)),
                        ))),
                        (_, false) => {
                            self.report(span, "Invalid escape sequence in string literal");
                            failed = true;
                        }
                    }
                }
                Run::Expression(start, end) => {
                    let text = &raw[start..end];
                    if text.trim().is_empty() {
                        self.report(
                            Span::new(base + start - 1, base + end + 1),
                            "Empty interpolation in string literal",
                        );
                        failed = true;
                        continue;
                    }

                    match self.parse_embedded_expression(text, base + start) {
                        Some(expr) => parts.push(expr),
                        None => failed = true,
                    }
                }
            }
        }

        if failed {
            return Err(PassFailure::Silent);
        }

        Ok(Expr::InterpolatedString {
            parts,
            span: token.span,
        })
    }

    /// Parse `text`, found at `offset` in this parser's buffer, as one
    /// expression. Diagnostics are merged into this parser.
    fn parse_embedded_expression(&mut self, text: &str, offset: usize) -> Option<Expr> {
        let buffer = Arc::new(SourceBuffer::new(self.source.name(), text));
        let tokens: Vec<FilteredToken> = FilteredLexer::new(buffer)
            .map(|item| FilteredToken {
                token: item.token.rebased(offset, &self.source),
                after_newline: item.after_newline,
            })
            .collect();

        let mut nested = Parser::new(tokens, Arc::clone(&self.source), offset + text.len());
        nested.depth = self.depth;
        let result = nested.parse_expression().and_then(|expr| {
            if nested.is_eof() {
                Ok(expr)
            } else {
                Err(nested.unexpected(&["}"]))
            }
        });

        self.diagnostics.extend(nested.finish());

        match result {
            Ok(expr) => Some(expr),
            Err(failure) => {
                self.record(failure);
                None
            }
        }
    }
}

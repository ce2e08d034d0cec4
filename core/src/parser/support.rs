use super::*;

/// Deepest nesting of expressions, types and blocks the parser accepts.
pub(super) const MAX_NESTING_DEPTH: usize = 64;

impl Parser {
    pub(super) fn current(&self) -> &FilteredToken {
        // The synthetic end-of-file token is always last.
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    pub(super) fn current_token(&self) -> &Token {
        &self.current().token
    }

    pub(super) fn current_kind(&self) -> TokenKind {
        self.current().token.kind
    }

    pub(super) fn current_span(&self) -> Span {
        self.current().token.span
    }

    /// Kind of the token `offset` positions ahead of the cursor.
    pub(super) fn peek_kind(&self, offset: usize) -> TokenKind {
        let index = (self.cursor + offset).min(self.tokens.len() - 1);
        self.tokens[index].token.kind
    }

    /// The current token is the first on its line.
    pub(super) fn at_line_start(&self) -> bool {
        self.current().after_newline
    }

    pub(super) fn previous_span(&self) -> Span {
        if self.cursor == 0 {
            return Span::new(0, 0);
        }

        self.tokens[self.cursor - 1].token.span
    }

    pub(super) fn bump(&mut self) -> Token {
        let token = self.current_token().clone();

        if self.cursor + 1 < self.tokens.len() {
            self.cursor += 1;
        }

        token
    }

    pub(super) fn is_eof(&self) -> bool {
        self.current_kind() == TokenKind::EndOfFile
    }

    pub(super) fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Consume the current token if it has `kind`.
    pub(super) fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        self.check(kind).then(|| self.bump())
    }

    /// Consume a token of one of `kinds` or fail with an "Expected" message.
    pub(super) fn require(&mut self, kinds: &[TokenKind]) -> PassResult<Token> {
        if kinds.contains(&self.current_kind()) {
            return Ok(self.bump());
        }

        let labels: Vec<&str> = kinds.iter().map(|kind| kind.as_str()).collect();
        Err(self.unexpected(&labels))
    }

    pub(super) fn expect_token(&mut self, kind: TokenKind) -> PassResult<Token> {
        self.require(&[kind])
    }

    /// Failure at the current token naming what was expected instead.
    pub(super) fn unexpected(&self, expected: &[&str]) -> PassFailure {
        let wanted = match expected {
            [single] => format!("Expected '{single}'"),
            many => {
                let quoted: Vec<String> = many.iter().map(|label| format!("'{label}'")).collect();
                format!("Expected one of: {}", quoted.join(","))
            }
        };

        let found = match self.current_kind() {
            TokenKind::EndOfFile => "end of file",
            kind => kind.as_str(),
        };

        self.error(
            self.current_span(),
            format!("{wanted}; Instead, got '{found}'"),
        )
    }

    pub(super) fn error(&self, span: Span, message: impl Into<String>) -> PassFailure {
        PassFailure::from(Diagnostic::error(&self.source, span, message))
    }

    /// Record an error without interrupting the parse.
    pub(super) fn report(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::error(&self.source, span, message));
    }

    /// Run `parse` one nesting level deeper, failing past `MAX_NESTING_DEPTH`.
    pub(super) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> PassResult<T>,
    ) -> PassResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error(
                self.current_span(),
                format!("Nesting exceeds the maximum depth of {MAX_NESTING_DEPTH}"),
            ));
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Keep the diagnostic carried by a failure, if any.
    pub(super) fn record(&mut self, failure: PassFailure) {
        if let PassFailure::Reported(diagnostic) = failure {
            self.diagnostics.push(*diagnostic);
        }
    }

    pub(super) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            cursor: self.cursor,
            diagnostics: self.diagnostics.len(),
        }
    }

    /// Rewind the cursor and drop diagnostics raised since `checkpoint`.
    pub(super) fn restore(&mut self, checkpoint: Checkpoint) {
        self.cursor = checkpoint.cursor;
        self.diagnostics.truncate(checkpoint.diagnostics);
    }

    /// Try `attempt`; on failure rewind as if it never ran.
    pub(super) fn speculate<T>(
        &mut self,
        attempt: impl FnOnce(&mut Self) -> PassResult<T>,
    ) -> Option<T> {
        let checkpoint = self.checkpoint();

        match attempt(self) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::trace!(
                    from = self.cursor,
                    to = checkpoint.cursor,
                    "speculative parse backtracked"
                );
                self.restore(checkpoint);
                None
            }
        }
    }
}

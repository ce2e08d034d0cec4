use super::*;

impl Parser {
    pub(super) fn parse_block(&mut self) -> PassResult<BlockStmt> {
        self.nested(Self::parse_block_contents)
    }

    fn parse_block_contents(&mut self) -> PassResult<BlockStmt> {
        let open = self.expect_token(TokenKind::LBrace)?;
        let mut statements = Vec::new();

        while !self.check(TokenKind::RBrace) && !self.is_eof() {
            let started_at = self.cursor;

            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(failure) => {
                    self.record(failure);
                    self.synchronize_block(started_at);
                }
            }
        }

        let close = self.expect_token(TokenKind::RBrace)?;

        Ok(BlockStmt {
            statements,
            span: open.span.join(close.span),
        })
    }

    fn parse_statement(&mut self) -> PassResult<Stmt> {
        match self.current_kind() {
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::KwRet => {
                let keyword = self.bump();
                let value = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                let span = keyword.span.join(self.previous_span());
                self.finish_statement()?;

                Ok(Stmt::Return(ReturnStmt { value, span }))
            }
            _ => {
                let expr = self.parse_expression()?;
                self.finish_statement()?;

                Ok(Stmt::Expression(expr))
            }
        }
    }

    pub(super) fn at_statement_end(&self) -> bool {
        self.is_eof()
            || self.at_line_start()
            || matches!(
                self.current_kind(),
                TokenKind::Semicolon | TokenKind::RBrace
            )
    }

    /// Accept a statement terminator: `;`, a line break, `}` or end of file.
    pub(super) fn finish_statement(&mut self) -> PassResult<()> {
        if self.eat(TokenKind::Semicolon).is_some() || self.at_statement_end() {
            return Ok(());
        }

        Err(self.unexpected(&["newline", ";", "}"]))
    }
}

use super::*;

impl Parser {
    /// `[ ... ]`: a map when the first element is followed by `:` (or the
    /// body is a lone `:`), otherwise a list.
    pub(super) fn parse_collection(&mut self) -> PassResult<Expr> {
        let open = self.expect_token(TokenKind::LBracket)?;
        let ty = self.parse_collection_type();

        if self.eat(TokenKind::Colon).is_some() {
            let close = self.expect_token(TokenKind::RBracket)?;
            return Ok(self.finish_map(ty, Vec::new(), open.span.join(close.span)));
        }

        if let Some(close) = self.eat(TokenKind::RBracket) {
            return Ok(Expr::List {
                ty,
                elements: Vec::new(),
                span: open.span.join(close.span),
            });
        }

        let first = self.parse_expression()?;

        if self.eat(TokenKind::Colon).is_some() {
            let value = self.parse_expression()?;
            let entries = self.parse_map_entries((first, value))?;
            let close = self.expect_token(TokenKind::RBracket)?;
            return Ok(self.finish_map(ty, entries, open.span.join(close.span)));
        }

        let elements = self.parse_list_elements(first)?;
        let close = self.expect_token(TokenKind::RBracket)?;

        Ok(Expr::List {
            ty,
            elements,
            span: open.span.join(close.span),
        })
    }

    /// Optional `T;` prefix naming the element type.
    fn parse_collection_type(&mut self) -> Option<SyntaxType> {
        self.speculate(|parser| {
            let ty = parser.parse_type()?;
            parser.expect_token(TokenKind::Semicolon)?;
            Ok(ty)
        })
    }

    /// Remaining `, key: value` pairs after the first one.
    fn parse_map_entries(&mut self, first: (Expr, Expr)) -> PassResult<Vec<(Expr, Expr)>> {
        let mut entries = vec![first];

        while self.eat(TokenKind::Comma).is_some() && !self.check(TokenKind::RBracket) {
            let key = self.parse_expression()?;
            self.expect_token(TokenKind::Colon)?;
            let value = self.parse_expression()?;
            entries.push((key, value));
        }

        Ok(entries)
    }

    /// Remaining `, element` items after the first one.
    fn parse_list_elements(&mut self, first: Expr) -> PassResult<Vec<Expr>> {
        let mut elements = vec![first];

        while self.eat(TokenKind::Comma).is_some() && !self.check(TokenKind::RBracket) {
            elements.push(self.parse_expression()?);
        }

        Ok(elements)
    }

    fn finish_map(
        &mut self,
        ty: Option<SyntaxType>,
        entries: Vec<(Expr, Expr)>,
        span: Span,
    ) -> Expr {
        if let Some(ty) = &ty {
            if !matches!(ty, SyntaxType::Tuple { elements, .. } if elements.len() == 2) {
                self.report(ty.span(), "A map's explicit type must be a tuple of two types");
            }
        }

        Expr::Map { ty, entries, span }
    }
}

use super::*;

impl Parser {
    /// `name`, `(A, B)`, each optionally followed by `[]`, `[,]`, ...
    pub(super) fn parse_type(&mut self) -> PassResult<SyntaxType> {
        self.nested(Self::parse_type_unguarded)
    }

    fn parse_type_unguarded(&mut self) -> PassResult<SyntaxType> {
        let mut ty = if self.check(TokenKind::LParen) {
            self.parse_tuple_type()?
        } else {
            SyntaxType::Base(self.expect_token(TokenKind::Identifier)?)
        };

        while self.check(TokenKind::LBracket)
            && !self.at_line_start()
            && matches!(self.peek_kind(1), TokenKind::RBracket | TokenKind::Comma)
        {
            self.bump();
            let mut dimensions = 1;
            while self.eat(TokenKind::Comma).is_some() {
                dimensions += 1;
            }
            let close = self.expect_token(TokenKind::RBracket)?;

            ty = SyntaxType::Array {
                span: ty.span().join(close.span),
                element: Box::new(ty),
                dimensions,
            };
        }

        Ok(ty)
    }

    fn parse_tuple_type(&mut self) -> PassResult<SyntaxType> {
        let open = self.expect_token(TokenKind::LParen)?;
        let mut elements = vec![self.parse_type()?];

        while self.eat(TokenKind::Comma).is_some() {
            elements.push(self.parse_type()?);
        }

        let close = self.expect_token(TokenKind::RParen)?;

        // `(T)` is just `T`.
        if elements.len() == 1 {
            if let Some(only) = elements.pop() {
                return Ok(only);
            }
        }

        Ok(SyntaxType::Tuple {
            elements,
            span: open.span.join(close.span),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_type_src(src: &str) -> PassResult<SyntaxType> {
        let source = Arc::new(SourceBuffer::raw(src));
        let tokens: Vec<FilteredToken> = FilteredLexer::new(Arc::clone(&source)).collect();
        let mut parser = Parser::new(tokens, Arc::clone(&source), source.len());
        parser.parse_type()
    }

    #[test]
    fn array_dimensions_are_counted_per_bracket_pair() {
        let ty = parse_type_src("i32[,,][]").unwrap();

        let SyntaxType::Array {
            element,
            dimensions,
            ..
        } = &ty
        else {
            panic!("expected array");
        };
        assert_eq!(*dimensions, 1);
        assert!(matches!(**element, SyntaxType::Array { dimensions: 3, .. }));
        assert_eq!(ty.to_string(), "i32[,,][]");
    }

    #[test]
    fn tuple_types() {
        assert_eq!(
            parse_type_src("(str, (i32, bool)[])").unwrap().to_string(),
            "(str, (i32, bool)[])"
        );
        assert_eq!(parse_type_src("(u8)").unwrap().to_string(), "u8");
        assert!(parse_type_src("[i32]").is_err());
    }
}

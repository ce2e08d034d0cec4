use super::*;
use crate::ast::{AssignOp, BinaryOp, CastOp, UnaryOp};

const PREC_COALESCE: u8 = 1;
const PREC_EQUALITY: u8 = 3;
const PREC_BIT_OR: u8 = 5;
const PREC_BIT_XOR: u8 = 7;
const PREC_BIT_AND: u8 = 9;
const PREC_RELATIONAL: u8 = 11;
const PREC_SHIFT: u8 = 13;
const PREC_ADDITIVE: u8 = 15;
const PREC_MULTIPLICATIVE: u8 = 17;
const PREC_POWER: u8 = 19;
const PREC_RANGE: u8 = 21;

impl Parser {
    pub(super) fn parse_expression(&mut self) -> PassResult<Expr> {
        if self.check(TokenKind::LParen) {
            let start = self.current_span();
            if let Some((parameters, return_type)) = self.speculate(Self::parse_lambda_header) {
                return self.parse_lambda_body(start, parameters, return_type);
            }
        }

        self.parse_assignment()
    }

    /// `(params) [: T] =>`, where `=>` must stay on the header's line.
    fn parse_lambda_header(&mut self) -> PassResult<(Vec<Parameter>, Option<SyntaxType>)> {
        let parameters = self.parse_parameter_list()?;
        let return_type = match self.eat(TokenKind::Colon) {
            Some(_) => Some(self.parse_type()?),
            None => None,
        };

        if self.at_line_start() || !self.check(TokenKind::FatArrow) {
            return Err(PassFailure::Silent);
        }
        self.bump();

        Ok((parameters, return_type))
    }

    fn parse_lambda_body(
        &mut self,
        start: Span,
        parameters: Vec<Parameter>,
        return_type: Option<SyntaxType>,
    ) -> PassResult<Expr> {
        let body = if self.check(TokenKind::LBrace) {
            self.parse_block()?
        } else {
            let value = self.parse_expression()?;
            let span = value.span();
            BlockStmt {
                statements: vec![Stmt::Return(ReturnStmt {
                    value: Some(value),
                    span,
                })],
                span,
            }
        };

        Ok(Expr::Lambda(Box::new(LambdaExpr {
            span: start.join(body.span),
            parameters,
            return_type,
            body,
        })))
    }

    fn parse_assignment(&mut self) -> PassResult<Expr> {
        let target = self.parse_conditional()?;

        let Some(op) = AssignOp::from_token(self.current_kind()) else {
            return Ok(target);
        };
        self.bump();

        // Right-associative: `a = b = c` assigns `c` to `b` first.
        let value = self.parse_expression()?;

        Ok(Expr::Assignment {
            span: target.span().join(value.span()),
            target: Box::new(target),
            op,
            value: Box::new(value),
        })
    }

    fn parse_conditional(&mut self) -> PassResult<Expr> {
        let condition = self.parse_expression_bp(PREC_COALESCE)?;

        if self.eat(TokenKind::Question).is_none() {
            return Ok(condition);
        }

        let then_branch = self.parse_expression()?;
        self.expect_token(TokenKind::Colon)?;
        let else_branch = self.parse_conditional()?;

        Ok(Expr::Conditional {
            span: condition.span().join(else_branch.span()),
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    fn parse_expression_bp(&mut self, min_bp: u8) -> PassResult<Expr> {
        self.nested(|parser| parser.parse_binary(min_bp))
    }

    fn parse_binary(&mut self, min_bp: u8) -> PassResult<Expr> {
        let mut lhs = self.parse_prefix()?;

        loop {
            if let Some(op) = self.cast_operator() {
                if PREC_RELATIONAL < min_bp {
                    break;
                }
                self.bump();

                let ty = self.parse_type()?;
                lhs = Expr::Cast {
                    span: lhs.span().join(ty.span()),
                    op,
                    value: Box::new(lhs),
                    ty,
                };
                continue;
            }

            let Some((left_bp, right_bp, op)) = self.infix_binding_power() else {
                break;
            };

            if left_bp < min_bp {
                break;
            }

            self.bump();

            let rhs = self.parse_expression_bp(right_bp)?;

            lhs = Expr::Binary {
                span: lhs.span().join(rhs.span()),
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn cast_operator(&self) -> Option<CastOp> {
        match self.current_kind() {
            TokenKind::KwIs => Some(CastOp::Is),
            TokenKind::KwAs => Some(CastOp::As),
            _ => None,
        }
    }

    fn infix_binding_power(&self) -> Option<(u8, u8, BinaryOp)> {
        let op = BinaryOp::from_token(self.current_kind())?;

        let power = match op {
            BinaryOp::NullCoalescence => (PREC_COALESCE, PREC_COALESCE),
            BinaryOp::Equals | BinaryOp::NotEquals => (PREC_EQUALITY, PREC_EQUALITY + 1),
            BinaryOp::Or => (PREC_BIT_OR, PREC_BIT_OR + 1),
            BinaryOp::Xor => (PREC_BIT_XOR, PREC_BIT_XOR + 1),
            BinaryOp::And => (PREC_BIT_AND, PREC_BIT_AND + 1),
            BinaryOp::LessThan
            | BinaryOp::GreaterThan
            | BinaryOp::LessEqual
            | BinaryOp::GreaterEqual => (PREC_RELATIONAL, PREC_RELATIONAL + 1),
            BinaryOp::ShiftLeft | BinaryOp::ShiftRight | BinaryOp::RotLeft | BinaryOp::RotRight => {
                (PREC_SHIFT, PREC_SHIFT + 1)
            }
            BinaryOp::Add | BinaryOp::Subtract => (PREC_ADDITIVE, PREC_ADDITIVE + 1),
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo | BinaryOp::DivisibleBy => {
                (PREC_MULTIPLICATIVE, PREC_MULTIPLICATIVE + 1)
            }
            BinaryOp::Power => (PREC_POWER, PREC_POWER),
            BinaryOp::RangeInclusive | BinaryOp::RangeExclusive => (PREC_RANGE, PREC_RANGE + 1),
        };

        Some((power.0, power.1, op))
    }

    fn parse_prefix(&mut self) -> PassResult<Expr> {
        let Some(op) = UnaryOp::prefix(self.current_kind()) else {
            return self.parse_postfix();
        };

        let operator = self.bump();
        let operand = self.nested(Self::parse_prefix)?;

        if let Some(folded) = self.fold_literal(&operator, &operand) {
            return Ok(Expr::Token(folded));
        }

        Ok(Expr::Unary {
            span: operator.span.join(operand.span()),
            op,
            operand: Box::new(operand),
        })
    }

    /// Fold `+ - ! ~` applied directly to a literal into a new literal.
    fn fold_literal(&self, operator: &Token, operand: &Expr) -> Option<Token> {
        let literal = operand.as_token()?;
        let value = literal.value.as_ref()?;
        let mut folded = literals::fold_prefix(operator.kind, value)?;

        // Only plain decimal literals were widened by the lexer; an explicit
        // suffix keeps its width.
        let unsuffixed = literal.kind == TokenKind::NumberLiteral
            && literal.text().bytes().all(|b| b.is_ascii_digit() || b == b'_');
        if operator.kind == TokenKind::Minus && unsuffixed {
            folded = literals::narrow_signed(folded);
        }

        Some(Token::new(
            literal.kind,
            operator.span.join(literal.span),
            &self.source,
            Some(folded),
        ))
    }

    fn parse_postfix(&mut self) -> PassResult<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            let gated = self.at_line_start();

            expr = match self.current_kind() {
                kind @ (TokenKind::Dot | TokenKind::QuestionDot) => {
                    self.bump();
                    let member = self.expect_token(TokenKind::Identifier)?;

                    Expr::Access {
                        span: expr.span().join(member.span),
                        object: Box::new(expr),
                        member,
                        null_check: kind == TokenKind::QuestionDot,
                    }
                }
                TokenKind::LParen if !gated => {
                    self.bump();
                    let arguments = self.parse_arguments(TokenKind::RParen)?;

                    Expr::Call {
                        span: expr.span().join(self.previous_span()),
                        callee: Box::new(expr),
                        arguments,
                    }
                }
                kind @ (TokenKind::LBracket | TokenKind::QuestionBracket) if !gated => {
                    self.bump();
                    let arguments = self.parse_arguments(TokenKind::RBracket)?;

                    Expr::Index {
                        span: expr.span().join(self.previous_span()),
                        object: Box::new(expr),
                        arguments,
                        null_check: kind == TokenKind::QuestionBracket,
                    }
                }
                kind @ (TokenKind::PlusPlus | TokenKind::MinusMinus) if !gated => {
                    let Some(op) = UnaryOp::postfix(kind) else {
                        break;
                    };
                    let operator = self.bump();

                    Expr::Unary {
                        span: expr.span().join(operator.span),
                        op,
                        operand: Box::new(expr),
                    }
                }
                _ => break,
            };
        }

        Ok(expr)
    }

    /// Comma-separated expressions up to and including `close`.
    fn parse_arguments(&mut self, close: TokenKind) -> PassResult<Vec<Expr>> {
        let mut arguments = Vec::new();

        while !self.check(close) {
            arguments.push(self.parse_expression()?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        self.expect_token(close)?;
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> PassResult<Expr> {
        let start = self.checkpoint();
        let parenthesized = self.check(TokenKind::LParen);

        match self.parse_primary_value() {
            Ok(expr) => {
                // `i32[]` and `T[,]` in expression position are types.
                let opens_array_type = self.check(TokenKind::LBracket)
                    && !self.at_line_start()
                    && matches!(self.peek_kind(1), TokenKind::RBracket | TokenKind::Comma);

                if opens_array_type {
                    self.restore(start);
                    return Ok(Expr::Type(self.parse_type()?));
                }
                Ok(expr)
            }
            Err(failure) if parenthesized => {
                // Diagnostics from the failed attempt stay recorded; only
                // the cursor moves back for the type attempt.
                let failed_at = self.cursor;
                self.cursor = start.cursor;

                match self.speculate(Self::parse_type) {
                    Some(ty) => Ok(Expr::Type(ty)),
                    None => {
                        self.cursor = failed_at;
                        Err(failure)
                    }
                }
            }
            Err(failure) => Err(failure),
        }
    }

    fn parse_primary_value(&mut self) -> PassResult<Expr> {
        match self.current_kind() {
            TokenKind::NumberLiteral
            | TokenKind::StringLiteral
            | TokenKind::CharLiteral
            | TokenKind::KwTrue
            | TokenKind::KwFalse
            | TokenKind::KwNull
            | TokenKind::Identifier
            | TokenKind::KwSelf => Ok(Expr::Token(self.bump())),
            TokenKind::InterpolatedStringLiteral => self.parse_interpolated_string(),
            TokenKind::LParen => self.parse_parenthesized(),
            TokenKind::LBracket => self.parse_collection(),
            kind @ (TokenKind::InvalidNumberLiteral
            | TokenKind::InvalidStringLiteral
            | TokenKind::InvalidCharLiteral) => {
                let token = self.current_token();
                let label = match kind {
                    TokenKind::InvalidNumberLiteral => "Invalid number literal",
                    TokenKind::InvalidStringLiteral => "Invalid string literal",
                    _ => "Invalid char literal",
                };
                Err(self.error(token.span, format!("{label} '{}'", token.text())))
            }
            TokenKind::Invalid => {
                let token = self.current_token();
                Err(self.error(
                    token.span,
                    format!("Unexpected character '{}'", token.text()),
                ))
            }
            _ => Err(self.unexpected(&["expression"])),
        }
    }

    /// `()`, `(expr)` or a tuple `(a, b, ...)`.
    fn parse_parenthesized(&mut self) -> PassResult<Expr> {
        let open = self.expect_token(TokenKind::LParen)?;

        if let Some(close) = self.eat(TokenKind::RParen) {
            return Ok(Expr::Tuple {
                elements: Vec::new(),
                span: open.span.join(close.span),
            });
        }

        let first = self.parse_expression()?;

        if self.eat(TokenKind::Comma).is_none() {
            self.expect_token(TokenKind::RParen)?;
            return Ok(first);
        }

        let mut elements = vec![first];
        while !self.check(TokenKind::RParen) {
            elements.push(self.parse_expression()?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }

        let close = self.expect_token(TokenKind::RParen)?;

        Ok(Expr::Tuple {
            elements,
            span: open.span.join(close.span),
        })
    }
}

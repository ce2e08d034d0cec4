//! Operator enumerations shared by expression nodes.
//!
//! Keeping operator kinds isolated avoids circular dependencies between
//! expression definitions and parsing code. Each enum maps from the token
//! that spells it and back to that spelling for printing.

use std::fmt;

use super::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
    Identity,
    Negate,
    BitwiseNegate,
    LogicalNot,
    Await,
}

impl UnaryOp {
    pub fn prefix(kind: TokenKind) -> Option<UnaryOp> {
        let op = match kind {
            TokenKind::PlusPlus => UnaryOp::PreIncrement,
            TokenKind::MinusMinus => UnaryOp::PreDecrement,
            TokenKind::Plus => UnaryOp::Identity,
            TokenKind::Minus => UnaryOp::Negate,
            TokenKind::Tilde => UnaryOp::BitwiseNegate,
            TokenKind::Bang => UnaryOp::LogicalNot,
            TokenKind::KwAwait => UnaryOp::Await,
            _ => return None,
        };
        Some(op)
    }

    pub fn postfix(kind: TokenKind) -> Option<UnaryOp> {
        match kind {
            TokenKind::PlusPlus => Some(UnaryOp::PostIncrement),
            TokenKind::MinusMinus => Some(UnaryOp::PostDecrement),
            _ => None,
        }
    }

    pub fn is_prefix(self) -> bool {
        !matches!(self, UnaryOp::PostIncrement | UnaryOp::PostDecrement)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::PreIncrement | UnaryOp::PostIncrement => "++",
            UnaryOp::PreDecrement | UnaryOp::PostDecrement => "--",
            UnaryOp::Identity => "+",
            UnaryOp::Negate => "-",
            UnaryOp::BitwiseNegate => "~",
            UnaryOp::LogicalNot => "!",
            UnaryOp::Await => "await",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    NullCoalescence,

    // Comparison
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,

    // Bitwise
    Or,
    Xor,
    And,
    RotLeft,
    RotRight,
    ShiftLeft,
    ShiftRight,

    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    DivisibleBy,
    Modulo,
    Power,

    // Ranges
    RangeInclusive,
    RangeExclusive,
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<BinaryOp> {
        let op = match kind {
            TokenKind::QuestionQuestion => BinaryOp::NullCoalescence,
            TokenKind::EqEq => BinaryOp::Equals,
            TokenKind::NotEq => BinaryOp::NotEquals,
            TokenKind::Lt => BinaryOp::LessThan,
            TokenKind::Gt => BinaryOp::GreaterThan,
            TokenKind::LtEq => BinaryOp::LessEqual,
            TokenKind::GtEq => BinaryOp::GreaterEqual,
            TokenKind::Pipe => BinaryOp::Or,
            TokenKind::Caret => BinaryOp::Xor,
            TokenKind::Amp => BinaryOp::And,
            TokenKind::RotLeft => BinaryOp::RotLeft,
            TokenKind::RotRight => BinaryOp::RotRight,
            TokenKind::Shl => BinaryOp::ShiftLeft,
            TokenKind::Shr => BinaryOp::ShiftRight,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Subtract,
            TokenKind::Star => BinaryOp::Multiply,
            TokenKind::Slash => BinaryOp::Divide,
            TokenKind::PercentPercent => BinaryOp::DivisibleBy,
            TokenKind::Percent => BinaryOp::Modulo,
            TokenKind::StarStar => BinaryOp::Power,
            TokenKind::DotDotEq => BinaryOp::RangeInclusive,
            TokenKind::DotDot => BinaryOp::RangeExclusive,
            _ => return None,
        };
        Some(op)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equals
                | BinaryOp::NotEquals
                | BinaryOp::LessThan
                | BinaryOp::GreaterThan
                | BinaryOp::LessEqual
                | BinaryOp::GreaterEqual
        )
    }

    pub fn is_range(self) -> bool {
        matches!(self, BinaryOp::RangeInclusive | BinaryOp::RangeExclusive)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::NullCoalescence => "??",
            BinaryOp::Equals => "==",
            BinaryOp::NotEquals => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::GreaterThan => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::And => "&",
            BinaryOp::RotLeft => "<<<",
            BinaryOp::RotRight => ">>>",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::DivisibleBy => "%%",
            BinaryOp::Modulo => "%",
            BinaryOp::Power => "**",
            BinaryOp::RangeInclusive => "..=",
            BinaryOp::RangeExclusive => "..",
        }
    }
}

/// Assignment, plain or compound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    Compound(BinaryOp),
}

impl AssignOp {
    pub fn from_token(kind: TokenKind) -> Option<AssignOp> {
        let op = match kind {
            TokenKind::Assign => return Some(AssignOp::Assign),
            TokenKind::PlusEq => BinaryOp::Add,
            TokenKind::MinusEq => BinaryOp::Subtract,
            TokenKind::StarEq => BinaryOp::Multiply,
            TokenKind::SlashEq => BinaryOp::Divide,
            TokenKind::PercentEq => BinaryOp::Modulo,
            TokenKind::StarStarEq => BinaryOp::Power,
            TokenKind::AmpEq => BinaryOp::And,
            TokenKind::PipeEq => BinaryOp::Or,
            TokenKind::CaretEq => BinaryOp::Xor,
            TokenKind::ShlEq => BinaryOp::ShiftLeft,
            TokenKind::ShrEq => BinaryOp::ShiftRight,
            TokenKind::RotLeftEq => BinaryOp::RotLeft,
            TokenKind::RotRightEq => BinaryOp::RotRight,
            _ => return None,
        };
        Some(AssignOp::Compound(op))
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignOp::Assign => f.write_str("="),
            AssignOp::Compound(op) => write!(f, "{}=", op.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastOp {
    Is,
    As,
}

impl CastOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CastOp::Is => "is",
            CastOp::As => "as",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CastOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_assignments_spell_their_operator() {
        let op = AssignOp::from_token(TokenKind::StarStarEq).unwrap();
        assert_eq!(op, AssignOp::Compound(BinaryOp::Power));
        assert_eq!(op.to_string(), "**=");
        assert_eq!(AssignOp::from_token(TokenKind::RotRightEq).unwrap().to_string(), ">>>=");
        assert_eq!(AssignOp::from_token(TokenKind::EqEq), None);
    }

    #[test]
    fn increment_is_prefix_or_postfix_by_position() {
        assert_eq!(UnaryOp::prefix(TokenKind::PlusPlus), Some(UnaryOp::PreIncrement));
        assert_eq!(UnaryOp::postfix(TokenKind::PlusPlus), Some(UnaryOp::PostIncrement));
        assert!(!UnaryOp::PostDecrement.is_prefix());
        assert_eq!(UnaryOp::postfix(TokenKind::Minus), None);
    }
}

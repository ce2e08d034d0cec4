//! Token definitions for Cinder's lexer.
//!
//! `TokenKind` is a closed set of keywords, operators, literal kinds and
//! structural markers. Keyword and operator spellings live in lookup tables
//! built once on first use and shared read-only afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // structural
    EndOfFile,
    Identifier,
    Invalid,
    Whitespace,
    Newline,
    LineComment,
    BlockComment,
    DocComment,

    // literals
    NumberLiteral,
    InvalidNumberLiteral,
    StringLiteral,
    InterpolatedStringLiteral,
    InvalidStringLiteral,
    CharLiteral,
    InvalidCharLiteral,

    // keywords
    KwEntry,
    KwUse,
    KwAs,
    KwMod,
    KwType,
    KwUtil,
    KwTrait,
    KwImpl,
    KwPub,
    KwVar,
    KwVal,
    KwLet,
    KwMut,
    KwSelf,
    KwGet,
    KwSet,
    KwThis,
    KwFun,
    KwRet,
    KwRef,
    KwIf,
    KwIs,
    KwIn,
    KwWith,
    KwElse,
    KwEnum,
    KwFor,
    KwWhile,
    KwCont,
    KwExit,
    KwExt,
    KwDll,
    KwAwait,
    KwTrue,
    KwFalse,
    KwNull,

    // punctuation
    Comma,
    Semicolon,
    Colon,
    DotDotEq,
    Ellipsis,
    DotDot,
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Arrow,
    FatArrow,

    // operators
    EqEq,
    Assign,
    NotEq,
    Bang,
    PlusEq,
    PlusPlus,
    Plus,
    MinusEq,
    MinusMinus,
    Minus,
    Tilde,
    StarStarEq,
    StarStar,
    StarEq,
    Star,
    SlashEq,
    Slash,
    PercentPercent,
    PercentEq,
    Percent,
    AmpEq,
    Amp,
    PipeEq,
    Pipe,
    CaretEq,
    Caret,
    QuestionQuestion,
    QuestionDot,
    QuestionBracket,
    Question,
    RotLeftEq,
    RotLeft,
    ShlEq,
    Shl,
    LtEq,
    Lt,
    RotRightEq,
    RotRight,
    ShrEq,
    Shr,
    GtEq,
    Gt,
}

const KEYWORDS: &[TokenKind] = &[
    TokenKind::KwEntry,
    TokenKind::KwUse,
    TokenKind::KwAs,
    TokenKind::KwMod,
    TokenKind::KwType,
    TokenKind::KwUtil,
    TokenKind::KwTrait,
    TokenKind::KwImpl,
    TokenKind::KwPub,
    TokenKind::KwVar,
    TokenKind::KwVal,
    TokenKind::KwLet,
    TokenKind::KwMut,
    TokenKind::KwSelf,
    TokenKind::KwGet,
    TokenKind::KwSet,
    TokenKind::KwThis,
    TokenKind::KwFun,
    TokenKind::KwRet,
    TokenKind::KwRef,
    TokenKind::KwIf,
    TokenKind::KwIs,
    TokenKind::KwIn,
    TokenKind::KwWith,
    TokenKind::KwElse,
    TokenKind::KwEnum,
    TokenKind::KwFor,
    TokenKind::KwWhile,
    TokenKind::KwCont,
    TokenKind::KwExit,
    TokenKind::KwExt,
    TokenKind::KwDll,
    TokenKind::KwAwait,
    TokenKind::KwTrue,
    TokenKind::KwFalse,
    TokenKind::KwNull,
];

const OPERATORS: &[TokenKind] = &[
    TokenKind::Comma,
    TokenKind::Semicolon,
    TokenKind::Colon,
    TokenKind::DotDotEq,
    TokenKind::Ellipsis,
    TokenKind::DotDot,
    TokenKind::Dot,
    TokenKind::LParen,
    TokenKind::RParen,
    TokenKind::LBracket,
    TokenKind::RBracket,
    TokenKind::LBrace,
    TokenKind::RBrace,
    TokenKind::Arrow,
    TokenKind::FatArrow,
    TokenKind::EqEq,
    TokenKind::Assign,
    TokenKind::NotEq,
    TokenKind::Bang,
    TokenKind::PlusEq,
    TokenKind::PlusPlus,
    TokenKind::Plus,
    TokenKind::MinusEq,
    TokenKind::MinusMinus,
    TokenKind::Minus,
    TokenKind::Tilde,
    TokenKind::StarStarEq,
    TokenKind::StarStar,
    TokenKind::StarEq,
    TokenKind::Star,
    TokenKind::SlashEq,
    TokenKind::Slash,
    TokenKind::PercentPercent,
    TokenKind::PercentEq,
    TokenKind::Percent,
    TokenKind::AmpEq,
    TokenKind::Amp,
    TokenKind::PipeEq,
    TokenKind::Pipe,
    TokenKind::CaretEq,
    TokenKind::Caret,
    TokenKind::QuestionQuestion,
    TokenKind::QuestionDot,
    TokenKind::QuestionBracket,
    TokenKind::Question,
    TokenKind::RotLeftEq,
    TokenKind::RotLeft,
    TokenKind::ShlEq,
    TokenKind::Shl,
    TokenKind::LtEq,
    TokenKind::Lt,
    TokenKind::RotRightEq,
    TokenKind::RotRight,
    TokenKind::ShrEq,
    TokenKind::Shr,
    TokenKind::GtEq,
    TokenKind::Gt,
];

fn spelling_table(kinds: &[TokenKind]) -> HashMap<&'static str, TokenKind> {
    kinds.iter().map(|kind| (kind.as_str(), *kind)).collect()
}

static KEYWORD_TABLE: LazyLock<HashMap<&'static str, TokenKind>> =
    LazyLock::new(|| spelling_table(KEYWORDS));

static OPERATOR_TABLE: LazyLock<HashMap<&'static str, TokenKind>> =
    LazyLock::new(|| spelling_table(OPERATORS));

impl TokenKind {
    /// Keyword spelled exactly as `text`.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        KEYWORD_TABLE.get(text).copied()
    }

    /// Operator spelled exactly as `text`.
    pub fn operator(text: &str) -> Option<TokenKind> {
        OPERATOR_TABLE.get(text).copied()
    }

    pub fn is_keyword(self) -> bool {
        KEYWORDS.contains(&self)
    }

    pub fn is_operator(self) -> bool {
        OPERATORS.contains(&self)
    }

    pub fn is_identifier(self) -> bool {
        self == TokenKind::Identifier
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::NumberLiteral
                | TokenKind::StringLiteral
                | TokenKind::InterpolatedStringLiteral
                | TokenKind::CharLiteral
                | TokenKind::KwTrue
                | TokenKind::KwFalse
                | TokenKind::KwNull
        )
    }

    /// Tokens the filtered lexer drops.
    pub fn is_filtered(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::Newline
                | TokenKind::LineComment
                | TokenKind::BlockComment
                | TokenKind::DocComment
        )
    }

    pub fn is_invalid(self) -> bool {
        matches!(
            self,
            TokenKind::EndOfFile
                | TokenKind::Invalid
                | TokenKind::InvalidNumberLiteral
                | TokenKind::InvalidStringLiteral
                | TokenKind::InvalidCharLiteral
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::EndOfFile => "eof",
            TokenKind::Identifier => "identifier",
            TokenKind::Invalid => "invalid",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Newline => "newline",
            TokenKind::LineComment => "line comment",
            TokenKind::BlockComment => "block comment",
            TokenKind::DocComment => "documentation comment",
            TokenKind::NumberLiteral => "number literal",
            TokenKind::InvalidNumberLiteral => "invalid number literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::InterpolatedStringLiteral => "interpolated string literal",
            TokenKind::InvalidStringLiteral => "invalid string literal",
            TokenKind::CharLiteral => "char literal",
            TokenKind::InvalidCharLiteral => "invalid char literal",
            TokenKind::KwEntry => "entry",
            TokenKind::KwUse => "use",
            TokenKind::KwAs => "as",
            TokenKind::KwMod => "mod",
            TokenKind::KwType => "type",
            TokenKind::KwUtil => "util",
            TokenKind::KwTrait => "trait",
            TokenKind::KwImpl => "impl",
            TokenKind::KwPub => "pub",
            TokenKind::KwVar => "var",
            TokenKind::KwVal => "val",
            TokenKind::KwLet => "let",
            TokenKind::KwMut => "mut",
            TokenKind::KwSelf => "self",
            TokenKind::KwGet => "get",
            TokenKind::KwSet => "set",
            TokenKind::KwThis => "this",
            TokenKind::KwFun => "fun",
            TokenKind::KwRet => "ret",
            TokenKind::KwRef => "ref",
            TokenKind::KwIf => "if",
            TokenKind::KwIs => "is",
            TokenKind::KwIn => "in",
            TokenKind::KwWith => "with",
            TokenKind::KwElse => "else",
            TokenKind::KwEnum => "enum",
            TokenKind::KwFor => "for",
            TokenKind::KwWhile => "while",
            TokenKind::KwCont => "cont",
            TokenKind::KwExit => "exit",
            TokenKind::KwExt => "ext",
            TokenKind::KwDll => "dll",
            TokenKind::KwAwait => "await",
            TokenKind::KwTrue => "true",
            TokenKind::KwFalse => "false",
            TokenKind::KwNull => "null",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::DotDotEq => "..=",
            TokenKind::Ellipsis => "...",
            TokenKind::DotDot => "..",
            TokenKind::Dot => ".",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Arrow => "->",
            TokenKind::FatArrow => "=>",
            TokenKind::EqEq => "==",
            TokenKind::Assign => "=",
            TokenKind::NotEq => "!=",
            TokenKind::Bang => "!",
            TokenKind::PlusEq => "+=",
            TokenKind::PlusPlus => "++",
            TokenKind::Plus => "+",
            TokenKind::MinusEq => "-=",
            TokenKind::MinusMinus => "--",
            TokenKind::Minus => "-",
            TokenKind::Tilde => "~",
            TokenKind::StarStarEq => "**=",
            TokenKind::StarStar => "**",
            TokenKind::StarEq => "*=",
            TokenKind::Star => "*",
            TokenKind::SlashEq => "/=",
            TokenKind::Slash => "/",
            TokenKind::PercentPercent => "%%",
            TokenKind::PercentEq => "%=",
            TokenKind::Percent => "%",
            TokenKind::AmpEq => "&=",
            TokenKind::Amp => "&",
            TokenKind::PipeEq => "|=",
            TokenKind::Pipe => "|",
            TokenKind::CaretEq => "^=",
            TokenKind::Caret => "^",
            TokenKind::QuestionQuestion => "??",
            TokenKind::QuestionDot => "?.",
            TokenKind::QuestionBracket => "?[",
            TokenKind::Question => "?",
            TokenKind::RotLeftEq => "<<<=",
            TokenKind::RotLeft => "<<<",
            TokenKind::ShlEq => "<<=",
            TokenKind::Shl => "<<",
            TokenKind::LtEq => "<=",
            TokenKind::Lt => "<",
            TokenKind::RotRightEq => ">>>=",
            TokenKind::RotRight => ">>>",
            TokenKind::ShrEq => ">>=",
            TokenKind::Shr => ">>",
            TokenKind::GtEq => ">=",
            TokenKind::Gt => ">",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded value carried by literal tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    F32(f32),
    F64(f64),
    Bool(bool),
    Char(char),
    Str(String),
    Null,
}

impl LiteralValue {
    /// Name of the native type a literal of this value has.
    pub fn native_type_name(&self) -> Option<&'static str> {
        let name = match self {
            LiteralValue::I8(_) => "i8",
            LiteralValue::I16(_) => "i16",
            LiteralValue::I32(_) => "i32",
            LiteralValue::I64(_) => "i64",
            LiteralValue::I128(_) => "i128",
            LiteralValue::U8(_) => "u8",
            LiteralValue::U16(_) => "u16",
            LiteralValue::U32(_) => "u32",
            LiteralValue::U64(_) => "u64",
            LiteralValue::U128(_) => "u128",
            LiteralValue::F32(_) => "f32",
            LiteralValue::F64(_) => "f64",
            LiteralValue::Bool(_) => "bool",
            LiteralValue::Char(_) => "char",
            LiteralValue::Str(_) => "str",
            LiteralValue::Null => return None,
        };
        Some(name)
    }

    /// Integer value widened to `i128`, when it fits.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            LiteralValue::I8(v) => Some(v.into()),
            LiteralValue::I16(v) => Some(v.into()),
            LiteralValue::I32(v) => Some(v.into()),
            LiteralValue::I64(v) => Some(v.into()),
            LiteralValue::I128(v) => Some(v),
            LiteralValue::U8(v) => Some(v.into()),
            LiteralValue::U16(v) => Some(v.into()),
            LiteralValue::U32(v) => Some(v.into()),
            LiteralValue::U64(v) => Some(v.into()),
            LiteralValue::U128(v) => i128::try_from(v).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::I8(v) => write!(f, "{v}"),
            LiteralValue::I16(v) => write!(f, "{v}"),
            LiteralValue::I32(v) => write!(f, "{v}"),
            LiteralValue::I64(v) => write!(f, "{v}"),
            LiteralValue::I128(v) => write!(f, "{v}"),
            LiteralValue::U8(v) => write!(f, "{v}"),
            LiteralValue::U16(v) => write!(f, "{v}"),
            LiteralValue::U32(v) => write!(f, "{v}"),
            LiteralValue::U64(v) => write!(f, "{v}"),
            LiteralValue::U128(v) => write!(f, "{v}"),
            LiteralValue::F32(v) => write!(f, "{v}"),
            LiteralValue::F64(v) => write!(f, "{v}"),
            LiteralValue::Bool(v) => write!(f, "{v}"),
            LiteralValue::Char(v) => write!(f, "{v:?}"),
            LiteralValue::Str(v) => write!(f, "{v:?}"),
            LiteralValue::Null => f.write_str("null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_table_round_trips_spellings() {
        for kind in KEYWORDS {
            assert_eq!(TokenKind::keyword(kind.as_str()), Some(*kind));
            assert!(kind.is_keyword());
            assert!(!kind.is_operator());
        }
        assert_eq!(TokenKind::keyword("main"), None);
    }

    #[test]
    fn operator_table_round_trips_spellings() {
        for kind in OPERATORS {
            assert_eq!(TokenKind::operator(kind.as_str()), Some(*kind));
            assert!(kind.is_operator());
        }
        assert_eq!(TokenKind::operator("**="), Some(TokenKind::StarStarEq));
        assert_eq!(TokenKind::operator("+-"), None);
    }

    #[test]
    fn capability_flags() {
        assert!(TokenKind::Newline.is_filtered());
        assert!(TokenKind::DocComment.is_filtered());
        assert!(!TokenKind::Identifier.is_filtered());
        assert!(TokenKind::EndOfFile.is_invalid());
        assert!(TokenKind::InvalidNumberLiteral.is_invalid());
        assert!(TokenKind::KwTrue.is_literal() && TokenKind::KwTrue.is_keyword());
        assert!(TokenKind::Identifier.is_identifier());
    }

    #[test]
    fn literal_native_names() {
        assert_eq!(LiteralValue::I32(4).native_type_name(), Some("i32"));
        assert_eq!(LiteralValue::Str("x".into()).native_type_name(), Some("str"));
        assert_eq!(LiteralValue::Null.native_type_name(), None);
        assert_eq!(LiteralValue::U128(u128::MAX).as_i128(), None);
    }
}

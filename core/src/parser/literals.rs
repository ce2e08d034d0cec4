//! Literal decoding helpers shared by the lexer and parser.
//!
//! Nothing here fails loudly: malformed input yields `None` or an
//! `is_valid == false` flag and the caller decides which invalid token or
//! diagnostic to produce.

use crate::ast::{LiteralValue, TokenKind};

/// Width and signedness marker following a number literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumberSuffix {
    None,
    Signed(Option<u32>),
    Unsigned(Option<u32>),
    Float(Option<u32>),
    Fixed(Option<u32>),
}

/// Decode escape sequences in `text`.
///
/// Returns the decoded string and whether every escape was recognised.
/// `allow_brace` admits `\{`, which is only meaningful where a bare `{`
/// opens an interpolation.
pub fn unescape(text: &str, allow_brace: bool) -> (String, bool) {
    let mut decoded = String::with_capacity(text.len());
    let mut valid = true;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            decoded.push(ch);
            continue;
        }

        let Some(escape) = chars.next() else {
            valid = false;
            decoded.push('\\');
            break;
        };

        let replacement = match escape {
            '\'' => '\'',
            '"' => '"',
            '\\' => '\\',
            '0' => '\0',
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{0B}',
            '{' if allow_brace => '{',
            'u' | 'U' => {
                let width = if escape == 'u' { 4 } else { 8 };
                let mut digits = String::with_capacity(width);
                while digits.len() < width {
                    match chars.peek() {
                        Some(digit) if digit.is_ascii_hexdigit() => {
                            digits.push(*digit);
                            chars.next();
                        }
                        _ => break,
                    }
                }

                let decoded_char = (digits.len() == width)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);

                match decoded_char {
                    Some(decoded_char) => decoded_char,
                    None => {
                        valid = false;
                        decoded.push('\\');
                        decoded.push(escape);
                        decoded.push_str(&digits);
                        continue;
                    }
                }
            }
            other => {
                valid = false;
                decoded.push('\\');
                other
            }
        };

        decoded.push(replacement);
    }

    (decoded, valid)
}

macro_rules! parse_radix {
    ($digits:expr, $radix:expr, $ty:ty, $variant:ident) => {
        <$ty>::from_str_radix($digits, $radix)
            .ok()
            .map(LiteralValue::$variant)
    };
}

fn signed_with_width(digits: &str, radix: u32, width: u32) -> Option<LiteralValue> {
    match width {
        8 => parse_radix!(digits, radix, i8, I8),
        16 => parse_radix!(digits, radix, i16, I16),
        32 => parse_radix!(digits, radix, i32, I32),
        64 => parse_radix!(digits, radix, i64, I64),
        128 => parse_radix!(digits, radix, i128, I128),
        _ => None,
    }
}

fn unsigned_with_width(digits: &str, radix: u32, width: u32) -> Option<LiteralValue> {
    match width {
        8 => parse_radix!(digits, radix, u8, U8),
        16 => parse_radix!(digits, radix, u16, U16),
        32 => parse_radix!(digits, radix, u32, U32),
        64 => parse_radix!(digits, radix, u64, U64),
        128 => parse_radix!(digits, radix, u128, U128),
        _ => None,
    }
}

/// Convert separator-free integer digits in `radix`, honouring the suffix.
/// Without an explicit width the narrowest representation that fits wins.
pub(crate) fn integer_value(digits: &str, radix: u32, suffix: NumberSuffix) -> Option<LiteralValue> {
    if digits.is_empty() {
        return None;
    }

    match suffix {
        NumberSuffix::None if radix == 10 => [32, 64, 128]
            .into_iter()
            .find_map(|width| signed_with_width(digits, radix, width))
            .or_else(|| unsigned_with_width(digits, radix, 128)),
        NumberSuffix::None => [32, 64, 128].into_iter().find_map(|width| {
            signed_with_width(digits, radix, width)
                .or_else(|| unsigned_with_width(digits, radix, width))
        }),
        NumberSuffix::Signed(None) => [32, 64, 128]
            .into_iter()
            .find_map(|width| signed_with_width(digits, radix, width)),
        NumberSuffix::Signed(Some(width)) => signed_with_width(digits, radix, width),
        NumberSuffix::Unsigned(None) => [32, 64, 128]
            .into_iter()
            .find_map(|width| unsigned_with_width(digits, radix, width)),
        NumberSuffix::Unsigned(Some(width)) => unsigned_with_width(digits, radix, width),
        NumberSuffix::Float(width) if radix == 10 => float_value(digits, NumberSuffix::Float(width)),
        NumberSuffix::Float(_) | NumberSuffix::Fixed(_) => None,
    }
}

/// Convert separator-free decimal float text. Unsuffixed floats are `f64`,
/// a bare `f` suffix selects `f32`.
pub(crate) fn float_value(text: &str, suffix: NumberSuffix) -> Option<LiteralValue> {
    match suffix {
        NumberSuffix::None | NumberSuffix::Float(Some(64)) => text
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(LiteralValue::F64),
        NumberSuffix::Float(None) | NumberSuffix::Float(Some(32)) => text
            .parse::<f32>()
            .ok()
            .filter(|value| value.is_finite())
            .map(LiteralValue::F32),
        _ => None,
    }
}

/// Fold a prefix operator applied directly to a literal value. Returns
/// `None` when the combination has no compile-time meaning.
pub(crate) fn fold_prefix(op: TokenKind, value: &LiteralValue) -> Option<LiteralValue> {
    use LiteralValue::*;

    match (op, value) {
        (TokenKind::Plus, Bool(_) | Char(_) | Str(_) | Null) => None,
        (TokenKind::Plus, number) => Some(number.clone()),

        (TokenKind::Minus, I8(v)) => v.checked_neg().map(I8),
        (TokenKind::Minus, I16(v)) => v.checked_neg().map(I16),
        (TokenKind::Minus, I32(v)) => v.checked_neg().map(I32),
        (TokenKind::Minus, I64(v)) => v.checked_neg().map(I64),
        (TokenKind::Minus, I128(v)) => v.checked_neg().map(I128),
        (TokenKind::Minus, F32(v)) => Some(F32(-v)),
        (TokenKind::Minus, F64(v)) => Some(F64(-v)),
        (TokenKind::Minus, U8(0) | U16(0) | U32(0) | U64(0) | U128(0)) => Some(value.clone()),

        (TokenKind::Tilde, I8(v)) => Some(I8(!v)),
        (TokenKind::Tilde, I16(v)) => Some(I16(!v)),
        (TokenKind::Tilde, I32(v)) => Some(I32(!v)),
        (TokenKind::Tilde, I64(v)) => Some(I64(!v)),
        (TokenKind::Tilde, I128(v)) => Some(I128(!v)),
        (TokenKind::Tilde, U8(v)) => Some(U8(!v)),
        (TokenKind::Tilde, U16(v)) => Some(U16(!v)),
        (TokenKind::Tilde, U32(v)) => Some(U32(!v)),
        (TokenKind::Tilde, U64(v)) => Some(U64(!v)),
        (TokenKind::Tilde, U128(v)) => Some(U128(!v)),

        (TokenKind::Bang, Bool(v)) => Some(Bool(!v)),

        _ => None,
    }
}

/// Move a signed value back to the narrowest default width (`i32`, `i64`,
/// `i128`) that holds it. Unsuffixed literals are widened before a leading
/// `-` is applied, so `-2147483648` arrives here as an `i64`.
pub(crate) fn narrow_signed(value: LiteralValue) -> LiteralValue {
    let wide = match value {
        LiteralValue::I64(v) => i128::from(v),
        LiteralValue::I128(v) => v,
        other => return other,
    };

    if let Ok(v) = i32::try_from(wide) {
        LiteralValue::I32(v)
    } else if let Ok(v) = i64::try_from(wide) {
        LiteralValue::I64(v)
    } else {
        LiteralValue::I128(wide)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negated_minimums_narrow_back() {
        let folded = fold_prefix(TokenKind::Minus, &LiteralValue::I64(2_147_483_648));
        assert_eq!(folded.map(narrow_signed), Some(LiteralValue::I32(i32::MIN)));

        let folded = fold_prefix(TokenKind::Minus, &LiteralValue::I128(1 << 63));
        assert_eq!(folded.map(narrow_signed), Some(LiteralValue::I64(i64::MIN)));

        assert_eq!(
            narrow_signed(LiteralValue::I64(-3_000_000_000)),
            LiteralValue::I64(-3_000_000_000)
        );
        assert_eq!(narrow_signed(LiteralValue::U64(7)), LiteralValue::U64(7));
    }

    #[test]
    fn decodes_standard_escapes() {
        let (text, valid) = unescape("a\\nb", false);

        assert!(valid);
        assert_eq!(text.chars().count(), 3);
        assert_eq!(text, "a\nb");

        let (text, valid) = unescape("\\t\\\"\\\\\\0\\v", false);
        assert!(valid);
        assert_eq!(text, "\t\"\\\0\u{0B}");
    }

    #[test]
    fn unknown_escape_is_invalid() {
        let (_, valid) = unescape("\\q", true);
        assert!(!valid);

        let (_, valid) = unescape("trailing\\", true);
        assert!(!valid);
    }

    #[test]
    fn brace_escape_depends_on_context() {
        assert_eq!(unescape("\\{x}", true), ("{x}".to_string(), true));
        assert!(!unescape("\\{", false).1);
    }

    #[test]
    fn decodes_unicode_escapes() {
        assert_eq!(unescape("\\u00e9", false), ("é".to_string(), true));
        assert_eq!(unescape("\\U0001F600", false), ("😀".to_string(), true));
        assert!(!unescape("\\u12", false).1);
        assert!(!unescape("\\uD800", false).1);
    }

    #[test]
    fn integers_take_the_narrowest_width() {
        assert_eq!(
            integer_value("1000000", 10, NumberSuffix::None),
            Some(LiteralValue::I32(1_000_000))
        );
        assert_eq!(
            integer_value("3000000000", 10, NumberSuffix::None),
            Some(LiteralValue::I64(3_000_000_000))
        );
        assert_eq!(
            integer_value("FFFFFFFF", 16, NumberSuffix::None),
            Some(LiteralValue::U32(u32::MAX))
        );
        assert_eq!(
            integer_value("300", 10, NumberSuffix::Unsigned(Some(8))),
            None
        );
        assert_eq!(
            integer_value("200", 10, NumberSuffix::Unsigned(Some(8))),
            Some(LiteralValue::U8(200))
        );
        assert_eq!(integer_value("7", 10, NumberSuffix::Fixed(None)), None);
    }

    #[test]
    fn floats_default_to_double_precision() {
        assert_eq!(
            float_value("2.5", NumberSuffix::None),
            Some(LiteralValue::F64(2.5))
        );
        assert_eq!(
            float_value("2.5", NumberSuffix::Float(None)),
            Some(LiteralValue::F32(2.5))
        );
        assert_eq!(float_value("2.5", NumberSuffix::Float(Some(16))), None);
        assert_eq!(float_value("1e999", NumberSuffix::None), None);
    }

    #[test]
    fn folds_prefix_operators() {
        assert_eq!(
            fold_prefix(TokenKind::Minus, &LiteralValue::I32(5)),
            Some(LiteralValue::I32(-5))
        );
        assert_eq!(
            fold_prefix(TokenKind::Tilde, &LiteralValue::U8(0)),
            Some(LiteralValue::U8(255))
        );
        assert_eq!(
            fold_prefix(TokenKind::Bang, &LiteralValue::Bool(true)),
            Some(LiteralValue::Bool(false))
        );
        assert_eq!(fold_prefix(TokenKind::Minus, &LiteralValue::U8(3)), None);
        assert_eq!(fold_prefix(TokenKind::Bang, &LiteralValue::I32(1)), None);
    }
}

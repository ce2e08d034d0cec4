//! Source lexer for Cinder.
//!
//! The lexer is stateless: `scan_token` maps a byte position to the token
//! starting there and the position after it, so the same position always
//! yields the same token. `Lexer::tokens` drives it as an iterator. Bad input
//! never fails the scan; it produces an explicitly invalid token instead.

use std::fmt;
use std::sync::Arc;

use super::literals::{self, NumberSuffix};
use crate::ast::{LiteralValue, TokenKind};
use crate::diag::Span;
use crate::text::SourceBuffer;

/// A token paired with its location in a source buffer.
#[derive(Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value: Option<LiteralValue>,
    /// 1-based position of `span.start`.
    pub line: usize,
    pub column: usize,
    source: Arc<SourceBuffer>,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        span: Span,
        source: &Arc<SourceBuffer>,
        value: Option<LiteralValue>,
    ) -> Self {
        let (line, column) = source.line_column(span.start).unwrap_or((0, 0));

        Self {
            kind,
            span,
            value,
            line,
            column,
            source: Arc::clone(source),
        }
    }

    /// Source text covered by the token.
    pub fn text(&self) -> &str {
        self.source.slice(self.span).unwrap_or_default()
    }

    pub fn source(&self) -> &Arc<SourceBuffer> {
        &self.source
    }

    /// Copy of this token moved `offset` bytes into `source`.
    pub fn rebased(&self, offset: usize, source: &Arc<SourceBuffer>) -> Token {
        Token::new(self.kind, self.span + offset, source, self.value.clone())
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.span == other.span
            && self.value == other.value
            && Arc::ptr_eq(&self.source, &other.source)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("kind", &self.kind)
            .field("text", &self.text())
            .field("span", &self.span)
            .field("value", &self.value)
            .field("line", &self.line)
            .field("column", &self.column)
            .finish()
    }
}

/// Outcome of scanning one token.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub token: Token,
    /// Position just after the token; always greater than the scan position.
    pub next: usize,
}

#[derive(Debug, Clone)]
pub struct Lexer {
    source: Arc<SourceBuffer>,
}

impl Lexer {
    pub fn new(source: Arc<SourceBuffer>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &Arc<SourceBuffer> {
        &self.source
    }

    /// Iterate over every token of the buffer, filtered ones included.
    pub fn tokens(&self) -> Tokens<'_> {
        Tokens {
            lexer: self,
            position: 0,
        }
    }

    /// Scan the token starting at `position`, or `None` at end of input.
    pub fn scan_token(&self, position: usize) -> Option<ScanResult> {
        let text = self.source.text();
        if position >= text.len() {
            return None;
        }

        let Some(first) = text.get(position..).and_then(|rest| rest.chars().next()) else {
            // Not a character boundary: skip to the next one.
            let end = (position + 1..=text.len())
                .find(|index| text.is_char_boundary(*index))
                .unwrap_or(text.len());
            return Some(self.finish(TokenKind::Invalid, position, end, None));
        };

        let result = match first {
            '\n' | '\r' => self.scan_newline(position),
            ch if ch.is_whitespace() => self.scan_whitespace(position),
            ch if ch.is_ascii_digit() => self.scan_number(position),
            ch if ch.is_alphabetic() || ch == '_' => self.scan_identifier(position),
            '"' => self.scan_string(position),
            '\'' => self.scan_char(position),
            '/' if matches!(self.byte_at(position + 1), Some(b'/' | b'*')) => {
                self.scan_comment(position)
            }
            _ => self.scan_operator(position),
        };

        Some(result)
    }

    fn finish(
        &self,
        kind: TokenKind,
        start: usize,
        end: usize,
        value: Option<LiteralValue>,
    ) -> ScanResult {
        ScanResult {
            token: Token::new(kind, Span::new(start, end), &self.source, value),
            next: end,
        }
    }

    fn byte_at(&self, position: usize) -> Option<u8> {
        self.source.text().as_bytes().get(position).copied()
    }

    fn scan_newline(&self, start: usize) -> ScanResult {
        let end = match (self.byte_at(start), self.byte_at(start + 1)) {
            (Some(b'\r'), Some(b'\n')) => start + 2,
            _ => start + 1,
        };
        self.finish(TokenKind::Newline, start, end, None)
    }

    fn scan_whitespace(&self, start: usize) -> ScanResult {
        let text = self.source.text();
        let end = text[start..]
            .char_indices()
            .find(|(_, ch)| !ch.is_whitespace() || *ch == '\n' || *ch == '\r')
            .map_or(text.len(), |(offset, _)| start + offset);

        self.finish(TokenKind::Whitespace, start, end, None)
    }

    fn scan_identifier(&self, start: usize) -> ScanResult {
        let text = self.source.text();
        let end = text[start..]
            .char_indices()
            .find(|(_, ch)| !is_ident_continue(*ch))
            .map_or(text.len(), |(offset, _)| start + offset);

        match TokenKind::keyword(&text[start..end]) {
            Some(TokenKind::KwTrue) => {
                self.finish(TokenKind::KwTrue, start, end, Some(LiteralValue::Bool(true)))
            }
            Some(TokenKind::KwFalse) => {
                self.finish(TokenKind::KwFalse, start, end, Some(LiteralValue::Bool(false)))
            }
            Some(TokenKind::KwNull) => {
                self.finish(TokenKind::KwNull, start, end, Some(LiteralValue::Null))
            }
            Some(keyword) => self.finish(keyword, start, end, None),
            None => self.finish(TokenKind::Identifier, start, end, None),
        }
    }

    fn scan_number(&self, start: usize) -> ScanResult {
        let bytes = self.source.text().as_bytes();
        let mut digits = String::new();
        let mut is_float = false;

        let radix = match (bytes.get(start), bytes.get(start + 1)) {
            (Some(b'0'), Some(b'x' | b'X')) => 16,
            (Some(b'0'), Some(b'b' | b'B')) => 2,
            _ => 10,
        };

        let mut cursor = if radix == 10 { start } else { start + 2 };
        cursor = consume_digits(bytes, cursor, radix, &mut digits);

        if radix == 10 {
            // `1.` stays an integer so `1..2` and `1.abs` keep working.
            if bytes.get(cursor) == Some(&b'.')
                && bytes.get(cursor + 1).is_some_and(u8::is_ascii_digit)
            {
                is_float = true;
                digits.push('.');
                cursor = consume_digits(bytes, cursor + 1, 10, &mut digits);
            }

            if matches!(bytes.get(cursor), Some(b'e' | b'E')) {
                let signed = matches!(bytes.get(cursor + 1), Some(b'+' | b'-'));
                let exponent_start = cursor + 1 + usize::from(signed);

                if bytes.get(exponent_start).is_some_and(u8::is_ascii_digit) {
                    is_float = true;
                    digits.push('e');
                    if signed {
                        digits.push(char::from(bytes[cursor + 1]));
                    }
                    cursor = consume_digits(bytes, exponent_start, 10, &mut digits);
                }
            }
        }

        let (suffix, end) = scan_number_suffix(bytes, cursor);

        let value = if is_float {
            literals::float_value(&digits, suffix)
        } else {
            literals::integer_value(&digits, radix, suffix)
        };

        let kind = match value {
            Some(_) => TokenKind::NumberLiteral,
            None => TokenKind::InvalidNumberLiteral,
        };

        self.finish(kind, start, end, value)
    }

    fn scan_string(&self, start: usize) -> ScanResult {
        let text = self.source.text();
        let body_start = start + 1;
        let mut escaped = false;
        let mut depth = 0usize;
        let mut interpolated = false;
        let mut closing = None;
        let mut stop = text.len();

        for (offset, ch) in text[body_start..].char_indices() {
            let index = body_start + offset;
            match ch {
                '\n' | '\r' => {
                    stop = index;
                    break;
                }
                '{' if !escaped => {
                    interpolated = true;
                    depth += 1;
                    continue;
                }
                '}' if depth > 0 => {
                    depth -= 1;
                    continue;
                }
                '"' if !escaped && depth == 0 => {
                    closing = Some(index);
                    break;
                }
                '\\' => {
                    escaped = !escaped;
                    continue;
                }
                _ => {}
            }
            escaped = false;
        }

        let Some(closing) = closing else {
            return self.finish(TokenKind::InvalidStringLiteral, start, stop, None);
        };

        let raw = &text[body_start..closing];
        let end = closing + 1;

        if interpolated {
            return self.finish(
                TokenKind::InterpolatedStringLiteral,
                start,
                end,
                Some(LiteralValue::Str(raw.to_string())),
            );
        }

        match literals::unescape(raw, true) {
            (value, true) => {
                self.finish(TokenKind::StringLiteral, start, end, Some(LiteralValue::Str(value)))
            }
            (_, false) => self.finish(TokenKind::InvalidStringLiteral, start, end, None),
        }
    }

    fn scan_char(&self, start: usize) -> ScanResult {
        let text = self.source.text();
        let body_start = start + 1;
        let mut escaped = false;
        let mut closing = None;
        let mut stop = text.len();

        for (offset, ch) in text[body_start..].char_indices() {
            let index = body_start + offset;
            match ch {
                '\n' | '\r' => {
                    stop = index;
                    break;
                }
                '\'' if !escaped => {
                    closing = Some(index);
                    break;
                }
                '\\' => {
                    escaped = !escaped;
                    continue;
                }
                _ => {}
            }
            escaped = false;
        }

        let Some(closing) = closing else {
            return self.finish(TokenKind::InvalidCharLiteral, start, stop, None);
        };

        let (decoded, valid) = literals::unescape(&text[body_start..closing], false);
        let mut chars = decoded.chars();

        match (valid, chars.next(), chars.next()) {
            (true, Some(ch), None) => self.finish(
                TokenKind::CharLiteral,
                start,
                closing + 1,
                Some(LiteralValue::Char(ch)),
            ),
            _ => self.finish(TokenKind::InvalidCharLiteral, start, closing + 1, None),
        }
    }

    fn scan_comment(&self, start: usize) -> ScanResult {
        let text = self.source.text();

        if self.byte_at(start + 1) == Some(b'/') {
            let kind = if self.byte_at(start + 2) == Some(b'/') {
                TokenKind::DocComment
            } else {
                TokenKind::LineComment
            };
            let end = text[start..]
                .find(['\n', '\r'])
                .map_or(text.len(), |offset| start + offset);

            return self.finish(kind, start, end, None);
        }

        let mut depth = 0usize;
        let mut cursor = start;

        while cursor < text.len() {
            let rest = &text[cursor..];
            if rest.starts_with("/*") {
                depth += 1;
                cursor += 2;
            } else if rest.starts_with("*/") {
                depth -= 1;
                cursor += 2;
                if depth == 0 {
                    break;
                }
            } else {
                cursor += rest.chars().next().map_or(1, char::len_utf8);
            }
        }

        self.finish(TokenKind::BlockComment, start, cursor.min(text.len()), None)
    }

    fn scan_operator(&self, start: usize) -> ScanResult {
        let text = self.source.text();
        let run_end = text[start..]
            .char_indices()
            .find(|(_, ch)| ch.is_alphanumeric() || ch.is_whitespace() || *ch == '_')
            .map_or(text.len(), |(offset, _)| start + offset);

        // Longest registered prefix of the run wins.
        let mut end = run_end;
        while end > start {
            if let Some(kind) = TokenKind::operator(&text[start..end]) {
                return self.finish(kind, start, end, None);
            }
            end = text[start..end]
                .char_indices()
                .last()
                .map_or(start, |(offset, _)| start + offset);
        }

        let width = text[start..].chars().next().map_or(1, char::len_utf8);
        self.finish(TokenKind::Invalid, start, start + width, None)
    }
}

/// Iterator over every raw token of a buffer.
pub struct Tokens<'a> {
    lexer: &'a Lexer,
    position: usize,
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let result = self.lexer.scan_token(self.position)?;
        self.position = result.next;
        Some(result.token)
    }
}

fn is_ident_continue(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

/// Read digits of `radix`, skipping `_` separators, and return the cursor.
fn consume_digits(bytes: &[u8], mut cursor: usize, radix: u32, buf: &mut String) -> usize {
    while let Some(&byte) = bytes.get(cursor) {
        if char::from(byte).is_digit(radix) {
            buf.push(char::from(byte));
        } else if byte != b'_' {
            break;
        }
        cursor += 1;
    }
    cursor
}

/// Recognise a `u`/`i`/`f`/`x` suffix with an optional bit width. A letter
/// that runs on into an identifier is not a suffix.
fn scan_number_suffix(bytes: &[u8], cursor: usize) -> (NumberSuffix, usize) {
    let marker: fn(Option<u32>) -> NumberSuffix = match bytes.get(cursor) {
        Some(b'u' | b'U') => NumberSuffix::Unsigned,
        Some(b'i' | b'I') => NumberSuffix::Signed,
        Some(b'f' | b'F') => NumberSuffix::Float,
        Some(b'x' | b'X') => NumberSuffix::Fixed,
        _ => return (NumberSuffix::None, cursor),
    };

    let width_start = cursor + 1;
    let mut end = width_start;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }

    if bytes
        .get(end)
        .is_some_and(|byte| byte.is_ascii_alphanumeric() || *byte == b'_')
    {
        return (NumberSuffix::None, cursor);
    }

    let width = (end > width_start).then(|| {
        std::str::from_utf8(&bytes[width_start..end])
            .ok()
            .and_then(|digits| digits.parse::<u32>().ok())
            .unwrap_or(0)
    });

    (marker(width), end)
}

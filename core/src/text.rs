//! Immutable source buffers.
//!
//! A `SourceBuffer` owns the text of one compilation unit together with a
//! precomputed line table. Tokens and diagnostics share a buffer through an
//! `Arc` so positions can always be turned back into text and line/column
//! pairs.

use std::fmt;

use crate::diag::Span;

/// Errors raised when a position or line lies outside a buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    #[error("position {position} is outside of the buffer (length {length})")]
    PositionOutOfRange { position: usize, length: usize },
    #[error("range {span} is outside of the buffer (length {length})")]
    RangeOutOfRange { span: Span, length: usize },
    #[error("line {line} does not exist (the buffer has {count} lines)")]
    LineOutOfRange { line: usize, count: usize },
}

pub struct SourceBuffer {
    name: String,
    text: String,
    /// Line ranges, excluding the terminating newline sequence.
    lines: Vec<Span>,
}

impl SourceBuffer {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let lines = split_lines(&text);

        Self {
            name: name.into(),
            text,
            lines,
        }
    }

    /// Buffer for text that did not come from a file.
    pub fn raw(text: impl Into<String>) -> Self {
        Self::new("<raw>", text)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Character starting at byte offset `position`.
    pub fn char_at(&self, position: usize) -> Option<char> {
        self.text.get(position..)?.chars().next()
    }

    pub fn slice(&self, span: Span) -> Result<&str, TextError> {
        self.text
            .get(span.start..span.end)
            .ok_or(TextError::RangeOutOfRange {
                span,
                length: self.text.len(),
            })
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Range of a 1-based line, without its newline.
    pub fn line_span(&self, line: usize) -> Result<Span, TextError> {
        line.checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .copied()
            .ok_or(TextError::LineOutOfRange {
                line,
                count: self.lines.len(),
            })
    }

    pub fn line(&self, line: usize) -> Result<&str, TextError> {
        let span = self.line_span(line)?;
        self.slice(span)
    }

    /// 1-based line and column of a byte offset. The end-of-buffer offset is
    /// valid and maps past the last character.
    pub fn line_column(&self, position: usize) -> Result<(usize, usize), TextError> {
        if position > self.text.len() {
            return Err(TextError::PositionOutOfRange {
                position,
                length: self.text.len(),
            });
        }

        let index = self
            .lines
            .partition_point(|line| line.start <= position)
            .saturating_sub(1);
        let start = self.lines.get(index).map_or(0, |line| line.start);

        let column = match self.text.get(start..position) {
            Some(prefix) => prefix.chars().count(),
            None => position - start,
        };

        Ok((index + 1, column + 1))
    }
}

impl fmt::Debug for SourceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceBuffer")
            .field("name", &self.name)
            .field("len", &self.text.len())
            .field("lines", &self.lines.len())
            .finish()
    }
}

fn split_lines(text: &str) -> Vec<Span> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut cursor = 0;

    while cursor < bytes.len() {
        match bytes[cursor] {
            b'\r' => {
                lines.push(Span::new(start, cursor));
                cursor += if bytes.get(cursor + 1) == Some(&b'\n') { 2 } else { 1 };
                start = cursor;
            }
            b'\n' => {
                lines.push(Span::new(start, cursor));
                cursor += 1;
                start = cursor;
            }
            _ => cursor += 1,
        }
    }

    lines.push(Span::new(start, bytes.len()));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_every_newline_style_once() {
        let buffer = SourceBuffer::raw("one\r\ntwo\rthree\nfour");

        assert_eq!(buffer.line_count(), 4);
        assert_eq!(buffer.line(1).unwrap(), "one");
        assert_eq!(buffer.line(2).unwrap(), "two");
        assert_eq!(buffer.line(3).unwrap(), "three");
        assert_eq!(buffer.line(4).unwrap(), "four");
    }

    #[test]
    fn line_ranges_exclude_newlines() {
        let buffer = SourceBuffer::raw("ab\r\ncd\n");

        assert_eq!(buffer.line_span(1).unwrap(), Span::new(0, 2));
        assert_eq!(buffer.line_span(2).unwrap(), Span::new(4, 6));
        assert_eq!(buffer.line_span(3).unwrap(), Span::new(7, 7));
        assert!(buffer.line_span(0).is_err());
        assert!(buffer.line_span(4).is_err());
    }

    #[test]
    fn computes_one_based_positions() {
        let buffer = SourceBuffer::raw("mod a\r\n  main");

        assert_eq!(buffer.line_column(0).unwrap(), (1, 1));
        assert_eq!(buffer.line_column(4).unwrap(), (1, 5));
        assert_eq!(buffer.line_column(9).unwrap(), (2, 3));
        assert_eq!(buffer.line_column(buffer.len()).unwrap(), (2, 7));
    }

    #[test]
    fn columns_count_characters() {
        let buffer = SourceBuffer::raw("é = 1");

        assert_eq!(buffer.line_column(3).unwrap(), (1, 3));
    }

    #[test]
    fn rejects_positions_past_the_end() {
        let buffer = SourceBuffer::raw("abc");

        assert_eq!(
            buffer.line_column(4),
            Err(TextError::PositionOutOfRange {
                position: 4,
                length: 3
            })
        );
        assert!(buffer.slice(Span::new(2, 9)).is_err());
        assert_eq!(buffer.char_at(1), Some('b'));
        assert_eq!(buffer.char_at(3), None);
    }
}

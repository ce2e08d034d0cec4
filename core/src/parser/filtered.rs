//! Token stream the parser consumes.
//!
//! Whitespace and comments are dropped; whether a newline was skipped before
//! a token is kept on the wrapper so the parser can still tell where a
//! statement ends.

use std::sync::Arc;

use super::lexer::{Lexer, Token};
use crate::ast::TokenKind;
use crate::text::SourceBuffer;

/// A significant token plus its newline adjacency.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredToken {
    pub token: Token,
    /// A newline token was skipped directly before this one.
    pub after_newline: bool,
}

impl FilteredToken {
    pub fn kind(&self) -> TokenKind {
        self.token.kind
    }
}

#[derive(Debug, Clone)]
pub struct FilteredLexer {
    lexer: Lexer,
    position: usize,
}

impl FilteredLexer {
    pub fn new(source: Arc<SourceBuffer>) -> Self {
        Self {
            lexer: Lexer::new(source),
            position: 0,
        }
    }

    pub fn source(&self) -> &Arc<SourceBuffer> {
        self.lexer.source()
    }
}

impl Iterator for FilteredLexer {
    type Item = FilteredToken;

    fn next(&mut self) -> Option<FilteredToken> {
        let mut after_newline = false;

        loop {
            let result = self.lexer.scan_token(self.position)?;
            self.position = result.next;

            match result.token.kind {
                TokenKind::Newline => after_newline = true,
                kind if kind.is_filtered() => {}
                _ => {
                    return Some(FilteredToken {
                        token: result.token,
                        after_newline,
                    });
                }
            }
        }
    }
}

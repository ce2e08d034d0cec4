use super::*;

impl Parser {
    /// Skip to the start of the next top-level statement.
    ///
    /// Stops, outside any braces, at end of file, `mod`, `use`, or an
    /// identifier that begins a line. If the failed statement consumed
    /// nothing, at least one token is skipped.
    pub(super) fn synchronize_top_level(&mut self, started_at: usize) {
        let mut depth = 0usize;
        let mut skipped = 0usize;

        while !self.is_eof() {
            let moved = self.cursor > started_at;

            if depth == 0 && moved {
                match self.current_kind() {
                    TokenKind::KwMod | TokenKind::KwUse => break,
                    TokenKind::Identifier if self.at_line_start() => break,
                    _ => {}
                }
            }

            match self.current_kind() {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth = depth.saturating_sub(1),
                _ => {}
            }

            self.bump();
            skipped += 1;
        }

        tracing::debug!(skipped, "synchronized at top level");
    }

    /// Skip to the start of the next statement inside a block.
    ///
    /// Stops, outside nested braces, at the closing `}`, at `ret`, or at any
    /// token that begins a line.
    pub(super) fn synchronize_block(&mut self, started_at: usize) {
        let mut depth = 0usize;
        let mut skipped = 0usize;

        while !self.is_eof() {
            let moved = self.cursor > started_at;

            if depth == 0 {
                match self.current_kind() {
                    TokenKind::RBrace => break,
                    TokenKind::KwRet if moved => break,
                    _ if moved && self.at_line_start() => break,
                    _ => {}
                }
            }

            match self.current_kind() {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                _ => {}
            }

            self.bump();
            skipped += 1;
        }

        tracing::debug!(skipped, "synchronized in block");
    }
}

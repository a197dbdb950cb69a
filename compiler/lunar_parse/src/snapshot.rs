//! Parser snapshots for speculative lookahead.
//!
//! A snapshot is the cursor position. Restoring one is only sound while
//! the token buffer is unchanged, so speculation must not skip tokens;
//! [`Parser::look_ahead`] is the only caller and its closures only
//! consume.

use crate::Parser;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ParserSnapshot {
    pub(crate) position: usize,
}

impl Parser<'_> {
    pub(crate) fn snapshot(&self) -> ParserSnapshot {
        ParserSnapshot {
            position: self.cursor.position(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: ParserSnapshot) {
        self.cursor.set_position(snapshot.position);
    }

    /// Run `f` and rewind to where it started, keeping only its answer.
    pub(crate) fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let snapshot = self.snapshot();
        let result = f(self);
        self.restore(snapshot);
        result
    }
}

#[cfg(test)]
mod tests {
    use lunar_lexer_core::SourceBuffer;
    use lunar_syntax::{ParseOptions, SyntaxKind};

    use crate::Parser;

    #[test]
    fn look_ahead_restores_position() {
        let buffer = SourceBuffer::new("a, b = 1");
        let options = ParseOptions::default();
        let mut parser = Parser::new(&buffer, &options);
        let reaches_equals = parser.look_ahead(|p| {
            while p.cursor.current_kind() != SyntaxKind::Equals && !p.cursor.is_at_end() {
                p.cursor.advance();
            }
            p.cursor.current_kind() == SyntaxKind::Equals
        });
        assert!(reaches_equals);
        assert_eq!(parser.cursor.current().text(), "a");
    }

    #[test]
    fn snapshot_is_small() {
        assert!(std::mem::size_of::<super::ParserSnapshot>() <= 8);
    }
}

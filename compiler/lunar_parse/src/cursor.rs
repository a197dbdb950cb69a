//! Token cursor over the lexer.
//!
//! Tokens are pulled from the lexer on demand and kept in a buffer, so
//! lookahead is a buffer index and a parser snapshot is just a
//! position. The buffer always ends at the first `EndOfFile`
//! token; peeking past it yields that token again.

use std::sync::Arc;

use lunar_lexer::{Lexer, LexerMode};
use lunar_syntax::{GreenToken, SyntaxKind, Trivia};
use tracing::trace;

pub struct Cursor<'a> {
    lexer: Lexer<'a>,
    tokens: Vec<Arc<GreenToken>>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Cursor {
            lexer,
            tokens: Vec::new(),
            pos: 0,
        }
    }

    /// Index of the current token in the buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move back to a position returned by [`Cursor::position`].
    pub fn set_position(&mut self, pos: usize) {
        debug_assert!(
            pos <= self.tokens.len(),
            "cursor position {pos} out of bounds (max {})",
            self.tokens.len()
        );
        self.pos = pos;
    }

    /// Lex until the buffer holds `index`, or until end of file.
    fn fill(&mut self, index: usize) {
        while self.tokens.len() <= index {
            if self
                .tokens
                .last()
                .is_some_and(|t| t.kind() == SyntaxKind::EndOfFile)
            {
                return;
            }
            self.tokens.push(self.lexer.lex(LexerMode::Syntax));
        }
    }

    /// The token `n` places ahead of the current one.
    pub fn peek_token(&mut self, n: usize) -> &Arc<GreenToken> {
        let index = self.pos + n;
        self.fill(index);
        let last = self.tokens.len() - 1;
        &self.tokens[index.min(last)]
    }

    #[inline]
    pub fn peek_kind(&mut self, n: usize) -> SyntaxKind {
        self.peek_token(n).kind()
    }

    #[inline]
    pub fn current(&mut self) -> &Arc<GreenToken> {
        self.peek_token(0)
    }

    #[inline]
    pub fn current_kind(&mut self) -> SyntaxKind {
        self.peek_kind(0)
    }

    #[inline]
    pub fn is_at_end(&mut self) -> bool {
        self.current_kind() == SyntaxKind::EndOfFile
    }

    /// Consume the current token.
    ///
    /// Grammar rules check the current kind before consuming, and only the
    /// compilation unit consumes `EndOfFile`, so this never runs past the
    /// end of the buffer.
    pub fn advance(&mut self) -> Arc<GreenToken> {
        let token = Arc::clone(self.current());
        self.pos += 1;
        token
    }

    /// Remove the tokens between `start` and the current position from
    /// the stream and return them. The cursor moves back to `start`.
    pub fn take_since(&mut self, start: usize) -> Vec<Arc<GreenToken>> {
        let taken: Vec<_> = self.tokens.drain(start..self.pos).collect();
        self.pos = start;
        taken
    }

    /// Put `trivia` in front of the current token's leading trivia.
    pub fn prefix_current(&mut self, trivia: Trivia) {
        self.fill(self.pos);
        let index = self.pos.min(self.tokens.len() - 1);
        trace!(kind = ?self.tokens[index].kind(), width = trivia.width(), "prefixing trivia");
        let token = self.tokens[index].with_leading_prefix(trivia);
        self.tokens[index] = Arc::new(token);
    }
}

//! Full-fidelity recursive descent parser for Lua and MoonScript.
//!
//! Produces an immutable green tree whose tokens reproduce the source byte
//! for byte. Parsing never fails on malformed input: missing tokens are
//! zero-width placeholders carrying a diagnostic, and tokens the grammar
//! cannot place are kept as skipped-tokens trivia.
//!
//! # Module Structure
//!
//! - `cursor`: buffered token access over the lexer
//! - `recovery`: token sets and skipping
//! - `snapshot`: speculative lookahead
//! - `cancel`: cooperative cancellation
//! - `grammar`: expressions, statements, functions and tables
//!
//! Node slot layouts are listed in the `grammar` module.

mod cancel;
mod cursor;
mod grammar;
mod recovery;
mod snapshot;

use std::sync::Arc;

use lunar_lexer::Lexer;
use lunar_syntax::{GreenNode, ParseOptions, SyntaxTree};
use tracing::debug;

pub use cancel::{CancellationToken, Cancelled};
pub use lunar_lexer_core::SourceBuffer;
pub use recovery::TokenSet;

use cursor::Cursor;

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    options: &'a ParseOptions,
    cancellation: Option<CancellationToken>,
    cancelled: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a SourceBuffer, options: &'a ParseOptions) -> Self {
        Parser {
            cursor: Cursor::new(Lexer::new(source, options)),
            options,
            cancellation: None,
            cancelled: false,
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn options(&self) -> &'a ParseOptions {
        self.options
    }

    /// Parse the whole input: a block followed by end of file.
    pub fn parse_compilation_unit(&mut self) -> Result<Arc<GreenNode>, Cancelled> {
        let root = self.compilation_unit();
        self.finish(root)
    }

    /// Parse statements up to a block terminator (`end`, `else`, `elseif`,
    /// `until`) or end of file. The terminator is not consumed.
    pub fn parse_block(&mut self) -> Result<Arc<GreenNode>, Cancelled> {
        let block = self.block(recovery::BLOCK_END);
        self.finish(block)
    }

    /// Parse one statement. Tokens that cannot begin a statement are
    /// skipped first; if no statement follows them, the result is an empty
    /// statement whose `;` is missing.
    pub fn parse_statement(&mut self) -> Result<Arc<GreenNode>, Cancelled> {
        let statement = self.statement();
        self.finish(statement)
    }

    /// Parse one expression.
    pub fn parse_expression(&mut self) -> Arc<GreenNode> {
        self.expression()
    }

    fn finish(&self, node: Arc<GreenNode>) -> Result<Arc<GreenNode>, Cancelled> {
        if self.cancelled {
            debug!("parse cancelled");
            return Err(Cancelled);
        }
        Ok(node)
    }

    /// Poll the cancellation token. Once it fires, blocks stop taking
    /// statements and the parse unwinds.
    fn should_stop(&mut self) -> bool {
        if !self.cancelled {
            self.cancelled = self
                .cancellation
                .as_ref()
                .is_some_and(CancellationToken::is_cancelled);
        }
        self.cancelled
    }
}

/// Parse `source` into a syntax tree.
pub fn parse(source: &str, options: &ParseOptions) -> SyntaxTree {
    let buffer = SourceBuffer::new(source);
    let mut parser = Parser::new(&buffer, options);
    SyntaxTree::new(parser.compilation_unit())
}

/// Parse `source`, giving up with [`Cancelled`] once `token` is cancelled.
pub fn parse_with_cancellation(
    source: &str,
    options: &ParseOptions,
    token: &CancellationToken,
) -> Result<SyntaxTree, Cancelled> {
    let buffer = SourceBuffer::new(source);
    let mut parser = Parser::new(&buffer, options).with_cancellation(token.clone());
    parser.parse_compilation_unit().map(SyntaxTree::new)
}

#[cfg(test)]
mod tests;

//! Full-fidelity lexer for Lua and MoonScript.
//!
//! Every byte of the source lands in exactly one token or one trivia run,
//! so the token stream reproduces the input verbatim. Lexing never fails:
//! problems become diagnostics on the token that contains them.
//!
//! # Architecture
//!
//! - [`Lexer`]: pull-based, one token per [`Lexer::lex`] call, tried first
//!   through the quick-scan fast path of `lunar_lexer_core`
//! - trivia: whitespace, comments, shebang, directives and disabled text
//! - strings: quoted, long-bracket and interpolated literals, with escape
//!   decoding and MoonScript indentation trimming
//! - directives: `#if`/`#define`/`#region` lines parsed into structured
//!   trivia while the preprocessor state is tracked
//!
//! # Usage
//!
//! ```text
//! let tokens = lunar_lexer::tokenize(source, &ParseOptions::default());
//! assert_eq!(tokens.last().map(|t| t.kind()), Some(SyntaxKind::EndOfFile));
//! ```

use std::sync::Arc;

use lunar_lexer_core::SourceBuffer;
use lunar_syntax::{GreenToken, ParseOptions, SyntaxKind};

mod directive;
mod escape;
mod indent;
mod lexer;
mod numbers;
mod scratch;
mod strings;
mod trivia;

pub use lexer::{Lexer, LexerMode};
pub use numbers::numeric_value;

/// Lex all of `source`, through the end-of-file token.
pub fn tokenize(source: &str, options: &ParseOptions) -> Vec<Arc<GreenToken>> {
    let buffer = SourceBuffer::new(source);
    let mut lexer = Lexer::new(&buffer, options);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.lex(LexerMode::Syntax);
        let done = token.kind() == SyntaxKind::EndOfFile;
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}

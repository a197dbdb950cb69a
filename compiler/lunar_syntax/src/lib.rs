//! Syntax tree model for the Lunar front end.
//!
//! # Architecture
//!
//! - [`SyntaxKind`]: one closed enum for every token and node kind
//! - [`GreenToken`] / [`GreenNode`]: immutable, `Arc`-shared, width-only
//!   elements produced by the lexer and parser
//! - [`SyntaxNode`] / [`SyntaxToken`]: positioned red views, built lazily
//! - [`Trivia`]: whitespace, comments and structured trivia attached to
//!   tokens, so the tree reproduces its source byte for byte
//! - [`ParseOptions`]: language version and feature gates
//!
//! # Invariants
//!
//! - Concatenating every token's full text in document order yields the
//!   source exactly.
//! - Every diagnostic lives on the narrowest element that covers it, and
//!   every ancestor reports `contains_diagnostics()`.

mod green;
mod kind;
mod options;
mod red;
mod span;
mod trivia;
mod value;

pub use green::{ElementFlags, GreenElement, GreenNode, GreenToken};
pub use kind::SyntaxKind;
pub use options::{Feature, LanguageVersion, ParseOptions, UnknownLanguageVersion};
pub use red::{LocatedDiagnostic, SyntaxElement, SyntaxNode, SyntaxToken, SyntaxTree};
pub use span::{text_width, Span};
pub use trivia::{long_bracket_level, Trivia, TriviaKind, TriviaList};
pub use value::TokenValue;

//! Error recovery for the parser.
//!
//! Token sets with O(1) membership, and skipping: tokens the grammar
//! cannot place are folded into one `SkippedTokensTrivia` node that
//! becomes leading trivia of the next token, so no source text is lost.

use std::sync::Arc;

use lunar_diagnostic::Diagnostic;
use lunar_syntax::{
    GreenElement, GreenNode, GreenToken, SyntaxKind, Trivia, TriviaKind, TriviaList,
};
use tracing::trace;

use crate::Parser;

/// A set of token kinds.
///
/// Each bit of the `u128` corresponds to a token kind's index; token kinds
/// all sit below [`SyntaxKind::FIRST_NODE`], which is at most 128.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TokenSet(u128);

impl TokenSet {
    #[inline]
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u128;
        let mut i = 0;
        while i < kinds.len() {
            bits |= 1u128 << kinds[i].index();
            i += 1;
        }
        TokenSet(bits)
    }

    #[inline]
    #[must_use]
    pub const fn with(self, kind: SyntaxKind) -> Self {
        TokenSet(self.0 | (1u128 << kind.index()))
    }

    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        TokenSet(self.0 | other.0)
    }

    /// Node kinds are never members.
    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        kind.is_token() && (self.0 & (1u128 << kind.index())) != 0
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn count(&self) -> u32 {
        self.0.count_ones()
    }
}

/// Tokens that can begin an expression.
pub(crate) const EXPRESSION_START: TokenSet = TokenSet::new(&[
    SyntaxKind::Identifier,
    SyntaxKind::NumericLiteral,
    SyntaxKind::StringLiteral,
    SyntaxKind::InterpolatedStringStart,
    SyntaxKind::NilKeyword,
    SyntaxKind::TrueKeyword,
    SyntaxKind::FalseKeyword,
    SyntaxKind::DotDotDot,
    SyntaxKind::FunctionKeyword,
    SyntaxKind::OpenBrace,
    SyntaxKind::OpenParen,
    SyntaxKind::NotKeyword,
    SyntaxKind::Hash,
    SyntaxKind::Minus,
    SyntaxKind::Tilde,
]);

/// Keywords that begin a statement other than an expression statement.
pub(crate) const STATEMENT_KEYWORDS: TokenSet = TokenSet::new(&[
    SyntaxKind::LocalKeyword,
    SyntaxKind::FunctionKeyword,
    SyntaxKind::DoKeyword,
    SyntaxKind::WhileKeyword,
    SyntaxKind::RepeatKeyword,
    SyntaxKind::IfKeyword,
    SyntaxKind::ElseIfKeyword,
    SyntaxKind::ForKeyword,
    SyntaxKind::ReturnKeyword,
    SyntaxKind::BreakKeyword,
    SyntaxKind::GotoKeyword,
    SyntaxKind::ColonColon,
    SyntaxKind::Semicolon,
]);

/// Tokens that can begin a statement.
pub(crate) const STATEMENT_START: TokenSet = STATEMENT_KEYWORDS.union(EXPRESSION_START);

/// Every token that closes a block somewhere in the grammar.
pub(crate) const BLOCK_END: TokenSet = TokenSet::new(&[
    SyntaxKind::EndKeyword,
    SyntaxKind::ElseKeyword,
    SyntaxKind::ElseIfKeyword,
    SyntaxKind::UntilKeyword,
]);

/// Where skipping inside a table constructor stops.
pub(crate) const TABLE_FIELD_RECOVERY: TokenSet = TokenSet::new(&[
    SyntaxKind::Comma,
    SyntaxKind::Semicolon,
    SyntaxKind::CloseBrace,
    SyntaxKind::CloseParen,
    SyntaxKind::CloseBracket,
])
.union(STATEMENT_KEYWORDS)
.union(BLOCK_END);

impl Parser<'_> {
    /// Skip tokens until one in `stop` or end of file, folding them into
    /// skipped-tokens trivia of the token where skipping stopped.
    ///
    /// Returns `false` when nothing was skipped.
    pub(crate) fn skip_until(&mut self, stop: TokenSet, diagnostic: Diagnostic) -> bool {
        let start = self.cursor.position();
        self.advance_until(stop);
        self.fold_skipped(start, diagnostic)
    }

    /// Like [`skip_until`](Self::skip_until), but the current token is
    /// skipped even when it is in `stop`. End of file is never skipped.
    pub(crate) fn skip_past(&mut self, stop: TokenSet, diagnostic: Diagnostic) -> bool {
        let start = self.cursor.position();
        if !self.cursor.is_at_end() {
            self.cursor.advance();
        }
        self.advance_until(stop);
        self.fold_skipped(start, diagnostic)
    }

    fn advance_until(&mut self, stop: TokenSet) {
        while !self.cursor.is_at_end() && !stop.contains(self.cursor.current_kind()) {
            self.cursor.advance();
        }
    }

    fn fold_skipped(&mut self, start: usize, diagnostic: Diagnostic) -> bool {
        if self.cursor.position() == start {
            return false;
        }
        let skipped = self.cursor.take_since(start);
        trace!(count = skipped.len(), code = %diagnostic.code, "skipped tokens");
        self.cursor.prefix_current(skipped_trivia(skipped, diagnostic));
        true
    }
}

/// A `SkippedTokensTrivia` over `tokens`. The diagnostic covers the
/// skipped text without its outer trivia.
pub(crate) fn skipped_trivia(tokens: Vec<Arc<GreenToken>>, diagnostic: Diagnostic) -> Trivia {
    let leading = tokens.first().map_or(0, |t| t.leading_width());
    let trailing = tokens.last().map_or(0, |t| t.trailing_width());
    let slots = tokens.into_iter().map(|t| Some(t.into())).collect();
    skipped_structure(slots, leading, trailing, diagnostic)
}

fn skipped_structure(
    slots: Vec<Option<GreenElement>>,
    leading: u32,
    trailing: u32,
    diagnostic: Diagnostic,
) -> Trivia {
    let full_width: u32 = slots.iter().flatten().map(GreenElement::full_width).sum();
    let diagnostic = Diagnostic {
        offset: leading,
        width: full_width.saturating_sub(leading + trailing),
        ..diagnostic
    };
    let node =
        GreenNode::with_diagnostics(SyntaxKind::SkippedTokensTrivia, slots, vec![diagnostic]);
    Trivia::structured(TriviaKind::SkippedTokens, Arc::new(node))
}

/// A missing `kind` whose leading trivia holds `tokens` as skipped tokens.
/// Used where the grammar consumes tokens it then has to discard.
pub(crate) fn missing_after_skipped(
    kind: SyntaxKind,
    tokens: Vec<Arc<GreenToken>>,
    diagnostic: Diagnostic,
) -> Arc<GreenToken> {
    missing_with_skipped(kind, skipped_trivia(tokens, diagnostic))
}

/// Like [`missing_after_skipped`], for a subtree that was already built.
/// The subtree keeps its shape and its own diagnostics inside the trivia.
pub(crate) fn missing_after_skipped_node(
    kind: SyntaxKind,
    node: Arc<GreenNode>,
    diagnostic: Diagnostic,
) -> Arc<GreenToken> {
    let leading = node.first_token().map_or(0, |t| t.leading_width());
    let trailing = node.last_token().map_or(0, |t| t.trailing_width());
    let trivia = skipped_structure(vec![Some(node.into())], leading, trailing, diagnostic);
    missing_with_skipped(kind, trivia)
}

fn missing_with_skipped(kind: SyntaxKind, skipped: Trivia) -> Arc<GreenToken> {
    let mut leading = TriviaList::new();
    leading.push(skipped);
    Arc::new(GreenToken::missing_with_leading(kind, leading, Vec::new()))
}

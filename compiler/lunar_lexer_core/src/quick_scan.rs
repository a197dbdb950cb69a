//! Quick-scan DFA for the common case.
//!
//! Most tokens are short identifiers, integers or single punctuation
//! followed by a space or a line break. The quick scanner recognizes that
//! shape with one table lookup per byte: it consumes one token plus its
//! trailing whitespace and at most one line ending, and reports what it
//! saw. Anything needing real look-ahead (escapes, fractions, exponents,
//! multi-byte operators, comments, non-ASCII) lands in `Bad`, and the full
//! lexer rescans from the unchanged position.
//!
//! The scanner only reads; callers advance their own cursor on success.

use crate::char_class::{classify, CharFlag, FLAG_COUNT};
use crate::Cursor;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum QuickScanState {
    Initial,
    FollowingWhite,
    FollowingCR,
    Identifier,
    Number,
    Punctuation,
    Dot,
    DoubledDot,
    Equals,
    CompoundPunctuationStart,
    /// Consume the current byte, then stop.
    DoneAfterNext,
    /// Stop before the current byte.
    Done,
    /// Give up; the full lexer handles this token.
    Bad,
}

impl QuickScanState {
    const fn is_token(self) -> bool {
        matches!(
            self,
            QuickScanState::Identifier
                | QuickScanState::Number
                | QuickScanState::Punctuation
                | QuickScanState::Dot
                | QuickScanState::DoubledDot
                | QuickScanState::Equals
                | QuickScanState::CompoundPunctuationStart
        )
    }
}

/// Shape of the token the quick scanner accepted.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum QuickKind {
    /// Identifier or keyword.
    Identifier,
    /// Decimal digits only.
    Integer,
    /// One byte from the punctuation class.
    Punctuation,
    /// `.`
    Dot,
    /// `..`
    DoubledDot,
    /// `=`
    Equals,
    /// A lone compound-operator start byte (`<`, `+`, `:` ...).
    CompoundPunctuation,
}

/// A token accepted by [`quick_scan`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct QuickToken {
    pub kind: QuickKind,
    /// Width of the token text.
    pub token_len: u32,
    /// Width of the trailing whitespace run.
    pub whitespace_len: u32,
    /// Width of the trailing line ending (0, 1 or 2).
    pub newline_len: u32,
}

impl QuickToken {
    /// Total bytes consumed: token plus trailing trivia.
    pub fn total_len(&self) -> u32 {
        self.token_len + self.whitespace_len + self.newline_len
    }
}

use QuickScanState::{
    Bad, CompoundPunctuationStart, Done, DoneAfterNext, Dot, DoubledDot, Equals, FollowingCR,
    FollowingWhite, Identifier, Number, Punctuation,
};

/// Number of states with outgoing transitions (`Initial` through
/// `CompoundPunctuationStart`).
const ACTIVE_STATES: usize = 10;

/// `[state][flag] -> state`.
///
/// Columns: White, CR, LF, Letter, Digit, Punctuation, Dot, Equals,
/// CompoundPunctuationStart, Complex, EndOfFile.
#[rustfmt::skip]
static TRANSITIONS: [[QuickScanState; FLAG_COUNT]; ACTIVE_STATES] = [
    // Initial
    [Bad, Bad, Bad, Identifier, Number, Punctuation, Dot, Equals, CompoundPunctuationStart, Bad, Bad],
    // FollowingWhite: a comment may follow, so complex bytes bail out
    [FollowingWhite, FollowingCR, DoneAfterNext, Done, Done, Done, Done, Done, Done, Bad, Done],
    // FollowingCR
    [Done, Done, DoneAfterNext, Done, Done, Done, Done, Done, Done, Done, Done],
    // Identifier
    [FollowingWhite, FollowingCR, DoneAfterNext, Identifier, Identifier, Done, Done, Done, Done, Bad, Done],
    // Number: letters (hex, exponents) and dots (fractions) need the full lexer
    [FollowingWhite, FollowingCR, DoneAfterNext, Bad, Number, Done, Bad, Done, Done, Bad, Done],
    // Punctuation
    [FollowingWhite, FollowingCR, DoneAfterNext, Done, Done, Done, Done, Done, Done, Bad, Done],
    // Dot: `.5` is a number, `..` continues
    [FollowingWhite, FollowingCR, DoneAfterNext, Done, Bad, Done, DoubledDot, Done, Done, Bad, Done],
    // DoubledDot: `...` and `..=` need the full lexer
    [FollowingWhite, FollowingCR, DoneAfterNext, Done, Done, Done, Bad, Bad, Done, Bad, Done],
    // Equals: `==` and `=>`
    [FollowingWhite, FollowingCR, DoneAfterNext, Done, Done, Done, Done, Bad, Bad, Bad, Done],
    // CompoundPunctuationStart: any second operator byte may extend the token
    [FollowingWhite, FollowingCR, DoneAfterNext, Done, Done, Done, Done, Bad, Bad, Bad, Done],
];

/// Try to scan one simple token starting at `cursor`.
///
/// Returns `None` when the input needs the full lexer. The cursor is not
/// moved either way.
pub fn quick_scan(cursor: &Cursor<'_>) -> Option<QuickToken> {
    let mut scan = *cursor;
    let start = scan.pos();
    let mut state = QuickScanState::Initial;
    let mut token: Option<(QuickScanState, u32)> = None;

    loop {
        let flag = if scan.is_eof() {
            CharFlag::EndOfFile
        } else {
            classify(scan.current())
        };
        let next = TRANSITIONS[state as usize][flag as usize];

        if state.is_token() && !next.is_token() {
            token = Some((state, scan.pos()));
        }

        match next {
            Done => break,
            DoneAfterNext => {
                scan.advance();
                break;
            }
            Bad => return None,
            _ => {
                scan.advance();
                state = next;
            }
        }
    }

    let (token_state, token_end) = token?;
    let kind = match token_state {
        Identifier => QuickKind::Identifier,
        Number => QuickKind::Integer,
        Punctuation => QuickKind::Punctuation,
        Dot => QuickKind::Dot,
        DoubledDot => QuickKind::DoubledDot,
        Equals => QuickKind::Equals,
        CompoundPunctuationStart => QuickKind::CompoundPunctuation,
        _ => return None,
    };

    let trailing = scan.slice(token_end, scan.pos()).as_bytes();
    let whitespace = trailing
        .iter()
        .take_while(|&&b| classify(b) == CharFlag::White)
        .count();
    let whitespace_len = u32::try_from(whitespace).ok()?;

    Some(QuickToken {
        kind,
        token_len: token_end - start,
        whitespace_len,
        newline_len: scan.pos() - token_end - whitespace_len,
    })
}

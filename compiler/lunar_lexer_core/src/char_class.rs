//! Byte classification for the quick scanner.
//!
//! Each byte maps to exactly one [`CharFlag`]. The table is built at compile
//! time, so classification is a single indexed load.

/// Quick-scan character class.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum CharFlag {
    /// Space, tab, vertical tab, form feed.
    White,
    CR,
    LF,
    /// ASCII letters and `_`.
    Letter,
    Digit,
    /// Single-byte punctuation that never starts a longer token.
    Punctuation,
    Dot,
    Equals,
    /// Punctuation that may start a compound operator (`<=`, `//`, `+=`).
    CompoundPunctuationStart,
    /// Needs the full lexer: quotes, `-`, `[`, non-ASCII, control bytes.
    Complex,
    /// The sentinel at the end of input.
    EndOfFile,
}

pub const FLAG_COUNT: usize = 11;

static CHAR_FLAGS: [CharFlag; 256] = {
    let mut table = [CharFlag::Complex; 256];
    let mut i = 0;
    while i < 256 {
        #[allow(clippy::cast_possible_truncation, reason = "i < 256")]
        let c = i as u8;
        table[i] = match c {
            b' ' | b'\t' | 0x0B | 0x0C => CharFlag::White,
            b'\r' => CharFlag::CR,
            b'\n' => CharFlag::LF,
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => CharFlag::Letter,
            b'0'..=b'9' => CharFlag::Digit,
            b'(' | b')' | b'{' | b'}' | b']' | b',' | b';' | b'#' => CharFlag::Punctuation,
            b'.' => CharFlag::Dot,
            b'=' => CharFlag::Equals,
            b'+' | b'*' | b'/' | b'%' | b'^' | b'&' | b'|' | b'<' | b'>' | b'~' | b':' => {
                CharFlag::CompoundPunctuationStart
            }
            _ => CharFlag::Complex,
        };
        i += 1;
    }
    table
};

/// Class of `byte` when it is source content. The sentinel is classified by
/// the caller, which knows whether the cursor is at end of input.
#[inline]
pub fn classify(byte: u8) -> CharFlag {
    CHAR_FLAGS[byte as usize]
}

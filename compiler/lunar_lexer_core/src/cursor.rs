//! Byte cursor over a sentinel-terminated buffer.
//!
//! The cursor advances byte-by-byte. End of input is reached when the
//! current byte is the sentinel (`0x00`) *and* the position has reached the
//! source length; a NUL before that point is ordinary (bad) input.
//!
//! Reads past the padded buffer return `0`, so look-ahead never panics.

/// Position over a [`SourceBuffer`](crate::SourceBuffer).
///
/// `Copy`, so speculative scanning is `let saved = cursor;` followed by
/// `cursor = saved;` on failure.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    text: &'a str,
    buf: &'a [u8],
    pos: u32,
    source_len: u32,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str, buf: &'a [u8], source_len: u32) -> Self {
        debug_assert!(
            (source_len as usize) < buf.len(),
            "sentinel must be within buffer bounds"
        );
        Cursor {
            text,
            buf,
            pos: 0,
            source_len,
        }
    }

    /// Byte at the current position (`0` at end of input).
    #[inline]
    pub fn current(&self) -> u8 {
        self.peek_at(0)
    }

    #[inline]
    pub fn peek(&self) -> u8 {
        self.peek_at(1)
    }

    #[inline]
    pub fn peek2(&self) -> u8 {
        self.peek_at(2)
    }

    /// Byte `n` positions ahead (`0` past the end).
    #[inline]
    pub fn peek_at(&self, n: u32) -> u8 {
        self.buf
            .get(self.pos as usize + n as usize)
            .copied()
            .unwrap_or(0)
    }

    #[inline]
    pub fn advance(&mut self) {
        self.advance_n(1);
    }

    /// Advance `n` bytes, stopping at the sentinel.
    #[inline]
    pub fn advance_n(&mut self, n: u32) {
        self.pos = self.pos.saturating_add(n).min(self.source_len);
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.source_len
    }

    #[inline]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Move back (or forward) to `pos`, which must be a character boundary
    /// obtained from this cursor.
    #[inline]
    pub fn reset_to(&mut self, pos: u32) {
        self.pos = pos.min(self.source_len);
    }

    #[inline]
    pub fn source_len(&self) -> u32 {
        self.source_len
    }

    /// Source text between two positions. Empty if the range is not on
    /// character boundaries.
    pub fn slice(&self, start: u32, end: u32) -> &'a str {
        debug_assert!(start <= end, "slice start {start} exceeds end {end}");
        self.text.get(start as usize..end as usize).unwrap_or("")
    }

    /// Source text from `start` to the current position.
    pub fn slice_from(&self, start: u32) -> &'a str {
        self.slice(start, self.pos)
    }

    /// Unscanned source bytes, sentinel excluded.
    pub fn rest(&self) -> &'a [u8] {
        let end = self.source_len as usize;
        self.buf.get(self.pos as usize..end).unwrap_or(&[])
    }

    /// Whether the unscanned input starts with `prefix`.
    #[inline]
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.rest().starts_with(prefix)
    }

    #[inline]
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while !self.is_eof() && pred(self.current()) {
            self.pos += 1;
        }
    }

    /// Width of the UTF-8 sequence introduced by `byte`.
    #[inline]
    pub fn utf8_char_width(byte: u8) -> u32 {
        match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        }
    }

    /// The character at the current position.
    pub fn current_char(&self) -> Option<char> {
        self.text.get(self.pos as usize..)?.chars().next()
    }

    /// Advance past one whole character.
    #[inline]
    pub fn advance_char(&mut self) {
        let width = Self::utf8_char_width(self.current());
        self.advance_n(width);
    }

    /// Advance to the next `\n` or `\r` (or end of input) without
    /// consuming it.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "offsets within rest() fit in u32 because source_len does"
    )]
    pub fn eat_until_line_end(&mut self) {
        match memchr::memchr2(b'\n', b'\r', self.rest()) {
            Some(offset) => self.pos += offset as u32,
            None => self.pos = self.source_len,
        }
    }

    /// Advance to the next occurrence of `byte`, returning `false` (and
    /// moving to end of input) when there is none.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "offsets within rest() fit in u32 because source_len does"
    )]
    pub fn skip_to(&mut self, byte: u8) -> bool {
        match memchr::memchr(byte, self.rest()) {
            Some(offset) => {
                self.pos += offset as u32;
                true
            }
            None => {
                self.pos = self.source_len;
                false
            }
        }
    }

    /// Consume one line ending (`\r\n`, `\n\r`, `\n` or `\r`) if present,
    /// returning its width.
    ///
    /// `\n\r` is a single line ending only when `lua_pairs` is set, which is
    /// what Lua's own scanner does inside long strings.
    pub fn eat_line_ending(&mut self, lua_pairs: bool) -> u32 {
        let width = match (self.current(), self.peek()) {
            (b'\r', b'\n') => 2,
            (b'\n', b'\r') if lua_pairs => 2,
            (b'\n' | b'\r', _) if !self.is_eof() => 1,
            _ => 0,
        };
        self.advance_n(width);
        width
    }
}

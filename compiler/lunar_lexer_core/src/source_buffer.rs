//! Sentinel-terminated source buffer.
//!
//! The buffer keeps a `0x00` sentinel byte after the source content so the
//! scanners can detect the end of input without explicit bounds checks in
//! their hot loops. The total size is rounded up to the next 64-byte
//! boundary, which also gives `peek()` room near the end.
//!
//! A NUL byte inside the source is legal input (it becomes a bad token).
//! The cursor tells it apart from the sentinel by comparing its position
//! with the source length.

use crate::Cursor;

/// Cache line size in bytes, used for buffer alignment padding.
const CACHE_LINE: usize = 64;

/// # Layout
///
/// ```text
/// [source_bytes..., 0x00, padding_zeros...]
///  ^                ^     ^
///  0                |     rounded up to 64-byte boundary
///              source_len (sentinel)
/// ```
#[derive(Clone, Debug)]
pub struct SourceBuffer {
    /// `[source_bytes..., 0x00 sentinel, 0x00 padding...]`.
    buf: Vec<u8>,
    /// The source as text, for zero-copy slicing of token text.
    text: Box<str>,
    /// Length of the source content (excludes sentinel and padding).
    source_len: u32,
}

impl SourceBuffer {
    /// Copy `source` into a padded, sentinel-terminated buffer.
    ///
    /// Sources larger than `u32::MAX` bytes are truncated at the last
    /// character boundary below that size.
    pub fn new(source: &str) -> Self {
        let mut len = source.len().min(u32::MAX as usize - CACHE_LINE);
        while !source.is_char_boundary(len) {
            len -= 1;
        }
        let source = &source[..len];

        // Round up to the next 64-byte boundary (minimum: source + sentinel).
        let padded_len = (len + 1 + CACHE_LINE - 1) & !(CACHE_LINE - 1);
        let mut buf = vec![0u8; padded_len];
        buf[..len].copy_from_slice(source.as_bytes());

        SourceBuffer {
            buf,
            text: source.into(),
            source_len: u32::try_from(len).unwrap_or(u32::MAX),
        }
    }

    /// The source bytes (without sentinel or padding).
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.source_len as usize]
    }

    /// The full buffer, sentinel and padding included.
    pub fn as_sentinel_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// A [`Cursor`] positioned at byte 0.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.text, &self.buf, self.source_len)
    }

    /// Length of the source content in bytes.
    pub fn len(&self) -> u32 {
        self.source_len
    }

    pub fn is_empty(&self) -> bool {
        self.source_len == 0
    }
}

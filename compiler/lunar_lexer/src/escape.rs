//! Escape sequences in quoted strings.
//!
//! | Escape | Value |
//! |---|---|
//! | `\a \b \f \n \r \t \v` | control bytes |
//! | `\\ \" \'` | the character |
//! | `\` line break | `\n` |
//! | `\z` | skips following whitespace, line breaks included |
//! | `\ddd` | byte, at most 255 |
//! | `\xHH` | byte |
//! | `\u{H..}` | code point up to 2^31-1, extended UTF-8 |
//!
//! Invalid escapes are reported and kept verbatim in the value.

use lunar_diagnostic::ErrorCode;
use lunar_syntax::Feature;

use crate::lexer::Lexer;

/// Largest code point `\u{...}` accepts.
const MAX_UNICODE_ESCAPE: u64 = 0x7FFF_FFFF;

fn simple_escape(byte: u8) -> Option<u8> {
    let value = match byte {
        b'a' => 0x07,
        b'b' => 0x08,
        b'f' => 0x0C,
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'v' => 0x0B,
        b'\\' | b'"' | b'\'' => byte,
        _ => return None,
    };
    Some(value)
}

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Encode `value` the way Lua does for `\u{...}`: standard UTF-8 up to
/// U+10FFFF, and the original 5- and 6-byte forms above that.
#[allow(
    clippy::cast_possible_truncation,
    reason = "each pushed byte is masked or shifted into range"
)]
pub(crate) fn push_extended_utf8(value: u32, out: &mut Vec<u8>) {
    if value < 0x80 {
        out.push(value as u8);
        return;
    }
    let mut buf = [0u8; 8];
    let mut at = buf.len();
    let mut rest = value;
    // Largest value that still fits in the first byte.
    let mut first_max: u32 = 0x3F;
    loop {
        at -= 1;
        buf[at] = 0x80 | (rest & 0x3F) as u8;
        rest >>= 6;
        first_max >>= 1;
        if rest <= first_max {
            break;
        }
    }
    at -= 1;
    buf[at] = ((!first_max << 1) | rest) as u8;
    out.extend_from_slice(&buf[at..]);
}

impl Lexer<'_> {
    /// At `\`: decode one escape into `value`.
    ///
    /// An escaped line break starts a continuation line; its offset in
    /// `value` is recorded in `line_starts`.
    pub(crate) fn scan_escape(&mut self, value: &mut Vec<u8>, line_starts: &mut Vec<usize>) {
        let start = self.cursor.pos();
        self.cursor.advance();
        if self.cursor.is_eof() {
            // The enclosing string reports the missing quote.
            value.push(b'\\');
            return;
        }

        let byte = self.cursor.current();
        if let Some(decoded) = simple_escape(byte) {
            self.cursor.advance();
            value.push(decoded);
            return;
        }

        match byte {
            b'\r' | b'\n' => {
                self.cursor.eat_line_ending(true);
                value.push(b'\n');
                line_starts.push(value.len());
            }
            b'z' => {
                self.cursor.advance();
                self.gate(Feature::WhitespaceEscapes, start, self.cursor.pos());
                self.cursor.eat_while(|b| b.is_ascii_whitespace() || b == 0x0B);
            }
            b'0'..=b'9' => self.scan_decimal_escape(start, value),
            b'x' => self.scan_hex_escape(start, value),
            b'u' => self.scan_unicode_escape(start, value),
            _ => {
                self.cursor.advance_char();
                self.invalid_escape(ErrorCode::E0005, start, value);
            }
        }
    }

    /// Report the escape `start..cursor` and keep its text.
    fn invalid_escape(&mut self, code: ErrorCode, start: u32, value: &mut Vec<u8>) {
        let text = self.cursor.slice_from(start);
        value.extend_from_slice(text.as_bytes());
        self.report(code, start, self.cursor.pos())
            .args
            .push(text.to_string());
    }

    fn scan_decimal_escape(&mut self, start: u32, value: &mut Vec<u8>) {
        let mut decoded: u32 = 0;
        for _ in 0..3 {
            let byte = self.cursor.current();
            if !byte.is_ascii_digit() || self.cursor.is_eof() {
                break;
            }
            decoded = decoded * 10 + u32::from(byte - b'0');
            self.cursor.advance();
        }
        match u8::try_from(decoded) {
            Ok(byte) => value.push(byte),
            Err(_) => self.invalid_escape(ErrorCode::E0009, start, value),
        }
    }

    fn scan_hex_escape(&mut self, start: u32, value: &mut Vec<u8>) {
        self.cursor.advance();
        let high = hex_digit(self.cursor.current());
        let low = hex_digit(self.cursor.peek());
        match (high, low) {
            (Some(high), Some(low)) => {
                self.cursor.advance_n(2);
                self.gate(Feature::HexEscapes, start, self.cursor.pos());
                value.push((high << 4) | low);
            }
            (Some(_), None) => {
                self.cursor.advance();
                self.invalid_escape(ErrorCode::E0005, start, value);
            }
            _ => self.invalid_escape(ErrorCode::E0005, start, value),
        }
    }

    fn scan_unicode_escape(&mut self, start: u32, value: &mut Vec<u8>) {
        self.cursor.advance();
        if self.cursor.current() != b'{' {
            self.invalid_escape(ErrorCode::E0005, start, value);
            return;
        }
        self.cursor.advance();

        let mut code_point: u64 = 0;
        let mut digits = 0;
        while let Some(digit) = hex_digit(self.cursor.current()) {
            code_point = ((code_point << 4) | u64::from(digit)).min(MAX_UNICODE_ESCAPE + 1);
            digits += 1;
            self.cursor.advance();
        }
        if digits == 0 || self.cursor.current() != b'}' {
            self.invalid_escape(ErrorCode::E0005, start, value);
            return;
        }
        self.cursor.advance();

        match u32::try_from(code_point) {
            Ok(code_point) if u64::from(code_point) <= MAX_UNICODE_ESCAPE => {
                self.gate(Feature::UnicodeEscapes, start, self.cursor.pos());
                push_extended_utf8(code_point, value);
            }
            _ => self.invalid_escape(ErrorCode::E0010, start, value),
        }
    }
}

#[cfg(test)]
mod tests;

//! Numeric literals.
//!
//! Scanning finds the extent of the literal; the value is then computed
//! from its text by [`numeric_value`]. A numeral runs into any letters,
//! digits or underscores that follow it, so `3abc` is one malformed token
//! rather than a number and an identifier.

use lunar_diagnostic::ErrorCode;
use lunar_syntax::{Feature, TokenValue};

use crate::lexer::Lexer;

/// `2^63`, the magnitude of `i64::MIN`.
const I64_MIN_MAGNITUDE: u64 = 1 << 63;

impl Lexer<'_> {
    /// At a digit, or at `.` followed by a digit.
    pub(crate) fn scan_number(&mut self, start: u32) -> TokenValue {
        let is_hex = self.cursor.current() == b'0' && matches!(self.cursor.peek(), b'x' | b'X');
        let (well_formed, is_float) = if is_hex {
            self.cursor.advance_n(2);
            self.scan_digits(u8::is_ascii_hexdigit, b'p')
        } else {
            self.scan_digits(u8::is_ascii_digit, b'e')
        };

        // Letters glued to a numeral make the whole run malformed.
        let end_of_numeral = self.cursor.pos();
        self.cursor
            .eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
        let text = self.cursor.slice_from(start);

        let value = if well_formed && self.cursor.pos() == end_of_numeral {
            numeric_value(text)
        } else {
            None
        };
        match value {
            Some(value) => {
                if is_hex && is_float {
                    self.gate(Feature::HexFloats, start, self.cursor.pos());
                }
                value
            }
            None => {
                let text = text.to_string();
                self.report(ErrorCode::E0003, start, self.cursor.pos())
                    .args
                    .push(text);
                TokenValue::None
            }
        }
    }

    /// Digits, an optional fraction and an optional exponent introduced by
    /// `exponent` (either case). Returns `(well_formed, is_float)`.
    fn scan_digits(&mut self, is_digit: fn(&u8) -> bool, exponent: u8) -> (bool, bool) {
        let mut digits = 0;
        let mut is_float = false;
        digits += self.eat_digits(is_digit);
        if self.cursor.current() == b'.' && self.cursor.peek() != b'.' {
            self.cursor.advance();
            is_float = true;
            digits += self.eat_digits(is_digit);
        }
        if digits == 0 {
            return (false, is_float);
        }
        if self.cursor.current().to_ascii_lowercase() == exponent {
            self.cursor.advance();
            is_float = true;
            if matches!(self.cursor.current(), b'+' | b'-') {
                self.cursor.advance();
            }
            if self.eat_digits(u8::is_ascii_digit) == 0 {
                return (false, is_float);
            }
        }
        (true, is_float)
    }

    fn eat_digits(&mut self, is_digit: fn(&u8) -> bool) -> u32 {
        let start = self.cursor.pos();
        self.cursor.eat_while(|b| is_digit(&b));
        self.cursor.pos() - start
    }
}

/// Value of a well-formed numeral.
///
/// Decimal integers up to `i64::MAX` are `Integer`, exactly 2^63 is
/// `UnsignedInteger` (so that `-9223372036854775808` can be folded later),
/// and larger ones become `Float`. Hexadecimal integers wrap modulo 2^64.
pub fn numeric_value(text: &str) -> Option<TokenValue> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return hex_value(hex);
    }
    if text.bytes().any(|b| matches!(b, b'.' | b'e' | b'E')) {
        return decimal_float(text).map(TokenValue::Float);
    }
    let magnitude = match text.parse::<u64>() {
        Ok(magnitude) => magnitude,
        Err(_) => return decimal_float(text).map(TokenValue::Float),
    };
    let value = match i64::try_from(magnitude) {
        Ok(value) => TokenValue::Integer(value),
        Err(_) if magnitude == I64_MIN_MAGNITUDE => TokenValue::UnsignedInteger(magnitude),
        Err(_) => TokenValue::Float(u64_to_f64(magnitude)),
    };
    Some(value)
}

#[allow(
    clippy::cast_precision_loss,
    reason = "integers past i64 become floats, as in Lua"
)]
fn u64_to_f64(value: u64) -> f64 {
    value as f64
}

#[allow(
    clippy::cast_possible_wrap,
    reason = "hexadecimal integers wrap around, as in Lua 5.3"
)]
fn wrap_to_i64(value: u64) -> i64 {
    value as i64
}

/// Parse a decimal float, filling in the digits Rust's grammar needs
/// around a bare `.`.
fn decimal_float(text: &str) -> Option<f64> {
    let mut normalized = String::with_capacity(text.len() + 2);
    if text.starts_with('.') {
        normalized.push('0');
    }
    let mut bytes = text.bytes().peekable();
    while let Some(byte) = bytes.next() {
        normalized.push(char::from(byte));
        if byte == b'.' && !bytes.peek().is_some_and(u8::is_ascii_digit) {
            normalized.push('0');
        }
    }
    normalized.parse().ok()
}

fn hex_value(text: &str) -> Option<TokenValue> {
    let (mantissa, exponent) = match text.find(['p', 'P']) {
        Some(at) => (&text[..at], Some(&text[at + 1..])),
        None => (text, None),
    };
    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (mantissa, None),
    };

    if fraction.is_none() && exponent.is_none() {
        let mut value: u64 = 0;
        for digit in whole.chars() {
            value = value.wrapping_mul(16).wrapping_add(u64::from(digit.to_digit(16)?));
        }
        return Some(TokenValue::Integer(wrap_to_i64(value)));
    }

    let mut mantissa_value = 0.0_f64;
    for digit in whole.chars().chain(fraction.unwrap_or("").chars()) {
        mantissa_value = mantissa_value * 16.0 + f64::from(digit.to_digit(16)?);
    }
    let fraction_digits = i64::try_from(fraction.map_or(0, str::len)).ok()?;
    let exponent = match exponent {
        Some(exponent) => exponent.parse::<i64>().ok()?,
        None => 0,
    };
    // Applied in two halves so that neither factor overflows on its own.
    let scale = exponent.saturating_sub(4 * fraction_digits).clamp(-2000, 2000);
    let scale = i32::try_from(scale).ok()?;
    let half = scale / 2;
    Some(TokenValue::Float(
        mantissa_value * 2.0_f64.powi(half) * 2.0_f64.powi(scale - half),
    ))
}

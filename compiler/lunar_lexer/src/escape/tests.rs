use lunar_diagnostic::ErrorCode;
use lunar_syntax::{LanguageVersion, ParseOptions, SyntaxKind};
use pretty_assertions::assert_eq;

use super::*;
use crate::tokenize;

/// Decoded value and diagnostic codes of the first token.
fn string(source: &str, version: LanguageVersion) -> (Vec<u8>, Vec<ErrorCode>) {
    let tokens = tokenize(source, &ParseOptions::new(version));
    let token = &tokens[0];
    assert_eq!(token.kind(), SyntaxKind::StringLiteral, "{source}");
    let value = token.value().as_bytes().unwrap_or_default().to_vec();
    let codes = token.diagnostics().iter().map(|d| d.code).collect();
    (value, codes)
}

fn utf8(value: u32) -> Vec<u8> {
    let mut out = Vec::new();
    push_extended_utf8(value, &mut out);
    out
}

// === Extended UTF-8 ===

#[test]
fn standard_utf8_range() {
    assert_eq!(utf8(0x41), b"A".to_vec());
    assert_eq!(utf8(0xE9), "é".as_bytes().to_vec());
    assert_eq!(utf8(0x20AC), "€".as_bytes().to_vec());
    assert_eq!(utf8(0x1F600), "😀".as_bytes().to_vec());
}

#[test]
fn surrogates_encode_like_any_other_value() {
    assert_eq!(utf8(0xD800), vec![0xED, 0xA0, 0x80]);
}

#[test]
fn five_and_six_byte_forms() {
    assert_eq!(utf8(0x0020_0000), vec![0xF8, 0x88, 0x80, 0x80, 0x80]);
    assert_eq!(utf8(0x7FFF_FFFF), vec![0xFD, 0xBF, 0xBF, 0xBF, 0xBF, 0xBF]);
}

// === Decoding ===

#[test]
fn simple_escapes() {
    let (value, codes) = string(r#""\a\b\f\n\r\t\v\\\"\'""#, LanguageVersion::Lua54);
    assert_eq!(value, b"\x07\x08\x0C\n\r\t\x0B\\\"'".to_vec());
    assert!(codes.is_empty());
}

#[test]
fn numeric_escapes() {
    let (value, codes) = string(r#""\65\x41\u{48}\0""#, LanguageVersion::Lua54);
    assert_eq!(value, b"AAH\0".to_vec());
    assert!(codes.is_empty());
}

#[test]
fn decimal_escape_reads_at_most_three_digits() {
    let (value, _) = string(r"'\0651'", LanguageVersion::Lua54);
    assert_eq!(value, b"A1".to_vec());
}

#[test]
fn decimal_escape_too_large_is_kept() {
    let (value, codes) = string(r"'\256'", LanguageVersion::Lua54);
    assert_eq!(value, br"\256".to_vec());
    assert_eq!(codes, vec![ErrorCode::E0009]);
}

#[test]
fn unknown_escape_is_kept() {
    let tokens = tokenize(r"'a\qb'", &ParseOptions::default());
    assert_eq!(tokens[0].value().as_bytes(), Some(&br"a\qb"[..]));
    let diagnostic = &tokens[0].diagnostics()[0];
    assert_eq!(diagnostic.code, ErrorCode::E0005);
    assert_eq!(diagnostic.args, vec![r"\q".to_string()]);
    assert_eq!((diagnostic.offset, diagnostic.width), (2, 2));
}

#[test]
fn malformed_hex_escape() {
    let (value, codes) = string(r"'\xZ'", LanguageVersion::Lua54);
    assert_eq!(value, br"\xZ".to_vec());
    assert_eq!(codes, vec![ErrorCode::E0005]);
}

#[test]
fn hex_escape_is_gated() {
    let (value, codes) = string(r"'\x41'", LanguageVersion::Lua51);
    assert_eq!(value, b"A".to_vec());
    assert_eq!(codes, vec![ErrorCode::E2001]);
}

#[test]
fn unicode_escape_out_of_range() {
    let (value, codes) = string(r"'\u{80000000}'", LanguageVersion::Lua54);
    assert_eq!(value, br"\u{80000000}".to_vec());
    assert_eq!(codes, vec![ErrorCode::E0010]);
}

#[test]
fn unicode_escape_without_braces() {
    let (_, codes) = string(r"'\u48'", LanguageVersion::Lua54);
    assert_eq!(codes, vec![ErrorCode::E0005]);
}

#[test]
fn whitespace_escape_skips_line_breaks() {
    let (value, codes) = string("'a\\z  \n\t  b'", LanguageVersion::Lua54);
    assert_eq!(value, b"ab".to_vec());
    assert!(codes.is_empty());

    let (_, codes) = string("'a\\z b'", LanguageVersion::Lua51);
    assert_eq!(codes, vec![ErrorCode::E2001]);
}

#[test]
fn escaped_line_break_continues_the_string() {
    let (value, codes) = string("'a\\\r\nb'", LanguageVersion::Lua54);
    assert_eq!(value, b"a\nb".to_vec());
    assert!(codes.is_empty());
}

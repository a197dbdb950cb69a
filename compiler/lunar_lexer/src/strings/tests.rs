use std::sync::Arc;

use lunar_diagnostic::ErrorCode;
use lunar_syntax::{GreenToken, LanguageVersion, ParseOptions, SyntaxKind, TokenValue};
use pretty_assertions::assert_eq;

use crate::tokenize;

fn lex(source: &str, version: LanguageVersion) -> Vec<Arc<GreenToken>> {
    tokenize(source, &ParseOptions::new(version))
}

fn kinds(tokens: &[Arc<GreenToken>]) -> Vec<SyntaxKind> {
    tokens.iter().map(|t| t.kind()).collect()
}

fn text_value(token: &GreenToken) -> &str {
    token.value().as_str().unwrap_or("<not utf-8>")
}

// === Quoted strings ===

#[test]
fn both_quote_styles() {
    let tokens = lex(r#"a = "x" .. 'y'"#, LanguageVersion::Lua54);
    assert_eq!(tokens[2].kind(), SyntaxKind::StringLiteral);
    assert_eq!(text_value(&tokens[2]), "x");
    assert_eq!(tokens[4].text(), "'y'");
    assert_eq!(text_value(&tokens[4]), "y");
}

#[test]
fn other_quote_inside_string() {
    let tokens = lex(r#"'say "hi"'"#, LanguageVersion::Lua54);
    assert_eq!(text_value(&tokens[0]), r#"say "hi""#);
}

#[test]
fn raw_line_break_ends_a_lua_string() {
    let tokens = lex("'abc\nx", LanguageVersion::Lua54);
    assert_eq!(tokens[0].kind(), SyntaxKind::StringLiteral);
    assert_eq!(tokens[0].text(), "'abc");
    assert_eq!(tokens[0].diagnostics()[0].code, ErrorCode::E0001);
    assert_eq!(tokens[1].text(), "x");
}

#[test]
fn unterminated_at_end_of_input() {
    let tokens = lex("'abc", LanguageVersion::Lua54);
    assert_eq!(text_value(&tokens[0]), "abc");
    let diagnostic = &tokens[0].diagnostics()[0];
    assert_eq!((diagnostic.code, diagnostic.offset, diagnostic.width), (ErrorCode::E0001, 0, 4));
}

// === Long strings ===

#[test]
fn long_string_drops_first_line_break() {
    let tokens = lex("[[\nhello\nworld]]", LanguageVersion::Lua54);
    assert_eq!(text_value(&tokens[0]), "hello\nworld");
    assert_eq!(tokens[0].long_bracket_level(), Some(0));
}

#[test]
fn long_string_levels() {
    let tokens = lex("[==[a]]b]=]c]==]", LanguageVersion::Lua54);
    assert_eq!(text_value(&tokens[0]), "a]]b]=]c");
    assert_eq!(tokens[0].long_bracket_level(), Some(2));
    assert_eq!(tokens[1].kind(), SyntaxKind::EndOfFile);
}

#[test]
fn long_string_normalizes_line_breaks() {
    let tokens = lex("[[a\r\nb\n\rc\rd]]", LanguageVersion::Lua54);
    assert_eq!(text_value(&tokens[0]), "a\nb\nc\nd");
}

#[test]
fn long_string_keeps_escapes_verbatim() {
    let tokens = lex(r"[[a\nb]]", LanguageVersion::Lua54);
    assert_eq!(text_value(&tokens[0]), r"a\nb");
}

#[test]
fn unterminated_long_string() {
    let tokens = lex("x = [=[abc", LanguageVersion::Lua54);
    let string = &tokens[2];
    assert_eq!(string.text(), "[=[abc");
    let diagnostic = &string.diagnostics()[0];
    assert_eq!((diagnostic.code, diagnostic.offset, diagnostic.width), (ErrorCode::E0008, 0, 3));
}

// === Multi-line strings ===

#[test]
fn moonscript_strings_span_lines_and_lose_indent() {
    let tokens = lex("x = \"a\n    b\n      c\"", LanguageVersion::MoonScript);
    let string = &tokens[2];
    assert_eq!(string.kind(), SyntaxKind::StringLiteral);
    assert!(string.diagnostics().is_empty());
    assert_eq!(text_value(string), "a\nb\n  c");
}

#[test]
fn blank_lines_do_not_affect_indent() {
    let tokens = lex("'a\n    b\n\n    c\n  '", LanguageVersion::MoonScript);
    assert_eq!(text_value(&tokens[0]), "a\nb\n\nc\n");
}

#[test]
fn crlf_inside_moonscript_string() {
    let tokens = lex("'a\r\n  b'", LanguageVersion::MoonScript);
    assert_eq!(text_value(&tokens[0]), "a\nb");
    assert_eq!(tokens[0].text(), "'a\r\n  b'");
}

#[test]
fn escaped_line_break_counts_as_a_line() {
    let tokens = lex("'a\\\n  b'", LanguageVersion::MoonScript);
    assert_eq!(text_value(&tokens[0]), "a\nb");
}

#[test]
fn lua_continuation_keeps_indent() {
    for version in [LanguageVersion::Lua51, LanguageVersion::Lua54, LanguageVersion::LuaJit] {
        let tokens = lex("'a\\\n  b\\\n    c'", version);
        assert_eq!(text_value(&tokens[0]), "a\n  b\n    c", "{version:?}");
    }
}

// === Interpolation ===

#[test]
fn interpolated_string_tokens() {
    let tokens = lex("\"a#{b}c\"", LanguageVersion::MoonScript);
    assert_eq!(
        kinds(&tokens),
        vec![
            SyntaxKind::InterpolatedStringStart,
            SyntaxKind::InterpolatedStringText,
            SyntaxKind::InterpolationStart,
            SyntaxKind::Identifier,
            SyntaxKind::InterpolationEnd,
            SyntaxKind::InterpolatedStringText,
            SyntaxKind::InterpolatedStringEnd,
            SyntaxKind::EndOfFile,
        ]
    );
    assert_eq!(text_value(&tokens[1]), "a");
    assert_eq!(tokens[4].text(), "}");
    assert_eq!(text_value(&tokens[5]), "c");
}

#[test]
fn table_constructor_inside_interpolation() {
    let tokens = lex("\"#{ {1} }\"", LanguageVersion::MoonScript);
    assert_eq!(
        kinds(&tokens),
        vec![
            SyntaxKind::InterpolatedStringStart,
            SyntaxKind::InterpolationStart,
            SyntaxKind::OpenBrace,
            SyntaxKind::NumericLiteral,
            SyntaxKind::CloseBrace,
            SyntaxKind::InterpolationEnd,
            SyntaxKind::InterpolatedStringEnd,
            SyntaxKind::EndOfFile,
        ]
    );
}

#[test]
fn nested_interpolated_string() {
    let tokens = lex("\"#{\"#{x}\"}\"", LanguageVersion::MoonScript);
    let starts = tokens
        .iter()
        .filter(|t| t.kind() == SyntaxKind::InterpolatedStringStart)
        .count();
    let ends = tokens
        .iter()
        .filter(|t| t.kind() == SyntaxKind::InterpolationEnd)
        .count();
    assert_eq!((starts, ends), (2, 2));
    assert!(tokens.iter().all(|t| t.diagnostics().is_empty()));
}

#[test]
fn lua_strings_do_not_interpolate() {
    let tokens = lex("\"a#{b}\"", LanguageVersion::Lua54);
    assert_eq!(kinds(&tokens), vec![SyntaxKind::StringLiteral, SyntaxKind::EndOfFile]);
    assert_eq!(text_value(&tokens[0]), "a#{b}");
}

#[test]
fn single_quotes_do_not_interpolate() {
    let tokens = lex("'#{b}'", LanguageVersion::MoonScript);
    assert_eq!(tokens[0].kind(), SyntaxKind::StringLiteral);
}

#[test]
fn unterminated_interpolation() {
    let tokens = lex("\"a#{b", LanguageVersion::MoonScript);
    assert_eq!(
        kinds(&tokens),
        vec![
            SyntaxKind::InterpolatedStringStart,
            SyntaxKind::InterpolatedStringText,
            SyntaxKind::InterpolationStart,
            SyntaxKind::Identifier,
            SyntaxKind::InterpolationEnd,
            SyntaxKind::InterpolatedStringEnd,
            SyntaxKind::EndOfFile,
        ]
    );
    assert!(tokens[4].is_missing());
    assert_eq!(tokens[4].diagnostics()[0].code, ErrorCode::E0006);
    assert!(tokens[5].is_missing());
}

#[test]
fn unterminated_interpolated_string() {
    let tokens = lex("\"a#{b}c", LanguageVersion::MoonScript);
    let end = &tokens[6];
    assert_eq!(end.kind(), SyntaxKind::InterpolatedStringEnd);
    assert!(end.is_missing());
    assert_eq!(end.diagnostics()[0].code, ErrorCode::E0001);
}

#[test]
fn indent_is_shared_across_text_segments() {
    let tokens = lex("\"a\n    #{b}\n    c\"", LanguageVersion::MoonScript);
    let texts: Vec<_> = tokens
        .iter()
        .filter(|t| t.kind() == SyntaxKind::InterpolatedStringText)
        .map(|t| t.value().clone())
        .collect();
    assert_eq!(
        texts,
        vec![TokenValue::from("a\n"), TokenValue::from("\nc")]
    );
}

#[test]
fn interpolated_tokens_reproduce_source() {
    let source = "x = \"pre #{ f({a = 1}) } mid #{y}\" -- done\n";
    let tokens = lex(source, LanguageVersion::MoonScript);
    let text: String = tokens.iter().map(|t| t.full_text()).collect();
    assert_eq!(text, source);
}

// === Property tests ===

#[allow(
    clippy::disallowed_types,
    reason = "proptest macros internally use Arc"
)]
mod proptest_long_brackets {
    use lunar_syntax::{LanguageVersion, SyntaxKind};
    use proptest::prelude::*;

    use super::{lex, text_value};

    proptest! {
        #[test]
        fn string_closes_only_at_matching_level(level in 0usize..=100, body in "[a-z ]{0,20}") {
            let equals = "=".repeat(level);
            // A closer one level short must stay part of the content.
            let inner = if level > 0 {
                format!("{body}]{}]", "=".repeat(level - 1))
            } else {
                body.clone()
            };
            let source = format!("[{equals}[{inner}]{equals}]");
            let tokens = lex(&source, LanguageVersion::Lua54);
            prop_assert_eq!(tokens.len(), 2);
            prop_assert_eq!(tokens[0].kind(), SyntaxKind::StringLiteral);
            prop_assert_eq!(tokens[0].long_bracket_level(), u32::try_from(level).ok());
            prop_assert_eq!(text_value(&tokens[0]), inner.as_str());
            prop_assert!(tokens[0].diagnostics().is_empty());
        }

        #[test]
        fn comment_closes_only_at_matching_level(level in 0usize..=100, body in "[a-z ]{0,20}") {
            let equals = "=".repeat(level);
            let source = format!("--[{equals}[{body}]{equals}]");
            let tokens = lex(&source, LanguageVersion::Lua54);
            prop_assert_eq!(tokens.len(), 1);
            prop_assert_eq!(tokens[0].kind(), SyntaxKind::EndOfFile);
            let comment = &tokens[0].leading_trivia()[0];
            prop_assert_eq!(comment.text(), source.as_str());
            prop_assert_eq!(comment.long_bracket_level(), u32::try_from(level).ok());
        }
    }
}

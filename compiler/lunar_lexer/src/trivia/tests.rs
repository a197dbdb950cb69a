use std::sync::Arc;

use lunar_diagnostic::ErrorCode;
use lunar_syntax::{GreenToken, LanguageVersion, ParseOptions, SyntaxKind, TriviaKind};
use pretty_assertions::assert_eq;

use crate::tokenize;

fn lex(source: &str) -> Vec<Arc<GreenToken>> {
    tokenize(source, &ParseOptions::new(LanguageVersion::Lua54))
}

fn leading(token: &GreenToken) -> Vec<(TriviaKind, &str)> {
    token
        .leading_trivia()
        .iter()
        .map(|t| (t.kind(), t.text()))
        .collect()
}

fn trailing(token: &GreenToken) -> Vec<(TriviaKind, &str)> {
    token
        .trailing_trivia()
        .iter()
        .map(|t| (t.kind(), t.text()))
        .collect()
}

// === Line ownership ===

#[test]
fn trailing_trivia_ends_after_the_line_break() {
    let tokens = lex("a  \n\n  b");
    assert_eq!(
        trailing(&tokens[0]),
        vec![(TriviaKind::Whitespace, "  "), (TriviaKind::EndOfLine, "\n")]
    );
    assert_eq!(
        leading(&tokens[1]),
        vec![(TriviaKind::EndOfLine, "\n"), (TriviaKind::Whitespace, "  ")]
    );
}

#[test]
fn crlf_is_one_line_break() {
    let tokens = lex("a\r\nb");
    assert_eq!(trailing(&tokens[0]), vec![(TriviaKind::EndOfLine, "\r\n")]);
    assert!(leading(&tokens[1]).is_empty());
}

#[test]
fn comment_on_the_token_line_is_trailing() {
    let tokens = lex("a -- note\n-- own line\nb");
    assert_eq!(
        trailing(&tokens[0]),
        vec![
            (TriviaKind::Whitespace, " "),
            (TriviaKind::SingleLineComment, "-- note"),
            (TriviaKind::EndOfLine, "\n"),
        ]
    );
    assert_eq!(
        leading(&tokens[1]),
        vec![
            (TriviaKind::SingleLineComment, "-- own line"),
            (TriviaKind::EndOfLine, "\n"),
        ]
    );
}

#[test]
fn trailing_trivia_of_last_token_without_newline() {
    let tokens = lex("a -- end");
    assert_eq!(
        trailing(&tokens[0]),
        vec![(TriviaKind::Whitespace, " "), (TriviaKind::SingleLineComment, "-- end")]
    );
    assert_eq!(tokens[1].full_width(), 0);
}

#[test]
fn leading_trivia_before_end_of_file() {
    let tokens = lex("\n  -- bye\n");
    assert_eq!(tokens.len(), 1);
    assert_eq!(
        leading(&tokens[0]),
        vec![
            (TriviaKind::EndOfLine, "\n"),
            (TriviaKind::Whitespace, "  "),
            (TriviaKind::SingleLineComment, "-- bye"),
            (TriviaKind::EndOfLine, "\n"),
        ]
    );
}

// === Block comments ===

#[test]
fn block_comment() {
    let tokens = lex("--[==[ a ]] b\n]==] x");
    assert_eq!(
        leading(&tokens[0]),
        vec![
            (TriviaKind::MultiLineComment, "--[==[ a ]] b\n]==]"),
            (TriviaKind::Whitespace, " "),
        ]
    );
    assert_eq!(tokens[0].leading_trivia()[0].long_bracket_level(), Some(2));
    assert_eq!(tokens[0].text(), "x");
}

#[test]
fn broken_opener_is_a_line_comment() {
    let tokens = lex("--[=a=[ x\ny");
    assert_eq!(
        leading(&tokens[0]),
        vec![
            (TriviaKind::SingleLineComment, "--[=a=[ x"),
            (TriviaKind::EndOfLine, "\n"),
        ]
    );
}

#[test]
fn unterminated_block_comment() {
    let tokens = lex("x --[[ never closed");
    let x = &tokens[0];
    assert_eq!(x.trailing_trivia()[1].kind(), TriviaKind::MultiLineComment);
    let diagnostic = &x.diagnostics()[0];
    assert_eq!(
        (diagnostic.code, diagnostic.offset, diagnostic.width),
        (ErrorCode::E0004, 2, 4)
    );
}

// === Shebang ===

#[test]
fn shebang_line() {
    let tokens = lex("#!/usr/bin/env lua\nprint(1)");
    assert_eq!(
        leading(&tokens[0]),
        vec![
            (TriviaKind::Shebang, "#!/usr/bin/env lua"),
            (TriviaKind::EndOfLine, "\n"),
        ]
    );
    assert_eq!(tokens[0].text(), "print");
}

#[test]
fn hash_bang_later_is_not_a_shebang() {
    let tokens = lex("x #!y");
    assert_eq!(tokens[1].kind(), SyntaxKind::Hash);
}

//! The lexer proper: token dispatch, the quick path and token assembly.
//!
//! Each call scans leading trivia, one token, and trailing trivia, and
//! returns a finished [`GreenToken`]. Diagnostics found along the way are
//! recorded relative to the token's full start in the current
//! [`TokenContext`]. Scans that need tokens of their own (directive lines,
//! interpolation bodies) swap in a fresh context and restore the outer one
//! when they finish.

use std::collections::VecDeque;
use std::sync::Arc;

use lunar_diagnostic::{Diagnostic, DiagnosticBag, ErrorCode};
use lunar_lexer_core::{quick_scan, Cursor, QuickKind, SourceBuffer};
use lunar_syntax::{
    Feature, GreenToken, ParseOptions, SyntaxKind, TokenValue, Trivia, TriviaKind, TriviaList,
};
use tracing::trace;

use crate::directive::Preprocessor;
use crate::scratch::ScratchPool;

/// What the next token is scanned as.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum LexerMode {
    /// Ordinary source tokens.
    #[default]
    Syntax,
    /// Tokens of a preprocessor directive line. Leading trivia is limited
    /// to spaces, trailing trivia stops before the line break, and the line
    /// break itself ends the directive.
    Directive,
}

/// Diagnostics for the element being scanned.
#[derive(Debug, Default)]
pub(crate) struct TokenContext {
    full_start: u32,
    diagnostics: DiagnosticBag,
}

impl TokenContext {
    fn at(full_start: u32) -> Self {
        TokenContext {
            full_start,
            diagnostics: DiagnosticBag::new(),
        }
    }
}

/// Full-fidelity lexer over a [`SourceBuffer`].
pub struct Lexer<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) options: &'a ParseOptions,
    ctx: TokenContext,
    /// Tokens already scanned by a multi-token construct.
    pending: VecDeque<Arc<GreenToken>>,
    pub(crate) scratch: ScratchPool,
    pub(crate) preprocessor: Preprocessor,
    /// Open-brace depth per active interpolation body, innermost last.
    pub(crate) interpolation: Vec<u32>,
    /// No token has been scanned on the current line yet.
    pub(crate) at_line_start: bool,
    /// Try the quick-scan DFA before the full scanner.
    quick_path: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a SourceBuffer, options: &'a ParseOptions) -> Self {
        Lexer {
            cursor: source.cursor(),
            options,
            ctx: TokenContext::default(),
            pending: VecDeque::new(),
            scratch: ScratchPool::new(),
            preprocessor: Preprocessor::new(options),
            interpolation: Vec::new(),
            at_line_start: true,
            quick_path: true,
        }
    }

    /// A lexer that always runs the full scanner.
    #[cfg(test)]
    pub(crate) fn full_scanner_only(mut self) -> Self {
        self.quick_path = false;
        self
    }

    pub fn options(&self) -> &'a ParseOptions {
        self.options
    }

    /// Byte offset of the next unscanned character.
    pub fn position(&self) -> u32 {
        self.cursor.pos()
    }

    /// Produce the next token.
    ///
    /// Once the input is exhausted every call returns an `EndOfFile` token.
    pub fn lex(&mut self, mode: LexerMode) -> Arc<GreenToken> {
        if mode == LexerMode::Directive {
            return self.lex_directive_token();
        }
        if self.pending.is_empty() {
            let mut produced = Vec::with_capacity(1);
            self.lex_into(&mut produced);
            self.pending.extend(produced);
        }
        match self.pending.pop_front() {
            Some(token) => token,
            None => unreachable!("lex_into always produces a token"),
        }
    }

    /// Scan the next syntax-mode construct, appending its tokens to `out`.
    ///
    /// Most constructs are one token. Interpolated strings append their
    /// whole token run.
    pub(crate) fn lex_into(&mut self, out: &mut Vec<Arc<GreenToken>>) {
        let outer = self.begin_context();
        let mut leading = self.scan_leading_trivia();

        if self.quick_path && self.interpolation.is_empty() {
            if let Some(token) = self.quick_token(&mut leading) {
                out.push(token);
                self.end_context(outer);
                return;
            }
        }

        let start = self.cursor.pos();
        match self.cursor.current() {
            b'"' | b'\'' if !self.cursor.is_eof() => self.scan_quoted_string(start, leading, out),
            _ => {
                let (kind, value) = self.scan_token(start);
                let token = if kind == SyntaxKind::InterpolationEnd {
                    // The text after `}` belongs to the string.
                    self.build_token(kind, start, value, leading, TriviaList::new())
                } else {
                    self.finish_token(kind, start, value, leading, LexerMode::Syntax)
                };
                out.push(token);
            }
        }
        self.end_context(outer);
    }

    fn lex_directive_token(&mut self) -> Arc<GreenToken> {
        let outer = self.begin_context();
        let mut leading = TriviaList::new();
        self.scan_whitespace(&mut leading);
        let start = self.cursor.pos();
        let kind = self.scan_directive_token(start);
        let token = if kind == SyntaxKind::EndOfDirective {
            let mut trailing = TriviaList::new();
            let eol_start = self.cursor.pos();
            if self.cursor.eat_line_ending(false) > 0 {
                trailing.push(Trivia::new(
                    TriviaKind::EndOfLine,
                    self.cursor.slice_from(eol_start),
                ));
            }
            self.at_line_start = true;
            let diagnostics = self.take_diagnostics();
            Arc::new(GreenToken::new(
                kind,
                "",
                TokenValue::None,
                leading,
                trailing,
                diagnostics,
            ))
        } else {
            self.finish_token(kind, start, TokenValue::None, leading, LexerMode::Directive)
        };
        self.end_context(outer);
        token
    }

    // === Diagnostics context ===

    pub(crate) fn begin_context(&mut self) -> TokenContext {
        let ctx = TokenContext::at(self.cursor.pos());
        std::mem::replace(&mut self.ctx, ctx)
    }

    pub(crate) fn end_context(&mut self, outer: TokenContext) -> Vec<Diagnostic> {
        std::mem::replace(&mut self.ctx, outer).diagnostics.into_vec()
    }

    /// Start of the element the current context belongs to.
    pub(crate) fn context_start(&self) -> u32 {
        self.ctx.full_start
    }

    pub(crate) fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.ctx.diagnostics.take()
    }

    /// Add a diagnostic already relative to the context start.
    pub(crate) fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.ctx.diagnostics.push(diagnostic);
    }

    /// Record a diagnostic for `start..end` (absolute offsets).
    pub(crate) fn report(&mut self, code: ErrorCode, start: u32, end: u32) -> &mut Diagnostic {
        let offset = start.saturating_sub(self.ctx.full_start);
        self.ctx
            .diagnostics
            .report(code, offset, end.saturating_sub(start))
    }

    /// Record a feature-unavailable diagnostic if `feature` is off.
    pub(crate) fn gate(&mut self, feature: Feature, start: u32, end: u32) {
        let offset = start.saturating_sub(self.ctx.full_start);
        if let Some(diagnostic) =
            self.options
                .feature_diagnostic(feature, offset, end.saturating_sub(start))
        {
            self.ctx.diagnostics.push(diagnostic);
        }
    }

    // === Token assembly ===

    pub(crate) fn finish_token(
        &mut self,
        kind: SyntaxKind,
        start: u32,
        value: TokenValue,
        leading: TriviaList,
        mode: LexerMode,
    ) -> Arc<GreenToken> {
        let end = self.cursor.pos();
        if end > start {
            self.at_line_start = false;
        }
        let text = self.cursor.slice(start, end);
        let trailing = self.scan_trailing_trivia(mode);
        let diagnostics = self.take_diagnostics();
        Arc::new(GreenToken::new(kind, text, value, leading, trailing, diagnostics))
    }

    pub(crate) fn build_token(
        &mut self,
        kind: SyntaxKind,
        start: u32,
        value: TokenValue,
        leading: TriviaList,
        trailing: TriviaList,
    ) -> Arc<GreenToken> {
        let text = self.cursor.slice_from(start);
        if !text.is_empty() {
            self.at_line_start = false;
        }
        let diagnostics = self.take_diagnostics();
        Arc::new(GreenToken::new(kind, text, value, leading, trailing, diagnostics))
    }

    // === Quick path ===

    fn quick_token(&mut self, leading: &mut TriviaList) -> Option<Arc<GreenToken>> {
        let quick = quick_scan(&self.cursor)?;
        let start = self.cursor.pos();
        let token_end = start + quick.token_len;
        let text = self.cursor.slice(start, token_end);

        let (kind, value) = match quick.kind {
            QuickKind::Identifier => {
                if matches!(text, "and" | "or") && self.cursor.peek_at(quick.token_len) == b'=' {
                    return None;
                }
                (self.identifier_kind(text), TokenValue::None)
            }
            QuickKind::Integer => match text.parse::<i64>() {
                Ok(value) => (SyntaxKind::NumericLiteral, TokenValue::Integer(value)),
                Err(_) => {
                    trace!(text, "quick scan: integer overflow, using full scanner");
                    return None;
                }
            },
            QuickKind::Punctuation => (single_punctuation(text.bytes().next()?)?, TokenValue::None),
            QuickKind::Dot => (SyntaxKind::Dot, TokenValue::None),
            QuickKind::DoubledDot => (SyntaxKind::DotDot, TokenValue::None),
            QuickKind::Equals => (SyntaxKind::Equals, TokenValue::None),
            QuickKind::CompoundPunctuation => {
                (plain_operator(text.bytes().next()?)?, TokenValue::None)
            }
        };

        self.cursor.advance_n(quick.total_len());
        let mut trailing = TriviaList::new();
        let whitespace_end = token_end + quick.whitespace_len;
        if quick.whitespace_len > 0 {
            trailing.push(Trivia::new(
                TriviaKind::Whitespace,
                self.cursor.slice(token_end, whitespace_end),
            ));
        }
        if quick.newline_len > 0 {
            trailing.push(Trivia::new(
                TriviaKind::EndOfLine,
                self.cursor.slice(whitespace_end, whitespace_end + quick.newline_len),
            ));
        }
        self.at_line_start = quick.newline_len > 0;

        let diagnostics = self.take_diagnostics();
        Some(Arc::new(GreenToken::new(
            kind,
            text,
            value,
            std::mem::take(leading),
            trailing,
            diagnostics,
        )))
    }

    // === Full scanner ===

    /// Scan one token starting at `start`. Strings are handled by the
    /// caller.
    fn scan_token(&mut self, start: u32) -> (SyntaxKind, TokenValue) {
        if self.cursor.is_eof() {
            self.report_unclosed_directives(start);
            return (SyntaxKind::EndOfFile, TokenValue::None);
        }

        let byte = self.cursor.current();
        let kind = match byte {
            b'0'..=b'9' => return (SyntaxKind::NumericLiteral, self.scan_number(start)),
            b'.' if self.cursor.peek().is_ascii_digit() => {
                return (SyntaxKind::NumericLiteral, self.scan_number(start));
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                return (self.scan_identifier(start), TokenValue::None)
            }
            b'[' => return self.scan_open_bracket(start),
            b'+' => self.operator_or_assignment(SyntaxKind::Plus, SyntaxKind::PlusEquals),
            b'*' => self.operator_or_assignment(SyntaxKind::Star, SyntaxKind::StarEquals),
            b'%' => self.operator_or_assignment(SyntaxKind::Percent, SyntaxKind::PercentEquals),
            b'^' => self.operator_or_assignment(SyntaxKind::Caret, SyntaxKind::CaretEquals),
            b'-' => self.minus(),
            b'/' => self.slash(),
            b'&' => self.bitwise(SyntaxKind::Ampersand, SyntaxKind::AmpersandEquals),
            b'|' => self.bitwise(SyntaxKind::Pipe, SyntaxKind::PipeEquals),
            b'~' => self.tilde(),
            b'<' => self.shift_or_compare(b'<'),
            b'>' => self.shift_or_compare(b'>'),
            b'=' => self.equals(),
            b'.' => self.dot(),
            b':' => {
                if self.cursor.peek() == b':' {
                    self.cursor.advance_n(2);
                    SyntaxKind::ColonColon
                } else {
                    self.cursor.advance();
                    SyntaxKind::Colon
                }
            }
            b'{' => {
                self.cursor.advance();
                if let Some(depth) = self.interpolation.last_mut() {
                    *depth += 1;
                }
                SyntaxKind::OpenBrace
            }
            b'}' => {
                self.cursor.advance();
                match self.interpolation.last_mut() {
                    Some(0) => SyntaxKind::InterpolationEnd,
                    Some(depth) => {
                        *depth -= 1;
                        SyntaxKind::CloseBrace
                    }
                    None => SyntaxKind::CloseBrace,
                }
            }
            b'!' | b'@' | b'\\' if self.options.version().is_moonscript() => {
                self.moonscript_punctuation()
            }
            _ => match single_punctuation(byte) {
                Some(kind) => {
                    self.cursor.advance();
                    kind
                }
                None => return (self.scan_unexpected(start), TokenValue::None),
            },
        };
        (kind, TokenValue::None)
    }

    fn operator_or_assignment(&mut self, plain: SyntaxKind, compound: SyntaxKind) -> SyntaxKind {
        let start = self.cursor.pos();
        if self.cursor.peek() == b'=' {
            self.cursor.advance_n(2);
            self.gate(Feature::CompoundAssignment, start, start + 2);
            compound
        } else {
            self.cursor.advance();
            plain
        }
    }

    fn minus(&mut self) -> SyntaxKind {
        if self.cursor.peek() == b'>' && self.options.version().is_moonscript() {
            self.cursor.advance_n(2);
            return SyntaxKind::MinusGreaterThan;
        }
        self.operator_or_assignment(SyntaxKind::Minus, SyntaxKind::MinusEquals)
    }

    fn slash(&mut self) -> SyntaxKind {
        let start = self.cursor.pos();
        match (self.cursor.peek(), self.cursor.peek2()) {
            (b'/', b'=') => {
                self.cursor.advance_n(3);
                self.gate(Feature::FloorDivisionAssignment, start, start + 3);
                SyntaxKind::SlashSlashEquals
            }
            (b'/', _) => {
                self.cursor.advance_n(2);
                self.gate(Feature::FloorDivision, start, start + 2);
                SyntaxKind::SlashSlash
            }
            _ => self.operator_or_assignment(SyntaxKind::Slash, SyntaxKind::SlashEquals),
        }
    }

    fn bitwise(&mut self, plain: SyntaxKind, compound: SyntaxKind) -> SyntaxKind {
        let start = self.cursor.pos();
        if self.cursor.peek() == b'=' {
            self.cursor.advance_n(2);
            self.gate(Feature::BitwiseCompoundAssignment, start, start + 2);
            compound
        } else {
            self.cursor.advance();
            self.gate(Feature::BitwiseOperators, start, start + 1);
            plain
        }
    }

    fn tilde(&mut self) -> SyntaxKind {
        let start = self.cursor.pos();
        if self.cursor.peek() == b'=' {
            self.cursor.advance_n(2);
            SyntaxKind::TildeEquals
        } else {
            self.cursor.advance();
            self.gate(Feature::BitwiseOperators, start, start + 1);
            SyntaxKind::Tilde
        }
    }

    fn shift_or_compare(&mut self, byte: u8) -> SyntaxKind {
        let (plain, or_equal, shift, shift_assign) = if byte == b'<' {
            (
                SyntaxKind::LessThan,
                SyntaxKind::LessThanEquals,
                SyntaxKind::LessThanLessThan,
                SyntaxKind::LessThanLessThanEquals,
            )
        } else {
            (
                SyntaxKind::GreaterThan,
                SyntaxKind::GreaterThanEquals,
                SyntaxKind::GreaterThanGreaterThan,
                SyntaxKind::GreaterThanGreaterThanEquals,
            )
        };
        let start = self.cursor.pos();
        match (self.cursor.peek(), self.cursor.peek2()) {
            (next, b'=') if next == byte => {
                self.cursor.advance_n(3);
                self.gate(Feature::BitwiseCompoundAssignment, start, start + 3);
                shift_assign
            }
            (next, _) if next == byte => {
                self.cursor.advance_n(2);
                self.gate(Feature::BitwiseOperators, start, start + 2);
                shift
            }
            (b'=', _) => {
                self.cursor.advance_n(2);
                or_equal
            }
            _ => {
                self.cursor.advance();
                plain
            }
        }
    }

    fn equals(&mut self) -> SyntaxKind {
        match self.cursor.peek() {
            b'=' => {
                self.cursor.advance_n(2);
                SyntaxKind::EqualsEquals
            }
            b'>' if self.options.version().is_moonscript() => {
                self.cursor.advance_n(2);
                SyntaxKind::EqualsGreaterThan
            }
            _ => {
                self.cursor.advance();
                SyntaxKind::Equals
            }
        }
    }

    fn dot(&mut self) -> SyntaxKind {
        let start = self.cursor.pos();
        match (self.cursor.peek(), self.cursor.peek2()) {
            (b'.', b'.') => {
                self.cursor.advance_n(3);
                SyntaxKind::DotDotDot
            }
            (b'.', b'=') => {
                self.cursor.advance_n(3);
                self.gate(Feature::CompoundAssignment, start, start + 3);
                SyntaxKind::DotDotEquals
            }
            (b'.', _) => {
                self.cursor.advance_n(2);
                SyntaxKind::DotDot
            }
            _ => {
                self.cursor.advance();
                SyntaxKind::Dot
            }
        }
    }

    fn moonscript_punctuation(&mut self) -> SyntaxKind {
        let (first, second) = (self.cursor.current(), self.cursor.peek());
        let (kind, width) = match (first, second) {
            (b'!', b'=') => (SyntaxKind::BangEquals, 2),
            (b'!', _) => (SyntaxKind::Bang, 1),
            (b'@', b'@') => (SyntaxKind::AtAt, 2),
            (b'@', _) => (SyntaxKind::At, 1),
            _ => (SyntaxKind::Backslash, 1),
        };
        self.cursor.advance_n(width);
        kind
    }

    /// `[` opens a long string when followed by `=`* `[`.
    fn scan_open_bracket(&mut self, start: u32) -> (SyntaxKind, TokenValue) {
        if let Some(level) = long_bracket_opener(&self.cursor) {
            let value = self.scan_long_string(start, level);
            return (SyntaxKind::StringLiteral, value);
        }
        self.cursor.advance();
        if self.cursor.current() == b'=' {
            let mut lookahead = self.cursor;
            lookahead.eat_while(|b| b == b'=');
            self.report(ErrorCode::E0007, start, lookahead.pos());
        }
        (SyntaxKind::OpenBracket, TokenValue::None)
    }

    pub(crate) fn scan_identifier(&mut self, start: u32) -> SyntaxKind {
        self.eat_identifier_rest();
        let text = self.cursor.slice_from(start);
        if matches!(text, "and" | "or")
            && self.cursor.current() == b'='
            && self.cursor.peek() != b'='
        {
            self.cursor.advance();
            self.gate(Feature::LogicalCompoundAssignment, start, self.cursor.pos());
            return if text == "and" {
                SyntaxKind::AndEquals
            } else {
                SyntaxKind::OrEquals
            };
        }
        self.identifier_kind(text)
    }

    /// Consume identifier-continue characters after the first one.
    pub(crate) fn eat_identifier_rest(&mut self) {
        if self.cursor.current().is_ascii() {
            self.cursor.advance();
        } else {
            self.cursor.advance_char();
        }
        loop {
            let byte = self.cursor.current();
            if byte.is_ascii_alphanumeric() || byte == b'_' {
                self.cursor.advance();
            } else if !byte.is_ascii()
                && self
                    .cursor
                    .current_char()
                    .is_some_and(unicode_ident::is_xid_continue)
            {
                self.cursor.advance_char();
            } else {
                break;
            }
        }
    }

    pub(crate) fn identifier_kind(&self, text: &str) -> SyntaxKind {
        if let Some(keyword) = SyntaxKind::keyword(text) {
            return keyword;
        }
        if text == "goto" && self.options.is_available(Feature::Goto) {
            return SyntaxKind::GotoKeyword;
        }
        SyntaxKind::Identifier
    }

    /// Anything that starts no token: a Unicode identifier, or one bad
    /// character.
    fn scan_unexpected(&mut self, start: u32) -> SyntaxKind {
        if let Some(c) = self.cursor.current_char() {
            if unicode_ident::is_xid_start(c) {
                return self.scan_identifier(start);
            }
        }
        self.cursor.advance_char();
        if self.cursor.pos() == start {
            // Not on a character boundary; step one byte to stay total.
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start).to_string();
        self.report(ErrorCode::E0002, start, self.cursor.pos())
            .args
            .push(text);
        SyntaxKind::BadToken
    }

    fn scan_directive_token(&mut self, start: u32) -> SyntaxKind {
        if self.cursor.is_eof() || matches!(self.cursor.current(), b'\r' | b'\n') {
            return SyntaxKind::EndOfDirective;
        }
        match self.cursor.current() {
            b'#' => {
                self.cursor.advance();
                SyntaxKind::Hash
            }
            b'(' => {
                self.cursor.advance();
                SyntaxKind::OpenParen
            }
            b')' => {
                self.cursor.advance();
                SyntaxKind::CloseParen
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                self.eat_identifier_rest();
                let text = self.cursor.slice_from(start);
                SyntaxKind::directive_keyword(text).unwrap_or(SyntaxKind::Identifier)
            }
            _ => self.scan_unexpected(start),
        }
    }

    fn report_unclosed_directives(&mut self, at: u32) {
        let (open_conditionals, open_regions) = self.preprocessor.close_all();
        if open_conditionals {
            self.report(ErrorCode::E0504, at, at);
        }
        if open_regions {
            self.report(ErrorCode::E0507, at, at);
        }
    }
}

/// Level of the long-bracket opener at the cursor, if there is one.
pub(crate) fn long_bracket_opener(cursor: &Cursor<'_>) -> Option<u32> {
    if cursor.current() != b'[' {
        return None;
    }
    let mut level = 0;
    loop {
        match cursor.peek_at(level + 1) {
            b'=' => level += 1,
            b'[' => return Some(level),
            _ => return None,
        }
    }
}

/// Kinds of one-byte tokens that never extend.
fn single_punctuation(byte: u8) -> Option<SyntaxKind> {
    let kind = match byte {
        b'(' => SyntaxKind::OpenParen,
        b')' => SyntaxKind::CloseParen,
        b'{' => SyntaxKind::OpenBrace,
        b'}' => SyntaxKind::CloseBrace,
        b']' => SyntaxKind::CloseBracket,
        b',' => SyntaxKind::Comma,
        b';' => SyntaxKind::Semicolon,
        b'#' => SyntaxKind::Hash,
        _ => return None,
    };
    Some(kind)
}

/// Operator bytes the quick path may emit on their own. Bitwise operators
/// are left to the full scanner, which applies their feature check.
fn plain_operator(byte: u8) -> Option<SyntaxKind> {
    let kind = match byte {
        b'+' => SyntaxKind::Plus,
        b'*' => SyntaxKind::Star,
        b'/' => SyntaxKind::Slash,
        b'%' => SyntaxKind::Percent,
        b'^' => SyntaxKind::Caret,
        b'<' => SyntaxKind::LessThan,
        b'>' => SyntaxKind::GreaterThan,
        b':' => SyntaxKind::Colon,
        _ => return None,
    };
    Some(kind)
}

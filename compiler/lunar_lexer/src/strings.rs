//! String literals: quoted, long-bracket and interpolated.
//!
//! Values are decoded into pooled scratch buffers. Text between quotes is
//! scanned in segments; a segment ends at the closing quote, at `#{` when
//! the string interpolates, or where the literal is cut off. A literal
//! with no interpolation is one `StringLiteral` token. Otherwise it becomes
//! the token run
//!
//! ```text
//! InterpolatedStringStart (InterpolatedStringText | InterpolationStart body InterpolationEnd)* InterpolatedStringEnd
//! ```
//!
//! with one indentation computation shared by all text segments.

use std::sync::Arc;

use lunar_diagnostic::{Diagnostic, ErrorCode};
use lunar_stack::ensure_sufficient_stack;
use lunar_syntax::{Feature, GreenToken, SyntaxKind, TokenValue, TriviaList};

use crate::indent;
use crate::lexer::{Lexer, LexerMode};
use crate::scratch::PooledBuffer;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum SegmentEnd {
    /// At the closing quote (not consumed).
    Closed,
    /// At `#{` (not consumed).
    Interpolation,
    /// End of input, or a line break in a single-line string.
    Unterminated,
}

/// Decoded text of one segment.
struct Segment {
    start: u32,
    end: u32,
    value: PooledBuffer,
    /// Offsets into `value` where continuation lines start.
    line_starts: Vec<usize>,
    /// Relative to `start`.
    diagnostics: Vec<Diagnostic>,
    ends_literal: bool,
}

impl Segment {
    fn indents(&self) -> impl Iterator<Item = Option<u32>> + '_ {
        self.line_starts.iter().map(|&start| {
            let line = self.value.get(start..).unwrap_or_default();
            indent::line_indent(line, self.ends_literal)
        })
    }

    fn decoded(&self, indent: u32) -> TokenValue {
        let bytes = indent::apply_indent(&self.value, &self.line_starts, indent);
        TokenValue::String(bytes.into_boxed_slice())
    }
}

enum Part {
    Text(Segment),
    Token(Arc<GreenToken>),
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "lengths within the source buffer fit in u32 because the source length does"
)]
fn len32(len: usize) -> u32 {
    len as u32
}

impl Lexer<'_> {
    /// At `'` or `"`: scan a quoted string, appending its token(s).
    pub(crate) fn scan_quoted_string(
        &mut self,
        start: u32,
        leading: TriviaList,
        out: &mut Vec<Arc<GreenToken>>,
    ) {
        let quote = self.cursor.current();
        let interpolate =
            quote == b'"' && self.options.is_available(Feature::StringInterpolation);
        self.cursor.advance();

        let (first, end) = self.scan_segment(quote, interpolate);
        if end == SegmentEnd::Interpolation {
            self.scan_interpolated_string(start, first, leading, out);
            return;
        }

        let delta = first.start - self.context_start();
        for diagnostic in &first.diagnostics {
            self.push_diagnostic(diagnostic.clone().shifted(delta));
        }
        match end {
            SegmentEnd::Closed => self.cursor.advance(),
            _ => {
                self.report(ErrorCode::E0001, start, self.cursor.pos());
            }
        }
        let indent = self.common_indent([&first]);
        let value = first.decoded(indent);
        let token =
            self.finish_token(SyntaxKind::StringLiteral, start, value, leading, LexerMode::Syntax);
        out.push(token);
    }

    fn scan_segment(&mut self, quote: u8, interpolate: bool) -> (Segment, SegmentEnd) {
        let outer = self.begin_context();
        let start = self.cursor.pos();
        let multiline = self.options.is_available(Feature::MultilineStrings);
        let mut value = self.scratch.acquire();
        let mut line_starts = Vec::new();

        let end = loop {
            if self.cursor.is_eof() {
                break SegmentEnd::Unterminated;
            }
            match self.cursor.current() {
                b if b == quote => break SegmentEnd::Closed,
                b'\\' => self.scan_escape(&mut value, &mut line_starts),
                b'\r' | b'\n' if multiline => {
                    self.cursor.eat_line_ending(false);
                    value.push(b'\n');
                    line_starts.push(value.len());
                }
                b'\r' | b'\n' => break SegmentEnd::Unterminated,
                b'#' if interpolate && self.cursor.peek() == b'{' => {
                    break SegmentEnd::Interpolation;
                }
                _ => {
                    let rest = self.cursor.rest();
                    let run = rest
                        .iter()
                        .position(|&b| b == quote || matches!(b, b'\\' | b'\r' | b'\n' | b'#'))
                        .unwrap_or(rest.len())
                        .max(1);
                    value.extend_from_slice(&rest[..run]);
                    self.cursor.advance_n(len32(run));
                }
            }
        };

        let diagnostics = self.end_context(outer);
        let segment = Segment {
            start,
            end: self.cursor.pos(),
            value,
            line_starts,
            diagnostics,
            ends_literal: end != SegmentEnd::Interpolation,
        };
        (segment, end)
    }

    fn scan_interpolated_string(
        &mut self,
        start: u32,
        first: Segment,
        leading: TriviaList,
        out: &mut Vec<Arc<GreenToken>>,
    ) {
        let open = Arc::new(GreenToken::new(
            SyntaxKind::InterpolatedStringStart,
            self.cursor.slice(start, start + 1),
            TokenValue::None,
            leading,
            TriviaList::new(),
            self.take_diagnostics(),
        ));
        self.at_line_start = false;

        let mut parts = Vec::new();
        let mut segment = first;
        let mut end = SegmentEnd::Interpolation;
        loop {
            if segment.end > segment.start {
                parts.push(Part::Text(segment));
            }
            match end {
                SegmentEnd::Interpolation => {
                    if !self.scan_interpolation(&mut parts) {
                        parts.push(Part::Token(Arc::new(GreenToken::missing(
                            SyntaxKind::InterpolatedStringEnd,
                            Vec::new(),
                        ))));
                        break;
                    }
                    (segment, end) = self.scan_segment(b'"', true);
                }
                SegmentEnd::Closed => {
                    let close = self.cursor.pos();
                    self.cursor.advance();
                    let token = self.finish_token(
                        SyntaxKind::InterpolatedStringEnd,
                        close,
                        TokenValue::None,
                        TriviaList::new(),
                        LexerMode::Syntax,
                    );
                    parts.push(Part::Token(token));
                    break;
                }
                SegmentEnd::Unterminated => {
                    let diagnostic = Diagnostic::new(ErrorCode::E0001, 0, 0);
                    parts.push(Part::Token(Arc::new(GreenToken::missing(
                        SyntaxKind::InterpolatedStringEnd,
                        vec![diagnostic],
                    ))));
                    break;
                }
            }
        }

        let indent = self.common_indent(parts.iter().filter_map(|part| match part {
            Part::Text(segment) => Some(segment),
            Part::Token(_) => None,
        }));
        out.push(open);
        for part in parts {
            match part {
                Part::Text(segment) => {
                    let value = segment.decoded(indent);
                    out.push(Arc::new(GreenToken::new(
                        SyntaxKind::InterpolatedStringText,
                        self.cursor.slice(segment.start, segment.end),
                        value,
                        TriviaList::new(),
                        TriviaList::new(),
                        segment.diagnostics,
                    )));
                }
                Part::Token(token) => out.push(token),
            }
        }
    }

    /// At `#{`: scan the interpolation body through its closing `}`.
    /// Returns `false` when the input ends first.
    fn scan_interpolation(&mut self, parts: &mut Vec<Part>) -> bool {
        self.cursor.advance_n(2);
        parts.push(Part::Token(Arc::new(GreenToken::simple(
            SyntaxKind::InterpolationStart,
        ))));

        self.interpolation.push(0);
        let mut body = Vec::new();
        let closed = loop {
            ensure_sufficient_stack(|| self.lex_into(&mut body));
            match body.last().map(|token| token.kind()) {
                Some(SyntaxKind::InterpolationEnd) => break true,
                Some(SyntaxKind::EndOfFile) => {
                    if let Some(eof) = body.pop() {
                        body.push(Arc::new(unterminated_interpolation_end(&eof)));
                    }
                    break false;
                }
                _ => {}
            }
        };
        self.interpolation.pop();
        parts.extend(body.into_iter().map(Part::Token));
        closed
    }

    fn common_indent<'s>(&self, segments: impl IntoIterator<Item = &'s Segment>) -> u32 {
        if !self.options.is_available(Feature::MultilineStrings) {
            return 0;
        }
        indent::minimum_indent(segments.into_iter().flat_map(Segment::indents))
    }

    /// After `[` `=`* `[`: scan a long string through its closer.
    pub(crate) fn scan_long_string(&mut self, start: u32, level: u32) -> TokenValue {
        self.cursor.advance_n(level + 2);
        let mut value = self.scratch.acquire();
        self.cursor.eat_line_ending(true);
        if !self.scan_long_bracket_body(level, Some(&mut *value)) {
            self.report(ErrorCode::E0008, start, start + level + 2);
        }
        TokenValue::String(value.as_slice().into())
    }

    /// Scan to the `]` `=`×level `]` closer and past it. Line breaks are
    /// normalized to `\n` in `value`. Returns `false` at end of input.
    pub(crate) fn scan_long_bracket_body(
        &mut self,
        level: u32,
        mut value: Option<&mut Vec<u8>>,
    ) -> bool {
        loop {
            let rest = self.cursor.rest();
            let Some(offset) = memchr::memchr3(b']', b'\r', b'\n', rest) else {
                if let Some(value) = value.as_deref_mut() {
                    value.extend_from_slice(rest);
                }
                self.cursor.advance_n(len32(rest.len()));
                return false;
            };
            if let Some(value) = value.as_deref_mut() {
                value.extend_from_slice(&rest[..offset]);
            }
            self.cursor.advance_n(len32(offset));

            if self.cursor.current() == b']' {
                if self.at_long_bracket_closer(level) {
                    self.cursor.advance_n(level + 2);
                    return true;
                }
                if let Some(value) = value.as_deref_mut() {
                    value.push(b']');
                }
                self.cursor.advance();
            } else {
                self.cursor.eat_line_ending(true);
                if let Some(value) = value.as_deref_mut() {
                    value.push(b'\n');
                }
            }
        }
    }

    fn at_long_bracket_closer(&self, level: u32) -> bool {
        (1..=level).all(|i| self.cursor.peek_at(i) == b'=')
            && self.cursor.peek_at(level + 1) == b']'
    }
}

/// The `}` that end of input left out, carrying the end-of-file token's
/// trivia and diagnostics so no text or diagnostic is lost.
fn unterminated_interpolation_end(eof: &GreenToken) -> GreenToken {
    let leading: TriviaList = eof.leading_trivia().iter().cloned().collect();
    let mut diagnostics = eof.diagnostics().to_vec();
    diagnostics.push(Diagnostic::new(ErrorCode::E0006, eof.leading_width(), 0));
    GreenToken::missing_with_leading(SyntaxKind::InterpolationEnd, leading, diagnostics)
}

#[cfg(test)]
mod tests;

//! Leading and trailing trivia.
//!
//! Trailing trivia is everything on the token's own line: spaces and
//! comments, up to and including the first line break. Leading trivia is
//! the rest: blank lines, indentation, comment lines, directive lines and
//! disabled text. A line's indentation therefore always belongs to its
//! first token.

use lunar_diagnostic::ErrorCode;
use lunar_syntax::{Feature, Trivia, TriviaKind, TriviaList};

use crate::lexer::{long_bracket_opener, Lexer, LexerMode};

#[inline]
fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | 0x0B | 0x0C)
}

impl Lexer<'_> {
    pub(crate) fn scan_leading_trivia(&mut self) -> TriviaList {
        let mut list = TriviaList::new();
        let directives = self.options.is_available(Feature::Directives);
        loop {
            if directives && self.at_line_start {
                if !self.preprocessor.is_active() {
                    self.scan_disabled_text(&mut list);
                }
                if self.line_starts_directive() {
                    self.scan_whitespace(&mut list);
                    let directive = self.scan_directive();
                    list.push(directive);
                    continue;
                }
            }

            let start = self.cursor.pos();
            if self.cursor.is_eof() {
                break;
            }
            match self.cursor.current() {
                b if is_space(b) => self.scan_whitespace(&mut list),
                b'\r' | b'\n' => {
                    self.cursor.eat_line_ending(false);
                    list.push(Trivia::new(
                        TriviaKind::EndOfLine,
                        self.cursor.slice_from(start),
                    ));
                    self.at_line_start = true;
                }
                b'-' if self.cursor.peek() == b'-' => {
                    self.scan_comment(&mut list);
                    self.at_line_start = false;
                }
                b'#' if start == 0 && self.cursor.peek() == b'!' => {
                    self.cursor.eat_until_line_end();
                    list.push(Trivia::new(TriviaKind::Shebang, self.cursor.slice_from(start)));
                }
                _ => break,
            }
        }
        list
    }

    pub(crate) fn scan_trailing_trivia(&mut self, mode: LexerMode) -> TriviaList {
        let mut list = TriviaList::new();
        while !self.cursor.is_eof() {
            let start = self.cursor.pos();
            match self.cursor.current() {
                b if is_space(b) => self.scan_whitespace(&mut list),
                b'\r' | b'\n' if mode == LexerMode::Syntax => {
                    self.cursor.eat_line_ending(false);
                    list.push(Trivia::new(
                        TriviaKind::EndOfLine,
                        self.cursor.slice_from(start),
                    ));
                    self.at_line_start = true;
                    break;
                }
                b'-' if self.cursor.peek() == b'-' => self.scan_comment(&mut list),
                _ => break,
            }
        }
        list
    }

    pub(crate) fn scan_whitespace(&mut self, list: &mut TriviaList) {
        let start = self.cursor.pos();
        self.cursor.eat_while(is_space);
        if self.cursor.pos() > start {
            list.push(Trivia::new(
                TriviaKind::Whitespace,
                self.cursor.slice_from(start),
            ));
        }
    }

    /// At `--`: a block comment when a long-bracket opener follows,
    /// otherwise a line comment.
    fn scan_comment(&mut self, list: &mut TriviaList) {
        let start = self.cursor.pos();
        self.cursor.advance_n(2);
        if let Some(level) = long_bracket_opener(&self.cursor) {
            self.cursor.advance_n(level + 2);
            if !self.scan_long_bracket_body(level, None) {
                self.report(ErrorCode::E0004, start, start + level + 4);
            }
            list.push(Trivia::new(
                TriviaKind::MultiLineComment,
                self.cursor.slice_from(start),
            ));
        } else {
            self.cursor.eat_until_line_end();
            list.push(Trivia::new(
                TriviaKind::SingleLineComment,
                self.cursor.slice_from(start),
            ));
        }
    }

    /// Whether the rest of the line, after indentation, is a directive.
    fn line_starts_directive(&self) -> bool {
        let mut lookahead = self.cursor;
        lookahead.eat_while(is_space);
        lookahead.current() == b'#'
            && !(lookahead.pos() == 0 && lookahead.peek() == b'!')
            && !lookahead.is_eof()
    }

    /// Whether the line is `#if`, `#elseif`, `#else` or `#end`.
    fn line_starts_conditional_directive(&self) -> bool {
        let mut lookahead = self.cursor;
        lookahead.eat_while(is_space);
        if lookahead.current() != b'#' || lookahead.is_eof() {
            return false;
        }
        lookahead.advance();
        lookahead.eat_while(is_space);
        let start = lookahead.pos();
        lookahead.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
        matches!(lookahead.slice_from(start), "if" | "elseif" | "else" | "end")
    }

    /// Lines of an inactive conditional branch, up to the next conditional
    /// directive.
    fn scan_disabled_text(&mut self, list: &mut TriviaList) {
        let start = self.cursor.pos();
        while !self.cursor.is_eof() && !self.line_starts_conditional_directive() {
            self.cursor.eat_until_line_end();
            self.cursor.eat_line_ending(false);
        }
        if self.cursor.pos() > start {
            list.push(Trivia::new(
                TriviaKind::DisabledText,
                self.cursor.slice_from(start),
            ));
        }
    }
}

#[cfg(test)]
mod tests;

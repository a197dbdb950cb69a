//! Preprocessor directives.
//!
//! A directive is a line whose first non-blank character is `#`. The line
//! is lexed in [`LexerMode::Directive`], parsed into one of the
//! `*DirectiveTrivia` nodes and attached to the next token as structured
//! trivia. Conditional directives drive [`Preprocessor`]; lines of an
//! inactive branch become `DisabledText` trivia.
//!
//! Condition grammar, loosest first:
//!
//! ```text
//! or      := and ("or" and)*
//! and     := not ("and" not)*
//! not     := "not" not | primary
//! primary := "true" | "false" | NAME | "(" or ")"
//! ```
//!
//! A name is true when it is defined.

use std::sync::Arc;

use lunar_diagnostic::{Diagnostic, ErrorCode};
use lunar_stack::ensure_sufficient_stack;
use lunar_syntax::{
    GreenElement, GreenNode, GreenToken, ParseOptions, SyntaxKind, Trivia, TriviaKind,
};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::lexer::{Lexer, LexerMode};

#[derive(Copy, Clone, Debug)]
struct Conditional {
    parent_active: bool,
    /// Some branch of this conditional has been selected.
    taken: bool,
    active: bool,
    seen_else: bool,
}

/// Defined symbols and the open `#if` and `#region` stacks.
#[derive(Debug)]
pub(crate) struct Preprocessor {
    symbols: FxHashSet<String>,
    conditionals: Vec<Conditional>,
    regions: u32,
}

impl Preprocessor {
    pub(crate) fn new(options: &ParseOptions) -> Self {
        Preprocessor {
            symbols: options.symbols().clone(),
            conditionals: Vec::new(),
            regions: 0,
        }
    }

    /// Whether source lines at this point are compiled.
    pub(crate) fn is_active(&self) -> bool {
        self.conditionals.last().map_or(true, |c| c.active)
    }

    pub(crate) fn is_defined(&self, name: &str) -> bool {
        self.symbols.contains(name)
    }

    fn begin_if(&mut self, condition: bool) {
        let parent_active = self.is_active();
        let active = parent_active && condition;
        self.conditionals.push(Conditional {
            parent_active,
            taken: active,
            active,
            seen_else: false,
        });
    }

    /// `false` when there is no open `#if` to continue.
    fn elseif(&mut self, condition: bool) -> bool {
        match self.conditionals.last_mut() {
            Some(c) if !c.seen_else => {
                c.active = c.parent_active && !c.taken && condition;
                c.taken |= c.active;
                true
            }
            _ => false,
        }
    }

    fn else_branch(&mut self) -> bool {
        match self.conditionals.last_mut() {
            Some(c) if !c.seen_else => {
                c.active = c.parent_active && !c.taken;
                c.taken = true;
                c.seen_else = true;
                true
            }
            _ => false,
        }
    }

    fn end_if(&mut self) -> bool {
        self.conditionals.pop().is_some()
    }

    fn begin_region(&mut self) {
        self.regions += 1;
    }

    fn end_region(&mut self) -> bool {
        if self.regions == 0 {
            return false;
        }
        self.regions -= 1;
        true
    }

    /// Close everything still open at end of input, returning whether a
    /// conditional and whether a region was left open.
    pub(crate) fn close_all(&mut self) -> (bool, bool) {
        let open = (!self.conditionals.is_empty(), self.regions > 0);
        self.conditionals.clear();
        self.regions = 0;
        open
    }
}

impl Lexer<'_> {
    /// At `#` on a directive line: parse the line and apply it.
    pub(crate) fn scan_directive(&mut self) -> Trivia {
        let node = DirectiveParser {
            lexer: self,
            current: None,
        }
        .directive();
        debug!(kind = ?node.kind(), active = self.preprocessor.is_active(), "directive");
        Trivia::structured(TriviaKind::Directive, Arc::new(node))
    }
}

/// Pulls directive-mode tokens one at a time. Nothing past the
/// end-of-directive token is ever lexed.
struct DirectiveParser<'l, 'a> {
    lexer: &'l mut Lexer<'a>,
    current: Option<Arc<GreenToken>>,
}

impl DirectiveParser<'_, '_> {
    fn peek_kind(&mut self) -> SyntaxKind {
        let lexer = &mut *self.lexer;
        self.current
            .get_or_insert_with(|| lexer.lex(LexerMode::Directive))
            .kind()
    }

    fn bump(&mut self) -> Arc<GreenToken> {
        match self.current.take() {
            Some(token) => token,
            None => self.lexer.lex(LexerMode::Directive),
        }
    }

    fn directive(mut self) -> GreenNode {
        let hash = self.bump();
        match self.peek_kind() {
            SyntaxKind::IfKeyword => self.if_directive(hash),
            SyntaxKind::ElseIfKeyword => self.elseif_directive(hash),
            SyntaxKind::ElseKeyword => {
                let keyword = self.bump();
                let eod = self.end_of_directive(true);
                let matched = self.lexer.preprocessor.else_branch();
                let diagnostics = unmatched(matched, &hash, &keyword);
                directive_node(
                    SyntaxKind::ElseDirectiveTrivia,
                    vec![hash.into(), keyword.into(), eod.into()],
                    diagnostics,
                )
            }
            SyntaxKind::EndKeyword => {
                let keyword = self.bump();
                let eod = self.end_of_directive(true);
                let matched = self.lexer.preprocessor.end_if();
                let diagnostics = unmatched(matched, &hash, &keyword);
                directive_node(
                    SyntaxKind::EndIfDirectiveTrivia,
                    vec![hash.into(), keyword.into(), eod.into()],
                    diagnostics,
                )
            }
            SyntaxKind::DefineKeyword => {
                self.symbol_directive(hash, SyntaxKind::DefineDirectiveTrivia)
            }
            SyntaxKind::UndefKeyword => {
                self.symbol_directive(hash, SyntaxKind::UndefDirectiveTrivia)
            }
            SyntaxKind::RegionKeyword => {
                self.lexer.preprocessor.begin_region();
                self.message_directive(hash, SyntaxKind::RegionDirectiveTrivia, None)
            }
            SyntaxKind::EndRegionKeyword => {
                let matched = self.lexer.preprocessor.end_region();
                let code = (!matched).then_some(ErrorCode::E0506);
                self.message_directive(hash, SyntaxKind::EndRegionDirectiveTrivia, code)
            }
            SyntaxKind::ErrorKeyword => {
                let code = Some(ErrorCode::E0505);
                self.message_directive(hash, SyntaxKind::ErrorDirectiveTrivia, code)
            }
            SyntaxKind::WarningKeyword => {
                let code = Some(ErrorCode::W0501);
                self.message_directive(hash, SyntaxKind::WarningDirectiveTrivia, code)
            }
            _ => self.bad_directive(hash),
        }
    }

    fn if_directive(&mut self, hash: Arc<GreenToken>) -> GreenNode {
        let keyword = self.bump();
        let (condition, value) = self.condition();
        let eod = self.end_of_directive(true);
        self.lexer.preprocessor.begin_if(value);
        directive_node(
            SyntaxKind::IfDirectiveTrivia,
            vec![hash.into(), keyword.into(), condition, eod.into()],
            Vec::new(),
        )
    }

    fn elseif_directive(&mut self, hash: Arc<GreenToken>) -> GreenNode {
        let keyword = self.bump();
        let (condition, value) = self.condition();
        let eod = self.end_of_directive(true);
        let matched = self.lexer.preprocessor.elseif(value);
        let diagnostics = unmatched(matched, &hash, &keyword);
        directive_node(
            SyntaxKind::ElseIfDirectiveTrivia,
            vec![hash.into(), keyword.into(), condition, eod.into()],
            diagnostics,
        )
    }

    fn symbol_directive(&mut self, hash: Arc<GreenToken>, kind: SyntaxKind) -> GreenNode {
        let keyword = self.bump();
        let name = if self.peek_kind() == SyntaxKind::Identifier {
            let name = self.bump();
            let preprocessor = &mut self.lexer.preprocessor;
            if kind == SyntaxKind::DefineDirectiveTrivia {
                preprocessor.symbols.insert(name.text().to_string());
            } else {
                preprocessor.symbols.remove(name.text());
            }
            name
        } else {
            Arc::new(GreenToken::missing(
                SyntaxKind::Identifier,
                vec![Diagnostic::new(ErrorCode::E1003, 0, 0)],
            ))
        };
        let eod = self.end_of_directive(true);
        directive_node(kind, vec![hash.into(), keyword.into(), name.into(), eod.into()], Vec::new())
    }

    /// `#region`, `#endregion`, `#error` and `#warning`: the rest of the
    /// line is free text, kept as `PreprocessingMessage` trivia of the
    /// end-of-directive token.
    fn message_directive(
        &mut self,
        hash: Arc<GreenToken>,
        kind: SyntaxKind,
        code: Option<ErrorCode>,
    ) -> GreenNode {
        let keyword = self.bump();

        let cursor = &mut self.lexer.cursor;
        let start = cursor.pos();
        cursor.eat_until_line_end();
        let message = cursor.slice_from(start);

        let mut eod = self.end_of_directive(true);
        if !message.is_empty() {
            let trivia = Trivia::new(TriviaKind::PreprocessingMessage, message);
            eod = Arc::new(eod.with_leading_prefix(trivia));
        }

        let diagnostics = match code {
            Some(code) => {
                let mut diagnostic =
                    Diagnostic::new(code, hash.leading_width(), head_width(&hash, &keyword));
                if matches!(code, ErrorCode::E0505 | ErrorCode::W0501) {
                    diagnostic.args.push(message.trim().to_string());
                }
                vec![diagnostic]
            }
            None => Vec::new(),
        };
        directive_node(kind, vec![hash.into(), keyword.into(), eod.into()], diagnostics)
    }

    fn bad_directive(&mut self, hash: Arc<GreenToken>) -> GreenNode {
        let word = (self.peek_kind() != SyntaxKind::EndOfDirective).then(|| self.bump());
        let width = match &word {
            Some(word) => head_width(&hash, word),
            None => hash.width(),
        };
        let eod = self.end_of_directive(false);
        let diagnostic = Diagnostic::new(ErrorCode::E0501, hash.leading_width(), width);
        GreenNode::with_diagnostics(
            SyntaxKind::BadDirectiveTrivia,
            vec![Some(hash.into()), word.map(GreenElement::from), Some(eod.into())],
            vec![diagnostic],
        )
    }

    /// The end-of-directive token. Tokens before it are folded into its
    /// leading skipped-tokens trivia.
    fn end_of_directive(&mut self, report: bool) -> Arc<GreenToken> {
        let mut skipped = Vec::new();
        while self.peek_kind() != SyntaxKind::EndOfDirective {
            skipped.push(self.bump());
        }
        let eod = self.bump();
        if skipped.is_empty() {
            return eod;
        }

        let width = skipped.iter().map(|token| token.full_width()).sum();
        let diagnostics = if report {
            vec![Diagnostic::new(ErrorCode::E0502, 0, width)]
        } else {
            Vec::new()
        };
        let slots = skipped.into_iter().map(|token| Some(token.into())).collect();
        let node = GreenNode::with_diagnostics(SyntaxKind::SkippedTokensTrivia, slots, diagnostics);
        let trivia = Trivia::structured(TriviaKind::SkippedTokens, Arc::new(node));
        Arc::new(eod.with_leading_prefix(trivia))
    }

    // === Conditions ===

    fn condition(&mut self) -> (GreenElement, bool) {
        self.or_condition()
    }

    fn or_condition(&mut self) -> (GreenElement, bool) {
        let (mut left, mut value) = self.and_condition();
        while self.peek_kind() == SyntaxKind::OrKeyword {
            let operator = self.bump();
            let (right, right_value) = self.and_condition();
            left = binary(left, operator, right);
            value = value || right_value;
        }
        (left, value)
    }

    fn and_condition(&mut self) -> (GreenElement, bool) {
        let (mut left, mut value) = self.not_condition();
        while self.peek_kind() == SyntaxKind::AndKeyword {
            let operator = self.bump();
            let (right, right_value) = self.not_condition();
            left = binary(left, operator, right);
            value = value && right_value;
        }
        (left, value)
    }

    fn not_condition(&mut self) -> (GreenElement, bool) {
        if self.peek_kind() != SyntaxKind::NotKeyword {
            return self.primary_condition();
        }
        let operator = self.bump();
        let (operand, value) = ensure_sufficient_stack(|| self.not_condition());
        let node = GreenNode::new(
            SyntaxKind::UnaryExpression,
            vec![Some(operator.into()), Some(operand)],
        );
        (node.into(), !value)
    }

    fn primary_condition(&mut self) -> (GreenElement, bool) {
        match self.peek_kind() {
            SyntaxKind::TrueKeyword => {
                let token = self.bump();
                let node =
                    GreenNode::new(SyntaxKind::TrueLiteralExpression, vec![Some(token.into())]);
                (node.into(), true)
            }
            SyntaxKind::FalseKeyword => {
                let token = self.bump();
                let node =
                    GreenNode::new(SyntaxKind::FalseLiteralExpression, vec![Some(token.into())]);
                (node.into(), false)
            }
            SyntaxKind::Identifier => {
                let token = self.bump();
                let value = self.lexer.preprocessor.is_defined(token.text());
                let node = GreenNode::new(SyntaxKind::IdentifierName, vec![Some(token.into())]);
                (node.into(), value)
            }
            SyntaxKind::OpenParen => {
                let open = self.bump();
                let (inner, value) = ensure_sufficient_stack(|| self.condition());
                let close = if self.peek_kind() == SyntaxKind::CloseParen {
                    self.bump()
                } else {
                    Arc::new(GreenToken::missing(
                        SyntaxKind::CloseParen,
                        vec![Diagnostic::new(ErrorCode::E1001, 0, 0).with_arg(")")],
                    ))
                };
                let node = GreenNode::new(
                    SyntaxKind::ParenthesizedExpression,
                    vec![Some(open.into()), Some(inner), Some(close.into())],
                );
                (node.into(), value)
            }
            _ => {
                let missing = GreenToken::missing(
                    SyntaxKind::Identifier,
                    vec![Diagnostic::new(ErrorCode::E0508, 0, 0)],
                );
                let node = GreenNode::new(SyntaxKind::IdentifierName, vec![Some(missing.into())]);
                (node.into(), false)
            }
        }
    }
}

fn binary(left: GreenElement, operator: Arc<GreenToken>, right: GreenElement) -> GreenElement {
    GreenNode::new(
        SyntaxKind::BinaryExpression,
        vec![Some(left), Some(operator.into()), Some(right)],
    )
    .into()
}

fn directive_node(
    kind: SyntaxKind,
    children: Vec<GreenElement>,
    diagnostics: Vec<Diagnostic>,
) -> GreenNode {
    GreenNode::with_diagnostics(kind, children.into_iter().map(Some).collect(), diagnostics)
}

/// Width of `#keyword`, from the `#` to the end of the keyword.
fn head_width(hash: &GreenToken, keyword: &GreenToken) -> u32 {
    hash.width() + hash.trailing_width() + keyword.leading_width() + keyword.width()
}

fn unmatched(matched: bool, hash: &GreenToken, keyword: &GreenToken) -> Vec<Diagnostic> {
    if matched {
        return Vec::new();
    }
    vec![
        Diagnostic::new(ErrorCode::E0503, hash.leading_width(), head_width(hash, keyword))
            .with_arg(keyword.text()),
    ]
}

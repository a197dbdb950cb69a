//! Prefix expressions and their suffixes.
//!
//! A prefix expression is a name or a parenthesized expression, followed
//! by any number of `.name`, `[key]`, `:name args` and call arguments.
//! Arguments are chosen by the next token alone: `(`, a string literal or
//! a table constructor.

use std::sync::Arc;

use lunar_diagnostic::{Diagnostic, ErrorCode};
use lunar_syntax::{GreenNode, SyntaxKind};
use tracing::trace;

use super::expr::missing_expression;
use super::{missing, node};
use crate::Parser;

impl Parser<'_> {
    pub(crate) fn prefix_expression(&mut self) -> Arc<GreenNode> {
        let mut expression = match self.cursor.current_kind() {
            SyntaxKind::Identifier => {
                let name = self.bump();
                node(SyntaxKind::IdentifierName, vec![name.into()])
            }
            SyntaxKind::OpenParen => {
                let open = self.bump();
                let inner = self.expression();
                let close = self.expect(SyntaxKind::CloseParen);
                node(
                    SyntaxKind::ParenthesizedExpression,
                    vec![open.into(), inner.into(), close.into()],
                )
            }
            _ => return missing_expression(),
        };

        loop {
            expression = match self.cursor.current_kind() {
                SyntaxKind::Dot => {
                    let dot = self.bump();
                    let name = self.expect_identifier();
                    node(
                        SyntaxKind::MemberAccessExpression,
                        vec![expression.into(), dot.into(), name.into()],
                    )
                }
                SyntaxKind::OpenBracket => {
                    let open = self.bump();
                    let key = self.expression();
                    let close = self.expect(SyntaxKind::CloseBracket);
                    node(
                        SyntaxKind::ElementAccessExpression,
                        vec![expression.into(), open.into(), key.into(), close.into()],
                    )
                }
                SyntaxKind::Colon => {
                    let colon = self.bump();
                    let name = self.expect_identifier();
                    let arguments = self.arguments();
                    node(
                        SyntaxKind::MethodCallExpression,
                        vec![expression.into(), colon.into(), name.into(), arguments.into()],
                    )
                }
                SyntaxKind::OpenParen
                | SyntaxKind::StringLiteral
                | SyntaxKind::InterpolatedStringStart
                | SyntaxKind::OpenBrace => {
                    let arguments = self.arguments();
                    node(
                        SyntaxKind::FunctionCallExpression,
                        vec![expression.into(), arguments.into()],
                    )
                }
                SyntaxKind::NumericLiteral if self.cursor.current().text().starts_with('.') => {
                    // `a.1` lexes as `a` and `.1`: an access with neither
                    // dot nor name. The number is left for the caller.
                    trace!("numeric literal after prefix expression");
                    let dot = missing(SyntaxKind::Dot, None);
                    let name = missing(
                        SyntaxKind::Identifier,
                        Some(Diagnostic::new(ErrorCode::E1003, 0, 0)),
                    );
                    return node(
                        SyntaxKind::MemberAccessExpression,
                        vec![expression.into(), dot.into(), name.into()],
                    );
                }
                _ => return expression,
            };
        }
    }

    fn arguments(&mut self) -> Arc<GreenNode> {
        match self.cursor.current_kind() {
            SyntaxKind::StringLiteral => {
                let token = self.bump();
                let literal = node(SyntaxKind::StringLiteralExpression, vec![token.into()]);
                node(SyntaxKind::StringFunctionArgument, vec![literal.into()])
            }
            SyntaxKind::InterpolatedStringStart => {
                let literal = self.interpolated_string();
                node(SyntaxKind::StringFunctionArgument, vec![literal.into()])
            }
            SyntaxKind::OpenBrace => {
                let table = self.table_constructor();
                node(SyntaxKind::TableConstructorFunctionArgument, vec![table.into()])
            }
            _ => {
                let open = self.expect(SyntaxKind::OpenParen);
                let list = if self.at(SyntaxKind::CloseParen) || open.is_missing() {
                    node(SyntaxKind::ExpressionList, Vec::new())
                } else {
                    self.expression_list()
                };
                let close = if open.is_missing() {
                    missing(SyntaxKind::CloseParen, None)
                } else {
                    self.expect(SyntaxKind::CloseParen)
                };
                node(
                    SyntaxKind::ParenthesizedArgumentList,
                    vec![open.into(), list.into(), close.into()],
                )
            }
        }
    }
}

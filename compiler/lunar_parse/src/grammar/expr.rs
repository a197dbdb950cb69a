//! Expressions.
//!
//! Binary operators are parsed by precedence climbing over a fixed table,
//! loosest first:
//!
//! | Level | Operators | Associativity |
//! |---|---|---|
//! | 1 | `or` | left |
//! | 2 | `and` | left |
//! | 3 | `< > <= >= ~= ==` | left |
//! | 4 | `\|` | left |
//! | 5 | `~` | left |
//! | 6 | `&` | left |
//! | 7 | `<< >>` | left |
//! | 8 | `..` | right |
//! | 9 | `+ -` | left |
//! | 10 | `* / // %` | left |
//! | 11 | unary `not # - ~` | |
//! | 12 | `^` | right |
//!
//! A unary operand is parsed at level 11, so `-a^b` is `-(a^b)` while
//! `-a + b` is `(-a) + b`.

use std::sync::Arc;

use lunar_diagnostic::{Diagnostic, ErrorCode};
use lunar_stack::ensure_sufficient_stack;
use lunar_syntax::{GreenElement, GreenNode, SyntaxKind};

use super::{missing, node};
use crate::recovery::TokenSet;
use crate::Parser;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Associativity {
    Left,
    Right,
}

/// Level of unary operators and of their operands.
const UNARY_PRECEDENCE: u8 = 11;

fn binary_operator(kind: SyntaxKind) -> Option<(u8, Associativity)> {
    use Associativity::{Left, Right};
    let operator = match kind {
        SyntaxKind::OrKeyword => (1, Left),
        SyntaxKind::AndKeyword => (2, Left),
        SyntaxKind::LessThan
        | SyntaxKind::GreaterThan
        | SyntaxKind::LessThanEquals
        | SyntaxKind::GreaterThanEquals
        | SyntaxKind::TildeEquals
        | SyntaxKind::EqualsEquals => (3, Left),
        SyntaxKind::Pipe => (4, Left),
        SyntaxKind::Tilde => (5, Left),
        SyntaxKind::Ampersand => (6, Left),
        SyntaxKind::LessThanLessThan | SyntaxKind::GreaterThanGreaterThan => (7, Left),
        SyntaxKind::DotDot => (8, Right),
        SyntaxKind::Plus | SyntaxKind::Minus => (9, Left),
        SyntaxKind::Star | SyntaxKind::Slash | SyntaxKind::SlashSlash | SyntaxKind::Percent => {
            (10, Left)
        }
        SyntaxKind::Caret => (12, Right),
        _ => return None,
    };
    Some(operator)
}

fn is_unary_operator(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::NotKeyword | SyntaxKind::Hash | SyntaxKind::Minus | SyntaxKind::Tilde
    )
}

/// A missing identifier standing in for an expression.
pub(crate) fn missing_expression() -> Arc<GreenNode> {
    let token = missing(
        SyntaxKind::Identifier,
        Some(Diagnostic::new(ErrorCode::E1002, 0, 0)),
    );
    node(SyntaxKind::IdentifierName, vec![token.into()])
}

impl Parser<'_> {
    pub(crate) fn expression(&mut self) -> Arc<GreenNode> {
        self.binary_expression(0)
    }

    /// Operators binding at least as tightly as `floor`.
    fn binary_expression(&mut self, floor: u8) -> Arc<GreenNode> {
        ensure_sufficient_stack(|| self.binary_expression_inner(floor))
    }

    fn binary_expression_inner(&mut self, floor: u8) -> Arc<GreenNode> {
        let mut left = if is_unary_operator(self.cursor.current_kind()) {
            let operator = self.bump();
            let operand = self.binary_expression(UNARY_PRECEDENCE);
            node(SyntaxKind::UnaryExpression, vec![operator.into(), operand.into()])
        } else {
            self.simple_expression()
        };

        while let Some((precedence, associativity)) = binary_operator(self.cursor.current_kind()) {
            if precedence < floor {
                break;
            }
            let operator = self.bump();
            let right_floor = match associativity {
                Associativity::Left => precedence + 1,
                Associativity::Right => precedence,
            };
            let right = self.binary_expression(right_floor);
            left = node(
                SyntaxKind::BinaryExpression,
                vec![left.into(), operator.into(), right.into()],
            );
        }
        left
    }

    fn simple_expression(&mut self) -> Arc<GreenNode> {
        let literal = match self.cursor.current_kind() {
            SyntaxKind::NilKeyword => SyntaxKind::NilLiteralExpression,
            SyntaxKind::TrueKeyword => SyntaxKind::TrueLiteralExpression,
            SyntaxKind::FalseKeyword => SyntaxKind::FalseLiteralExpression,
            SyntaxKind::NumericLiteral => SyntaxKind::NumericalLiteralExpression,
            SyntaxKind::StringLiteral => SyntaxKind::StringLiteralExpression,
            SyntaxKind::DotDotDot => SyntaxKind::VarArgExpression,
            SyntaxKind::InterpolatedStringStart => return self.interpolated_string(),
            SyntaxKind::FunctionKeyword => return self.anonymous_function(),
            SyntaxKind::OpenBrace => return self.table_constructor(),
            _ => return self.prefix_expression(),
        };
        let token = self.bump();
        node(literal, vec![token.into()])
    }

    /// `expression (',' expression)*`
    pub(crate) fn expression_list(&mut self) -> Arc<GreenNode> {
        let mut children: Vec<GreenElement> = vec![self.expression().into()];
        while let Some(comma) = self.eat(SyntaxKind::Comma) {
            children.push(comma.into());
            children.push(self.expression().into());
        }
        node(SyntaxKind::ExpressionList, children)
    }

    /// At `InterpolatedStringStart`. The lexer always closes an
    /// interpolated string, with missing tokens if it has to.
    pub(crate) fn interpolated_string(&mut self) -> Arc<GreenNode> {
        let mut children: Vec<GreenElement> = vec![self.bump().into()];
        loop {
            match self.cursor.current_kind() {
                SyntaxKind::InterpolatedStringText => {
                    let text = self.bump();
                    let segment = node(SyntaxKind::InterpolatedStringSegment, vec![text.into()]);
                    children.push(segment.into());
                }
                SyntaxKind::InterpolationStart => children.push(self.interpolation().into()),
                _ => break,
            }
        }
        children.push(self.expect(SyntaxKind::InterpolatedStringEnd).into());
        node(SyntaxKind::InterpolatedStringExpression, children)
    }

    fn interpolation(&mut self) -> Arc<GreenNode> {
        let open = self.bump();
        let expression = self.expression();
        self.skip_until(
            TokenSet::new(&[SyntaxKind::InterpolationEnd]),
            Diagnostic::new(ErrorCode::E1001, 0, 0).with_arg("}"),
        );
        let close = self.expect(SyntaxKind::InterpolationEnd);
        node(
            SyntaxKind::Interpolation,
            vec![open.into(), expression.into(), close.into()],
        )
    }
}

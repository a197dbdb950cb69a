//! Table constructors.

use std::sync::Arc;

use lunar_diagnostic::{Diagnostic, ErrorCode};
use lunar_syntax::{GreenElement, GreenNode, SyntaxKind};

use super::node;
use crate::recovery::{TokenSet, BLOCK_END, EXPRESSION_START, TABLE_FIELD_RECOVERY};
use crate::Parser;

/// Tokens that mean the constructor was left open: the table ends with a
/// missing `}` and the enclosing statement or block takes over.
const LEAVES_TABLE: TokenSet = TokenSet::new(&[
    SyntaxKind::LocalKeyword,
    SyntaxKind::DoKeyword,
    SyntaxKind::WhileKeyword,
    SyntaxKind::RepeatKeyword,
    SyntaxKind::IfKeyword,
    SyntaxKind::ForKeyword,
    SyntaxKind::ReturnKeyword,
    SyntaxKind::BreakKeyword,
    SyntaxKind::GotoKeyword,
    SyntaxKind::ColonColon,
])
.union(BLOCK_END);

fn is_field_separator(kind: SyntaxKind) -> bool {
    matches!(kind, SyntaxKind::Comma | SyntaxKind::Semicolon)
}

impl Parser<'_> {
    /// `'{' (field (sep field)* sep?)? '}'`, at `{`.
    pub(crate) fn table_constructor(&mut self) -> Arc<GreenNode> {
        let open = self.bump();
        let mut fields: Vec<GreenElement> = Vec::new();

        loop {
            let kind = self.cursor.current_kind();
            if kind == SyntaxKind::CloseBrace || self.cursor.is_at_end() {
                break;
            }
            if kind == SyntaxKind::OpenBracket || EXPRESSION_START.contains(kind) {
                fields.push(self.table_field().into());
            } else if !is_field_separator(kind) && !self.skip_invalid_field() {
                break;
            }

            match self.cursor.current_kind() {
                SyntaxKind::Comma | SyntaxKind::Semicolon => fields.push(self.bump().into()),
                SyntaxKind::CloseBrace | SyntaxKind::EndOfFile => break,
                // Junk right after a field; the separator it stops at is
                // pushed on the next turn.
                _ => {
                    if !self.skip_invalid_field() {
                        break;
                    }
                }
            }
        }

        let list = node(SyntaxKind::TableFieldList, fields);
        let close = self.expect(SyntaxKind::CloseBrace);
        node(
            SyntaxKind::TableConstructorExpression,
            vec![open.into(), list.into(), close.into()],
        )
    }

    /// Skip at least the current token, which cannot start a field, up to
    /// the next recovery point. Returns whether the field list goes on.
    fn skip_invalid_field(&mut self) -> bool {
        if LEAVES_TABLE.contains(self.cursor.current_kind()) {
            return false;
        }
        self.skip_past(TABLE_FIELD_RECOVERY, Diagnostic::new(ErrorCode::E1008, 0, 0));
        is_field_separator(self.cursor.current_kind())
    }

    fn table_field(&mut self) -> Arc<GreenNode> {
        if self.at(SyntaxKind::OpenBracket) {
            let open = self.bump();
            let key = self.expression();
            let close = self.expect(SyntaxKind::CloseBracket);
            let equals = self.expect(SyntaxKind::Equals);
            let value = self.expression();
            return node(
                SyntaxKind::ExpressionKeyedTableField,
                vec![open.into(), key.into(), close.into(), equals.into(), value.into()],
            );
        }

        if self.at(SyntaxKind::Identifier) && self.cursor.peek_kind(1) == SyntaxKind::Equals {
            let name = self.bump();
            let equals = self.bump();
            let value = self.expression();
            return node(
                SyntaxKind::IdentifierKeyedTableField,
                vec![name.into(), equals.into(), value.into()],
            );
        }

        let value = self.expression();
        node(SyntaxKind::UnkeyedTableField, vec![value.into()])
    }
}

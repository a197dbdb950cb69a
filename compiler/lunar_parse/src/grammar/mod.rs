//! Grammar productions.
//!
//! # Module Structure
//!
//! - `expr.rs`: precedence climbing, unary operators, simple expressions
//! - `postfix.rs`: prefix expressions, member/element access, calls
//! - `table.rs`: table constructors
//! - `function.rs`: function names, parameter lists and bodies
//! - `stmt.rs`: blocks and statements
//!
//! # Node Layouts
//!
//! Slots in order; `?` marks a slot that is `None` when absent, and
//! `(a, ',')*` a flattened separated list.
//!
//! | Node | Slots |
//! |---|---|
//! | `CompilationUnit` | `Block`, end of file |
//! | `Block` | `StatementList`, `ReturnStatement?`, `StatementList?` (empty statements after the return) |
//! | `LocalVariableDeclarationStatement` | `local`, `LocalDeclarationNameList`, `EqualsValuesClause?` |
//! | `LocalDeclarationName` | `IdentifierName`, `VariableAttribute?` |
//! | `VariableAttribute` | `<`, identifier, `>` |
//! | `LocalFunctionDeclarationStatement` | `local`, `function`, `IdentifierName`, `ParameterList`, `Block`, `end` |
//! | `FunctionDeclarationStatement` | `function`, name, `ParameterList`, `Block`, `end` |
//! | `SimpleFunctionName` | identifier |
//! | `MemberFunctionName` / `MethodFunctionName` | name, `.` or `:`, identifier |
//! | `ParameterList` | `(`, (parameter, `,`)*, `)` |
//! | `AssignmentStatement` | `ExpressionList`, `=`, `ExpressionList` |
//! | `CompoundAssignmentStatement` | target, operator, value |
//! | `ExpressionStatement` | call expression |
//! | `EmptyStatement` | `;` (missing, with any rejected expression as skipped trivia) |
//! | `DoStatement` | `do`, `Block`, `end` |
//! | `WhileStatement` | `while`, condition, `do`, `Block`, `end` |
//! | `RepeatUntilStatement` | `repeat`, `Block`, `until`, condition |
//! | `IfStatement` | `if`, condition, `then`, `Block`, `ElseIfClauseList?`, `ElseClause?`, `end` |
//! | `ElseIfClause` | `elseif`, condition, `then`, `Block` |
//! | `ElseClause` | `else`, `Block` |
//! | `NumericForStatement` | `for`, `IdentifierName`, `=`, start, `,`, limit, `,`?, step?, `do`, `Block`, `end` |
//! | `GenericForStatement` | `for`, `IdentifierList`, `in`, `ExpressionList`, `do`, `Block`, `end` |
//! | `ReturnStatement` | `return`, `ExpressionList?` |
//! | `GotoStatement` | `goto`, identifier |
//! | `GotoLabelStatement` | `::`, identifier, `::` |
//! | `BinaryExpression` | left, operator, right |
//! | `UnaryExpression` | operator, operand |
//! | `MemberAccessExpression` | expression, `.`, identifier |
//! | `ElementAccessExpression` | expression, `[`, key, `]` |
//! | `FunctionCallExpression` | expression, arguments |
//! | `MethodCallExpression` | expression, `:`, identifier, arguments |
//! | `ParenthesizedArgumentList` | `(`, `ExpressionList`, `)` |
//! | `TableConstructorExpression` | `{`, `TableFieldList`, `}` |
//! | `InterpolatedStringExpression` | start, (`InterpolatedStringSegment` or `Interpolation`)*, end |
//! | `Interpolation` | `#{`, expression, `}` |

mod expr;
mod function;
mod postfix;
mod stmt;
mod table;

use std::sync::Arc;

use lunar_diagnostic::{Diagnostic, ErrorCode};
use lunar_syntax::{GreenElement, GreenNode, GreenToken, SyntaxKind};

use crate::Parser;

/// A node from its present children.
pub(crate) fn node(kind: SyntaxKind, children: Vec<GreenElement>) -> Arc<GreenNode> {
    Arc::new(GreenNode::new(kind, children.into_iter().map(Some).collect()))
}

/// A node whose slots may be absent.
pub(crate) fn node_with_slots(
    kind: SyntaxKind,
    slots: Vec<Option<GreenElement>>,
) -> Arc<GreenNode> {
    Arc::new(GreenNode::new(kind, slots))
}

/// `node` with a diagnostic covering its text, outer trivia excluded.
pub(crate) fn flag_node(node: &GreenNode, diagnostic: Diagnostic) -> Arc<GreenNode> {
    let leading = node.first_token().map_or(0, |t| t.leading_width());
    let trailing = node.last_token().map_or(0, |t| t.trailing_width());
    let width = node.full_width().saturating_sub(leading + trailing);
    Arc::new(node.with_diagnostic(Diagnostic {
        offset: leading,
        width,
        ..diagnostic
    }))
}

/// `token` with a diagnostic covering its text.
pub(crate) fn flag_token(token: &GreenToken, diagnostic: Diagnostic) -> Arc<GreenToken> {
    Arc::new(token.with_diagnostic(Diagnostic {
        offset: token.leading_width(),
        width: token.width(),
        ..diagnostic
    }))
}

/// A zero-width placeholder for an absent token.
pub(crate) fn missing(kind: SyntaxKind, diagnostic: Option<Diagnostic>) -> Arc<GreenToken> {
    Arc::new(GreenToken::missing(kind, diagnostic.into_iter().collect()))
}

impl Parser<'_> {
    #[inline]
    pub(crate) fn at(&mut self, kind: SyntaxKind) -> bool {
        self.cursor.current_kind() == kind
    }

    pub(crate) fn bump(&mut self) -> Arc<GreenToken> {
        self.cursor.advance()
    }

    /// Consume the current token if it is `kind`.
    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> Option<Arc<GreenToken>> {
        self.at(kind).then(|| self.bump())
    }

    /// The current token if it is `kind`, otherwise a missing `kind`
    /// reporting "`kind` expected".
    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> Arc<GreenToken> {
        match self.eat(kind) {
            Some(token) => token,
            None => missing(
                kind,
                Some(Diagnostic::new(ErrorCode::E1001, 0, 0).with_arg(kind.display_name())),
            ),
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Arc<GreenToken> {
        match self.eat(SyntaxKind::Identifier) {
            Some(token) => token,
            None => missing(
                SyntaxKind::Identifier,
                Some(Diagnostic::new(ErrorCode::E1003, 0, 0)),
            ),
        }
    }

    /// `IdentifierName` over the current identifier, or over a missing one.
    pub(crate) fn identifier_name(&mut self) -> Arc<GreenNode> {
        let token = self.expect_identifier();
        node(SyntaxKind::IdentifierName, vec![token.into()])
    }
}

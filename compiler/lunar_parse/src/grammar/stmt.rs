//! Blocks and statements.
//!
//! Which tokens close a block depends on the construct: `if` bodies stop
//! at `elseif`, `else` or `end`, `repeat` bodies at `until`, other bodies
//! at `end`, and the top-level block only at end of file. A terminator that
//! does not close the current block is skipped like any other token that
//! cannot start a statement.

use std::sync::Arc;

use lunar_diagnostic::{Diagnostic, ErrorCode};
use lunar_stack::ensure_sufficient_stack;
use lunar_syntax::{Feature, GreenElement, GreenNode, GreenToken, SyntaxKind};
use tracing::{debug, trace};

use super::{flag_node, flag_token, missing, node, node_with_slots};
use crate::recovery::{
    missing_after_skipped, missing_after_skipped_node, TokenSet, BLOCK_END, EXPRESSION_START,
    STATEMENT_START,
};
use crate::Parser;

/// Bodies closed by `end`.
pub(crate) const END: TokenSet = TokenSet::new(&[SyntaxKind::EndKeyword]);

/// Bodies of `if` and `elseif` clauses.
const IF_BODY_END: TokenSet = TokenSet::new(&[
    SyntaxKind::ElseIfKeyword,
    SyntaxKind::ElseKeyword,
    SyntaxKind::EndKeyword,
]);

const UNTIL: TokenSet = TokenSet::new(&[SyntaxKind::UntilKeyword]);

/// The top-level block ends only at end of file.
const NOTHING: TokenSet = TokenSet::new(&[]);

const LOCAL_ATTRIBUTES: [&str; 2] = ["const", "close"];

fn is_assignable(expression: &GreenNode) -> bool {
    matches!(
        expression.kind(),
        SyntaxKind::IdentifierName
            | SyntaxKind::MemberAccessExpression
            | SyntaxKind::ElementAccessExpression
    )
}

fn assignment_target(expression: Arc<GreenNode>) -> Arc<GreenNode> {
    if is_assignable(&expression) {
        expression
    } else {
        flag_node(&expression, Diagnostic::new(ErrorCode::E1007, 0, 0))
    }
}

fn is_call(expression: &GreenNode) -> bool {
    matches!(
        expression.kind(),
        SyntaxKind::FunctionCallExpression | SyntaxKind::MethodCallExpression
    )
}

impl Parser<'_> {
    pub(crate) fn compilation_unit(&mut self) -> Arc<GreenNode> {
        debug!(version = ?self.options.version(), "parsing compilation unit");
        let block = self.block(NOTHING);
        // Only cancellation stops the top-level block before end of file.
        let end_of_file = self
            .eat(SyntaxKind::EndOfFile)
            .unwrap_or_else(|| missing(SyntaxKind::EndOfFile, None));
        node(
            SyntaxKind::CompilationUnit,
            vec![block.into(), end_of_file.into()],
        )
    }

    /// Statements up to a token in `ends` or end of file.
    pub(crate) fn block(&mut self, ends: TokenSet) -> Arc<GreenNode> {
        ensure_sufficient_stack(|| self.block_inner(ends))
    }

    fn block_inner(&mut self, ends: TokenSet) -> Arc<GreenNode> {
        let mut statements: Vec<GreenElement> = Vec::new();
        let mut last: Option<(Arc<GreenNode>, Vec<GreenElement>)> = None;

        loop {
            if self.should_stop() {
                break;
            }
            let kind = self.cursor.current_kind();
            if self.cursor.is_at_end() || ends.contains(kind) {
                break;
            }

            if kind == SyntaxKind::ReturnKeyword {
                let statement = self.return_statement();
                let mut empties: Vec<GreenElement> = Vec::new();
                while let Some(semicolon) = self.eat(SyntaxKind::Semicolon) {
                    empties.push(node(SyntaxKind::EmptyStatement, vec![semicolon.into()]).into());
                }
                if self.cursor.is_at_end() || ends.contains(self.cursor.current_kind()) {
                    last = Some((statement, empties));
                    break;
                }
                trace!("return is not the last statement");
                let misplaced = flag_node(&statement, Diagnostic::new(ErrorCode::E1005, 0, 0));
                statements.push(misplaced.into());
                statements.extend(empties);
                continue;
            }

            if !STATEMENT_START.contains(kind) {
                self.skip_invalid(ends);
                continue;
            }
            statements.push(self.statement_at_start().into());
        }

        let list = node(SyntaxKind::StatementList, statements);
        let (return_statement, trailing): (Option<GreenElement>, Option<GreenElement>) =
            match last {
                Some((statement, empties)) => (
                    Some(statement.into()),
                    Some(node(SyntaxKind::StatementList, empties).into()),
                ),
                None => (None, None),
            };
        node_with_slots(
            SyntaxKind::Block,
            vec![Some(list.into()), return_statement, trailing],
        )
    }

    /// Skip a run of tokens that cannot begin a statement.
    fn skip_invalid(&mut self, ends: TokenSet) {
        self.skip_past(
            STATEMENT_START.union(ends),
            Diagnostic::new(ErrorCode::E1009, 0, 0),
        );
    }

    pub(crate) fn statement(&mut self) -> Arc<GreenNode> {
        if !STATEMENT_START.contains(self.cursor.current_kind()) {
            self.skip_invalid(BLOCK_END);
            if !STATEMENT_START.contains(self.cursor.current_kind()) {
                let semicolon = missing(SyntaxKind::Semicolon, None);
                return node(SyntaxKind::EmptyStatement, vec![semicolon.into()]);
            }
        }
        self.statement_at_start()
    }

    fn statement_at_start(&mut self) -> Arc<GreenNode> {
        let kind = self.cursor.current_kind();
        trace!(?kind, "statement");
        match kind {
            SyntaxKind::Semicolon => {
                let semicolon = self.bump();
                node(SyntaxKind::EmptyStatement, vec![semicolon.into()])
            }
            SyntaxKind::LocalKeyword => self.local_statement(),
            SyntaxKind::FunctionKeyword if self.cursor.peek_kind(1) != SyntaxKind::OpenParen => {
                self.function_declaration()
            }
            SyntaxKind::DoKeyword => {
                let keyword = self.bump();
                let block = self.block(END);
                let end = self.expect(SyntaxKind::EndKeyword);
                node(
                    SyntaxKind::DoStatement,
                    vec![keyword.into(), block.into(), end.into()],
                )
            }
            SyntaxKind::WhileKeyword => self.while_statement(),
            SyntaxKind::RepeatKeyword => self.repeat_statement(),
            SyntaxKind::IfKeyword => {
                let keyword = self.bump();
                self.if_statement(keyword)
            }
            SyntaxKind::ElseIfKeyword => self.misplaced_elseif(),
            SyntaxKind::ForKeyword => self.for_statement(),
            SyntaxKind::ReturnKeyword => self.return_statement(),
            SyntaxKind::BreakKeyword => {
                let keyword = self.bump();
                node(SyntaxKind::BreakStatement, vec![keyword.into()])
            }
            SyntaxKind::GotoKeyword => {
                let keyword = self.bump();
                let label = self.expect_identifier();
                node(SyntaxKind::GotoStatement, vec![keyword.into(), label.into()])
            }
            SyntaxKind::ColonColon => self.label_statement(),
            _ => self.expression_statement(),
        }
    }

    // === Declarations ===

    fn local_statement(&mut self) -> Arc<GreenNode> {
        let local = self.bump();

        if let Some(function) = self.eat(SyntaxKind::FunctionKeyword) {
            let name = self.identifier_name();
            let mut children: Vec<GreenElement> = vec![local.into(), function.into(), name.into()];
            self.function_body().push_into(&mut children);
            return node(SyntaxKind::LocalFunctionDeclarationStatement, children);
        }

        let mut names: Vec<GreenElement> = vec![self.local_declaration_name().into()];
        while let Some(comma) = self.eat(SyntaxKind::Comma) {
            names.push(comma.into());
            names.push(self.local_declaration_name().into());
        }
        let names = node(SyntaxKind::LocalDeclarationNameList, names);

        let values: Option<GreenElement> = self.eat(SyntaxKind::Equals).map(|equals| {
            let values = self.expression_list();
            node(
                SyntaxKind::EqualsValuesClause,
                vec![equals.into(), values.into()],
            )
            .into()
        });
        node_with_slots(
            SyntaxKind::LocalVariableDeclarationStatement,
            vec![Some(local.into()), Some(names.into()), values],
        )
    }

    fn local_declaration_name(&mut self) -> Arc<GreenNode> {
        let name = self.identifier_name();
        let attribute: Option<GreenElement> =
            self.at(SyntaxKind::LessThan).then(|| self.variable_attribute().into());
        node_with_slots(
            SyntaxKind::LocalDeclarationName,
            vec![Some(name.into()), attribute],
        )
    }

    /// `'<' name '>'`, at `<`.
    fn variable_attribute(&mut self) -> Arc<GreenNode> {
        let open = self.bump();
        let mut name = self.expect_identifier();
        if !name.is_missing() && !LOCAL_ATTRIBUTES.contains(&name.text()) {
            let diagnostic = Diagnostic::new(ErrorCode::E1010, 0, 0).with_arg(name.text());
            name = flag_token(&name, diagnostic);
        }
        let close = self.expect(SyntaxKind::GreaterThan);
        let attribute = node(
            SyntaxKind::VariableAttribute,
            vec![open.into(), name.into(), close.into()],
        );
        self.gate(Feature::LocalAttributes, attribute)
    }

    fn function_declaration(&mut self) -> Arc<GreenNode> {
        let function = self.bump();
        let name = self.function_name();
        let mut children: Vec<GreenElement> = vec![function.into(), name.into()];
        self.function_body().push_into(&mut children);
        node(SyntaxKind::FunctionDeclarationStatement, children)
    }

    /// `'::' name '::'`, at `::`.
    fn label_statement(&mut self) -> Arc<GreenNode> {
        let open = self.bump();
        let name = self.expect_identifier();
        let close = self.expect(SyntaxKind::ColonColon);
        let label = node(
            SyntaxKind::GotoLabelStatement,
            vec![open.into(), name.into(), close.into()],
        );
        self.gate(Feature::Goto, label)
    }

    /// `node` with a feature diagnostic if `feature` is unavailable.
    fn gate(&self, feature: Feature, syntax: Arc<GreenNode>) -> Arc<GreenNode> {
        match self.options.feature_diagnostic(feature, 0, 0) {
            Some(diagnostic) => flag_node(&syntax, diagnostic),
            None => syntax,
        }
    }

    // === Control flow ===

    fn while_statement(&mut self) -> Arc<GreenNode> {
        let keyword = self.bump();
        let condition = self.expression();
        let do_keyword = self.expect(SyntaxKind::DoKeyword);
        let block = self.block(END);
        let end = self.expect(SyntaxKind::EndKeyword);
        node(
            SyntaxKind::WhileStatement,
            vec![
                keyword.into(),
                condition.into(),
                do_keyword.into(),
                block.into(),
                end.into(),
            ],
        )
    }

    fn repeat_statement(&mut self) -> Arc<GreenNode> {
        let keyword = self.bump();
        let block = self.block(UNTIL);
        let until = self.expect(SyntaxKind::UntilKeyword);
        let condition = self.expression();
        node(
            SyntaxKind::RepeatUntilStatement,
            vec![keyword.into(), block.into(), until.into(), condition.into()],
        )
    }

    /// The rest of an `if` statement after its keyword.
    fn if_statement(&mut self, keyword: Arc<GreenToken>) -> Arc<GreenNode> {
        let condition = self.expression();
        let then = self.expect(SyntaxKind::ThenKeyword);
        let block = self.block(IF_BODY_END);

        let mut clauses: Vec<GreenElement> = Vec::new();
        while let Some(elseif) = self.eat(SyntaxKind::ElseIfKeyword) {
            let condition = self.expression();
            let then = self.expect(SyntaxKind::ThenKeyword);
            let block = self.block(IF_BODY_END);
            let clause = node(
                SyntaxKind::ElseIfClause,
                vec![elseif.into(), condition.into(), then.into(), block.into()],
            );
            clauses.push(clause.into());
        }
        let clauses: Option<GreenElement> =
            (!clauses.is_empty()).then(|| node(SyntaxKind::ElseIfClauseList, clauses).into());

        let else_clause: Option<GreenElement> = self.eat(SyntaxKind::ElseKeyword).map(|keyword| {
            let block = self.block(END);
            node(SyntaxKind::ElseClause, vec![keyword.into(), block.into()]).into()
        });

        let end = self.expect(SyntaxKind::EndKeyword);
        node_with_slots(
            SyntaxKind::IfStatement,
            vec![
                Some(keyword.into()),
                Some(condition.into()),
                Some(then.into()),
                Some(block.into()),
                clauses,
                else_clause,
                Some(end.into()),
            ],
        )
    }

    /// An `elseif` with no `if` to attach to: an `if` statement whose
    /// missing keyword carries the `elseif` as skipped trivia.
    fn misplaced_elseif(&mut self) -> Arc<GreenNode> {
        trace!("elseif without if");
        let elseif = self.bump();
        let keyword = missing_after_skipped(
            SyntaxKind::IfKeyword,
            vec![elseif],
            Diagnostic::new(ErrorCode::E1006, 0, 0),
        );
        self.if_statement(keyword)
    }

    fn for_statement(&mut self) -> Arc<GreenNode> {
        let keyword = self.bump();
        match self.numeric_for_names() {
            0 => self.generic_for(keyword),
            count => self.numeric_for(keyword, count),
        }
    }

    /// How many comma-separated names precede an `=`, or 0 if the loop is
    /// not numeric.
    fn numeric_for_names(&mut self) -> usize {
        self.look_ahead(|p| {
            let mut count = 0;
            while p.eat(SyntaxKind::Identifier).is_some() {
                count += 1;
                if p.eat(SyntaxKind::Comma).is_none() {
                    return if p.at(SyntaxKind::Equals) { count } else { 0 };
                }
            }
            0
        })
    }

    fn numeric_for(&mut self, keyword: Arc<GreenToken>, names: usize) -> Arc<GreenNode> {
        let name = if names == 1 {
            self.identifier_name()
        } else {
            // Names and their commas.
            let tokens = (0..names * 2 - 1).map(|_| self.bump()).collect();
            let identifier = missing_after_skipped(
                SyntaxKind::Identifier,
                tokens,
                Diagnostic::new(ErrorCode::E1004, 0, 0),
            );
            node(SyntaxKind::IdentifierName, vec![identifier.into()])
        };

        let equals = self.expect(SyntaxKind::Equals);
        let start = self.expression();
        let comma = self.expect(SyntaxKind::Comma);
        let limit = self.expression();
        let (step_comma, step): (Option<GreenElement>, Option<GreenElement>) =
            match self.eat(SyntaxKind::Comma) {
                Some(comma) => (Some(comma.into()), Some(self.expression().into())),
                None => (None, None),
            };
        let do_keyword = self.expect(SyntaxKind::DoKeyword);
        let block = self.block(END);
        let end = self.expect(SyntaxKind::EndKeyword);

        node_with_slots(
            SyntaxKind::NumericForStatement,
            vec![
                Some(keyword.into()),
                Some(name.into()),
                Some(equals.into()),
                Some(start.into()),
                Some(comma.into()),
                Some(limit.into()),
                step_comma,
                step,
                Some(do_keyword.into()),
                Some(block.into()),
                Some(end.into()),
            ],
        )
    }

    fn generic_for(&mut self, keyword: Arc<GreenToken>) -> Arc<GreenNode> {
        let mut names: Vec<GreenElement> = vec![self.identifier_name().into()];
        while let Some(comma) = self.eat(SyntaxKind::Comma) {
            names.push(comma.into());
            names.push(self.identifier_name().into());
        }
        let names = node(SyntaxKind::IdentifierList, names);
        let in_keyword = self.expect(SyntaxKind::InKeyword);
        let values = self.expression_list();
        let do_keyword = self.expect(SyntaxKind::DoKeyword);
        let block = self.block(END);
        let end = self.expect(SyntaxKind::EndKeyword);
        node(
            SyntaxKind::GenericForStatement,
            vec![
                keyword.into(),
                names.into(),
                in_keyword.into(),
                values.into(),
                do_keyword.into(),
                block.into(),
                end.into(),
            ],
        )
    }

    fn return_statement(&mut self) -> Arc<GreenNode> {
        let keyword = self.bump();
        let values: Option<GreenElement> = EXPRESSION_START
            .contains(self.cursor.current_kind())
            .then(|| self.expression_list().into());
        node_with_slots(
            SyntaxKind::ReturnStatement,
            vec![Some(keyword.into()), values],
        )
    }

    // === Expression statements ===

    /// A statement that starts with an expression: an assignment, a
    /// compound assignment or a call. Any other expression becomes an
    /// empty statement.
    fn expression_statement(&mut self) -> Arc<GreenNode> {
        let first = self.expression();
        let kind = self.cursor.current_kind();

        if kind == SyntaxKind::Comma || kind == SyntaxKind::Equals {
            return self.assignment(first);
        }
        if kind.is_compound_assignment_operator() {
            let target = assignment_target(first);
            return self.compound_assignment(target);
        }
        if is_call(&first) {
            return node(SyntaxKind::ExpressionStatement, vec![first.into()]);
        }

        // The expression stays in the tree as skipped text before a
        // missing `;`.
        trace!(kind = ?first.kind(), "expression is not a statement");
        let semicolon = missing_after_skipped_node(
            SyntaxKind::Semicolon,
            first,
            Diagnostic::new(ErrorCode::E1009, 0, 0),
        );
        node(SyntaxKind::EmptyStatement, vec![semicolon.into()])
    }

    fn assignment(&mut self, first: Arc<GreenNode>) -> Arc<GreenNode> {
        let mut targets: Vec<GreenElement> = vec![assignment_target(first).into()];
        while let Some(comma) = self.eat(SyntaxKind::Comma) {
            targets.push(comma.into());
            targets.push(assignment_target(self.expression()).into());
        }
        let targets = node(SyntaxKind::ExpressionList, targets);

        if self.cursor.current_kind().is_compound_assignment_operator() {
            let operator = self.cursor.current().text().to_owned();
            let diagnostic = Diagnostic::new(ErrorCode::E1011, 0, 0).with_arg(operator);
            let targets = flag_node(&targets, diagnostic);
            return self.compound_assignment(targets);
        }

        let equals = self.expect(SyntaxKind::Equals);
        let values = self.expression_list();
        node(
            SyntaxKind::AssignmentStatement,
            vec![targets.into(), equals.into(), values.into()],
        )
    }

    /// At a compound assignment operator.
    fn compound_assignment(&mut self, target: Arc<GreenNode>) -> Arc<GreenNode> {
        let operator = self.bump();
        let value = self.expression();
        node(
            SyntaxKind::CompoundAssignmentStatement,
            vec![target.into(), operator.into(), value.into()],
        )
    }
}

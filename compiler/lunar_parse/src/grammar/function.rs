//! Function names, parameter lists and bodies.

use std::sync::Arc;

use lunar_diagnostic::{Diagnostic, ErrorCode};
use lunar_syntax::{GreenElement, GreenNode, GreenToken, SyntaxKind};

use super::stmt::END;
use super::{flag_node, missing, node};
use crate::Parser;

/// Parameters, body and `end` of a function.
pub(crate) struct FunctionBody {
    pub(crate) parameters: Arc<GreenNode>,
    pub(crate) block: Arc<GreenNode>,
    pub(crate) end: Arc<GreenToken>,
}

impl FunctionBody {
    /// Append the body's three slots to `children`.
    pub(crate) fn push_into(self, children: &mut Vec<GreenElement>) {
        children.push(self.parameters.into());
        children.push(self.block.into());
        children.push(self.end.into());
    }
}

impl Parser<'_> {
    /// `function (params) block end` in expression position, at `function`.
    pub(crate) fn anonymous_function(&mut self) -> Arc<GreenNode> {
        let mut children: Vec<GreenElement> = vec![self.bump().into()];
        self.function_body().push_into(&mut children);
        node(SyntaxKind::AnonymousFunctionExpression, children)
    }

    pub(crate) fn function_body(&mut self) -> FunctionBody {
        let parameters = self.parameter_list();
        let block = self.block(END);
        let end = self.expect(SyntaxKind::EndKeyword);
        FunctionBody {
            parameters,
            block,
            end,
        }
    }

    /// `name ('.' name)* (':' name)?`
    ///
    /// A `.` or `:` after the method segment is reported on the whole name
    /// and left for the caller.
    pub(crate) fn function_name(&mut self) -> Arc<GreenNode> {
        let first = self.expect_identifier();
        let mut name = node(SyntaxKind::SimpleFunctionName, vec![first.into()]);

        while let Some(dot) = self.eat(SyntaxKind::Dot) {
            let segment = self.expect_identifier();
            name = node(
                SyntaxKind::MemberFunctionName,
                vec![name.into(), dot.into(), segment.into()],
            );
        }

        if let Some(colon) = self.eat(SyntaxKind::Colon) {
            let segment = self.expect_identifier();
            name = node(
                SyntaxKind::MethodFunctionName,
                vec![name.into(), colon.into(), segment.into()],
            );
            if matches!(
                self.cursor.current_kind(),
                SyntaxKind::Dot | SyntaxKind::Colon
            ) {
                name = flag_node(&name, Diagnostic::new(ErrorCode::E1012, 0, 0));
            }
        }
        name
    }

    /// `'(' (param (',' param)*)? ')'`
    ///
    /// Without the `(` no parameters are read and the `)` is missing
    /// silently.
    fn parameter_list(&mut self) -> Arc<GreenNode> {
        let open = self.expect(SyntaxKind::OpenParen);
        if open.is_missing() {
            let close = missing(SyntaxKind::CloseParen, None);
            return node(SyntaxKind::ParameterList, vec![open.into(), close.into()]);
        }

        let mut children: Vec<GreenElement> = vec![open.into()];
        if !self.at(SyntaxKind::CloseParen) {
            loop {
                children.push(self.parameter().into());
                match self.eat(SyntaxKind::Comma) {
                    Some(comma) => children.push(comma.into()),
                    None => break,
                }
            }
        }
        children.push(self.expect(SyntaxKind::CloseParen).into());
        node(SyntaxKind::ParameterList, children)
    }

    fn parameter(&mut self) -> Arc<GreenNode> {
        if let Some(dots) = self.eat(SyntaxKind::DotDotDot) {
            let vararg = node(SyntaxKind::VarArgParameter, vec![dots.into()]);
            if self.at(SyntaxKind::Comma) {
                return flag_node(&vararg, Diagnostic::new(ErrorCode::E1013, 0, 0));
            }
            return vararg;
        }
        let name = self.expect_identifier();
        node(SyntaxKind::NamedParameter, vec![name.into()])
    }
}

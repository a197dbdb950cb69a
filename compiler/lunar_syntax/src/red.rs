//! Red layer: positioned views over the green tree.
//!
//! A `SyntaxNode` pairs a green node with its absolute offset and its
//! parent. Children are materialized on demand, so building a red view
//! costs nothing until someone walks it.

use std::fmt;
use std::sync::Arc;

use lunar_diagnostic::{Diagnostic, Severity};

use crate::green::{GreenElement, GreenNode, GreenToken};
use crate::kind::SyntaxKind;
use crate::span::Span;
use crate::trivia::Trivia;
use crate::value::TokenValue;

#[derive(Clone)]
pub struct SyntaxNode {
    data: Arc<NodeData>,
}

struct NodeData {
    green: Arc<GreenNode>,
    offset: u32,
    parent: Option<SyntaxNode>,
}

#[derive(Clone)]
pub struct SyntaxToken {
    green: Arc<GreenToken>,
    offset: u32,
    parent: SyntaxNode,
}

#[derive(Clone, Debug)]
pub enum SyntaxElement {
    Node(SyntaxNode),
    Token(SyntaxToken),
}

impl SyntaxNode {
    pub fn new_root(green: Arc<GreenNode>) -> Self {
        SyntaxNode {
            data: Arc::new(NodeData {
                green,
                offset: 0,
                parent: None,
            }),
        }
    }

    fn new_child(green: Arc<GreenNode>, offset: u32, parent: SyntaxNode) -> Self {
        SyntaxNode {
            data: Arc::new(NodeData {
                green,
                offset,
                parent: Some(parent),
            }),
        }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.green.kind()
    }

    pub fn green(&self) -> &Arc<GreenNode> {
        &self.data.green
    }

    pub fn parent(&self) -> Option<&SyntaxNode> {
        self.data.parent.as_ref()
    }

    /// Span including leading trivia of the first token and trailing trivia
    /// of the last.
    pub fn full_span(&self) -> Span {
        Span::new(self.data.offset, self.data.offset + self.data.green.full_width())
    }

    /// Span of the node's text without its outer trivia.
    pub fn span(&self) -> Span {
        let full = self.full_span();
        let green = &self.data.green;
        let leading = green.first_token().map_or(0, |t| t.leading_width());
        let trailing = green.last_token().map_or(0, |t| t.trailing_width());
        let start = (full.start + leading).min(full.end);
        let end = full.end.saturating_sub(trailing).max(start);
        Span::new(start, end)
    }

    /// Child in slot `index`, if present.
    pub fn slot(&self, index: usize) -> Option<SyntaxElement> {
        let green = &self.data.green;
        let element = green.slot(index)?;
        let offset = self.data.offset
            + green.slots()[..index]
                .iter()
                .flatten()
                .map(GreenElement::full_width)
                .sum::<u32>();
        Some(self.element_at(element, offset))
    }

    pub fn slot_node(&self, index: usize) -> Option<SyntaxNode> {
        match self.slot(index)? {
            SyntaxElement::Node(n) => Some(n),
            SyntaxElement::Token(_) => None,
        }
    }

    pub fn slot_token(&self, index: usize) -> Option<SyntaxToken> {
        match self.slot(index)? {
            SyntaxElement::Token(t) => Some(t),
            SyntaxElement::Node(_) => None,
        }
    }

    fn element_at(&self, element: &GreenElement, offset: u32) -> SyntaxElement {
        match element {
            GreenElement::Node(n) => {
                SyntaxElement::Node(SyntaxNode::new_child(Arc::clone(n), offset, self.clone()))
            }
            GreenElement::Token(t) => SyntaxElement::Token(SyntaxToken {
                green: Arc::clone(t),
                offset,
                parent: self.clone(),
            }),
        }
    }

    /// Present children in order.
    pub fn children(&self) -> Vec<SyntaxElement> {
        let mut offset = self.data.offset;
        let mut out = Vec::with_capacity(self.data.green.slots().len());
        for element in self.data.green.children() {
            out.push(self.element_at(element, offset));
            offset += element.full_width();
        }
        out
    }

    pub fn child_nodes(&self) -> impl Iterator<Item = SyntaxNode> {
        self.children().into_iter().filter_map(|e| match e {
            SyntaxElement::Node(n) => Some(n),
            SyntaxElement::Token(_) => None,
        })
    }

    pub fn child_tokens(&self) -> impl Iterator<Item = SyntaxToken> {
        self.children().into_iter().filter_map(|e| match e {
            SyntaxElement::Token(t) => Some(t),
            SyntaxElement::Node(_) => None,
        })
    }

    /// This node and every node beneath it, in pre-order.
    pub fn descendants(&self) -> Vec<SyntaxNode> {
        let mut out = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            let mut children: Vec<SyntaxNode> = node.child_nodes().collect();
            children.reverse();
            stack.extend(children);
            out.push(node);
        }
        out
    }

    /// Every token beneath this node, in document order.
    pub fn tokens(&self) -> Vec<SyntaxToken> {
        let mut out = Vec::new();
        let mut stack = vec![SyntaxElement::Node(self.clone())];
        while let Some(element) = stack.pop() {
            match element {
                SyntaxElement::Token(t) => out.push(t),
                SyntaxElement::Node(n) => {
                    let mut children = n.children();
                    children.reverse();
                    stack.extend(children);
                }
            }
        }
        out
    }

    /// First descendant node (pre-order, excluding `self`) of `kind`.
    pub fn find(&self, kind: SyntaxKind) -> Option<SyntaxNode> {
        self.descendants()
            .into_iter()
            .skip(1)
            .find(|n| n.kind() == kind)
    }

    pub fn full_text(&self) -> String {
        self.data.green.full_text()
    }

    /// Source text without the outer trivia.
    pub fn text(&self) -> String {
        let full = self.full_text();
        let span = self.span();
        let start = (span.start - self.data.offset) as usize;
        let end = (span.end - self.data.offset) as usize;
        full[start..end].to_string()
    }

    pub fn contains_diagnostics(&self) -> bool {
        self.data.green.contains_diagnostics()
    }

    /// Every diagnostic in this subtree, resolved to absolute spans and
    /// sorted by position.
    pub fn diagnostics(&self) -> Vec<LocatedDiagnostic> {
        let mut out = Vec::new();
        collect_node(&self.data.green, self.data.offset, &mut out);
        out.sort_by_key(|d| (d.span.start, d.span.end));
        out
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data.green, &other.data.green) && self.data.offset == other.data.offset
    }
}

impl Eq for SyntaxNode {}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.full_span())
    }
}

impl SyntaxToken {
    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.green.kind()
    }

    pub fn green(&self) -> &Arc<GreenToken> {
        &self.green
    }

    pub fn text(&self) -> &str {
        self.green.text()
    }

    pub fn value(&self) -> &TokenValue {
        self.green.value()
    }

    pub fn parent(&self) -> &SyntaxNode {
        &self.parent
    }

    pub fn full_span(&self) -> Span {
        Span::new(self.offset, self.offset + self.green.full_width())
    }

    pub fn span(&self) -> Span {
        let start = self.offset + self.green.leading_width();
        Span::new(start, start + self.green.width())
    }

    pub fn leading_trivia(&self) -> &[Trivia] {
        self.green.leading_trivia()
    }

    pub fn trailing_trivia(&self) -> &[Trivia] {
        self.green.trailing_trivia()
    }

    pub fn is_missing(&self) -> bool {
        self.green.is_missing()
    }

    pub fn diagnostics(&self) -> Vec<LocatedDiagnostic> {
        let mut out = Vec::new();
        collect_token(&self.green, self.offset, &mut out);
        out
    }
}

impl fmt::Debug for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?} {:?}", self.kind(), self.span(), self.text())
    }
}

impl SyntaxElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            SyntaxElement::Node(n) => n.kind(),
            SyntaxElement::Token(t) => t.kind(),
        }
    }

    pub fn full_span(&self) -> Span {
        match self {
            SyntaxElement::Node(n) => n.full_span(),
            SyntaxElement::Token(t) => t.full_span(),
        }
    }

    pub fn into_node(self) -> Option<SyntaxNode> {
        match self {
            SyntaxElement::Node(n) => Some(n),
            SyntaxElement::Token(_) => None,
        }
    }

    pub fn into_token(self) -> Option<SyntaxToken> {
        match self {
            SyntaxElement::Token(t) => Some(t),
            SyntaxElement::Node(_) => None,
        }
    }
}

// === Diagnostics ===

/// A diagnostic resolved to an absolute source span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocatedDiagnostic {
    pub diagnostic: Diagnostic,
    pub span: Span,
}

impl LocatedDiagnostic {
    fn new(diagnostic: &Diagnostic, element_start: u32) -> Self {
        let start = element_start + diagnostic.offset;
        LocatedDiagnostic {
            diagnostic: diagnostic.clone(),
            span: Span::new(start, start + diagnostic.width),
        }
    }

    pub fn code(&self) -> lunar_diagnostic::ErrorCode {
        self.diagnostic.code
    }

    pub fn severity(&self) -> Severity {
        self.diagnostic.severity
    }

    pub fn message(&self) -> String {
        self.diagnostic.message()
    }
}

impl fmt::Display for LocatedDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] at {}: {}",
            self.diagnostic.severity,
            self.diagnostic.code,
            self.span,
            self.diagnostic.message()
        )
    }
}

// Iterative so that deeply nested trees cannot exhaust the stack.
fn collect_node(root: &GreenNode, root_offset: u32, out: &mut Vec<LocatedDiagnostic>) {
    let mut stack: Vec<(&GreenNode, u32)> = vec![(root, root_offset)];
    while let Some((node, offset)) = stack.pop() {
        out.extend(node.diagnostics().iter().map(|d| LocatedDiagnostic::new(d, offset)));
        if !node.contains_diagnostics() {
            continue;
        }
        let mut position = offset;
        for child in node.children() {
            if child.contains_diagnostics() {
                match child {
                    GreenElement::Node(n) => stack.push((n, position)),
                    GreenElement::Token(t) => collect_token(t, position, out),
                }
            }
            position += child.full_width();
        }
    }
}

fn collect_token(token: &GreenToken, offset: u32, out: &mut Vec<LocatedDiagnostic>) {
    out.extend(token.diagnostics().iter().map(|d| LocatedDiagnostic::new(d, offset)));
    if !token.contains_diagnostics() {
        return;
    }
    let mut position = offset;
    for trivia in token.leading_trivia() {
        if let Some(structure) = trivia.structure() {
            collect_node(structure, position, out);
        }
        position += trivia.width();
    }
    position += token.width();
    for trivia in token.trailing_trivia() {
        if let Some(structure) = trivia.structure() {
            collect_node(structure, position, out);
        }
        position += trivia.width();
    }
}

// === Tree ===

/// A parsed document: the root node plus convenience queries.
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    root: SyntaxNode,
}

impl SyntaxTree {
    pub fn new(root: Arc<GreenNode>) -> Self {
        SyntaxTree {
            root: SyntaxNode::new_root(root),
        }
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// The exact source text the tree was parsed from.
    pub fn full_text(&self) -> String {
        self.root.full_text()
    }

    pub fn diagnostics(&self) -> Vec<LocatedDiagnostic> {
        self.root.diagnostics()
    }

    pub fn has_errors(&self) -> bool {
        self.root.contains_diagnostics()
            && self
                .diagnostics()
                .iter()
                .any(|d| d.severity() == Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trivia::{TriviaKind, TriviaList};
    use lunar_diagnostic::ErrorCode;
    use pretty_assertions::assert_eq;
    use smallvec::smallvec;

    fn token(kind: SyntaxKind, text: &str, trailing: &str) -> GreenElement {
        let trailing: TriviaList = if trailing.is_empty() {
            TriviaList::new()
        } else {
            smallvec![Trivia::new(TriviaKind::Whitespace, trailing)]
        };
        GreenToken::new(kind, text, TokenValue::None, TriviaList::new(), trailing, Vec::new())
            .into()
    }

    /// `f ( x )` with a diagnostic on the argument list.
    fn call_tree() -> SyntaxNode {
        let callee = GreenNode::new(
            SyntaxKind::IdentifierName,
            vec![Some(token(SyntaxKind::Identifier, "f", " "))],
        );
        let arg = GreenNode::new(
            SyntaxKind::IdentifierName,
            vec![Some(token(SyntaxKind::Identifier, "x", " "))],
        );
        let args = GreenNode::with_diagnostics(
            SyntaxKind::ParenthesizedArgumentList,
            vec![
                Some(token(SyntaxKind::OpenParen, "(", " ")),
                Some(arg.into()),
                Some(token(SyntaxKind::CloseParen, ")", "")),
            ],
            vec![Diagnostic::new(ErrorCode::E1002, 2, 1)],
        );
        let call = GreenNode::new(
            SyntaxKind::FunctionCallExpression,
            vec![Some(callee.into()), Some(args.into())],
        );
        SyntaxNode::new_root(Arc::new(call))
    }

    #[test]
    fn slot_offsets_are_absolute() {
        let root = call_tree();
        let args = root.slot_node(1).map(|n| n.full_span());
        assert_eq!(args, Some(Span::new(2, 7)));

        let arg = root
            .slot_node(1)
            .and_then(|n| n.slot_node(1))
            .and_then(|n| n.slot_token(0));
        assert_eq!(arg.map(|t| t.span()), Some(Span::new(4, 5)));
    }

    #[test]
    fn parents_are_reachable() {
        let root = call_tree();
        let args = root.slot_node(1);
        assert_eq!(args.as_ref().and_then(|n| n.parent()), Some(&root));
    }

    #[test]
    fn tokens_in_document_order() {
        let texts: Vec<String> = call_tree()
            .tokens()
            .iter()
            .map(|t| t.text().to_string())
            .collect();
        assert_eq!(texts, vec!["f", "(", "x", ")"]);
    }

    #[test]
    fn diagnostics_resolve_to_absolute_spans() {
        let diags = call_tree().diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].span, Span::new(4, 5));
        assert_eq!(diags[0].code(), ErrorCode::E1002);
    }

    #[test]
    fn span_trims_outer_trivia() {
        let root = call_tree();
        let callee = root.slot_node(0);
        assert_eq!(callee.as_ref().map(SyntaxNode::full_span), Some(Span::new(0, 2)));
        assert_eq!(callee.map(|n| n.span()), Some(Span::new(0, 1)));
        assert_eq!(root.text(), "f ( x )");
    }

    #[test]
    fn descendants_are_preorder() {
        let kinds: Vec<SyntaxKind> =
            call_tree().descendants().iter().map(SyntaxNode::kind).collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::FunctionCallExpression,
                SyntaxKind::IdentifierName,
                SyntaxKind::ParenthesizedArgumentList,
                SyntaxKind::IdentifierName,
            ]
        );
    }
}

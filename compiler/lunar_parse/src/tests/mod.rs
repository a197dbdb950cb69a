//! Parser tests over whole programs and fragments.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests unwrap nodes whose shape they have just asserted"
)]

mod expr;
mod stmt;

use lunar_diagnostic::ErrorCode;
use lunar_syntax::{LanguageVersion, ParseOptions, SyntaxKind, SyntaxNode, SyntaxTree};

use crate::{parse, Parser, SourceBuffer};

fn lua54() -> ParseOptions {
    ParseOptions::new(LanguageVersion::Lua54)
}

/// Parse with Lua 5.4 and check the tree reproduces `source`.
fn parse_lua(source: &str) -> SyntaxTree {
    parse_with(source, &lua54())
}

fn parse_with(source: &str, options: &ParseOptions) -> SyntaxTree {
    let tree = parse(source, options);
    assert_eq!(tree.full_text(), source, "round trip of {source:?}");
    tree
}

/// Statements of the top-level statement list.
fn statements(tree: &SyntaxTree) -> Vec<SyntaxNode> {
    let block = tree.root().slot_node(0).unwrap();
    assert_eq!(block.kind(), SyntaxKind::Block);
    block.slot_node(0).unwrap().child_nodes().collect()
}

/// The only top-level statement.
fn single_statement(tree: &SyntaxTree) -> SyntaxNode {
    let mut all = statements(tree);
    assert_eq!(all.len(), 1, "statements of {:?}", tree.full_text());
    all.remove(0)
}

fn codes(tree: &SyntaxTree) -> Vec<ErrorCode> {
    tree.diagnostics().iter().map(|d| d.code()).collect()
}

/// Parse a lone expression.
fn expression(source: &str) -> SyntaxNode {
    let buffer = SourceBuffer::new(source);
    let options = lua54();
    let mut parser = Parser::new(&buffer, &options);
    SyntaxNode::new_root(parser.parse_expression())
}

/// Operators as fully parenthesized text: `a + b * c` is `(a + (b * c))`.
fn shape(node: &SyntaxNode) -> String {
    match node.kind() {
        SyntaxKind::BinaryExpression => format!(
            "({} {} {})",
            shape(&node.slot_node(0).unwrap()),
            node.slot_token(1).unwrap().text(),
            shape(&node.slot_node(2).unwrap()),
        ),
        SyntaxKind::UnaryExpression => format!(
            "({} {})",
            node.slot_token(0).unwrap().text(),
            shape(&node.slot_node(1).unwrap()),
        ),
        _ => node.text(),
    }
}

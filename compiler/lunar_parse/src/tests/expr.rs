use lunar_diagnostic::ErrorCode;
use lunar_syntax::SyntaxKind;
use pretty_assertions::assert_eq;

use super::{codes, expression, parse_with, shape, single_statement};

// === Precedence ===

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(shape(&expression("a + b * c")), "(a + (b * c))");
    assert_eq!(shape(&expression("a * b + c")), "((a * b) + c)");
}

#[test]
fn subtraction_is_left_associative() {
    assert_eq!(shape(&expression("a - b - c")), "((a - b) - c)");
}

#[test]
fn exponent_and_concatenation_are_right_associative() {
    assert_eq!(shape(&expression("a ^ b ^ c")), "(a ^ (b ^ c))");
    assert_eq!(shape(&expression("a .. b .. c")), "(a .. (b .. c))");
}

#[test]
fn unary_minus_is_looser_than_exponent() {
    assert_eq!(shape(&expression("-a ^ b")), "(- (a ^ b))");
    assert_eq!(shape(&expression("-a + b")), "((- a) + b)");
    assert_eq!(shape(&expression("2 ^ -3")), "(2 ^ (- 3))");
}

#[test]
fn unary_operators() {
    assert_eq!(shape(&expression("not a == b")), "((not a) == b)");
    assert_eq!(shape(&expression("#t + 1")), "((# t) + 1)");
    assert_eq!(shape(&expression("- - a")), "(- (- a))");
}

#[test]
fn logical_operators() {
    assert_eq!(shape(&expression("a or b and c")), "(a or (b and c))");
    assert_eq!(shape(&expression("a and b or c")), "((a and b) or c)");
}

#[test]
fn bitwise_ladder() {
    assert_eq!(
        shape(&expression("a | b ~ c & d << e")),
        "(a | (b ~ (c & (d << e))))"
    );
    assert_eq!(shape(&expression("a < b .. c")), "(a < (b .. c))");
    assert_eq!(shape(&expression("a + b .. c")), "((a + b) .. c)");
}

/// `(text, level, right associative)`
const OPERATORS: &[(&str, u8, bool)] = &[
    ("or", 1, false),
    ("and", 2, false),
    ("<", 3, false),
    (">", 3, false),
    ("<=", 3, false),
    (">=", 3, false),
    ("~=", 3, false),
    ("==", 3, false),
    ("|", 4, false),
    ("~", 5, false),
    ("&", 6, false),
    ("<<", 7, false),
    (">>", 7, false),
    ("..", 8, true),
    ("+", 9, false),
    ("-", 9, false),
    ("*", 10, false),
    ("/", 10, false),
    ("//", 10, false),
    ("%", 10, false),
    ("^", 12, true),
];

#[test]
fn every_ordered_operator_pair() {
    for &(first, first_level, _) in OPERATORS {
        for &(second, second_level, second_right) in OPERATORS {
            let source = format!("a {first} b {second} c");
            let left_first = first_level > second_level
                || (first_level == second_level && !second_right);
            let expected = if left_first {
                format!("((a {first} b) {second} c)")
            } else {
                format!("(a {first} (b {second} c))")
            };
            assert_eq!(shape(&expression(&source)), expected, "{source}");
        }
    }
}

// === Primary and postfix ===

#[test]
fn literals() {
    let cases = [
        ("nil", SyntaxKind::NilLiteralExpression),
        ("true", SyntaxKind::TrueLiteralExpression),
        ("false", SyntaxKind::FalseLiteralExpression),
        ("0x10", SyntaxKind::NumericalLiteralExpression),
        ("'s'", SyntaxKind::StringLiteralExpression),
        ("[[long]]", SyntaxKind::StringLiteralExpression),
        ("...", SyntaxKind::VarArgExpression),
    ];
    for (source, kind) in cases {
        assert_eq!(expression(source).kind(), kind, "{source}");
    }
}

#[test]
fn suffix_chain() {
    let call = expression("a.b[c]:d(e)");
    assert_eq!(call.kind(), SyntaxKind::MethodCallExpression);
    assert_eq!(call.slot_token(2).unwrap().text(), "d");

    let element = call.slot_node(0).unwrap();
    assert_eq!(element.kind(), SyntaxKind::ElementAccessExpression);
    let member = element.slot_node(0).unwrap();
    assert_eq!(member.kind(), SyntaxKind::MemberAccessExpression);
    assert_eq!(member.text(), "a.b");

    let arguments = call.slot_node(3).unwrap();
    assert_eq!(arguments.kind(), SyntaxKind::ParenthesizedArgumentList);
    assert!(!call.contains_diagnostics());
}

#[test]
fn call_argument_forms() {
    let string = expression("f 'x'");
    assert_eq!(string.kind(), SyntaxKind::FunctionCallExpression);
    assert_eq!(
        string.slot_node(1).unwrap().kind(),
        SyntaxKind::StringFunctionArgument
    );

    let table = expression("f{1}");
    assert_eq!(
        table.slot_node(1).unwrap().kind(),
        SyntaxKind::TableConstructorFunctionArgument
    );

    let empty = expression("f()");
    let list = empty.slot_node(1).unwrap().slot_node(1).unwrap();
    assert_eq!(list.kind(), SyntaxKind::ExpressionList);
    assert_eq!(list.children().len(), 0);
}

#[test]
fn parenthesized_expression_resets_precedence() {
    let node = expression("(a + b) * c");
    assert_eq!(shape(&node), "((a + b) * c)");
    assert_eq!(
        node.slot_node(0).unwrap().kind(),
        SyntaxKind::ParenthesizedExpression
    );
}

#[test]
fn numeric_literal_after_prefix_is_an_incomplete_access() {
    let node = expression("a.1");
    assert_eq!(node.kind(), SyntaxKind::MemberAccessExpression);
    assert!(node.slot_token(1).unwrap().is_missing());
    assert!(node.slot_token(2).unwrap().is_missing());
    assert_eq!(node.full_text(), "a");
    let diagnostics = node.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code(), ErrorCode::E1003);
}

#[test]
fn missing_operand() {
    let node = expression("a +");
    assert_eq!(node.kind(), SyntaxKind::BinaryExpression);
    let right = node.slot_node(2).unwrap();
    assert!(right.slot_token(0).unwrap().is_missing());
    assert_eq!(right.diagnostics()[0].code(), ErrorCode::E1002);
}

#[test]
fn anonymous_function() {
    let node = expression("function(a, ...) return a end");
    assert_eq!(node.kind(), SyntaxKind::AnonymousFunctionExpression);
    let parameters = node.slot_node(1).unwrap();
    let kinds: Vec<_> = parameters.child_nodes().map(|n| n.kind()).collect();
    assert_eq!(
        kinds,
        [SyntaxKind::NamedParameter, SyntaxKind::VarArgParameter]
    );
    assert!(!node.contains_diagnostics());
}

// === Tables ===

#[test]
fn table_field_forms() {
    let node = expression("{1, x = 2, [k] = 3; }");
    assert_eq!(node.kind(), SyntaxKind::TableConstructorExpression);
    let fields = node.slot_node(1).unwrap();
    let kinds: Vec<_> = fields.child_nodes().map(|n| n.kind()).collect();
    assert_eq!(
        kinds,
        [
            SyntaxKind::UnkeyedTableField,
            SyntaxKind::IdentifierKeyedTableField,
            SyntaxKind::ExpressionKeyedTableField,
        ]
    );
    assert_eq!(fields.child_tokens().count(), 3);
    assert!(!node.contains_diagnostics());
}

#[test]
fn identifier_without_equals_is_a_value() {
    let node = expression("{x, y == z}");
    let fields = node.slot_node(1).unwrap();
    assert!(fields
        .child_nodes()
        .all(|n| n.kind() == SyntaxKind::UnkeyedTableField));
}

#[test]
fn invalid_field_is_skipped() {
    let node = expression("{ 1, = 2 }");
    assert_eq!(node.full_text(), "{ 1, = 2 }");
    let fields = node.slot_node(1).unwrap();
    assert_eq!(fields.child_nodes().count(), 1);
    assert!(!node.slot_token(2).unwrap().is_missing());
    let diagnostics = node.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code(), ErrorCode::E1008);
    assert_eq!(diagnostics[0].span.slice("{ 1, = 2 }"), "= 2");
}

#[test]
fn unclosed_table() {
    let node = expression("{ 1, 2");
    let close = node.slot_token(2).unwrap();
    assert!(close.is_missing());
    assert_eq!(node.diagnostics()[0].message(), "`}` expected");
}

// === Interpolation ===

#[test]
fn interpolated_string() {
    let options = lunar_syntax::ParseOptions::new(lunar_syntax::LanguageVersion::MoonScript);
    let tree = parse_with("print \"a #{b + 1} c\"", &options);
    assert!(codes(&tree).is_empty());
    let call = single_statement(&tree).slot_node(0).unwrap();
    let literal = call.slot_node(1).unwrap().slot_node(0).unwrap();
    assert_eq!(literal.kind(), SyntaxKind::InterpolatedStringExpression);
    let kinds: Vec<_> = literal.child_nodes().map(|n| n.kind()).collect();
    assert_eq!(
        kinds,
        [
            SyntaxKind::InterpolatedStringSegment,
            SyntaxKind::Interpolation,
            SyntaxKind::InterpolatedStringSegment,
        ]
    );
    let interpolation = literal.find(SyntaxKind::Interpolation).unwrap();
    assert_eq!(shape(&interpolation.slot_node(1).unwrap()), "(b + 1)");
}

#[test]
fn junk_inside_interpolation_is_skipped() {
    let options = lunar_syntax::ParseOptions::new(lunar_syntax::LanguageVersion::MoonScript);
    let tree = parse_with("x = \"#{a b}\"", &options);
    assert_eq!(codes(&tree), [ErrorCode::E1001]);
    assert_eq!(tree.diagnostics()[0].span.slice("x = \"#{a b}\""), "b");
}

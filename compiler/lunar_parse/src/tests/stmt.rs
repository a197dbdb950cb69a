use lunar_diagnostic::ErrorCode;
use lunar_syntax::{LanguageVersion, ParseOptions, SyntaxKind};
use pretty_assertions::assert_eq;

use super::{codes, lua54, parse_lua, parse_with, single_statement, statements};

// === Declarations ===

#[test]
fn local_declaration_with_attributes() {
    let tree = parse_lua("local x <const>, y <close> = 1, f()");
    assert!(codes(&tree).is_empty());
    let statement = single_statement(&tree);
    assert_eq!(statement.kind(), SyntaxKind::LocalVariableDeclarationStatement);
    let names = statement.slot_node(1).unwrap();
    let attributes: Vec<_> = names
        .child_nodes()
        .map(|name| name.slot_node(1).unwrap().slot_token(1).unwrap().text().to_owned())
        .collect();
    assert_eq!(attributes, ["const", "close"]);
    let values = statement.slot_node(2).unwrap();
    assert_eq!(values.kind(), SyntaxKind::EqualsValuesClause);
}

#[test]
fn local_without_values() {
    let tree = parse_lua("local a, b");
    let statement = single_statement(&tree);
    assert!(statement.slot(2).is_none());
    assert_eq!(statement.slot_node(1).unwrap().child_nodes().count(), 2);
}

#[test]
fn attributes_need_lua_54() {
    let tree = parse_with(
        "local x <const> = 1",
        &ParseOptions::new(LanguageVersion::Lua53),
    );
    assert_eq!(codes(&tree), [ErrorCode::E2001]);
    assert_eq!(tree.diagnostics()[0].span.slice("local x <const> = 1"), "<const>");
}

#[test]
fn unknown_attribute() {
    let tree = parse_lua("local x <static> = 1");
    let diagnostics = tree.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message(), "unknown attribute `static`");
    assert_eq!(diagnostics[0].span.slice("local x <static> = 1"), "static");
}

#[test]
fn local_function() {
    let tree = parse_lua("local function f() return 1 end");
    let statement = single_statement(&tree);
    assert_eq!(statement.kind(), SyntaxKind::LocalFunctionDeclarationStatement);
    assert_eq!(statement.slot_node(2).unwrap().text(), "f");
    assert!(codes(&tree).is_empty());
}

#[test]
fn qualified_function_name() {
    let tree = parse_lua("function a.b.c() end");
    assert!(codes(&tree).is_empty());
    let name = single_statement(&tree).slot_node(1).unwrap();
    assert_eq!(name.kind(), SyntaxKind::MemberFunctionName);
    assert_eq!(name.text(), "a.b.c");
    let inner = name.slot_node(0).unwrap();
    assert_eq!(inner.kind(), SyntaxKind::MemberFunctionName);
    assert_eq!(
        inner.slot_node(0).unwrap().kind(),
        SyntaxKind::SimpleFunctionName
    );
}

#[test]
fn method_function_name() {
    let tree = parse_lua("function obj:method(a, ...) end");
    assert!(codes(&tree).is_empty());
    let name = single_statement(&tree).slot_node(1).unwrap();
    assert_eq!(name.kind(), SyntaxKind::MethodFunctionName);
    assert_eq!(name.slot_token(2).unwrap().text(), "method");
}

#[test]
fn method_name_stops_the_chain() {
    let source = "function a:b.c() end";
    let tree = parse_lua(source);
    assert!(codes(&tree).contains(&ErrorCode::E1012));
    let statement = single_statement(&tree);
    let name = statement.slot_node(1).unwrap();
    assert_eq!(name.text(), "a:b");
    let located = tree
        .diagnostics()
        .into_iter()
        .find(|d| d.code() == ErrorCode::E1012)
        .unwrap();
    assert_eq!(located.span.slice(source), "a:b");
    // `.c()` is left to the body: the dot is skipped, the call remains.
    let body = statement.slot_node(3).unwrap().slot_node(0).unwrap();
    assert_eq!(body.child_nodes().count(), 1);
}

#[test]
fn missing_method_segment_keeps_shape() {
    let tree = parse_lua("function a.() end");
    let name = single_statement(&tree).slot_node(1).unwrap();
    assert_eq!(name.kind(), SyntaxKind::MemberFunctionName);
    assert!(name.slot_token(2).unwrap().is_missing());
    assert_eq!(codes(&tree), [ErrorCode::E1003]);
}

#[test]
fn vararg_must_be_last() {
    let tree = parse_lua("function f(..., a) end");
    assert_eq!(codes(&tree), [ErrorCode::E1013]);
}

// === Control flow ===

#[test]
fn if_elseif_else() {
    let tree = parse_lua("if a then b() elseif c then d() elseif e then else f() end");
    assert!(codes(&tree).is_empty());
    let statement = single_statement(&tree);
    assert_eq!(statement.kind(), SyntaxKind::IfStatement);
    let clauses = statement.slot_node(4).unwrap();
    assert_eq!(clauses.child_nodes().count(), 2);
    assert_eq!(statement.slot_node(5).unwrap().kind(), SyntaxKind::ElseClause);
}

#[test]
fn plain_if_has_no_clauses() {
    let tree = parse_lua("if a then end");
    let statement = single_statement(&tree);
    assert!(statement.slot(4).is_none());
    assert!(statement.slot(5).is_none());
}

#[test]
fn loops() {
    let tree = parse_lua("while a do break end repeat x() until y do end");
    assert!(codes(&tree).is_empty());
    let kinds: Vec<_> = statements(&tree).iter().map(|s| s.kind()).collect();
    assert_eq!(
        kinds,
        [
            SyntaxKind::WhileStatement,
            SyntaxKind::RepeatUntilStatement,
            SyntaxKind::DoStatement,
        ]
    );
}

#[test]
fn numeric_for() {
    let tree = parse_lua("for i = 1, 10, 2 do end");
    assert!(codes(&tree).is_empty());
    let statement = single_statement(&tree);
    assert_eq!(statement.kind(), SyntaxKind::NumericForStatement);
    assert_eq!(statement.slot_node(7).unwrap().text(), "2");

    let tree = parse_lua("for i = 1, 10 do end");
    let statement = single_statement(&tree);
    assert!(statement.slot(6).is_none());
    assert!(statement.slot(7).is_none());
}

#[test]
fn generic_for() {
    let tree = parse_lua("for k, v in pairs(t) do end");
    assert!(codes(&tree).is_empty());
    let statement = single_statement(&tree);
    assert_eq!(statement.kind(), SyntaxKind::GenericForStatement);
    assert_eq!(statement.slot_node(1).unwrap().child_nodes().count(), 2);
}

#[test]
fn numeric_for_with_several_names() {
    let source = "for a, b = 1, 2 do end";
    let tree = parse_lua(source);
    let statement = single_statement(&tree);
    assert_eq!(statement.kind(), SyntaxKind::NumericForStatement);
    let name = statement.slot_node(1).unwrap();
    assert!(name.slot_token(0).unwrap().is_missing());
    let diagnostics = tree.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code(), ErrorCode::E1004);
    assert_eq!(diagnostics[0].span.slice(source), "a, b");
}

#[test]
fn goto_and_label() {
    let tree = parse_lua("goto done ::done::");
    assert!(codes(&tree).is_empty());
    let kinds: Vec<_> = statements(&tree).iter().map(|s| s.kind()).collect();
    assert_eq!(
        kinds,
        [SyntaxKind::GotoStatement, SyntaxKind::GotoLabelStatement]
    );
}

#[test]
fn labels_need_lua_52() {
    let tree = parse_with("::top::", &ParseOptions::new(LanguageVersion::Lua51));
    assert_eq!(codes(&tree), [ErrorCode::E2001]);
}

// === Return placement ===

#[test]
fn final_return_fills_the_return_slot() {
    let tree = parse_lua("x = 1 return x; ;");
    assert!(codes(&tree).is_empty());
    let block = tree.root().slot_node(0).unwrap();
    assert_eq!(block.slot_node(0).unwrap().child_nodes().count(), 1);
    assert_eq!(
        block.slot_node(1).unwrap().kind(),
        SyntaxKind::ReturnStatement
    );
    assert_eq!(block.slot_node(2).unwrap().child_nodes().count(), 2);
}

#[test]
fn return_before_end_of_block() {
    let tree = parse_lua("do return end");
    assert!(codes(&tree).is_empty());
    let block = single_statement(&tree).slot_node(1).unwrap();
    let statement = block.slot_node(1).unwrap();
    assert!(statement.slot(1).is_none());
}

#[test]
fn misplaced_return() {
    let source = "return 1 x = 2";
    let tree = parse_lua(source);
    assert_eq!(codes(&tree), [ErrorCode::E1005]);
    assert_eq!(tree.diagnostics()[0].span.slice(source), "return 1");
    let block = tree.root().slot_node(0).unwrap();
    assert!(block.slot(1).is_none());
    assert_eq!(statements(&tree).len(), 2);
}

#[test]
fn misplaced_elseif() {
    let source = "elseif x then y() end";
    let tree = parse_lua(source);
    let statement = single_statement(&tree);
    assert_eq!(statement.kind(), SyntaxKind::IfStatement);
    assert!(statement.slot_token(0).unwrap().is_missing());
    assert_eq!(codes(&tree), [ErrorCode::E1006]);
    assert_eq!(tree.diagnostics()[0].span.slice(source), "elseif");
}

// === Assignments and calls ===

#[test]
fn multiple_assignment() {
    let tree = parse_lua("a, b.c, d[1] = 1, 2, 3");
    assert!(codes(&tree).is_empty());
    let statement = single_statement(&tree);
    assert_eq!(statement.kind(), SyntaxKind::AssignmentStatement);
    assert_eq!(statement.slot_node(0).unwrap().child_nodes().count(), 3);
    assert_eq!(statement.slot_node(2).unwrap().child_nodes().count(), 3);
}

#[test]
fn invalid_assignment_targets() {
    for (source, target) in [
        ("1 = 1", "1"),
        ("\"s\" = \"s\"", "\"s\""),
        ("f() = nil", "f()"),
        ("{} = nil", "{}"),
    ] {
        let tree = parse_lua(source);
        assert_eq!(codes(&tree), [ErrorCode::E1007], "{source}");
        assert_eq!(tree.diagnostics()[0].span.slice(source), target);
        let statement = single_statement(&tree);
        assert_eq!(statement.kind(), SyntaxKind::AssignmentStatement);
        assert!(!statement.slot_node(2).unwrap().contains_diagnostics());
    }
}

#[test]
fn calls_are_statements() {
    let tree = parse_lua("f(1) obj:m 'x' t.f{}");
    assert!(codes(&tree).is_empty());
    assert!(statements(&tree)
        .iter()
        .all(|s| s.kind() == SyntaxKind::ExpressionStatement));
}

#[test]
fn bare_expression_is_an_empty_statement() {
    for source in ["x", "a + b", "(f())", "...", "t.x"] {
        let tree = parse_lua(source);
        assert_eq!(codes(&tree), [ErrorCode::E1009], "{source}");
        assert_eq!(tree.diagnostics()[0].span.slice(source), source);

        let statement = single_statement(&tree);
        assert_eq!(statement.kind(), SyntaxKind::EmptyStatement, "{source}");
        let semicolon = statement.slot_token(0).unwrap();
        assert!(semicolon.is_missing());
        let skipped = semicolon.leading_trivia()[0].structure().unwrap();
        assert_eq!(skipped.kind(), SyntaxKind::SkippedTokensTrivia);
        assert_eq!(skipped.full_text(), source);
    }
}

#[test]
fn rejected_expression_keeps_its_own_diagnostics() {
    let source = "x = 1 a +";
    let tree = parse_lua(source);
    assert_eq!(codes(&tree), [ErrorCode::E1009, ErrorCode::E1002]);
    assert_eq!(tree.diagnostics()[0].span.slice(source), "a +");
    let kinds: Vec<_> = statements(&tree).iter().map(|s| s.kind()).collect();
    assert_eq!(
        kinds,
        [SyntaxKind::AssignmentStatement, SyntaxKind::EmptyStatement]
    );
}

#[test]
fn compound_assignment() {
    let options = lua54().with_preview(true);
    let tree = parse_with("x += 1 s ..= 'a'", &options);
    assert!(codes(&tree).is_empty());
    let kinds: Vec<_> = statements(&tree).iter().map(|s| s.kind()).collect();
    assert_eq!(kinds, [SyntaxKind::CompoundAssignmentStatement; 2]);
}

#[test]
fn compound_assignment_in_moonscript() {
    let options = ParseOptions::new(LanguageVersion::MoonScript);
    let tree = parse_with("x and= y", &options);
    assert!(codes(&tree).is_empty());
    let statement = single_statement(&tree);
    assert_eq!(statement.slot_token(1).unwrap().kind(), SyntaxKind::AndEquals);
}

#[test]
fn compound_assignment_takes_one_target() {
    let options = lua54().with_preview(true);
    let tree = parse_with("a, b += 1", &options);
    let diagnostics = tree.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message(),
        "compound assignment `+=` takes exactly one target"
    );
    let statement = single_statement(&tree);
    assert_eq!(statement.kind(), SyntaxKind::CompoundAssignmentStatement);
    assert_eq!(statement.slot_node(0).unwrap().kind(), SyntaxKind::ExpressionList);
}

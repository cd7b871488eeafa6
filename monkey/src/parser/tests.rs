//! Parser tests

use super::*;
use pretty_assertions::assert_eq;

/// Helper to parse a program and expect no diagnostics
fn parse_ok(source: &str) -> Program {
    let (program, errors) = parse_source(source);
    assert!(errors.is_empty(), "unexpected parse errors for {source:?}: {errors:?}");
    program
}

/// Helper to collect the diagnostic messages for a program
fn parse_errors(source: &str) -> Vec<String> {
    let (_, errors) = parse_source(source);
    errors.into_iter().map(|e| e.message).collect()
}

/// Helper to parse a single expression statement
fn parse_expr(source: &str) -> Expr {
    let program = parse_ok(source);
    assert_eq!(program.statements.len(), 1, "expected one statement in {source:?}");
    match program.statements.into_iter().next() {
        Some(Statement::Expression(expr)) => expr,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

// ============================================
// Statements
// ============================================

#[test]
fn test_parse_empty_program() {
    let (program, errors) = parse(Vec::new());
    assert!(program.statements.is_empty());
    assert!(errors.is_empty());
}

#[test]
fn test_parse_let_statements() {
    let program = parse_ok("let x = 5; let y = true; let foobar = y;");
    let expected = vec![
        Statement::Let { name: "x".into(), value: Expr::IntLit(5) },
        Statement::Let { name: "y".into(), value: Expr::BoolLit(true) },
        Statement::Let { name: "foobar".into(), value: Expr::Ident("y".into()) },
    ];
    assert_eq!(program.statements, expected);
}

#[test]
fn test_parse_return_statements() {
    let program = parse_ok("return 5; return 10; return 993322;");
    assert_eq!(program.statements.len(), 3);
    assert_eq!(program.statements[2], Statement::Return(Expr::IntLit(993322)));
}

#[test]
fn test_parse_terminator_is_optional() {
    let program = parse_ok("let a = 1\nlet b = 2\na + b");
    assert_eq!(program.statements.len(), 3);
}

#[test]
fn test_parse_alternate_keywords() {
    let program = parse_ok("我来 f = 酷毙了阿狐(x) { 你有呲咪呲咪 (浙江的猪) { 零利息经济移动 x } else { 好吃得很 } };");
    assert_eq!(program.to_string(), "let f = fn(x) { if (true) { return x } else { false } }");
}

// ============================================
// Expressions
// ============================================

#[test]
fn test_parse_literals() {
    assert_eq!(parse_expr("foobar;"), Expr::Ident("foobar".into()));
    assert_eq!(parse_expr("5;"), Expr::IntLit(5));
    assert_eq!(parse_expr("false"), Expr::BoolLit(false));
    assert_eq!(parse_expr(r#""hello\tworld""#), Expr::StringLit(r"hello\tworld".into()));
}

#[test]
fn test_parse_prefix_expressions() {
    assert_eq!(
        parse_expr("!5;"),
        Expr::Prefix { op: PrefixOp::Not, operand: Box::new(Expr::IntLit(5)) }
    );
    assert_eq!(
        parse_expr("-15;"),
        Expr::Prefix { op: PrefixOp::Neg, operand: Box::new(Expr::IntLit(15)) }
    );
}

#[test]
fn test_parse_infix_operators() {
    let cases = [
        ("5 + 5", InfixOp::Add),
        ("5 - 5", InfixOp::Sub),
        ("5 * 5", InfixOp::Mul),
        ("5 / 5", InfixOp::Div),
        ("5 % 5", InfixOp::Mod),
        ("5 > 5", InfixOp::Gt),
        ("5 < 5", InfixOp::Lt),
        ("5 == 5", InfixOp::Eq),
        ("5 != 5", InfixOp::NotEq),
        ("5 && 5", InfixOp::And),
        ("5 || 5", InfixOp::Or),
    ];
    for (source, op) in cases {
        let expected = Expr::Infix {
            op,
            left: Box::new(Expr::IntLit(5)),
            right: Box::new(Expr::IntLit(5)),
        };
        assert_eq!(parse_expr(source), expected, "source: {source}");
    }
}

#[test]
fn test_operator_precedence() {
    let cases = [
        ("-a * b", "((-a) * b)"),
        ("!-a", "(!(-a))"),
        ("a + b + c", "((a + b) + c)"),
        ("a + b - c", "((a + b) - c)"),
        ("a * b * c", "((a * b) * c)"),
        ("a * b / c", "((a * b) / c)"),
        ("a + b / c", "(a + (b / c))"),
        ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
        ("3 + 4; -5 * 5", "(3 + 4); ((-5) * 5)"),
        ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
        ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4))"),
        ("3 + 4 * 5 == 3 * 1 + 4 * 5", "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))"),
        ("true == false", "(true == false)"),
        ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
        ("(5 + 5) * 2", "((5 + 5) * 2)"),
        ("2 * (5 + 10)", "(2 * (5 + 10))"),
        ("-(5 + 5)", "(-(5 + 5))"),
        ("!(true == true)", "(!(true == true))"),
        ("5 % 3 > 1 && false", "(((5 % 3) > 1) && false)"),
        ("5 % 3 > 1 || false", "(((5 % 3) > 1) || false)"),
        ("a || b && c", "(a || (b && c))"),
        ("a && b || c", "((a && b) || c)"),
        ("a == b && c != d", "((a == b) && (c != d))"),
        ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
        (
            "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
            "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
        ),
        ("add(a + b + c * d / f + g)", "add((((a + b) + ((c * d) / f)) + g))"),
        ("a * [1, 2, 3, 4][b * c] * d", "((a * ([1, 2, 3, 4][(b * c)])) * d)"),
        (
            "add(a * b[2], b[1], 2 * [1, 2][1])",
            "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])))",
        ),
    ];
    for (source, expected) in cases {
        assert_eq!(parse_ok(source).to_string(), expected, "source: {source}");
    }
}

#[test]
fn test_parse_if_expression() {
    let expr = parse_expr("if (x < y) { x }");
    let Expr::If { cond, consequence, alternative } = expr else {
        panic!("expected if expression");
    };
    assert_eq!(cond.to_string(), "(x < y)");
    assert_eq!(consequence.statements, vec![Statement::Expression(Expr::Ident("x".into()))]);
    assert!(alternative.is_none());
}

#[test]
fn test_parse_if_else_expression() {
    let expr = parse_expr("if (x < y) { x } else { y }");
    let Expr::If { alternative, .. } = expr else {
        panic!("expected if expression");
    };
    let alternative = alternative.expect("alternative block");
    assert_eq!(alternative.statements, vec![Statement::Expression(Expr::Ident("y".into()))]);
}

#[test]
fn test_parse_function_literal() {
    let expr = parse_expr("fn(x, y) { x + y; }");
    let Expr::FnLit { params, body } = expr else {
        panic!("expected function literal");
    };
    assert_eq!(params, vec!["x".to_string(), "y".to_string()]);
    assert_eq!(body.to_string(), "(x + y)");
}

#[test]
fn test_parse_function_parameters() {
    let cases: [(&str, &[&str]); 3] = [
        ("fn() {};", &[]),
        ("fn(x) {};", &["x"]),
        ("fn(x, y, z) {};", &["x", "y", "z"]),
    ];
    for (source, expected) in cases {
        let Expr::FnLit { params, .. } = parse_expr(source) else {
            panic!("expected function literal for {source}");
        };
        assert_eq!(params, expected.iter().map(|p| p.to_string()).collect::<Vec<_>>());
    }
}

#[test]
fn test_parse_call_expression() {
    let expr = parse_expr("add(1, 2 * 3, 4 + 5);");
    let Expr::Call { callee, args } = expr else {
        panic!("expected call expression");
    };
    assert_eq!(*callee, Expr::Ident("add".into()));
    let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    assert_eq!(rendered, vec!["1", "(2 * 3)", "(4 + 5)"]);
}

#[test]
fn test_parse_array_literal() {
    assert_eq!(parse_expr("[1, 2 * 2, 3 + 3]").to_string(), "[1, (2 * 2), (3 + 3)]");
    assert_eq!(parse_expr("[]"), Expr::Array(Vec::new()));
}

#[test]
fn test_parse_index_expression() {
    assert_eq!(parse_expr("myArray[1 + 1]").to_string(), "(myArray[(1 + 1)])");
}

#[test]
fn test_parse_hash_literal_keeps_source_order() {
    let Expr::Hash(pairs) = parse_expr(r#"{"one": 1, "two": 2, "three": 3}"#) else {
        panic!("expected hash literal");
    };
    let keys: Vec<String> = pairs.iter().map(|(k, _)| k.to_string()).collect();
    assert_eq!(keys, vec![r#""one""#, r#""two""#, r#""three""#]);
}

#[test]
fn test_parse_empty_hash_literal() {
    assert_eq!(parse_expr("{}"), Expr::Hash(Vec::new()));
}

#[test]
fn test_parse_hash_literal_with_expressions() {
    assert_eq!(
        parse_expr(r#"{"one": 0 + 1, "two": 10 - 8, "three": 15 / 5}"#).to_string(),
        r#"{"one": (0 + 1), "two": (10 - 8), "three": (15 / 5)}"#
    );
}

#[test]
fn test_function_body_rendering_round_trips() {
    let source = r#"fn(x, y) { let z = x * y; if (z > 10) { return z; } else { [z, {"a": z}["a"], "q\"t"] } }"#;
    let Expr::FnLit { body, .. } = parse_expr(source) else {
        panic!("expected function literal");
    };
    let reparsed = parse_ok(&body.to_string());
    assert_eq!(reparsed.statements, body.statements);
}

// ============================================
// Diagnostics
// ============================================

#[test]
fn test_let_missing_identifier() {
    assert_eq!(
        parse_errors("let 838383;"),
        vec!["expected next token to be IDENT, got INT instead"]
    );
}

#[test]
fn test_let_missing_assign() {
    assert_eq!(
        parse_errors("let x 5;"),
        vec!["expected next token to be =, got INT instead"]
    );
}

#[test]
fn test_errors_accumulate() {
    assert_eq!(
        parse_errors("let = 10; let y 5;"),
        vec![
            "expected next token to be IDENT, got = instead",
            "no prefix parse function for = found",
            "expected next token to be =, got INT instead",
        ]
    );
}

#[test]
fn test_missing_closing_paren() {
    assert_eq!(
        parse_errors("(1 + 2"),
        vec!["expected next token to be ), got EOF instead"]
    );
}

#[test]
fn test_illegal_token_reported() {
    assert_eq!(parse_errors("1 @ 2"), vec!["no prefix parse function for ILLEGAL found"]);
}

#[test]
fn test_integer_overflow_reported() {
    assert_eq!(
        parse_errors("99999999999999999999"),
        vec![r#"could not parse "99999999999999999999" as integer"#]
    );
}

#[test]
fn test_error_spans_point_at_offending_token() {
    let (_, errors) = parse_source("let x 5;");
    assert_eq!(errors[0].span, Span::new(6, 7));
}

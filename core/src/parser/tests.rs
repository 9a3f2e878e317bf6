//! Tests for the script parser

use std::time::{Duration, Instant};

use super::*;

// ============================================================================
// Helper Functions
// ============================================================================

fn parse(source: &str) -> Program {
    parse_program(source).expect("Parse should succeed")
}

fn single_stmt(source: &str) -> Stmt {
    let mut program = parse(source);
    assert_eq!(program.body.len(), 1, "expected one statement in {:?}", source);
    program.body.remove(0)
}

fn expr_of(source: &str) -> Expr {
    match single_stmt(source).kind {
        StmtKind::Expr { expr } => expr,
        other => panic!("expected expression statement, got {:?}", other),
    }
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_empty_program() {
    let program = parse("");
    assert!(program.body.is_empty());

    let program = parse("  // only a comment\n/* and another */");
    assert!(program.body.is_empty());
}

#[test]
fn test_optional_semicolons() {
    let program = parse("let a = 1\nlet b = 2\na + b");
    assert_eq!(program.body.len(), 3);
}

#[test]
fn test_var_declaration_kinds() {
    let program = parse("var a = 1; let b; const c = 3");
    let kinds: Vec<VarKind> = program
        .body
        .iter()
        .map(|s| match &s.kind {
            StmtKind::Var { decl } => decl.kind,
            other => panic!("expected declaration, got {:?}", other),
        })
        .collect();
    assert_eq!(kinds, vec![VarKind::Var, VarKind::Let, VarKind::Const]);
}

#[test]
fn test_destructuring_declaration() {
    let stmt = single_stmt("const { a, b: [c, , d = 4], ...rest } = obj");
    let StmtKind::Var { decl } = stmt.kind else {
        panic!("expected declaration");
    };
    assert_eq!(decl.bound_names(), vec!["a", "c", "d", "rest"]);
}

#[test]
fn test_destructuring_declaration_requires_initializer() {
    assert!(parse_program("let { a };").is_err());
}

#[test]
fn test_function_declaration() {
    let stmt = single_stmt("async function load(url, { retries = 3 } = {}, ...rest) { return url }");
    let StmtKind::Function { function } = stmt.kind else {
        panic!("expected function");
    };
    assert_eq!(function.name.as_deref(), Some("load"));
    assert!(function.is_async);
    assert!(!function.is_generator);
    assert_eq!(function.params.len(), 2);
    assert_eq!(function.param_names(), vec!["url", "retries", "rest"]);
}

#[test]
fn test_generator_declaration() {
    let stmt = single_stmt("function* gen() { yield 1; yield* other() }");
    let StmtKind::Function { function } = stmt.kind else {
        panic!("expected function");
    };
    assert!(function.is_generator);
}

#[test]
fn test_class_declaration() {
    let stmt = single_stmt(
        r#"
class A extends B {
  constructor(x) { super(x) }
  static create() { return new A(1) }
  get value() { return 1 }
  set value(v) {}
  async *items() {}
}
"#,
    );
    let StmtKind::Class { class } = stmt.kind else {
        panic!("expected class");
    };
    assert_eq!(class.name.as_deref(), Some("A"));
    assert!(class.super_class.is_some());
    let kinds: Vec<FunctionKind> = class.members.iter().map(|m| m.function.kind).collect();
    assert_eq!(
        kinds,
        vec![
            FunctionKind::Constructor,
            FunctionKind::Method,
            FunctionKind::Getter,
            FunctionKind::Setter,
            FunctionKind::Method,
        ]
    );
    assert!(class.members[1].is_static);
    assert!(class.members[4].function.is_async);
    assert!(class.members[4].function.is_generator);
}

#[test]
fn test_control_flow_statements() {
    let program = parse(
        r#"
if (a) b(); else { c() }
for (let i = 0; i < 10; i++) {}
for (;;) break
for (const k in obj) continue
while (x) x--
do { y++ } while (y < 3)
switch (v) { case 1: one(); break; default: other() }
outer: for (const item of items) { continue outer }
"#,
    );
    assert_eq!(program.body.len(), 8);
    assert!(matches!(program.body[0].kind, StmtKind::If { alternate: Some(_), .. }));
    assert!(matches!(program.body[1].kind, StmtKind::For { init: Some(ForInit::Var { .. }), .. }));
    assert!(matches!(
        program.body[2].kind,
        StmtKind::For { init: None, test: None, update: None, .. }
    ));
    assert!(matches!(program.body[3].kind, StmtKind::ForIn { .. }));
    assert!(matches!(program.body[4].kind, StmtKind::While { .. }));
    assert!(matches!(program.body[5].kind, StmtKind::DoWhile { .. }));
    match &program.body[6].kind {
        StmtKind::Switch { cases, .. } => {
            assert_eq!(cases.len(), 2);
            assert!(cases[0].test.is_some());
            assert!(cases[1].test.is_none());
        }
        other => panic!("expected switch, got {:?}", other),
    }
    match &program.body[7].kind {
        StmtKind::Labeled { label, body } => {
            assert_eq!(label, "outer");
            assert!(matches!(body.kind, StmtKind::ForOf { is_await: false, .. }));
        }
        other => panic!("expected label, got {:?}", other),
    }
}

#[test]
fn test_for_await_of() {
    let stmt = single_stmt("async function f() { for await (const x of xs) {} }");
    let StmtKind::Function { function } = stmt.kind else {
        panic!("expected function");
    };
    let FunctionBody::Block { body } = &function.body else {
        panic!("expected block body");
    };
    assert!(matches!(body[0].kind, StmtKind::ForOf { is_await: true, .. }));
}

#[test]
fn test_for_of_with_assignment_target() {
    let stmt = single_stmt("for ([a, b] of pairs) {}");
    let StmtKind::ForOf { left: ForHead::Pattern { pattern }, .. } = stmt.kind else {
        panic!("expected for-of with pattern head");
    };
    assert!(matches!(pattern.kind, PatternKind::Array { .. }));
}

#[test]
fn test_try_statement_forms() {
    let program = parse(
        r#"
try { a() } catch (e) { b(e) }
try { a() } catch { b() }
try { a() } finally { c() }
try { a() } catch ({ message }) {} finally {}
"#,
    );
    assert_eq!(program.body.len(), 4);
    match &program.body[1].kind {
        StmtKind::Try { handler: Some(handler), .. } => assert!(handler.param.is_none()),
        other => panic!("expected try, got {:?}", other),
    }
    match &program.body[2].kind {
        StmtKind::Try { handler, finalizer, .. } => {
            assert!(handler.is_none());
            assert!(finalizer.is_some());
        }
        other => panic!("expected try, got {:?}", other),
    }
}

#[test]
fn test_try_without_handler_is_error() {
    assert!(parse_program("try { a() }").is_err());
}

#[test]
fn test_return_respects_line_break() {
    let stmt = single_stmt("function f() { return\n42 }");
    let StmtKind::Function { function } = stmt.kind else {
        panic!("expected function");
    };
    let FunctionBody::Block { body } = &function.body else {
        panic!("expected block body");
    };
    assert_eq!(body.len(), 2);
    assert!(matches!(body[0].kind, StmtKind::Return { value: None }));
}

#[test]
fn test_directives() {
    let program = parse("'use strict'\n\"other\"; foo()");
    assert!(matches!(&program.body[0].kind, StmtKind::Directive { raw } if raw == "'use strict'"));
    assert!(matches!(&program.body[1].kind, StmtKind::Directive { raw } if raw == "\"other\""));
    assert!(matches!(program.body[2].kind, StmtKind::Expr { .. }));
}

#[test]
fn test_parenthesized_string_is_not_directive() {
    let program = parse("('use strict')");
    assert!(matches!(program.body[0].kind, StmtKind::Expr { .. }));
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_binary_precedence() {
    let expr = expr_of("1 + 2 * 3");
    let ExprKind::Binary { op, right, .. } = expr.kind else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Add);
    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn test_binary_left_associative() {
    let expr = expr_of("a - b - c");
    let ExprKind::Binary { left, .. } = expr.kind else {
        panic!("expected binary");
    };
    assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Sub, .. }));
}

#[test]
fn test_exponent_right_associative() {
    let expr = expr_of("a ** b ** c");
    let ExprKind::Binary { op, right, .. } = expr.kind else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Exp);
    assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Exp, .. }));
}

#[test]
fn test_full_precedence_ladder() {
    // Lowest to highest: | ^ & == < << + * **
    let expr = expr_of("a | b ^ c & d == e < f << g + h * i ** j");
    let mut ops = Vec::new();
    let mut current = &expr;
    while let ExprKind::Binary { op, right, .. } = &current.kind {
        ops.push(*op);
        current = right;
    }
    assert_eq!(
        ops,
        vec![
            BinaryOp::BitOr,
            BinaryOp::BitXor,
            BinaryOp::BitAnd,
            BinaryOp::Eq,
            BinaryOp::Lt,
            BinaryOp::Shl,
            BinaryOp::Add,
            BinaryOp::Mul,
            BinaryOp::Exp,
        ]
    );
}

#[test]
fn test_logical_binds_looser_than_binary() {
    let expr = expr_of("a + 1 || b === c && d");
    let ExprKind::Logical { op, left, right } = expr.kind else {
        panic!("expected logical");
    };
    assert_eq!(op, LogicalOp::Or);
    assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Add, .. }));
    let ExprKind::Logical { op, left, .. } = right.kind else {
        panic!("expected logical");
    };
    assert_eq!(op, LogicalOp::And);
    assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::StrictEq, .. }));
}

#[test]
fn test_binary_spans_cover_operands() {
    let source = "x = (a) + b * c";
    let ExprKind::Assign { value, .. } = expr_of(source).kind else {
        panic!("expected assignment");
    };
    assert_eq!(value.span.text(source), Some("(a) + b * c"));
}

#[test]
fn test_logical_operators() {
    let expr = expr_of("a ?? b");
    assert!(matches!(expr.kind, ExprKind::Logical { op: LogicalOp::Nullish, .. }));

    let expr = expr_of("a || b && c");
    let ExprKind::Logical { op, right, .. } = expr.kind else {
        panic!("expected logical");
    };
    assert_eq!(op, LogicalOp::Or);
    assert!(matches!(right.kind, ExprKind::Logical { op: LogicalOp::And, .. }));
}

#[test]
fn test_relational_keywords() {
    assert!(matches!(
        expr_of("'x' in obj").kind,
        ExprKind::Binary { op: BinaryOp::In, .. }
    ));
    assert!(matches!(
        expr_of("e instanceof Error").kind,
        ExprKind::Binary { op: BinaryOp::InstanceOf, .. }
    ));
}

#[test]
fn test_member_call_chain() {
    let expr = expr_of("db.coll.find({ a: 1 }).toArray()");
    let ExprKind::Call { callee, args, optional } = expr.kind else {
        panic!("expected call");
    };
    assert!(args.is_empty());
    assert!(!optional);
    let ExprKind::Member { property, object, .. } = callee.kind else {
        panic!("expected member callee");
    };
    assert!(matches!(property, MemberProp::Ident { ref name } if name == "toArray"));
    assert!(matches!(object.kind, ExprKind::Call { .. }));
}

#[test]
fn test_member_chain_span_includes_parens() {
    let source = "(a, b).c";
    let expr = expr_of(source);
    assert_eq!(expr.span.text(source), Some("(a, b).c"));
}

#[test]
fn test_optional_chain() {
    let expr = expr_of("a?.b?.[c]?.(d)");
    let ExprKind::Call { optional, callee, .. } = expr.kind else {
        panic!("expected call");
    };
    assert!(optional);
    assert!(matches!(callee.kind, ExprKind::Member { optional: true, .. }));
}

#[test]
fn test_conditional_not_confused_with_optional_chain() {
    let expr = expr_of("a ? .5 : b");
    assert!(matches!(expr.kind, ExprKind::Conditional { .. }));
}

#[test]
fn test_new_expression() {
    let expr = expr_of("new Foo.Bar(1, 2)");
    let ExprKind::New { callee, args } = expr.kind else {
        panic!("expected new");
    };
    assert_eq!(args.len(), 2);
    assert!(matches!(callee.kind, ExprKind::Member { .. }));

    let expr = expr_of("new Date");
    assert!(matches!(expr.kind, ExprKind::New { ref args, .. } if args.is_empty()));
}

#[test]
fn test_unary_and_update() {
    assert!(matches!(
        expr_of("typeof x").kind,
        ExprKind::Unary { op: UnaryOp::Typeof, .. }
    ));
    assert!(matches!(
        expr_of("!-x").kind,
        ExprKind::Unary { op: UnaryOp::Not, .. }
    ));
    assert!(matches!(
        expr_of("x++").kind,
        ExprKind::Update { prefix: false, op: UpdateOp::Increment, .. }
    ));
    assert!(matches!(
        expr_of("--x").kind,
        ExprKind::Update { prefix: true, op: UpdateOp::Decrement, .. }
    ));
}

#[test]
fn test_await_expression() {
    let expr = expr_of("await fetch(url)");
    let ExprKind::Await { arg } = expr.kind else {
        panic!("expected await");
    };
    assert!(matches!(arg.kind, ExprKind::Call { .. }));
}

#[test]
fn test_arrow_functions() {
    let expr = expr_of("x => x * 2");
    let ExprKind::Function { function } = expr.kind else {
        panic!("expected arrow");
    };
    assert_eq!(function.kind, FunctionKind::Arrow);
    assert_eq!(function.param_names(), vec!["x"]);
    assert!(matches!(function.body, FunctionBody::Expr { .. }));

    let expr = expr_of("async (a, b) => { return a + b }");
    let ExprKind::Function { function } = expr.kind else {
        panic!("expected arrow");
    };
    assert!(function.is_async);
    assert!(matches!(function.body, FunctionBody::Block { .. }));

    let expr = expr_of("() => ({})");
    let ExprKind::Function { function } = expr.kind else {
        panic!("expected arrow");
    };
    assert!(function.params.is_empty());
}

#[test]
fn test_assignment_operators() {
    let expr = expr_of("a.b += 1");
    let ExprKind::Assign { op, target, .. } = expr.kind else {
        panic!("expected assignment");
    };
    assert_eq!(op, AssignOp::Add);
    assert!(matches!(target.kind, PatternKind::Expr { .. }));

    assert!(matches!(
        expr_of("x ??= 3").kind,
        ExprKind::Assign { op: AssignOp::Nullish, .. }
    ));
}

#[test]
fn test_destructuring_assignment() {
    let expr = expr_of("[a, b = 2, ...rest] = list");
    let ExprKind::Assign { target, .. } = expr.kind else {
        panic!("expected assignment");
    };
    let mut names = Vec::new();
    target.bound_names(&mut names);
    assert_eq!(names, vec!["a", "b", "rest"]);

    let expr = expr_of("({ a, b: c.d } = obj)");
    let ExprKind::Assign { target, .. } = expr.kind else {
        panic!("expected assignment");
    };
    let PatternKind::Object { props, .. } = target.kind else {
        panic!("expected object pattern");
    };
    assert!(matches!(props[1].value.kind, PatternKind::Expr { .. }));
}

#[test]
fn test_invalid_assignment_target() {
    assert!(parse_program("a + b = 1").is_err());
    assert!(parse_program("f() += 1").is_err());
}

#[test]
fn test_sequence_expression() {
    let expr = expr_of("a, b, c");
    assert!(matches!(expr.kind, ExprKind::Sequence { ref exprs } if exprs.len() == 3));
}

#[test]
fn test_literals() {
    assert!(matches!(expr_of("0x1F").kind, ExprKind::Num { ref raw } if raw == "0x1F"));
    assert!(matches!(expr_of("1_000.5e3").kind, ExprKind::Num { .. }));
    assert!(matches!(expr_of("10n").kind, ExprKind::BigInt { ref raw } if raw == "10n"));
    assert!(matches!(expr_of("null").kind, ExprKind::Null));
    assert!(matches!(expr_of("true").kind, ExprKind::Bool { value: true }));
    assert!(matches!(expr_of("this").kind, ExprKind::This));

    let expr = expr_of("/a[/]b/gi");
    assert!(matches!(expr.kind, ExprKind::Regex { ref pattern, ref flags }
        if pattern == "a[/]b" && flags == "gi"));
}

#[test]
fn test_regex_versus_division() {
    let expr = expr_of("a / b / c");
    assert!(matches!(expr.kind, ExprKind::Binary { op: BinaryOp::Div, .. }));
}

#[test]
fn test_string_escapes() {
    let expr = parse_expression(r#""a\nb\x41B\u{1F600}\\""#).expect("Parse should succeed");
    let ExprKind::Str { value, raw } = expr.kind else {
        panic!("expected string");
    };
    assert_eq!(value, "a\nbAB\u{1F600}\\");
    assert_eq!(raw.as_deref(), Some(r#""a\nb\x41B\u{1F600}\\""#));
}

#[test]
fn test_unescape_surrogate_pair() {
    assert_eq!(unescape_string(r"\uD83D\uDE00"), "\u{1F600}");
    assert_eq!(unescape_string(r"\uD83D"), "\u{FFFD}");
    assert_eq!(unescape_string("line\\\ncontinued"), "linecontinued");
}

#[test]
fn test_template_literals() {
    let expr = expr_of("`a ${b} c ${d + 1}`");
    let ExprKind::Template { tpl } = expr.kind else {
        panic!("expected template");
    };
    assert_eq!(tpl.quasis, vec!["a ", " c ", ""]);
    assert_eq!(tpl.exprs.len(), 2);

    let expr = expr_of("tag`x${y}`");
    assert!(matches!(expr.kind, ExprKind::TaggedTemplate { .. }));
}

#[test]
fn test_object_literal_props() {
    let expr = expr_of("({ a, 'b': 1, [c]: 2, d() {}, get e() { return 1 }, async f() {}, ...g })");
    let ExprKind::Object { props } = expr.kind else {
        panic!("expected object");
    };
    assert_eq!(props.len(), 7);
    assert!(matches!(props[0], Prop::KeyValue { shorthand: true, .. }));
    assert!(matches!(props[1], Prop::KeyValue { key: PropKey::Str { .. }, .. }));
    assert!(matches!(props[2], Prop::KeyValue { key: PropKey::Computed { .. }, .. }));
    assert!(matches!(props[3], Prop::Method { .. }));
    match &props[4] {
        Prop::Method { function, .. } => assert_eq!(function.kind, FunctionKind::Getter),
        other => panic!("expected getter, got {:?}", other),
    }
    assert!(matches!(props[6], Prop::Spread { .. }));
}

#[test]
fn test_array_holes_and_spread() {
    let expr = expr_of("[1, , ...rest]");
    let ExprKind::Array { elements } = expr.kind else {
        panic!("expected array");
    };
    assert_eq!(elements.len(), 3);
    assert!(elements[1].is_none());
    assert!(matches!(elements[2], Some(ExprOrSpread { spread: true, .. })));
}

#[test]
fn test_array_trailing_comma_adds_no_hole() {
    let lengths: Vec<(usize, usize)> = ["[]", "[1]", "[1,]", "[,]", "[a, , b,]", "[, ,]"]
        .iter()
        .map(|source| {
            let ExprKind::Array { elements } = parse_expression(source)
                .expect("Parse should succeed")
                .kind
            else {
                panic!("expected array for {}", source);
            };
            let holes = elements.iter().filter(|e| e.is_none()).count();
            (elements.len(), holes)
        })
        .collect();
    assert_eq!(lengths, vec![(0, 0), (1, 0), (1, 0), (1, 1), (3, 1), (2, 2)]);
}

#[test]
fn test_array_binding_holes_and_rest() {
    let stmt = single_stmt("let [a, , ...rest] = xs;");
    let StmtKind::Var { decl } = stmt.kind else {
        panic!("expected declaration");
    };
    let PatternKind::Array { elements, rest } = &decl.declarations[0].target.kind else {
        panic!("expected array pattern");
    };
    assert_eq!(elements.len(), 2);
    assert!(elements[1].is_none());
    assert!(rest.is_some());

    let err = parse_program("let [...rest, last] = xs;").unwrap_err();
    assert!(matches!(err, ParseError::BuildError(_, Some(_))));
}

#[test]
fn test_function_and_class_expressions() {
    assert!(matches!(
        expr_of("(function named() {})").kind,
        ExprKind::Function { .. }
    ));
    assert!(matches!(expr_of("(class {})").kind, ExprKind::Class { .. }));
    assert!(matches!(expr_of("import('mod')").kind, ExprKind::Import { .. }));
}

#[test]
fn test_parse_expression_entry_point() {
    let expr = parse_expression("a + b").expect("Parse should succeed");
    assert!(matches!(expr.kind, ExprKind::Binary { .. }));
    assert!(parse_expression("a +").is_err());
}

// ============================================================================
// Spans & Errors
// ============================================================================

#[test]
fn test_spans_track_lines_and_columns() {
    let source = "let a = 1\n  foo(a)";
    let program = parse(source);
    let call = &program.body[1];
    assert_eq!(call.span.start_line, 1);
    assert_eq!(call.span.start_col, 2);
    assert_eq!(call.span.text(source), Some("foo(a)"));
}

#[test]
fn test_syntax_error_has_location() {
    let err = parse_program("let a = ;").unwrap_err();
    assert!(matches!(err, ParseError::PestError(_, Some(_))));
    let span = err.span().expect("error should carry a span");
    assert_eq!(span.start_line, 0);
}

#[test]
fn test_class_fields_rejected() {
    for source in ["class A { x = 1 }", "class A { static count; m() {} }"] {
        match parse_program(source) {
            Err(ParseError::BuildError(message, Some(_))) => {
                assert!(message.contains("Class fields"), "{}", message)
            }
            other => panic!("expected class field error for {}, got {:?}", source, other),
        }
    }
}

#[test]
fn test_reserved_word_not_identifier() {
    assert!(parse_program("let class = 1").is_err());
}

// ============================================================================
// Nesting
// ============================================================================

fn nested(open: &str, inner: &str, close: &str, depth: usize) -> String {
    format!("{}{}{}", open.repeat(depth), inner, close.repeat(depth))
}

/// Parse on the current thread's stack and fail if it takes too long
fn parse_within(source: &str, limit: Duration) -> Program {
    let started = Instant::now();
    let program = parse(source);
    assert!(
        started.elapsed() < limit,
        "parsing {} bytes took {:?}",
        source.len(),
        started.elapsed()
    );
    program
}

#[test]
fn test_nested_array_literals_parse_in_linear_time() {
    parse_within(&nested("[", "1", "]", 40), Duration::from_secs(2));
    parse_within(&nested("[1, ", "", "]", 40), Duration::from_secs(2));
}

#[test]
fn test_nested_array_bindings_parse_in_linear_time() {
    let source = format!("let {} = x;", nested("[", "a", "]", 40));
    parse_within(&source, Duration::from_secs(2));
}

#[test]
fn test_nested_parenthesized_assignments_parse_quickly() {
    parse_within(&nested("(a = ", "1", ")", 30), Duration::from_secs(2));
    let arrow = parse_within("(a = (b = (c))) => a", Duration::from_secs(2));
    assert!(matches!(
        &arrow.body[0].kind,
        StmtKind::Expr { expr } if matches!(expr.kind, ExprKind::Function { .. })
    ));
}

#[test]
fn test_arrow_defaults_with_brackets_in_strings() {
    let expr = expr_of(r#"(a = ")", b = `(${c})`) => a + b"#);
    let ExprKind::Function { function } = expr.kind else {
        panic!("expected arrow");
    };
    assert_eq!(function.kind, FunctionKind::Arrow);
    assert_eq!(function.params.len(), 2);
}

#[test]
fn test_deep_call_nesting_parses() {
    let mut program = parse(&nested("f(", "x", ")", 100));
    let StmtKind::Expr { expr } = program.body.remove(0).kind else {
        panic!("expected expression");
    };
    let mut depth = 0;
    let mut current = expr;
    while let ExprKind::Call { mut args, .. } = current.kind {
        depth += 1;
        current = args.remove(0).expr;
    }
    assert_eq!(depth, 100);
    assert_eq!(current.as_ident(), Some("x"));
}

#[test]
fn test_nesting_limit_is_build_error() {
    let depth = MAX_NESTING_DEPTH + 1;
    for source in [
        nested("[", "", "]", depth),
        nested("f(", "", ")", depth),
        nested("{", "", "}", depth),
    ] {
        match parse_program(&source) {
            Err(ParseError::BuildError(message, Some(span))) => {
                assert!(message.contains("Nesting"), "{}", message);
                assert!(matches!(source.as_bytes()[span.start], b'[' | b'(' | b'{'));
            }
            other => panic!("expected nesting error, got {:?}", other),
        }
    }
    assert!(matches!(
        parse_expression(&nested("(", "1", ")", depth)),
        Err(ParseError::BuildError(_, _))
    ));
}

#[test]
fn test_nesting_limit_allows_maximum() {
    parse(&nested("[", "", "]", MAX_NESTING_DEPTH));
}

#[test]
fn test_brackets_in_literals_and_comments_not_counted() {
    let opens = "(".repeat(MAX_NESTING_DEPTH + 10);
    let source = format!(
        "const s = \"{0}\"; // {0}\n/* {0} */ const r = /[{0}]/; const t = `{0}${{ [1] }}{0}`;",
        opens
    );
    let program = parse(&source);
    assert_eq!(program.body.len(), 3);
}

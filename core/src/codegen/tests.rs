//! Tests for the code printer

use super::*;
use crate::ast::{Expr, Stmt, StmtKind};
use crate::parser::parse_program;

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse and print a program
fn reprint(source: &str) -> String {
    let program = parse_program(source).expect("Parse should succeed");
    print_program(&program)
}

/// Printing the output again must not change it
fn assert_stable(source: &str) {
    let once = reprint(source);
    let twice = reprint(&once);
    assert_eq!(once, twice, "printer output is not stable for {:?}", source);
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
fn test_binary_precedence_parens() {
    assert_eq!(reprint("a + b * c"), "a + b * c;");
    assert_eq!(reprint("(a + b) * c"), "(a + b) * c;");
    assert_eq!(reprint("(a - b) - c"), "a - b - c;");
    assert_eq!(reprint("a - (b - c)"), "a - (b - c);");
}

#[test]
fn test_exponent_operands() {
    assert_eq!(reprint("(-a) ** b"), "(-a) ** b;");
    assert_eq!(reprint("a ** b ** c"), "a ** b ** c;");
    assert_eq!(reprint("(a ** b) ** c"), "(a ** b) ** c;");
}

#[test]
fn test_nullish_mixing_keeps_parens() {
    assert_eq!(reprint("(a || b) ?? c"), "(a || b) ?? c;");
    assert_eq!(reprint("a && (b ?? c)"), "a && (b ?? c);");
    assert_eq!(reprint("a || b && c"), "a || b && c;");
}

#[test]
fn test_sequence_and_conditional() {
    assert_eq!(reprint("(a, b).c"), "(a, b).c;");
    assert_eq!(reprint("f((a, b))"), "f((a, b));");
    assert_eq!(reprint("x = a ? b : c"), "x = a ? b : c;");
    assert_eq!(reprint("(a ? b : c) ? d : e"), "(a ? b : c) ? d : e;");
}

#[test]
fn test_unary_spacing() {
    assert_eq!(reprint("-(-x)"), "- -x;");
    assert_eq!(reprint("+(+x)"), "+ +x;");
    assert_eq!(reprint("typeof x"), "typeof x;");
    assert_eq!(reprint("!(a && b)"), "!(a && b);");
    assert_eq!(reprint("a - -b"), "a - -b;");
}

#[test]
fn test_new_callee_with_call() {
    assert_eq!(reprint("new (a().b)()"), "new (a().b)();");
    assert_eq!(reprint("new Foo"), "new Foo();");
    assert_eq!(reprint("new a.b.C(1)"), "new a.b.C(1);");
}

#[test]
fn test_member_on_integer_literal() {
    assert_eq!(reprint("(1).toString()"), "(1).toString();");
    assert_eq!(reprint("1.5.toFixed()"), "1.5.toFixed();");
}

#[test]
fn test_optional_chain() {
    assert_eq!(reprint("a?.b?.[c]?.(d)"), "a?.b?.[c]?.(d);");
}

// ============================================================================
// Statement Start
// ============================================================================

#[test]
fn test_function_expression_at_statement_start() {
    assert_eq!(reprint("(function () {})()"), "(function() {}());");
    assert_eq!(reprint("(async function () {})"), "(async function() {});");
    assert_eq!(reprint("(class {})"), "(class {});");
}

#[test]
fn test_object_at_statement_start() {
    assert_eq!(reprint("({ a: x } = b)"), "({ a: x } = b);");
    assert_eq!(reprint("({}).toString()"), "({}.toString());");
}

#[test]
fn test_arrow_object_body() {
    let out = reprint("const f = () => ({ a: 1 })");
    assert!(out.contains("=> ({"), "{}", out);
    assert_stable("const f = () => ({ a: 1 })");
}

#[test]
fn test_arrow_in_callee_position() {
    assert_eq!(reprint("(() => 1)()"), "(() => 1)();");
    assert_eq!(reprint("(async () => {})()"), "(async () => {})();");
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_source_strings_keep_raw_text() {
    assert_eq!(reprint("f('single', \"double\")"), "f('single', \"double\");");
    assert_eq!(reprint("f('a\\u0041')"), "f('a\\u0041');");
}

#[test]
fn test_generated_strings_are_escaped() {
    let expr = Expr::string("\u{feff}say \"hi\"\n\u{feff}");
    assert_eq!(print_expr(&expr), r#""\ufeffsay \"hi\"\n\ufeff""#);
}

#[test]
fn test_quote_string_control_chars() {
    assert_eq!(quote_string("a\\b"), r#""a\\b""#);
    assert_eq!(quote_string("\u{1}"), r#""\x01""#);
    assert_eq!(quote_string("tab\there"), r#""tab\there""#);
}

#[test]
fn test_template_and_regex() {
    assert_eq!(reprint("`a${b + 1}c`"), "`a${b + 1}c`;");
    assert_eq!(reprint("tag`x${y}`"), "tag`x${y}`;");
    assert_eq!(reprint("s.replace(/ab+c/gi, '')"), "s.replace(/ab+c/gi, '');");
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_if_else_layout() {
    assert_eq!(
        reprint("if (a) { b() } else { c() }"),
        "if (a) {\n  b();\n} else {\n  c();\n}"
    );
    assert_eq!(reprint("if (a) b(); else c()"), "if (a)\n  b();\nelse\n  c();");
    assert_eq!(
        reprint("if (a) b(); else if (c) d()"),
        "if (a)\n  b();\nelse if (c)\n  d();"
    );
}

#[test]
fn test_dangling_else_gets_braces() {
    let mut program = parse_program("if (a) if (b) x()").expect("Parse should succeed");
    if let StmtKind::If { alternate, .. } = &mut program.body[0].kind {
        *alternate = Some(Box::new(Stmt::expr(Expr::call(Expr::ident("y"), vec![]))));
    }
    let out = print_program(&program);
    assert_eq!(out, "if (a) {\n  if (b)\n    x();\n} else\n  y();");

    let reparsed = parse_program(&out).expect("Reparse should succeed");
    match &reparsed.body[0].kind {
        StmtKind::If { alternate, .. } => assert!(alternate.is_some()),
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn test_loops() {
    assert_eq!(
        reprint("for (let i = 0; i < n; i++) { f(i) }"),
        "for (let i = 0; i < n; i++) {\n  f(i);\n}"
    );
    assert_eq!(reprint("for (;;) {}"), "for (;;) {}");
    assert_eq!(reprint("for (const x of xs) x()"), "for (const x of xs)\n  x();");
    assert_eq!(reprint("for (k in o) {}"), "for (k in o) {}");
    assert_eq!(reprint("do { a() } while (x)"), "do {\n  a();\n} while (x);");
    assert_eq!(reprint("while (x) y()"), "while (x)\n  y();");
}

#[test]
fn test_for_init_keeps_in_parenthesized() {
    assert_eq!(
        reprint("for (let i = (\"a\" in o) ? 0 : 1;;) {}"),
        "for (let i = (\"a\" in o) ? 0 : 1;;) {}"
    );
    assert_eq!(
        reprint("for (x = (k in o), y = [k in o]; x; x = k in o) {}"),
        "for (x = (k in o), y = [(k in o)]; x; x = k in o) {}"
    );
    assert_stable("for (var f = () => (a in b);;) break");
}

#[test]
fn test_switch_layout() {
    assert_eq!(
        reprint("switch (x) { case 1: a(); break; default: b() }"),
        "switch (x) {\n  case 1:\n    a();\n    break;\n  default:\n    b();\n}"
    );
}

#[test]
fn test_try_layout() {
    assert_eq!(
        reprint("try { a() } catch (e) { b() } finally { c() }"),
        "try {\n  a();\n} catch (e) {\n  b();\n} finally {\n  c();\n}"
    );
    assert_eq!(reprint("try {} catch {}"), "try {} catch {}");
}

#[test]
fn test_labels_and_jumps() {
    assert_eq!(
        reprint("outer: for (;;) { break outer }"),
        "outer: for (;;) {\n  break outer;\n}"
    );
}

#[test]
fn test_directive_kept_verbatim() {
    assert_eq!(reprint("'use strict'\nx"), "'use strict';\nx;");
}

// ============================================================================
// Functions, Classes & Patterns
// ============================================================================

#[test]
fn test_function_forms() {
    assert_eq!(
        reprint("async function* gen(a, b = 1, ...rest) { yield* a }"),
        "async function* gen(a, b = 1, ...rest) {\n  yield* a;\n}"
    );
    assert_eq!(reprint("const f = async (x) => x + 1"), "const f = async (x) => x + 1;");
}

#[test]
fn test_class_layout() {
    let source = "class A extends B { constructor() { super() } static make() {} get v() { return 1 } }";
    assert_eq!(
        reprint(source),
        "class A extends B {\n  constructor() {\n    super();\n  }\n  static make() {}\n  get v() {\n    return 1;\n  }\n}"
    );
}

#[test]
fn test_destructuring_patterns() {
    assert_eq!(
        reprint("const { a, b: [c, , d], ...e } = o"),
        "const { a, b: [c, , d], ...e } = o;"
    );
    assert_eq!(reprint("let [x = 1, ...y] = z"), "let [x = 1, ...y] = z;");
}

#[test]
fn test_object_literal_layout() {
    assert_eq!(
        reprint("x = { a, b: 1, [c]: 2, m() {}, ...d }"),
        "x = {\n  a,\n  b: 1,\n  [c]: 2,\n  m() {},\n  ...d\n};"
    );
}

#[test]
fn test_printer_is_stable() {
    let sources = [
        "let total = 0\nfor (const item of items) { if (!item) continue\n total += item.price }",
        "class C { async *it() { for await (const x of y) yield x } }",
        "label: { try { f() } catch ({ message }) { log(message) } }",
        "const o = { get x() { return 1 }, set x(v) {}, async m() { await n() } }",
        "x = a ? (b, c) : d => ({ e: d })",
        "f(...args, [1, , 2,], `t${`n${m}`}`)",
    ];
    for source in sources {
        assert_stable(source);
    }
}

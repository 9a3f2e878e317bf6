//! Hoist-and-wrap stage tests

use super::helpers::*;

// ============================================================================
// Wrapper
// ============================================================================

#[test]
fn test_expression_completion_value() {
    let code = hoisted("foo()");
    assert!(code.starts_with("(() => {"), "got:\n{}", code);
    assert!(code.contains("var _cr;"));
    assert!(code.contains("_cr = foo();"));
    assert!(code.contains("return _cr;"));
}

#[test]
fn test_empty_program_still_wrapped() {
    let code = hoisted("");
    assert!(code.contains("var _cr;"));
    assert!(code.contains("return _cr;"));
}

#[test]
fn test_completion_name_avoids_user_names() {
    let code = hoisted("_cr = 1");
    assert!(code.contains("var _cr2;"), "got:\n{}", code);
    assert!(code.contains("_cr2 = _cr = 1;"));
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_top_level_declarations_become_vars() {
    let code = hoisted("let a = 1, b; const { c } = d;");
    assert!(code.starts_with("var a;\nvar b;\nvar c;\n"), "got:\n{}", code);
    assert!(code.contains("const _v = a = 1;"));
    assert!(code.contains("const _v2 = { c } = d;"));
    assert!(!code.contains("let a"));
}

#[test]
fn test_repeated_var_hoisted_once() {
    let code = hoisted("var x = 1; var x = 2;");
    assert_eq!(count(&code, "var x;"), 1);
    assert!(code.contains("x = 1;"));
    assert!(code.contains("x = 2;"));
}

#[test]
fn test_function_declaration_hoisted_ahead_of_wrapper() {
    let code = hoisted("f(); function f() { return 1; }");
    let function_at = code.find("function f()").expect("function kept");
    let wrapper_at = code.find("(() => {").expect("wrapper present");
    assert!(function_at < wrapper_at, "got:\n{}", code);
    assert!(code.contains("_cr = f();"));
    assert!(code.contains("_cr = f;"));
}

#[test]
fn test_class_becomes_assignment() {
    let code = hoisted("class A {}");
    assert!(code.starts_with("var A;"), "got:\n{}", code);
    assert!(code.contains("A = class A"));
    assert!(code.contains("_cr = A;"));
}

#[test]
fn test_nested_var_hoisted_and_let_kept() {
    let code = hoisted("if (x) { var y = 2; } { let z = 1; }");
    assert!(code.starts_with("var y;"), "got:\n{}", code);
    assert!(code.contains("y = 2;"));
    assert!(code.contains("let z = 1;"));
    assert!(!code.contains("var z;"));
}

#[test]
fn test_loop_heads_lose_var() {
    let code = hoisted("for (var i = 0; i < 3; i++) {} for (var k of ks) {}");
    assert!(code.contains("var i;"));
    assert!(code.contains("var k;"));
    assert!(code.contains("for (i = 0; i < 3; i++)"), "got:\n{}", code);
    assert!(code.contains("for (k of ks)"));
}

#[test]
fn test_function_bodies_untouched() {
    let code = hoisted("function g() { h(); var q = 1; }");
    assert!(code.contains("var q = 1;"));
    assert!(!code.contains("_cr = h()"));
    assert!(!code.contains("var q;"));
}

// ============================================================================
// Completion records
// ============================================================================

#[test]
fn test_branches_record_completion() {
    let code = hoisted("if (a) b(); else c();");
    assert!(code.contains("_cr = b();"), "got:\n{}", code);
    assert!(code.contains("_cr = c();"));
}

#[test]
fn test_lone_string_is_a_value() {
    let code = hoisted("'hello'");
    assert!(code.contains("_cr = 'hello';"), "got:\n{}", code);
}

#[test]
fn test_directive_prologue_kept_in_front() {
    let code = hoisted("\"use strict\"; x");
    assert!(code.starts_with("\"use strict\";"), "got:\n{}", code);
    assert!(code.contains("_cr = x;"));
}

//! Maybe-async transform tests

use super::helpers::*;
use crate::ast::visit::{self, VisitMut};
use crate::ast::{
    Expr, ExprKind, Function, FunctionBody, FunctionKind, NodeId, Span, Stmt, StmtKind,
};
use crate::config::RewriterConfig;
use crate::rewriter::FunctionMode;

// ============================================================================
// Function modes
// ============================================================================

fn function(kind: FunctionKind, is_async: bool, is_generator: bool) -> Function {
    Function {
        id: NodeId::fresh(),
        span: Span::default(),
        name: None,
        kind,
        is_async,
        is_generator,
        params: Vec::new(),
        rest: None,
        body: FunctionBody::Block { body: Vec::new() },
    }
}

#[test]
fn test_function_mode_classification() {
    assert_eq!(
        FunctionMode::of(&function(FunctionKind::Declaration, false, false)),
        FunctionMode::MaybeAsync
    );
    assert_eq!(
        FunctionMode::of(&function(FunctionKind::Arrow, true, false)),
        FunctionMode::Native
    );
    assert_eq!(
        FunctionMode::of(&function(FunctionKind::Declaration, true, true)),
        FunctionMode::Native
    );
    assert_eq!(
        FunctionMode::of(&function(FunctionKind::Expression, false, true)),
        FunctionMode::AlwaysSync
    );
    assert_eq!(
        FunctionMode::of(&function(FunctionKind::Constructor, false, false)),
        FunctionMode::AlwaysSync
    );
    assert_eq!(FunctionMode::AlwaysSync.as_str(), "always-sync");
}

// ============================================================================
// Maybe-async wrapper
// ============================================================================

#[test]
fn test_wrapper_structure() {
    let code = transformed("function f() { return db.coll.find(); }", &quiet_config());
    assert!(code.contains(r#"let _functionState = "sync", _synchronousReturnValue;"#), "got:\n{}", code);
    assert!(code.contains("const _asynchronousReturnValue = (async () => {"));
    assert!(code.contains(r#"_functionState = "async";"#));
    assert!(code.contains("return _markSyntheticPromise(_asynchronousReturnValue);"));
    assert!(code.contains(r#"if (_functionState === "returned")"#));
    assert!(code.contains("return _synchronousReturnValue;"));
    assert!(code.contains(r#"_functionState === "async" ? _synchronousReturnValue : null"#));
    assert!(code.contains("_err = _demangleError(_err);"));
}

#[test]
fn test_prelude_declared_once_per_root() {
    let code = transformed(
        "function outer() { function inner() { return x(); } return inner(); }",
        &quiet_config(),
    );
    assert_eq!(count(&code, "function _isSp("), 1, "got:\n{}", code);
    assert_eq!(count(&code, "const _syntheticPromise = "), 1);
    assert!(code.contains(r#"Symbol.for("@@shell.syntheticPromise")"#));
    // Each function keeps its own state slot
    assert!(code.contains("_functionState2"));
}

#[test]
fn test_separate_roots_get_separate_preludes() {
    let code = transformed("function a() {} function b() {}", &quiet_config());
    assert!(code.contains("function _isSp("), "got:\n{}", code);
    assert!(code.contains("function _isSp2("));
}

#[test]
fn test_shorthand_arrow_gets_block_body() {
    let code = transformed("const f = () => load();", &quiet_config());
    // The guarded call is a sequence, parenthesized inside the assignment
    assert!(code.contains("return _synchronousReturnValue = ("), "got:\n{}", code);
    assert!(code.contains(r#"_functionState === "async" ? _synchronousReturnValue : null;"#));
}

// ============================================================================
// Expression instrumentation
// ============================================================================

#[test]
fn test_calls_and_members_guarded() {
    let code = transformed("function f() { return db.coll.find(); }", &quiet_config());
    assert!(code.contains(r#""\ufeffdb.coll.find()\ufeff""#), "got:\n{}", code);
    assert!(code.contains(r#""\ufeffdb.coll\ufeff""#));
    assert!(code.contains(r#""\ufeffdb\ufeff""#));
    assert!(code.contains("_isSp(_ex) ? await _ex : _ex"));
    // The callee keeps its receiver
    assert!(!code.contains(r#""\ufeffdb.coll.find\ufeff""#));
}

#[test]
fn test_bound_names_and_globals_not_guarded() {
    let code = transformed(
        "function f(a) { let b = a; return Math.max(b, 2); }",
        &quiet_config(),
    );
    assert!(!code.contains(r#""\ufeffa\ufeff""#), "got:\n{}", code);
    assert!(!code.contains(r#""\ufeffb\ufeff""#));
    assert!(!code.contains(r#""\ufeffMath\ufeff""#));
    assert!(code.contains(r#""\ufeffMath.max(b, 2)\ufeff""#));
}

#[test]
fn test_assignment_targets_and_operands_not_guarded() {
    let code = transformed(
        "function f() { x.y = 1; delete a.b; c.d++; }",
        &quiet_config(),
    );
    assert!(!code.contains(r#""\ufeffx.y\ufeff""#), "got:\n{}", code);
    assert!(code.contains(r#""\ufeffx\ufeff""#));
    assert!(!code.contains(r#""\ufeffa.b\ufeff""#));
    assert!(!code.contains(r#""\ufeffc.d\ufeff""#));
}

#[test]
fn test_parameters_not_guarded() {
    let code = transformed("function f(a = load()) { return a; }", &quiet_config());
    assert!(!code.contains(r#""\ufeffload()\ufeff""#), "got:\n{}", code);
    assert!(code.contains("a = load()"));
}

#[test]
fn test_optional_chain_guarded_as_a_whole() {
    let code = transformed("function f() { return a?.b.c; }", &quiet_config());
    assert!(code.contains(r#""\ufeffa?.b.c\ufeff""#), "got:\n{}", code);
    assert!(!code.contains(r#""\ufeffa?.b\ufeff""#));
}

#[test]
fn test_typeof_undeclared_stays_undefined() {
    let code = transformed("function f() { return typeof missing; }", &quiet_config());
    assert!(
        code.contains(r#"typeof missing === "undefined" ? "undefined" : typeof ("#),
        "got:\n{}",
        code
    );
}

#[test]
fn test_long_source_shortened() {
    let code = transformed(
        "function f() { return db.collection.aggregate([{ $match: {} }]); }",
        &quiet_config(),
    );
    assert!(code.contains(r#""\ufeffdb.collection. ... {} }])\ufeff""#), "got:\n{}", code);
}

// ============================================================================
// Native and always-sync functions
// ============================================================================

#[test]
fn test_async_function_guarded_without_wrapper() {
    let code = transformed("async function f() { return db.x; }", &quiet_config());
    assert!(code.contains("await _ex"), "got:\n{}", code);
    assert!(!code.contains("_functionState"));
    assert!(!code.contains("_synchronousReturnValue ="));
    assert!(code.contains("_err = _demangleError(_err);"));
}

#[test]
fn test_constructor_asserts_not_deferred() {
    let code = transformed("class C { constructor() { this.x = load(); } }", &quiet_config());
    let baseline = transformed("class C { constructor() {} }", &quiet_config());
    assert!(code.contains(r#", "load()")"#), "got:\n{}", code);
    // Only the helper prelude awaits
    assert_eq!(count(&code, "await"), count(&baseline, "await"));
    assert!(code.contains("new Error("));
}

#[test]
fn test_always_sync_parameter_defaults_asserted() {
    let code = transformed(
        "class C { constructor(a = load()) { this.a = a; } }",
        &quiet_config(),
    );
    assert!(
        code.contains(r#"constructor(a = _assertNotSyntheticPromise(load(), "load()"))"#),
        "got:\n{}",
        code
    );
}

#[test]
fn test_maybe_async_parameter_defaults_not_guarded() {
    let code = transformed("function f(a = load()) { return a; }", &quiet_config());
    assert!(code.contains("function f(a = load())"), "got:\n{}", code);
}

#[test]
fn test_generator_iterables_asserted() {
    let code = transformed(
        "function* g() { for (const x of this.items) {} yield* this.other; }",
        &quiet_config(),
    );
    assert!(
        code.contains(r#"_assertNotSyntheticPromise(this.items, "this.items", true)"#),
        "got:\n{}",
        code
    );
    assert!(code.contains(r#"_assertNotSyntheticPromise(this.other, "this.other", true)"#));
    let baseline = transformed("function* g() {}", &quiet_config());
    assert_eq!(count(&code, "expectNext"), count(&baseline, "expectNext"));
    assert!(!code.contains("_adaptAsyncIterableToSyncIterable(this.items"));
}

#[test]
fn test_contained_error_uses_configured_constructor() {
    let config = RewriterConfig::builder()
        .error_constructor("errors.ShellError")
        .echo_function_source(false)
        .build()
        .unwrap();
    let code = transformed("function* g() { yield x; }", &config);
    assert!(code.contains("new errors.ShellError("), "got:\n{}", code);
}

// ============================================================================
// for-of adapter
// ============================================================================

#[test]
fn test_for_of_routed_through_adapter() {
    let code = transformed(
        "function f() { for (const doc of db.coll.find()) { print(doc); } }",
        &quiet_config(),
    );
    assert!(code.contains("_adaptAsyncIterableToSyncIterable("), "got:\n{}", code);
    assert!(code.contains("_isai && await _it.expectNext();"));
    assert!(code.contains("for (const _i of ("));
    assert!(code.contains("const doc = _i;"));
    assert!(code.contains("_isai && await _it.syncReturn();"));
}

#[test]
fn test_labeled_for_of_keeps_label_on_loop() {
    let code = transformed(
        "function f() { outer: for (const a of xs()) { continue outer; } }",
        &quiet_config(),
    );
    assert!(code.contains("outer: for (const _i of ("), "got:\n{}", code);
    assert!(code.contains("continue outer;"));
}

#[test]
fn test_for_await_untouched() {
    let code = transformed(
        "async function f() { for await (const a of s()) {} }",
        &quiet_config(),
    );
    let baseline = transformed("async function f() {}", &quiet_config());
    assert_eq!(count(&code, "expectNext"), count(&baseline, "expectNext"), "got:\n{}", code);
    assert!(code.contains("for await (const a of "));
}

// ============================================================================
// Catch clauses and source echo
// ============================================================================

#[test]
fn test_user_catch_demangles_error() {
    let code = transformed(
        "function f() { try { g(); } catch (e) { h(e); } }",
        &quiet_config(),
    );
    assert!(code.contains("e = _demangleError(e);"), "got:\n{}", code);
}

#[test]
fn test_function_source_echoed() {
    let code = transformed("function f() { return 1; }", &RewriterConfig::default());
    assert!(
        code.contains(r#""<async_rewriter>function%20f()%20%7B%20return%201%3B%20%7D</async_rewriter>";"#),
        "got:\n{}",
        code
    );
}

#[test]
fn test_second_pass_is_a_no_op() {
    let config = quiet_config();
    let source = "function f() { for (const a of b()) { try { c(); } catch (e) {} } }";
    let mut program = crate::parser::parse_program(source).unwrap();
    let mut ctx = crate::rewriter::PipelineContext::new(source, &config);
    crate::rewriter::maybe_async::apply(&mut program, &mut ctx).unwrap();
    let once = crate::codegen::print_program(&program);
    crate::rewriter::maybe_async::apply(&mut program, &mut ctx).unwrap();
    let twice = crate::codegen::print_program(&program);
    assert_eq!(once, twice);
}

// ============================================================================
// Return capture
// ============================================================================

/// Collects the values of `return` statements inside async arrows
#[derive(Default)]
struct AsyncArrowReturns {
    in_async_arrow: Vec<bool>,
    values: Vec<Expr>,
}

impl VisitMut for AsyncArrowReturns {
    fn visit_function(&mut self, function: &mut Function) {
        self.in_async_arrow
            .push(function.is_async && function.kind == FunctionKind::Arrow);
        visit::walk_function(self, function);
        self.in_async_arrow.pop();
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        if self.in_async_arrow.last() == Some(&true) {
            if let StmtKind::Return { value: Some(value) } = &stmt.kind {
                self.values.push(value.clone());
            }
        }
        visit::walk_stmt(self, stmt);
    }
}

fn stores_sync_return_value(value: &Expr) -> bool {
    let ExprKind::Sequence { exprs } = &value.kind else {
        return false;
    };
    match exprs.first().map(|expr| &expr.kind) {
        Some(ExprKind::Assign { target, .. }) => target
            .as_ident()
            .is_some_and(|name| name.starts_with("_synchronousReturnValue")),
        _ => false,
    }
}

#[test]
fn test_every_wrapped_return_stores_sync_value() {
    let mut program = rewritten_program(
        "function f(a) { if (a) return g(); for (const x of a) { return x; } return 1; }\nf([1])",
    );
    let mut returns = AsyncArrowReturns::default();
    returns.visit_program(&mut program);
    // Three in `f` and the completion value of the program
    assert_eq!(returns.values.len(), 4);
    for value in &returns.values {
        assert!(stores_sync_return_value(value), "uncaptured return: {:?}", value);
    }
}

#[test]
fn test_native_async_returns_left_alone() {
    let mut program = rewritten_program("async function f() { return 1; }");
    let mut returns = AsyncArrowReturns::default();
    returns.visit_program(&mut program);
    // Only the completion value of the program is captured
    assert_eq!(returns.values.len(), 1);
    assert!(stores_sync_return_value(&returns.values[0]));
}

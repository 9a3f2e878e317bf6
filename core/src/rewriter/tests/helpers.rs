//! Test helpers for rewriter tests
//!
//! Each helper runs a subset of the stages over a fresh pipeline context,
//! prints the result and checks that the printed code parses again.

use crate::ast::Program;
use crate::codegen::print_program;
use crate::config::RewriterConfig;
use crate::parser::parse_program;
use crate::rewriter::context::PipelineContext;
use crate::rewriter::{firewall, hoist, maybe_async, rewrite_code};

/// Defaults without the per-function source echo, for shorter output
pub fn quiet_config() -> RewriterConfig {
    RewriterConfig::builder()
        .echo_function_source(false)
        .build()
        .expect("valid config")
}

/// Parse the printed output again
pub fn assert_reparses(code: &str) {
    if let Err(err) = parse_program(code) {
        panic!("rewritten code does not parse: {}\n---\n{}", err, code);
    }
}

/// Hoist-and-wrap only
pub fn hoisted(source: &str) -> String {
    let config = RewriterConfig::default();
    let mut program = parse_program(source).expect("Parse should succeed");
    let mut ctx = PipelineContext::new(source, &config);
    hoist::hoist_and_wrap(&mut program, &mut ctx).expect("hoist should succeed");
    let code = print_program(&program);
    assert_reparses(&code);
    code
}

/// Exception firewall only
pub fn firewalled(source: &str, config: &RewriterConfig) -> String {
    let mut program = parse_program(source).expect("Parse should succeed");
    let mut ctx = PipelineContext::new(source, config);
    firewall::apply(&mut program, &mut ctx).expect("firewall should succeed");
    let code = print_program(&program);
    assert_reparses(&code);
    code
}

/// Maybe-async transform only
pub fn transformed(source: &str, config: &RewriterConfig) -> String {
    let mut program = parse_program(source).expect("Parse should succeed");
    let mut ctx = PipelineContext::new(source, config);
    maybe_async::apply(&mut program, &mut ctx).expect("transform should succeed");
    let code = print_program(&program);
    assert_reparses(&code);
    code
}

/// All stages
pub fn rewritten(source: &str) -> String {
    let code = rewrite_code(source, &quiet_config()).expect("rewrite should succeed");
    assert_reparses(&code);
    code
}

/// All stages, parsed back into a tree
pub fn rewritten_program(source: &str) -> Program {
    parse_program(&rewritten(source)).expect("Parse should succeed")
}

/// Occurrences of `needle` in `haystack`
pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

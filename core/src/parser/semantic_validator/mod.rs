//! Semantic Validation for rewriter input
//!
//! This module provides an extensible rule-based validation system that runs
//! after parsing to catch early errors that the grammar can't enforce.
//!
//! # Usage
//!
//! ```ignore
//! use async_rewriter::parser::{parse_program, semantic_validator::validate_program};
//!
//! let program = parse_program(source)?;
//! let errors = validate_program(&program, source);
//! if !errors.is_empty() {
//!     // Handle validation errors
//! }
//! ```
//!
//! # Architecture
//!
//! 1. **ValidationRule trait** - Each rule implements this trait
//! 2. **Validator** - Collects and runs all rules
//! 3. **ValidationError** - The output of validation (errors, warnings, hints)
//!
//! # Adding a New Rule
//!
//! 1. Create a new file in `semantic_validator/rules/`
//! 2. Implement `ValidationRule` for your struct
//! 3. Add it to the `Validator::new()` constructor

pub mod rules;

use crate::ast::{
    Class, Expr, ExprKind, Function, FunctionBody, Pattern, PatternKind, Program, Prop, PropKey,
    Span, Stmt, StmtKind,
};

// ============================================================================
// Validation Error Types
// ============================================================================

/// A validation error produced by semantic analysis.
///
/// Independent of any output format so the CLI, the node binding and the
/// rewrite pipeline can all report it.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The source location of the issue
    pub span: Span,
    /// Human-readable message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Which rule produced this error
    pub rule_id: &'static str,
}

/// Severity levels for validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Must be fixed - the script would not run
    Error,
    /// Should probably be fixed - potential bug
    Warning,
    /// Suggestion for improvement
    Hint,
}

impl ValidationError {
    /// Create a new error
    pub fn error(span: Span, message: impl Into<String>, rule_id: &'static str) -> Self {
        Self {
            span,
            message: message.into(),
            severity: Severity::Error,
            rule_id,
        }
    }

    /// Create a new warning
    pub fn warning(span: Span, message: impl Into<String>, rule_id: &'static str) -> Self {
        Self {
            span,
            message: message.into(),
            severity: Severity::Warning,
            rule_id,
        }
    }

    /// Create a new hint
    #[allow(dead_code)]
    pub fn hint(span: Span, message: impl Into<String>, rule_id: &'static str) -> Self {
        Self {
            span,
            message: message.into(),
            severity: Severity::Hint,
            rule_id,
        }
    }

    /// Check if this is an error (not a warning or hint)
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Hint => "hint",
        };
        write!(
            f,
            "{} at line {}, col {}: {} [{}]",
            severity,
            self.span.start_line + 1,
            self.span.start_col + 1,
            self.message,
            self.rule_id
        )
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// Trait that all validation rules must implement.
///
/// Each rule checks one aspect of the program and must not depend on the
/// results of other rules.
pub trait ValidationRule: Send + Sync {
    /// Unique identifier for this rule (e.g., "invalid-jump")
    fn id(&self) -> &'static str;

    /// Human-readable description of what this rule checks
    fn description(&self) -> &'static str;

    /// Run the validation and return any errors found.
    fn validate(&self, program: &Program, source: &str) -> Vec<ValidationError>;
}

// ============================================================================
// Validator - Runs All Rules
// ============================================================================

/// The main validator that orchestrates all validation rules.
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Create a new validator with all built-in rules.
    pub fn new() -> Self {
        Self {
            rules: vec![
                // Error rules - the script would be rejected by the engine
                Box::new(rules::DuplicateDeclarationRule),
                Box::new(rules::ReturnOutsideFunctionRule),
                Box::new(rules::JumpTargetRule),
                // Warning rules
                Box::new(rules::UnreachableCodeRule),
            ],
        }
    }

    /// Run all validation rules and collect errors.
    pub fn validate(&self, program: &Program, source: &str) -> Vec<ValidationError> {
        self.rules
            .iter()
            .flat_map(|rule| rule.validate(program, source))
            .collect()
    }

    /// Get a list of all registered rules (useful for documentation)
    pub fn rules(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.rules.iter().map(|r| (r.id(), r.description()))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Validate a program and return all errors found.
///
/// # Example
///
/// ```ignore
/// let program = parse_program(source)?;
/// for error in validate_program(&program, source) {
///     eprintln!("{}", error);
/// }
/// ```
pub fn validate_program(program: &Program, source: &str) -> Vec<ValidationError> {
    let validator = Validator::new();
    validator.validate(program, source)
}

/// Check if a program has any validation errors (not just warnings).
pub fn has_errors(program: &Program, source: &str) -> bool {
    validate_program(program, source)
        .iter()
        .any(|e| e.is_error())
}

// ============================================================================
// AST Traversal Helpers
// ============================================================================

/// The top-level program body followed by every block-bodied function body,
/// outermost first
pub(crate) fn bodies(program: &Program) -> Vec<&[Stmt]> {
    let mut functions = Vec::new();
    functions_in_stmts(&program.body, &mut functions);

    let mut out: Vec<&[Stmt]> = vec![&program.body];
    for function in functions {
        if let FunctionBody::Block { body } = &function.body {
            out.push(body);
        }
    }
    out
}

/// Visit every statement reachable without crossing a function boundary
pub(crate) fn walk_stmts<'a, F: FnMut(&'a Stmt)>(stmts: &'a [Stmt], f: &mut F) {
    for stmt in stmts {
        walk_stmt(stmt, f);
    }
}

fn walk_stmt<'a, F: FnMut(&'a Stmt)>(stmt: &'a Stmt, f: &mut F) {
    f(stmt);
    match &stmt.kind {
        StmtKind::Block { body } => walk_stmts(body, f),
        StmtKind::If {
            consequent,
            alternate,
            ..
        } => {
            walk_stmt(consequent, f);
            if let Some(alternate) = alternate {
                walk_stmt(alternate, f);
            }
        }
        StmtKind::For { body, .. }
        | StmtKind::ForIn { body, .. }
        | StmtKind::ForOf { body, .. }
        | StmtKind::While { body, .. }
        | StmtKind::DoWhile { body, .. }
        | StmtKind::Labeled { body, .. } => walk_stmt(body, f),
        StmtKind::Try {
            block,
            handler,
            finalizer,
        } => {
            walk_stmts(block, f);
            if let Some(handler) = handler {
                walk_stmts(&handler.body, f);
            }
            if let Some(finalizer) = finalizer {
                walk_stmts(finalizer, f);
            }
        }
        StmtKind::Switch { cases, .. } => {
            for case in cases {
                walk_stmts(&case.body, f);
            }
        }
        _ => {}
    }
}

/// Visit every statement list reachable without crossing a function boundary
pub(crate) fn for_each_stmt_list<'a, F: FnMut(&'a [Stmt])>(stmts: &'a [Stmt], f: &mut F) {
    f(stmts);
    walk_stmts(stmts, &mut |stmt: &'a Stmt| match &stmt.kind {
        StmtKind::Block { body } => f(body),
        StmtKind::Try {
            block,
            handler,
            finalizer,
        } => {
            f(block);
            if let Some(handler) = handler {
                f(&handler.body);
            }
            if let Some(finalizer) = finalizer {
                f(finalizer);
            }
        }
        StmtKind::Switch { cases, .. } => {
            for case in cases {
                f(&case.body);
            }
        }
        _ => {}
    });
}

fn functions_in_stmts<'a>(stmts: &'a [Stmt], out: &mut Vec<&'a Function>) {
    walk_stmts(stmts, &mut |stmt: &'a Stmt| match &stmt.kind {
        StmtKind::Expr { expr } | StmtKind::Throw { value: expr } => functions_in_expr(expr, out),
        StmtKind::Return { value } => {
            if let Some(value) = value {
                functions_in_expr(value, out);
            }
        }
        StmtKind::Var { decl } => {
            for declarator in &decl.declarations {
                functions_in_pattern(&declarator.target, out);
                if let Some(init) = &declarator.init {
                    functions_in_expr(init, out);
                }
            }
        }
        StmtKind::Function { function } => functions_in_function(function, out),
        StmtKind::Class { class } => functions_in_class(class, out),
        StmtKind::If { test, .. }
        | StmtKind::While { test, .. }
        | StmtKind::DoWhile { test, .. } => functions_in_expr(test, out),
        StmtKind::For {
            init, test, update, ..
        } => {
            match init {
                Some(crate::ast::ForInit::Var { decl }) => {
                    for declarator in &decl.declarations {
                        if let Some(init) = &declarator.init {
                            functions_in_expr(init, out);
                        }
                    }
                }
                Some(crate::ast::ForInit::Expr { expr }) => functions_in_expr(expr, out),
                None => {}
            }
            for expr in test.iter().chain(update.iter()) {
                functions_in_expr(expr, out);
            }
        }
        StmtKind::ForIn { right, .. } | StmtKind::ForOf { right, .. } => {
            functions_in_expr(right, out)
        }
        StmtKind::Switch {
            discriminant,
            cases,
        } => {
            functions_in_expr(discriminant, out);
            for case in cases {
                if let Some(test) = &case.test {
                    functions_in_expr(test, out);
                }
            }
        }
        _ => {}
    });
}

fn functions_in_function<'a>(function: &'a Function, out: &mut Vec<&'a Function>) {
    out.push(function);
    for param in function.params.iter().chain(function.rest.as_deref()) {
        functions_in_pattern(param, out);
    }
    match &function.body {
        FunctionBody::Block { body } => functions_in_stmts(body, out),
        FunctionBody::Expr { expr } => functions_in_expr(expr, out),
    }
}

fn functions_in_class<'a>(class: &'a Class, out: &mut Vec<&'a Function>) {
    if let Some(super_class) = &class.super_class {
        functions_in_expr(super_class, out);
    }
    for member in &class.members {
        functions_in_key(&member.key, out);
        functions_in_function(&member.function, out);
    }
}

fn functions_in_key<'a>(key: &'a PropKey, out: &mut Vec<&'a Function>) {
    if let PropKey::Computed { expr } = key {
        functions_in_expr(expr, out);
    }
}

fn functions_in_pattern<'a>(pattern: &'a Pattern, out: &mut Vec<&'a Function>) {
    match &pattern.kind {
        PatternKind::Ident { .. } => {}
        PatternKind::Expr { expr } => functions_in_expr(expr, out),
        PatternKind::Object { props, rest } => {
            for prop in props {
                functions_in_key(&prop.key, out);
                functions_in_pattern(&prop.value, out);
            }
            if let Some(rest) = rest {
                functions_in_pattern(rest, out);
            }
        }
        PatternKind::Array { elements, rest } => {
            for element in elements.iter().flatten() {
                functions_in_pattern(element, out);
            }
            if let Some(rest) = rest {
                functions_in_pattern(rest, out);
            }
        }
        PatternKind::Default { target, default } => {
            functions_in_pattern(target, out);
            functions_in_expr(default, out);
        }
    }
}

fn functions_in_expr<'a>(expr: &'a Expr, out: &mut Vec<&'a Function>) {
    match &expr.kind {
        ExprKind::Function { function } => functions_in_function(function, out),
        ExprKind::Class { class } => functions_in_class(class, out),
        ExprKind::Template { tpl } => {
            for e in &tpl.exprs {
                functions_in_expr(e, out);
            }
        }
        ExprKind::TaggedTemplate { tag, tpl } => {
            functions_in_expr(tag, out);
            for e in &tpl.exprs {
                functions_in_expr(e, out);
            }
        }
        ExprKind::Array { elements } => {
            for element in elements.iter().flatten() {
                functions_in_expr(&element.expr, out);
            }
        }
        ExprKind::Object { props } => {
            for prop in props {
                match prop {
                    Prop::KeyValue { key, value, .. } => {
                        functions_in_key(key, out);
                        functions_in_expr(value, out);
                    }
                    Prop::Method { key, function } => {
                        functions_in_key(key, out);
                        functions_in_function(function, out);
                    }
                    Prop::Spread { expr } => functions_in_expr(expr, out),
                }
            }
        }
        ExprKind::Unary { arg, .. }
        | ExprKind::Update { arg, .. }
        | ExprKind::Await { arg }
        | ExprKind::Import { arg } => functions_in_expr(arg, out),
        ExprKind::Yield { arg, .. } => {
            if let Some(arg) = arg {
                functions_in_expr(arg, out);
            }
        }
        ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
            functions_in_expr(left, out);
            functions_in_expr(right, out);
        }
        ExprKind::Assign { target, value, .. } => {
            functions_in_pattern(target, out);
            functions_in_expr(value, out);
        }
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            functions_in_expr(test, out);
            functions_in_expr(consequent, out);
            functions_in_expr(alternate, out);
        }
        ExprKind::Call { callee, args, .. } | ExprKind::New { callee, args } => {
            functions_in_expr(callee, out);
            for arg in args {
                functions_in_expr(&arg.expr, out);
            }
        }
        ExprKind::Member {
            object, property, ..
        } => {
            functions_in_expr(object, out);
            if let crate::ast::MemberProp::Computed { expr } = property {
                functions_in_expr(expr, out);
            }
        }
        ExprKind::Sequence { exprs } => {
            for e in exprs {
                functions_in_expr(e, out);
            }
        }
        ExprKind::Ident { .. }
        | ExprKind::This
        | ExprKind::Super
        | ExprKind::Null
        | ExprKind::Bool { .. }
        | ExprKind::Num { .. }
        | ExprKind::BigInt { .. }
        | ExprKind::Str { .. }
        | ExprKind::Regex { .. } => {}
    }
}

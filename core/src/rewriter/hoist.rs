//! Hoist-and-wrap stage
//!
//! Moves the top-level statement list into an immediately invoked arrow
//! function so later stages only ever deal with function bodies:
//!
//! ```text
//! function foo() { return db.test.find(); }
//! class A {}
//! foo()
//! ```
//!
//! becomes roughly
//!
//! ```text
//! var A;
//! function foo() { return db.test.find(); }
//! (() => { var _cr; _cr = foo; A = class A {}; _cr = A; _cr = foo(); return _cr; })();
//! ```
//!
//! Top-level `let`/`const` become `var`s outside the wrapper, so bindings
//! survive between interactively entered snippets.

use std::collections::HashSet;

use crate::ast::{
    split_directives, Class, Expr, ExprKind, ForHead, ForInit, Pattern, Program, Stmt, StmtKind,
    VarDecl, VarKind,
};
use crate::error::RewriteError;
use crate::parser::unescape_string;

use super::context::{Marker, PipelineContext};
use super::template::{Replacement, Template};

const WRAPPER: Template = Template::new(
    "top-level wrapper",
    "(() => {\n  var CR;\n  BODY\n  return CR;\n})();",
);

pub fn hoist_and_wrap(
    program: &mut Program,
    ctx: &mut PipelineContext<'_>,
) -> Result<(), RewriteError> {
    let (mut directives, mut rest) = split_directives(std::mem::take(&mut program.body));

    // A lone string is a value, not a prologue
    if rest.is_empty() && directives.len() == 1 {
        rest.push(directive_to_expression(directives.remove(0)));
    }

    let completion = ctx.fresh_name("cr");
    let mut hoister = Hoister {
        ctx,
        completion: completion.clone(),
        variables: Vec::new(),
        functions: Vec::new(),
    };
    let mut moved = Vec::with_capacity(rest.len());
    for stmt in rest {
        hoister.top_level(stmt, &mut moved);
    }

    let Hoister {
        ctx,
        variables,
        functions,
        ..
    } = hoister;

    let wrapper = WRAPPER.stmts(
        ctx,
        vec![
            ("CR", Replacement::Ident(completion)),
            ("BODY", Replacement::Stmts(moved)),
        ],
    )?;

    let mut seen = HashSet::new();
    let mut body = directives;
    for name in variables {
        if seen.insert(name.clone()) {
            let decl = Stmt::var(VarKind::Var, Pattern::ident(name), None);
            ctx.mark(decl.id, Marker::Generated);
            body.push(decl);
        }
    }
    body.extend(functions);
    body.extend(wrapper);
    program.body = body;

    tracing::debug!(
        hoisted_variables = seen.len(),
        "top-level statements wrapped"
    );
    Ok(())
}

fn directive_to_expression(stmt: Stmt) -> Stmt {
    let StmtKind::Directive { raw } = stmt.kind else {
        return stmt;
    };
    let value = unescape_string(raw.get(1..raw.len().saturating_sub(1)).unwrap_or_default());
    let expr = Expr::new(
        ExprKind::Str {
            value,
            raw: Some(raw),
        },
        stmt.span,
    );
    Stmt::new(StmtKind::Expr { expr }, stmt.span)
}

struct Hoister<'c, 'a> {
    ctx: &'c mut PipelineContext<'a>,
    completion: String,
    /// Names redeclared as `var` outside the wrapper, in order of appearance
    variables: Vec<String>,
    /// Function declarations hoisted ahead of the wrapper
    functions: Vec<Stmt>,
}

impl Hoister<'_, '_> {
    fn top_level(&mut self, mut stmt: Stmt, moved: &mut Vec<Stmt>) {
        match stmt.kind {
            StmtKind::Var { decl } => {
                if self.declares_completion(&decl) {
                    stmt.kind = StmtKind::Var { decl };
                    moved.push(stmt);
                } else {
                    moved.extend(self.declarations_to_assignments(decl));
                }
            }
            StmtKind::Class { class } if class.name.is_some() => {
                moved.extend(self.class_to_assignment(*class));
            }
            kind => {
                stmt.kind = kind;
                self.nested_list(std::slice::from_mut(&mut stmt), moved);
            }
        }
    }

    /// Rewrite statements outside any function, splicing replacements into `out`
    fn nested_list(&mut self, stmts: &mut [Stmt], out: &mut Vec<Stmt>) {
        for stmt in stmts.iter_mut() {
            match &mut stmt.kind {
                StmtKind::Var { decl }
                    if decl.kind == VarKind::Var && !self.declares_completion(decl) =>
                {
                    let decl = std::mem::replace(
                        decl,
                        VarDecl {
                            kind: VarKind::Var,
                            declarations: Vec::new(),
                        },
                    );
                    out.extend(self.declarations_to_assignments(decl));
                }
                _ => {
                    self.nested(stmt);
                    out.push(stmt.take());
                }
            }
        }
    }

    fn nested_block(&mut self, body: &mut Vec<Stmt>) {
        let mut out = Vec::with_capacity(body.len());
        self.nested_list(body, &mut out);
        *body = out;
    }

    /// Rewrite a statement in a single-statement slot
    fn nested(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Expr { expr } => {
                if !self.ctx.is_marked(expr.id, Marker::Generated) {
                    let value = expr.take();
                    *expr = self.completion_assignment(value);
                }
            }
            StmtKind::Var { decl } if decl.kind == VarKind::Var => {
                if self.declares_completion(decl) {
                    return;
                }
                let decl = std::mem::replace(
                    decl,
                    VarDecl {
                        kind: VarKind::Var,
                        declarations: Vec::new(),
                    },
                );
                let mut assignments = self.declarations_to_assignments(decl);
                *stmt = match assignments.len() {
                    0 => Stmt::empty(),
                    1 => assignments.remove(0),
                    _ => Stmt::block(assignments),
                };
                self.ctx.mark(stmt.id, Marker::Generated);
            }
            StmtKind::Function { function } => {
                let Some(name) = function.name.clone() else {
                    return;
                };
                let declaration = std::mem::replace(stmt, Stmt::empty());
                self.functions.push(declaration);
                *stmt = Stmt::expr(self.completion_assignment(Expr::ident(name)));
                self.ctx.mark(stmt.id, Marker::Generated);
            }
            StmtKind::Block { body } => self.nested_block(body),
            StmtKind::If {
                consequent,
                alternate,
                ..
            } => {
                self.nested(consequent);
                if let Some(alternate) = alternate {
                    self.nested(alternate);
                }
            }
            StmtKind::For { init, body, .. } => {
                if let Some(ForInit::Var { decl }) = init {
                    if decl.kind == VarKind::Var {
                        let decl = std::mem::replace(
                            decl,
                            VarDecl {
                                kind: VarKind::Var,
                                declarations: Vec::new(),
                            },
                        );
                        *init = self.declarations_to_for_init(decl);
                    }
                }
                self.nested(body);
            }
            StmtKind::ForIn { left, body, .. } | StmtKind::ForOf { left, body, .. } => {
                if let ForHead::Var { decl } = left {
                    if decl.kind == VarKind::Var && decl.declarations.len() == 1 {
                        self.record(decl);
                        let target = decl.declarations.remove(0).target;
                        *left = ForHead::Pattern { pattern: target };
                    }
                }
                self.nested(body);
            }
            StmtKind::While { body, .. }
            | StmtKind::DoWhile { body, .. }
            | StmtKind::Labeled { body, .. } => self.nested(body),
            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => {
                self.nested_block(block);
                if let Some(handler) = handler {
                    self.nested_block(&mut handler.body);
                }
                if let Some(finalizer) = finalizer {
                    self.nested_block(finalizer);
                }
            }
            StmtKind::Switch { cases, .. } => {
                for case in cases.iter_mut() {
                    self.nested_block(&mut case.body);
                }
            }
            _ => {}
        }
    }

    fn declares_completion(&self, decl: &VarDecl) -> bool {
        decl.declarations
            .iter()
            .any(|d| d.target.as_ident() == Some(self.completion.as_str()))
    }

    fn record(&mut self, decl: &VarDecl) {
        self.variables.extend(decl.bound_names());
    }

    /// `const _v = (PATTERN = INIT);` per initialized declarator
    fn declarations_to_assignments(&mut self, decl: VarDecl) -> Vec<Stmt> {
        self.record(&decl);
        let mut out = Vec::new();
        for declarator in decl.declarations {
            let Some(init) = declarator.init else {
                continue;
            };
            let assignment = Expr::assign(declarator.target, init);
            self.ctx.mark(assignment.id, Marker::Generated);
            let dummy = self.ctx.fresh_name("v");
            let stmt = Stmt::var(VarKind::Const, Pattern::ident(dummy), Some(assignment));
            self.ctx.mark(stmt.id, Marker::Generated);
            out.push(stmt);
        }
        out
    }

    fn declarations_to_for_init(&mut self, decl: VarDecl) -> Option<ForInit> {
        self.record(&decl);
        let mut assignments: Vec<Expr> = decl
            .declarations
            .into_iter()
            .filter_map(|d| d.init.map(|init| Expr::assign(d.target, init)))
            .collect();
        for assignment in &assignments {
            self.ctx.mark(assignment.id, Marker::Generated);
        }
        let expr = match assignments.len() {
            0 => return None,
            1 => assignments.remove(0),
            _ => Expr::sequence(assignments),
        };
        Some(ForInit::Expr { expr })
    }

    /// `class A {}` becomes `A = class A {}; _cr = A;`
    fn class_to_assignment(&mut self, class: Class) -> Vec<Stmt> {
        let Some(name) = class.name.clone() else {
            return Vec::new();
        };
        self.variables.push(name.clone());
        let span = class.span;
        let class_expr = Expr::new(
            ExprKind::Class {
                class: Box::new(class),
            },
            span,
        );
        let assignment = Expr::assign(Pattern::ident(name.clone()), class_expr);
        self.ctx.mark(assignment.id, Marker::Generated);
        let assign_stmt = Stmt::expr(assignment);
        self.ctx.mark(assign_stmt.id, Marker::Generated);
        let completion = Stmt::expr(self.completion_assignment(Expr::ident(name)));
        self.ctx.mark(completion.id, Marker::Generated);
        vec![assign_stmt, completion]
    }

    fn completion_assignment(&mut self, value: Expr) -> Expr {
        let assignment = Expr::assign(Pattern::ident(self.completion.clone()), value);
        self.ctx.mark(assignment.id, Marker::Generated);
        assignment
    }
}

//! Mutable visitor over the syntax tree
//!
//! Implementors override the `visit_*` hooks they care about and call the
//! matching `walk_*` function to continue into children. Expressions are
//! visited together with an [`ExprCtx`] describing the syntactic slot they
//! occupy, so passes can make position-dependent decisions without parent
//! pointers.

use super::{
    CatchClause, Class, Expr, ExprKind, ForHead, ForInit, Function, FunctionBody, MemberProp,
    Pattern, PatternKind, Program, Prop, PropKey, Stmt, StmtKind, SwitchCase, TemplateLit,
    UnaryOp, VarDecl,
};

/// Syntactic position of an expression relative to its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprCtx {
    /// Any position without special meaning
    Value,
    /// Callee of a call expression
    Callee,
    /// Callee of a `new` expression
    NewCallee,
    /// Object of a member expression
    MemberObject,
    /// Tag of a tagged template
    Tag,
    /// Operand of a unary operator
    Unary(UnaryOp),
    AwaitOperand,
    UpdateOperand,
    /// Member expression used as an assignment target
    AssignTarget,
    /// Argument of a `return` statement
    Return,
    /// Right-hand side of `for (... of X)`
    ForOfIterable,
    /// Operand of `yield*`
    YieldDelegate,
}

pub trait VisitMut {
    fn visit_program(&mut self, program: &mut Program) {
        walk_program(self, program);
    }

    fn visit_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        walk_stmts(self, stmts);
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &mut Expr, _ctx: ExprCtx) {
        walk_expr(self, expr);
    }

    fn visit_pattern(&mut self, pattern: &mut Pattern) {
        walk_pattern(self, pattern);
    }

    fn visit_var_decl(&mut self, decl: &mut VarDecl) {
        walk_var_decl(self, decl);
    }

    fn visit_function(&mut self, function: &mut Function) {
        walk_function(self, function);
    }

    fn visit_class(&mut self, class: &mut Class) {
        walk_class(self, class);
    }

    fn visit_catch_clause(&mut self, clause: &mut CatchClause) {
        walk_catch_clause(self, clause);
    }

    fn visit_prop_key(&mut self, key: &mut PropKey) {
        walk_prop_key(self, key);
    }
}

pub fn walk_program<V: VisitMut + ?Sized>(v: &mut V, program: &mut Program) {
    v.visit_stmts(&mut program.body);
}

pub fn walk_stmts<V: VisitMut + ?Sized>(v: &mut V, stmts: &mut Vec<Stmt>) {
    for stmt in stmts.iter_mut() {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: VisitMut + ?Sized>(v: &mut V, stmt: &mut Stmt) {
    match &mut stmt.kind {
        StmtKind::Directive { .. }
        | StmtKind::Empty
        | StmtKind::Debugger
        | StmtKind::Break { .. }
        | StmtKind::Continue { .. } => {}
        StmtKind::Expr { expr } => v.visit_expr(expr, ExprCtx::Value),
        StmtKind::Var { decl } => v.visit_var_decl(decl),
        StmtKind::Function { function } => v.visit_function(function),
        StmtKind::Class { class } => v.visit_class(class),
        StmtKind::Block { body } => v.visit_stmts(body),
        StmtKind::If {
            test,
            consequent,
            alternate,
        } => {
            v.visit_expr(test, ExprCtx::Value);
            v.visit_stmt(consequent);
            if let Some(alternate) = alternate {
                v.visit_stmt(alternate);
            }
        }
        StmtKind::For {
            init,
            test,
            update,
            body,
        } => {
            match init {
                Some(ForInit::Var { decl }) => v.visit_var_decl(decl),
                Some(ForInit::Expr { expr }) => v.visit_expr(expr, ExprCtx::Value),
                None => {}
            }
            if let Some(test) = test {
                v.visit_expr(test, ExprCtx::Value);
            }
            if let Some(update) = update {
                v.visit_expr(update, ExprCtx::Value);
            }
            v.visit_stmt(body);
        }
        StmtKind::ForIn { left, right, body } => {
            walk_for_head(v, left);
            v.visit_expr(right, ExprCtx::Value);
            v.visit_stmt(body);
        }
        StmtKind::ForOf {
            left, right, body, ..
        } => {
            walk_for_head(v, left);
            v.visit_expr(right, ExprCtx::ForOfIterable);
            v.visit_stmt(body);
        }
        StmtKind::While { test, body } => {
            v.visit_expr(test, ExprCtx::Value);
            v.visit_stmt(body);
        }
        StmtKind::DoWhile { body, test } => {
            v.visit_stmt(body);
            v.visit_expr(test, ExprCtx::Value);
        }
        StmtKind::Return { value } => {
            if let Some(value) = value {
                v.visit_expr(value, ExprCtx::Return);
            }
        }
        StmtKind::Throw { value } => v.visit_expr(value, ExprCtx::Value),
        StmtKind::Try {
            block,
            handler,
            finalizer,
        } => {
            v.visit_stmts(block);
            if let Some(handler) = handler {
                v.visit_catch_clause(handler);
            }
            if let Some(finalizer) = finalizer {
                v.visit_stmts(finalizer);
            }
        }
        StmtKind::Switch {
            discriminant,
            cases,
        } => {
            v.visit_expr(discriminant, ExprCtx::Value);
            for SwitchCase { test, body, .. } in cases.iter_mut() {
                if let Some(test) = test {
                    v.visit_expr(test, ExprCtx::Value);
                }
                v.visit_stmts(body);
            }
        }
        StmtKind::Labeled { body, .. } => v.visit_stmt(body),
    }
}

pub fn walk_for_head<V: VisitMut + ?Sized>(v: &mut V, head: &mut ForHead) {
    match head {
        ForHead::Var { decl } => v.visit_var_decl(decl),
        ForHead::Pattern { pattern } => v.visit_pattern(pattern),
    }
}

pub fn walk_var_decl<V: VisitMut + ?Sized>(v: &mut V, decl: &mut VarDecl) {
    for declarator in decl.declarations.iter_mut() {
        v.visit_pattern(&mut declarator.target);
        if let Some(init) = &mut declarator.init {
            v.visit_expr(init, ExprCtx::Value);
        }
    }
}

pub fn walk_catch_clause<V: VisitMut + ?Sized>(v: &mut V, clause: &mut CatchClause) {
    if let Some(param) = &mut clause.param {
        v.visit_pattern(param);
    }
    v.visit_stmts(&mut clause.body);
}

pub fn walk_function<V: VisitMut + ?Sized>(v: &mut V, function: &mut Function) {
    walk_function_params(v, function);
    walk_function_body(v, function);
}

pub fn walk_function_params<V: VisitMut + ?Sized>(v: &mut V, function: &mut Function) {
    for param in function.params.iter_mut() {
        v.visit_pattern(param);
    }
    if let Some(rest) = &mut function.rest {
        v.visit_pattern(rest);
    }
}

pub fn walk_function_body<V: VisitMut + ?Sized>(v: &mut V, function: &mut Function) {
    match &mut function.body {
        FunctionBody::Block { body } => v.visit_stmts(body),
        FunctionBody::Expr { expr } => v.visit_expr(expr, ExprCtx::Value),
    }
}

pub fn walk_class<V: VisitMut + ?Sized>(v: &mut V, class: &mut Class) {
    if let Some(super_class) = &mut class.super_class {
        v.visit_expr(super_class, ExprCtx::Value);
    }
    for member in class.members.iter_mut() {
        v.visit_prop_key(&mut member.key);
        v.visit_function(&mut member.function);
    }
}

pub fn walk_prop_key<V: VisitMut + ?Sized>(v: &mut V, key: &mut PropKey) {
    if let PropKey::Computed { expr } = key {
        v.visit_expr(expr, ExprCtx::Value);
    }
}

pub fn walk_pattern<V: VisitMut + ?Sized>(v: &mut V, pattern: &mut Pattern) {
    match &mut pattern.kind {
        PatternKind::Ident { .. } => {}
        PatternKind::Expr { expr } => v.visit_expr(expr, ExprCtx::AssignTarget),
        PatternKind::Object { props, rest } => {
            for prop in props.iter_mut() {
                v.visit_prop_key(&mut prop.key);
                v.visit_pattern(&mut prop.value);
            }
            if let Some(rest) = rest {
                v.visit_pattern(rest);
            }
        }
        PatternKind::Array { elements, rest } => {
            for element in elements.iter_mut().flatten() {
                v.visit_pattern(element);
            }
            if let Some(rest) = rest {
                v.visit_pattern(rest);
            }
        }
        PatternKind::Default { target, default } => {
            v.visit_pattern(target);
            v.visit_expr(default, ExprCtx::Value);
        }
    }
}

fn walk_template<V: VisitMut + ?Sized>(v: &mut V, tpl: &mut TemplateLit) {
    for expr in tpl.exprs.iter_mut() {
        v.visit_expr(expr, ExprCtx::Value);
    }
}

pub fn walk_expr<V: VisitMut + ?Sized>(v: &mut V, expr: &mut Expr) {
    match &mut expr.kind {
        ExprKind::Ident { .. }
        | ExprKind::This
        | ExprKind::Super
        | ExprKind::Null
        | ExprKind::Bool { .. }
        | ExprKind::Num { .. }
        | ExprKind::BigInt { .. }
        | ExprKind::Str { .. }
        | ExprKind::Regex { .. } => {}
        ExprKind::Template { tpl } => walk_template(v, tpl),
        ExprKind::TaggedTemplate { tag, tpl } => {
            v.visit_expr(tag, ExprCtx::Tag);
            walk_template(v, tpl);
        }
        ExprKind::Array { elements } => {
            for element in elements.iter_mut().flatten() {
                v.visit_expr(&mut element.expr, ExprCtx::Value);
            }
        }
        ExprKind::Object { props } => {
            for prop in props.iter_mut() {
                match prop {
                    Prop::KeyValue { key, value, .. } => {
                        v.visit_prop_key(key);
                        v.visit_expr(value, ExprCtx::Value);
                    }
                    Prop::Method { key, function } => {
                        v.visit_prop_key(key);
                        v.visit_function(function);
                    }
                    Prop::Spread { expr } => v.visit_expr(expr, ExprCtx::Value),
                }
            }
        }
        ExprKind::Function { function } => v.visit_function(function),
        ExprKind::Class { class } => v.visit_class(class),
        ExprKind::Unary { op, arg } => v.visit_expr(arg, ExprCtx::Unary(*op)),
        ExprKind::Update { arg, .. } => v.visit_expr(arg, ExprCtx::UpdateOperand),
        ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
            v.visit_expr(left, ExprCtx::Value);
            v.visit_expr(right, ExprCtx::Value);
        }
        ExprKind::Assign { target, value, .. } => {
            v.visit_pattern(target);
            v.visit_expr(value, ExprCtx::Value);
        }
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            v.visit_expr(test, ExprCtx::Value);
            v.visit_expr(consequent, ExprCtx::Value);
            v.visit_expr(alternate, ExprCtx::Value);
        }
        ExprKind::Call { callee, args, .. } => {
            v.visit_expr(callee, ExprCtx::Callee);
            for arg in args.iter_mut() {
                v.visit_expr(&mut arg.expr, ExprCtx::Value);
            }
        }
        ExprKind::New { callee, args } => {
            v.visit_expr(callee, ExprCtx::NewCallee);
            for arg in args.iter_mut() {
                v.visit_expr(&mut arg.expr, ExprCtx::Value);
            }
        }
        ExprKind::Member {
            object, property, ..
        } => {
            v.visit_expr(object, ExprCtx::MemberObject);
            if let MemberProp::Computed { expr } = property {
                v.visit_expr(expr, ExprCtx::Value);
            }
        }
        ExprKind::Sequence { exprs } => {
            for expr in exprs.iter_mut() {
                v.visit_expr(expr, ExprCtx::Value);
            }
        }
        ExprKind::Await { arg } => v.visit_expr(arg, ExprCtx::AwaitOperand),
        ExprKind::Yield { arg, delegate } => {
            if let Some(arg) = arg {
                let ctx = if *delegate {
                    ExprCtx::YieldDelegate
                } else {
                    ExprCtx::Value
                };
                v.visit_expr(arg, ctx);
            }
        }
        ExprKind::Import { arg } => v.visit_expr(arg, ExprCtx::Value),
    }
}

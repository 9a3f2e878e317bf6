//! Code templates
//!
//! A template is script text whose UPPERCASE identifiers are placeholders.
//! The text is parsed once per pipeline by the crate's own parser; each
//! instantiation clones the cached tree, gives every template node a fresh
//! identity and an empty span, marks it [`Marker::Generated`], and splices in
//! the replacements. Replacement nodes keep their identity and markers.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::ast::visit::{self, ExprCtx, VisitMut};
use crate::ast::{
    CatchClause, Class, Expr, ExprKind, Function, NodeId, Pattern, PatternKind, Span, Stmt,
    StmtKind, VarDecl,
};
use crate::error::RewriteError;
use crate::parser::{parse_expression, parse_program, ParseError};

use super::context::{Marker, ParsedTemplate, PipelineContext};

/// Value substituted for a placeholder
#[derive(Debug)]
pub enum Replacement {
    /// Rename the placeholder identifier
    Ident(String),
    /// Replace every occurrence with a string literal
    Str(String),
    /// Replace a placeholder expression
    Expr(Expr),
    /// Replace a placeholder expression statement with a statement list
    Stmts(Vec<Stmt>),
    /// Replace a placeholder binding
    Pattern(Pattern),
}

#[derive(Debug, Clone)]
pub struct Template {
    name: &'static str,
    text: Cow<'static, str>,
    sealed: bool,
}

impl Template {
    pub const fn new(name: &'static str, text: &'static str) -> Self {
        Self {
            name,
            text: Cow::Borrowed(text),
            sealed: false,
        }
    }

    /// Template built from text computed at runtime
    pub fn owned(name: &'static str, text: String) -> Self {
        Self {
            name,
            text: Cow::Owned(text),
            sealed: false,
        }
    }

    /// Functions in a sealed template are also marked [`Marker::Rewritten`]
    pub const fn sealed(mut self) -> Self {
        self.sealed = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Instantiate as a statement list
    pub fn stmts(
        &self,
        ctx: &mut PipelineContext<'_>,
        replacements: Vec<(&'static str, Replacement)>,
    ) -> Result<Vec<Stmt>, RewriteError> {
        let mut stmts = match self.parsed(ctx, false)? {
            ParsedTemplate::Stmts(stmts) => stmts,
            ParsedTemplate::Expr(expr) => vec![Stmt::expr(expr)],
        };
        let mut inst = Instantiate::new(ctx, replacements, self.sealed);
        inst.visit_stmts(&mut stmts);
        inst.finish(self.name)?;
        Ok(stmts)
    }

    /// Instantiate a template holding exactly one statement
    pub fn stmt(
        &self,
        ctx: &mut PipelineContext<'_>,
        replacements: Vec<(&'static str, Replacement)>,
    ) -> Result<Stmt, RewriteError> {
        let mut stmts = self.stmts(ctx, replacements)?;
        if stmts.len() != 1 {
            return Err(self.error(format!(
                "expected one statement, found {}",
                stmts.len()
            )));
        }
        Ok(stmts.remove(0))
    }

    /// Instantiate as a single expression
    pub fn expr(
        &self,
        ctx: &mut PipelineContext<'_>,
        replacements: Vec<(&'static str, Replacement)>,
    ) -> Result<Expr, RewriteError> {
        let mut expr = match self.parsed(ctx, true)? {
            ParsedTemplate::Expr(expr) => expr,
            ParsedTemplate::Stmts(_) => {
                return Err(self.error("expected an expression template".to_string()))
            }
        };
        let mut inst = Instantiate::new(ctx, replacements, self.sealed);
        inst.visit_expr(&mut expr, ExprCtx::Value);
        inst.finish(self.name)?;
        Ok(expr)
    }

    fn parsed(
        &self,
        ctx: &mut PipelineContext<'_>,
        as_expr: bool,
    ) -> Result<ParsedTemplate, RewriteError> {
        let key = format!("{}:{}", if as_expr { 'e' } else { 's' }, self.text);
        if let Some(parsed) = ctx.templates.get(&key) {
            return Ok(parsed.clone());
        }
        let parsed = if as_expr {
            parse_expression(&self.text).map(ParsedTemplate::Expr)
        } else {
            parse_program(&self.text).map(|program| ParsedTemplate::Stmts(program.body))
        }
        .map_err(|source| RewriteError::Template {
            name: self.name.to_string(),
            source,
        })?;
        ctx.templates.insert(key, parsed.clone());
        Ok(parsed)
    }

    fn error(&self, message: String) -> RewriteError {
        RewriteError::Template {
            name: self.name.to_string(),
            source: ParseError::BuildError(message, None),
        }
    }
}

/// Walks a cloned template tree, refreshing identities and substituting
struct Instantiate<'c, 'a> {
    ctx: &'c mut PipelineContext<'a>,
    replacements: HashMap<&'static str, Option<Replacement>>,
    sealed: bool,
    reused: Vec<String>,
}

impl<'c, 'a> Instantiate<'c, 'a> {
    fn new(
        ctx: &'c mut PipelineContext<'a>,
        replacements: Vec<(&'static str, Replacement)>,
        sealed: bool,
    ) -> Self {
        Self {
            ctx,
            replacements: replacements
                .into_iter()
                .map(|(name, r)| (name, Some(r)))
                .collect(),
            sealed,
            reused: Vec::new(),
        }
    }

    fn finish(self, name: &str) -> Result<(), RewriteError> {
        match self.reused.first() {
            None => Ok(()),
            Some(placeholder) => Err(RewriteError::Template {
                name: name.to_string(),
                source: ParseError::BuildError(
                    format!("placeholder {} substituted more than once", placeholder),
                    None,
                ),
            }),
        }
    }

    fn refresh(&mut self, id: &mut NodeId, span: &mut Span) {
        *id = NodeId::fresh();
        *span = Span::default();
        self.ctx.mark(*id, Marker::Generated);
    }

    fn rename(&self, name: &mut String) {
        if let Some(Some(Replacement::Ident(new_name))) = self.replacements.get(name.as_str()) {
            *name = new_name.clone();
        }
    }

    /// Take a node-valued replacement; identifiers and strings stay available
    fn take(&mut self, name: &str) -> Option<Replacement> {
        let slot = self.replacements.get_mut(name)?;
        match slot {
            Some(Replacement::Ident(_)) => return None,
            Some(Replacement::Str(value)) => return Some(Replacement::Str(value.clone())),
            _ => {}
        }
        if slot.is_none() {
            self.reused.push(name.to_string());
            return None;
        }
        slot.take()
    }

    fn placeholder_stmts(&mut self, stmt: &Stmt) -> Option<Vec<Stmt>> {
        let StmtKind::Expr { expr } = &stmt.kind else {
            return None;
        };
        let name = expr.as_ident()?;
        if !matches!(
            self.replacements.get(name),
            Some(Some(Replacement::Stmts(_))) | Some(None)
        ) {
            return None;
        }
        match self.take(name) {
            Some(Replacement::Stmts(stmts)) => Some(stmts),
            _ => Some(Vec::new()),
        }
    }
}

impl VisitMut for Instantiate<'_, '_> {
    fn visit_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        let mut out = Vec::with_capacity(stmts.len());
        for mut stmt in stmts.drain(..) {
            match self.placeholder_stmts(&stmt) {
                Some(replacement) => out.extend(replacement),
                None => {
                    self.visit_stmt(&mut stmt);
                    out.push(stmt);
                }
            }
        }
        *stmts = out;
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        self.refresh(&mut stmt.id, &mut stmt.span);
        if let StmtKind::Labeled { label, .. } = &mut stmt.kind {
            self.rename(label);
        }
        visit::walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &mut Expr, _ctx: ExprCtx) {
        if let ExprKind::Ident { name } = &expr.kind {
            let name = name.clone();
            match self.take(&name) {
                Some(Replacement::Expr(replacement)) => {
                    *expr = replacement;
                    return;
                }
                Some(Replacement::Str(value)) => {
                    *expr = Expr::string(value);
                    self.ctx.mark(expr.id, Marker::Generated);
                    return;
                }
                _ => {}
            }
        }
        self.refresh(&mut expr.id, &mut expr.span);
        if let ExprKind::Ident { name } = &mut expr.kind {
            self.rename(name);
        }
        visit::walk_expr(self, expr);
    }

    fn visit_pattern(&mut self, pattern: &mut Pattern) {
        if let PatternKind::Ident { name } = &pattern.kind {
            let name = name.clone();
            if let Some(Replacement::Pattern(replacement)) = self.take(&name) {
                *pattern = replacement;
                return;
            }
        }
        self.refresh(&mut pattern.id, &mut pattern.span);
        if let PatternKind::Ident { name } = &mut pattern.kind {
            self.rename(name);
        }
        visit::walk_pattern(self, pattern);
    }

    fn visit_var_decl(&mut self, decl: &mut VarDecl) {
        for declarator in decl.declarations.iter_mut() {
            declarator.span = Span::default();
        }
        visit::walk_var_decl(self, decl);
    }

    fn visit_function(&mut self, function: &mut Function) {
        self.refresh(&mut function.id, &mut function.span);
        if self.sealed {
            self.ctx.mark(function.id, Marker::Rewritten);
        }
        if let Some(name) = &mut function.name {
            self.rename(name);
        }
        visit::walk_function(self, function);
    }

    fn visit_class(&mut self, class: &mut Class) {
        self.refresh(&mut class.id, &mut class.span);
        if let Some(name) = &mut class.name {
            self.rename(name);
        }
        visit::walk_class(self, class);
    }

    fn visit_catch_clause(&mut self, clause: &mut CatchClause) {
        self.refresh(&mut clause.id, &mut clause.span);
        visit::walk_catch_clause(self, clause);
    }
}

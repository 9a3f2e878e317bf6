//! Exception firewall stage
//!
//! Rewrites every `try` so errors tagged with the uncatchable symbol skip the
//! user's `catch` and `finally` bodies. Ordinary errors behave as before.

use crate::ast::visit::{self, VisitMut};
use crate::ast::{CatchClause, Expr, Program, Stmt, StmtKind, VarKind};
use crate::error::RewriteError;

use super::context::{Marker, PipelineContext};
use super::runtime::UNCATCHABLE_TAG;
use super::template::{Replacement, Template};

const GUARDED_CATCH: Template = Template::new(
    "guarded catch",
    r#"
try {
  BLOCK
} catch (PARAM) {
  if (!PARAM || !PARAM[Symbol.for(KEY)]) {
    HANDLER
  } else throw PARAM;
}
"#,
);

const GUARDED_FINALLY: Template = Template::new(
    "guarded finally",
    r#"
{
  let CATCHABLE = true;
  try {
    BLOCK
  } catch (PARAM) {
    CATCHABLE = !PARAM || !PARAM[Symbol.for(KEY)];
    if (CATCHABLE) try {
      HANDLER
    } catch (INNER) {
      CATCHABLE = !INNER || !INNER[Symbol.for(KEY)];
      throw INNER;
    } else throw PARAM;
  } finally {
    if (CATCHABLE) {
      FINALIZER
    }
  }
}
"#,
);

pub fn apply(program: &mut Program, ctx: &mut PipelineContext<'_>) -> Result<(), RewriteError> {
    let mut firewall = Firewall {
        ctx,
        rewritten: 0,
        error: None,
    };
    firewall.visit_program(program);
    if let Some(err) = firewall.error {
        return Err(err);
    }
    tracing::debug!(rewritten = firewall.rewritten, "try statements guarded");
    Ok(())
}

struct Firewall<'c, 'a> {
    ctx: &'c mut PipelineContext<'a>,
    rewritten: usize,
    error: Option<RewriteError>,
}

impl Firewall<'_, '_> {
    fn rewrite(&mut self, stmt: &mut Stmt) -> Result<(), RewriteError> {
        let StmtKind::Try {
            block,
            handler,
            finalizer,
        } = std::mem::replace(&mut stmt.kind, StmtKind::Empty)
        else {
            return Ok(());
        };

        let (param, handler_body) = self.normalize_handler(handler);
        let key = self.ctx.config.symbol_key(UNCATCHABLE_TAG);

        let replacement = match finalizer {
            None => GUARDED_CATCH.stmt(
                self.ctx,
                vec![
                    ("BLOCK", Replacement::Stmts(block)),
                    ("PARAM", Replacement::Ident(param)),
                    ("KEY", Replacement::Str(key)),
                    ("HANDLER", Replacement::Stmts(handler_body)),
                ],
            )?,
            Some(finalizer) => {
                let catchable = self.ctx.fresh_name("isCatchable");
                let inner = self.ctx.fresh_name("innerExc");
                GUARDED_FINALLY.stmt(
                    self.ctx,
                    vec![
                        ("BLOCK", Replacement::Stmts(block)),
                        ("PARAM", Replacement::Ident(param)),
                        ("KEY", Replacement::Str(key)),
                        ("HANDLER", Replacement::Stmts(handler_body)),
                        ("CATCHABLE", Replacement::Ident(catchable)),
                        ("INNER", Replacement::Ident(inner)),
                        ("FINALIZER", Replacement::Stmts(finalizer)),
                    ],
                )?
            }
        };
        *stmt = replacement;
        self.rewritten += 1;
        Ok(())
    }

    /// Catch parameter name and handler body
    ///
    /// A missing parameter gets a fresh name, a destructuring parameter is
    /// bound from one, and a missing handler rethrows.
    fn normalize_handler(&mut self, handler: Option<CatchClause>) -> (String, Vec<Stmt>) {
        let Some(CatchClause { param, body, .. }) = handler else {
            let param = self.ctx.fresh_name("err");
            let rethrow = Stmt::synth(StmtKind::Throw {
                value: Expr::ident(param.clone()),
            });
            self.ctx.mark(rethrow.id, Marker::Generated);
            return (param, vec![rethrow]);
        };
        match param {
            Some(pattern) => match pattern.as_ident() {
                Some(name) => (name.to_string(), body),
                None => {
                    let param = self.ctx.fresh_name("err");
                    let binding = Stmt::var(
                        VarKind::Let,
                        pattern,
                        Some(Expr::ident(param.clone())),
                    );
                    self.ctx.mark(binding.id, Marker::Generated);
                    let block = Stmt::block(body);
                    (param, vec![binding, block])
                }
            },
            None => (self.ctx.fresh_name("err"), body),
        }
    }
}

impl VisitMut for Firewall<'_, '_> {
    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        visit::walk_stmt(self, stmt);
        if self.error.is_some()
            || !matches!(stmt.kind, StmtKind::Try { .. })
            || self.ctx.is_marked(stmt.id, Marker::Generated)
        {
            return;
        }
        if let Err(err) = self.rewrite(stmt) {
            self.error = Some(err);
        }
    }
}

//! Rule: Unreachable Code
//!
//! Warns about statements that follow `return`, `throw`, `break` or
//! `continue` in the same statement list. Function declarations are hoisted
//! and are not reported.
//!
//! # Invalid
//!
//! ```js
//! function f() {
//!   return 1
//!   cleanup()   // never runs
//! }
//! ```

use crate::ast::{Program, StmtKind};

use super::super::{bodies, for_each_stmt_list, ValidationError, ValidationRule};

pub struct UnreachableCodeRule;

impl ValidationRule for UnreachableCodeRule {
    fn id(&self) -> &'static str {
        "unreachable-code"
    }

    fn description(&self) -> &'static str {
        "statements after return, throw, break or continue never run"
    }

    fn validate(&self, program: &Program, _source: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for body in bodies(program) {
            for_each_stmt_list(body, &mut |stmts| {
                let Some(exit) = stmts.iter().position(|s| {
                    matches!(
                        s.kind,
                        StmtKind::Return { .. }
                            | StmtKind::Throw { .. }
                            | StmtKind::Break { .. }
                            | StmtKind::Continue { .. }
                    )
                }) else {
                    return;
                };
                // One warning per list, at the first dead statement
                let dead = stmts[exit + 1..].iter().find(|s| {
                    !matches!(s.kind, StmtKind::Function { .. } | StmtKind::Empty)
                });
                if let Some(stmt) = dead {
                    errors.push(ValidationError::warning(
                        stmt.span,
                        "Unreachable code",
                        self.id(),
                    ));
                }
            });
        }
        errors
    }
}

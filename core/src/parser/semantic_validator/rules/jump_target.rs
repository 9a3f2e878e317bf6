//! Rule: Invalid Jump
//!
//! Reports an error when `break` or `continue` has no valid target: `break`
//! outside any loop, switch or matching label, `continue` outside a loop, or
//! a label that is not in scope. Labels do not cross function boundaries.
//!
//! # Valid
//!
//! ```js
//! for (const x of xs) { if (x) break }
//! outer: for (;;) { for (;;) continue outer }
//! block: { break block }
//! ```
//!
//! # Invalid
//!
//! ```js
//! break
//! switch (x) { case 1: continue }
//! for (;;) { break missing }
//! block: { continue block }
//! ```

use crate::ast::{Program, Stmt, StmtKind};

use super::super::{bodies, ValidationError, ValidationRule};

pub struct JumpTargetRule;

impl ValidationRule for JumpTargetRule {
    fn id(&self) -> &'static str {
        "invalid-jump"
    }

    fn description(&self) -> &'static str {
        "break and continue must refer to an enclosing loop, switch or label"
    }

    fn validate(&self, program: &Program, _source: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for body in bodies(program) {
            let mut ctx = JumpContext {
                errors: &mut errors,
                rule_id: self.id(),
                loops: 0,
                switches: 0,
                labels: Vec::new(),
            };
            for stmt in body {
                ctx.check_stmt(stmt);
            }
        }
        errors
    }
}

/// Enclosing jump targets while walking one function body
struct JumpContext<'e> {
    errors: &'e mut Vec<ValidationError>,
    rule_id: &'static str,
    loops: usize,
    switches: usize,
    /// Labels in scope, with whether each labels a loop
    labels: Vec<(String, bool)>,
}

impl JumpContext<'_> {
    fn check_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.check_stmt(stmt);
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Break { label: None } => {
                if self.loops == 0 && self.switches == 0 {
                    self.report(stmt, "Illegal break statement".to_string());
                }
            }
            StmtKind::Continue { label: None } => {
                if self.loops == 0 {
                    self.report(
                        stmt,
                        "Illegal continue statement: no surrounding iteration statement"
                            .to_string(),
                    );
                }
            }
            StmtKind::Break { label: Some(label) } => {
                if !self.labels.iter().any(|(name, _)| name == label) {
                    self.report(stmt, format!("Undefined label '{}'", label));
                }
            }
            StmtKind::Continue { label: Some(label) } => {
                match self.labels.iter().rev().find(|(name, _)| name == label) {
                    Some((_, true)) => {}
                    Some((_, false)) => self.report(
                        stmt,
                        format!(
                            "Illegal continue statement: '{}' does not denote an iteration statement",
                            label
                        ),
                    ),
                    None => self.report(stmt, format!("Undefined label '{}'", label)),
                }
            }
            StmtKind::Labeled { label, body } => {
                self.labels.push((label.clone(), labels_loop(body)));
                self.check_stmt(body);
                self.labels.pop();
            }
            StmtKind::For { body, .. }
            | StmtKind::ForIn { body, .. }
            | StmtKind::ForOf { body, .. }
            | StmtKind::While { body, .. }
            | StmtKind::DoWhile { body, .. } => {
                self.loops += 1;
                self.check_stmt(body);
                self.loops -= 1;
            }
            StmtKind::Switch { cases, .. } => {
                self.switches += 1;
                for case in cases {
                    self.check_stmts(&case.body);
                }
                self.switches -= 1;
            }
            StmtKind::Block { body } => self.check_stmts(body),
            StmtKind::If {
                consequent,
                alternate,
                ..
            } => {
                self.check_stmt(consequent);
                if let Some(alternate) = alternate {
                    self.check_stmt(alternate);
                }
            }
            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => {
                self.check_stmts(block);
                if let Some(handler) = handler {
                    self.check_stmts(&handler.body);
                }
                if let Some(finalizer) = finalizer {
                    self.check_stmts(finalizer);
                }
            }
            _ => {}
        }
    }

    fn report(&mut self, stmt: &Stmt, message: String) {
        self.errors
            .push(ValidationError::error(stmt.span, message, self.rule_id));
    }
}

/// Whether a label applies to a loop, looking through nested labels
fn labels_loop(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Labeled { body, .. } => labels_loop(body),
        StmtKind::For { .. }
        | StmtKind::ForIn { .. }
        | StmtKind::ForOf { .. }
        | StmtKind::While { .. }
        | StmtKind::DoWhile { .. } => true,
        _ => false,
    }
}

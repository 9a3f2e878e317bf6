//! Rule: Duplicate Declaration
//!
//! Reports an error when a `let`, `const` or `class` binding is declared
//! twice in the same statement list, or collides with a `var` or function
//! declaration of that list. The cases of a `switch` share one scope.
//!
//! # Valid
//!
//! ```js
//! let a = 1
//! { let a = 2 }
//! var b; var b
//! ```
//!
//! # Invalid
//!
//! ```js
//! let a = 1; let a = 2
//! const f = 1; function f() {}
//! switch (x) { case 1: let y; break; case 2: let y }
//! ```

use std::collections::HashMap;

use crate::ast::{Program, Stmt, StmtKind};

use super::super::{bodies, for_each_stmt_list, ValidationError, ValidationRule};

/// Rule that checks for conflicting declarations in one scope.
pub struct DuplicateDeclarationRule;

impl ValidationRule for DuplicateDeclarationRule {
    fn id(&self) -> &'static str {
        "duplicate-declaration"
    }

    fn description(&self) -> &'static str {
        "let, const and class names must be unique within their scope"
    }

    fn validate(&self, program: &Program, _source: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for body in bodies(program) {
            for_each_stmt_list(body, &mut |stmts| {
                check_scope(stmts.iter().map(|s| (0, s)), false, &mut errors, self.id());
                for stmt in stmts {
                    if let StmtKind::Switch { cases, .. } = &stmt.kind {
                        let items = cases
                            .iter()
                            .enumerate()
                            .flat_map(|(idx, case)| case.body.iter().map(move |s| (idx, s)));
                        check_scope(items, true, &mut errors, self.id());
                    }
                }
            });
        }
        errors
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Binding {
    Lexical,
    VarLike,
}

/// Check one scope. With `across_groups_only`, a conflict is reported only
/// between statements of different groups (switch cases).
fn check_scope<'a>(
    items: impl Iterator<Item = (usize, &'a Stmt)>,
    across_groups_only: bool,
    errors: &mut Vec<ValidationError>,
    rule_id: &'static str,
) {
    let mut seen: HashMap<String, (Binding, usize)> = HashMap::new();

    for (group, stmt) in items {
        for (name, binding) in declared_names(stmt) {
            if let Some((previous, previous_group)) = seen.get(&name).copied() {
                let conflict = binding == Binding::Lexical || previous == Binding::Lexical;
                let report = !across_groups_only || previous_group != group;
                if conflict && report {
                    errors.push(ValidationError::error(
                        stmt.span,
                        format!("Identifier '{}' has already been declared", name),
                        rule_id,
                    ));
                }
                continue;
            }
            seen.insert(name, (binding, group));
        }
    }
}

fn declared_names(stmt: &Stmt) -> Vec<(String, Binding)> {
    match &stmt.kind {
        StmtKind::Var { decl } => {
            let binding = if decl.kind.is_lexical() {
                Binding::Lexical
            } else {
                Binding::VarLike
            };
            decl.bound_names()
                .into_iter()
                .map(|name| (name, binding))
                .collect()
        }
        StmtKind::Function { function } => function
            .name
            .iter()
            .map(|name| (name.clone(), Binding::VarLike))
            .collect(),
        StmtKind::Class { class } => class
            .name
            .iter()
            .map(|name| (name.clone(), Binding::Lexical))
            .collect(),
        _ => Vec::new(),
    }
}

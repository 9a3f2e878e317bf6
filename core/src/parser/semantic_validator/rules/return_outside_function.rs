//! Rule: Return Outside Function
//!
//! Reports an error for `return` statements at the top level of the input.
//!
//! # Valid
//!
//! ```js
//! function f() { return 1 }
//! const g = () => { if (x) return 2 }
//! ```
//!
//! # Invalid
//!
//! ```js
//! return 1
//! if (done) { return }
//! ```

use crate::ast::{Program, StmtKind};

use super::super::{walk_stmts, ValidationError, ValidationRule};

pub struct ReturnOutsideFunctionRule;

impl ValidationRule for ReturnOutsideFunctionRule {
    fn id(&self) -> &'static str {
        "return-outside-function"
    }

    fn description(&self) -> &'static str {
        "return is only allowed inside a function body"
    }

    fn validate(&self, program: &Program, _source: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        walk_stmts(&program.body, &mut |stmt| {
            if matches!(stmt.kind, StmtKind::Return { .. }) {
                errors.push(ValidationError::error(
                    stmt.span,
                    "Illegal return statement outside of a function",
                    self.id(),
                ));
            }
        });
        errors
    }
}

//! Validation Rules
//!
//! Each file in this module contains one validation rule:
//!
//! - `duplicate_declaration.rs` - Lexical names declared twice in one scope
//! - `return_outside_function.rs` - `return` at the top level
//! - `jump_target.rs` - `break`/`continue` without a valid target
//! - `unreachable_code.rs` - Code that can never execute

mod duplicate_declaration;
mod jump_target;
mod return_outside_function;
mod unreachable_code;

pub use duplicate_declaration::DuplicateDeclarationRule;
pub use jump_target::JumpTargetRule;
pub use return_outside_function::ReturnOutsideFunctionRule;
pub use unreachable_code::UnreachableCodeRule;

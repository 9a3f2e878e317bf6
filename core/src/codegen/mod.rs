//! Code generation: print a syntax tree back to script source
//!
//! Output uses two-space indentation and inserts parentheses from operator
//! precedence only, so reparsing the output yields an equivalent tree.

use crate::ast::{
    BinaryOp, Class, ClassMember, Expr, ExprKind, ExprOrSpread, ForHead, ForInit, Function,
    FunctionBody, FunctionKind, LogicalOp, MemberProp, Pattern, PatternKind, Program, Prop,
    PropKey, Stmt, StmtKind, TemplateLit, UnaryOp, VarDecl,
};

#[cfg(test)]
mod tests;

/* ===================== Public API ===================== */

pub fn print_program(program: &Program) -> String {
    let mut printer = Printer::default();
    printer.stmt_list(&program.body);
    printer.out
}

pub fn print_stmt(stmt: &Stmt) -> String {
    let mut printer = Printer::default();
    printer.stmt(stmt);
    printer.out
}

pub fn print_expr(expr: &Expr) -> String {
    let mut printer = Printer::default();
    printer.expr(expr, prec::SEQUENCE);
    printer.out
}

/// Quote a string as a double-quoted literal
///
/// U+FEFF is always escaped so generated source echoes stay visible.
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            '\u{feff}' => out.push_str("\\ufeff"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/* ===================== Precedence ===================== */

mod prec {
    pub const SEQUENCE: u8 = 1;
    pub const ASSIGN: u8 = 2;
    pub const CONDITIONAL: u8 = 3;
    pub const LOGICAL_OR: u8 = 4;
    pub const LOGICAL_AND: u8 = 5;
    pub const EXPONENT: u8 = 14;
    pub const UNARY: u8 = 15;
    pub const POSTFIX: u8 = 16;
    pub const CALL: u8 = 17;
    pub const MEMBER: u8 = 18;
    pub const PRIMARY: u8 = 20;
}

fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::BitOr => 6,
        BinaryOp::BitXor => 7,
        BinaryOp::BitAnd => 8,
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq => 9,
        BinaryOp::Lt
        | BinaryOp::LtEq
        | BinaryOp::Gt
        | BinaryOp::GtEq
        | BinaryOp::In
        | BinaryOp::InstanceOf => 10,
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => 11,
        BinaryOp::Add | BinaryOp::Sub => 12,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 13,
        BinaryOp::Exp => prec::EXPONENT,
    }
}

fn precedence(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Sequence { .. } => prec::SEQUENCE,
        ExprKind::Assign { .. } | ExprKind::Yield { .. } => prec::ASSIGN,
        ExprKind::Function { function } if function.kind == FunctionKind::Arrow => prec::ASSIGN,
        ExprKind::Conditional { .. } => prec::CONDITIONAL,
        ExprKind::Logical { op, .. } => match op {
            LogicalOp::And => prec::LOGICAL_AND,
            LogicalOp::Or | LogicalOp::Nullish => prec::LOGICAL_OR,
        },
        ExprKind::Binary { op, .. } => binary_precedence(*op),
        ExprKind::Unary { .. } | ExprKind::Await { .. } => prec::UNARY,
        ExprKind::Update { prefix: true, .. } => prec::UNARY,
        ExprKind::Update { prefix: false, .. } => prec::POSTFIX,
        ExprKind::Call { .. } | ExprKind::Import { .. } => prec::CALL,
        ExprKind::New { .. } | ExprKind::Member { .. } | ExprKind::TaggedTemplate { .. } => {
            prec::MEMBER
        }
        _ => prec::PRIMARY,
    }
}

/// `??` may not be mixed with `&&`/`||` without parentheses
fn mixes_nullish(parent: LogicalOp, child: &Expr) -> bool {
    match &child.kind {
        ExprKind::Logical { op, .. } => {
            (parent == LogicalOp::Nullish) != (*op == LogicalOp::Nullish)
        }
        _ => false,
    }
}

/// Whether a `new` callee contains a call that would otherwise bind the arguments
fn callee_contains_call(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Call { .. } => true,
        ExprKind::Member {
            object, optional, ..
        } => *optional || callee_contains_call(object),
        ExprKind::TaggedTemplate { tag, .. } => callee_contains_call(tag),
        _ => false,
    }
}

fn starts_with_word(text: &str, word: &str) -> bool {
    text.strip_prefix(word).is_some_and(|rest| {
        !rest
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
    })
}

/// Expression text that would be misread at the start of a statement
fn ambiguous_statement_start(text: &str) -> bool {
    text.starts_with('{')
        || starts_with_word(text, "function")
        || starts_with_word(text, "class")
        || text.starts_with("let [")
        || text
            .strip_prefix("async ")
            .is_some_and(|rest| starts_with_word(rest, "function"))
}

/* ===================== Printer ===================== */

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
    /// Set while printing a `for` initializer, where a bare `in` would end the head
    no_in: bool,
}

impl Printer {
    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    /// Print a nested expression into a separate buffer
    fn render_expr(&self, expr: &Expr, min_prec: u8) -> String {
        let mut inner = Printer {
            out: String::new(),
            indent: self.indent,
            no_in: self.no_in,
        };
        inner.expr(expr, min_prec);
        inner.out
    }

    /* ----- Statements ----- */

    fn stmt_list(&mut self, stmts: &[Stmt]) {
        for (idx, stmt) in stmts.iter().enumerate() {
            if idx > 0 {
                self.newline();
            }
            self.stmt(stmt);
        }
    }

    fn block(&mut self, stmts: &[Stmt]) {
        if stmts.is_empty() {
            self.push("{}");
            return;
        }
        self.push("{");
        self.indent += 1;
        for stmt in stmts {
            self.newline();
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.newline();
        self.push("}");
    }

    /// Body of a control statement: blocks stay on the same line
    fn body(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Block { body } => {
                self.push(" ");
                self.block(body);
            }
            _ => {
                self.indent += 1;
                self.newline();
                self.stmt(stmt);
                self.indent -= 1;
            }
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Directive { raw } => {
                self.push(raw);
                self.push(";");
            }
            StmtKind::Expr { expr } => {
                let text = self.render_expr(expr, prec::SEQUENCE);
                if ambiguous_statement_start(&text) {
                    self.push("(");
                    self.push(&text);
                    self.push(");");
                } else {
                    self.push(&text);
                    self.push(";");
                }
            }
            StmtKind::Var { decl } => {
                self.var_decl(decl);
                self.push(";");
            }
            StmtKind::Function { function } => self.function(function, None, false),
            StmtKind::Class { class } => self.class(class),
            StmtKind::Block { body } => self.block(body),
            StmtKind::Empty => self.push(";"),
            StmtKind::Debugger => self.push("debugger;"),
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => self.if_stmt(test, consequent, alternate.as_deref()),
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                self.push("for (");
                self.no_in = true;
                match init {
                    Some(ForInit::Var { decl }) => self.var_decl(decl),
                    Some(ForInit::Expr { expr }) => self.expr(expr, prec::SEQUENCE),
                    None => {}
                }
                self.no_in = false;
                self.push(";");
                if let Some(test) = test {
                    self.push(" ");
                    self.expr(test, prec::SEQUENCE);
                }
                self.push(";");
                if let Some(update) = update {
                    self.push(" ");
                    self.expr(update, prec::SEQUENCE);
                }
                self.push(")");
                self.body(body);
            }
            StmtKind::ForIn { left, right, body } => {
                self.push("for (");
                self.for_head(left);
                self.push(" in ");
                self.expr(right, prec::SEQUENCE);
                self.push(")");
                self.body(body);
            }
            StmtKind::ForOf {
                left,
                right,
                body,
                is_await,
            } => {
                self.push(if *is_await { "for await (" } else { "for (" });
                self.for_head(left);
                self.push(" of ");
                self.expr(right, prec::ASSIGN);
                self.push(")");
                self.body(body);
            }
            StmtKind::While { test, body } => {
                self.push("while (");
                self.expr(test, prec::SEQUENCE);
                self.push(")");
                self.body(body);
            }
            StmtKind::DoWhile { body, test } => {
                self.push("do");
                self.body(body);
                if matches!(body.kind, StmtKind::Block { .. }) {
                    self.push(" ");
                } else {
                    self.newline();
                }
                self.push("while (");
                self.expr(test, prec::SEQUENCE);
                self.push(");");
            }
            StmtKind::Return { value } => match value {
                Some(value) => {
                    self.push("return ");
                    self.expr(value, prec::SEQUENCE);
                    self.push(";");
                }
                None => self.push("return;"),
            },
            StmtKind::Break { label } => self.jump("break", label.as_deref()),
            StmtKind::Continue { label } => self.jump("continue", label.as_deref()),
            StmtKind::Throw { value } => {
                self.push("throw ");
                self.expr(value, prec::SEQUENCE);
                self.push(";");
            }
            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => {
                self.push("try ");
                self.block(block);
                if let Some(handler) = handler {
                    self.push(" catch ");
                    if let Some(param) = &handler.param {
                        self.push("(");
                        self.pattern(param);
                        self.push(") ");
                    }
                    self.block(&handler.body);
                }
                if let Some(finalizer) = finalizer {
                    self.push(" finally ");
                    self.block(finalizer);
                }
            }
            StmtKind::Switch {
                discriminant,
                cases,
            } => {
                self.push("switch (");
                self.expr(discriminant, prec::SEQUENCE);
                self.push(") {");
                self.indent += 1;
                for case in cases {
                    self.newline();
                    match &case.test {
                        Some(test) => {
                            self.push("case ");
                            self.expr(test, prec::SEQUENCE);
                            self.push(":");
                        }
                        None => self.push("default:"),
                    }
                    self.indent += 1;
                    for stmt in &case.body {
                        self.newline();
                        self.stmt(stmt);
                    }
                    self.indent -= 1;
                }
                self.indent -= 1;
                self.newline();
                self.push("}");
            }
            StmtKind::Labeled { label, body } => {
                self.push(label);
                self.push(": ");
                self.stmt(body);
            }
        }
    }

    fn if_stmt(&mut self, test: &Expr, consequent: &Stmt, alternate: Option<&Stmt>) {
        self.push("if (");
        self.expr(test, prec::SEQUENCE);
        self.push(")");

        // An else after a braceless nested if would attach to the inner if
        let wrap = alternate.is_some() && matches!(consequent.kind, StmtKind::If { .. });
        if wrap {
            self.push(" ");
            self.block(std::slice::from_ref(consequent));
        } else {
            self.body(consequent);
        }

        let Some(alternate) = alternate else {
            return;
        };
        if wrap || matches!(consequent.kind, StmtKind::Block { .. }) {
            self.push(" else");
        } else {
            self.newline();
            self.push("else");
        }
        match &alternate.kind {
            StmtKind::If { .. } => {
                self.push(" ");
                self.stmt(alternate);
            }
            _ => self.body(alternate),
        }
    }

    fn jump(&mut self, keyword: &str, label: Option<&str>) {
        self.push(keyword);
        if let Some(label) = label {
            self.push(" ");
            self.push(label);
        }
        self.push(";");
    }

    fn var_decl(&mut self, decl: &VarDecl) {
        self.push(decl.kind.as_str());
        self.push(" ");
        for (idx, declarator) in decl.declarations.iter().enumerate() {
            if idx > 0 {
                self.push(", ");
            }
            self.pattern(&declarator.target);
            if let Some(init) = &declarator.init {
                self.push(" = ");
                self.expr(init, prec::ASSIGN);
            }
        }
    }

    fn for_head(&mut self, head: &ForHead) {
        match head {
            ForHead::Var { decl } => self.var_decl(decl),
            ForHead::Pattern { pattern } => self.pattern(pattern),
        }
    }

    /* ----- Functions & Classes ----- */

    fn function(&mut self, function: &Function, key: Option<&PropKey>, is_static: bool) {
        if is_static {
            self.push("static ");
        }
        match function.kind {
            FunctionKind::Declaration | FunctionKind::Expression => {
                if function.is_async {
                    self.push("async ");
                }
                self.push("function");
                if function.is_generator {
                    self.push("*");
                }
                if let Some(name) = &function.name {
                    self.push(" ");
                    self.push(name);
                }
                self.params(function);
                self.push(" ");
                self.function_body(&function.body);
            }
            FunctionKind::Arrow => {
                if function.is_async {
                    self.push("async ");
                }
                self.params(function);
                self.push(" => ");
                match &function.body {
                    FunctionBody::Block { body } => self.block(body),
                    FunctionBody::Expr { expr } => {
                        let text = self.render_expr(expr, prec::ASSIGN);
                        if text.starts_with('{') {
                            self.push("(");
                            self.push(&text);
                            self.push(")");
                        } else {
                            self.push(&text);
                        }
                    }
                }
            }
            FunctionKind::Method
            | FunctionKind::Getter
            | FunctionKind::Setter
            | FunctionKind::Constructor => {
                match function.kind {
                    FunctionKind::Getter => self.push("get "),
                    FunctionKind::Setter => self.push("set "),
                    _ => {
                        if function.is_async {
                            self.push("async ");
                        }
                        if function.is_generator {
                            self.push("*");
                        }
                    }
                }
                match key {
                    Some(key) => self.prop_key(key),
                    None => self.push(function.name.as_deref().unwrap_or("method")),
                }
                self.params(function);
                self.push(" ");
                self.function_body(&function.body);
            }
        }
    }

    fn params(&mut self, function: &Function) {
        self.push("(");
        for (idx, param) in function.params.iter().enumerate() {
            if idx > 0 {
                self.push(", ");
            }
            self.pattern(param);
        }
        if let Some(rest) = &function.rest {
            if !function.params.is_empty() {
                self.push(", ");
            }
            self.push("...");
            self.pattern(rest);
        }
        self.push(")");
    }

    fn function_body(&mut self, body: &FunctionBody) {
        match body {
            FunctionBody::Block { body } => self.block(body),
            FunctionBody::Expr { expr } => {
                self.push("{");
                self.indent += 1;
                self.newline();
                self.push("return ");
                self.expr(expr, prec::SEQUENCE);
                self.push(";");
                self.indent -= 1;
                self.newline();
                self.push("}");
            }
        }
    }

    fn class(&mut self, class: &Class) {
        self.push("class");
        if let Some(name) = &class.name {
            self.push(" ");
            self.push(name);
        }
        if let Some(super_class) = &class.super_class {
            self.push(" extends ");
            self.expr(super_class, prec::CALL);
        }
        if class.members.is_empty() {
            self.push(" {}");
            return;
        }
        self.push(" {");
        self.indent += 1;
        for member in &class.members {
            self.newline();
            self.class_member(member);
        }
        self.indent -= 1;
        self.newline();
        self.push("}");
    }

    fn class_member(&mut self, member: &ClassMember) {
        self.function(&member.function, Some(&member.key), member.is_static);
    }

    fn prop_key(&mut self, key: &PropKey) {
        match key {
            PropKey::Ident { name } => self.push(name),
            PropKey::Str { value, raw } => match raw {
                Some(raw) => self.push(raw),
                None => self.push(&quote_string(value)),
            },
            PropKey::Num { raw } => self.push(raw),
            PropKey::Computed { expr } => {
                self.push("[");
                self.expr(expr, prec::ASSIGN);
                self.push("]");
            }
        }
    }

    /* ----- Patterns ----- */

    fn pattern(&mut self, pattern: &Pattern) {
        match &pattern.kind {
            PatternKind::Ident { name } => self.push(name),
            PatternKind::Expr { expr } => self.expr(expr, prec::CALL),
            PatternKind::Object { props, rest } => {
                if props.is_empty() && rest.is_none() {
                    self.push("{}");
                    return;
                }
                self.push("{ ");
                for (idx, prop) in props.iter().enumerate() {
                    if idx > 0 {
                        self.push(", ");
                    }
                    if prop.shorthand && shorthand_matches(&prop.key, &prop.value) {
                        self.pattern(&prop.value);
                    } else {
                        self.prop_key(&prop.key);
                        self.push(": ");
                        self.pattern(&prop.value);
                    }
                }
                if let Some(rest) = rest {
                    if !props.is_empty() {
                        self.push(", ");
                    }
                    self.push("...");
                    self.pattern(rest);
                }
                self.push(" }");
            }
            PatternKind::Array { elements, rest } => {
                self.push("[");
                for (idx, element) in elements.iter().enumerate() {
                    if idx > 0 {
                        self.push(", ");
                    }
                    if let Some(element) = element {
                        self.pattern(element);
                    }
                }
                if let Some(rest) = rest {
                    if !elements.is_empty() {
                        self.push(", ");
                    }
                    self.push("...");
                    self.pattern(rest);
                } else if matches!(elements.last(), Some(None)) {
                    self.push(",");
                }
                self.push("]");
            }
            PatternKind::Default { target, default } => {
                self.pattern(target);
                self.push(" = ");
                self.expr(default, prec::ASSIGN);
            }
        }
    }

    /* ----- Expressions ----- */

    fn expr(&mut self, expr: &Expr, min_prec: u8) {
        let needs_parens = precedence(expr) < min_prec
            || (self.no_in && matches!(expr.kind, ExprKind::Binary { op: BinaryOp::In, .. }));
        if needs_parens {
            self.push("(");
        }
        // Parentheses lift the restriction for everything inside them
        let no_in = self.no_in;
        self.no_in = no_in && !needs_parens;
        self.expr_inner(expr);
        self.no_in = no_in;
        if needs_parens {
            self.push(")");
        }
    }

    fn expr_inner(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Ident { name } => self.push(name),
            ExprKind::This => self.push("this"),
            ExprKind::Super => self.push("super"),
            ExprKind::Null => self.push("null"),
            ExprKind::Bool { value } => self.push(if *value { "true" } else { "false" }),
            ExprKind::Num { raw } | ExprKind::BigInt { raw } => self.push(raw),
            ExprKind::Str { value, raw } => match raw {
                Some(raw) => self.push(raw),
                None => self.push(&quote_string(value)),
            },
            ExprKind::Regex { pattern, flags } => {
                self.push("/");
                self.push(pattern);
                self.push("/");
                self.push(flags);
            }
            ExprKind::Template { tpl } => self.template(tpl),
            ExprKind::TaggedTemplate { tag, tpl } => {
                self.expr(tag, prec::CALL);
                self.template(tpl);
            }
            ExprKind::Array { elements } => {
                self.push("[");
                for (idx, element) in elements.iter().enumerate() {
                    if idx > 0 {
                        self.push(", ");
                    }
                    if let Some(element) = element {
                        self.spread_or_expr(element);
                    }
                }
                if matches!(elements.last(), Some(None)) {
                    self.push(",");
                }
                self.push("]");
            }
            ExprKind::Object { props } => self.object(props),
            ExprKind::Function { function } => self.function(function, None, false),
            ExprKind::Class { class } => self.class(class),
            ExprKind::Unary { op, arg } => {
                self.push(op.as_str());
                let text = self.render_expr(arg, prec::UNARY);
                let clash = match op {
                    UnaryOp::Minus => text.starts_with('-'),
                    UnaryOp::Plus => text.starts_with('+'),
                    _ => op.is_keyword(),
                };
                if clash {
                    self.push(" ");
                }
                self.push(&text);
            }
            ExprKind::Update { op, prefix, arg } => {
                if *prefix {
                    self.push(op.as_str());
                    self.expr(arg, prec::CALL);
                } else {
                    self.expr(arg, prec::CALL);
                    self.push(op.as_str());
                }
            }
            ExprKind::Binary { op, left, right } => {
                let level = binary_precedence(*op);
                let (left_min, right_min) = if *op == BinaryOp::Exp {
                    (prec::POSTFIX, level)
                } else {
                    (level, level + 1)
                };
                self.expr(left, left_min);
                self.push(" ");
                self.push(op.as_str());
                self.push(" ");
                self.expr(right, right_min);
            }
            ExprKind::Logical { op, left, right } => {
                let level = precedence(expr);
                self.logical_operand(*op, left, level);
                self.push(" ");
                self.push(op.as_str());
                self.push(" ");
                self.logical_operand(*op, right, level + 1);
            }
            ExprKind::Assign { op, target, value } => {
                self.pattern(target);
                self.push(" ");
                self.push(op.as_str());
                self.push(" ");
                self.expr(value, prec::ASSIGN);
            }
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                self.expr(test, prec::LOGICAL_OR);
                self.push(" ? ");
                self.expr(consequent, prec::ASSIGN);
                self.push(" : ");
                self.expr(alternate, prec::ASSIGN);
            }
            ExprKind::Call {
                callee,
                args,
                optional,
            } => {
                self.expr(callee, prec::CALL);
                if *optional {
                    self.push("?.");
                }
                self.arguments(args);
            }
            ExprKind::New { callee, args } => {
                self.push("new ");
                if callee_contains_call(callee) {
                    self.push("(");
                    self.expr(callee, prec::SEQUENCE);
                    self.push(")");
                } else {
                    self.expr(callee, prec::MEMBER);
                }
                self.arguments(args);
            }
            ExprKind::Member {
                object,
                property,
                optional,
            } => {
                let bare_integer = matches!(&object.kind, ExprKind::Num { raw }
                    if raw.chars().all(|c| c.is_ascii_digit()));
                if bare_integer {
                    self.push("(");
                    self.expr(object, prec::SEQUENCE);
                    self.push(")");
                } else {
                    self.expr(object, prec::CALL);
                }
                match property {
                    MemberProp::Ident { name } => {
                        self.push(if *optional { "?." } else { "." });
                        self.push(name);
                    }
                    MemberProp::Computed { expr } => {
                        self.push(if *optional { "?.[" } else { "[" });
                        self.expr(expr, prec::SEQUENCE);
                        self.push("]");
                    }
                }
            }
            ExprKind::Sequence { exprs } => {
                for (idx, item) in exprs.iter().enumerate() {
                    if idx > 0 {
                        self.push(", ");
                    }
                    self.expr(item, prec::ASSIGN);
                }
            }
            ExprKind::Await { arg } => {
                self.push("await ");
                self.expr(arg, prec::UNARY);
            }
            ExprKind::Yield { arg, delegate } => {
                self.push("yield");
                if *delegate {
                    self.push("*");
                }
                if let Some(arg) = arg {
                    self.push(" ");
                    self.expr(arg, prec::ASSIGN);
                }
            }
            ExprKind::Import { arg } => {
                self.push("import(");
                self.expr(arg, prec::ASSIGN);
                self.push(")");
            }
        }
    }

    fn logical_operand(&mut self, op: LogicalOp, operand: &Expr, min_prec: u8) {
        if mixes_nullish(op, operand) {
            self.push("(");
            self.expr(operand, prec::SEQUENCE);
            self.push(")");
        } else {
            self.expr(operand, min_prec);
        }
    }

    fn arguments(&mut self, args: &[ExprOrSpread]) {
        self.push("(");
        for (idx, arg) in args.iter().enumerate() {
            if idx > 0 {
                self.push(", ");
            }
            self.spread_or_expr(arg);
        }
        self.push(")");
    }

    fn spread_or_expr(&mut self, item: &ExprOrSpread) {
        if item.spread {
            self.push("...");
        }
        self.expr(&item.expr, prec::ASSIGN);
    }

    fn template(&mut self, tpl: &TemplateLit) {
        self.push("`");
        for (idx, quasi) in tpl.quasis.iter().enumerate() {
            self.push(quasi);
            if let Some(expr) = tpl.exprs.get(idx) {
                self.push("${");
                self.expr(expr, prec::SEQUENCE);
                self.push("}");
            }
        }
        self.push("`");
    }

    fn object(&mut self, props: &[Prop]) {
        if props.is_empty() {
            self.push("{}");
            return;
        }
        self.push("{");
        self.indent += 1;
        for (idx, prop) in props.iter().enumerate() {
            self.newline();
            match prop {
                Prop::KeyValue {
                    key,
                    value,
                    shorthand,
                } => {
                    let is_same_ident =
                        matches!((key, &value.kind), (PropKey::Ident { name }, ExprKind::Ident { name: v }) if name == v);
                    if *shorthand && is_same_ident {
                        self.prop_key(key);
                    } else {
                        self.prop_key(key);
                        self.push(": ");
                        self.expr(value, prec::ASSIGN);
                    }
                }
                Prop::Method { key, function } => self.function(function, Some(key), false),
                Prop::Spread { expr } => {
                    self.push("...");
                    self.expr(expr, prec::ASSIGN);
                }
            }
            if idx + 1 < props.len() {
                self.push(",");
            }
        }
        self.indent -= 1;
        self.newline();
        self.push("}");
    }
}

/// Whether an object-pattern property can keep its shorthand form
fn shorthand_matches(key: &PropKey, value: &Pattern) -> bool {
    let PropKey::Ident { name } = key else {
        return false;
    };
    match &value.kind {
        PatternKind::Ident { name: bound } => bound == name,
        PatternKind::Default { target, .. } => {
            matches!(&target.kind, PatternKind::Ident { name: bound } if bound == name)
        }
        _ => false,
    }
}

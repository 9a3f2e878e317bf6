//! Maybe-async stage
//!
//! Turns every function into one that completes synchronously when nothing
//! it touches is deferred, and into a marked deferred value otherwise.
//!
//! # Function modes
//!
//! - [`FunctionMode::MaybeAsync`]: ordinary functions. The original body
//!   moves into an immediately invoked async arrow; the outer function
//!   returns or throws synchronously when the arrow finished before its first
//!   suspension and returns the marked promise otherwise.
//! - [`FunctionMode::Native`]: async functions can already suspend. Only the
//!   expressions are instrumented.
//! - [`FunctionMode::AlwaysSync`]: generators and constructors cannot
//!   suspend. Expressions are checked and fail with a contained-context error.
//!
//! # Expression instrumentation
//!
//! ```text
//! db.coll.find()
//! ```
//!
//! becomes (with `_ex` and `_isp` from the helper prelude)
//!
//! ```text
//! ("\ufeffdb.coll.find()\ufeff", _ex = ..., _isp(_ex) ? await _ex : _ex)
//! ```
//!
//! The leading string lets the error demangler restore the user's source in
//! messages such as `... is not a function`.
//!
//! The pass is post-order: children are rewritten before their parent, and a
//! function body is wrapped only after everything inside it is done, so
//! generated code is never visited.

use std::collections::HashSet;
use std::rc::Rc;

use crate::ast::visit::{self, ExprCtx, VisitMut};
use crate::ast::{
    split_directives, CatchClause, Expr, ExprKind, ForHead, ForInit, Function, FunctionBody,
    FunctionKind, Program, Span, Stmt, StmtKind, UnaryOp,
};
use crate::codegen::print_expr;
use crate::error::RewriteError;

use super::context::{HelperGroup, HelperNames, Marker, PipelineContext};
use super::runtime::{self, echo_directive, limit_source_length, FunctionState};
use super::template::{Replacement, Template};

/// Identifiers resolved by the host environment and never deferred
const WELL_KNOWN_GLOBALS: &[&str] = &[
    "Array",
    "ArrayBuffer",
    "Atomics",
    "BigInt",
    "BigInt64Array",
    "BigUint64Array",
    "Boolean",
    "DataView",
    "Date",
    "Error",
    "EvalError",
    "FinalizationRegistry",
    "Float32Array",
    "Float64Array",
    "Function",
    "Infinity",
    "Int16Array",
    "Int32Array",
    "Int8Array",
    "JSON",
    "Map",
    "Math",
    "NaN",
    "Number",
    "Object",
    "Promise",
    "Proxy",
    "RangeError",
    "ReferenceError",
    "Reflect",
    "RegExp",
    "Set",
    "SharedArrayBuffer",
    "String",
    "Symbol",
    "SyntaxError",
    "TypeError",
    "URIError",
    "Uint16Array",
    "Uint32Array",
    "Uint8Array",
    "Uint8ClampedArray",
    "WeakMap",
    "WeakRef",
    "WeakSet",
    "arguments",
    "decodeURI",
    "decodeURIComponent",
    "encodeURI",
    "encodeURIComponent",
    "escape",
    "eval",
    "globalThis",
    "isFinite",
    "isNaN",
    "parseFloat",
    "parseInt",
    "undefined",
    "unescape",
];

/* ===================== Templates ===================== */

const GUARD: Template = Template::new(
    "deferred value guard",
    "(SRC, EX = NODE, ISP(EX) ? await EX : EX)",
);

const ASSERT_VALUE: Template = Template::new("contained value check", "ANSP(NODE, SRC)");

const ASSERT_ITERABLE: Template =
    Template::new("contained iterable check", "ANSP(NODE, SRC, true)");

const TYPEOF: Template = Template::new(
    "typeof guard",
    r#"typeof NAME === "undefined" ? "undefined" : typeof NODE"#,
);

const RETURN_VALUE: Template = Template::new(
    "return value capture",
    "(SRV = NODE, FS === ASYNC ? SRV : null)",
);

const DEMANGLE: Template = Template::new("catch demangle", "PARAM = DE(PARAM);");

const RETHROW: Template = Template::new(
    "demangling rethrow",
    r#"
try {
  BODY
} catch (ERR) {
  ERR = DE(ERR);
  throw ERR;
}
"#,
);

const WRAPPER: Template = Template::new(
    "maybe-async wrapper",
    r#"
let FS = SYNC, SRV;
const ARV = (async () => {
  try {
    BODY
  } catch (ERR) {
    ERR = DE(ERR);
    if (FS === SYNC) {
      SRV = ERR;
      FS = THREW;
    } else throw ERR;
  } finally {
    if (FS === SYNC) FS = RETURNED;
  }
})();
if (FS === RETURNED) return SRV;
else if (FS === THREW) throw SRV;
FS = ASYNC;
return MSP(ARV);
"#,
)
.sealed();

const FOR_OF: Template = Template::new(
    "deferred iterable loop",
    r#"
{
  const INFO = AAITSI(ITERABLE);
  const ISAI = INFO.isSyntheticAsyncIterable;
  const IT = INFO.iterable;
  try {
    ISAI && await IT.expectNext();
    for (const ITEM of (SRC, IT)) {
      DECLARATION
      try {
        BODY
      } finally {
        ISAI && await IT.expectNext();
      }
    }
  } finally {
    ISAI && await IT.syncReturn();
  }
}
"#,
);

const LABELED_FOR_OF: Template = Template::new(
    "labeled deferred iterable loop",
    r#"
{
  const INFO = AAITSI(ITERABLE);
  const ISAI = INFO.isSyntheticAsyncIterable;
  const IT = INFO.iterable;
  try {
    ISAI && await IT.expectNext();
    LABEL: for (const ITEM of (SRC, IT)) {
      DECLARATION
      try {
        BODY
      } finally {
        ISAI && await IT.expectNext();
      }
    }
  } finally {
    ISAI && await IT.syncReturn();
  }
}
"#,
);

/* ===================== Function Modes ===================== */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionMode {
    /// Async functions and async generators
    Native,
    /// Non-async generators and class constructors
    AlwaysSync,
    /// Everything else
    MaybeAsync,
}

impl FunctionMode {
    pub fn of(function: &Function) -> Self {
        if function.is_async {
            FunctionMode::Native
        } else if function.is_generator || function.kind == FunctionKind::Constructor {
            FunctionMode::AlwaysSync
        } else {
            FunctionMode::MaybeAsync
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FunctionMode::Native => "native",
            FunctionMode::AlwaysSync => "always-sync",
            FunctionMode::MaybeAsync => "maybe-async",
        }
    }

    fn can_suspend(self) -> bool {
        self != FunctionMode::AlwaysSync
    }
}

/* ===================== Pass ===================== */

pub fn apply(program: &mut Program, ctx: &mut PipelineContext<'_>) -> Result<(), RewriteError> {
    let mut program_bindings = HashSet::new();
    collect_declarations(&program.body, &mut program_bindings);

    let mut pass = MaybeAsync {
        ctx,
        frames: Vec::new(),
        program_bindings,
        rewritten: 0,
        error: None,
    };
    pass.visit_program(program);
    if let Some(err) = pass.error {
        return Err(err);
    }
    tracing::debug!(functions = pass.rewritten, "functions rewritten");
    Ok(())
}

/// State of the function currently being rewritten
struct Frame {
    mode: FunctionMode,
    group: HelperGroup,
    /// Names declared by the function: parameters and every declaration in
    /// its body, regardless of block nesting
    bindings: HashSet<String>,
    in_params: bool,
}

struct MaybeAsync<'c, 'a> {
    ctx: &'c mut PipelineContext<'a>,
    frames: Vec<Frame>,
    program_bindings: HashSet<String>,
    rewritten: usize,
    error: Option<RewriteError>,
}

impl MaybeAsync<'_, '_> {
    fn fail(&mut self, err: RewriteError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn is_free(&self, name: &str) -> bool {
        !WELL_KNOWN_GLOBALS.contains(&name)
            && !self.program_bindings.contains(name)
            && !self.frames.iter().any(|f| f.bindings.contains(name))
    }

    fn current(&self) -> Option<(FunctionMode, Rc<HelperNames>)> {
        self.frames
            .last()
            .map(|frame| (frame.mode, Rc::clone(&frame.group.shared)))
    }

    /// Original source of `expr`, shortened for messages
    fn echo_source(&self, expr: &Expr) -> String {
        let text = match self.ctx.source_text(&expr.span) {
            Some(text) if !expr.span.is_synthetic() => text.to_string(),
            _ => print_expr(expr),
        };
        limit_source_length(&text, self.ctx.config.source_echo_limit)
    }

    fn should_instrument(&self, expr: &Expr, ctx: ExprCtx) -> bool {
        match ctx {
            ExprCtx::AssignTarget
            | ExprCtx::UpdateOperand
            | ExprCtx::AwaitOperand
            | ExprCtx::Unary(UnaryOp::Delete) => return false,
            // Keep the receiver of method calls
            ExprCtx::Callee | ExprCtx::Tag
                if matches!(expr.kind, ExprKind::Member { .. } | ExprKind::Call { .. })
                    || expr.as_ident() == Some("eval") =>
            {
                return false
            }
            ExprCtx::Callee | ExprCtx::MemberObject if in_optional_chain(expr) => return false,
            _ => {}
        }
        match &expr.kind {
            ExprKind::Ident { name } => self.is_free(name),
            ExprKind::Call { .. }
            | ExprKind::New { .. }
            | ExprKind::Member { .. }
            | ExprKind::TaggedTemplate { .. }
            | ExprKind::Yield { .. } => true,
            _ => false,
        }
    }

    fn instrument(&mut self, expr: Expr, ctx: ExprCtx) -> Result<Expr, RewriteError> {
        let Some((mode, names)) = self.current() else {
            return Ok(expr);
        };
        let source = self.echo_source(&expr);
        if mode == FunctionMode::AlwaysSync {
            let template = match ctx {
                ExprCtx::ForOfIterable | ExprCtx::YieldDelegate => &ASSERT_ITERABLE,
                _ => &ASSERT_VALUE,
            };
            return template.expr(
                self.ctx,
                vec![
                    ("ANSP", Replacement::Ident(names.ansp.clone())),
                    ("NODE", Replacement::Expr(expr)),
                    ("SRC", Replacement::Str(source)),
                ],
            );
        }
        GUARD.expr(
            self.ctx,
            vec![
                ("SRC", Replacement::Str(format!("\u{feff}{}\u{feff}", source))),
                ("EX", Replacement::Ident(names.ex.clone())),
                ("ISP", Replacement::Ident(names.isp.clone())),
                ("NODE", Replacement::Expr(expr)),
            ],
        )
    }

    /// `typeof x` for an undeclared `x` must stay `"undefined"` instead of
    /// throwing, so only the second operand is guarded
    fn expand_typeof(&mut self, expr: &mut Expr) -> Result<bool, RewriteError> {
        let ExprKind::Unary {
            op: UnaryOp::Typeof,
            arg,
        } = &mut expr.kind
        else {
            return Ok(false);
        };
        let name = match arg.as_ident() {
            Some(name) if self.is_free(name) => name.to_string(),
            _ => return Ok(false),
        };
        let operand = arg.take();
        let guarded = self.instrument(operand, ExprCtx::Unary(UnaryOp::Typeof))?;
        *expr = TYPEOF.expr(
            self.ctx,
            vec![
                ("NAME", Replacement::Ident(name)),
                ("NODE", Replacement::Expr(guarded)),
            ],
        )?;
        Ok(true)
    }

    fn adapts_for_of(&self, stmt: &Stmt) -> bool {
        let StmtKind::ForOf { is_await, .. } = &stmt.kind else {
            return false;
        };
        !*is_await
            && !self.ctx.is_marked(stmt.id, Marker::Generated)
            && !self.ctx.is_marked(stmt.id, Marker::Rewritten)
            && self
                .frames
                .last()
                .is_some_and(|frame| frame.mode.can_suspend())
    }

    fn iterable_source(&self, stmt: &Stmt) -> String {
        match &stmt.kind {
            StmtKind::ForOf { right, .. } => self.echo_source(right),
            _ => String::new(),
        }
    }

    /// Route a `for-of` through the deferred iterable adapter
    fn adapt_for_of(
        &mut self,
        stmt: Stmt,
        source: String,
        label: Option<String>,
    ) -> Result<Stmt, RewriteError> {
        let Some((_, names)) = self.current() else {
            return Ok(stmt);
        };
        let StmtKind::ForOf {
            left, right, body, ..
        } = stmt.kind
        else {
            return Ok(stmt);
        };

        let item = self.ctx.fresh_name("i");
        let declaration = match left {
            ForHead::Var { mut decl } => {
                for declarator in decl.declarations.iter_mut() {
                    declarator.init = Some(Expr::ident(item.clone()));
                }
                Stmt::synth(StmtKind::Var { decl })
            }
            ForHead::Pattern { pattern } => {
                Stmt::expr(Expr::assign(pattern, Expr::ident(item.clone())))
            }
        };
        self.ctx.mark(declaration.id, Marker::Generated);

        let mut replacements = vec![
            ("INFO", Replacement::Ident(self.ctx.fresh_name("ii"))),
            ("ISAI", Replacement::Ident(self.ctx.fresh_name("isai"))),
            ("IT", Replacement::Ident(self.ctx.fresh_name("it"))),
            ("ITEM", Replacement::Ident(item)),
            ("AAITSI", Replacement::Ident(names.aaitsi.clone())),
            ("ITERABLE", Replacement::Expr(right)),
            (
                "SRC",
                Replacement::Str(format!("\u{feff}{}\u{feff}", source)),
            ),
            ("DECLARATION", Replacement::Stmts(vec![declaration])),
            ("BODY", Replacement::Stmts(vec![*body])),
        ];
        let template = match label {
            Some(label) => {
                replacements.push(("LABEL", Replacement::Ident(label)));
                &LABELED_FOR_OF
            }
            None => &FOR_OF,
        };
        let adapted = template.stmt(self.ctx, replacements)?;
        self.ctx.mark(adapted.id, Marker::Rewritten);
        Ok(adapted)
    }

    fn capture_return(&mut self, stmt: &mut Stmt) -> Result<(), RewriteError> {
        let Some(frame) = self.frames.last() else {
            return Ok(());
        };
        // Generated returns such as the completion-value return are captured too
        if frame.mode != FunctionMode::MaybeAsync || self.ctx.is_marked(stmt.id, Marker::Rewritten) {
            return Ok(());
        }
        let (fs, srv) = (frame.group.fs.clone(), frame.group.srv.clone());
        let StmtKind::Return { value: Some(value) } = &mut stmt.kind else {
            return Ok(());
        };
        let node = value.take();
        *value = RETURN_VALUE.expr(
            self.ctx,
            vec![
                ("SRV", Replacement::Ident(srv)),
                ("FS", Replacement::Ident(fs)),
                ("ASYNC", Replacement::Str(FunctionState::Async.to_string())),
                ("NODE", Replacement::Expr(node)),
            ],
        )?;
        self.ctx.mark(stmt.id, Marker::Rewritten);
        Ok(())
    }

    fn demangle_catch(&mut self, clause: &mut CatchClause) -> Result<(), RewriteError> {
        let Some((_, names)) = self.current() else {
            return Ok(());
        };
        if self.ctx.is_marked(clause.id, Marker::Demangled) {
            return Ok(());
        }
        let Some(param) = clause.param.as_ref().and_then(|p| p.as_ident()) else {
            return Ok(());
        };
        let stmt = DEMANGLE.stmt(
            self.ctx,
            vec![
                ("PARAM", Replacement::Ident(param.to_string())),
                ("DE", Replacement::Ident(names.de.clone())),
            ],
        )?;
        clause.body.insert(0, stmt);
        self.ctx.mark(clause.id, Marker::Demangled);
        Ok(())
    }

    /// Directives, source echo, helper prelude, then the mode's body
    fn assemble(
        &mut self,
        span: Span,
        frame: Frame,
        body: Vec<Stmt>,
    ) -> Result<Vec<Stmt>, RewriteError> {
        let (mut out, body) = split_directives(body);

        if self.ctx.config.echo_function_source && !span.is_synthetic() {
            if let Some(source) = self.ctx.source_text(&span) {
                let echo = Stmt::synth(StmtKind::Directive {
                    raw: echo_directive(source),
                });
                self.ctx.mark(echo.id, Marker::Generated);
                out.push(echo);
            }
        }

        let names = &frame.group.shared;
        if frame.group.is_root {
            out.extend(runtime::prelude(self.ctx, names)?);
        }

        let err = self.ctx.fresh_name("err");
        match frame.mode {
            FunctionMode::MaybeAsync => {
                let group = &frame.group;
                out.extend(WRAPPER.stmts(
                    self.ctx,
                    vec![
                        ("FS", Replacement::Ident(group.fs.clone())),
                        ("SRV", Replacement::Ident(group.srv.clone())),
                        ("ARV", Replacement::Ident(group.arv.clone())),
                        ("ERR", Replacement::Ident(err)),
                        ("DE", Replacement::Ident(names.de.clone())),
                        ("MSP", Replacement::Ident(names.msp.clone())),
                        ("SYNC", Replacement::Str(FunctionState::Sync.to_string())),
                        (
                            "RETURNED",
                            Replacement::Str(FunctionState::Returned.to_string()),
                        ),
                        ("THREW", Replacement::Str(FunctionState::Threw.to_string())),
                        ("ASYNC", Replacement::Str(FunctionState::Async.to_string())),
                        ("BODY", Replacement::Stmts(body)),
                    ],
                )?);
            }
            FunctionMode::Native | FunctionMode::AlwaysSync => {
                out.push(RETHROW.stmt(
                    self.ctx,
                    vec![
                        ("BODY", Replacement::Stmts(body)),
                        ("ERR", Replacement::Ident(err)),
                        ("DE", Replacement::Ident(names.de.clone())),
                    ],
                )?);
            }
        }
        Ok(out)
    }
}

impl VisitMut for MaybeAsync<'_, '_> {
    fn visit_function(&mut self, function: &mut Function) {
        if self.error.is_some() || self.ctx.is_marked(function.id, Marker::Rewritten) {
            return;
        }
        let mode = FunctionMode::of(function);
        let group = match self.frames.last() {
            Some(parent) => self.ctx.child_group(&parent.group),
            None => self.ctx.root_group(),
        };

        if let FunctionBody::Expr { expr } = &mut function.body {
            let value = expr.take();
            function.body = FunctionBody::Block {
                body: vec![Stmt::synth(StmtKind::Return { value: Some(value) })],
            };
        }

        let mut bindings: HashSet<String> = function.param_names().into_iter().collect();
        if let Some(name) = &function.name {
            bindings.insert(name.clone());
        }
        if let FunctionBody::Block { body } = &function.body {
            collect_declarations(body, &mut bindings);
        }

        self.frames.push(Frame {
            mode,
            group,
            bindings,
            in_params: true,
        });
        visit::walk_function_params(self, function);
        if let Some(frame) = self.frames.last_mut() {
            frame.in_params = false;
        }
        visit::walk_function_body(self, function);
        let Some(frame) = self.frames.pop() else {
            return;
        };
        if self.error.is_some() {
            return;
        }

        let FunctionBody::Block { body } = &mut function.body else {
            return;
        };
        let original = std::mem::take(body);
        match self.assemble(function.span, frame, original) {
            Ok(assembled) => *body = assembled,
            Err(err) => return self.fail(err),
        }
        self.ctx.mark(function.id, Marker::Rewritten);
        self.rewritten += 1;
        tracing::trace!(
            name = function.name.as_deref().unwrap_or("<anonymous>"),
            mode = mode.as_str(),
            "function rewritten"
        );
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        if self.error.is_some() {
            return;
        }
        if self.frames.is_empty() {
            return visit::walk_stmt(self, stmt);
        }

        // The label moves onto the inner loop so `continue label` stays valid
        if let StmtKind::Labeled { label, body } = &mut stmt.kind {
            if self.adapts_for_of(body) {
                let source = self.iterable_source(body);
                visit::walk_stmt(self, body);
                let label = label.clone();
                let body = body.take();
                match self.adapt_for_of(body, source, Some(label)) {
                    Ok(adapted) => *stmt = adapted,
                    Err(err) => self.fail(err),
                }
                return;
            }
        }

        let adapt = self.adapts_for_of(stmt);
        let source = if adapt {
            self.iterable_source(stmt)
        } else {
            String::new()
        };
        visit::walk_stmt(self, stmt);

        let result = if matches!(stmt.kind, StmtKind::Return { value: Some(_) }) {
            self.capture_return(stmt)
        } else if adapt {
            let original = stmt.take();
            self.adapt_for_of(original, source, None)
                .map(|adapted| *stmt = adapted)
        } else {
            Ok(())
        };
        if let Err(err) = result {
            self.fail(err);
        }
    }

    fn visit_expr(&mut self, expr: &mut Expr, ctx: ExprCtx) {
        if self.error.is_some() {
            return;
        }
        let skip = match self.frames.last() {
            None => true,
            // Defaults of always-sync parameters are checked like the body
            Some(frame) => {
                (frame.in_params && frame.mode != FunctionMode::AlwaysSync)
                    || self.ctx.is_marked(expr.id, Marker::Generated)
            }
        };
        if skip {
            return visit::walk_expr(self, expr);
        }

        match self.expand_typeof(expr) {
            Ok(true) => return,
            Ok(false) => {}
            Err(err) => return self.fail(err),
        }

        visit::walk_expr(self, expr);
        if self.error.is_none() && self.should_instrument(expr, ctx) {
            let original = expr.take();
            match self.instrument(original, ctx) {
                Ok(instrumented) => *expr = instrumented,
                Err(err) => self.fail(err),
            }
        }
    }

    fn visit_catch_clause(&mut self, clause: &mut CatchClause) {
        visit::walk_catch_clause(self, clause);
        if self.error.is_none() {
            if let Err(err) = self.demangle_catch(clause) {
                self.fail(err);
            }
        }
    }
}

/// Whether `expr` is a link of an optional chain that continues in its parent
fn in_optional_chain(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Member {
            object, optional, ..
        } => *optional || in_optional_chain(object),
        ExprKind::Call {
            callee, optional, ..
        } => *optional || in_optional_chain(callee),
        _ => false,
    }
}

/// Names declared in a statement list, not descending into functions
fn collect_declarations(stmts: &[Stmt], out: &mut HashSet<String>) {
    for stmt in stmts {
        collect_stmt(stmt, out);
    }
}

fn collect_stmt(stmt: &Stmt, out: &mut HashSet<String>) {
    match &stmt.kind {
        StmtKind::Var { decl } => out.extend(decl.bound_names()),
        StmtKind::Function { function } => out.extend(function.name.clone()),
        StmtKind::Class { class } => out.extend(class.name.clone()),
        StmtKind::Block { body } => collect_declarations(body, out),
        StmtKind::If {
            consequent,
            alternate,
            ..
        } => {
            collect_stmt(consequent, out);
            if let Some(alternate) = alternate {
                collect_stmt(alternate, out);
            }
        }
        StmtKind::For { init, body, .. } => {
            if let Some(ForInit::Var { decl }) = init {
                out.extend(decl.bound_names());
            }
            collect_stmt(body, out);
        }
        StmtKind::ForIn { left, body, .. } | StmtKind::ForOf { left, body, .. } => {
            if let ForHead::Var { decl } = left {
                out.extend(decl.bound_names());
            }
            collect_stmt(body, out);
        }
        StmtKind::While { body, .. }
        | StmtKind::DoWhile { body, .. }
        | StmtKind::Labeled { body, .. } => collect_stmt(body, out),
        StmtKind::Try {
            block,
            handler,
            finalizer,
        } => {
            collect_declarations(block, out);
            if let Some(handler) = handler {
                if let Some(param) = &handler.param {
                    let mut names = Vec::new();
                    param.bound_names(&mut names);
                    out.extend(names);
                }
                collect_declarations(&handler.body, out);
            }
            if let Some(finalizer) = finalizer {
                collect_declarations(finalizer, out);
            }
        }
        StmtKind::Switch { cases, .. } => {
            for case in cases {
                collect_declarations(&case.body, out);
            }
        }
        _ => {}
    }
}

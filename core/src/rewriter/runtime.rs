//! Runtime support library
//!
//! Every root helper group declares a prelude of small script functions:
//! deferred-value marking and testing, the contained-context assertion, the
//! deferred-iterable adapter and the error demangler. The same helpers are
//! also available as one standalone object through [`runtime_support_code`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::{Expr, Stmt};
use crate::codegen::{print_expr, quote_string};
use crate::config::RewriterConfig;
use crate::error::RewriteError;

use super::context::{HelperNames, PipelineContext};
use super::template::{Replacement, Template};

/// Symbol tag for deferred values
pub const SYNTHETIC_PROMISE_TAG: &str = "syntheticPromise";
/// Symbol tag for deferred iterables
pub const SYNTHETIC_ASYNC_ITERABLE_TAG: &str = "syntheticAsyncIterable";
/// Symbol tag for signals that user handlers must not intercept
pub const UNCATCHABLE_TAG: &str = "uncatchable";

/// Opening and closing markers of the function source echo directive
pub const ECHO_OPEN: &str = "<async_rewriter>";
pub const ECHO_CLOSE: &str = "</async_rewriter>";

/// Per-invocation state of a maybe-async function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionState {
    /// Running, nothing has suspended yet
    Sync,
    /// Completed normally before any suspension
    Returned,
    /// Threw before any suspension
    Threw,
    /// Control went back to the caller; the result is a deferred value
    Async,
}

impl FunctionState {
    pub fn as_str(self) -> &'static str {
        match self {
            FunctionState::Sync => "sync",
            FunctionState::Returned => "returned",
            FunctionState::Threw => "threw",
            FunctionState::Async => "async",
        }
    }
}

impl fmt::Display for FunctionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable codes of contained-context violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    DeferredValueInSyncContext,
    DeferredIterableInSyncContext,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::DeferredValueInSyncContext => "DeferredValueInSyncContext",
            ErrorCode::DeferredIterableInSyncContext => "DeferredIterableInSyncContext",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            ErrorCode::DeferredValueInSyncContext => "used",
            ErrorCode::DeferredIterableInSyncContext => "iterated",
        }
    }

    /// Message for an offending expression
    pub fn message(self, source: &str) -> String {
        format!(
            "Result of expression \"{}\" cannot be {} in this context",
            source,
            self.verb()
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shorten source text for error messages
///
/// Text longer than `max` keeps its first 70% and last 30% of `max - 5`
/// characters around a ` ... ` separator.
pub fn limit_source_length(input: &str, max: usize) -> String {
    let len = input.chars().count();
    if len <= max {
        return input.to_string();
    }
    let budget = max.saturating_sub(5);
    let head = budget * 7 / 10;
    let tail = budget * 3 / 10;
    let start: String = input.chars().take(head).collect();
    let end: String = input.chars().skip(len - tail).collect();
    format!("{} ... {}", start, end)
}

/// Percent-encode like the script engine's `encodeURIComponent`
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Echo directive text for a function's original source
pub fn echo_directive(function_source: &str) -> String {
    quote_string(&format!(
        "{}{}{}",
        ECHO_OPEN,
        encode_uri_component(function_source),
        ECHO_CLOSE
    ))
}

/* ===================== Prelude ===================== */

const PRELUDE: Template = Template::new(
    "runtime prelude",
    r#"
const SP = Symbol.for(SP_KEY);
const SAI = Symbol.for(SAI_KEY);
let EX;
function MSP(p) {
  return Object.defineProperty(p, SP, { value: true });
}
function ISP(p) {
  return p && p[SP];
}
function ANSP(p, s, i = false) {
  if (p && p[SP]) throw VALUE_ERROR;
  if (i && p && p[SAI]) throw ITERABLE_ERROR;
  return p;
}
function AAITSI(original) {
  if (!original || !original[SAI]) {
    return { iterable: original, isSyntheticAsyncIterable: false };
  }
  const originalIterator = original[Symbol.asyncIterator]();
  let next;
  let returned;
  return {
    isSyntheticAsyncIterable: true,
    iterable: {
      [Symbol.iterator]() {
        return this;
      },
      next() {
        let _next = next;
        next = undefined;
        return _next;
      },
      return(value) {
        returned = { value };
        return { value, done: true };
      },
      async expectNext() {
        next ??= await originalIterator.next();
      },
      async syncReturn() {
        if (returned) {
          await originalIterator.return(returned.value);
        }
      }
    }
  };
}
function DE(err) {
  if (Object.prototype.toString.call(err) === "[object Error]" && err.message.includes("\ufeff")) {
    err.message = err.message.replace(/\(\s*"\ufeff(.+?)\ufeff"\s*,(?:[^\(]|\([^\)]*\))*\)/g, (m, o) => o);
  }
  return err;
}
"#,
)
.sealed();

/// Helper declarations emitted at the top of a root group's function
pub fn prelude(
    ctx: &mut PipelineContext<'_>,
    names: &HelperNames,
) -> Result<Vec<Stmt>, RewriteError> {
    let config = ctx.config;
    let value_error = contained_error(ctx, config, ErrorCode::DeferredValueInSyncContext)?;
    let iterable_error = contained_error(ctx, config, ErrorCode::DeferredIterableInSyncContext)?;
    PRELUDE.stmts(
        ctx,
        vec![
            ("SP", Replacement::Ident(names.sp.clone())),
            ("SAI", Replacement::Ident(names.sai.clone())),
            ("EX", Replacement::Ident(names.ex.clone())),
            ("MSP", Replacement::Ident(names.msp.clone())),
            ("ISP", Replacement::Ident(names.isp.clone())),
            ("ANSP", Replacement::Ident(names.ansp.clone())),
            ("AAITSI", Replacement::Ident(names.aaitsi.clone())),
            ("DE", Replacement::Ident(names.de.clone())),
            (
                "SP_KEY",
                Replacement::Str(config.symbol_key(SYNTHETIC_PROMISE_TAG)),
            ),
            (
                "SAI_KEY",
                Replacement::Str(config.symbol_key(SYNTHETIC_ASYNC_ITERABLE_TAG)),
            ),
            ("VALUE_ERROR", Replacement::Expr(value_error)),
            ("ITERABLE_ERROR", Replacement::Expr(iterable_error)),
        ],
    )
}

/// Error value thrown by the contained-context assertion; `s` is the echoed source
fn contained_error(
    ctx: &mut PipelineContext<'_>,
    config: &RewriterConfig,
    code: ErrorCode,
) -> Result<Expr, RewriteError> {
    let message = format!(
        "{} + s + {}",
        quote_string("Result of expression \""),
        quote_string(&format!("\" cannot be {} in this context", code.verb()))
    );
    let code_literal = quote_string(code.as_str());
    let text = if config.error_constructor == "Error" {
        format!(
            "Object.assign(new Error({}), {{ code: {} }})",
            message, code_literal
        )
    } else {
        format!(
            "new {}({}, {})",
            config.error_constructor, message, code_literal
        )
    };
    Template::owned("contained-context error", text)
        .sealed()
        .expr(ctx, vec![])
}

/* ===================== Standalone Support Object ===================== */

const SUPPORT_OBJECT: Template = Template::new(
    "runtime support object",
    r#"(() => {
  PRELUDE
  const UNCATCHABLE = Symbol.for(UNCATCHABLE_KEY);
  return Object.freeze({
    markDeferred: MSP,
    isDeferred(value) {
      return !!ISP(value);
    },
    markDeferredIterable(value) {
      return Object.defineProperty(value, SAI, { value: true });
    },
    markUncatchable(err) {
      return Object.defineProperty(err, UNCATCHABLE, { value: true });
    },
    isUncatchable(err) {
      return !!(err && err[UNCATCHABLE]);
    },
    demangleError: DE,
    adaptDeferredIterable: AAITSI,
    originalSource(fn) {
      const text = String(fn);
      const match = /"<async_rewriter>([^"]*)<\/async_rewriter>"/.exec(text);
      return match ? decodeURIComponent(match[1]) : text;
    }
  });
})()"#,
)
.sealed();

/// Source of an expression evaluating to the frozen runtime support object
///
/// Members: `markDeferred`, `isDeferred`, `markDeferredIterable`,
/// `markUncatchable`, `isUncatchable`, `demangleError`,
/// `adaptDeferredIterable` and `originalSource`.
pub fn runtime_support_code(config: &RewriterConfig) -> Result<String, RewriteError> {
    let mut ctx = PipelineContext::new("", config);
    let group = ctx.root_group();
    let names = group.shared.as_ref().clone();
    let prelude = prelude(&mut ctx, &names)?;
    let uncatchable = ctx.fresh_name("uncatchable");
    let object = SUPPORT_OBJECT.expr(
        &mut ctx,
        vec![
            ("PRELUDE", Replacement::Stmts(prelude)),
            ("UNCATCHABLE", Replacement::Ident(uncatchable)),
            (
                "UNCATCHABLE_KEY",
                Replacement::Str(config.symbol_key(UNCATCHABLE_TAG)),
            ),
            ("MSP", Replacement::Ident(names.msp)),
            ("ISP", Replacement::Ident(names.isp)),
            ("SAI", Replacement::Ident(names.sai)),
            ("DE", Replacement::Ident(names.de)),
            ("AAITSI", Replacement::Ident(names.aaitsi)),
        ],
    )?;
    Ok(print_expr(&object))
}

//! Maybe-async rewriting pipeline
//!
//! ```text
//! source → parse → validate → hoist → firewall → maybe-async → print
//! ```
//!
//! Each stage works on the same tree and shares one [`PipelineContext`] for
//! markers, fresh names and parsed templates. The stages are public so they
//! can be driven one at a time.
//!
//! # Example
//!
//! ```rust,ignore
//! use async_rewriter::{rewrite, RewriterConfig};
//!
//! let output = rewrite("db.coll.find()", &RewriterConfig::default())?;
//! engine.eval(&output.runtime_support)?;
//! engine.eval(&output.code)?;
//! ```

pub mod context;
pub mod firewall;
pub mod hoist;
pub mod maybe_async;
pub mod runtime;
pub mod template;

#[cfg(test)]
mod tests;

use serde::Serialize;

use crate::codegen::print_program;
use crate::config::RewriterConfig;
use crate::error::RewriteError;
use crate::parser::parse_program;
use crate::parser::semantic_validator::validate_program;

pub use context::{Marker, PipelineContext};
pub use maybe_async::FunctionMode;
pub use runtime::{runtime_support_code, ErrorCode, FunctionState};

/// Rewritten program and the support library it expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteOutput {
    pub code: String,
    pub runtime_support: String,
}

/// Rewrite `source` with the given configuration
pub fn rewrite(source: &str, config: &RewriterConfig) -> Result<RewriteOutput, RewriteError> {
    let span = tracing::info_span!("rewrite", bytes = source.len());
    let _enter = span.enter();

    let code = rewrite_code(source, config)?;
    let runtime_support = runtime_support_code(config)?;
    Ok(RewriteOutput {
        code,
        runtime_support,
    })
}

/// Rewrite `source` without generating the support library
pub fn rewrite_code(source: &str, config: &RewriterConfig) -> Result<String, RewriteError> {
    let mut program = parse_program(source)?;
    tracing::debug!(statements = program.body.len(), "parsed");

    if config.validate {
        let (errors, warnings): (Vec<_>, Vec<_>) = validate_program(&program, source)
            .into_iter()
            .partition(|e| e.is_error());
        for warning in &warnings {
            tracing::warn!(%warning, "validation warning");
        }
        if !errors.is_empty() {
            return Err(RewriteError::Validation(errors));
        }
    }

    let mut ctx = PipelineContext::new(source, config);
    hoist::hoist_and_wrap(&mut program, &mut ctx)?;
    firewall::apply(&mut program, &mut ctx)?;
    maybe_async::apply(&mut program, &mut ctx)?;

    let code = print_program(&program);
    tracing::debug!(bytes = code.len(), "printed");
    Ok(code)
}

/// Reusable rewriter holding a configuration
#[derive(Debug, Clone, Default)]
pub struct AsyncRewriter {
    config: RewriterConfig,
}

impl AsyncRewriter {
    pub fn new(config: RewriterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RewriterConfig {
        &self.config
    }

    /// Rewritten executable text for `source`
    pub fn process(&self, source: &str) -> Result<String, RewriteError> {
        let span = tracing::info_span!("rewrite", bytes = source.len());
        let _enter = span.enter();
        rewrite_code(source, &self.config)
    }

    /// Support library to load before any processed code
    pub fn runtime_support(&self) -> Result<String, RewriteError> {
        runtime_support_code(&self.config)
    }
}

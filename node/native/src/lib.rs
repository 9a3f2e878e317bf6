use napi::bindgen_prelude::*;
use napi_derive::napi;

use async_rewriter::parser::{parse_program, semantic_validator::validate_program};
use async_rewriter::{rewrite_code, runtime_support_code, RewriterConfig};

/// Rewritten code and the support library it expects
#[napi(object)]
pub struct RewriteResult {
    pub code: String,
    pub runtime_support: String,
}

/// Build a config from an optional JSON options object
///
/// Missing fields keep their defaults.
fn config_from_json(options: Option<String>) -> Result<RewriterConfig> {
    let config = match options {
        Some(json) => serde_json::from_str::<RewriterConfig>(&json)
            .map_err(|e| Error::from_reason(format!("Invalid options JSON: {}", e)))?,
        None => RewriterConfig::default(),
    };
    config
        .validate()
        .map_err(|e| Error::from_reason(e.to_string()))?;
    Ok(config)
}

/// Rewrite a script
#[napi]
pub fn rewrite(code: String, options: Option<String>) -> Result<RewriteResult> {
    let config = config_from_json(options)?;
    let rewritten = rewrite_code(&code, &config).map_err(|e| Error::from_reason(e.to_string()))?;
    let runtime_support =
        runtime_support_code(&config).map_err(|e| Error::from_reason(e.to_string()))?;
    Ok(RewriteResult {
        code: rewritten,
        runtime_support,
    })
}

/// Rewrite a script, returning only the code
#[napi]
pub fn process(code: String, options: Option<String>) -> Result<String> {
    let config = config_from_json(options)?;
    rewrite_code(&code, &config).map_err(|e| Error::from_reason(e.to_string()))
}

/// Runtime support library expression for the given options
#[napi]
pub fn runtime_support(options: Option<String>) -> Result<String> {
    let config = config_from_json(options)?;
    runtime_support_code(&config).map_err(|e| Error::from_reason(e.to_string()))
}

/// Validation diagnostics for a script, formatted for display
///
/// Syntax errors are returned as an error.
#[napi]
pub fn check_syntax(code: String) -> Result<Vec<String>> {
    let program = parse_program(&code).map_err(|e| Error::from_reason(e.to_string()))?;
    Ok(validate_program(&program, &code)
        .iter()
        .map(|diagnostic| diagnostic.to_string())
        .collect())
}

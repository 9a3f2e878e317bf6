//! Rewriter configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables prefixed with `ASYNC_REWRITER_`.
//!
//! # Example
//!
//! ```rust,ignore
//! use async_rewriter::config::RewriterConfig;
//!
//! // Defaults, file and environment
//! let config = RewriterConfig::load(None)?;
//!
//! // Programmatic
//! let config = RewriterConfig::builder()
//!     .tag_namespace("@@mongosh")
//!     .source_echo_limit(40)
//!     .build()?;
//! ```

use std::path::{Path, PathBuf};

use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable prefix for every setting
pub const ENV_PREFIX: &str = "ASYNC_REWRITER";

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "async-rewriter.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "ASYNC_REWRITER_CONFIG_PATH";

const MIN_SOURCE_ECHO_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriterConfig {
    /// Namespace for the `Symbol.for` keys that tag deferred values
    pub tag_namespace: String,
    /// Constructor used for contained-context errors
    pub error_constructor: String,
    /// Maximum length of source text echoed into error messages
    pub source_echo_limit: usize,
    /// Prefix every rewritten function with an encoded copy of its source
    pub echo_function_source: bool,
    /// Run the semantic validator before rewriting
    pub validate: bool,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            tag_namespace: "@@shell".to_string(),
            error_constructor: "Error".to_string(),
            source_echo_limit: 25,
            echo_function_source: true,
            validate: true,
        }
    }
}

impl RewriterConfig {
    pub fn builder() -> RewriterConfigBuilder {
        RewriterConfigBuilder::default()
    }

    /// Load layered configuration
    ///
    /// `path` overrides the default file search. Without it the file named by
    /// `ASYNC_REWRITER_CONFIG_PATH` is used, then `async-rewriter.toml` if it
    /// exists.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_layered(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_layered(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let defaults = RewriterConfig::default();
        let mut builder = config::Config::builder()
            .set_default("tag_namespace", defaults.tag_namespace)?
            .set_default("error_constructor", defaults.error_constructor)?
            .set_default("source_echo_limit", defaults.source_echo_limit as u64)?
            .set_default("echo_function_source", defaults.echo_function_source)?
            .set_default("validate", defaults.validate)?;

        if let Some((file, required)) = resolve_config_path(path) {
            tracing::debug!(path = %file.display(), "loading config file");
            builder = builder.add_source(
                File::from(file)
                    .format(FileFormat::Toml)
                    .required(required),
            );
        }

        let config: RewriterConfig = builder
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tag_namespace.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "tag_namespace must not be empty".to_string(),
            ));
        }
        if !is_constructor_path(&self.error_constructor) {
            return Err(ConfigError::Invalid(format!(
                "error_constructor '{}' is not an identifier path",
                self.error_constructor
            )));
        }
        if self.source_echo_limit < MIN_SOURCE_ECHO_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "source_echo_limit must be at least {}",
                MIN_SOURCE_ECHO_LIMIT
            )));
        }
        Ok(())
    }

    /// Full `Symbol.for` key for a tag in this namespace
    pub fn symbol_key(&self, tag: &str) -> String {
        format!("{}.{}", self.tag_namespace, tag)
    }

    /// Render as TOML, as accepted by [`RewriterConfig::load`]
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Explicit path (required) or discovered default file (optional)
fn resolve_config_path(path: Option<&Path>) -> Option<(PathBuf, bool)> {
    if let Some(path) = path {
        return Some((path.to_path_buf(), true));
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Some((PathBuf::from(path), true));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.exists().then_some((default, false))
}

/// `Error`, `errors.ShellError` and the like
fn is_constructor_path(value: &str) -> bool {
    !value.is_empty()
        && value.split('.').all(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
                && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        })
}

/// Builder for programmatic configuration
#[derive(Debug, Default)]
pub struct RewriterConfigBuilder {
    config: RewriterConfig,
}

impl RewriterConfigBuilder {
    pub fn tag_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.tag_namespace = namespace.into();
        self
    }

    pub fn error_constructor(mut self, constructor: impl Into<String>) -> Self {
        self.config.error_constructor = constructor.into();
        self
    }

    pub fn source_echo_limit(mut self, limit: usize) -> Self {
        self.config.source_echo_limit = limit;
        self
    }

    pub fn echo_function_source(mut self, enabled: bool) -> Self {
        self.config.echo_function_source = enabled;
        self
    }

    pub fn validate(mut self, enabled: bool) -> Self {
        self.config.validate = enabled;
        self
    }

    pub fn build(self) -> Result<RewriterConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

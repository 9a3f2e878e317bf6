pub mod ast;
pub mod cli;
pub mod codegen;
pub mod config;
pub mod error;
pub mod parser;
pub mod rewriter;

// Re-export main entry points
pub use config::RewriterConfig;
pub use error::{ConfigError, RewriteError};
pub use rewriter::{rewrite, rewrite_code, runtime_support_code, AsyncRewriter, RewriteOutput};

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::RewriterConfig;

#[derive(Parser)]
#[command(name = "async-rewriter")]
#[command(about = "Rewrite shell scripts so deferred values can be used synchronously", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Skip the semantic validator
    #[arg(long, global = true)]
    pub no_validate: bool,

    /// Do not prefix rewritten functions with their encoded source
    #[arg(long, global = true)]
    pub no_echo: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rewrite a script (reads stdin when no file is given)
    Rewrite {
        /// Input file
        file: Option<PathBuf>,

        /// Write the result here instead of stdout
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Prepend the runtime support library as `const <name> = ...;`
        #[arg(long, value_name = "NAME")]
        with_runtime: Option<String>,

        /// Print `{ code, runtimeSupport }` as JSON
        #[arg(long, conflicts_with = "with_runtime")]
        json: bool,
    },

    /// Print the runtime support library expression
    Runtime,

    /// Parse and validate a script without rewriting it
    Check {
        /// Input file
        file: Option<PathBuf>,
    },

    /// Print the parsed syntax tree as JSON
    Ast {
        /// Input file
        file: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}

/// Run the CLI by parsing process arguments
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli)
}

/// Run the CLI with provided arguments (for language adapters that need to filter args)
pub fn run_cli_from_args(args: Vec<String>) -> Result<()> {
    let cli = Cli::parse_from(args);
    run_cli_with_args(cli)
}

fn run_cli_with_args(cli: Cli) -> Result<()> {
    use crate::parser::{parse_program, semantic_validator::validate_program};
    use crate::rewriter::{rewrite, rewrite_code, runtime_support_code};

    // `.env` may carry ASYNC_REWRITER_* overrides
    dotenvy::dotenv().ok();

    // Load eagerly so config errors surface before any output
    let config = load_config(&cli)?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Rewrite {
            file,
            output,
            with_runtime,
            json,
        } => {
            let source = read_input(file.as_deref())?;
            let text = if json {
                let rewritten = rewrite(&source, &config)?;
                serde_json::to_string_pretty(&rewritten)?
            } else if let Some(name) = with_runtime {
                let support = runtime_support_code(&config)?;
                let code = rewrite_code(&source, &config)?;
                format!("const {} = {};\n{}", name, support, code)
            } else {
                rewrite_code(&source, &config)?
            };
            write_output(output.as_deref(), &text)?;
        }

        Commands::Runtime => {
            println!("{}", runtime_support_code(&config)?);
        }

        Commands::Check { file } => {
            let source = read_input(file.as_deref())?;
            let program = parse_program(&source)?;
            let diagnostics = validate_program(&program, &source);
            let errors = diagnostics.iter().filter(|d| d.is_error()).count();
            for diagnostic in &diagnostics {
                eprintln!("{}", diagnostic);
            }
            if errors > 0 {
                anyhow::bail!("{} error(s) found", errors);
            }
            println!("✓ No errors ({} warning(s))", diagnostics.len());
        }

        Commands::Ast { file } => {
            let source = read_input(file.as_deref())?;
            let program = parse_program(&source)?;
            println!("{}", serde_json::to_string_pretty(&program)?);
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<RewriterConfig> {
    let mut config = RewriterConfig::load(cli.config.as_deref())?;
    if cli.no_validate {
        config.validate = false;
    }
    if cli.no_echo {
        config.echo_function_source = false;
    }
    Ok(config)
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("failed to read stdin")?;
            Ok(source)
        }
    }
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rewrite_command() {
        let cli = Cli::parse_from([
            "async-rewriter",
            "--no-echo",
            "rewrite",
            "script.js",
            "-o",
            "out.js",
        ]);
        assert!(cli.no_echo);
        match cli.command {
            Commands::Rewrite { file, output, .. } => {
                assert_eq!(file, Some(PathBuf::from("script.js")));
                assert_eq!(output, Some(PathBuf::from("out.js")));
            }
            _ => panic!("expected rewrite"),
        }
    }

    #[test]
    fn test_json_conflicts_with_runtime_prefix() {
        let result = Cli::try_parse_from([
            "async-rewriter",
            "rewrite",
            "--json",
            "--with-runtime",
            "rt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

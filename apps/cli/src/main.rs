//! `newton` - parse and dimension-check Newton expression files
//!
//! Each file holds `;`-separated expressions. A file that fails to parse is
//! reported and skipped; the remaining files are still processed.

mod logging;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use newton_parser::{Engine, ExpressionKind, Scope};
use report::OutputFormat;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "newton", version, about = "Dimensional analysis for Newton expressions")]
struct Args {
    /// Expression files to process
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// JSON scope configuration (dimensions, constants, quantities)
    #[arg(long, value_name = "PATH")]
    scope: Option<PathBuf>,

    /// Parse files as numeric expressions instead of quantity expressions
    #[arg(long)]
    numeric: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn load_scope(path: Option<&Path>) -> Result<Scope> {
    let Some(path) = path else {
        return Ok(Scope::si());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scope file {}", path.display()))?;
    Scope::from_json(&json).with_context(|| format!("Invalid scope file {}", path.display()))
}

fn process_file(
    engine: &Engine,
    path: &Path,
    kind: ExpressionKind,
    format: OutputFormat,
) -> Result<String> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let statements = engine
        .compile_statements(&source, kind)
        .with_context(|| format!("Failed to compile {}", path.display()))?;

    tracing::info!(
        file = %path.display(),
        statements = statements.len(),
        "Processed file"
    );
    Ok(report::render(&path.display().to_string(), &statements, format))
}

fn run(args: &Args) -> Result<usize> {
    let scope = load_scope(args.scope.as_deref())?;
    tracing::info!(
        dimensions = scope.dimensions().len(),
        bindings = scope.len(),
        "Scope loaded"
    );

    let engine = Engine::new(scope);
    let kind = if args.numeric {
        ExpressionKind::Numeric
    } else {
        ExpressionKind::Quantity
    };

    let mut failures = 0;
    for path in &args.files {
        match process_file(&engine, path, kind, args.format) {
            Ok(output) => print!("{}", output),
            Err(e) => {
                failures += 1;
                tracing::error!(
                    file = %path.display(),
                    error = %format!("{:#}", e),
                    "Skipping file"
                );
                eprintln!("error: {:#}", e);
            }
        }
    }
    Ok(failures)
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init_logging(args.verbose, args.log_json) {
        eprintln!("error: failed to initialize logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failures) => {
            tracing::warn!(failures, total = args.files.len(), "Some files failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

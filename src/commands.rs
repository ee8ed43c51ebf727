//! commands.rs
//!
//! Command-line surface and the `generate` pipeline.
//!
//! Responsibilities:
//! - Parse flags and resolve the provider configuration
//! - Run scan → extract → filter → generate → write in order
//! - Report progress on stdout
//!
//! Non-responsibilities:
//! - Provider request/response shapes (see `llm::client`)
//! - File naming rules (see `testgen::materialize`)

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use crate::config::{self, Provider, ProviderOverrides};
use crate::discovery::FunctionDiscovery;
use crate::error::{GenerateError, WriteError};
use crate::llm::{LlmClient, TextCompletion};
use crate::testgen::{print_results, write_results, OutputLayout, TestGenerator, WriteOptions};

#[derive(Parser, Debug)]
#[command(
    name = "pytestgen",
    version,
    about = "PyTest-Gen - AI-Powered Test-Case Generator for Python"
)]
pub struct Cli {
    #[arg(short, long, global = true, default_value_t = false, help = "Enable debug logging")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Generate pytest test cases for Python functions.
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(
        long,
        default_value = ".",
        value_parser = existing_dir,
        help = "Project directory to scan"
    )]
    pub project_dir: PathBuf,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, help = "OpenAI API key")]
    pub api_key: Option<String>,

    #[arg(long, help = "Maximum number of untested functions to send to the model")]
    pub max_functions: Option<usize>,

    #[arg(long, help = "Maximum number of files to scan")]
    pub max_files: Option<usize>,

    #[arg(long, default_value_t = false, help = "Append to existing test files instead of skipping them")]
    pub overwrite: bool,

    #[arg(long, help = "LLM model to use [default: gpt-4]")]
    pub model: Option<String>,

    #[arg(
        long,
        default_value_t = false,
        help = "Print generated tests to the console instead of writing files"
    )]
    pub dry_run: bool,

    #[arg(
        long,
        default_value = "tests",
        help = "Directory to write generated test files (default: ./tests)"
    )]
    pub output_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputLayout::Module, help = "One test file per module or per function")]
    pub layout: OutputLayout,

    #[arg(long, value_enum, help = "LLM provider [default: openai]")]
    pub provider: Option<Provider>,

    #[arg(long, help = "Override the provider endpoint (OpenAI-compatible servers)")]
    pub base_url: Option<String>,

    #[arg(long = "exclude", value_name = "GLOB", help = "Skip paths matching this glob, relative to the project (repeatable)")]
    pub excludes: Vec<String>,

    #[arg(long, default_value_t = false, help = "Also collect methods and nested functions")]
    pub include_nested: bool,

    #[arg(long, help = "HTTP timeout per request in seconds [default: 60]")]
    pub timeout_secs: Option<u64>,

    #[arg(long, help = "Provider defaults file [default: <config dir>/pytestgen/llm.json]")]
    pub config: Option<PathBuf>,
}

impl GenerateArgs {
    fn overrides(&self) -> ProviderOverrides {
        ProviderOverrides {
            provider: self.provider,
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

/* ============================================================
   Entry points
   ============================================================ */

pub fn dispatch(cli: Cli) -> ExitCode {
    let result = match cli.command {
        CliCommand::Generate(args) => run_generate(&args),
    };

    report_outcome(result, &mut io::stdout().lock())
}

/// Map a run outcome to the process exit code, printing fatal errors.
fn report_outcome(result: Result<(), GenerateError>, out: &mut impl Write) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = writeln!(out, "Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Resolve configuration, build the HTTP client and run the pipeline.
pub fn run_generate(args: &GenerateArgs) -> Result<(), GenerateError> {
    let path = args.config.clone().unwrap_or_else(config::config_path);
    let file_cfg = config::load_file_config(&path).unwrap_or_else(|e| {
        tracing::warn!("ignoring provider defaults: {e}");
        config::FileConfig::default()
    });

    let provider_cfg = config::resolve(args.overrides(), file_cfg)?;
    let model = provider_cfg.model.clone();
    let client = LlmClient::new(provider_cfg)?;

    let stdout = io::stdout();
    execute(args, &model, &client, &mut stdout.lock())
}

/// The pipeline proper, with the completion backend and console injected.
pub fn execute(
    args: &GenerateArgs,
    model: &str,
    backend: impl TextCompletion,
    out: &mut impl Write,
) -> Result<(), GenerateError> {
    let project = absolute(&args.project_dir);
    say(out, format!("🔍 Scanning project at {}", project.display()))?;
    say(out, format!("🤖 Using model: {model}"))?;

    let mut discovery = FunctionDiscovery::new(&project)?
        .with_excludes(&args.excludes)?
        .include_nested(args.include_nested);

    let found = discovery.discover(args.max_files)?.len();
    let mut untested = discovery.untested();
    tracing::info!(functions = found, untested = untested.len(), "discovery finished");

    if untested.is_empty() {
        say(out, "✅ All functions have tests. No new tests needed!".into())?;
        return Ok(());
    }

    if let Some(cap) = args.max_functions {
        if untested.len() > cap {
            tracing::info!("limiting generation to {cap} of {} functions", untested.len());
            untested.truncate(cap);
        }
    }

    say(out, format!("Found {} untested functions", untested.len()))?;

    let results = TestGenerator::new(backend).generate_tests(&untested);

    if args.dry_run {
        print_results(&results, out)?;
        return Ok(());
    }

    let opts = WriteOptions {
        output_dir: absolute(&args.output_dir),
        layout: args.layout,
        overwrite: args.overwrite,
    };
    let report = write_results(&results, &opts, out)?;

    say(
        out,
        format!(
            "{} file(s) written, {} skipped, {} failed",
            report.written.len(),
            report.skipped.len(),
            report.failed.len()
        ),
    )?;

    Ok(())
}

/* ============================================================
   Helpers
   ============================================================ */

fn existing_dir(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("directory '{raw}' does not exist"))
    }
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn say(out: &mut impl Write, line: String) -> Result<(), WriteError> {
    writeln!(out, "{line}").map_err(WriteError::Console)
}

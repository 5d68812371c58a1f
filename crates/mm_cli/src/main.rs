// crates/mm_cli/src/main.rs
//
// Wires up: exit codes, typed error mapping, logging, and the two
// subcommands (`run` writes artifacts, `validate` stops at the consistency gate).

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    /// Bad flags, malformed input, or a failed consistency check.
    pub const VALIDATION: i32 = 2;
    pub const IO: i32 = 4;
    /// Allocation failure or unusable configuration.
    pub const CONFIG: i32 = 5;
}

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use args::{check_out_dir, Cli, CliError, Command, InputArgs};
use mm_core::Params;
use mm_io::IoError;
use mm_pipeline::PipelineError;

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    Validation(String),
    Io(String),
    Config(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) | MainError::Io(m) | MainError::Config(m) => f.write_str(m),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let outcome = match &cli.command {
        Command::Run(run) => run_once(&run.inputs, &run.out),
        Command::Validate(inputs) => validate_only(inputs),
    };

    let rc = match outcome {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("mm: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// `RUST_LOG` wins; otherwise `info`, or `warn` with `--quiet`.
fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_once(inputs: &InputArgs, out: &Path) -> Result<(), MainError> {
    let out = check_out_dir(out).map_err(map_cli_err)?;
    let paths = inputs.input_paths().map_err(map_cli_err)?;
    let params = load_params(inputs)?;

    let loaded = mm_pipeline::load_inputs(&paths, &params).map_err(map_pipeline_err)?;
    let outputs = mm_pipeline::run(&loaded, &params).map_err(map_pipeline_err)?;
    mm_pipeline::write_outputs(&out, &outputs).map_err(map_pipeline_err)?;

    info!(out = %out.display(), "run: artifacts written");
    Ok(())
}

fn validate_only(inputs: &InputArgs) -> Result<(), MainError> {
    let paths = inputs.input_paths().map_err(map_cli_err)?;
    let params = load_params(inputs)?;

    let loaded = mm_pipeline::load_inputs(&paths, &params).map_err(map_pipeline_err)?;
    let constituencies = mm_pipeline::prepare(&loaded, &params).map_err(map_pipeline_err)?;

    info!(constituencies = constituencies.len(), "validate: inputs OK");
    Ok(())
}

/// Params file (if any), then flag overrides.
fn load_params(inputs: &InputArgs) -> Result<Params, MainError> {
    let base = match &inputs.params {
        Some(p) => mm_io::loader::load_params(p).map_err(|e| match e {
            IoError::Path(m) => MainError::Io(format!("params: {m}")),
            other => MainError::Config(format!("params: {other}")),
        })?,
        None => Params::default(),
    };
    let params = inputs.apply_overrides(base);
    info!(
        variant = %params.variant,
        matcher = %params.matcher,
        ambiguity = %params.ambiguity,
        "params"
    );
    Ok(params)
}

fn map_error(e: &MainError) -> i32 {
    match e {
        MainError::Validation(_) => exitcodes::VALIDATION,
        MainError::Io(_) => exitcodes::IO,
        MainError::Config(_) => exitcodes::CONFIG,
    }
}

fn map_cli_err(e: CliError) -> MainError {
    match e {
        CliError::NotFound(_) => MainError::Io(e.to_string()),
        CliError::NonLocalPath(_) => MainError::Validation(e.to_string()),
    }
}

/// Translate `PipelineError` into exit-code buckets.
fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Io(IoError::Path(m)) => MainError::Io(m),
        PipelineError::Io(other) => MainError::Validation(other.to_string()),
        e @ (PipelineError::Load(_) | PipelineError::Aggregate(_) | PipelineError::Validate(_)) => {
            MainError::Validation(e.to_string())
        }
        e @ (PipelineError::Allocate(_) | PipelineError::Config(_)) => MainError::Config(e.to_string()),
    }
}

#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use argoq::cli::app::{Cli, Command, RuntimeArgs};
use argoq::cli::commands;
use argoq::config::RuntimePaths;
use argoq::models::QueryEnvelopeCommandFailure;
use clap::Parser;
use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_RUNTIME_FAILURE: i32 = 1;
const EXIT_VALIDATION_FAILURE: i32 = 2;
const EXIT_USAGE_ERROR: i32 = 64;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return exit_code_for_parse_error(error),
    };
    init_tracing();
    let command_name = command_name(&cli.command);
    tracing::info!("argoq: starting `{command_name}`");

    match execute(cli) {
        Ok(()) => {
            tracing::info!("argoq: completed `{command_name}` (exit_code={EXIT_SUCCESS})");
            EXIT_SUCCESS
        }
        Err(error) => {
            let exit_code = classify_runtime_error(&error);
            match error.downcast_ref::<QueryEnvelopeCommandFailure>() {
                Some(failure) => println!("{failure}"),
                None => eprintln!("{error:#}"),
            }
            tracing::error!("argoq: failed `{command_name}` (exit_code={exit_code})");
            exit_code
        }
    }
}

/// Diagnostics go to stderr so stdout carries only the JSON envelope.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("argoq=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Compile(args) => {
            let runtime_paths = resolve_runtime_paths(&cli.runtime)?;
            commands::compile::run(&args, &runtime_paths)
        }
        Command::Context(args) => {
            let runtime_paths = resolve_runtime_paths(&cli.runtime)?;
            commands::context::run(&args, &runtime_paths)
        }
        Command::Locations(args) => commands::locations::run(&args),
        Command::Schema(args) => commands::schema::run(&args),
    }
}

fn classify_runtime_error(error: &anyhow::Error) -> i32 {
    if error
        .downcast_ref::<QueryEnvelopeCommandFailure>()
        .is_some_and(QueryEnvelopeCommandFailure::is_validation)
    {
        EXIT_VALIDATION_FAILURE
    } else {
        EXIT_RUNTIME_FAILURE
    }
}

fn exit_code_for_parse_error(error: clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = error.print();
            EXIT_SUCCESS
        }
        _ => {
            let _ = error.print();
            EXIT_USAGE_ERROR
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Compile(_) => "compile",
        Command::Context(_) => "context",
        Command::Locations(_) => "locations",
        Command::Schema(_) => "schema",
    }
}

fn resolve_runtime_paths(args: &RuntimeArgs) -> Result<RuntimePaths> {
    let home_dir = match &args.home_dir {
        Some(path) => path.clone(),
        None => std::env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("HOME is not set; pass --home-dir"))?,
    };

    let cwd = match &args.cwd {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };

    argoq::config::resolve_runtime_paths(&home_dir, &cwd)
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::commands::{
    compile::CompileArgs, context::ContextArgs, locations::LocationsArgs, schema::SchemaArgs,
};

#[derive(Debug, Parser)]
#[command(
    name = "argoq",
    version,
    about = "Compile Argo float intents into read-only SQL"
)]
pub struct Cli {
    #[command(flatten)]
    pub runtime: RuntimeArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct RuntimeArgs {
    #[arg(long, global = true, value_name = "PATH")]
    pub home_dir: Option<PathBuf>,

    #[arg(long, global = true, value_name = "PATH")]
    pub cwd: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compile one intent into a query envelope.
    Compile(CompileArgs),
    /// Show the columns and date bounds a catalog database reports.
    Context(ContextArgs),
    /// List the gazetteer of named places.
    Locations(LocationsArgs),
    /// Print the JSON Schema of the intent document.
    Schema(SchemaArgs),
}

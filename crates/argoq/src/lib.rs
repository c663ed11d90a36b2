#![forbid(unsafe_code)]

pub mod catalog;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod geo;
pub mod location;
pub mod models;
pub mod time_clause;
pub mod utils;

pub use catalog::{ColumnCatalog, ColumnSet, FactColumn};
pub use cli::app::{Cli, Command};
pub use compiler::{Archetype, CompileError, QueryText, compile};
pub use models::{Aggregation, DbContext, Intent, QueryType};

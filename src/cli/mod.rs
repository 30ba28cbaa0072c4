pub mod config;
pub mod list;
pub mod resolve;
pub mod run;

use crate::config::resolve::{resolve_config, CliOverrides};
use crate::config::HarvestConfig;
use crate::errors::{HarvestError, Result};
use crate::output::OutputFormat;
use crate::resolve::CompilerKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "apiharvest",
    version,
    about = "Resolve and package the protobuf closure of every API in a source tree"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch sources, then resolve and package every API in the catalog
    Run(run::RunArgs),
    /// Print the resolved file set of one API without writing anything
    Resolve(resolve::ResolveArgs),
    /// List the APIs in the catalog
    List(list::ListArgs),
    /// Inspect configuration
    Config(config::ConfigArgs),
}

/// Flags shared by every command that reads the source tree.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Working directory (defaults to current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Directory dependencies are cloned into
    #[arg(long)]
    pub deps_dir: Option<PathBuf>,

    /// Use the dependencies already on disk
    #[arg(long)]
    pub no_fetch: bool,

    /// Import resolver to use
    #[arg(long)]
    pub compiler: Option<CompilerKind>,

    /// Path of the protoc binary
    #[arg(long)]
    pub protoc: Option<PathBuf>,

    /// Output format
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Suppress progress output
    #[arg(long)]
    pub quiet: bool,
}

impl SourceArgs {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            out: None,
            deps_dir: self.deps_dir.clone(),
            compiler: self.compiler,
            protoc: self.protoc.clone(),
            format: self.format,
            quiet: self.quiet,
            no_fetch: self.no_fetch,
        }
    }

    /// Resolve configuration for this invocation.
    pub fn load(&self, overrides: CliOverrides) -> Result<HarvestConfig> {
        let working_dir = resolve_working_dir(&self.path)?;
        resolve_config(&working_dir, &overrides)
    }
}

/// Dispatch to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run::run(&args),
        Commands::Resolve(args) => resolve::run(&args),
        Commands::List(args) => list::run(&args),
        Commands::Config(args) => config::run(&args),
    }
}

pub(crate) fn resolve_working_dir(path: &Option<PathBuf>) -> Result<PathBuf> {
    let p = path.clone().unwrap_or_else(|| PathBuf::from("."));
    p.canonicalize()
        .map_err(|_| HarvestError::Config(format!("Invalid path: {}", p.display())))
}

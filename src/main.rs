mod assemble;
mod catalog;
mod cli;
mod config;
mod errors;
mod fetch;
mod locate;
mod metadata;
mod output;
mod pipeline;
mod resolve;

use clap::Parser;
use miette::Result;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();
    cli::dispatch(cli)?;
    Ok(())
}

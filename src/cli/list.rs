use crate::cli::SourceArgs;
use crate::errors::Result;
use crate::output::{json, text, OutputFormat};
use crate::pipeline;
use clap::Args;

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub sources: SourceArgs,
}

pub fn run(args: &ListArgs) -> Result<()> {
    let config = args.sources.load(args.sources.overrides())?;
    let index = pipeline::prepare_sources(&config)?;
    let entries = pipeline::select_entries(&index, &[])?;

    let mut stdout = std::io::stdout().lock();
    let suffix = &config.registry.service_suffix;
    match config.format {
        OutputFormat::Text => text::write_catalog_text(&mut stdout, &entries, suffix),
        OutputFormat::Json => json::write_catalog_json(&mut stdout, &entries, suffix),
    }
}

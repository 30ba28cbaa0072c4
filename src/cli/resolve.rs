use crate::cli::SourceArgs;
use crate::errors::Result;
use crate::locate::PhysicalFileIndex;
use crate::output::{json, text, OutputFormat};
use crate::pipeline::{self, Pipeline};
use crate::resolve::{create_compiler, Resolution};
use clap::Args;

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Catalog id of the API (e.g. google.pubsub.v1)
    pub api: String,

    #[command(flatten)]
    pub sources: SourceArgs,
}

pub fn run(args: &ResolveArgs) -> Result<()> {
    let config = args.sources.load(args.sources.overrides())?;
    let index = pipeline::prepare_sources(&config)?;
    let entries = pipeline::select_entries(&index, std::slice::from_ref(&args.api))?;

    // Resolution alone needs no physical index.
    let files_index = PhysicalFileIndex::default();
    let compiler = create_compiler(&config.compiler);
    let pipeline = Pipeline::new(&config, &files_index, compiler.as_ref());

    let mut stdout = std::io::stdout().lock();
    for entry in entries {
        let resolution = pipeline.resolve(entry)?;
        let files = match resolution {
            Resolution::Empty => {
                tracing::warn!("{} has no definition files", entry.id);
                None
            }
            Resolution::Resolved(files) => Some(files),
        };
        match config.format {
            OutputFormat::Text => {
                if let Some(ref files) = files {
                    text::write_resolved_text(&mut stdout, files)?;
                }
            }
            OutputFormat::Json => json::write_resolved_json(&mut stdout, entry, files.as_ref())?,
        }
    }
    Ok(())
}

use crate::cli::SourceArgs;
use crate::errors::Result;
use crate::locate::PhysicalFileIndex;
use crate::output::json::{self, RunMetadata};
use crate::output::{text, OutputFormat};
use crate::pipeline::{self, Pipeline};
use crate::resolve::create_compiler;
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Output root for the packaged APIs
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Only process these catalog ids (repeatable)
    #[arg(long = "api")]
    pub apis: Vec<String>,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let start = Instant::now();

    let mut overrides = args.sources.overrides();
    overrides.out = args.out.clone();
    let config = args.sources.load(overrides)?;

    let catalog = pipeline::prepare_sources(&config)?;
    let entries = pipeline::select_entries(&catalog, &args.apis)?;

    let index = PhysicalFileIndex::build(&config.sources.deps_dir, &config.sources.exclude)?;
    if index.is_empty() {
        tracing::warn!(
            "No definition files under {}",
            config.sources.deps_dir.display()
        );
    }

    let compiler = create_compiler(&config.compiler);
    let pipeline = Pipeline::new(&config, &index, compiler.as_ref());

    let progress = if !config.quiet {
        let pb = indicatif::ProgressBar::new(entries.len() as u64);
        pb.set_style(
            indicatif::ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} APIs {msg}")
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let report = pipeline.run(entries.iter().copied(), |api| {
        if let Some(ref pb) = progress {
            pb.set_message(api.id.clone());
            pb.inc(1);
        }
    });

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let metadata = RunMetadata {
        catalog: config.sources.catalog_path(),
        out: config.out.clone(),
        compiler: config.compiler.kind.to_string(),
        updated: config.updated.clone(),
        completed: report.completed(),
        skipped: report.skipped(),
        failed: report.failed(),
        elapsed_ms: start.elapsed().as_millis() as u64,
    };

    let mut stdout = std::io::stdout().lock();
    match config.format {
        OutputFormat::Text => text::write_run_text(&mut stdout, &report, &metadata)?,
        OutputFormat::Json => json::write_run_json(&mut stdout, &report, metadata)?,
    }

    if report.has_failures() {
        drop(stdout);
        std::process::exit(1);
    }
    Ok(())
}

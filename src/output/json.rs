use crate::catalog::ApiCatalogEntry;
use crate::errors::Result;
use crate::pipeline::{ApiReport, RunReport};
use crate::resolve::ResolvedFileSet;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
pub struct RunOutput<'a> {
    pub metadata: RunMetadata,
    pub apis: &'a [ApiReport],
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub catalog: PathBuf,
    pub out: PathBuf,
    pub compiler: String,
    pub updated: String,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Serialize)]
struct ResolveOutput<'a> {
    id: &'a str,
    directory: &'a str,
    files: Option<&'a ResolvedFileSet>,
}

#[derive(Debug, Serialize)]
struct CatalogRow<'a> {
    id: &'a str,
    api_id: String,
    version: &'a str,
    directory: &'a str,
    title: &'a str,
}

/// Write a run report as JSON.
pub fn write_run_json<W: Write>(
    writer: &mut W,
    report: &RunReport,
    metadata: RunMetadata,
) -> Result<()> {
    let output = RunOutput {
        metadata,
        apis: &report.apis,
    };
    serde_json::to_writer_pretty(&mut *writer, &output)?;
    writeln!(writer)?;
    Ok(())
}

/// Write one API's resolved files as JSON; `files` is None when the API has
/// no definition files.
pub fn write_resolved_json<W: Write>(
    writer: &mut W,
    entry: &ApiCatalogEntry,
    files: Option<&ResolvedFileSet>,
) -> Result<()> {
    let output = ResolveOutput {
        id: &entry.id,
        directory: &entry.directory,
        files,
    };
    serde_json::to_writer_pretty(&mut *writer, &output)?;
    writeln!(writer)?;
    Ok(())
}

/// Write catalog entries as a JSON array.
pub fn write_catalog_json<W: Write>(
    writer: &mut W,
    entries: &[&ApiCatalogEntry],
    service_suffix: &str,
) -> Result<()> {
    let rows: Vec<CatalogRow> = entries
        .iter()
        .map(|entry| CatalogRow {
            id: &entry.id,
            api_id: entry.api_id(service_suffix),
            version: &entry.version,
            directory: &entry.directory,
            title: &entry.title,
        })
        .collect();
    serde_json::to_writer_pretty(&mut *writer, &rows)?;
    writeln!(writer)?;
    Ok(())
}

use crate::catalog::ApiCatalogEntry;
use crate::errors::Result;
use crate::output::json::RunMetadata;
use crate::pipeline::{ApiOutcome, ApiReport, RunReport};
use crate::resolve::ResolvedFileSet;
use std::io::Write;

/// One line describing an API's outcome.
pub fn format_api_line(report: &ApiReport) -> String {
    let label = format!("{} {}", report.api_id, report.version);
    match &report.outcome {
        ApiOutcome::Completed { files, artifact } => {
            format!("  ok      {label}: {files} files -> {}", artifact.display())
        }
        ApiOutcome::Skipped { reason } => format!("  skipped {label}: {reason}"),
        ApiOutcome::Failed { error } => format!("  FAILED  {label}: {error}"),
    }
}

/// Write a run report as human-readable text.
pub fn write_run_text<W: Write>(
    writer: &mut W,
    report: &RunReport,
    metadata: &RunMetadata,
) -> Result<()> {
    writeln!(writer, "API Harvest Report")?;
    writeln!(writer, "==================")?;
    writeln!(writer)?;
    writeln!(writer, "Catalog:   {}", metadata.catalog.display())?;
    writeln!(writer, "Output:    {}", metadata.out.display())?;
    writeln!(writer, "Compiler:  {}", metadata.compiler)?;
    writeln!(writer, "Updated:   {}", metadata.updated)?;
    writeln!(writer)?;

    for api in &report.apis {
        // Errors can span lines (compiler diagnostics); keep the first here.
        let line = format_api_line(api);
        writeln!(writer, "{}", line.lines().next().unwrap_or_default())?;
    }
    writeln!(writer)?;

    writeln!(
        writer,
        "Completed: {}  Skipped: {}  Failed: {}  ({:.2}s)",
        metadata.completed,
        metadata.skipped,
        metadata.failed,
        metadata.elapsed_ms as f64 / 1000.0
    )?;
    Ok(())
}

/// Write resolved logical paths, one per line.
pub fn write_resolved_text<W: Write>(writer: &mut W, files: &ResolvedFileSet) -> Result<()> {
    for path in files.iter() {
        writeln!(writer, "{path}")?;
    }
    Ok(())
}

/// Write catalog entries as aligned columns.
pub fn write_catalog_text<W: Write>(
    writer: &mut W,
    entries: &[&ApiCatalogEntry],
    service_suffix: &str,
) -> Result<()> {
    let width = entries.iter().map(|e| e.id.len()).max().unwrap_or(0);
    for entry in entries {
        writeln!(
            writer,
            "{:<width$}  {:<8}  {:<40}  {}",
            entry.id,
            entry.version,
            entry.directory,
            entry.api_id(service_suffix),
        )?;
    }
    Ok(())
}

use crate::config::HarvestConfig;
use std::io::Write;

/// Render `config show` output.
pub fn render_show<W: Write>(w: &mut W, config: &HarvestConfig) -> std::io::Result<()> {
    if config.loaded_files.is_empty() {
        writeln!(w, "Loaded config files: (none)")?;
    } else {
        writeln!(w, "Loaded config files:")?;
        for (i, path) in config.loaded_files.iter().enumerate() {
            writeln!(w, "  {}. {}", i + 1, path.display())?;
        }
    }
    writeln!(w)?;

    writeln!(w, "Resolved settings:")?;
    for (key, source) in config.provenance.sorted_entries() {
        let value = get_value_for_key(config, key);
        writeln!(w, "  {key}: {value} <- {source}")?;
    }
    writeln!(w)?;
    writeln!(w, "Run date: {}", config.updated)?;

    Ok(())
}

fn list(values: &[String]) -> String {
    if values.is_empty() {
        "(none)".to_string()
    } else {
        values.join(", ")
    }
}

fn get_value_for_key(config: &HarvestConfig, key: &str) -> String {
    match key {
        "sources.deps_dir" => config.sources.deps_dir.display().to_string(),
        "sources.tree" => config.sources.tree.clone(),
        "sources.dependencies" => list(&config.sources.dependencies),
        "sources.catalog" => config.sources.catalog.clone(),
        "sources.exclude" => list(&config.sources.exclude),
        "sources.fetch" => config.sources.fetch.to_string(),
        "output.dir" => config.out.display().to_string(),
        "output.format" => config.format.to_string(),
        "output.quiet" => config.quiet.to_string(),
        "registry.provider" => config.registry.provider.clone(),
        "registry.source" => config.registry.source.clone(),
        "registry.service_suffix" => config.registry.service_suffix.clone(),
        "compiler.kind" => config.compiler.kind.to_string(),
        "compiler.protoc" => config.compiler.protoc.display().to_string(),
        "compiler.timeout_secs" => config.compiler.timeout.as_secs().to_string(),
        "compiler.builtin_prefix" => config.compiler.builtin_prefix.clone(),
        _ => "(unknown)".to_string(),
    }
}

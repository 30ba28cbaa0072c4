use crate::config::provenance::{ProvenanceMap, Source};
use crate::config::schema::FileConfig;
use crate::config::HarvestConfig;
use crate::errors::{HarvestError, Result};
use crate::output::OutputFormat;
use crate::resolve::CompilerKind;
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use std::time::Duration;

const PROJECT_CONFIG: &str = ".apiharvest.toml";

/// CLI overrides extracted from command arguments.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub out: Option<PathBuf>,
    pub deps_dir: Option<PathBuf>,
    pub compiler: Option<CompilerKind>,
    pub protoc: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub quiet: bool,
    pub no_fetch: bool,
}

/// Resolve configuration by applying layers bottom-up:
/// 1. Built-in defaults
/// 2. User config (~/.config/apiharvest/config.toml)
/// 3. Project config (nearest .apiharvest.toml walking up from working_dir)
/// 4. Environment variables
/// 5. CLI overrides
///
/// Relative directories are anchored at `working_dir`.
pub fn resolve_config(working_dir: &Path, cli: &CliOverrides) -> Result<HarvestConfig> {
    let mut prov = ProvenanceMap::new();
    let mut loaded_files = Vec::new();
    let mut config = HarvestConfig::default();

    set_all_default_provenance(&mut prov);

    if let Some(user_config_path) = find_user_config() {
        if user_config_path.exists() {
            let file_config = load_file_config(&user_config_path)?;
            apply_file_config(
                &mut config,
                &file_config,
                Source::UserConfig(user_config_path.clone()),
                &mut prov,
            )?;
            loaded_files.push(user_config_path);
        }
    }

    if let Some(project_config_path) = find_project_config(working_dir) {
        let file_config = load_file_config(&project_config_path)?;
        apply_file_config(
            &mut config,
            &file_config,
            Source::ProjectConfig(project_config_path.clone()),
            &mut prov,
        )?;
        loaded_files.push(project_config_path);
    }

    apply_env_vars(&mut config, &mut prov)?;
    apply_cli_overrides(&mut config, cli, &mut prov);

    config.sources.deps_dir = anchor(working_dir, &config.sources.deps_dir);
    config.out = anchor(working_dir, &config.out);
    config.provenance = prov;
    config.loaded_files = loaded_files;

    Ok(config)
}

fn anchor(working_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path).map_err(|_| {
        HarvestError::Config(format!("Could not read config file: {}", path.display()))
    })?;
    FileConfig::from_toml(&content).map_err(|e| {
        HarvestError::Config(format!("Invalid config file {}: {e}", path.display()))
    })
}

fn find_user_config() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("apiharvest").join("config.toml"))
}

fn find_project_config(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(PROJECT_CONFIG);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

fn set_all_default_provenance(prov: &mut ProvenanceMap) {
    let defaults = [
        "sources.deps_dir",
        "sources.tree",
        "sources.dependencies",
        "sources.catalog",
        "sources.exclude",
        "sources.fetch",
        "output.dir",
        "output.format",
        "output.quiet",
        "registry.provider",
        "registry.source",
        "registry.service_suffix",
        "compiler.kind",
        "compiler.protoc",
        "compiler.timeout_secs",
        "compiler.builtin_prefix",
    ];
    for key in defaults {
        prov.set(key, Source::Default);
    }
}

fn parse_format(value: &str) -> Result<OutputFormat> {
    OutputFormat::from_str(value, true)
        .map_err(|_| HarvestError::Config(format!("unknown output format: {value}")))
}

fn parse_compiler(value: &str) -> Result<CompilerKind> {
    CompilerKind::from_str(value, true)
        .map_err(|_| HarvestError::Config(format!("unknown compiler: {value}")))
}

fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

fn apply_file_config(
    config: &mut HarvestConfig,
    file: &FileConfig,
    source: Source,
    prov: &mut ProvenanceMap,
) -> Result<()> {
    let sources = &file.sources;
    if let Some(ref deps_dir) = sources.deps_dir {
        config.sources.deps_dir = PathBuf::from(deps_dir);
        prov.set("sources.deps_dir", source.clone());
    }
    if let Some(ref tree) = sources.tree {
        config.sources.tree = tree.clone();
        prov.set("sources.tree", source.clone());
    }
    if let Some(ref deps) = sources.dependencies {
        config.sources.dependencies = deps.clone();
        prov.set("sources.dependencies", source.clone());
    }
    if let Some(ref catalog) = sources.catalog {
        config.sources.catalog = catalog.clone();
        prov.set("sources.catalog", source.clone());
    }
    if let Some(ref exclude) = sources.exclude {
        config.sources.exclude = exclude.clone();
        prov.set("sources.exclude", source.clone());
    }
    if let Some(fetch) = sources.fetch {
        config.sources.fetch = fetch;
        prov.set("sources.fetch", source.clone());
    }

    let output = &file.output;
    if let Some(ref dir) = output.dir {
        config.out = PathBuf::from(dir);
        prov.set("output.dir", source.clone());
    }
    if let Some(ref format) = output.format {
        config.format = parse_format(format)?;
        prov.set("output.format", source.clone());
    }
    if let Some(quiet) = output.quiet {
        config.quiet = quiet;
        prov.set("output.quiet", source.clone());
    }

    let registry = &file.registry;
    if let Some(ref provider) = registry.provider {
        config.registry.provider = provider.clone();
        prov.set("registry.provider", source.clone());
    }
    if let Some(ref label) = registry.source {
        config.registry.source = label.clone();
        prov.set("registry.source", source.clone());
    }
    if let Some(ref suffix) = registry.service_suffix {
        config.registry.service_suffix = suffix.clone();
        prov.set("registry.service_suffix", source.clone());
    }

    let compiler = &file.compiler;
    if let Some(ref kind) = compiler.kind {
        config.compiler.kind = parse_compiler(kind)?;
        prov.set("compiler.kind", source.clone());
    }
    if let Some(ref protoc) = compiler.protoc {
        config.compiler.protoc = PathBuf::from(protoc);
        prov.set("compiler.protoc", source.clone());
    }
    if let Some(secs) = compiler.timeout_secs {
        config.compiler.timeout = Duration::from_secs(secs);
        prov.set("compiler.timeout_secs", source.clone());
    }
    if let Some(ref prefix) = compiler.builtin_prefix {
        config.compiler.builtin_prefix = prefix.clone();
        prov.set("compiler.builtin_prefix", source);
    }

    Ok(())
}

fn apply_env_vars(config: &mut HarvestConfig, prov: &mut ProvenanceMap) -> Result<()> {
    if let Ok(val) = std::env::var("APIHARVEST_OUT") {
        config.out = PathBuf::from(val);
        prov.set("output.dir", Source::EnvVar("APIHARVEST_OUT".into()));
    }
    if let Ok(val) = std::env::var("APIHARVEST_DEPS_DIR") {
        config.sources.deps_dir = PathBuf::from(val);
        prov.set("sources.deps_dir", Source::EnvVar("APIHARVEST_DEPS_DIR".into()));
    }
    if let Ok(val) = std::env::var("APIHARVEST_PROVIDER") {
        config.registry.provider = val;
        prov.set("registry.provider", Source::EnvVar("APIHARVEST_PROVIDER".into()));
    }
    if let Ok(val) = std::env::var("APIHARVEST_COMPILER") {
        config.compiler.kind = parse_compiler(&val)?;
        prov.set("compiler.kind", Source::EnvVar("APIHARVEST_COMPILER".into()));
    }
    if let Ok(val) = std::env::var("APIHARVEST_PROTOC") {
        config.compiler.protoc = PathBuf::from(val);
        prov.set("compiler.protoc", Source::EnvVar("APIHARVEST_PROTOC".into()));
    }
    if let Ok(val) = std::env::var("APIHARVEST_COMPILER_TIMEOUT") {
        let secs = val.parse::<u64>().map_err(|_| {
            HarvestError::Config(format!("APIHARVEST_COMPILER_TIMEOUT is not a number: {val}"))
        })?;
        config.compiler.timeout = Duration::from_secs(secs);
        prov.set(
            "compiler.timeout_secs",
            Source::EnvVar("APIHARVEST_COMPILER_TIMEOUT".into()),
        );
    }
    if let Ok(val) = std::env::var("APIHARVEST_FORMAT") {
        config.format = parse_format(&val)?;
        prov.set("output.format", Source::EnvVar("APIHARVEST_FORMAT".into()));
    }
    if let Ok(val) = std::env::var("APIHARVEST_QUIET") {
        config.quiet = parse_flag(&val);
        prov.set("output.quiet", Source::EnvVar("APIHARVEST_QUIET".into()));
    }
    if let Ok(val) = std::env::var("APIHARVEST_NO_FETCH") {
        config.sources.fetch = !parse_flag(&val);
        prov.set("sources.fetch", Source::EnvVar("APIHARVEST_NO_FETCH".into()));
    }
    Ok(())
}

fn apply_cli_overrides(config: &mut HarvestConfig, cli: &CliOverrides, prov: &mut ProvenanceMap) {
    if let Some(ref out) = cli.out {
        config.out = out.clone();
        prov.set("output.dir", Source::CliFlag("--out".into()));
    }
    if let Some(ref deps_dir) = cli.deps_dir {
        config.sources.deps_dir = deps_dir.clone();
        prov.set("sources.deps_dir", Source::CliFlag("--deps-dir".into()));
    }
    if let Some(kind) = cli.compiler {
        config.compiler.kind = kind;
        prov.set("compiler.kind", Source::CliFlag("--compiler".into()));
    }
    if let Some(ref protoc) = cli.protoc {
        config.compiler.protoc = protoc.clone();
        prov.set("compiler.protoc", Source::CliFlag("--protoc".into()));
    }
    if let Some(format) = cli.format {
        config.format = format;
        prov.set("output.format", Source::CliFlag("--format".into()));
    }
    if cli.quiet {
        config.quiet = true;
        prov.set("output.quiet", Source::CliFlag("--quiet".into()));
    }
    if cli.no_fetch {
        config.sources.fetch = false;
        prov.set("sources.fetch", Source::CliFlag("--no-fetch".into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_only() {
        let tmp = tempfile::tempdir().unwrap();
        let config = resolve_config(tmp.path(), &CliOverrides::default()).unwrap();

        assert_eq!(config.sources.deps_dir, tmp.path().join("deps"));
        assert_eq!(config.out, tmp.path().join("apis/google.com"));
        assert_eq!(config.registry.provider, "google.com");
        assert_eq!(config.compiler.kind, CompilerKind::Protoc);
        assert_eq!(config.compiler.builtin_prefix, "google/protobuf/");
        assert!(config.sources.fetch);
        assert_eq!(
            config.provenance.get("registry.provider"),
            Some(&Source::Default)
        );
    }

    #[test]
    fn project_config_then_cli() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(PROJECT_CONFIG),
            r#"
[output]
dir = "/srv/registry"
format = "json"

[compiler]
kind = "scan"
timeout_secs = 5
"#,
        )
        .unwrap();
        let nested = tmp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let cli = CliOverrides {
            format: Some(OutputFormat::Text),
            no_fetch: true,
            ..Default::default()
        };
        let config = resolve_config(&nested, &cli).unwrap();

        assert_eq!(config.out, PathBuf::from("/srv/registry"));
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.compiler.kind, CompilerKind::Scan);
        assert_eq!(config.compiler.timeout, Duration::from_secs(5));
        assert!(!config.sources.fetch);
        assert!(matches!(
            config.provenance.get("output.dir"),
            Some(Source::ProjectConfig(_))
        ));
        assert_eq!(
            config.provenance.get("output.format"),
            Some(&Source::CliFlag("--format".into()))
        );
        assert_eq!(config.loaded_files.len(), 1);
    }

    #[test]
    fn invalid_compiler_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(PROJECT_CONFIG),
            "[compiler]\nkind = \"javac\"\n",
        )
        .unwrap();
        let err = resolve_config(tmp.path(), &CliOverrides::default()).unwrap_err();
        assert!(matches!(err, HarvestError::Config(_)));
    }
}

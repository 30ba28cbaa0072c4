pub mod provenance;
pub mod resolve;
pub mod schema;
pub mod show;

use crate::output::OutputFormat;
use crate::resolve::CompilerKind;
use provenance::ProvenanceMap;
use std::path::PathBuf;
use std::time::Duration;

/// Fully resolved run configuration. Every pipeline component reads its
/// settings from here instead of process-wide constants.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub sources: SourcesConfig,
    pub registry: RegistryConfig,
    pub compiler: CompilerConfig,

    // Output
    pub out: PathBuf,
    pub format: OutputFormat,
    pub quiet: bool,

    /// Local date (`YYYY-MM-DD`) stamped on every record of this run.
    pub updated: String,

    // Provenance
    pub provenance: ProvenanceMap,
    pub loaded_files: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SourcesConfig {
    /// Directory the dependencies are cloned into.
    pub deps_dir: PathBuf,
    /// Name of the checkout that holds the catalog and the API directories.
    pub tree: String,
    /// Remote repositories, each `URL` or `URL;subdir`.
    pub dependencies: Vec<String>,
    pub catalog: String,
    pub exclude: Vec<String>,
    pub fetch: bool,
}

impl SourcesConfig {
    /// Root of the source tree the catalog describes.
    pub fn tree_root(&self) -> PathBuf {
        self.deps_dir.join(&self.tree)
    }

    /// Path of the catalog document.
    pub fn catalog_path(&self) -> PathBuf {
        self.tree_root().join(&self.catalog)
    }

    /// Import base directories, one per dependency.
    pub fn import_paths(&self) -> Vec<PathBuf> {
        self.dependencies
            .iter()
            .map(|dep| crate::fetch::import_dir(&self.deps_dir, dep))
            .collect()
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            deps_dir: PathBuf::from("deps"),
            tree: "googleapis".to_string(),
            dependencies: vec!["https://github.com/googleapis/googleapis".to_string()],
            catalog: "api-index-v1.json".to_string(),
            exclude: Vec::new(),
            fetch: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub provider: String,
    pub source: String,
    /// Suffix trimmed from `nameInServiceConfig` to form the API id.
    pub service_suffix: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            provider: "google.com".to_string(),
            source: "import-google-apis".to_string(),
            service_suffix: ".googleapis.com".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompilerConfig {
    pub kind: CompilerKind,
    pub protoc: PathBuf,
    pub timeout: Duration,
    /// Logical prefix of files that are always available and never packaged.
    pub builtin_prefix: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            kind: CompilerKind::Protoc,
            protoc: PathBuf::from("protoc"),
            timeout: Duration::from_secs(300),
            builtin_prefix: "google/protobuf/".to_string(),
        }
    }
}

impl HarvestConfig {
    /// Provider with dots replaced, as used in record labels.
    pub fn provider_label(&self) -> String {
        self.registry.provider.replace('.', "-")
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            sources: SourcesConfig::default(),
            registry: RegistryConfig::default(),
            compiler: CompilerConfig::default(),
            out: PathBuf::from("apis/google.com"),
            format: OutputFormat::default(),
            quiet: false,
            updated: chrono::Local::now().format("%Y-%m-%d").to_string(),
            provenance: ProvenanceMap::new(),
            loaded_files: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths() {
        let config = HarvestConfig::default();
        assert_eq!(
            config.sources.catalog_path(),
            PathBuf::from("deps/googleapis/api-index-v1.json")
        );
        assert_eq!(
            config.sources.import_paths(),
            vec![PathBuf::from("deps/googleapis")]
        );
        assert_eq!(config.provider_label(), "google-com");
    }

    #[test]
    fn updated_is_a_date() {
        let config = HarvestConfig::default();
        assert_eq!(config.updated.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&config.updated, "%Y-%m-%d").is_ok());
    }
}

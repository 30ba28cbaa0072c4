use serde::Deserialize;

/// TOML-deserializable config file. All fields are Option for layered merging.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub sources: SourcesFileConfig,
    #[serde(default)]
    pub output: OutputFileConfig,
    #[serde(default)]
    pub registry: RegistryFileConfig,
    #[serde(default)]
    pub compiler: CompilerFileConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SourcesFileConfig {
    pub deps_dir: Option<String>,
    pub tree: Option<String>,
    pub dependencies: Option<Vec<String>>,
    pub catalog: Option<String>,
    pub exclude: Option<Vec<String>>,
    pub fetch: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputFileConfig {
    pub dir: Option<String>,
    pub format: Option<String>,
    pub quiet: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RegistryFileConfig {
    pub provider: Option<String>,
    pub source: Option<String>,
    pub service_suffix: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct CompilerFileConfig {
    pub kind: Option<String>,
    pub protoc: Option<String>,
    pub timeout_secs: Option<u64>,
    pub builtin_prefix: Option<String>,
}

impl FileConfig {
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

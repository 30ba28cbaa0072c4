use crate::errors::{HarvestError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The catalog document listing every published API.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiIndex {
    #[serde(default)]
    pub apis: Vec<ApiCatalogEntry>,
}

/// One declared API/version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiCatalogEntry {
    pub id: String,
    /// Directory of the API, relative to the source tree root.
    pub directory: String,
    pub version: String,
    pub major_version: String,
    pub host_name: String,
    pub title: String,
    pub description: String,
    pub import_directories: Vec<String>,
    /// Service configuration file, relative to `directory`.
    pub config_file: String,
    pub name_in_service_config: String,
}

impl ApiCatalogEntry {
    /// Registry API id: the service name with the hosting suffix trimmed.
    pub fn api_id(&self, service_suffix: &str) -> String {
        self.name_in_service_config
            .strip_suffix(service_suffix)
            .unwrap_or(&self.name_in_service_config)
            .to_string()
    }

    pub fn version_id(&self) -> &str {
        &self.version
    }

    /// Human title, always carrying the provider brand.
    pub fn display_name(&self) -> String {
        if self.title.starts_with("Google") {
            self.title.clone()
        } else {
            format!("Google {}", self.title)
        }
    }
}

/// Read and parse the catalog at `path`.
///
/// The catalog is published as JSON; it is read with the YAML parser, which
/// accepts JSON as well as hand-written YAML catalogs.
pub fn load_index(path: &Path) -> Result<ApiIndex> {
    let content = std::fs::read_to_string(path).map_err(|e| HarvestError::read(path, e))?;
    parse_index(&content).map_err(|e| HarvestError::Catalog {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn parse_index(content: &str) -> std::result::Result<ApiIndex, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

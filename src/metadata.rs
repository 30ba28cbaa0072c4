use crate::catalog::ApiCatalogEntry;
use crate::config::HarvestConfig;
use crate::errors::{HarvestError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const REGISTRY_V1: &str = "apigeeregistry/v1";

/// Spec id of every packaged artifact.
pub const SPEC_ID: &str = "protos";

/// File name of every record.
pub const RECORD_FILE: &str = "info.yaml";

const SPEC_FILE_NAME: &str = "protos.zip";
const SPEC_MIME_TYPE: &str = "application/x.protobuf+zip";

/// Registry identifiers of one catalog entry, and where its output lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactIds {
    pub api_id: String,
    pub version_id: String,
}

impl ArtifactIds {
    pub fn new(entry: &ApiCatalogEntry, service_suffix: &str) -> Self {
        Self {
            api_id: entry.api_id(service_suffix),
            version_id: entry.version_id().to_string(),
        }
    }

    /// Registry name of the API: `<provider>-<api id>`.
    pub fn api_name(&self, provider: &str) -> String {
        format!("{provider}-{}", self.api_id)
    }

    pub fn api_dir(&self, out: &Path) -> PathBuf {
        out.join(&self.api_id)
    }

    pub fn version_dir(&self, out: &Path) -> PathBuf {
        self.api_dir(out).join(&self.version_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    #[serde(rename = "API")]
    Api,
    Version,
    Spec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// A registry document: header, identifying metadata and kind-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord<D> {
    pub api_version: String,
    pub kind: RecordKind,
    pub metadata: RecordMetadata,
    pub data: D,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiData {
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionData {
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecData {
    pub file_name: String,
    pub mime_type: String,
}

/// The three records describing one API version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    pub api: MetadataRecord<ApiData>,
    pub version: MetadataRecord<VersionData>,
    pub spec: MetadataRecord<SpecData>,
}

fn record<D>(kind: RecordKind, metadata: RecordMetadata, data: D) -> MetadataRecord<D> {
    MetadataRecord {
        api_version: REGISTRY_V1.to_string(),
        kind,
        metadata,
        data,
    }
}

impl RecordSet {
    /// Build the records for `entry`. `commit` is the source revision, when
    /// known.
    pub fn build(entry: &ApiCatalogEntry, config: &HarvestConfig, commit: Option<&str>) -> Self {
        let ids = ArtifactIds::new(entry, &config.registry.service_suffix);
        let api_name = ids.api_name(&config.registry.provider);
        let labels: BTreeMap<String, String> = [
            ("provider", config.provider_label()),
            ("updated", config.updated.clone()),
            ("source", config.registry.source.clone()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let mut annotations: BTreeMap<String, String> = [
            ("config", entry.config_file.as_str()),
            ("directory", entry.directory.as_str()),
            ("host", entry.host_name.as_str()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        if let Some(commit) = commit {
            annotations.insert("commit".to_string(), commit.to_string());
        }

        let api = record(
            RecordKind::Api,
            RecordMetadata {
                parent: String::new(),
                name: api_name.clone(),
                labels: labels.clone(),
                annotations: BTreeMap::new(),
            },
            ApiData {
                display_name: entry.display_name(),
            },
        );
        let version = record(
            RecordKind::Version,
            RecordMetadata {
                parent: format!("apis/{api_name}"),
                name: ids.version_id.clone(),
                labels: labels.clone(),
                annotations: BTreeMap::new(),
            },
            VersionData {
                display_name: ids.version_id.clone(),
            },
        );
        let spec = record(
            RecordKind::Spec,
            RecordMetadata {
                parent: format!("apis/{api_name}/versions/{}", ids.version_id),
                name: SPEC_ID.to_string(),
                labels,
                annotations,
            },
            SpecData {
                file_name: SPEC_FILE_NAME.to_string(),
                mime_type: SPEC_MIME_TYPE.to_string(),
            },
        );

        Self { api, version, spec }
    }

    /// Write the Version and Spec records into a version directory.
    pub fn write_version_records(&self, version_dir: &Path) -> Result<()> {
        write_record(&version_dir.join(RECORD_FILE), &self.version)?;
        write_record(&version_dir.join(SPEC_ID).join(RECORD_FILE), &self.spec)
    }

    /// Write the API record into the API directory. Later versions of the
    /// same API overwrite it.
    pub fn write_api_record(&self, api_dir: &Path) -> Result<()> {
        write_record(&api_dir.join(RECORD_FILE), &self.api)
    }
}

pub fn encode_yaml<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}

fn write_record<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let yaml = encode_yaml(record)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| HarvestError::write(parent, e))?;
    }
    std::fs::write(path, yaml).map_err(|e| HarvestError::write(path, e))
}

use crate::errors::{HarvestError, Result};
use prost::Message;
use prost_types::FileDescriptorSet;
use serde::Serialize;

/// One file processed by a compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDescription {
    /// Logical path, as other files import it.
    pub name: String,
    /// Logical paths this file imports.
    pub dependencies: Vec<String>,
}

/// Everything a compilation touched: roots and their transitive imports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompiledDescription {
    pub files: Vec<FileDescription>,
}

impl CompiledDescription {
    /// Decode a serialized `google.protobuf.FileDescriptorSet`.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let set = FileDescriptorSet::decode(bytes)
            .map_err(|e| HarvestError::compile(format!("unreadable descriptor set: {e}")))?;
        let files = set
            .file
            .into_iter()
            .map(|file| FileDescription {
                name: file.name.unwrap_or_default(),
                dependencies: file.dependency,
            })
            .filter(|file| !file.name.is_empty())
            .collect();
        Ok(Self { files })
    }
}

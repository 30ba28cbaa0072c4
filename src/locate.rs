use crate::errors::{HarvestError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extension of interface-definition files.
pub const PROTO_EXTENSION: &str = "proto";

fn build_exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

fn is_proto(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(PROTO_EXTENSION)
}

/// Discover every `.proto` file under `root`.
///
/// - Does not follow symlinks
/// - Applies exclude glob patterns to the path relative to `root`
/// - Fails on unreadable directories instead of skipping them
/// - Returns sorted paths for deterministic output
pub fn discover_protos(root: &Path, exclude_patterns: &[String]) -> Result<Vec<PathBuf>> {
    let exclude_set = build_exclude_set(exclude_patterns)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            HarvestError::read(path, source)
        })?;

        let path = entry.path();
        if !entry.file_type().is_file() || !is_proto(path) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if exclude_set.is_match(relative) {
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Every definition file found under the source root, searchable by the
/// logical (import) path other files use to reference it.
///
/// Built once per run and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct PhysicalFileIndex {
    files: Vec<PathBuf>,
    by_name: HashMap<OsString, Vec<usize>>,
}

impl PhysicalFileIndex {
    /// Scan `root` and index every definition file found.
    pub fn build(root: &Path, exclude_patterns: &[String]) -> Result<Self> {
        let files = discover_protos(root, exclude_patterns)?;
        tracing::info!(
            "Indexed {} definition files under {}",
            files.len(),
            root.display()
        );
        Ok(Self::from_files(files))
    }

    pub fn from_files(mut files: Vec<PathBuf>) -> Self {
        files.sort();
        files.dedup();
        let mut by_name: HashMap<OsString, Vec<usize>> = HashMap::new();
        for (i, file) in files.iter().enumerate() {
            if let Some(name) = file.file_name() {
                by_name.entry(name.to_os_string()).or_default().push(i);
            }
        }
        Self { files, by_name }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Find the physical file whose trailing path components equal `logical`.
    ///
    /// When several physical files match, the first in sorted order wins.
    pub fn locate(&self, logical: &str) -> Result<&Path> {
        let logical_path = Path::new(logical);
        let not_found = || HarvestError::NotFound {
            logical: logical.to_string(),
        };
        let name = logical_path.file_name().ok_or_else(not_found)?;

        let mut matches = self
            .by_name
            .get(name)
            .into_iter()
            .flatten()
            .map(|&i| self.files[i].as_path())
            .filter(|candidate| candidate.ends_with(logical_path));

        let found = matches.next().ok_or_else(not_found)?;
        let others = matches.count();
        if others > 0 {
            tracing::debug!(
                "{logical} matches {} physical files, using {}",
                others + 1,
                found.display()
            );
        }
        Ok(found)
    }
}

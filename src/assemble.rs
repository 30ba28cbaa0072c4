use crate::catalog::ApiCatalogEntry;
use crate::errors::{HarvestError, Result};
use crate::locate::PhysicalFileIndex;
use crate::metadata::SPEC_ID;
use crate::resolve::ResolvedFileSet;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Copy `src` to `dest`, creating the destination directory as needed.
pub fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    let bytes = std::fs::read(src).map_err(|e| HarvestError::read(src, e))?;
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| HarvestError::write(parent, e))?;
    }
    std::fs::write(dest, bytes).map_err(|e| HarvestError::write(dest, e))
}

/// A version directory being built next to its final location. Nothing is
/// visible at the final path until [`StagedArtifact::commit`]; dropping an
/// uncommitted artifact removes the staging directory.
#[derive(Debug)]
pub struct StagedArtifact {
    staging: TempDir,
    target: PathBuf,
}

impl StagedArtifact {
    /// Start staging the contents of `version_dir`.
    pub fn begin(version_dir: &Path) -> Result<Self> {
        let parent = version_dir.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| HarvestError::write(parent, e))?;
        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(parent)
            .map_err(|e| HarvestError::write(parent, e))?;
        Ok(Self {
            staging,
            target: version_dir.to_path_buf(),
        })
    }

    /// Root of the staged version directory.
    pub fn path(&self) -> &Path {
        self.staging.path()
    }

    pub fn spec_dir(&self) -> PathBuf {
        self.path().join(SPEC_ID)
    }

    /// Copy every resolved file to its logical path under the spec directory.
    /// A logical path without a physical file fails the whole artifact.
    pub fn add_resolved_files(
        &self,
        index: &PhysicalFileIndex,
        files: &ResolvedFileSet,
    ) -> Result<usize> {
        let spec_dir = self.spec_dir();
        for logical in files.iter() {
            let physical = index.locate(logical)?;
            tracing::debug!("{logical} <- {}", physical.display());
            copy_file(physical, &spec_dir.join(logical))?;
        }
        Ok(files.len())
    }

    /// Copy the entry's service configuration into the spec directory, at
    /// `<directory>/<configFile>`. Entries without one are left as they are.
    pub fn add_service_config(
        &self,
        entry: &ApiCatalogEntry,
        tree_root: &Path,
    ) -> Result<Option<PathBuf>> {
        if entry.config_file.is_empty() {
            tracing::debug!("{} declares no service config", entry.id);
            return Ok(None);
        }
        let relative = Path::new(&entry.directory).join(&entry.config_file);
        copy_file(&tree_root.join(&relative), &self.spec_dir().join(&relative))?;
        Ok(Some(relative))
    }

    /// Replace whatever is at the final location with the staged directory.
    /// A previous artifact is moved aside first and only removed once the
    /// staged one is in place; if that rename fails it is moved back.
    pub fn commit(self) -> Result<PathBuf> {
        let parent = self.target.parent().unwrap_or(Path::new("."));
        let previous = if self.target.exists() {
            let aside = tempfile::Builder::new()
                .prefix(".previous-")
                .tempdir_in(parent)
                .map_err(|e| HarvestError::write(parent, e))?;
            let moved = aside.path().join("artifact");
            std::fs::rename(&self.target, &moved)
                .map_err(|e| HarvestError::write(&self.target, e))?;
            Some((aside, moved))
        } else {
            None
        };

        if let Err(e) = std::fs::rename(self.staging.path(), &self.target) {
            if let Some((_, ref moved)) = previous {
                if let Err(restore) = std::fs::rename(moved, &self.target) {
                    tracing::error!(
                        "could not restore {} from {}: {restore}",
                        self.target.display(),
                        moved.display()
                    );
                }
            }
            return Err(HarvestError::write(&self.target, e));
        }
        // Dropping the aside directory removes the previous artifact.
        drop(previous);
        Ok(self.target)
    }

    /// Copy the staged tree over the directory already at the final location.
    /// Files there that the staged tree does not contain are kept.
    pub fn merge(self) -> Result<PathBuf> {
        let staging = self.staging.path();
        for entry in WalkDir::new(staging).follow_links(false) {
            let entry = entry.map_err(|e| HarvestError::read(staging, e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(staging).unwrap_or(entry.path());
            copy_file(entry.path(), &self.target.join(relative))?;
        }
        Ok(self.target)
    }
}

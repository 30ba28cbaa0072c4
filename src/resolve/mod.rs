pub mod descriptor;
pub mod protoc;
pub mod scan;

use crate::config::CompilerConfig;
use crate::errors::{HarvestError, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub use descriptor::{CompiledDescription, FileDescription};
pub use protoc::ProtocCompiler;
pub use scan::ScanCompiler;

/// Compiles a set of root files against import bases and describes every
/// file the compilation touched, roots and transitive imports alike.
pub trait SchemaCompiler {
    fn compile(&self, roots: &[PathBuf], import_paths: &[PathBuf]) -> Result<CompiledDescription>;
}

/// Which compiler implementation a run uses.
#[derive(Debug, Default, Clone, Copy, ValueEnum, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompilerKind {
    /// External `protoc` process
    #[default]
    Protoc,
    /// In-process import scanner
    Scan,
}

impl std::fmt::Display for CompilerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompilerKind::Protoc => write!(f, "protoc"),
            CompilerKind::Scan => write!(f, "scan"),
        }
    }
}

/// Build the compiler selected by configuration.
pub fn create_compiler(config: &CompilerConfig) -> Box<dyn SchemaCompiler> {
    match config.kind {
        CompilerKind::Protoc => Box::new(ProtocCompiler::new(
            config.protoc.clone(),
            config.timeout,
        )),
        CompilerKind::Scan => Box::new(ScanCompiler::with_bundled_prefix(
            config.builtin_prefix.clone(),
        )),
    }
}

/// Sorted, duplicate-free logical paths an API transitively requires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedFileSet(Vec<String>);

impl ResolvedFileSet {
    /// Collect the files named by `description`, dropping anything under
    /// `builtin_prefix`.
    pub fn from_description(description: &CompiledDescription, builtin_prefix: &str) -> Self {
        let names: BTreeSet<&str> = description
            .files
            .iter()
            .map(|f| f.name.as_str())
            .filter(|name| builtin_prefix.is_empty() || !name.starts_with(builtin_prefix))
            .collect();
        Self(names.into_iter().map(str::to_string).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, logical: &str) -> bool {
        self.0.binary_search_by(|p| p.as_str().cmp(logical)).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Outcome of resolving one API directory.
#[derive(Debug)]
pub enum Resolution {
    /// The directory holds no definition files; nothing to package.
    Empty,
    Resolved(ResolvedFileSet),
}

/// Computes the closure of an API's definition files.
pub struct Resolver<'a> {
    compiler: &'a dyn SchemaCompiler,
    import_paths: Vec<PathBuf>,
    builtin_prefix: String,
}

impl<'a> Resolver<'a> {
    pub fn new(
        compiler: &'a dyn SchemaCompiler,
        import_paths: Vec<PathBuf>,
        builtin_prefix: impl Into<String>,
    ) -> Self {
        Self {
            compiler,
            import_paths,
            builtin_prefix: builtin_prefix.into(),
        }
    }

    /// Resolve every definition file under `container`.
    pub fn resolve_dir(&self, container: &Path) -> Result<Resolution> {
        if !container.is_dir() {
            tracing::debug!("{} is not a directory", container.display());
            return Ok(Resolution::Empty);
        }
        let roots = crate::locate::discover_protos(container, &[])?;
        if roots.is_empty() {
            return Ok(Resolution::Empty);
        }
        self.resolve_roots(&roots).map(Resolution::Resolved)
    }

    /// Resolve the closure of explicit root files.
    pub fn resolve_roots(&self, roots: &[PathBuf]) -> Result<ResolvedFileSet> {
        tracing::debug!("Compiling {} root files", roots.len());
        let description = self.compiler.compile(roots, &self.import_paths)?;
        if description.files.is_empty() {
            return Err(HarvestError::compile(
                "compiler produced an empty description",
            ));
        }
        Ok(ResolvedFileSet::from_description(
            &description,
            &self.builtin_prefix,
        ))
    }
}

use crate::assemble::StagedArtifact;
use crate::catalog::{self, ApiCatalogEntry, ApiIndex};
use crate::config::HarvestConfig;
use crate::errors::{HarvestError, Result};
use crate::fetch;
use crate::locate::PhysicalFileIndex;
use crate::metadata::{ArtifactIds, RecordSet};
use crate::resolve::{Resolution, Resolver, SchemaCompiler};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::PathBuf;

/// Fetch the sources (when enabled) and load the catalog. Failures here
/// abort the run: there is nothing to process without them.
pub fn prepare_sources(config: &HarvestConfig) -> Result<ApiIndex> {
    if config.sources.fetch {
        fetch::fetch_dependencies(&config.sources.deps_dir, &config.sources.dependencies)?;
    }
    let index = catalog::load_index(&config.sources.catalog_path())?;
    tracing::info!("{} APIs in catalog", index.apis.len());
    Ok(index)
}

/// Restrict the catalog to the ids in `only`, keeping catalog order. An empty
/// selection keeps every entry.
pub fn select_entries<'a>(
    index: &'a ApiIndex,
    only: &[String],
) -> Result<Vec<&'a ApiCatalogEntry>> {
    if only.is_empty() {
        return Ok(index.apis.iter().collect());
    }
    if let Some(unknown) = only
        .iter()
        .find(|id| !index.apis.iter().any(|entry| &entry.id == *id))
    {
        return Err(HarvestError::Config(format!("API {unknown} is not in the catalog")));
    }
    Ok(index
        .apis
        .iter()
        .filter(|entry| only.contains(&entry.id))
        .collect())
}

/// What happened to one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApiOutcome {
    Completed { files: usize, artifact: PathBuf },
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiReport {
    pub id: String,
    pub api_id: String,
    pub version: String,
    #[serde(flatten)]
    pub outcome: ApiOutcome,
}

/// Outcomes of every API attempted in a run, in processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub apis: Vec<ApiReport>,
}

impl RunReport {
    fn count(&self, pred: impl Fn(&ApiOutcome) -> bool) -> usize {
        self.apis.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, ApiOutcome::Completed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ApiOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ApiOutcome::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}

/// Resolves, assembles and describes catalog entries one at a time.
pub struct Pipeline<'a> {
    config: &'a HarvestConfig,
    index: &'a PhysicalFileIndex,
    resolver: Resolver<'a>,
    commit: Option<String>,
    /// Version directories written by this pipeline so far.
    written: RefCell<HashSet<PathBuf>>,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a HarvestConfig,
        index: &'a PhysicalFileIndex,
        compiler: &'a dyn SchemaCompiler,
    ) -> Self {
        let resolver = Resolver::new(
            compiler,
            config.sources.import_paths(),
            config.compiler.builtin_prefix.clone(),
        );
        let commit = fetch::commit_hash(&config.sources.tree_root()).ok();
        if let Some(ref commit) = commit {
            tracing::info!("Source tree at commit {commit}");
        }
        Self {
            config,
            index,
            resolver,
            commit,
            written: RefCell::new(HashSet::new()),
        }
    }

    /// Resolve the closure of one entry without writing anything.
    pub fn resolve(&self, entry: &ApiCatalogEntry) -> Result<Resolution> {
        let container = self.config.sources.tree_root().join(&entry.directory);
        self.resolver.resolve_dir(&container)
    }

    /// Produce the artifact and records of one entry.
    pub fn process(&self, entry: &ApiCatalogEntry) -> Result<ApiOutcome> {
        let files = match self.resolve(entry)? {
            Resolution::Empty => {
                tracing::warn!("{} has no protos, skipping", entry.title);
                return Ok(ApiOutcome::Skipped {
                    reason: format!("no definition files under {}", entry.directory),
                });
            }
            Resolution::Resolved(files) => files,
        };

        let ids = ArtifactIds::new(entry, &self.config.registry.service_suffix);
        let records = RecordSet::build(entry, self.config, self.commit.as_deref());

        let version_dir = ids.version_dir(&self.config.out);
        let staged = StagedArtifact::begin(&version_dir)?;
        let copied = staged.add_resolved_files(self.index, &files)?;
        staged.add_service_config(entry, &self.config.sources.tree_root())?;
        records.write_version_records(staged.path())?;
        records.write_api_record(&ids.api_dir(&self.config.out))?;

        // Entries sharing a service name and version share a directory; a
        // later one adds to what an earlier one wrote in this run.
        let shared = self.written.borrow().contains(&version_dir);
        let artifact = if shared {
            tracing::info!(
                "{} shares {} with an earlier API, merging",
                entry.id,
                version_dir.display()
            );
            staged.merge()?
        } else {
            staged.commit()?
        };
        self.written.borrow_mut().insert(artifact.clone());

        tracing::info!(
            "{} {}: {copied} files -> {}",
            ids.api_id,
            ids.version_id,
            artifact.display()
        );
        Ok(ApiOutcome::Completed {
            files: copied,
            artifact,
        })
    }

    /// Process every entry; a failing entry is recorded and the run moves on.
    pub fn run<'e>(
        &self,
        entries: impl IntoIterator<Item = &'e ApiCatalogEntry>,
        mut on_done: impl FnMut(&ApiReport),
    ) -> RunReport {
        let mut report = RunReport::default();
        for entry in entries {
            tracing::info!("Processing {} ({})", entry.id, entry.directory);
            let outcome = self.process(entry).unwrap_or_else(|e| {
                tracing::error!("error processing {}: {e}", entry.id);
                ApiOutcome::Failed {
                    error: e.to_string(),
                }
            });
            let api_report = ApiReport {
                id: entry.id.clone(),
                api_id: entry.api_id(&self.config.registry.service_suffix),
                version: entry.version.clone(),
                outcome,
            };
            on_done(&api_report);
            report.apis.push(api_report);
        }
        report
    }
}

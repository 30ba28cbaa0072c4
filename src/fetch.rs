use crate::errors::Result;
use git2::Repository;
use std::path::{Path, PathBuf};

/// Split a dependency entry (`URL` or `URL;subdir`) into its parts.
fn split_dependency(dep: &str) -> (&str, Option<&str>) {
    match dep.split_once(';') {
        Some((url, subdir)) if !subdir.is_empty() => (url, Some(subdir)),
        Some((url, _)) => (url, None),
        None => (dep, None),
    }
}

/// Directory name a repository is cloned into, as `git clone` would name it.
fn repo_name(url: &str) -> &str {
    let trimmed = url.trim_end_matches('/');
    let base = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    base.strip_suffix(".git").unwrap_or(base)
}

/// Local checkout of a dependency.
pub fn clone_target(deps_dir: &Path, dep: &str) -> PathBuf {
    let (url, _) = split_dependency(dep);
    deps_dir.join(repo_name(url))
}

/// Import base directory contributed by a dependency: its checkout, or the
/// declared subdirectory of it.
pub fn import_dir(deps_dir: &Path, dep: &str) -> PathBuf {
    let target = clone_target(deps_dir, dep);
    match split_dependency(dep).1 {
        Some(subdir) => target.join(subdir),
        None => target,
    }
}

/// Clone every dependency into `deps_dir`. Checkouts that already exist are
/// left untouched: nothing is re-fetched or updated.
pub fn fetch_dependencies(deps_dir: &Path, deps: &[String]) -> Result<()> {
    std::fs::create_dir_all(deps_dir)?;
    for dep in deps {
        let (url, _) = split_dependency(dep);
        let target = clone_target(deps_dir, dep);
        if target.exists() {
            tracing::debug!("{} already present, skipping clone", target.display());
            continue;
        }
        tracing::info!("Cloning {url} into {}", target.display());
        Repository::clone(url, &target)?;
    }
    Ok(())
}

/// HEAD commit of a checkout.
pub fn commit_hash(path: &Path) -> Result<String> {
    let repo = Repository::open(path)?;
    let commit = repo.head()?.peel_to_commit()?;
    Ok(commit.id().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_repo_with_commit(dir: &Path) -> String {
        let repo = Repository::init(dir).unwrap();
        std::fs::write(dir.join("a.proto"), "syntax = \"proto3\";\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("a.proto")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = git2::Signature::now("test", "test@example.com").unwrap();
        let oid = repo
            .commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap();
        oid.to_string()
    }

    #[test]
    fn target_and_import_dirs() {
        let deps = Path::new("deps");
        assert_eq!(
            clone_target(deps, "https://github.com/googleapis/googleapis"),
            PathBuf::from("deps/googleapis")
        );
        assert_eq!(
            clone_target(deps, "https://github.com/googleapis/api-common-protos.git"),
            PathBuf::from("deps/api-common-protos")
        );
        assert_eq!(
            import_dir(deps, "https://github.com/example/protos;src/main/proto"),
            PathBuf::from("deps/protos/src/main/proto")
        );
        assert_eq!(
            import_dir(deps, "git@github.com:example/protos.git"),
            PathBuf::from("deps/protos")
        );
    }

    #[test]
    fn clone_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let upstream = tmp.path().join("upstream").join("library");
        std::fs::create_dir_all(&upstream).unwrap();
        let head = init_repo_with_commit(&upstream);

        let deps_dir = tmp.path().join("deps");
        let deps = vec![upstream.to_string_lossy().to_string()];
        fetch_dependencies(&deps_dir, &deps).unwrap();

        let checkout = deps_dir.join("library");
        assert!(checkout.join("a.proto").exists());
        assert_eq!(commit_hash(&checkout).unwrap(), head);

        // A local edit survives a second fetch.
        std::fs::write(checkout.join("a.proto"), "edited").unwrap();
        fetch_dependencies(&deps_dir, &deps).unwrap();
        assert_eq!(
            std::fs::read_to_string(checkout.join("a.proto")).unwrap(),
            "edited"
        );
    }

    #[test]
    fn commit_hash_of_plain_dir_fails() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(commit_hash(tmp.path()).is_err());
    }
}

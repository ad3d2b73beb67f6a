//! engine::libgit2
//!
//! Production engine implementation over the `git2` crate.
//!
//! This is the **single doorway** to libgit2. No other module imports
//! `git2`; everything above it speaks [`SubmoduleEngine`]. Errors are
//! normalized into [`EngineError`] with the attempted operation attached,
//! except the lookup miss, which surfaces as `Ok(None)`.

use std::path::{Path, PathBuf};

use super::traits::{EngineError, SubmoduleEngine};

impl EngineError {
    /// Wrap a git2 error with the operation that was being attempted.
    fn from_git2(err: git2::Error, operation: &str) -> Self {
        EngineError::new(operation, err.message())
    }
}

/// Submodule engine backed by libgit2.
///
/// Holds the parent repository open for the engine's lifetime. Bare
/// repositories are rejected at construction: submodules live in a working
/// tree, and the add protocol needs a directory to populate.
pub struct GitEngine {
    repo: git2::Repository,
    workdir: PathBuf,
}

impl std::fmt::Debug for GitEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitEngine")
            .field("workdir", &self.workdir)
            .finish()
    }
}

impl GitEngine {
    /// Open the repository containing `path`.
    ///
    /// Uses `git2::Repository::discover`, so `path` can be any directory
    /// inside the repository.
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        let repo = git2::Repository::discover(path)
            .map_err(|e| EngineError::from_git2(e, "repository open"))?;
        Self::from_repository(repo)
    }

    /// Wrap an already opened repository.
    pub fn from_repository(repo: git2::Repository) -> Result<Self, EngineError> {
        let workdir = repo
            .workdir()
            .ok_or_else(|| {
                EngineError::new("repository open", "bare repository has no working directory")
            })?
            .to_path_buf();

        Ok(Self { repo, workdir })
    }

    /// Access the underlying repository.
    pub fn repository(&self) -> &git2::Repository {
        &self.repo
    }
}

impl SubmoduleEngine for GitEngine {
    type Handle<'a>
        = git2::Submodule<'a>
    where
        Self: 'a;

    type SubRepo = git2::Repository;

    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn add_setup(
        &self,
        url: &str,
        path: &str,
        use_gitlink: bool,
    ) -> Result<Self::Handle<'_>, EngineError> {
        self.repo
            .submodule(url, Path::new(path), use_gitlink)
            .map_err(|e| EngineError::from_git2(e, "submodule add setup"))
    }

    fn add_finalize<'a>(&self, handle: &mut Self::Handle<'a>) -> Result<(), EngineError> {
        handle
            .add_finalize()
            .map_err(|e| EngineError::from_git2(e, "submodule add finalize"))
    }

    fn add_to_index<'a>(
        &self,
        handle: &mut Self::Handle<'a>,
        write_index: bool,
    ) -> Result<(), EngineError> {
        handle
            .add_to_index(write_index)
            .map_err(|e| EngineError::from_git2(e, "submodule add to index"))
    }

    fn lookup(&self, name: &str) -> Result<Option<Self::Handle<'_>>, EngineError> {
        match self.repo.find_submodule(name) {
            Ok(handle) => Ok(Some(handle)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(EngineError::from_git2(e, "submodule lookup")),
        }
    }

    fn reload<'a>(&self, handle: &mut Self::Handle<'a>) -> Result<(), EngineError> {
        handle
            .reload(false)
            .map_err(|e| EngineError::from_git2(e, "submodule reload"))
    }

    fn path<'a>(&self, handle: &Self::Handle<'a>) -> String {
        handle.path().to_string_lossy().into_owned()
    }

    fn url<'a>(&self, handle: &Self::Handle<'a>) -> String {
        handle.url().unwrap_or_default().to_string()
    }

    fn names(&self) -> Result<Vec<String>, EngineError> {
        let submodules = self
            .repo
            .submodules()
            .map_err(|e| EngineError::from_git2(e, "submodule foreach"))?;

        // Names that are not valid UTF-8 are skipped rather than mangled.
        Ok(submodules
            .iter()
            .filter_map(|s| s.name())
            .map(str::to_string)
            .collect())
    }

    fn open_subrepo(&self, path: &Path) -> Result<Self::SubRepo, EngineError> {
        git2::Repository::open(path).map_err(|e| EngineError::from_git2(e, "subrepository open"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_non_repository_fails() {
        let dir = TempDir::new().unwrap();
        let result = GitEngine::open(dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn open_bare_repository_fails() {
        let dir = TempDir::new().unwrap();
        git2::Repository::init_bare(dir.path()).unwrap();

        let err = GitEngine::open(dir.path()).unwrap_err();
        assert_eq!(err.operation(), "repository open");
    }

    #[test]
    fn workdir_is_the_repository_root() {
        let dir = TempDir::new().unwrap();
        git2::Repository::init(dir.path()).unwrap();

        let engine = GitEngine::open(dir.path()).unwrap();
        assert_eq!(
            engine.workdir().canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn lookup_miss_is_none_not_an_error() {
        let dir = TempDir::new().unwrap();
        git2::Repository::init(dir.path()).unwrap();

        let engine = GitEngine::open(dir.path()).unwrap();
        assert!(engine.lookup("absent").unwrap().is_none());
    }
}

//! engine::mock
//!
//! Mock engine implementation for deterministic testing.
//!
//! # Design
//!
//! `MockEngine` keeps registrations in memory and records every native call
//! in an operation log, which is how tests verify the facade's discipline:
//! argument errors make zero engine calls, finalize never runs after a
//! failed populate, every handle is released exactly once and never touched
//! afterwards.
//!
//! Two behaviors exist purely to make invariants observable:
//!
//! - stale fields ([`MockEngine::set_stale`]): a raw lookup serves the stale
//!   snapshot until the handle is reloaded, so a missing reload shows up as
//!   wrong data instead of passing silently;
//! - use-after-release detection: any call on a released handle panics, and
//!   [`MockEngine::assert_handles_scoped`] re-checks the whole log.
//!
//! # Example
//!
//! ```
//! use gitmods::engine::{MockEngine, SubmoduleEngine};
//!
//! let engine = MockEngine::new();
//! engine.register("vendor/libfoo", "vendor/libfoo", "https://example.com/libfoo.git");
//!
//! assert_eq!(engine.names().unwrap(), vec!["vendor/libfoo".to_string()]);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::{EngineError, SubmoduleEngine};

/// Mock engine for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockEngine {
    /// Reported parent working directory; never touched on disk.
    workdir: PathBuf,
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockEngineInner>>,
}

#[derive(Debug, Default)]
struct MockEngineInner {
    /// Registrations in registration order.
    registrations: Vec<Registration>,
    /// Field snapshots for live handles.
    handles: HashMap<u64, HandleFields>,
    /// Handles that have been released.
    freed: HashSet<u64>,
    /// Next handle id to assign.
    next_handle: u64,
    /// Operation to fail (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// One registered submodule.
#[derive(Debug, Clone)]
struct Registration {
    name: String,
    path: String,
    url: String,
    /// Served to raw lookups in place of the real fields until reload.
    stale: Option<(String, String)>,
    finalized: bool,
}

/// Snapshot of fields a handle currently reads.
#[derive(Debug, Clone)]
struct HandleFields {
    name: String,
    path: String,
    url: String,
}

/// Transient reference into the mock's submodule table.
///
/// Deliberately not `Clone`: one handle, one release.
#[derive(Debug)]
pub struct MockHandle {
    id: u64,
}

/// Nested repository handed to populate callbacks.
///
/// Records its own disposal so tests can verify the sub-repository is
/// closed when the callback returns, on success or failure.
#[derive(Debug)]
pub struct MockSubRepo {
    path: PathBuf,
    inner: Arc<Mutex<MockEngineInner>>,
}

impl MockSubRepo {
    /// The working-directory path this sub-repository was opened at.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for MockSubRepo {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.operations.push(MockOperation::CloseSubRepo {
                path: self.path.clone(),
            });
        }
    }
}

/// Which operation should fail with an injected error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    AddSetup,
    AddFinalize,
    AddToIndex,
    Lookup,
    Reload,
    Foreach,
    OpenSubRepo,
}

impl FailOn {
    fn operation(self) -> &'static str {
        match self {
            FailOn::AddSetup => "submodule add setup",
            FailOn::AddFinalize => "submodule add finalize",
            FailOn::AddToIndex => "submodule add to index",
            FailOn::Lookup => "submodule lookup",
            FailOn::Reload => "submodule reload",
            FailOn::Foreach => "submodule foreach",
            FailOn::OpenSubRepo => "subrepository open",
        }
    }
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    AddSetup {
        handle: u64,
        url: String,
        path: String,
        use_gitlink: bool,
    },
    AddFinalize {
        handle: u64,
    },
    AddToIndex {
        handle: u64,
        write_index: bool,
    },
    Lookup {
        name: String,
        found: Option<u64>,
    },
    Reload {
        handle: u64,
    },
    Path {
        handle: u64,
    },
    Url {
        handle: u64,
    },
    Foreach,
    OpenSubRepo {
        path: PathBuf,
    },
    CloseSubRepo {
        path: PathBuf,
    },
    Free {
        handle: u64,
    },
}

impl MockOperation {
    /// The handle this operation read or wrote through, if any.
    fn handle_id(&self) -> Option<u64> {
        match self {
            MockOperation::AddSetup { handle, .. }
            | MockOperation::AddFinalize { handle }
            | MockOperation::AddToIndex { handle, .. }
            | MockOperation::Reload { handle }
            | MockOperation::Path { handle }
            | MockOperation::Url { handle }
            | MockOperation::Free { handle } => Some(*handle),
            _ => None,
        }
    }
}

impl MockEngine {
    /// Create an empty mock engine.
    pub fn new() -> Self {
        Self::with_workdir("/mock/workdir")
    }

    /// Create an empty mock engine reporting the given working directory.
    pub fn with_workdir(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            inner: Arc::new(Mutex::new(MockEngineInner::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockEngineInner> {
        self.inner.lock().expect("mock engine lock poisoned")
    }

    /// Seed a finalized registration, as if added in an earlier session.
    pub fn register(&self, name: &str, path: &str, url: &str) {
        self.lock().registrations.push(Registration {
            name: name.to_string(),
            path: path.to_string(),
            url: url.to_string(),
            stale: None,
            finalized: true,
        });
    }

    /// Remove a registration, simulating concurrent deregistration.
    pub fn unregister(&self, name: &str) {
        self.lock().registrations.retain(|r| r.name != name);
    }

    /// Serve stale fields to raw lookups of `name` until reload.
    pub fn set_stale(&self, name: &str, stale_path: &str, stale_url: &str) {
        let mut inner = self.lock();
        if let Some(reg) = inner.registrations.iter_mut().find(|r| r.name == name) {
            reg.stale = Some((stale_path.to_string(), stale_url.to_string()));
        }
    }

    /// Make the given operation fail with an injected error.
    pub fn fail_on(&self, point: FailOn) {
        self.lock().fail_on = Some(point);
    }

    /// Snapshot of every recorded operation, in call order.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Number of finalize calls recorded.
    pub fn finalize_count(&self) -> usize {
        self.lock()
            .operations
            .iter()
            .filter(|op| matches!(op, MockOperation::AddFinalize { .. }))
            .count()
    }

    /// Whether a registration for `name` exists (finalized or not).
    pub fn is_registered(&self, name: &str) -> bool {
        self.lock().registrations.iter().any(|r| r.name == name)
    }

    /// Whether the registration for `name` has been finalized.
    pub fn is_finalized(&self, name: &str) -> bool {
        self.lock()
            .registrations
            .iter()
            .any(|r| r.name == name && r.finalized)
    }

    /// Look up a raw handle, for tests that drive the engine directly.
    pub fn lookup_raw(&self, name: &str) -> Option<MockHandle> {
        self.lookup(name).ok().flatten()
    }

    /// Assert every acquired handle was released exactly once and never
    /// used after release.
    ///
    /// # Panics
    ///
    /// Panics when the operation log shows a leaked handle, a double
    /// release, or any call on a released handle.
    pub fn assert_handles_scoped(&self) {
        let inner = self.lock();
        let mut acquired: HashSet<u64> = HashSet::new();
        let mut freed: HashSet<u64> = HashSet::new();

        for op in &inner.operations {
            if let MockOperation::Free { handle } = op {
                assert!(freed.insert(*handle), "handle {handle} released twice");
                continue;
            }
            if let Some(id) = op.handle_id() {
                assert!(
                    !freed.contains(&id),
                    "operation {op:?} on released handle {id}"
                );
                acquired.insert(id);
            }
            if let MockOperation::Lookup {
                found: Some(id), ..
            } = op
            {
                acquired.insert(*id);
            }
        }

        for id in acquired {
            assert!(freed.contains(&id), "handle {id} never released");
        }
    }

    fn take_failure(inner: &mut MockEngineInner, point: FailOn) -> Option<EngineError> {
        if inner.fail_on == Some(point) {
            inner.fail_on = None;
            return Some(EngineError::new(point.operation(), "injected failure"));
        }
        None
    }

    fn fields(inner: &MockEngineInner, handle: &MockHandle, op: &str) -> HandleFields {
        assert!(
            !inner.freed.contains(&handle.id),
            "mock engine: {op} on released handle {}",
            handle.id
        );
        inner
            .handles
            .get(&handle.id)
            .unwrap_or_else(|| panic!("mock engine: {op} on unknown handle {}", handle.id))
            .clone()
    }

    fn alloc_handle(inner: &mut MockEngineInner, fields: HandleFields) -> u64 {
        let id = inner.next_handle;
        inner.next_handle += 1;
        inner.handles.insert(id, fields);
        id
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmoduleEngine for MockEngine {
    type Handle<'a>
        = MockHandle
    where
        Self: 'a;

    type SubRepo = MockSubRepo;

    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn add_setup(
        &self,
        url: &str,
        path: &str,
        use_gitlink: bool,
    ) -> Result<Self::Handle<'_>, EngineError> {
        let mut inner = self.lock();
        if let Some(err) = Self::take_failure(&mut inner, FailOn::AddSetup) {
            return Err(err);
        }
        if inner.registrations.iter().any(|r| r.name == path) {
            return Err(EngineError::new(
                "submodule add setup",
                format!("'{path}' already exists in the index"),
            ));
        }

        // libgit2 keys a fresh registration by its path.
        inner.registrations.push(Registration {
            name: path.to_string(),
            path: path.to_string(),
            url: url.to_string(),
            stale: None,
            finalized: false,
        });

        let id = Self::alloc_handle(
            &mut inner,
            HandleFields {
                name: path.to_string(),
                path: path.to_string(),
                url: url.to_string(),
            },
        );
        inner.operations.push(MockOperation::AddSetup {
            handle: id,
            url: url.to_string(),
            path: path.to_string(),
            use_gitlink,
        });

        Ok(MockHandle { id })
    }

    fn add_finalize<'a>(&self, handle: &mut Self::Handle<'a>) -> Result<(), EngineError> {
        let mut inner = self.lock();
        let fields = Self::fields(&inner, handle, "add_finalize");
        if let Some(err) = Self::take_failure(&mut inner, FailOn::AddFinalize) {
            return Err(err);
        }

        if let Some(reg) = inner
            .registrations
            .iter_mut()
            .find(|r| r.name == fields.name)
        {
            reg.finalized = true;
        }
        inner
            .operations
            .push(MockOperation::AddFinalize { handle: handle.id });
        Ok(())
    }

    fn add_to_index<'a>(
        &self,
        handle: &mut Self::Handle<'a>,
        write_index: bool,
    ) -> Result<(), EngineError> {
        let mut inner = self.lock();
        Self::fields(&inner, handle, "add_to_index");
        if let Some(err) = Self::take_failure(&mut inner, FailOn::AddToIndex) {
            return Err(err);
        }

        inner.operations.push(MockOperation::AddToIndex {
            handle: handle.id,
            write_index,
        });
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<Option<Self::Handle<'_>>, EngineError> {
        let mut inner = self.lock();
        if let Some(err) = Self::take_failure(&mut inner, FailOn::Lookup) {
            return Err(err);
        }

        let Some(reg) = inner.registrations.iter().find(|r| r.name == name).cloned() else {
            inner.operations.push(MockOperation::Lookup {
                name: name.to_string(),
                found: None,
            });
            return Ok(None);
        };

        // A raw lookup serves the stale snapshot; reload refreshes it.
        let (path, url) = reg
            .stale
            .clone()
            .unwrap_or_else(|| (reg.path.clone(), reg.url.clone()));
        let id = Self::alloc_handle(
            &mut inner,
            HandleFields {
                name: reg.name.clone(),
                path,
                url,
            },
        );
        inner.operations.push(MockOperation::Lookup {
            name: name.to_string(),
            found: Some(id),
        });

        Ok(Some(MockHandle { id }))
    }

    fn reload<'a>(&self, handle: &mut Self::Handle<'a>) -> Result<(), EngineError> {
        let mut inner = self.lock();
        let fields = Self::fields(&inner, handle, "reload");
        if let Some(err) = Self::take_failure(&mut inner, FailOn::Reload) {
            return Err(err);
        }

        let Some(reg) = inner
            .registrations
            .iter()
            .find(|r| r.name == fields.name)
            .cloned()
        else {
            return Err(EngineError::new(
                "submodule reload",
                format!("no registration for '{}'", fields.name),
            ));
        };

        inner.handles.insert(
            handle.id,
            HandleFields {
                name: reg.name,
                path: reg.path,
                url: reg.url,
            },
        );
        inner
            .operations
            .push(MockOperation::Reload { handle: handle.id });
        Ok(())
    }

    fn path<'a>(&self, handle: &Self::Handle<'a>) -> String {
        let mut inner = self.lock();
        let fields = Self::fields(&inner, handle, "path");
        inner
            .operations
            .push(MockOperation::Path { handle: handle.id });
        fields.path
    }

    fn url<'a>(&self, handle: &Self::Handle<'a>) -> String {
        let mut inner = self.lock();
        let fields = Self::fields(&inner, handle, "url");
        inner
            .operations
            .push(MockOperation::Url { handle: handle.id });
        fields.url
    }

    fn names(&self) -> Result<Vec<String>, EngineError> {
        let mut inner = self.lock();
        if let Some(err) = Self::take_failure(&mut inner, FailOn::Foreach) {
            return Err(err);
        }

        inner.operations.push(MockOperation::Foreach);
        Ok(inner.registrations.iter().map(|r| r.name.clone()).collect())
    }

    fn open_subrepo(&self, path: &Path) -> Result<Self::SubRepo, EngineError> {
        let mut inner = self.lock();
        if let Some(err) = Self::take_failure(&mut inner, FailOn::OpenSubRepo) {
            return Err(err);
        }

        inner.operations.push(MockOperation::OpenSubRepo {
            path: path.to_path_buf(),
        });
        Ok(MockSubRepo {
            path: path.to_path_buf(),
            inner: Arc::clone(&self.inner),
        })
    }

    fn release<'a>(&self, handle: Self::Handle<'a>) {
        let mut inner = self.lock();
        inner.freed.insert(handle.id);
        inner
            .operations
            .push(MockOperation::Free { handle: handle.id });
    }
}

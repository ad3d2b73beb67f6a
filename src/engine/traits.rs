//! engine::traits
//!
//! The `SubmoduleEngine` trait: the boundary between this crate and the
//! native version-control engine's submodule table.
//!
//! # Design
//!
//! Every native capability this crate consumes is a method on this trait:
//! registration setup/finalize, lookup, reload, field reads, name
//! enumeration, and opening the nested repository at a submodule's working
//! directory. The production implementation ([`super::GitEngine`]) maps each
//! method onto libgit2; the deterministic implementation
//! ([`super::MockEngine`]) backs the unit tests.
//!
//! Handles returned by `add_setup` and `lookup` are transient references
//! into engine-owned state. They are valid only while the engine is borrowed
//! and must be released exactly once; callers wrap them in
//! [`super::ScopedHandle`] so release happens on every scope exit.
//!
//! A `lookup` miss is `Ok(None)`, not an error. `EngineError` is reserved
//! for genuine faults (malformed names, I/O failures, index corruption).

use std::path::Path;

use thiserror::Error;

/// A fault reported by the native engine.
///
/// Carries the attempted operation so the failure reads in context
/// ("submodule add setup: ..."). Distinct from "not found", which lookup
/// paths report as a normal `None`.
#[derive(Debug, Clone, Error)]
#[error("{operation}: {message}")]
pub struct EngineError {
    operation: String,
    message: String,
}

impl EngineError {
    /// Create an engine error for the given operation.
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// The operation that was being attempted.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// The engine's failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Native engine operations backing the submodule facade.
///
/// Implementations are synchronous and blocking; all calls execute on the
/// caller's thread. Handles are not shareable across concurrent operations:
/// each logical operation acquires and releases its own.
pub trait SubmoduleEngine {
    /// Transient reference into the engine's submodule table.
    ///
    /// Borrows the engine; released via [`SubmoduleEngine::release`].
    type Handle<'a>
    where
        Self: 'a;

    /// A nested repository opened at a submodule's working directory.
    type SubRepo;

    /// Absolute path of the parent repository's working directory.
    fn workdir(&self) -> &Path;

    /// Create an in-progress submodule registration for `url` at `path`.
    ///
    /// `use_gitlink` selects a gitlink file in the working directory (with
    /// the repository under `.git/modules`) over an embedded `.git`
    /// directory. The returned handle represents the registration until
    /// [`SubmoduleEngine::add_finalize`] commits it.
    fn add_setup(
        &self,
        url: &str,
        path: &str,
        use_gitlink: bool,
    ) -> Result<Self::Handle<'_>, EngineError>;

    /// Commit an in-progress registration: write the `.gitmodules` entry and
    /// stage it, together with the gitlink, into the parent index.
    fn add_finalize<'a>(&self, handle: &mut Self::Handle<'a>) -> Result<(), EngineError>;

    /// Stage the submodule's current `HEAD` into the parent index.
    ///
    /// `write_index` controls whether the index file is written out
    /// immediately.
    fn add_to_index<'a>(
        &self,
        handle: &mut Self::Handle<'a>,
        write_index: bool,
    ) -> Result<(), EngineError>;

    /// Look up a registered submodule by name.
    ///
    /// `Ok(None)` means "not registered" and is not a fault. A returned
    /// handle may carry stale cached fields; callers must
    /// [`SubmoduleEngine::reload`] before reading through it.
    fn lookup(&self, name: &str) -> Result<Option<Self::Handle<'_>>, EngineError>;

    /// Force-refresh a handle's cached fields from on-disk/in-index state.
    fn reload<'a>(&self, handle: &mut Self::Handle<'a>) -> Result<(), EngineError>;

    /// The submodule's working-directory-relative path.
    fn path<'a>(&self, handle: &Self::Handle<'a>) -> String;

    /// The submodule's remote URL.
    fn url<'a>(&self, handle: &Self::Handle<'a>) -> String;

    /// All registered submodule names, in the engine's registration order.
    ///
    /// Only names are returned; materializing an entity requires a full
    /// lookup per name. The order is whatever the engine iterates, never
    /// sorted by this crate.
    fn names(&self) -> Result<Vec<String>, EngineError>;

    /// Open the nested repository rooted at `path`.
    fn open_subrepo(&self, path: &Path) -> Result<Self::SubRepo, EngineError>;

    /// Release a handle's native resources.
    ///
    /// Safe to call exactly once per handle; [`super::ScopedHandle`]
    /// guarantees this. The default implementation drops the handle, which
    /// suits RAII-backed engines.
    fn release<'a>(&self, handle: Self::Handle<'a>) {
        drop(handle);
    }
}

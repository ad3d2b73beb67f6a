//! submodule::collection
//!
//! The per-repository submodule facade: lookup, enumeration, the add
//! transaction, and index staging.
//!
//! # Design
//!
//! The collection owns no state beyond a borrow of the engine; every read
//! re-queries the engine, so there is no cached registry to go stale.
//!
//! All reads funnel through one private lookup primitive that acquires a
//! handle, **reloads it before reading**, and releases it on every exit
//! path. A raw handle can carry cached fields from a previous registration;
//! reloading before materializing a value is the correctness rule of this
//! module, and it lives in exactly one place.

use log::debug;

use crate::engine::{ScopedHandle, SubmoduleEngine};
use crate::error::{ensure_not_empty, Error};

use super::entity::Submodule;

/// Options for [`Submodules::add`].
#[derive(Debug, Clone)]
pub struct AddOptions {
    /// Path of the submodule inside the parent working directory.
    /// Defaults to the submodule name.
    pub relative_path: Option<String>,
    /// Keep the repository under `.git/modules` with a gitlink file in the
    /// working directory, instead of an embedded `.git` directory.
    pub use_gitlink: bool,
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            relative_path: None,
            use_gitlink: true,
        }
    }
}

/// The collection of submodules in a repository.
///
/// Borrows its engine; the repository must outlive the collection's use.
/// Operations are synchronous and must not run concurrently against the
/// same repository.
#[derive(Debug)]
pub struct Submodules<'r, E: SubmoduleEngine> {
    engine: &'r E,
}

impl<'r, E: SubmoduleEngine> Submodules<'r, E> {
    /// Create the collection facade for one repository's engine.
    pub fn new(engine: &'r E) -> Self {
        Self { engine }
    }

    /// Look up a submodule by name, returning `None` when it is not
    /// registered.
    pub fn try_find(&self, name: &str) -> Result<Option<Submodule>, Error> {
        ensure_not_empty(name, "name")?;
        self.lookup(name, |engine, handle| {
            Ok(Self::materialize(engine, name, handle))
        })
    }

    /// Look up a submodule by name, failing with [`Error::NotFound`] when
    /// it is not registered.
    pub fn find(&self, name: &str) -> Result<Submodule, Error> {
        match self.try_find(name)? {
            Some(submodule) => Ok(submodule),
            None => Err(Error::NotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Add a new submodule and stage it into the parent index.
    ///
    /// Runs in three phases, each a distinct failure domain:
    ///
    /// 1. **setup** — the engine creates an in-progress registration for
    ///    `url` at the relative path (the name when
    ///    [`AddOptions::relative_path`] is unset);
    /// 2. **populate** — the nested repository at
    ///    `workdir/<relative_path>` is opened and handed to `populate`,
    ///    which must leave its working tree and `HEAD` in the desired
    ///    state (fetch + checkout, or any other strategy); the nested
    ///    repository is closed when the callback returns, on success or
    ///    failure;
    /// 3. **finalize** — the registration is committed: `.gitmodules` entry
    ///    written and staged, gitlink staged into the parent index.
    ///
    /// On success the registration is looked up afresh and returned.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyArgument`] when `name` or `url` is empty; no engine
    ///   call has been made.
    /// - [`Error::Population`] when `populate` fails; finalize has not run,
    ///   so the setup-phase registration and any working-tree contents are
    ///   left behind for the caller to remove or retry.
    /// - [`Error::Engine`] when the engine faults in setup or finalize. A
    ///   finalize fault likewise leaves the populated-but-unstaged
    ///   registration in place; there is no automatic rollback.
    pub fn add<F>(
        &self,
        name: &str,
        url: &str,
        options: AddOptions,
        populate: F,
    ) -> Result<Submodule, Error>
    where
        F: FnOnce(&mut E::SubRepo) -> anyhow::Result<()>,
    {
        ensure_not_empty(name, "name")?;
        ensure_not_empty(url, "url")?;
        let relative_path = options.relative_path.as_deref().unwrap_or(name);

        let engine = self.engine;
        let raw = engine.add_setup(url, relative_path, options.use_gitlink)?;
        let mut handle = ScopedHandle::new(engine, raw);
        debug!("submodule add: setup complete for '{relative_path}' ({url})");

        let sub_path = engine.workdir().join(relative_path);
        {
            let mut sub_repo = engine.open_subrepo(&sub_path)?;
            populate(&mut sub_repo).map_err(|source| Error::Population {
                name: name.to_string(),
                source,
            })?;
        }
        debug!("submodule add: populated working tree at {}", sub_path.display());

        engine.add_finalize(handle.get_mut())?;
        drop(handle);
        debug!("submodule add: finalized '{relative_path}'");

        // The engine keys a fresh registration by its path; re-resolve
        // through the reload rule rather than trusting the setup handle.
        self.find(relative_path)
    }

    /// Stage the submodule registered at `relative_path` into the parent
    /// index, if one is registered there.
    ///
    /// Returns `false`, without error, when no submodule is registered at
    /// that path. `write_index` writes the index file out immediately.
    pub fn try_stage(&self, relative_path: &str, write_index: bool) -> Result<bool, Error> {
        let staged = self.lookup(relative_path, |engine, handle| {
            engine.add_to_index(handle, write_index)?;
            Ok(true)
        })?;
        Ok(staged.unwrap_or(false))
    }

    /// Enumerate all submodules, lazily.
    ///
    /// Issues one name query up front, then one full (reload) lookup per
    /// item as the iterator advances. Order is the engine's registration
    /// order, never sorted. Every call re-queries the engine and yields a
    /// fresh sequence; callers needing repeated listings should collect
    /// once, as each pass is O(n) engine round-trips.
    pub fn iter(&self) -> Result<Iter<'_, 'r, E>, Error> {
        let names = self.engine.names()?;
        Ok(Iter {
            names: names.into_iter(),
            submodules: self,
        })
    }

    /// Number of registered submodules, re-derived from the engine.
    pub fn count(&self) -> Result<usize, Error> {
        Ok(self.engine.names()?.len())
    }

    /// The single lookup primitive behind every read path.
    ///
    /// Acquires a handle for `name`; on a miss returns `Ok(None)` (callers
    /// choose whether absence is an error). On a hit the handle is
    /// reloaded **before** `select` runs, and released on every exit path
    /// via [`ScopedHandle`].
    fn lookup<T, F>(&self, name: &str, select: F) -> Result<Option<T>, Error>
    where
        F: FnOnce(&E, &mut E::Handle<'r>) -> Result<T, Error>,
    {
        let engine = self.engine;
        let raw = match engine.lookup(name)? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let mut handle = ScopedHandle::new(engine, raw);
        engine.reload(handle.get_mut())?;
        let value = select(engine, handle.get_mut())?;
        Ok(Some(value))
    }

    fn materialize<'h>(engine: &E, name: &str, handle: &E::Handle<'h>) -> Submodule {
        Submodule::new(name, engine.path(handle), engine.url(handle))
    }
}

/// Lazy submodule sequence returned by [`Submodules::iter`].
///
/// Buffers only names; each `next` performs a full lookup, so a
/// registration removed since the listing is silently skipped.
pub struct Iter<'c, 'r, E: SubmoduleEngine> {
    names: std::vec::IntoIter<String>,
    submodules: &'c Submodules<'r, E>,
}

impl<'c, 'r, E: SubmoduleEngine> Iterator for Iter<'c, 'r, E> {
    type Item = Result<Submodule, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let name = self.names.next()?;
            match self.submodules.try_find(&name) {
                Ok(Some(submodule)) => return Some(Ok(submodule)),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

//! submodule
//!
//! The submodule facade: entity, collection, and the add transaction.
//!
//! # Architecture
//!
//! [`Submodules`] is a stateless view over one repository's engine. Reads
//! ([`Submodules::try_find`], [`Submodules::find`], [`Submodules::iter`],
//! [`Submodules::count`]) always go back to the engine; nothing is cached.
//! Writes are [`Submodules::add`] (the setup → populate → finalize
//! transaction) and [`Submodules::try_stage`].
//!
//! [`Submodule`] values are snapshots materialized at lookup time; they
//! hold no native resources and do not track later changes.
//!
//! # Example
//!
//! ```no_run
//! use gitmods::engine::GitEngine;
//! use gitmods::submodule::{AddOptions, Submodules};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let engine = GitEngine::open(Path::new("."))?;
//! let submodules = Submodules::new(&engine);
//!
//! let sub = submodules.add(
//!     "libfoo",
//!     "https://example.com/libfoo.git",
//!     AddOptions::default(),
//!     |repo| {
//!         let mut origin = repo.find_remote("origin")?;
//!         origin.fetch(&["+refs/heads/*:refs/remotes/origin/*"], None, None)?;
//!         let oid = repo.refname_to_id("refs/remotes/origin/main")?;
//!         repo.set_head_detached(oid)?;
//!         repo.checkout_head(None)?;
//!         Ok(())
//!     },
//! )?;
//! assert_eq!(sub.path(), "libfoo");
//! # Ok(())
//! # }
//! ```

mod collection;
mod entity;

pub use collection::{AddOptions, Iter, Submodules};
pub use entity::Submodule;

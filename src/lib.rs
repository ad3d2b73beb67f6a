//! gitmods - High-level submodule management over libgit2
//!
//! This crate wraps libgit2's submodule subsystem behind a small, safe
//! facade: registering a new submodule in a parent repository, populating
//! its working-directory clone, and staging it into the parent index, plus
//! lookup and enumeration of existing submodules.
//!
//! # Architecture
//!
//! - [`submodule`] - The facade: [`submodule::Submodules`] (lookup,
//!   enumeration, add transaction, staging) and the [`submodule::Submodule`]
//!   snapshot entity
//! - [`engine`] - Single doorway to the native engine: the
//!   [`engine::SubmoduleEngine`] trait, its libgit2 implementation, the
//!   scoped handle guard, and a mock engine for tests
//! - [`error`] - Typed failure taxonomy
//!
//! # Correctness Invariants
//!
//! 1. Every native handle is released exactly once, on every exit path,
//!    and never read after release
//! 2. Every value materialized from a handle is reloaded first; raw lookup
//!    handles may carry stale cached fields
//! 3. The add transaction runs setup, populate, finalize strictly in
//!    order; a populate failure aborts before finalize
//! 4. No caching: lookups and enumeration always re-derive from the engine
//!
//! A finalize failure leaves the setup-phase registration and the populated
//! working tree behind. That residue is deliberate: the crate does not
//! guess at rollback, it documents the state and leaves remediation to the
//! caller.
//!
//! # Example
//!
//! ```
//! use gitmods::engine::MockEngine;
//! use gitmods::submodule::Submodules;
//!
//! # fn main() -> Result<(), gitmods::Error> {
//! let engine = MockEngine::new();
//! engine.register("vendor/libfoo", "vendor/libfoo", "https://example.com/libfoo.git");
//!
//! let submodules = Submodules::new(&engine);
//! let sub = submodules.find("vendor/libfoo")?;
//! assert_eq!(sub.url(), "https://example.com/libfoo.git");
//!
//! for entry in submodules.iter()? {
//!     println!("{}", entry?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod submodule;

pub use error::Error;
pub use submodule::{AddOptions, Submodule, Submodules};

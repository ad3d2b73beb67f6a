//! engine
//!
//! Single doorway to the native version-control engine.
//!
//! # Architecture
//!
//! All native submodule operations flow through the [`SubmoduleEngine`]
//! trait. No other module imports `git2`; the production binding lives in
//! one file ([`GitEngine`]) and the unit tests run against an in-memory
//! double ([`MockEngine`]) with a recorded operation log.
//!
//! # Invariants
//!
//! - Handles are acquired and released within one operation, via
//!   [`ScopedHandle`]; release runs on every exit path and a handle is
//!   never read after release.
//! - A lookup miss is `Ok(None)`, never an [`EngineError`].
//! - Engine calls are blocking and run on the caller's thread; handles are
//!   never shared across concurrent operations.

mod handle;
mod libgit2;
pub mod mock;
mod traits;

pub use handle::ScopedHandle;
pub use libgit2::GitEngine;
pub use mock::{FailOn, MockEngine, MockHandle, MockOperation, MockSubRepo};
pub use traits::{EngineError, SubmoduleEngine};

//! error
//!
//! Crate-level error taxonomy.
//!
//! Failures are categorized into typed variants so callers can handle them
//! distinctly:
//!
//! - [`Error::EmptyArgument`]: invalid caller input, rejected before any
//!   engine call is made
//! - [`Error::NotFound`]: a strict lookup did not find the submodule
//! - [`Error::Engine`]: the native engine reported a fault
//! - [`Error::Population`]: the caller-supplied populate callback failed
//!
//! "Not found" is only an error on strict lookup paths
//! ([`crate::submodule::Submodules::find`]); lenient paths
//! ([`crate::submodule::Submodules::try_find`],
//! [`crate::submodule::Submodules::try_stage`]) report absence as a normal
//! `None`/`false` result.

use thiserror::Error;

use crate::engine::EngineError;

/// Errors from submodule operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A required string argument was empty.
    ///
    /// Raised before any native call; the operation has no side effects.
    #[error("{argument} must not be empty")]
    EmptyArgument {
        /// The name of the offending argument
        argument: &'static str,
    },

    /// A strict lookup did not find the named submodule.
    #[error("submodule lookup failed for '{name}'")]
    NotFound {
        /// The name that was looked up
        name: String,
    },

    /// The native engine reported a fault.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The populate callback supplied to `add` failed.
    ///
    /// When this is returned the finalize step has not run: the submodule
    /// registration created by setup is present but not staged.
    #[error("populate failed for submodule '{name}'")]
    Population {
        /// The submodule being added
        name: String,
        /// The callback's failure
        #[source]
        source: anyhow::Error,
    },
}

/// Reject empty string arguments up front, before any engine call.
pub(crate) fn ensure_not_empty(value: &str, argument: &'static str) -> Result<(), Error> {
    if value.is_empty() {
        return Err(Error::EmptyArgument { argument });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_argument_display_names_the_argument() {
        let err = Error::EmptyArgument { argument: "url" };
        assert_eq!(err.to_string(), "url must not be empty");
    }

    #[test]
    fn not_found_display_names_the_submodule() {
        let err = Error::NotFound {
            name: "vendor/libfoo".to_string(),
        };
        assert_eq!(err.to_string(), "submodule lookup failed for 'vendor/libfoo'");
    }

    #[test]
    fn ensure_not_empty_accepts_non_empty() {
        assert!(ensure_not_empty("sub", "name").is_ok());
    }

    #[test]
    fn ensure_not_empty_rejects_empty() {
        let err = ensure_not_empty("", "name").unwrap_err();
        assert!(matches!(err, Error::EmptyArgument { argument: "name" }));
    }
}

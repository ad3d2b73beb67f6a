//! submodule::entity
//!
//! The `Submodule` value object.

/// One submodule registration, as read at lookup time.
///
/// A snapshot, not a live view: the fields reflect the engine's state at
/// the moment the entity was materialized, and looking the same name up
/// again may yield different values if the registration changed in
/// between. Entities are only constructed by the collection's lookup path
/// and hold no native resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submodule {
    name: String,
    path: String,
    url: String,
}

impl Submodule {
    pub(crate) fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            url: url.into(),
        }
    }

    /// The submodule's name, unique within its repository.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The submodule's path, relative to the parent working directory.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The remote URL the submodule is cloned from.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Display for Submodule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} => {}", self.name, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_return_the_constructed_fields() {
        let sub = Submodule::new("libfoo", "vendor/libfoo", "https://example.com/libfoo.git");
        assert_eq!(sub.name(), "libfoo");
        assert_eq!(sub.path(), "vendor/libfoo");
        assert_eq!(sub.url(), "https://example.com/libfoo.git");
    }

    #[test]
    fn display_shows_name_and_url() {
        let sub = Submodule::new("libfoo", "vendor/libfoo", "https://example.com/libfoo.git");
        assert_eq!(sub.to_string(), "libfoo => https://example.com/libfoo.git");
    }
}

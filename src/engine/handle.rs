//! engine::handle
//!
//! Scoped ownership of a transient engine handle.
//!
//! # Design
//!
//! A handle acquired from the engine must be released exactly once and never
//! read afterwards. `ScopedHandle` encodes that as ownership: it holds the
//! raw handle for the duration of one scope and releases it on `Drop`, so
//! release runs on every exit path, including `?` early returns and panics.
//! Reads borrow the guard, which the borrow checker refuses once the guard
//! is gone.

use super::traits::SubmoduleEngine;

/// Exclusive owner of one engine handle for the duration of a scope.
///
/// Constructed with a freshly acquired raw handle; releases it through
/// [`SubmoduleEngine::release`] when dropped. Never let a guard (or a
/// borrow of its handle) escape the function that acquired it.
pub struct ScopedHandle<'e, E: SubmoduleEngine> {
    engine: &'e E,
    raw: Option<E::Handle<'e>>,
}

impl<'e, E: SubmoduleEngine> ScopedHandle<'e, E> {
    /// Take ownership of a raw handle acquired from `engine`.
    pub fn new(engine: &'e E, raw: E::Handle<'e>) -> Self {
        Self {
            engine,
            raw: Some(raw),
        }
    }

    /// Borrow the handle for a read.
    pub fn get(&self) -> &E::Handle<'e> {
        // Some for the guard's whole lifetime; only Drop takes it.
        self.raw.as_ref().expect("handle read after release")
    }

    /// Borrow the handle for a mutating engine call.
    pub fn get_mut(&mut self) -> &mut E::Handle<'e> {
        self.raw.as_mut().expect("handle read after release")
    }
}

impl<'e, E: SubmoduleEngine> Drop for ScopedHandle<'e, E> {
    fn drop(&mut self) {
        if let Some(raw) = self.raw.take() {
            self.engine.release(raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::{MockEngine, MockOperation};

    fn engine_with_one_submodule() -> MockEngine {
        let engine = MockEngine::new();
        engine.register("sub", "sub", "https://example.com/sub.git");
        engine
    }

    fn free_count(engine: &MockEngine) -> usize {
        engine
            .operations()
            .iter()
            .filter(|op| matches!(op, MockOperation::Free { .. }))
            .count()
    }

    #[test]
    fn drop_releases_the_handle() {
        let engine = engine_with_one_submodule();
        {
            let raw = engine.lookup_raw("sub").unwrap();
            let _guard = ScopedHandle::new(&engine, raw);
            assert_eq!(free_count(&engine), 0);
        }
        assert_eq!(free_count(&engine), 1);
    }

    #[test]
    fn reads_go_through_the_guard() {
        let engine = engine_with_one_submodule();
        let raw = engine.lookup_raw("sub").unwrap();
        let mut guard = ScopedHandle::new(&engine, raw);

        engine.reload(guard.get_mut()).unwrap();
        assert_eq!(engine.path(guard.get()), "sub");
        drop(guard);

        engine.assert_handles_scoped();
    }

    #[test]
    fn panic_inside_the_scope_still_releases() {
        let engine = engine_with_one_submodule();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let raw = engine.lookup_raw("sub").unwrap();
            let _guard = ScopedHandle::new(&engine, raw);
            panic!("body failed");
        }));

        assert!(result.is_err());
        assert_eq!(free_count(&engine), 1);
        engine.assert_handles_scoped();
    }
}

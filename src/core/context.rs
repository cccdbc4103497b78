// This module provides the arena-based StrategyContext handed to the pipeline emitter. It
// plays the role the IR context plays for a host pass manager: it owns the identities that
// emitted stages refer to. Marker identities are (namespace, stage index) pairs whose
// namespace string lives in a caller-owned bumpalo arena, and target operation names are
// interned in the same arena so every emitted stage can borrow them for the context
// lifetime without cloning. Interning never changes what an emission produces; two contexts
// with the same namespace yield markers that compare equal, which keeps emission a pure
// function of the strategy.

//! Arena-backed context for pipeline emission.

use bumpalo::Bump;
use hashbrown::HashMap;
use std::cell::RefCell;

use super::marker::Marker;

/// Namespace used for markers when the caller does not pick one.
pub const DEFAULT_MARKER_NAMESPACE: &str = "__strategy_stage_";

/// Context shared by all stages emitted from one strategy.
///
/// A context is tied to one thread: build a separate context (and host
/// pipeline) per thread when emitting strategies concurrently.
pub struct StrategyContext<'arena> {
    /// Arena holding interned strings.
    arena: &'arena Bump,

    /// Prefix of every marker created by this context.
    namespace: &'arena str,

    /// Interned operation names.
    interned_strings: RefCell<HashMap<String, &'arena str>>,
}

impl<'arena> StrategyContext<'arena> {
    /// Create a context using [`DEFAULT_MARKER_NAMESPACE`].
    pub fn new(arena: &'arena Bump) -> Self {
        Self::with_namespace(arena, DEFAULT_MARKER_NAMESPACE)
    }

    /// Create a context whose markers are prefixed with `namespace`.
    ///
    /// Two strategies emitted onto the same host pipeline must use distinct
    /// namespaces, otherwise the second one would see the first one's markers.
    pub fn with_namespace(arena: &'arena Bump, namespace: &str) -> Self {
        Self {
            arena,
            namespace: arena.alloc_str(namespace),
            interned_strings: RefCell::new(HashMap::new()),
        }
    }

    /// Get access to the arena allocator.
    pub fn arena(&self) -> &'arena Bump {
        self.arena
    }

    pub fn namespace(&self) -> &'arena str {
        self.namespace
    }

    /// Marker written by the stage at `stage` index.
    pub fn marker(&self, stage: usize) -> Marker<'arena> {
        Marker::new(self.namespace, stage)
    }

    /// Intern a string in the arena.
    pub fn intern_str(&self, s: &str) -> &'arena str {
        let mut strings = self.interned_strings.borrow_mut();
        if let Some(&interned) = strings.get(s) {
            return interned;
        }

        let interned = self.arena.alloc_str(s);
        strings.insert(s.to_string(), interned);
        interned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_interning() {
        let arena = Bump::new();
        let context = StrategyContext::new(&arena);

        let s1 = context.intern_str("linalg.matmul");
        let s2 = context.intern_str("linalg.matmul");
        let s3 = context.intern_str("linalg.fill");

        assert_eq!(s1.as_ptr(), s2.as_ptr());
        assert_ne!(s1.as_ptr(), s3.as_ptr());
    }

    #[test]
    fn test_markers_compare_by_identity_not_arena() {
        let arena_a = Bump::new();
        let arena_b = Bump::new();
        let a = StrategyContext::new(&arena_a);
        let b = StrategyContext::new(&arena_b);

        assert_eq!(a.marker(3), b.marker(3));
        assert_ne!(a.marker(3), a.marker(4));

        let other = StrategyContext::with_namespace(&arena_b, "gemm_");
        assert_ne!(a.marker(0), other.marker(0));
        assert_eq!(other.marker(2).to_string(), "gemm_2");
    }
}

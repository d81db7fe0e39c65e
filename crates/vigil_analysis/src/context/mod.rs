//! Engines used by the analysis.
//!
//! The default engine parses documents and answers scope queries.
//! Speculative execution (coverage runs, evaluation for completion) runs
//! on a nested engine so that its side effects stay out of the default
//! one. A nested engine is either cached across requests or created for
//! one request and dropped right after it.

use std::fmt;
use std::ops::{Deref, DerefMut};

/// Creates nested engines.
pub type EngineFactory<E> = Box<dyn Fn() -> E + Send>;

pub struct ContextManager<E> {
    default: E,
    factory: EngineFactory<E>,
    cached: Option<E>,
}

impl<E> ContextManager<E> {
    pub fn new(default: E, factory: impl Fn() -> E + Send + 'static) -> Self {
        ContextManager {
            default,
            factory: Box::new(factory),
            cached: None,
        }
    }

    pub fn default_engine(&self) -> &E {
        &self.default
    }

    pub fn with_default<T>(&mut self, f: impl FnOnce(&mut E) -> T) -> T {
        f(&mut self.default)
    }

    /// Run `f` on a nested engine, the cached one when `cached` is set.
    pub fn with_nested<T>(&mut self, cached: bool, f: impl FnOnce(&mut E) -> T) -> T {
        let mut context = self.nested(cached);
        f(&mut context)
    }

    /// A nested engine for the lifetime of the returned guard.
    pub fn nested(&mut self, cached: bool) -> NestedContext<'_, E> {
        let engine = if cached {
            let factory = &self.factory;
            NestedEngine::Cached(self.cached.get_or_insert_with(|| {
                tracing::debug!("nested context created");
                factory()
            }))
        } else {
            tracing::trace!("throwaway nested context created");
            NestedEngine::Owned((self.factory)())
        };
        NestedContext { engine }
    }

    pub fn has_cached_context(&self) -> bool {
        self.cached.is_some()
    }

    /// Drop the cached nested engine. Returns `false` if there was none.
    pub fn reset_cached_context(&mut self) -> bool {
        let existed = self.cached.take().is_some();
        if existed {
            tracing::debug!("cached nested context reset");
        }
        existed
    }
}

impl<E> fmt::Debug for ContextManager<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextManager")
            .field("cached", &self.cached.is_some())
            .finish_non_exhaustive()
    }
}

/// RAII access to a nested engine.
///
/// An uncached engine is dropped with the guard, including during
/// unwinding.
pub struct NestedContext<'m, E> {
    engine: NestedEngine<'m, E>,
}

enum NestedEngine<'m, E> {
    Cached(&'m mut E),
    Owned(E),
}

impl<E> NestedContext<'_, E> {
    pub fn is_cached(&self) -> bool {
        matches!(self.engine, NestedEngine::Cached(_))
    }
}

impl<E> Deref for NestedContext<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        match &self.engine {
            NestedEngine::Cached(engine) => engine,
            NestedEngine::Owned(engine) => engine,
        }
    }
}

impl<E> DerefMut for NestedContext<'_, E> {
    fn deref_mut(&mut self) -> &mut E {
        match &mut self.engine {
            NestedEngine::Cached(engine) => engine,
            NestedEngine::Owned(engine) => engine,
        }
    }
}

impl<E> Drop for NestedContext<'_, E> {
    fn drop(&mut self) {
        if let NestedEngine::Owned(_) = self.engine {
            tracing::trace!("throwaway nested context disposed");
        }
    }
}

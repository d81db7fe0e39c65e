//! Runtime values and scopes as seen by completion.

use std::fmt;

/// Shape queries on a runtime value.
///
/// Each engine adapts its own value representation; completion never looks
/// at a concrete type.
pub trait RuntimeValue: Clone + fmt::Display + fmt::Debug + Send + 'static {
    /// Whether [`properties`](Self::properties) may return anything.
    fn has_properties(&self) -> bool;

    /// Named members in a stable order.
    fn properties(&self) -> Vec<(String, Self)>;

    fn is_executable(&self) -> bool {
        false
    }

    fn is_instantiable(&self) -> bool {
        false
    }
}

/// A named set of variables, as reported by an engine.
///
/// A variable without a value is known statically but has not been bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scope<V> {
    pub name: String,
    pub variables: Vec<(String, Option<V>)>,
}

impl<V> Scope<V> {
    pub fn new(name: impl Into<String>) -> Self {
        Scope {
            name: name.into(),
            variables: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: Option<V>) -> Self {
        self.variables.push((name.into(), value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

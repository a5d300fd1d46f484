//! Variable bindings for evaluation.

use std::collections::HashMap;

use crate::value::Value;

/// [`XPath` 1.0 § 1](https://www.w3.org/TR/xpath-10/#section-Introduction)
///
/// "a set of variable bindings"
///
/// The context node is passed alongside the context when an expression is
/// evaluated. Position and size start at 1.
#[derive(Debug, Clone, Default)]
pub struct XPathContext {
    variables: HashMap<String, Value>,
}

impl XPathContext {
    /// A context without variables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` (without the `$`) and return the context.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let _ = self.set_variable(name, value);
        self
    }

    /// Bind `name`, returning the value it replaced.
    pub fn set_variable(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.variables.insert(name.into(), value.into())
    }

    /// Remove the binding for `name`.
    pub fn remove_variable(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(name)
    }

    /// Look up a binding.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }
}

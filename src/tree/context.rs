//! Walk-local context threaded down a traversal.

use crate::exec_context::ExecContext;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Context visible at a node during a walk.
///
/// Holds the execution context of the nearest enclosing provider plus any
/// string values provided by ancestor elements. Cloning is cheap.
pub struct WalkContext<V> {
    exec: Option<Arc<ExecContext<V>>>,
    values: Arc<BTreeMap<String, String>>,
}

impl<V> WalkContext<V> {
    pub fn new() -> Self {
        Self {
            exec: None,
            values: Arc::new(BTreeMap::new()),
        }
    }

    /// Execution context in scope, if the walk has passed through a provider.
    pub fn exec(&self) -> Option<&Arc<ExecContext<V>>> {
        self.exec.as_ref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn with_exec(&self, exec: Arc<ExecContext<V>>) -> Self {
        Self {
            exec: Some(exec),
            values: self.values.clone(),
        }
    }

    /// Context for descendants of a node that provides `provided`.
    pub fn extend(&self, provided: &BTreeMap<String, String>) -> Self {
        if provided.is_empty() {
            return self.clone();
        }
        let mut values = (*self.values).clone();
        values.extend(provided.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            exec: self.exec.clone(),
            values: Arc::new(values),
        }
    }
}

impl<V> Clone for WalkContext<V> {
    fn clone(&self) -> Self {
        Self {
            exec: self.exec.clone(),
            values: self.values.clone(),
        }
    }
}

impl<V> Default for WalkContext<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for WalkContext<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalkContext")
            .field("has_exec", &self.exec.is_some())
            .field("values", &self.values)
            .finish()
    }
}

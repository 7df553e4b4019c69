//! Execution Context
//!
//! Per-run registry mapping a dependency id to its resolved value. One
//! context is created for every resolution run and dropped with it.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Registry of values resolved during a single run.
pub struct ExecContext<V> {
    registry: RwLock<HashMap<String, Arc<V>>>,
}

impl<V> ExecContext<V> {
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or overwrite the value registered under `id`.
    pub fn register_component(&self, id: impl Into<String>, value: V) {
        self.registry.write().insert(id.into(), Arc::new(value));
    }

    /// Value registered under `id`, if any.
    pub fn get_component(&self, id: &str) -> Option<Arc<V>> {
        self.registry.read().get(id).cloned()
    }

    /// Every registered id mapped to `true`.
    ///
    /// Builds a new map on every call; later registrations are not reflected
    /// in maps handed out earlier.
    pub fn get_resolved(&self) -> BTreeMap<String, bool> {
        self.registry
            .read()
            .keys()
            .map(|id| (id.clone(), true))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.read().is_empty()
    }
}

impl<V> Default for ExecContext<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> std::fmt::Debug for ExecContext<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.read();
        let mut ids: Vec<&String> = registry.keys().collect();
        ids.sort();
        f.debug_struct("ExecContext").field("registered", &ids).finish()
    }
}

//! Resolved-state snapshots and rehydration input.
//!
//! A [`Snapshot`] is the serialisable record a run produces. A later run (for
//! example a client taking over a server-rendered tree) receives it back as a
//! [`RehydrationState`] and uses it to decide which dependencies to resolve.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Well-known key under which a snapshot is published to the next environment.
pub const STATE_IDENTIFIER: &str = "__ASYNC_COMPONENTS_REHYDRATE_STATE__";

/// Record of which dependency ids were resolved during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub resolved: BTreeMap<String, bool>,
}

impl Snapshot {
    pub fn new(resolved: BTreeMap<String, bool>) -> Self {
        Self { resolved }
    }

    pub fn is_resolved(&self, id: &str) -> bool {
        self.resolved.get(id).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// State carried in from a prior run.
///
/// Serialises as `{ "resolved": { "<id>": bool }, "<id>": bool, ... }`: the
/// `resolved` map drives skip-versus-resolve, the top-level flags record
/// whether an id is still waiting to be consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RehydrationState {
    #[serde(default)]
    pub resolved: BTreeMap<String, bool>,
    #[serde(flatten)]
    pub flags: BTreeMap<String, bool>,
}

impl RehydrationState {
    /// State a follow-up run receives from `snapshot`.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let resolved: BTreeMap<String, bool> = snapshot
            .resolved
            .iter()
            .filter(|(_, resolved)| **resolved)
            .map(|(id, _)| (id.clone(), true))
            .collect();
        let flags = resolved.clone();
        Self { resolved, flags }
    }

    pub fn is_resolved(&self, id: &str) -> bool {
        self.resolved.get(id).copied().unwrap_or(false)
    }

    /// Copy of this state with the flags of every consumed id cleared.
    ///
    /// The input state itself is never mutated during a run.
    pub fn with_consumed(&self, consumed: &BTreeSet<String>) -> Self {
        let mut next = self.clone();
        for id in consumed {
            next.flags.insert(id.clone(), false);
        }
        next
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Caller-owned holder for rehydration input.
///
/// Stands in for the ambient slot a host environment would expose under
/// [`STATE_IDENTIFIER`]. Resolving through a slot always leaves it empty.
#[derive(Debug, Default)]
pub struct RehydrationSlot {
    inner: Mutex<Option<RehydrationState>>,
}

impl RehydrationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: RehydrationState) -> Self {
        Self {
            inner: Mutex::new(Some(state)),
        }
    }

    pub fn install(&self, state: RehydrationState) {
        *self.inner.lock() = Some(state);
    }

    /// Current contents, leaving the slot untouched.
    pub fn capture(&self) -> Option<RehydrationState> {
        self.inner.lock().clone()
    }

    pub fn take(&self) -> Option<RehydrationState> {
        self.inner.lock().take()
    }

    pub fn clear(&self) {
        *self.inner.lock() = None;
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_none()
    }
}

/// Clears a slot when dropped, including during unwinding.
pub(crate) struct SlotGuard<'a>(pub(crate) &'a RehydrationSlot);

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.0.clear();
    }
}

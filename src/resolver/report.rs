//! Run report: what happened to every discovered dependency.

use crate::resolver::policy::SkipReason;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Last observed state of a dependency within one run.
///
/// `SkippedDeferred`, `SkippedNotRehydrated` and `ReWalked` are terminal for a
/// successful run. A dependency left in `Resolving` or `Registered` was
/// abandoned when a sibling failed, or, for `Registered`, its subtree was
/// pruned by the nesting limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyState {
    SkippedDeferred,
    SkippedNotRehydrated,
    Resolving,
    Registered,
    ReWalked,
    Failed,
}

impl DependencyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyState::SkippedDeferred => "skipped (deferred)",
            DependencyState::SkippedNotRehydrated => "skipped (not rehydrated)",
            DependencyState::Resolving => "resolving",
            DependencyState::Registered => "registered",
            DependencyState::ReWalked => "re-walked",
            DependencyState::Failed => "failed",
        }
    }
}

impl From<SkipReason> for DependencyState {
    fn from(reason: SkipReason) -> Self {
        match reason {
            SkipReason::Deferred => DependencyState::SkippedDeferred,
            SkipReason::NotRehydrated => DependencyState::SkippedNotRehydrated,
        }
    }
}

/// Limit that stopped a subtree from being walked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PruneLimit {
    Depth,
    Nesting,
}

impl PruneLimit {
    pub fn as_str(&self) -> &'static str {
        match self {
            PruneLimit::Depth => "depth limit",
            PruneLimit::Nesting => "nesting limit",
        }
    }
}

/// Node whose subtree a configured limit left unwalked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrunedSubtree {
    /// Node label; the dependency id for nesting prunes
    pub node: String,
    pub limit: PruneLimit,
}

/// Diagnostics for a single resolution run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub dependencies: BTreeMap<String, DependencyState>,
    /// Walk passes performed (the root walk plus one per re-walked dependency)
    pub passes: usize,
    /// Nodes visited across all passes
    pub nodes_visited: usize,
    pub rehydrated: bool,
    /// Ids whose rehydration entry was consumed
    pub consumed: BTreeSet<String>,
    pub elapsed_ms: u128,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pruned: Vec<PrunedSubtree>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl RunReport {
    pub fn state_of(&self, id: &str) -> Option<DependencyState> {
        self.dependencies.get(id).copied()
    }

    pub fn count(&self, state: DependencyState) -> usize {
        self.dependencies.values().filter(|s| **s == state).count()
    }

    pub(crate) fn mark(&mut self, id: &str, state: DependencyState) {
        self.dependencies.insert(id.to_string(), state);
    }

    pub(crate) fn record_pass(&mut self, visited: usize) {
        self.passes += 1;
        self.nodes_visited += visited;
    }

    pub(crate) fn record_pruned(&mut self, node: impl Into<String>, limit: PruneLimit) {
        self.pruned.push(PrunedSubtree {
            node: node.into(),
            limit,
        });
    }
}

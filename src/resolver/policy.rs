//! Deferral policy: decides, per discovered dependency, whether to resolve it
//! now or skip its subtree for this run.

use crate::error::ResolveError;
use crate::state::RehydrationState;
use crate::tree::node::Descriptor;
use std::collections::{BTreeSet, HashSet};

/// Why a dependency was not resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Marked `defer` and no rehydration state was supplied
    Deferred,
    /// Rehydration state present but the id is not marked resolved in it
    NotRehydrated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Resolve,
    Skip(SkipReason),
}

/// Run-level deferral policy.
///
/// With rehydration state present, that state alone decides; each
/// dependency's own `defer` flag is ignored. Without it, `defer` decides.
#[derive(Debug, Default)]
pub struct DeferralPolicy {
    rehydrate: Option<RehydrationState>,
    consumed: BTreeSet<String>,
    claimed: HashSet<String>,
}

impl DeferralPolicy {
    pub fn new(rehydrate: Option<RehydrationState>) -> Self {
        Self {
            rehydrate,
            consumed: BTreeSet::new(),
            claimed: HashSet::new(),
        }
    }

    /// Ids whose rehydration entry has been applied this run
    pub fn consumed(&self) -> &BTreeSet<String> {
        &self.consumed
    }

    /// Decide what to do with `descriptor`.
    ///
    /// A `Resolve` decision claims the id; a second claim within the same run
    /// is a [`ResolveError::DuplicateId`].
    pub fn decide<V>(&mut self, descriptor: &Descriptor<V>) -> Result<Decision, ResolveError> {
        let id = descriptor.id();

        match &self.rehydrate {
            Some(state) => {
                if !state.is_resolved(id) {
                    return Ok(Decision::Skip(SkipReason::NotRehydrated));
                }
            }
            None => {
                if descriptor.defer() {
                    return Ok(Decision::Skip(SkipReason::Deferred));
                }
            }
        }

        if !self.claimed.insert(id.to_string()) {
            return Err(ResolveError::DuplicateId(id.to_string()));
        }
        if self.rehydrate.is_some() {
            self.consumed.insert(id.to_string());
        }

        Ok(Decision::Resolve)
    }
}

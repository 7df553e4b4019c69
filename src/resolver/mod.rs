//! Recursive Resolver
//!
//! Converges a component tree to a fully resolved state. Each walk pass
//! discovers dependency nodes, starts the resolvers of the ones the deferral
//! policy admits and stops descending at them. Once a resolver settles its
//! value is registered and the node's subtree is walked again, which may
//! reveal further dependencies. The run ends when no pass discovers anything
//! new.
//!
//! Resolvers found in the same pass run concurrently; a node's subtree is
//! never walked before its own value is registered.

pub mod policy;
pub mod report;

pub use policy::{Decision, DeferralPolicy, SkipReason};
pub use report::{DependencyState, PruneLimit, PrunedSubtree, RunReport};

use crate::error::ResolveError;
use crate::exec_context::ExecContext;
use crate::state::{RehydrationSlot, RehydrationState, SlotGuard, Snapshot, STATE_IDENTIFIER};
use crate::tree::context::WalkContext;
use crate::tree::node::{Node, NodeRef};
use crate::tree::walker::{Visit, Walker, WalkerConfig};
use futures::future::{self, BoxFuture, FutureExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

/// Resolver configuration.
///
/// Both limits are off by default. When set, reaching one prunes that
/// subtree; the rest of the tree still resolves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Deepest node level of a single walk whose children are visited
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Maximum number of nested re-walks below the root walk
    #[serde(default)]
    pub max_nesting: Option<usize>,
}

impl ResolverConfig {
    /// Validate resolver configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == Some(0) {
            return Err("max_depth must be greater than zero".to_string());
        }
        if self.max_nesting == Some(0) {
            return Err("max_nesting must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Outcome of a resolution run.
///
/// Always produced, even when some dependency failed: the snapshot then holds
/// only what was registered before the failure and `failure` says why.
pub struct Resolution<V> {
    /// The caller's tree wrapped in the provider carrying the run's context
    pub tree: NodeRef<V>,
    pub state: Snapshot,
    pub state_identifier: &'static str,
    pub report: RunReport,
    pub failure: Option<ResolveError>,
    exec: Arc<ExecContext<V>>,
}

impl<V> Resolution<V> {
    /// Execution context the run registered values into
    pub fn exec_context(&self) -> &Arc<ExecContext<V>> {
        &self.exec
    }

    /// True when every reachable dependency was handled without error
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// `original` with the flags of every id consumed by this run cleared
    pub fn rehydration_after(&self, original: &RehydrationState) -> RehydrationState {
        original.with_consumed(&self.report.consumed)
    }
}

impl<V> std::fmt::Debug for Resolution<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolution")
            .field("state", &self.state)
            .field("report", &self.report)
            .field("failure", &self.failure)
            .finish()
    }
}

/// Dependency discovered in a pass whose resolver has been started
struct PendingResolver<V> {
    id: String,
    resolver: BoxFuture<'static, anyhow::Result<V>>,
    node: NodeRef<V>,
    context: WalkContext<V>,
}

/// State shared by every pass of one run
struct Run<V> {
    exec: Arc<ExecContext<V>>,
    policy: Mutex<DeferralPolicy>,
    report: Mutex<RunReport>,
    walker: Walker,
    max_nesting: Option<usize>,
}

impl<V> Run<V>
where
    V: Send + Sync + 'static,
{
    fn mark(&self, id: &str, state: DependencyState) {
        self.report.lock().mark(id, state);
    }

    /// Walk `root` once and start the resolver of every admitted dependency.
    ///
    /// With `include_root` false the root itself is treated as a plain node,
    /// so a just-resolved node is not resolved again when its subtree is
    /// re-walked.
    fn discover(
        &self,
        root: &NodeRef<V>,
        ctx: &WalkContext<V>,
        include_root: bool,
    ) -> Result<Vec<PendingResolver<V>>, ResolveError> {
        let mut pending = Vec::new();

        let stats = self.walker.walk::<V, _, ResolveError>(root, ctx, |node, node_ctx, _depth| {
            let Some(descriptor) = node.descriptor() else {
                return Ok(Visit::Descend);
            };
            if !include_root && Arc::ptr_eq(node, root) {
                return Ok(Visit::Descend);
            }

            let decision = self.policy.lock().decide(descriptor)?;
            match decision {
                Decision::Skip(reason) => {
                    debug!(id = descriptor.id(), ?reason, "Skipping dependency");
                    self.mark(descriptor.id(), reason.into());
                }
                Decision::Resolve => {
                    debug!(id = descriptor.id(), "Resolving dependency");
                    self.mark(descriptor.id(), DependencyState::Resolving);
                    pending.push(PendingResolver {
                        id: descriptor.id().to_string(),
                        resolver: descriptor.get_resolver(),
                        node: node.clone(),
                        context: node_ctx.clone(),
                    });
                }
            }
            Ok(Visit::Skip)
        })?;

        let mut report = self.report.lock();
        report.record_pass(stats.visited);
        for node in stats.pruned {
            report.record_pruned(node, PruneLimit::Depth);
        }
        trace!(visited = stats.visited, discovered = pending.len(), "Walk pass complete");
        Ok(pending)
    }
}

/// One walk pass plus the continuations of everything it discovered.
fn walk_pass<V>(
    run: Arc<Run<V>>,
    root: NodeRef<V>,
    ctx: WalkContext<V>,
    include_root: bool,
    level: usize,
) -> BoxFuture<'static, Result<(), ResolveError>>
where
    V: Send + Sync + 'static,
{
    async move {
        let pending = run.discover(&root, &ctx, include_root)?;
        if pending.is_empty() {
            return Ok(());
        }

        let continuations = pending.into_iter().map(|pending| {
            let run = run.clone();
            async move {
                let PendingResolver {
                    id,
                    resolver,
                    node,
                    context,
                } = pending;

                match resolver.await {
                    Ok(value) => {
                        run.exec.register_component(id.as_str(), value);
                        run.mark(&id, DependencyState::Registered);
                    }
                    Err(cause) => {
                        warn!(id = %id, error = %cause, "Dependency resolver failed");
                        run.mark(&id, DependencyState::Failed);
                        return Err(ResolveError::Dependency { id, cause });
                    }
                }

                if let Some(max) = run.max_nesting.filter(|max| level >= *max) {
                    warn!(id = %id, max_nesting = max, "Nesting limit reached, subtree not re-walked");
                    run.report.lock().record_pruned(id.as_str(), PruneLimit::Nesting);
                    return Ok(());
                }

                walk_pass(run.clone(), node, context, false, level + 1).await?;
                run.mark(&id, DependencyState::ReWalked);
                Ok(())
            }
        });

        future::try_join_all(continuations).await.map(|_| ())
    }
    .boxed()
}

/// Resolves the asynchronous dependencies of component trees.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Resolve every reachable dependency of `app`.
    ///
    /// Without `rehydrate`, each dependency's `defer` flag decides whether it
    /// is resolved. With it, only ids marked resolved in the state are
    /// resolved, deferred or not, and every other dependency's subtree is
    /// skipped.
    ///
    /// Never fails. Any error aborts the remaining work and is reported on
    /// [`Resolution::failure`]; the snapshot keeps whatever registered first.
    #[instrument(skip_all, fields(rehydrating = rehydrate.is_some()))]
    pub async fn resolve<V>(&self, app: NodeRef<V>, rehydrate: Option<RehydrationState>) -> Resolution<V>
    where
        V: Send + Sync + 'static,
    {
        let start = Instant::now();
        let exec = Arc::new(ExecContext::new());
        let tree = Node::provider(exec.clone(), app);
        let rehydrated = rehydrate.is_some();

        let run = Arc::new(Run {
            exec: exec.clone(),
            policy: Mutex::new(DeferralPolicy::new(rehydrate)),
            report: Mutex::new(RunReport::default()),
            walker: Walker::with_config(WalkerConfig {
                max_depth: self.config.max_depth,
            }),
            max_nesting: self.config.max_nesting,
        });

        info!("Starting dependency resolution");
        let outcome = walk_pass(run.clone(), tree.clone(), WalkContext::new(), true, 0).await;

        let failure = match outcome {
            Ok(()) => None,
            Err(err) => {
                warn!(error = %err, "Resolution incomplete, continuing with partial state");
                Some(err)
            }
        };

        let state = Snapshot::new(exec.get_resolved());
        let mut report = std::mem::take(&mut *run.report.lock());
        report.rehydrated = rehydrated;
        report.consumed = run.policy.lock().consumed().clone();
        report.elapsed_ms = start.elapsed().as_millis();
        report.failure = failure.as_ref().map(|err| err.to_string());

        info!(
            resolved = state.len(),
            passes = report.passes,
            nodes_visited = report.nodes_visited,
            elapsed_ms = report.elapsed_ms as u64,
            complete = failure.is_none(),
            "Dependency resolution finished"
        );

        Resolution {
            tree,
            state,
            state_identifier: STATE_IDENTIFIER,
            report,
            failure,
            exec,
        }
    }

    /// Resolve with whatever `slot` holds at call time, then empty the slot.
    ///
    /// The slot is cleared however the run ends.
    pub async fn resolve_with_slot<V>(&self, app: NodeRef<V>, slot: &RehydrationSlot) -> Resolution<V>
    where
        V: Send + Sync + 'static,
    {
        let _guard = SlotGuard(slot);
        let rehydrate = slot.capture();
        self.resolve(app, rehydrate).await
    }
}

//! Depth-first walker for component trees

use crate::tree::context::WalkContext;
use crate::tree::node::NodeRef;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// Visitor decision for a single node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// No decision: continue into the node's children
    Descend,
    /// Do not visit the node's children
    Skip,
}

/// Walker configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Deepest level whose children are still visited (None = unlimited)
    #[serde(default)]
    pub max_depth: Option<usize>,
}

/// What a single walk covered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub visited: usize,
    /// Labels of nodes whose children were cut off by the depth limit
    pub pruned: Vec<String>,
}

/// Component tree walker
#[derive(Debug, Clone, Default)]
pub struct Walker {
    config: WalkerConfig,
}

impl Walker {
    /// Create an unlimited walker
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a walker with custom configuration
    pub fn with_config(config: WalkerConfig) -> Self {
        Self { config }
    }

    /// Walk `root` depth-first, pre-order, left to right.
    ///
    /// Each node is rendered under the context its parent hands down, so a
    /// dependency node registered since the last walk shows its resolved
    /// children. A node at the depth limit is still visited but its children
    /// are not; the walk carries on with the rest of the tree.
    pub fn walk<V, F, E>(&self, root: &NodeRef<V>, ctx: &WalkContext<V>, mut visit: F) -> Result<WalkStats, E>
    where
        F: FnMut(&NodeRef<V>, &WalkContext<V>, usize) -> Result<Visit, E>,
    {
        let mut stack = vec![(root.clone(), ctx.clone(), 0usize)];
        let mut stats = WalkStats::default();

        while let Some((node, node_ctx, depth)) = stack.pop() {
            stats.visited += 1;
            if visit(&node, &node_ctx, depth)? == Visit::Skip {
                trace!(node = node.label(), depth, "Not descending");
                continue;
            }

            let children = node.children(&node_ctx);
            if children.is_empty() {
                continue;
            }
            if let Some(max) = self.config.max_depth {
                if depth >= max {
                    warn!(node = node.label(), max_depth = max, "Depth limit reached, pruning subtree");
                    stats.pruned.push(node.label().to_string());
                    continue;
                }
            }

            let child_ctx = node.child_context(&node_ctx);
            for child in children.into_iter().rev() {
                stack.push((child, child_ctx.clone(), depth + 1));
            }
        }

        Ok(stats)
    }
}

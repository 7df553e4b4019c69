//! Prefetch: Asynchronous Dependency Resolution for Component Trees
//!
//! Walks a component tree, discovers nodes that declare pending asynchronous
//! work, resolves that work concurrently and re-walks each resolved subtree
//! until nothing reachable is left unresolved. The run produces the wrapped
//! tree plus a serializable snapshot of what was resolved, which a later run
//! can consume as rehydration state to skip or force the same work.

pub mod cli;
pub mod config;
pub mod error;
pub mod exec_context;
pub mod logging;
pub mod manifest;
pub mod resolver;
pub mod state;
pub mod tree;

pub use error::{PrefetchError, ResolveError};
pub use exec_context::ExecContext;
pub use resolver::{Resolution, Resolver, ResolverConfig};
pub use state::{RehydrationSlot, RehydrationState, Snapshot, STATE_IDENTIFIER};
pub use tree::{Descriptor, Node, NodeRef, WalkContext};

//! Component Tree
//!
//! The tree a resolution run walks: plain elements, dependency-bearing nodes
//! and the provider wrapper exposing an execution context, plus the
//! depth-first walk primitive used to traverse them.

pub mod context;
pub mod node;
pub mod render;
pub mod walker;

pub use context::WalkContext;
pub use node::{Descriptor, Node, NodeRef};
pub use walker::{Visit, Walker, WalkerConfig};

//! Textual rendering of a component tree.
//!
//! Walks every node, rendering dependency nodes from whatever the in-scope
//! execution context holds. Used to show the tree a resolution produced.

use crate::tree::context::WalkContext;
use crate::tree::node::{Node, NodeRef};
use crate::tree::walker::{Visit, Walker};
use std::convert::Infallible;
use std::fmt::Display;

/// Render `root` as an indented outline, one node per line.
///
/// Stops at the walker's depth limit, if it has one.
pub fn render_outline<V: Display>(walker: &Walker, root: &NodeRef<V>) -> String {
    let mut out = String::new();
    let walked = walker.walk::<V, _, Infallible>(root, &WalkContext::new(), |node, ctx, depth| {
        let indent = "  ".repeat(depth);
        let line = match node.as_ref() {
            Node::Element(element) => element.name.clone(),
            Node::Provider(_) => "<provider>".to_string(),
            Node::Async(dep) => {
                let id = dep.descriptor().id();
                match ctx.exec().and_then(|exec| exec.get_component(id)) {
                    Some(value) => format!("[{}] = {}", id, value),
                    None if dep.descriptor().defer() => format!("[{}] (deferred)", id),
                    None => format!("[{}] (unresolved)", id),
                }
            }
        };
        out.push_str(&format!("{}{}\n", indent, line));
        Ok(Visit::Descend)
    });
    match walked {
        Ok(_) => out,
        Err(never) => match never {},
    }
}

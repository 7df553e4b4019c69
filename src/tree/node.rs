//! Component tree node types

use crate::exec_context::ExecContext;
use crate::tree::context::WalkContext;
use futures::future::{BoxFuture, FutureExt};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

/// Shared handle to a tree node. Node identity is pointer identity.
pub type NodeRef<V> = Arc<Node<V>>;

type ResolverFn<V> = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<V>> + Send + Sync>;
type RenderFn<V> = Arc<dyn Fn(&V) -> Vec<NodeRef<V>> + Send + Sync>;

/// Declaration of pending asynchronous work gating a node.
pub struct Descriptor<V> {
    id: String,
    defer: bool,
    resolver: ResolverFn<V>,
}

impl<V> Descriptor<V> {
    /// Create a descriptor whose resolver is produced by `resolver`.
    ///
    /// `id` must be stable across repeated walks of the same logical node.
    pub fn new<F, Fut>(id: impl Into<String>, defer: bool, resolver: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        Self {
            id: id.into(),
            defer,
            resolver: Arc::new(move || resolver().boxed()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn defer(&self) -> bool {
        self.defer
    }

    /// Start the pending computation for this dependency.
    pub fn get_resolver(&self) -> BoxFuture<'static, anyhow::Result<V>> {
        (self.resolver)()
    }
}

impl<V> Clone for Descriptor<V> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            defer: self.defer,
            resolver: self.resolver.clone(),
        }
    }
}

impl<V> std::fmt::Debug for Descriptor<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor")
            .field("id", &self.id)
            .field("defer", &self.defer)
            .finish()
    }
}

/// A plain node with a fixed list of children.
#[derive(Debug)]
pub struct Element<V> {
    pub name: String,
    /// Context values exposed to every descendant.
    pub provides: BTreeMap<String, String>,
    pub children: Vec<NodeRef<V>>,
}

/// A node whose rendering depends on an asynchronously resolved value.
pub struct AsyncNode<V> {
    descriptor: Descriptor<V>,
    render: RenderFn<V>,
    fallback: Vec<NodeRef<V>>,
}

impl<V> AsyncNode<V> {
    pub fn descriptor(&self) -> &Descriptor<V> {
        &self.descriptor
    }

    pub fn render(&self, value: &V) -> Vec<NodeRef<V>> {
        (self.render)(value)
    }
}

/// Wrapper exposing an execution context to its subtree.
pub struct Provider<V> {
    pub exec: Arc<ExecContext<V>>,
    pub child: NodeRef<V>,
}

/// Node of a component tree.
pub enum Node<V> {
    Element(Element<V>),
    Async(AsyncNode<V>),
    Provider(Provider<V>),
}

impl<V> Node<V> {
    pub fn element(name: impl Into<String>, children: Vec<NodeRef<V>>) -> NodeRef<V> {
        Arc::new(Node::Element(Element {
            name: name.into(),
            provides: BTreeMap::new(),
            children,
        }))
    }

    pub fn element_with_context(
        name: impl Into<String>,
        provides: BTreeMap<String, String>,
        children: Vec<NodeRef<V>>,
    ) -> NodeRef<V> {
        Arc::new(Node::Element(Element {
            name: name.into(),
            provides,
            children,
        }))
    }

    pub fn leaf(name: impl Into<String>) -> NodeRef<V> {
        Self::element(name, Vec::new())
    }

    /// Dependency-bearing node that renders `render(value)` once resolved and
    /// nothing before.
    pub fn async_node<R>(descriptor: Descriptor<V>, render: R) -> NodeRef<V>
    where
        R: Fn(&V) -> Vec<NodeRef<V>> + Send + Sync + 'static,
    {
        Self::async_with_fallback(descriptor, render, Vec::new())
    }

    pub fn async_with_fallback<R>(
        descriptor: Descriptor<V>,
        render: R,
        fallback: Vec<NodeRef<V>>,
    ) -> NodeRef<V>
    where
        R: Fn(&V) -> Vec<NodeRef<V>> + Send + Sync + 'static,
    {
        Arc::new(Node::Async(AsyncNode {
            descriptor,
            render: Arc::new(render),
            fallback,
        }))
    }

    pub fn provider(exec: Arc<ExecContext<V>>, child: NodeRef<V>) -> NodeRef<V> {
        Arc::new(Node::Provider(Provider { exec, child }))
    }

    /// Capability query: the pending-work descriptor, for dependency nodes.
    pub fn descriptor(&self) -> Option<&Descriptor<V>> {
        match self {
            Node::Async(node) => Some(&node.descriptor),
            Node::Element(_) | Node::Provider(_) => None,
        }
    }

    /// Short label used in logs and errors.
    pub fn label(&self) -> &str {
        match self {
            Node::Element(element) => &element.name,
            Node::Async(node) => node.descriptor.id(),
            Node::Provider(_) => "Provider",
        }
    }

    /// Children of this node as rendered under `ctx`.
    ///
    /// A dependency node renders from the value registered in the in-scope
    /// execution context, falling back while nothing is registered.
    pub fn children(&self, ctx: &WalkContext<V>) -> Vec<NodeRef<V>> {
        match self {
            Node::Element(element) => element.children.clone(),
            Node::Provider(provider) => vec![provider.child.clone()],
            Node::Async(node) => {
                let value = ctx
                    .exec()
                    .and_then(|exec| exec.get_component(node.descriptor.id()));
                match value {
                    Some(value) => node.render(&value),
                    None => node.fallback.clone(),
                }
            }
        }
    }

    /// Context handed to this node's children.
    pub fn child_context(&self, ctx: &WalkContext<V>) -> WalkContext<V> {
        match self {
            Node::Element(element) => ctx.extend(&element.provides),
            Node::Provider(provider) => ctx.with_exec(provider.exec.clone()),
            Node::Async(_) => ctx.clone(),
        }
    }
}

impl<V> std::fmt::Debug for Node<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Element(element) => f
                .debug_struct("Element")
                .field("name", &element.name)
                .field("children", &element.children.len())
                .finish(),
            Node::Async(node) => f
                .debug_struct("Async")
                .field("descriptor", &node.descriptor)
                .finish(),
            Node::Provider(provider) => f
                .debug_struct("Provider")
                .field("exec", &provider.exec)
                .finish(),
        }
    }
}

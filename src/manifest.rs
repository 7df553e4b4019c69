//! Declarative component trees.
//!
//! A manifest describes a tree of elements and dependency nodes in JSON or
//! TOML. Building it produces a [`NodeRef<String>`] whose dependency
//! resolvers simulate asynchronous work with the tokio timer.
//!
//! ```json
//! {
//!   "root": {
//!     "type": "element", "name": "App",
//!     "children": [
//!       { "type": "async", "id": "user", "delay_ms": 5, "value": "alice",
//!         "renders": [ { "type": "element", "name": "Hello {value}" } ] }
//!     ]
//!   }
//! }
//! ```

use crate::error::PrefetchError;
use crate::tree::node::{Descriptor, Node, NodeRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Placeholder replaced by the resolved value in rendered element names
pub const VALUE_PLACEHOLDER: &str = "{value}";

/// One node of a manifest tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeSpec {
    Element {
        name: String,
        /// Key/value pairs made visible to every descendant's walk context
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        provides: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<NodeSpec>,
    },
    Async {
        id: String,
        #[serde(default)]
        defer: bool,
        /// Simulated latency of the resolver
        #[serde(default)]
        delay_ms: u64,
        /// Resolved value; the id when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        /// When set, the resolver fails with this message
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fail: Option<String>,
        /// Rendered while nothing is registered for `id`
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        fallback: Vec<NodeSpec>,
        /// Rendered once a value is registered for `id`
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        renders: Vec<NodeSpec>,
    },
}

impl NodeSpec {
    pub fn element(name: impl Into<String>, children: Vec<NodeSpec>) -> Self {
        NodeSpec::Element {
            name: name.into(),
            provides: BTreeMap::new(),
            children,
        }
    }

    /// Dependency spec with no latency, no failure and the id as its value
    pub fn dependency(id: impl Into<String>, defer: bool, renders: Vec<NodeSpec>) -> Self {
        NodeSpec::Async {
            id: id.into(),
            defer,
            delay_ms: 0,
            value: None,
            fail: None,
            fallback: Vec::new(),
            renders,
        }
    }

    fn collect_ids<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            NodeSpec::Element { children, .. } => {
                for child in children {
                    child.collect_ids(out);
                }
            }
            NodeSpec::Async {
                id,
                fallback,
                renders,
                ..
            } => {
                out.push(id);
                for child in fallback.iter().chain(renders) {
                    child.collect_ids(out);
                }
            }
        }
    }

    fn build(&self, value: Option<&str>) -> NodeRef<String> {
        match self {
            NodeSpec::Element {
                name,
                provides,
                children,
            } => {
                let name = match value {
                    Some(value) => name.replace(VALUE_PLACEHOLDER, value),
                    None => name.clone(),
                };
                let children = children.iter().map(|c| c.build(value)).collect();
                Node::element_with_context(name, provides.clone(), children)
            }
            NodeSpec::Async {
                id,
                defer,
                delay_ms,
                value: resolved,
                fail,
                fallback,
                renders,
            } => {
                let delay = Duration::from_millis(*delay_ms);
                let resolved = resolved.clone().unwrap_or_else(|| id.clone());
                let fail = fail.clone();
                let dep_id = id.clone();
                let descriptor = Descriptor::new(id.clone(), *defer, move || {
                    let resolved = resolved.clone();
                    let fail = fail.clone();
                    let dep_id = dep_id.clone();
                    async move {
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        match fail {
                            Some(message) => Err(anyhow::anyhow!(message)
                                .context(format!("resolving '{}'", dep_id))),
                            None => Ok(resolved),
                        }
                    }
                });

                let renders = Arc::new(renders.clone());
                let fallback = fallback.iter().map(|c| c.build(value)).collect();
                Node::async_with_fallback(
                    descriptor,
                    move |value: &String| renders.iter().map(|c| c.build(Some(value))).collect(),
                    fallback,
                )
            }
        }
    }
}

/// A named, declarative component tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub root: NodeSpec,
}

impl Manifest {
    pub fn new(root: NodeSpec) -> Self {
        Self { name: None, root }
    }

    /// Load a manifest, choosing the format from the file extension
    /// (`.toml` for TOML, anything else as JSON).
    pub fn load(path: &Path) -> Result<Self, PrefetchError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PrefetchError::Manifest(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let is_toml = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);
        if is_toml {
            Self::from_toml_str(&text)
        } else {
            Self::from_json_str(&text)
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, PrefetchError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, PrefetchError> {
        Ok(toml::from_str(text)?)
    }

    /// Every declared dependency id in document order, including ids inside
    /// fallback and rendered subtrees.
    pub fn dependency_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.root.collect_ids(&mut ids);
        ids
    }

    /// Ids declared more than once, each reported once in order of first repeat
    pub fn duplicate_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut duplicates = Vec::new();
        for id in self.dependency_ids() {
            if !seen.insert(id) && reported.insert(id) {
                duplicates.push(id);
            }
        }
        duplicates
    }

    /// Build the component tree
    pub fn build(&self) -> NodeRef<String> {
        self.root.build(None)
    }
}

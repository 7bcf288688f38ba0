//! Object path tree
//!
//! `GetManagedObjects` returns a flat map of object paths. The projection
//! wants to walk adapters and their devices, so the flat map is folded into
//! a tree keyed by cumulative path prefixes:
//!
//! ```text
//! root
//!  └─ /net
//!      └─ /net/connman
//!          └─ /net/connman/iwd
//!              ├─ /net/connman/iwd/0        (Adapter)
//!              │   └─ /net/connman/iwd/0/4  (Device, Station)
//!              └─ /net/connman/iwd/6e6574_psk (KnownNetwork)
//! ```
//!
//! Intermediate prefixes that carry no interfaces still get a node. The tree
//! is rebuilt from scratch on every poll.

use std::collections::BTreeMap;

use super::error::TreeError;
use super::types::{InterfaceBag, ObjectMap, PropertyMap};

/// A node in the object path tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeNode {
    /// Interfaces published at this node's path (empty for bare prefixes)
    pub interfaces: InterfaceBag,
    /// Nodes exactly one segment deeper, keyed by their full path
    pub children: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    /// Child node stored under the full path `path`
    pub fn child(&self, path: &str) -> Option<&TreeNode> {
        self.children.get(path)
    }

    /// Walk from this node down to `path` one prefix at a time
    ///
    /// # Errors
    ///
    /// Returns `TreeError::MissingNamespace` naming the first prefix that has
    /// no node.
    pub fn descend(&self, path: &str) -> Result<&TreeNode, TreeError> {
        let mut node = self;
        for prefix in prefixes(path) {
            node = node
                .child(&prefix)
                .ok_or(TreeError::MissingNamespace { path: prefix })?;
        }
        Ok(node)
    }

    /// Whether this node carries the interface `name`
    pub fn has_interface(&self, name: &str) -> bool {
        self.interfaces.contains_key(name)
    }

    /// Properties of the interface `name`, if present
    pub fn interface(&self, name: &str) -> Option<&PropertyMap> {
        self.interfaces.get(name)
    }

    /// Iterate children carrying the interface `name`, in lexical path order
    pub fn children_with<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a TreeNode)> + 'a {
        self.children
            .iter()
            .filter(move |(_, node)| node.has_interface(name))
            .map(|(path, node)| (path.as_str(), node))
    }

    fn merge(&mut self, interfaces: &InterfaceBag) {
        for (name, properties) in interfaces {
            self.interfaces
                .entry(name.clone())
                .or_default()
                .extend(properties.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }
}

/// Cumulative prefixes of an object path, shallowest first
///
/// `/net/connman/iwd` yields `/net`, `/net/connman`, `/net/connman/iwd`.
/// The root path `/` (and the empty string) yields nothing.
fn prefixes(path: &str) -> Vec<String> {
    let trimmed = path.trim_end_matches('/');
    let segments: Vec<&str> = trimmed.split('/').collect();

    (1..segments.len())
        .map(|depth| segments[..=depth].join("/"))
        .collect()
}

/// Build the object path tree from a flat `GetManagedObjects` result
pub fn build(objects: &ObjectMap) -> TreeNode {
    let mut root = TreeNode::default();

    for (path, interfaces) in objects {
        let mut node = &mut root;
        for prefix in prefixes(path) {
            node = node.children.entry(prefix).or_default();
        }
        node.merge(interfaces);
    }

    root
}

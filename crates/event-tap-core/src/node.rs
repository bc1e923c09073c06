//! Element tree the dispatcher routes events through.

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Opaque element identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single element: tag, optional id, classes and a parent link.
#[derive(Debug, Clone)]
pub struct NodeData {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    parent: Option<NodeId>,
}

impl NodeData {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Arena of elements. Nodes are never removed.
#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    nodes: Vec<NodeData>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element. Tags are stored lowercase.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            parent: None,
        });
        id
    }

    pub fn get(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.index())
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(NodeData::parent)
    }

    pub fn set_id(&mut self, node: NodeId, id: &str) -> CoreResult<()> {
        self.get_mut(node)?.id = Some(id.to_string());
        Ok(())
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> CoreResult<()> {
        let data = self.get_mut(node)?;
        if !data.has_class(class) {
            data.classes.push(class.to_string());
        }
        Ok(())
    }

    /// Attach `child` under `parent`, moving it if it already has a parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> CoreResult<()> {
        if !self.contains(child) {
            return Err(CoreError::UnknownNode(child));
        }
        if !self.contains(parent) {
            return Err(CoreError::UnknownNode(parent));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(CoreError::Cycle { parent, child });
        }
        self.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Iterate from `node` up to the root, `node` first.
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.contains(node).then_some(node),
        }
    }

    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|n| n == ancestor)
    }

    fn get_mut(&mut self, node: NodeId) -> CoreResult<&mut NodeData> {
        self.nodes
            .get_mut(node.index())
            .ok_or(CoreError::UnknownNode(node))
    }
}

/// Iterator returned by [`NodeTree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a NodeTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

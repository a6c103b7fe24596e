use indexmap::IndexMap;

use super::CollectionObserver;
use crate::PathSegment;
use crate::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeId(usize);

#[derive(Debug)]
struct Node {
    observer: CollectionObserver,
    children: IndexMap<PathSegment, NodeId>,
    depth: usize,
    /// Container identities from the tree root down to this node
    lineage: Vec<usize>,
}

/// Mirrors the live container subtree below a value with one
/// [`CollectionObserver`] per container.
///
/// Nodes live in an arena and only parents reference children. When a slot's
/// value is replaced the child subtree is rebuilt from the new value; when a
/// slot is removed or stops holding a container its subtree is closed.
/// A container already present on the path from the root is not descended
/// into again, so cyclic graphs are safe.
#[derive(Debug)]
pub struct DeepObserverTree {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    root: Option<NodeId>,
    /// `Some(0)` observes the root container only
    max_depth: Option<usize>,
}

impl DeepObserverTree {
    /// Observe the whole subtree below `value`
    pub fn new(value: &Value) -> Self {
        Self::with_max_depth(value, None)
    }

    /// Observe the top-level shape of `value` only
    pub fn shallow(value: &Value) -> Self {
        Self::with_max_depth(value, Some(0))
    }

    pub fn with_max_depth(
        value: &Value,
        max_depth: Option<usize>,
    ) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            max_depth,
        };
        tree.root = tree.build(value, 0, Vec::new());
        tree
    }

    /// Poll every node top-down; true if any container changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();

        while let Some(id) = stack.pop() {
            let delta = match self.node_mut(id) {
                Some(node) => node.observer.poll(),
                None => continue,
            };

            if let Some(delta) = delta {
                changed = true;
                for key in delta.removed.keys() {
                    self.detach_child(id, key);
                }
                for (key, value) in delta.added.iter().chain(delta.changed.iter()) {
                    self.detach_child(id, key);
                    self.attach_child(id, key, value);
                }
            }

            if let Some(node) = self.node(id) {
                // Reverse keeps siblings polled in slot order
                stack.extend(node.children.values().rev().copied());
            }
        }

        changed
    }

    /// Drop the current subtree and observe `value` instead
    pub fn reset(
        &mut self,
        value: &Value,
    ) {
        self.close();
        self.root = self.build(value, 0, Vec::new());
    }

    /// Close every node
    pub fn close(&mut self) {
        if let Some(root) = self.root.take() {
            self.release(root);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.root.is_none()
    }

    /// Number of live container observers
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    fn node(
        &self,
        id: NodeId,
    ) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(
        &mut self,
        id: NodeId,
    ) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn build(
        &mut self,
        value: &Value,
        depth: usize,
        mut lineage: Vec<usize>,
    ) -> Option<NodeId> {
        let identity = value.container_identity()?;
        if lineage.contains(&identity) {
            return None;
        }
        lineage.push(identity);

        let id = self.allocate(Node {
            observer: CollectionObserver::new(value),
            children: IndexMap::new(),
            depth,
            lineage: lineage.clone(),
        });

        if self.max_depth.map_or(true, |max| depth < max) {
            for (key, child) in value.container_entries() {
                if let Some(child_id) = self.build(&child, depth + 1, lineage.clone()) {
                    if let Some(node) = self.node_mut(id) {
                        node.children.insert(key, child_id);
                    }
                }
            }
        }

        Some(id)
    }

    fn attach_child(
        &mut self,
        parent: NodeId,
        key: &PathSegment,
        value: &Value,
    ) {
        let (depth, lineage) = match self.node(parent) {
            Some(node) => (node.depth, node.lineage.clone()),
            None => return,
        };
        if self.max_depth.is_some_and(|max| depth >= max) {
            return;
        }
        if let Some(child) = self.build(value, depth + 1, lineage) {
            if let Some(node) = self.node_mut(parent) {
                node.children.insert(key.clone(), child);
            }
        }
    }

    fn detach_child(
        &mut self,
        parent: NodeId,
        key: &PathSegment,
    ) {
        let child = self
            .node_mut(parent)
            .and_then(|node| node.children.shift_remove(key));
        if let Some(child) = child {
            self.release(child);
        }
    }

    fn release(
        &mut self,
        id: NodeId,
    ) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(mut node) = self.nodes.get_mut(id.0).and_then(Option::take) {
                node.observer.close();
                stack.extend(node.children.values().copied());
                self.free.push(id.0);
            }
        }
    }

    fn allocate(
        &mut self,
        node: Node,
    ) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }
}

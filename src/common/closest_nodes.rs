use std::vec::IntoIter;

use crate::common::{Id, Node};

#[derive(Debug, Clone)]
/// The `k` closest nodes to a target seen so far, sorted by XOR distance.
///
/// Empty slots are simply absent, so a short result never contains a
/// placeholder node.
pub struct ClosestNodes {
    target: Id,
    k: usize,
    nodes: Vec<Node>,
}

impl ClosestNodes {
    pub fn new(target: Id, k: usize) -> Self {
        Self {
            target,
            k,
            nodes: Vec::with_capacity(k + 1),
        }
    }

    // === Getters ===

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // === Public Methods ===

    /// Offer a node to the selection.
    ///
    /// A node is placed after every node at an equal or smaller distance, so on
    /// ties the node offered first wins. Duplicated Ids are ignored.
    pub fn add(&mut self, node: Node) {
        if self.k == 0 || self.nodes.iter().any(|n| n.same_id(&node)) {
            return;
        }

        let seek = node.id().xor(&self.target);
        let position = self
            .nodes
            .partition_point(|probe| probe.id().xor(&self.target) <= seek);

        if position < self.k {
            self.nodes.insert(position, node);
            self.nodes.truncate(self.k);
        }
    }
}

impl IntoIterator for ClosestNodes {
    type Item = Node;
    type IntoIter = IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> IntoIterator for &'a ClosestNodes {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

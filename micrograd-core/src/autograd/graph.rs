use crate::autograd::node::{Node, NodeId, OpKind, Operation};
use crate::error::MicrogradError;
use crate::ops::activation::tanh_op;
use crate::ops::arithmetic::{add_op, mul_op};
use log::trace;
use std::collections::HashSet;

/// Arena holding every node of a computation graph.
///
/// Nodes are appended as they are built and addressed by [`NodeId`]. Operands can
/// only refer to nodes that already exist, so the graph is acyclic by construction.
/// Parameters are usually created first; per-iteration nodes built on top of them
/// are dropped again with [`Graph::rewind`].
#[derive(Clone, Debug, Default)]
pub struct Graph {
    pub(crate) nodes: Vec<Node>,
    generation: u64,
}

/// Marker returned by [`Graph::checkpoint`]. Rewinding to it drops every node
/// created afterwards.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Checkpoint(usize);

impl Graph {
    pub fn new() -> Self {
        Graph {
            nodes: Vec::new(),
            generation: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Graph {
            nodes: Vec::with_capacity(capacity),
            generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Creates a leaf node (input, weight, bias or constant) with a zero gradient.
    pub fn leaf(&mut self, value: f64) -> NodeId {
        self.push(Node::new(value, Operation::Leaf))
    }

    /// Same as [`Graph::leaf`] with a diagnostic label attached.
    pub fn leaf_with_label(&mut self, value: f64, label: impl Into<String>) -> NodeId {
        let id = self.leaf(value);
        self.nodes[id.0].label = Some(label.into());
        id
    }

    pub(crate) fn push(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len(), self.generation);
        node.generation = self.generation;
        self.nodes.push(node);
        id
    }

    /// Returns the node behind `id`, or `InvalidNode` if the id does not belong
    /// to this arena (foreign graph, or dropped by a rewind even when its index
    /// has since been reused).
    pub fn node(&self, id: NodeId) -> Result<&Node, MicrogradError> {
        self.nodes
            .get(id.0)
            .filter(|node| node.generation == id.1)
            .ok_or(MicrogradError::InvalidNode {
                id: id.0,
                len: self.nodes.len(),
            })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, MicrogradError> {
        let len = self.nodes.len();
        self.nodes
            .get_mut(id.0)
            .filter(|node| node.generation == id.1)
            .ok_or(MicrogradError::InvalidNode { id: id.0, len })
    }

    pub fn value(&self, id: NodeId) -> Result<f64, MicrogradError> {
        Ok(self.node(id)?.value)
    }

    pub fn grad(&self, id: NodeId) -> Result<f64, MicrogradError> {
        Ok(self.node(id)?.grad)
    }

    pub fn label(&self, id: NodeId) -> Result<Option<&str>, MicrogradError> {
        Ok(self.node(id)?.label())
    }

    pub fn set_label(&mut self, id: NodeId, label: impl Into<String>) -> Result<(), MicrogradError> {
        self.node_mut(id)?.label = Some(label.into());
        Ok(())
    }

    /// Overwrites the value of a leaf. Nodes produced by an operation keep the
    /// value computed from their operands, so they are rejected with `NotALeaf`.
    pub fn set_value(&mut self, id: NodeId, value: f64) -> Result<(), MicrogradError> {
        let node = self.node_mut(id)?;
        if !node.op.is_leaf() {
            return Err(MicrogradError::NotALeaf { id: id.0 });
        }
        node.value = value;
        Ok(())
    }

    pub fn set_grad(&mut self, id: NodeId, grad: f64) -> Result<(), MicrogradError> {
        self.node_mut(id)?.grad = grad;
        Ok(())
    }

    /// Resets the gradient of every listed node to zero.
    pub fn zero_grad<I>(&mut self, ids: I) -> Result<(), MicrogradError>
    where
        I: IntoIterator<Item = NodeId>,
    {
        for id in ids {
            self.set_grad(id, 0.0)?;
        }
        Ok(())
    }

    /// Resets the gradient of every node in the arena.
    pub fn zero_all_grads(&mut self) {
        for node in &mut self.nodes {
            node.grad = 0.0;
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.nodes.len())
    }

    /// Drops every node created after `checkpoint`. Ids of dropped nodes stay
    /// invalid for good: nodes created afterwards may reuse an index but belong
    /// to a new generation.
    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        let dropped = self.nodes.len().saturating_sub(checkpoint.0);
        trace!("Graph::rewind: dropping {} nodes", dropped);
        if dropped > 0 {
            self.nodes.truncate(checkpoint.0);
            self.generation += 1;
        }
    }

    pub fn add(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, MicrogradError> {
        add_op(self, a, b)
    }

    pub fn mul(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, MicrogradError> {
        mul_op(self, a, b)
    }

    pub fn tanh(&mut self, a: NodeId) -> Result<NodeId, MicrogradError> {
        tanh_op(self, a)
    }

    /// Builds a node from a runtime operation tag and an operand slice.
    ///
    /// The slice length must equal the operation's arity, otherwise
    /// `OperandCountMismatch` is returned and nothing is added to the graph.
    /// `OpKind::Leaf` takes no operands and yields a zero-valued leaf.
    pub fn apply(&mut self, kind: OpKind, operands: &[NodeId]) -> Result<NodeId, MicrogradError> {
        if operands.len() != kind.arity() {
            return Err(MicrogradError::OperandCountMismatch {
                op: kind,
                expected: kind.arity(),
                actual: operands.len(),
            });
        }
        match kind {
            OpKind::Leaf => Ok(self.leaf(0.0)),
            OpKind::Add => add_op(self, operands[0], operands[1]),
            OpKind::Mul => mul_op(self, operands[0], operands[1]),
            OpKind::Tanh => tanh_op(self, operands[0]),
        }
    }

    /// Returns every node reachable from `root`, operands before the nodes that
    /// consume them (depth-first post-order, operands visited in order).
    ///
    /// Each node appears once even when it is shared by several dependents.
    pub fn topological_order(&self, root: NodeId) -> Result<Vec<NodeId>, MicrogradError> {
        self.node(root)?;

        let mut order = Vec::new();
        let mut visited: HashSet<NodeId> = HashSet::new();
        // (node, operands_done): a node is emitted when popped the second time.
        let mut stack = vec![(root, false)];

        while let Some((id, operands_done)) = stack.pop() {
            if operands_done {
                order.push(id);
                continue;
            }
            if !visited.insert(id) {
                continue;
            }
            stack.push((id, true));
            // Reversed so the first operand is explored first.
            for operand in self.nodes[id.0].operands().rev() {
                if !visited.contains(&operand) {
                    stack.push((operand, false));
                }
            }
        }

        Ok(order)
    }

    /// Reverse-mode differentiation from `root`.
    ///
    /// Sets `root`'s gradient to 1.0 and accumulates d(root)/d(node) into every
    /// reachable node. Gradients are added to whatever the nodes already hold;
    /// callers zero them between passes.
    pub fn backward(&mut self, root: NodeId) -> Result<(), MicrogradError> {
        let order = self.topological_order(root)?;
        trace!("Graph::backward: {} reachable nodes from {}", order.len(), root);

        self.nodes[root.0].grad = 1.0;

        for &id in order.iter().rev() {
            let node = &self.nodes[id.0];
            let nodes = &self.nodes;
            let contributions = node
                .op
                .backward(node.value, node.grad, |operand| nodes[operand.0].value);
            for (operand, grad) in contributions.into_iter().flatten() {
                self.nodes[operand.0].grad += grad;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;

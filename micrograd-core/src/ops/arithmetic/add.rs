use crate::autograd::{Graph, Node, NodeId, Operation};
use crate::error::MicrogradError;

/// Adds two nodes, recording `Operation::Add(a, b)` on the result.
///
/// Neither operand is modified. During backward the upstream gradient flows
/// unchanged to both operands (dL/da = dL/db = dL/dOutput).
///
/// # Errors
/// `InvalidNode` if either id does not belong to `graph`.
pub fn add_op(graph: &mut Graph, a: NodeId, b: NodeId) -> Result<NodeId, MicrogradError> {
    let value = graph.value(a)? + graph.value(b)?;
    Ok(graph.push(Node::new(value, Operation::Add(a, b))))
}

#[cfg(test)]
#[path = "add_test.rs"]
mod tests;

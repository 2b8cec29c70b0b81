use crate::autograd::{Graph, Node, NodeId, Operation};
use crate::error::MicrogradError;

/// Multiplies two nodes, recording `Operation::Mul(a, b)` on the result.
///
/// Backward applies the product rule: each operand receives the upstream
/// gradient scaled by the *other* operand's value.
///
/// # Errors
/// `InvalidNode` if either id does not belong to `graph`.
pub fn mul_op(graph: &mut Graph, a: NodeId, b: NodeId) -> Result<NodeId, MicrogradError> {
    let value = graph.value(a)? * graph.value(b)?;
    Ok(graph.push(Node::new(value, Operation::Mul(a, b))))
}

#[cfg(test)]
#[path = "mul_test.rs"]
mod tests;

use crate::autograd::{Graph, Node, NodeId, Operation};
use crate::error::MicrogradError;

/// Applies the hyperbolic tangent, recording `Operation::Tanh(a)`.
///
/// Large magnitudes saturate to +/-1 (and the local derivative to 0); this is
/// ordinary floating-point behaviour, not an error.
pub fn tanh_op(graph: &mut Graph, a: NodeId) -> Result<NodeId, MicrogradError> {
    let value = graph.value(a)?.tanh();
    Ok(graph.push(Node::new(value, Operation::Tanh(a))))
}

#[cfg(test)]
#[path = "tanh_test.rs"]
mod tests;

use crate::autograd::{Graph, NodeId};
use crate::error::MicrogradError;

/// The base trait for network modules (layers and whole networks).
///
/// A module owns leaf nodes (its parameters) inside a [`Graph`] and builds new
/// nodes on top of them when evaluated.
pub trait Module: std::fmt::Debug {
    /// Performs a forward pass of the module.
    ///
    /// # Arguments
    /// * `graph`: The arena holding the module's parameters; new nodes are appended to it.
    /// * `inputs`: The input nodes, one per input feature.
    ///
    /// # Returns
    /// One output node per output feature, or `ArityMismatch` if `inputs` has the
    /// wrong length.
    fn forward(&self, graph: &mut Graph, inputs: &[NodeId]) -> Result<Vec<NodeId>, MicrogradError>;

    /// Returns all learnable parameters of the module, in a stable order.
    ///
    /// Optimizers and the persistence layer rely on this order: index `i` always
    /// refers to the same weight or bias.
    fn parameters(&self) -> Vec<NodeId>;

    /// Returns the parameters along with hierarchical names
    /// (e.g., "layer0.neuron1.w2", "layer0.neuron1.b").
    fn named_parameters(&self) -> Vec<(String, NodeId)>;

    /// Number of scalar parameters.
    fn num_parameters(&self) -> usize {
        self.parameters().len()
    }

    /// Resets the gradient of every parameter to zero.
    ///
    /// Backward passes only ever add to gradients, so this must run between
    /// training iterations.
    fn zero_grad(&self, graph: &mut Graph) -> Result<(), MicrogradError> {
        graph.zero_grad(self.parameters())
    }
}

use crate::autograd::{Graph, NodeId};
use crate::error::MicrogradError;

/// Common interface of all optimizers.
///
/// Optimizers update parameter leaves in place from the gradients accumulated
/// by [`Graph::backward`].
pub trait Optimizer {
    /// Performs a single optimization step over every managed parameter.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the step was successful, or `InvalidNode` / `NotALeaf` when a
    /// managed id is not a live parameter leaf of `graph`.
    fn step(&mut self, graph: &mut Graph) -> Result<(), MicrogradError>;

    /// Clears the gradients of all managed parameters.
    ///
    /// Backward passes accumulate, so this is called once per iteration,
    /// after the step and before the next backward pass.
    fn zero_grad(&mut self, graph: &mut Graph) -> Result<(), MicrogradError>;

    /// The parameters updated by this optimizer, in update order.
    fn params(&self) -> &[NodeId];
}

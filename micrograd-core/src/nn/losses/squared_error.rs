use crate::autograd::{Graph, NodeId};
use crate::error::MicrogradError;

/// Specifies the reduction to apply over per-sample errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reduction {
    #[default]
    Sum,
    Mean,
}

/// `(output - target)^2`, built from the engine's add and mul only.
///
/// The subtraction is an addition of a constant leaf holding `-target`; the
/// target itself is not a parameter and receives no useful gradient.
pub fn squared_error(graph: &mut Graph, output: NodeId, target: f64) -> Result<NodeId, MicrogradError> {
    let neg_target = graph.leaf_with_label(-target, "target");
    let diff = graph.add(output, neg_target)?;
    graph.mul(diff, diff)
}

/// Squared-error loss between network outputs and scalar targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredErrorLoss {
    reduction: Reduction,
}

impl SquaredErrorLoss {
    pub fn new(reduction: Reduction) -> Self {
        SquaredErrorLoss { reduction }
    }

    pub fn reduction(&self) -> Reduction {
        self.reduction
    }

    /// Builds a single scalar loss node over all `(output, target)` pairs.
    ///
    /// The accumulation starts from a zero leaf and adds each squared error in
    /// order, so an empty batch yields a loss of 0. The returned node is
    /// labelled `loss`.
    pub fn calculate(
        &self,
        graph: &mut Graph,
        outputs: &[NodeId],
        targets: &[f64],
    ) -> Result<NodeId, MicrogradError> {
        if outputs.len() != targets.len() {
            return Err(MicrogradError::ArityMismatch {
                expected: outputs.len(),
                actual: targets.len(),
                operation: "SquaredErrorLoss::calculate (targets)".to_string(),
            });
        }

        let mut loss = graph.leaf(0.0);
        for (&output, &target) in outputs.iter().zip(targets) {
            let err = squared_error(graph, output, target)?;
            loss = graph.add(loss, err)?;
        }

        if self.reduction == Reduction::Mean && !outputs.is_empty() {
            let scale = graph.leaf(1.0 / outputs.len() as f64);
            loss = graph.mul(loss, scale)?;
        }
        graph.set_label(loss, "loss")?;
        Ok(loss)
    }
}

#[cfg(test)]
#[path = "squared_error_test.rs"]
mod tests;

use super::node::{NodeId, Operation};

/// Gradient contributions an operation pushes onto its operands: at most two,
/// in operand order. Fixed-size so the backward walk does not allocate per node.
pub(crate) type Contributions = [Option<(NodeId, f64)>; 2];

impl Operation {
    /// Applies the chain rule for this operation.
    ///
    /// `value` is the forward value of the node that owns the operation and
    /// `grad` its accumulated gradient (dL/dOutput). `operand_value` reads the
    /// forward value of an operand. The returned pairs are dL/dInput_i for each
    /// operand, to be *added* to the operand's gradient.
    pub(crate) fn backward<F>(&self, value: f64, grad: f64, operand_value: F) -> Contributions
    where
        F: Fn(NodeId) -> f64,
    {
        match *self {
            Operation::Leaf => [None, None],
            Operation::Add(a, b) => [Some((a, grad)), Some((b, grad))],
            Operation::Mul(a, b) => [
                Some((a, grad * operand_value(b))),
                Some((b, grad * operand_value(a))),
            ],
            // d/dx tanh(x) = 1 - tanh(x)^2, taken from the node's own output.
            Operation::Tanh(a) => [Some((a, grad * (1.0 - value * value))), None],
        }
    }
}

use crate::autograd::{Graph, NodeId};
use crate::error::MicrogradError;
use crate::nn::init::Init;
use rand::Rng;

/// A single unit computing `tanh(bias + sum_i w_i * x_i)`.
///
/// Weights and bias are leaves of the graph the neuron was created in; they live
/// as long as that graph is not rewound past them.
#[derive(Debug, Clone, PartialEq)]
pub struct Neuron {
    weights: Vec<NodeId>,
    bias: NodeId,
}

impl Neuron {
    /// Creates a neuron with `nin` weights drawn from the default initialisation
    /// (uniform in [-1, 1)). Weights are drawn before the bias.
    pub fn new<R: Rng + ?Sized>(
        graph: &mut Graph,
        nin: usize,
        name: &str,
        rng: &mut R,
    ) -> Result<Self, MicrogradError> {
        Self::with_init(graph, nin, name, &Init::default(), rng)
    }

    pub fn with_init<R: Rng + ?Sized>(
        graph: &mut Graph,
        nin: usize,
        name: &str,
        init: &Init,
        rng: &mut R,
    ) -> Result<Self, MicrogradError> {
        init.validate()?;
        Self::from_source(graph, nin, name, || init.sample(rng))
    }

    /// Builds the parameters from a value source called once per weight, in index
    /// order, then once for the bias.
    pub(crate) fn from_source<F>(
        graph: &mut Graph,
        nin: usize,
        name: &str,
        mut next_value: F,
    ) -> Result<Self, MicrogradError>
    where
        F: FnMut() -> Result<f64, MicrogradError>,
    {
        let mut weights = Vec::with_capacity(nin);
        for i in 0..nin {
            let value = next_value()?;
            weights.push(graph.leaf_with_label(value, format!("{}.w{}", name, i)));
        }
        let bias = graph.leaf_with_label(next_value()?, format!("{}.b", name));
        Ok(Neuron { weights, bias })
    }

    pub fn nin(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[NodeId] {
        &self.weights
    }

    pub fn bias(&self) -> NodeId {
        self.bias
    }

    /// Evaluates the neuron on `inputs`.
    ///
    /// The sum is folded from the bias, adding `w_i * x_i` in index order, so the
    /// floating-point result is deterministic.
    pub fn forward(&self, graph: &mut Graph, inputs: &[NodeId]) -> Result<NodeId, MicrogradError> {
        if inputs.len() != self.weights.len() {
            return Err(MicrogradError::ArityMismatch {
                expected: self.weights.len(),
                actual: inputs.len(),
                operation: "Neuron::forward".to_string(),
            });
        }

        let mut act = self.bias;
        for (&w, &x) in self.weights.iter().zip(inputs) {
            let wx = graph.mul(w, x)?;
            act = graph.add(act, wx)?;
        }
        graph.tanh(act)
    }

    /// All weights followed by the bias.
    pub fn parameters(&self) -> Vec<NodeId> {
        let mut params = self.weights.clone();
        params.push(self.bias);
        params
    }

    pub fn named_parameters(&self, prefix: &str) -> Vec<(String, NodeId)> {
        let mut params: Vec<(String, NodeId)> = self
            .weights
            .iter()
            .enumerate()
            .map(|(i, &w)| (format!("{}.w{}", prefix, i), w))
            .collect();
        params.push((format!("{}.b", prefix), self.bias));
        params
    }
}

#[cfg(test)]
#[path = "neuron_test.rs"]
mod tests;

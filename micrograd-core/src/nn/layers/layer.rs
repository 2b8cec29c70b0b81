use crate::autograd::{Graph, NodeId};
use crate::error::MicrogradError;
use crate::nn::init::Init;
use crate::nn::layers::neuron::Neuron;
use crate::nn::module::Module;
use rand::Rng;

/// A set of neurons reading the same input vector; one output per neuron.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    neurons: Vec<Neuron>,
    nin: usize,
    name: String,
}

impl Layer {
    /// Creates a layer of `nout` neurons with `nin` inputs each, drawing
    /// parameters from the default initialisation.
    pub fn new<R: Rng + ?Sized>(
        graph: &mut Graph,
        nin: usize,
        nout: usize,
        name: &str,
        rng: &mut R,
    ) -> Result<Self, MicrogradError> {
        Self::with_init(graph, nin, nout, name, &Init::default(), rng)
    }

    pub fn with_init<R: Rng + ?Sized>(
        graph: &mut Graph,
        nin: usize,
        nout: usize,
        name: &str,
        init: &Init,
        rng: &mut R,
    ) -> Result<Self, MicrogradError> {
        init.validate()?;
        Self::from_source(graph, nin, nout, name, || init.sample(rng))
    }

    pub(crate) fn from_source<F>(
        graph: &mut Graph,
        nin: usize,
        nout: usize,
        name: &str,
        mut next_value: F,
    ) -> Result<Self, MicrogradError>
    where
        F: FnMut() -> Result<f64, MicrogradError>,
    {
        let neurons = (0..nout)
            .map(|i| Neuron::from_source(graph, nin, &format!("{}.neuron{}", name, i), &mut next_value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Layer {
            neurons,
            nin,
            name: name.to_string(),
        })
    }

    pub fn nin(&self) -> usize {
        self.nin
    }

    pub fn nout(&self) -> usize {
        self.neurons.len()
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Module for Layer {
    fn forward(&self, graph: &mut Graph, inputs: &[NodeId]) -> Result<Vec<NodeId>, MicrogradError> {
        if inputs.len() != self.nin {
            return Err(MicrogradError::ArityMismatch {
                expected: self.nin,
                actual: inputs.len(),
                operation: format!("Layer::forward ({})", self.name),
            });
        }
        self.neurons
            .iter()
            .map(|neuron| neuron.forward(graph, inputs))
            .collect()
    }

    fn parameters(&self) -> Vec<NodeId> {
        self.neurons.iter().flat_map(|n| n.parameters()).collect()
    }

    fn named_parameters(&self) -> Vec<(String, NodeId)> {
        self.neurons
            .iter()
            .enumerate()
            .flat_map(|(i, n)| n.named_parameters(&format!("{}.neuron{}", self.name, i)))
            .collect()
    }
}

#[cfg(test)]
#[path = "layer_test.rs"]
mod tests;

use crate::autograd::{Graph, NodeId};
use crate::error::MicrogradError;
use crate::model::state::{MlpState, NeuronState};
use crate::nn::init::Init;
use crate::nn::layers::Layer;
use crate::nn::module::Module;
use log::debug;
use rand::Rng;

/// Multilayer perceptron: an ordered stack of [`Layer`]s, each layer's outputs
/// feeding the next. The architecture is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Mlp {
    layers: Vec<Layer>,
    num_inputs: usize,
}

impl Mlp {
    /// Builds a network taking `num_inputs` inputs, with one layer per entry of
    /// `layer_sizes` (neuron counts). Every weight and bias is an independent
    /// uniform draw in [-1, 1) from `rng`.
    ///
    /// # Errors
    /// `InvalidConfig` if `layer_sizes` is empty or contains a zero.
    pub fn new<R: Rng + ?Sized>(
        graph: &mut Graph,
        num_inputs: usize,
        layer_sizes: &[usize],
        rng: &mut R,
    ) -> Result<Self, MicrogradError> {
        Self::with_init(graph, num_inputs, layer_sizes, &Init::default(), rng)
    }

    pub fn with_init<R: Rng + ?Sized>(
        graph: &mut Graph,
        num_inputs: usize,
        layer_sizes: &[usize],
        init: &Init,
        rng: &mut R,
    ) -> Result<Self, MicrogradError> {
        init.validate()?;
        Self::from_source(graph, num_inputs, layer_sizes, || init.sample(rng))
    }

    /// Rebuilds a network from persisted state.
    ///
    /// Parameters are created in the same order as [`Mlp::new`] creates them and
    /// take their values from `state`, so forward passes reproduce the saved
    /// network exactly.
    pub fn from_state(graph: &mut Graph, state: &MlpState) -> Result<Self, MicrogradError> {
        state.validate()?;
        let mut values = state.parameter_values().into_iter();
        let mlp = Self::from_source(graph, state.num_inputs, &state.layer_sizes, || {
            values.next().ok_or_else(|| {
                MicrogradError::StateMismatch("ran out of parameter values".to_string())
            })
        })?;
        debug!(
            "Mlp::from_state: restored {} parameters for layers {:?}",
            mlp.num_parameters(),
            state.layer_sizes
        );
        Ok(mlp)
    }

    fn from_source<F>(
        graph: &mut Graph,
        num_inputs: usize,
        layer_sizes: &[usize],
        mut next_value: F,
    ) -> Result<Self, MicrogradError>
    where
        F: FnMut() -> Result<f64, MicrogradError>,
    {
        if layer_sizes.is_empty() {
            return Err(MicrogradError::InvalidConfig(
                "an MLP needs at least one layer".to_string(),
            ));
        }
        if let Some(i) = layer_sizes.iter().position(|&size| size == 0) {
            return Err(MicrogradError::InvalidConfig(format!(
                "layer {} has no neurons",
                i
            )));
        }

        let mut layers = Vec::with_capacity(layer_sizes.len());
        // current size is the number of inputs of the next layer
        let mut current_size = num_inputs;
        for (i, &size) in layer_sizes.iter().enumerate() {
            let layer = Layer::from_source(graph, current_size, size, &format!("layer{}", i), &mut next_value)?;
            layers.push(layer);
            current_size = size;
        }

        Ok(Mlp { layers, num_inputs })
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.layers.last().map_or(0, Layer::nout)
    }

    pub fn layer_sizes(&self) -> Vec<usize> {
        self.layers.iter().map(Layer::nout).collect()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Wraps raw input values as leaves labelled `x0`, `x1`, ... and evaluates
    /// the network on them.
    pub fn forward_values(&self, graph: &mut Graph, inputs: &[f64]) -> Result<Vec<NodeId>, MicrogradError> {
        let nodes: Vec<NodeId> = inputs
            .iter()
            .enumerate()
            .map(|(i, &x)| graph.leaf_with_label(x, format!("x{}", i)))
            .collect();
        self.forward(graph, &nodes)
    }

    /// Snapshot of every weight and bias, grouped per layer and per neuron.
    pub fn state(&self, graph: &Graph) -> Result<MlpState, MicrogradError> {
        let layer_states = self
            .layers
            .iter()
            .map(|layer| {
                layer
                    .neurons()
                    .iter()
                    .map(|neuron| -> Result<NeuronState, MicrogradError> {
                        let weights = neuron
                            .weights()
                            .iter()
                            .map(|&w| graph.value(w))
                            .collect::<Result<Vec<f64>, _>>()?;
                        Ok(NeuronState {
                            weights,
                            bias: graph.value(neuron.bias())?,
                        })
                    })
                    .collect::<Result<Vec<NeuronState>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MlpState {
            num_inputs: self.num_inputs,
            layer_sizes: self.layer_sizes(),
            layer_states,
        })
    }

    /// Overwrites the parameters of this network with the values in `state`, in
    /// `parameters()` order. The state must describe the same architecture.
    pub fn load_state(&self, graph: &mut Graph, state: &MlpState) -> Result<(), MicrogradError> {
        state.validate()?;
        if state.num_inputs != self.num_inputs || state.layer_sizes != self.layer_sizes() {
            return Err(MicrogradError::StateMismatch(format!(
                "state describes {} inputs and layers {:?}, network has {} inputs and layers {:?}",
                state.num_inputs,
                state.layer_sizes,
                self.num_inputs,
                self.layer_sizes()
            )));
        }
        for (param, value) in self.parameters().into_iter().zip(state.parameter_values()) {
            graph.set_value(param, value)?;
        }
        Ok(())
    }
}

impl Module for Mlp {
    fn forward(&self, graph: &mut Graph, inputs: &[NodeId]) -> Result<Vec<NodeId>, MicrogradError> {
        if inputs.len() != self.num_inputs {
            return Err(MicrogradError::ArityMismatch {
                expected: self.num_inputs,
                actual: inputs.len(),
                operation: "Mlp::forward".to_string(),
            });
        }
        let mut x = inputs.to_vec();
        for layer in &self.layers {
            x = layer.forward(graph, &x)?;
        }
        Ok(x)
    }

    fn parameters(&self) -> Vec<NodeId> {
        self.layers.iter().flat_map(|l| l.parameters()).collect()
    }

    fn named_parameters(&self) -> Vec<(String, NodeId)> {
        self.layers.iter().flat_map(|l| l.named_parameters()).collect()
    }
}

#[cfg(test)]
#[path = "mlp_test.rs"]
mod tests;

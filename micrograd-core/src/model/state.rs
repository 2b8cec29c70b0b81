use crate::error::MicrogradError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Persisted weights and bias of one neuron.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NeuronState {
    pub weights: Vec<f64>,
    pub bias: f64,
}

/// Persisted form of an [`Mlp`](crate::model::Mlp).
///
/// Only values are stored: a restored parameter is always a fresh leaf with a
/// zero gradient. The JSON field names are part of the file format.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MlpState {
    pub num_inputs: usize,
    pub layer_sizes: Vec<usize>,
    pub layer_states: Vec<Vec<NeuronState>>,
}

impl MlpState {
    /// Checks that the per-neuron data agrees with the declared architecture.
    pub fn validate(&self) -> Result<(), MicrogradError> {
        if self.layer_sizes.is_empty() {
            return Err(MicrogradError::StateMismatch(
                "no layers declared".to_string(),
            ));
        }
        if self.layer_states.len() != self.layer_sizes.len() {
            return Err(MicrogradError::StateMismatch(format!(
                "{} layer sizes declared but {} layers stored",
                self.layer_sizes.len(),
                self.layer_states.len()
            )));
        }

        let mut nin = self.num_inputs;
        for (i, (&size, neurons)) in self.layer_sizes.iter().zip(&self.layer_states).enumerate() {
            if size == 0 {
                return Err(MicrogradError::StateMismatch(format!(
                    "layer {} declares no neurons",
                    i
                )));
            }
            if neurons.len() != size {
                return Err(MicrogradError::StateMismatch(format!(
                    "layer {} declares {} neurons but stores {}",
                    i,
                    size,
                    neurons.len()
                )));
            }
            if let Some(j) = neurons.iter().position(|n| n.weights.len() != nin) {
                return Err(MicrogradError::StateMismatch(format!(
                    "layer {} neuron {} has {} weights, expected {}",
                    i,
                    j,
                    neurons[j].weights.len(),
                    nin
                )));
            }
            nin = size;
        }
        Ok(())
    }

    /// All values flattened in parameter order: per layer, per neuron, weights
    /// then bias.
    pub fn parameter_values(&self) -> Vec<f64> {
        self.layer_states
            .iter()
            .flatten()
            .flat_map(|n| n.weights.iter().copied().chain(std::iter::once(n.bias)))
            .collect()
    }

    pub fn to_json(&self) -> Result<String, MicrogradError> {
        serde_json::to_string_pretty(self).map_err(|e| MicrogradError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, MicrogradError> {
        let state: MlpState =
            serde_json::from_str(json).map_err(|e| MicrogradError::Serialization(e.to_string()))?;
        state.validate()?;
        Ok(state)
    }
}

/// Writes `state` as pretty-printed JSON to `path`.
pub fn save<P: AsRef<Path>>(path: P, state: &MlpState) -> Result<(), MicrogradError> {
    let path = path.as_ref();
    let json = state.to_json()?;
    fs::write(path, json).map_err(|e| MicrogradError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    debug!("model::save: wrote {}", path.display());
    Ok(())
}

/// Reads and validates a state previously written by [`save`].
pub fn load<P: AsRef<Path>>(path: P) -> Result<MlpState, MicrogradError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| MicrogradError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let state = MlpState::from_json(&json)?;
    debug!(
        "model::load: read {} with layers {:?}",
        path.display(),
        state.layer_sizes
    );
    Ok(state)
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;

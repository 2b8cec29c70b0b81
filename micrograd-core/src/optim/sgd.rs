use crate::autograd::{Graph, NodeId};
use crate::error::MicrogradError;
use crate::optim::optimizer_trait::Optimizer;
use log::debug;

/// Hyper-parameters of [`Sgd`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SgdConfig {
    pub lr: f64,
}

impl Default for SgdConfig {
    fn default() -> Self {
        SgdConfig { lr: 0.01 }
    }
}

impl SgdConfig {
    /// Rejects a learning rate that is negative, NaN or infinite.
    pub fn validate(&self) -> Result<(), MicrogradError> {
        if !self.lr.is_finite() || self.lr < 0.0 {
            return Err(MicrogradError::InvalidConfig(format!(
                "learning rate must be finite and non-negative, got {}",
                self.lr
            )));
        }
        Ok(())
    }
}

/// Plain stochastic gradient descent: `value -= lr * grad` for every parameter.
#[derive(Debug, Clone)]
pub struct Sgd {
    params: Vec<NodeId>,
    config: SgdConfig,
    steps: usize,
}

impl Sgd {
    /// Creates an optimizer over `params` with learning rate `lr`.
    ///
    /// # Errors
    /// `InvalidConfig` if `lr` is negative or not finite.
    pub fn new(params: impl IntoIterator<Item = NodeId>, lr: f64) -> Result<Self, MicrogradError> {
        Self::with_config(params, SgdConfig { lr })
    }

    pub fn with_config(
        params: impl IntoIterator<Item = NodeId>,
        config: SgdConfig,
    ) -> Result<Self, MicrogradError> {
        config.validate()?;
        Ok(Sgd {
            params: params.into_iter().collect(),
            config,
            steps: 0,
        })
    }

    pub fn lr(&self) -> f64 {
        self.config.lr
    }

    pub fn set_lr(&mut self, lr: f64) -> Result<(), MicrogradError> {
        let config = SgdConfig { lr };
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, graph: &mut Graph) -> Result<(), MicrogradError> {
        let lr = self.config.lr;
        for &param in &self.params {
            let grad = graph.grad(param)?;
            let value = graph.value(param)?;
            graph.set_value(param, value - lr * grad)?;
        }
        self.steps += 1;
        debug!(
            "Sgd::step {}: updated {} parameters with lr={}",
            self.steps,
            self.params.len(),
            lr
        );
        Ok(())
    }

    fn zero_grad(&mut self, graph: &mut Graph) -> Result<(), MicrogradError> {
        graph.zero_grad(self.params.iter().copied())
    }

    fn params(&self) -> &[NodeId] {
        &self.params
    }
}

#[cfg(test)]
#[path = "sgd_test.rs"]
mod tests;

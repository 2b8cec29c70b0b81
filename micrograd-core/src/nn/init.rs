use crate::autograd::{Graph, NodeId};
use crate::error::MicrogradError;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Distribution used to draw initial parameter values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Init {
    /// Uniform draw in `[low, high)`.
    Uniform { low: f64, high: f64 },
    /// Gaussian draw.
    Normal { mean: f64, std: f64 },
    /// Every parameter gets the same value.
    Constant(f64),
}

impl Default for Init {
    /// Independent uniform draws in [-1, 1).
    fn default() -> Self {
        Init::Uniform {
            low: -1.0,
            high: 1.0,
        }
    }
}

impl Init {
    /// Checks the hyper-parameters without drawing anything.
    pub fn validate(&self) -> Result<(), MicrogradError> {
        match *self {
            Init::Uniform { low, high } => {
                if !(low.is_finite() && high.is_finite() && low < high) {
                    return Err(MicrogradError::InvalidConfig(format!(
                        "uniform init needs finite low < high, got [{}, {})",
                        low, high
                    )));
                }
            }
            Init::Normal { mean, std } => {
                if !(mean.is_finite() && std.is_finite() && std > 0.0) {
                    return Err(MicrogradError::InvalidConfig(format!(
                        "normal init needs a finite mean and std > 0, got mean={} std={}",
                        mean, std
                    )));
                }
            }
            Init::Constant(value) => {
                if !value.is_finite() {
                    return Err(MicrogradError::InvalidConfig(format!(
                        "constant init must be finite, got {}",
                        value
                    )));
                }
            }
        }
        Ok(())
    }

    /// Draws one value.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, MicrogradError> {
        self.validate()?;
        match *self {
            Init::Uniform { low, high } => Ok(rng.gen_range(low..high)),
            Init::Normal { mean, std } => {
                let normal = Normal::new(mean, std)
                    .map_err(|e| MicrogradError::InvalidConfig(e.to_string()))?;
                Ok(normal.sample(rng))
            }
            Init::Constant(value) => Ok(value),
        }
    }
}

/// Re-draws the value of every listed parameter in place, in order.
///
/// Operates on leaves only; gradients are left untouched.
pub fn init_<R: Rng + ?Sized>(
    graph: &mut Graph,
    params: &[NodeId],
    init: &Init,
    rng: &mut R,
) -> Result<(), MicrogradError> {
    init.validate()?;
    for &param in params {
        let value = init.sample(rng)?;
        graph.set_value(param, value)?;
    }
    Ok(())
}

// --- Tests ---
#[cfg(test)]
#[path = "init_test.rs"]
mod tests;

//! Scalar reverse-mode automatic differentiation and a small multilayer
//! perceptron built on top of it.
//!
//! ```no_run
//! use micrograd_core::{Graph, Mlp, Module, Optimizer, Sgd, SquaredErrorLoss};
//! use rand::SeedableRng;
//!
//! # fn main() -> Result<(), micrograd_core::MicrogradError> {
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let mut graph = Graph::new();
//! let mlp = Mlp::new(&mut graph, 1, &[4, 4, 1], &mut rng)?;
//! let mut sgd = Sgd::new(mlp.parameters(), 0.05)?;
//!
//! let mark = graph.checkpoint();
//! let out = mlp.forward_values(&mut graph, &[0.75])?;
//! let loss = SquaredErrorLoss::default().calculate(&mut graph, &out, &[1.0])?;
//! graph.backward(loss)?;
//! sgd.step(&mut graph)?;
//! sgd.zero_grad(&mut graph)?;
//! graph.rewind(mark);
//! # Ok(())
//! # }
//! ```

pub mod autograd;
pub mod error;
pub mod model;
pub mod nn;
pub mod ops;
pub mod optim;

pub use autograd::{Graph, NodeId};
pub use error::MicrogradError;
pub use model::{Mlp, MlpState};
pub use nn::{Init, Module, SquaredErrorLoss};
pub use optim::{Optimizer, Sgd};

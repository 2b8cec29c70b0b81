//! Optimizers for training networks built on a [`Graph`](crate::autograd::Graph).
//!
//! An optimizer owns the list of parameter ids it updates and reads their
//! gradients from the graph after a backward pass. Only plain fixed-step
//! gradient descent is provided.

pub mod optimizer_trait;
pub mod sgd;

pub use optimizer_trait::Optimizer;
pub use sgd::{Sgd, SgdConfig};

// src/nn/mod.rs
// Building blocks of the perceptron: neurons, layers, losses and initialisation.

pub mod init;
pub mod layers;
pub mod losses;
pub mod module; // Trait Module

// Re-export common items
pub use init::Init;
pub use layers::{Layer, Neuron};
pub use losses::{Reduction, SquaredErrorLoss};
pub use module::Module;

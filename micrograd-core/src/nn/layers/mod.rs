pub mod layer;
pub mod neuron;

pub use layer::Layer;
pub use neuron::Neuron;

//! Whole networks and their persisted form.

pub mod mlp;
pub mod state;

pub use mlp::Mlp;
pub use state::{load, save, MlpState, NeuronState};

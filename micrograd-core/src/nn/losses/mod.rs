// src/nn/losses/mod.rs

pub mod squared_error;

pub use squared_error::{squared_error, Reduction, SquaredErrorLoss};

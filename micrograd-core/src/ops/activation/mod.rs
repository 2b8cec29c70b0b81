//! # Activation Functions
//!
//! Non-linear activation functions applied to a single node.
//!
//! ## Currently Implemented:
//! - [`tanh`](tanh/fn.tanh_op.html): hyperbolic tangent, range (-1, 1).

pub mod tanh;

pub use tanh::tanh_op;

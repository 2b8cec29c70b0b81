//! # Scalar Operations Module (`ops`)
//!
//! Every differentiable operation of the engine lives here. Each one has a core
//! function named `xxx_op` that reads its operands from the [`Graph`](crate::autograd::Graph),
//! computes the forward value and records the matching
//! [`Operation`](crate::autograd::Operation) on the new node. The local gradient rule
//! for that variant is applied later by the backward pass.
//!
//! The operation set is closed: `add`, `mul` and `tanh`. Subtraction, negation and
//! squaring are expressed with these (see [`crate::nn::losses`]).
//!
//! ## Submodules:
//!
//! - [`arithmetic`]: binary arithmetic (add, mul).
//! - [`activation`]: non-linearities (tanh).

pub mod activation;
pub mod arithmetic;

//! Reverse-mode automatic differentiation over scalar nodes.
//!
//! Nodes live in a [`Graph`] arena and are addressed by [`NodeId`]. Each node
//! records the [`Operation`] that produced it; [`Graph::backward`] walks the
//! reachable subgraph in reverse topological order and applies the local rule of
//! every operation (see `backward_op`).

mod backward_op;
pub mod display;
pub mod grad_check;
pub mod graph;
pub mod node;

pub use grad_check::{check_grad, GradCheckError};
pub use graph::{Checkpoint, Graph};
pub use node::{Node, NodeId, OpKind, Operation};

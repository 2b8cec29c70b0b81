use crate::autograd::OpKind;
use thiserror::Error;

/// Custom error type for the micrograd engine.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum MicrogradError {
    #[error("Invalid node id {id}: not a live node of this graph ({len} nodes)")]
    InvalidNode { id: usize, len: usize },

    #[error("Operand count mismatch for {op:?}: expected {expected}, got {actual}")]
    OperandCountMismatch {
        op: OpKind,
        expected: usize,
        actual: usize,
    },

    #[error("Arity mismatch: expected {expected} inputs, got {actual} during operation {operation}")]
    ArityMismatch {
        expected: usize,
        actual: usize,
        operation: String,
    },

    #[error("Node {id} is the result of an operation; only leaf values can be overwritten")]
    NotALeaf { id: usize },

    #[error("Model state does not match its declared architecture: {0}")]
    StateMismatch(String),

    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

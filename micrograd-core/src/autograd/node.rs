use std::fmt;

/// Index of a node inside a [`Graph`](super::Graph) arena.
///
/// Ids are handed out by the graph in creation order, so an operand id is always
/// smaller than the id of any node that consumes it. Identity is the index, never
/// the numeric value: two leaves holding `1.0` are two different nodes.
///
/// The second field is the arena generation the node was created in. A rewind
/// that drops nodes starts a new generation, so an id kept across the rewind
/// never resolves to a later node reusing the same index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize, pub(crate) u64);

impl NodeId {
    /// Position of the node in its arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a node was produced. The variant carries exactly the operands the
/// operation needs, so the operand count can never disagree with the operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Input, weight, bias or constant.
    Leaf,
    Add(NodeId, NodeId),
    Mul(NodeId, NodeId),
    Tanh(NodeId),
}

/// Operation tag without operands, used by the dynamic [`Graph::apply`](super::Graph::apply)
/// entry point and in error reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    Leaf,
    Add,
    Mul,
    Tanh,
}

impl OpKind {
    /// Number of operands the operation consumes.
    pub fn arity(self) -> usize {
        match self {
            OpKind::Leaf => 0,
            OpKind::Add | OpKind::Mul => 2,
            OpKind::Tanh => 1,
        }
    }

    /// Short symbol used when printing graphs.
    pub fn symbol(self) -> &'static str {
        match self {
            OpKind::Leaf => "",
            OpKind::Add => "+",
            OpKind::Mul => "*",
            OpKind::Tanh => "tanh",
        }
    }
}

impl Operation {
    pub fn kind(&self) -> OpKind {
        match self {
            Operation::Leaf => OpKind::Leaf,
            Operation::Add(..) => OpKind::Add,
            Operation::Mul(..) => OpKind::Mul,
            Operation::Tanh(..) => OpKind::Tanh,
        }
    }

    /// The direct predecessors of the node, in operand order.
    pub fn operands(&self) -> impl DoubleEndedIterator<Item = NodeId> {
        let slots = match *self {
            Operation::Leaf => [None, None],
            Operation::Add(a, b) | Operation::Mul(a, b) => [Some(a), Some(b)],
            Operation::Tanh(a) => [Some(a), None],
        };
        slots.into_iter().flatten()
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Operation::Leaf)
    }
}

/// A scalar node of the computation graph.
///
/// `value` and `op` are fixed once the node is built (leaf values aside, which the
/// optimizer and the persistence layer overwrite through the graph). `grad`
/// accumulates d(root)/d(node) across backward passes until it is zeroed.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub(crate) value: f64,
    pub(crate) grad: f64,
    pub(crate) op: Operation,
    pub(crate) label: Option<String>,
    pub(crate) generation: u64,
}

impl Node {
    pub(crate) fn new(value: f64, op: Operation) -> Self {
        Node {
            value,
            grad: 0.0,
            op,
            label: None,
            generation: 0,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn grad(&self) -> f64 {
        self.grad
    }

    pub fn op(&self) -> Operation {
        self.op
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn operands(&self) -> impl DoubleEndedIterator<Item = NodeId> {
        self.op.operands()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value(data={}, grad={})", self.value, self.grad)
    }
}

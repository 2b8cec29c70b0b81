use crate::autograd::{Graph, NodeId};
use crate::error::MicrogradError;
use std::collections::HashSet;
use std::fmt::Write;

impl Graph {
    /// Renders the subgraph under `root` as an indented tree, one node per line:
    ///
    /// ```text
    /// └── Value(L: -8.0000, grad=1.0000) (*)
    ///     ├── Value(d: 4.0000, grad=-2.0000) (+)
    ///     ...
    /// ```
    ///
    /// A node reached again through another dependent is printed once more
    /// with a `[#id above]` marker instead of its operands, so the output has
    /// at most one line per edge. The walk uses an explicit stack.
    pub fn render_tree(&self, root: NodeId) -> Result<String, MicrogradError> {
        self.node(root)?;

        let mut out = String::new();
        let mut expanded: HashSet<NodeId> = HashSet::new();
        // (node, prefix of its line, last operand of its parent)
        let mut stack = vec![(root, String::new(), true)];

        while let Some((id, prefix, is_last)) = stack.pop() {
            let node = &self.nodes[id.0];
            let (branch, indent) = if is_last {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };

            let symbol = node.op().kind().symbol();
            let op = if symbol.is_empty() {
                String::new()
            } else {
                format!(" ({})", symbol)
            };
            let first_visit = expanded.insert(id);
            let repeat = if !first_visit && !node.op().is_leaf() {
                format!(" [{} above]", id)
            } else {
                String::new()
            };
            // Writing into a String cannot fail.
            let _ = writeln!(
                out,
                "{}{}Value({}: {:.4}, grad={:.4}){}{}",
                prefix,
                branch,
                node.label().unwrap_or(""),
                node.value(),
                node.grad(),
                op,
                repeat
            );

            if first_visit {
                let child_prefix = format!("{}{}", prefix, indent);
                let operands: Vec<NodeId> = node.operands().collect();
                let last = operands.len().saturating_sub(1);
                // Reversed so the first operand is printed first.
                for (i, &operand) in operands.iter().enumerate().rev() {
                    stack.push((operand, child_prefix.clone(), i == last));
                }
            }
        }
        Ok(out)
    }
}

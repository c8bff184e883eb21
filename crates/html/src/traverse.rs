use crate::{Id, Node};

/// Give every node with an unset id (`Id(0)`) a fresh id in document order.
/// Iterative so deep trees do not exhaust the stack.
pub fn assign_node_ids(root: &mut Node) {
    let mut next: u32 = 1;
    let mut stack: Vec<&mut Node> = vec![root];
    while let Some(node) = stack.pop() {
        if node.id() == Id(0) {
            node.set_id(Id(next));
            next = next.wrapping_add(1);
        }
        if let Some(children) = node.children_mut() {
            // Reverse so siblings are numbered left to right.
            stack.extend(children.iter_mut().rev());
        }
    }
}

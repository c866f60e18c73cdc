//! Node arena.
//!
//! Nodes are stored flat and addressed by [`NodeId`]; the parent link is a
//! back-handle, so the apparent parent/child cycle is just two indices.
//! Attach-time checks replace ownership juggling: a node can be attached to
//! exactly one parent, ever.

use crate::{ElementId, Node, NodeId, NodeKind, Operator, Span, TypeId};

/// Flat storage for one unit's nodes.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        NodeArena { nodes: Vec::new() }
    }

    /// Number of nodes allocated.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a node. The node starts parentless.
    ///
    /// Binary and unary nodes assert their operator fits the node shape;
    /// that is an internal invariant of the (external) parser, not a user
    /// diagnostic.
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        match &kind {
            NodeKind::Binary { op, .. } => {
                debug_assert!(op.is_binary(), "operator {op:?} is not binary");
            }
            NodeKind::Unary { op, .. } => {
                debug_assert!(op.is_unary(), "operator {op:?} is not unary");
            }
            _ => {}
        }
        let id = NodeId::new(
            u32::try_from(self.nodes.len()).unwrap_or_else(|_| panic!("node arena overflow")),
        );
        self.nodes.push(Node::new(kind, span));
        id
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Borrow a node mutably.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Make `parent` the parent of `child`.
    ///
    /// # Panics
    /// Panics if the child already has a parent or is attached to itself.
    /// Failing this assertion is a programming fault in tree construction,
    /// never a recoverable user diagnostic.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        assert_ne!(parent, child, "node attached to itself");
        let node = self.node_mut(child);
        assert!(
            node.parent.is_none(),
            "node {child:?} attached to two parents"
        );
        node.parent = Some(parent);
    }

    /// Attach an optional child.
    pub fn attach_opt(&mut self, parent: NodeId, child: Option<NodeId>) {
        if let Some(child) = child {
            self.attach(parent, child);
        }
    }

    /// Attach every child in a list.
    pub fn attach_all<'a, I: IntoIterator<Item = &'a NodeId>>(&mut self, parent: NodeId, ids: I) {
        for &child in ids {
            self.attach(parent, child);
        }
    }

    /// Record the element resolved for a node.
    ///
    /// # Panics
    /// Panics if the node already carries an element (elements are created
    /// exactly once, by the resolver).
    pub fn set_element(&mut self, id: NodeId, element: ElementId) {
        let node = self.node_mut(id);
        assert!(
            node.element.is_none(),
            "element set twice on node {id:?}"
        );
        node.element = Some(element);
    }

    /// Record the static type computed for a node.
    ///
    /// # Panics
    /// Panics if the node already carries a type.
    pub fn set_ty(&mut self, id: NodeId, ty: TypeId) {
        let node = self.node_mut(id);
        assert!(node.ty.is_none(), "type set twice on node {id:?}");
        node.ty = Some(ty);
    }

    /// Resolved element of a node, if the resolver bound one.
    pub fn element(&self, id: NodeId) -> Option<ElementId> {
        self.node(id).element
    }

    /// Static type of a node, if the type analyzer assigned one.
    pub fn ty(&self, id: NodeId) -> Option<TypeId> {
        self.node(id).ty
    }

    /// Span of a node.
    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    /// Iterate over all node ids in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| {
            #[allow(clippy::cast_possible_truncation)]
            NodeId::new(i as u32)
        })
    }
}

/// Convenience: allocate a binary expression, attaching both operands.
pub(crate) fn alloc_binary(
    arena: &mut NodeArena,
    op: Operator,
    lhs: NodeId,
    rhs: NodeId,
    span: Span,
) -> NodeId {
    let id = arena.alloc(NodeKind::Binary { op, lhs, rhs }, span);
    arena.attach(id, lhs);
    arena.attach(id, rhs);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Name;

    #[test]
    fn alloc_and_attach() {
        let mut arena = NodeArena::new();
        let child = arena.alloc(NodeKind::Identifier { name: Name::EMPTY }, Span::new(0, 1));
        let parent = arena.alloc(
            NodeKind::ExprStmt { expr: child },
            Span::new(0, 2),
        );
        arena.attach(parent, child);
        assert_eq!(arena.node(child).parent, Some(parent));
        assert_eq!(arena.node(parent).parent, None);
    }

    #[test]
    #[should_panic(expected = "attached to two parents")]
    fn attach_twice_is_a_fault() {
        let mut arena = NodeArena::new();
        let child = arena.alloc(NodeKind::Identifier { name: Name::EMPTY }, Span::new(0, 1));
        let a = arena.alloc(NodeKind::ExprStmt { expr: child }, Span::new(0, 2));
        let b = arena.alloc(NodeKind::ExprStmt { expr: child }, Span::new(0, 2));
        arena.attach(a, child);
        arena.attach(b, child);
    }

    #[test]
    #[should_panic(expected = "element set twice")]
    fn element_set_once() {
        use crate::{ElementId, LibraryId};
        let mut arena = NodeArena::new();
        let id = arena.alloc(NodeKind::Identifier { name: Name::EMPTY }, Span::new(0, 1));
        let el = ElementId::new(LibraryId::new(0), 0);
        arena.set_element(id, el);
        arena.set_element(id, el);
    }
}

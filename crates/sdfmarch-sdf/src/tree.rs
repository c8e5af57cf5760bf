//! Composition tree and its flat encoding
//!
//! [`CsgNode`] is the owned, pointer-linked form of a scene an authoring tool
//! works with. [`CsgNode::flatten`] lays it out post-order into the flat
//! records (children before parents, root last) and [`CsgNode::decode`]
//! rebuilds a tree from any validated [`SceneBuffers`].

use std::sync::Arc;

use crate::{
    LayoutError, Operation, OperationKind, Primitive, PrimitiveDesc, Root, SceneBuffers,
};

/// A composition tree node.
///
/// Children are shared through `Arc`, so cloning a tree is cheap and
/// subtrees can be reused.
#[derive(Debug, Clone, PartialEq)]
pub enum CsgNode {
    Primitive(PrimitiveDesc),
    Union {
        a: Arc<CsgNode>,
        b: Arc<CsgNode>,
    },
    Subtract {
        a: Arc<CsgNode>,
        b: Arc<CsgNode>,
    },
    Intersect {
        a: Arc<CsgNode>,
        b: Arc<CsgNode>,
    },
    SmoothUnion {
        a: Arc<CsgNode>,
        b: Arc<CsgNode>,
        k: f32,
    },
    SmoothSubtract {
        a: Arc<CsgNode>,
        b: Arc<CsgNode>,
        k: f32,
    },
    SmoothIntersect {
        a: Arc<CsgNode>,
        b: Arc<CsgNode>,
        k: f32,
    },
}

/// Borrowed view of a node: a leaf, or a binary kind with its operands and blend strength
enum NodeView<'a> {
    Leaf(&'a PrimitiveDesc),
    Binary(OperationKind, &'a CsgNode, &'a CsgNode, f32),
}

impl From<PrimitiveDesc> for CsgNode {
    fn from(desc: PrimitiveDesc) -> Self {
        CsgNode::Primitive(desc)
    }
}

impl CsgNode {
    /// Build a binary node of the given kind. `Leaf` is not a binary kind and
    /// yields `a` unchanged.
    pub fn combine(kind: OperationKind, a: CsgNode, b: CsgNode, k: f32) -> Self {
        let (a, b) = (Arc::new(a), Arc::new(b));
        match kind {
            OperationKind::Union => CsgNode::Union { a, b },
            OperationKind::Subtract => CsgNode::Subtract { a, b },
            OperationKind::Intersect => CsgNode::Intersect { a, b },
            OperationKind::SmoothUnion => CsgNode::SmoothUnion { a, b, k },
            OperationKind::SmoothSubtract => CsgNode::SmoothSubtract { a, b, k },
            OperationKind::SmoothIntersect => CsgNode::SmoothIntersect { a, b, k },
            OperationKind::Leaf => Arc::unwrap_or_clone(a),
        }
    }

    pub fn union(self, other: impl Into<CsgNode>) -> Self {
        Self::combine(OperationKind::Union, self, other.into(), 0.0)
    }

    /// Cut `other` out of `self`
    pub fn subtract(self, other: impl Into<CsgNode>) -> Self {
        Self::combine(OperationKind::Subtract, self, other.into(), 0.0)
    }

    pub fn intersect(self, other: impl Into<CsgNode>) -> Self {
        Self::combine(OperationKind::Intersect, self, other.into(), 0.0)
    }

    pub fn smooth_union(self, other: impl Into<CsgNode>, k: f32) -> Self {
        Self::combine(OperationKind::SmoothUnion, self, other.into(), k)
    }

    pub fn smooth_subtract(self, other: impl Into<CsgNode>, k: f32) -> Self {
        Self::combine(OperationKind::SmoothSubtract, self, other.into(), k)
    }

    pub fn smooth_intersect(self, other: impl Into<CsgNode>, k: f32) -> Self {
        Self::combine(OperationKind::SmoothIntersect, self, other.into(), k)
    }

    fn view(&self) -> NodeView<'_> {
        match self {
            CsgNode::Primitive(desc) => NodeView::Leaf(desc),
            CsgNode::Union { a, b } => NodeView::Binary(OperationKind::Union, a, b, 0.0),
            CsgNode::Subtract { a, b } => NodeView::Binary(OperationKind::Subtract, a, b, 0.0),
            CsgNode::Intersect { a, b } => NodeView::Binary(OperationKind::Intersect, a, b, 0.0),
            CsgNode::SmoothUnion { a, b, k } => {
                NodeView::Binary(OperationKind::SmoothUnion, a, b, *k)
            }
            CsgNode::SmoothSubtract { a, b, k } => {
                NodeView::Binary(OperationKind::SmoothSubtract, a, b, *k)
            }
            CsgNode::SmoothIntersect { a, b, k } => {
                NodeView::Binary(OperationKind::SmoothIntersect, a, b, *k)
            }
        }
    }

    /// Number of primitives reachable from this node, counting shared subtrees once per use
    pub fn primitive_count(&self) -> usize {
        match self.view() {
            NodeView::Leaf(_) => 1,
            NodeView::Binary(_, a, b, _) => a.primitive_count() + b.primitive_count(),
        }
    }

    /// Lay the tree out as flat records with the root as the last operation.
    pub fn flatten(&self) -> Result<SceneBuffers, LayoutError> {
        let mut primitives = Vec::with_capacity(self.primitive_count());
        let mut operations = Vec::new();
        let root = self.encode_into(&mut primitives, &mut operations);
        SceneBuffers::new(primitives, operations, Some(root))
    }

    fn encode_into(&self, primitives: &mut Vec<Primitive>, operations: &mut Vec<Operation>) -> u32 {
        let op = match self.view() {
            NodeView::Leaf(desc) => {
                primitives.push(desc.to_record());
                Operation::leaf((primitives.len() - 1) as u32)
            }
            NodeView::Binary(kind, a, b, k) => {
                let left = a.encode_into(primitives, operations);
                let right = b.encode_into(primitives, operations);
                Operation::binary(kind, left, right, k)
            }
        };
        operations.push(op);
        (operations.len() - 1) as u32
    }

    /// Rebuild the tree evaluated by `buffers`.
    ///
    /// Returns `None` for an empty snapshot. A snapshot without operations
    /// decodes to a left-leaning union of all its primitives.
    pub fn decode(buffers: &SceneBuffers) -> Result<Option<CsgNode>, LayoutError> {
        match buffers.root() {
            Root::Empty => Ok(None),
            Root::AllPrimitives => {
                let mut nodes = buffers
                    .primitives()
                    .iter()
                    .enumerate()
                    .map(|(i, p)| PrimitiveDesc::from_record(i, p).map(CsgNode::Primitive));
                let Some(first) = nodes.next() else {
                    return Ok(None);
                };
                nodes
                    .try_fold(first?, |acc, node| Ok::<_, LayoutError>(acc.union(node?)))
                    .map(Some)
            }
            Root::Operation(index) => decode_operation(buffers, index as usize).map(Some),
        }
    }
}

fn decode_operation(buffers: &SceneBuffers, index: usize) -> Result<CsgNode, LayoutError> {
    let op = &buffers.operations()[index];
    let kind = buffers.operation_kind(index);
    if kind.is_leaf() {
        let child = op.child1 as usize;
        let desc = PrimitiveDesc::from_record(child, &buffers.primitives()[child])?;
        return Ok(CsgNode::Primitive(desc));
    }

    let a = decode_operation(buffers, op.child1 as usize)?;
    let b = decode_operation(buffers, op.child2 as usize)?;
    Ok(CsgNode::combine(kind, a, b, op.blend_strength))
}

//! Validated per-frame scene snapshot
//!
//! [`SceneBuffers`] owns the flat primitive and operation arrays for one frame.
//! It can only be built through [`SceneBuffers::new`], which checks every kind
//! code and child link, rejects cycles and shared subtrees, and resolves which node is the root.
//! Consumers can therefore index the arrays without further checks.

use crate::{LayoutError, Operation, OperationKind, Primitive, PrimitiveKind};

/// Deepest composition tree the evaluator accepts
pub const MAX_TREE_DEPTH: usize = 1024;

/// Which part of the layout is evaluated for the whole scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Root {
    /// Nothing to evaluate: every ray misses
    Empty,
    /// No operations were supplied, so all primitives are unioned
    AllPrimitives,
    /// Evaluate the tree rooted at this operation index
    Operation(u32),
}

/// Immutable primitive/operation arrays with a resolved root
#[derive(Debug, Clone, PartialEq)]
pub struct SceneBuffers {
    primitives: Vec<Primitive>,
    operations: Vec<Operation>,
    primitive_kinds: Vec<PrimitiveKind>,
    operation_kinds: Vec<OperationKind>,
    root: Root,
}

impl SceneBuffers {
    /// Validate and take ownership of a frame's records.
    ///
    /// Without an explicit `root`, the last operation is the root. With no
    /// operations at all, every primitive is unioned.
    pub fn new(
        primitives: Vec<Primitive>,
        operations: Vec<Operation>,
        root: Option<u32>,
    ) -> Result<Self, LayoutError> {
        let primitive_kinds = primitives
            .iter()
            .enumerate()
            .map(|(index, p)| {
                PrimitiveKind::from_code(p.kind)
                    .ok_or(LayoutError::UnknownPrimitiveKind { index, code: p.kind })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let operation_kinds = operations
            .iter()
            .enumerate()
            .map(|(index, op)| {
                OperationKind::from_code(op.kind)
                    .ok_or(LayoutError::UnknownOperationKind { index, code: op.kind })
            })
            .collect::<Result<Vec<_>, _>>()?;

        check_links(&operations, &operation_kinds, primitives.len())?;
        check_acyclic(&operations, &operation_kinds)?;
        check_single_parent(&operations, &operation_kinds)?;

        let root = match root {
            Some(index) if index as usize >= operations.len() => {
                return Err(LayoutError::RootOutOfRange {
                    root: index,
                    count: operations.len(),
                });
            }
            _ if primitives.is_empty() => Root::Empty,
            Some(index) => Root::Operation(index),
            None if operations.is_empty() => Root::AllPrimitives,
            None => Root::Operation((operations.len() - 1) as u32),
        };

        Ok(Self {
            primitives,
            operations,
            primitive_kinds,
            operation_kinds,
            root,
        })
    }

    /// A snapshot with nothing in it
    pub fn empty() -> Self {
        Self {
            primitives: Vec::new(),
            operations: Vec::new(),
            primitive_kinds: Vec::new(),
            operation_kinds: Vec::new(),
            root: Root::Empty,
        }
    }

    pub fn root(&self) -> Root {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root == Root::Empty
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Decoded kind of primitive `index`
    pub fn primitive_kind(&self, index: usize) -> PrimitiveKind {
        self.primitive_kinds[index]
    }

    /// Decoded kind of operation `index`
    pub fn operation_kind(&self, index: usize) -> OperationKind {
        self.operation_kinds[index]
    }

    /// Primitive records as raw bytes, ready for a storage buffer upload
    pub fn primitive_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.primitives)
    }

    /// Operation records as raw bytes, ready for a storage buffer upload
    pub fn operation_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.operations)
    }
}

fn check_links(
    operations: &[Operation],
    kinds: &[OperationKind],
    primitive_count: usize,
) -> Result<(), LayoutError> {
    for (node, (op, kind)) in operations.iter().zip(kinds).enumerate() {
        if kind.is_leaf() {
            if op.child1 as usize >= primitive_count {
                return Err(LayoutError::DanglingPrimitive {
                    node,
                    child: op.child1,
                    count: primitive_count,
                });
            }
            continue;
        }

        for child in [op.child1, op.child2] {
            if child as usize >= operations.len() {
                return Err(LayoutError::DanglingOperation {
                    node,
                    child,
                    count: operations.len(),
                });
            }
        }
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Depth-first walk over every operation, iterative so hostile input cannot
/// overflow the stack. Also bounds the depth of each tree.
fn check_acyclic(operations: &[Operation], kinds: &[OperationKind]) -> Result<(), LayoutError> {
    let mut marks = vec![Mark::Unvisited; operations.len()];
    let mut depth = vec![1usize; operations.len()];
    let mut stack: Vec<(usize, bool)> = Vec::new();

    for start in 0..operations.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        stack.push((start, false));

        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                if !kinds[node].is_leaf() {
                    let op = &operations[node];
                    depth[node] = 1 + depth[op.child1 as usize].max(depth[op.child2 as usize]);
                    if depth[node] > MAX_TREE_DEPTH {
                        return Err(LayoutError::TooDeep {
                            depth: depth[node],
                            limit: MAX_TREE_DEPTH,
                        });
                    }
                }
                marks[node] = Mark::Done;
                continue;
            }

            match marks[node] {
                Mark::Done => continue,
                Mark::InProgress => return Err(LayoutError::Cycle { node }),
                Mark::Unvisited => {}
            }

            marks[node] = Mark::InProgress;
            stack.push((node, true));

            if kinds[node].is_leaf() {
                continue;
            }
            let op = &operations[node];
            for child in [op.child2 as usize, op.child1 as usize] {
                match marks[child] {
                    Mark::InProgress => return Err(LayoutError::Cycle { node: child }),
                    Mark::Unvisited => stack.push((child, false)),
                    Mark::Done => {}
                }
            }
        }
    }
    Ok(())
}

/// Every non-leaf operation has at most one parent, so the layout is a
/// forest and evaluation stays linear in the number of operations. Leaves
/// cost a single primitive lookup and may be referenced any number of times.
fn check_single_parent(
    operations: &[Operation],
    kinds: &[OperationKind],
) -> Result<(), LayoutError> {
    let mut parents = vec![0usize; operations.len()];
    for (op, kind) in operations.iter().zip(kinds) {
        if kind.is_leaf() {
            continue;
        }
        for child in [op.child1 as usize, op.child2 as usize] {
            if kinds[child].is_leaf() {
                continue;
            }
            parents[child] += 1;
            if parents[child] > 1 {
                return Err(LayoutError::SharedNode {
                    node: child,
                    parents: parents[child],
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::PrimitiveDesc;

    fn two_spheres() -> Vec<Primitive> {
        vec![
            PrimitiveDesc::sphere(1.0).to_record(),
            PrimitiveDesc::sphere(0.5).to_record(),
        ]
    }

    fn union_ops() -> Vec<Operation> {
        vec![
            Operation::leaf(0),
            Operation::leaf(1),
            Operation::binary(OperationKind::Union, 0, 1, 0.0),
        ]
    }

    #[test]
    fn last_operation_is_default_root() {
        let buffers = SceneBuffers::new(two_spheres(), union_ops(), None).unwrap();
        assert_eq!(buffers.root(), Root::Operation(2));
    }

    #[test]
    fn explicit_root_is_kept() {
        let buffers = SceneBuffers::new(two_spheres(), union_ops(), Some(0)).unwrap();
        assert_eq!(buffers.root(), Root::Operation(0));
    }

    #[test]
    fn no_operations_unions_everything() {
        let buffers = SceneBuffers::new(two_spheres(), Vec::new(), None).unwrap();
        assert_eq!(buffers.root(), Root::AllPrimitives);
    }

    #[test]
    fn nothing_at_all_is_empty() {
        let buffers = SceneBuffers::new(Vec::new(), Vec::new(), None).unwrap();
        assert!(buffers.is_empty());
        assert_eq!(buffers, SceneBuffers::empty());
    }

    #[test]
    fn dangling_leaf_is_rejected() {
        let ops = vec![Operation::leaf(7)];
        assert_eq!(
            SceneBuffers::new(two_spheres(), ops, None),
            Err(LayoutError::DanglingPrimitive {
                node: 0,
                child: 7,
                count: 2
            })
        );
    }

    #[test]
    fn dangling_operation_is_rejected() {
        let ops = vec![
            Operation::leaf(0),
            Operation::binary(OperationKind::Union, 0, 5, 0.0),
        ];
        assert!(matches!(
            SceneBuffers::new(two_spheres(), ops, None),
            Err(LayoutError::DanglingOperation { node: 1, child: 5, .. })
        ));
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let ops = vec![
            Operation::leaf(0),
            Operation::binary(OperationKind::Union, 0, 1, 0.0),
        ];
        assert!(matches!(
            SceneBuffers::new(two_spheres(), ops, None),
            Err(LayoutError::Cycle { .. })
        ));
    }

    #[test]
    fn two_node_cycle_is_detected() {
        let ops = vec![
            Operation::leaf(0),
            Operation::binary(OperationKind::Union, 0, 2, 0.0),
            Operation::binary(OperationKind::Intersect, 1, 0, 0.0),
        ];
        assert!(matches!(
            SceneBuffers::new(two_spheres(), ops, None),
            Err(LayoutError::Cycle { .. })
        ));
    }

    #[test]
    fn shared_leaf_is_accepted() {
        let ops = vec![
            Operation::leaf(0),
            Operation::binary(OperationKind::Union, 0, 0, 0.0),
            Operation::binary(OperationKind::Subtract, 1, 0, 0.0),
        ];
        assert!(SceneBuffers::new(two_spheres(), ops, None).is_ok());
    }

    #[test]
    fn shared_subtree_is_rejected() {
        let ops = vec![
            Operation::leaf(0),
            Operation::binary(OperationKind::Union, 0, 0, 0.0),
            Operation::binary(OperationKind::Intersect, 1, 1, 0.0),
        ];
        assert_eq!(
            SceneBuffers::new(two_spheres(), ops, None),
            Err(LayoutError::SharedNode { node: 1, parents: 2 })
        );
    }

    #[test]
    fn doubling_chain_is_rejected_before_evaluation() {
        // Each node uses the previous one twice: 2^24 leaf visits if accepted
        let mut ops = vec![Operation::leaf(0), Operation::binary(OperationKind::Union, 0, 0, 0.0)];
        for i in 1..24u32 {
            ops.push(Operation::binary(OperationKind::Union, i, i, 0.0));
        }
        assert!(matches!(
            SceneBuffers::new(two_spheres(), ops, None),
            Err(LayoutError::SharedNode { node: 1, .. })
        ));
    }

    #[test]
    fn subtree_shared_across_parents_is_rejected() {
        let ops = vec![
            Operation::leaf(0),
            Operation::leaf(1),
            Operation::binary(OperationKind::Union, 0, 1, 0.0),
            Operation::binary(OperationKind::Subtract, 2, 0, 0.0),
            Operation::binary(OperationKind::Intersect, 2, 3, 0.0),
        ];
        assert_eq!(
            SceneBuffers::new(two_spheres(), ops, None),
            Err(LayoutError::SharedNode { node: 2, parents: 2 })
        );
    }

    #[test]
    fn root_out_of_range_is_rejected() {
        assert_eq!(
            SceneBuffers::new(two_spheres(), union_ops(), Some(3)),
            Err(LayoutError::RootOutOfRange { root: 3, count: 3 })
        );
    }

    #[test]
    fn unknown_operation_code_is_rejected() {
        let mut ops = union_ops();
        ops[1].kind = 99;
        assert_eq!(
            SceneBuffers::new(two_spheres(), ops, None),
            Err(LayoutError::UnknownOperationKind { index: 1, code: 99 })
        );
    }

    #[test]
    fn excessive_depth_is_rejected() {
        let mut ops = vec![Operation::leaf(0)];
        for i in 0..MAX_TREE_DEPTH as u32 {
            ops.push(Operation::binary(OperationKind::Union, i, 0, 0.0));
        }
        assert!(matches!(
            SceneBuffers::new(two_spheres(), ops, None),
            Err(LayoutError::TooDeep { .. })
        ));
    }

    #[test]
    fn byte_views_cover_every_record() {
        let buffers = SceneBuffers::new(two_spheres(), union_ops(), None).unwrap();
        assert_eq!(buffers.primitive_bytes().len(), 2 * Primitive::SIZE);
        assert_eq!(buffers.operation_bytes().len(), 3 * Operation::SIZE);
    }
}

//! Scene input for the frame orchestrator
//!
//! A [`SceneSource`] is polled once per frame and yields the primitives,
//! operations and light for that frame as a [`SceneInput`]. How the source
//! tracks its objects is its own business: a fixed document, an animated
//! wrapper, or a live editor all look the same to the orchestrator.

use glam::Vec3;
use sdfmarch_sdf::{CsgNode, LayoutError, OperationDesc, PrimitiveDesc, SceneBuffers};

/// Everything the external scene collaborator supplies for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneInput {
    pub primitives: Vec<PrimitiveDesc>,
    pub operations: Vec<OperationDesc>,
    /// Operation evaluated for the whole scene; the last operation when `None`
    pub root: Option<u32>,
    /// World-space position of the single point light
    pub light: Option<Vec3>,
}

impl SceneInput {
    pub fn new(primitives: Vec<PrimitiveDesc>, operations: Vec<OperationDesc>) -> Self {
        Self {
            primitives,
            operations,
            root: None,
            light: None,
        }
    }

    /// Flatten a composition tree into primitives and operations, root last
    pub fn from_tree(tree: &CsgNode) -> Result<Self, LayoutError> {
        let buffers = tree.flatten()?;
        let primitives = buffers
            .primitives()
            .iter()
            .enumerate()
            .map(|(i, record)| PrimitiveDesc::from_record(i, record))
            .collect::<Result<Vec<_>, _>>()?;
        let operations = buffers
            .operations()
            .iter()
            .enumerate()
            .map(|(i, op)| OperationDesc {
                kind: buffers.operation_kind(i),
                child1: op.child1,
                child2: op.child2,
                blend_strength: op.blend_strength,
            })
            .collect();
        Ok(Self::new(primitives, operations))
    }

    pub fn with_light(mut self, light: Vec3) -> Self {
        self.light = Some(light);
        self
    }

    pub fn with_root(mut self, root: u32) -> Self {
        self.root = Some(root);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Encode and validate this frame's flat buffers
    pub fn snapshot(&self) -> Result<SceneBuffers, LayoutError> {
        SceneBuffers::new(
            self.primitives.iter().map(PrimitiveDesc::to_record).collect(),
            self.operations.iter().map(OperationDesc::to_record).collect(),
            self.root,
        )
    }
}

/// Supplies the scene state for each frame
pub trait SceneSource {
    /// Current primitives, operations and light. Called once per frame.
    fn current_frame(&mut self) -> SceneInput;
}

impl<S: SceneSource + ?Sized> SceneSource for &mut S {
    fn current_frame(&mut self) -> SceneInput {
        (**self).current_frame()
    }
}

impl<S: SceneSource + ?Sized> SceneSource for Box<S> {
    fn current_frame(&mut self) -> SceneInput {
        (**self).current_frame()
    }
}

/// A scene that never changes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticScene {
    input: SceneInput,
}

impl StaticScene {
    pub fn new(input: SceneInput) -> Self {
        Self { input }
    }

    pub fn input(&self) -> &SceneInput {
        &self.input
    }
}

impl SceneSource for StaticScene {
    fn current_frame(&mut self) -> SceneInput {
        self.input.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sdfmarch_sdf::{OperationKind, Root};

    #[test]
    fn tree_input_keeps_root_last() {
        let tree = CsgNode::from(PrimitiveDesc::sphere(1.0)).subtract(PrimitiveDesc::sphere(0.5));
        let input = SceneInput::from_tree(&tree).unwrap();
        assert_eq!(input.primitives.len(), 2);
        assert_eq!(input.operations.len(), 3);
        assert_eq!(input.operations[2].kind, OperationKind::Subtract);

        let buffers = input.snapshot().unwrap();
        assert_eq!(buffers.root(), Root::Operation(2));
        assert_eq!(CsgNode::decode(&buffers).unwrap(), Some(tree));
    }

    #[test]
    fn snapshot_rejects_dangling_links() {
        let input = SceneInput::new(
            vec![PrimitiveDesc::sphere(1.0)],
            vec![OperationDesc {
                kind: OperationKind::Leaf,
                child1: 3,
                child2: 0,
                blend_strength: 0.0,
            }],
        );
        assert!(matches!(
            input.snapshot(),
            Err(LayoutError::DanglingPrimitive { child: 3, .. })
        ));
    }

    #[test]
    fn static_scene_repeats_itself() {
        let input = SceneInput::new(vec![PrimitiveDesc::sphere(1.0)], Vec::new()).with_light(Vec3::Y);
        let mut scene = StaticScene::new(input.clone());
        assert_eq!(scene.current_frame(), input);
        assert_eq!(scene.current_frame(), input);
    }
}

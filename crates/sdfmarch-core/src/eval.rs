//! Distance Field Evaluator
//!
//! Walks the flat composition tree of a [`SceneBuffers`] snapshot and returns
//! the combined [`Sample`] at a world-space point. Every query is independent;
//! nothing is cached between points apart from the per-primitive frames,
//! which depend only on the snapshot.

use glam::Vec3;
use sdfmarch_sdf::{OperationKind, PrimitiveKind, Root, SceneBuffers};

use crate::sdf::{
    Sample,
    operations::{self, combine},
    primitives::local_distance,
    transforms::LocalFrame,
};

/// Blend strength used when a scene without operations is unioned smoothly
pub const DEFAULT_BLEND_STRENGTH: f32 = 0.5;

/// Per-frame evaluation switches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalOptions {
    /// When false every smooth operation evaluates as its hard counterpart
    pub blend: bool,
    /// Strength of the implicit smooth union over all primitives
    pub default_blend_strength: f32,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            blend: false,
            default_blend_strength: DEFAULT_BLEND_STRENGTH,
        }
    }
}

impl EvalOptions {
    pub fn with_blend(blend: bool) -> Self {
        Self {
            blend,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PlacedPrimitive {
    kind: PrimitiveKind,
    frame: LocalFrame,
    extra: Vec3,
    color: Vec3,
}

impl PlacedPrimitive {
    fn sample(&self, p: Vec3) -> Sample {
        let local = self.frame.to_local(p);
        let d = local_distance(self.kind, local, self.extra);
        Sample::new(self.frame.to_world_distance(d), self.color)
    }
}

/// Read-only evaluator over one frame's snapshot.
///
/// Cheap to share between threads: it borrows the snapshot and owns only
/// the precomputed primitive frames.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    buffers: &'a SceneBuffers,
    placed: Vec<PlacedPrimitive>,
    options: EvalOptions,
}

impl<'a> Evaluator<'a> {
    pub fn new(buffers: &'a SceneBuffers, options: EvalOptions) -> Self {
        let placed = buffers
            .primitives()
            .iter()
            .enumerate()
            .map(|(i, record)| PlacedPrimitive {
                kind: buffers.primitive_kind(i),
                frame: LocalFrame::from_record(record),
                extra: record.extra(),
                color: record.color(),
            })
            .collect();
        Self {
            buffers,
            placed,
            options,
        }
    }

    pub fn options(&self) -> EvalOptions {
        self.options
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Sample the whole scene at `p`
    pub fn evaluate(&self, p: Vec3) -> Sample {
        self.evaluate_from(p, self.buffers.root())
    }

    /// Distance only, for normal estimation and occlusion rays
    pub fn distance(&self, p: Vec3) -> f32 {
        self.evaluate(p).distance
    }

    /// Sample the subtree selected by `root` at `p`.
    ///
    /// An empty scene yields [`Sample::EMPTY`], so every ray misses.
    pub fn evaluate_from(&self, p: Vec3, root: Root) -> Sample {
        match root {
            Root::Empty => Sample::EMPTY,
            Root::AllPrimitives => self.union_all(p),
            Root::Operation(index) => self.evaluate_node(p, index as usize),
        }
    }

    /// Sample the tree rooted at operation `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not an operation of the snapshot.
    pub fn evaluate_node(&self, p: Vec3, index: usize) -> Sample {
        let op = &self.buffers.operations()[index];
        let kind = self.buffers.operation_kind(index);
        if kind == OperationKind::Leaf {
            return self.placed[op.child1 as usize].sample(p);
        }

        let a = self.evaluate_node(p, op.child1 as usize);
        let b = self.evaluate_node(p, op.child2 as usize);
        combine(kind, a, b, op.blend_strength, self.options.blend)
    }

    fn union_all(&self, p: Vec3) -> Sample {
        let k = self.options.default_blend_strength;
        let mut placed = self.placed.iter().map(|prim| prim.sample(p));
        let Some(first) = placed.next() else {
            return Sample::EMPTY;
        };
        placed.fold(first, |acc, s| {
            if self.options.blend {
                operations::smooth_union(acc, s, k)
            } else {
                operations::union(acc, s)
            }
        })
    }
}

//! Fixed-size scene records
//!
//! [`Primitive`] and [`Operation`] are the flat, GPU-compatible records a
//! frame is encoded into. Both are tightly packed 4-byte fields so a slice of
//! them can be handed to a storage buffer with `bytemuck::cast_slice`.
//!
//! The authoring side uses [`PrimitiveDesc`] and [`OperationDesc`], which
//! carry typed kinds and `glam` vectors and convert losslessly to records.

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::LayoutError;

/// Shape selector for a primitive record
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    /// `extra = (radius, _, _)`
    Sphere = 0,
    /// `extra = half extents`
    Box = 1,
    /// `extra = (ring radius, tube radius, _)`
    Torus = 2,
    /// `extra = (half angle in radians, height, _)`
    Cone = 3,
    /// `extra = (height, radius, _)`
    Cylinder = 4,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 5] = [
        PrimitiveKind::Sphere,
        PrimitiveKind::Box,
        PrimitiveKind::Torus,
        PrimitiveKind::Cone,
        PrimitiveKind::Cylinder,
    ];

    /// Numeric code stored in [`Primitive::kind`]
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Decode a kind code
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Zero the `extra` components this kind does not read.
    pub fn clean_extra(self, extra: Vec3) -> Vec3 {
        match self {
            PrimitiveKind::Sphere => Vec3::new(extra.x, 0.0, 0.0),
            PrimitiveKind::Box => extra,
            PrimitiveKind::Torus | PrimitiveKind::Cone | PrimitiveKind::Cylinder => {
                Vec3::new(extra.x, extra.y, 0.0)
            }
        }
    }
}

/// Composition semantics of an operation record
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Union = 0,
    Subtract = 1,
    Intersect = 2,
    SmoothUnion = 3,
    SmoothSubtract = 4,
    SmoothIntersect = 5,
    /// Returns the primitive referenced by `child1` unchanged
    Leaf = 6,
}

impl OperationKind {
    pub const ALL: [OperationKind; 7] = [
        OperationKind::Union,
        OperationKind::Subtract,
        OperationKind::Intersect,
        OperationKind::SmoothUnion,
        OperationKind::SmoothSubtract,
        OperationKind::SmoothIntersect,
        OperationKind::Leaf,
    ];

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn is_leaf(self) -> bool {
        self == OperationKind::Leaf
    }

    pub fn is_smooth(self) -> bool {
        matches!(
            self,
            OperationKind::SmoothUnion
                | OperationKind::SmoothSubtract
                | OperationKind::SmoothIntersect
        )
    }

    /// The crisp counterpart of a smooth operation; other kinds map to themselves.
    pub fn hard(self) -> Self {
        match self {
            OperationKind::SmoothUnion => OperationKind::Union,
            OperationKind::SmoothSubtract => OperationKind::Subtract,
            OperationKind::SmoothIntersect => OperationKind::Intersect,
            other => other,
        }
    }
}

/// One primitive, laid out exactly as the evaluation kernel reads it (64 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Primitive {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub kind: u32,
    pub scale: [f32; 3],
    /// Euler angles in radians, applied Z then X then Y
    pub rotation: [f32; 3],
    pub extra: [f32; 3],
}

impl Primitive {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn color(&self) -> Vec3 {
        Vec3::from_array(self.color)
    }

    pub fn scale(&self) -> Vec3 {
        Vec3::from_array(self.scale)
    }

    pub fn extra(&self) -> Vec3 {
        Vec3::from_array(self.extra)
    }

    /// World orientation of the primitive's local frame
    pub fn orientation(&self) -> Quat {
        euler_to_quat(Vec3::from_array(self.rotation))
    }
}

/// One composition node (16 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Operation {
    pub kind: u32,
    pub child1: u32,
    pub child2: u32,
    pub blend_strength: f32,
}

impl Operation {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// A leaf wrapping primitive `primitive`
    pub fn leaf(primitive: u32) -> Self {
        Self {
            kind: OperationKind::Leaf.code(),
            child1: primitive,
            child2: 0,
            blend_strength: 0.0,
        }
    }

    /// A binary node over two operation indices
    pub fn binary(kind: OperationKind, child1: u32, child2: u32, blend_strength: f32) -> Self {
        Self {
            kind: kind.code(),
            child1,
            child2,
            blend_strength,
        }
    }
}

/// Convert Euler angles (radians) to a quaternion using the Z, X, Y application order.
pub fn euler_to_quat(rotation: Vec3) -> Quat {
    Quat::from_euler(EulerRot::YXZ, rotation.y, rotation.x, rotation.z)
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

fn default_color() -> Vec3 {
    Vec3::ONE
}

/// Authoring-side primitive descriptor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveDesc {
    pub kind: PrimitiveKind,
    #[serde(default)]
    pub position: Vec3,
    /// Euler angles in radians
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default = "default_color")]
    pub color: Vec3,
    pub extra: Vec3,
}

impl PrimitiveDesc {
    /// Descriptor at the origin with unit scale, white, and no rotation
    pub fn new(kind: PrimitiveKind, extra: Vec3) -> Self {
        Self {
            kind,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            color: Vec3::ONE,
            extra: kind.clean_extra(extra),
        }
    }

    pub fn sphere(radius: f32) -> Self {
        Self::new(PrimitiveKind::Sphere, Vec3::new(radius, 0.0, 0.0))
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::new(PrimitiveKind::Box, half_extents)
    }

    pub fn torus(radius: f32, tube_radius: f32) -> Self {
        Self::new(PrimitiveKind::Torus, Vec3::new(radius, tube_radius, 0.0))
    }

    pub fn cone(angle: f32, height: f32) -> Self {
        Self::new(PrimitiveKind::Cone, Vec3::new(angle, height, 0.0))
    }

    pub fn cylinder(height: f32, radius: f32) -> Self {
        Self::new(PrimitiveKind::Cylinder, Vec3::new(height, radius, 0.0))
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    /// Encode to the flat record
    pub fn to_record(&self) -> Primitive {
        Primitive {
            position: self.position.to_array(),
            color: self.color.to_array(),
            kind: self.kind.code(),
            scale: self.scale.to_array(),
            rotation: self.rotation.to_array(),
            extra: self.extra.to_array(),
        }
    }

    /// Decode a flat record. Fails only on an unknown kind code.
    pub fn from_record(index: usize, record: &Primitive) -> Result<Self, LayoutError> {
        let kind = PrimitiveKind::from_code(record.kind).ok_or(LayoutError::UnknownPrimitiveKind {
            index,
            code: record.kind,
        })?;
        Ok(Self {
            kind,
            position: record.position(),
            rotation: Vec3::from_array(record.rotation),
            scale: record.scale(),
            color: record.color(),
            extra: record.extra(),
        })
    }
}

/// Authoring-side operation descriptor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperationDesc {
    pub kind: OperationKind,
    pub child1: u32,
    #[serde(default)]
    pub child2: u32,
    #[serde(default)]
    pub blend_strength: f32,
}

impl OperationDesc {
    pub fn to_record(&self) -> Operation {
        Operation::binary(self.kind, self.child1, self.child2, self.blend_strength)
    }
}

//! World-to-local placement of a primitive

use glam::{Quat, Vec3};
use sdfmarch_sdf::Primitive;

/// Position, orientation and scale of one primitive, with the inverse
/// rotation precomputed so per-sample evaluation is a rotate and a divide.
#[derive(Debug, Clone, Copy)]
pub struct LocalFrame {
    pub position: Vec3,
    pub inverse_rotation: Quat,
    pub scale: Vec3,
    /// Smallest absolute scale component. Local distances are multiplied by
    /// this so the world-space estimate never overshoots the true surface.
    pub distance_scale: f32,
}

impl LocalFrame {
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            inverse_rotation: rotation.inverse(),
            scale,
            distance_scale: scale.abs().min_element(),
        }
    }

    pub fn from_record(record: &Primitive) -> Self {
        Self::new(record.position(), record.orientation(), record.scale())
    }

    /// `invRotate(p - position) / scale`
    pub fn to_local(&self, p: Vec3) -> Vec3 {
        (self.inverse_rotation * (p - self.position)) / self.scale
    }

    /// Convert a local-frame distance back to a conservative world distance
    pub fn to_world_distance(&self, local: f32) -> f32 {
        local * self.distance_scale
    }
}

impl Default for LocalFrame {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)
    }
}

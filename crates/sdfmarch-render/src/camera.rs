//! Camera and the per-frame view transforms derived from it

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// A look-at camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Point the camera is looking at
    pub target: Vec3,
    /// Up vector (usually Y-up)
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 60.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// The two matrices the ray marcher reconstructs primary rays from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTransforms {
    pub camera_to_world: Mat4,
    pub inverse_projection: Mat4,
}

impl Camera {
    /// Create a camera looking at a target from a position
    pub fn look_at(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            ..Default::default()
        }
    }

    /// Get the view matrix (world to camera transform)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get the projection matrix for a viewport aspect ratio (width / height)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far)
    }

    /// Get the forward direction (normalized)
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Transforms for a `width` x `height` viewport
    pub fn transforms(&self, width: u32, height: u32) -> CameraTransforms {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        CameraTransforms {
            camera_to_world: self.view_matrix().inverse(),
            inverse_projection: self.projection_matrix(aspect).inverse(),
        }
    }
}

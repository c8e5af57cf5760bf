//! Signed Distance Functions (SDF) for the scene primitives
//!
//! SDFs represent shapes as mathematical functions that return the distance
//! from any point in space to the nearest surface. Negative values are inside,
//! positive values are outside, and zero is exactly on the surface.
//!
//! ## Example
//!
//! ```rust
//! use glam::Vec3;
//! use sdfmarch_core::sdf::{Sdf, primitives::Sphere};
//!
//! let ball = Sphere::new(1.0);
//! assert_eq!(ball.distance(Vec3::new(2.0, 0.0, 0.0)), 1.0);
//! ```

pub mod operations;
pub mod primitives;
pub mod transforms;

use glam::Vec3;

/// The core SDF trait - any type that can compute distance from a point
pub trait Sdf: Send + Sync {
    /// Calculate the signed distance from point `p` to the surface.
    ///
    /// - Returns negative values for points inside the shape
    /// - Returns positive values for points outside the shape
    /// - Returns zero for points exactly on the surface
    fn distance(&self, p: Vec3) -> f32;
}

/// Distance and surface color of the field at one point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub distance: f32,
    pub color: Vec3,
}

impl Sample {
    /// Field of a scene with nothing in it: infinitely far, black
    pub const EMPTY: Self = Self {
        distance: f32::INFINITY,
        color: Vec3::ZERO,
    };

    pub fn new(distance: f32, color: Vec3) -> Self {
        Self { distance, color }
    }
}

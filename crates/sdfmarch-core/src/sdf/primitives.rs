//! SDF Primitive shapes
//!
//! All primitives are defined in their own local frame, centered at the
//! origin and unscaled. [`super::transforms::LocalFrame`] maps world points
//! into that frame before these functions run.

use glam::{Vec2, Vec3};
use sdfmarch_sdf::PrimitiveKind;

use super::Sdf;

/// Evaluate the local distance function selected by `kind`.
///
/// `extra` is interpreted per kind exactly as stored in the primitive record.
pub fn local_distance(kind: PrimitiveKind, p: Vec3, extra: Vec3) -> f32 {
    match kind {
        PrimitiveKind::Sphere => Sphere::from_extra(extra).distance(p),
        PrimitiveKind::Box => Box3::from_extra(extra).distance(p),
        PrimitiveKind::Torus => Torus::from_extra(extra).distance(p),
        PrimitiveKind::Cone => Cone::from_extra(extra).distance(p),
        PrimitiveKind::Cylinder => Cylinder::from_extra(extra).distance(p),
    }
}

// ============================================================================
// Primitive Structs
// ============================================================================

/// Sphere centered at origin
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    pub radius: f32,
}

impl Sphere {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    pub fn from_extra(extra: Vec3) -> Self {
        Self::new(extra.x)
    }
}

impl Sdf for Sphere {
    fn distance(&self, p: Vec3) -> f32 {
        p.length() - self.radius
    }
}

/// Axis-aligned box (rectangular prism) without rounded corners
#[derive(Debug, Clone, Copy)]
pub struct Box3 {
    pub half_extents: Vec3,
}

impl Box3 {
    pub fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }

    pub fn from_extra(extra: Vec3) -> Self {
        Self::new(extra)
    }
}

impl Sdf for Box3 {
    fn distance(&self, p: Vec3) -> f32 {
        let q = p.abs() - self.half_extents;
        q.max(Vec3::ZERO).length() + q.x.max(q.y.max(q.z)).min(0.0)
    }
}

/// Torus (donut) lying in the XZ plane
#[derive(Debug, Clone, Copy)]
pub struct Torus {
    pub radius: f32,
    pub tube_radius: f32,
}

impl Torus {
    pub fn new(radius: f32, tube_radius: f32) -> Self {
        Self {
            radius,
            tube_radius,
        }
    }

    pub fn from_extra(extra: Vec3) -> Self {
        Self::new(extra.x, extra.y)
    }
}

impl Sdf for Torus {
    fn distance(&self, p: Vec3) -> f32 {
        let q = Vec2::new(Vec2::new(p.x, p.z).length() - self.radius, p.y);
        q.length() - self.tube_radius
    }
}

/// Capped cone with its tip at the origin, opening downward along -Y.
///
/// `angle` is the half-angle at the tip in radians; the base disc sits at
/// `y = -height` with radius `height * tan(angle)`.
#[derive(Debug, Clone, Copy)]
pub struct Cone {
    pub angle: f32,
    pub height: f32,
}

impl Cone {
    pub fn new(angle: f32, height: f32) -> Self {
        Self { angle, height }
    }

    pub fn from_extra(extra: Vec3) -> Self {
        Self::new(extra.x, extra.y)
    }

    pub fn base_radius(&self) -> f32 {
        self.height * self.angle.tan()
    }
}

impl Sdf for Cone {
    fn distance(&self, p: Vec3) -> f32 {
        // Work in the (radial, height) half-plane
        let (sin, cos) = self.angle.sin_cos();
        let q = Vec2::new(self.height * sin / cos, -self.height);
        let w = Vec2::new(Vec2::new(p.x, p.z).length(), p.y);

        let a = w - q * (w.dot(q) / q.dot(q)).clamp(0.0, 1.0);
        let b = w - q * Vec2::new((w.x / q.x).clamp(0.0, 1.0), 1.0);
        let k = q.y.signum();
        let d = a.length_squared().min(b.length_squared());
        let s = (k * (w.x * q.y - w.y * q.x)).max(k * (w.y - q.y));
        d.sqrt() * s.signum()
    }
}

/// Cylinder aligned with Y axis, centered on the origin
#[derive(Debug, Clone, Copy)]
pub struct Cylinder {
    pub half_height: f32,
    pub radius: f32,
}

impl Cylinder {
    pub fn new(height: f32, radius: f32) -> Self {
        Self {
            half_height: height * 0.5,
            radius,
        }
    }

    pub fn from_extra(extra: Vec3) -> Self {
        Self::new(extra.x, extra.y)
    }
}

impl Sdf for Cylinder {
    fn distance(&self, p: Vec3) -> f32 {
        let d = Vec2::new(Vec2::new(p.x, p.z).length(), p.y).abs()
            - Vec2::new(self.radius, self.half_height);
        d.x.max(d.y).min(0.0) + d.max(Vec2::ZERO).length()
    }
}

//! sdfmarch Render - CPU ray marching of composite SDF scenes
//!
//! This crate turns a validated scene snapshot into pixels.
//!
//! ## Features
//!
//! - Primary rays from camera-to-world and inverse projection transforms
//! - Sphere tracing with hit, miss and step-exhaustion outcomes
//! - Central-difference normals, diffuse plus ambient shading, optional hard shadows
//! - Solid or sky-gradient backgrounds
//! - Tiled parallel dispatch into a floating-point [`Surface`]
//!
//! ## Example
//!
//! ```rust
//! use glam::Vec3;
//! use sdfmarch_core::{EvalOptions, Evaluator};
//! use sdfmarch_render::{Camera, Environment, MarchSettings, RayMarcher, Surface, Uniforms};
//! use sdfmarch_sdf::{CsgNode, PrimitiveDesc};
//!
//! let buffers = CsgNode::from(PrimitiveDesc::sphere(1.0)).flatten().unwrap();
//! let field = Evaluator::new(&buffers, EvalOptions::default());
//!
//! let camera = Camera::default();
//! let uniforms = Uniforms::new(camera.transforms(32, 32), Vec3::new(0.0, 5.0, 0.0), false, 32, 32);
//! let marcher = RayMarcher::new(&field, &uniforms, MarchSettings::default(), Environment::default());
//!
//! let mut surface = Surface::new(32, 32);
//! marcher.render(&mut surface, 8);
//! ```

pub mod camera;
pub mod dispatch;
pub mod environment;
pub mod raymarcher;
pub mod surface;

pub use camera::{Camera, CameraTransforms};
pub use dispatch::{DEFAULT_TILE_SIZE, dispatch_tiles};
pub use environment::{Background, Environment};
pub use raymarcher::{
    Hit, March, MarchSettings, Ray, RayMarcher, Uniforms, estimate_normal, occluded, sphere_trace,
};
pub use surface::Surface;

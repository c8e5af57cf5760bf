//! # sdfmarch Core
//!
//! Signed distance functions and the composite field of a scene snapshot.
//!
//! The five primitive kinds are evaluated in their local frame, combined
//! through hard or smooth boolean operators that also carry surface color,
//! and walked over a [`sdfmarch_sdf::SceneBuffers`] snapshot by the
//! [`Evaluator`].
//!
//! ## Quick Start
//!
//! ```rust
//! use glam::Vec3;
//! use sdfmarch_core::prelude::*;
//!
//! let buffers = CsgNode::from(PrimitiveDesc::sphere(1.0))
//!     .union(PrimitiveDesc::sphere(1.0).at(Vec3::new(3.0, 0.0, 0.0)))
//!     .flatten()
//!     .unwrap();
//!
//! let field = Evaluator::new(&buffers, EvalOptions::default());
//! assert_eq!(field.distance(Vec3::new(1.5, 0.0, 0.0)), 0.5);
//! ```
//!
//! ## Units and Conventions
//!
//! - **Distances**: Arbitrary units. Non-uniform scale yields a bound, not an exact distance.
//! - **Angles**: Rotations in records are **radians**, applied Z then X then Y
//! - **Precision**: All evaluation uses `f32`, matching the GPU records
//! - **Coordinate system**: Right-handed, Y-up

pub mod eval;
pub mod sdf;

pub use eval::{DEFAULT_BLEND_STRENGTH, EvalOptions, Evaluator};
pub use sdf::{Sample, Sdf};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::eval::{EvalOptions, Evaluator};
    pub use crate::sdf::{Sample, Sdf, operations, primitives::*, transforms::LocalFrame};

    pub use sdfmarch_sdf::{
        CsgNode, Operation, OperationDesc, OperationKind, Primitive, PrimitiveDesc,
        PrimitiveKind, Root, SceneBuffers,
    };

    // Math (re-export glam)
    pub use glam::{Mat4, Quat, Vec2, Vec3};
}

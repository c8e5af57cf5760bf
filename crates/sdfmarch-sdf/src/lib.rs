//! sdfmarch SDF - Flat scene layout and composition trees
//!
//! This crate defines the data a frame is evaluated from: fixed-size
//! primitive and operation records that can be uploaded to a compute kernel
//! verbatim, the validated per-frame snapshot that owns them, and the
//! pointer-linked composition tree an authoring tool builds.
//!
//! ## Key Types
//!
//! - [`Primitive`] / [`Operation`] - GPU-layout records
//! - [`PrimitiveDesc`] / [`OperationDesc`] - typed authoring descriptors
//! - [`SceneBuffers`] - a validated snapshot with a resolved [`Root`]
//! - [`CsgNode`] - composition tree with lossless flatten/decode
//!
//! ## Example
//!
//! ```rust
//! use glam::Vec3;
//! use sdfmarch_sdf::{CsgNode, PrimitiveDesc, Root};
//!
//! let scene = CsgNode::from(PrimitiveDesc::sphere(1.0))
//!     .smooth_union(PrimitiveDesc::cuboid(Vec3::splat(0.5)).at(Vec3::X), 0.2);
//!
//! let buffers = scene.flatten().unwrap();
//! assert_eq!(buffers.root(), Root::Operation(2));
//! ```

mod buffers;
mod error;
mod layout;
mod tree;

pub use buffers::{MAX_TREE_DEPTH, Root, SceneBuffers};
pub use error::LayoutError;
pub use layout::{
    Operation, OperationDesc, OperationKind, Primitive, PrimitiveDesc, PrimitiveKind,
    euler_to_quat,
};
pub use tree::CsgNode;

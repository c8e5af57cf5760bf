//! JSON scene documents
//!
//! A document is what an authoring tool saves: primitives with rotations in
//! degrees, the operation list, the light, the camera and render settings.
//! Loading normalizes each primitive's shape parameters for its kind and
//! converts rotations to radians.

use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec3;
use sdfmarch_render::Camera;
use sdfmarch_sdf::{OperationDesc, OperationKind, PrimitiveDesc, PrimitiveKind};
use serde::{Deserialize, Serialize};

use crate::scene::{SceneInput, StaticScene};
use crate::settings::RenderSettings;

fn default_scale() -> Vec3 {
    Vec3::ONE
}

fn default_color() -> Vec3 {
    Vec3::ONE
}

fn default_extra() -> Vec3 {
    Vec3::new(1.0, 2.0, 3.0)
}

/// A primitive as written in a document
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentPrimitive {
    pub kind: PrimitiveKind,
    #[serde(default)]
    pub position: Vec3,
    /// Euler angles in degrees
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default = "default_color")]
    pub color: Vec3,
    #[serde(default = "default_extra")]
    pub extra: Vec3,
}

impl DocumentPrimitive {
    pub fn to_desc(&self) -> PrimitiveDesc {
        let rotation = Vec3::new(
            self.rotation.x.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.z.to_radians(),
        );
        PrimitiveDesc::new(self.kind, self.extra)
            .at(self.position)
            .rotated(rotation)
            .scaled(self.scale)
            .with_color(self.color)
    }
}

impl From<PrimitiveDesc> for DocumentPrimitive {
    fn from(desc: PrimitiveDesc) -> Self {
        Self {
            kind: desc.kind,
            position: desc.position,
            rotation: Vec3::new(
                desc.rotation.x.to_degrees(),
                desc.rotation.y.to_degrees(),
                desc.rotation.z.to_degrees(),
            ),
            scale: desc.scale,
            color: desc.color,
            extra: desc.extra,
        }
    }
}

/// A complete renderable scene file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub primitives: Vec<DocumentPrimitive>,
    #[serde(default)]
    pub operations: Vec<OperationDesc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<u32>,
    #[serde(default)]
    pub light: Option<Vec3>,
    #[serde(default)]
    pub camera: Camera,
    #[serde(default)]
    pub settings: RenderSettings,
}

impl SceneDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse scene document")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize scene document")
    }

    /// Load a document from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid scene document {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// The frame input this document describes
    pub fn to_input(&self) -> SceneInput {
        SceneInput {
            primitives: self.primitives.iter().map(DocumentPrimitive::to_desc).collect(),
            operations: self.operations.clone(),
            root: self.root,
            light: self.light,
        }
    }

    pub fn to_source(&self) -> StaticScene {
        StaticScene::new(self.to_input())
    }

    /// A small scene exercising every primitive kind and blend operation
    pub fn demo() -> Self {
        let red = Vec3::new(0.9, 0.2, 0.2);
        let blue = Vec3::new(0.2, 0.4, 0.9);
        let green = Vec3::new(0.3, 0.8, 0.3);
        let gold = Vec3::new(0.9, 0.7, 0.2);

        let primitives = vec![
            PrimitiveDesc::sphere(1.0).with_color(red),
            PrimitiveDesc::cuboid(Vec3::new(0.8, 0.8, 0.8))
                .at(Vec3::new(1.0, 0.0, 0.0))
                .rotated(Vec3::new(0.0, 45_f32.to_radians(), 0.0))
                .with_color(blue),
            PrimitiveDesc::cylinder(3.0, 0.35)
                .rotated(Vec3::new(90_f32.to_radians(), 0.0, 0.0))
                .with_color(green),
            PrimitiveDesc::torus(1.2, 0.2)
                .at(Vec3::new(0.5, -1.2, 0.0))
                .with_color(gold),
            PrimitiveDesc::cone(30_f32.to_radians(), 1.2)
                .at(Vec3::new(-1.8, 1.0, 0.0))
                .with_color(gold),
        ];

        let leaf = |primitive| OperationDesc {
            kind: OperationKind::Leaf,
            child1: primitive,
            child2: 0,
            blend_strength: 0.0,
        };
        let binary = |kind, child1, child2, blend_strength| OperationDesc {
            kind,
            child1,
            child2,
            blend_strength,
        };
        let operations = vec![
            leaf(0),
            leaf(1),
            binary(OperationKind::SmoothUnion, 0, 1, 0.4),
            leaf(2),
            binary(OperationKind::Subtract, 2, 3, 0.0),
            leaf(3),
            binary(OperationKind::SmoothUnion, 4, 5, 0.2),
            leaf(4),
            binary(OperationKind::Union, 6, 7, 0.0),
        ];

        Self {
            primitives: primitives.into_iter().map(DocumentPrimitive::from).collect(),
            operations,
            root: None,
            light: Some(Vec3::new(4.0, 6.0, 5.0)),
            camera: Camera::look_at(Vec3::new(0.0, 1.0, 6.0), Vec3::ZERO),
            settings: RenderSettings::default().with_blend(true),
        }
    }
}

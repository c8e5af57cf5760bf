//! Environment settings for the ray marcher
//!
//! Background, ambient term and the optional shadow ray. Everything the
//! shading step needs apart from the light position and the scene itself.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// What a ray that misses every surface shows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Background {
    /// One flat color
    Solid { color: Vec3 },
    /// Vertical sky gradient from horizon to zenith by ray elevation
    Gradient { horizon: Vec3, zenith: Vec3 },
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid {
            color: Vec3::splat(0.1),
        }
    }
}

impl Background {
    /// Sky gradient with the usual blue tones
    pub fn sky() -> Self {
        Background::Gradient {
            horizon: Vec3::new(0.7, 0.8, 0.9),
            zenith: Vec3::new(0.3, 0.5, 0.8),
        }
    }

    /// Color seen along a (normalized) ray direction
    pub fn color(&self, direction: Vec3) -> Vec3 {
        match *self {
            Background::Solid { color } => color,
            Background::Gradient { horizon, zenith } => {
                horizon.lerp(zenith, direction.y.clamp(0.0, 1.0))
            }
        }
    }
}

/// Environment settings that control the appearance of the scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// Constant light added to every hit, as a fraction of the surface color
    pub ambient: f32,
    pub background: Background,
    /// Cast a hard shadow ray toward the light for every hit
    pub shadows: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            ambient: 0.1,
            background: Background::default(),
            shadows: false,
        }
    }
}

//! Render configuration

use sdfmarch_render::{DEFAULT_TILE_SIZE, Environment, MarchSettings};
use serde::{Deserialize, Serialize};

/// Everything about a render that is not the scene or the camera.
///
/// Every field has a default, so a document may give any subset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    pub march: MarchSettings,
    pub environment: Environment,
    /// Edge length of a dispatch tile in pixels
    pub tile_size: u32,
    /// Smooth operations blend; when off they render as hard operations
    pub blend: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            march: MarchSettings::default(),
            environment: Environment::default(),
            tile_size: DEFAULT_TILE_SIZE,
            blend: false,
        }
    }
}

impl RenderSettings {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_blend(mut self, blend: bool) -> Self {
        self.blend = blend;
        self
    }
}

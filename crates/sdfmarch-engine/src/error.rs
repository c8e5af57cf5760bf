//! Frame-level failures

use sdfmarch_sdf::LayoutError;
use thiserror::Error;

/// Reasons a frame is refused before dispatch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    /// The scene has primitives but no light to shade them with
    #[error("Scene has {primitives} primitive(s) but no light source")]
    MissingLight { primitives: usize },

    /// Width or height is zero
    #[error("Viewport {width}x{height} has no pixels")]
    EmptyViewport { width: u32, height: u32 },

    /// The composition tree failed validation
    #[error("Invalid composition tree: {0}")]
    Layout(#[from] LayoutError),
}

//! sdfmarch Engine - per-frame orchestration of the SDF ray marcher
//!
//! The Engine is a thin layer that ties a scene document to the
//! [`FrameOrchestrator`] and to image output. The orchestrator itself only
//! knows about a [`SceneSource`], so other hosts can drive it directly.
//!
//! ## Example
//!
//! ```no_run
//! use sdfmarch_engine::Engine;
//! use std::path::Path;
//!
//! let mut engine = Engine::load(Path::new("scene.json"))?;
//!
//! // Single still
//! engine.render_to(Path::new("scene.png"))?;
//!
//! // 48 frames of drifting shapes at 24 fps into ./frames/Image{n}.png
//! engine.animate(48, 24.0, Path::new("frames"))?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod animate;
pub mod document;
pub mod error;
pub mod orchestrator;
pub mod present;
pub mod scene;
pub mod settings;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sdfmarch_sdf::SceneBuffers;
use tracing::info;

// Re-export commonly used types from dependencies
pub use sdfmarch_render::{
    Background, Camera, CameraTransforms, Environment, MarchSettings, Surface,
};
pub use sdfmarch_sdf::{CsgNode, OperationDesc, OperationKind, PrimitiveDesc, PrimitiveKind};

// Re-export our own types
pub use animate::{Animated, Animator, DEFAULT_FPS, ExtraDrift};
pub use document::{DocumentPrimitive, SceneDocument};
pub use error::FrameError;
pub use orchestrator::{FrameOrchestrator, FrameStats};
pub use present::{FrameCapture, FrameSink, ImageFile, PngSequence};
pub use scene::{SceneInput, SceneSource, StaticScene};
pub use settings::RenderSettings;

/// A loaded scene document and the orchestrator that renders it
#[derive(Debug)]
pub struct Engine {
    document: SceneDocument,
    source_path: Option<PathBuf>,
    orchestrator: FrameOrchestrator,
}

impl Engine {
    pub fn new(document: SceneDocument) -> Self {
        let orchestrator = FrameOrchestrator::new(document.settings, document.camera.clone());
        Self {
            document,
            source_path: None,
            orchestrator,
        }
    }

    /// Load a JSON scene document
    pub fn load(path: &Path) -> Result<Self> {
        let document = SceneDocument::load(path)?;
        info!(
            path = %path.display(),
            primitives = document.primitives.len(),
            operations = document.operations.len(),
            "Scene loaded"
        );
        let mut engine = Self::new(document);
        engine.source_path = Some(path.to_path_buf());
        Ok(engine)
    }

    pub fn document(&self) -> &SceneDocument {
        &self.document
    }

    /// Get the source file name (without path)
    pub fn source_name(&self) -> Option<String> {
        self.source_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
    }

    pub fn orchestrator(&self) -> &FrameOrchestrator {
        &self.orchestrator
    }

    pub fn orchestrator_mut(&mut self) -> &mut FrameOrchestrator {
        &mut self.orchestrator
    }

    /// Validate the document's composition tree without rendering
    pub fn check(&self) -> Result<SceneBuffers> {
        let input = self.document.to_input();
        if !input.is_empty() && input.light.is_none() {
            return Err(FrameError::MissingLight {
                primitives: input.primitives.len(),
            }
            .into());
        }
        input.snapshot().context("Composition tree is invalid")
    }

    /// Render the scene once and return the surface
    pub fn render(&mut self) -> Result<&Surface> {
        let mut source = self.document.to_source();
        self.orchestrator.render_frame(&mut source)?;
        self.orchestrator
            .surface()
            .ok_or_else(|| anyhow::anyhow!("No frame was rendered"))
    }

    /// Render the scene once and save it as an image
    pub fn render_to(&mut self, path: &Path) -> Result<FrameStats> {
        let mut source = self.document.to_source();
        let mut sink = ImageFile::new(path);
        let stats = self.orchestrator.render_and_present(&mut source, &mut sink)?;
        info!(path = %path.display(), "Image written");
        Ok(stats)
    }

    /// Render `frames` frames of the drifting scene into `Image{n}.png` files
    pub fn animate(&mut self, frames: u64, fps: f32, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut source = Animated::new(self.document.to_source(), ExtraDrift::default(), fps);
        let mut sink = PngSequence::create(dir)?;
        for _ in 0..frames {
            // Files follow the animation's clock, not the orchestrator's frame count
            let frame = source.frame();
            self.orchestrator
                .render_frame(&mut source)
                .with_context(|| format!("Frame {frame} failed"))?;
            let surface = self
                .orchestrator
                .surface()
                .ok_or_else(|| anyhow::anyhow!("No frame was rendered"))?;
            sink.present(frame, surface)?;
        }
        info!(frames, dir = %dir.display(), "Animation written");
        Ok(sink.written().to_vec())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(SceneDocument::demo())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tiny(mut document: SceneDocument) -> Engine {
        document.settings = document.settings.with_size(12, 8);
        Engine::new(document)
    }

    #[test]
    fn demo_engine_renders() {
        let mut engine = tiny(SceneDocument::demo());
        assert!(engine.check().is_ok());
        let surface = engine.render().unwrap();
        assert_eq!(surface.dimensions(), (12, 8));
        assert!(engine.source_name().is_none());
    }

    #[test]
    fn check_reports_missing_light() {
        let mut document = SceneDocument::demo();
        document.light = None;
        let err = tiny(document).check().unwrap_err();
        assert!(err.downcast_ref::<FrameError>().is_some());
    }

    #[test]
    fn animate_writes_one_file_per_frame() {
        let dir = std::env::temp_dir().join(format!("sdfmarch-anim-{}", std::process::id()));
        let mut engine = tiny(SceneDocument::demo());
        let written = engine.animate(3, 24.0, &dir).unwrap();
        assert_eq!(written.len(), 3);
        assert!(written[2].ends_with("Image2.png"));
        assert!(written.iter().all(|p| p.exists()));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn animation_numbering_ignores_earlier_renders() {
        let dir = std::env::temp_dir().join(format!("sdfmarch-anim-after-{}", std::process::id()));
        let mut engine = tiny(SceneDocument::demo());
        engine.render().unwrap();
        engine.render().unwrap();

        let written = engine.animate(2, 24.0, &dir).unwrap();
        assert!(written[0].ends_with("Image0.png"));
        assert!(written[1].ends_with("Image1.png"));
        assert_eq!(engine.orchestrator().frame_count(), 4);
        std::fs::remove_dir_all(&dir).ok();
    }
}

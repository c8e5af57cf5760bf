//! Frame Orchestrator
//!
//! Drives one frame end to end: poll the scene source, validate and encode
//! the snapshot, build the uniforms, make sure the intermediate surface
//! matches the viewport, dispatch the ray marcher and hand the result to a
//! presenter. The snapshot lives only for the duration of its frame; the
//! surface is kept and reused until the viewport size changes.

use std::time::Instant;

use sdfmarch_core::{EvalOptions, Evaluator};
use sdfmarch_render::{Camera, CameraTransforms, RayMarcher, Surface, Uniforms};
use tracing::{debug, info};

use crate::error::FrameError;
use crate::present::FrameSink;
use crate::scene::SceneSource;
use crate::settings::RenderSettings;

/// What a rendered frame contained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub index: u64,
    pub primitives: usize,
    pub operations: usize,
    /// The scene was empty and only the background was drawn
    pub background_only: bool,
}

/// Owns the render surface and renders frames from a [`SceneSource`]
#[derive(Debug)]
pub struct FrameOrchestrator {
    settings: RenderSettings,
    camera: Camera,
    surface: Option<Surface>,
    frames: u64,
}

impl FrameOrchestrator {
    pub fn new(settings: RenderSettings, camera: Camera) -> Self {
        Self {
            settings,
            camera,
            surface: None,
            frames: 0,
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Change the viewport. The surface is reallocated on the next frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.settings.width = width;
        self.settings.height = height;
    }

    /// The most recently rendered frame, if any
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Number of frames rendered so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Render one frame from `source` into the surface, viewed through the
    /// orchestrator's camera.
    ///
    /// Fails before dispatch when the viewport is empty, the scene has no
    /// light, or the composition tree is malformed.
    pub fn render_frame(&mut self, source: &mut dyn SceneSource) -> Result<FrameStats, FrameError> {
        let transforms = self.camera.transforms(self.settings.width, self.settings.height);
        self.render_frame_with(source, transforms)
    }

    /// Render one frame with camera-to-world and inverse projection matrices
    /// supplied by the host. The stored camera is not consulted.
    pub fn render_frame_with(
        &mut self,
        source: &mut dyn SceneSource,
        transforms: CameraTransforms,
    ) -> Result<FrameStats, FrameError> {
        let (width, height) = (self.settings.width, self.settings.height);
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyViewport { width, height });
        }

        let start = Instant::now();
        let input = source.current_frame();
        let index = self.frames;

        if input.is_empty() {
            debug!(frame = index, "Empty scene, rendering background only");
            let uniforms = Uniforms::new(
                transforms,
                input.light.unwrap_or_default(),
                self.settings.blend,
                width,
                height,
            );
            let marcher = RayMarcher::background_only(
                &uniforms,
                self.settings.march,
                self.settings.environment,
            );
            let tile_size = self.settings.tile_size;
            let surface = self.surface_for(width, height);
            marcher.render(surface, tile_size);
            self.frames += 1;
            return Ok(FrameStats {
                index,
                primitives: 0,
                operations: input.operations.len(),
                background_only: true,
            });
        }

        let light = input.light.ok_or(FrameError::MissingLight {
            primitives: input.primitives.len(),
        })?;
        let buffers = input.snapshot()?;
        let uniforms = Uniforms::new(
            transforms,
            light,
            self.settings.blend,
            width,
            height,
        );

        let field = Evaluator::new(&buffers, EvalOptions::with_blend(uniforms.blend_enabled()));
        let marcher = RayMarcher::new(
            &field,
            &uniforms,
            self.settings.march,
            self.settings.environment,
        );
        let tile_size = self.settings.tile_size;
        let surface = self.surface_for(uniforms.width(), uniforms.height());
        marcher.render(surface, tile_size);

        self.frames += 1;
        info!(
            frame = index,
            primitives = buffers.primitives().len(),
            operations = buffers.operations().len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Frame rendered"
        );
        Ok(FrameStats {
            index,
            primitives: buffers.primitives().len(),
            operations: buffers.operations().len(),
            background_only: false,
        })
    }

    /// Render a frame and pass it to `sink`
    pub fn render_and_present(
        &mut self,
        source: &mut dyn SceneSource,
        sink: &mut dyn FrameSink,
    ) -> anyhow::Result<FrameStats> {
        let stats = self.render_frame(source)?;
        if let Some(surface) = &self.surface {
            sink.present(stats.index, surface)?;
        }
        Ok(stats)
    }

    /// Surface matching `width` x `height`, reallocating a stale one
    fn surface_for(&mut self, width: u32, height: u32) -> &mut Surface {
        let stale = self
            .surface
            .as_ref()
            .is_none_or(|surface| !surface.matches(width, height));
        if stale {
            debug!(width, height, "Allocating render surface");
            self.surface = Some(Surface::new(width, height));
        }
        self.surface.get_or_insert_with(|| Surface::new(width, height))
    }
}

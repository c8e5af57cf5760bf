//! Presentation of finished frames
//!
//! The orchestrator hands every completed surface to a [`FrameSink`]. Sinks
//! here write image files; a window or network presenter would implement
//! the same trait.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sdfmarch_render::Surface;
use tracing::debug;

/// Consumes completed frames
pub trait FrameSink {
    fn present(&mut self, frame: u64, surface: &Surface) -> Result<()>;
}

/// Writes every frame to the same image file
#[derive(Debug, Clone)]
pub struct ImageFile {
    path: PathBuf,
}

impl ImageFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSink for ImageFile {
    fn present(&mut self, frame: u64, surface: &Surface) -> Result<()> {
        surface.save(&self.path)?;
        debug!(frame, path = %self.path.display(), "Frame saved");
        Ok(())
    }
}

/// Writes frame `n` to `Image{n}.png` inside a directory
#[derive(Debug, Clone)]
pub struct PngSequence {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl PngSequence {
    /// Create the output directory if it does not exist yet
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        Ok(Self {
            dir,
            written: Vec::new(),
        })
    }

    pub fn frame_path(&self, frame: u64) -> PathBuf {
        self.dir.join(format!("Image{frame}.png"))
    }

    /// Files written so far, in frame order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequence {
    fn present(&mut self, frame: u64, surface: &Surface) -> Result<()> {
        let path = self.frame_path(frame);
        surface.save(&path)?;
        debug!(frame, path = %path.display(), "Frame saved");
        self.written.push(path);
        Ok(())
    }
}

/// Keeps copies of presented frames in memory
#[derive(Debug, Clone, Default)]
pub struct FrameCapture {
    pub frames: Vec<(u64, Surface)>,
}

impl FrameSink for FrameCapture {
    fn present(&mut self, frame: u64, surface: &Surface) -> Result<()> {
        self.frames.push((frame, surface.clone()));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn sequence_names_frames_by_index() {
        let dir = std::env::temp_dir().join(format!("sdfmarch-seq-{}", std::process::id()));
        let mut sink = PngSequence::create(&dir).unwrap();
        assert_eq!(sink.frame_path(7), dir.join("Image7.png"));

        let mut surface = Surface::new(2, 2);
        surface.fill(Vec4::new(1.0, 0.0, 0.0, 1.0));
        sink.present(0, &surface).unwrap();
        sink.present(1, &surface).unwrap();
        assert_eq!(sink.written().len(), 2);

        let img = image::open(dir.join("Image1.png")).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn capture_keeps_frames() {
        let mut sink = FrameCapture::default();
        sink.present(3, &Surface::new(1, 1)).unwrap();
        assert_eq!(sink.frames[0].0, 3);
    }
}

//! Floating-point render target

use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec4;

/// Linear RGBA float image, row-major with row 0 at the top
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<Vec4>,
}

impl Surface {
    /// Allocate a `width` x `height` surface cleared to transparent black
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec4::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether this surface can receive a `width` x `height` dispatch
    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }

    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Vec4] {
        &mut self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Vec4> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn fill(&mut self, color: Vec4) {
        self.pixels.fill(color);
    }

    /// Quantize to 8-bit RGBA, clamping each channel to [0, 1]
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let mut img = image::RgbaImage::new(self.width, self.height);
        for (dst, src) in img.pixels_mut().zip(&self.pixels) {
            let c = (src.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
            *dst = image::Rgba([c.x as u8, c.y as u8, c.z as u8, c.w as u8]);
        }
        img
    }

    /// Full-precision copy for float formats
    pub fn to_rgba32f_image(&self) -> image::Rgba32FImage {
        let data = self.pixels.iter().flat_map(|p| p.to_array()).collect();
        image::Rgba32FImage::from_raw(self.width, self.height, data)
            .unwrap_or_else(|| image::Rgba32FImage::new(self.width, self.height))
    }

    /// Write an 8-bit image; the format follows the file extension
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.to_rgba_image()
            .save(path)
            .with_context(|| format!("Failed to write image {}", path.display()))
    }
}

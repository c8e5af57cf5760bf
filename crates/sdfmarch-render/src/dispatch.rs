//! Tiled parallel dispatch over a surface
//!
//! The surface is split into bands of `tile_size` rows, one rayon task per
//! band, and each band is walked in `tile_size`-wide tiles. Every pixel is
//! written by exactly one task.

use glam::Vec4;
use rayon::prelude::*;

use crate::surface::Surface;

/// Edge length of a dispatch tile in pixels
pub const DEFAULT_TILE_SIZE: u32 = 8;

/// Fill every pixel of `surface` with `shade(x, y)`.
///
/// A `tile_size` of zero is treated as one.
pub fn dispatch_tiles<F>(surface: &mut Surface, tile_size: u32, shade: F)
where
    F: Fn(u32, u32) -> Vec4 + Sync,
{
    let (width, height) = surface.dimensions();
    if width == 0 || height == 0 {
        return;
    }
    let tile = tile_size.max(1) as usize;
    let width = width as usize;

    surface
        .pixels_mut()
        .par_chunks_mut(width * tile)
        .enumerate()
        .for_each(|(band, rows)| {
            let band_height = rows.len() / width;
            let y0 = band * tile;
            for x0 in (0..width).step_by(tile) {
                let x1 = (x0 + tile).min(width);
                for row in 0..band_height {
                    let y = (y0 + row) as u32;
                    for x in x0..x1 {
                        rows[row * width + x] = shade(x as u32, y);
                    }
                }
            }
        });
}

mod color;

// Re-export public API
pub use color::{map_to_rgb, ColorMap};

use crate::state::idx;

/// Maps a square `n`x`n` grid onto a `width`x`height` pixel frame.
///
/// Grid `x` runs left to right and grid `y` runs top to bottom; each cell
/// covers a block of pixels picked by nearest-neighbor scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
    pub n: usize,
}

impl Viewport {
    pub fn new(width: usize, height: usize, n: usize) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            n,
        }
    }

    /// Display pixels per grid cell, horizontally.
    pub fn scale_x(&self) -> f64 {
        self.width as f64 / self.n as f64
    }

    /// Display pixels per grid cell, vertically.
    pub fn scale_y(&self) -> f64 {
        self.height as f64 / self.n as f64
    }

    /// Window pixel position to fractional grid coordinates.
    pub fn to_grid(&self, px: f32, py: f32) -> (f64, f64) {
        (px as f64 / self.scale_x(), py as f64 / self.scale_y())
    }

    /// Grid cell shown at pixel `(px, py)`.
    fn cell_at(&self, px: usize, py: usize) -> (usize, usize) {
        let gx = (px * self.n / self.width).min(self.n - 1);
        let gy = (py * self.n / self.height).min(self.n - 1);
        (gx, gy)
    }
}

/// Paint the density field into a 0RGB frame buffer of `width * height` pixels.
///
/// `saturation` is the density drawn at full intensity; values above it clip.
pub fn render_density(frame: &mut [u32], density: &[f64], view: &Viewport, colormap: ColorMap, saturation: f64) {
    debug_assert_eq!(frame.len(), view.width * view.height);
    debug_assert_eq!(density.len(), view.n * view.n);
    let inv = if saturation > 0.0 { 1.0 / saturation } else { 0.0 };

    // Column lookup is shared by every row
    let cols: Vec<usize> = (0..view.width).map(|px| view.cell_at(px, 0).0).collect();
    for (py, row) in frame.chunks_mut(view.width).enumerate() {
        let (_, gy) = view.cell_at(0, py);
        for (px, pixel) in row.iter_mut().enumerate() {
            let d = density[idx(cols[px], gy, view.n)];
            *pixel = map_to_rgb(d * inv, colormap);
        }
    }
}

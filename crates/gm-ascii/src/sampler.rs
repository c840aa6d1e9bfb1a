use gm_core::charset::RampLut;
use gm_core::config::RenderConfig;
use gm_core::frame::{FrameBuffer, GlyphGrid};

use crate::transform::CELL_ASPECT;

/// Sous-échantillons maximum par axe et par cellule.
pub const MAX_SUBSAMPLES: u32 = 4;

/// Sampled source window, in source pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleWindow {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
    cos: f32,
    sin: f32,
}

impl SampleWindow {
    /// Window for a `src_w × src_h` source and a `grid_w × grid_h` grid.
    ///
    /// The window covers the source at the grid's physical ratio (2:1
    /// cells), divided by `zoom`. Pan is a fraction of the source size; the
    /// centre is then clamped to keep the window inside the image.
    ///
    /// # Example
    /// ```
    /// use gm_ascii::sampler::SampleWindow;
    /// // An 80×40 grid is physically 1:1 on a square source.
    /// let w = SampleWindow::new(100, 100, 80, 40, 1.0, 0.0, 0.0, 0.0);
    /// assert_eq!((w.width, w.height), (100.0, 100.0));
    /// assert_eq!((w.center_x, w.center_y), (50.0, 50.0));
    /// ```
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        src_w: u32,
        src_h: u32,
        grid_w: u16,
        grid_h: u16,
        zoom: f32,
        pan_x: f32,
        pan_y: f32,
        rotation: f32,
    ) -> Self {
        let (sw, sh) = (src_w as f32, src_h as f32);
        let grid_aspect =
            f32::from(grid_w.max(1)) * CELL_ASPECT / f32::from(grid_h.max(1));
        let src_aspect = sw / sh.max(1.0);

        let (base_w, base_h) = if src_aspect > grid_aspect {
            (sh * grid_aspect, sh)
        } else {
            (sw, sw / grid_aspect)
        };
        let zoom = if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 };
        let (width, height) = (base_w / zoom, base_h / zoom);

        let center = |size: f32, view: f32, pan: f32| {
            let pan = if pan.is_finite() { pan.clamp(-1.0, 1.0) } else { 0.0 };
            let wanted = size / 2.0 + pan * size;
            if view >= size {
                size / 2.0
            } else {
                wanted.clamp(view / 2.0, size - view / 2.0)
            }
        };
        let rotation = if rotation.is_finite() { rotation } else { 0.0 };
        let (sin, cos) = rotation.sin_cos();

        Self {
            center_x: center(sw, width, pan_x),
            center_y: center(sh, height, pan_y),
            width,
            height,
            cos,
            sin,
        }
    }

    #[must_use]
    pub fn from_config(frame: &FrameBuffer, grid: &GlyphGrid, config: &RenderConfig) -> Self {
        Self::new(
            frame.width,
            frame.height,
            grid.width,
            grid.height,
            config.image_zoom,
            config.image_pan_x,
            config.image_pan_y,
            config.image_rotation,
        )
    }

    /// Source position for normalized window coordinates `u, v` ∈ [0, 1].
    #[inline]
    #[must_use]
    pub fn source_point(&self, u: f32, v: f32) -> (f32, f32) {
        let dx = (u - 0.5) * self.width;
        let dy = (v - 0.5) * self.height;
        (
            self.center_x + dx * self.cos - dy * self.sin,
            self.center_y + dx * self.sin + dy * self.cos,
        )
    }
}

/// Mean luminance of a cell over `k × k` sub-samples.
///
/// A sample outside the buffer counts as black.
#[inline]
fn cell_luma(frame: &FrameBuffer, window: &SampleWindow, cx: u16, cy: u16, grid: &GlyphGrid, k: u32) -> f32 {
    let (gw, gh) = (f32::from(grid.width), f32::from(grid.height));
    let step = 1.0 / k as f32;
    let mut sum = 0.0;
    for j in 0..k {
        let v = (f32::from(cy) + (j as f32 + 0.5) * step) / gh;
        for i in 0..k {
            let u = (f32::from(cx) + (i as f32 + 0.5) * step) / gw;
            let (sx, sy) = window.source_point(u, v);
            if sx >= 0.0 && sy >= 0.0 && sx < frame.width as f32 && sy < frame.height as f32 {
                sum += frame.luma(sx as u32, sy as u32);
            }
        }
    }
    sum / (k * k) as f32
}

/// Samples `frame` into `grid` through the ramp from `config`.
///
/// # Example
/// ```
/// use gm_ascii::sampler::sample_image;
/// use gm_core::config::RenderConfig;
/// use gm_core::frame::{FrameBuffer, GlyphGrid};
///
/// let white = FrameBuffer::filled(64, 64, [255, 255, 255, 255]);
/// let mut grid = GlyphGrid::new(16, 8);
/// sample_image(&white, &RenderConfig::default(), &mut grid);
/// assert!(grid.cells.iter().all(|&c| c == '@'));
/// ```
pub fn sample_image(frame: &FrameBuffer, config: &RenderConfig, grid: &mut GlyphGrid) {
    let lut = RampLut::new(config.ramp);
    sample_image_with(frame, config, &lut, grid);
}

/// Same, with a prebuilt LUT.
pub fn sample_image_with(frame: &FrameBuffer, config: &RenderConfig, lut: &RampLut, grid: &mut GlyphGrid) {
    grid.clear();
    if frame.width == 0 || frame.height == 0 || grid.width == 0 || grid.height == 0 {
        return;
    }
    let window = SampleWindow::from_config(frame, grid, config);
    // Assez de sous-échantillons pour couvrir les pixels d'une cellule, au plus 4×4.
    let per_cell = (window.width / f32::from(grid.width)).ceil();
    let k = if per_cell.is_finite() {
        (per_cell as u32).clamp(1, MAX_SUBSAMPLES)
    } else {
        1
    };

    for cy in 0..grid.height {
        for cx in 0..grid.width {
            let mut level = cell_luma(frame, &window, cx, cy, grid, k);
            if config.invert {
                level = 1.0 - level;
            }
            grid.set(cx, cy, lut.glyph(level));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gm_core::charset::GlyphRamp;

    fn cfg() -> RenderConfig {
        RenderConfig::default()
    }

    #[test]
    fn uniform_buffers_map_to_ramp_ends() {
        let mut grid = GlyphGrid::new(20, 10);
        sample_image(&FrameBuffer::filled(37, 23, [0, 0, 0, 255]), &cfg(), &mut grid);
        assert!(grid.cells.iter().all(|&c| c == ' '));
        sample_image(&FrameBuffer::filled(37, 23, [255, 255, 255, 255]), &cfg(), &mut grid);
        assert!(grid.cells.iter().all(|&c| c == '@'));
    }

    #[test]
    fn invert_flips_levels() {
        let mut config = cfg();
        config.invert = true;
        let mut grid = GlyphGrid::new(8, 4);
        sample_image(&FrameBuffer::filled(16, 16, [0, 0, 0, 255]), &config, &mut grid);
        assert!(grid.cells.iter().all(|&c| c == '@'));
    }

    #[test]
    fn transparent_pixels_are_black() {
        let mut grid = GlyphGrid::new(8, 4);
        sample_image(&FrameBuffer::filled(16, 16, [255, 255, 255, 0]), &cfg(), &mut grid);
        assert!(grid.cells.iter().all(|&c| c == ' '));
    }

    #[test]
    fn mid_grey_uses_luma_weights() {
        // Rouge pur : luma 0.299 → floor(0.299 × 9) = 2 → ':'
        let mut grid = GlyphGrid::new(4, 2);
        sample_image(&FrameBuffer::filled(8, 8, [255, 0, 0, 255]), &cfg(), &mut grid);
        assert!(grid.cells.iter().all(|&c| c == ':'));
    }

    #[test]
    fn window_covers_with_grid_aspect() {
        // Source large 200×100, grille carrée physique (80×40) : recadrage en largeur.
        let w = SampleWindow::new(200, 100, 80, 40, 1.0, 0.0, 0.0, 0.0);
        assert_eq!((w.width, w.height), (100.0, 100.0));
        // Source haute 100×200.
        let w = SampleWindow::new(100, 200, 80, 40, 1.0, 0.0, 0.0, 0.0);
        assert_eq!((w.width, w.height), (100.0, 100.0));
        // Zoom 2 divise la fenêtre.
        let w = SampleWindow::new(100, 100, 80, 40, 2.0, 0.0, 0.0, 0.0);
        assert_eq!((w.width, w.height), (50.0, 50.0));
    }

    #[test]
    fn pan_is_clamped_to_buffer() {
        let w = SampleWindow::new(100, 100, 80, 40, 2.0, 1.0, -1.0, 0.0);
        assert_eq!(w.center_x, 75.0);
        assert_eq!(w.center_y, 25.0);
        let w = SampleWindow::new(100, 100, 80, 40, 4.0, 0.1, 0.0, 0.0);
        assert_eq!(w.center_x, 60.0);
    }

    #[test]
    fn left_half_white_image_splits_grid() {
        let mut frame = FrameBuffer::filled(40, 40, [0, 0, 0, 255]);
        for y in 0..40u32 {
            for x in 0..20u32 {
                let i = ((y * 40 + x) * 4) as usize;
                frame.data[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
            }
        }
        let mut grid = GlyphGrid::new(20, 10);
        sample_image(&frame, &cfg(), &mut grid);
        for y in 0..10 {
            assert_eq!(grid.get(0, y), '@');
            assert_eq!(grid.get(19, y), ' ');
        }

        // Rotation d'un demi-tour : les moitiés s'échangent.
        let mut config = cfg();
        config.image_rotation = std::f32::consts::PI;
        sample_image(&frame, &config, &mut grid);
        for y in 1..9 {
            assert_eq!(grid.get(1, y), ' ');
            assert_eq!(grid.get(18, y), '@');
        }
    }

    #[test]
    fn zoom_out_pads_with_black() {
        let mut config = cfg();
        config.image_zoom = 0.25;
        let mut grid = GlyphGrid::new(20, 10);
        sample_image(&FrameBuffer::filled(10, 10, [255, 255, 255, 255]), &config, &mut grid);
        assert_eq!(grid.get(0, 0), ' ');
        assert_eq!(grid.get(10, 5), '@');
    }

    #[test]
    fn ramp_choice_is_respected() {
        let mut config = cfg();
        config.ramp = GlyphRamp::Blocks;
        let mut grid = GlyphGrid::new(4, 2);
        sample_image(&FrameBuffer::filled(8, 8, [255, 255, 255, 255]), &config, &mut grid);
        assert!(grid.cells.iter().all(|&c| c == '█'));
    }

    #[test]
    fn empty_frame_leaves_blank_grid() {
        let mut grid = GlyphGrid::new(4, 2);
        grid.set(0, 0, '#');
        sample_image(&FrameBuffer::new(0, 0), &cfg(), &mut grid);
        assert_eq!(grid.filled_count(), 0);
    }
}

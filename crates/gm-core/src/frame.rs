use crate::error::CoreError;

/// Source pixel buffer (image path).
///
/// Stores pixels as row-major RGBA, 4 bytes per pixel.
///
/// # Example
/// ```
/// use gm_core::frame::FrameBuffer;
/// let fb = FrameBuffer::new(10, 10);
/// assert_eq!(fb.data.len(), 400);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    /// RGBA pixels, row-major, 4 bytes per pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Create a transparent black buffer of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    /// Wrap an existing RGBA8 buffer.
    ///
    /// # Errors
    /// Returns [`CoreError::BufferSize`] if `data.len() != width × height × 4`.
    ///
    /// # Example
    /// ```
    /// use gm_core::frame::FrameBuffer;
    /// assert!(FrameBuffer::from_rgba(vec![0; 16], 2, 2).is_ok());
    /// assert!(FrameBuffer::from_rgba(vec![0; 15], 2, 2).is_err());
    /// ```
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Result<Self, CoreError> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(CoreError::BufferSize {
                len: data.len(),
                width,
                height,
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Fill the buffer with a solid color.
    #[must_use]
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut fb = Self::new(width, height);
        for px in fb.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        fb
    }

    /// Pixel at (x, y) → (r, g, b, a). Out of bounds → (0, 0, 0, 0).
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        if x >= self.width || y >= self.height {
            return (0, 0, 0, 0);
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        match self.data.get(idx..idx + 4) {
            Some(px) => (px[0], px[1], px[2], px[3]),
            None => (0, 0, 0, 0),
        }
    }

    /// Rec.601 luminance `0.299R + 0.587G + 0.114B`, normalized to [0, 1].
    ///
    /// A fully transparent pixel counts as black.
    ///
    /// # Example
    /// ```
    /// use gm_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::filled(1, 1, [255, 255, 255, 255]);
    /// assert_eq!(fb.luma(0, 0), 1.0);
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn luma(&self, x: u32, y: u32) -> f32 {
        let (r, g, b, a) = self.pixel(x, y);
        if a == 0 {
            return 0.0;
        }
        // Poids entiers : un blanc opaque donne exactement 1.0.
        let weighted = 299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b);
        weighted as f32 / 255_000.0
    }
}

/// Output glyph grid, W×H, row-major.
///
/// # Example
/// ```
/// use gm_core::frame::GlyphGrid;
/// let mut grid = GlyphGrid::new(4, 2);
/// grid.set(1, 0, '#');
/// assert_eq!(grid.get(1, 0), '#');
/// assert_eq!(grid.to_text(), " #  \n    ");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphGrid {
    /// Flat array of glyphs, row-major.
    pub cells: Vec<char>,
    /// Width in characters.
    pub width: u16,
    /// Height in characters.
    pub height: u16,
}

impl GlyphGrid {
    /// Grid filled with spaces.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            cells: vec![' '; usize::from(width) * usize::from(height)],
            width,
            height,
        }
    }

    #[inline(always)]
    pub fn set(&mut self, x: u16, y: u16, ch: char) {
        let idx = usize::from(y) * usize::from(self.width) + usize::from(x);
        if let Some(cell) = self.cells.get_mut(idx) {
            *cell = ch;
        }
    }

    /// Glyph at (x, y); out of bounds returns a space.
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> char {
        if x >= self.width || y >= self.height {
            return ' ';
        }
        self.cells
            .get(usize::from(y) * usize::from(self.width) + usize::from(x))
            .copied()
            .unwrap_or(' ')
    }

    /// One row of the grid.
    #[must_use]
    pub fn row(&self, y: u16) -> &[char] {
        let w = usize::from(self.width);
        let start = usize::from(y) * w;
        self.cells.get(start..start + w).unwrap_or(&[])
    }

    /// Number of non-blank cells.
    #[must_use]
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != ' ').count()
    }

    /// Clear all cells to space.
    pub fn clear(&mut self) {
        self.cells.fill(' ');
    }

    /// Frame text: rows joined by `\n`, no trailing newline.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + usize::from(self.height));
        for y in 0..self.height {
            if y > 0 {
                out.push('\n');
            }
            out.extend(self.row(y));
        }
        out
    }
}

/// Depth buffer parallel to the grid. Starts at −∞; larger = closer.
///
/// # Example
/// ```
/// use gm_core::frame::DepthBuffer;
/// let mut depth = DepthBuffer::new(2, 2);
/// assert!(depth.test_and_set(0, 0, 0.5));
/// assert!(!depth.test_and_set(0, 0, 0.5));
/// assert!(depth.test_and_set(0, 0, 0.7));
/// assert!(!depth.test_and_set(1, 1, f32::NAN));
/// ```
#[derive(Clone, Debug)]
pub struct DepthBuffer {
    depth: Vec<f32>,
    width: u16,
    height: u16,
}

impl DepthBuffer {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            depth: vec![f32::NEG_INFINITY; usize::from(width) * usize::from(height)],
            width,
            height,
        }
    }

    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Reset every depth to −∞.
    pub fn reset(&mut self) {
        self.depth.fill(f32::NEG_INFINITY);
    }

    /// Stored depth, or −∞ out of bounds.
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> f32 {
        if x >= self.width || y >= self.height {
            return f32::NEG_INFINITY;
        }
        self.depth[usize::from(y) * usize::from(self.width) + usize::from(x)]
    }

    /// Write `z` if it is strictly closer than the stored value.
    ///
    /// On ties the first writer wins. NaN never writes.
    #[inline(always)]
    pub fn test_and_set(&mut self, x: u16, y: u16, z: f32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = usize::from(y) * usize::from(self.width) + usize::from(x);
        if z > self.depth[idx] {
            self.depth[idx] = z;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luma_weights_channels() {
        let red = FrameBuffer::filled(1, 1, [255, 0, 0, 255]);
        let green = FrameBuffer::filled(1, 1, [0, 255, 0, 255]);
        let blue = FrameBuffer::filled(1, 1, [0, 0, 255, 255]);
        assert!((red.luma(0, 0) - 0.299).abs() < 1e-6);
        assert!((green.luma(0, 0) - 0.587).abs() < 1e-6);
        assert!((blue.luma(0, 0) - 0.114).abs() < 1e-6);
    }

    #[test]
    fn wrong_rgba_length_reports_buffer_size() {
        let err = FrameBuffer::from_rgba(vec![0; 10], 2, 2).unwrap_err();
        assert!(matches!(
            err,
            CoreError::BufferSize {
                len: 10,
                width: 2,
                height: 2
            }
        ));
    }

    #[test]
    fn transparent_pixel_is_black() {
        let fb = FrameBuffer::filled(1, 1, [255, 255, 255, 0]);
        assert_eq!(fb.luma(0, 0), 0.0);
    }

    #[test]
    fn pixel_out_of_bounds_is_zero() {
        let fb = FrameBuffer::filled(2, 2, [9, 9, 9, 9]);
        assert_eq!(fb.pixel(2, 0), (0, 0, 0, 0));
        assert_eq!(fb.pixel(0, 5), (0, 0, 0, 0));
    }

    #[test]
    fn grid_ignores_out_of_bounds_writes() {
        let mut grid = GlyphGrid::new(3, 3);
        grid.set(3, 0, '#');
        grid.set(0, 3, '#');
        assert_eq!(grid.filled_count(), 0);
        assert_eq!(grid.get(10, 10), ' ');
    }

    #[test]
    fn depth_buffer_starts_at_negative_infinity() {
        let depth = DepthBuffer::new(3, 2);
        assert_eq!(depth.get(2, 1), f32::NEG_INFINITY);
        assert_eq!(depth.get(9, 9), f32::NEG_INFINITY);
    }

    #[test]
    fn depth_reset_forgets_writes() {
        let mut depth = DepthBuffer::new(2, 2);
        assert!(depth.test_and_set(1, 0, 3.0));
        depth.reset();
        assert_eq!(depth.get(1, 0), f32::NEG_INFINITY);
        assert!(depth.test_and_set(1, 0, -3.0));
    }
}

use std::sync::Arc;
use std::time::Duration;

use crate::config::RenderConfig;
use crate::frame::{FrameBuffer, GlyphGrid};

/// Provides pixel frames to the image path.
///
/// Implemented by: `ImageSource`, `GifSource`.
///
/// # Example
/// ```
/// use gm_core::traits::Source;
/// use gm_core::frame::FrameBuffer;
/// use std::sync::Arc;
///
/// struct DummySource;
/// impl Source for DummySource {
///     fn next_frame(&mut self) -> Option<Arc<FrameBuffer>> { None }
///     fn native_size(&self) -> (u32, u32) { (0, 0) }
///     fn is_animated(&self) -> bool { false }
/// }
/// ```
pub trait Source: Send + 'static {
    /// Returns the current frame.
    ///
    /// Returns `None` if the source has no frame.
    /// NEVER blocks.
    fn next_frame(&mut self) -> Option<Arc<FrameBuffer>>;

    /// Native dimensions of the source.
    fn native_size(&self) -> (u32, u32);

    /// Whether the source is an animated sequence.
    fn is_animated(&self) -> bool;

    /// Advances playback by `dt`. Returns `true` if the current frame changed.
    fn advance(&mut self, _dt: Duration) -> bool {
        false
    }

    /// Stops playback; the current frame stays on screen.
    fn stop(&mut self) {}

    /// Resumes playback after [`Source::stop`].
    fn resume(&mut self) {}

    /// Playback is running.
    fn is_playing(&self) -> bool {
        false
    }
}

/// Produces a glyph grid from the current view state.
///
/// Meshes and images share this entry point; the render loop only knows it.
///
/// # Example
/// ```
/// use gm_core::traits::GridRenderer;
/// use gm_core::frame::GlyphGrid;
/// use gm_core::config::RenderConfig;
///
/// struct Blank;
/// impl GridRenderer for Blank {
///     fn render(&mut self, _config: &RenderConfig, grid: &mut GlyphGrid) { grid.clear(); }
///     fn name(&self) -> &str { "blank" }
/// }
/// ```
pub trait GridRenderer {
    /// Draws a full frame into `grid` (already sized).
    fn render(&mut self, config: &RenderConfig, grid: &mut GlyphGrid);

    /// Display name for the status bar.
    fn name(&self) -> &str;
}

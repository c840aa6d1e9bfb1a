/// Terminal presentation for glyphmesh.
///
/// Writes the glyph grid into a ratatui buffer, with a settings sidebar,
/// help overlay and FPS counter.
pub mod canvas;
pub mod fps;
pub mod ui;

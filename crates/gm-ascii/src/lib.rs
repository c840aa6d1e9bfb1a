/// Glyph engine for glyphmesh.
///
/// Turns a mesh (rotation, perspective, scanline rasterization, depth
/// buffer) or a raster image into a character grid.
pub mod raster;
pub mod sampler;
pub mod scene;
pub mod transform;

pub use raster::{Rasterizer, RenderStats};
pub use scene::{ImageRenderer, MeshRenderer};
pub use transform::Transformer;

/// Configuration, types, and shared structures for glyphmesh.
///
/// This crate contains the mesh model, glyph ramps, frame buffers,
/// view configuration and animation timers shared across the workspace.

pub mod animation;
pub mod charset;
pub mod config;
pub mod error;
pub mod frame;
pub mod mesh;
pub mod traits;

pub use charset::GlyphRamp;
pub use config::RenderConfig;
pub use error::CoreError;
pub use frame::{DepthBuffer, FrameBuffer, GlyphGrid};
pub use mesh::{Face, Mesh, Vertex};


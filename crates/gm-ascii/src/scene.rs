use std::sync::Arc;

use gm_core::charset::{GlyphRamp, RampLut};
use gm_core::config::RenderConfig;
use gm_core::frame::{FrameBuffer, GlyphGrid};
use gm_core::mesh::Mesh;
use gm_core::traits::GridRenderer;

use crate::raster::{Rasterizer, RenderStats};
use crate::sampler::sample_image_with;

/// Renders a 3D mesh.
///
/// The mesh is an `Arc` snapshot: the loop swaps it when a decode
/// finishes, without copying vertices.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use gm_ascii::scene::MeshRenderer;
/// use gm_core::config::RenderConfig;
/// use gm_core::frame::GlyphGrid;
/// use gm_core::mesh::{Face, Mesh, Vertex};
/// use gm_core::traits::GridRenderer;
///
/// let mesh = Mesh::new(
///     "tri",
///     vec![Vertex::new(-0.5, -0.5, 0.0), Vertex::new(0.5, -0.5, 0.0), Vertex::new(0.0, 0.5, 0.0)],
///     vec![Face::tri(0, 1, 2)],
/// );
/// let mut renderer = MeshRenderer::new(Arc::new(mesh));
/// let mut grid = GlyphGrid::new(40, 20);
/// renderer.render(&RenderConfig::default(), &mut grid);
/// assert_eq!(renderer.name(), "tri");
/// assert_eq!(renderer.stats().drawn, 1);
/// ```
#[derive(Debug)]
pub struct MeshRenderer {
    mesh: Arc<Mesh>,
    raster: Rasterizer,
    stats: RenderStats,
}

impl MeshRenderer {
    #[must_use]
    pub fn new(mesh: Arc<Mesh>) -> Self {
        Self {
            mesh,
            raster: Rasterizer::new(),
            stats: RenderStats::default(),
        }
    }

    pub fn set_mesh(&mut self, mesh: Arc<Mesh>) {
        self.mesh = mesh;
    }

    #[must_use]
    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    /// Counters from the last frame.
    #[must_use]
    pub fn stats(&self) -> RenderStats {
        self.stats
    }
}

impl GridRenderer for MeshRenderer {
    fn render(&mut self, config: &RenderConfig, grid: &mut GlyphGrid) {
        self.stats = self.raster.render(&self.mesh, config, grid);
    }

    fn name(&self) -> &str {
        &self.mesh.name
    }
}

/// Renders a raster image (a still frame or an animation's current frame).
#[derive(Debug)]
pub struct ImageRenderer {
    name: String,
    frame: Arc<FrameBuffer>,
    ramp: GlyphRamp,
    lut: RampLut,
}

impl ImageRenderer {
    #[must_use]
    pub fn new(name: impl Into<String>, frame: Arc<FrameBuffer>) -> Self {
        let ramp = GlyphRamp::default();
        Self {
            name: name.into(),
            frame,
            ramp,
            lut: RampLut::new(ramp),
        }
    }

    pub fn set_frame(&mut self, frame: Arc<FrameBuffer>) {
        self.frame = frame;
    }

    #[must_use]
    pub fn frame(&self) -> &Arc<FrameBuffer> {
        &self.frame
    }
}

impl GridRenderer for ImageRenderer {
    fn render(&mut self, config: &RenderConfig, grid: &mut GlyphGrid) {
        if self.ramp != config.ramp {
            self.ramp = config.ramp;
            self.lut = RampLut::new(config.ramp);
        }
        sample_image_with(&self.frame, config, &self.lut, grid);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gm_mesh::procedural;

    #[test]
    fn renderers_share_the_trait() {
        let mut renderers: Vec<Box<dyn GridRenderer>> = vec![
            Box::new(MeshRenderer::new(Arc::new(procedural::cube()))),
            Box::new(ImageRenderer::new(
                "white",
                Arc::new(FrameBuffer::filled(8, 8, [255, 255, 255, 255])),
            )),
        ];
        let config = RenderConfig::default();
        let mut grid = GlyphGrid::new(40, 20);
        for r in &mut renderers {
            r.render(&config, &mut grid);
            assert!(grid.filled_count() > 0, "{}", r.name());
        }
    }

    #[test]
    fn swapping_mesh_changes_output() {
        let config = RenderConfig {
            rotation_x: 0.5,
            rotation_y: 0.7,
            ..RenderConfig::default()
        };
        let mut renderer = MeshRenderer::new(Arc::new(procedural::cube()));
        let mut grid = GlyphGrid::new(60, 30);
        renderer.render(&config, &mut grid);
        let cube = grid.to_text();

        renderer.set_mesh(Arc::new(procedural::torus(24, 12)));
        renderer.render(&config, &mut grid);
        assert_eq!(renderer.name(), "torus");
        assert_ne!(grid.to_text(), cube);
    }

    #[test]
    fn image_renderer_follows_ramp_changes() {
        let mut renderer =
            ImageRenderer::new("white", Arc::new(FrameBuffer::filled(8, 8, [255, 255, 255, 255])));
        let mut config = RenderConfig::default();
        let mut grid = GlyphGrid::new(4, 2);
        renderer.render(&config, &mut grid);
        assert_eq!(grid.get(0, 0), '@');
        config.ramp = GlyphRamp::Binary;
        renderer.render(&config, &mut grid);
        assert_eq!(grid.get(0, 0), '1');
    }
}

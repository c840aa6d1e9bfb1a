use glam::Vec3;
use gm_core::charset::{GlyphRamp, RampLut};
use gm_core::config::RenderConfig;
use gm_core::frame::{DepthBuffer, GlyphGrid};
use gm_core::mesh::Mesh;

use crate::transform::{Projected, Transformer};

/// Ambient floor added to every visible face.
pub const AMBIENT: f32 = 0.1;

/// Gamma exponent: `adjusted = brightness^(1 / GAMMA)`.
pub const GAMMA: f32 = 1.5;

/// Counters for one render pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Faces kept after decimation.
    pub considered: usize,
    /// Faces skipped: invalid index, < 3 vertices, NaN projection.
    pub skipped: usize,
    /// Faces rejected by back-face culling (or a degenerate normal).
    pub culled: usize,
    /// Faces actually filled.
    pub drawn: usize,
    /// Cells written after the depth test.
    pub cells: usize,
}

/// Decimation step: `floor(1 / r)`.
///
/// `r <= 0` or NaN gives 1; `r > 1` is clamped to 1.
///
/// # Example
/// ```
/// use gm_ascii::raster::decimation_step;
/// assert_eq!(decimation_step(1.0), 1);
/// assert_eq!(decimation_step(0.5), 2);
/// assert_eq!(decimation_step(0.3), 3);
/// assert_eq!(decimation_step(f32::NAN), 1);
/// ```
#[must_use]
pub fn decimation_step(resolution: f32) -> usize {
    let r = if resolution.is_nan() || resolution <= 0.0 {
        1.0
    } else {
        resolution.min(1.0)
    };
    ((1.0 / r).floor() as usize).max(1)
}

/// Indices of the kept faces: `0, step, 2·step, …`.
pub fn decimated_indices(face_count: usize, resolution: f32) -> impl Iterator<Item = usize> {
    (0..face_count).step_by(decimation_step(resolution))
}

/// Normalized light direction; a zero or non-finite vector gives zero.
#[must_use]
pub fn light_vector(direction: [f32; 3]) -> Vec3 {
    Vec3::from_array(direction).normalize_or_zero()
}

/// `clamp(dot(n, light) · intensity + AMBIENT, AMBIENT, 1)`.
#[inline]
#[must_use]
pub fn brightness(normal: Vec3, light: Vec3, intensity: f32) -> f32 {
    let b = normal.dot(light) * intensity + AMBIENT;
    if b.is_nan() {
        return AMBIENT;
    }
    b.clamp(AMBIENT, 1.0)
}

/// Gamma correction applied before the ramp lookup.
#[inline]
#[must_use]
pub fn gamma_adjust(brightness: f32) -> f32 {
    brightness.powf(1.0 / GAMMA)
}

/// Face visible, prête à remplir.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadedFace {
    /// Index dans `mesh.faces`.
    pub index: usize,
    /// Profondeur plate : moyenne des z caméra.
    pub depth: f32,
    pub normal: Vec3,
    /// Luminosité après gamma, dans [0, 1].
    pub level: f32,
}

/// Decimation, validation, culling and shading. Sorted far to near (stable
/// sort, `total_cmp` on depth).
pub fn plan_faces(
    mesh: &Mesh,
    projected: &[Projected],
    config: &RenderConfig,
    stats: &mut RenderStats,
) -> Vec<ShadedFace> {
    let light = light_vector(config.light_direction);
    let mut planned = Vec::new();

    for index in decimated_indices(mesh.faces.len(), config.resolution) {
        stats.considered += 1;
        let face = &mesh.faces[index];
        if face.len() < 3 {
            stats.skipped += 1;
            continue;
        }
        let Some(points) = face
            .indices
            .iter()
            .map(|&i| projected.get(i).filter(|p| p.is_finite()))
            .collect::<Option<Vec<&Projected>>>()
        else {
            stats.skipped += 1;
            continue;
        };

        let edge_a = points[1].camera - points[0].camera;
        let edge_b = points[2].camera - points[0].camera;
        let normal = edge_a.cross(edge_b).normalize_or_zero();
        // normalize_or_zero couvre les normales nulles et non finies.
        if normal.z <= 0.0 {
            stats.culled += 1;
            continue;
        }

        let depth = points.iter().map(|p| p.camera.z).sum::<f32>() / points.len() as f32;
        let level = gamma_adjust(brightness(normal, light, config.light_intensity));
        planned.push(ShadedFace {
            index,
            depth,
            normal,
            level,
        });
    }

    planned.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    planned
}

/// Even-odd scanline fill of a screen polygon.
///
/// An edge crosses row `y` if exactly one endpoint has `y_e <= y`. Each
/// pair of crossings fills `ceil(x1)..=floor(x2)`, clipped to the grid.
/// Returns the number of cells visited.
///
/// # Example
/// ```
/// use gm_ascii::raster::scanline_fill;
/// let square = [(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)];
/// let mut cells = Vec::new();
/// scanline_fill(&square, 5, 5, &mut Vec::new(), |x, y| cells.push((x, y)));
/// assert_eq!(cells, vec![(1, 1), (2, 1), (3, 1), (1, 2), (2, 2), (3, 2)]);
/// ```
pub fn scanline_fill(
    points: &[(f32, f32)],
    width: u16,
    height: u16,
    crossings: &mut Vec<f32>,
    mut plot: impl FnMut(u16, u16),
) -> usize {
    if points.len() < 3 || width == 0 || height == 0 {
        return 0;
    }
    let (min_y, max_y) = points
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &(_, y)| {
            (lo.min(y), hi.max(y))
        });
    if !min_y.is_finite() || !max_y.is_finite() {
        return 0;
    }
    let y_start = min_y.floor().max(0.0);
    let y_end = max_y.ceil().min(f32::from(height - 1));
    if y_start > y_end {
        return 0;
    }
    let max_col = f32::from(width - 1);

    let mut visited = 0;
    for row in (y_start as u16)..=(y_end as u16) {
        let y = f32::from(row);
        crossings.clear();
        for (i, &(x0, y0)) in points.iter().enumerate() {
            let (x1, y1) = points[(i + 1) % points.len()];
            if (y0 <= y) != (y1 <= y) {
                crossings.push(x0 + (y - y0) * (x1 - x0) / (y1 - y0));
            }
        }
        crossings.sort_by(f32::total_cmp);
        for pair in crossings.chunks_exact(2) {
            let start = pair[0].ceil().max(0.0);
            let end = pair[1].floor().min(max_col);
            if start > end {
                continue;
            }
            for col in (start as u16)..=(end as u16) {
                plot(col, row);
                visited += 1;
            }
        }
    }
    visited
}

/// Reusable rasterizer: keeps the LUT, depth buffer and scratch buffers
/// between frames.
///
/// # Example
/// ```
/// use gm_ascii::raster::Rasterizer;
/// use gm_core::config::RenderConfig;
/// use gm_core::frame::GlyphGrid;
/// use gm_core::mesh::{Face, Mesh, Vertex};
///
/// let mesh = Mesh::new(
///     "tri",
///     vec![Vertex::new(-0.5, -0.5, 0.0), Vertex::new(0.5, -0.5, 0.0), Vertex::new(0.0, 0.5, 0.0)],
///     vec![Face::tri(0, 1, 2)],
/// );
/// let mut raster = Rasterizer::new();
/// let mut grid = GlyphGrid::new(40, 20);
/// let stats = raster.render(&mesh, &RenderConfig::default(), &mut grid);
/// assert_eq!(stats.drawn, 1);
/// assert!(grid.filled_count() > 0);
/// ```
#[derive(Debug)]
pub struct Rasterizer {
    ramp: GlyphRamp,
    lut: RampLut,
    depth: DepthBuffer,
    points: Vec<(f32, f32)>,
    crossings: Vec<f32>,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    #[must_use]
    pub fn new() -> Self {
        let ramp = GlyphRamp::default();
        Self {
            ramp,
            lut: RampLut::new(ramp),
            depth: DepthBuffer::new(0, 0),
            points: Vec::with_capacity(8),
            crossings: Vec::with_capacity(8),
        }
    }

    /// Renders `mesh` into `grid` (cleared first).
    pub fn render(&mut self, mesh: &Mesh, config: &RenderConfig, grid: &mut GlyphGrid) -> RenderStats {
        if self.ramp != config.ramp {
            self.ramp = config.ramp;
            self.lut = RampLut::new(config.ramp);
        }
        if self.depth.width() != grid.width || self.depth.height() != grid.height {
            self.depth = DepthBuffer::new(grid.width, grid.height);
        } else {
            self.depth.reset();
        }
        grid.clear();

        let mut stats = RenderStats::default();
        let transformer = Transformer::new(config, grid.width, grid.height);
        let projected = transformer.transform_all(&mesh.vertices);
        let planned = plan_faces(mesh, &projected, config, &mut stats);

        let (width, height) = (grid.width, grid.height);
        for shaded in &planned {
            let face = &mesh.faces[shaded.index];
            self.points.clear();
            self.points.extend(
                face.indices
                    .iter()
                    .map(|&i| (projected[i].screen_x, projected[i].screen_y)),
            );
            let glyph = self.lut.glyph(shaded.level);
            let depth = &mut self.depth;
            let mut written = 0;
            scanline_fill(&self.points, width, height, &mut self.crossings, |x, y| {
                if depth.test_and_set(x, y, shaded.depth) {
                    grid.set(x, y, glyph);
                    written += 1;
                }
            });
            stats.drawn += 1;
            stats.cells += written;
        }

        log::trace!(
            "raster {}: {} faces, {} culled, {} skipped, {} drawn, {} cells",
            mesh.name,
            stats.considered,
            stats.culled,
            stats.skipped,
            stats.drawn,
            stats.cells
        );
        stats
    }
}

/// One-off render into a fresh `width × height` grid.
#[must_use]
pub fn render_mesh(mesh: &Mesh, config: &RenderConfig, width: u16, height: u16) -> (GlyphGrid, RenderStats) {
    let mut grid = GlyphGrid::new(width, height);
    let stats = Rasterizer::new().render(mesh, config, &mut grid);
    (grid, stats)
}

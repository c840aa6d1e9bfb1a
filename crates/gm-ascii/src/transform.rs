use glam::Vec3;
use gm_core::config::RenderConfig;
use gm_core::mesh::Vertex;

/// Camera-to-origin distance used by the perspective projection.
pub const CAMERA_DISTANCE: f32 = 5.0;

/// Width/height ratio of a terminal cell (a cell is twice as tall as wide).
pub const CELL_ASPECT: f32 = 0.5;

/// Vertex after rotation and projection.
///
/// `camera` keeps camera-space depth: a larger `z` is closer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub camera: Vec3,
    pub screen_x: f32,
    pub screen_y: f32,
}

impl Projected {
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.screen_x.is_finite() && self.screen_y.is_finite()
    }
}

/// Rotation (X then Y) plus perspective projection onto the grid.
///
/// Sines and cosines are computed once per frame.
///
/// # Example
/// ```
/// use gm_ascii::transform::Transformer;
/// use gm_core::config::RenderConfig;
/// use gm_core::mesh::Vertex;
///
/// let t = Transformer::new(&RenderConfig::default(), 80, 40);
/// let p = t.transform(Vertex::new(0.0, 0.0, 0.0));
/// assert_eq!((p.screen_x, p.screen_y), (40.0, 20.0));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Transformer {
    cos_x: f32,
    sin_x: f32,
    cos_y: f32,
    sin_y: f32,
    scale: f32,
    half_w: f32,
    half_h: f32,
}

impl Transformer {
    #[must_use]
    pub fn new(config: &RenderConfig, width: u16, height: u16) -> Self {
        let (sin_x, cos_x) = config.rotation_x.sin_cos();
        let (sin_y, cos_y) = config.rotation_y.sin_cos();
        Self {
            cos_x,
            sin_x,
            cos_y,
            sin_y,
            scale: config.scale * config.zoom,
            half_w: f32::from(width) / 2.0,
            half_h: f32::from(height) / 2.0,
        }
    }

    /// Rotates around X by `rotation_x`, then around Y by `rotation_y`.
    #[inline]
    #[must_use]
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let y = v.y * self.cos_x - v.z * self.sin_x;
        let z = v.y * self.sin_x + v.z * self.cos_x;
        let x = v.x * self.cos_y + z * self.sin_y;
        let z = -v.x * self.sin_y + z * self.cos_y;
        Vec3::new(x, y, z)
    }

    /// Projects a camera-space point onto the grid.
    ///
    /// Perspective factor `D / (D + z)`. A point with `D + z <= 0`
    /// projects to NaN and the rasterizer skips its face.
    #[inline]
    #[must_use]
    pub fn project(&self, camera: Vec3) -> (f32, f32) {
        let denom = CAMERA_DISTANCE + camera.z;
        let p = if denom > 0.0 {
            CAMERA_DISTANCE / denom
        } else {
            f32::NAN
        };
        let sx = self.half_w + camera.x * self.scale * p;
        let sy = self.half_h - camera.y * self.scale * p * CELL_ASPECT;
        (sx, sy)
    }

    #[inline]
    #[must_use]
    pub fn transform(&self, v: Vertex) -> Projected {
        let camera = self.rotate(v.to_vec3());
        let (screen_x, screen_y) = self.project(camera);
        Projected {
            camera,
            screen_x,
            screen_y,
        }
    }

    /// Transforms every vertex, one per index.
    #[must_use]
    pub fn transform_all(&self, vertices: &[Vertex]) -> Vec<Projected> {
        vertices.iter().map(|&v| self.transform(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn config(rx: f32, ry: f32) -> RenderConfig {
        RenderConfig {
            rotation_x: rx,
            rotation_y: ry,
            ..RenderConfig::default()
        }
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn identity_rotation_keeps_point() {
        let t = Transformer::new(&config(0.0, 0.0), 80, 40);
        let v = Vec3::new(0.3, -0.2, 0.7);
        assert_eq!(t.rotate(v), v);
    }

    #[test]
    fn rotation_is_x_then_y() {
        // +y tourné de 90° autour de X donne +z, puis 90° autour de Y donne +x.
        let t = Transformer::new(&config(FRAC_PI_2, FRAC_PI_2), 80, 40);
        assert!(close(t.rotate(Vec3::Y), Vec3::X));
        // L'ordre inverse enverrait +y sur +z.
        let swapped = Transformer::new(&config(FRAC_PI_2, 0.0), 80, 40);
        assert!(close(swapped.rotate(Vec3::Y), Vec3::Z));
    }

    #[test]
    fn projection_matches_formula() {
        let t = Transformer::new(&config(0.0, 0.0), 80, 40);
        let (sx, sy) = t.project(Vec3::new(0.5, 0.5, 0.5));
        let p = CAMERA_DISTANCE / (CAMERA_DISTANCE + 0.5);
        assert!((sx - (40.0 + 0.5 * 30.0 * p)).abs() < 1e-4);
        assert!((sy - (20.0 - 0.5 * 30.0 * p * 0.5)).abs() < 1e-4);
    }

    #[test]
    fn zoom_multiplies_scale() {
        let mut cfg = config(0.0, 0.0);
        cfg.zoom = 2.0;
        let t = Transformer::new(&cfg, 80, 40);
        let (sx, _) = t.project(Vec3::new(1.0, 0.0, 0.0));
        assert!((sx - (40.0 + 60.0)).abs() < 1e-4);
    }

    #[test]
    fn behind_camera_projects_to_nan() {
        let t = Transformer::new(&config(0.0, 0.0), 80, 40);
        let (sx, sy) = t.project(Vec3::new(0.1, 0.1, -CAMERA_DISTANCE));
        assert!(sx.is_nan() && sy.is_nan());
        let p = t.transform(Vertex::new(0.0, 0.0, -6.0));
        assert!(!p.is_finite());
    }

    #[test]
    fn nan_vertex_stays_nan() {
        let t = Transformer::new(&config(0.4, 0.9), 80, 40);
        let p = t.transform(Vertex::new(f32::NAN, 0.0, 0.0));
        assert!(!p.is_finite());
    }
}

use glam::Vec3;

/// Object-space vertex.
///
/// # Example
/// ```
/// use gm_core::mesh::Vertex;
/// let v = Vertex::new(1.0, 2.0, 3.0);
/// assert_eq!(v.to_vec3().y, 2.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vertex {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline(always)]
    #[must_use]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// `true` if all three coordinates are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Vec3> for Vertex {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Ordered polygon (≥ 3 indices). The winding order fixes the normal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Face {
    pub indices: Vec<usize>,
}

impl Face {
    #[must_use]
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    /// Triangle helper.
    #[must_use]
    pub fn tri(a: usize, b: usize, c: usize) -> Self {
        Self::new(vec![a, b, c])
    }

    /// Quad helper.
    #[must_use]
    pub fn quad(a: usize, b: usize, c: usize, d: usize) -> Self {
        Self::new(vec![a, b, c, d])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// `true` if the face has at least 3 indices, all `< vertex_count`.
    #[must_use]
    pub fn is_valid_for(&self, vertex_count: usize) -> bool {
        self.indices.len() >= 3 && self.indices.iter().all(|&i| i < vertex_count)
    }
}

/// Mesh: name, vertices and faces. Read-only for the pipeline.
///
/// A mesh without vertices is a valid value but is never rendered.
///
/// # Example
/// ```
/// use gm_core::mesh::{Face, Mesh, Vertex};
/// let mesh = Mesh::new(
///     "tri",
///     vec![Vertex::new(0.0, 0.0, 0.0), Vertex::new(1.0, 0.0, 0.0), Vertex::new(0.0, 1.0, 0.0)],
///     vec![Face::tri(0, 1, 2)],
/// );
/// assert!(mesh.is_renderable());
/// assert!(mesh.invalid_faces().is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
}

impl Mesh {
    #[must_use]
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex>, faces: Vec<Face>) -> Self {
        Self {
            name: name.into(),
            vertices,
            faces,
        }
    }

    /// Empty mesh (never rendered).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// `true` if the mesh has at least one vertex and one face.
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        !self.vertices.is_empty() && !self.faces.is_empty()
    }

    /// Indices of faces violating the index invariant.
    #[must_use]
    pub fn invalid_faces(&self) -> Vec<usize> {
        let n = self.vertices.len();
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.is_valid_for(n))
            .map(|(i, _)| i)
            .collect()
    }

    /// Axis-aligned bounds over finite vertices, or `None` if there are none.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut finite = self
            .vertices
            .iter()
            .filter(|v| v.is_finite())
            .map(|v| v.to_vec3());
        let first = finite.next()?;
        Some(finite.fold((first, first), |(min, max), v| (min.min(v), max.max(v))))
    }

    /// Recenter the mesh on the origin and scale it so that its largest
    /// dimension equals `2 × target_extent`.
    ///
    /// # Example
    /// ```
    /// use gm_core::mesh::{Face, Mesh, Vertex};
    /// let mut mesh = Mesh::new(
    ///     "big",
    ///     vec![Vertex::new(10.0, 10.0, 10.0), Vertex::new(30.0, 10.0, 10.0), Vertex::new(10.0, 20.0, 10.0)],
    ///     vec![Face::tri(0, 1, 2)],
    /// );
    /// mesh.center_and_fit(1.0);
    /// let (min, max) = mesh.bounds().unwrap();
    /// assert!((max.x - min.x - 2.0).abs() < 1e-5);
    /// assert!((min.x + max.x).abs() < 1e-5);
    /// ```
    pub fn center_and_fit(&mut self, target_extent: f32) {
        let Some((min, max)) = self.bounds() else {
            return;
        };
        let center = (min + max) * 0.5;
        let size = max - min;
        let max_dim = size.x.max(size.y).max(size.z);
        let scale = if max_dim > 1e-9 {
            2.0 * target_extent / max_dim
        } else {
            1.0
        };
        for v in &mut self.vertices {
            *v = Vertex::from((v.to_vec3() - center) * scale);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mesh_is_not_renderable() {
        assert!(!Mesh::empty().is_renderable());
        let only_vertices = Mesh::new("pts", vec![Vertex::default()], vec![]);
        assert!(!only_vertices.is_renderable());
    }

    #[test]
    fn invalid_faces_reports_out_of_range_and_degenerate() {
        let mesh = Mesh::new(
            "m",
            vec![Vertex::default(); 3],
            vec![Face::tri(0, 1, 2), Face::tri(0, 1, 3), Face::new(vec![0, 1])],
        );
        assert_eq!(mesh.invalid_faces(), vec![1, 2]);
    }

    #[test]
    fn bounds_skip_nan_vertices() {
        let mesh = Mesh::new(
            "nan",
            vec![
                Vertex::new(f32::NAN, 0.0, 0.0),
                Vertex::new(-1.0, 2.0, 0.0),
                Vertex::new(1.0, -2.0, 3.0),
            ],
            vec![],
        );
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn center_and_fit_ignores_empty_mesh() {
        let mut mesh = Mesh::empty();
        mesh.center_and_fit(1.0);
        assert!(mesh.vertices.is_empty());
    }
}

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use gm_core::mesh::{Face, Mesh, Vertex};

use crate::error::MeshError;

/// Built-in parametric shapes.
///
/// # Example
/// ```
/// use gm_mesh::procedural::Shape;
/// let mesh = Shape::from_name("pyramid").unwrap().build();
/// assert_eq!(mesh.vertices.len(), 5);
/// assert_eq!(mesh.faces.len(), 5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Cube,
    Pyramid,
    Diamond,
    Torus,
    Star,
}

impl Shape {
    pub const ALL: [Shape; 5] = [
        Shape::Cube,
        Shape::Pyramid,
        Shape::Diamond,
        Shape::Torus,
        Shape::Star,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Shape::Cube => "cube",
            Shape::Pyramid => "pyramid",
            Shape::Diamond => "diamond",
            Shape::Torus => "torus",
            Shape::Star => "star",
        }
    }

    /// # Errors
    /// Returns [`MeshError::UnsupportedFormat`] for an unknown shape name.
    pub fn from_name(name: &str) -> Result<Self, MeshError> {
        let lowered = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|s| s.name() == lowered)
            .ok_or_else(|| {
                MeshError::UnsupportedFormat(format!(
                    "forme inconnue : {name}. Supporté : cube, pyramid, diamond, torus, star"
                ))
            })
    }

    /// Builds the mesh with its default parameters.
    #[must_use]
    pub fn build(self) -> Mesh {
        match self {
            Shape::Cube => cube(),
            Shape::Pyramid => pyramid(),
            Shape::Diamond => diamond(8),
            Shape::Torus => torus(24, 12),
            Shape::Star => star(5),
        }
    }
}

/// Centred unit cube (8 vertices, 6 quads), outward normals.
///
/// # Example
/// ```
/// let cube = gm_mesh::procedural::cube();
/// assert_eq!(cube.vertices.len(), 8);
/// assert!(cube.faces.iter().all(|f| f.len() == 4));
/// ```
#[must_use]
pub fn cube() -> Mesh {
    let h = 0.5;
    let vertices = vec![
        Vertex::new(-h, -h, -h),
        Vertex::new(h, -h, -h),
        Vertex::new(h, h, -h),
        Vertex::new(-h, h, -h),
        Vertex::new(-h, -h, h),
        Vertex::new(h, -h, h),
        Vertex::new(h, h, h),
        Vertex::new(-h, h, h),
    ];
    let faces = vec![
        Face::quad(4, 5, 6, 7), // +z
        Face::quad(1, 0, 3, 2), // -z
        Face::quad(5, 1, 2, 6), // +x
        Face::quad(0, 4, 7, 3), // -x
        Face::quad(7, 6, 2, 3), // +y
        Face::quad(0, 1, 5, 4), // -y
    ];
    Mesh::new("cube", vertices, faces)
}

/// Square-based pyramid.
#[must_use]
pub fn pyramid() -> Mesh {
    let h = 0.5;
    let vertices = vec![
        Vertex::new(-h, -h, -h),
        Vertex::new(h, -h, -h),
        Vertex::new(h, -h, h),
        Vertex::new(-h, -h, h),
        Vertex::new(0.0, h, 0.0),
    ];
    let faces = vec![
        Face::quad(0, 1, 2, 3),
        Face::tri(3, 2, 4),
        Face::tri(2, 1, 4),
        Face::tri(1, 0, 4),
        Face::tri(0, 3, 4),
    ];
    let mut mesh = Mesh::new("pyramid", vertices, faces);
    orient_outward(&mut mesh);
    mesh
}

/// Bipyramid (diamond) with `sides` sides and a taller upper apex.
#[must_use]
pub fn diamond(sides: usize) -> Mesh {
    let sides = sides.max(3);
    let mut vertices = vec![Vertex::new(0.0, 0.7, 0.0), Vertex::new(0.0, -0.7, 0.0)];
    for i in 0..sides {
        let a = TAU * i as f32 / sides as f32;
        vertices.push(Vertex::new(0.5 * a.cos(), 0.15, 0.5 * a.sin()));
    }
    let mut faces = Vec::with_capacity(sides * 2);
    for i in 0..sides {
        let a = 2 + i;
        let b = 2 + (i + 1) % sides;
        faces.push(Face::tri(0, b, a));
        faces.push(Face::tri(1, a, b));
    }
    let mut mesh = Mesh::new("diamond", vertices, faces);
    orient_outward(&mut mesh);
    mesh
}

/// Torus in the XY plane (facing the camera at rest).
///
/// `ring` segments around the axis, `tube` segments around the tube.
#[must_use]
pub fn torus(ring: usize, tube: usize) -> Mesh {
    let (ring, tube) = (ring.max(3), tube.max(3));
    let (major, minor) = (0.65, 0.25);
    let mut vertices = Vec::with_capacity(ring * tube);
    for i in 0..ring {
        let u = TAU * i as f32 / ring as f32;
        for j in 0..tube {
            let v = TAU * j as f32 / tube as f32;
            let r = major + minor * v.cos();
            vertices.push(Vertex::new(r * u.cos(), r * u.sin(), minor * v.sin()));
        }
    }
    let at = |i: usize, j: usize| (i % ring) * tube + (j % tube);
    let mut faces = Vec::with_capacity(ring * tube);
    for i in 0..ring {
        for j in 0..tube {
            let mut face = Face::quad(at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1));
            // Normale sortante = s'éloigne de l'âme du tube.
            let mid_u = TAU * (i as f32 + 0.5) / ring as f32;
            let core = Vec3::new(major * mid_u.cos(), major * mid_u.sin(), 0.0);
            let centroid = face_centroid(&vertices, &face);
            if face_normal(&vertices, &face).dot(centroid - core) < 0.0 {
                face.indices.reverse();
            }
            faces.push(face);
        }
    }
    Mesh::new("torus", vertices, faces)
}

/// Extruded star with `points` tips: two fan faces plus the sides.
#[must_use]
pub fn star(points: usize) -> Mesh {
    let points = points.max(3);
    let (outer, inner, depth) = (0.6, 0.25, 0.15);
    let n = points * 2;

    // Contour CCW dans le plan XY, branche 0 vers le haut.
    let outline: Vec<(f32, f32)> = (0..n)
        .map(|k| {
            let a = PI / 2.0 + PI * k as f32 / points as f32;
            let r = if k % 2 == 0 { outer } else { inner };
            (r * a.cos(), r * a.sin())
        })
        .collect();

    let mut vertices = Vec::with_capacity(2 * n + 2);
    vertices.push(Vertex::new(0.0, 0.0, depth));
    vertices.push(Vertex::new(0.0, 0.0, -depth));
    for &(x, y) in &outline {
        vertices.push(Vertex::new(x, y, depth));
    }
    for &(x, y) in &outline {
        vertices.push(Vertex::new(x, y, -depth));
    }
    let front = |k: usize| 2 + k % n;
    let back = |k: usize| 2 + n + k % n;

    let mut faces = Vec::with_capacity(4 * n);
    for k in 0..n {
        faces.push(Face::tri(0, front(k), front(k + 1)));
        faces.push(Face::tri(1, back(k + 1), back(k)));
        faces.push(Face::quad(back(k), back(k + 1), front(k + 1), front(k)));
    }
    Mesh::new("star", vertices, faces)
}

fn face_normal(vertices: &[Vertex], face: &Face) -> Vec3 {
    let p = |i: usize| vertices[face.indices[i]].to_vec3();
    (p(1) - p(0)).cross(p(2) - p(0))
}

fn face_centroid(vertices: &[Vertex], face: &Face) -> Vec3 {
    let sum: Vec3 = face.indices.iter().map(|&i| vertices[i].to_vec3()).sum();
    sum / face.indices.len() as f32
}

/// Retourne les faces dont la normale pointe vers le centre (formes convexes).
fn orient_outward(mesh: &mut Mesh) {
    let Some((min, max)) = mesh.bounds() else {
        return;
    };
    let center = (min + max) * 0.5;
    for face in &mut mesh.faces {
        let normal = face_normal(&mesh.vertices, face);
        if normal.dot(face_centroid(&mesh.vertices, face) - center) < 0.0 {
            face.indices.reverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_outward(mesh: &Mesh, center_of: impl Fn(Vec3) -> Vec3) {
        for (i, face) in mesh.faces.iter().enumerate() {
            let c = face_centroid(&mesh.vertices, face);
            let n = face_normal(&mesh.vertices, face);
            assert!(
                n.dot(c - center_of(c)) > 0.0,
                "{} face {i} orientée vers l'intérieur",
                mesh.name
            );
        }
    }

    #[test]
    fn all_shapes_are_valid_meshes() {
        for shape in Shape::ALL {
            let mesh = shape.build();
            assert!(mesh.is_renderable(), "{}", shape.name());
            assert!(mesh.invalid_faces().is_empty(), "{}", shape.name());
            assert_eq!(mesh.name, shape.name());
        }
    }

    #[test]
    fn convex_shapes_face_outward() {
        for mesh in [cube(), pyramid(), diamond(6)] {
            let (min, max) = mesh.bounds().unwrap();
            let center = (min + max) * 0.5;
            assert_outward(&mesh, |_| center);
        }
    }

    #[test]
    fn star_faces_outward() {
        let mesh = star(5);
        // Les éventails regardent ±z, les flancs s'éloignent de l'axe z.
        assert_outward(&mesh, |c| {
            if c.z.abs() > 0.1 {
                Vec3::ZERO
            } else {
                Vec3::new(0.0, 0.0, c.z)
            }
        });
    }

    #[test]
    fn torus_counts() {
        let mesh = torus(10, 6);
        assert_eq!(mesh.vertices.len(), 60);
        assert_eq!(mesh.faces.len(), 60);
    }

    #[test]
    fn unknown_shape_is_rejected() {
        assert!(Shape::from_name("dodecahedron").is_err());
        assert_eq!(Shape::from_name(" Torus ").unwrap(), Shape::Torus);
    }
}

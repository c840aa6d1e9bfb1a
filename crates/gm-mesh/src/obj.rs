use std::fmt::Write as _;

use gm_core::mesh::{Face, Mesh, Vertex};

use crate::error::MeshError;

/// Name used when the file declares neither `o` nor `g`.
pub const DEFAULT_OBJ_NAME: &str = "obj";

/// Decodes Wavefront OBJ text (`v` vertices and `f` faces only).
///
/// Permissive: an unreadable coordinate becomes NaN instead of stopping
/// the parse. Faces with an unreadable, zero or out-of-range index are
/// dropped.
///
/// # Errors
/// [`MeshError::Empty`] if no vertex was parsed.
///
/// # Example
/// ```
/// use gm_mesh::obj::decode_obj;
/// let mesh = decode_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3").unwrap();
/// assert_eq!(mesh.vertices.len(), 3);
/// assert_eq!(mesh.faces[0].indices, vec![0, 1, 2]);
/// ```
pub fn decode_obj(text: &str) -> Result<Mesh, MeshError> {
    let mut name: Option<String> = None;
    let mut vertices = Vec::new();
    let mut faces = Vec::new();
    let mut skipped = 0usize;

    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let mut coord = || {
                    tokens
                        .next()
                        .and_then(|t| t.parse::<f32>().ok())
                        .unwrap_or(f32::NAN)
                };
                let (x, y, z) = (coord(), coord(), coord());
                vertices.push(Vertex::new(x, y, z));
            }
            Some("f") => match parse_face(tokens, vertices.len()) {
                Some(face) => faces.push(face),
                None => skipped += 1,
            },
            Some("o" | "g") if name.is_none() => {
                let rest = tokens.collect::<Vec<_>>().join(" ");
                if !rest.is_empty() {
                    name = Some(rest);
                }
            }
            _ => {}
        }
    }

    if vertices.is_empty() {
        return Err(MeshError::Empty);
    }

    let count = vertices.len();
    let before = faces.len();
    faces.retain(|f: &Face| f.is_valid_for(count));
    skipped += before - faces.len();
    if skipped > 0 {
        log::warn!("OBJ : {skipped} face(s) ignorée(s) (index invalide ou < 3 sommets)");
    }
    log::debug!("OBJ décodé : {count} sommets, {} faces", faces.len());

    Ok(Mesh::new(
        name.unwrap_or_else(|| DEFAULT_OBJ_NAME.to_string()),
        vertices,
        faces,
    ))
}

/// Indices d'une ligne `f`. Retourne `None` si un index est illisible ou si
/// la face a moins de 3 sommets.
fn parse_face<'a>(tokens: impl Iterator<Item = &'a str>, seen: usize) -> Option<Face> {
    let mut indices = Vec::with_capacity(4);
    for token in tokens {
        let first = token.split('/').next()?;
        let raw: i64 = first.parse().ok()?;
        let idx = match raw {
            0 => return None,
            r if r > 0 => usize::try_from(r - 1).ok()?,
            // Index relatif : -1 = dernier sommet déclaré.
            r => usize::try_from(seen as i64 + r).ok()?,
        };
        indices.push(idx);
    }
    (indices.len() >= 3).then(|| Face::new(indices))
}

/// Serializes a mesh to OBJ (`o`, `v`, `f`, 1-based indices).
///
/// # Example
/// ```
/// use gm_mesh::obj::{decode_obj, to_obj};
/// use gm_mesh::procedural::cube;
/// let cube = cube();
/// let back = decode_obj(&to_obj(&cube)).unwrap();
/// assert_eq!(back.vertices.len(), 8);
/// assert_eq!(back.faces.len(), 6);
/// ```
#[must_use]
pub fn to_obj(mesh: &Mesh) -> String {
    let mut out = String::with_capacity(32 * (mesh.vertices.len() + mesh.faces.len()) + 16);
    let _ = writeln!(out, "o {}", mesh.name);
    for v in &mesh.vertices {
        let _ = writeln!(out, "v {} {} {}", v.x, v.y, v.z);
    }
    for f in &mesh.faces {
        out.push('f');
        for i in &f.indices {
            let _ = write!(out, " {}", i + 1);
        }
        out.push('\n');
    }
    out
}
